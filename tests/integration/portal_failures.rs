use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::mock_portal::{launch, mount_suites, mount_token, ITEMS_PATH};

#[tokio::test(flavor = "multi_thread")]
async fn rejected_credentials_abort_before_any_fetch() {
  let server = MockServer::start().await;
  mount_token(&server, 401, 1).await;
  Mock::given(path(ITEMS_PATH))
    .respond_with(ResponseTemplate::new(200))
    .expect(0)
    .mount(&server)
    .await;

  let dir = test_support::tempdir();
  let out = dir.path().join("report.xlsx");
  let props = test_support::write_properties(dir.path(), &server.uri(), "");

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd.arg("--properties").arg(&props).arg("--out").arg(&out);
  let output = test_support::run_blocking(move || cmd.output().unwrap()).await;

  output
    .assert()
    .failure()
    .stderr(predicate::str::contains("authentication failed: token endpoint answered 401"))
    .stderr(predicate::str::contains("s3cret").not());
  assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_tests_query_leaves_no_output() {
  let server = MockServer::start().await;
  let launch = launch();
  mount_token(&server, 200, 1).await;
  mount_suites(&server, &launch, 1).await;
  // Non-CR is filled first and its first suite is path 101.
  Mock::given(method("GET"))
    .and(path(ITEMS_PATH))
    .and(query_param("filter.eq.parentId", "101"))
    .respond_with(ResponseTemplate::new(500))
    .expect(1)
    .mount(&server)
    .await;

  let dir = test_support::tempdir();
  let out = dir.path().join("report.xlsx");
  let props = test_support::write_properties(dir.path(), &server.uri(), "");

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd.arg("--properties").arg(&props).arg("--out").arg(&out);
  let output = test_support::run_blocking(move || cmd.output().unwrap()).await;

  output.assert().failure().stderr(predicate::str::contains("failed with status 500"));
  assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_suites_query_keeps_existing_report() {
  let server = MockServer::start().await;
  mount_token(&server, 200, 1).await;
  Mock::given(method("GET"))
    .and(path(ITEMS_PATH))
    .and(query_param("filter.level.path", "1"))
    .respond_with(ResponseTemplate::new(503))
    .expect(1)
    .mount(&server)
    .await;

  let dir = test_support::tempdir();
  let out = dir.path().join("report.xlsx");
  let mut seed = rust_xlsxwriter::Workbook::new();
  seed.add_worksheet().set_name("Previous").unwrap();
  seed.save(&out).unwrap();
  let before = std::fs::read(&out).unwrap();
  let props = test_support::write_properties(dir.path(), &server.uri(), "");

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd.arg("--properties").arg(&props).arg("--out").arg(&out);
  let output = test_support::run_blocking(move || cmd.output().unwrap()).await;

  output.assert().failure().stderr(predicate::str::contains("failed with status 503"));
  assert_eq!(std::fs::read(&out).unwrap(), before);
}
