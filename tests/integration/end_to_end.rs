use insta::assert_snapshot;
use serde_json::{json, Value};
use wiremock::MockServer;

use crate::mock_portal::{launch, mount_suites, mount_tests, mount_token, render};

async fn run_cli(args: Vec<std::ffi::OsString>) -> std::process::Output {
  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd.args(args);
  test_support::run_blocking(move || cmd.output().expect("spawn rp-xlsx-report")).await
}

#[tokio::test(flavor = "multi_thread")]
async fn fills_non_cr_and_cr_sheets_from_the_portal() {
  test_support::init_insta();
  let server = MockServer::start().await;
  let launch = launch();
  mount_token(&server, 200, 1).await;
  mount_suites(&server, &launch, 1).await;
  mount_tests(&server, &launch, 1).await;

  let dir = test_support::tempdir();
  let out = dir.path().join("reports").join("launch-875.xlsx");
  let props = test_support::write_properties(dir.path(), &server.uri(), "");

  let output = run_cli(vec!["--properties".into(), props.into(), "--out".into(), out.clone().into()]).await;
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(output.status.success(), "stderr: {stderr}");
  assert!(!stderr.contains("s3cret"), "password leaked into logs");
  assert!(!stderr.contains(crate::mock_portal::TOKEN), "token leaked into logs");

  let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(summary["launch_id"], "875");
  assert_eq!(summary["sheets"], json!([{ "name": "Non-CR", "rows": 2 }, { "name": "CR", "rows": 3 }]));
  assert!(summary["file"].as_str().unwrap().ends_with("launch-875.xlsx"));

  assert_eq!(test_support::sheet_names(&out), vec!["Non-CR", "CR"]);

  assert_snapshot!(render(&test_support::sheet_rows(&out, "Non-CR")), @r#"
  0: ["Feature", "Status", "Total", "Passed", "Failed", "Skipped", "Note"]
  1: ["NON-CR Login", "FAILED", "10", "8", "2", "0", "FAILED: Login button unresponsive"]
  2: ["NON-CR Search", "SKIPPED", "4", "0", "0", "4", "SKIPPED: Search index rebuilding"]
  "#);

  assert_snapshot!(render(&test_support::sheet_rows(&out, "CR")), @r#"
  0: ["Feature", "Status", "Total", "Passed", "Failed", "Skipped", "Note"]
  1: ["CR Payments", "FAILED", "6", "3", "2", "1", "FAILED: Card declined by sandbox\nFAILED: Timeout waiting for 3DS"]
  2: ["CR Profile", "INTERRUPTED", "3", "1", "1", "1", "INTERRUPTED: Agent lost connection\nSKIPPED: Depends on Login"]
  3: ["CR Checkout", "PASSED", "5", "5", "0", "0", ""]
  "#);
}

#[tokio::test(flavor = "multi_thread")]
async fn debug_logs_carry_no_credentials() {
  let server = MockServer::start().await;
  let launch = launch();
  mount_token(&server, 200, 1).await;
  mount_suites(&server, &launch, 1).await;
  mount_tests(&server, &launch, 1).await;

  let dir = test_support::tempdir();
  let out = dir.path().join("launch-875.xlsx");
  let props = test_support::write_properties(dir.path(), &server.uri(), "");

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd.env("RUST_LOG", "rp_xlsx_report=debug").arg("--properties").arg(&props).arg("--out").arg(&out);
  let output = test_support::run_blocking(move || cmd.output().expect("spawn rp-xlsx-report")).await;
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(output.status.success(), "stderr: {stderr}");
  assert!(stderr.contains("requesting access token"), "debug level not active: {stderr}");
  for secret in ["qa-bot", "s3cret", "Basic ", crate::mock_portal::TOKEN] {
    assert!(!stderr.contains(secret), "{secret:?} leaked into logs");
  }
}

#[tokio::test(flavor = "multi_thread")]
async fn template_seeds_sheets_and_stays_untouched() {
  let server = MockServer::start().await;
  let launch = launch();
  mount_token(&server, 200, 1).await;
  mount_suites(&server, &launch, 1).await;
  mount_tests(&server, &launch, 1).await;

  let dir = test_support::tempdir();
  let template = dir.path().join("template.xlsx");
  let mut seed = rust_xlsxwriter::Workbook::new();
  let ws = seed.add_worksheet();
  ws.set_name("Summary").unwrap();
  ws.write_string(0, 0, "Weekly QA report").unwrap();
  seed.save(&template).unwrap();
  let before = std::fs::read(&template).unwrap();

  let extra = format!("report.template.file={}\nreport.file=filled.xlsx\n", template.display());
  let props = test_support::write_properties(dir.path(), &server.uri(), &extra);

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd.current_dir(dir.path()).arg("--properties").arg(&props);
  let output = test_support::run_blocking(move || cmd.output().unwrap()).await;
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

  let filled = dir.path().join("filled.xlsx");
  assert_eq!(test_support::sheet_names(&filled), vec!["Summary", "Non-CR", "CR"]);
  assert_eq!(test_support::sheet_rows(&filled, "Summary"), vec![(0, vec!["Weekly QA report".to_string()])]);
  assert_eq!(std::fs::read(&template).unwrap(), before);
}

#[tokio::test(flavor = "multi_thread")]
async fn template_without_report_file_is_filled_in_place() {
  let server = MockServer::start().await;
  let launch = launch();
  mount_token(&server, 200, 1).await;
  mount_suites(&server, &launch, 1).await;
  mount_tests(&server, &launch, 1).await;

  let dir = test_support::tempdir();
  let template = dir.path().join("weekly.xlsx");
  let mut seed = rust_xlsxwriter::Workbook::new();
  seed.add_worksheet().set_name("Summary").unwrap();
  seed.add_worksheet().set_name("Archive").unwrap();
  seed.save(&template).unwrap();

  let extra = format!("report.template.file={}\n", template.display());
  let props = test_support::write_properties(dir.path(), &server.uri(), &extra);

  let output = run_cli(vec!["--properties".into(), props.into()]).await;
  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

  // Non-CR lands at index 1 and CR at index 2, ahead of the template's second sheet.
  assert_eq!(test_support::sheet_names(&template), vec!["Summary", "Non-CR", "CR", "Archive"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn second_run_reproduces_the_same_rows() {
  let server = MockServer::start().await;
  let launch = launch();
  mount_token(&server, 200, 2).await;
  mount_suites(&server, &launch, 2).await;
  mount_tests(&server, &launch, 2).await;

  let dir = test_support::tempdir();
  let out = dir.path().join("report.xlsx");
  let props = test_support::write_properties(dir.path(), &server.uri(), "");
  let args = || vec!["--properties".into(), props.clone().into_os_string(), "--out".into(), out.clone().into_os_string()];

  let first = run_cli(args()).await;
  assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
  let non_cr = test_support::sheet_rows(&out, "Non-CR");
  let cr = test_support::sheet_rows(&out, "CR");

  let second = run_cli(args()).await;
  assert!(second.status.success(), "stderr: {}", String::from_utf8_lossy(&second.stderr));
  assert_eq!(test_support::sheet_names(&out), vec!["Non-CR", "CR"]);
  assert_eq!(test_support::sheet_rows(&out, "Non-CR"), non_cr);
  assert_eq!(test_support::sheet_rows(&out, "CR"), cr);
}
