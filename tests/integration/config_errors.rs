use predicates::prelude::*;

#[test]
fn named_properties_file_must_exist() {
  let dir = test_support::tempdir();
  let missing = dir.path().join("absent.properties");

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd
    .arg("--properties")
    .arg(&missing)
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot read properties file"))
    .stderr(predicate::str::contains("absent.properties"));
}

#[test]
fn properties_file_can_come_from_the_environment() {
  let dir = test_support::tempdir();
  let missing = dir.path().join("from-env.properties");

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd
    .env("RP_PROPERTIES", &missing)
    .assert()
    .failure()
    .stderr(predicate::str::contains("from-env.properties"));
}

#[test]
fn blank_launch_id_is_reported_as_missing() {
  let dir = test_support::tempdir();
  let props = test_support::write_properties(dir.path(), "http://127.0.0.1:9", "");

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd
    .arg("--properties")
    .arg(&props)
    .args(["-D", "launch.id=", "--out", "report.xlsx"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing required configuration key \"launch.id\""));
}

#[test]
fn output_location_is_required() {
  let dir = test_support::tempdir();
  let props = test_support::write_properties(dir.path(), "http://127.0.0.1:9", "");

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd
    .arg("--properties")
    .arg(&props)
    .assert()
    .failure()
    .stderr(predicate::str::contains("\"report.file\""));
}

#[test]
fn page_size_must_be_a_positive_integer() {
  let dir = test_support::tempdir();
  let props = test_support::write_properties(dir.path(), "http://127.0.0.1:9", "page.size=zero\n");

  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd
    .arg("--properties")
    .arg(&props)
    .args(["--out", "report.xlsx"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid value \"zero\" for configuration key \"page.size\""));
}

#[test]
fn default_properties_file_is_optional() {
  let dir = test_support::tempdir();

  // No ./default.properties: the run fails on the first required key, not on the file.
  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd
    .current_dir(dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing required configuration key \"report.portal.url\""))
    .stderr(predicate::str::contains("cannot read properties file").not());
}
