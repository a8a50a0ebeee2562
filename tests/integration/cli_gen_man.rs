use predicates::prelude::*;

#[test]
fn gen_man_outputs_troff() {
  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  let out = cmd.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let text = String::from_utf8_lossy(&out.stdout);
  // clap_mangen emits a roff manpage starting with .TH and mentions the binary name
  assert!(text.starts_with(".TH"), "expected troff man header");
  assert!(text.contains("rp-xlsx-report"));
}

#[test]
fn gen_man_needs_no_configuration() {
  let dir = test_support::tempdir();
  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd.current_dir(dir.path()).arg("--gen-man").assert().success().stderr(predicate::str::is_empty());
}

#[test]
fn help_lists_the_override_flags() {
  let mut cmd = test_support::cmd_bin("rp-xlsx-report");
  cmd
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("--properties"))
    .stdout(predicate::str::contains("--define"))
    .stdout(predicate::str::contains("--out"));
}
