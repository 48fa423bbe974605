use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_missing_manifest_fails() {
  let env = TestEnv::empty();

  env
    .packwright_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Manifest not found"));
}

#[test]
fn build_without_runtime_fails_and_writes_no_bundle() {
  let env = TestEnv::from_fixture("hello.yaml");

  env
    .packwright_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("✗"));

  assert!(!env.bundle_path().exists());
}

#[test]
fn build_rejects_bad_timeout() {
  let env = TestEnv::from_fixture("hello.yaml");

  env
    .packwright_cmd()
    .args(["build", "--timeout", "soon"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--timeout"));
}
