use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn verify_fresh_bundle_succeeds() {
  let env = TestEnv::from_fixture("hello.yaml");
  env.write_stamped_bundle(env!("CARGO_PKG_VERSION"), "");

  env
    .packwright_cmd()
    .arg("verify")
    .assert()
    .success()
    .stdout(predicate::str::contains("up to date"));
}

#[test]
fn verify_detects_edited_manifest() {
  let env = TestEnv::from_fixture("hello.yaml");
  env.write_stamped_bundle(env!("CARGO_PKG_VERSION"), "");
  let edited = std::fs::read_to_string(&env.manifest_path).unwrap().replace("0.1.0", "0.2.0");
  std::fs::write(&env.manifest_path, edited).unwrap();

  env
    .packwright_cmd()
    .arg("verify")
    .assert()
    .failure()
    .stderr(predicate::str::contains("out of date"));
}

#[test]
fn verify_notes_other_tool_version() {
  let env = TestEnv::from_fixture("hello.yaml");
  env.write_stamped_bundle("0.0.1", "deadbee");

  env
    .packwright_cmd()
    .arg("verify")
    .assert()
    .success()
    .stdout(predicate::str::contains("built by packwright 0.0.1"));
}

#[test]
fn verify_json_reports_digests() {
  let env = TestEnv::from_fixture("hello.yaml");
  env.write_stamped_bundle("0.3.0", "abc123");

  env
    .packwright_cmd()
    .args(["verify", "-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"upToDate\": true"));
}
