use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn stamp_shows_version_and_mixins() {
  let env = TestEnv::from_fixture("hello.yaml");
  env.write_stamped_bundle("0.3.0", "abc123");

  env
    .packwright_cmd()
    .arg("stamp")
    .assert()
    .success()
    .stdout(predicate::str::contains("Version: 0.3.0"))
    .stdout(predicate::str::contains("Commit: abc123"))
    .stdout(predicate::str::contains("Mixins: exec"));
}

#[test]
fn stamp_prints_embedded_manifest() {
  let env = TestEnv::from_fixture("hello.yaml");
  env.write_stamped_bundle("0.3.0", "abc123");

  env
    .packwright_cmd()
    .args(["stamp", "--manifest"])
    .assert()
    .success()
    .stdout(predicate::str::contains("image: registry.example.com/hello:v0.1.0"));
}

#[test]
fn stamp_json_output_uses_wire_names() {
  let env = TestEnv::from_fixture("hello.yaml");
  env.write_stamped_bundle("0.3.0", "");

  env
    .packwright_cmd()
    .args(["stamp", "-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"manifestDigest\""))
    .stdout(predicate::str::contains("\"mixins\""));
}

#[test]
fn stamp_of_unstamped_bundle_fails() {
  let env = TestEnv::empty();
  env.write_file("bundle.json", r#"{"schemaVersion":"v1.0.0-WD","name":"bare","version":"0.1.0"}"#);

  env
    .packwright_cmd()
    .arg("stamp")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no packwright stamp"));
}

#[test]
fn stamp_with_list_shaped_value_fails() {
  let env = TestEnv::empty();
  env.write_file(
    "bundle.json",
    r#"{"schemaVersion":"v1.0.0-WD","name":"bad","version":"0.1.0","custom":{"sh.packwright/v1":["nope"]}}"#,
  );

  env
    .packwright_cmd()
    .arg("stamp")
    .assert()
    .failure()
    .stderr(predicate::str::contains("could not unmarshal"));
}
