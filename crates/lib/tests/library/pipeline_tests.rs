use tokio_util::sync::CancellationToken;

use packwright_lib::build::{BuildError, BuildOptions, build};
use packwright_lib::bundle::read_bundle;
use packwright_lib::stamp::{Stamp, compute_digest};

use super::common::{Project, RecordingEngine, read};

const MANIFEST: &str = "name: mysql\nversion: 0.2.0\nimage: localhost:5000/mysql:v0.2.0\ndependencies:\n  - name: storage\nparameters:\n  - name: root-password\n    type: string\n  - name: port\n    type: integer\n    default: 3306\n    destination:\n      env: MYSQL_PORT\ncredentials:\n  - name: kubeconfig\n    path: /root/.kube/config\n";

fn options(project: &Project) -> BuildOptions {
  BuildOptions {
    manifest_path: project.dir().join("packwright.yaml"),
    context_dir: project.dir(),
    version: "0.3.0".to_string(),
    commit: "f00dcafe".to_string(),
    ..Default::default()
  }
}

#[tokio::test]
async fn full_build_produces_pinned_descriptor() {
  let project = Project::new(MANIFEST);
  project.install("storage/bundle.json", "{}");
  let engine = RecordingEngine::new("sha256:0123abcd");

  let mut progress = Vec::new();
  let outcome = build(&options(&project), &engine, &project.resolver(), &mut progress, &CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(outcome.image, "localhost:5000/mysql@sha256:0123abcd");
  assert_eq!(*engine.tags.lock().unwrap(), vec!["localhost:5000/mysql:v0.2.0".to_string()]);
  assert!(project.dir().join("cnab/app/bundles/storage/bundle.json").is_file());

  let bundle = read_bundle(&outcome.bundle_path).unwrap();
  let password = &bundle.parameters["root-password"];
  assert!(password.required);
  assert_eq!(password.destination.as_ref().unwrap().environment_variable, "ROOT-PASSWORD");
  let port = &bundle.parameters["port"];
  assert!(!port.required);
  assert_eq!(port.destination.as_ref().unwrap().environment_variable, "MYSQL_PORT");
  assert_eq!(bundle.credentials["kubeconfig"].path, "/root/.kube/config");
  assert!(bundle.credentials["kubeconfig"].environment_variable.is_empty());

  let stamp = Stamp::load(&bundle).unwrap();
  assert_eq!(stamp.manifest_digest, compute_digest(MANIFEST.as_bytes(), "0.3.0", "f00dcafe"));
  assert!(stamp.mixins.is_empty());
}

#[tokio::test]
async fn rebuild_overwrites_generated_files() {
  let project = Project::new("name: app\nimage: registry/app:v1\n");
  let engine = RecordingEngine::new("sha256:deadbeef");
  let opts = options(&project);

  std::fs::write(project.dir().join("Dockerfile"), "stale\n").unwrap();
  build(&opts, &engine, &project.resolver(), &mut Vec::new(), &CancellationToken::new())
    .await
    .unwrap();
  let first = read(&project.dir().join("bundle.json"));

  build(&opts, &engine, &project.resolver(), &mut Vec::new(), &CancellationToken::new())
    .await
    .unwrap();

  assert!(!read(&project.dir().join("Dockerfile")).contains("stale"));
  assert_eq!(read(&project.dir().join("bundle.json")), first);
}

#[tokio::test]
async fn custom_dockerfile_must_exist() {
  let project = Project::new("name: app\nimage: registry/app:v1\ndockerfile: Dockerfile.base\n");
  let engine = RecordingEngine::new("sha256:deadbeef");

  let err = build(&options(&project), &engine, &project.resolver(), &mut Vec::new(), &CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, BuildError::ScriptGeneration(_)));
  let cause = std::error::Error::source(&err).unwrap().to_string();
  assert!(cause.contains("Dockerfile.base"));
  assert!(engine.tags.lock().unwrap().is_empty());
}

#[tokio::test]
async fn custom_dockerfile_is_the_base_section() {
  let project = Project::new("name: app\nimage: registry/app:v1\ndockerfile: Dockerfile.base\n");
  std::fs::write(project.dir().join("Dockerfile.base"), "FROM alpine:3.20\nRUN apk add curl\n").unwrap();
  let engine = RecordingEngine::new("sha256:deadbeef");

  build(&options(&project), &engine, &project.resolver(), &mut Vec::new(), &CancellationToken::new())
    .await
    .unwrap();

  let dockerfile = read(&project.dir().join("Dockerfile"));
  assert!(dockerfile.starts_with("FROM alpine:3.20\nRUN apk add curl\n"));
  assert!(dockerfile.contains("COPY cnab/ /cnab/"));
  assert_eq!(read(&project.dir().join("cnab/app/packwright.yaml")), read(&project.dir().join("packwright.yaml")));
}

#[tokio::test]
async fn already_cancelled_build_does_nothing() {
  let project = Project::new("name: app\nimage: registry/app:v1\n");
  let engine = RecordingEngine::new("sha256:deadbeef");
  let cancel = CancellationToken::new();
  cancel.cancel();

  let err = build(&options(&project), &engine, &project.resolver(), &mut Vec::new(), &cancel)
    .await
    .unwrap_err();

  assert!(matches!(err, BuildError::Cancelled));
  assert!(engine.tags.lock().unwrap().is_empty());
  assert!(!project.dir().join("bundle.json").exists());
}
