use packwright_lib::bundle::{Bundle, read_bundle, write_bundle};
use packwright_lib::stamp::{Stamp, StampError, compute_digest};

const MANIFEST: &[u8] = b"name: hello\nimage: registry/app:v1\nmixins:\n  - exec\n";

#[test]
fn digest_is_deterministic_and_sensitive() {
  let base = compute_digest(MANIFEST, "1.0.0", "abc");
  assert_eq!(base, compute_digest(MANIFEST, "1.0.0", "abc"));
  assert_eq!(base.len(), 64);

  assert_ne!(base, compute_digest(b"name: other\n", "1.0.0", "abc"));
  assert_ne!(base, compute_digest(MANIFEST, "1.0.1", "abc"));
  assert_ne!(base, compute_digest(MANIFEST, "1.0.0", "abd"));
}

#[test]
fn stamp_survives_write_and_read() {
  let temp = tempfile::TempDir::new().unwrap();
  let stamp = Stamp::generate(MANIFEST, "1.0.0", "abc", ["exec"]);
  let mut bundle = Bundle {
    name: "hello".to_string(),
    version: "0.1.0".to_string(),
    ..Default::default()
  };
  stamp.embed(&mut bundle).unwrap();

  let path = write_bundle(temp.path(), &bundle).unwrap();
  let loaded = Stamp::load(&read_bundle(&path).unwrap()).unwrap();

  assert_eq!(loaded, stamp);
  assert_eq!(loaded.decode_manifest().unwrap(), MANIFEST);
}

#[test]
fn empty_manifest_field_is_no_manifest() {
  let stamp = Stamp {
    manifest_digest: "abc".to_string(),
    ..Default::default()
  };
  assert!(matches!(stamp.decode_manifest(), Err(StampError::NoManifest)));
}

#[test]
fn invalid_base64_is_invalid_encoding() {
  let stamp = Stamp {
    encoded_manifest: "%%% not base64 %%%".to_string(),
    ..Default::default()
  };
  assert!(matches!(stamp.decode_manifest(), Err(StampError::InvalidEncoding(_))));
}
