//! CLI integration tests.

mod build_tests;
mod common;
mod stamp_tests;
mod verify_tests;
