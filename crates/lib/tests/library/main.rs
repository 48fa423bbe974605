//! Library-level tests driving the public pipeline API.

mod common;
mod pipeline_tests;
mod stamp_tests;
