//! Unit tests for `sift_core` types.

mod diagnostic_tests;
mod mode_tests;
