//! Unit and behaviour tests for the `sift` engine.

mod matcher_tests;
mod search_tests;
mod support;
mod typescript_tests;
