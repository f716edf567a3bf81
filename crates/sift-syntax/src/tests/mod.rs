//! Unit tests for sift-syntax.

mod unit;
