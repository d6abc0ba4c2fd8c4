//! Build command integration tests.
#![cfg(unix)]

mod build_tests;
mod common;
