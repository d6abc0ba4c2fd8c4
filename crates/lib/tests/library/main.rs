//! End-to-end tests for the gotip build against real processes.
//!
//! The base toolchain is a tarball holding a fake `go` shell script, so these
//! only run where `/bin/sh` exists.
#![cfg(unix)]

mod common;
mod pipeline_tests;
