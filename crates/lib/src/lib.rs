//! gotip-lib: installs the Go tip toolchain into a buildpack layer.
//!
//! This crate holds everything the `gotip-buildpack` binary does:
//! - `Build`: the staged pipeline that bootstraps `gotip` from a released Go
//! - `dependency`: resolving and delivering toolchains listed in `buildpack.toml`
//! - `Layers`: the directory-backed layer store handed over by the platform
//! - `Environment`: copy-on-write process environments for each subprocess

pub mod build;
pub mod buildpack;
pub mod consts;
pub mod context;
pub mod dependency;
pub mod env;
pub mod exec;
pub mod layers;
pub mod logs;
pub mod plan;
pub mod util;
