mod build;
mod resolve;

pub use build::cmd_build;
pub use resolve::cmd_resolve;
