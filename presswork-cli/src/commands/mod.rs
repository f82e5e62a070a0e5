//! CLI command implementations.

pub mod build;
pub mod index;
pub mod init;

pub use build::{build_site, PathOverrides};
pub use index::list_index;
pub use init::init_project;
