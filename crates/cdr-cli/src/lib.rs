//! Library components of the `cdr` command line.

pub mod config;
pub mod logging;
pub mod orchestrate;
pub mod summary;
