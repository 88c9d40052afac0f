//! Shared setup for the `garnet` and `garnet-example` binaries

pub mod config;
pub mod logging;
