//! Command-line front end for the nonconformance report builder.
//!
//! The binary is a thin wrapper around [`cli::run`]; the argument surface
//! lives in the library so integration tests can drive it directly.

pub mod cli;
