//! pagecraft command-line library

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod commands;

pub use cli::{run, Cli, Commands};
pub use commands::Context;
