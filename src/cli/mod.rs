//! Command-line interface module.

mod args;
pub mod export;

pub use args::Cli;
