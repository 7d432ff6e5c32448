//! Utility modules shared by the export pipeline.

pub mod exec;
pub mod path;
