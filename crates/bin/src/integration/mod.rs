//! Integration layer between the CLI and the library crates.

pub(crate) mod data_pipeline;
