//! Batch driver for clearinghouse remittance files.
//!
//! The binary (`remessa`) is a thin layer over these modules; the pipeline
//! functions can be called directly by other tools and by tests.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod rewrite;
pub mod types;
