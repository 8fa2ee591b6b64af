//! Export core modules shared across the CLI and the web server.

#[cfg(feature = "excel")]
pub mod excel_core;
