pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod matcher;
pub mod reader;
pub mod server;
pub mod templates;
pub mod update;
