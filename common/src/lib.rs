//! Series Matcher Common Library
//!
//! CLIとWebサーバで共有される型・類似度計算・照合ロジック

pub mod types;
pub mod layout;
pub mod error;
pub mod similarity;
pub mod ranking;
pub mod export;

pub use types::{MasterRecord, MatchOptions, MatchReport, MatchResult, RequestedName, TableCell};
pub use error::{Error, Result};
pub use similarity::{normalize_series, similarity_ratio};
pub use ranking::{match_series, match_series_with_progress, validate_options};
