//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Workbook error: {0}")]
    Workbook(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
