use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesMatcherError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("未対応のファイル形式です: {0}（xlsx / xls / ods / csv を使用してください）")]
    UnsupportedFormat(String),

    #[error("ファイルの読み込みに失敗: {file}: {message}")]
    MalformedFile { file: String, message: String },

    #[error("必須列がありません: {file}: {columns:?}")]
    MissingColumns { file: String, columns: Vec<String> },

    #[error("ファイルがアップロードされていません: {0}")]
    MissingUpload(String),

    #[error("入力値が不正: {0}")]
    InvalidParameter(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] series_matcher_common::Error),
}

impl SeriesMatcherError {
    pub fn malformed(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedFile {
            file: file.into(),
            message: message.into(),
        }
    }

    /// 利用者の入力に起因するエラーか（Webでは400系で返す）
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::UnsupportedFormat(_)
            | Self::MalformedFile { .. }
            | Self::MissingColumns { .. }
            | Self::MissingUpload(_)
            | Self::InvalidParameter(_)
            | Self::Csv(_) => true,
            Self::Common(series_matcher_common::Error::InvalidParameter(_)) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SeriesMatcherError>;
