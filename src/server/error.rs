use super::html;
use crate::error::SeriesMatcherError;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::fmt;

/// Webハンドラのエラー（HTMLのエラーページとして返す）
#[derive(Debug)]
pub enum AppError {
    App(SeriesMatcherError),
    Upload { status: StatusCode, message: String },
    Query { status: StatusCode, message: String },
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::App(SeriesMatcherError::FileNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::App(err) if err.is_user_error() => StatusCode::BAD_REQUEST,
            AppError::App(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upload { status, .. } | AppError::Query { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::App(err) => write!(f, "{}", err),
            AppError::Upload { message, .. } => write!(f, "アップロードエラー: {}", message),
            AppError::Query { message, .. } => write!(f, "クエリパラメータエラー: {}", message),
            AppError::Internal(msg) => write!(f, "内部エラー: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<SeriesMatcherError> for AppError {
    fn from(err: SeriesMatcherError) -> Self {
        AppError::App(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Upload {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        AppError::Query {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("{} {}", status.as_u16(), message);
        } else {
            crate::logging::log_user_error("リクエストエラー", &message);
        }

        (status, Html(html::error_page(status, &message))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
