//! Web UI（axum）
//!
//! 比較ファイル・ルールファイルをアップロードして照合し、結果をその場で表示する。
//! 結果Excelはdata URIで返すため、サーバ側に状態は持たない。

pub mod error;
mod handlers;
pub mod html;

use crate::config::Config;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// マスタ更新の排他
    pub update_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            update_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let limit = state.config.max_upload_bytes();

    Router::new()
        .route("/", get(handlers::index))
        .route("/compare", post(handlers::compare))
        .route("/templates/:kind", get(handlers::template))
        .route("/update", post(handlers::update))
        .route("/master", get(handlers::master))
        .route("/master/download", get(handlers::master_download))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
}

/// サーバを起動（Ctrl+Cで終了）
pub async fn serve(config: Config, addr: &str) -> crate::error::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("{} で待ち受けできません: {}", addr, e);
        e
    })?;

    crate::logging::log_server_startup(addr);
    tracing::info!("マスタ: {}", config.master_path.display());

    let app = router(AppState::new(config));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("サーバを停止しました");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("シグナル待機に失敗: {}", e);
    }
}
