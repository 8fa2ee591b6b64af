//! ログ初期化
//!
//! RUST_LOG があればそれを優先し、なければ通常は info、`--verbose` で debug。

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "series_matcher=info,series_matcher_common=info,tower_http=info";
const VERBOSE_FILTER: &str = "series_matcher=debug,series_matcher_common=debug,tower_http=debug";

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// ログ出力を初期化（二重初期化は無視）
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

pub fn log_server_startup(addr: &str) {
    tracing::info!("series-matcher Webサーバ起動: http://{}", addr);
}

pub fn log_compare_request(comparison: &str, rules: &str, top_n: usize) {
    tracing::info!("照合リクエスト: 比較={} ルール={} 上位{}件", comparison, rules, top_n);
}

pub fn log_update_request(file: &str, dry_run: bool) {
    tracing::info!("更新リクエスト: {}{}", file, if dry_run { " (dry-run)" } else { "" });
}

pub fn log_user_error(context: &str, message: &str) {
    tracing::warn!("{}: {}", context, message);
}
