use series_matcher_common::layout::{
    MIN_USAGE_PERCENT, REQUESTED_SERIES, SERIES_NAME, USAGE_COUNT, USAGE_PERCENT,
};
use std::path::PathBuf;

/// 比較ファイルの要求シリーズ列の別名（先頭優先）
pub const REQUESTED_ALIASES: &[&str] = &[REQUESTED_SERIES, "Requested", "RequestedName", "Series"];
/// マスタのシリーズ名列の別名
pub const SERIES_ALIASES: &[&str] = &[SERIES_NAME, "MasterSeries", "Series"];
/// 使用率列の別名
pub const USAGE_PERCENT_ALIASES: &[&str] = &[USAGE_PERCENT, "Usage%", "UsagePct"];
/// 使用回数列の別名
pub const USAGE_COUNT_ALIASES: &[&str] = &[USAGE_COUNT];
/// 閾値列の別名
pub const MIN_USAGE_ALIASES: &[&str] = &[MIN_USAGE_PERCENT];

/// 照合の設定
#[derive(Debug, Clone)]
pub struct CompareSettings {
    pub top_n: usize,
    /// 明示指定の閾値（Noneならルールファイル→既定値の順で決定）
    pub threshold: Option<f64>,
    pub default_threshold: f64,
    /// ルールファイルにシリーズ名列がない場合に使うマスタ
    pub master_path: Option<PathBuf>,
    pub master_sheet: String,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            top_n: series_matcher_common::types::DEFAULT_TOP_N,
            threshold: None,
            default_threshold: 0.0,
            master_path: None,
            master_sheet: "Master".into(),
        }
    }
}
