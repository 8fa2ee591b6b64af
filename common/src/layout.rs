//! ワークブックの列定義
//!
//! 結果ファイル・テンプレートで使う見出しと列幅をまとめて定義する。
//! 入力側の列名もここを参照する。

/// 列定義
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub header: &'static str,
    /// Excelの列幅（文字数単位）
    pub width: f64,
}

const fn col(header: &'static str, width: f64) -> ColumnDef {
    ColumnDef { header, width }
}

pub const REQUESTED_SERIES: &str = "RequestedSeries";
pub const SERIES_NAME: &str = "SeriesName";
pub const SIMILARITY_SCORE: &str = "SimilarityScore";
pub const USAGE_PERCENT: &str = "UsagePercent";
pub const USAGE_COUNT: &str = "UsageCount";
pub const MIN_USAGE_PERCENT: &str = "MinUsagePercent";
pub const RANK: &str = "Rank";

/// 結果シート名
pub const MATCHES_SHEET: &str = "Matches";
/// 未一致シート名
pub const UNMATCHED_SHEET: &str = "Unmatched";

/// 結果シートの列
pub const RESULT_COLUMNS: &[ColumnDef] = &[
    col(REQUESTED_SERIES, 32.0),
    col(SERIES_NAME, 32.0),
    col(SIMILARITY_SCORE, 16.0),
    col(USAGE_PERCENT, 14.0),
    col(RANK, 8.0),
];

/// 未一致シートの列
pub const UNMATCHED_COLUMNS: &[ColumnDef] = &[col(REQUESTED_SERIES, 32.0)];

/// 比較ファイル（要求シリーズ）テンプレートの列
pub const INPUT_TEMPLATE_COLUMNS: &[ColumnDef] = &[col(REQUESTED_SERIES, 32.0)];

/// ルールファイルテンプレートの列
pub const RULES_TEMPLATE_COLUMNS: &[ColumnDef] = &[
    col(SERIES_NAME, 32.0),
    col(USAGE_PERCENT, 14.0),
    col(MIN_USAGE_PERCENT, 18.0),
];

/// マスタ履歴テンプレートの列
pub const MASTER_TEMPLATE_COLUMNS: &[ColumnDef] = &[
    col("VariantID", 14.0),
    col("ManufacturerName", 24.0),
    col("Manufacturer Part Number", 26.0),
    col("Category", 18.0),
    col("Family", 18.0),
    col(REQUESTED_SERIES, 24.0),
    col(SERIES_NAME, 24.0),
    col(USAGE_COUNT, 12.0),
];

/// 更新入力テンプレートの列（MPNなし）
pub const UPDATE_TEMPLATE_COLUMNS: &[ColumnDef] = &[
    col("VariantID", 14.0),
    col("ManufacturerName", 24.0),
    col("Category", 18.0),
    col("Family", 18.0),
    col(REQUESTED_SERIES, 24.0),
    col("is delete", 10.0),
];

/// 列定義から見出しだけを取り出す
pub fn headers(columns: &[ColumnDef]) -> Vec<&'static str> {
    columns.iter().map(|c| c.header).collect()
}
