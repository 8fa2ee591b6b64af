//! 照合の型定義
//!
//! CLIとWebサーバで共有される型:
//! - RequestedName: 比較ファイルの要求シリーズ名
//! - MasterRecord: ルール/マスタのシリーズ名と使用率
//! - MatchResult: 照合結果の1行
//! - MatchReport: 照合結果全体（未一致リストを含む）

/// 上位件数の最小値
pub const MIN_TOP_N: usize = 1;
/// 上位件数の最大値
pub const MAX_TOP_N: usize = 50;
/// 上位件数のデフォルト
pub const DEFAULT_TOP_N: usize = 5;

/// 比較ファイルの要求シリーズ名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestedName(pub String);

impl RequestedName {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// マスタレコード（シリーズ名 + 使用率%）
#[derive(Debug, Clone, PartialEq)]
pub struct MasterRecord {
    pub label: String,
    pub usage_percent: f64,
}

impl MasterRecord {
    pub fn new(label: impl Into<String>, usage_percent: f64) -> Self {
        Self {
            label: label.into(),
            usage_percent,
        }
    }
}

/// 照合結果の1行
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub requested: String,
    pub master_label: String,
    /// 類似度（0-100、小数2桁）
    pub score: f64,
    pub usage_percent: f64,
    /// 要求名ごとの順位（1始まり）
    pub rank: usize,
}

/// 表形式ブックに書き出すセル値
#[derive(Debug, Clone, PartialEq)]
pub enum TableCell {
    Text(String),
    Number(f64),
}

/// 照合パラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub top_n: usize,
    /// 使用率の下限（0-100）
    pub threshold: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            threshold: 0.0,
        }
    }
}

/// 照合結果全体
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    pub results: Vec<MatchResult>,
    /// 閾値を通過する候補がなかった要求名
    pub unmatched: Vec<String>,
    pub top_n: usize,
    pub threshold: f64,
    /// 照合した要求名の数
    pub requested_count: usize,
}

impl MatchReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// 要求名ごとの結果を取得
    pub fn results_for<'a>(&'a self, requested: &'a str) -> impl Iterator<Item = &'a MatchResult> + 'a {
        self.results.iter().filter(move |r| r.requested == requested)
    }
}
