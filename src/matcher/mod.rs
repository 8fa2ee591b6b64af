//! 要求シリーズとルール/マスタの照合
//!
//! 読み込んだ表から RequestedName / MasterRecord を取り出し、
//! 共通ライブラリの照合ロジックに渡す。

mod types;

pub use types::*;

use crate::error::{Result, SeriesMatcherError};
use crate::reader::{self, Table};
use series_matcher_common::{
    match_series_with_progress, MasterRecord, MatchOptions, MatchReport, RequestedName,
};

/// 比較ファイルから要求名を取り出す
pub fn load_requested(table: &Table) -> Result<Vec<RequestedName>> {
    let column = table.find_column(REQUESTED_ALIASES).ok_or_else(|| {
        SeriesMatcherError::MissingColumns {
            file: table.source.clone(),
            columns: vec![REQUESTED_ALIASES[0].to_string()],
        }
    })?;

    Ok(table
        .column_values(column)
        .filter(|v| !v.is_empty())
        .map(RequestedName::new)
        .collect())
}

/// 表にマスタとして使える列（シリーズ名）があるか
pub fn has_master_columns(table: &Table) -> bool {
    table.find_column(SERIES_ALIASES).is_some()
}

/// ルール/マスタの表からマスタレコードを取り出す
///
/// 使用率列があればその値を、なければ使用回数列から全体に対する割合を使う。
pub fn load_master_records(table: &Table) -> Result<Vec<MasterRecord>> {
    let label_col = table.find_column(SERIES_ALIASES).ok_or_else(|| {
        SeriesMatcherError::MissingColumns {
            file: table.source.clone(),
            columns: vec![SERIES_ALIASES[0].to_string()],
        }
    })?;

    let labelled: Vec<(usize, &str)> = (0..table.len())
        .map(|i| (i, table.cell(i, label_col)))
        .filter(|(_, label)| !label.is_empty())
        .collect();

    if let Some(pct_col) = table.find_column(USAGE_PERCENT_ALIASES) {
        return labelled
            .into_iter()
            .map(|(i, label)| -> Result<MasterRecord> {
                let pct = parse_number(table, i, table.cell(i, pct_col))?;
                Ok(MasterRecord::new(label, pct))
            })
            .collect();
    }

    if let Some(count_col) = table.find_column(USAGE_COUNT_ALIASES) {
        let counts = labelled
            .iter()
            .map(|(i, _)| parse_number(table, *i, table.cell(*i, count_col)))
            .collect::<Result<Vec<f64>>>()?;
        let total: f64 = counts.iter().sum();

        return Ok(labelled
            .into_iter()
            .zip(counts)
            .map(|((_, label), count)| {
                let pct = if total > 0.0 { count / total * 100.0 } else { 0.0 };
                MasterRecord::new(label, pct)
            })
            .collect());
    }

    Err(SeriesMatcherError::MissingColumns {
        file: table.source.clone(),
        columns: vec![USAGE_PERCENT_ALIASES[0].to_string()],
    })
}

/// ルールファイルの MinUsagePercent 列の最大値
pub fn rules_threshold(table: &Table) -> Result<Option<f64>> {
    let Some(column) = table.find_column(MIN_USAGE_ALIASES) else {
        return Ok(None);
    };

    let mut max: Option<f64> = None;
    for i in 0..table.len() {
        let value = table.cell(i, column);
        if value.is_empty() {
            continue;
        }
        let value = parse_number(table, i, value)?;
        max = Some(max.map_or(value, |m| m.max(value)));
    }
    Ok(max)
}

/// 閾値を決定（明示指定 → ルールファイル → 既定値）
pub fn resolve_threshold(explicit: Option<f64>, rules: &Table, default: f64) -> Result<f64> {
    match explicit {
        Some(value) => Ok(value),
        None => Ok(rules_threshold(rules)?.unwrap_or(default)),
    }
}

/// 比較ファイルとルールファイルを照合
pub fn match_with_rules(
    comparison: &Table,
    rules: &Table,
    settings: &CompareSettings,
) -> Result<MatchReport> {
    match_with_rules_progress(comparison, rules, settings, |_, _, _| {})
}

/// 進捗コールバック付きで照合
pub fn match_with_rules_progress<F>(
    comparison: &Table,
    rules: &Table,
    settings: &CompareSettings,
    on_progress: F,
) -> Result<MatchReport>
where
    F: FnMut(usize, usize, &str),
{
    let requested = load_requested(comparison)?;
    let master = master_records_for(rules, settings)?;
    let threshold = resolve_threshold(settings.threshold, rules, settings.default_threshold)?;

    tracing::debug!(
        "照合開始: 要求{}件 / マスタ{}件 / 上位{}件 / 閾値{}%",
        requested.len(),
        master.len(),
        settings.top_n,
        threshold
    );

    let options = MatchOptions {
        top_n: settings.top_n,
        threshold,
    };
    let report = match_series_with_progress(&requested, &master, &options, on_progress)?;

    tracing::info!(
        "照合完了: 結果{}行 / 未一致{}件",
        report.results.len(),
        report.unmatched.len()
    );
    Ok(report)
}

/// ルールファイルにシリーズ名列がなければ保存済みマスタを使う
fn master_records_for(rules: &Table, settings: &CompareSettings) -> Result<Vec<MasterRecord>> {
    if has_master_columns(rules) {
        return load_master_records(rules);
    }

    match settings.master_path.as_deref() {
        Some(path) if path.exists() => {
            tracing::info!("ルールファイルにシリーズ名列がないため、マスタを使用: {}", path.display());
            let master = reader::read_table_from_path(path, Some(&settings.master_sheet))?;
            load_master_records(&master)
        }
        _ => Err(SeriesMatcherError::MissingColumns {
            file: rules.source.clone(),
            columns: vec![SERIES_ALIASES[0].to_string()],
        }),
    }
}

/// 数値セルを解析（末尾の%は無視、空欄は0）
fn parse_number(table: &Table, row_index: usize, value: &str) -> Result<f64> {
    let trimmed = value.trim().trim_end_matches('%').trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| {
            SeriesMatcherError::malformed(
                table.source.clone(),
                format!("データ{}行目の数値が不正です: '{}'", row_index + 1, value),
            )
        })
}
