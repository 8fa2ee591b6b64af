//! マスタ履歴の更新・削除
//!
//! 入力ファイルの各行を (VariantID, ManufacturerName, Category, Family) のキーで
//! マスタと突き合わせ、RequestedSeries を更新するか該当行を削除する。
//!
//! ## ルール
//! - 必須列が1つでも欠けていればファイル全体を拒否（マスタは変更しない）
//! - キー列が空の行は無視
//! - マスタにキーがなければ追加しない
//! - RequestedSeries が同一（大文字小文字を区別）なら更新しない
//! - 同じキーの行が複数あれば全てに適用

pub mod audit;

pub use audit::{AuditAction, AuditEntry};

use crate::error::{Result, SeriesMatcherError};
use crate::reader::{self, Table};
use series_matcher_common::export::excel_core;
use series_matcher_common::layout::REQUESTED_SERIES;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const KEY_COLUMNS: [&str; 4] = ["VariantID", "ManufacturerName", "Category", "Family"];
pub const DELETE_COLUMN: &str = "is delete";
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "VariantID",
    "ManufacturerName",
    "Category",
    "Family",
    REQUESTED_SERIES,
    DELETE_COLUMN,
];

const TRUTHY: &[&str] = &["1", "true", "yes", "y", "t"];

/// 更新オプション
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub master_path: PathBuf,
    pub sheet: String,
    pub log_dir: PathBuf,
    /// マスタを書き換えずに監査ログだけ出力
    pub dry_run: bool,
}

/// 更新結果
#[derive(Debug, Clone, Default)]
pub struct UpdateSummary {
    pub updates: usize,
    pub deletions: usize,
    pub skipped: usize,
    /// 入力ファイルに不足していた必須列（空でなければ拒否）
    pub missing_columns: Vec<String>,
    pub audit: Vec<AuditEntry>,
    pub audit_path: Option<PathBuf>,
    pub master_written: bool,
}

impl UpdateSummary {
    pub fn is_rejected(&self) -> bool {
        !self.missing_columns.is_empty()
    }
}

/// 1 / true / yes / y / t（大文字小文字を区別しない）を真とみなす
pub fn is_truthy(value: &str) -> bool {
    TRUTHY.contains(&value.trim().to_lowercase().as_str())
}

/// 入力ファイルの行数と削除行数
pub fn count_actions(input: &Table) -> (usize, usize) {
    let deletes = input
        .exact_column(DELETE_COLUMN)
        .map(|col| input.column_values(col).filter(|v| is_truthy(v)).count())
        .unwrap_or(0);
    (input.len(), deletes)
}

/// 更新を実行（監査ログを書き出し、dry_runでなければマスタを保存）
pub fn run_update(input: &Table, options: &UpdateOptions) -> Result<UpdateSummary> {
    let missing = input.missing_columns(&REQUIRED_COLUMNS);
    if !missing.is_empty() {
        tracing::warn!("必須列不足のため拒否: {:?}", missing);
        let entry = AuditEntry::new(
            AuditAction::RejectFile,
            "",
            "",
            "",
            format!("Rejected: missing required columns {:?}", missing),
        );
        let audit_path = audit::write_audit_log(&options.log_dir, std::slice::from_ref(&entry))?;
        return Ok(UpdateSummary {
            missing_columns: missing,
            audit: vec![entry],
            audit_path: Some(audit_path),
            ..Default::default()
        });
    }

    let mut master = load_master(&options.master_path, &options.sheet)?;
    let mut summary = apply_updates(input, &mut master);

    summary.audit_path = Some(audit::write_audit_log(&options.log_dir, &summary.audit)?);

    if options.dry_run {
        tracing::info!(
            "[DRY-RUN] updates={}, deletions={}, skipped={}",
            summary.updates,
            summary.deletions,
            summary.skipped
        );
        return Ok(summary);
    }

    save_master(&master, &options.master_path, &options.sheet)?;
    summary.master_written = true;
    tracing::info!(
        "マスタ更新: {} (updates={}, deletions={}, skipped={})",
        options.master_path.display(),
        summary.updates,
        summary.deletions,
        summary.skipped
    );
    Ok(summary)
}

/// マスタを読み込む（ファイルがなければキー列だけの空マスタ）
pub fn load_master(path: &Path, sheet: &str) -> Result<Table> {
    let mut master = if path.exists() {
        reader::read_table_from_path(path, Some(sheet))?
    } else {
        tracing::warn!("マスタが見つからないため空のマスタを作成します: {}", path.display());
        Table {
            source: path.display().to_string(),
            sheet: Some(sheet.to_string()),
            ..Default::default()
        }
    };

    ensure_columns(&mut master);
    Ok(master)
}

/// マスタを書き出す
pub fn save_master(master: &Table, path: &Path, sheet: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let buffer = excel_core::generate_table_buffer(sheet, &master.headers, &master.typed_rows())
        .map_err(|e| SeriesMatcherError::ExcelGeneration(e.to_string()))?;
    std::fs::write(path, buffer)?;
    Ok(())
}

/// マスタの先頭N行
pub fn preview_master(path: &Path, sheet: &str, rows: usize) -> Result<Table> {
    if !path.exists() {
        return Err(SeriesMatcherError::FileNotFound(path.display().to_string()));
    }
    let mut master = reader::read_table_from_path(path, Some(sheet))?;
    master.truncate(rows);
    Ok(master)
}

/// キー列・RequestedSeries列を補い、値の前後空白を除去
fn ensure_columns(master: &mut Table) {
    for name in KEY_COLUMNS.iter().chain(std::iter::once(&REQUESTED_SERIES)) {
        if master.exact_column(name).is_none() {
            master.headers.push(name.to_string());
        }
    }

    let width = master.headers.len();
    for row in &mut master.rows {
        row.resize(width, String::new());
        for cell in row.iter_mut() {
            let trimmed = cell.trim();
            if trimmed.len() != cell.len() {
                *cell = trimmed.to_string();
            }
        }
    }
}

/// 入力行をマスタに適用（ファイル入出力なし）
pub fn apply_updates(input: &Table, master: &mut Table) -> UpdateSummary {
    let mut summary = UpdateSummary::default();

    let input_keys: Vec<usize> = KEY_COLUMNS
        .iter()
        .filter_map(|k| input.exact_column(k))
        .collect();
    let input_series = input.exact_column(REQUESTED_SERIES);
    let input_delete = input.exact_column(DELETE_COLUMN);
    let (Some(input_series), Some(input_delete)) = (input_series, input_delete) else {
        return summary;
    };
    if input_keys.len() != KEY_COLUMNS.len() {
        return summary;
    }

    ensure_columns(master);
    let master_keys: Vec<usize> = KEY_COLUMNS
        .iter()
        .filter_map(|k| master.exact_column(k))
        .collect();
    let Some(master_series) = master.exact_column(REQUESTED_SERIES) else {
        return summary;
    };

    let mut index: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
    for i in 0..master.len() {
        let key = master_keys.iter().map(|&c| master.cell(i, c).to_string()).collect();
        index.entry(key).or_default().push(i);
    }

    let mut to_delete: HashSet<usize> = HashSet::new();

    for row in 0..input.len() {
        let key: Vec<String> = input_keys
            .iter()
            .map(|&c| input.cell(row, c).to_string())
            .collect();
        let key_label = key.join("|");
        let new_series = input.cell(row, input_series).to_string();

        if key.iter().any(|k| k.is_empty()) {
            summary.audit.push(AuditEntry::new(
                AuditAction::SkipRow,
                key_label,
                "",
                "",
                "Row skipped: one or more key fields are blank.",
            ));
            summary.skipped += 1;
            continue;
        }

        let Some(indices) = index.get(&key) else {
            summary.audit.push(AuditEntry::new(
                AuditAction::NoMatch,
                key_label,
                "",
                new_series,
                "No matching row in master; no action taken.",
            ));
            summary.skipped += 1;
            continue;
        };

        let old_values: Vec<String> = indices
            .iter()
            .map(|&i| master.cell(i, master_series).to_string())
            .collect();

        if is_truthy(input.cell(row, input_delete)) {
            to_delete.extend(indices.iter().copied());
            summary.deletions += indices.len();
            summary.audit.push(AuditEntry::new(
                AuditAction::Delete,
                key_label,
                old_values.join(";"),
                "",
                format!("Deleted {} row(s) by key.", indices.len()),
            ));
            continue;
        }

        if old_values.iter().all(|v| *v == new_series) {
            summary.audit.push(AuditEntry::new(
                AuditAction::NoChange,
                key_label,
                old_values[0].clone(),
                new_series,
                "RequestedSeries identical (case-sensitive); no update.",
            ));
            summary.skipped += 1;
            continue;
        }

        for &i in indices {
            master.set_cell(i, master_series, new_series.clone());
        }
        summary.updates += indices.len();
        summary.audit.push(AuditEntry::new(
            AuditAction::Update,
            key_label,
            old_values.join(";"),
            new_series,
            format!("Updated RequestedSeries on {} row(s).", indices.len()),
        ));
    }

    if !to_delete.is_empty() {
        master.retain_rows(|i| !to_delete.contains(&i));
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(data: &[&[&str]]) -> Table {
        let rows = data
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        Table::from_rows("test.csv", None, rows)
    }

    fn sample_master() -> Table {
        table(&[
            &["VariantID", "ManufacturerName", "Category", "Family", "RequestedSeries", "UsageCount"],
            &["1", "Acme", "Cap", "X7R", "AC-1", "3"],
            &["1", "Acme", "Cap", "X7R", "AC-1", "4"],
            &["2", "Zen", "Res", "Thick", "ZR", "1"],
        ])
    }

    const INPUT_HEADER: &[&str] = &["VariantID", "ManufacturerName", "Category", "Family", "RequestedSeries", "is delete"];

    #[test]
    fn test_is_truthy() {
        for v in ["1", "TRUE", " yes ", "Y", "t"] {
            assert!(is_truthy(v), "{} は削除扱い", v);
        }
        for v in ["0", "", "no", "false", "delete"] {
            assert!(!is_truthy(v), "{} は更新扱い", v);
        }
    }

    #[test]
    fn test_update_applies_to_all_keyed_rows() {
        let mut master = sample_master();
        let input = table(&[INPUT_HEADER, &["1", "Acme", "Cap", "X7R", "AC-2", ""]]);

        let summary = apply_updates(&input, &mut master);
        assert_eq!(summary.updates, 2);
        assert_eq!(summary.audit[0].action, AuditAction::Update);
        assert_eq!(summary.audit[0].old_value, "AC-1;AC-1");
        assert_eq!(master.rows[0][4], "AC-2");
        assert_eq!(master.rows[1][4], "AC-2");
        assert_eq!(master.rows[2][4], "ZR");
    }

    #[test]
    fn test_delete_removes_keyed_rows() {
        let mut master = sample_master();
        let input = table(&[INPUT_HEADER, &["1", "Acme", "Cap", "X7R", "", "yes"]]);

        let summary = apply_updates(&input, &mut master);
        assert_eq!(summary.deletions, 2);
        assert_eq!(master.len(), 1);
        assert_eq!(master.rows[0][0], "2");
    }

    #[test]
    fn test_identical_series_is_no_change() {
        let mut master = sample_master();
        let input = table(&[INPUT_HEADER, &["2", "Zen", "Res", "Thick", "ZR", "0"]]);

        let summary = apply_updates(&input, &mut master);
        assert_eq!(summary.updates, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.audit[0].action, AuditAction::NoChange);
    }

    #[test]
    fn test_case_sensitive_update() {
        let mut master = sample_master();
        let input = table(&[INPUT_HEADER, &["2", "Zen", "Res", "Thick", "zr", ""]]);

        let summary = apply_updates(&input, &mut master);
        assert_eq!(summary.updates, 1);
        assert_eq!(master.rows[2][4], "zr");
    }

    #[test]
    fn test_unknown_key_and_blank_key() {
        let mut master = sample_master();
        let input = table(&[
            INPUT_HEADER,
            &["9", "Nobody", "Cap", "X7R", "N", ""],
            &["", "Acme", "Cap", "X7R", "AC-9", ""],
        ]);

        let summary = apply_updates(&input, &mut master);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.audit[0].action, AuditAction::NoMatch);
        assert_eq!(summary.audit[1].action, AuditAction::SkipRow);
        assert_eq!(master.rows[0][4], "AC-1");
    }

    #[test]
    fn test_ensure_columns_on_empty_master() {
        let mut master = Table::default();
        ensure_columns(&mut master);
        assert_eq!(master.headers, vec!["VariantID", "ManufacturerName", "Category", "Family", "RequestedSeries"]);
    }

    #[test]
    fn test_count_actions() {
        let input = table(&[INPUT_HEADER, &["1", "A", "B", "C", "S", "1"], &["2", "A", "B", "C", "S", "0"]]);
        assert_eq!(count_actions(&input), (2, 1));
    }
}
