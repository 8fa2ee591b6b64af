//! 更新処理の監査ログ

use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const AUDIT_COLUMNS: [&str; 6] = ["timestamp", "action", "key", "old_value", "new_value", "comment"];

/// 監査ログのアクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// 必須列不足でファイル全体を拒否
    RejectFile,
    /// キー列が空の行を無視
    SkipRow,
    /// マスタに該当キーなし
    NoMatch,
    Delete,
    /// 値が同一のため更新なし
    NoChange,
    Update,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::RejectFile => "reject_file",
            AuditAction::SkipRow => "skip_row",
            AuditAction::NoMatch => "no_match",
            AuditAction::Delete => "delete",
            AuditAction::NoChange => "no_change",
            AuditAction::Update => "update",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub timestamp: String,
    pub action: AuditAction,
    pub key: String,
    pub old_value: String,
    pub new_value: String,
    pub comment: String,
}

impl AuditEntry {
    pub fn new(
        action: AuditAction,
        key: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            action,
            key: key.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
            comment: comment.into(),
        }
    }
}

/// 監査ログをCSVで書き出す（update_log_YYYYmmdd_HHMMSS.csv）
///
/// 同じ秒に既存のログがあれば `_1`, `_2`, ... を付けた名前で新規作成する。
pub fn write_audit_log(log_dir: &Path, entries: &[AuditEntry]) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    let stem = format!("update_log_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let (path, file) = create_unique(log_dir, &stem)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(file);

    writer.write_record(AUDIT_COLUMNS)?;
    for entry in entries {
        writer.write_record([
            entry.timestamp.as_str(),
            entry.action.as_str(),
            entry.key.as_str(),
            entry.old_value.as_str(),
            entry.new_value.as_str(),
            entry.comment.as_str(),
        ])?;
    }
    writer.flush()?;

    Ok(path)
}

fn create_unique(dir: &Path, stem: &str) -> Result<(PathBuf, File)> {
    let mut suffix = 0usize;
    loop {
        let name = if suffix == 0 {
            format!("{}.csv", stem)
        } else {
            format!("{}_{}.csv", stem, suffix)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
