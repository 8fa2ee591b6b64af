//! 表形式ファイル読み込みモジュール
//!
//! xlsx / xlsm / xls / xlsb / ods は calamine、csv は csv クレートで読み込み、
//! 先頭の空でない行を見出しとする文字列の表に変換する。

mod delimited;
mod workbook;

use crate::error::{Result, SeriesMatcherError};
use regex::Regex;
use series_matcher_common::TableCell;
use std::path::Path;

lazy_static::lazy_static! {
    static ref HEADER_NOISE: Regex = Regex::new(r"[\s_\-]+").unwrap();
}

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// 読み込んだ表
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// 元ファイル名（エラーメッセージ用）
    pub source: String,
    /// 読み込んだシート名（csvはNone）
    pub sheet: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// `rows` と同じ形の数値セルフラグ（ブックの数値セルのみ true）
    pub(crate) numeric: Vec<Vec<bool>>,
}

impl Table {
    /// 生の行データから表を組み立てる
    ///
    /// 先頭の空でない行を見出しとし、以降の空行は捨てる。
    pub fn from_rows(source: &str, sheet: Option<String>, raw: Vec<Vec<String>>) -> Self {
        let typed = raw
            .into_iter()
            .map(|row| row.into_iter().map(|value| (value, false)).collect())
            .collect();
        Self::from_typed_rows(source, sheet, typed)
    }

    /// (値, 数値セルか) の行データから表を組み立てる
    pub(crate) fn from_typed_rows(source: &str, sheet: Option<String>, raw: Vec<Vec<(String, bool)>>) -> Self {
        let mut rows = raw
            .into_iter()
            .filter(|row| row.iter().any(|(cell, _)| !cell.trim().is_empty()));

        let headers = rows
            .next()
            .map(|row| row.into_iter().map(|(h, _)| h.trim().to_string()).collect())
            .unwrap_or_default();

        let (rows, numeric) = rows.map(|row| row.into_iter().unzip::<_, _, Vec<_>, Vec<_>>()).unzip();

        Self {
            source: source.to_string(),
            sheet,
            headers,
            rows,
            numeric,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 見出し名で列を検索（大文字小文字・空白・アンダースコアを無視）
    ///
    /// 別名は先に挙げたものを優先する。
    pub fn find_column(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            let wanted = header_key(alias);
            self.headers.iter().position(|h| header_key(h) == wanted)
        })
    }

    /// 見出し名で列を検索（完全一致）
    pub fn exact_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 完全一致で見つからない見出しを返す
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.exact_column(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    /// セル値（範囲外は空文字）
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// 元のブックで数値セルだったか（csv由来・書き換え後は false）
    pub fn is_number(&self, row: usize, column: usize) -> bool {
        self.numeric
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(false)
    }

    /// セル値を書き換える（文字列セルになる）
    pub fn set_cell(&mut self, row: usize, column: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = value;
        }
        if let Some(flag) = self.numeric.get_mut(row).and_then(|r| r.get_mut(column)) {
            *flag = false;
        }
    }

    /// 行番号で残す行を選ぶ
    pub fn retain_rows(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let rows = std::mem::take(&mut self.rows);
        let mut numeric = std::mem::take(&mut self.numeric).into_iter();
        for (i, row) in rows.into_iter().enumerate() {
            let flags = numeric.next().unwrap_or_default();
            if keep(i) {
                self.rows.push(row);
                self.numeric.push(flags);
            }
        }
    }

    pub fn truncate(&mut self, len: usize) {
        self.rows.truncate(len);
        self.numeric.truncate(len);
    }

    /// 書き出し用のセル値
    ///
    /// 数値セルだったものだけを数値にし、それ以外は文字列のまま返す。
    pub fn typed_rows(&self) -> Vec<Vec<TableCell>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, value)| match value.parse::<f64>() {
                        Ok(n) if self.is_number(r, c) && n.is_finite() => TableCell::Number(n),
                        _ => TableCell::Text(value.clone()),
                    })
                    .collect()
            })
            .collect()
    }

    /// 列の値を上から順に取得
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(column).map(|s| s.trim()).unwrap_or(""))
    }
}

fn header_key(name: &str) -> String {
    HEADER_NOISE.replace_all(name.trim(), "").to_lowercase()
}

/// ファイルパスから表を読み込む
pub fn read_table_from_path(path: &Path, sheet: Option<&str>) -> Result<Table> {
    if !path.exists() {
        return Err(SeriesMatcherError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    read_table_from_bytes(&file_name, bytes, sheet)
}

/// アップロードされたバイト列から表を読み込む（拡張子で形式を判定）
pub fn read_table_from_bytes(file_name: &str, bytes: Vec<u8>, sheet: Option<&str>) -> Result<Table> {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if extension == "csv" {
        delimited::parse(file_name, &bytes)
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        workbook::parse(file_name, bytes, sheet)
    } else {
        Err(SeriesMatcherError::UnsupportedFormat(file_name.to_string()))
    }
}

/// 数値セルの表示形式（整数値は小数点なし）
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_rows_skips_leading_blank_rows() {
        let table = Table::from_rows(
            "t.csv",
            None,
            rows(&[&["", ""], &["SeriesName", "UsagePercent"], &["A", "10"], &["", " "], &["B", "20"]]),
        );
        assert_eq!(table.headers, vec!["SeriesName", "UsagePercent"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_find_column_tolerant() {
        let table = Table::from_rows("t.csv", None, rows(&[&["Requested Series", "usage_percent"]]));
        assert_eq!(table.find_column(&["RequestedSeries"]), Some(0));
        assert_eq!(table.find_column(&["UsagePercent"]), Some(1));
        assert_eq!(table.find_column(&["SeriesName"]), None);
    }

    #[test]
    fn test_find_column_alias_priority() {
        let table = Table::from_rows("t.csv", None, rows(&[&["Series", "SeriesName"]]));
        assert_eq!(table.find_column(&["SeriesName", "Series"]), Some(1));
    }

    #[test]
    fn test_missing_columns_exact() {
        let table = Table::from_rows("t.csv", None, rows(&[&["VariantID", "is_delete"]]));
        assert_eq!(table.missing_columns(&["VariantID", "is delete"]), vec!["is delete"]);
    }

    #[test]
    fn test_cell_out_of_range() {
        let table = Table::from_rows("t.csv", None, rows(&[&["A", "B"], &["x"]]));
        assert_eq!(table.cell(0, 1), "");
    }

    #[test]
    fn test_csv_rows_are_never_numeric() {
        let table = Table::from_rows("t.csv", None, rows(&[&["ID", "Pct"], &["12345678901234567890", "1E5"]]));
        assert!(!table.is_number(0, 0));
        assert_eq!(
            table.typed_rows()[0],
            vec![
                TableCell::Text("12345678901234567890".into()),
                TableCell::Text("1E5".into())
            ]
        );
    }

    #[test]
    fn test_typed_rows_keep_number_cells() {
        let table = Table::from_typed_rows(
            "t.xlsx",
            None,
            vec![
                vec![("ID".into(), false), ("Count".into(), false)],
                vec![("0012".into(), false), ("3".into(), true)],
            ],
        );
        assert_eq!(
            table.typed_rows()[0],
            vec![TableCell::Text("0012".into()), TableCell::Number(3.0)]
        );
    }

    #[test]
    fn test_set_cell_and_retain_keep_flags_aligned() {
        let mut table = Table::from_typed_rows(
            "t.xlsx",
            None,
            vec![
                vec![("A".into(), false), ("B".into(), false)],
                vec![("1".into(), true), ("x".into(), false)],
                vec![("2".into(), true), ("y".into(), false)],
                vec![("3".into(), true), ("z".into(), false)],
            ],
        );

        table.set_cell(2, 0, "3".into());
        table.retain_rows(|i| i != 0);

        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), "y");
        assert!(table.is_number(0, 0));
        assert!(!table.is_number(1, 0), "書き換えたセルは文字列");

        table.truncate(1);
        assert_eq!(table.typed_rows().len(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = read_table_from_bytes("data.txt", b"abc".to_vec(), None);
        assert!(matches!(result, Err(SeriesMatcherError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(123.0), "123");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-3.0), "-3");
    }
}
