//! Excel / ODS 読み込み（calamine）

use super::{format_number, Table};
use crate::error::{Result, SeriesMatcherError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

pub(super) fn parse(file_name: &str, bytes: Vec<u8>, sheet: Option<&str>) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SeriesMatcherError::malformed(file_name, e.to_string()))?;

    let names = workbook.sheet_names();
    let first = names
        .first()
        .cloned()
        .ok_or_else(|| SeriesMatcherError::malformed(file_name, "シートがありません"))?;

    // 指定シートがなければ先頭シートで代用
    let target = match sheet {
        Some(name) if names.iter().any(|n| n == name) => name.to_string(),
        Some(name) => {
            tracing::warn!(
                "シート '{}' が {} にありません。先頭シート '{}' を使用します",
                name,
                file_name,
                first
            );
            first
        }
        None => first,
    };

    let range = workbook
        .worksheet_range(&target)
        .map_err(|e| SeriesMatcherError::malformed(file_name, e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| (cell_to_string(cell), is_number_cell(cell)))
                .collect()
        })
        .collect();

    Ok(Table::from_typed_rows(file_name, Some(target), rows))
}

fn is_number_cell(cell: &Data) -> bool {
    matches!(cell, Data::Float(_) | Data::Int(_))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
