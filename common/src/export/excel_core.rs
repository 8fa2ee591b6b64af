//! Excel生成（共通ライブラリ）
//!
//! layout.rs の列定義を使用して結果・テンプレート・表形式のExcelを生成

use crate::error::{Error, Result};
use crate::layout::{
    ColumnDef, MATCHES_SHEET, RESULT_COLUMNS, UNMATCHED_COLUMNS, UNMATCHED_SHEET,
};
use crate::types::{MatchReport, TableCell};
use rust_xlsxwriter::*;

/// xlsxのMIMEタイプ
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const DEFAULT_COLUMN_WIDTH: f64 = 18.0;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xDDEBF7))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA))
}

fn wb_err(context: &str) -> impl Fn(XlsxError) -> Error + '_ {
    move |e| Error::Workbook(format!("{}: {}", context, e))
}

/// 見出し行を書き込み、列幅を設定
fn write_header_row(worksheet: &mut Worksheet, columns: &[ColumnDef], format: &Format) -> Result<()> {
    for (col, def) in columns.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, def.header, format)
            .map_err(wb_err("見出し書き込みエラー"))?;
        worksheet
            .set_column_width(col, def.width)
            .map_err(wb_err("列幅設定エラー"))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(wb_err("ウィンドウ枠固定エラー"))?;
    Ok(())
}

/// 照合結果をバッファに生成
///
/// `Matches` シートに結果行、`Unmatched` シートに未一致の要求名を書き込む。
pub fn generate_report_buffer(report: &MatchReport) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = header_format();
    let score_format = Format::new().set_num_format("0.00");

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(MATCHES_SHEET)
        .map_err(wb_err("シート名設定エラー"))?;
    write_header_row(worksheet, RESULT_COLUMNS, &header)?;

    for (i, row) in report.results.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet
            .write_string(r, 0, &row.requested)
            .map_err(wb_err("値書き込みエラー"))?;
        worksheet
            .write_string(r, 1, &row.master_label)
            .map_err(wb_err("値書き込みエラー"))?;
        worksheet
            .write_number_with_format(r, 2, row.score, &score_format)
            .map_err(wb_err("値書き込みエラー"))?;
        worksheet
            .write_number_with_format(r, 3, row.usage_percent, &score_format)
            .map_err(wb_err("値書き込みエラー"))?;
        worksheet
            .write_number(r, 4, row.rank as f64)
            .map_err(wb_err("値書き込みエラー"))?;
    }

    if !report.results.is_empty() {
        worksheet
            .autofilter(0, 0, report.results.len() as u32, (RESULT_COLUMNS.len() - 1) as u16)
            .map_err(wb_err("フィルタ設定エラー"))?;
    }

    let unmatched = workbook.add_worksheet();
    unmatched
        .set_name(UNMATCHED_SHEET)
        .map_err(wb_err("シート名設定エラー"))?;
    write_header_row(unmatched, UNMATCHED_COLUMNS, &header)?;
    for (i, name) in report.unmatched.iter().enumerate() {
        unmatched
            .write_string((i + 1) as u32, 0, name)
            .map_err(wb_err("値書き込みエラー"))?;
    }

    workbook
        .save_to_buffer()
        .map_err(wb_err("Excel保存エラー"))
}

/// 見出しだけのテンプレートをバッファに生成
pub fn generate_template_buffer(sheet_name: &str, columns: &[ColumnDef]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = header_format();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .map_err(wb_err("シート名設定エラー"))?;
    write_header_row(worksheet, columns, &header)?;

    workbook
        .save_to_buffer()
        .map_err(wb_err("Excel保存エラー"))
}

/// 任意の表をバッファに生成
///
/// セルの型は呼び出し側が決める（文字列から数値を推測しない）。
pub fn generate_table_buffer(
    sheet_name: &str,
    headers: &[String],
    rows: &[Vec<TableCell>],
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = header_format();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .map_err(wb_err("シート名設定エラー"))?;

    for (col, name) in headers.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, name, &header)
            .map_err(wb_err("見出し書き込みエラー"))?;
        worksheet
            .set_column_width(col, DEFAULT_COLUMN_WIDTH)
            .map_err(wb_err("列幅設定エラー"))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                TableCell::Text(value) if value.is_empty() => continue,
                TableCell::Text(value) => worksheet.write_string(r, col, value),
                TableCell::Number(n) => worksheet.write_number(r, col, *n),
            }
            .map_err(wb_err("値書き込みエラー"))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(wb_err("Excel保存エラー"))
}
