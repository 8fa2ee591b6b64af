//! Excel出力（CLI版）
//!
//! 共通ライブラリの rust_xlsxwriter 生成結果をファイルに保存する

use crate::error::{Result, SeriesMatcherError};
use series_matcher_common::export::excel_core;
use series_matcher_common::MatchReport;
use std::path::Path;

pub fn generate_excel(report: &MatchReport, output_path: &Path) -> Result<()> {
    let buffer = report_buffer(report)?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}

/// 照合結果のxlsxバイト列（Webのダウンロード用にも使う）
pub fn report_buffer(report: &MatchReport) -> Result<Vec<u8>> {
    excel_core::generate_report_buffer(report)
        .map_err(|e| SeriesMatcherError::ExcelGeneration(e.to_string()))
}
