//! CSV出力

use crate::error::Result;
use series_matcher_common::layout::{headers, RESULT_COLUMNS};
use series_matcher_common::MatchReport;
use std::path::Path;

pub fn generate_csv(report: &MatchReport, output_path: &Path) -> Result<()> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(::csv::QuoteStyle::Necessary)
        .from_path(output_path)?;

    writer.write_record(headers(RESULT_COLUMNS))?;
    for row in &report.results {
        let score = format!("{:.2}", row.score);
        let usage = format!("{:.2}", row.usage_percent);
        let rank = row.rank.to_string();
        writer.write_record([
            row.requested.as_str(),
            row.master_label.as_str(),
            score.as_str(),
            usage.as_str(),
            rank.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
