pub mod csv;
pub mod excel;

use crate::cli::ExportFormat;
use crate::error::Result;
use series_matcher_common::MatchReport;
use std::path::{Path, PathBuf};

/// 結果ファイル名（拡張子なし）: MatchedSeriesResults_YYYYmmdd_HHMMSS
pub fn default_output_stem() -> String {
    format!(
        "MatchedSeriesResults_{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

fn output_path_for_format(output: &Path, stem: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", stem, extension))
    } else {
        output.to_path_buf()
    }
}

fn output_paths_for_both(output: &Path, stem: &str) -> (PathBuf, PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        let excel_path = output.join(format!("{}.xlsx", stem));
        let csv_path = output.join(format!("{}.csv", stem));
        (excel_path, csv_path)
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(stem);
        let excel_path = parent.join(format!("{}.xlsx", stem));
        let csv_path = parent.join(format!("{}.csv", stem));
        (excel_path, csv_path)
    }
}

/// 照合結果を書き出し、作成したファイルのパスを返す
///
/// `output` がディレクトリ（または拡張子なし）なら `stem` でファイル名を作る。
pub fn export_report(
    report: &MatchReport,
    format: &ExportFormat,
    output: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    if output.extension().is_none() && !output.exists() {
        std::fs::create_dir_all(output)?;
    }

    let written = match format {
        ExportFormat::Excel => {
            let path = output_path_for_format(output, stem, "xlsx");
            excel::generate_excel(report, &path)?;
            vec![path]
        }
        ExportFormat::Csv => {
            let path = output_path_for_format(output, stem, "csv");
            csv::generate_csv(report, &path)?;
            vec![path]
        }
        ExportFormat::Both => {
            let (excel_path, csv_path) = output_paths_for_both(output, stem);
            excel::generate_excel(report, &excel_path)?;
            csv::generate_csv(report, &csv_path)?;
            vec![excel_path, csv_path]
        }
    };

    for path in &written {
        tracing::debug!("出力: {}", path.display());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_stem() {
        let stem = default_output_stem();
        assert!(stem.starts_with("MatchedSeriesResults_"));
        assert_eq!(stem.len(), "MatchedSeriesResults_".len() + 15);
    }

    #[test]
    fn test_output_paths_for_both_with_file() {
        let (xlsx, csv) = output_paths_for_both(Path::new("out/result.xlsx"), "ignored");
        assert_eq!(xlsx, Path::new("out/result.xlsx"));
        assert_eq!(csv, Path::new("out/result.csv"));
    }
}
