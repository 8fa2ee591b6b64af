//! Excel/CSV出力の統合テスト

use calamine::{open_workbook_auto, Data, Reader};
use series_matcher::cli::ExportFormat;
use series_matcher::export::{self, csv, excel};
use series_matcher::templates::{self, TemplateKind};
use series_matcher_common::{MatchReport, MatchResult};
use tempfile::tempdir;

fn create_test_report() -> MatchReport {
    let results = vec![
        MatchResult {
            requested: "Acme Corp".to_string(),
            master_label: "Acme Corporation".to_string(),
            score: 56.25,
            usage_percent: 80.0,
            rank: 1,
        },
        MatchResult {
            requested: "Acme Corp".to_string(),
            master_label: "Acme, Co".to_string(),
            score: 77.78,
            usage_percent: 40.0,
            rank: 2,
        },
    ];
    MatchReport {
        results,
        unmatched: vec!["Zenith".to_string()],
        top_n: 2,
        threshold: 0.0,
        requested_count: 2,
    }
}

#[test]
fn test_excel_generation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("result.xlsx");

    let result = excel::generate_excel(&create_test_report(), &output_path);
    assert!(result.is_ok(), "Excel生成に失敗: {:?}", result.err());

    let mut workbook = open_workbook_auto(&output_path).expect("Excelを開けない");
    assert_eq!(workbook.sheet_names(), vec!["Matches", "Unmatched"]);

    let matches = workbook.worksheet_range("Matches").expect("Matchesシートがない");
    assert_eq!(matches.height(), 3);
    assert_eq!(
        matches.get_value((0, 0)),
        Some(&Data::String("RequestedSeries".to_string()))
    );
    assert_eq!(matches.get_value((1, 2)), Some(&Data::Float(56.25)));

    let unmatched = workbook.worksheet_range("Unmatched").expect("Unmatchedシートがない");
    assert_eq!(unmatched.get_value((1, 0)), Some(&Data::String("Zenith".to_string())));
}

#[test]
fn test_excel_generation_empty_report() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("empty.xlsx");

    let report = MatchReport {
        results: vec![],
        unmatched: vec![],
        top_n: 5,
        threshold: 0.0,
        requested_count: 0,
    };

    let result = excel::generate_excel(&report, &output_path);
    assert!(result.is_ok(), "空の結果でExcel生成に失敗: {:?}", result.err());
    assert!(output_path.exists());
}

#[test]
fn test_csv_generation_quotes_commas() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("result.csv");

    csv::generate_csv(&create_test_report(), &output_path).expect("CSV生成に失敗");

    let content = std::fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "RequestedSeries,SeriesName,SimilarityScore,UsagePercent,Rank");
    assert_eq!(lines[1], "Acme Corp,Acme Corporation,56.25,80.00,1");
    assert_eq!(lines[2], "Acme Corp,\"Acme, Co\",77.78,40.00,2");
}

#[test]
fn test_export_both_formats() {
    let dir = tempdir().expect("Failed to create temp dir");

    let written = export::export_report(
        &create_test_report(),
        &ExportFormat::Both,
        dir.path(),
        "MatchedSeriesResults_test",
    )
    .expect("エクスポートに失敗");

    assert_eq!(written.len(), 2);
    assert!(dir.path().join("MatchedSeriesResults_test.xlsx").exists());
    assert!(dir.path().join("MatchedSeriesResults_test.csv").exists());
}

#[test]
fn test_templates_written_with_headers() {
    let dir = tempdir().expect("Failed to create temp dir");

    for kind in TemplateKind::ALL {
        let path = templates::write_template(kind, dir.path()).expect("テンプレート出力に失敗");
        assert_eq!(path.file_name().unwrap(), kind.file_name());

        let mut workbook = open_workbook_auto(&path).expect("テンプレートを開けない");
        let range = workbook.worksheet_range(kind.sheet_name()).expect("シートがない");
        assert_eq!(range.height(), 1);
        assert_eq!(range.width(), kind.columns().len());
    }
}
