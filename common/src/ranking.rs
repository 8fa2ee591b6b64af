//! 要求名×マスタの照合・順位付け
//!
//! 要求名ごとに全マスタレコードとの類似度を計算し、
//! 使用率が閾値未満の候補を除外してから類似度の降順で上位N件を残す。
//! 同点は使用率の高い順、さらに同点ならマスタの並び順。

use crate::error::{Error, Result};
use crate::similarity::{normalize_series, score_normalized};
use crate::types::{MasterRecord, MatchOptions, MatchReport, MatchResult, RequestedName, MAX_TOP_N, MIN_TOP_N};
use std::cmp::Ordering;
use std::collections::HashSet;

/// 照合パラメータを検証
pub fn validate_options(options: &MatchOptions) -> Result<()> {
    if !(MIN_TOP_N..=MAX_TOP_N).contains(&options.top_n) {
        return Err(Error::InvalidParameter(format!(
            "上位件数は{}〜{}で指定してください（指定値: {}）",
            MIN_TOP_N, MAX_TOP_N, options.top_n
        )));
    }
    if !options.threshold.is_finite() || !(0.0..=100.0).contains(&options.threshold) {
        return Err(Error::InvalidParameter(format!(
            "使用率の閾値は0〜100で指定してください（指定値: {}）",
            options.threshold
        )));
    }
    Ok(())
}

/// 照合を実行
pub fn match_series(
    requested: &[RequestedName],
    master: &[MasterRecord],
    options: &MatchOptions,
) -> Result<MatchReport> {
    match_series_with_progress(requested, master, options, |_, _, _| {})
}

/// 進捗コールバック付きで照合を実行
///
/// `on_progress(処理済み件数, 総件数, 要求名)` が要求名ごとに呼ばれる。
pub fn match_series_with_progress<F>(
    requested: &[RequestedName],
    master: &[MasterRecord],
    options: &MatchOptions,
    mut on_progress: F,
) -> Result<MatchReport>
where
    F: FnMut(usize, usize, &str),
{
    validate_options(options)?;

    let unique = unique_requested(requested);

    // 閾値を満たすマスタだけを先に正規化しておく
    let candidates: Vec<(usize, &MasterRecord, String)> = master
        .iter()
        .enumerate()
        .filter(|(_, m)| m.usage_percent >= options.threshold)
        .map(|(i, m)| (i, m, normalize_series(&m.label)))
        .collect();

    let mut report = MatchReport {
        top_n: options.top_n,
        threshold: options.threshold,
        requested_count: unique.len(),
        ..Default::default()
    };

    let total = unique.len();
    for (i, name) in unique.iter().copied().enumerate() {
        on_progress(i + 1, total, name);

        let ranked = rank_candidates(name, &candidates, options.top_n);
        if ranked.is_empty() {
            report.unmatched.push(name.to_string());
            continue;
        }

        report.results.extend(ranked.into_iter().enumerate().map(|(rank, (score, record))| {
            MatchResult {
                requested: name.to_string(),
                master_label: record.label.clone(),
                score,
                usage_percent: record.usage_percent,
                rank: rank + 1,
            }
        }));
    }

    Ok(report)
}

/// 1つの要求名について候補を順位付け
fn rank_candidates<'a>(
    requested: &str,
    candidates: &[(usize, &'a MasterRecord, String)],
    top_n: usize,
) -> Vec<(f64, &'a MasterRecord)> {
    let normalized = normalize_series(requested);

    let mut scored: Vec<(f64, usize, &MasterRecord)> = candidates
        .iter()
        .map(|(idx, record, label)| (score_normalized(&normalized, label), *idx, *record))
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.2.usage_percent
                    .partial_cmp(&a.2.usage_percent)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.1.cmp(&b.1))
    });

    scored
        .into_iter()
        .take(top_n)
        .map(|(score, _, record)| (score, record))
        .collect()
}

/// 空白のみの名前を除き、出現順を保って重複を除去
fn unique_requested(requested: &[RequestedName]) -> Vec<&str> {
    let mut seen = HashSet::new();
    requested
        .iter()
        .map(|r| r.as_str().trim())
        .filter(|r| !r.is_empty())
        .filter(|r| seen.insert(*r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(names: &[&str]) -> Vec<RequestedName> {
        names.iter().map(|n| RequestedName::new(*n)).collect()
    }

    fn sample_master() -> Vec<MasterRecord> {
        vec![
            MasterRecord::new("Acme Corporation", 80.0),
            MasterRecord::new("Acme Co", 40.0),
            MasterRecord::new("Acme Corp Ltd", 65.0),
            MasterRecord::new("Zenith Series", 90.0),
            MasterRecord::new("Acme", 55.0),
        ]
    }

    #[test]
    fn test_acme_example() {
        let master = vec![
            MasterRecord::new("Acme Corporation", 80.0),
            MasterRecord::new("Acme Co", 40.0),
        ];
        let options = MatchOptions { top_n: 1, threshold: 50.0 };
        let report = match_series(&req(&["Acme Corp"]), &master, &options).unwrap();

        assert_eq!(report.results.len(), 1);
        let row = &report.results[0];
        assert_eq!(row.requested, "Acme Corp");
        assert_eq!(row.master_label, "Acme Corporation");
        assert_eq!(row.usage_percent, 80.0);
        assert_eq!(row.rank, 1);
        assert!(row.score > 50.0);
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn test_threshold_applies_to_every_row() {
        let options = MatchOptions { top_n: 10, threshold: 60.0 };
        let report = match_series(&req(&["Acme Corp", "Zenith", "acme"]), &sample_master(), &options).unwrap();

        assert!(!report.results.is_empty());
        for row in &report.results {
            assert!(row.usage_percent >= 60.0, "閾値未満の行: {:?}", row);
        }
    }

    #[test]
    fn test_top_n_limit_and_descending_order() {
        let options = MatchOptions { top_n: 3, threshold: 0.0 };
        let names = ["Acme Corp", "Zenith", "Acme"];
        let report = match_series(&req(&names), &sample_master(), &options).unwrap();

        for name in names {
            let rows: Vec<_> = report.results_for(name).collect();
            assert!(rows.len() <= 3);
            for pair in rows.windows(2) {
                assert!(pair[0].score >= pair[1].score);
                assert_eq!(pair[0].rank + 1, pair[1].rank);
            }
        }
    }

    #[test]
    fn test_empty_master_yields_no_results() {
        let report = match_series(&req(&["Acme", "Zenith"]), &[], &MatchOptions::default()).unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.unmatched, vec!["Acme".to_string(), "Zenith".to_string()]);
    }

    #[test]
    fn test_empty_requested_yields_empty_report() {
        let report = match_series(&[], &sample_master(), &MatchOptions::default()).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.requested_count, 0);
    }

    #[test]
    fn test_duplicates_and_blanks_collapsed() {
        let options = MatchOptions { top_n: 1, threshold: 0.0 };
        let report = match_series(&req(&["Acme", " Acme ", "", "  ", "Zenith"]), &sample_master(), &options).unwrap();
        assert_eq!(report.requested_count, 2);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].requested, "Acme");
        assert_eq!(report.results[1].requested, "Zenith");
    }

    #[test]
    fn test_tie_breaks_on_usage_then_order() {
        let master = vec![
            MasterRecord::new("ABC", 10.0),
            MasterRecord::new("abc", 30.0),
            MasterRecord::new("Abc", 30.0),
        ];
        let options = MatchOptions { top_n: 3, threshold: 0.0 };
        let report = match_series(&req(&["abc"]), &master, &options).unwrap();

        let labels: Vec<_> = report.results.iter().map(|r| r.master_label.as_str()).collect();
        assert_eq!(labels, vec!["abc", "Abc", "ABC"]);
    }

    #[test]
    fn test_invalid_options() {
        let bad_n = MatchOptions { top_n: 0, threshold: 0.0 };
        assert!(matches!(match_series(&[], &[], &bad_n), Err(Error::InvalidParameter(_))));

        let bad_n = MatchOptions { top_n: 51, threshold: 0.0 };
        assert!(matches!(match_series(&[], &[], &bad_n), Err(Error::InvalidParameter(_))));

        let bad_threshold = MatchOptions { top_n: 5, threshold: 100.5 };
        assert!(matches!(match_series(&[], &[], &bad_threshold), Err(Error::InvalidParameter(_))));

        let nan = MatchOptions { top_n: 5, threshold: f64::NAN };
        assert!(validate_options(&nan).is_err());
    }

    #[test]
    fn test_progress_callback() {
        let mut calls = Vec::new();
        let options = MatchOptions::default();
        match_series_with_progress(&req(&["A", "B", "A"]), &sample_master(), &options, |done, total, name| {
            calls.push((done, total, name.to_string()));
        })
        .unwrap();

        assert_eq!(calls, vec![(1, 2, "A".to_string()), (2, 2, "B".to_string())]);
    }
}
