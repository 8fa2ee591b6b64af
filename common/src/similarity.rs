//! シリーズ名の類似度
//!
//! 正規化（前後空白除去・連続空白の圧縮・大文字化）したうえで
//! 正規化レーベンシュタイン距離を 0-100 のスコアにする。

use strsim::normalized_levenshtein;

/// シリーズ名を比較用に正規化
pub fn normalize_series(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// 類似度を計算（0-100、小数2桁に丸め）
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a = normalize_series(a);
    let b = normalize_series(b);
    score_normalized(&a, &b)
}

/// 正規化済みの文字列同士の類似度
pub(crate) fn score_normalized(a: &str, b: &str) -> f64 {
    if a == b {
        return 100.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    round2(normalized_levenshtein(a, b) * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_series() {
        assert_eq!(normalize_series("acme corp"), "ACME CORP");
        assert_eq!(normalize_series("  Acme   Corp \t"), "ACME CORP");
        assert_eq!(normalize_series(""), "");
    }

    #[test]
    fn test_similarity_identical() {
        assert_eq!(similarity_ratio("Acme Corp", "ACME  corp"), 100.0);
    }

    #[test]
    fn test_similarity_empty() {
        assert_eq!(similarity_ratio("", "Acme"), 0.0);
        assert_eq!(similarity_ratio("Acme", "   "), 0.0);
        assert_eq!(similarity_ratio("", ""), 100.0);
    }

    #[test]
    fn test_similarity_ordering() {
        let close = similarity_ratio("Acme Corp", "Acme Co");
        let far = similarity_ratio("Acme Corp", "Zenith Ltd");
        assert!(close > far);
        assert!(close > 70.0);
    }

    #[test]
    fn test_similarity_two_decimals() {
        // ACME CORP vs ACME CORPORATION: 距離7 / 長さ16
        assert_eq!(similarity_ratio("Acme Corp", "Acme Corporation"), 56.25);
    }
}
