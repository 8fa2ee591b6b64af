//! CSV読み込み

use super::Table;
use crate::error::{Result, SeriesMatcherError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(super) fn parse(file_name: &str, bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| SeriesMatcherError::malformed(file_name, e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = record
            .iter()
            .map(|field| {
                std::str::from_utf8(field).map(|s| s.trim().to_string()).map_err(|_| {
                    SeriesMatcherError::malformed(
                        file_name,
                        format!("{}行目がUTF-8ではありません（UTF-8で保存し直してください）", line),
                    )
                })
            })
            .collect::<Result<Vec<String>>>()?;
        rows.push(row);
    }

    Ok(Table::from_rows(file_name, None, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_bom_and_quotes() {
        let data = "\u{feff}RequestedSeries,Note\n\"Acme, Corp\",x\nZenith\n";
        let table = parse("in.csv", data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["RequestedSeries", "Note"]);
        assert_eq!(table.rows[0][0], "Acme, Corp");
        assert_eq!(table.rows[1], vec!["Zenith"]);
    }

    #[test]
    fn test_parse_rejects_shift_jis() {
        // 「アクメ」の Shift_JIS
        let err = parse("input.csv", b"RequestedSeries\n\x83\x41\x83\x4e\x83\x81\n").unwrap_err();
        match err {
            SeriesMatcherError::MalformedFile { file, message } => {
                assert_eq!(file, "input.csv");
                assert!(message.contains("2行目"), "{}", message);
            }
            other => panic!("MalformedFile を期待: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty() {
        let table = parse("empty.csv", b"").unwrap();
        assert!(table.headers.is_empty());
        assert!(table.is_empty());
    }
}
