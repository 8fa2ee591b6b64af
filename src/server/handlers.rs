use super::error::{AppError, AppResult};
use super::{html, AppState};
use crate::error::SeriesMatcherError;
use crate::export::{default_output_stem, excel};
use crate::matcher::{self, CompareSettings};
use crate::reader::{self, Table};
use crate::templates::{self, TemplateKind};
use crate::update::{self, UpdateOptions};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::Json;
use base64::Engine;
use serde::Deserialize;
use series_matcher_common::export::excel_core::XLSX_MIME;

const DEFAULT_PREVIEW_ROWS: usize = 100;
const MASTER_DOWNLOAD_NAME: &str = "MasterSeriesHistory.xlsx";

/// アップロードされたファイル
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

impl Upload {
    fn into_table(self) -> crate::error::Result<Table> {
        reader::read_table_from_bytes(&self.file_name, self.bytes, None)
    }
}

fn require(upload: Option<Upload>, field: &str) -> Result<Upload, SeriesMatcherError> {
    upload
        .filter(|u| !u.bytes.is_empty())
        .ok_or_else(|| SeriesMatcherError::MissingUpload(field.to_string()))
}

fn parse_field<T: std::str::FromStr>(name: &str, value: &str) -> Result<Option<T>, SeriesMatcherError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| SeriesMatcherError::InvalidParameter(format!("{}: '{}'", name, value)))
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(html::index_page(
        state.config.default_top_n,
        &state.config.master_path.display().to_string(),
    ))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn compare(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Html<String>> {
    let mut comparison = None;
    let mut rules = None;
    let mut top_n: Option<usize> = None;
    let mut threshold: Option<f64> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "comparison" | "rules" => {
                let file_name = field.file_name().unwrap_or(name.as_str()).to_string();
                let bytes = field.bytes().await?.to_vec();
                let upload = Some(Upload { file_name, bytes });
                if name == "comparison" {
                    comparison = upload;
                } else {
                    rules = upload;
                }
            }
            "top_n" => top_n = parse_field("top_n", &field.text().await?)?,
            "threshold" => threshold = parse_field("threshold", &field.text().await?)?,
            _ => {}
        }
    }

    let comparison = require(comparison, "comparison")?;
    let rules = require(rules, "rules")?;
    crate::logging::log_compare_request(
        &comparison.file_name,
        &rules.file_name,
        top_n.unwrap_or(state.config.default_top_n),
    );

    let settings = CompareSettings {
        top_n: top_n.unwrap_or(state.config.default_top_n),
        threshold,
        default_threshold: state.config.default_threshold,
        master_path: Some(state.config.master_path.clone()),
        master_sheet: state.config.master_sheet.clone(),
    };

    let (report, buffer) = tokio::task::spawn_blocking(move || {
        let comparison = comparison.into_table()?;
        let rules = rules.into_table()?;
        let report = matcher::match_with_rules(&comparison, &rules, &settings)?;
        let buffer = excel::report_buffer(&report)?;
        Ok::<_, SeriesMatcherError>((report, buffer))
    })
    .await??;

    let data_uri = format!(
        "data:{};base64,{}",
        XLSX_MIME,
        base64::engine::general_purpose::STANDARD.encode(&buffer)
    );
    let download_name = format!("{}.xlsx", default_output_stem());

    Ok(Html(html::compare_page(&report, &download_name, &data_uri)))
}

pub async fn template(Path(kind): Path<String>) -> AppResult<impl IntoResponse> {
    let kind: TemplateKind = kind
        .parse()
        .map_err(|e: String| AppError::App(SeriesMatcherError::InvalidParameter(e)))?;

    let buffer = templates::template_buffer(kind)?;
    let disposition = format!("attachment; filename=\"{}\"", kind.file_name());

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}

pub async fn update(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Html<String>> {
    let mut input = None;
    let mut dry_run = false;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "input" => {
                let file_name = field.file_name().unwrap_or("input").to_string();
                let bytes = field.bytes().await?.to_vec();
                input = Some(Upload { file_name, bytes });
            }
            "dry_run" => {
                dry_run = update::is_truthy(&field.text().await?);
            }
            _ => {}
        }
    }

    let input = require(input, "input")?;
    let file_name = input.file_name.clone();
    crate::logging::log_update_request(&file_name, dry_run);

    let options = UpdateOptions {
        master_path: state.config.master_path.clone(),
        sheet: state.config.master_sheet.clone(),
        log_dir: state.config.log_dir.clone(),
        dry_run,
    };

    // マスタへの書き込みは1件ずつ
    let _guard = state.update_lock.lock().await;
    let summary = tokio::task::spawn_blocking(move || {
        let table = input.into_table()?;
        update::run_update(&table, &options)
    })
    .await??;

    Ok(Html(html::update_page(&summary, &file_name, dry_run)))
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub rows: Option<usize>,
}

pub async fn master(
    State(state): State<AppState>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> AppResult<Html<String>> {
    let Query(query) = query?;
    let rows = query.rows.unwrap_or(DEFAULT_PREVIEW_ROWS);
    let path = state.config.master_path.clone();
    let sheet = state.config.master_sheet.clone();

    let table = {
        let path = path.clone();
        tokio::task::spawn_blocking(move || update::preview_master(&path, &sheet, rows)).await??
    };

    Ok(Html(html::preview_page(&table, &path.display().to_string())))
}

/// 現在のマスタファイルをそのままダウンロード
pub async fn master_download(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let path = state.config.master_path.clone();
    if !path.exists() {
        return Err(SeriesMatcherError::FileNotFound(path.display().to_string()).into());
    }

    let bytes = tokio::fs::read(&path).await.map_err(SeriesMatcherError::from)?;
    let disposition = format!("attachment; filename=\"{}\"", download_name(&path));

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// ヘッダに載せられるファイル名（ASCII以外・引用符を含む場合は既定名）
fn download_name(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| n.chars().all(|c| c.is_ascii_graphic() || c == ' ') && !n.contains('"'))
        .unwrap_or(MASTER_DOWNLOAD_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field::<usize>("top_n", " 3 ").unwrap(), Some(3));
        assert_eq!(parse_field::<f64>("threshold", "").unwrap(), None);
        assert!(parse_field::<usize>("top_n", "abc").is_err());
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name(std::path::Path::new("/data/Master_2024.xlsx")), "Master_2024.xlsx");
        assert_eq!(download_name(std::path::Path::new("/data/マスタ.xlsx")), MASTER_DOWNLOAD_NAME);
        assert_eq!(download_name(std::path::Path::new("/data/a\"b.xlsx")), MASTER_DOWNLOAD_NAME);
    }

    #[test]
    fn test_require_rejects_empty_upload() {
        let empty = Some(Upload { file_name: "a.csv".into(), bytes: vec![] });
        assert!(matches!(require(empty, "rules"), Err(SeriesMatcherError::MissingUpload(_))));
        assert!(matches!(require(None, "rules"), Err(SeriesMatcherError::MissingUpload(_))));
    }
}
