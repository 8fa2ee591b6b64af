//! HTML画面の組み立て

use crate::reader::Table;
use crate::templates::TemplateKind;
use crate::update::UpdateSummary;
use axum::http::StatusCode;
use series_matcher_common::types::{MAX_TOP_N, MIN_TOP_N};
use series_matcher_common::MatchReport;
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;margin:2em;max-width:1100px}\
table{border-collapse:collapse;margin:1em 0}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#4472C4;color:#fff}\
.notice{background:#fff4ce;padding:8px;border-left:4px solid #e0a800}\
.error{background:#fde7e9;padding:8px;border-left:4px solid #c50f1f}\
fieldset{margin-bottom:1.5em}";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ja\"><head><meta charset=\"utf-8\">\
<title>{title}</title><style>{STYLE}</style></head>\
<body><h1>{title}</h1>{body}<p><a href=\"/\">トップに戻る</a></p></body></html>",
        title = escape(title),
    )
}

fn notice(text: &str) -> String {
    format!("<p class=\"notice\">{}</p>", escape(text))
}

/// アップロード画面
pub fn index_page(default_top_n: usize, master_path: &str) -> String {
    let mut body = String::new();

    body.push_str(
        "<form action=\"/compare\" method=\"post\" enctype=\"multipart/form-data\"><fieldset>\
<legend>シリーズ照合</legend>\
<p><label>比較ファイル <input type=\"file\" name=\"comparison\" accept=\".xlsx,.xls,.xlsm,.xlsb,.ods,.csv\" required></label></p>\
<p><label>ルールファイル <input type=\"file\" name=\"rules\" accept=\".xlsx,.xls,.xlsm,.xlsb,.ods,.csv\" required></label></p>",
    );
    let _ = write!(
        body,
        "<p><label>上位件数 <input type=\"number\" name=\"top_n\" min=\"{}\" max=\"{}\" value=\"{}\"></label></p>",
        MIN_TOP_N, MAX_TOP_N, default_top_n
    );
    body.push_str(
        "<p><label>使用率の閾値(%) <input type=\"number\" name=\"threshold\" min=\"0\" max=\"100\" step=\"0.01\" placeholder=\"ルールファイルの値\"></label></p>\
<p><button type=\"submit\">照合</button></p></fieldset></form>",
    );

    let _ = write!(
        body,
        "<form action=\"/update\" method=\"post\" enctype=\"multipart/form-data\"><fieldset>\
<legend>マスタ履歴の更新</legend><p>対象: {}</p>\
<p><label>更新入力ファイル <input type=\"file\" name=\"input\" required></label></p>\
<p><label><input type=\"checkbox\" name=\"dry_run\" value=\"true\" checked> ドライラン（マスタは変更しない）</label></p>\
<p><button type=\"submit\">更新</button> <a href=\"/master\">マスタを表示</a></p></fieldset></form>",
        escape(master_path)
    );

    body.push_str("<h2>テンプレート</h2><ul>");
    for kind in TemplateKind::ALL {
        let _ = write!(
            body,
            "<li><a href=\"/templates/{}\">{}</a> ({})</li>",
            kind,
            escape(kind.label()),
            escape(kind.file_name())
        );
    }
    body.push_str("</ul>");

    layout("シリーズ照合", &body)
}

/// 照合結果画面
pub fn compare_page(report: &MatchReport, download_name: &str, data_uri: &str) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        "<p>要求シリーズ {}件 / 結果 {}行 / 上位{}件 / 閾値 {:.2}%</p>",
        report.requested_count,
        report.results.len(),
        report.top_n,
        report.threshold
    );

    if report.requested_count == 0 {
        body.push_str(&notice("比較ファイルに要求シリーズがありません。"));
    } else if report.results.is_empty() {
        body.push_str(&notice("一致するシリーズが見つかりませんでした。"));
    }

    let _ = write!(
        body,
        "<p><a href=\"{}\" download=\"{}\">結果をExcelでダウンロード</a></p>",
        data_uri,
        escape(download_name)
    );

    if !report.results.is_empty() {
        body.push_str(
            "<table><tr><th>RequestedSeries</th><th>Rank</th><th>SeriesName</th>\
<th>SimilarityScore</th><th>UsagePercent</th></tr>",
        );
        for r in &report.results {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td></tr>",
                escape(&r.requested),
                r.rank,
                escape(&r.master_label),
                r.score,
                r.usage_percent
            );
        }
        body.push_str("</table>");
    }

    if !report.unmatched.is_empty() {
        body.push_str("<h2>一致なし</h2><ul>");
        for name in &report.unmatched {
            let _ = write!(body, "<li>{}</li>", escape(name));
        }
        body.push_str("</ul>");
    }

    layout("照合結果", &body)
}

/// 更新結果画面
pub fn update_page(summary: &UpdateSummary, file_name: &str, dry_run: bool) -> String {
    let mut body = String::new();
    let _ = write!(body, "<p>入力: {}</p>", escape(file_name));

    if summary.is_rejected() {
        let _ = write!(
            body,
            "<p class=\"error\">必須列が不足しているため、ファイル全体を拒否しました: {}</p>",
            escape(&summary.missing_columns.join(", "))
        );
    } else {
        let _ = write!(
            body,
            "<p>更新 {}行 / 削除 {}行 / スキップ {}行</p>",
            summary.updates, summary.deletions, summary.skipped
        );
        if dry_run {
            body.push_str(&notice("ドライランのため、マスタは変更していません。"));
        } else if summary.master_written {
            body.push_str("<p>マスタを保存しました。</p>");
        }
    }

    if let Some(path) = &summary.audit_path {
        let _ = write!(body, "<p>監査ログ: {}</p>", escape(&path.display().to_string()));
    }

    if !summary.audit.is_empty() {
        body.push_str(
            "<table><tr><th>action</th><th>key</th><th>old_value</th><th>new_value</th><th>comment</th></tr>",
        );
        for entry in &summary.audit {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                entry.action,
                escape(&entry.key),
                escape(&entry.old_value),
                escape(&entry.new_value),
                escape(&entry.comment)
            );
        }
        body.push_str("</table>");
    }

    layout("マスタ更新", &body)
}

/// マスタ表示画面
pub fn preview_page(table: &Table, path: &str) -> String {
    let mut body = String::new();
    let _ = write!(body, "<p>{}（先頭{}行）</p>", escape(path), table.len());
    body.push_str("<p><a href=\"/master/download\">現在のマスタをダウンロード（xlsx）</a></p>");

    if table.is_empty() {
        body.push_str(&notice("マスタにデータ行がありません。"));
    }

    body.push_str("<table><tr>");
    for header in &table.headers {
        let _ = write!(body, "<th>{}</th>", escape(header));
    }
    body.push_str("</tr>");
    for row in 0..table.len() {
        body.push_str("<tr>");
        for col in 0..table.headers.len() {
            let _ = write!(body, "<td>{}</td>", escape(table.cell(row, col)));
        }
        body.push_str("</tr>");
    }
    body.push_str("</table>");

    layout("マスタ履歴", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<p class=\"error\">{}</p><p>HTTP {}</p>",
        escape(message),
        status.as_u16()
    );
    layout("エラー", &body)
}
