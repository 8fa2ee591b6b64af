//! テンプレートExcelの生成
//!
//! 各入力ファイルの想定列を見出し行だけのxlsxとして配布する。

use crate::error::{Result, SeriesMatcherError};
use series_matcher_common::export::excel_core;
use series_matcher_common::layout::{
    ColumnDef, INPUT_TEMPLATE_COLUMNS, MASTER_TEMPLATE_COLUMNS, RULES_TEMPLATE_COLUMNS,
    UPDATE_TEMPLATE_COLUMNS,
};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateKind {
    /// 比較ファイル（要求シリーズ）
    Input,
    /// ルールファイル
    Rules,
    /// マスタ履歴
    Master,
    /// マスタ更新入力
    Update,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Input,
        TemplateKind::Rules,
        TemplateKind::Master,
        TemplateKind::Update,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateKind::Input => "TemplateInput_series.xlsx",
            TemplateKind::Rules => "TemplateSampleSeriesRules.xlsx",
            TemplateKind::Master => "TemplateMasterSeriesHistory.xlsx",
            TemplateKind::Update => "TemplateInput_series_NO_MPN.xlsx",
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            TemplateKind::Input => "Input",
            TemplateKind::Rules => "Rules",
            TemplateKind::Master => "Master",
            TemplateKind::Update => "Update",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemplateKind::Input => "比較ファイル",
            TemplateKind::Rules => "ルールファイル",
            TemplateKind::Master => "マスタ履歴",
            TemplateKind::Update => "更新入力（MPNなし）",
        }
    }

    pub fn columns(&self) -> &'static [ColumnDef] {
        match self {
            TemplateKind::Input => INPUT_TEMPLATE_COLUMNS,
            TemplateKind::Rules => RULES_TEMPLATE_COLUMNS,
            TemplateKind::Master => MASTER_TEMPLATE_COLUMNS,
            TemplateKind::Update => UPDATE_TEMPLATE_COLUMNS,
        }
    }
}

impl std::str::FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "input" | "comparison" => Ok(TemplateKind::Input),
            "rules" => Ok(TemplateKind::Rules),
            "master" => Ok(TemplateKind::Master),
            "update" => Ok(TemplateKind::Update),
            _ => Err(format!("Unknown template: {}. Use input, rules, master, or update", s)),
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKind::Input => write!(f, "input"),
            TemplateKind::Rules => write!(f, "rules"),
            TemplateKind::Master => write!(f, "master"),
            TemplateKind::Update => write!(f, "update"),
        }
    }
}

/// テンプレートのxlsxバイト列
pub fn template_buffer(kind: TemplateKind) -> Result<Vec<u8>> {
    excel_core::generate_template_buffer(kind.sheet_name(), kind.columns())
        .map_err(|e| SeriesMatcherError::ExcelGeneration(e.to_string()))
}

/// テンプレートを書き出す（ディレクトリ指定なら既定のファイル名）
pub fn write_template(kind: TemplateKind, output: &Path) -> Result<PathBuf> {
    let path = if output.is_dir() || output.extension().is_none() {
        std::fs::create_dir_all(output)?;
        output.join(kind.file_name())
    } else {
        output.to_path_buf()
    };

    std::fs::write(&path, template_buffer(kind)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_kind_round_trip() {
        for kind in TemplateKind::ALL {
            let parsed: TemplateKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("pdf".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_update_template_has_required_columns() {
        let headers: Vec<_> = TemplateKind::Update.columns().iter().map(|c| c.header).collect();
        assert!(headers.contains(&"is delete"));
        assert!(!headers.contains(&"Manufacturer Part Number"));
    }
}
