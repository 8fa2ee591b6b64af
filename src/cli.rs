use crate::templates::TemplateKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "series-matcher")]
#[command(about = "シリーズ名あいまい照合・マスタ更新ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 比較ファイルとルールファイルを照合して結果を出力
    Compare {
        /// 比較ファイル（RequestedSeries列）
        #[arg(required = true)]
        comparison: PathBuf,

        /// ルールファイル（SeriesName / UsagePercent / MinUsagePercent列）
        #[arg(required = true)]
        rules: PathBuf,

        /// 1件あたりの上位件数（1〜50、省略時は設定値）
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// 使用率の閾値（0〜100、省略時はルールファイル→設定値）
        #[arg(short, long)]
        threshold: Option<f64>,

        /// 出力形式 (excel/csv/both)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ルールファイルにシリーズ名列がない場合に使うマスタ（省略時は設定値）
        #[arg(short, long)]
        master: Option<PathBuf>,
    },

    /// 入力用テンプレートを出力
    Template {
        /// テンプレート種別 (input/rules/master/update)、省略時は全種類
        kind: Option<TemplateKind>,

        /// 出力先ディレクトリ
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// 入力ファイルでマスタ履歴を更新・削除
    Update {
        /// 更新入力ファイル（VariantID / ManufacturerName / Category / Family / RequestedSeries / is delete）
        #[arg(required = true)]
        input: PathBuf,

        /// マスタファイル（省略時は設定値）
        #[arg(short, long)]
        master: Option<PathBuf>,

        /// マスタのシート名（省略時は設定値）
        #[arg(long)]
        sheet: Option<String>,

        /// ドライラン（監査ログのみ出力）
        #[arg(long)]
        dry_run: bool,

        /// 監査ログの出力先（省略時は設定値）
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// 確認せずに実行
        #[arg(short, long)]
        yes: bool,
    },

    /// マスタ履歴の先頭を表示
    Preview {
        /// マスタファイル（省略時は設定値）
        #[arg(short, long)]
        master: Option<PathBuf>,

        /// 表示行数
        #[arg(short, long, default_value = "100")]
        rows: usize,
    },

    /// Webサーバを起動
    Serve {
        /// 待ち受けアドレス（省略時は設定値）
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 既定の上位件数を設定
        #[arg(long)]
        set_top_n: Option<usize>,

        /// 既定の閾値を設定
        #[arg(long)]
        set_threshold: Option<f64>,

        /// マスタファイルのパスを設定
        #[arg(long)]
        set_master: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Excel,
    Csv,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use excel, csv, or both", s)),
        }
    }
}
