use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use series_matcher::{cli, config, export, logging, matcher, reader, server, templates, update};
use cli::{Cli, Commands};
use config::Config;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Compare { comparison, rules, top_n, threshold, format, output, master } => {
            println!("🔎 series-matcher - シリーズ照合\n");

            // 1. 読み込み
            println!("[1/3] ファイルを読み込み中...");
            let comparison_table = reader::read_table_from_path(&comparison, None)?;
            let rules_table = reader::read_table_from_path(&rules, None)?;
            println!(
                "✔ 比較ファイル {}行 / ルールファイル {}行\n",
                comparison_table.len(),
                rules_table.len()
            );

            // 2. 照合
            println!("[2/3] 照合中...");
            let settings = matcher::CompareSettings {
                top_n: top_n.unwrap_or(config.default_top_n),
                threshold,
                default_threshold: config.default_threshold,
                master_path: Some(master.unwrap_or_else(|| config.master_path.clone())),
                master_sheet: config.master_sheet.clone(),
            };

            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            let report = matcher::match_with_rules_progress(
                &comparison_table,
                &rules_table,
                &settings,
                |done, total, name| {
                    pb.set_length(total as u64);
                    pb.set_position(done as u64);
                    pb.set_message(name.to_string());
                },
            )?;
            pb.finish_and_clear();

            if report.requested_count == 0 {
                println!("⚠ 比較ファイルに要求シリーズがありません");
            } else if report.results.is_empty() {
                println!("⚠ 一致するシリーズが見つかりませんでした");
            }
            println!(
                "✔ 要求{}件 → 結果{}行（未一致{}件、閾値{:.2}%）\n",
                report.requested_count,
                report.results.len(),
                report.unmatched.len(),
                report.threshold
            );

            // 3. 出力
            println!("[3/3] 結果を保存中...");
            let output = output.unwrap_or_else(|| PathBuf::from("."));
            let written = export::export_report(&report, &format, &output, &export::default_output_stem())?;
            for path in written {
                println!("✔ 保存: {}", path.display());
            }

            println!("\n✅ 照合完了");
        }

        Commands::Template { kind, output } => {
            let kinds = match kind {
                Some(kind) => vec![kind],
                None => templates::TemplateKind::ALL.to_vec(),
            };
            for kind in kinds {
                let path = templates::write_template(kind, &output)?;
                println!("✔ {}テンプレート: {}", kind.label(), path.display());
            }
        }

        Commands::Update { input, master, sheet, dry_run, log_dir, yes } => {
            println!("🗂 series-matcher - マスタ更新\n");

            let options = update::UpdateOptions {
                master_path: master.unwrap_or_else(|| config.master_path.clone()),
                sheet: sheet.unwrap_or_else(|| config.master_sheet.clone()),
                log_dir: log_dir.unwrap_or_else(|| config.log_dir.clone()),
                dry_run,
            };

            let table = reader::read_table_from_path(&input, None)?;
            let (rows, deletes) = update::count_actions(&table);
            println!("入力: {} ({}行、うち削除{}行)", input.display(), rows, deletes);
            println!("マスタ: {}", options.master_path.display());

            if !dry_run && !yes {
                let proceed = Confirm::new()
                    .with_prompt("マスタを更新しますか？")
                    .default(false)
                    .interact()
                    .context("確認入力に失敗")?;
                if !proceed {
                    println!("中止しました");
                    return Ok(());
                }
            }

            let summary = update::run_update(&table, &options)?;

            if summary.is_rejected() {
                println!("✖ 必須列が不足しているため拒否しました: {:?}", summary.missing_columns);
            } else {
                println!(
                    "✔ 更新 {}行 / 削除 {}行 / スキップ {}行{}",
                    summary.updates,
                    summary.deletions,
                    summary.skipped,
                    if dry_run { " [DRY-RUN]" } else { "" }
                );
            }
            if let Some(path) = &summary.audit_path {
                println!("✔ 監査ログ: {}", path.display());
            }
            if summary.is_rejected() {
                anyhow::bail!("更新入力ファイルが拒否されました");
            }
        }

        Commands::Preview { master, rows } => {
            let path = master.unwrap_or_else(|| config.master_path.clone());
            let table = update::preview_master(&path, &config.master_sheet, rows)?;

            println!("{}", table.headers.join("\t"));
            for row in 0..table.len() {
                let cells: Vec<&str> = (0..table.headers.len()).map(|c| table.cell(row, c)).collect();
                println!("{}", cells.join("\t"));
            }
        }

        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.bind_addr.clone());
            server::serve(config, &addr).await?;
        }

        Commands::Config { set_top_n, set_threshold, set_master, show } => {
            // 環境変数の上書きを保存しないよう、ファイルの値を編集する
            let runtime = config;
            let mut config = Config::load_stored().context("設定ファイルの読み込みに失敗")?;

            if let Some(top_n) = set_top_n {
                config.set_default_top_n(top_n)?;
                println!("✔ 上位件数を設定しました: {}", top_n);
            }

            if let Some(threshold) = set_threshold {
                config.set_default_threshold(threshold)?;
                println!("✔ 閾値を設定しました: {}%", threshold);
            }

            if let Some(path) = set_master {
                println!("✔ マスタを設定しました: {}", path.display());
                config.set_master_path(path)?;
            }

            if show {
                println!("設定:");
                println!("  上位件数: {}", config.default_top_n);
                println!("  閾値: {}%", config.default_threshold);
                println!("  マスタ: {} (シート: {})", config.master_path.display(), config.master_sheet);
                if runtime.master_path != config.master_path {
                    println!("    環境変数で上書き中: {}", runtime.master_path.display());
                }
                println!("  監査ログ: {}", config.log_dir.display());
                println!("  待ち受け: {}", config.bind_addr);
                if runtime.bind_addr != config.bind_addr {
                    println!("    環境変数で上書き中: {}", runtime.bind_addr);
                }
                println!("  アップロード上限: {}MB", config.max_upload_mb);
            }
        }
    }

    Ok(())
}
