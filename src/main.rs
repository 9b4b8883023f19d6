use anyhow::Context;
use clap::Parser;
use data_formatter::app::command::{Command, HELP};
use data_formatter::app::render::{render_bar_chart, render_summary, render_table};
use data_formatter::domain::model::UploadedFile;
use data_formatter::domain::ports::Storage;
use data_formatter::utils::error::ErrorSeverity;
use data_formatter::utils::{logger, validation::Validate};
use data_formatter::{
    AppConfig, CliConfig, FormatterEngine, FormatterError, LocalStorage, Session,
    WkhtmltopdfRenderer,
};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

type AppSession = Session<WkhtmltopdfRenderer>;

/// 讀取磁碟上的檔案；讀不到的檔案直接回報，不加入批次
async fn read_uploads(paths: &[String]) -> Vec<UploadedFile> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        match tokio::fs::read(path).await {
            Ok(bytes) => files.push(UploadedFile::new(name, bytes)),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", path, e);
                println!("❌ Could not read '{}': {}", path, e);
            }
        }
    }
    files
}

async fn upload(session: &mut AppSession, paths: &[String]) {
    let files = read_uploads(paths).await;
    for summary in session.upload(files) {
        println!("{}", render_summary(&summary));
    }
}

fn report(err: &FormatterError) {
    tracing::debug!("{} (Category: {:?}, Severity: {:?})", err, err.category(), err.severity());
    println!("❌ {}", err.user_friendly_message());
    println!("💡 {}", err.recovery_suggestion());
}

async fn run_command(
    session: &mut AppSession,
    storage: &LocalStorage,
    config: &AppConfig,
    command: Command,
) -> data_formatter::Result<()> {
    match command {
        Command::Upload(paths) => upload(session, &paths).await,
        Command::List => {
            if session.entries().is_empty() {
                println!("No files uploaded yet");
            }
            for summary in session.summaries() {
                println!("{}", render_summary(&summary));
            }
        }
        Command::Preview(file) => {
            print!("{}", render_table(&session.preview(&file)?));
        }
        Command::Dedupe(file) => {
            let report = session.remove_duplicates(&file)?;
            println!(
                "✔ Removed {} duplicate rows ({} -> {})",
                report.removed(),
                report.rows_before,
                report.rows_after
            );
            print!("{}", render_table(&session.preview(&file)?));
        }
        Command::Fill(file) => {
            let report = session.fill_missing(&file)?;
            if report.filled.is_empty() {
                println!("✔ No missing numeric values");
            }
            for (column, count) in &report.filled {
                println!("✔ {}: filled {} missing values with the mean", column, count);
            }
            print!("{}", render_table(&session.preview(&file)?));
        }
        Command::Columns { file, selection } => {
            let view = session.select_columns(&file, selection)?;
            println!("✔ Columns: {}", view.column_names().join(", "));
            print!("{}", render_table(&view.head(config.preview.rows)));
        }
        Command::Chart(file) => {
            print!("{}", render_bar_chart(&session.chart_data(&file)?, config.chart.width));
        }
        Command::Convert { file, target } => {
            let artifact = session.convert(&file, target).await?;
            let saved = storage.save_artifact(&artifact).await?;
            println!(
                "📥 {} ({}, {} bytes) saved to {}",
                artifact.filename,
                artifact.mime_type,
                artifact.bytes.len(),
                saved
            );
        }
        Command::Summary => {
            let json = serde_json::to_string_pretty(&session.summaries()).map_err(|e| {
                FormatterError::ProcessingError {
                    message: e.to_string(),
                }
            })?;
            println!("{}", json);
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, &config.logging.level);
    tracing::info!("Starting data-formatter session");
    tracing::debug!("Configuration: {:?}", config);

    let renderer = WkhtmltopdfRenderer::from_config(&config.renderer);
    let engine = FormatterEngine::new(renderer).with_html_escaping(config.renderer.escape_html);
    let storage = LocalStorage::new(config.output.path.clone());
    let mut session = Session::new(engine, config.preview.rows);

    if !cli.files.is_empty() {
        upload(&mut session, &cli.files).await;
    }

    println!("Type 'help' for the list of commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout()).context("failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("❌ {}", e);
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        if let Err(e) = run_command(&mut session, &storage, &config, command).await {
            report(&e);
        }
    }

    tracing::info!("Session closed");
    Ok(())
}
