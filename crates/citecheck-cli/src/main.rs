use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use citecheck_core::{Config, ProgressEvent, config_file};
use citecheck_reporting::{ExportFormat, export_results};

mod output;

use output::ColorMode;

/// Reference Checker - extract and validate bibliographic references
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract references from a plain-text document and validate them
    Check {
        /// Path to the UTF-8 text file with the document's content
        file_path: PathBuf,

        /// Directory for the generated reports
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Connect timeout per request in seconds (read timeout is twice this)
        #[arg(long)]
        timeout: Option<u64>,

        /// Delay between requests in seconds
        #[arg(long)]
        delay: Option<f64>,

        /// Search the web for references that carry no URL
        #[arg(long)]
        enable_search: bool,

        /// Skip URL validation (extract references only)
        #[arg(long)]
        no_validate: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Comma-separated report formats: json, text, markdown
        #[arg(long, value_delimiter = ',', default_values = ["json", "text"])]
        format: Vec<String>,
    },

    /// Extract references and print them without validating anything
    Extract {
        /// Path to the UTF-8 text file with the document's content
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract {
            file_path,
            no_color,
        } => extract(file_path, ColorMode(!no_color)),
        Command::Check {
            file_path,
            output_dir,
            timeout,
            delay,
            enable_search,
            no_validate,
            no_color,
            format,
        } => {
            check(
                file_path,
                output_dir,
                timeout,
                delay,
                enable_search,
                no_validate,
                ColorMode(!no_color),
                format,
            )
            .await
        }
    }
}

fn extract(file_path: PathBuf, color: ColorMode) -> anyhow::Result<()> {
    let refs = extract_from_file(&file_path)?;
    for (i, reference) in refs.iter().enumerate() {
        output::print_reference(i, reference, color);
    }
    output::print_summary(&refs, false, color);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn check(
    file_path: PathBuf,
    output_dir: PathBuf,
    timeout: Option<u64>,
    delay: Option<f64>,
    enable_search: bool,
    no_validate: bool,
    color: ColorMode,
    format: Vec<String>,
) -> anyhow::Result<()> {
    let formats = format
        .iter()
        .map(|f| parse_format(f))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut refs = extract_from_file(&file_path)?;
    println!("Extracted {} references", refs.len());

    let validated = !no_validate;
    if validated {
        let config = resolve_config(timeout, delay, enable_search);
        let bar = ProgressBar::new(refs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let progress_bar = bar.clone();
        let cancel = CancellationToken::new();
        citecheck_core::validate_references(
            &mut refs,
            &config,
            move |event| match event {
                ProgressEvent::Checking { index, .. } => {
                    progress_bar.set_position(index as u64);
                }
                ProgressEvent::CheckingUrl { url, .. } => {
                    progress_bar.set_message(url);
                }
                ProgressEvent::UrlChecked {
                    url,
                    accessible,
                    status,
                    ..
                } => {
                    let status = status.map_or_else(String::new, |s| format!(" ({s})"));
                    let mark = if accessible { "ok" } else { "fail" };
                    progress_bar.set_message(format!("{mark}{status} {url}"));
                }
                ProgressEvent::Searching { query, .. } => {
                    progress_bar.set_message(format!("searching: {query}"));
                }
                ProgressEvent::SearchComplete { best_score, .. } => {
                    let score = best_score.map_or_else(|| "none".to_string(), |s| s.to_string());
                    progress_bar.set_message(format!("search done, best score {score}"));
                }
            },
            cancel,
        )
        .await?;
        bar.finish_and_clear();
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    for format in formats {
        let path = output_dir.join(format!("references.{}", format.extension()));
        export_results(&refs, format, &path).map_err(anyhow::Error::msg)?;
        println!("Report written to {}", path.display());
    }

    output::print_summary(&refs, validated, color);
    Ok(())
}

fn extract_from_file(file_path: &PathBuf) -> anyhow::Result<Vec<citecheck_core::Reference>> {
    let text = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    citecheck_parsing::extract_references(&text)
        .with_context(|| format!("could not extract references from {}", file_path.display()))
}

/// Resolution order: CLI flag > env var > config file > default.
fn resolve_config(timeout: Option<u64>, delay: Option<f64>, enable_search: bool) -> Config {
    let mut config = config_file::load_config().runtime_config();

    let timeout = timeout.or_else(|| {
        std::env::var("CITECHECK_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
    });
    if let Some(secs) = timeout {
        config.connect_timeout = Duration::from_secs(secs);
    }

    let delay = delay.or_else(|| {
        std::env::var("CITECHECK_DELAY")
            .ok()
            .and_then(|v| v.parse().ok())
    });
    if let Some(secs) = delay {
        config.request_delay = Duration::from_secs_f64(secs.max(0.0));
    }

    if enable_search {
        config.enable_search = true;
    }

    config
}

fn parse_format(s: &str) -> anyhow::Result<ExportFormat> {
    match s.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(ExportFormat::Json),
        "text" | "txt" => Ok(ExportFormat::Text),
        "markdown" | "md" => Ok(ExportFormat::Markdown),
        other => anyhow::bail!("unknown report format: {other}"),
    }
}
