#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for rendering QSO statistics widgets.
//!
//! ```text
//! qso_widget stats <SOURCE> [--layout table|horizontal] [--format text|html|json]
//! qso_widget page <HTML_FILE> [--output <FILE>] [--placeholders]
//! qso_widget run --config <widgets.toml> [--format text|html|json]
//! ```
//!
//! `SOURCE` is an `http(s)://` URL or a local file path. Logging is
//! controlled with `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use qso_widget::page::{render_page, render_placeholders};
use qso_widget::{
    FileFetcher, HttpFetcher, Layout, SourceFetcher, WidgetConfig, WidgetOutcome, fetch_stats,
    load_widgets,
};
use qso_widget_models::parse_manifest;
use qso_widget_render::{render_html, render_text};

#[derive(Parser)]
#[command(name = "qso_widget", about = "Render QSO log statistics widgets")]
struct Cli {
    /// Total request timeout in seconds (no timeout by default)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive and print statistics for a single source
    Stats {
        /// URL or path of the JSON source
        source: String,
        /// Presentation layout
        #[arg(long, default_value = "table")]
        layout: Layout,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Fill every `.qso-widget` marker in an HTML page
    Page {
        /// HTML file to process
        input: PathBuf,
        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Only insert loading placeholders, without fetching anything
        #[arg(long)]
        placeholders: bool,
    },
    /// Load every widget listed in a TOML manifest
    Run {
        /// Manifest file with `[[widget]]` entries
        #[arg(long, short)]
        config: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats {
            source,
            layout,
            format,
        } => {
            let fetcher = build_fetcher(cli.timeout, None)?;
            let config = WidgetConfig::new(source, layout);
            let stats = fetch_stats(&fetcher, &config).await?;

            match format {
                OutputFormat::Text => println!("{}", render_text(&stats, layout)),
                OutputFormat::Html => println!("{}", render_html(&stats, layout)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
            }
        }
        Commands::Page {
            input,
            output,
            placeholders,
        } => {
            let html = tokio::fs::read_to_string(&input).await?;

            let rendered = if placeholders {
                render_placeholders(&html)?
            } else {
                let fetcher = build_fetcher(cli.timeout, input.parent())?;
                render_page(&fetcher, &html).await?
            };

            if let Some(path) = output {
                tokio::fs::write(&path, rendered).await?;
                log::info!("Wrote {}", path.display());
            } else {
                println!("{rendered}");
            }
        }
        Commands::Run { config, format } => {
            let manifest = parse_manifest(&tokio::fs::read_to_string(&config).await?)?;
            if manifest.widgets.is_empty() {
                println!("No widgets configured in {}", config.display());
                return Ok(());
            }

            let fetcher = build_fetcher(cli.timeout, config.parent())?;
            let outcomes = load_widgets(&fetcher, &manifest.widgets).await;

            for (widget, outcome) in manifest.widgets.iter().zip(&outcomes) {
                print_outcome(widget, outcome, format)?;
            }

            let failed = outcomes.iter().filter(|o| o.error().is_some()).count();
            if failed > 0 {
                log::warn!("{failed} of {} widget(s) failed", outcomes.len());
            }
        }
    }

    Ok(())
}

/// Builds a fetcher that serves URLs over HTTP and resolves local paths
/// against `base_dir`.
fn build_fetcher(
    timeout_secs: Option<u64>,
    base_dir: Option<&Path>,
) -> Result<SourceFetcher, Box<dyn std::error::Error>> {
    let mut http = HttpFetcher::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(secs) = timeout_secs {
        http = http.timeout(Duration::from_secs(secs));
    }

    let mut file = FileFetcher::new();
    if let Some(dir) = base_dir.filter(|d| !d.as_os_str().is_empty()) {
        file = file.with_base_dir(dir);
    }

    Ok(SourceFetcher::new(http.build()?, file))
}

fn print_outcome(
    widget: &WidgetConfig,
    outcome: &WidgetOutcome,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let src = widget.src.as_deref().unwrap_or("<no src>");

    match format {
        OutputFormat::Html => println!("{}", outcome.html()),
        OutputFormat::Json => {
            let value = match outcome {
                WidgetOutcome::Rendered { stats, .. } => {
                    serde_json::json!({"src": src, "stats": stats})
                }
                WidgetOutcome::Failed { error, .. } => {
                    serde_json::json!({"src": src, "error": error.display_message()})
                }
            };
            println!("{}", serde_json::to_string(&value)?);
        }
        OutputFormat::Text => {
            println!("== {src}");
            match outcome {
                WidgetOutcome::Rendered { stats, .. } => {
                    println!("{}", render_text(stats, widget.layout));
                }
                WidgetOutcome::Failed { error, .. } => println!("{}", error.display_message()),
            }
            println!();
        }
    }

    Ok(())
}
