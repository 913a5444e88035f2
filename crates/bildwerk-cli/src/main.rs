// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk — compose ordered images into fixed-size PDF pages
//
// Entry point. Initialises logging, loads configuration, and dispatches the
// subcommand.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use bildwerk_core::human_errors::humanize_error;
use bildwerk_core::{AppConfig, BildwerkError, Document, PageFormat};
use bildwerk_render::{DocumentAssembler, ImageProcessor, PdfReader};

#[derive(Parser)]
#[command(name = "bildwerk", version)]
#[command(about = "Compose ordered images into fixed-size PDF pages")]
struct Cli {
    /// JSON configuration file (default page, clamping ranges, title)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every entry of a project file into one PDF
    Build {
        /// Project file (JSON)
        project: PathBuf,

        /// Output PDF path
        #[arg(short, long)]
        output: PathBuf,

        /// Title stored in the PDF metadata
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Render a single page of a project file to PNG
    Preview {
        /// Project file (JSON)
        project: PathBuf,

        /// Page number, starting at 1; out-of-range values clamp
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Concatenate PDF files in the given order
    Merge {
        /// Input PDF files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output PDF path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List the supported page formats
    Formats,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            project,
            output,
            title,
        } => run_build(&config, &project, &output, title),
        Commands::Preview {
            project,
            page,
            output,
        } => run_preview(&config, &project, page, &output),
        Commands::Merge { inputs, output } => run_merge(&inputs, &output),
        Commands::Formats => {
            print!("{}", format_table());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

/// Load a project, applying the configured default page and clamping ranges.
fn load_project(config: &AppConfig, path: &Path) -> anyhow::Result<Document> {
    let mut document = Document::load_with_default_page(path, &config.default_page)
        .with_context(|| format!("loading project {}", path.display()))?;

    document.page.margin = config.clamp_margin(document.page.margin);
    for index in 0..document.len() {
        if let Some(entry) = document.get_mut(index) {
            entry.scale = config.clamp_scale(entry.scale);
        }
    }
    Ok(document)
}

fn run_build(
    config: &AppConfig,
    project: &Path,
    output: &Path,
    title: Option<String>,
) -> anyhow::Result<()> {
    let document = load_project(config, project)?;
    let title = title.unwrap_or_else(|| config.document_title.clone());

    DocumentAssembler::with_title(title).build_to_file(
        document.entries(),
        &document.page,
        output,
    )?;

    tracing::info!(
        pages = document.len(),
        output = %output.display(),
        "Build finished"
    );
    Ok(())
}

fn run_preview(
    config: &AppConfig,
    project: &Path,
    page: usize,
    output: &Path,
) -> anyhow::Result<()> {
    let document = load_project(config, project)?;
    let raster = DocumentAssembler::new().preview_page(
        document.entries(),
        &document.page,
        page.saturating_sub(1),
    )?;
    ImageProcessor::from_rgb(raster).save_png(output)?;
    Ok(())
}

fn run_merge(inputs: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    let merged = PdfReader::merge_files(inputs)?;
    std::fs::write(output, &merged)
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        inputs = inputs.len(),
        output = %output.display(),
        "Merge finished"
    );
    Ok(())
}

fn format_table() -> String {
    PageFormat::ALL
        .iter()
        .map(|format| {
            let (w_pt, h_pt) = format.dimensions_pt();
            let (w_mm, h_mm) = format.dimensions_mm();
            format!(
                "{:<8} {:>7.2} x {:>7.2} pt  {:>5.0} x {:>5.0} mm\n",
                format.name(),
                w_pt,
                h_pt,
                w_mm,
                h_mm
            )
        })
        .collect()
}

/// Print an error for a person, not a log parser.
fn report(err: &anyhow::Error) {
    tracing::error!(error = %format!("{err:#}"), "Command failed");

    match err.downcast_ref::<BildwerkError>() {
        Some(bildwerk_err) => {
            let human = humanize_error(bildwerk_err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            if human.retriable {
                eprintln!("  (trying again may help)");
            }
        }
        None => eprintln!("error: {err:#}"),
    }
}
