//! Application runner logic
//!
//! Handles the different ways to run scrawl: config initialization,
//! typeface listing and document conversion

use crate::core::cli::CliArgs;
use crate::core::communication::{spawn_conversion, ConversionRequest, ConversionSlot, JobMessage};
use crate::core::config_file::ConfigFile;
use crate::fonts::GlyphCoverageIndex;
use crate::pipeline::ConversionReport;
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Run scrawl with the given CLI arguments.
/// Handles special CLI flags and delegates to the conversion job.
pub fn run_app(cli_args: CliArgs) -> Result<()> {
    // Handle --new-config flag specially
    if cli_args.new_config {
        return ConfigFile::initialize_config_directory()
            .context("Failed to initialize config directory");
    }

    cli_args
        .validate()
        .map_err(|e| anyhow!("CLI validation failed: {}", e))?;

    let config = ConfigFile::load();
    let fonts_dir = cli_args.fonts_dir(config.as_ref());

    let mut index = GlyphCoverageIndex::new();
    if index.load(&fonts_dir) == 0 {
        warn!(
            "No usable typefaces in {:?}. Put .ttf or .otf files there or pass --fonts",
            fonts_dir
        );
    }

    if cli_args.list_fonts {
        print_typefaces(&index);
        return Ok(());
    }

    let input = cli_args
        .input
        .clone()
        .ok_or_else(|| anyhow!("No input document given"))?;
    let output = cli_args
        .output_path()
        .ok_or_else(|| anyhow!("Could not determine an output path"))?;

    let request = ConversionRequest {
        index: Arc::new(index),
        settings: cli_args.settings(config.as_ref()),
        seed: cli_args.seed(config.as_ref()),
        input,
        output,
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let report = runtime.block_on(run_conversion(request))?;

    for line in report.summary_lines() {
        println!("{line}");
    }

    if let Some(path) = &cli_args.report {
        report
            .save(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {:?}", path);
    }

    Ok(())
}

async fn run_conversion(request: ConversionRequest) -> Result<ConversionReport> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let slot = ConversionSlot::new();
    let handle = spawn_conversion(&slot, request, tx)?;

    while let Some(message) = rx.recv().await {
        match message {
            JobMessage::Started { input, output } => {
                info!("Started converting {:?} into {:?}", input, output)
            }
            JobMessage::ParagraphDone(ordinal) => debug!("Paragraph {} done", ordinal),
            JobMessage::Completed(report) => {
                info!("Conversion finished: {} characters", report.total_chars)
            }
            JobMessage::Failed(reason) => error!("Conversion failed: {}", reason),
        }
    }

    let report = handle.await.context("Conversion worker stopped unexpectedly")??;
    Ok(report)
}

fn print_typefaces(index: &GlyphCoverageIndex) {
    println!("{} typefaces loaded", index.typeface_count());
    for record in index.records() {
        println!(
            "  {} ({} characters) {}",
            record.name,
            record.glyph_set.len(),
            record.source_path.display()
        );
    }
}
