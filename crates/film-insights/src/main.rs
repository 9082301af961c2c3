//! CLI entry point for the film market analysis.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use film_insights::{
    Analysis, AnalysisConfig, AnalysisResult, ReportGenerator, TableKind, TitleMatch,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Box-office market analysis over IMDb and Box Office Mojo data",
    long_about = "Cleans and joins the IMDb title basics, IMDb title ratings and Box Office \
                  Mojo gross tables, then reports which years, genres, studios and titles \
                  dominate the market.\n\n\
                  EXAMPLES:\n  \
                  # Run over the default file names in the current directory\n  \
                  film-insights\n\n  \
                  # Read from data/, match titles loosely, keep a JSON report\n  \
                  film-insights --data-dir data --normalize-titles --emit-report\n\n  \
                  # Machine-readable output only\n  \
                  film-insights --json --no-charts | jq .join"
)]
struct Args {
    /// Directory holding the three source tables
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Directory charts and the report are written to
    #[arg(short, long, default_value = "outputs")]
    output_dir: PathBuf,

    /// Rows kept by the top-titles and popular-studios tables
    #[arg(long, default_value = "10")]
    top_n: usize,

    /// Rows kept by the per-genre gross tables
    #[arg(long, default_value = "5")]
    genre_top_n: usize,

    /// Keep only years with more titles than this in the per-year count
    #[arg(long, default_value = "100")]
    min_movies_per_year: u32,

    /// Number of bins in the runtime histogram
    #[arg(long, default_value = "30")]
    runtime_bins: usize,

    /// Match titles ignoring case, punctuation and extra whitespace
    #[arg(long)]
    normalize_titles: bool,

    /// Skip writing PNG charts
    #[arg(long)]
    no_charts: bool,

    /// Write film_market_report.json to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Output the JSON report to stdout instead of a human-readable summary
    ///
    /// Disables all logging so stdout only carries JSON.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides `level`. With `json_output` no subscriber is
/// installed.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let title_match = if args.normalize_titles {
        TitleMatch::Normalized
    } else {
        TitleMatch::Exact
    };

    AnalysisConfig::builder()
        .data_dir(&args.data_dir)
        .output_dir(&args.output_dir)
        .top_n(args.top_n)
        .studio_top_n(args.top_n)
        .genre_top_n(args.genre_top_n)
        .min_movies_per_year(args.min_movies_per_year)
        .runtime_bins(args.runtime_bins)
        .title_match(title_match)
        .render_charts(!args.no_charts)
        .emit_report(args.emit_report)
        .build()
        .context("Invalid arguments")
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;

    let mut builder = Analysis::builder().config(config.clone());
    if !args.quiet {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let analysis = builder.build()?;

    let result = analysis
        .run()
        .map_err(|e| anyhow!("Analysis failed [{}]: {}", e.error_code(), e))?;

    if args.json {
        let report = ReportGenerator::build_report(&config, &result)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&result);
    Ok(())
}

/// Print the run summary.
///
/// Uses `println!` so the summary is visible at every log level.
fn print_human_readable_summary(result: &AnalysisResult) {
    println!("\n{}", "=".repeat(80));
    println!("FILM MARKET ANALYSIS");
    println!("{}\n", "=".repeat(80));

    println!("SOURCE TABLES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<16} {:>10} {:>8} {:>10} {:>12}",
        "Table", "Rows", "Columns", "Nulls", "Duplicates"
    );
    for profile in &result.profiles {
        println!(
            "{:<16} {:>10} {:>8} {:>10} {:>12}",
            profile.table.display_name(),
            profile.shape.0,
            profile.shape.1,
            profile.total_nulls(),
            profile.duplicate_count
        );
    }
    println!();

    println!("CLEANING");
    println!("{}", "-".repeat(40));
    for kind in TableKind::ALL {
        if let Some(cleaning) = result.cleaning_for(kind) {
            println!(
                "  {}: {} -> {} rows ({} dropped)",
                kind, cleaning.report.rows_before, cleaning.report.rows_after, cleaning.report.rows_dropped
            );
            for action in &cleaning.report.actions {
                println!("    - {}", action);
            }
        }
    }
    println!();

    println!("CATALOG");
    println!("{}", "-".repeat(40));
    println!("  Title matches: {}", result.join.title_matched_rows);
    println!("  Unmatched gross rows: {}", result.join.unmatched_gross_rows);
    println!("  Catalog rows: {}", result.join.catalog_rows);
    println!();

    for (name, df) in result.aggregates.frames() {
        println!("{}", name.to_uppercase().replace('_', " "));
        println!("{}", "-".repeat(40));
        println!("{}\n", df);
    }

    if !result.chart_paths.is_empty() {
        println!("CHARTS");
        println!("{}", "-".repeat(40));
        for path in &result.chart_paths {
            println!("  {}", path.display());
        }
        println!();
    }

    if let Some(path) = &result.report_path {
        println!("Report written to: {}", path.display());
    }
    println!("Completed in {} ms", result.duration_ms);
}
