use anyhow::{Result, anyhow};
use churn_prep::{
    CleaningPipeline, CleaningReport, Dataset, EmptyColumnPolicy, OutlierStrategy, PipelineConfig,
    ReportGenerator, TrainingFrame, load_csv, write_csv,
};
use clap::{Parser, ValueEnum};
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::{error, info};

/// CLI-compatible outlier strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierStrategy {
    /// Replace outliers with the column median
    Median,
    /// Remove rows containing outliers
    Remove,
}

impl From<CliOutlierStrategy> for OutlierStrategy {
    fn from(cli: CliOutlierStrategy) -> Self {
        match cli {
            CliOutlierStrategy::Median => OutlierStrategy::Median,
            CliOutlierStrategy::Remove => OutlierStrategy::Remove,
        }
    }
}

/// CLI-compatible policy for columns without any value
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEmptyColumnPolicy {
    /// Stop with an error
    Fail,
    /// Fill with 0 (numeric and flag) or "unknown" (categorical)
    FillDefault,
}

impl From<CliEmptyColumnPolicy> for EmptyColumnPolicy {
    fn from(cli: CliEmptyColumnPolicy) -> Self {
        match cli {
            CliEmptyColumnPolicy::Fail => EmptyColumnPolicy::Fail,
            CliEmptyColumnPolicy::FillDefault => EmptyColumnPolicy::FillDefault,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Churn dataset cleaning pipeline",
    long_about = "Cleans a customer churn CSV for model training: imputes missing values,\n\
                  normalizes flag columns to 0/1, handles IQR outliers and min-max scales\n\
                  numeric features.\n\n\
                  EXAMPLES:\n  \
                  # Clean with defaults, writing output/cleaned_churn_data.csv\n  \
                  churn-prep -i data/churn.csv\n\n  \
                  # Remove outlier rows and also drop rows without a label\n  \
                  churn-prep -i data/churn.csv --outlier-strategy remove --require-target\n\n  \
                  # Print the JSON report only\n  \
                  churn-prep -i data/churn.csv --json"
)]
struct Args {
    /// Path to the CSV file to clean
    #[arg(short, long)]
    input: String,

    /// Output directory for results
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Output file name (without extension)
    #[arg(long, default_value = churn_prep::config::DEFAULT_OUTPUT_NAME)]
    output_name: String,

    /// Target (label) column
    #[arg(long, default_value = churn_prep::config::DEFAULT_TARGET_COLUMN)]
    target: String,

    /// Identifier column; rows missing it are dropped (repeatable)
    #[arg(long = "id-column", default_value = churn_prep::config::DEFAULT_ID_COLUMN)]
    id_columns: Vec<String>,

    /// Categorical column that is mode filled and lowercased
    #[arg(long, default_value = churn_prep::config::DEFAULT_CATEGORICAL_COLUMN)]
    categorical_column: String,

    /// Do not treat any column as the designated categorical column
    #[arg(long, conflicts_with = "categorical_column")]
    no_categorical_column: bool,

    /// Flag columns forced into {0, 1}
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "HasCrCard,IsActiveMember,Churn"
    )]
    binary_columns: Vec<String>,

    /// Strategy for handling outliers
    #[arg(long, value_enum, default_value = "median")]
    outlier_strategy: CliOutlierStrategy,

    /// IQR multiplier for outlier bounds
    #[arg(long, default_value = "1.5")]
    iqr_multiplier: f64,

    /// What to do with a column that has no values at all
    #[arg(long, value_enum, default_value = "fail")]
    empty_column_policy: CliEmptyColumnPolicy,

    /// Also drop rows missing the target column
    #[arg(long)]
    require_target: bool,

    /// Skip min-max scaling
    #[arg(long)]
    no_scaling: bool,

    /// Also write a model-ready CSV (one-hot encoded, identifiers dropped)
    #[arg(long)]
    export_training: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize logging based on CLI arguments.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    // Keep stdout clean for the JSON report
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

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;

    info!("Loading dataset from: {}", args.input);
    let data = load_csv(&args.input)?;

    let mut builder = CleaningPipeline::builder().config(config.clone());
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
    let pipeline = builder.build()?;

    run_pipeline(&pipeline, &config, &args, data)
}

/// Translate CLI arguments into a validated pipeline configuration.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let builder = PipelineConfig::builder()
        .binary_columns(&args.binary_columns)
        .target_column(&args.target)
        .id_columns(&args.id_columns)
        .require_target(args.require_target)
        .outlier_strategy(args.outlier_strategy.into())
        .iqr_multiplier(args.iqr_multiplier)
        .empty_column_policy(args.empty_column_policy.into())
        .scale_features(!args.no_scaling)
        .output_dir(&args.output)
        .output_name(&args.output_name);

    let builder = if args.no_categorical_column {
        builder.no_categorical_column()
    } else {
        builder.categorical_column(&args.categorical_column)
    };
    Ok(builder.build()?)
}

/// Run the pipeline and write its outputs.
fn run_pipeline(
    pipeline: &CleaningPipeline,
    config: &PipelineConfig,
    args: &Args,
    data: DataFrame,
) -> Result<()> {
    info!("{}", "=".repeat(80));
    info!("Starting churn data cleaning...");
    info!("{}", "=".repeat(80));

    let original = Dataset::with_roles(data.clone(), config);
    let result = pipeline.process(data).map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed: {}", e)
    })?;

    let output_path = config.output_path();
    let mut cleaned = result.dataset.frame().clone();
    write_csv(&mut cleaned, &output_path)?;

    let training_path = if args.export_training {
        let frame = TrainingFrame::from_dataset(&result.dataset, config)?;
        let path = config
            .output_dir
            .join(format!("{}_training.csv", config.output_name));
        write_csv(&mut frame.to_frame()?, &path)?;
        Some(path)
    } else {
        None
    };

    let report = CleaningReport::build(&original, &result.dataset, &result.summary, config)?
        .with_files(Some(Path::new(&args.input)), Some(&output_path));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let input_stem = extract_file_stem(&args.input);
        let report_path =
            ReportGenerator::new(&config.output_dir).write_report_to_file(&report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&report, &output_path, training_path.as_deref());
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print the run summary to stdout.
fn print_human_readable_summary(
    report: &CleaningReport,
    output_path: &Path,
    training_path: Option<&Path>,
) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file.as_deref().unwrap_or("-"),
        summary.rows_before,
        summary.columns
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        output_path.display(),
        summary.rows_after,
        summary.columns
    );
    if let Some(path) = training_path {
        println!("Training: {}", path.display());
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed, {:.1}%)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed,
        summary.rows_removed_percentage()
    );
    println!(
        "  Missing cells: {} -> {}",
        summary.missing_before, summary.missing_after
    );
    println!();

    if !summary.actions.is_empty() {
        println!("Actions Taken:");
        for action in &summary.actions {
            println!(
                "  - [{}] {}",
                action.action_type.display_name(),
                action.description
            );
        }
        println!();
    }

    if !report.flag_distributions.is_empty() {
        println!("Flag Distributions:");
        for (column, dist) in &report.flag_distributions {
            let rate = dist
                .positive_rate()
                .map(|r| format!("{:.1}%", r * 100.0))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<20} 0: {:<8} 1: {:<8} positive: {}",
                column, dist.zeros, dist.ones, rate
            );
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  - {}", warning);
        }
        println!();
    }

    println!("{}", "=".repeat(80));
}
