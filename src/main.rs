use std::error::Error as _;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use wound_ratio::input::{
    ColumnNames, HeaderPreset, find_reference_path, resolve_output_paths, write_table,
};
use wound_ratio::logging::{LogConfig, LogFormat, init_logging};
use wound_ratio::model::{PercentPolicy, RoundingPolicy, SegmentOrder};
use wound_ratio::pipeline::stage1_reference::{ReferenceCache, ReferenceSettings};
use wound_ratio::pipeline::stage4_format::ratio_table;
use wound_ratio::pipeline::{BuildOptions, InputJob, PipelineError, run_input, write_summaries};

fn main() {
    let cli = Cli::parse();
    let log = LogConfig::from_flags(cli.verbose, cli.quiet, cli.log_format.into());
    if let Err(err) = init_logging(&log) {
        eprintln!("{err}");
    }
    let config = RunConfig::from_cli(cli);
    if let Err(err) = run(&config) {
        tracing::error!("{err}");
        let mut source = err.source();
        while let Some(cause) = source {
            tracing::error!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wound-ratio",
    version,
    about = "Annotate surgical worksheets with wound-category ratios per procedure and diagnosis"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    log_format: LogFormatArg,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Append the ratio column to one or more worksheets.
    Run(RunArgs),
    /// Export the ratio map built from the reference table.
    Ratios(RatiosArgs),
}

#[derive(Debug, Args)]
struct ReferenceArgs {
    /// Reference table (default: 对照表.xlsx or reference.csv in the working directory).
    #[arg(long, value_name = "PATH")]
    reference: Option<PathBuf>,

    /// Worksheet of the reference workbook (default: first sheet).
    #[arg(long, value_name = "NAME")]
    reference_sheet: Option<String>,

    #[arg(long, value_enum, default_value_t = HeadersArg::En)]
    headers: HeadersArg,

    #[arg(long, value_name = "NAME")]
    procedure_column: Option<String>,

    #[arg(long, value_name = "NAME")]
    diagnosis_column: Option<String>,

    #[arg(long, value_name = "NAME")]
    category_column: Option<String>,

    #[arg(long, value_name = "NAME")]
    ratio_column: Option<String>,

    #[arg(long, value_enum, default_value_t = RoundingArg::HalfEven)]
    rounding: RoundingArg,

    /// Adjust percentages so every group sums to exactly 100.
    #[arg(long)]
    balance_percent: bool,

    #[arg(long, value_enum, default_value_t = SegmentOrderArg::FirstSeen)]
    segment_order: SegmentOrderArg,

    /// Keep the ratio map next to the reference and reuse it while the file is unchanged.
    #[arg(long)]
    cache_ratios: bool,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    reference: ReferenceArgs,

    /// Worksheet(s) to annotate; `-` reads CSV from stdin.
    #[arg(long = "input", value_name = "PATH", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Output file, or directory when several inputs are given.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Worksheet of the input workbook (default: first sheet).
    #[arg(long, value_name = "NAME")]
    sheet: Option<String>,

    /// Write a JSON run summary.
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RatiosArgs {
    #[command(flatten)]
    reference: ReferenceArgs,

    #[arg(long, value_name = "PATH", default_value = "-")]
    out: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HeadersArg {
    En,
    Zh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RoundingArg {
    HalfEven,
    HalfUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SegmentOrderArg {
    FirstSeen,
    Ascending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Annotate,
    ExportRatios,
}

#[derive(Debug, Clone)]
struct RunConfig {
    run_mode: RunMode,
    reference: Option<PathBuf>,
    settings: ReferenceSettings,
    inputs: Vec<PathBuf>,
    input_sheet: Option<String>,
    out: Option<PathBuf>,
    summary: Option<PathBuf>,
}

impl RunConfig {
    fn from_cli(cli: Cli) -> Self {
        match cli.command {
            Command::Run(args) => Self {
                run_mode: RunMode::Annotate,
                reference: args.reference.reference.clone(),
                settings: reference_settings(&args.reference),
                inputs: args.inputs,
                input_sheet: args.sheet,
                out: args.out,
                summary: args.summary,
            },
            Command::Ratios(args) => Self {
                run_mode: RunMode::ExportRatios,
                reference: args.reference.reference.clone(),
                settings: reference_settings(&args.reference),
                inputs: Vec::new(),
                input_sheet: None,
                out: Some(args.out),
                summary: None,
            },
        }
    }
}

fn reference_settings(args: &ReferenceArgs) -> ReferenceSettings {
    let preset = match args.headers {
        HeadersArg::En => HeaderPreset::En,
        HeadersArg::Zh => HeaderPreset::Zh,
    };
    let columns = ColumnNames::preset(preset).with_overrides(
        args.procedure_column.as_deref(),
        args.diagnosis_column.as_deref(),
        args.category_column.as_deref(),
        args.ratio_column.as_deref(),
    );
    let options = BuildOptions {
        rounding: match args.rounding {
            RoundingArg::HalfEven => RoundingPolicy::HalfEven,
            RoundingArg::HalfUp => RoundingPolicy::HalfUp,
        },
        percent: if args.balance_percent {
            PercentPolicy::LargestRemainder
        } else {
            PercentPolicy::Independent
        },
        order: match args.segment_order {
            SegmentOrderArg::FirstSeen => SegmentOrder::FirstSeen,
            SegmentOrderArg::Ascending => SegmentOrder::Ascending,
        },
    };
    ReferenceSettings {
        columns,
        sheet: args.reference_sheet.clone(),
        options,
        persist_cache: args.cache_ratios,
    }
}

fn run(config: &RunConfig) -> Result<(), PipelineError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let reference_path = find_reference_path(&cwd, config.reference.as_deref())?;
    let mut cache = ReferenceCache::new();

    match config.run_mode {
        RunMode::ExportRatios => {
            let reference = cache.load(&reference_path, &config.settings)?;
            let out = config.out.as_deref().unwrap_or(Path::new("-"));
            write_table(out, &ratio_table(&reference.map, &config.settings.columns))?;
            tracing::info!(groups = reference.map.len(), out = %out.display(), "ratio map exported");
        }
        RunMode::Annotate => {
            let outputs = resolve_output_paths(&config.inputs, config.out.as_deref())?;
            let mut summaries = Vec::with_capacity(config.inputs.len());
            for (input_path, output_path) in config.inputs.iter().zip(&outputs) {
                // Re-fingerprinted per input; an edited reference is rebuilt mid-batch.
                let reference = cache.load(&reference_path, &config.settings)?;
                let summary = run_input(
                    &InputJob {
                        input_path,
                        output_path,
                        sheet: config.input_sheet.as_deref(),
                        columns: &config.settings.columns,
                        options: &config.settings.options,
                    },
                    &reference,
                )?;
                summaries.push(summary);
            }
            if let Some(path) = &config.summary {
                write_summaries(path, &summaries)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
