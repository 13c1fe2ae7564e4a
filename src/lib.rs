//! yolo2gt: YOLO detection labels to Ground Truth manifests.
//!
//! yolo2gt reads a YOLO-format dataset (per-image label files holding
//! normalized `class cx cy w h` boxes) and writes a single JSON Lines
//! manifest of pixel-space object-detection records that a labeling or
//! training job can consume directly.
//!
//! # Modules
//!
//! - [`ir`]: Typed records, boxes, the YOLO reader, and the manifest writer
//! - [`conversion`]: Run orchestration and the conversion report
//! - [`config`]: Layered run configuration
//! - [`error`]: Error types for yolo2gt operations

pub mod config;
pub mod conversion;
pub mod error;
pub mod ir;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use config::ConversionConfig;
pub use error::Yolo2GtError;

/// The yolo2gt CLI application.
#[derive(Parser)]
#[command(name = "yolo2gt")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert the dataset and write the manifest.
    Convert(RunArgs),
    /// Convert the dataset and print the report without writing anything.
    Check(RunArgs),
}

/// Arguments shared by `convert` and `check`.
#[derive(clap::Args)]
struct RunArgs {
    /// Dataset root containing one directory per split.
    #[arg(env = "YOLO2GT_DATASET_ROOT")]
    dataset_root: Option<PathBuf>,

    /// YAML config file using datasetRoot/classDefinitionPath/outputPath/sourceRefPrefix keys.
    #[arg(long, env = "YOLO2GT_CONFIG")]
    config: Option<PathBuf>,

    /// Class definition (data.yaml or classes.txt). Defaults to one found in the dataset root.
    #[arg(long = "classes", env = "YOLO2GT_CLASSES")]
    class_definition_path: Option<PathBuf>,

    /// Manifest path. Defaults to '<dataset root>-output--yolo--to--gt.output.manifest'.
    #[arg(short, long, env = "YOLO2GT_OUTPUT")]
    output: Option<PathBuf>,

    /// Prefix for each record's source-ref, e.g. 's3://bucket/datasets/sharks'.
    #[arg(long, env = "YOLO2GT_SOURCE_REF_PREFIX")]
    source_ref_prefix: Option<String>,

    /// Split directory to convert; repeat for several (default: train, valid).
    #[arg(long = "split")]
    splits: Vec<String>,

    /// Worker threads for per-image processing.
    #[arg(short, long, env = "YOLO2GT_JOBS")]
    jobs: Option<usize>,

    /// Fail without writing if the report contains any warning.
    #[arg(long, overrides_with = "no_strict")]
    strict: bool,

    /// Turn off strict mode set in the config file.
    #[arg(long, overrides_with = "strict")]
    no_strict: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

impl RunArgs {
    /// Merges the CLI flags over the optional config file.
    fn to_config(&self) -> Result<ConversionConfig, Yolo2GtError> {
        let file_layer = match &self.config {
            Some(path) => config::ConfigLayer::from_yaml_file(path)?,
            None => config::ConfigLayer::default(),
        };

        let cli_layer = config::ConfigLayer {
            class_definition_path: self.class_definition_path.clone(),
            dataset_root: self.dataset_root.clone(),
            output_path: self.output.clone(),
            source_ref_prefix: self.source_ref_prefix.clone(),
            splits: (!self.splits.is_empty()).then(|| self.splits.clone()),
            jobs: self.jobs,
            strict: match (self.strict, self.no_strict) {
                (true, _) => Some(true),
                (false, true) => Some(false),
                (false, false) => None,
            },
        };

        ConversionConfig::resolve(cli_layer.over(file_layer))
    }
}

/// Run the yolo2gt CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), Yolo2GtError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_conversion(&args, true),
        Some(Commands::Check(args)) => run_conversion(&args, false),
        None => {
            println!("yolo2gt {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert YOLO detection datasets into Ground Truth manifests.");
            println!();
            println!("Run 'yolo2gt --help' for usage information.");
            Ok(())
        }
    }
}

fn run_conversion(args: &RunArgs, write: bool) -> Result<(), Yolo2GtError> {
    let config = args.to_config()?;

    let result = if write {
        conversion::convert_and_write(&config)
    } else {
        conversion::check_dataset(&config).map(|c| c.report)
    };

    match result {
        Ok(report) => {
            print_report(&report, args.report)?;
            if write {
                println!("Manifest written to {}", config.output_path.display());
            }
            Ok(())
        }
        Err(Yolo2GtError::StrictCheckFailed {
            warning_count,
            report,
        }) => {
            print_report(&report, args.report)?;
            Err(Yolo2GtError::StrictCheckFailed {
                warning_count,
                report,
            })
        }
        Err(err) => Err(err),
    }
}

fn print_report(
    report: &conversion::ConversionReport,
    format: ReportFormat,
) -> Result<(), Yolo2GtError> {
    match format {
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(report).map_err(Yolo2GtError::ReportSerialize)?;
            println!("{json}");
        }
        ReportFormat::Text => print!("{report}"),
    }
    Ok(())
}
