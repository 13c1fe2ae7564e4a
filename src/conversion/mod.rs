//! End-to-end conversion of a YOLO dataset into manifest records.
//!
//! [`convert_dataset`] loads the class map once, converts each configured
//! split in order, and returns the records together with a
//! [`ConversionReport`]. It never writes the manifest itself, so a failed or
//! strict-rejected run leaves no partial output behind.

pub mod report;

pub use report::{
    ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity, SplitCounts,
};

use std::collections::BTreeSet;

use crate::config::ConversionConfig;
use crate::error::Yolo2GtError;
use crate::ir::io_manifest::write_manifest;
use crate::ir::io_yolo::{
    process_split, read_class_map, ClassMapSource, ConvertedImage, ImageOutcome, SplitOptions,
};
use crate::ir::{AnnotationRecord, ClassMap};

/// Records and report produced by one run.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub records: Vec<AnnotationRecord>,
    pub report: ConversionReport,
}

/// Converts every configured split of the dataset.
///
/// Any class-map, layout, or image error aborts the whole run.
pub fn convert_dataset(config: &ConversionConfig) -> Result<Conversion, Yolo2GtError> {
    let source = ClassMapSource::resolve(
        config.class_definition_path.as_deref(),
        &config.dataset_root,
    )?;
    let class_map = read_class_map(&source)?;
    log::info!(
        "loaded {} class(es) from {}",
        class_map.len(),
        source.path().display()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.unwrap_or(0))
        .build()?;

    let opts = SplitOptions {
        class_map: &class_map,
        dataset_root: &config.dataset_root,
        source_ref_prefix: config.source_ref_prefix.as_deref(),
    };

    let mut report = ConversionReport::new(
        config.dataset_root.display().to_string(),
        source.path().display().to_string(),
        class_map.len(),
    );
    let mut records = Vec::new();

    for split in &config.splits {
        let split_dir = config.dataset_root.join(split);
        let outcomes = pool.install(|| process_split(&split_dir, &opts))?;
        let counts = absorb_split(split, outcomes, &class_map, &mut report, &mut records);
        log::info!("{counts}");
        report.splits.push(counts);
    }

    report.add(ConversionIssue::info(
        ConversionIssueCode::RecordOrder,
        format!(
            "records are ordered by split ({}) then by label file path",
            config.splits.join(", ")
        ),
    ));

    Ok(Conversion { records, report })
}

/// Runs the conversion and writes the manifest unless strict mode rejects it.
pub fn convert_and_write(config: &ConversionConfig) -> Result<ConversionReport, Yolo2GtError> {
    let conversion = check_dataset(config)?;
    write_manifest(&config.output_path, &conversion.records)?;
    log::info!(
        "wrote {} record(s) to {}",
        conversion.records.len(),
        config.output_path.display()
    );
    Ok(conversion.report)
}

/// Runs the conversion without writing, enforcing `config.strict`.
pub fn check_dataset(config: &ConversionConfig) -> Result<Conversion, Yolo2GtError> {
    let conversion = convert_dataset(config)?;
    if config.strict && !conversion.report.is_clean() {
        return Err(Yolo2GtError::StrictCheckFailed {
            warning_count: conversion.report.warning_count(),
            report: Box::new(conversion.report),
        });
    }
    Ok(conversion)
}

fn absorb_split(
    split: &str,
    outcomes: Vec<ImageOutcome>,
    class_map: &ClassMap,
    report: &mut ConversionReport,
    records: &mut Vec<AnnotationRecord>,
) -> SplitCounts {
    let mut counts = SplitCounts::new(split);
    counts.label_files = outcomes.len();

    for outcome in outcomes {
        match outcome {
            ImageOutcome::SkippedEmpty { label_path } => {
                counts.skipped_empty += 1;
                report.add(ConversionIssue::info(
                    ConversionIssueCode::EmptyLabelFileSkipped,
                    format!("{}: empty label file, image omitted", label_path.display()),
                ));
            }
            ImageOutcome::Converted(image) => {
                counts.records += 1;
                counts.annotations += image.record.annotations().len();
                counts.malformed_lines += image.malformed.len();
                report_image_issues(&image, class_map, report);
                records.push(image.record);
            }
        }
    }

    counts
}

fn report_image_issues(image: &ConvertedImage, class_map: &ClassMap, report: &mut ConversionReport) {
    let label = image.label_path.display();

    for malformed in &image.malformed {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::MalformedLabelLine,
            format!("{}:{}: {}", label, malformed.line, malformed.error),
        ));
    }

    for line in &image.out_of_range_lines {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::CoordinateOutOfRange,
            format!("{label}:{line}: box extends outside the image"),
        ));
    }

    let unknown: BTreeSet<u32> = image
        .record
        .annotations()
        .iter()
        .map(|ann| ann.class_id)
        .filter(|id| !class_map.contains(*id))
        .collect();
    if !unknown.is_empty() {
        let ids: Vec<String> = unknown.iter().map(u32::to_string).collect();
        report.add(ConversionIssue::warning(
            ConversionIssueCode::UnknownClassId,
            format!(
                "{}: class id(s) {} not in class map ({} class(es))",
                label,
                ids.join(", "),
                class_map.len()
            ),
        ));
    }
}
