//! Run report types.
//!
//! Tracks per-split counts and the data problems met along the way, so the
//! user can see exactly what landed in the manifest and what did not.

use serde::Serialize;
use std::fmt;

/// A report generated by one conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Dataset root that was converted.
    pub dataset_root: String,
    /// File the class map was loaded from.
    pub class_source: String,
    /// Number of classes in the class map.
    pub classes: usize,
    /// Counts per split, in processing order.
    pub splits: Vec<SplitCounts>,
    /// Issues discovered during conversion.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    pub fn new(
        dataset_root: impl Into<String>,
        class_source: impl Into<String>,
        classes: usize,
    ) -> Self {
        Self {
            dataset_root: dataset_root.into(),
            class_source: class_source.into(),
            classes,
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Sum of all split counts.
    pub fn totals(&self) -> SplitCounts {
        self.splits
            .iter()
            .fold(SplitCounts::new("total"), |mut acc, split| {
                acc.label_files += split.label_files;
                acc.records += split.records;
                acc.annotations += split.annotations;
                acc.skipped_empty += split.skipped_empty;
                acc.malformed_lines += split.malformed_lines;
                acc
            })
    }

    pub fn warning_count(&self) -> usize {
        self.count(ConversionSeverity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(ConversionSeverity::Info)
    }

    /// Number of issues carrying `code`.
    pub fn count_code(&self, code: ConversionIssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }

    /// Returns true if nothing worth a warning happened.
    pub fn is_clean(&self) -> bool {
        self.warning_count() == 0
    }

    fn count(&self, severity: ConversionSeverity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Converted {} ({} class(es) from {})",
            self.dataset_root, self.classes, self.class_source
        )?;

        for split in &self.splits {
            writeln!(f, "  {split}")?;
        }
        if self.splits.len() > 1 {
            writeln!(f, "  {}", self.totals())?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts for one split.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub name: String,
    /// Label files found under `labels/`.
    pub label_files: usize,
    /// Records emitted to the manifest.
    pub records: usize,
    pub annotations: usize,
    /// Label files with no lines, which produce no record.
    pub skipped_empty: usize,
    pub malformed_lines: usize,
}

impl SplitCounts {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl fmt::Display for SplitCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} label file(s), {} record(s), {} annotation(s)",
            self.name, self.label_files, self.records, self.annotations
        )?;
        if self.skipped_empty > 0 {
            write!(f, ", {} empty skipped", self.skipped_empty)?;
        }
        if self.malformed_lines > 0 {
            write!(f, ", {} malformed line(s)", self.malformed_lines)?;
        }
        Ok(())
    }
}

/// A single issue discovered during conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create a warning-level issue (fails the run under `--strict`).
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note, never blocks).
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    Warning,
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON report and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// A label line did not have five parseable fields and was skipped.
    MalformedLabelLine,
    /// A box extends outside the unit square; written unchanged.
    CoordinateOutOfRange,
    /// A label uses a class id the class map does not define; written unchanged.
    UnknownClassId,
    /// A label file had no lines, so its image is absent from the manifest.
    EmptyLabelFileSkipped,
    /// Records are ordered by split, then by label path.
    RecordOrder,
}
