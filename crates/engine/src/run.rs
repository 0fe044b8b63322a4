// One duplicate-check run: reference key set, then each comparison file in turn.

use std::collections::HashSet;

use exelsior_io::{serialize_as_spreadsheet, Dataset, LoadError, Table};
use serde::Serialize;
use tracing::{info, warn};

use crate::clean::remove_matches;
use crate::error::RunError;
use crate::keys::{extract_keys, KeySet};
use crate::matcher::find_duplicates;
use crate::report::{cleaned_file_name, report_file_name, DuplicateReport, COMBINED_REPORT_NAME};
use crate::KEY_COLUMN;

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Destination for generated spreadsheets.
pub trait ArtifactSink {
    /// Store one serialized spreadsheet under `name`.
    fn put(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), String>;
}

/// Keeps artifacts in memory, in the order they were produced.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub artifacts: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.artifacts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl ArtifactSink for MemorySink {
    fn put(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), String> {
        self.artifacts.push((name.to_string(), bytes));
        Ok(())
    }
}

/// Hands out artifact names, suffixing `_2`, `_3`, ... when two comparison
/// files share a stem (e.g. `list.csv` and `list.xlsx`).
#[derive(Default)]
struct ArtifactNames {
    taken: HashSet<String>,
}

impl ArtifactNames {
    fn claim(&mut self, name: String) -> String {
        if self.taken.insert(name.clone()) {
            return name;
        }
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
            None => (name.clone(), String::new()),
        };
        let mut n = 2;
        loop {
            let candidate = format!("{stem}_{n}{ext}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Options + results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Also produce `cleaned_<stem>.xlsx` for files with duplicates.
    pub clean: bool,
    /// Produce `duplicates_in_<stem>.xlsx` for files with duplicates.
    pub per_file_reports: bool,
    /// Name of the report covering all files; `None` disables it.
    pub combined_report: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            clean: false,
            per_file_reports: true,
            combined_report: Some(COMBINED_REPORT_NAME.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Duplicates,
    NoDuplicates,
    MissingColumn,
    LoadFailed,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicates => write!(f, "duplicates"),
            Self::NoDuplicates => write!(f, "no_duplicates"),
            Self::MissingColumn => write!(f, "missing_column"),
            Self::LoadFailed => write!(f, "load_failed"),
        }
    }
}

/// What happened to one comparison file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub status: FileStatus,
    pub rows: usize,
    pub duplicates: Vec<String>,
    pub rows_matched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_removed: Option<usize>,
    pub artifacts: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl FileOutcome {
    fn new(file: &str, status: FileStatus, rows: usize) -> Self {
        Self {
            file: file.to_string(),
            status,
            rows,
            duplicates: Vec::new(),
            rows_matched: 0,
            rows_removed: None,
            artifacts: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn skipped(file: &str, status: FileStatus, message: String) -> Self {
        let mut outcome = Self::new(file, status, 0);
        outcome.warnings.push(message);
        outcome
    }

    /// True when the file took no part in the comparison.
    pub fn is_skipped(&self) -> bool {
        matches!(self.status, FileStatus::MissingColumn | FileStatus::LoadFailed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    pub key_column: String,
    pub reference: String,
    pub reference_rows: usize,
    pub reference_keys: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub meta: RunMeta,
    pub files: Vec<FileOutcome>,
    pub total_duplicates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_report: Option<String>,
}

impl RunSummary {
    pub fn has_duplicates(&self) -> bool {
        self.total_duplicates > 0
    }

    pub fn skipped_files(&self) -> usize {
        self.files.iter().filter(|f| f.is_skipped()).count()
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Check every comparison dataset against the reference.
///
/// Comparisons are pulled from the iterator one at a time and fully handled
/// (match, clean, export) before the next is pulled, so a lazy iterator also
/// loads them one at a time. Reference failures abort the run; comparison
/// failures are recorded in the summary and the run moves on.
pub fn run<I>(
    reference: Result<Dataset, LoadError>,
    comparisons: I,
    options: &RunOptions,
    sink: &mut dyn ArtifactSink,
) -> Result<RunSummary, RunError>
where
    I: IntoIterator<Item = Result<Dataset, LoadError>>,
{
    let reference = reference.map_err(RunError::ReferenceLoad)?;
    let keys = extract_keys(&reference.table, KEY_COLUMN).map_err(|_| {
        RunError::ReferenceMissingColumn {
            file: reference.name.clone(),
            column: KEY_COLUMN.to_string(),
        }
    })?;
    info!(file = %reference.name, keys = keys.len(), "reference key set built");

    let mut names = ArtifactNames::default();
    let mut reports: Vec<DuplicateReport> = Vec::new();
    let mut files = Vec::new();

    for comparison in comparisons {
        let outcome = match comparison {
            Err(e) => {
                warn!(file = %e.file, error = %e.kind, "skipping file that failed to load");
                FileOutcome::skipped(&e.file, FileStatus::LoadFailed, e.to_string())
            }
            Ok(dataset) => {
                let (outcome, report) = check_one(&dataset, &keys, options, sink, &mut names)?;
                reports.extend(report);
                outcome
            }
        };
        files.push(outcome);
    }

    let total_duplicates = reports.iter().map(|r| r.entries.len()).sum();

    let mut combined_report = None;
    if let Some(name) = options.combined_report.as_deref().filter(|n| !n.is_empty()) {
        if total_duplicates > 0 {
            let name = names.claim(name.to_string());
            let bytes = serialize_as_spreadsheet(&DuplicateReport::combine(&reports))
                .map_err(|source| RunError::Export { artifact: name.clone(), source })?;
            sink.put(&name, bytes)
                .map_err(|message| RunError::Sink { artifact: name.clone(), message })?;
            combined_report = Some(name);
        }
    }

    Ok(RunSummary {
        meta: RunMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            key_column: KEY_COLUMN.to_string(),
            reference: reference.name,
            reference_rows: reference.table.len(),
            reference_keys: keys.len(),
        },
        files,
        total_duplicates,
        combined_report,
    })
}

fn check_one(
    dataset: &Dataset,
    keys: &KeySet,
    options: &RunOptions,
    sink: &mut dyn ArtifactSink,
    names: &mut ArtifactNames,
) -> Result<(FileOutcome, Option<DuplicateReport>), RunError> {
    let file = dataset.name.as_str();
    let duplicates = match find_duplicates(&dataset.table, KEY_COLUMN, keys) {
        Ok(d) => d,
        Err(e) => {
            warn!(file, "{e}, skipping");
            let message = format!("{e} in file: {file}");
            return Ok((FileOutcome::skipped(file, FileStatus::MissingColumn, message), None));
        }
    };

    let mut outcome = FileOutcome::new(file, FileStatus::NoDuplicates, dataset.table.len());
    if duplicates.is_empty() {
        info!(file, "no duplicates");
        return Ok((outcome, None));
    }

    info!(file, duplicates = duplicates.len(), rows = duplicates.matched_rows(), "duplicates found");
    outcome.status = FileStatus::Duplicates;
    outcome.duplicates = duplicates.matches.clone();
    outcome.rows_matched = duplicates.matched_rows();

    let report = DuplicateReport::new(file, &duplicates);
    if options.per_file_reports {
        emit(sink, names, report_file_name(file), &report.to_table(), &mut outcome)?;
    }

    if options.clean {
        match remove_matches(&dataset.table, KEY_COLUMN, &duplicates.matches) {
            Ok(cleaned) => {
                info!(file, removed = cleaned.removed, "cleaned");
                outcome.rows_removed = Some(cleaned.removed);
                emit(sink, names, cleaned_file_name(file), &cleaned.table, &mut outcome)?;
            }
            Err(e) => outcome.warnings.push(e.to_string()),
        }
    }

    Ok((outcome, Some(report)))
}

/// Serialize and store one per-file artifact. Serialization problems stay
/// local to the file; a failing sink aborts the run.
fn emit(
    sink: &mut dyn ArtifactSink,
    names: &mut ArtifactNames,
    name: String,
    table: &Table,
    outcome: &mut FileOutcome,
) -> Result<(), RunError> {
    let bytes = match serialize_as_spreadsheet(table) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(file = %outcome.file, artifact = %name, error = %e, "export failed");
            outcome.warnings.push(format!("cannot build {name}: {e}"));
            return Ok(());
        }
    };
    let name = names.claim(name);
    sink.put(&name, bytes)
        .map_err(|message| RunError::Sink { artifact: name.clone(), message })?;
    outcome.artifacts.push(name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exelsior_io::{Cell, LoadErrorKind, LoadReport};

    fn dataset(name: &str, columns: &[&str], rows: &[&[&str]]) -> Dataset {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|v| Cell::from(*v)).collect());
        }
        Dataset { name: name.into(), table, report: LoadReport::default() }
    }

    fn reference() -> Dataset {
        dataset("ref.csv", &["Name", "Age"], &[&["Alice", "30"], &["Bob", "25"], &["alice ", "9"]])
    }

    #[test]
    fn claim_suffixes_repeats() {
        let mut names = ArtifactNames::default();
        assert_eq!(names.claim("a.xlsx".into()), "a.xlsx");
        assert_eq!(names.claim("a.xlsx".into()), "a_2.xlsx");
        assert_eq!(names.claim("a.xlsx".into()), "a_3.xlsx");
        assert_eq!(names.claim("plain".into()), "plain");
        assert_eq!(names.claim("plain".into()), "plain_2");
    }

    #[test]
    fn per_file_outcomes_and_artifacts() {
        let comparisons = vec![
            Ok(dataset("team.csv", &["Name"], &[&["Bob"], &["Carol"], &["Bob"]])),
            Ok(dataset("other.csv", &["Email"], &[&["x@y"]])),
            Err(LoadError::new("broken.xlsx", LoadErrorKind::NoSheets)),
            Ok(dataset("new.csv", &["Name"], &[&["Zed"]])),
        ];
        let mut sink = MemorySink::default();
        let summary = run(Ok(reference()), comparisons, &RunOptions::default(), &mut sink).unwrap();

        let statuses: Vec<FileStatus> = summary.files.iter().map(|f| f.status).collect();
        assert_eq!(
            statuses,
            vec![
                FileStatus::Duplicates,
                FileStatus::MissingColumn,
                FileStatus::LoadFailed,
                FileStatus::NoDuplicates
            ]
        );
        assert_eq!(summary.files[0].duplicates, vec!["Bob"]);
        assert_eq!(summary.files[0].rows_matched, 2);
        assert!(summary.files[1].warnings[0].contains("other.csv"));
        assert!(summary.files[2].warnings[0].contains("broken.xlsx"));
        assert_eq!(summary.skipped_files(), 2);
        assert_eq!(summary.total_duplicates, 1);
        assert_eq!(summary.meta.reference_keys, 3);

        assert_eq!(sink.names(), vec!["duplicates_in_team.xlsx", COMBINED_REPORT_NAME]);
        assert_eq!(summary.combined_report.as_deref(), Some(COMBINED_REPORT_NAME));
    }

    #[test]
    fn clean_option_writes_cleaned_copy() {
        let comparisons = vec![Ok(dataset("team.csv", &["Name", "Role"], &[&["Bob", "a"], &["Carol", "b"], &["Bob", "c"]]))];
        let options = RunOptions { clean: true, per_file_reports: false, combined_report: None };
        let mut sink = MemorySink::default();
        let summary = run(Ok(reference()), comparisons, &options, &mut sink).unwrap();

        assert_eq!(summary.files[0].rows_removed, Some(2));
        assert_eq!(sink.names(), vec!["cleaned_team.xlsx"]);
        assert!(summary.combined_report.is_none());
    }

    #[test]
    fn no_duplicates_means_no_artifacts() {
        let comparisons = vec![Ok(dataset("new.csv", &["Name"], &[&["Zed"]]))];
        let options = RunOptions { clean: true, ..RunOptions::default() };
        let mut sink = MemorySink::default();
        let summary = run(Ok(reference()), comparisons, &options, &mut sink).unwrap();

        assert!(!summary.has_duplicates());
        assert!(sink.artifacts.is_empty());
        assert!(summary.files[0].rows_removed.is_none());
    }

    #[test]
    fn reference_without_key_column_is_fatal() {
        let bad = dataset("ref.csv", &["Email"], &[&["a@b"]]);
        let mut sink = MemorySink::default();
        let err = run(Ok(bad), Vec::new(), &RunOptions::default(), &mut sink).unwrap_err();
        assert!(matches!(err, RunError::ReferenceMissingColumn { ref file, .. } if file == "ref.csv"));
    }

    #[test]
    fn reference_load_failure_is_fatal() {
        let mut sink = MemorySink::default();
        let err = run(
            Err(LoadError::new("ref.csv", LoadErrorKind::Empty)),
            Vec::new(),
            &RunOptions::default(),
            &mut sink,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ref.csv"));
    }

    #[test]
    fn same_stem_files_get_distinct_artifacts() {
        let comparisons = vec![
            Ok(dataset("list.csv", &["Name"], &[&["Bob"]])),
            Ok(dataset("list.xlsx", &["Name"], &[&["Alice"]])),
        ];
        let mut sink = MemorySink::default();
        run(Ok(reference()), comparisons, &RunOptions::default(), &mut sink).unwrap();
        assert_eq!(
            sink.names(),
            vec!["duplicates_in_list.xlsx", "duplicates_in_list_2.xlsx", COMBINED_REPORT_NAME]
        );
    }

    struct FailingSink;

    impl ArtifactSink for FailingSink {
        fn put(&mut self, _name: &str, _bytes: Vec<u8>) -> Result<(), String> {
            Err("disk full".into())
        }
    }

    #[test]
    fn sink_failure_aborts() {
        let comparisons = vec![Ok(dataset("team.csv", &["Name"], &[&["Bob"]]))];
        let err = run(Ok(reference()), comparisons, &RunOptions::default(), &mut FailingSink).unwrap_err();
        assert!(matches!(err, RunError::Sink { .. }));
    }
}
