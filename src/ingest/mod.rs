// src/ingest/mod.rs
pub mod canonical;
pub mod extract;
pub mod label;
pub mod record;
pub mod table;

use glob::{glob_with, MatchOptions, Pattern};
use std::{
    collections::HashSet,
    fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use canonical::{map_to_canonical, HeaderName, Metric, MetricMap};
pub use extract::extract_csv_content;
pub use label::clean_label;
pub use record::MonthRecord;
pub use table::{read_table, RawTable};

/// Why a file (or a whole folder) could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input directory pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("no .csv or .txt file found in {0:?}")]
    NoInputFiles(PathBuf),

    #[error("file too small ({bytes} bytes), probably empty")]
    TooSmall { bytes: u64 },

    #[error("empty file, or no header/data left after cleaning")]
    NoContent,

    #[error("could not infer the separator (tried sniffing, ',', ';', '\\t', '|'; need {min_columns} columns)")]
    Delimiter { min_columns: usize },

    #[error("no 'Mois' column after header normalization")]
    MissingMonth,

    #[error("no row with a month in {min}..={max}")]
    NoRowsInRange { min: u32, max: u32 },

    #[error("no data in required columns (non-null: {})", format_counts(.counts))]
    EmptyRequired { counts: Vec<(Metric, usize)> },

    #[error("no valid file loaded, {skipped} file(s) skipped; check separators, header and timestamp lines")]
    NothingLoaded { skipped: usize },
}

fn format_counts(counts: &[(Metric, usize)]) -> String {
    counts
        .iter()
        .map(|(m, n)| format!("{}={}", m, n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Knobs of the loader, derived from the run settings.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Maximum number of files picked up from the input folder.
    pub limit: usize,
    /// Files below this size are rejected without parsing.
    pub min_file_bytes: u64,
    /// Minimum header width for a delimiter guess to be accepted.
    pub min_columns: usize,
    pub months: RangeInclusive<u32>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            min_file_bytes: 8,
            min_columns: 5,
            months: 1..=192,
        }
    }
}

/// A single file after cleaning, parsing and header mapping.
#[derive(Debug)]
pub struct ParsedFile {
    pub source_file: String,
    pub delimiter: char,
    /// Mapped name of every header, in file order.
    pub headers: Vec<HeaderName>,
    pub records: Vec<MonthRecord>,
}

impl ParsedFile {
    /// Non-null cell count of `metric` across all records.
    pub fn non_null(&self, metric: Metric) -> usize {
        self.records.iter().filter(|r| r.get(metric).is_some()).count()
    }
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// Concatenation of every accepted file.
#[derive(Debug, Default)]
pub struct Dataset {
    pub records: Vec<MonthRecord>,
    /// Accepted files, in load order.
    pub files: Vec<String>,
    pub skipped: Vec<SkippedFile>,
}

impl Dataset {
    pub fn from_files(files: impl IntoIterator<Item = ParsedFile>) -> Self {
        let mut ds = Dataset::default();
        for f in files {
            ds.files.push(f.source_file);
            ds.records.extend(f.records);
        }
        ds
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read one simulation log: strip the preamble, parse the table, map the
/// headers, coerce numbers and keep the rows whose month is in range.
#[tracing::instrument(level = "debug", skip(path, opts), fields(path = %path.as_ref().display()))]
pub fn read_one_file<P: AsRef<Path>>(path: P, opts: &LoadOptions) -> Result<ParsedFile, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = String::from_utf8_lossy(&bytes);
    parse_content(&raw, &file_name_of(path), opts)
}

/// [`read_one_file`] minus the IO, for already-loaded text.
pub fn parse_content(
    raw: &str,
    source_file: &str,
    opts: &LoadOptions,
) -> Result<ParsedFile, LoadError> {
    // 1) preamble
    let content = extract_csv_content(raw).ok_or(LoadError::NoContent)?;

    // 2) table
    let table = read_table(&content, opts.min_columns)?;

    // 3) headers → canonical, first occurrence wins
    let headers: Vec<HeaderName> = table.headers.iter().map(|h| map_to_canonical(h)).collect();
    let mut seen = HashSet::new();
    let mut month_idx = None;
    let mut metric_idx: Vec<(Metric, usize)> = Vec::new();
    for (i, name) in headers.iter().enumerate() {
        if let HeaderName::Other(label) = name {
            debug!(column = %label, "ignoring unrecognized column");
            continue;
        }
        if !seen.insert(name.clone()) {
            warn!(file = source_file, column = name.as_str(), "duplicate column, keeping first");
            continue;
        }
        match name {
            HeaderName::Mois => month_idx = Some(i),
            HeaderName::Metric(m) => metric_idx.push((*m, i)),
            HeaderName::Other(_) => {}
        }
    }
    let month_idx = month_idx.ok_or(LoadError::MissingMonth)?;

    // 4) coerce + month filter
    let records: Vec<MonthRecord> = table
        .rows
        .iter()
        .filter_map(|row| {
            let cell = row.get(month_idx)?;
            let mois = record::parse_month(cell, table.delimiter, &opts.months)?;
            let mut values = MetricMap::default();
            for &(metric, idx) in &metric_idx {
                values[metric] = row
                    .get(idx)
                    .and_then(|c| record::parse_number(c, table.delimiter));
            }
            Some(MonthRecord {
                source_file: source_file.to_string(),
                mois,
                values,
            })
        })
        .collect();

    if records.is_empty() {
        return Err(LoadError::NoRowsInRange {
            min: *opts.months.start(),
            max: *opts.months.end(),
        });
    }

    let parsed = ParsedFile {
        source_file: source_file.to_string(),
        delimiter: table.delimiter,
        headers,
        records,
    };

    // 5) sanity: at least one key column must carry data
    let counts: Vec<(Metric, usize)> = Metric::REQUIRED
        .iter()
        .map(|&m| (m, parsed.non_null(m)))
        .collect();
    if counts.iter().all(|&(_, n)| n == 0) {
        return Err(LoadError::EmptyRequired { counts });
    }

    debug!(
        rows = parsed.records.len(),
        delimiter = ?parsed.delimiter,
        "file parsed"
    );
    Ok(parsed)
}

/// List the `.csv` / `.txt` files directly inside `dir`, sorted, capped at `limit`.
pub fn discover_files(dir: &Path, limit: usize) -> Result<Vec<PathBuf>, LoadError> {
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let mut paths = Vec::new();
    for ext in ["csv", "txt"] {
        let pattern = format!("{}/*.{}", escaped, ext);
        paths.extend(
            glob_with(&pattern, options)?
                .filter_map(Result::ok)
                .filter(|p| p.is_file()),
        );
    }
    paths.sort();
    paths.truncate(limit);
    Ok(paths)
}

/// Load up to `opts.limit` files from `dir`. Files that fail are skipped
/// with a warning; the call only fails when none could be loaded.
#[tracing::instrument(level = "info", skip(dir, opts), fields(dir = %dir.as_ref().display()))]
pub fn load_folder<P: AsRef<Path>>(dir: P, opts: &LoadOptions) -> Result<Dataset, LoadError> {
    let dir = dir.as_ref();
    let paths = discover_files(dir, opts.limit)?;
    if paths.is_empty() {
        return Err(LoadError::NoInputFiles(dir.to_path_buf()));
    }
    info!("{} candidate file(s)", paths.len());

    let mut parsed = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();
    for path in &paths {
        let name = file_name_of(path);
        match check_size(path, opts.min_file_bytes).and_then(|_| read_one_file(path, opts)) {
            Ok(file) => parsed.push(file),
            Err(e) => {
                warn!(file = %name, "skipping file: {}", e);
                skipped.push(SkippedFile {
                    file: name,
                    reason: e.to_string(),
                });
            }
        }
    }

    if parsed.is_empty() {
        return Err(LoadError::NothingLoaded {
            skipped: skipped.len(),
        });
    }

    let mut dataset = Dataset::from_files(parsed);
    if !skipped.is_empty() {
        info!(
            "{} file(s) skipped, continuing with {} file(s)",
            skipped.len(),
            dataset.files.len()
        );
    }
    dataset.skipped = skipped;
    Ok(dataset)
}

fn check_size(path: &Path, min_bytes: u64) -> Result<(), LoadError> {
    let bytes = fs::metadata(path)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if bytes < min_bytes {
        return Err(LoadError::TooSmall { bytes });
    }
    Ok(())
}
