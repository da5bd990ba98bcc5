use crate::diff::diff;
use crate::discovery::{find_source_files, DEFAULT_EXTENSIONS};
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::pool::WorkerPool;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Report files whose content differs from the formatter output
    Check,
    /// Rewrite files in place
    Format,
}

#[derive(Clone, Debug)]
pub struct Options {
    pub root: PathBuf,
    pub formatter: Formatter,
    pub extensions: Vec<String>,
    pub workers: Option<NonZeroUsize>,
    pub mode: Mode,
}

impl Options {
    pub fn new(root: impl Into<PathBuf>, formatter: Formatter, mode: Mode) -> Self {
        Self {
            root: root.into(),
            formatter,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            workers: None,
            mode,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub path: PathBuf,
    pub diff: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub checked: usize,
    pub non_conforming: Vec<FileDiff>,
}

impl CheckReport {
    #[inline]
    pub fn diff_count(&self) -> usize {
        self.non_conforming.len()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FormatReport {
    pub formatted: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Outcome {
    Checked(CheckReport),
    Formatted(FormatReport),
}

impl Outcome {
    /// Number of non-conforming files for a check, zero after formatting
    pub fn code(&self) -> usize {
        match self {
            Outcome::Checked(report) => report.diff_count(),
            Outcome::Formatted(_) => 0,
        }
    }
}

pub fn run(options: &Options) -> Result<Outcome> {
    if !options.root.is_dir() {
        tracing::warn!(root = %options.root.display(), "root directory does not exist");
    }

    tracing::info!("Finding source files");
    let files = find_source_files(&options.root, &options.extensions[..])?;
    tracing::debug!(count = files.len(), "source files found");

    match options.mode {
        Mode::Check => {
            check_formatting(&files, &options.formatter, options.workers).map(Outcome::Checked)
        }
        Mode::Format => {
            format_files(&files, &options.formatter, options.workers).map(Outcome::Formatted)
        }
    }
}

pub fn check_formatting(
    files: &[PathBuf],
    formatter: &Formatter,
    workers: Option<NonZeroUsize>,
) -> Result<CheckReport> {
    tracing::info!("Checking formatting");
    let pool = WorkerPool::new(workers)?;

    let non_conforming = pool.install(|| -> Result<Vec<FileDiff>> {
        tracing::info!("Reading expected values");
        let expected = files
            .par_iter()
            .map(|path| formatter.expected_output(path))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Reading actual values");
        let actual = files
            .par_iter()
            .map(|path| read_file(path))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Comparing");
        let diffs: Vec<_> = actual
            .par_iter()
            .zip(expected.par_iter())
            .zip(files.par_iter())
            .map(|((actual, expected), path)| {
                let changes = diff(actual, expected);
                let from = path.display().to_string();
                let to = format!("{} (formatted)", from);
                let lines: Vec<String> = changes.unified(&from, &to).collect();
                lines.join("\n")
            })
            .collect();

        Ok(files
            .iter()
            .zip(diffs)
            .filter_map(|(path, diff)| {
                if diff.is_empty() {
                    tracing::debug!("No diff in {}", path.display());
                    None
                } else {
                    tracing::warn!("Diff in {}:\n{}", path.display(), diff);
                    Some(FileDiff {
                        path: path.clone(),
                        diff,
                    })
                }
            })
            .collect())
    })?;

    tracing::info!("Formatting checked");
    tracing::info!("Diff count: {}", non_conforming.len());

    Ok(CheckReport {
        checked: files.len(),
        non_conforming,
    })
}

pub fn format_files(
    files: &[PathBuf],
    formatter: &Formatter,
    workers: Option<NonZeroUsize>,
) -> Result<FormatReport> {
    tracing::info!("Running {}", formatter.command());
    let pool = WorkerPool::new(workers)?;

    pool.install(|| {
        files
            .par_iter()
            .try_for_each(|path| formatter.format_in_place(path))
    })?;

    tracing::info!("Formatting is done");

    Ok(FormatReport {
        formatted: files.len(),
    })
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
