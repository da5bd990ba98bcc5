use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("formatter failed on {}: {source}", .path.display())]
    Formatter {
        path: PathBuf,
        source: FormatterError,
    },
    #[error("failed to read {}: {source}", .path.display())]
    FileRead { path: PathBuf, source: io::Error },
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    /// Discovery escapes the root and every extension, so only a glob crate change reaches this
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

#[derive(Debug, Error)]
pub enum FormatterError {
    #[error("could not run `{command}`: {source}")]
    Spawn { command: String, source: io::Error },
    #[error("`{command}` failed with {status}:\n{output}")]
    Exit {
        command: String,
        status: ExitStatus,
        output: String,
    },
    #[error("IO error while capturing output: {0}")]
    Io(#[from] io::Error),
}

impl FormatterError {
    /// Exit code of the formatter, if it ran to completion
    pub fn code(&self) -> Option<i32> {
        match self {
            FormatterError::Exit { status, .. } => status.code(),
            _ => None,
        }
    }

    /// Merged stdout/stderr captured from a failed run
    pub fn output(&self) -> Option<&str> {
        match self {
            FormatterError::Exit { output, .. } => Some(output),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
