use crate::error::{Error, FormatterError, Result};
use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};

pub const DEFAULT_COMMAND: &str = "clang-format";
pub const DEFAULT_IN_PLACE_ARG: &str = "-i";

/// An external formatter such as `clang-format`
#[derive(Clone, Debug)]
pub struct Formatter {
    command: String,
    args: Vec<String>,
    in_place_arg: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND)
    }
}

impl Formatter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            in_place_arg: DEFAULT_IN_PLACE_ARG.into(),
        }
    }

    /// Arguments passed on every invocation, before any per-call arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_in_place_arg(mut self, arg: impl Into<String>) -> Self {
        self.in_place_arg = arg.into();
        self
    }

    #[inline]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run `command [args..] [arguments..] path` and return its merged stdout/stderr.
    pub fn run<S: AsRef<OsStr>>(&self, path: &Path, arguments: &[S]) -> Result<String> {
        tracing::debug!(command = %self.command, path = %path.display(), "running formatter");

        self.capture(path, arguments).map_err(|source| Error::Formatter {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Formatted content of `path`, leaving the file untouched
    pub fn expected_output(&self, path: &Path) -> Result<String> {
        self.run::<&str>(path, &[])
    }

    pub fn format_in_place(&self, path: &Path) -> Result<()> {
        self.run(path, &[self.in_place_arg.as_str()]).map(drop)
    }

    fn capture<S: AsRef<OsStr>>(
        &self,
        path: &Path,
        arguments: &[S],
    ) -> std::result::Result<String, FormatterError> {
        let (mut reader, writer) = io::pipe()?;

        // `command` owns both write ends and must be dropped before reading to EOF
        let mut child = {
            let mut command = Command::new(&self.command);
            command
                .args(&self.args)
                .args(arguments)
                .arg(path)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);

            command.spawn().map_err(|source| FormatterError::Spawn {
                command: self.command.clone(),
                source,
            })?
        };

        let mut out = Vec::new();
        let read = reader.read_to_end(&mut out);
        let status = child.wait()?;
        read?;

        let output = String::from_utf8_lossy(&out).into_owned();

        if status.success() {
            Ok(output)
        } else {
            Err(FormatterError::Exit {
                command: self.command.clone(),
                status,
                output,
            })
        }
    }
}
