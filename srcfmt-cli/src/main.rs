use clap::{ArgAction, Parser};
use srcfmt::formatter::{Formatter, DEFAULT_COMMAND};
use srcfmt::runner::{self, Mode, Options, Outcome};
use std::error::Error;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "srcfmt",
    version,
    about = "Format or check compute-samples sources with clang-format"
)]
struct Cli {
    #[arg(
        long,
        default_value = "../compute_samples",
        help = "Root directory of compute-samples source"
    )]
    root_directory: PathBuf,
    #[arg(long = "clang-format", default_value = DEFAULT_COMMAND, help = "clang-format command")]
    clang_format: String,
    #[arg(long, help = "Check formatting")]
    check: bool,
    #[arg(
        long = "formatter-arg",
        allow_hyphen_values = true,
        help = "Extra argument passed to every clang-format call (repeatable)"
    )]
    formatter_args: Vec<String>,
    #[arg(
        long = "extension",
        value_delimiter = ',',
        default_values = ["cpp", "hpp", "cl"],
        help = "File extensions to process"
    )]
    extensions: Vec<String>,
    #[arg(short, long, help = "Number of worker threads")]
    jobs: Option<NonZeroUsize>,
    #[arg(long, help = "Print the result as JSON")]
    json: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> Options {
        let mode = if self.check { Mode::Check } else { Mode::Format };
        let formatter =
            Formatter::new(&self.clang_format).with_args(self.formatter_args.iter().cloned());

        Options {
            extensions: self.extensions.clone(),
            workers: self.jobs,
            ..Options::new(&self.root_directory, formatter, mode)
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// Exit codes above 255 would wrap, so large counts saturate instead.
fn exit_status(outcome: &Outcome) -> u8 {
    u8::try_from(outcome.code()).unwrap_or(u8::MAX)
}

fn run(cli: &Cli) -> ExitCode {
    tracing::info!("Processing a command line");
    tracing::debug!(?cli);

    let outcome = match runner::run(&cli.options()) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!("{}", err);
            let mut source = err.source();
            while let Some(cause) = source {
                tracing::error!("caused by: {}", cause);
                source = cause.source();
            }
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                tracing::error!("failed to serialize result: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::from(exit_status(&outcome))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(cli.env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(false)
        .without_time()
        .finish();

    tracing::subscriber::with_default(subscriber, || run(&cli))
}
