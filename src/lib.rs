//! Format or check C++ and OpenCL sources with an external formatter
//!
//! ## Examples
//! ```rust,no_run
//! use srcfmt::formatter::Formatter;
//! use srcfmt::runner::{run, Mode, Options};
//!
//! let options = Options::new("compute_samples", Formatter::new("clang-format"), Mode::Check);
//! let outcome = run(&options).unwrap();
//!
//! assert_eq!(outcome.code(), 0);
//! ```

pub mod diff;
pub mod discovery;
pub mod error;
pub mod formatter;
mod pool;
pub mod runner;

pub use error::{Error, FormatterError, Result};
