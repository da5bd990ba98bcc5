#![cfg(unix)]

use pretty_assertions::assert_eq;
use srcfmt::formatter::Formatter;
use srcfmt::runner::{check_formatting, format_files, run, Mode, Options, Outcome};
use srcfmt::Error;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

// Strips leading whitespace; rewrites the file when given `-i`.
const FORMATTER: &str = r#"in_place=0
for arg in "$@"; do
    case "$arg" in
        -i) in_place=1 ;;
        *) file="$arg" ;;
    esac
done
if [ "$in_place" = 1 ]; then
    sed 's/^[[:space:]]*//' "$file" > "$file.fmt" && mv "$file.fmt" "$file"
else
    sed 's/^[[:space:]]*//' "$file"
fi
"#;

const UNFORMATTED: &str = "int main() {\n    return 0;\n}\n";
const FORMATTED: &str = "#pragma once\nint answer();\n";

struct Fixture {
    _tools: TempDir,
    sources: TempDir,
    formatter: Formatter,
}

impl Fixture {
    fn new() -> Self {
        let tools = tempdir().unwrap();
        let script = tools.path().join("format.sh");
        fs::write(&script, FORMATTER).unwrap();

        Self {
            formatter: Formatter::new("sh").with_args(vec![script.to_str().unwrap()]),
            _tools: tools,
            sources: tempdir().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.sources.path()
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn options(&self, mode: Mode) -> Options {
        Options::new(self.root(), self.formatter.clone(), mode)
    }
}

#[test]
fn check_reports_only_unformatted() {
    let fixture = Fixture::new();
    let a = fixture.write("a.cpp", UNFORMATTED);
    fixture.write("b.hpp", FORMATTED);

    let report = match run(&fixture.options(Mode::Check)).unwrap() {
        Outcome::Checked(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };

    assert_eq!(report.checked, 2);
    assert_eq!(report.diff_count(), 1);
    assert_eq!(report.non_conforming[0].path, a);
    assert!(report.non_conforming[0].diff.contains("-    return 0;"));
    assert!(report.non_conforming[0].diff.contains("+return 0;"));
    assert!(report.non_conforming[0].diff.contains("a.cpp"));
    assert!(!report.non_conforming[0].diff.contains("b.hpp"));
}

#[test]
fn check_leaves_files_untouched() {
    let fixture = Fixture::new();
    let a = fixture.write("a.cpp", UNFORMATTED);
    let b = fixture.write("nested/deeper/b.hpp", FORMATTED);

    let outcome = run(&fixture.options(Mode::Check)).unwrap();

    assert_eq!(outcome.code(), 1);
    assert_eq!(fs::read(&a).unwrap(), UNFORMATTED.as_bytes());
    assert_eq!(fs::read(&b).unwrap(), FORMATTED.as_bytes());
}

#[test]
fn check_formatted_tree_is_clean() {
    let fixture = Fixture::new();
    let files: Vec<_> = (0..20)
        .map(|n| fixture.write(&format!("dir{}/file{}.cl", n % 3, n), FORMATTED))
        .collect();

    let report = check_formatting(&files, &fixture.formatter, NonZeroUsize::new(4)).unwrap();

    assert_eq!(report.checked, 20);
    assert_eq!(report.diff_count(), 0);
    for file in &files {
        assert_eq!(fs::read(file).unwrap(), FORMATTED.as_bytes());
    }
}

#[test]
fn diffs_follow_their_files() {
    let fixture = Fixture::new();
    let files: Vec<_> = (0..30)
        .map(|n| {
            let content = if n % 2 == 0 {
                format!("  int v{};\n", n)
            } else {
                format!("int v{};\n", n)
            };
            fixture.write(&format!("f{}.cpp", n), &content)
        })
        .collect();

    let report = check_formatting(&files, &fixture.formatter, None).unwrap();

    assert_eq!(report.diff_count(), 15);
    for entry in &report.non_conforming {
        let stem = entry.path.file_stem().unwrap().to_str().unwrap();
        let n: usize = stem[1..].parse().unwrap();
        assert_eq!(n % 2, 0);
        assert!(entry.diff.contains(&format!("+int v{};", n)));
    }
}

#[test]
fn format_rewrites_only_unformatted() {
    let fixture = Fixture::new();
    let a = fixture.write("a.cpp", UNFORMATTED);
    let b = fixture.write("b.hpp", FORMATTED);
    let notes = fixture.write("notes.txt", "    keep me\n");

    let outcome = run(&fixture.options(Mode::Format)).unwrap();

    assert_eq!(outcome, Outcome::Formatted(srcfmt::runner::FormatReport { formatted: 2 }));
    assert_eq!(outcome.code(), 0);
    assert_eq!(fs::read_to_string(&a).unwrap(), "int main() {\nreturn 0;\n}\n");
    assert_eq!(fs::read(&b).unwrap(), FORMATTED.as_bytes());
    assert_eq!(fs::read_to_string(&notes).unwrap(), "    keep me\n");
}

#[test]
fn format_then_check_converges() {
    let fixture = Fixture::new();
    fixture.write("src/a.cpp", UNFORMATTED);
    fixture.write("include/b.hpp", "  #pragma once\n\tint b();\n");
    fixture.write("kernels/c.cl", "kernel void c() {\n  }\n");

    assert_eq!(run(&fixture.options(Mode::Check)).unwrap().code(), 3);
    run(&fixture.options(Mode::Format)).unwrap();
    assert_eq!(run(&fixture.options(Mode::Check)).unwrap().code(), 0);
}

#[test]
fn empty_tree_is_a_no_op() {
    let fixture = Fixture::new();

    assert_eq!(run(&fixture.options(Mode::Check)).unwrap().code(), 0);
    assert_eq!(run(&fixture.options(Mode::Format)).unwrap().code(), 0);

    let mut missing = fixture.options(Mode::Check);
    missing.root = fixture.root().join("missing");
    assert_eq!(run(&missing).unwrap().code(), 0);
}

#[test]
fn missing_formatter_fails_both_modes() {
    let fixture = Fixture::new();
    fixture.write("a.cpp", UNFORMATTED);
    fixture.write("b.hpp", FORMATTED);

    for mode in [Mode::Check, Mode::Format].iter() {
        let mut options = fixture.options(*mode);
        options.formatter = Formatter::new("srcfmt-no-such-formatter");

        let err = run(&options).unwrap_err();
        assert!(matches!(err, Error::Formatter { .. }), "{:?}", err);
    }
}

#[test]
fn failing_formatter_carries_output() {
    let fixture = Fixture::new();
    let a = fixture.write("a.cpp", UNFORMATTED);
    let script = fixture.write("tools/fail.sh", "echo \"cannot parse $1\" >&2\nexit 1\n");
    let formatter = Formatter::new("sh").with_args(vec![script.to_str().unwrap()]);

    let err = check_formatting(&[a.clone()], &formatter, None).unwrap_err();

    match err {
        Error::Formatter { path, source } => {
            assert_eq!(path, a);
            assert_eq!(source.code(), Some(1));
            assert_eq!(source.output(), Some(format!("cannot parse {}\n", a.display()).as_str()));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn unreadable_file_is_reported() {
    let fixture = Fixture::new();
    let gone = fixture.root().join("gone.cpp");
    let formatter = Formatter::new("true");

    let err = check_formatting(&[gone.clone()], &formatter, None).unwrap_err();

    match err {
        Error::FileRead { path, .. } => assert_eq!(path, gone),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn format_failure_propagates() {
    let fixture = Fixture::new();
    let files = vec![fixture.write("a.cpp", UNFORMATTED)];

    let err = format_files(&files, &Formatter::new("false"), None).unwrap_err();

    assert!(matches!(err, Error::Formatter { .. }));
}
