use similar::{Algorithm, ChangeTag, DiffOp};
use std::fmt;
use std::ops::Range;

const CONTEXT_LINES: usize = 3;

/// Line diff between the current content of a file and what the formatter produced
#[derive(Debug)]
pub struct Diff<'a> {
    old: Vec<&'a str>,
    new: Vec<&'a str>,
    hunks: Vec<Vec<DiffOp>>,
}

pub fn diff<'a>(actual: &'a str, expected: &'a str) -> Diff<'a> {
    let old = split_lines(actual);
    let new = split_lines(expected);
    let ops = similar::capture_diff_slices(Algorithm::Myers, &old, &new);
    let hunks = similar::group_diff_ops(ops, CONTEXT_LINES);

    Diff { old, new, hunks }
}

/// Split on `\n`, `\r\n` and a lone `\r`, dropping the terminators.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(idx) => {
                lines.push(&rest[..idx]);
                let terminator = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + terminator..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}

impl<'a> Diff<'a> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Lazily render as unified diff lines, without line terminators.
    pub fn unified<'d>(
        &'d self,
        from: &'d str,
        to: &'d str,
    ) -> impl Iterator<Item = String> + 'd {
        let header = if self.is_empty() {
            None
        } else {
            Some([format!("--- {}", from), format!("+++ {}", to)])
        };

        header
            .into_iter()
            .flatten()
            .chain(self.hunks.iter().flat_map(move |hunk| self.hunk_lines(hunk)))
    }

    fn hunk_lines<'d>(&'d self, hunk: &'d [DiffOp]) -> impl Iterator<Item = String> + 'd {
        let header = HunkHeader::new(hunk).to_string();

        std::iter::once(header).chain(
            hunk.iter()
                .flat_map(move |op| op.iter_changes(&self.old[..], &self.new[..]))
                .map(|change| {
                    let sign = match change.tag() {
                        ChangeTag::Equal => ' ',
                        ChangeTag::Delete => '-',
                        ChangeTag::Insert => '+',
                    };
                    format!("{}{}", sign, change.value())
                }),
        )
    }
}

struct HunkHeader {
    old: Range<usize>,
    new: Range<usize>,
}

impl HunkHeader {
    fn new(hunk: &[DiffOp]) -> Self {
        let (first, last) = match (hunk.first(), hunk.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Self {
                    old: 0..0,
                    new: 0..0,
                }
            }
        };

        Self {
            old: first.old_range().start..last.old_range().end,
            new: first.new_range().start..last.new_range().end,
        }
    }
}

struct UnifiedRange<'r>(&'r Range<usize>);

impl fmt::Display for UnifiedRange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.0.end - self.0.start;
        match len {
            0 => write!(f, "{},0", self.0.start),
            1 => write!(f, "{}", self.0.start + 1),
            _ => write!(f, "{},{}", self.0.start + 1, len),
        }
    }
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{} +{} @@",
            UnifiedRange(&self.old),
            UnifiedRange(&self.new)
        )
    }
}
