use crate::error::Result;
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_EXTENSIONS: &[&str] = &["cpp", "hpp", "cl"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Recursively collect files under `root` ending in one of `extensions`.
///
/// Paths are grouped by extension, in the order the extensions are given, and
/// normalized. A missing `root` yields an empty list.
pub fn find_source_files<S: AsRef<str>>(root: &Path, extensions: &[S]) -> Result<Vec<PathBuf>> {
    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let mut files = Vec::new();

    for ext in extensions {
        let pattern = format!("{}/**/*.{}", escaped_root, Pattern::escape(ext.as_ref()));

        for entry in glob::glob_with(&pattern, MATCH_OPTIONS)? {
            match entry {
                Ok(path) if !path.is_dir() && !is_hidden(root, &path) => {
                    files.push(normalize(&path))
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        path = %err.path().display(),
                        error = %err.error(),
                        "skipping unreadable entry"
                    );
                }
            }
        }
    }

    Ok(files)
}

// `**` may still descend into dot-directories on older glob releases. Only components below
// `root` count; glob drops a leading `./`, so both sides are compared normalized.
fn is_hidden(root: &Path, path: &Path) -> bool {
    let path = normalize(path);
    let root = normalize(root);
    let relative = if root == Path::new(".") {
        path.as_path()
    } else {
        match path.strip_prefix(&root) {
            Ok(relative) => relative,
            Err(_) => return false,
        }
    };

    relative.components().any(|c| {
        matches!(c, Component::Normal(name) if name.to_string_lossy().starts_with('.'))
    })
}

/// Lexically collapse `.`, `..` and redundant separators.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    if parts.is_empty() {
        PathBuf::from(".")
    } else {
        parts.iter().collect()
    }
}
