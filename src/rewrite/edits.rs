#![forbid(unsafe_code)]

//! Edit directives emitted by rewriting tools
//!
//! One directive per line: `type:::path:::offset:::length:::replacement`.
//! A NUL byte in the replacement stands for a newline.

use crate::error::EditError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const BEGIN_EDITS: &str = "==== BEGIN EDITS ====";
pub const END_EDITS: &str = "==== END EDITS ====";

const SEPARATOR: &str = ":::";

/// Edit directive type
///
/// Variant order matters: edits are applied in descending order, so every
/// replacement runs before any include insertion in the same file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EditKind {
    /// `include-user-header`: add `#include "<replacement>"`
    IncludeUserHeader,
    /// `r`: replace `length` bytes at `offset`
    Replace,
    /// Anything else; rejected when applied
    Unknown(String),
}

impl EditKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "r" => EditKind::Replace,
            "include-user-header" => EditKind::IncludeUserHeader,
            other => EditKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EditKind::Replace => "r",
            EditKind::IncludeUserHeader => "include-user-header",
            EditKind::Unknown(s) => s,
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One edit against one file; ordered by kind, then offset, length, text
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edit {
    pub kind: EditKind,
    pub offset: usize,
    pub length: usize,
    pub replacement: String,
}

impl Edit {
    pub fn replace(offset: usize, length: usize, replacement: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Replace,
            offset,
            length,
            replacement: replacement.into(),
        }
    }

    pub fn include(header: impl Into<String>) -> Self {
        Self {
            kind: EditKind::IncludeUserHeader,
            offset: 0,
            length: 0,
            replacement: header.into(),
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Parse one directive into its raw path and the edit
pub fn parse_edit_line(line: &str) -> Result<(String, Edit), EditError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let parts: Vec<&str> = line.splitn(5, SEPARATOR).collect();
    let [kind, path, offset, length, replacement] = parts.as_slice() else {
        return Err(EditError::Parse(line.to_string()));
    };
    let offset = offset
        .parse::<usize>()
        .map_err(|_| EditError::Parse(line.to_string()))?;
    let length = length
        .parse::<usize>()
        .map_err(|_| EditError::Parse(line.to_string()))?;

    Ok((
        path.to_string(),
        Edit {
            kind: EditKind::parse(kind),
            offset,
            length,
            replacement: replacement.replace('\0', "\n"),
        },
    ))
}

/// Directive lines found between BEGIN/END markers in raw tool output
///
/// Identical lines from several blocks (e.g. a header seen by many
/// translation units) are kept once, in first-seen order.
pub fn extract_edits(output: &str) -> Vec<&str> {
    let mut inside = false;
    let mut seen = std::collections::HashSet::new();
    let mut lines = Vec::new();
    for line in output.lines() {
        let trimmed = line.trim_end_matches('\r');
        if trimmed == BEGIN_EDITS {
            inside = true;
        } else if trimmed == END_EDITS {
            inside = false;
        } else if inside && !trimmed.is_empty() && seen.insert(trimmed) {
            lines.push(trimmed);
        }
    }
    lines
}

/// Directives grouped by the file they apply to
#[derive(Debug, Default)]
pub struct EditSet {
    pub by_file: BTreeMap<PathBuf, Vec<Edit>>,
    /// Lines that could not be parsed
    pub parse_errors: usize,
    /// Directives naming a file that does not exist
    pub missing_files: usize,
}

impl EditSet {
    /// Parse directive lines, resolving relative paths against `build_dir`
    ///
    /// Unparseable lines and edits to missing files are logged and skipped.
    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>, build_dir: &Path) -> Self {
        let mut set = EditSet::default();
        let mut resolved: BTreeMap<String, Option<PathBuf>> = BTreeMap::new();

        for line in lines {
            let (raw_path, edit) = match parse_edit_line(line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("{}", e);
                    set.parse_errors += 1;
                    continue;
                }
            };
            let path = resolved
                .entry(raw_path)
                .or_insert_with_key(|raw| resolve_path(raw, build_dir))
                .clone();
            match path {
                Some(path) => set.by_file.entry(path).or_default().push(edit),
                None => set.missing_files += 1,
            }
        }
        set
    }

    pub fn edit_count(&self) -> usize {
        self.by_file.values().map(Vec::len).sum()
    }
}

fn resolve_path(raw: &str, build_dir: &Path) -> Option<PathBuf> {
    let direct = Path::new(raw);
    let candidate = if direct.is_file() {
        direct.to_path_buf()
    } else {
        build_dir.join(raw)
    };
    match candidate.canonicalize() {
        Ok(path) if path.is_file() => Some(path),
        _ => {
            tracing::warn!(path = raw, "edit applies to a non-existent file");
            None
        }
    }
}
