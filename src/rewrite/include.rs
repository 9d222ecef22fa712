#![forbid(unsafe_code)]

//! `#include "..."` insertion
//!
//! The new include goes before the first line that is not part of the file
//! preamble: leading comments, include guards, system includes and the
//! primary header. Ordering inside the include block is left to a formatter.

use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static PLATFORM_TEST_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:_(?:android|aura|chromeos|ios|linux|mac|ozone|posix|win|x11))?(?:_(?:browser|interactive_ui|ui|unit)?test)?",
    )
    .expect("valid pattern")
});

/// Comments, BOM and system includes
static PREAMBLE_LINE: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r"^(?:\s|//|/\*|\*|(?-u:\xEF\xBB\xBF)|#include\s*<.*>)").expect("valid pattern")
});

/// `FOO_BAR_H_` style guards
static STYLE_GUARD: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r"^#(?:ifndef|define)\s+[A-Z0-9_]+_H(?:_|__)?\b\s*$").expect("valid pattern")
});

static IFNDEF: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"^#ifndef\s+([A-Za-z0-9_]*)\s*$").expect("valid pattern"));

static SIMPLE_DEFINE: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r"^#define\s+([A-Za-z0-9_]*)\s*(?:1\s*)?$").expect("valid pattern")
});

static COMMENT_START: LazyLock<BytesRegex> =
    LazyLock::new(|| BytesRegex::new(r"^\s*(?://|\*)").expect("valid pattern"));

/// `bar/foo_posix.cc` -> `foo`, `bar/foo_unittest.cc` -> `foo`; headers have none
pub fn primary_header_basename(path: &Path) -> Option<String> {
    if path.extension().is_some_and(|ext| ext == "h") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    Some(PLATFORM_TEST_SUFFIX.replace_all(stem, "").into_owned())
}

/// A line of the file, without its terminator
struct Line<'c> {
    start: usize,
    text: &'c [u8],
    terminated: bool,
}

fn split_lines(contents: &[u8]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    while start < contents.len() {
        let (end, next, terminated) = match contents[start..].iter().position(|&b| b == b'\n') {
            Some(i) => (start + i, start + i + 1, true),
            None => (contents.len(), contents.len(), false),
        };
        let mut text = &contents[start..end];
        if let Some(stripped) = text.strip_suffix(b"\r") {
            text = stripped;
        }
        lines.push(Line {
            start,
            text,
            terminated,
        });
        start = next;
    }
    lines
}

/// Index of the first line an include may be inserted before
fn insertion_line(lines: &[Line<'_>], primary: Option<&BytesRegex>) -> usize {
    let mut guard: Option<&[u8]> = None;
    for (index, line) in lines.iter().enumerate() {
        let text = line.text;
        if (text.is_empty() && line.terminated)
            || PREAMBLE_LINE.is_match(text)
            || STYLE_GUARD.is_match(text)
            || primary.is_some_and(|re| re.is_match(text))
        {
            continue;
        }
        if let Some(name) = IFNDEF.captures(text).and_then(|c| c.get(1)) {
            // A guard only counts when the next non-blank line defines it
            let defines_it = lines[index + 1..]
                .iter()
                .find(|l| !l.text.is_empty())
                .and_then(|l| SIMPLE_DEFINE.captures(l.text))
                .and_then(|c| c.get(1))
                .is_some_and(|m| m.as_bytes() == name.as_bytes());
            if defines_it {
                guard = Some(name.as_bytes());
                continue;
            }
        }
        if let Some(name) = SIMPLE_DEFINE.captures(text).and_then(|c| c.get(1))
            && guard == Some(name.as_bytes())
        {
            guard = None;
            continue;
        }
        return index;
    }
    lines.len()
}

/// Insert `#include "<header>"` into `contents` unless already present
///
/// Returns true if the contents changed.
pub fn insert_user_include(path: &Path, contents: &mut Vec<u8>, header: &str) -> bool {
    let include_line = format!("#include \"{header}\"");
    if contents
        .windows(include_line.len())
        .any(|w| w == include_line.as_bytes())
    {
        return false;
    }

    let primary = primary_header_basename(path).and_then(|basename| {
        let pattern = format!(
            r#"^#include\s*"[^"]*\b{}[^"/]*\.h""#,
            regex::escape(&basename)
        );
        BytesRegex::new(&pattern).ok()
    });

    let lines = split_lines(contents);
    let mut index = insertion_line(&lines, primary.as_ref());
    while index > 0 && COMMENT_START.is_match(lines[index - 1].text) {
        index -= 1;
    }
    let point = lines.get(index).map_or(contents.len(), |line| line.start);

    let mut text = include_line.into_bytes();
    text.push(b'\n');
    // Keep a blank line between the new include and non-include code
    if !contents[point..].starts_with(b"#include") {
        text.push(b'\n');
    }
    let tail = contents.split_off(point);
    contents.extend_from_slice(&text);
    contents.extend_from_slice(&tail);
    true
}
