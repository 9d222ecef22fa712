#![forbid(unsafe_code)]

//! Applying the edits for one file
//!
//! Edits are sorted and applied back to front so earlier offsets stay valid.
//! Exact duplicates are skipped. A conflicting or overlapping edit is rejected
//! and counted, and the remaining edits still go through.

use crate::error::EditError;
use crate::rewrite::edits::{Edit, EditKind};
use crate::rewrite::include::insert_user_include;
use std::path::Path;

/// What happened to one file's contents
#[derive(Debug, Default)]
pub struct FileOutcome {
    pub contents: Vec<u8>,
    pub applied: usize,
    pub errors: Vec<EditError>,
    /// List deletions that were widened to swallow a separator
    pub extended_deletions: usize,
}

/// Apply `edits` to the in-memory `contents` of `path`
pub fn apply_to_contents(path: &Path, contents: Vec<u8>, mut edits: Vec<Edit>) -> FileOutcome {
    edits.sort_unstable_by(|a, b| b.cmp(a));

    let mut outcome = FileOutcome {
        contents,
        ..Default::default()
    };
    let mut last: Option<&Edit> = None;
    for edit in &edits {
        if last == Some(edit) {
            continue;
        }
        match apply_one(path, &mut outcome, edit, last) {
            Ok(()) => {
                last = Some(edit);
                outcome.applied += 1;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                outcome.errors.push(e);
            }
        }
    }
    outcome
}

fn apply_one(
    path: &Path,
    outcome: &mut FileOutcome,
    edit: &Edit,
    last: Option<&Edit>,
) -> Result<(), EditError> {
    match &edit.kind {
        EditKind::Replace => {
            check_against_previous(path, edit, last)?;
            if edit.end() > outcome.contents.len() {
                return Err(EditError::OutOfBounds {
                    file: path.to_path_buf(),
                    offset: edit.offset,
                    length: edit.length,
                    size: outcome.contents.len(),
                });
            }
            let mut replaced = Vec::with_capacity(
                outcome.contents.len() - edit.length + edit.replacement.len(),
            );
            replaced.extend_from_slice(&outcome.contents[..edit.offset]);
            replaced.extend_from_slice(edit.replacement.as_bytes());
            replaced.extend_from_slice(&outcome.contents[edit.end()..]);
            let original = std::mem::replace(&mut outcome.contents, replaced);
            if edit.replacement.is_empty()
                && let Some(extended) =
                    extend_list_deletion(&original, &outcome.contents, edit.offset, edit.length)
            {
                outcome.contents = extended;
                outcome.extended_deletions += 1;
            }
            Ok(())
        }
        EditKind::IncludeUserHeader => {
            insert_user_include(path, &mut outcome.contents, &edit.replacement);
            Ok(())
        }
        EditKind::Unknown(directive) => Err(EditError::UnknownDirective {
            directive: directive.clone(),
            file: path.to_path_buf(),
        }),
    }
}

/// `last` is the previously applied edit, which sorts at or after `edit`
fn check_against_previous(path: &Path, edit: &Edit, last: Option<&Edit>) -> Result<(), EditError> {
    let Some(last) = last.filter(|l| l.kind == EditKind::Replace) else {
        return Ok(());
    };
    if edit.offset == last.offset && edit.length == last.length {
        return Err(EditError::Conflict {
            file: path.to_path_buf(),
            offset: edit.offset,
            length: edit.length,
            first: edit.replacement.clone(),
            second: last.replacement.clone(),
        });
    }
    if edit.end() > last.offset {
        return Err(EditError::Overlap {
            file: path.to_path_buf(),
            offset: edit.offset,
            length: edit.length,
            other_offset: last.offset,
            other_length: last.length,
        });
    }
    Ok(())
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\r' | b' ')
}

/// Widen a deletion of a list element so the separator goes with it
///
/// `contents` already has the deletion applied at `offset`. With a comma after
/// the hole, the comma and whitespace up to it are removed too. Otherwise,
/// with a comma or colon before the hole, that separator and the whitespace
/// after it are removed. Returns None when nothing changes.
pub fn extend_list_deletion(
    original: &[u8],
    contents: &[u8],
    offset: usize,
    length: usize,
) -> Option<Vec<u8>> {
    let mut char_before = None;
    let mut left_trim = 0;
    for &b in contents[..offset].iter().rev() {
        left_trim += 1;
        if is_whitespace(b) {
            continue;
        }
        if matches!(b, b',' | b':' | b'(' | b'{') {
            char_before = Some(b);
        }
        break;
    }

    let mut char_after = None;
    let mut right_trim = 0;
    for &b in &contents[offset..] {
        right_trim += 1;
        if is_whitespace(b) {
            continue;
        }
        if b == b',' {
            char_after = Some(b);
        }
        break;
    }

    let before = char_before?;
    let (start, end) = if char_after.is_some() {
        (offset, offset + right_trim)
    } else if matches!(before, b',' | b':') {
        (offset - left_trim, offset)
    } else {
        return None;
    };

    tracing::debug!(
        deleted = %String::from_utf8_lossy(&original[offset..offset + length]),
        "extended deletion of list element"
    );
    let mut extended = Vec::with_capacity(contents.len() - (end - start));
    extended.extend_from_slice(&contents[..start]);
    extended.extend_from_slice(&contents[end..]);
    Some(extended)
}
