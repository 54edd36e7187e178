//! Host text buffer interface and position arithmetic.

use crate::ast::{Pos, Span};
use crate::edit::EditError;
use std::io::Write;
use std::path::Path;

/// The live source text. `replace_range` is the only mutator the editing
/// core ever calls, and only with validated, non-overlapping ranges applied
/// latest-first.
pub trait TextBuffer {
    fn value(&self) -> String;
    fn range(&self, from: Pos, to: Pos) -> Result<String, EditError>;
    fn replace_range(&mut self, text: &str, from: Pos, to: Pos) -> Result<(), EditError>;
}

/// A [`TextBuffer`] over an owned `String`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringBuffer {
    text: String,
}

impl StringBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn offsets(&self, from: Pos, to: Pos) -> Result<(usize, usize), EditError> {
        if from > to {
            return Err(EditError::range(from, to, "inverted range"));
        }
        match (offset_of(&self.text, from), offset_of(&self.text, to)) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(EditError::range(from, to, "range is outside the document")),
        }
    }
}

impl From<String> for StringBuffer {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for StringBuffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl TextBuffer for StringBuffer {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn range(&self, from: Pos, to: Pos) -> Result<String, EditError> {
        let (start, end) = self.offsets(from, to)?;
        Ok(self.text[start..end].to_string())
    }

    fn replace_range(&mut self, text: &str, from: Pos, to: Pos) -> Result<(), EditError> {
        let (start, end) = self.offsets(from, to)?;
        self.text.replace_range(start..end, text);
        Ok(())
    }
}

/// Byte offset of `pos` in `text`, or `None` past the end of its line or
/// the document.
pub fn offset_of(text: &str, pos: Pos) -> Option<usize> {
    let mut line_start = 0;
    for _ in 0..pos.line {
        line_start += text[line_start..].find('\n')? + 1;
    }
    let rest = &text[line_start..];
    let line = match rest.find('\n') {
        Some(end) => &rest[..end],
        None => rest,
    };
    if pos.ch == line.chars().count() {
        return Some(line_start + line.len());
    }
    line.char_indices().nth(pos.ch).map(|(i, _)| line_start + i)
}

/// The slice of `text` covered by `span`.
pub fn text_in(text: &str, span: Span) -> Option<&str> {
    let start = offset_of(text, span.from)?;
    let end = offset_of(text, span.to)?;
    text.get(start..end)
}

/// Position of byte `offset` in `text`. Offsets past the end clamp to it.
pub fn pos_of(text: &str, offset: usize) -> Pos {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    Pos::new(line, before[line_start..].chars().count())
}

pub fn end_pos(text: &str) -> Pos {
    pos_of(text, text.len())
}

/// Atomic file write: tempfile in the same directory, fsync, rename.
pub fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
