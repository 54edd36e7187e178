use super::EditError;
use crate::ast::{Pos, Span};
use crate::buffer::offset_of;
use serde::Serialize;

/// A concrete replacement of the text in `[from, to)`.
///
/// Every structural edit is eventually lowered to one of these; nothing but a
/// `TextChange` ever reaches the live buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChange {
    pub from: Pos,
    pub to: Pos,
    pub text: String,
}

impl TextChange {
    pub fn new(from: Pos, to: Pos, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            text: text.into(),
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.from, self.to)
    }

    /// True when the change puts new text into the document.
    pub fn inserts_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Sort latest-first, so applying in order never shifts a pending position.
pub fn sort_descending(changes: &mut [TextChange]) {
    changes.sort_by(|a, b| b.from.cmp(&a.from).then(b.to.cmp(&a.to)));
}

/// Reject overlapping changes. Expects the slice sorted by [`sort_descending`].
pub fn check_disjoint(changes: &[TextChange]) -> Result<(), EditError> {
    // non-overlapping: the earlier change ends at or before the later one starts
    for window in changes.windows(2) {
        let (later, earlier) = (&window[0], &window[1]);
        if earlier.to > later.from {
            return Err(EditError::range(
                earlier.from,
                later.to,
                "overlapping text changes",
            ));
        }
    }
    Ok(())
}

/// Apply `changes` to a copy of `text` and return the result.
///
/// All ranges are resolved against the original text before anything is
/// spliced, so the input is never observed half-edited.
pub fn apply_changes(text: &str, changes: &[TextChange]) -> Result<String, EditError> {
    let mut sorted = changes.to_vec();
    sort_descending(&mut sorted);
    check_disjoint(&sorted)?;

    let mut resolved = Vec::with_capacity(sorted.len());
    for change in &sorted {
        if change.from > change.to {
            return Err(EditError::range(change.from, change.to, "inverted range"));
        }
        let start = offset_of(text, change.from);
        let end = offset_of(text, change.to);
        match (start, end) {
            (Some(start), Some(end)) => resolved.push((start, end, change.text.as_str())),
            _ => {
                return Err(EditError::range(
                    change.from,
                    change.to,
                    "range is outside the document",
                ))
            }
        }
    }

    let mut out = text.to_string();
    for (start, end, replacement) in resolved {
        out.replace_range(start..end, replacement);
    }
    Ok(out)
}
