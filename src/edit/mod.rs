//! Structural edits and their translation to text changes.
//!
//! Root-level edits lower directly to a [`TextChange`]. Edits inside a node
//! are grouped by ancestor ([`group_by_ancestor`]); each group clones its
//! ancestor once, applies its edits to the clone, and pretty-prints the clone
//! over the ancestor's original range. Nothing here touches the live tree or
//! buffer.

mod change;
mod errors;
mod group;
mod model;

pub use change::{apply_changes, check_disjoint, sort_descending, TextChange};
pub use errors::EditError;
pub use group::{group_by_ancestor, translate, EditGroup};
pub use model::{drop_edits, DropTarget, Edit, EditKind, FocusHint};
