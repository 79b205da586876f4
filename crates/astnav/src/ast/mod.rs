//! Data model for the analysis service's AST and path resolution over it.
//!
//! The service ships one immutable tree per response. Nodes are addressed
//! structurally (role, kind, detail, arcana, range, children); there are no
//! parent back-references, so any parent context an algorithm needs is the
//! accumulated path from the root.

pub(crate) mod node;
pub(crate) mod path;

pub use self::node::AstNode;
pub use self::path::{resolve_path, resolve_path_at};

use lsp_types::{Position, Range};

/// `a` is at or before `b` in document order.
pub(crate) fn pos_le(
    a: Position,
    b: Position,
) -> bool {
    a.line < b.line || (a.line == b.line && a.character <= b.character)
}

/// `a` is strictly before `b` in document order.
pub(crate) fn pos_lt(
    a: Position,
    b: Position,
) -> bool {
    a.line < b.line || (a.line == b.line && a.character < b.character)
}

/// Inclusive containment: `outer` covers every position of `inner`.
pub(crate) fn range_contains(
    outer: Range,
    inner: Range,
) -> bool {
    pos_le(outer.start, inner.start) && pos_le(inner.end, outer.end)
}

/// `range` ends before `target` starts.
pub(crate) fn range_is_left_of(
    range: Range,
    target: Range,
) -> bool {
    pos_lt(range.end, target.start)
}

/// `range` starts after `target` ends.
pub(crate) fn range_is_right_of(
    range: Range,
    target: Range,
) -> bool {
    pos_lt(target.end, range.start)
}

/// Turn a cursor position into the zero-length range used for path lookups.
pub(crate) fn range_at(position: Position) -> Range {
    Range {
        start: position,
        end: position,
    }
}
