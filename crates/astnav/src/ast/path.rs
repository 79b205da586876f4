//! Path resolution: narrow a whole-file AST down to the nodes enclosing a
//! source range.

use lsp_types::{Position, Range};

use crate::ast::{AstNode, range_at, range_contains, range_is_left_of, range_is_right_of};

/// Compute the root-first path of nodes from `root` to the most specific
/// node whose range exactly equals `target`.
///
/// If no node matches exactly, the deepest path still containing `target`
/// is returned instead. An invalid root or a target contained nowhere
/// yields an empty path.
///
/// The path borrows from `root` and must not outlive it.
pub fn resolve_path<'a>(
    root: &'a AstNode,
    target: Range,
) -> Vec<&'a AstNode> {
    if !root.is_valid() {
        return Vec::new();
    }

    let mut collector = PathCollector {
        target,
        path: Vec::new(),
        fallback: Vec::new(),
        done: false,
    };
    collector.visit(root);

    if collector.done {
        collector.path
    } else {
        collector.fallback
    }
}

/// Resolve by cursor position, treated as a zero-length range.
pub fn resolve_path_at<'a>(
    root: &'a AstNode,
    position: Position,
) -> Vec<&'a AstNode> {
    resolve_path(root, range_at(position))
}

struct PathCollector<'a> {
    target: Range,
    path: Vec<&'a AstNode>,
    fallback: Vec<&'a AstNode>,
    done: bool,
}

impl<'a> PathCollector<'a> {
    /// Recursive descent with backtracking. The caller has already checked
    /// containment (or the node is the root, which is always visited since
    /// roots may carry a synthetic or absent range).
    fn visit(
        &mut self,
        node: &'a AstNode,
    ) {
        self.path.push(node);

        let full_match = node.range == Some(self.target);

        // Children are still descended after a full match: a sole child can
        // cover the same span (implicit casts, compiler-generated members)
        // and the innermost one wins.
        self.visit_children(node);

        if self.done {
            return;
        }
        if full_match {
            self.done = true;
            return;
        }
        // Only a node that actually contains the target can anchor the
        // longest-partial fallback; a rangeless root does not count.
        let contains = node.range.is_some_and(|r| range_contains(r, self.target));
        if contains && self.path.len() > self.fallback.len() {
            self.fallback = self.path.clone();
        }
        self.path.pop();
    }

    fn visit_children(
        &mut self,
        node: &'a AstNode,
    ) {
        let children = node.children();
        if children.is_empty() {
            return;
        }

        // Most kinds keep their children range-sorted, so a binary search
        // bounds the candidates. Function declarations and expression-role
        // nodes interleave implicit children out of textual order and get a
        // full linear scan instead.
        let sorted = !(node.role == "expression" || node.is_function_kind());

        let first = if sorted {
            children.partition_point(|child| child_is_left_of(child, self.target))
        } else {
            0
        };

        for child in &children[first..] {
            if sorted
                && !child.is_implicit()
                && let Some(range) = child.range
                && range_is_right_of(range, self.target)
            {
                break;
            }
            let contains = match child.range {
                Some(range) => range_contains(range, self.target),
                None => false,
            };
            if contains {
                self.visit(child);
            }
            if self.done {
                return;
            }
        }
    }
}

/// Fast-reject test for the binary search. Implicit nodes are excluded:
/// synthesized members sit at their class's location and would otherwise
/// break the ordering assumption.
fn child_is_left_of(
    child: &AstNode,
    target: Range,
) -> bool {
    if child.is_implicit() {
        return false;
    }
    match child.range {
        Some(range) => range_is_left_of(range, target),
        None => false,
    }
}

#[cfg(test)]
#[path = "../../tests/src/ast/path_tests.rs"]
mod tests;
