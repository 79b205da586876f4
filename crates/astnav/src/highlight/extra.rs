//! AST-derived token refinements the coarse service stream lacks: operator
//! glyph positions and matching template angle brackets.

use crate::ast::AstNode;
use crate::config::HighlightingSettings;
use crate::highlight::{HighlightStyle, Token};
use crate::text_pos::{byte_offset_from_position, position_from_byte_offset};

pub(crate) fn collect_refinements(
    ast: &AstNode,
    text: &str,
    settings: &HighlightingSettings,
) -> Vec<Token> {
    let mut out = Vec::new();
    walk(ast, text, settings, &mut out);
    out
}

fn walk(
    node: &AstNode,
    text: &str,
    settings: &HighlightingSettings,
    out: &mut Vec<Token>,
) {
    if settings.operator_tokens
        && matches!(
            node.kind.as_str(),
            "BinaryOperator" | "CompoundAssignOperator" | "UnaryOperator" | "CXXOperatorCall"
        )
        && let Some(token) = operator_glyph_token(node, text)
    {
        out.push(token);
    }

    if settings.angle_brackets {
        angle_bracket_tokens(node, text, out);
    }

    for child in node.children() {
        walk(child, text, settings, out);
    }
}

/// Locate the operator spelling inside the node's range, skipping positions
/// covered by a ranged child: `a + b` must mark the `+`, not a `+` that
/// happens to appear inside an operand. AST positions carry UTF-16 columns,
/// so every text access goes through a conversion.
fn operator_glyph_token(
    node: &AstNode,
    text: &str,
) -> Option<Token> {
    let range = node.range?;
    let spelling = node.detail.as_deref()?;
    if spelling.is_empty() || spelling.chars().any(|c| c.is_alphanumeric()) {
        return None;
    }

    let start = byte_offset_from_position(text, range.start)?;
    let end = byte_offset_from_position(text, range.end)?;
    if start >= end {
        return None;
    }

    let child_spans: Vec<(usize, usize)> = node
        .children()
        .iter()
        .filter_map(|child| {
            let r = child.range?;
            Some((
                byte_offset_from_position(text, r.start)?,
                byte_offset_from_position(text, r.end)?,
            ))
        })
        .collect();

    let region = &text[start..end];
    let mut search_from = 0usize;
    while let Some(found) = region[search_from..].find(spelling) {
        let offset = start + search_from + found;
        let covered = child_spans.iter().any(|&(cs, ce)| cs <= offset && offset < ce);
        if !covered {
            let position = position_from_byte_offset(text, offset);
            return Some(Token {
                line: position.line,
                col: position.character,
                length: spelling.len() as u32,
                style: HighlightStyle::Operator,
            });
        }
        search_from = search_from + found + spelling.len();
        if start + search_from >= end {
            break;
        }
    }
    None
}

/// Mark the `<`/`>` pair gating a node's template arguments. Both brackets
/// must be found inside the node's range or neither is emitted.
fn angle_bracket_tokens(
    node: &AstNode,
    text: &str,
    out: &mut Vec<Token>,
) {
    let args: Vec<&AstNode> =
        node.children().iter().filter(|c| c.role == "template argument").collect();
    let (Some(first), Some(last)) = (args.first(), args.last()) else {
        return;
    };
    let (Some(node_range), Some(first_range), Some(last_range)) = (node.range, first.range, last.range) else {
        return;
    };

    let (Some(node_start), Some(node_end), Some(args_start), Some(args_end)) = (
        byte_offset_from_position(text, node_range.start),
        byte_offset_from_position(text, node_range.end),
        byte_offset_from_position(text, first_range.start),
        byte_offset_from_position(text, last_range.end),
    ) else {
        return;
    };
    if node_start > args_start || args_end > node_end {
        return;
    }

    let open = text[node_start..args_start].rfind('<').map(|i| node_start + i);
    let close = text[args_end..node_end].find('>').map(|i| args_end + i);
    let (Some(open), Some(close)) = (open, close) else {
        return;
    };

    let open_pos = position_from_byte_offset(text, open);
    out.push(Token {
        line: open_pos.line,
        col: open_pos.character,
        length: 1,
        style: HighlightStyle::AngleBracketOpen,
    });
    let close_pos = position_from_byte_offset(text, close);
    out.push(Token {
        line: close_pos.line,
        col: close_pos.character,
        length: 1,
        style: HighlightStyle::AngleBracketClose,
    });
}

#[cfg(test)]
#[path = "../../tests/src/highlight/extra_tests.rs"]
mod tests;
