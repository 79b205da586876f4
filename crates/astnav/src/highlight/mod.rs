//! Highlight reconciliation: merge the service's coarse semantic tokens
//! with AST-derived refinements and clean up disabled-code ranges.

pub(crate) mod disabled;
pub(crate) mod extra;
pub(crate) mod output_param;

use lsp_types::{Position, Range};
use serde::{Deserialize, Serialize};

use crate::ast::{AstNode, resolve_path};
use crate::config::HighlightingSettings;
use crate::text_pos::LineIndex;

/// Style classification of one highlight token. Covers the coarse styles
/// the service emits plus the derived ones this module inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightStyle {
    Namespace,
    Type,
    LocalVariable,
    Field,
    Parameter,
    Function,
    Method,
    EnumMember,
    Keyword,
    Macro,
    MacroExpansion,
    Comment,
    Number,
    StringLiteral,
    Operator,
    AngleBracketOpen,
    AngleBracketClose,
    OutputArgument,
    Disabled,
}

/// One highlight token: a source position, a length and a style. Columns
/// and lengths are UTF-16 units, the convention the service and the AST
/// node ranges share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub line: u32,
    pub col: u32,
    pub length: u32,
    pub style: HighlightStyle,
}

impl Token {
    fn sort_key(&self) -> (u32, u32, u32) {
        (self.line, self.col, self.length)
    }
}

/// A source byte range excluded by preprocessor conditionals, painted as
/// background shading independently of per-token styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisabledBlock {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileResult {
    pub tokens: Vec<Token>,
    pub disabled_blocks: Vec<DisabledBlock>,
}

/// Merge `base` (the service's token stream, sorted by position) with
/// AST-derived refinements and strip disabled-region boundary tokens.
///
/// Without an AST only the disabled-region cleanup runs; the refinements
/// are additive and arrive with the next AST fetch.
pub fn reconcile(
    base: Vec<Token>,
    ast: Option<&AstNode>,
    text: &str,
    settings: &HighlightingSettings,
) -> ReconcileResult {
    let index = LineIndex::new(text);
    let (mut tokens, disabled_blocks) = disabled::clean_disabled_regions(base, text, &index);

    if let Some(ast) = ast {
        for token in extra::collect_refinements(ast, text, settings) {
            insert_token(&mut tokens, token);
        }
        if settings.output_arguments {
            mark_output_arguments(&mut tokens, ast);
        }
    }

    ReconcileResult {
        tokens,
        disabled_blocks,
    }
}

/// Sorted insert by `(line, col, length)` with three suppression rules:
/// position-identical duplicates, tokens shadowed by a macro expansion at
/// the same spot, and tokens that would overlap the start of the next
/// existing token (defensive bound against malformed upstream ranges).
pub(crate) fn insert_token(
    tokens: &mut Vec<Token>,
    token: Token,
) {
    let idx = tokens.partition_point(|t| t.sort_key() < token.sort_key());

    if tokens.get(idx).is_some_and(|t| t.sort_key() == token.sort_key()) {
        return;
    }
    if idx > 0 {
        let prev = &tokens[idx - 1];
        if prev.line == token.line && prev.col == token.col && prev.style == HighlightStyle::MacroExpansion {
            return;
        }
    }
    if let Some(next) = tokens.get(idx)
        && next.line == token.line
        && token.col + token.length > next.col
    {
        return;
    }

    tokens.insert(idx, token);
}

/// Upgrade value tokens whose occurrence sits in a mutable-reference
/// argument context to the output-argument style. Tokens the service
/// already marked keep their style.
fn mark_output_arguments(
    tokens: &mut [Token],
    ast: &AstNode,
) {
    for token in tokens.iter_mut() {
        if !matches!(
            token.style,
            HighlightStyle::LocalVariable | HighlightStyle::Field | HighlightStyle::Parameter
        ) {
            continue;
        }
        let range = Range {
            start: Position::new(token.line, token.col),
            end: Position::new(token.line, token.col + token.length),
        };
        let path = resolve_path(ast, range);
        if output_param::is_output_argument(&path) {
            token.style = HighlightStyle::OutputArgument;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/highlight/reconcile_tests.rs"]
mod tests;
