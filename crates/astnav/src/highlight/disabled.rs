//! Disabled-region cleanup.
//!
//! The service marks preprocessor-disabled code with whole-line disabled
//! tokens, including the `#if`/`#endif` boundary lines themselves. The
//! editor wants only the true interior marked: boundary directives stay
//! styled as ordinary code, interior lines (blank ones included) form
//! contiguous background blocks.

use lsp_types::Position;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::highlight::{DisabledBlock, HighlightStyle, Token};
use crate::text_pos::{LineIndex, byte_offset_from_position};

static PP_CONTROL_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*#\s*(if|ifdef|ifndef|elif|else|endif)\b").unwrap());

/// One pass over the token stream. Disabled-style tokens whose text is a
/// preprocessor control directive are region boundaries: they are stripped
/// from the output and close any open block. Only a non-boundary disabled
/// token opens or extends a block; the block covers whole lines so interior
/// blank lines stay graphically contiguous.
pub(crate) fn clean_disabled_regions(
    tokens: Vec<Token>,
    text: &str,
    index: &LineIndex,
) -> (Vec<Token>, Vec<DisabledBlock>) {
    let mut kept = Vec::with_capacity(tokens.len());
    let mut blocks = Vec::new();
    let mut current: Option<DisabledBlock> = None;

    for token in tokens {
        if token.style != HighlightStyle::Disabled {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            kept.push(token);
            continue;
        }

        // Token columns are UTF-16 units; convert before slicing the text.
        let start = byte_offset_from_position(text, Position::new(token.line, token.col));
        let end =
            byte_offset_from_position(text, Position::new(token.line, token.col + token.length));
        if let (Some(start), Some(end)) = (start, end)
            && start <= end
            && PP_CONTROL_DIRECTIVE.is_match(&text[start..end])
        {
            // Boundary line: not part of the disabled content.
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }

        let line_start = index.line_start(token.line);
        let line_end = index.line_end(token.line);
        match &mut current {
            Some(block) => block.end = block.end.max(line_end),
            None => {
                current = Some(DisabledBlock {
                    start: line_start,
                    end: line_end,
                });
            },
        }
        kept.push(token);
    }

    if let Some(block) = current.take() {
        blocks.push(block);
    }

    (kept, blocks)
}

#[cfg(test)]
#[path = "../../tests/src/highlight/disabled_tests.rs"]
mod tests;
