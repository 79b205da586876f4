//! Const-qualification analysis over type spellings mined from arcana.

use crate::ast::AstNode;

/// Whether the entity an expression node produces is const-qualified, i.e.
/// cannot be written through.
///
/// Works on the type spelling alone: strip one trailing `const`, ignore the
/// interior of template arguments, then weigh pointer/reference markers
/// against `const` occurrences. An `&&` pair is one rvalue reference, not
/// two levels of indirection, and cancels out of the marker count. With no
/// markers at all, a value result is still unwritable when it is a
/// non-reference cast result or an rvalue.
pub fn has_const_type(node: &AstNode) -> bool {
    let raw = node.type_string().unwrap_or_default();
    let trimmed = raw.trim_end();
    let stripped = trimmed.strip_suffix("const").unwrap_or(trimmed);
    let ty = strip_template_arguments(stripped);

    let stars = ty.matches('*').count();
    let refs = ty.matches('&').count() - 2 * ty.matches("&&").count();
    let markers = stars + refs;
    if markers == 0 {
        return ty.contains("const")
            || ty.trim_end().ends_with("&&")
            || is_value_cast(node)
            || marks_rvalue(node);
    }

    let consts = ty.matches("const").count();
    markers <= consts
}

/// Remove the text between the first `<` and the last `>`: qualifiers inside
/// template arguments say nothing about the outer type.
fn strip_template_arguments(ty: &str) -> String {
    let Some(open) = ty.find('<') else {
        return ty.to_owned();
    };
    let Some(close) = ty.rfind('>') else {
        return ty.to_owned();
    };
    if close <= open {
        return ty.to_owned();
    }
    format!("{}{}", &ty[..open], &ty[close + 1..])
}

/// A value-to-value (non-reference) conversion; its result is a fresh
/// temporary that no write can observe.
fn is_value_cast(node: &AstNode) -> bool {
    node.kind.ends_with("Cast") && node.detail_is("LValueToRValue")
}

fn marks_rvalue(node: &AstNode) -> bool {
    node.detail_is("rvalue") || node.detail_is("prvalue") || node.detail_is("xvalue")
}

#[cfg(test)]
#[path = "../../tests/src/usage/const_qual_tests.rs"]
mod tests;
