//! Usage classification: turn an AST path ending at a symbol occurrence into
//! a judgment about how that occurrence is used.
//!
//! Drives find-references result coloring ("is this a write?") and one-shot
//! declaration checks ("is this method actually an override?"). Absence of a
//! classification is a legitimate, common outcome; every failure mode
//! returns an empty tag set rather than an error.

pub(crate) mod const_qual;

use std::collections::HashSet;

use bitflags::bitflags;

use crate::ast::AstNode;

pub use self::const_qual::has_const_type;

bitflags! {
    /// How a symbol occurrence is used. Multiple tags can apply at once,
    /// e.g. a member declared with an initializer is Declaration | Write.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UsageTags: u16 {
        const DECLARATION = 1 << 0;
        const WRITE = 1 << 1;
        const READ = 1 << 2;
        const WRITABLE_REF = 1 << 3;
        const USED = 1 << 4;
        const OVERRIDE = 1 << 5;
        const CTOR_DTOR = 1 << 6;
        const TEMPLATE = 1 << 7;
        const OPERATOR = 1 << 8;
        const ANNOTATION_MARKED = 1 << 9;
    }
}

/// Classify how the occurrence at the end of `path` uses `symbol_name`.
///
/// `expected_declaration_kinds`, when non-empty, filters the declaration
/// branch: a declaration whose kind is not listed classifies as empty. This
/// is used by callers that only care about, say, function and method
/// declarations.
///
/// The walk runs innermost to outermost, carrying two facts picked up on
/// the way: whether the occurrence is an lvalue that could be written
/// through (`potential_write`) and whether it denotes a function entity
/// rather than a plain value (`is_function`). The first unambiguous
/// enclosing context terminates the walk.
pub fn classify_usage(
    path: &[&AstNode],
    symbol_name: &str,
    expected_declaration_kinds: &HashSet<&str>,
) -> UsageTags {
    if path.is_empty() {
        return UsageTags::empty();
    }

    let mut potential_write = false;
    let mut is_function = false;

    for index in (0..path.len()).rev() {
        let node = path[index];
        // The child we ascended from, if any.
        let inner = path.get(index + 1).copied();

        match node.kind.as_str() {
            "CXXDelete" => return UsageTags::WRITE,
            // The identifier names a type here, not a value use.
            "CXXNew" => return UsageTags::empty(),
            "Switch" | "If" => return UsageTags::READ,
            "Call" | "CXXMemberCall" => {
                if node.kind == "CXXMemberCall"
                    && let (Some(first), Some(inner)) = (node.children().first(), inner)
                    && std::ptr::eq(first, inner)
                {
                    // The occurrence is the call target itself, not a value.
                    return UsageTags::empty();
                }
                if is_function {
                    return UsageTags::empty();
                }
                return if potential_write {
                    UsageTags::WRITABLE_REF
                } else {
                    UsageTags::READ
                };
            },
            "CXXConstruct" | "CXXTemporaryObject" => {
                return if node.detail.as_deref() == Some(symbol_name) {
                    UsageTags::CTOR_DTOR
                } else {
                    UsageTags::empty()
                };
            },
            "CXXCtorInitializer" => {
                // The initialized member itself is written; anything inside
                // the initializer expression is read.
                return if index + 1 == path.len() {
                    UsageTags::WRITE
                } else {
                    UsageTags::READ
                };
            },
            "UnaryOperator" if node.detail_is("++") || node.detail_is("--") => {
                return UsageTags::WRITE;
            },
            "BinaryOperator" | "CompoundAssignOperator" => {
                return classify_operator(node, inner, 0, symbol_name, potential_write);
            },
            // Operator-call syntax has one extra leading child for the
            // callee, shifting the left-hand side to index 1.
            "CXXOperatorCall" => {
                return classify_operator(node, inner, 1, symbol_name, potential_write);
            },
            "ImplicitCast" => {
                if node.detail_is("FunctionToPointerDecay") {
                    return UsageTags::empty();
                }
                if has_const_type(node) {
                    return UsageTags::READ;
                }
                potential_write = true;
                // Not a decisive context; keep ascending.
            },
            _ => {},
        }

        if node.role == "declaration" && !node.is_translation_unit() {
            return classify_declaration(
                node,
                inner,
                &path[..index],
                expected_declaration_kinds,
            );
        }

        if matches!(node.kind.as_str(), "DeclRef" | "Member") && node.arcana_contains("lvalue") {
            if node.denotes_function() {
                is_function = true;
            } else {
                potential_write = true;
            }
        }
    }

    // A bare reference at the top level of the file.
    if path[0].is_translation_unit() {
        UsageTags::USED
    } else {
        UsageTags::empty()
    }
}

/// Terminal handling for assignment-like and other binary/operator-call
/// nodes. `lhs_index` is 0 for plain binary operators and 1 for operator
/// calls.
fn classify_operator(
    node: &AstNode,
    inner: Option<&AstNode>,
    lhs_index: usize,
    symbol_name: &str,
    potential_write: bool,
) -> UsageTags {
    // A user-defined-type constructor invocation disguised as an operator
    // call: classify by whether the invoked constructor names the symbol.
    if node.kind == "CXXOperatorCall"
        && let Some(first) = node.children().first()
        && first.arcana_contains("CXXConstructor")
    {
        let matches_symbol = first.detail.as_deref() == Some(symbol_name)
            || node.detail.as_deref() == Some(symbol_name);
        return if matches_symbol {
            UsageTags::CTOR_DTOR
        } else {
            UsageTags::empty()
        };
    }

    if is_assignment_spelling(node.detail.as_deref()) {
        let on_lhs = match (node.children().get(lhs_index), inner) {
            (Some(lhs), Some(inner)) => std::ptr::eq(lhs, inner),
            _ => false,
        };
        if on_lhs {
            return UsageTags::WRITE;
        }
        return if potential_write {
            UsageTags::WRITABLE_REF
        } else {
            UsageTags::READ
        };
    }

    UsageTags::READ
}

fn is_assignment_spelling(spelling: Option<&str>) -> bool {
    match spelling {
        Some(op) => op.ends_with('=') && op != "==",
        None => false,
    }
}

fn classify_declaration(
    node: &AstNode,
    inner: Option<&AstNode>,
    ancestors: &[&AstNode],
    expected_declaration_kinds: &HashSet<&str>,
) -> UsageTags {
    // A type's own declaration (or its use as a type) is not a value usage.
    if node.is_type_declaration_kind() && !expected_declaration_kinds.contains(node.kind.as_str()) {
        return UsageTags::empty();
    }
    if !expected_declaration_kinds.is_empty()
        && !expected_declaration_kinds.contains(node.kind.as_str())
    {
        return UsageTags::empty();
    }

    // We ascended out of an initializer rather than sitting on the declared
    // name itself: classify by initializer position. The 0th child of the
    // declaration (including the first entry of a constructor member list)
    // is the entity being initialized, hence written.
    if declaration_has_initializer(node) && inner.is_some() {
        let on_declared_entity = match (node.children().first(), inner) {
            (Some(first), Some(inner)) => std::ptr::eq(first, inner),
            _ => false,
        };
        if on_declared_entity {
            return UsageTags::WRITE;
        }
        return if has_const_type(node) {
            UsageTags::READ
        } else {
            UsageTags::WRITABLE_REF
        };
    }

    let mut tags = UsageTags::DECLARATION;

    if node.arcana_contains(" used") || node.arcana_contains(" referenced") {
        tags |= UsageTags::USED;
    }
    if node.is_constructor_or_destructor() {
        tags |= UsageTags::CTOR_DTOR;
    }
    for child in node.children() {
        if child.role == "attribute" {
            match child.kind.as_str() {
                "Override" | "Final" => tags |= UsageTags::OVERRIDE,
                "Annotate" => tags |= UsageTags::ANNOTATION_MARKED,
                _ => {},
            }
        }
    }
    if ancestors.iter().any(|n| n.is_template_kind())
        || node.children().iter().any(|c| c.role == "template argument")
    {
        tags |= UsageTags::TEMPLATE;
    }
    if node.declares_operator() {
        tags |= UsageTags::OPERATOR;
    }

    tags
}

/// Clang marks initialized declarations with an init style in the dump
/// (`cinit`, `callinit`, `listinit`).
fn declaration_has_initializer(node: &AstNode) -> bool {
    node.arcana_contains("cinit")
        || node.arcana_contains("callinit")
        || node.arcana_contains("listinit")
}

#[cfg(test)]
#[path = "../../tests/src/usage/classify_tests.rs"]
mod tests;
