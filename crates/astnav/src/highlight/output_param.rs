//! Output-argument detection.
//!
//! A variable passed where a callee can write through it deserves distinct
//! emphasis. When the service supplies no modifier saying so, we fall back
//! to ascending the AST path from the occurrence: reaching a call or
//! construction context before any const-qualified or value-semantics
//! boundary means the callee may mutate the argument.

use crate::ast::AstNode;
use crate::usage::has_const_type;

pub(crate) fn is_output_argument(path: &[&AstNode]) -> bool {
    for index in (0..path.len()).rev() {
        let node = path[index];
        let inner = path.get(index + 1).copied();

        match node.kind.as_str() {
            // Value-semantics boundaries: nothing written here escapes.
            "Lambda" | "MaterializeTemporary" => return false,
            "BinaryOperator" | "CompoundAssignOperator" => return false,
            "ImplicitCast" => {
                if has_const_type(node) {
                    return false;
                }
            },
            "CXXMemberCall" => {
                // The receiver is not an argument.
                if let (Some(first), Some(inner)) = (node.children().first(), inner)
                    && std::ptr::eq(first, inner)
                {
                    return false;
                }
                return true;
            },
            "Call" | "CXXConstruct" | "CXXOperatorCall" => return true,
            _ => {},
        }
    }
    false
}

#[cfg(test)]
#[path = "../../tests/src/highlight/output_param_tests.rs"]
mod tests;
