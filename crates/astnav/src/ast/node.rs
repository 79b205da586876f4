use lsp_types::Range;
use serde::Deserialize;

/// One node of the analysis service's AST, deserialized from a response.
///
/// `role` is the coarse category ("expression", "declaration", "statement",
/// "type", ...), `kind` the concrete node class ("BinaryOperator",
/// "CXXMethod", ...). `detail` carries a short per-kind string such as an
/// operator spelling or a declared name. `arcana` is a free-form one-line
/// dump mined for facts that have no structured field (type spellings,
/// qualifiers, implicit-ness, scope flags).
///
/// `range` is absent for implicit and macro-generated nodes. `children` is
/// absent when the subtree was not expanded; both absent and empty iterate
/// as "no children".
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AstNode {
    pub role: String,
    pub kind: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub arcana: Option<String>,
    #[serde(default)]
    pub range: Option<Range>,
    #[serde(default)]
    pub children: Option<Vec<AstNode>>,
}

impl AstNode {
    /// Children to iterate; `None` and `Some(vec![])` both yield nothing.
    pub fn children(&self) -> &[AstNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// A structurally usable node carries at least a role and a kind.
    pub fn is_valid(&self) -> bool {
        !self.role.is_empty() && !self.kind.is_empty()
    }

    pub fn detail_is(
        &self,
        value: &str,
    ) -> bool {
        self.detail.as_deref() == Some(value)
    }

    pub fn arcana_contains(
        &self,
        needle: &str,
    ) -> bool {
        self.arcana.as_deref().is_some_and(|a| a.contains(needle))
    }

    /// The type spelling quoted inside the arcana dump, if any.
    ///
    /// Arcana lines look like `DeclRefExpr 0x... 'const int &' lvalue Var
    /// 0x... 'x'`; the first quoted segment is the expression or declared
    /// type.
    pub fn type_string(&self) -> Option<&str> {
        let arcana = self.arcana.as_deref()?;
        let start = arcana.find('\'')? + 1;
        let end = arcana[start..].find('\'')? + start;
        Some(&arcana[start..end])
    }

    /// Compiler-synthesized node (implicit constructor, destructor,
    /// operator). Such nodes are textually colocated with their class and
    /// must not be pruned by range-ordered traversal.
    pub fn is_implicit(&self) -> bool {
        self.detail_is("implicit") || self.arcana_contains("implicit")
    }

    pub fn is_function_kind(&self) -> bool {
        matches!(
            self.kind.as_str(),
            "Function" | "CXXMethod" | "CXXConstructor" | "CXXDestructor" | "CXXConversion" | "FunctionTemplate"
        )
    }

    pub fn is_constructor_or_destructor(&self) -> bool {
        matches!(self.kind.as_str(), "CXXConstructor" | "CXXDestructor")
    }

    pub fn is_template_kind(&self) -> bool {
        matches!(
            self.kind.as_str(),
            "FunctionTemplate"
                | "ClassTemplate"
                | "ClassTemplateSpecialization"
                | "ClassTemplatePartialSpecialization"
                | "VarTemplate"
                | "TypeAliasTemplate"
        )
    }

    /// Declarations that introduce a type rather than a value or function.
    pub fn is_type_declaration_kind(&self) -> bool {
        matches!(
            self.kind.as_str(),
            "CXXRecord"
                | "Record"
                | "Enum"
                | "ClassTemplate"
                | "ClassTemplateSpecialization"
                | "ClassTemplatePartialSpecialization"
                | "TypeAlias"
                | "Typedef"
                | "TypeAliasTemplate"
        )
    }

    pub fn is_translation_unit(&self) -> bool {
        self.kind == "TranslationUnit"
    }

    /// A reference expression that denotes a function entity rather than a
    /// plain value, judged from the referenced-declaration kind quoted in
    /// the arcana dump.
    pub fn denotes_function(&self) -> bool {
        self.arcana_contains("Function") || self.arcana_contains("CXXMethod")
    }

    /// The declared name begins with `operator` followed by a non-identifier
    /// character, i.e. an overloaded-operator declaration rather than a
    /// function that merely starts with those letters.
    pub fn declares_operator(&self) -> bool {
        let Some(name) = self.detail.as_deref() else {
            return false;
        };
        let Some(rest) = name.strip_prefix("operator") else {
            return false;
        };
        match rest.chars().next() {
            Some(c) => !(c.is_alphanumeric() || c == '_'),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/ast/node_tests.rs"]
mod tests;
