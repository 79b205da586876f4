use super::*;

fn node(
    role: &str,
    kind: &str,
) -> AstNode {
    AstNode {
        role: role.to_string(),
        kind: kind.to_string(),
        detail: None,
        arcana: None,
        range: None,
        children: None,
    }
}

#[test]
fn absent_and_empty_children_both_iterate_empty() {
    let mut n = node("expression", "Call");
    assert!(n.children().is_empty());
    n.children = Some(Vec::new());
    assert!(n.children().is_empty());
}

#[test]
fn validity_requires_role_and_kind() {
    assert!(node("expression", "Call").is_valid());
    assert!(!node("", "Call").is_valid());
    assert!(!node("expression", "").is_valid());
}

#[test]
fn type_string_is_first_quoted_arcana_segment() {
    let mut n = node("expression", "DeclRef");
    n.arcana = Some("DeclRefExpr 0x7f 'const int &' lvalue Var 0x7e 'x'".to_string());
    assert_eq!(n.type_string(), Some("const int &"));

    n.arcana = Some("no quotes here".to_string());
    assert_eq!(n.type_string(), None);

    n.arcana = None;
    assert_eq!(n.type_string(), None);
}

#[test]
fn implicit_detection_from_detail_or_arcana() {
    let mut n = node("declaration", "CXXConstructor");
    assert!(!n.is_implicit());
    n.detail = Some("implicit".to_string());
    assert!(n.is_implicit());

    let mut n = node("declaration", "CXXDestructor");
    n.arcana = Some("CXXDestructorDecl 0x1 implicit ~Foo 'void ()'".to_string());
    assert!(n.is_implicit());
}

#[test]
fn operator_declaration_requires_non_identifier_suffix() {
    let mut n = node("declaration", "Function");
    n.detail = Some("operator==".to_string());
    assert!(n.declares_operator());

    n.detail = Some("operator+".to_string());
    assert!(n.declares_operator());

    // An ordinary function that merely starts with the letters.
    n.detail = Some("operatorState".to_string());
    assert!(!n.declares_operator());

    n.detail = Some("operator".to_string());
    assert!(!n.declares_operator());

    n.detail = Some("open".to_string());
    assert!(!n.declares_operator());
}

#[test]
fn kind_predicates() {
    assert!(node("declaration", "CXXMethod").is_function_kind());
    assert!(node("declaration", "FunctionTemplate").is_function_kind());
    assert!(!node("declaration", "Var").is_function_kind());

    assert!(node("declaration", "CXXConstructor").is_constructor_or_destructor());
    assert!(!node("declaration", "CXXMethod").is_constructor_or_destructor());

    assert!(node("declaration", "ClassTemplate").is_template_kind());
    assert!(node("declaration", "CXXRecord").is_type_declaration_kind());
    assert!(!node("declaration", "Function").is_type_declaration_kind());

    assert!(node("declaration", "TranslationUnit").is_translation_unit());
}

#[test]
fn denotes_function_from_referenced_decl_kind() {
    let mut n = node("expression", "DeclRef");
    n.arcana = Some("DeclRefExpr 0x1 'void ()' lvalue Function 0x2 'foo'".to_string());
    assert!(n.denotes_function());

    n.arcana = Some("DeclRefExpr 0x1 'int' lvalue Var 0x2 'x'".to_string());
    assert!(!n.denotes_function());
}
