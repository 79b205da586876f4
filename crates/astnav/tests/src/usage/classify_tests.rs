use std::collections::HashSet;

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

fn lvalue_ref(
    kind: &str,
    type_spelling: &str,
) -> AstNode {
    let mut n = node("expression", kind);
    n.arcana = Some(format!("{kind}Expr 0x1 '{type_spelling}' lvalue Var 0x2"));
    n
}

fn no_filter() -> HashSet<&'static str> {
    HashSet::new()
}

#[test]
fn empty_path_classifies_empty() {
    assert_eq!(classify_usage(&[], "x", &no_filter()), UsageTags::empty());
}

#[test]
fn assignment_lhs_is_write() {
    // s.member = 5;
    let member = lvalue_ref("Member", "int");
    let literal = node("expression", "IntegerLiteral");
    let mut assign = node("expression", "BinaryOperator");
    assign.detail = Some("=".to_string());
    assign.children = Some(vec![member, literal]);

    let path = vec![&assign, &assign.children()[0]];
    assert_eq!(classify_usage(&path, "member", &no_filter()), UsageTags::WRITE);
}

#[test]
fn assignment_rhs_through_value_cast_is_read() {
    // x = s.member;
    let member = lvalue_ref("Member", "int");
    let mut cast = node("expression", "ImplicitCast");
    cast.detail = Some("LValueToRValue".to_string());
    cast.arcana = Some("ImplicitCastExpr 0x1 'int'".to_string());
    cast.children = Some(vec![member]);
    let lhs = lvalue_ref("DeclRef", "int");
    let mut assign = node("expression", "BinaryOperator");
    assign.detail = Some("=".to_string());
    assign.children = Some(vec![lhs, cast]);

    let cast_ref = &assign.children()[1];
    let path = vec![&assign, cast_ref, &cast_ref.children()[0]];
    assert_eq!(classify_usage(&path, "member", &no_filter()), UsageTags::READ);
}

#[test]
fn address_of_argument_is_writable_ref() {
    // foo(&s.member);
    let member = lvalue_ref("Member", "int");
    let mut addr_of = node("expression", "UnaryOperator");
    addr_of.detail = Some("&".to_string());
    addr_of.children = Some(vec![member]);
    let mut call = node("expression", "Call");
    call.children = Some(vec![addr_of]);

    let addr_ref = &call.children()[0];
    let path = vec![&call, addr_ref, &addr_ref.children()[0]];
    assert_eq!(classify_usage(&path, "member", &no_filter()), UsageTags::WRITABLE_REF);
}

#[test]
fn plain_value_argument_is_read() {
    let mut call = node("expression", "Call");
    call.children = Some(vec![node("expression", "IntegerLiteral")]);
    let path = vec![&call, &call.children()[0]];
    assert_eq!(classify_usage(&path, "x", &no_filter()), UsageTags::READ);
}

#[test]
fn function_name_used_as_callee_is_empty() {
    let mut callee = node("expression", "DeclRef");
    callee.arcana = Some("DeclRefExpr 0x1 'void ()' lvalue Function 0x2 'foo'".to_string());
    let mut call = node("expression", "Call");
    call.children = Some(vec![callee]);

    let path = vec![&call, &call.children()[0]];
    assert_eq!(classify_usage(&path, "foo", &no_filter()), UsageTags::empty());
}

#[test]
fn member_call_target_is_empty() {
    let bound = node("expression", "Member");
    let arg = lvalue_ref("DeclRef", "int");
    let mut call = node("expression", "CXXMemberCall");
    call.children = Some(vec![bound, arg]);

    let target_path = vec![&call, &call.children()[0]];
    assert_eq!(classify_usage(&target_path, "method", &no_filter()), UsageTags::empty());

    let arg_path = vec![&call, &call.children()[1]];
    assert_eq!(classify_usage(&arg_path, "x", &no_filter()), UsageTags::WRITABLE_REF);
}

#[test]
fn delete_is_write_and_new_is_empty() {
    let del = node("expression", "CXXDelete");
    let inner = lvalue_ref("DeclRef", "Foo *");
    let path = vec![&del, &inner];
    assert_eq!(classify_usage(&path, "p", &no_filter()), UsageTags::WRITE);

    let new_expr = node("expression", "CXXNew");
    let type_ref = node("type", "RecordType");
    let path = vec![&new_expr, &type_ref];
    assert_eq!(classify_usage(&path, "Foo", &no_filter()), UsageTags::empty());
}

#[test]
fn condition_context_is_read() {
    let cond = lvalue_ref("DeclRef", "bool");
    let if_stmt = node("statement", "If");
    let path = vec![&if_stmt, &cond];
    assert_eq!(classify_usage(&path, "flag", &no_filter()), UsageTags::READ);

    let switch_stmt = node("statement", "Switch");
    let path = vec![&switch_stmt, &cond];
    assert_eq!(classify_usage(&path, "flag", &no_filter()), UsageTags::READ);
}

#[test]
fn increment_and_decrement_are_writes() {
    let operand = lvalue_ref("DeclRef", "int");
    let mut inc = node("expression", "UnaryOperator");
    inc.detail = Some("++".to_string());
    inc.children = Some(vec![operand]);

    let path = vec![&inc, &inc.children()[0]];
    assert_eq!(classify_usage(&path, "i", &no_filter()), UsageTags::WRITE);
}

#[test]
fn operator_call_shifts_lhs_index() {
    // a = b; with user-defined operator=.
    let mut callee = node("expression", "DeclRef");
    callee.arcana = Some("DeclRefExpr 0x1 'Foo &(const Foo &)' lvalue CXXMethod 0x2".to_string());
    let lhs = lvalue_ref("DeclRef", "Foo");
    let rhs = node("expression", "IntegerLiteral");
    let mut op_call = node("expression", "CXXOperatorCall");
    op_call.detail = Some("=".to_string());
    op_call.children = Some(vec![callee, lhs, rhs]);

    let lhs_path = vec![&op_call, &op_call.children()[1]];
    assert_eq!(classify_usage(&lhs_path, "a", &no_filter()), UsageTags::WRITE);

    let rhs_path = vec![&op_call, &op_call.children()[2]];
    assert_eq!(classify_usage(&rhs_path, "b", &no_filter()), UsageTags::READ);
}

#[test]
fn comparison_operator_is_read() {
    let lhs = lvalue_ref("DeclRef", "int");
    let rhs = node("expression", "IntegerLiteral");
    let mut cmp = node("expression", "BinaryOperator");
    cmp.detail = Some("==".to_string());
    cmp.children = Some(vec![lhs, rhs]);

    let path = vec![&cmp, &cmp.children()[0]];
    assert_eq!(classify_usage(&path, "x", &no_filter()), UsageTags::READ);
}

#[test]
fn disguised_constructor_call_matches_by_name() {
    let mut callee = node("expression", "DeclRef");
    callee.detail = Some("Foo".to_string());
    callee.arcana = Some("DeclRefExpr 0x1 'void (int)' CXXConstructor 0x2 'Foo'".to_string());
    let arg = node("expression", "IntegerLiteral");
    let mut op_call = node("expression", "CXXOperatorCall");
    op_call.children = Some(vec![callee, arg]);

    let path = vec![&op_call, &op_call.children()[1]];
    assert_eq!(classify_usage(&path, "Foo", &no_filter()), UsageTags::CTOR_DTOR);
    assert_eq!(classify_usage(&path, "Bar", &no_filter()), UsageTags::empty());
}

#[test]
fn constructor_invocation_classifies_by_constructed_type() {
    let mut construct = node("expression", "CXXConstruct");
    construct.detail = Some("Foo".to_string());
    let arg = node("expression", "IntegerLiteral");
    let path = vec![&construct, &arg];
    assert_eq!(classify_usage(&path, "Foo", &no_filter()), UsageTags::CTOR_DTOR);
    assert_eq!(classify_usage(&path, "Bar", &no_filter()), UsageTags::empty());
}

#[test]
fn member_initializer_position_decides_write_or_read() {
    let init = node("declaration", "CXXCtorInitializer");
    let value = lvalue_ref("DeclRef", "int");

    let member_path = vec![&init];
    assert_eq!(classify_usage(&member_path, "m", &no_filter()), UsageTags::WRITE);

    let value_path = vec![&init, &value];
    assert_eq!(classify_usage(&value_path, "x", &no_filter()), UsageTags::READ);
}

#[test]
fn method_declaration_composes_tags() {
    let mut override_attr = node("attribute", "Override");
    override_attr.range = None;
    let mut method = node("declaration", "CXXMethod");
    method.detail = Some("run".to_string());
    method.arcana = Some("CXXMethodDecl 0x1 used run 'void ()'".to_string());
    method.children = Some(vec![override_attr]);
    let class_template = node("declaration", "ClassTemplate");

    let path = vec![&class_template, &method];
    let tags = classify_usage(&path, "run", &no_filter());
    assert_eq!(
        tags,
        UsageTags::DECLARATION | UsageTags::USED | UsageTags::OVERRIDE | UsageTags::TEMPLATE
    );
}

#[test]
fn constructor_declaration_gets_ctor_dtor_tag() {
    let mut ctor = node("declaration", "CXXConstructor");
    ctor.detail = Some("Foo".to_string());
    ctor.arcana = Some("CXXConstructorDecl 0x1 Foo 'void ()'".to_string());
    let path = vec![&ctor];
    assert_eq!(
        classify_usage(&path, "Foo", &no_filter()),
        UsageTags::DECLARATION | UsageTags::CTOR_DTOR
    );
}

#[test]
fn annotated_declaration_gets_annotation_tag() {
    let annotate = node("attribute", "Annotate");
    let mut var = node("declaration", "Var");
    var.detail = Some("handler".to_string());
    var.arcana = Some("VarDecl 0x1 handler 'Callback'".to_string());
    var.children = Some(vec![annotate]);
    let path = vec![&var];
    assert_eq!(
        classify_usage(&path, "handler", &no_filter()),
        UsageTags::DECLARATION | UsageTags::ANNOTATION_MARKED
    );
}

#[test]
fn operator_declaration_gets_operator_tag() {
    let mut op = node("declaration", "Function");
    op.detail = Some("operator==".to_string());
    op.arcana = Some("FunctionDecl 0x1 operator== 'bool (const Foo &)'".to_string());
    let path = vec![&op];
    assert_eq!(
        classify_usage(&path, "operator==", &no_filter()),
        UsageTags::DECLARATION | UsageTags::OPERATOR
    );
}

#[test]
fn expected_kind_filter_rejects_other_declarations() {
    let mut method = node("declaration", "CXXMethod");
    method.detail = Some("run".to_string());
    let path = vec![&method];

    let filter: HashSet<&str> = HashSet::from(["Function"]);
    assert_eq!(classify_usage(&path, "run", &filter), UsageTags::empty());

    let filter: HashSet<&str> = HashSet::from(["CXXMethod"]);
    assert_eq!(classify_usage(&path, "run", &filter), UsageTags::DECLARATION);
}

#[test]
fn type_declaration_is_not_a_value_usage() {
    let mut record = node("declaration", "CXXRecord");
    record.detail = Some("Foo".to_string());
    let path = vec![&record];
    assert_eq!(classify_usage(&path, "Foo", &no_filter()), UsageTags::empty());
}

#[test]
fn initializer_on_declared_entity_is_write() {
    let declared = node("expression", "DeclRef");
    let init_expr = node("expression", "IntegerLiteral");
    let mut var = node("declaration", "Var");
    var.arcana = Some("VarDecl 0x1 x 'int' cinit".to_string());
    var.children = Some(vec![declared, init_expr]);

    let path = vec![&var, &var.children()[0]];
    assert_eq!(classify_usage(&path, "x", &no_filter()), UsageTags::WRITE);
}

#[test]
fn reference_initializer_classifies_by_const_qualification() {
    let declared = node("expression", "DeclRef");
    let init_expr = node("expression", "DeclRef");

    let mut mutable_ref = node("declaration", "Var");
    mutable_ref.arcana = Some("VarDecl 0x1 r 'int &' cinit".to_string());
    mutable_ref.children = Some(vec![declared.clone(), init_expr.clone()]);
    let path = vec![&mutable_ref, &mutable_ref.children()[1]];
    assert_eq!(classify_usage(&path, "x", &no_filter()), UsageTags::WRITABLE_REF);

    let mut const_ref = node("declaration", "Var");
    const_ref.arcana = Some("VarDecl 0x1 r 'const int &' cinit".to_string());
    const_ref.children = Some(vec![declared, init_expr]);
    let path = vec![&const_ref, &const_ref.children()[1]];
    assert_eq!(classify_usage(&path, "x", &no_filter()), UsageTags::READ);
}

#[test]
fn bare_top_level_reference_is_used() {
    let tu = node("declaration", "TranslationUnit");
    let reference = node("expression", "DeclRef");
    let path = vec![&tu, &reference];
    assert_eq!(classify_usage(&path, "x", &no_filter()), UsageTags::USED);
}

#[test]
fn rvalue_reference_cast_argument_is_read() {
    // std::move-style forwarding: the callee receives an rvalue, not a
    // writable alias.
    let operand = lvalue_ref("DeclRef", "int");
    let mut cast = node("expression", "ImplicitCast");
    cast.arcana = Some("ImplicitCastExpr 0x1 'int &&'".to_string());
    cast.children = Some(vec![operand]);
    let mut call = node("expression", "Call");
    call.children = Some(vec![cast]);

    let cast_ref = &call.children()[0];
    let path = vec![&call, cast_ref, &cast_ref.children()[0]];
    assert_eq!(classify_usage(&path, "x", &no_filter()), UsageTags::READ);
}

#[test]
fn function_to_pointer_decay_is_empty() {
    let mut decay = node("expression", "ImplicitCast");
    decay.detail = Some("FunctionToPointerDecay".to_string());
    let reference = node("expression", "DeclRef");
    let path = vec![&decay, &reference];
    assert_eq!(classify_usage(&path, "foo", &no_filter()), UsageTags::empty());
}
