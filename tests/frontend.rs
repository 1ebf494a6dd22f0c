//! Lexer and parser behavior over the public library surface.

use lux::ast::{Expr, PrototypeKind, ANONYMOUS_FUNCTION};
use lux::lexer::{Lexer, Token};
use lux::parser::Parser;
use lux::source::CharSource;

fn parser_for(source: &str) -> Parser {
    let mut parser = Parser::new(Lexer::new(CharSource::from(source)));
    parser.next_token();
    parser
}

fn expr(source: &str) -> Expr {
    parser_for(source).parse_expression().expect("expression should parse")
}

fn var(name: &str) -> Expr {
    Expr::Variable(name.to_string())
}

fn bin(op: char, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
}

// ── precedence laws ─────────────────────────────────────────────────

#[test]
fn tighter_right_operator_binds_first() {
    assert_eq!(expr("a + b * c"), bin('+', var("a"), bin('*', var("b"), var("c"))));
}

#[test]
fn looser_right_operator_groups_left() {
    assert_eq!(expr("a * b + c"), bin('+', bin('*', var("a"), var("b")), var("c")));
}

#[test]
fn equal_precedence_associates_left() {
    assert_eq!(expr("a - b + c"), bin('+', bin('-', var("a"), var("b")), var("c")));
}

#[test]
fn comparison_binds_loosest() {
    assert_eq!(expr("a + b < c"), bin('<', bin('+', var("a"), var("b")), var("c")));
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(expr("(a + b) * c"), bin('*', bin('+', var("a"), var("b")), var("c")));
}

// ── primaries, calls and unary operators ────────────────────────────

#[test]
fn identifier_without_parens_is_a_variable() {
    assert_eq!(expr("x"), var("x"));
}

#[test]
fn identifier_followed_by_parens_is_a_call_even_with_no_arguments() {
    assert_eq!(expr("f()"), Expr::Call { callee: "f".to_string(), args: vec![] });
}

#[test]
fn call_arguments_are_comma_separated_expressions() {
    assert_eq!(
        expr("f(1, x + 2)"),
        Expr::Call {
            callee: "f".to_string(),
            args: vec![Expr::Number(1.0), bin('+', var("x"), Expr::Number(2.0))],
        },
    );
}

#[test]
fn unary_operators_nest() {
    assert_eq!(
        expr("!!x"),
        Expr::Unary {
            op: '!',
            operand: Box::new(Expr::Unary { op: '!', operand: Box::new(var("x")) }),
        },
    );
}

#[test]
fn open_paren_is_not_a_unary_operator() {
    assert_eq!(expr("(x)"), var("x"));
}

#[test]
fn if_without_else_parses() {
    assert_eq!(
        expr("if x then 1"),
        Expr::If {
            cond: Box::new(var("x")),
            then: Box::new(Expr::Number(1.0)),
            otherwise: None,
        },
    );
}

#[test]
fn for_step_is_optional() {
    match expr("for i = 1, i < 10 do i") {
        Expr::For { var, step, .. } => {
            assert_eq!(var, "i");
            assert!(step.is_none());
        }
        other => panic!("expected a for expression, got {other:?}"),
    }
    match expr("for i = 1, i < 10, 2 do i") {
        Expr::For { step, .. } => assert_eq!(step, Some(Box::new(Expr::Number(2.0)))),
        other => panic!("expected a for expression, got {other:?}"),
    }
}

#[test]
fn missing_then_is_a_syntax_error() {
    assert!(parser_for("if x 1").parse_expression().is_err());
}

// ── prototypes and user-defined operators ───────────────────────────

#[test]
fn definition_parses_name_and_params() {
    let fun = parser_for("def f(x y) x + y").parse_definition().unwrap();
    assert_eq!(fun.prototype.name, "f");
    assert_eq!(fun.prototype.params, vec!["x".to_string(), "y".to_string()]);
    assert_eq!(fun.prototype.kind, PrototypeKind::Plain);
}

#[test]
fn binary_prototype_installs_its_operator_before_the_body() {
    let mut parser = parser_for("def binary @ 15 (a b) a @ b x @ y");
    let fun = parser.parse_definition().unwrap();
    assert_eq!(fun.prototype.name, "binary@");
    assert_eq!(fun.prototype.kind, PrototypeKind::Binary { precedence: 15 });
    // the body itself used '@', so installation happened before body parsing
    assert_eq!(fun.body, bin('@', var("a"), var("b")));
    assert_eq!(parser.operators().precedence('@'), 15);
    // and later expressions see it too
    assert_eq!(parser.parse_expression().unwrap(), bin('@', var("x"), var("y")));
}

#[test]
fn binary_precedence_defaults_to_30() {
    let fun = parser_for("def binary & (a b) a").parse_definition().unwrap();
    assert_eq!(fun.prototype.kind, PrototypeKind::Binary { precedence: 30 });
}

#[test]
fn binary_precedence_boundaries() {
    assert!(parser_for("def binary @ 1 (a b) a").parse_definition().is_ok());
    assert!(parser_for("def binary @ 100 (a b) a").parse_definition().is_ok());
    assert!(parser_for("def binary @ 0 (a b) a").parse_definition().is_err());
    assert!(parser_for("def binary @ 101 (a b) a").parse_definition().is_err());
}

#[test]
fn operator_prototypes_check_their_operand_count() {
    assert!(parser_for("def unary ! (a) a").parse_definition().is_ok());
    assert!(parser_for("def unary ! (a b) a").parse_definition().is_err());
    assert!(parser_for("def binary @ 5 (a) a").parse_definition().is_err());
}

#[test]
fn extern_parses_a_bare_prototype() {
    let proto = parser_for("extern printd(x)").parse_extern().unwrap();
    assert_eq!(proto.name, "printd");
    assert_eq!(proto.params, vec!["x".to_string()]);
}

#[test]
fn top_level_expression_gets_the_anonymous_wrapper() {
    let fun = parser_for("1 + 2").parse_top_level_expr().unwrap();
    assert_eq!(fun.prototype.name, ANONYMOUS_FUNCTION);
    assert!(fun.prototype.params.is_empty());
    assert!(fun.prototype.is_anonymous());
}

#[test]
fn missing_function_name_is_a_syntax_error() {
    assert!(parser_for("def 1(x) x").parse_definition().is_err());
}

// ── the cur_tok invariant ───────────────────────────────────────────

#[test]
fn successful_parses_leave_cur_tok_on_the_next_token() {
    let mut parser = parser_for("def f(x) x; 1 + 2; extern g(y)");

    parser.parse_definition().unwrap();
    assert_eq!(parser.cur_tok(), &Token::Char(';'));
    parser.next_token();

    parser.parse_top_level_expr().unwrap();
    assert_eq!(parser.cur_tok(), &Token::Char(';'));
    parser.next_token();

    parser.parse_extern().unwrap();
    assert_eq!(parser.cur_tok(), &Token::Eof);
}

#[test]
fn comments_do_not_change_the_token_stream() {
    assert_eq!(expr("1 + # comment\n 2 * 3"), expr("1 + \n 2 * 3"));
}
