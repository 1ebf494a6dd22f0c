//! Recursive-descent parser with operator-precedence climbing.
//!
//! Grammar:
//! ```text
//! top        ::= ';' | definition | external | toplevelexpr
//! definition ::= 'def' prototype expression
//! external   ::= 'extern' prototype
//! prototype  ::= identifier '(' identifier* ')'
//!              | 'unary'  CHAR         '(' identifier ')'
//!              | 'binary' CHAR number? '(' identifier identifier ')'
//! expression ::= unary (binop unary)*
//! unary      ::= primary | CHAR unary
//! primary    ::= number | identifier | identifier '(' expression,* ')'
//!              | '(' expression ')' | ifexpr | forexpr
//! ifexpr     ::= 'if' expression 'then' expression ('else' expression)?
//! forexpr    ::= 'for' identifier '=' expression ',' expression
//!                (',' expression)? 'do' expression
//! ```
//!
//! For the parse functions that are not at the beginning of a construct the
//! convention is: the current token is the first token of what the function
//! parses, and on success the current token is the first token past it.

use crate::ast::{Expr, Function, Prototype, PrototypeKind};
use crate::errors::{LuxError, Result};
use crate::lexer::{Lexer, Token};

use super::OperatorTable;

/// Precedence used when a `binary` prototype omits the number.
const DEFAULT_BINARY_PRECEDENCE: i32 = 30;

pub struct Parser {
    lexer: Lexer,
    cur_tok: Token,
    ops: OperatorTable,
}

impl Parser {
    /// Create a parser over `lexer`. No input is read until the first
    /// [`Parser::next_token`] call, so an interactive driver can print its
    /// prompt first.
    pub fn new(lexer: Lexer) -> Self {
        Self { lexer, cur_tok: Token::Eof, ops: OperatorTable::default() }
    }

    // ── token plumbing ──────────────────────────────────────────────

    pub fn cur_tok(&self) -> &Token {
        &self.cur_tok
    }

    /// Advance to the next token and return it.
    pub fn next_token(&mut self) -> &Token {
        self.cur_tok = self.lexer.get_tok();
        &self.cur_tok
    }

    /// The registered operator table.
    pub fn operators(&self) -> &OperatorTable {
        &self.ops
    }

    /// Precedence of the current token, `-1` if it is not a binary operator.
    fn tok_precedence(&self) -> i32 {
        match self.cur_tok {
            Token::Char(op) => self.ops.precedence(op),
            _ => -1,
        }
    }

    // ── primary expressions ─────────────────────────────────────────

    /// primary ::= identifierexpr | numberexpr | parenexpr | ifexpr | forexpr
    fn parse_primary(&mut self) -> Result<Expr> {
        match self.cur_tok.clone() {
            Token::Number(value) => {
                self.next_token();
                Ok(Expr::Number(value))
            }
            Token::Identifier(name) => self.parse_identifier_expr(name),
            Token::Char('(') => self.parse_paren_expr(),
            Token::If => self.parse_if_expr(),
            Token::For => self.parse_for_expr(),
            _ => Err(LuxError::parse("unknown token when expecting an expression")),
        }
    }

    /// parenexpr ::= '(' expression ')'
    fn parse_paren_expr(&mut self) -> Result<Expr> {
        self.next_token(); // eat '('
        let expr = self.parse_expression()?;
        if self.cur_tok != Token::Char(')') {
            return Err(LuxError::parse("expected ')'"));
        }
        self.next_token(); // eat ')'
        Ok(expr)
    }

    /// identifierexpr ::= identifier | identifier '(' expression,* ')'
    fn parse_identifier_expr(&mut self, name: String) -> Result<Expr> {
        self.next_token(); // eat the identifier

        if self.cur_tok != Token::Char('(') {
            return Ok(Expr::Variable(name));
        }

        self.next_token(); // eat '('
        let mut args = Vec::new();
        if self.cur_tok != Token::Char(')') {
            loop {
                args.push(self.parse_expression()?);
                if self.cur_tok == Token::Char(')') {
                    break;
                }
                if self.cur_tok != Token::Char(',') {
                    return Err(LuxError::parse("expected ')' or ',' in argument list"));
                }
                self.next_token(); // eat ','
            }
        }
        self.next_token(); // eat ')'

        Ok(Expr::Call { callee: name, args })
    }

    /// ifexpr ::= 'if' expression 'then' expression ('else' expression)?
    fn parse_if_expr(&mut self) -> Result<Expr> {
        self.next_token(); // eat 'if'
        let cond = self.parse_expression()?;

        if self.cur_tok != Token::Then {
            return Err(LuxError::parse("expected 'then'"));
        }
        self.next_token(); // eat 'then'
        let then = self.parse_expression()?;

        let otherwise = if self.cur_tok == Token::Else {
            self.next_token(); // eat 'else'
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        Ok(Expr::If { cond: Box::new(cond), then: Box::new(then), otherwise })
    }

    /// forexpr ::= 'for' identifier '=' expr ',' expr (',' expr)? 'do' expr
    fn parse_for_expr(&mut self) -> Result<Expr> {
        self.next_token(); // eat 'for'

        let var = match &self.cur_tok {
            Token::Identifier(name) => name.clone(),
            _ => return Err(LuxError::parse("expected identifier after 'for'")),
        };
        self.next_token();

        if self.cur_tok != Token::Char('=') {
            return Err(LuxError::parse("expected '=' after 'for' variable"));
        }
        self.next_token();
        let start = self.parse_expression()?;

        if self.cur_tok != Token::Char(',') {
            return Err(LuxError::parse("expected ',' after 'for' start value"));
        }
        self.next_token();
        let end = self.parse_expression()?;

        let step = if self.cur_tok == Token::Char(',') {
            self.next_token();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        if self.cur_tok != Token::Do {
            return Err(LuxError::parse("expected 'do' after 'for' header"));
        }
        self.next_token();
        let body = self.parse_expression()?;

        Ok(Expr::For {
            var,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
        })
    }

    // ── unary and binary expressions ────────────────────────────────

    /// unary ::= primary | CHAR unary
    ///
    /// Any `Char` token other than `(` or `,` in expression position is
    /// taken as a unary operator application.
    fn parse_unary(&mut self) -> Result<Expr> {
        match self.cur_tok {
            Token::Char(op) if op != '(' && op != ',' => {
                self.next_token();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary { op, operand: Box::new(operand) })
            }
            _ => self.parse_primary(),
        }
    }

    /// binoprhs ::= (binop unary)*
    ///
    /// `min_precedence` is the minimal operator precedence this call is
    /// allowed to consume. When the operator after `rhs` binds tighter than
    /// the current one, the climb recurses so the pending operator takes
    /// `rhs` as its own left-hand side.
    fn parse_bin_op_rhs(&mut self, min_precedence: i32, mut lhs: Expr) -> Result<Expr> {
        loop {
            let tok_prec = self.tok_precedence();
            if tok_prec < min_precedence {
                return Ok(lhs);
            }

            let op = match self.cur_tok {
                Token::Char(op) => op,
                _ => return Ok(lhs),
            };
            self.next_token(); // eat the operator

            let mut rhs = self.parse_unary()?;
            let next_prec = self.tok_precedence();
            if tok_prec < next_prec {
                rhs = self.parse_bin_op_rhs(tok_prec + 1, rhs)?;
            }

            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    /// expression ::= unary binoprhs
    pub fn parse_expression(&mut self) -> Result<Expr> {
        let lhs = self.parse_unary()?;
        self.parse_bin_op_rhs(0, lhs)
    }

    // ── prototypes and top-level constructs ─────────────────────────

    /// prototype ::= id '(' id* ')'
    ///             | 'unary' CHAR '(' id ')'
    ///             | 'binary' CHAR number? '(' id id ')'
    fn parse_prototype(&mut self) -> Result<Prototype> {
        let (name, kind) = match self.cur_tok.clone() {
            Token::Identifier(name) => {
                self.next_token();
                (name, PrototypeKind::Plain)
            }
            Token::Unary => {
                self.next_token();
                let op = self.expect_operator_char("expected unary operator after 'unary'")?;
                (format!("unary{op}"), PrototypeKind::Unary)
            }
            Token::Binary => {
                self.next_token();
                let op = self.expect_operator_char("expected binary operator after 'binary'")?;
                let precedence = match self.cur_tok {
                    Token::Number(value) => {
                        let precedence = value as i32;
                        if !(1..=100).contains(&precedence) {
                            return Err(LuxError::parse("invalid precedence: must be 1..100"));
                        }
                        self.next_token();
                        precedence
                    }
                    _ => DEFAULT_BINARY_PRECEDENCE,
                };
                (format!("binary{op}"), PrototypeKind::Binary { precedence })
            }
            _ => return Err(LuxError::parse("expected function name in prototype")),
        };

        if self.cur_tok != Token::Char('(') {
            return Err(LuxError::parse("expected '(' in prototype"));
        }
        let mut params = Vec::new();
        while let Token::Identifier(param) = self.next_token() {
            params.push(param.clone());
        }
        if self.cur_tok != Token::Char(')') {
            return Err(LuxError::parse("expected ')' in prototype"));
        }
        self.next_token(); // eat ')'

        let operands = match kind {
            PrototypeKind::Plain => None,
            PrototypeKind::Unary => Some(1),
            PrototypeKind::Binary { .. } => Some(2),
        };
        if operands.is_some_and(|n| n != params.len()) {
            return Err(LuxError::parse("invalid number of operands for operator"));
        }

        Ok(Prototype { name, params, kind })
    }

    fn expect_operator_char(&mut self, message: &str) -> Result<char> {
        match self.cur_tok {
            Token::Char(op) => {
                self.next_token();
                Ok(op)
            }
            _ => Err(LuxError::parse(message)),
        }
    }

    /// definition ::= 'def' prototype expression
    ///
    /// A `binary` prototype installs its operator before the body is parsed
    /// so uses inside the body already resolve to the new precedence.
    pub fn parse_definition(&mut self) -> Result<Function> {
        self.next_token(); // eat 'def'
        let prototype = self.parse_prototype()?;

        if let PrototypeKind::Binary { precedence } = prototype.kind {
            if let Some(op) = prototype.operator_char() {
                self.ops.install(op, precedence);
            }
        }

        let body = self.parse_expression()?;
        Ok(Function { prototype, body })
    }

    /// external ::= 'extern' prototype
    pub fn parse_extern(&mut self) -> Result<Prototype> {
        self.next_token(); // eat 'extern'
        self.parse_prototype()
    }

    /// toplevelexpr ::= expression, wrapped in an anonymous zero-argument
    /// prototype so it can be lowered like any other function.
    pub fn parse_top_level_expr(&mut self) -> Result<Function> {
        let body = self.parse_expression()?;
        Ok(Function { prototype: Prototype::anonymous(), body })
    }
}
