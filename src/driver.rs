//! Top-level REPL driver.
//!
//! One iteration per top-level construct: definitions and externs are handed
//! to the backend, anything else is evaluated as an anonymous expression.
//! Parse failures consume a single token for error recovery.

use crate::compiler::CodegenBackend;
use crate::errors;
use crate::lexer::Token;
use crate::parser::Parser;

pub struct Driver<B> {
    parser: Parser,
    backend: B,
    interactive: bool,
}

impl<B: CodegenBackend> Driver<B> {
    pub fn new(parser: Parser, backend: B, interactive: bool) -> Self {
        Self { parser, backend, interactive }
    }

    fn prompt(&self) {
        if self.interactive {
            eprint!("ready> ");
        }
    }

    /// top ::= definition | external | expression | ';'
    pub fn run(&mut self) {
        // prime the first token; on a terminal the prompt comes first
        self.prompt();
        self.parser.next_token();

        loop {
            self.prompt();
            match self.parser.cur_tok() {
                Token::Eof => break,
                Token::Char(';') => {
                    self.parser.next_token();
                }
                Token::Def => self.handle_definition(),
                Token::Extern => self.handle_extern(),
                _ => self.handle_top_level_expression(),
            }
        }

        self.backend.finish();
    }

    fn handle_definition(&mut self) {
        match self.parser.parse_definition() {
            Ok(fun) => {
                if let Err(e) = self.backend.define(fun) {
                    errors::report(&e);
                }
            }
            Err(e) => {
                errors::report(&e);
                self.parser.next_token(); // skip token for error recovery
            }
        }
    }

    fn handle_extern(&mut self) {
        match self.parser.parse_extern() {
            Ok(proto) => {
                if let Err(e) = self.backend.declare_extern(proto) {
                    errors::report(&e);
                }
            }
            Err(e) => {
                errors::report(&e);
                self.parser.next_token(); // skip token for error recovery
            }
        }
    }

    fn handle_top_level_expression(&mut self) {
        match self.parser.parse_top_level_expr() {
            Ok(fun) => match self.backend.eval_top_level(fun) {
                Ok(Some(value)) => eprintln!("Evaluated to {value:.6}"),
                Ok(None) => {}
                Err(e) => errors::report(&e),
            },
            Err(e) => {
                errors::report(&e);
                self.parser.next_token(); // skip token for error recovery
            }
        }
    }
}
