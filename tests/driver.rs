//! REPL dispatch and error recovery, with a recording backend.

use lux::ast::{Function, Prototype};
use lux::compiler::CodegenBackend;
use lux::driver::Driver;
use lux::errors::Result;
use lux::lexer::Lexer;
use lux::parser::Parser;
use lux::source::CharSource;

#[derive(Default)]
struct RecordingBackend {
    defined: Vec<String>,
    externs: Vec<String>,
    evaluated: usize,
    finished: bool,
}

impl CodegenBackend for &mut RecordingBackend {
    fn define(&mut self, fun: Function) -> Result<()> {
        self.defined.push(fun.prototype.name.clone());
        Ok(())
    }

    fn declare_extern(&mut self, proto: Prototype) -> Result<()> {
        self.externs.push(proto.name);
        Ok(())
    }

    fn eval_top_level(&mut self, _fun: Function) -> Result<Option<f64>> {
        self.evaluated += 1;
        Ok(None)
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

fn run(source: &str) -> RecordingBackend {
    let mut backend = RecordingBackend::default();
    let parser = Parser::new(Lexer::new(CharSource::from(source)));
    Driver::new(parser, &mut backend, false).run();
    backend
}

#[test]
fn constructs_are_dispatched_to_the_backend() {
    let backend = run("def f(x) x; extern g(y); 1 + 2; ;;; 3;");
    assert_eq!(backend.defined, vec!["f".to_string()]);
    assert_eq!(backend.externs, vec!["g".to_string()]);
    assert_eq!(backend.evaluated, 2);
    assert!(backend.finished);
}

#[test]
fn empty_input_still_finishes() {
    let backend = run("");
    assert!(backend.finished);
    assert_eq!(backend.evaluated, 0);
}

#[test]
fn a_broken_definition_skips_one_token_and_resumes() {
    // `def 1;` fails in the prototype; the driver consumes the offending
    // token and picks up at the next construct
    let backend = run("def 1; def ok(x) x;");
    assert_eq!(backend.defined, vec!["ok".to_string()]);
}

#[test]
fn a_broken_expression_does_not_stop_the_loop() {
    // the unclosed paren fails to parse; the later expression still runs
    let backend = run("(1; 7;");
    assert_eq!(backend.evaluated, 1);
}

#[test]
fn semicolons_alone_are_ignored() {
    let backend = run(";;;;");
    assert_eq!(backend.evaluated, 0);
    assert!(backend.defined.is_empty());
}
