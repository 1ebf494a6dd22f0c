//! Lux JIT REPL.
//!
//! Usage:
//!   luxi                # read standard input, prompt when interactive
//!   luxi program.lux    # read a file instead
//!
//! Each top-level expression is compiled, executed and reported as
//! `Evaluated to %f` on stderr.

use std::io::IsTerminal;

use inkwell::context::Context;

use lux::cli;
use lux::compiler::JitBackend;
use lux::driver::Driver;
use lux::errors::{self, Phase};
use lux::lexer::Lexer;
use lux::parser::Parser;
use lux::source::CharSource;

const USAGE: &str = "Usage: luxi [source.lux] [--opt|--no-opt]";

fn main() {
    let options = cli::parse_args(std::env::args(), USAGE);

    let (source, interactive) = match &options.input {
        Some(path) => {
            let source = CharSource::file(path).unwrap_or_else(|e| {
                errors::fatal(Phase::Driver, format!("could not read {}: {e}", path.display()))
            });
            (source, false)
        }
        None => (CharSource::stdin(), std::io::stdin().is_terminal()),
    };

    let context = Context::create();
    let backend = JitBackend::new(&context, options.optimize.unwrap_or(false));
    let parser = Parser::new(Lexer::new(source));

    Driver::new(parser, backend, interactive).run();
}
