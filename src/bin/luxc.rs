//! Lux AOT front end.
//!
//! Usage:
//!   luxc                # read standard input
//!   luxc program.lux    # read a file instead
//!
//! The whole input is lowered into a single module whose IR is printed to
//! stderr on exit. Optimization defaults to on; pass --no-opt to disable.

use std::io::IsTerminal;

use inkwell::context::Context;

use lux::cli;
use lux::compiler::AotBackend;
use lux::driver::Driver;
use lux::errors::{self, Phase};
use lux::lexer::Lexer;
use lux::parser::Parser;
use lux::source::CharSource;

const USAGE: &str = "Usage: luxc [source.lux] [--opt|--no-opt]";

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
    let backend = AotBackend::new(&context, options.optimize.unwrap_or(true));
    let parser = Parser::new(Lexer::new(source));

    Driver::new(parser, backend, interactive).run();
}
