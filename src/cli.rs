//! Command-line handling shared by the two executables.

use std::path::PathBuf;

use crate::errors::{self, Phase};

pub struct Options {
    /// Input file; standard input when absent.
    pub input: Option<PathBuf>,
    /// Optimization override; each executable picks its own default.
    pub optimize: Option<bool>,
}

/// Scan `args` (including argv[0]). At most one positional argument names
/// the input file; a second one is a usage error.
pub fn parse_args(args: impl IntoIterator<Item = String>, usage: &str) -> Options {
    let mut input = None;
    let mut optimize = None;

    for arg in args.into_iter().skip(1) {
        match arg.as_str() {
            "--opt" => optimize = Some(true),
            "--no-opt" => optimize = Some(false),
            _ if arg.starts_with('-') => errors::fatal_with_hint(
                Phase::Driver,
                format!("unknown option '{arg}'"),
                Some(usage.to_string()),
            ),
            _ => {
                if input.is_some() {
                    errors::fatal_with_hint(
                        Phase::Driver,
                        "more than one input file given",
                        Some(usage.to_string()),
                    );
                }
                input = Some(PathBuf::from(arg));
            }
        }
    }

    Options { input, optimize }
}
