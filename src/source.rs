//! Character input for the lexer.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

/// A stream of input characters ending at EOF.
///
/// The lexer is the sole consumer; it pulls one character at a time so a
/// terminal session stays interactive at top-level granularity.
pub struct CharSource {
    input: Box<dyn BufRead>,
}

impl CharSource {
    /// Read from standard input.
    pub fn stdin() -> Self {
        Self { input: Box::new(io::stdin().lock()) }
    }

    /// Read from a file.
    pub fn file(path: &Path) -> io::Result<Self> {
        Ok(Self { input: Box::new(BufReader::new(File::open(path)?)) })
    }

    /// Read the next character, or `None` at end of input.
    pub fn next_char(&mut self) -> Option<char> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => return Some(byte[0] as char),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // a read failure ends the stream
                Err(_) => return None,
            }
        }
    }
}

impl From<&str> for CharSource {
    fn from(text: &str) -> Self {
        Self { input: Box::new(Cursor::new(text.as_bytes().to_vec())) }
    }
}
