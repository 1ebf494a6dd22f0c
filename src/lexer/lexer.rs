//! A streaming tokenizer with one character of lookahead.

use crate::source::CharSource;

use super::Token;

/// Tokenizer state.
///
/// Invariant: after any [`Lexer::get_tok`] call, `last_char` holds the first
/// character that was not consumed into the returned token.
pub struct Lexer {
    source: CharSource,
    last_char: Option<char>,
}

impl Lexer {
    pub fn new(source: CharSource) -> Self {
        // seeded with whitespace so the first get_tok reads immediately
        Self { source, last_char: Some(' ') }
    }

    fn bump(&mut self) {
        self.last_char = self.source.next_char();
    }

    /// Classify the next run of characters into a token.
    pub fn get_tok(&mut self) -> Token {
        loop {
            while matches!(self.last_char, Some(c) if c.is_ascii_whitespace()) {
                self.bump();
            }

            let c = match self.last_char {
                Some(c) => c,
                None => return Token::Eof,
            };

            // identifier: [A-Za-z][A-Za-z0-9]*
            if c.is_ascii_alphabetic() {
                let mut ident = String::new();
                while let Some(c) = self.last_char {
                    if !c.is_ascii_alphanumeric() {
                        break;
                    }
                    ident.push(c);
                    self.bump();
                }
                return match ident.as_str() {
                    "def" => Token::Def,
                    "extern" => Token::Extern,
                    "if" => Token::If,
                    "then" => Token::Then,
                    "else" => Token::Else,
                    "for" => Token::For,
                    "do" => Token::Do,
                    "binary" => Token::Binary,
                    "unary" => Token::Unary,
                    _ => Token::Identifier(ident),
                };
            }

            // number: [0-9.]+
            if c.is_ascii_digit() || c == '.' {
                let mut digits = String::new();
                while let Some(c) = self.last_char {
                    if !c.is_ascii_digit() && c != '.' {
                        break;
                    }
                    digits.push(c);
                    self.bump();
                }
                return Token::Number(parse_double(&digits));
            }

            // '#' starts a comment running to end of line
            if c == '#' {
                loop {
                    self.bump();
                    match self.last_char {
                        None | Some('\n') | Some('\r') => break,
                        _ => {}
                    }
                }
                if self.last_char.is_none() {
                    return Token::Eof;
                }
                continue;
            }

            self.bump();
            return Token::Char(c);
        }
    }
}

/// Lenient numeric parsing in the manner of `strtod`: the value is the
/// longest parseable prefix, so `1.2.3` yields `1.2` and `.` alone yields
/// `0.0`.
fn parse_double(text: &str) -> f64 {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    text[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(CharSource::from(input));
        let mut out = Vec::new();
        loop {
            let tok = lexer.get_tok();
            let done = tok == Token::Eof;
            out.push(tok);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            tokens("def extern if then else for do binary unary foo x1"),
            vec![
                Token::Def,
                Token::Extern,
                Token::If,
                Token::Then,
                Token::Else,
                Token::For,
                Token::Do,
                Token::Binary,
                Token::Unary,
                Token::Identifier("foo".into()),
                Token::Identifier("x1".into()),
                Token::Eof,
            ],
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(tokens("42"), vec![Token::Number(42.0), Token::Eof]);
        assert_eq!(tokens("1.5"), vec![Token::Number(1.5), Token::Eof]);
        assert_eq!(tokens(".5"), vec![Token::Number(0.5), Token::Eof]);
    }

    #[test]
    fn lenient_numbers_take_the_longest_valid_prefix() {
        assert_eq!(tokens("1.2.3"), vec![Token::Number(1.2), Token::Eof]);
        assert_eq!(tokens("."), vec![Token::Number(0.0), Token::Eof]);
    }

    #[test]
    fn punctuation_passes_through_as_char() {
        assert_eq!(
            tokens("(a, b);"),
            vec![
                Token::Char('('),
                Token::Identifier("a".into()),
                Token::Char(','),
                Token::Identifier("b".into()),
                Token::Char(')'),
                Token::Char(';'),
                Token::Eof,
            ],
        );
    }

    #[test]
    fn comments_are_transparent() {
        let with_comment = "1 + 2 # trailing comment\n* 3";
        let without = "1 + 2\n* 3";
        assert_eq!(tokens(with_comment), tokens(without));
    }

    #[test]
    fn comment_at_end_of_input() {
        assert_eq!(tokens("1 # no newline after this"), vec![Token::Number(1.0), Token::Eof]);
    }

    #[test]
    fn lookahead_survives_adjacent_tokens() {
        assert_eq!(
            tokens("x+1"),
            vec![
                Token::Identifier("x".into()),
                Token::Char('+'),
                Token::Number(1.0),
                Token::Eof,
            ],
        );
    }
}
