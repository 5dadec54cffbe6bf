//! Byte-walking lexer for grammar source.
//!
//! Tracks the current line and the byte position of the most recent lexeme.
//! Comments start at `#` and run to end of line; the escape `\#` suppresses
//! the comment and consumes the backslash. Inside quoted strings a
//! backslash escapes the closing delimiter; every other backslash pair is
//! preserved verbatim so the string-FST compiler can interpret `\[`, `\]`,
//! and `\\` itself.

use weft_base::{CompileError, Span};

use crate::token::{Keyword, Token, TokenKind, CONNECTORS};

/// Streaming tokenizer over UTF-8 grammar source.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    file: String,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: impl Into<String>) -> Self {
        Self { source, bytes: source.as_bytes(), pos: 0, line: 1, file: file.into() }
    }

    /// Current 1-based line number.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Lexes the whole source. Stops at the first lexical error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Produces the next token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_blank();
        let start = self.pos;
        let line = self.line;
        let Some(&byte) = self.bytes.get(self.pos) else {
            return Ok(Token::new(TokenKind::Eof, Span::new(start, start, line)));
        };
        match byte {
            b'\'' => self.lex_string(b'\'', line).map(|text| {
                Token::new(TokenKind::QuotedString(text), Span::new(start, self.pos, line))
            }),
            b'"' => self.lex_string(b'"', line).map(|text| {
                Token::new(TokenKind::DoubleQuotedString(text), Span::new(start, self.pos, line))
            }),
            b'<' => self.lex_angle(line).map(|text| {
                Token::new(TokenKind::AngleString(text), Span::new(start, self.pos, line))
            }),
            b'\\' => {
                // \# yields a plain '#', which is not a legal connector;
                // the error below names it.
                self.pos += 1;
                if self.bytes.get(self.pos) == Some(&b'#') {
                    self.pos += 1;
                    Err(self.error(line, "Parse error - unknown connector: #"))
                } else {
                    Err(self.error(line, "Parse error - unknown connector: \\"))
                }
            }
            _ if is_descriptor_start(byte) => Ok(self.lex_word(start, line)),
            _ => {
                let c = self.source[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                self.pos += c.len_utf8();
                if CONNECTORS.contains(&c) {
                    Ok(Token::new(TokenKind::Connector(c), Span::new(start, self.pos, line)))
                } else {
                    Err(self.error(line, format!("Parse error - unknown connector: {}", c)))
                }
            }
        }
    }

    /// Skips whitespace and `#` comments, honoring the `\#` escape by not
    /// treating the following `#` as a comment opener.
    fn skip_blank(&mut self) {
        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'#' => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Quoted string body: `\<delim>` unescapes the delimiter, any other
    /// backslash pair is kept as-is.
    fn lex_string(&mut self, delim: u8, line: u32) -> Result<String, CompileError> {
        self.pos += 1;
        let mut text = String::new();
        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b if b == delim => {
                    self.pos += 1;
                    return Ok(text);
                }
                b'\\' => {
                    match self.bytes.get(self.pos + 1) {
                        Some(&next) if next == delim => {
                            text.push(delim as char);
                            self.pos += 2;
                        }
                        Some(&next) => {
                            text.push('\\');
                            if next == b'\n' {
                                self.line += 1;
                            }
                            let tail = &self.source[self.pos + 1..];
                            let c = tail.chars().next().unwrap_or('\u{FFFD}');
                            text.push(c);
                            self.pos += 1 + c.len_utf8();
                        }
                        None => break,
                    }
                }
                b'\n' => {
                    self.line += 1;
                    text.push('\n');
                    self.pos += 1;
                }
                _ => {
                    let tail = &self.source[self.pos..];
                    let c = tail.chars().next().unwrap_or('\u{FFFD}');
                    text.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        Err(self.error(line, "Unterminated string"))
    }

    fn lex_angle(&mut self, line: u32) -> Result<String, CompileError> {
        self.pos += 1;
        let start = self.pos;
        while let Some(&byte) = self.bytes.get(self.pos) {
            if byte == b'>' {
                let text = self.source[start..self.pos].to_string();
                self.pos += 1;
                return Ok(text);
            }
            if byte == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
        Err(self.error(line, "Unterminated weight"))
    }

    /// Descriptors, keywords, and numbers share one character class:
    /// `[A-Za-z0-9_.]` continuing, `[A-Za-z0-9_]` starting. The lexeme is
    /// classified afterwards, so `3` is an integer, `3.5` a float, `a.b` a
    /// dotted descriptor, and `byte` a keyword.
    fn lex_word(&mut self, start: usize, line: u32) -> Token {
        while let Some(&byte) = self.bytes.get(self.pos) {
            if is_descriptor_continue(byte) {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let span = Span::new(start, self.pos, line);
        if text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = text.parse::<i64>() {
                return Token::new(TokenKind::Integer(value), span);
            }
        }
        let digits_and_dots = text.bytes().all(|b| b.is_ascii_digit() || b == b'.');
        if digits_and_dots && text.bytes().filter(|&b| b == b'.').count() == 1 {
            if let Ok(value) = text.parse::<f64>() {
                return Token::new(TokenKind::Float(value), span);
            }
        }
        if let Some(keyword) = Keyword::lookup(text) {
            return Token::new(TokenKind::Keyword(keyword), span);
        }
        Token::new(TokenKind::Descriptor(text.to_string()), span)
    }

    fn error(&self, line: u32, message: impl Into<String>) -> CompileError {
        CompileError::new(self.file.clone(), line, message)
    }
}

fn is_descriptor_start(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn is_descriptor_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, "test.grm")
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_a_simple_rule() {
        let toks = kinds("export foo = \"cat\" : \"dog\";");
        assert_eq!(
            toks,
            vec![
                TokenKind::Keyword(Keyword::Export),
                TokenKind::Descriptor("foo".into()),
                TokenKind::Connector('='),
                TokenKind::DoubleQuotedString("cat".into()),
                TokenKind::Connector(':'),
                TokenKind::DoubleQuotedString("dog".into()),
                TokenKind::Connector(';'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn dotted_descriptor_is_one_token() {
        let toks = kinds("lib.Plural");
        assert_eq!(toks[0], TokenKind::Descriptor("lib.Plural".into()));
    }

    #[test]
    fn string_mode_suffix_splits_dot_and_keyword() {
        let toks = kinds("\"abc\".utf8");
        assert_eq!(
            toks,
            vec![
                TokenKind::DoubleQuotedString("abc".into()),
                TokenKind::Connector('.'),
                TokenKind::Keyword(Keyword::Utf8),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_classify_as_integer_and_float() {
        assert_eq!(kinds("42")[0], TokenKind::Integer(42));
        assert_eq!(kinds("2.5")[0], TokenKind::Float(2.5));
        // Two dots make it a descriptor-shaped lexeme, not a number.
        assert_eq!(kinds("1.2.3")[0], TokenKind::Descriptor("1.2.3".into()));
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let toks = kinds("a # comment ; nothing\nb");
        assert_eq!(
            toks,
            vec![
                TokenKind::Descriptor("a".into()),
                TokenKind::Descriptor("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn hash_inside_string_is_not_a_comment() {
        let toks = kinds("\"a#b\"");
        assert_eq!(toks[0], TokenKind::DoubleQuotedString("a#b".into()));
    }

    #[test]
    fn escaped_quote_stays_in_string() {
        let toks = kinds(r#""say \"hi\"""#);
        assert_eq!(toks[0], TokenKind::DoubleQuotedString("say \"hi\"".into()));
    }

    #[test]
    fn backslash_pairs_are_preserved_for_string_compiler() {
        let toks = kinds(r#""\[cat\]""#);
        assert_eq!(toks[0], TokenKind::DoubleQuotedString(r"\[cat\]".into()));
    }

    #[test]
    fn angle_string_captures_weight_text() {
        assert_eq!(kinds("<1.5>")[0], TokenKind::AngleString("1.5".into()));
    }

    #[test]
    fn line_numbers_advance() {
        let tokens = Lexer::new("a\nb\n\nc", "test.grm").tokenize().unwrap();
        let lines: Vec<u32> = tokens.iter().map(|t| t.line()).collect();
        assert_eq!(lines, vec![1, 2, 4, 4]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new("\"abc", "test.grm").tokenize().unwrap_err();
        assert!(err.to_string().contains("Unterminated string"));
    }

    #[test]
    fn unknown_connector_is_an_error() {
        let err = Lexer::new("a ^ b", "test.grm").tokenize().unwrap_err();
        assert!(err.to_string().contains("unknown connector: ^"));
    }

    #[test]
    fn escaped_hash_consumes_backslash() {
        let err = Lexer::new(r"\#", "test.grm").tokenize().unwrap_err();
        assert!(err.to_string().contains("unknown connector: #"));
    }
}
