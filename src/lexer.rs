//! triq Lexer - single pass, error-carrying tokens
//!
//! Key features:
//! - Keywords, identifiers, numbers, strings, operators and delimiters
//! - `//` line comments and `/* */` block comments produce no tokens
//! - Any contiguous run of operator characters is one operator token
//! - Lexical problems become `Error` tokens instead of aborting the scan
//! - The stream always ends with a single `End` token

use std::fmt;

use logos::Logos;
use serde::Serialize;

use crate::error::LexError;
use crate::span::Span;
use crate::table::Table;

/// Characters that may appear in an operator run
pub const OPERATOR_CHARS: &[char] = &['+', '-', '*', '/', '=', '!', '<', '>', '&', '|', '≠'];

/// Raw scanner categories. Numbers and strings are validated afterwards.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"\p{White_Space}+")]
enum RawKind {
    #[token("if")]
    #[token("else")]
    #[token("while")]
    #[token("return")]
    #[token("for")]
    Keyword,

    #[regex(r"\p{L}[\p{L}\p{Nd}]*")]
    Identifier,

    #[regex(r"-?[0-9]+(\.[0-9]*)?")]
    Number,

    // The closing quote is optional so an unterminated literal still
    // matches up to end of input.
    #[regex(r#""[^"]*"?"#)]
    Str,

    #[regex(r"[+\-*/=!<>&|≠]", operator_run)]
    Operator,

    #[regex(r"[(){};,]")]
    Delimiter,

    #[token("//", line_comment)]
    #[token("/*", block_comment)]
    Comment,
}

/// Extend a single operator character to the maximal run
fn operator_run(lex: &mut logos::Lexer<RawKind>) {
    let rest = lex.remainder();
    let len = rest
        .char_indices()
        .find(|&(_, c)| !OPERATOR_CHARS.contains(&c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    lex.bump(len);
}

fn line_comment(lex: &mut logos::Lexer<RawKind>) -> logos::Skip {
    let rest = lex.remainder();
    lex.bump(rest.find('\n').unwrap_or(rest.len()));
    logos::Skip
}

/// Skips to the first `*/`, or to end of input when it never comes
fn block_comment(lex: &mut logos::Lexer<RawKind>) -> logos::Skip {
    let rest = lex.remainder();
    lex.bump(rest.find("*/").map(|i| i + 2).unwrap_or(rest.len()));
    logos::Skip
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Operator,
    Number,
    String,
    Delimiter,
    Error(LexError),
    End,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Operator => "operator",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Delimiter => "delimiter",
            TokenKind::Error(_) => "error",
            TokenKind::End => "end",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token produced by the lexer. String tokens hold the body without the
/// quotes; error tokens hold the offending source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, span: Span) -> Self {
        Self { kind, lexeme: lexeme.into(), line, span }
    }

    /// Exact kind and text match
    pub fn is(&self, kind: &TokenKind, text: &str) -> bool {
        &self.kind == kind && self.lexeme == text
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TokenKind::Error(_))
    }

    /// Text shown in tables: the message for errors, the lexeme otherwise
    pub fn display_text(&self) -> String {
        match &self.kind {
            TokenKind::Error(e) => e.to_string(),
            _ => self.lexeme.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (line {})", self.kind, self.display_text(), self.line)
    }
}

pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn tokenize(&self) -> Vec<Token> {
        let mut lex = RawKind::lexer(self.source);
        let mut lines = LineCounter::new(self.source);
        let mut tokens = Vec::new();

        while let Some(result) = lex.next() {
            let start = lex.span().start;
            let line = lines.line_at(start);

            let token = match result {
                Ok(raw) => {
                    let span = Span::new(start, lex.span().end);
                    self.classify(raw, span, line)
                }
                Err(()) => {
                    // Exactly one character, however many bytes the
                    // automaton consumed before giving up.
                    let c = self.source.get(start..).and_then(|s| s.chars().next()).unwrap_or(char::REPLACEMENT_CHARACTER);
                    let end = start + c.len_utf8();
                    if lex.span().end < end {
                        lex.bump(end - lex.span().end);
                    }
                    Token::new(
                        TokenKind::Error(LexError::UnrecognizedCharacter(c)),
                        c.to_string(),
                        line,
                        Span::new(start, end),
                    )
                }
            };
            tokens.push(token);
        }

        let end = self.source.len();
        tokens.push(Token::new(TokenKind::End, "", lines.line_at(end), Span::new(end, end)));
        tokens
    }

    fn classify(&self, raw: RawKind, span: Span, line: usize) -> Token {
        let text = &self.source[span.start..span.end];
        let kind = match raw {
            RawKind::Keyword => TokenKind::Keyword,
            RawKind::Identifier => TokenKind::Identifier,
            RawKind::Operator => TokenKind::Operator,
            RawKind::Delimiter => TokenKind::Delimiter,
            RawKind::Number => match validate_number(text) {
                Ok(()) => TokenKind::Number,
                Err(e) => TokenKind::Error(e),
            },
            RawKind::Str => {
                if text.len() >= 2 && text.ends_with('"') {
                    return Token::new(TokenKind::String, &text[1..text.len() - 1], line, span);
                }
                TokenKind::Error(LexError::UnterminatedString(text[1..].to_string()))
            }
            // Skipped by the callbacks, never produced
            RawKind::Comment => unreachable!("comments are skipped"),
        };
        Token::new(kind, text, line, span)
    }
}

/// Checks a scanned number literal. Floats must be finite `f64`s; integers
/// must parse as `i64` and fit in `i32`.
pub(crate) fn validate_number(text: &str) -> Result<(), LexError> {
    if text.contains('.') {
        match text.parse::<f64>() {
            Ok(v) if v.is_infinite() => Err(LexError::FloatOverflow(text.to_string())),
            Ok(_) => Ok(()),
            Err(_) => Err(LexError::InvalidFloat(text.to_string())),
        }
    } else {
        match text.parse::<i64>() {
            Ok(v) if i32::try_from(v).is_err() => Err(LexError::IntegerOverflow(text.to_string())),
            Ok(_) => Ok(()),
            Err(_) => Err(LexError::InvalidInteger(text.to_string())),
        }
    }
}

/// Tracks the line number of increasing byte offsets
struct LineCounter<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, offset: 0, line: 1 }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        if offset > self.offset {
            self.line += self.source.as_bytes()[self.offset..offset].iter().filter(|&&b| b == b'\n').count();
            self.offset = offset;
        }
        self.line
    }
}

/// Token table: kind, text, reserved-word flag and line
pub fn render_table(tokens: &[Token]) -> String {
    let mut table = Table::new(&[("Kind", 15), ("Token", 40), ("Reserved", 10), ("Line", 8)]);
    for token in tokens {
        let reserved = if token.kind == TokenKind::Keyword { "yes" } else { "no" };
        table.row([token.kind.name().to_string(), token.display_text(), reserved.to_string(), token.line.to_string()]);
    }
    table.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<(String, String)> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .map(|t| (t.kind.name().to_string(), t.lexeme))
            .collect()
    }

    fn pair(kind: &str, text: &str) -> (String, String) {
        (kind.to_string(), text.to_string())
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("if (x) { y = \"hi\"; }"),
            vec![
                pair("keyword", "if"),
                pair("delimiter", "("),
                pair("identifier", "x"),
                pair("delimiter", ")"),
                pair("delimiter", "{"),
                pair("identifier", "y"),
                pair("operator", "="),
                pair("string", "hi"),
                pair("delimiter", ";"),
                pair("delimiter", "}"),
                pair("end", ""),
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(kinds("iffy whilex For"), vec![
            pair("identifier", "iffy"),
            pair("identifier", "whilex"),
            pair("identifier", "For"),
            pair("end", ""),
        ]);
    }

    #[test]
    fn test_operator_runs() {
        assert_eq!(kinds("a <= b != c =-"), vec![
            pair("identifier", "a"),
            pair("operator", "<="),
            pair("identifier", "b"),
            pair("operator", "!="),
            pair("identifier", "c"),
            pair("operator", "=-"),
            pair("end", ""),
        ]);
        assert_eq!(kinds("a ≠ b")[1], pair("operator", "≠"));
    }

    #[test]
    fn test_negative_number() {
        assert_eq!(kinds("x = -12.5;")[2], pair("number", "-12.5"));
        assert_eq!(kinds("a - b")[1], pair("operator", "-"));
    }

    #[test]
    fn test_comments_produce_nothing() {
        let source = "a // trailing\n/* block\nspans */ b /* open";
        let tokens = Lexer::new(source).tokenize();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].lexeme, "a");
        assert_eq!(tokens[1].lexeme, "b");
        assert_eq!(tokens[1].line, 3);
        assert_eq!(tokens[2].kind, TokenKind::End);
    }

    #[test]
    fn test_line_numbers() {
        let tokens = Lexer::new("a\n\nb\n  c").tokenize();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 4, 4]);
    }

    #[test]
    fn test_integer_bounds() {
        let ok = Lexer::new("2147483647").tokenize();
        assert_eq!(ok[0].kind, TokenKind::Number);

        let low = Lexer::new("-2147483648").tokenize();
        assert_eq!(low[0].kind, TokenKind::Number);

        let over = Lexer::new("2147483648").tokenize();
        assert_eq!(over[0].kind, TokenKind::Error(LexError::IntegerOverflow("2147483648".into())));
        assert_eq!(over[0].display_text(), "integer overflow: 2147483648");
    }

    #[test]
    fn test_integer_beyond_i64_is_invalid() {
        let tokens = Lexer::new("99999999999999999999").tokenize();
        assert!(matches!(tokens[0].kind, TokenKind::Error(LexError::InvalidInteger(_))));
    }

    #[test]
    fn test_float_overflow() {
        let literal = format!("1{}.5", "0".repeat(400));
        let tokens = Lexer::new(&literal).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error(LexError::FloatOverflow(literal.clone())));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_validate_number() {
        assert_eq!(validate_number("3.25"), Ok(()));
        assert_eq!(validate_number("7."), Ok(()));
        assert_eq!(validate_number("1.2.3"), Err(LexError::InvalidFloat("1.2.3".into())));
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = Lexer::new("x = \"abc").tokenize();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].kind, TokenKind::Error(LexError::UnterminatedString("abc".into())));
        assert_eq!(tokens[2].display_text(), "unterminated string: \"abc");
        assert_eq!(tokens[3].kind, TokenKind::End);
    }

    #[test]
    fn test_unrecognized_character_advances_one() {
        let tokens = Lexer::new("a#€b").tokenize();
        assert_eq!(tokens[0].lexeme, "a");
        assert_eq!(tokens[1].kind, TokenKind::Error(LexError::UnrecognizedCharacter('#')));
        assert_eq!(tokens[2].kind, TokenKind::Error(LexError::UnrecognizedCharacter('€')));
        assert_eq!(tokens[2].span, Span::new(2, 5));
        assert_eq!(tokens[3].lexeme, "b");
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_eq!(kinds("café = año2;"), vec![
            pair("identifier", "café"),
            pair("operator", "="),
            pair("identifier", "año2"),
            pair("delimiter", ";"),
            pair("end", ""),
        ]);
        assert_eq!(kinds("ƒ_x")[1], pair("error", "_"));
        // Keywords stay exact
        assert_eq!(kinds("if ifé")[1], pair("identifier", "ifé"));
    }

    #[test]
    fn test_unicode_whitespace_is_skipped() {
        let tokens = Lexer::new("x\u{B}=\u{A0}1;\u{2003}").tokenize();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["x", "=", "1", ";", ""]);
        assert!(tokens.iter().all(|t| !t.is_error()));
    }

    #[test]
    fn test_render_table() {
        let table = render_table(&Lexer::new("if x").tokenize());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[3].starts_with("| keyword"));
        assert!(lines[3].contains("| yes"));
        assert!(lines[4].contains("| no"));
    }
}
