//! Pretty error reporting for triq
//! Shows source context with line numbers and error highlighting

use crate::error::{ParseError, TriqError};
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

/// Diagnostic renderer for pretty error messages
pub struct Diagnostics<'a> {
    source: &'a str,
    filename: &'a str,
    color: bool,
}

impl<'a> Diagnostics<'a> {
    pub fn new(source: &'a str, filename: &'a str) -> Self {
        Self { source, filename, color: true }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Format a lexical error token; other tokens yield `None`
    pub fn format_token(&self, token: &Token) -> Option<String> {
        match &token.kind {
            TokenKind::Error(e) => Some(self.format_with_context("lexical", &e.to_string(), token.span)),
            _ => None,
        }
    }

    pub fn format_parse_error(&self, error: &ParseError) -> String {
        self.format_with_context("syntax", &error.message(), error.span())
    }

    /// Format an error without source context
    pub fn format_error(&self, error: &TriqError) -> String {
        format!("\n{}: {}\n", self.paint("1;31", "error"), error)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn format_with_context(&self, error_type: &str, message: &str, span: Span) -> String {
        let (line_num, col, line_content) = self.get_line_info(span);

        let mut output = String::new();

        // Error header
        output.push_str(&format!("\n{}: {}\n", self.paint("1;31", &format!("error[{error_type}]")), message));

        // Location
        output.push_str(&format!("  {} {}:{}:{}\n", self.paint("1;34", "-->"), self.filename, line_num, col));

        output.push_str(&format!("   {}\n", self.paint("1;34", "|")));

        // Source line
        output.push_str(&format!("{} {}\n", self.paint("1;34", &format!("{line_num:>3} |")), line_content));

        // Error pointer, in characters rather than bytes
        let pointer_offset = col.saturating_sub(1);
        let content_len = line_content.chars().count();
        let remaining_len = content_len.saturating_sub(pointer_offset);
        let span_len = self.source.get(span.start..span.end).map(|s| s.chars().count()).unwrap_or(0);
        let pointer_len = span_len.min(remaining_len).max(1);

        output.push_str(&format!(
            "   {} {}{}\n",
            self.paint("1;34", "|"),
            " ".repeat(pointer_offset),
            self.paint("1;31", &"^".repeat(pointer_len))
        ));

        output
    }

    /// Get line number, column (1-based, in characters) and line content for
    /// a span
    fn get_line_info(&self, span: Span) -> (usize, usize, &str) {
        let mut line_num = 1;
        let mut line_start = 0;

        let start = span.start.min(self.source.len());

        for (i, c) in self.source.char_indices() {
            if i >= start {
                break;
            }
            if c == '\n' {
                line_num += 1;
                line_start = i + 1;
            }
        }

        let col = self.source.get(line_start..start).map(|s| s.chars().count()).unwrap_or(0) + 1;

        let line_end = self.source[line_start..].find('\n').map(|i| line_start + i).unwrap_or(self.source.len());
        let line_content = self.source[line_start..line_end].trim_end_matches('\r');

        (line_num, col, line_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_info() {
        let source = "x = 5;\ny = x + 1;\nreturn y;";
        let diag = Diagnostics::new(source, "test.tq");

        let (line, col, content) = diag.get_line_info(Span::new(0, 1));
        assert_eq!(line, 1);
        assert_eq!(col, 1);
        assert_eq!(content, "x = 5;");

        let (line, col, content) = diag.get_line_info(Span::new(11, 12));
        assert_eq!(line, 2);
        assert_eq!(col, 5);
        assert_eq!(content, "y = x + 1;");
    }

    #[test]
    fn test_parse_error_rendering() {
        let source = "x = 1\ny = 2;";
        let tokens = Lexer::new(source).tokenize();
        let parsed = Parser::new(&tokens).parse();
        let rendered = Diagnostics::new(source, "prog.tq").with_color(false).format_parse_error(&parsed.errors[0]);
        let expected = "
error[syntax]: expected delimiter ';', found identifier 'y'
  --> prog.tq:2:1
   |
  2 | y = 2;
   | ^
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_lex_error_rendering() {
        let source = "s = \"open";
        let tokens = Lexer::new(source).tokenize();
        let diag = Diagnostics::new(source, "prog.tq").with_color(false);
        let rendered = diag.format_token(&tokens[2]).unwrap();
        assert!(rendered.contains("error[lexical]: unterminated string: \"open"));
        assert!(rendered.contains("  --> prog.tq:1:5"));
        assert!(rendered.ends_with("    ^^^^^\n"));
        assert_eq!(diag.format_token(&tokens[0]), None);
    }
}
