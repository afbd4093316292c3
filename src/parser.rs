//! triq Parser - recursive descent, one token of lookahead
//!
//! Grammar:
//! ```text
//! program     := declaration*
//! declaration := if | while | for | return | assignment
//! if          := "if" "(" expr ")" block ("else" block)?
//! while       := "while" "(" expr ")" block
//! for         := "for" "(" assignment expr ";" assignment ")" block
//! return      := "return" expr? ";"
//! assignment  := IDENT "=" expr ";"
//! block       := "{" declaration* "}"
//! expr        := term (OPERATOR expr)?
//! ```
//!
//! `expr` has no precedence tiers: every operator takes a whole expression
//! on its right, so `a - b - c` is `a - (b - c)` and `a * b + c` is
//! `a * (b + c)`.
//!
//! A syntax error abandons the current top-level declaration. The error is
//! recorded, the cursor moves one token past the failure point and parsing
//! resumes there.

use serde::Serialize;

use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

/// Result of a parse: the tree plus every syntax error met on the way
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Parsed {
    pub program: Program,
    pub errors: Vec<ParseError>,
}

impl Parsed {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Parsed {
        let mut parsed = Parsed::default();

        while !self.at_end() {
            match self.parse_declaration() {
                Ok(stmt) => parsed.program.stmts.push(stmt),
                Err(e) => {
                    parsed.errors.push(e);
                    self.advance();
                }
            }
        }

        parsed
    }

    fn parse_declaration(&mut self) -> ParseResult<Stmt> {
        let token = self.peek();
        match token.kind {
            TokenKind::Keyword => match token.lexeme.to_lowercase().as_str() {
                "if" => self.parse_if(),
                "while" => self.parse_while(),
                "for" => self.parse_for(),
                "return" => self.parse_return(),
                _ => Err(ParseError::UnrecognizedKeyword {
                    text: token.lexeme.clone(),
                    line: token.line,
                    span: token.span,
                }),
            },
            TokenKind::Identifier => Ok(Stmt::Assign(self.parse_assignment()?)),
            TokenKind::End => Err(self.unexpected_end()),
            _ => Err(ParseError::UnexpectedToken {
                kind: token.kind.name(),
                text: token.display_text(),
                line: token.line,
                span: token.span,
            }),
        }
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let line = self.peek().line;
        self.advance(); // if
        self.expect(TokenKind::Delimiter, "(")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Delimiter, ")")?;
        let then_block = self.parse_block()?;

        let else_block = if self.peek().lexeme.to_lowercase() == "else" {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::If { cond, then_block, else_block, line })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let line = self.peek().line;
        self.advance(); // while
        self.expect(TokenKind::Delimiter, "(")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Delimiter, ")")?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body, line })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let line = self.peek().line;
        self.advance(); // for
        self.expect(TokenKind::Delimiter, "(")?;
        // Each assignment consumes its own trailing `;`
        let init = self.parse_assignment()?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Delimiter, ";")?;
        let step = self.parse_assignment()?;
        self.expect(TokenKind::Delimiter, ")")?;
        let body = self.parse_block()?;
        Ok(Stmt::For { init, cond, step, body, line })
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let line = self.peek().line;
        self.advance(); // return
        let value = if matches!(self.peek().kind, TokenKind::Delimiter | TokenKind::End) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Delimiter, ";")?;
        Ok(Stmt::Return { value, line })
    }

    fn parse_assignment(&mut self) -> ParseResult<Assign> {
        let token = self.peek();
        if token.kind != TokenKind::Identifier {
            return Err(self.expected(TokenKind::Identifier, "<name>"));
        }
        let target = token.lexeme.clone();
        let line = token.line;
        self.advance();
        self.expect(TokenKind::Operator, "=")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Delimiter, ";")?;
        Ok(Assign { target, value, line })
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.expect(TokenKind::Delimiter, "{")?;
        let mut stmts = Vec::new();
        while !self.at_end() && self.peek().lexeme != "}" {
            stmts.push(self.parse_declaration()?);
        }
        self.expect(TokenKind::Delimiter, "}")?;
        Ok(Block { stmts })
    }

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_term()?;
        if self.peek().kind == TokenKind::Operator {
            let op = self.peek().lexeme.clone();
            self.advance();
            let rhs = self.parse_expr()?;
            return Ok(Expr::binary(op, lhs, rhs));
        }
        Ok(lhs)
    }

    /// The current token as a leaf, whatever its kind
    fn parse_term(&mut self) -> ParseResult<Expr> {
        let token = self.peek();
        let term = match &token.kind {
            TokenKind::End => return Err(self.unexpected_end()),
            TokenKind::Identifier => Expr::Ident(token.lexeme.clone()),
            TokenKind::Number => Expr::Number(token.lexeme.clone()),
            TokenKind::String => Expr::Str(token.lexeme.clone()),
            _ => Expr::Raw(token.lexeme.clone()),
        };
        self.advance();
        Ok(term)
    }

    // === Helpers ===

    /// Past the last token every slice reads as `End`, terminated or not
    fn peek(&self) -> &'a Token {
        self.tokens.get(self.pos).unwrap_or(&END)
    }

    /// Line and span of the current token. Past the end of a slice with no
    /// `End` token this is an empty span just after the last token.
    fn position(&self) -> (usize, Span) {
        match (self.tokens.get(self.pos), self.tokens.last()) {
            (Some(token), _) => (token.line, token.span),
            (None, Some(last)) => (last.line, Span::new(last.span.end, last.span.end)),
            (None, None) => (1, Span::default()),
        }
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::End
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: TokenKind, text: &str) -> ParseResult<()> {
        if self.peek().is(&kind, text) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(kind, text))
        }
    }

    fn expected(&self, kind: TokenKind, text: &str) -> ParseError {
        let found = self.peek();
        let (line, span) = self.position();
        ParseError::Expected {
            expected_kind: kind.name(),
            expected: text.to_string(),
            found_kind: found.kind.name(),
            found: found.display_text(),
            line,
            span,
        }
    }

    fn unexpected_end(&self) -> ParseError {
        let (line, span) = self.position();
        ParseError::UnexpectedEnd { line, span }
    }
}

static END: Token = Token { kind: TokenKind::End, lexeme: String::new(), line: 1, span: Span { start: 0, end: 0 } };

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Parsed {
        let tokens = Lexer::new(source).tokenize();
        Parser::new(&tokens).parse()
    }

    fn num(n: &str) -> Expr {
        Expr::Number(n.into())
    }

    fn ident(n: &str) -> Expr {
        Expr::Ident(n.into())
    }

    #[test]
    fn test_assignment() {
        let parsed = parse("x = 1 + 2;");
        assert!(parsed.is_ok());
        assert_eq!(
            parsed.program.stmts,
            vec![Stmt::Assign(Assign { target: "x".into(), value: Expr::binary("+", num("1"), num("2")), line: 1 })]
        );
    }

    #[test]
    fn test_right_leaning_chain() {
        let parsed = parse("x = a - b * c;");
        let Stmt::Assign(assign) = &parsed.program.stmts[0] else { panic!("expected assignment") };
        assert_eq!(assign.value, Expr::binary("-", ident("a"), Expr::binary("*", ident("b"), ident("c"))));
    }

    #[test]
    fn test_if_else() {
        let parsed = parse("if (a < b) { x = 1; } else { x = 2; }");
        assert!(parsed.is_ok());
        let Stmt::If { cond, then_block, else_block, .. } = &parsed.program.stmts[0] else { panic!("expected if") };
        assert_eq!(cond, &Expr::binary("<", ident("a"), ident("b")));
        assert_eq!(then_block.stmts.len(), 1);
        assert_eq!(else_block.as_ref().map(|b| b.stmts.len()), Some(1));
    }

    #[test]
    fn test_else_is_case_insensitive() {
        let parsed = parse("if (c) { } ELSE { y = 1; }");
        assert!(parsed.is_ok());
        assert!(matches!(&parsed.program.stmts[0], Stmt::If { else_block: Some(_), .. }));
    }

    #[test]
    fn test_for_children() {
        let parsed = parse("for (i = 0; i < 10; i = i + 1;) { s = s + i; }");
        assert!(parsed.is_ok(), "{:?}", parsed.errors);
        let Stmt::For { init, cond, step, body, .. } = &parsed.program.stmts[0] else { panic!("expected for") };
        assert_eq!(init.target, "i");
        assert_eq!(cond, &Expr::binary("<", ident("i"), num("10")));
        assert_eq!(step.value, Expr::binary("+", ident("i"), num("1")));
        assert_eq!(body.stmts.len(), 1);
    }

    #[test]
    fn test_return_forms() {
        let parsed = parse("return; return x + 1;");
        assert!(parsed.is_ok());
        assert_eq!(parsed.program.stmts[0], Stmt::Return { value: None, line: 1 });
        assert_eq!(parsed.program.stmts[1], Stmt::Return { value: Some(Expr::binary("+", ident("x"), num("1"))), line: 1 });
    }

    #[test]
    fn test_string_term() {
        let parsed = parse("s = \"hello world\";");
        let Stmt::Assign(assign) = &parsed.program.stmts[0] else { panic!("expected assignment") };
        assert_eq!(assign.value, Expr::Str("hello world".into()));
    }

    #[test]
    fn test_missing_semicolon_message() {
        let parsed = parse("x = 1\ny = 2;");
        assert_eq!(parsed.errors[0].to_string(), "line 2: expected delimiter ';', found identifier 'y'");
        // One token past `y` the leftovers `=`, `2`, `;` each fail on their own
        assert_eq!(parsed.errors.len(), 4);
        assert!(parsed.program.stmts.is_empty());
    }

    #[test]
    fn test_recovery_keeps_following_statements() {
        let parsed = parse("x = ;\ny = 2;");
        // `x = ;` takes `;` as its term, then fails on `y`; recovery skips
        // `y`, fails on `=`, skips it, fails on `2`, skips it, fails on `;`.
        assert_eq!(parsed.errors.len(), 4);
        assert!(parsed.program.stmts.is_empty());

        // `(` is missing at `x`; `{` and `}` then fail one by one
        let parsed = parse("if x { }\nz = 3;\nw = 4;");
        assert_eq!(parsed.errors.len(), 3);
        assert_eq!(parsed.errors[0].line(), 1);
        let targets: Vec<&str> = parsed
            .program
            .stmts
            .iter()
            .filter_map(|s| if let Stmt::Assign(a) = s { Some(a.target.as_str()) } else { None })
            .collect();
        assert_eq!(targets, vec!["z", "w"]);
    }

    #[test]
    fn test_slice_without_end_token() {
        let tokens = Lexer::new("x = 1;").tokenize();
        let parsed = Parser::new(&tokens[..tokens.len() - 1]).parse();
        assert!(parsed.is_ok());
        assert_eq!(parsed.program.stmts.len(), 1);

        let tokens = Lexer::new("x = 1").tokenize();
        let parsed = Parser::new(&tokens[..tokens.len() - 1]).parse();
        assert_eq!(
            parsed.errors,
            vec![ParseError::Expected {
                expected_kind: "delimiter",
                expected: ";".into(),
                found_kind: "end",
                found: String::new(),
                line: 1,
                span: Span::new(5, 5),
            }]
        );
        assert!(Parser::new(&[]).parse().program.stmts.is_empty());
    }

    #[test]
    fn test_unrecognized_keyword() {
        let parsed = parse("else { }");
        assert!(matches!(parsed.errors[0], ParseError::UnrecognizedKeyword { ref text, .. } if text == "else"));
    }

    #[test]
    fn test_unexpected_token() {
        let parsed = parse("42; a = 1;");
        assert!(matches!(parsed.errors[0], ParseError::UnexpectedToken { kind: "number", .. }));
        assert_eq!(parsed.program.stmts.len(), 1);
    }

    #[test]
    fn test_unexpected_end() {
        let parsed = parse("x =");
        assert_eq!(parsed.errors, vec![ParseError::UnexpectedEnd { line: 1, span: Span::new(3, 3) }]);
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse("  // nothing\n");
        assert!(parsed.is_ok());
        assert!(parsed.program.stmts.is_empty());
    }
}
