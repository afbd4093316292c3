//! # triq - source text to three-address code
//!
//! A small imperative language (assignments, `if`/`else`, `while`, `for`,
//! `return`, flat binary expressions, string and number literals) is
//! translated in three strictly pipelined stages:
//!
//! 1. **Lexing** - text to tokens. Lexical problems are tokens too.
//! 2. **Parsing** - tokens to an owned AST. A syntax error drops only the
//!    top-level statement it occurred in.
//! 3. **Lowering** - AST to linear instructions, either triples or
//!    quadruples, with `L<n>` labels and `t<n>` temporaries.
//!
//! ## Example
//! ```
//! let tokens = triq::tokenize("x = 1 + 2;");
//! let parsed = triq::parse(&tokens);
//! let quads = triq::lower_to_quadruples(&parsed.program);
//! assert_eq!(quads[0].to_string(), "(+, 1, 2, t1)");
//! assert_eq!(quads[1].to_string(), "(=, t1, _, x)");
//! ```

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod table;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use ast::{Assign, Block, Expr, Node, Program, Stmt};
pub use error::{LexError, ParseError, TriqError, TriqResult};
pub use ir::quadruple::Quadruple;
pub use ir::triple::Triple;
pub use ir::{Label, Opcode, Operand, Temp};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parsed, Parser};
pub use span::Span;

pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

pub fn parse(tokens: &[Token]) -> Parsed {
    Parser::new(tokens).parse()
}

pub fn lower_to_triples(program: &Program) -> Vec<Triple> {
    ir::triple::lower(program)
}

pub fn lower_to_quadruples(program: &Program) -> Vec<Quadruple> {
    ir::quadruple::lower(program)
}

/// Pipeline stage whose result is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Tokens,
    Ast,
    Triples,
    Quadruples,
}

impl FromStr for Emit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tokens" | "lex" | "t" => Ok(Emit::Tokens),
            "ast" | "tree" | "a" => Ok(Emit::Ast),
            "triples" | "triple" | "tri" => Ok(Emit::Triples),
            "quadruples" | "quads" | "quad" | "q" => Ok(Emit::Quadruples),
            _ => Err(format!("unknown stage: {s}. Use: tokens, ast, triples, quadruples")),
        }
    }
}

impl fmt::Display for Emit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Emit::Tokens => "tokens",
            Emit::Ast => "ast",
            Emit::Triples => "triples",
            Emit::Quadruples => "quadruples",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "txt" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            _ => Err(format!("unknown format: {s}. Use: text, json")),
        }
    }
}

/// Sizes of each stage's result, for verbose reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub tokens: usize,
    pub statements: usize,
    pub instructions: usize,
}

/// Everything a pipeline run produced
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// Rendered result of the requested stage
    pub text: String,
    /// `Error` tokens, in source order
    pub lex_errors: Vec<Token>,
    pub parse_errors: Vec<ParseError>,
    pub counts: Counts,
    /// Set when `text` is the quadruple table
    pub quadruple_table: Option<Vec<Quadruple>>,
}

impl Output {
    pub fn has_errors(&self) -> bool {
        !self.lex_errors.is_empty() || !self.parse_errors.is_empty()
    }

    /// Write the rendered stage to `path`. The quadruple table goes through
    /// its own exporter.
    pub fn save(&self, path: impl AsRef<Path>) -> TriqResult<()> {
        match &self.quadruple_table {
            Some(quads) => ir::quadruple::write_table(path, quads)?,
            None => std::fs::write(path, &self.text)?,
        }
        Ok(())
    }
}

/// Run the pipeline up to `emit` and render that stage
pub fn run(source: &str, emit: Emit, format: Format) -> TriqResult<Output> {
    let tokens = tokenize(source);
    let lex_errors: Vec<Token> = tokens.iter().filter(|t| t.is_error()).cloned().collect();
    let mut counts = Counts { tokens: tokens.len(), ..Counts::default() };

    if emit == Emit::Tokens {
        let text = match format {
            Format::Text => lexer::render_table(&tokens),
            Format::Json => serde_json::to_string_pretty(&tokens)?,
        };
        return Ok(Output { text, lex_errors, parse_errors: vec![], counts, quadruple_table: None });
    }

    let parsed = parse(&tokens);
    counts.statements = parsed.program.stmts.len();
    let mut quadruple_table = None;

    let text = match (emit, format) {
        (Emit::Ast, Format::Text) => parsed.program.to_string(),
        (Emit::Ast, Format::Json) => serde_json::to_string_pretty(&parsed.program)?,
        (Emit::Triples, _) => {
            let triples = lower_to_triples(&parsed.program);
            counts.instructions = triples.len();
            match format {
                Format::Text => ir::triple::render(&triples),
                Format::Json => serde_json::to_string_pretty(&triples)?,
            }
        }
        (Emit::Quadruples, _) => {
            let quads = lower_to_quadruples(&parsed.program);
            counts.instructions = quads.len();
            match format {
                Format::Text => {
                    let text = ir::quadruple::render_table(&quads);
                    quadruple_table = Some(quads);
                    text
                }
                Format::Json => serde_json::to_string_pretty(&quads)?,
            }
        }
        (Emit::Tokens, _) => unreachable!("handled above"),
    };

    Ok(Output { text, lex_errors, parse_errors: parsed.errors, counts, quadruple_table })
}

/// Version of the triq tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LANGUAGE_NAME: &str = "triq";
