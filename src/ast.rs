//! triq Abstract Syntax Tree
//!
//! The AST is an owned tree: every node owns its children, there is no
//! sharing and no cycles. It is built bottom-up by the parser in one pass
//! and never mutated afterwards.
//!
//! Besides the typed view (`Stmt`, `Expr`, ...) every element can be seen
//! as a generic [`Node`] with a label and ordered children, which is what
//! the tree printer walks:
//!
//! ```text
//! program
//! └── =
//!     ├── x
//!     └── +
//!         ├── 1
//!         └── 2
//! ```

use std::fmt;

use serde::Serialize;

/// The unlabeled root: top-level statements in source order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

/// `{ stmts }`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// `target = value;`
    Assign(Assign),

    /// `if (cond) { ... } [else { ... }]`
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
        line: usize,
    },

    /// `while (cond) { ... }`
    While { cond: Expr, body: Block, line: usize },

    /// `for (init; cond; step) { ... }`
    For {
        init: Assign,
        cond: Expr,
        step: Assign,
        body: Block,
        line: usize,
    },

    /// `return [value];`
    Return { value: Option<Expr>, line: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assign {
    pub target: String,
    pub value: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Ident(String),
    Number(String),
    /// String literal body, without quotes
    Str(String),
    /// Any other token used as a term, kept verbatim
    Raw(String),
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: impl Into<String>, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op: op.into(), lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    /// Source-like text of a leaf; `None` for binary nodes
    pub fn leaf_text(&self) -> Option<String> {
        match self {
            Expr::Ident(s) | Expr::Number(s) | Expr::Raw(s) => Some(s.clone()),
            Expr::Str(s) => Some(format!("\"{s}\"")),
            Expr::Binary { .. } => None,
        }
    }
}

impl Stmt {
    pub fn line(&self) -> usize {
        match self {
            Stmt::Assign(a) => a.line,
            Stmt::If { line, .. } | Stmt::While { line, .. } | Stmt::For { line, .. } | Stmt::Return { line, .. } => *line,
        }
    }
}

// === GENERIC NODE VIEW ===

/// A borrowed view of any tree element as `label` + `children`
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Block(&'a Block),
    Else(&'a Block),
    Stmt(&'a Stmt),
    Assign(&'a Assign),
    Target(&'a str),
    Expr(&'a Expr),
}

impl<'a> Node<'a> {
    /// Statement keyword, operator symbol, or leaf text. Empty for the root
    /// and for blocks.
    pub fn label(&self) -> String {
        match self {
            Node::Program(_) | Node::Block(_) => String::new(),
            Node::Else(_) => "else".to_string(),
            Node::Stmt(Stmt::Assign(_)) | Node::Assign(_) => "=".to_string(),
            Node::Stmt(Stmt::If { .. }) => "if".to_string(),
            Node::Stmt(Stmt::While { .. }) => "while".to_string(),
            Node::Stmt(Stmt::For { .. }) => "for".to_string(),
            Node::Stmt(Stmt::Return { .. }) => "return".to_string(),
            Node::Target(name) => name.to_string(),
            Node::Expr(Expr::Binary { op, .. }) => op.clone(),
            Node::Expr(leaf) => leaf.leaf_text().unwrap_or_default(),
        }
    }

    pub fn children(&self) -> Vec<Node<'a>> {
        match *self {
            Node::Program(p) => p.stmts.iter().map(Node::Stmt).collect(),
            Node::Block(b) => b.stmts.iter().map(Node::Stmt).collect(),
            Node::Else(b) => vec![Node::Block(b)],
            Node::Stmt(Stmt::Assign(a)) | Node::Assign(a) => vec![Node::Target(&a.target), Node::Expr(&a.value)],
            Node::Stmt(Stmt::If { cond, then_block, else_block, .. }) => {
                let mut out = vec![Node::Expr(cond), Node::Block(then_block)];
                if let Some(b) = else_block {
                    out.push(Node::Else(b));
                }
                out
            }
            Node::Stmt(Stmt::While { cond, body, .. }) => vec![Node::Expr(cond), Node::Block(body)],
            Node::Stmt(Stmt::For { init, cond, step, body, .. }) => {
                vec![Node::Assign(init), Node::Expr(cond), Node::Assign(step), Node::Block(body)]
            }
            Node::Stmt(Stmt::Return { value, .. }) => value.iter().map(Node::Expr).collect(),
            Node::Target(_) => vec![],
            Node::Expr(Expr::Binary { lhs, rhs, .. }) => vec![Node::Expr(lhs), Node::Expr(rhs)],
            Node::Expr(_) => vec![],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Label used by the printer; unlabeled nodes get a placeholder
    fn display_label(&self) -> String {
        match self {
            Node::Program(_) => "program".to_string(),
            Node::Block(_) => "block".to_string(),
            _ => self.label(),
        }
    }
}

fn write_tree(f: &mut fmt::Formatter<'_>, node: Node<'_>, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{}{}{}", prefix, if last { "└── " } else { "├── " }, node.display_label())?;
    let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        write_tree(f, *child, &child_prefix, i + 1 == children.len())?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = Node::Program(self);
        writeln!(f, "{}", root.display_label())?;
        let children = root.children();
        for (i, child) in children.iter().enumerate() {
            write_tree(f, *child, "", i + 1 == children.len())?;
        }
        Ok(())
    }
}
