//! Lowering of the AST to linear three-address code
//!
//! One traversal, shared by both instruction shapes:
//! - [`triple`]: `(op, arg1, arg2)`, a computed value is referred to by the
//!   index of the instruction that produced it
//! - [`quadruple`]: `(op, arg1, arg2, result)`, a computed value lives in
//!   an explicit temporary `t<n>`
//!
//! Control flow is linearized with labels `L<n>`. Forward jumps name a
//! label that is emitted later at the right position, so no instruction is
//! ever patched after it has been pushed.

pub mod quadruple;
pub mod triple;

use std::fmt;

use serde::Serialize;

use crate::ast::{Assign, Block, Expr, Program, Stmt};

/// Symbolic jump target, rendered `L<n>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Compiler-generated value holder, rendered `t<n>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Temp(pub u32);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Opcode {
    /// Binary operator, spelled as in the source
    Binary(String),
    Assign,
    IfFalse,
    Goto,
    Label,
    Return,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Binary(op) => f.write_str(op),
            Opcode::Assign => f.write_str("="),
            Opcode::IfFalse => f.write_str("IF_FALSE"),
            Opcode::Goto => f.write_str("GOTO"),
            Opcode::Label => f.write_str("LABEL"),
            Opcode::Return => f.write_str("RETURN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operand {
    /// Identifier or literal text
    Name(String),
    Temp(Temp),
    Label(Label),
    /// Value produced by the triple at this index
    Ref(usize),
    Empty,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Name(name) => f.write_str(name),
            Operand::Temp(t) => write!(f, "{t}"),
            Operand::Label(l) => write!(f, "{l}"),
            Operand::Ref(i) => write!(f, "({i})"),
            Operand::Empty => f.write_str("_"),
        }
    }
}

/// How a lowering pass materializes its instructions
pub trait Shape: Sized {
    type Instr;

    /// Emit `lhs op rhs` and return the operand that names its value
    fn binary(pass: &mut Lowering<Self>, op: &str, lhs: Operand, rhs: Operand) -> Operand;

    fn assign(target: &str, value: Operand) -> Self::Instr;

    fn jump_if_false(cond: Operand, target: Label) -> Self::Instr;

    fn jump(target: Label) -> Self::Instr;

    fn label(label: Label) -> Self::Instr;

    fn ret(value: Option<Operand>) -> Self::Instr;
}

/// State of one lowering pass. Counters start at 1 for every pass.
pub struct Lowering<S: Shape> {
    instrs: Vec<S::Instr>,
    next_label: u32,
    next_temp: u32,
}

impl<S: Shape> Default for Lowering<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Shape> Lowering<S> {
    pub fn new() -> Self {
        Self { instrs: Vec::new(), next_label: 1, next_temp: 1 }
    }

    pub fn lower(mut self, program: &Program) -> Vec<S::Instr> {
        for stmt in &program.stmts {
            self.stmt(stmt);
        }
        self.instrs
    }

    /// Push an instruction, returning its index
    pub fn emit(&mut self, instr: S::Instr) -> usize {
        self.instrs.push(instr);
        self.instrs.len() - 1
    }

    pub fn fresh_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    pub fn fresh_temp(&mut self) -> Temp {
        let temp = Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }

    fn block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => self.assign(assign),
            Stmt::If { cond, then_block, else_block, .. } => {
                let cond = self.expr(cond);
                let false_label = self.fresh_label();
                // Without an else branch the false label doubles as the exit
                let end_label = else_block.as_ref().map(|_| self.fresh_label());
                self.emit(S::jump_if_false(cond, false_label));
                self.block(then_block);
                match (else_block, end_label) {
                    (Some(else_block), Some(end_label)) => {
                        self.emit(S::jump(end_label));
                        self.emit(S::label(false_label));
                        self.block(else_block);
                        self.emit(S::label(end_label));
                    }
                    _ => {
                        self.emit(S::label(false_label));
                    }
                }
            }
            Stmt::While { cond, body, .. } => {
                let start = self.fresh_label();
                let end = self.fresh_label();
                self.emit(S::label(start));
                let cond = self.expr(cond);
                self.emit(S::jump_if_false(cond, end));
                self.block(body);
                self.emit(S::jump(start));
                self.emit(S::label(end));
            }
            Stmt::For { init, cond, step, body, .. } => {
                self.assign(init);
                let start = self.fresh_label();
                let end = self.fresh_label();
                self.emit(S::label(start));
                let cond = self.expr(cond);
                self.emit(S::jump_if_false(cond, end));
                self.block(body);
                self.assign(step);
                self.emit(S::jump(start));
                self.emit(S::label(end));
            }
            Stmt::Return { value, .. } => {
                let value = value.as_ref().map(|v| self.expr(v));
                self.emit(S::ret(value));
            }
        }
    }

    fn assign(&mut self, assign: &Assign) {
        let value = self.expr(&assign.value);
        self.emit(S::assign(&assign.target, value));
    }

    fn expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.expr(lhs);
                let rhs = self.expr(rhs);
                S::binary(self, op, lhs, rhs)
            }
            leaf => Operand::Name(leaf.leaf_text().unwrap_or_default()),
        }
    }
}
