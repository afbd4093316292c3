//! Triples: `(op, arg1, arg2)` with implicit results
//!
//! A triple's identity is its position in the list. An operand `(n)`
//! means "the value computed by triple `n`", so no temporaries are named.

use std::fmt;

use serde::Serialize;

use super::{Label, Lowering, Opcode, Operand, Shape};
use crate::ast::Program;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub op: Opcode,
    pub arg1: Operand,
    pub arg2: Operand,
}

impl Triple {
    pub fn new(op: Opcode, arg1: Operand, arg2: Operand) -> Self {
        Self { op, arg1, arg2 }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.op, self.arg1, self.arg2)
    }
}

/// Triple instruction shape
pub enum Triples {}

impl Shape for Triples {
    type Instr = Triple;

    fn binary(pass: &mut Lowering<Self>, op: &str, lhs: Operand, rhs: Operand) -> Operand {
        Operand::Ref(pass.emit(Triple::new(Opcode::Binary(op.to_string()), lhs, rhs)))
    }

    fn assign(target: &str, value: Operand) -> Triple {
        Triple::new(Opcode::Assign, Operand::Name(target.to_string()), value)
    }

    fn jump_if_false(cond: Operand, target: Label) -> Triple {
        Triple::new(Opcode::IfFalse, cond, Operand::Label(target))
    }

    fn jump(target: Label) -> Triple {
        Triple::new(Opcode::Goto, Operand::Label(target), Operand::Empty)
    }

    fn label(label: Label) -> Triple {
        Triple::new(Opcode::Label, Operand::Label(label), Operand::Empty)
    }

    fn ret(value: Option<Operand>) -> Triple {
        Triple::new(Opcode::Return, value.unwrap_or(Operand::Empty), Operand::Empty)
    }
}

pub fn lower(program: &Program) -> Vec<Triple> {
    Lowering::<Triples>::new().lower(program)
}

/// Numbered listing, one `index: (op, arg1, arg2)` per line
pub fn render(triples: &[Triple]) -> String {
    triples.iter().enumerate().map(|(i, t)| format!("{i}: {t}\n")).collect()
}
