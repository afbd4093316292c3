//! Quadruples: `(op, arg1, arg2, result)`
//!
//! Every computed value is stored in a named temporary, jumps and labels
//! carry their label in `result`, assignments carry the target there.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::{Label, Lowering, Opcode, Operand, Shape};
use crate::ast::Program;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quadruple {
    pub op: Opcode,
    pub arg1: Operand,
    pub arg2: Operand,
    pub result: Operand,
}

impl Quadruple {
    pub fn new(op: Opcode, arg1: Operand, arg2: Operand, result: Operand) -> Self {
        Self { op, arg1, arg2, result }
    }
}

impl fmt::Display for Quadruple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.op, self.arg1, self.arg2, self.result)
    }
}

/// Quadruple instruction shape
pub enum Quadruples {}

impl Shape for Quadruples {
    type Instr = Quadruple;

    fn binary(pass: &mut Lowering<Self>, op: &str, lhs: Operand, rhs: Operand) -> Operand {
        let temp = pass.fresh_temp();
        pass.emit(Quadruple::new(Opcode::Binary(op.to_string()), lhs, rhs, Operand::Temp(temp)));
        Operand::Temp(temp)
    }

    fn assign(target: &str, value: Operand) -> Quadruple {
        Quadruple::new(Opcode::Assign, value, Operand::Empty, Operand::Name(target.to_string()))
    }

    fn jump_if_false(cond: Operand, target: Label) -> Quadruple {
        Quadruple::new(Opcode::IfFalse, cond, Operand::Empty, Operand::Label(target))
    }

    fn jump(target: Label) -> Quadruple {
        Quadruple::new(Opcode::Goto, Operand::Empty, Operand::Empty, Operand::Label(target))
    }

    fn label(label: Label) -> Quadruple {
        Quadruple::new(Opcode::Label, Operand::Empty, Operand::Empty, Operand::Label(label))
    }

    fn ret(value: Option<Operand>) -> Quadruple {
        Quadruple::new(Opcode::Return, value.unwrap_or(Operand::Empty), Operand::Empty, Operand::Empty)
    }
}

pub fn lower(program: &Program) -> Vec<Quadruple> {
    Lowering::<Quadruples>::new().lower(program)
}

pub fn render_table(quads: &[Quadruple]) -> String {
    let mut table = Table::new(&[("No.", 5), ("Operator", 15), ("Operand 1", 15), ("Operand 2", 15), ("Result", 15)]);
    for (i, q) in quads.iter().enumerate() {
        table.row([i.to_string(), q.op.to_string(), q.arg1.to_string(), q.arg2.to_string(), q.result.to_string()]);
    }
    table.finish()
}

/// Persist the rendered table as a plain-text file
pub fn write_table(path: impl AsRef<Path>, quads: &[Quadruple]) -> std::io::Result<()> {
    std::fs::write(path, render_table(quads))
}
