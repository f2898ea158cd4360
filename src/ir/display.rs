//! Indented disassembly of compiled programs

use std::fmt;

use super::{CompiledProgram, LogicalOperation, MathOperation, UnaryLogicalOp};

impl CompiledProgram {
    /// Render the program one node per line, children indented
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        self.write_node(&mut out, 0);
        out
    }

    fn write_node(&self, out: &mut String, indent: usize) {
        out.push_str(&"  ".repeat(indent));
        out.push_str(&self.header());
        out.push('\n');
        for child in self.children() {
            child.write_node(out, indent + 1);
        }
    }

    fn header(&self) -> String {
        match self {
            Self::Identity => "IDENTITY".to_string(),
            Self::Lookup(binding) => format!("LOOKUP {binding}"),
            Self::Immediate(_) => "IMMEDIATE".to_string(),
            Self::Defer(_) => "DEFER".to_string(),
            Self::FunctionDef { binding, .. } => format!("FUNCTION_DEF {binding}"),
            Self::Literal { value, constructor } => format!("LITERAL {value} : {constructor}"),
            Self::Pipe { .. } => "PIPE".to_string(),
            Self::EqualTo { tag, .. } => format!("EQUAL_TO : {tag}"),
            Self::Math { operation, tag } => match operation {
                MathOperation::Binary { op, .. } => {
                    format!("MATH {} : {tag}", op.name().to_uppercase())
                }
                MathOperation::Unary { op, .. } => {
                    format!("MATH {} : {tag}", op.name().to_uppercase())
                }
            },
            Self::Logical(operation) => match operation {
                LogicalOperation::Binary { op, .. } => {
                    format!("LOGICAL {}", op.name().to_uppercase())
                }
                LogicalOperation::Unary { op, .. } => match op {
                    UnaryLogicalOp::Not => "LOGICAL NOT".to_string(),
                    UnaryLogicalOp::Diverge { .. } => "LOGICAL DIVERGE".to_string(),
                },
            },
            Self::TupleGetIndex { index, .. } => format!("TUPLE_GET_INDEX {index}"),
        }
    }
}

impl fmt::Display for CompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.disassemble())
    }
}
