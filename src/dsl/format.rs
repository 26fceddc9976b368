//! Canonical source formatting.
//!
//! Every node prints back to DSL text that parses to an equal tree.

use std::fmt;

use super::ast::*;
use crate::converters::Converter;

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => {
                let text = v.to_string();
                // Keep the float spelling so the literal re-lexes as a float
                if text.contains(&['.', 'e', 'E'][..]) {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for PField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_with_converters(f, &self.converters, |f| write!(f, "p{}", self.number))
    }
}

impl fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_with_converters(f, &self.converters, |f| {
            let precedence = self.operator.precedence();
            write_operand(f, &self.left, precedence, false)?;
            write!(f, " {} ", self.operator)?;
            write_operand(f, &self.right, precedence, true)
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(n) => write!(f, "{}", n),
            Self::PField(p) => write!(f, "{}", p),
            Self::Binary(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, {}, {}, {}",
            self.xstart, self.xend, self.ystart, self.yend
        )?;
        for (name, value) in &self.options {
            write!(f, ", :{} => {}", name, value)?;
        }
        Ok(())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, "{}", line),
        }
    }
}

/// Writes the statement body of a block, one feature per line.
impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for feature in &self.features {
            writeln!(f, "  {}", feature)?;
        }
        Ok(())
    }
}

fn write_with_converters(
    f: &mut fmt::Formatter<'_>,
    converters: &[Converter],
    body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    for converter in converters {
        write!(f, "{}(", converter)?;
    }
    body(f)?;
    for _ in converters {
        f.write_str(")")?;
    }
    Ok(())
}

fn write_operand(
    f: &mut fmt::Formatter<'_>,
    operand: &Expr,
    parent: u8,
    is_right: bool,
) -> fmt::Result {
    let needs_parens = match operand {
        // A converter call already delimits the sub-expression
        Expr::Binary(b) if b.converters.is_empty() => {
            let own = b.operator.precedence();
            own < parent || (is_right && own == parent)
        }
        _ => false,
    };
    if needs_parens {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}
