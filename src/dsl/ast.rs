//! Abstract Syntax Tree types for the score DSL.

use indexmap::IndexMap;

use crate::converters::Converter;

/// A numeric literal, keeping the integer/float spelling of the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integer literal (`990`)
    Int(i64),
    /// Floating point literal (`1000.2323`, `1e3`)
    Float(f64),
}

impl Number {
    /// The literal's value as a float.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Whether the literal was written as an integer.
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Addition (`+`)
    Plus,
    /// Subtraction (`-`)
    Minus,
    /// Multiplication (`*`)
    Times,
    /// Division (`/`)
    Divide,
}

impl Operator {
    /// Surface spelling of the operator.
    pub fn symbol(&self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Times => '*',
            Self::Divide => '/',
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Plus | Self::Minus => 1,
            Self::Times | Self::Divide => 2,
        }
    }
}

/// A reference to the Nth positional parameter of a score event.
#[derive(Debug, Clone, PartialEq)]
pub struct PField {
    /// Parameter index (1-based)
    pub number: u32,
    /// Converters to apply to the parameter value, outermost call first
    pub converters: Vec<Converter>,
}

impl PField {
    /// Create a bare p-field reference.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            converters: Vec::new(),
        }
    }
}

/// Two sub-expressions combined by an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    /// Left operand
    pub left: Box<Expr>,
    /// Right operand
    pub right: Box<Expr>,
    /// Operator combining the operands
    pub operator: Operator,
    /// Converters applied to the combined result, outermost call first
    pub converters: Vec<Converter>,
}

/// An expression-valued coordinate or option.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal; never carries converters
    Constant(Number),
    /// P-field reference (`p5`, `cpspch(p5)`)
    PField(PField),
    /// Operator application (`p2 + p3`, `ampdb(p4) * 3`)
    Binary(BinaryExpr),
}

impl Expr {
    /// Build a binary expression with no converters.
    pub fn binary(left: Expr, operator: Operator, right: Expr) -> Self {
        Self::Binary(BinaryExpr {
            left: Box::new(left),
            right: Box::new(right),
            operator,
            converters: Vec::new(),
        })
    }

    /// Build a bare p-field reference.
    pub fn pfield(number: u32) -> Self {
        Self::PField(PField::new(number))
    }

    /// Converters attached to this node. Constants never carry any.
    pub fn converters(&self) -> &[Converter] {
        match self {
            Self::Constant(_) => &[],
            Self::PField(p) => &p.converters,
            Self::Binary(b) => &b.converters,
        }
    }

    pub(crate) fn converters_mut(&mut self) -> Option<&mut Vec<Converter>> {
        match self {
            Self::Constant(_) => None,
            Self::PField(p) => Some(&mut p.converters),
            Self::Binary(b) => Some(&mut b.converters),
        }
    }

    /// The literal, if this is a constant.
    pub fn as_constant(&self) -> Option<Number> {
        match self {
            Self::Constant(n) => Some(*n),
            _ => None,
        }
    }

    /// The p-field reference, if this is one.
    pub fn as_pfield(&self) -> Option<&PField> {
        match self {
            Self::PField(p) => Some(p),
            _ => None,
        }
    }

    /// The operator node, if this is one.
    pub fn as_binary(&self) -> Option<&BinaryExpr> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }
}

/// Feature types supported by the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Straight line segment
    Line,
}

impl FeatureKind {
    /// Parse a feature type from its statement keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "line" => Some(Self::Line),
            _ => None,
        }
    }

    /// Statement keyword of this feature type.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Line => "line",
        }
    }

    /// Number of positional coordinate arguments the statement requires.
    pub fn coordinate_count(&self) -> usize {
        match self {
            Self::Line => 4, // xstart, xend, ystart, yend
        }
    }
}

/// A line segment from (`xstart`, `ystart`) to (`xend`, `yend`).
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Horizontal start position
    pub xstart: Expr,
    /// Horizontal end position
    pub xend: Expr,
    /// Vertical start position
    pub ystart: Expr,
    /// Vertical end position
    pub yend: Expr,
    /// Keyword options such as `thickness`, in source order
    pub options: IndexMap<String, Expr>,
}

impl Line {
    /// Look up a keyword option.
    pub fn option(&self, name: &str) -> Option<&Expr> {
        self.options.get(name)
    }
}

/// A drawable feature declared inside an instrument block.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    /// `line xstart, xend, ystart, yend[, options]`
    Line(Line),
}

impl Feature {
    /// The statement type of this feature.
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Line(_) => FeatureKind::Line,
        }
    }

    /// The line segment, if this is a `line` feature.
    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Self::Line(line) => Some(line),
        }
    }
}

/// The features of one instrument, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    /// Declared features; never empty
    pub features: Vec<Feature>,
}

impl Instr {
    pub(crate) fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }
}
