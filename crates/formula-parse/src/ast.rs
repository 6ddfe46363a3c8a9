use core::fmt;

use formula_model::ErrorValue;
use serde::{Deserialize, Serialize};

use crate::token::Token;

/// A parsed formula expression.
///
/// The tree is exclusively owned: every node owns its children, there is no
/// sharing and no back-references, so teardown is a plain depth-first drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),
    String(String),
    Boolean(bool),
    Error(ErrorValue),
    CellRef(CellRef),
    RangeRef(RangeRef),
    NameRef(NameRef),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    FunctionCall(FunctionCall),
    Array(ArrayLiteral),
}

impl Expr {
    /// Stable JSON serialization useful for debugging/tests.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("Expr should be JSON-serializable")
    }
}

/// A single cell reference with 0-based coordinates.
///
/// `sheet` is the explicit `Sheet1!` prefix when present, otherwise the
/// ambient sheet supplied in `ParseOptions` (or `None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: i64,
    pub col: i64,
    pub row_abs: bool,
    pub col_abs: bool,
    pub sheet: Option<String>,
}

/// A rectangular range `start:end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRef {
    pub start: CellRef,
    pub end: CellRef,
}

/// A named range; resolution happens outside the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Concat => "&",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    /// Postfix percent; divides the operand by 100 at evaluation time.
    Percent,
}

impl UnaryOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Percent => "%",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
}

/// Array literal contents, row-major. A single row or column still uses the
/// nested form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayLiteral {
    pub rows: Vec<Vec<Expr>>,
}

/// Error produced when a formula fails to parse.
///
/// Exactly one is produced per failed parse, at the first grammar violation;
/// `position` and `token` identify the offending span so a formula-bar UI can
/// underline it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    /// Byte offset where the error was detected.
    pub position: usize,
    /// The offending token (kind, text, span).
    pub token: Token,
}

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>, token: Token) -> Self {
        Self {
            message: message.into(),
            position: token.span.start,
            token,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}
