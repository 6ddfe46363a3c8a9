//! Formula front end: tokenizer and parser producing a typed AST.
//!
//! [`tokenize`] turns formula text into a position-tagged token stream;
//! [`parse_formula`] builds an owned expression tree from it. Evaluation,
//! reference rewriting, and serialization back to text are separate consumers
//! of the AST and live outside this crate.
//!
//! Both entry points are pure functions over the input string: no state is
//! shared between calls, so concurrent parsing of independent formulas needs
//! no synchronization.

mod ast;
mod lexer;
mod parser;
mod token;

pub use ast::{
    ArrayLiteral, BinaryExpr, BinaryOp, CellRef, Expr, FunctionCall, NameRef, ParseError,
    RangeRef, UnaryExpr, UnaryOp,
};
pub use lexer::tokenize;
pub use parser::{parse_formula, ParseOptions};
pub use token::{CellToken, Span, Token, TokenKind};
