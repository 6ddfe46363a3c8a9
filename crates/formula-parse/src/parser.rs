//! Recursive-descent formula parser.
//!
//! Expressions are parsed with precedence climbing over the token model's
//! operator table; every binary operator is left-associative (equal
//! precedence groups to the left). The range operator `:` is structural
//! rather than arithmetic: it requires cell references on both sides and
//! produces a range node instead of a generic binary node.

use formula_model::column_label_to_index;
use serde::{Deserialize, Serialize};

use crate::ast::{
    ArrayLiteral, BinaryExpr, BinaryOp, CellRef, Expr, FunctionCall, NameRef, ParseError,
    RangeRef, UnaryExpr, UnaryOp,
};
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Sheet attached to unqualified cell references, so the evaluator can
    /// resolve them without re-deriving sheet context.
    pub current_sheet: Option<String>,
}

/// Parse a formula into an AST.
///
/// The input is the formula body; callers strip any leading `=` before
/// invoking. On the first grammar violation parsing aborts with exactly one
/// [`ParseError`]; no partial AST is ever returned.
pub fn parse_formula(formula: &str, opts: ParseOptions) -> Result<Expr, ParseError> {
    let tokens = tokenize(formula);
    let mut parser = Parser {
        tokens,
        pos: 0,
        current_sheet: opts.current_sheet,
    };
    let expr = parser.parse_expression(0)?;
    parser.expect(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    current_sheet: Option<String>,
}

impl Parser {
    fn parse_expression(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_primary()?;

        loop {
            let kind = self.peek_kind();
            if !kind.is_binary_op() {
                break;
            }
            let prec = kind
                .precedence()
                .unwrap_or_else(|| unreachable!("binary operator missing from precedence table"));
            if prec < min_prec {
                break;
            }

            let op_token = self.next().clone();
            let rhs = self.parse_expression(prec + 1)?;
            lhs = if op_token.kind == TokenKind::Colon {
                make_range(lhs, rhs, op_token)?
            } else {
                Expr::Binary(BinaryExpr {
                    op: binary_op_tag(&op_token.kind),
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                })
            };
        }

        // A single trailing percent wraps everything built at this level.
        if matches!(self.peek_kind(), TokenKind::Percent) {
            self.next();
            lhs = Expr::Unary(UnaryExpr {
                op: UnaryOp::Percent,
                expr: Box::new(lhs),
            });
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            TokenKind::Number(n) => {
                let n = *n;
                self.next();
                Ok(Expr::Number(n))
            }
            TokenKind::String(_) => Ok(Expr::String(self.take_string_unchecked())),
            TokenKind::Boolean(b) => {
                let b = *b;
                self.next();
                Ok(Expr::Boolean(b))
            }
            TokenKind::Error(e) => {
                let e = *e;
                self.next();
                Ok(Expr::Error(e))
            }
            TokenKind::Cell(_) => {
                let tok = self.next().clone();
                let sheet = self.current_sheet.clone();
                Ok(Expr::CellRef(cell_ref_from_token(&tok, sheet)?))
            }
            TokenKind::Sheet(_) => {
                let sheet = self.take_sheet_unchecked();
                if !matches!(self.peek_kind(), TokenKind::Cell(_)) {
                    return Err(ParseError::new(
                        "Expected cell reference after sheet name",
                        self.current().clone(),
                    ));
                }
                let tok = self.next().clone();
                Ok(Expr::CellRef(cell_ref_from_token(&tok, Some(sheet))?))
            }
            TokenKind::Name(_) => Ok(Expr::NameRef(NameRef {
                name: self.take_name_unchecked(),
            })),
            TokenKind::Function(_) => {
                let name = self.take_function_unchecked();
                self.parse_function_call(name)
            }
            TokenKind::LParen => {
                self.next();
                let expr = self.parse_expression(0)?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBrace => self.parse_array_literal(),
            TokenKind::Plus => {
                self.next();
                let operand = self.parse_primary()?;
                Ok(Expr::Unary(UnaryExpr {
                    op: UnaryOp::Plus,
                    expr: Box::new(operand),
                }))
            }
            TokenKind::Minus => {
                self.next();
                let operand = self.parse_primary()?;
                Ok(Expr::Unary(UnaryExpr {
                    op: UnaryOp::Minus,
                    expr: Box::new(operand),
                }))
            }
            TokenKind::Eof => Err(ParseError::new(
                "Unexpected end of formula",
                self.current().clone(),
            )),
            _ => {
                let tok = self.current().clone();
                Err(ParseError::new(
                    format!("Unexpected token: {}", tok.text),
                    tok,
                ))
            }
        }
    }

    fn parse_function_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if matches!(self.peek_kind(), TokenKind::RParen) {
            self.next();
            return Ok(Expr::FunctionCall(FunctionCall { name, args }));
        }
        loop {
            args.push(self.parse_expression(0)?);
            match self.peek_kind() {
                TokenKind::Comma | TokenKind::Semicolon => {
                    self.next();
                }
                TokenKind::RParen => {
                    self.next();
                    break;
                }
                _ => {
                    return Err(ParseError::new(
                        "Expected argument separator or `)`",
                        self.current().clone(),
                    ));
                }
            }
        }
        Ok(Expr::FunctionCall(FunctionCall { name, args }))
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut rows: Vec<Vec<Expr>> = Vec::new();
        let mut current_row: Vec<Expr> = Vec::new();
        loop {
            current_row.push(self.parse_expression(0)?);
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.next();
                }
                TokenKind::Semicolon => {
                    self.next();
                    rows.push(std::mem::take(&mut current_row));
                }
                TokenKind::RBrace => {
                    self.next();
                    rows.push(current_row);
                    break;
                }
                _ => {
                    return Err(ParseError::new(
                        "Expected array separator or `}`",
                        self.current().clone(),
                    ));
                }
            }
        }
        Ok(Expr::Array(ArrayLiteral { rows }))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(&kind) {
            self.next();
            Ok(())
        } else {
            let tok = self.current().clone();
            Err(ParseError::new(
                format!("Expected {}, got {}", kind, tok.kind),
                tok,
            ))
        }
    }

    fn take_string_unchecked(&mut self) -> String {
        match &mut self.tokens[self.pos].kind {
            TokenKind::String(s) => {
                let out = std::mem::take(s);
                self.pos += 1;
                out
            }
            _ => unreachable!("caller should guard with TokenKind::String"),
        }
    }

    fn take_name_unchecked(&mut self) -> String {
        match &mut self.tokens[self.pos].kind {
            TokenKind::Name(s) => {
                let out = std::mem::take(s);
                self.pos += 1;
                out
            }
            _ => unreachable!("caller should guard with TokenKind::Name"),
        }
    }

    fn take_sheet_unchecked(&mut self) -> String {
        match &mut self.tokens[self.pos].kind {
            TokenKind::Sheet(s) => {
                let out = std::mem::take(s);
                self.pos += 1;
                out
            }
            _ => unreachable!("caller should guard with TokenKind::Sheet"),
        }
    }

    fn take_function_unchecked(&mut self) -> String {
        match &mut self.tokens[self.pos].kind {
            TokenKind::Function(s) => {
                let out = std::mem::take(s);
                self.pos += 1;
                out
            }
            _ => unreachable!("caller should guard with TokenKind::Function"),
        }
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn next(&mut self) -> &Token {
        let pos = self.pos;
        // The final Eof token is never consumed, so `pos` stays in bounds.
        if !matches!(self.tokens[pos].kind, TokenKind::Eof) {
            self.pos += 1;
        }
        &self.tokens[pos]
    }
}

fn make_range(left: Expr, right: Expr, colon: Token) -> Result<Expr, ParseError> {
    match (left, right) {
        (Expr::CellRef(start), Expr::CellRef(end)) => {
            Ok(Expr::RangeRef(RangeRef { start, end }))
        }
        _ => Err(ParseError::new(
            "Range operator requires cell references on both sides",
            colon,
        )),
    }
}

fn cell_ref_from_token(tok: &Token, sheet: Option<String>) -> Result<CellRef, ParseError> {
    let TokenKind::Cell(cell) = &tok.kind else {
        unreachable!("caller should guard with TokenKind::Cell")
    };
    let col = column_label_to_index(&cell.col).map_err(|_| {
        ParseError::new(
            format!("Invalid column label: {}", cell.col),
            tok.clone(),
        )
    })?;
    let row: i64 = cell.row.parse().map_err(|_| {
        ParseError::new(format!("Invalid row number: {}", cell.row), tok.clone())
    })?;
    Ok(CellRef {
        row: row - 1,
        col,
        row_abs: cell.row_abs,
        col_abs: cell.col_abs,
        sheet,
    })
}

fn binary_op_tag(kind: &TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Caret => BinaryOp::Pow,
        TokenKind::Amp => BinaryOp::Concat,
        TokenKind::Eq => BinaryOp::Eq,
        TokenKind::Ne => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        other => unreachable!("no operator tag for token kind `{other}`"),
    }
}
