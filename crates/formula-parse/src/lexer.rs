//! Formula tokenizer.
//!
//! Scanning never fails: unrecognized characters and unterminated quoted runs
//! become [`TokenKind::Invalid`] tokens so the scan always completes and the
//! parser decides what to do with them. The returned sequence always ends
//! with exactly one [`TokenKind::Eof`] token.

use formula_model::ErrorValue;

use crate::token::{CellToken, Span, Token, TokenKind};

/// Scan a formula into a position-tagged token stream.
pub fn tokenize(formula: &str) -> Vec<Token> {
    Lexer::new(formula).run()
}

struct Lexer<'a> {
    src: &'a str,
    chars: std::str::Chars<'a>,
    idx: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.chars(),
            idx: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(ch) = self.peek_char() {
            let start = self.idx;
            match ch {
                ' ' | '\t' => {
                    self.bump();
                }
                '"' => self.lex_string(start),
                '\'' => self.lex_quoted_sheet(start),
                '#' => self.lex_error_literal(start),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                ',' => self.single(TokenKind::Comma),
                ';' => self.single(TokenKind::Semicolon),
                ':' => self.single(TokenKind::Colon),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Star),
                '/' => self.single(TokenKind::Slash),
                '^' => self.single(TokenKind::Caret),
                '&' => self.single(TokenKind::Amp),
                '%' => self.single(TokenKind::Percent),
                '=' => self.single(TokenKind::Eq),
                '<' => {
                    self.bump();
                    match self.peek_char() {
                        Some('=') => {
                            self.bump();
                            self.push(TokenKind::Le, start);
                        }
                        Some('>') => {
                            self.bump();
                            self.push(TokenKind::Ne, start);
                        }
                        _ => self.push(TokenKind::Lt, start),
                    }
                }
                '>' => {
                    self.bump();
                    if self.peek_char() == Some('=') {
                        self.bump();
                        self.push(TokenKind::Ge, start);
                    } else {
                        self.push(TokenKind::Gt, start);
                    }
                }
                c if is_digit(c) || (c == '.' && self.peek_next_is_digit()) => {
                    self.lex_number(start);
                }
                '$' => {
                    if let Some(cell) = self.try_lex_cell_ref() {
                        self.push(TokenKind::Cell(cell), start);
                    } else {
                        self.bump();
                        self.push(TokenKind::Invalid, start);
                    }
                }
                c if is_ident_start_char(c) => self.lex_word(start),
                _ => {
                    self.bump();
                    self.push(TokenKind::Invalid, start);
                }
            }
        }

        let end = Span::new(self.idx, self.idx);
        self.tokens.push(Token::new(TokenKind::Eof, "", end));
        self.tokens
    }

    fn lex_string(&mut self, start: usize) {
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.bump();
                    if self.peek_char() == Some('"') {
                        self.bump();
                        value.push('"');
                        continue;
                    }
                    self.push(TokenKind::String(value), start);
                    return;
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
                None => {
                    // Unterminated: one invalid token spanning to end of input.
                    self.push(TokenKind::Invalid, start);
                    return;
                }
            }
        }
    }

    fn lex_quoted_sheet(&mut self, start: usize) {
        self.bump();
        let mut name = String::new();
        loop {
            match self.peek_char() {
                Some('\'') => {
                    self.bump();
                    if self.peek_char() == Some('\'') {
                        self.bump();
                        name.push('\'');
                        continue;
                    }
                    break;
                }
                Some(c) => {
                    self.bump();
                    name.push(c);
                }
                None => {
                    self.push(TokenKind::Invalid, start);
                    return;
                }
            }
        }
        // Quoted names only occur as sheet prefixes.
        if self.peek_char() == Some('!') {
            self.bump();
            self.push(TokenKind::Sheet(name), start);
        } else {
            self.push(TokenKind::Invalid, start);
        }
    }

    fn lex_error_literal(&mut self, start: usize) {
        if let Some(err) = match_error_literal(&self.src[start..]) {
            let end = start + err.as_str().len();
            while self.idx < end {
                self.bump();
            }
            self.push(TokenKind::Error(err), start);
        } else {
            self.bump();
            self.push(TokenKind::Invalid, start);
        }
    }

    fn lex_number(&mut self, start: usize) {
        self.take_digits();
        if self.peek_char() == Some('.') && self.peek_next_is_digit() {
            self.bump();
            self.take_digits();
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let save = self.idx;
            self.bump();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.bump();
            }
            let digits_start = self.idx;
            self.take_digits();
            if self.idx == digits_start {
                // The `e` starts an identifier, not an exponent.
                self.rollback_to(save);
            }
        }
        let raw = &self.src[start..self.idx];
        match raw.parse::<f64>() {
            Ok(value) => self.push(TokenKind::Number(value), start),
            Err(_) => self.push(TokenKind::Invalid, start),
        }
    }

    /// Attempt `[$]letters[$]digits`, rolling back entirely on failure.
    ///
    /// Rejects matches followed by an identifier-continuation character
    /// (`A1FOO` is a name), `(` (`A1(` is a function call), or `!` (`A1!B2`
    /// is a sheet prefix).
    fn try_lex_cell_ref(&mut self) -> Option<CellToken> {
        let save = self.idx;

        let mut col_abs = false;
        if self.peek_char() == Some('$') {
            col_abs = true;
            self.bump();
        }
        let col_start = self.idx;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_alphabetic()) {
            self.bump();
        }
        let col_end = self.idx;
        if col_start == col_end {
            self.rollback_to(save);
            return None;
        }

        let mut row_abs = false;
        if self.peek_char() == Some('$') {
            row_abs = true;
            self.bump();
        }
        let row_start = self.idx;
        while matches!(self.peek_char(), Some(c) if is_digit(c)) {
            self.bump();
        }
        let row_end = self.idx;
        if row_start == row_end {
            self.rollback_to(save);
            return None;
        }

        if matches!(self.peek_char(), Some(c) if is_ident_cont_char(c) || c == '(' || c == '!') {
            self.rollback_to(save);
            return None;
        }

        Some(CellToken {
            col: self.src[col_start..col_end].to_string(),
            row: self.src[row_start..row_end].to_string(),
            col_abs,
            row_abs,
        })
    }

    /// Lex a letter-initial word: cell reference, boolean, sheet prefix,
    /// function name, or plain name, in that priority order.
    fn lex_word(&mut self, start: usize) {
        if let Some(cell) = self.try_lex_cell_ref() {
            self.push(TokenKind::Cell(cell), start);
            return;
        }

        let src = self.src;
        let ident_start = self.idx;
        while matches!(self.peek_char(), Some(c) if is_ident_cont_char(c)) {
            self.bump();
        }
        let ident = &src[ident_start..self.idx];

        // Boolean literals match the canonical uppercase form only, and win
        // over every later rule (`TRUE(` is a boolean followed by `(`).
        if ident == "TRUE" {
            self.push(TokenKind::Boolean(true), start);
            return;
        }
        if ident == "FALSE" {
            self.push(TokenKind::Boolean(false), start);
            return;
        }

        if self.peek_char() == Some('!') {
            let name = ident.to_string();
            self.bump();
            self.push(TokenKind::Sheet(name), start);
            return;
        }

        if self.peek_char() == Some('(') {
            self.push(TokenKind::Function(ident.to_string()), start);
            return;
        }

        self.push(TokenKind::Name(ident.to_string()), start);
    }

    fn take_digits(&mut self) {
        while matches!(self.peek_char(), Some(c) if is_digit(c)) {
            self.bump();
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let text = self.src[start..self.idx].to_string();
        self.tokens.push(Token::new(kind, text, Span::new(start, self.idx)));
    }

    fn single(&mut self, kind: TokenKind) {
        let start = self.idx;
        self.bump();
        self.push(kind, start);
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.idx += ch.len_utf8();
        Some(ch)
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn peek_next_is_digit(&self) -> bool {
        let mut iter = self.chars.clone();
        iter.next();
        matches!(iter.next(), Some(c) if is_digit(c))
    }

    fn rollback_to(&mut self, idx: usize) {
        self.idx = idx;
        self.chars = self.src[idx..].chars();
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_ident_start_char(c: char) -> bool {
    matches!(c, '_' | 'A'..='Z' | 'a'..='z') || (!c.is_ascii() && c.is_alphabetic())
}

fn is_ident_cont_char(c: char) -> bool {
    matches!(c, '_' | '.' | 'A'..='Z' | 'a'..='z' | '0'..='9')
        || (!c.is_ascii() && c.is_alphanumeric())
}

fn match_error_literal(input: &str) -> Option<ErrorValue> {
    let mut best: Option<ErrorValue> = None;
    for &err in ErrorValue::ALL {
        let lit = err.as_str();
        let matches_here = input
            .get(..lit.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(lit));
        if matches_here && best.map_or(true, |cur| lit.len() > cur.as_str().len()) {
            best = Some(err);
        }
    }
    best
}
