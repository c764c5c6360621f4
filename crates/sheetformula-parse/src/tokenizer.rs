//! Lexer (spec §4.2): a deterministic token stream over the formula text,
//! honouring the scientific-notation lookahead rule and the
//! function-identifier rule.
//!
//! Like the teacher's `Tokenizer`, this is a single hand-rolled scanner over
//! byte offsets rather than a regex cascade — the scientific-notation rule
//! and the cell-reference/function/variable classification are inherently
//! context-sensitive (lookbehind + lookahead), which a maximal-munch scan
//! expresses far more directly than backtracking regex alternation would.

use std::fmt;

use sheetformula_common::{Arity, CellRef, ExcelError, FunctionLookup};

/// The lexical classification of a scanned token (spec §4.2 terminal set).
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    String(String),
    /// A registered function name; `arity` mirrors the registry's policy so
    /// the parser can reject a fixed-arity mismatch without re-querying the
    /// registry (design note §9, "fixed-arity coupling").
    Function { name: String, arity: Arity },
    XlError(ExcelError),
    AbsCell(CellRef),
    MixedCell(CellRef),
    RelCell(CellRef),
    Variable(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Amp,
    Colon,
    Semicolon,
    Comma,
    Backslash,
    Star,
    Slash,
    Minus,
    Plus,
    Caret,
    Percent,
    Gt,
    Lt,
    Ge,
    Le,
    Ne,
    Eq,
    Dot,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Raised when the scanner meets a character (or identifier shape) it
/// cannot classify — always surfaces to callers as `#NAME?` (spec §4.2,
/// §7).
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub pos: usize,
}

const ERROR_CODES: &[&str] = &[
    "#DIV/0!", "#VALUE!", "#NAME?", "#REF!", "#NUM!", "#NULL!", "#N/A", "#ERROR!",
];

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    catalog: &'a dyn FunctionLookup,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, catalog: &'a dyn FunctionLookup) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            catalog,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut out = Vec::with_capacity(self.src.len() / 2 + 1);
        while self.pos < self.bytes.len() {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                break;
            }
            let start = self.pos;
            let kind = self.scan_one()?;
            out.push(Token {
                kind,
                start,
                end: self.pos,
            });
        }
        Ok(out)
    }

    fn cur(&self) -> u8 {
        self.bytes[self.pos]
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && (self.bytes[self.pos] as char).is_whitespace() {
            self.pos += 1;
        }
    }

    fn scan_one(&mut self) -> Result<TokenKind, LexError> {
        let c = self.cur();
        match c {
            b'"' | b'\'' => self.scan_string(),
            b'#' => self.scan_error(),
            b'$' => self.scan_word(),
            b'0'..=b'9' => self.scan_number(),
            b'.' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => self.scan_number(),
            _ if c.is_ascii_alphabetic() || c == b'_' => self.scan_word(),
            b'{' => {
                self.pos += 1;
                Ok(TokenKind::LBrace)
            }
            b'}' => {
                self.pos += 1;
                Ok(TokenKind::RBrace)
            }
            b'(' => {
                self.pos += 1;
                Ok(TokenKind::LParen)
            }
            b')' => {
                self.pos += 1;
                Ok(TokenKind::RParen)
            }
            b'&' => {
                self.pos += 1;
                Ok(TokenKind::Amp)
            }
            b':' => {
                self.pos += 1;
                Ok(TokenKind::Colon)
            }
            b';' => {
                self.pos += 1;
                Ok(TokenKind::Semicolon)
            }
            b',' => {
                self.pos += 1;
                Ok(TokenKind::Comma)
            }
            b'\\' => {
                self.pos += 1;
                Ok(TokenKind::Backslash)
            }
            b'*' => {
                self.pos += 1;
                Ok(TokenKind::Star)
            }
            b'/' => {
                self.pos += 1;
                Ok(TokenKind::Slash)
            }
            b'+' => {
                self.pos += 1;
                Ok(TokenKind::Plus)
            }
            b'-' => {
                self.pos += 1;
                Ok(TokenKind::Minus)
            }
            b'^' => {
                self.pos += 1;
                Ok(TokenKind::Caret)
            }
            b'%' => {
                self.pos += 1;
                Ok(TokenKind::Percent)
            }
            b'.' => {
                self.pos += 1;
                Ok(TokenKind::Dot)
            }
            b'>' => {
                if self.peek_at(1) == Some(b'=') {
                    self.pos += 2;
                    Ok(TokenKind::Ge)
                } else {
                    self.pos += 1;
                    Ok(TokenKind::Gt)
                }
            }
            b'<' => match self.peek_at(1) {
                Some(b'=') => {
                    self.pos += 2;
                    Ok(TokenKind::Le)
                }
                Some(b'>') => {
                    self.pos += 2;
                    Ok(TokenKind::Ne)
                }
                _ => {
                    self.pos += 1;
                    Ok(TokenKind::Lt)
                }
            },
            b'=' => {
                self.pos += 1;
                Ok(TokenKind::Eq)
            }
            _ => Err(LexError { pos: self.pos }),
        }
    }

    /// Scan a numeric literal, folding a trailing scientific-notation
    /// exponent directly into the value (spec §4.2 `SCI_E` rule; §4.3 point
    /// 8 — "folds into a single numeric literal at parse time"). Folding at
    /// scan time, the way the teacher's `check_scientific_notation` /
    /// `is_scientific_notation_base` consume the exponent sign into the
    /// current token, sidesteps a dedicated `SCI_E` grammar production
    /// while keeping the "digit before, digit after" lookaround exact.
    fn scan_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        if self.cur() == b'0' || self.cur().is_ascii_digit() {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        if self.pos < self.bytes.len() && self.bytes[self.pos] == b'.' {
            self.pos += 1;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        let mantissa: f64 = self.src[start..self.pos].parse().map_err(|_| LexError { pos: start })?;

        // Scientific-notation lookahead: optional whitespace, e/E, optional
        // whitespace, optional sign, optional '.', and a required digit.
        let save = self.pos;
        let mut probe = self.pos;
        while probe < self.bytes.len() && (self.bytes[probe] as char).is_whitespace() {
            probe += 1;
        }
        if probe < self.bytes.len() && (self.bytes[probe] == b'e' || self.bytes[probe] == b'E') {
            let mut exp_pos = probe + 1;
            while exp_pos < self.bytes.len() && (self.bytes[exp_pos] as char).is_whitespace() {
                exp_pos += 1;
            }
            let sign_start = exp_pos;
            if exp_pos < self.bytes.len() && (self.bytes[exp_pos] == b'+' || self.bytes[exp_pos] == b'-') {
                exp_pos += 1;
            }
            let digits_start = exp_pos;
            while exp_pos < self.bytes.len() && self.bytes[exp_pos].is_ascii_digit() {
                exp_pos += 1;
            }
            if exp_pos > digits_start {
                let sign = if self.bytes.get(sign_start) == Some(&b'-') {
                    -1.0
                } else {
                    1.0
                };
                let exponent: f64 = self.src[digits_start..exp_pos].parse().unwrap_or(0.0);
                self.pos = exp_pos;
                return Ok(TokenKind::Number(mantissa * 10f64.powf(sign * exponent)));
            }
        }
        self.pos = save;
        Ok(TokenKind::Number(mantissa))
    }

    fn scan_string(&mut self) -> Result<TokenKind, LexError> {
        let quote = self.cur();
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            if self.pos >= self.bytes.len() {
                return Err(LexError { pos: start });
            }
            let b = self.cur();
            if b == b'\\' && self.peek_at(1).is_some_and(|n| n == quote) {
                out.push(quote as char);
                self.pos += 2;
            } else if b == quote {
                self.pos += 1;
                return Ok(TokenKind::String(out));
            } else {
                // Preserve UTF-8 multi-byte sequences verbatim.
                let ch_start = self.pos;
                let ch_len = utf8_len(b);
                self.pos += ch_len;
                out.push_str(&self.src[ch_start..self.pos.min(self.bytes.len())]);
            }
        }
    }

    fn scan_error(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        for code in ERROR_CODES {
            let bytes = code.as_bytes();
            if self.src.as_bytes()[self.pos..].starts_with(bytes) {
                self.pos += bytes.len();
                return Ok(TokenKind::XlError(ExcelError::parse(code).unwrap()));
            }
        }
        Err(LexError { pos: start })
    }

    /// Scan a maximal run of word-ish characters (letters, digits,
    /// underscore, and the `$` anchor marker), then classify the whole
    /// run as a cell reference, a function name, or a plain variable.
    fn scan_word(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word = &self.src[start..self.pos];

        if let Some(cell) = CellRef::parse(word) {
            return Ok(match (cell.col_absolute, cell.row_absolute) {
                (true, true) => TokenKind::AbsCell(cell),
                (false, false) => TokenKind::RelCell(cell),
                _ => TokenKind::MixedCell(cell),
            });
        }

        if word.contains('$') {
            return Err(LexError { pos: start });
        }

        let first = word.as_bytes()[0];
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return Err(LexError { pos: start });
        }

        let upper = word.to_ascii_uppercase();
        let save = self.pos;
        self.skip_whitespace();
        let followed_by_paren = self.peek_at(0) == Some(b'(');
        if followed_by_paren {
            if let Some(arity) = self.catalog.arity(&upper) {
                return Ok(TokenKind::Function {
                    name: upper,
                    arity,
                });
            }
        }
        self.pos = save;
        Ok(TokenKind::Variable(word.to_string()))
    }
}

fn utf8_len(lead: u8) -> usize {
    if lead & 0b1000_0000 == 0 {
        1
    } else if lead & 0b1110_0000 == 0b1100_0000 {
        2
    } else if lead & 0b1111_0000 == 0b1110_0000 {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetformula_common::NoFunctions;

    fn toks(src: &str) -> Vec<TokenKind> {
        Lexer::new(src, &NoFunctions)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scientific_notation_folds_at_scan_time() {
        assert_eq!(toks("1e2"), vec![TokenKind::Number(100.0)]);
        assert_eq!(toks("2e-1"), vec![TokenKind::Number(0.2)]);
    }

    #[test]
    fn bare_e_without_digit_lookahead_is_a_variable() {
        assert_eq!(toks("5(e)"), vec![
            TokenKind::Number(5.0),
            TokenKind::LParen,
            TokenKind::Variable("e".into()),
            TokenKind::RParen,
        ]);
    }

    #[test]
    fn cell_reference_anchors() {
        assert_eq!(toks("A1"), vec![TokenKind::RelCell(CellRef::new(1, 1, false, false))]);
        assert_eq!(toks("$A$1"), vec![TokenKind::AbsCell(CellRef::new(1, 1, true, true))]);
        assert_eq!(toks("$A1"), vec![TokenKind::MixedCell(CellRef::new(1, 1, true, false))]);
        assert_eq!(toks("A$1"), vec![TokenKind::MixedCell(CellRef::new(1, 1, false, true))]);
    }

    #[test]
    fn unregistered_name_is_a_variable_even_before_paren() {
        assert_eq!(toks("foo(1)"), vec![
            TokenKind::Variable("foo".into()),
            TokenKind::LParen,
            TokenKind::Number(1.0),
            TokenKind::RParen,
        ]);
    }

    #[test]
    fn unrecognised_character_is_a_lex_error() {
        assert!(Lexer::new("@", &NoFunctions).tokenize().is_err());
    }

    #[test]
    fn string_literal_with_escape() {
        assert_eq!(
            toks(r#""a\"b""#),
            vec![TokenKind::String("a\"b".to_string())]
        );
    }

    #[test]
    fn error_literal() {
        assert_eq!(
            toks("#DIV/0!"),
            vec![TokenKind::XlError(ExcelError::Div0)]
        );
    }
}
