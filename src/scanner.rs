//! Module `scanner` implements a one‑pass, streaming, *modal* lexer for the
//! Lumen language.
//!
//! It transforms a byte slice (`&[u8]`) into a sequence of [`Token`]s,
//! skipping whitespace and comments, and emitting exactly one `EOF` token at
//! the end. Designed as a `FusedIterator`, it can be chained safely with
//! other iterator adapters.
//!
//! # Modes
//!
//! String interpolation makes the lexer *modal*: what a byte means depends on
//! whether we are inside a string. A small mode stack tracks this:
//!
//! - **Main** — ordinary code. `"` pushes **Str** and emits `STRING_START`.
//! - **Str** — inside a string. Literal runs become `STRING_LIT` fragments,
//!   `%{` pushes **Interp** and emits `STRING_INT_START`, `"` pops back to
//!   the enclosing mode and emits `STRING_END`. A lone `%` is a literal.
//! - **Interp** — inside `%{ … }`. Tokens are scanned exactly as in Main,
//!   except a bare `}` pops the mode and emits `STRING_INT_END`. A nested
//!   string inside the interpolation pushes **Str** again.
//!
//! So `"hi %{name}!"` lexes to: `STRING_START`, `STRING_LIT("hi ")`,
//! `STRING_INT_START`, `IDENTIFIER(name)`, `STRING_INT_END`,
//! `STRING_LIT("!")`, `STRING_END`.
//!
//! # Core phases
//!
//! 1. On each `next()`, reset `start` and `pending`, then dispatch on the
//!    current mode.
//! 2. Whitespace and comments (`//` to end of line, `/* … */` blocks) are
//!    skipped without setting `pending`.
//! 3. On recognizing a lexeme, set `pending = Some(TokenType)` and return a
//!    `Token::new(...)`.
//! 4. At EOF, emit one `EOF` token then return `None`. Reaching EOF with a
//!    string still open is a lexical error.
//!
//! # Performance notes
//!
//! - Bulk line‑comment skipping via `memchr`.
//! - `#[inline(always)]` on hot path helpers.
//! - Keywords resolved through a compile‑time perfect‑hash map (`phf`).

use crate::error::{LumenError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"break"  => TokenType::BREAK,
    b"class"  => TokenType::CLASS,
    b"elif"   => TokenType::ELIF,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Lexing mode; see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Main,
    Str,
    Interp,
}

/// A single‑pass **modal scanner** that converts raw UTF‑8 bytes into a
/// sequence of owned [`Token`]s. The lifetime `'a` only ties the scanner to
/// the source buffer; emitted tokens copy their lexemes out.
pub struct Scanner<'a> {
    src: &'a [u8],              // entire source buffer
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    line: usize,                // 1‑based line counter (\n increments)
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
    modes: Vec<Mode>,           // mode stack; bottom element is always Main
}

impl<'a> Scanner<'a> {
    /// Create a new scanner over `src`.
    #[inline]
    pub fn new(src: &'a [u8]) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
            modes: vec![Mode::Main],
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    /// Return the length of the input slice.
    #[inline(always)]
    const fn len(&self) -> usize {
        self.src.len()
    }

    /// Are we at (or past) the end of input?
    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it. *Panics* if called at EOF – higher‑level
    /// code always guards with [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it. Returns `0` if past EOF
    /// to avoid branching at call‑site.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.curr]
        }
    }

    /// Peek one byte beyond [`Self::peek`]. Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.src[self.curr + 1]
        }
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    /// Returns `true` on success so callers can branch inline without an else.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Current mode (top of the stack).
    #[inline(always)]
    fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Main)
    }

    /// The lexeme scanned so far, copied out of the buffer.
    #[inline(always)]
    fn lexeme(&self) -> String {
        String::from_utf8_lossy(&self.src[self.start..self.curr]).into_owned()
    }

    // ───────────────────────────── main‑mode lexing ─────────────────────────

    /// Scan a *single* token starting at `self.curr`. If the lexeme produces
    /// an actual token the kind is stored in `self.pending`. Whitespace and
    /// comments are skipped by returning `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            // ── single‑character punctuators ──────────────────────────────
            b'(' => self.pending = Some(TokenType::LEFT_PAREN),
            b')' => self.pending = Some(TokenType::RIGHT_PAREN),
            b'{' => self.pending = Some(TokenType::LEFT_BRACE),
            b'}' => self.pending = Some(TokenType::RIGHT_BRACE),
            b'[' => self.pending = Some(TokenType::LEFT_SQUARE),
            b']' => self.pending = Some(TokenType::RIGHT_SQUARE),
            b',' => self.pending = Some(TokenType::COMMA),
            b'.' => self.pending = Some(TokenType::DOT),
            b'-' => self.pending = Some(TokenType::MINUS),
            b'+' => self.pending = Some(TokenType::PLUS),
            b';' => self.pending = Some(TokenType::SEMICOLON),
            b'*' => self.pending = Some(TokenType::STAR),
            b'%' => self.pending = Some(TokenType::MODULO),

            // ── two‑character operators (!=, ==, <=, >=) ─────────────────
            b'!' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::BANG_EQUAL
                } else {
                    TokenType::BANG
                };

                self.pending = Some(tt);
            }

            b'=' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else {
                    TokenType::EQUAL
                };

                self.pending = Some(tt);
            }

            b'<' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };

                self.pending = Some(tt);
            }

            b'>' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };

                self.pending = Some(tt);
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => {
                return Ok(()); // skip insignificants
            }

            b'\n' => {
                self.line += 1; // track for diagnostics

                return Ok(());
            }

            // ── comments (// … until newline, /* … */ blocks) ────────────
            b'/' => {
                if self.match_byte(b'/') {
                    // Fast‑forward to the next newline using `memchr`.
                    // If none found, skip to EOF.
                    if let Some(pos) = memchr(b'\n', &self.src[self.curr..]) {
                        self.curr += pos;
                    } else {
                        self.curr = self.len();
                    }

                    return Ok(());
                }

                if self.match_byte(b'*') {
                    loop {
                        if self.is_at_end() {
                            return Err(LumenError::lex(self.line, "Unterminated block comment."));
                        }

                        if self.peek() == b'*' && self.peek_next() == b'/' {
                            self.curr += 2; // consume "*/"
                            break;
                        }

                        if self.advance() == b'\n' {
                            self.line += 1;
                        }
                    }

                    return Ok(());
                }

                self.pending = Some(TokenType::SLASH);
            }

            // ── string start: switch into string mode ────────────────────
            b'"' => {
                self.pending = Some(TokenType::STRING_START);
                self.modes.push(Mode::Str);
            }

            // ── number literal (digit‑leading) ───────────────────────────
            b'0'..=b'9' => {
                self.parse_number();
            }

            // ── identifiers / keywords (alpha or underscore‑leading) ─────
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.parse_identifier();
            }

            // ── unexpected character ─────────────────────────────────────
            _ => {
                return Err(LumenError::lex(
                    self.line,
                    format!("Unexpected character: {}", b as char),
                ));
            }
        }

        Ok(())
    }

    /// Parse a numeric literal (`123`, `3.14`). Fractions are optional.
    fn parse_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // Optional fractional part.
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let s: String = self.lexeme();
        let n: f64 = s.parse::<f64>().unwrap_or(0.0); // parse never fails (checked digits)
        self.pending = Some(TokenType::NUMBER(n));
    }

    /// Parse an identifier and decide if it is a **keyword** or a generic
    /// `IDENTIFIER` token.
    fn parse_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let slice: &[u8] = &self.src[self.start..self.curr];

        let tt: TokenType = KEYWORDS
            .get(slice)
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER);

        self.pending = Some(tt);
    }

    // ───────────────────────────── string‑mode lexing ───────────────────────

    /// Scan the next piece of an in‑progress string: a literal fragment, the
    /// start of an interpolation, or the closing quote.
    fn scan_string_part(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            b'"' => {
                self.pending = Some(TokenType::STRING_END);
                self.modes.pop();
            }

            b'%' if self.peek() == b'{' => {
                self.advance(); // consume "{"
                self.pending = Some(TokenType::STRING_INT_START);
                self.modes.push(Mode::Interp);
            }

            // A '%' not followed by '{' is ordinary string content.
            b'%' => {
                self.pending = Some(TokenType::STRING_LIT("%".to_string()));
            }

            _ => {
                if b == b'\n' {
                    self.line += 1; // strings may span lines
                }

                while !self.is_at_end() && self.peek() != b'"' && self.peek() != b'%' {
                    if self.advance() == b'\n' {
                        self.line += 1;
                    }
                }

                if self.is_at_end() {
                    return Err(LumenError::lex(self.line, "Unterminated string."));
                }

                self.pending = Some(TokenType::STRING_LIT(self.lexeme()));
            }
        }

        Ok(())
    }

    /// Scan one token inside `%{ … }`. Everything behaves as in main mode
    /// except a bare `}` closes the interpolation.
    fn scan_interpolation(&mut self) -> Result<()> {
        if self.peek() == b'}' {
            self.advance();
            self.pending = Some(TokenType::STRING_INT_END);
            self.modes.pop();

            return Ok(());
        }

        self.scan_token()
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>; // alias = Result<T, LumenError>

    fn next(&mut self) -> Option<Self::Item> {
        // Loop until we either emit a token, hit EOF, or see an error.
        while self.curr <= self.len() {
            // 1. EOF guard – emit exactly one EOF then terminate.
            if self.curr == self.len() {
                self.curr += 1; // ensure fused semantics

                if self.modes.len() > 1 {
                    return Some(Err(LumenError::lex(self.line, "Unterminated string.")));
                }

                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            // 2. Reset per‑token state.
            self.start = self.curr;
            self.pending = None;

            // 3. Attempt to scan a token in the current mode.
            let step = match self.mode() {
                Mode::Main => self.scan_token(),
                Mode::Str => self.scan_string_part(),
                Mode::Interp => self.scan_interpolation(),
            };

            if let Err(e) = step {
                return Some(Err(e));
            }

            // 4. If a real token was recognised, build and return it.
            if let Some(tt) = self.pending.take() {
                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                return Some(Ok(Token::new(tt, self.lexeme(), self.line)));
            }
            // Otherwise it was whitespace / comment → continue loop.
        }

        None // already yielded EOF
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan an entire source buffer into a token vector, failing on the first
/// lexical error. Convenience entry point for the driver and tests.
pub fn scan_all(src: &[u8]) -> Result<Vec<Token>> {
    Scanner::new(src).collect()
}
