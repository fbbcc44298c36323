//! The minweb scanner
//!
//! `Lexer::read` consumes characters from the current input (pending putback characters
//! first) and returns exactly one token. The recognizers below follow the delimiter grammar
//! with longest-match-with-fallback: whenever a match fails, the characters consumed so far
//! (including the one that broke the match) become a single passthrough token.

use super::source::InputSource;
use super::tokens::{SourcePosition, Token, TokenKind};
use std::collections::VecDeque;

/// The scanning cursor of a lexer: its source, line, column and read-ahead characters.
///
/// The processor takes this out of the lexer to suspend an input and hands it back to
/// resume exactly where scanning stopped.
#[derive(Debug)]
pub struct InputState {
    source: InputSource,
    line: usize,
    column: usize,
    putback: VecDeque<char>,
}

impl InputState {
    /// A cursor at the start of `source`: line 1, column 0, nothing put back.
    pub fn new(source: InputSource) -> Self {
        InputState {
            source,
            line: 1,
            column: 0,
            putback: VecDeque::new(),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn pending(&self) -> impl Iterator<Item = &char> {
        self.putback.iter()
    }
}

/// The minweb lexer
#[derive(Debug)]
pub struct Lexer {
    input: InputState,
    // Text of the token being scanned.
    buffer: String,
    start_line: usize,
    start_column: usize,
}

impl Lexer {
    pub fn new(source: InputSource) -> Lexer {
        Lexer {
            input: InputState::new(source),
            buffer: String::new(),
            start_line: 0,
            start_column: 0,
        }
    }

    /// Read one token. Returns `EndOfInput` repeatedly once the source is exhausted.
    pub fn read(&mut self) -> Token {
        let c = match self.read_char() {
            None => {
                self.buffer.clear();
                self.start_line = self.input.line;
                self.start_column = self.input.column;
                return self.finish(TokenKind::EndOfInput);
            }
            Some(c) => c,
        };
        self.start(c);
        let kind = match c {
            '<' => self.scan_macro_start(),
            '>' => self.scan_macro_end(),
            '%' => self.scan_text_substitution(),
            '#' => self.scan_special_directive(),
            _ => TokenKind::Passthrough,
        };
        self.finish(kind)
    }

    /// Read every remaining token, excluding the final `EndOfInput`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.read();
            if token.is_end_of_input() {
                return tokens;
            }
            tokens.push(token);
        }
    }

    pub fn source_name(&self) -> &str {
        self.input.source_name()
    }

    /// Current line and column of the scanning cursor.
    pub fn line_column(&self) -> (usize, usize) {
        (self.input.line, self.input.column)
    }

    /// Install `state` as the scanning cursor and return the previous one untouched.
    ///
    /// Only call this between tokens; the start-of-token markers are not part of the state.
    pub fn swap_input_state(&mut self, state: InputState) -> InputState {
        std::mem::replace(&mut self.input, state)
    }

    /// Install `state` as the scanning cursor, dropping the current one and its source.
    pub fn set_input_state(&mut self, state: InputState) {
        self.input = state;
    }

    fn read_char(&mut self) -> Option<char> {
        if let Some(c) = self.input.putback.pop_front() {
            return Some(c);
        }
        let c = self.input.source.next_char()?;
        if c == '\n' {
            self.input.line += 1;
            self.input.column = 0;
        } else {
            self.input.column += 1;
        }
        Some(c)
    }

    fn put_back(&mut self, c: char) {
        self.input.putback.push_back(c);
    }

    fn start(&mut self, c: char) {
        self.start_line = self.input.line;
        self.start_column = self.input.column;
        self.buffer.clear();
        self.accept(c);
    }

    fn accept(&mut self, c: char) {
        self.buffer.push(c);
    }

    /// Abandon the current match. The offending character stays part of the token.
    fn fallback(&mut self, c: Option<char>) -> TokenKind {
        if let Some(c) = c {
            self.accept(c);
        }
        TokenKind::Passthrough
    }

    fn finish(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            text: self.buffer.clone(),
            position: SourcePosition::from_start(
                self.input.source_name(),
                self.start_line,
                self.start_column,
                self.buffer.chars().count(),
            ),
        }
    }

    /// Match `c` against `expected`, accepting it on success.
    fn expect(&mut self, expected: char) -> Result<(), Option<char>> {
        match self.read_char() {
            Some(c) if c == expected => {
                self.accept(c);
                Ok(())
            }
            other => Err(other),
        }
    }

    /// `<<name>>=` or `<<name>>`; the leading `<` has been accepted.
    ///
    /// The name needs at least one character that is not `>`. A newline is refused as well,
    /// also as the very first name character, so a macro token never spans lines.
    fn scan_macro_start(&mut self) -> TokenKind {
        if let Err(c) = self.expect('<') {
            return self.fallback(c);
        }
        match self.read_char() {
            c @ (None | Some('>') | Some('\n')) => return self.fallback(c),
            Some(c) => self.accept(c),
        }
        loop {
            match self.read_char() {
                c @ (None | Some('\n')) => return self.fallback(c),
                Some('>') => {
                    self.accept('>');
                    break;
                }
                Some(c) => self.accept(c),
            }
        }
        if let Err(c) = self.expect('>') {
            return self.fallback(c);
        }
        match self.read_char() {
            Some('=') => {
                self.accept('=');
                TokenKind::MacroStart
            }
            None => TokenKind::MacroReference,
            Some(c) => {
                self.put_back(c);
                TokenKind::MacroReference
            }
        }
    }

    // `>>@<<`; the leading `>` has been accepted.
    fn scan_macro_end(&mut self) -> TokenKind {
        for expected in ['>', '@', '<', '<'] {
            if let Err(c) = self.expect(expected) {
                return self.fallback(c);
            }
        }
        TokenKind::MacroEnd
    }

    // `%[inner]%`; the leading `%` has been accepted.
    fn scan_text_substitution(&mut self) -> TokenKind {
        if let Err(c) = self.expect('[') {
            return self.fallback(c);
        }
        if let Err(c) = self.accept_run_until(']') {
            return self.fallback(c);
        }
        if let Err(c) = self.expect('%') {
            return self.fallback(c);
        }
        TokenKind::TextSubstitution
    }

    // `#[key=value]`; the leading `#` has been accepted.
    fn scan_special_directive(&mut self) -> TokenKind {
        if let Err(c) = self.expect('[') {
            return self.fallback(c);
        }
        if let Err(c) = self.accept_run_until('=') {
            return self.fallback(c);
        }
        if let Err(c) = self.accept_run_until(']') {
            return self.fallback(c);
        }
        TokenKind::SpecialDirective
    }

    /// Accept at least one character other than `end`, then everything up to and
    /// including `end`. End of input anywhere is a failure.
    fn accept_run_until(&mut self, end: char) -> Result<(), Option<char>> {
        match self.read_char() {
            None => return Err(None),
            Some(c) if c == end => return Err(Some(c)),
            Some(c) => self.accept(c),
        }
        loop {
            match self.read_char() {
                None => return Err(None),
                Some(c) => {
                    self.accept(c);
                    if c == end {
                        return Ok(());
                    }
                }
            }
        }
    }
}
