//! Token definitions for the minweb lexer
//!
//! Tokens are transient: the lexer produces one at a time and the processor consumes it
//! immediately. Each token carries the raw text it matched so that concatenating the text
//! of every token reproduces the input exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token classes recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    EndOfInput,
    /// `<<name>>=`
    MacroStart,
    /// `>>@<<`
    MacroEnd,
    /// `<<name>>` not followed by `=`
    MacroReference,
    /// Any text that is not a recognized delimiter
    Passthrough,
    /// `%[key]%` or `%[key=value]%`
    TextSubstitution,
    /// `#[key=value]`
    SpecialDirective,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::EndOfInput => "end-of-input",
            TokenKind::MacroStart => "macro-start",
            TokenKind::MacroEnd => "macro-end",
            TokenKind::MacroReference => "macro-reference",
            TokenKind::Passthrough => "passthrough",
            TokenKind::TextSubstitution => "text-substitution",
            TokenKind::SpecialDirective => "special-directive",
        };
        write!(f, "<{}>", name)
    }
}

/// Where a token was found.
///
/// Lines start at 1. The column is the counter value after the token's first character
/// was read, so the first character of a line is column 1. Tokens never span lines for
/// position purposes: `end_line` is always `start_line`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub source: String,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourcePosition {
    /// Derive a position from where scanning began and the accumulated text length.
    pub fn from_start(source: &str, line: usize, column: usize, char_count: usize) -> Self {
        SourcePosition {
            source: source.to_string(),
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: (column + char_count).saturating_sub(1).max(column),
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.start_line, self.start_column)
    }
}

/// A classified piece of input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: SourcePosition,
}

impl Token {
    pub fn is_end_of_input(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_start() {
        let position = SourcePosition::from_start("main.mw", 3, 5, 4);
        assert_eq!(position.start_line, 3);
        assert_eq!(position.end_line, 3);
        assert_eq!(position.end_column, 8);
        assert_eq!(position.to_string(), "main.mw:3:5");
    }

    #[test]
    fn test_position_of_empty_text() {
        let position = SourcePosition::from_start("main.mw", 1, 0, 0);
        assert_eq!(position.end_column, 0);
    }

    #[test]
    fn test_token_kind_display() {
        assert_eq!(TokenKind::MacroStart.to_string(), "<macro-start>");
        assert_eq!(TokenKind::EndOfInput.to_string(), "<end-of-input>");
    }

    #[test]
    fn test_token_serializes_kind_in_kebab_case() {
        let token = Token {
            kind: TokenKind::TextSubstitution,
            text: "%[a]%".to_string(),
            position: SourcePosition::from_start("s", 1, 1, 5),
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["kind"], "text-substitution");
        assert_eq!(json["position"]["end_column"], 5);
    }
}
