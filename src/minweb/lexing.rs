//! Lexer
//!
//! This module turns a character stream into classified minweb tokens.
//!
//! Structure:
//!     The scanner is hand-rolled and character based. Every recognizer starts on a
//! trigger character (`<`, `>`, `%`, `#`) and tries to match one delimiter. A match that
//! fails partway through degrades into a passthrough token holding exactly the characters
//! consumed so far, so the lexer never reports an error and every input character shows up
//! in exactly one token.
//!
//! The pieces are:
//! 1. `source`: named, owned character sources (`InputSource`)
//! 2. `tokens`: the token type and its source positions
//! 3. `scanner`: the `Lexer` itself, with putback and saveable input state
//! 4. `decoding`: pure functions that split a matched token's raw text into its parts
//!
//! Input switching
//!
//!     The processor suspends one input and scans another when it honors an include
//!     directive. The lexer supports this by handing out its whole scanning cursor (source,
//!     line, column and pending putback characters) as an `InputState` value and accepting
//!     one back later. Decoding is deferred: a token only needs to match the delimiter
//!     brackets to be produced, and structural validity of its contents is checked when the
//!     processor decodes it.

pub mod decoding;
pub mod scanner;
pub mod source;
pub mod tokens;

pub use decoding::{
    decode_directive, decode_macro_reference, decode_macro_start, decode_substitution,
    DecodeError, Directive, MacroKind, Substitution, ROOT_MACRO_NAME,
};
pub use scanner::{InputState, Lexer};
pub use source::InputSource;
pub use tokens::{SourcePosition, Token, TokenKind};

/// Scan a whole string into tokens, stopping before end of input.
pub fn tokenize(name: &str, text: &str) -> Vec<Token> {
    Lexer::new(InputSource::from_string(name, text)).tokenize()
}

/// Reassemble raw token text. For any input `s`, `detokenize(&tokenize(n, s)) == s`.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_small_document() {
        let tokens = tokenize("doc", "a<<x>>=b>>@<<");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Passthrough,
                TokenKind::MacroStart,
                TokenKind::Passthrough,
                TokenKind::MacroEnd,
            ]
        );
    }

    #[test]
    fn test_detokenize_restores_malformed_input() {
        let input = "<<broken\n%[open #[k= >>@< <<ok>>";
        assert_eq!(detokenize(&tokenize("doc", input)), input);
    }
}
