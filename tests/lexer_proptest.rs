//! Property-based tests for the minweb lexer
//!
//! The input strategy is biased towards delimiter characters so that partial and
//! overlapping delimiters are exercised far more often than plain prose would.

use minweb::minweb::lexing::{
    decode_macro_reference, decode_macro_start, detokenize, tokenize, MacroKind, TokenKind,
};
use minweb::minweb::testing::Samples;
use proptest::prelude::*;

fn delimiter_heavy_text() -> impl Strategy<Value = String> {
    "[<>@=%#\\[\\]:*a-c \n]{0,80}"
}

fn macro_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_. ]{1,16}"
}

proptest! {
    #[test]
    fn test_tokens_cover_the_input(input in delimiter_heavy_text()) {
        let tokens = tokenize("prop", &input);
        prop_assert_eq!(detokenize(&tokens), input);
    }

    #[test]
    fn test_no_token_is_empty(input in delimiter_heavy_text()) {
        for token in tokenize("prop", &input) {
            prop_assert!(!token.text.is_empty());
        }
    }

    #[test]
    fn test_macro_tokens_never_span_lines(input in delimiter_heavy_text()) {
        for token in tokenize("prop", &input) {
            if matches!(token.kind, TokenKind::MacroStart | TokenKind::MacroReference) {
                prop_assert!(!token.text.contains('\n'), "token {:?}", token);
            }
        }
    }

    #[test]
    fn test_positions_are_on_one_line(input in delimiter_heavy_text()) {
        for token in tokenize("prop", &input) {
            prop_assert_eq!(token.position.start_line, token.position.end_line);
            prop_assert!(token.position.end_column >= token.position.start_column);
        }
    }

    #[test]
    fn test_bare_reference_decodes_to_its_name(name in macro_name()) {
        let text = format!("<<{}>>", name);
        let tokens = tokenize("prop", &text);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::MacroReference);
        prop_assert_eq!(decode_macro_reference(&tokens[0].text).unwrap(), name);
    }

    #[test]
    fn test_macro_start_decodes_to_default_kind(name in macro_name()) {
        let text = format!("<<{}>>=", name);
        let tokens = tokenize("prop", &text);
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].kind, TokenKind::MacroStart);
        prop_assert_eq!(
            decode_macro_start(&tokens[0].text).unwrap(),
            (MacroKind::Default, name)
        );
    }
}

#[test]
fn test_samples_round_trip() {
    for name in ["hello.mw", "greeting.mw", "cycle.mw", "dangling.mw"] {
        let text = Samples::get_string(name);
        assert_eq!(detokenize(&tokenize(name, &text)), text, "sample {}", name);
    }
}
