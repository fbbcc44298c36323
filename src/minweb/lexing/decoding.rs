//! Decoders for matched token text
//!
//! The lexer only checks that a token's delimiters line up. These functions split the raw
//! text of a matched token into its meaningful parts. They are pure and can be called on any
//! string; text that does not carry the expected markers is a `DecodeError` reporting the
//! offending text. Decode failures are the only errors of the lexing layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Name of the root macro, `<<*>>=`.
pub const ROOT_MACRO_NAME: &str = "*";

/// Errors raised while decoding token text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed macro statement '{0}'")]
    MalformedMacroStart(String),
    #[error("malformed macro reference '{0}'")]
    MalformedMacroReference(String),
    #[error("malformed text substitution '{0}'")]
    MalformedSubstitution(String),
    #[error("malformed special directive '{0}'")]
    MalformedDirective(String),
    #[error("unsupported directive type '{0}'")]
    UnsupportedDirective(String),
}

/// The kind of a macro, from the prefix inside its start delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MacroKind {
    /// `<<name>>=`, or any prefix that is not recognized
    Default,
    /// `<<FILE:name>>=`
    File,
    /// `<<SECTION:name>>=`
    Section,
    /// `<<*>>=`
    Root,
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MacroKind::Default => "default",
            MacroKind::File => "file",
            MacroKind::Section => "section",
            MacroKind::Root => "root",
        };
        f.write_str(name)
    }
}

/// A decoded `%[...]%` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Substitution {
    /// `%[key]%`
    Default(String),
    /// `%[key=value]%`, split at the first `=`
    Assignment { key: String, value: String },
}

impl Substitution {
    pub fn key(&self) -> &str {
        match self {
            Substitution::Default(key) => key,
            Substitution::Assignment { key, .. } => key,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Substitution::Default(_) => None,
            Substitution::Assignment { value, .. } => Some(value),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Substitution::Default(_) => "default",
            Substitution::Assignment { .. } => "assignment",
        }
    }
}

/// A decoded `#[key=value]` directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    Include(String),
    Language(String),
}

impl Directive {
    pub fn value(&self) -> &str {
        match self {
            Directive::Include(value) | Directive::Language(value) => value,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Directive::Include(_) => "include",
            Directive::Language(_) => "language",
        }
    }
}

/// Strip `prefix` and `suffix` from `text`, requiring at least `prefix + suffix` bytes.
fn inner<'a>(text: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    if text.len() < prefix.len() + suffix.len() {
        return None;
    }
    text.strip_prefix(prefix)?.strip_suffix(suffix)
}

/// Decode `<<INNER>>=` into a macro kind and name.
pub fn decode_macro_start(text: &str) -> Result<(MacroKind, String), DecodeError> {
    let inner = inner(text, "<<", ">>=")
        .ok_or_else(|| DecodeError::MalformedMacroStart(text.to_string()))?;
    if inner == ROOT_MACRO_NAME {
        return Ok((MacroKind::Root, inner.to_string()));
    }
    let decoded = match inner.split_once(':') {
        Some(("FILE", name)) => (MacroKind::File, name.to_string()),
        Some(("SECTION", name)) => (MacroKind::Section, name.to_string()),
        _ => (MacroKind::Default, inner.to_string()),
    };
    Ok(decoded)
}

/// Decode `%[INNER]%`.
pub fn decode_substitution(text: &str) -> Result<Substitution, DecodeError> {
    let inner = inner(text, "%[", "]%")
        .ok_or_else(|| DecodeError::MalformedSubstitution(text.to_string()))?;
    Ok(match inner.split_once('=') {
        Some((key, value)) => Substitution::Assignment {
            key: key.to_string(),
            value: value.to_string(),
        },
        None => Substitution::Default(inner.to_string()),
    })
}

/// Decode `<<INNER>>` into the referenced name, verbatim.
pub fn decode_macro_reference(text: &str) -> Result<String, DecodeError> {
    inner(text, "<<", ">>")
        .map(str::to_string)
        .ok_or_else(|| DecodeError::MalformedMacroReference(text.to_string()))
}

/// Decode `#[KEY=VALUE]`. Only `include` and `language` keys are supported.
pub fn decode_directive(text: &str) -> Result<Directive, DecodeError> {
    let (key, value) = inner(text, "#[", "]")
        .filter(|_| text.len() >= 4)
        .and_then(|inner| inner.split_once('='))
        .ok_or_else(|| DecodeError::MalformedDirective(text.to_string()))?;
    match key {
        "include" => Ok(Directive::Include(value.to_string())),
        "language" => Ok(Directive::Language(value.to_string())),
        _ => Err(DecodeError::UnsupportedDirective(text.to_string())),
    }
}
