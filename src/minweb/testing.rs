//! Testing utilities
//!
//! Tests that depend on document structure should load one of the verified sample
//! documents under `docs/samples` instead of spelling a document out inline. The grammar is
//! small but easy to get subtly wrong in a string literal (a stray `>` or `#[` changes the
//! token stream), and the samples are reviewed as documents.
//!
//! Available samples:
//! - `hello.mw`: every macro kind, substitutions and an include of `greeting.mw`
//! - `greeting.mw`: the included part of `hello.mw`
//! - `cycle.mw`: two macros that reference each other
//! - `dangling.mw`: a macro end with no macro begin
//!
//! Text output is compared with [`assert_text_eq`], which reports differences line by
//! line.

pub mod text_diff;

pub use text_diff::{assert_text_eq, diff_text};

use crate::minweb::loader::DocumentLoader;
use std::fs;
use std::path::PathBuf;

/// Access to the sample documents shipped with the crate.
pub struct Samples;

impl Samples {
    pub fn dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("docs")
            .join("samples")
    }

    pub fn path(name: &str) -> PathBuf {
        Self::dir().join(name)
    }

    /// Contents of a sample. Panics if it does not exist.
    pub fn get_string(name: &str) -> String {
        let path = Self::path(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read sample {}: {}", path.display(), e))
    }

    /// A loader for a sample, with includes resolved from the samples directory.
    pub fn loader(name: &str) -> DocumentLoader {
        DocumentLoader::from_path(Self::path(name))
    }
}
