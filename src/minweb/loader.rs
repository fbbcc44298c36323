//! Document loading
//!
//! [`DocumentLoader`] is the entry point for running the processor over a whole document.
//! It knows where the document comes from and how its includes are resolved. Every
//! operation starts a fresh processor run, so one loader can produce several reports.
//!
//! ```ignore
//! let loader = DocumentLoader::from_path("docs/samples/hello.mw").with_search_path("lib");
//! let code = loader.tangle(Some("hello.c"))?;
//! let files = loader.list_files()?;
//! ```

use crate::minweb::config::MinwebConfig;
use crate::minweb::consumers::{Extractor, FileLister, SectionLister, Tracer};
use crate::minweb::includes::{IncludePolicy, IncludeResolver, Including};
use crate::minweb::lexing::{InputSource, Lexer, Token, ROOT_MACRO_NAME};
use crate::minweb::processor::{EventSink, Processor, ProcessorError};
use crate::minweb::tangle::{MacroTable, TangleBuilder, TangleError};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("file '{}' could not be opened: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Processor(#[from] ProcessorError),

    #[error(transparent)]
    Tangle(#[from] TangleError),
}

#[derive(Debug, Clone)]
enum Document {
    Path(PathBuf),
    Text { name: String, text: String },
}

/// A document together with the settings used to process it.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    document: Document,
    resolver: IncludeResolver,
    default_root: String,
}

impl DocumentLoader {
    /// Load from a file. Its directory is searched for includes before any other.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::new(Document::Path(path), vec![dir])
    }

    pub fn from_string(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            Document::Text {
                name: name.into(),
                text: text.into(),
            },
            Vec::new(),
        )
    }

    fn new(document: Document, search_paths: Vec<PathBuf>) -> Self {
        DocumentLoader {
            document,
            resolver: IncludeResolver::new(search_paths, IncludePolicy::default()),
            default_root: ROOT_MACRO_NAME.to_string(),
        }
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolver.push_search_path(path);
        self
    }

    pub fn with_policy(mut self, policy: IncludePolicy) -> Self {
        self.resolver = IncludeResolver::new(self.resolver.search_paths().to_vec(), policy);
        self
    }

    /// Apply configured search paths, include policy and default root.
    pub fn with_config(mut self, config: &MinwebConfig) -> Self {
        for path in &config.includes.search_paths {
            self.resolver.push_search_path(path.clone());
        }
        self.default_root = config.tangle.default_root.clone();
        self.with_policy(config.includes.policy)
    }

    pub fn name(&self) -> String {
        match &self.document {
            Document::Path(path) => path.display().to_string(),
            Document::Text { name, .. } => name.clone(),
        }
    }

    fn open(&self) -> Result<InputSource, LoaderError> {
        match &self.document {
            Document::Path(path) => InputSource::from_path(path).map_err(|source| LoaderError::Io {
                path: path.clone(),
                source,
            }),
            Document::Text { name, text } => Ok(InputSource::from_string(name.as_str(), text)),
        }
    }

    /// Run the processor with includes resolved, returning the sink afterwards.
    pub fn run<S: EventSink>(&self, sink: S) -> Result<S, LoaderError> {
        let mut including = Including::new(self.resolver.clone(), sink);
        Processor::new(self.open()?).run_with(&mut including)?;
        Ok(including.into_inner())
    }

    /// Tokens of the document itself. Include directives are not followed.
    pub fn tokens(&self) -> Result<Vec<Token>, LoaderError> {
        Ok(Lexer::new(self.open()?).tokenize())
    }

    pub fn macro_table(&self) -> Result<MacroTable, LoaderError> {
        Ok(self.run(TangleBuilder::new())?.into_table())
    }

    /// Expand `root`, or the configured default root.
    pub fn tangle(&self, root: Option<&str>) -> Result<String, LoaderError> {
        let table = self.macro_table()?;
        Ok(table.evaluate(root.unwrap_or(&self.default_root))?)
    }

    pub fn list_files(&self) -> Result<Vec<String>, LoaderError> {
        Ok(self.run(FileLister::new())?.into_files())
    }

    pub fn list_sections(&self) -> Result<Vec<String>, LoaderError> {
        Ok(self.run(SectionLister::new())?.into_sections())
    }

    /// `key=value` lines for the assignments of `section`.
    pub fn extract(&self, section: &str) -> Result<String, LoaderError> {
        Ok(self.run(Extractor::new(section))?.render())
    }

    pub fn trace(&self) -> Result<String, LoaderError> {
        Ok(self.run(Tracer::new())?.into_output())
    }
}
