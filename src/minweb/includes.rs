//! Include resolution
//!
//! `#[include=path]` directives are resolved against an ordered list of search
//! directories. [`IncludeResolver`] opens the target and hands it to the processor through
//! [`InputStack::include_stream`]; the processor's frame stack then owns the opened source
//! until it has been scanned to the end.
//!
//! [`Including`] wraps another [`EventSink`], resolving includes first and then forwarding
//! every event, the directive included, to the wrapped sink.

use crate::minweb::lexing::{Directive, InputSource, MacroKind, Substitution};
use crate::minweb::processor::{EventSink, InputStack};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while resolving an include directive
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("could not find '{path}' in any include directory (searched {})", display_paths(.searched))]
    NotFound { path: String, searched: Vec<PathBuf> },

    #[error("could not open '{}' for reading: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is already being included ({})", .path.display(), .chain.join(" -> "))]
    Recursive { path: PathBuf, chain: Vec<String> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// How many search directories may contribute a file for one include directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncludePolicy {
    /// Include the file from the first directory that has it.
    #[default]
    FirstMatch,
    /// Include the file from every directory that has it. Each inclusion suspends the one
    /// before it, so the match found last is scanned first.
    EveryMatch,
}

impl IncludePolicy {
    /// Parse the kebab-case name used in configuration files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first-match" => Some(IncludePolicy::FirstMatch),
            "every-match" => Some(IncludePolicy::EveryMatch),
            _ => None,
        }
    }
}

/// Resolves include directives against search directories
#[derive(Debug, Clone, Default)]
pub struct IncludeResolver {
    search_paths: Vec<PathBuf>,
    policy: IncludePolicy,
}

impl IncludeResolver {
    pub fn new(search_paths: Vec<PathBuf>, policy: IncludePolicy) -> Self {
        IncludeResolver {
            search_paths,
            policy,
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Append a directory to the end of the search list.
    pub fn push_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Put a directory at the front of the search list.
    pub fn prepend_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.insert(0, path.into());
    }

    /// Candidate files for `path`, in search order, honoring the policy.
    pub fn resolve(&self, path: &str) -> Result<Vec<PathBuf>, IncludeError> {
        let mut found = Vec::new();
        for dir in &self.search_paths {
            let candidate = dir.join(path);
            if candidate.is_file() {
                found.push(candidate);
                if self.policy == IncludePolicy::FirstMatch {
                    break;
                }
            }
        }
        if found.is_empty() {
            return Err(IncludeError::NotFound {
                path: path.to_string(),
                searched: self.search_paths.clone(),
            });
        }
        Ok(found)
    }

    /// Handle one directive. Anything but an include is ignored.
    pub fn handle(
        &self,
        directive: &Directive,
        inputs: &mut InputStack,
    ) -> Result<(), IncludeError> {
        let Directive::Include(path) = directive else {
            return Ok(());
        };
        let candidates = self.resolve(path)?;
        let active: Vec<&str> = inputs
            .suspended_sources()
            .chain(std::iter::once(inputs.current_source()))
            .collect();
        for candidate in &candidates {
            let Some(target) = canonical(candidate) else {
                continue;
            };
            let seen = active
                .iter()
                .any(|name| canonical(Path::new(name)).as_ref() == Some(&target));
            if seen {
                let mut chain: Vec<String> = active.iter().map(|name| name.to_string()).collect();
                chain.push(candidate.display().to_string());
                return Err(IncludeError::Recursive {
                    path: candidate.clone(),
                    chain,
                });
            }
        }
        for candidate in candidates {
            inputs.include_stream(open(&candidate)?);
        }
        Ok(())
    }
}

/// Sources named after files that no longer resolve are never treated as the same file.
fn canonical(path: &Path) -> Option<PathBuf> {
    path.canonicalize().ok()
}

fn open(path: &Path) -> Result<InputSource, IncludeError> {
    InputSource::from_path(path).map_err(|source| IncludeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// An event sink that resolves includes before passing events on to `inner`.
#[derive(Debug)]
pub struct Including<S> {
    resolver: IncludeResolver,
    inner: S,
}

impl<S: EventSink> Including<S> {
    pub fn new(resolver: IncludeResolver, inner: S) -> Self {
        Including { resolver, inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EventSink> EventSink for Including<S> {
    fn passthrough(&mut self, text: &str) {
        self.inner.passthrough(text)
    }

    fn macro_begin(&mut self, kind: MacroKind, name: &str) {
        self.inner.macro_begin(kind, name)
    }

    fn macro_end(&mut self) {
        self.inner.macro_end()
    }

    fn macro_reference(&mut self, name: &str) {
        self.inner.macro_reference(name)
    }

    fn substitution(&mut self, substitution: &Substitution) {
        self.inner.substitution(substitution)
    }

    fn directive(
        &mut self,
        directive: &Directive,
        inputs: &mut InputStack,
    ) -> Result<(), IncludeError> {
        self.resolver.handle(directive, inputs)?;
        self.inner.directive(directive, inputs)
    }
}
