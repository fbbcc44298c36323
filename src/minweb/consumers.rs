//! Event consumers behind the command-line tools
//!
//! Each consumer is an [`EventSink`] that subscribes to the few events it needs and turns
//! them into a small report. Includes are handled by wrapping a consumer in
//! [`Including`](crate::minweb::includes::Including).

use crate::minweb::includes::IncludeError;
use crate::minweb::lexing::{Directive, MacroKind, Substitution};
use crate::minweb::processor::{EventSink, InputStack};
use std::collections::BTreeSet;

/// Names of all `FILE:` macros, sorted and without duplicates.
#[derive(Debug, Default)]
pub struct FileLister {
    files: BTreeSet<String>,
}

impl FileLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_files(self) -> Vec<String> {
        self.files.into_iter().collect()
    }
}

impl EventSink for FileLister {
    fn macro_begin(&mut self, kind: MacroKind, name: &str) {
        if kind == MacroKind::File {
            self.files.insert(name.to_string());
        }
    }
}

/// Names of all `SECTION:` macros, in the order they begin.
#[derive(Debug, Default)]
pub struct SectionLister {
    sections: Vec<String>,
}

impl SectionLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_sections(self) -> Vec<String> {
        self.sections
    }
}

impl EventSink for SectionLister {
    fn macro_begin(&mut self, kind: MacroKind, name: &str) {
        if kind == MacroKind::Section {
            self.sections.push(name.to_string());
        }
    }
}

/// Collects the `%[key=value]%` assignments made inside one named section.
///
/// Every body of the section contributes; plain `%[key]%` placeholders are skipped.
#[derive(Debug)]
pub struct Extractor {
    section: String,
    inside: bool,
    assignments: Vec<(String, String)>,
}

impl Extractor {
    pub fn new(section: impl Into<String>) -> Self {
        Extractor {
            section: section.into(),
            inside: false,
            assignments: Vec::new(),
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn assignments(&self) -> &[(String, String)] {
        &self.assignments
    }

    /// One `key=value` line per assignment.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.assignments {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

impl EventSink for Extractor {
    fn macro_begin(&mut self, kind: MacroKind, name: &str) {
        self.inside = kind == MacroKind::Section && name == self.section;
    }

    fn macro_end(&mut self) {
        self.inside = false;
    }

    fn substitution(&mut self, substitution: &Substitution) {
        if !self.inside {
            return;
        }
        if let Substitution::Assignment { key, value } = substitution {
            self.assignments.push((key.clone(), value.clone()));
        }
    }
}

const TRACE_INDENT: usize = 4;

/// A readable trace of every structural event, one line each.
#[derive(Debug, Default)]
pub struct Tracer {
    out: String,
    indent: usize,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_output(self) -> String {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        self.out.push_str(&format!("{:indent$}{}\n", "", args, indent = self.indent));
    }
}

impl EventSink for Tracer {
    fn macro_begin(&mut self, kind: MacroKind, name: &str) {
        self.line(format_args!("begin macro {} {}", kind, name));
        self.indent += TRACE_INDENT;
    }

    fn macro_end(&mut self) {
        self.indent = self.indent.saturating_sub(TRACE_INDENT);
        self.line(format_args!("end macro"));
    }

    fn macro_reference(&mut self, name: &str) {
        self.line(format_args!("macro ref {}", name));
    }

    fn substitution(&mut self, substitution: &Substitution) {
        match substitution.value() {
            Some(value) => self.line(format_args!(
                "substitution {} {} = {}",
                substitution.kind_name(),
                substitution.key(),
                value
            )),
            None => self.line(format_args!(
                "substitution {} {}",
                substitution.kind_name(),
                substitution.key()
            )),
        }
    }

    fn directive(
        &mut self,
        directive: &Directive,
        _inputs: &mut InputStack,
    ) -> Result<(), IncludeError> {
        self.line(format_args!(
            "directive {} {}",
            directive.kind_name(),
            directive.value()
        ));
        Ok(())
    }
}
