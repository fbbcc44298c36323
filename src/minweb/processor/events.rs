//! Event subscription for the processor
//!
//! Consumers observe a run through [`EventSink`]. Every method has a no-op default, so an
//! implementation only overrides the events it cares about; a method left alone behaves
//! like an empty registration slot.
//!
//! [`Callbacks`] is the closure-based form of the same contract: one optional slot per
//! event kind, filled in with the `on_*` builder methods.
//!
//! # Examples
//!
//! ```ignore
//! struct SectionNames(Vec<String>);
//!
//! impl EventSink for SectionNames {
//!     fn macro_begin(&mut self, kind: MacroKind, name: &str) {
//!         if kind == MacroKind::Section {
//!             self.0.push(name.to_string());
//!         }
//!     }
//! }
//! ```

use super::InputStack;
use crate::minweb::includes::IncludeError;
use crate::minweb::lexing::{Directive, MacroKind, Substitution};

/// Receiver of processor events, in document encounter order.
pub trait EventSink {
    /// Text that is not part of any delimiter.
    fn passthrough(&mut self, _text: &str) {}

    fn macro_begin(&mut self, _kind: MacroKind, _name: &str) {}

    fn macro_end(&mut self) {}

    /// A reference to `name` inside a macro body.
    fn macro_reference(&mut self, _name: &str) {}

    fn substitution(&mut self, _substitution: &Substitution) {}

    /// A special directive. `inputs` lets the sink switch the processor to another input
    /// (see [`InputStack::include_stream`]). Failing aborts the run.
    fn directive(
        &mut self,
        _directive: &Directive,
        _inputs: &mut InputStack,
    ) -> Result<(), IncludeError> {
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn passthrough(&mut self, text: &str) {
        (**self).passthrough(text)
    }

    fn macro_begin(&mut self, kind: MacroKind, name: &str) {
        (**self).macro_begin(kind, name)
    }

    fn macro_end(&mut self) {
        (**self).macro_end()
    }

    fn macro_reference(&mut self, name: &str) {
        (**self).macro_reference(name)
    }

    fn substitution(&mut self, substitution: &Substitution) {
        (**self).substitution(substitution)
    }

    fn directive(
        &mut self,
        directive: &Directive,
        inputs: &mut InputStack,
    ) -> Result<(), IncludeError> {
        (**self).directive(directive, inputs)
    }
}

type TextFn<'a> = Box<dyn FnMut(&str) + 'a>;
type MacroBeginFn<'a> = Box<dyn FnMut(MacroKind, &str) + 'a>;
type MacroEndFn<'a> = Box<dyn FnMut() + 'a>;
type SubstitutionFn<'a> = Box<dyn FnMut(&Substitution) + 'a>;
type DirectiveFn<'a> = Box<dyn FnMut(&Directive, &mut InputStack) -> Result<(), IncludeError> + 'a>;

/// One optional closure per event kind. Unset slots are skipped.
#[derive(Default)]
pub struct Callbacks<'a> {
    passthrough: Option<TextFn<'a>>,
    macro_begin: Option<MacroBeginFn<'a>>,
    macro_end: Option<MacroEndFn<'a>>,
    macro_reference: Option<TextFn<'a>>,
    substitution: Option<SubstitutionFn<'a>>,
    directive: Option<DirectiveFn<'a>>,
}

impl<'a> Callbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_passthrough(mut self, f: impl FnMut(&str) + 'a) -> Self {
        self.passthrough = Some(Box::new(f));
        self
    }

    pub fn on_macro_begin(mut self, f: impl FnMut(MacroKind, &str) + 'a) -> Self {
        self.macro_begin = Some(Box::new(f));
        self
    }

    pub fn on_macro_end(mut self, f: impl FnMut() + 'a) -> Self {
        self.macro_end = Some(Box::new(f));
        self
    }

    pub fn on_macro_reference(mut self, f: impl FnMut(&str) + 'a) -> Self {
        self.macro_reference = Some(Box::new(f));
        self
    }

    pub fn on_substitution(mut self, f: impl FnMut(&Substitution) + 'a) -> Self {
        self.substitution = Some(Box::new(f));
        self
    }

    pub fn on_directive(
        mut self,
        f: impl FnMut(&Directive, &mut InputStack) -> Result<(), IncludeError> + 'a,
    ) -> Self {
        self.directive = Some(Box::new(f));
        self
    }
}

impl EventSink for Callbacks<'_> {
    fn passthrough(&mut self, text: &str) {
        if let Some(f) = self.passthrough.as_mut() {
            f(text)
        }
    }

    fn macro_begin(&mut self, kind: MacroKind, name: &str) {
        if let Some(f) = self.macro_begin.as_mut() {
            f(kind, name)
        }
    }

    fn macro_end(&mut self) {
        if let Some(f) = self.macro_end.as_mut() {
            f()
        }
    }

    fn macro_reference(&mut self, name: &str) {
        if let Some(f) = self.macro_reference.as_mut() {
            f(name)
        }
    }

    fn substitution(&mut self, substitution: &Substitution) {
        if let Some(f) = self.substitution.as_mut() {
            f(substitution)
        }
    }

    fn directive(
        &mut self,
        directive: &Directive,
        inputs: &mut InputStack,
    ) -> Result<(), IncludeError> {
        match self.directive.as_mut() {
            Some(f) => f(directive, inputs),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minweb::lexing::InputSource;

    #[test]
    fn test_unset_slots_are_noops() {
        let mut callbacks = Callbacks::new();
        let mut inputs = InputStack::new(InputSource::from_string("s", ""));
        callbacks.passthrough("x");
        callbacks.macro_begin(MacroKind::Root, "*");
        callbacks.macro_end();
        callbacks.macro_reference("y");
        callbacks.substitution(&Substitution::Default("k".to_string()));
        assert!(callbacks
            .directive(&Directive::Language("C".to_string()), &mut inputs)
            .is_ok());
    }

    #[test]
    fn test_registered_slots_receive_events() {
        let mut seen = Vec::new();
        {
            let mut callbacks = Callbacks::new().on_passthrough(|text| seen.push(text.to_string()));
            callbacks.passthrough("a");
            callbacks.passthrough("b");
            callbacks.macro_end();
        }
        assert_eq!(seen, vec!["a", "b"]);
    }
}
