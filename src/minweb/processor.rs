//! Macro processor
//!
//! The processor drives the scan, decode and validate loop over a document and reports
//! what it finds as typed events to an [`EventSink`].
//!
//! # State machine
//!
//! The processor is either outside or inside a macro body. It starts outside; the run ends
//! successfully when end of input is reached outside a body with no suspended inputs.
//!
//! | state   | token                                 | action                         |
//! |---------|---------------------------------------|--------------------------------|
//! | outside | end of input, no suspended input      | run ends                       |
//! | outside | end of input, suspended input         | resume it, no event            |
//! | outside | macro start                           | `macro_begin`, go inside       |
//! | outside | macro end / macro reference           | error                          |
//! | inside  | end of input / macro start            | error                          |
//! | inside  | macro end                             | `macro_end`, go outside        |
//! | inside  | macro reference                       | `macro_reference`              |
//! | any     | substitution / passthrough / directive| matching event                 |
//!
//! Every error is fatal to the run and carries the position of the offending token.
//!
//! # Includes
//!
//! A directive sink that wants to include another document calls
//! [`InputStack::include_stream`]. The current scanning cursor is suspended on a stack of
//! [`IncludeFrame`]s and the lexer continues on the new source from line 1. When that
//! source is exhausted the frame is popped and the suspended input resumes exactly where it
//! stopped, including any read-ahead character. The transition itself produces no event.

pub mod events;

pub use events::{Callbacks, EventSink};

use crate::minweb::includes::IncludeError;
use crate::minweb::lexing::{
    decode_directive, decode_macro_reference, decode_macro_start, decode_substitution,
    DecodeError, InputSource, InputState, Lexer, SourcePosition, Token, TokenKind,
};
use thiserror::Error;

/// Errors that abort a processor run
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("{position}: macros cannot be nested")]
    NestedMacro { position: SourcePosition },

    #[error("{position}: macro end with no macro begin")]
    DanglingMacroEnd { position: SourcePosition },

    #[error("{position}: macro references can only occur in macro bodies")]
    ReferenceOutsideMacro { position: SourcePosition },

    #[error("{position}: expected a macro end before the end of input")]
    UnterminatedMacro { position: SourcePosition },

    #[error("{position}: {source}")]
    Decode {
        position: SourcePosition,
        #[source]
        source: DecodeError,
    },

    #[error("{position}: {source}")]
    Include {
        position: SourcePosition,
        #[source]
        source: IncludeError,
    },
}

impl ProcessorError {
    pub fn position(&self) -> &SourcePosition {
        match self {
            ProcessorError::NestedMacro { position }
            | ProcessorError::DanglingMacroEnd { position }
            | ProcessorError::ReferenceOutsideMacro { position }
            | ProcessorError::UnterminatedMacro { position }
            | ProcessorError::Decode { position, .. }
            | ProcessorError::Include { position, .. } => position,
        }
    }
}

/// A suspended input, waiting for the included input above it to finish.
#[derive(Debug)]
pub struct IncludeFrame {
    state: InputState,
}

impl IncludeFrame {
    pub fn source_name(&self) -> &str {
        self.state.source_name()
    }
}

/// The lexer together with the stack of inputs it has suspended.
#[derive(Debug)]
pub struct InputStack {
    lexer: Lexer,
    frames: Vec<IncludeFrame>,
}

impl InputStack {
    pub fn new(source: InputSource) -> Self {
        InputStack {
            lexer: Lexer::new(source),
            frames: Vec::new(),
        }
    }

    /// Suspend the current input and continue scanning `source` from its beginning.
    pub fn include_stream(&mut self, source: InputSource) {
        let suspended = self.lexer.swap_input_state(InputState::new(source));
        self.frames.push(IncludeFrame { state: suspended });
    }

    /// Number of suspended inputs.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current_source(&self) -> &str {
        self.lexer.source_name()
    }

    /// Names of the suspended inputs, outermost first.
    pub fn suspended_sources(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(IncludeFrame::source_name)
    }

    fn read(&mut self) -> Token {
        self.lexer.read()
    }

    /// Drop the exhausted input and resume the most recently suspended one.
    fn resume(&mut self) -> bool {
        match self.frames.pop() {
            Some(frame) => {
                self.lexer.set_input_state(frame.state);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Outside,
    Inside,
}

/// The minweb processor
pub struct Processor<'a> {
    inputs: InputStack,
    callbacks: Callbacks<'a>,
}

impl<'a> Processor<'a> {
    pub fn new(source: InputSource) -> Self {
        Processor {
            inputs: InputStack::new(source),
            callbacks: Callbacks::new(),
        }
    }

    pub fn from_string(name: &str, text: &str) -> Self {
        Self::new(InputSource::from_string(name, text))
    }

    /// Replace the registered callbacks used by [`Processor::run`].
    pub fn register(&mut self, callbacks: Callbacks<'a>) {
        self.callbacks = callbacks;
    }

    pub fn include_stream(&mut self, source: InputSource) {
        self.inputs.include_stream(source);
    }

    pub fn inputs(&self) -> &InputStack {
        &self.inputs
    }

    /// Run with the registered callbacks.
    pub fn run(&mut self) -> Result<(), ProcessorError> {
        let mut callbacks = std::mem::take(&mut self.callbacks);
        let result = self.run_with(&mut callbacks);
        self.callbacks = callbacks;
        result
    }

    /// Run to the end of input, delivering events to `sink`.
    pub fn run_with<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), ProcessorError> {
        let mut scope = Scope::Outside;
        loop {
            let token = self.inputs.read();
            match (scope, token.kind) {
                (Scope::Outside, TokenKind::EndOfInput) => {
                    if !self.inputs.resume() {
                        return Ok(());
                    }
                }
                (Scope::Inside, TokenKind::EndOfInput) => {
                    return Err(ProcessorError::UnterminatedMacro {
                        position: token.position,
                    });
                }
                (Scope::Outside, TokenKind::MacroStart) => {
                    let (kind, name) = decode_macro_start(&token.text)
                        .map_err(|source| decode_error(&token, source))?;
                    sink.macro_begin(kind, &name);
                    scope = Scope::Inside;
                }
                (Scope::Inside, TokenKind::MacroStart) => {
                    return Err(ProcessorError::NestedMacro {
                        position: token.position,
                    });
                }
                (Scope::Outside, TokenKind::MacroEnd) => {
                    return Err(ProcessorError::DanglingMacroEnd {
                        position: token.position,
                    });
                }
                (Scope::Inside, TokenKind::MacroEnd) => {
                    sink.macro_end();
                    scope = Scope::Outside;
                }
                (Scope::Outside, TokenKind::MacroReference) => {
                    return Err(ProcessorError::ReferenceOutsideMacro {
                        position: token.position,
                    });
                }
                (Scope::Inside, TokenKind::MacroReference) => {
                    let name = decode_macro_reference(&token.text)
                        .map_err(|source| decode_error(&token, source))?;
                    sink.macro_reference(&name);
                }
                (_, TokenKind::TextSubstitution) => {
                    let substitution = decode_substitution(&token.text)
                        .map_err(|source| decode_error(&token, source))?;
                    sink.substitution(&substitution);
                }
                (_, TokenKind::Passthrough) => sink.passthrough(&token.text),
                (_, TokenKind::SpecialDirective) => {
                    let directive = decode_directive(&token.text)
                        .map_err(|source| decode_error(&token, source))?;
                    sink.directive(&directive, &mut self.inputs)
                        .map_err(|source| ProcessorError::Include {
                            position: token.position.clone(),
                            source,
                        })?;
                }
            }
        }
    }
}

fn decode_error(token: &Token, source: DecodeError) -> ProcessorError {
    ProcessorError::Decode {
        position: token.position.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minweb::lexing::{Directive, MacroKind, Substitution};

    /// Records every event as a compact string.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        includes: Vec<(String, String)>,
    }

    impl EventSink for Recorder {
        fn passthrough(&mut self, text: &str) {
            match self.events.last_mut() {
                Some(last) if last.starts_with("text:") => last.push_str(text),
                _ => self.events.push(format!("text:{}", text)),
            }
        }

        fn macro_begin(&mut self, kind: MacroKind, name: &str) {
            self.events.push(format!("begin:{}:{}", kind, name));
        }

        fn macro_end(&mut self) {
            self.events.push("end".to_string());
        }

        fn macro_reference(&mut self, name: &str) {
            self.events.push(format!("ref:{}", name));
        }

        fn substitution(&mut self, substitution: &Substitution) {
            self.events.push(format!("sub:{}", substitution.key()));
        }

        fn directive(
            &mut self,
            directive: &Directive,
            inputs: &mut InputStack,
        ) -> Result<(), IncludeError> {
            self.events.push(format!("directive:{}", directive.value()));
            if let Directive::Include(path) = directive {
                if let Some((_, text)) = self.includes.iter().find(|(name, _)| name == path) {
                    inputs.include_stream(InputSource::from_string(path.clone(), text));
                }
            }
            Ok(())
        }
    }

    fn run(text: &str) -> Result<Vec<String>, ProcessorError> {
        let mut recorder = Recorder::default();
        Processor::from_string("doc", text).run_with(&mut recorder)?;
        Ok(recorder.events)
    }

    #[test]
    fn test_events_in_document_order() {
        let events = run("intro\n<<*>>=\nint x = <<value>>;\n>>@<<\n%[k=v]%").unwrap();
        assert_eq!(
            events,
            vec![
                "text:intro\n",
                "begin:root:*",
                "text:\nint x = ",
                "ref:value",
                "text:;\n",
                "end",
                "text:\n",
                "sub:k",
            ]
        );
    }

    #[test]
    fn test_unterminated_macro() {
        let err = run("<<a>>=\nbody").unwrap_err();
        assert!(matches!(err, ProcessorError::UnterminatedMacro { .. }));
        assert_eq!(err.position().source, "doc");
    }

    #[test]
    fn test_dangling_macro_end() {
        let err = run("text\n>>@<<").unwrap_err();
        match err {
            ProcessorError::DanglingMacroEnd { position } => {
                assert_eq!(position.start_line, 2);
                assert_eq!(position.start_column, 1);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_nested_macro_start() {
        let err = run("<<a>>=<<b>>=").unwrap_err();
        assert!(matches!(err, ProcessorError::NestedMacro { .. }));
        assert_eq!(err.to_string(), "doc:1:7: macros cannot be nested");
    }

    #[test]
    fn test_reference_outside_macro() {
        let err = run("see <<a>> here").unwrap_err();
        assert!(matches!(err, ProcessorError::ReferenceOutsideMacro { .. }));
    }

    #[test]
    fn test_unknown_directive_is_a_decode_error() {
        let err = run("#[color=red]").unwrap_err();
        match err {
            ProcessorError::Decode { source, .. } => {
                assert_eq!(source, DecodeError::UnsupportedDirective("#[color=red]".into()))
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_include_is_transparent() {
        let mut recorder = Recorder::default();
        recorder
            .includes
            .push(("part.mw".to_string(), "<<a>>=A>>@<<".to_string()));
        Processor::from_string("doc", "x#[include=part.mw]y")
            .run_with(&mut recorder)
            .unwrap();
        assert_eq!(
            recorder.events,
            vec![
                "text:x",
                "directive:part.mw",
                "begin:default:a",
                "text:A",
                "end",
                "text:y",
            ]
        );
    }

    #[test]
    fn test_macro_cannot_continue_past_the_end_of_an_include() {
        let mut recorder = Recorder::default();
        recorder
            .includes
            .push(("part.mw".to_string(), "<<a>>=x".to_string()));
        let err = Processor::from_string("doc", "#[include=part.mw]>>@<<")
            .run_with(&mut recorder)
            .unwrap_err();
        assert!(matches!(err, ProcessorError::UnterminatedMacro { .. }));
        assert_eq!(err.position().source, "part.mw");
        assert_eq!(
            recorder.events,
            vec!["directive:part.mw", "begin:default:a", "text:x"]
        );
    }

    #[test]
    fn test_include_resumes_putback_character() {
        let mut processor = Processor::from_string("outer", "<<a>>=<<b>>x>>@<<");
        let mut recorder = Recorder::default();
        // Scan up to the reference so that 'x' sits in the putback buffer.
        let first = processor.inputs.read();
        assert_eq!(first.kind, TokenKind::MacroStart);
        let reference = processor.inputs.read();
        assert_eq!(reference.kind, TokenKind::MacroReference);
        processor.include_stream(InputSource::from_string("inner", "in"));
        assert_eq!(processor.inputs().depth(), 1);
        assert_eq!(processor.inputs().current_source(), "inner");
        assert_eq!(
            processor.inputs().suspended_sources().collect::<Vec<_>>(),
            vec!["outer"]
        );
        // The run restarts outside a macro: the inner text is plain passthrough, then the
        // outer input resumes with 'x', and the end marker is dangling.
        let err = processor.run_with(&mut recorder).unwrap_err();
        assert!(matches!(err, ProcessorError::DanglingMacroEnd { .. }));
        assert_eq!(recorder.events, vec!["text:inx"]);
        assert_eq!(err.position().source, "outer");
    }

    #[test]
    fn test_registered_callbacks() {
        let mut begins = Vec::new();
        let mut ends = 0;
        {
            let mut processor = Processor::from_string("doc", "<<FILE:a.c>>=x>>@<<<<b>>=y>>@<<");
            processor.register(
                Callbacks::new()
                    .on_macro_begin(|kind, name| begins.push((kind, name.to_string())))
                    .on_macro_end(|| ends += 1),
            );
            processor.run().unwrap();
        }
        assert_eq!(
            begins,
            vec![
                (MacroKind::File, "a.c".to_string()),
                (MacroKind::Default, "b".to_string())
            ]
        );
        assert_eq!(ends, 2);
    }

    #[test]
    fn test_directive_failure_aborts_with_position() {
        let mut processor = Processor::from_string("doc", "\n#[include=missing]");
        processor.register(Callbacks::new().on_directive(|directive, _| {
            Err(IncludeError::NotFound {
                path: directive.value().to_string(),
                searched: Vec::new(),
            })
        }));
        let err = processor.run().unwrap_err();
        assert!(matches!(err, ProcessorError::Include { .. }));
        assert_eq!(err.position().start_line, 2);
    }
}
