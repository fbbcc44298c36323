//! # minweb
//!
//! A literate-programming macro engine.
//!
//! A minweb document interleaves prose with named code blocks ("macros"). The
//! library scans such a document, recognizes its small fixed grammar of
//! delimiters and reports what it finds as a sequence of events. Downstream
//! consumers subscribe to those events to extract code (tangle), list names,
//! pull out configuration assignments or trace the document structure.
//!
//! The grammar, complete:
//!
//! ```text
//! <<name>>=          begin a macro body (also <<FILE:x>>=, <<SECTION:x>>=, <<*>>=)
//! >>@<<              end the current macro body
//! <<name>>           reference another macro from inside a body
//! %[key]%            text substitution, %[key=value]% for an assignment
//! #[include=path]    special directive (include, language)
//! ```
//!
//! ## Testing
//!
//! Sample documents live under `docs/samples` and are reached through the
//! [testing module](minweb::testing). Tests should prefer those verified
//! samples over ad-hoc document strings whenever the structure matters.

pub mod minweb;
