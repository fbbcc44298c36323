//! Macro expansion
//!
//! [`TangleBuilder`] listens to a processor run and records, for every macro name, the
//! sequence of fragments its bodies contributed. Several bodies with the same name append to
//! the same sequence. References are stored by name and looked up only when the table is
//! evaluated, so a macro may be referenced before it is defined.
//!
//! Evaluation keeps the chain of names being expanded and fails with [`TangleError::Cycle`]
//! when a name would be re-entered. A reference to a name that was never defined is emitted
//! back as `<<name>>`.

use crate::minweb::graph::{CycleError, Graph};
use crate::minweb::lexing::{MacroKind, ROOT_MACRO_NAME};
use crate::minweb::processor::EventSink;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TangleError {
    #[error("root node '{name}' not found in document")]
    RootNotFound { name: String },

    #[error("macro references form a cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },
}

/// One piece of a macro body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Text copied from the document.
    Literal(String),
    /// A reference to another macro, resolved at evaluation time.
    Reference(String),
}

/// Macro names and their fragments, in the order the names were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    entries: Vec<(String, Vec<Fragment>)>,
    index: HashMap<String, usize>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&[Fragment]> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Every name with its fragments, in first-seen order.
    pub fn fragments(&self) -> impl Iterator<Item = (&str, &[Fragment])> {
        self.entries
            .iter()
            .map(|(name, fragments)| (name.as_str(), fragments.as_slice()))
    }

    /// Index of `name`, creating an empty entry the first time it is seen.
    fn define(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.entries.len();
        self.entries.push((name.to_string(), Vec::new()));
        self.index.insert(name.to_string(), i);
        i
    }

    fn push(&mut self, entry: usize, fragment: Fragment) {
        self.entries[entry].1.push(fragment);
    }

    /// Expand `name` into a new string.
    pub fn evaluate(&self, name: &str) -> Result<String, TangleError> {
        let mut out = String::new();
        self.evaluate_into(name, &mut out)?;
        Ok(out)
    }

    /// Expand `name`, appending to `out`. On error `out` holds whatever was expanded so far.
    pub fn evaluate_into(&self, name: &str, out: &mut String) -> Result<(), TangleError> {
        let fragments = self.get(name).ok_or_else(|| TangleError::RootNotFound {
            name: name.to_string(),
        })?;
        let mut chain = vec![name.to_string()];
        self.expand(fragments, &mut chain, out)
    }

    fn expand(
        &self,
        fragments: &[Fragment],
        chain: &mut Vec<String>,
        out: &mut String,
    ) -> Result<(), TangleError> {
        for fragment in fragments {
            match fragment {
                Fragment::Literal(text) => out.push_str(text),
                Fragment::Reference(name) => match self.get(name) {
                    None => {
                        out.push_str("<<");
                        out.push_str(name);
                        out.push_str(">>");
                    }
                    Some(body) => {
                        let looped = chain.contains(name);
                        chain.push(name.clone());
                        if looped {
                            return Err(TangleError::Cycle {
                                chain: chain.clone(),
                            });
                        }
                        self.expand(body, chain, out)?;
                        chain.pop();
                    }
                },
            }
        }
        Ok(())
    }

    /// Graph of defined names, with an edge from each macro to every defined macro it
    /// references.
    pub fn dependency_graph(&self) -> Graph<String> {
        let mut graph = Graph::new();
        for name in self.names() {
            graph.add_node(name.to_string());
        }
        for (name, fragments) in self.fragments() {
            for fragment in fragments {
                if let Fragment::Reference(target) = fragment {
                    if self.contains(target) {
                        graph.add_edge(name.to_string(), target.clone());
                    }
                }
            }
        }
        graph
    }

    /// Defined names ordered so every macro follows the macros it references.
    pub fn expansion_order(&self) -> Result<Vec<String>, CycleError> {
        self.dependency_graph().topological_sort()
    }
}

/// Expand `root`, or the `*` macro when no root is given.
pub fn tangle(table: &MacroTable, root: Option<&str>) -> Result<String, TangleError> {
    table.evaluate(root.unwrap_or(ROOT_MACRO_NAME))
}

/// Builds a [`MacroTable`] from processor events.
#[derive(Debug, Default)]
pub struct TangleBuilder {
    table: MacroTable,
    open: Option<usize>,
}

impl TangleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_table(self) -> MacroTable {
        self.table
    }
}

impl EventSink for TangleBuilder {
    fn passthrough(&mut self, text: &str) {
        if let Some(entry) = self.open {
            self.table.push(entry, Fragment::Literal(text.to_string()));
        }
    }

    fn macro_begin(&mut self, _kind: MacroKind, name: &str) {
        self.open = Some(self.table.define(name));
    }

    fn macro_end(&mut self) {
        self.open = None;
    }

    fn macro_reference(&mut self, name: &str) {
        if let Some(entry) = self.open {
            self.table.push(entry, Fragment::Reference(name.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minweb::processor::Processor;

    fn table(text: &str) -> MacroTable {
        let mut builder = TangleBuilder::new();
        Processor::from_string("doc", text)
            .run_with(&mut builder)
            .unwrap();
        builder.into_table()
    }

    #[test]
    fn test_text_outside_macros_is_ignored() {
        let table = table("prose <<a>>=body>>@<< more prose");
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(table.evaluate("a").unwrap(), "body");
    }

    #[test]
    fn test_repeated_definitions_append() {
        let table = table("<<a>>=one>>@<<\nbetween\n<<b>>=x>>@<<<<a>>= two>>@<<");
        assert_eq!(table.evaluate("a").unwrap(), "one two");
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_forward_reference() {
        let table = table("<<*>>=[<<later>>]>>@<<<<later>>=ok>>@<<");
        assert_eq!(tangle(&table, None).unwrap(), "[ok]");
    }

    #[test]
    fn test_references_are_resolved_at_evaluation_time() {
        let table = table("<<*>>=<<x>>;<<x>>>>@<<<<x>>=1>>@<<<<x>>=2>>@<<");
        assert_eq!(table.evaluate("*").unwrap(), "12;12");
        assert_eq!(
            table.get("*").unwrap(),
            &[
                Fragment::Reference("x".to_string()),
                Fragment::Literal(";".to_string()),
                Fragment::Reference("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_unresolved_reference_is_emitted_verbatim() {
        let table = table("<<*>>=a<<missing>>b>>@<<");
        assert_eq!(table.evaluate("*").unwrap(), "a<<missing>>b");
    }

    #[test]
    fn test_missing_root() {
        let table = table("<<a>>=x>>@<<");
        assert_eq!(
            tangle(&table, None),
            Err(TangleError::RootNotFound {
                name: "*".to_string()
            })
        );
        assert_eq!(tangle(&table, Some("a")).unwrap(), "x");
    }

    #[test]
    fn test_cycle_is_reported_with_chain() {
        let table = table("<<a>>=<<b>>>>@<<<<b>>=<<c>>>>@<<<<c>>=<<a>>>>@<<");
        let err = table.evaluate("a").unwrap_err();
        assert_eq!(
            err,
            TangleError::Cycle {
                chain: vec!["a", "b", "c", "a"]
                    .into_iter()
                    .map(String::from)
                    .collect()
            }
        );
        assert_eq!(err.to_string(), "macro references form a cycle: a -> b -> c -> a");
        assert!(table.expansion_order().is_err());
    }

    #[test]
    fn test_shared_reference_is_not_a_cycle() {
        let table = table("<<*>>=<<x>><<x>>>>@<<<<x>>=<<y>>>>@<<<<y>>=!>>@<<");
        assert_eq!(table.evaluate("*").unwrap(), "!!");
    }

    #[test]
    fn test_expansion_order_follows_references() {
        let table = table("<<*>>=<<b>><<undefined>>>>@<<<<b>>=<<a>>>>@<<<<a>>=x>>@<<");
        assert_eq!(table.expansion_order().unwrap(), vec!["a", "b", "*"]);
        let graph = table.dependency_graph();
        assert!(!graph.contains(&"undefined".to_string()));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_table_built_by_hand() {
        let mut table = MacroTable::new();
        let entry = table.define("hand");
        table.push(entry, Fragment::Literal("made".to_string()));
        assert_eq!(table.define("hand"), entry);
        assert_eq!(table.evaluate("hand").unwrap(), "made");
        assert_eq!(table.len(), 1);
    }
}
