//! Compiled patterns and the per-kind index over them.

use std::collections::HashMap;
use std::ops::Range;

use sapwood_core::{Grammar, SymbolId};

use crate::instruction::Block;
use crate::node_test::NodeTest;
use crate::predicate::Predicate;

/// Index into [`QueryProgram::capture_names`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CaptureId(u32);

impl CaptureId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A `#set!` directive attached to a pattern.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Property {
    pub key: String,
    pub value: Option<String>,
    pub capture: Option<CaptureId>,
}

#[derive(Clone, Debug)]
pub struct Pattern {
    pub root: Block,
    pub predicates: Vec<Predicate>,
    pub properties: Vec<Property>,
    /// Byte range of the pattern in the query text.
    pub range: Range<usize>,
}

impl Pattern {
    pub fn new(root: Block, range: Range<usize>) -> Self {
        Self {
            root,
            predicates: Vec::new(),
            properties: Vec::new(),
            range,
        }
    }

    /// Captures the pattern binds, in order of appearance.
    pub fn captures(&self) -> Vec<CaptureId> {
        let mut out = Vec::new();
        self.root.captures(&mut out);
        out
    }
}

#[derive(Clone, Debug)]
pub struct QueryProgram {
    patterns: Vec<Pattern>,
    capture_names: Vec<String>,
    grammar_name: String,
    grammar_fingerprint: u64,
    by_kind: HashMap<(SymbolId, bool), Vec<usize>>,
    /// Patterns starting with `(_)`.
    by_named: Vec<usize>,
    /// Patterns starting with `_`.
    by_any: Vec<usize>,
}

impl QueryProgram {
    pub fn new(grammar: &Grammar, patterns: Vec<Pattern>, capture_names: Vec<String>) -> Self {
        let mut by_kind: HashMap<(SymbolId, bool), Vec<usize>> = HashMap::new();
        let mut by_named = Vec::new();
        let mut by_any = Vec::new();

        let mut tests = Vec::new();
        for (index, pattern) in patterns.iter().enumerate() {
            tests.clear();
            pattern.root.first_tests(&mut tests);
            for test in &tests {
                let list = match *test {
                    NodeTest::Any => &mut by_any,
                    NodeTest::Named => &mut by_named,
                    NodeTest::Kind { id, named } => by_kind.entry((id, named)).or_default(),
                };
                if list.last() != Some(&index) {
                    list.push(index);
                }
            }
        }

        Self {
            patterns,
            capture_names,
            grammar_name: grammar.name().to_owned(),
            grammar_fingerprint: grammar.fingerprint(),
            by_kind,
            by_named,
            by_any,
        }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn pattern(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }

    pub fn capture_name(&self, id: CaptureId) -> &str {
        self.capture_names
            .get(id.index())
            .map_or("", String::as_str)
    }

    pub fn capture_index(&self, name: &str) -> Option<CaptureId> {
        let name = name.strip_prefix('@').unwrap_or(name);
        self.capture_names
            .iter()
            .position(|n| n == name)
            .map(|i| CaptureId::new(i as u32))
    }

    pub fn pattern_range(&self, index: usize) -> Option<Range<usize>> {
        self.patterns.get(index).map(|p| p.range.clone())
    }

    pub fn start_byte_for_pattern(&self, index: usize) -> Option<usize> {
        self.patterns.get(index).map(|p| p.range.start)
    }

    /// `#set!` directives of a pattern, in query order.
    pub fn property_settings(&self, index: usize) -> &[Property] {
        self.patterns
            .get(index)
            .map(|p| p.properties.as_slice())
            .unwrap_or_default()
    }

    pub fn grammar_name(&self) -> &str {
        &self.grammar_name
    }

    pub fn grammar_fingerprint(&self) -> u64 {
        self.grammar_fingerprint
    }

    /// Whether node kind ids in this program mean the same thing in `grammar`.
    pub fn is_compatible(&self, grammar: &Grammar) -> bool {
        grammar.fingerprint() == self.grammar_fingerprint
    }

    /// Patterns whose first node can be a node of the given canonical kind,
    /// in declaration order. `out` is cleared first.
    pub fn candidates(&self, kind: SymbolId, named: bool, out: &mut Vec<usize>) {
        out.clear();
        if let Some(list) = self.by_kind.get(&(kind, named)) {
            out.extend_from_slice(list);
        }
        if named {
            out.extend_from_slice(&self.by_named);
        }
        out.extend_from_slice(&self.by_any);
        out.sort_unstable();
        out.dedup();
    }
}
