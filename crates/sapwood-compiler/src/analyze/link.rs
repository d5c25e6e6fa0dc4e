//! Link pass: resolve node kinds and fields against the grammar.
//!
//! Every `(kind)`, `"token"` and field name is looked up once. Results are
//! keyed by the text range of the syntax that named them, so lowering can
//! fetch them without doing any lookups of its own. Fields are also checked
//! against the kind of the node pattern they appear in.

use std::collections::HashMap;

use rowan::TextRange;
use sapwood_core::utils::{find_similar, suggestion_distance};
use sapwood_core::{FieldId, Grammar, SymbolId};
use sapwood_program::NodeTest;

use super::visitor::{Visitor, walk_field, walk_tree};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::ast::{self, Root};
use crate::parser::{SyntaxKind, SyntaxToken};

/// Resolved names, keyed by source range.
#[derive(Debug, Default)]
pub struct LinkOutput {
    /// Keyed by the `Tree` or `Str` node.
    node_tests: HashMap<TextRange, NodeTest>,
    /// Keyed by the field name token.
    fields: HashMap<TextRange, FieldId>,
}

impl LinkOutput {
    pub fn node_test(&self, range: TextRange) -> Option<NodeTest> {
        self.node_tests.get(&range).copied()
    }

    pub fn field(&self, range: TextRange) -> Option<FieldId> {
        self.fields.get(&range).copied()
    }
}

pub fn link(root: &Root, grammar: &Grammar, diagnostics: &mut Diagnostics) -> LinkOutput {
    let mut linker = Linker {
        grammar,
        diagnostics,
        output: LinkOutput::default(),
        parents: Vec::new(),
    };
    linker.visit_root(root);
    linker.output
}

/// The node pattern whose children are being linked.
#[derive(Clone, Copy)]
struct Parent {
    kind: SymbolId,
    range: TextRange,
}

struct Linker<'a> {
    grammar: &'a Grammar,
    diagnostics: &'a mut Diagnostics,
    output: LinkOutput,
    /// `None` entries are node patterns with no checkable kind: `(_)`,
    /// `(ERROR)` or a kind that failed to resolve.
    parents: Vec<Option<Parent>>,
}

impl Linker<'_> {
    fn resolve_tree(&mut self, tree: &ast::Tree) -> Option<Parent> {
        let token = tree.node_kind()?;
        let test = match token.kind() {
            SyntaxKind::Underscore => NodeTest::Named,
            SyntaxKind::KwError => NodeTest::error(),
            _ => {
                let id = self.resolve_named(&token)?;
                NodeTest::kind(id, true)
            }
        };
        self.output.node_tests.insert(tree.text_range(), test);

        match test {
            NodeTest::Kind { id, .. } if id != Grammar::ERROR => Some(Parent {
                kind: id,
                range: token.text_range(),
            }),
            _ => None,
        }
    }

    fn resolve_named(&mut self, token: &SyntaxToken) -> Option<SymbolId> {
        let name = token.text();
        if let Some(id) = self.grammar.id_for_node_kind(name, true) {
            return Some(self.grammar.canonical_kind(id));
        }

        let mut builder = self
            .diagnostics
            .report(DiagnosticKind::UnknownNodeKind, token.text_range())
            .message(name);
        if self.grammar.id_for_node_kind(name, false).is_some() {
            builder = builder.hint(format!("`{name}` is an anonymous node, write it as `\"{name}\"`"));
        } else {
            let names = self.grammar.node_kind_names(true);
            if let Some(similar) = find_similar(name, names, suggestion_distance(name)) {
                builder = builder.hint(format!("did you mean `{}`?", similar));
            }
        }
        builder.emit();
        None
    }

    fn resolve_field(&mut self, token: Option<SyntaxToken>) -> Option<(FieldId, SyntaxToken)> {
        let token = token?;
        let name = token.text();
        if let Some(id) = self.grammar.field_id(name) {
            self.output.fields.insert(token.text_range(), id);
            return Some((id, token));
        }

        let mut builder = self
            .diagnostics
            .report(DiagnosticKind::UnknownField, token.text_range())
            .message(name);
        if let Some(similar) = find_similar(name, self.grammar.field_names(), suggestion_distance(name)) {
            builder = builder.hint(format!("did you mean `{}`?", similar));
        }
        builder.emit();
        None
    }

    fn check_field_on_parent(&mut self, field: FieldId, token: &SyntaxToken) {
        let Some(Some(parent)) = self.parents.last().copied() else {
            return;
        };
        let valid = self.grammar.fields_for_kind(parent.kind);
        if valid.contains(&field) {
            return;
        }

        let parent_name = self.grammar.symbol_name(parent.kind);
        let mut builder = self
            .diagnostics
            .report(DiagnosticKind::FieldNotOnNodeKind, token.text_range())
            .message(token.text())
            .related_to(format!("on `{parent_name}`"), parent.range);
        if valid.is_empty() {
            builder = builder.hint(format!("`{parent_name}` has no fields"));
        } else {
            let names: Vec<&str> = valid.iter().map(|&f| self.grammar.field_name(f)).collect();
            if let Some(similar) = find_similar(token.text(), names.iter().copied(), suggestion_distance(token.text())) {
                builder = builder.hint(format!("did you mean `{}`?", similar));
            }
            builder = builder.hint(format!(
                "valid fields for `{}`: {}",
                parent_name,
                format_list(&names, 5)
            ));
        }
        builder.emit();
    }
}

impl Visitor for Linker<'_> {
    fn visit_tree(&mut self, tree: &ast::Tree) {
        let parent = self.resolve_tree(tree);
        self.parents.push(parent);
        walk_tree(self, tree);
        self.parents.pop();
    }

    fn visit_str(&mut self, s: &ast::Str) {
        let value = s.value();
        if let Some(id) = self.grammar.id_for_node_kind(&value, false) {
            let id = self.grammar.canonical_kind(id);
            self.output.node_tests.insert(s.text_range(), NodeTest::kind(id, false));
            return;
        }

        let mut builder = self
            .diagnostics
            .report(DiagnosticKind::UnknownNodeKind, s.text_range())
            .message(format!("\"{value}\""));
        if self.grammar.id_for_node_kind(&value, true).is_some() {
            builder = builder.hint(format!("`{value}` is a named node, write it as `({value})`"));
        }
        builder.emit();
    }

    fn visit_field(&mut self, field: &ast::Field) {
        if let Some((id, token)) = self.resolve_field(field.name()) {
            self.check_field_on_parent(id, &token);
        }
        walk_field(self, field);
    }

    fn visit_negated_field(&mut self, field: &ast::NegatedField) {
        if let Some((id, token)) = self.resolve_field(field.name()) {
            self.check_field_on_parent(id, &token);
        }
    }
}

/// Backticked, comma-separated, truncated after `max_items`.
fn format_list(items: &[&str], max_items: usize) -> String {
    let shown: Vec<String> = items
        .iter()
        .take(max_items)
        .map(|s| format!("`{s}`"))
        .collect();
    if items.len() <= max_items {
        shown.join(", ")
    } else {
        format!("{}, ... ({} more)", shown.join(", "), items.len() - max_items)
    }
}
