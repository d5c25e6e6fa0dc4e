//! AST visitor.
//!
//! Override `visit_*` to add logic and call the matching `walk_*` to keep
//! descending. Leaving out the `walk_*` call prunes the subtree.

use crate::parser::ast::{
    Alt, Anchor, Capture, Expr, Field, Group, NegatedField, Predicate, Quantifier, Root, Str, Tree,
    Wildcard,
};

pub trait Visitor: Sized {
    fn visit_root(&mut self, root: &Root) {
        walk_root(self, root);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_tree(&mut self, tree: &Tree) {
        walk_tree(self, tree);
    }

    fn visit_str(&mut self, _str: &Str) {}

    fn visit_wildcard(&mut self, _wildcard: &Wildcard) {}

    fn visit_group(&mut self, group: &Group) {
        walk_group(self, group);
    }

    fn visit_alt(&mut self, alt: &Alt) {
        walk_alt(self, alt);
    }

    fn visit_field(&mut self, field: &Field) {
        walk_field(self, field);
    }

    fn visit_negated_field(&mut self, _field: &NegatedField) {}

    fn visit_capture(&mut self, capture: &Capture) {
        walk_capture(self, capture);
    }

    fn visit_quantifier(&mut self, quantifier: &Quantifier) {
        walk_quantifier(self, quantifier);
    }

    fn visit_anchor(&mut self, _anchor: &Anchor) {}

    fn visit_predicate(&mut self, _predicate: &Predicate) {}
}

pub fn walk_root<V: Visitor>(visitor: &mut V, root: &Root) {
    for item in root.items() {
        visitor.visit_expr(&item);
    }
}

pub fn walk_expr<V: Visitor>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::Tree(n) => visitor.visit_tree(n),
        Expr::Str(n) => visitor.visit_str(n),
        Expr::Wildcard(n) => visitor.visit_wildcard(n),
        Expr::Group(n) => visitor.visit_group(n),
        Expr::Alt(n) => visitor.visit_alt(n),
        Expr::Field(n) => visitor.visit_field(n),
        Expr::NegatedField(n) => visitor.visit_negated_field(n),
        Expr::Capture(n) => visitor.visit_capture(n),
        Expr::Quantifier(n) => visitor.visit_quantifier(n),
        Expr::Anchor(n) => visitor.visit_anchor(n),
        Expr::Predicate(n) => visitor.visit_predicate(n),
    }
}

pub fn walk_tree<V: Visitor>(visitor: &mut V, tree: &Tree) {
    for child in tree.children() {
        visitor.visit_expr(&child);
    }
}

pub fn walk_group<V: Visitor>(visitor: &mut V, group: &Group) {
    for child in group.children() {
        visitor.visit_expr(&child);
    }
}

pub fn walk_alt<V: Visitor>(visitor: &mut V, alt: &Alt) {
    for branch in alt.branches() {
        visitor.visit_expr(&branch);
    }
}

pub fn walk_field<V: Visitor>(visitor: &mut V, field: &Field) {
    if let Some(value) = field.value() {
        visitor.visit_expr(&value);
    }
}

pub fn walk_capture<V: Visitor>(visitor: &mut V, capture: &Capture) {
    if let Some(inner) = capture.inner() {
        visitor.visit_expr(&inner);
    }
}

pub fn walk_quantifier<V: Visitor>(visitor: &mut V, quantifier: &Quantifier) {
    if let Some(inner) = quantifier.inner() {
        visitor.visit_expr(&inner);
    }
}
