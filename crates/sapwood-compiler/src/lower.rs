//! Lowering: linked AST to [`Pattern`]s.
//!
//! Each top-level term becomes one pattern. A top-level group is a pattern
//! over consecutive siblings; its first step stays on the node the matcher
//! is handed and the rest search forward from there.
//!
//! Captures and fields attach to single node terms. Through alternations,
//! quantifiers and one-term groups they are pushed down to every term that
//! could match; on a run of several terms they are rejected.

use rowan::TextRange;
use sapwood_core::Interner;
use sapwood_program::{
    Block, CaptureId, Instruction, Nav, NodeMatch, NodeTest, Pattern, PredicateRegistry, Quantifier,
    Step,
};
use tracing::trace;

use crate::analyze::link::LinkOutput;
use crate::analyze::predicates::{Directive, PredicateChecker};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::SyntaxKind;
use crate::parser::ast::{self, Expr, Root};

#[derive(Debug, Default)]
pub struct LowerOutput {
    pub patterns: Vec<Pattern>,
    /// Indexed by [`CaptureId`], in order of first appearance.
    pub capture_names: Vec<String>,
}

pub fn lower(
    root: &Root,
    link: &LinkOutput,
    registry: &PredicateRegistry,
    diagnostics: &mut Diagnostics,
) -> LowerOutput {
    let mut lowerer = Lowerer {
        link,
        registry,
        diagnostics,
        captures: Interner::new(),
        patterns: Vec::new(),
        pending: Vec::new(),
    };
    for item in root.items() {
        lowerer.lower_item(&item);
    }
    LowerOutput {
        patterns: lowerer.patterns,
        capture_names: lowerer.captures.into_strings(),
    }
}

/// Whether field constraints may appear: only among a node's children.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Scope {
    TopLevel,
    InNode,
}

/// What kind of sibling run is being lowered.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Run {
    /// Children of a node pattern: anchors may lead or trail, negated fields
    /// belong to the node.
    Children,
    /// A parenthesized group: anchors only between terms.
    Group,
}

struct LoweredRun {
    block: Block,
    negated_fields: Vec<sapwood_core::FieldId>,
}

struct Lowerer<'a> {
    link: &'a LinkOutput,
    registry: &'a PredicateRegistry,
    diagnostics: &'a mut Diagnostics,
    captures: Interner,
    patterns: Vec<Pattern>,
    /// Predicates seen anywhere inside the pattern being lowered.
    pending: Vec<ast::Predicate>,
}

impl Lowerer<'_> {
    fn lower_item(&mut self, item: &Expr) {
        match item {
            Expr::Predicate(predicate) => {
                if self.patterns.is_empty() {
                    self.diagnostics
                        .report(DiagnosticKind::PredicateWithoutPattern, predicate.text_range())
                        .emit();
                    return;
                }
                let index = self.patterns.len() - 1;
                self.attach_predicates(index, std::slice::from_ref(predicate));
            }
            Expr::Anchor(anchor) => {
                self.diagnostics
                    .report(DiagnosticKind::MisplacedAnchor, anchor.text_range())
                    .emit();
            }
            _ => self.lower_pattern(item),
        }
    }

    fn lower_pattern(&mut self, expr: &Expr) {
        self.pending.clear();
        let range = expr.text_range();

        let mut root = match self.lower_term(expr, Scope::TopLevel) {
            Some(Instruction::Group(block)) => block,
            Some(instruction) => Block::new(vec![Step {
                nav: Nav::Search,
                instruction,
            }]),
            None => Block::default(),
        };
        let predicates = std::mem::take(&mut self.pending);
        if root.is_empty() {
            return;
        }
        if let Some(first) = root.steps.first_mut() {
            first.nav = Nav::Stay;
        }
        if root.is_nullable() {
            self.diagnostics
                .report(DiagnosticKind::EmptyPattern, range)
                .emit();
        }

        trace!(index = self.patterns.len(), steps = root.steps.len(), "lowered pattern");
        self.patterns
            .push(Pattern::new(root, range.start().into()..range.end().into()));
        let index = self.patterns.len() - 1;
        self.attach_predicates(index, &predicates);
    }

    fn attach_predicates(&mut self, index: usize, predicates: &[ast::Predicate]) {
        if predicates.is_empty() {
            return;
        }
        let bound = self.patterns[index].captures();
        let checker = PredicateChecker {
            registry: self.registry,
            captures: &self.captures,
            bound: &bound,
        };
        let mut directives = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            if let Some(directive) = checker.check(predicate, self.diagnostics) {
                directives.push(directive);
            }
        }

        let pattern = &mut self.patterns[index];
        for directive in directives {
            match directive {
                Directive::Predicate(p) => pattern.predicates.push(p),
                Directive::Property(p) => pattern.properties.push(p),
            }
        }
    }

    fn lower_run(&mut self, children: impl Iterator<Item = Expr>, scope: Scope, run: Run) -> LoweredRun {
        let mut steps = Vec::new();
        let mut negated_fields = Vec::new();
        let mut anchor: Option<TextRange> = None;

        for child in children {
            match &child {
                Expr::Anchor(a) => {
                    if steps.is_empty() && run != Run::Children {
                        self.misplaced_anchor(a.text_range());
                    } else {
                        anchor = Some(a.text_range());
                    }
                }
                Expr::Predicate(p) => self.pending.push(p.clone()),
                Expr::NegatedField(field) if run == Run::Children => {
                    if let Some(id) = field.name().and_then(|t| self.link.field(t.text_range())) {
                        negated_fields.push(id);
                    }
                }
                _ => {
                    let Some(instruction) = self.lower_term(&child, scope) else {
                        continue;
                    };
                    let nav = if anchor.take().is_some() {
                        Nav::Adjacent
                    } else {
                        Nav::Search
                    };
                    steps.push(Step { nav, instruction });
                }
            }
        }

        let mut block = Block::new(steps);
        if let Some(range) = anchor {
            if run == Run::Children && !block.is_empty() {
                block.anchored_end = true;
            } else {
                self.misplaced_anchor(range);
            }
        }
        LoweredRun {
            block,
            negated_fields,
        }
    }

    fn misplaced_anchor(&mut self, range: TextRange) {
        self.diagnostics
            .report(DiagnosticKind::MisplacedAnchor, range)
            .emit();
    }

    fn lower_term(&mut self, expr: &Expr, scope: Scope) -> Option<Instruction> {
        match expr {
            Expr::Tree(tree) => {
                let test = self
                    .link
                    .node_test(tree.text_range())
                    .unwrap_or(NodeTest::Named);
                let children = self.lower_run(tree.children(), Scope::InNode, Run::Children);
                let mut node = NodeMatch::new(test);
                node.children = children.block;
                node.negated_fields = children.negated_fields;
                Some(Instruction::Match(node))
            }
            Expr::Str(s) => {
                let test = self.link.node_test(s.text_range()).unwrap_or(NodeTest::Any);
                Some(Instruction::Match(NodeMatch::new(test)))
            }
            Expr::Wildcard(_) => Some(Instruction::Match(NodeMatch::new(NodeTest::Any))),
            Expr::Group(group) => {
                let mut lowered = self.lower_run(group.children(), scope, Run::Group);
                match lowered.block.steps.len() {
                    0 => None,
                    1 => lowered.block.steps.pop().map(|step| step.instruction),
                    _ => Some(Instruction::Group(lowered.block)),
                }
            }
            Expr::Alt(alt) => self.lower_alt(alt, scope),
            Expr::Field(field) => self.lower_field(field, scope),
            Expr::Capture(capture) => self.lower_capture(capture, scope),
            Expr::Quantifier(quantifier) => self.lower_quantifier(quantifier, scope),
            Expr::NegatedField(field) => {
                self.diagnostics
                    .report(DiagnosticKind::NegatedFieldOutsideNode, field.text_range())
                    .emit();
                None
            }
            Expr::Anchor(anchor) => {
                self.misplaced_anchor(anchor.text_range());
                None
            }
            Expr::Predicate(predicate) => {
                self.pending.push(predicate.clone());
                None
            }
        }
    }

    fn lower_alt(&mut self, alt: &ast::Alt, scope: Scope) -> Option<Instruction> {
        let mut branches = Vec::new();
        for branch in alt.branches() {
            let block = match self.lower_term(&branch, scope) {
                Some(Instruction::Group(block)) => block,
                Some(instruction) => Block::new(vec![Step {
                    nav: Nav::Search,
                    instruction,
                }]),
                None => continue,
            };
            branches.push(block);
        }
        if branches.is_empty() {
            return None;
        }
        Some(Instruction::Alternation(branches))
    }

    fn lower_field(&mut self, field: &ast::Field, scope: Scope) -> Option<Instruction> {
        let mut instruction = self.lower_term(&field.value()?, scope)?;
        if scope != Scope::InNode {
            self.diagnostics
                .report(DiagnosticKind::FieldOutsideNode, field.text_range())
                .emit();
            return Some(instruction);
        }

        let id = field.name().and_then(|t| self.link.field(t.text_range()));
        if let Some(id) = id {
            let single = for_each_term(&mut instruction, &mut |node: &mut NodeMatch| {
                node.field = Some(id)
            });
            if !single {
                self.diagnostics
                    .report(DiagnosticKind::FieldOnSequence, field.text_range())
                    .emit();
            }
        }
        Some(instruction)
    }

    fn lower_capture(&mut self, capture: &ast::Capture, scope: Scope) -> Option<Instruction> {
        let mut instruction = self.lower_term(&capture.inner()?, scope)?;
        let name = capture.name()?;
        let id = CaptureId::new(self.captures.intern(name.text()).as_u32());

        let mut duplicate = false;
        let single = for_each_term(&mut instruction, &mut |node: &mut NodeMatch| {
            if node.captures.contains(&id) {
                duplicate = true;
            } else {
                node.captures.push(id);
            }
        });

        if !single {
            self.diagnostics
                .report(DiagnosticKind::CaptureOnSequence, capture.text_range())
                .emit();
        } else if duplicate {
            self.diagnostics
                .report(DiagnosticKind::DuplicateCapture, name.text_range())
                .message(name.text())
                .emit();
        }
        Some(instruction)
    }

    fn lower_quantifier(&mut self, quantifier: &ast::Quantifier, scope: Scope) -> Option<Instruction> {
        let instruction = self.lower_term(&quantifier.inner()?, scope)?;
        let kind = match quantifier.operator()?.kind() {
            SyntaxKind::Star => Quantifier::ZeroOrMore,
            SyntaxKind::Plus => Quantifier::OneOrMore,
            _ => Quantifier::Optional,
        };
        let body = match instruction {
            Instruction::Group(block) => block,
            instruction => Block::new(vec![Step {
                nav: Nav::Search,
                instruction,
            }]),
        };
        if body.is_nullable() {
            self.diagnostics
                .report(DiagnosticKind::EmptyRepetition, quantifier.text_range())
                .emit();
        }
        Some(Instruction::Repeat {
            body,
            quantifier: kind,
        })
    }
}

/// Apply `f` to every node term `instruction` can match as a single node.
/// Returns `false` if some path matches a run of several terms; `f` still
/// runs on the single terms found elsewhere.
fn for_each_term<F: FnMut(&mut NodeMatch)>(instruction: &mut Instruction, f: &mut F) -> bool {
    match instruction {
        Instruction::Match(node) => {
            f(node);
            true
        }
        Instruction::Alternation(branches) => {
            let mut single = true;
            for branch in branches {
                single &= for_each_term_in_block(branch, f);
            }
            single
        }
        Instruction::Group(block) | Instruction::Repeat { body: block, .. } => {
            for_each_term_in_block(block, f)
        }
    }
}

fn for_each_term_in_block<F: FnMut(&mut NodeMatch)>(block: &mut Block, f: &mut F) -> bool {
    match block.steps.as_mut_slice() {
        [step] => for_each_term(&mut step.instruction, f),
        _ => false,
    }
}
