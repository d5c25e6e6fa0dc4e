//! Human-readable listing of a compiled program, for tests and debugging.

use std::fmt::{self, Write};

use sapwood_core::Grammar;

use crate::instruction::{Block, Instruction, NodeMatch};
use crate::predicate::{Predicate, PredicateArg};
use crate::program::QueryProgram;

pub fn dump(program: &QueryProgram, grammar: &Grammar) -> String {
    let mut out = String::new();
    Printer { program, grammar }
        .program(&mut out)
        .expect("String write never fails");
    out
}

struct Printer<'a> {
    program: &'a QueryProgram,
    grammar: &'a Grammar,
}

impl Printer<'_> {
    fn program(&self, w: &mut impl Write) -> fmt::Result {
        for (index, pattern) in self.program.patterns().iter().enumerate() {
            writeln!(w, "pattern {index} {:?}", pattern.range)?;
            self.block(w, &pattern.root, 1)?;
            for predicate in &pattern.predicates {
                write!(w, "  ")?;
                self.predicate(w, predicate)?;
                writeln!(w)?;
            }
            for property in &pattern.properties {
                write!(w, "  #set!")?;
                if let Some(capture) = property.capture {
                    write!(w, " @{}", self.program.capture_name(capture))?;
                }
                write!(w, " {}", property.key)?;
                if let Some(value) = &property.value {
                    write!(w, " {value:?}")?;
                }
                writeln!(w)?;
            }
        }
        Ok(())
    }

    fn block(&self, w: &mut impl Write, block: &Block, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        for step in &block.steps {
            let nav = step.nav.as_str();
            match &step.instruction {
                Instruction::Match(node) => {
                    write!(w, "{indent}{nav} ")?;
                    self.node(w, node)?;
                    writeln!(w)?;
                    self.block(w, &node.children, depth + 1)?;
                }
                Instruction::Alternation(branches) => {
                    writeln!(w, "{indent}{nav} alt")?;
                    for branch in branches {
                        writeln!(w, "{indent}  branch")?;
                        self.block(w, branch, depth + 2)?;
                    }
                }
                Instruction::Group(inner) => {
                    writeln!(w, "{indent}{nav} group")?;
                    self.block(w, inner, depth + 1)?;
                }
                Instruction::Repeat { body, quantifier } => {
                    writeln!(w, "{indent}{nav} repeat{}", quantifier.as_str())?;
                    self.block(w, body, depth + 1)?;
                }
            }
        }
        if block.anchored_end {
            writeln!(w, "{indent}end")?;
        }
        Ok(())
    }

    fn node(&self, w: &mut impl Write, node: &NodeMatch) -> fmt::Result {
        if let Some(field) = node.field {
            write!(w, "{}: ", self.grammar.field_name(field))?;
        }
        write!(w, "{}", node.test.display(self.grammar))?;
        for field in &node.negated_fields {
            write!(w, " !{}", self.grammar.field_name(*field))?;
        }
        for capture in &node.captures {
            write!(w, " @{}", self.program.capture_name(*capture))?;
        }
        Ok(())
    }

    fn arg(&self, w: &mut impl Write, arg: &PredicateArg) -> fmt::Result {
        match arg {
            PredicateArg::Capture(id) => write!(w, " @{}", self.program.capture_name(*id)),
            PredicateArg::Literal(s) => write!(w, " {s:?}"),
        }
    }

    fn predicate(&self, w: &mut impl Write, predicate: &Predicate) -> fmt::Result {
        write!(w, "{}", predicate.name())?;
        match predicate {
            Predicate::Eq { capture, other, .. } => {
                write!(w, " @{}", self.program.capture_name(*capture))?;
                self.arg(w, other)
            }
            Predicate::Match {
                capture, pattern, ..
            } => write!(w, " @{} {pattern:?}", self.program.capture_name(*capture)),
            Predicate::AnyOf {
                capture, values, ..
            } => {
                write!(w, " @{}", self.program.capture_name(*capture))?;
                values.iter().try_for_each(|v| write!(w, " {v:?}"))
            }
            Predicate::Custom { args, .. } => args.iter().try_for_each(|a| self.arg(w, a)),
        }
    }
}
