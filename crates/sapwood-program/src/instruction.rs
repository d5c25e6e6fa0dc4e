//! Matcher tree for one pattern.
//!
//! A [`Block`] is a run of sibling steps. Each [`Step`] carries the
//! navigation used to find its first node and an [`Instruction`] saying what
//! must be there. Nested node patterns own a block for their children.

use sapwood_core::FieldId;

use crate::nav::Nav;
use crate::node_test::NodeTest;
use crate::program::CaptureId;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Block {
    pub steps: Vec<Step>,
    /// A trailing `.`: nothing but anonymous nodes may follow the last step.
    pub anchored_end: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Step {
    pub nav: Nav,
    pub instruction: Instruction,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// Match exactly one node.
    Match(NodeMatch),
    /// Try each branch in order; the first that leads to a solution is kept.
    Alternation(Vec<Block>),
    /// A parenthesized run of sibling terms.
    Group(Block),
    /// Greedy repetition of the body.
    Repeat { body: Block, quantifier: Quantifier },
}

/// A single node term with everything attached to it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NodeMatch {
    pub test: NodeTest,
    /// Field the node must carry in its parent.
    pub field: Option<FieldId>,
    /// Fields the node must have no child for.
    pub negated_fields: Vec<FieldId>,
    pub captures: Vec<CaptureId>,
    pub children: Block,
}

impl NodeMatch {
    pub fn new(test: NodeTest) -> Self {
        Self {
            test,
            field: None,
            negated_fields: Vec::new(),
            captures: Vec::new(),
            children: Block::default(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Quantifier {
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Quantifier {
    pub fn min(self) -> usize {
        match self {
            Self::OneOrMore => 1,
            Self::Optional | Self::ZeroOrMore => 0,
        }
    }

    pub fn is_unbounded(self) -> bool {
        !matches!(self, Self::Optional)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }
}

impl Block {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            anchored_end: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the block can succeed without consuming a node.
    pub fn is_nullable(&self) -> bool {
        self.steps.iter().all(|s| s.instruction.is_nullable())
    }

    /// Tests that can accept the first node the block consumes.
    pub fn first_tests(&self, out: &mut Vec<NodeTest>) {
        for step in &self.steps {
            step.instruction.first_tests(out);
            if !step.instruction.is_nullable() {
                break;
            }
        }
    }

    /// Every capture bound anywhere in the block, in order of appearance.
    pub fn captures(&self, out: &mut Vec<CaptureId>) {
        for step in &self.steps {
            step.instruction.captures(out);
        }
    }
}

impl Instruction {
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Match(_) => false,
            Self::Alternation(branches) => branches.iter().any(Block::is_nullable),
            Self::Group(block) => block.is_nullable(),
            Self::Repeat { body, quantifier } => quantifier.min() == 0 || body.is_nullable(),
        }
    }

    pub fn first_tests(&self, out: &mut Vec<NodeTest>) {
        match self {
            Self::Match(m) => out.push(m.test),
            Self::Alternation(branches) => branches.iter().for_each(|b| b.first_tests(out)),
            Self::Group(block) => block.first_tests(out),
            Self::Repeat { body, .. } => body.first_tests(out),
        }
    }

    pub fn captures(&self, out: &mut Vec<CaptureId>) {
        match self {
            Self::Match(m) => {
                for capture in &m.captures {
                    if !out.contains(capture) {
                        out.push(*capture);
                    }
                }
                m.children.captures(out);
            }
            Self::Alternation(branches) => branches.iter().for_each(|b| b.captures(out)),
            Self::Group(block) => block.captures(out),
            Self::Repeat { body, .. } => body.captures(out),
        }
    }
}
