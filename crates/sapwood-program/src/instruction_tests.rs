use crate::{Block, CaptureId, Instruction, Nav, NodeMatch, NodeTest, Quantifier, Step};

fn node(id: u16) -> Instruction {
    Instruction::Match(NodeMatch::new(NodeTest::kind(id, true)))
}

fn captured(id: u16, capture: u32) -> Instruction {
    let mut m = NodeMatch::new(NodeTest::kind(id, true));
    m.captures.push(CaptureId::new(capture));
    Instruction::Match(m)
}

fn step(instruction: Instruction) -> Step {
    Step {
        nav: Nav::Search,
        instruction,
    }
}

fn repeat(body: Instruction, quantifier: Quantifier) -> Instruction {
    Instruction::Repeat {
        body: Block::new(vec![step(body)]),
        quantifier,
    }
}

#[test]
fn nullability() {
    assert!(!node(1).is_nullable());
    assert!(repeat(node(1), Quantifier::Optional).is_nullable());
    assert!(repeat(node(1), Quantifier::ZeroOrMore).is_nullable());
    assert!(!repeat(node(1), Quantifier::OneOrMore).is_nullable());

    let alt = Instruction::Alternation(vec![
        Block::new(vec![step(node(1))]),
        Block::new(vec![step(repeat(node(2), Quantifier::Optional))]),
    ]);
    assert!(alt.is_nullable());

    let group = Instruction::Group(Block::new(vec![
        step(repeat(node(1), Quantifier::ZeroOrMore)),
        step(node(2)),
    ]));
    assert!(!group.is_nullable());
    assert!(Block::default().is_nullable());
}

#[test]
fn first_tests_look_through_nullable_steps() {
    let block = Block::new(vec![
        step(repeat(node(1), Quantifier::Optional)),
        step(Instruction::Alternation(vec![
            Block::new(vec![step(node(2))]),
            Block::new(vec![step(node(3))]),
        ])),
        step(node(4)),
    ]);
    let mut tests = Vec::new();
    block.first_tests(&mut tests);

    assert_eq!(
        tests,
        [NodeTest::kind(1, true), NodeTest::kind(2, true), NodeTest::kind(3, true)]
    );
}

#[test]
fn captures_in_order_of_appearance() {
    let mut parent = NodeMatch::new(NodeTest::Named);
    parent.captures.push(CaptureId::new(2));
    parent.children = Block::new(vec![
        step(captured(1, 0)),
        step(repeat(captured(1, 1), Quantifier::ZeroOrMore)),
        step(captured(1, 0)),
    ]);
    let block = Block::new(vec![step(Instruction::Match(parent))]);

    let mut captures = Vec::new();
    block.captures(&mut captures);
    assert_eq!(captures, [CaptureId::new(2), CaptureId::new(0), CaptureId::new(1)]);
}

#[test]
fn quantifier_bounds() {
    assert_eq!(Quantifier::Optional.min(), 0);
    assert!(!Quantifier::Optional.is_unbounded());
    assert_eq!(Quantifier::OneOrMore.min(), 1);
    assert!(Quantifier::OneOrMore.is_unbounded());
    assert!(Quantifier::ZeroOrMore.is_unbounded());
}
