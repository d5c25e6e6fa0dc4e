//! LALR(1) item automaton.
//!
//! States are identified by their kernel core (items without lookaheads).
//! Whenever a kernel gains lookaheads the state is queued again and its
//! closure recomputed, so the fixed point equals merging the canonical LR(1)
//! states that share a core.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::prepare::{GSymbol, GenProduction, Prepared, Step};
use super::sets::TerminalSet;

/// `(production, dot)`.
pub(crate) type Core = (usize, usize);

#[derive(Debug, Clone)]
pub(crate) struct Item {
    pub production: usize,
    pub dot: usize,
    pub lookahead: TerminalSet,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    kernel: Vec<Core>,
    kernel_lookaheads: Vec<TerminalSet>,
    /// Closure of the kernel with final lookaheads.
    pub items: Vec<Item>,
    pub transitions: BTreeMap<GSymbol, usize>,
}

#[derive(Debug)]
pub(crate) struct Automaton {
    /// Grammar productions followed by the augmented start production.
    pub productions: Vec<GenProduction>,
    pub augmented: usize,
    pub states: Vec<State>,
    pub first_sets: FirstSets,
}

#[derive(Debug)]
pub(crate) struct FirstSets {
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
}

impl FirstSets {
    fn compute(prepared: &Prepared, productions: &[GenProduction]) -> Self {
        let count = prepared.variables.len() + 1;
        let mut sets = Self {
            first: vec![TerminalSet::default(); count],
            nullable: vec![false; count],
        };
        let mut changed = true;
        while changed {
            changed = false;
            for production in productions {
                let (first, nullable) = sets.of_sequence(prepared, &production.steps);
                changed |= sets.first[production.lhs].union(&first);
                if nullable && !sets.nullable[production.lhs] {
                    sets.nullable[production.lhs] = true;
                    changed = true;
                }
            }
        }
        sets
    }

    /// Whether `symbol` can begin with the given lookahead.
    pub(crate) fn begins_with(&self, prepared: &Prepared, symbol: GSymbol, lookahead: usize) -> bool {
        match symbol {
            GSymbol::NonTerminal(n) => self.first[n].contains(lookahead),
            terminal => prepared.lookahead_index(terminal) == Some(lookahead),
        }
    }

    fn of_sequence(&self, prepared: &Prepared, steps: &[Step]) -> (TerminalSet, bool) {
        let mut first = TerminalSet::default();
        for step in steps {
            match step.symbol {
                GSymbol::NonTerminal(n) => {
                    first.union(&self.first[n]);
                    if !self.nullable[n] {
                        return (first, false);
                    }
                }
                terminal => {
                    if let Some(index) = prepared.lookahead_index(terminal) {
                        first.insert(index);
                    }
                    return (first, false);
                }
            }
        }
        (first, true)
    }
}

impl Automaton {
    pub(crate) fn build(prepared: &Prepared) -> Self {
        let mut productions = prepared.productions.clone();
        let augmented = productions.len();
        productions.push(GenProduction {
            lhs: prepared.variables.len(),
            steps: vec![Step {
                symbol: GSymbol::NonTerminal(0),
                field: None,
                alias: None,
                precedence: 0,
                associativity: Default::default(),
            }],
        });

        let mut by_lhs: Vec<Vec<usize>> = vec![Vec::new(); prepared.variables.len() + 1];
        for (i, production) in productions.iter().enumerate() {
            by_lhs[production.lhs].push(i);
        }
        let first_sets = FirstSets::compute(prepared, &productions);

        let mut states = vec![State {
            kernel: vec![(augmented, 0)],
            kernel_lookaheads: vec![TerminalSet::single(0)],
            ..State::default()
        }];
        let mut index: HashMap<Vec<Core>, usize> = HashMap::new();
        index.insert(vec![(augmented, 0)], 0);

        let mut queue = VecDeque::from([0]);
        let mut queued = vec![true];

        while let Some(id) = queue.pop_front() {
            queued[id] = false;
            let items = closure(
                prepared,
                &productions,
                &by_lhs,
                &first_sets,
                &states[id].kernel,
                &states[id].kernel_lookaheads,
            );

            let mut successors: BTreeMap<GSymbol, Vec<(Core, &TerminalSet)>> = BTreeMap::new();
            for item in &items {
                if let Some(step) = productions[item.production].steps.get(item.dot) {
                    successors
                        .entry(step.symbol)
                        .or_default()
                        .push(((item.production, item.dot + 1), &item.lookahead));
                }
            }

            let mut transitions = BTreeMap::new();
            for (symbol, mut moved) in successors {
                moved.sort_by_key(|(core, _)| *core);
                let core: Vec<Core> = moved.iter().map(|(core, _)| *core).collect();
                let target = match index.get(&core) {
                    Some(&target) => target,
                    None => {
                        let target = states.len();
                        states.push(State {
                            kernel_lookaheads: vec![TerminalSet::default(); core.len()],
                            kernel: core.clone(),
                            ..State::default()
                        });
                        index.insert(core, target);
                        queued.push(false);
                        target
                    }
                };

                let mut changed = states[target].items.is_empty() && !queued[target];
                for (slot, (_, lookahead)) in moved.iter().enumerate() {
                    changed |= states[target].kernel_lookaheads[slot].union(lookahead);
                }
                if changed && !queued[target] {
                    queued[target] = true;
                    queue.push_back(target);
                }
                transitions.insert(symbol, target);
            }

            states[id].items = items;
            states[id].transitions = transitions;
        }

        Self {
            productions,
            augmented,
            states,
            first_sets,
        }
    }
}

fn closure(
    prepared: &Prepared,
    productions: &[GenProduction],
    by_lhs: &[Vec<usize>],
    first_sets: &FirstSets,
    kernel: &[Core],
    lookaheads: &[TerminalSet],
) -> Vec<Item> {
    let mut items: Vec<Item> = kernel
        .iter()
        .zip(lookaheads)
        .map(|(&(production, dot), lookahead)| Item {
            production,
            dot,
            lookahead: lookahead.clone(),
        })
        .collect();
    let mut positions: HashMap<Core, usize> = kernel
        .iter()
        .enumerate()
        .map(|(i, &core)| (core, i))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        let mut i = 0;
        while i < items.len() {
            let (production, dot) = (items[i].production, items[i].dot);
            let steps = &productions[production].steps;
            if let Some(Step {
                symbol: GSymbol::NonTerminal(next),
                ..
            }) = steps.get(dot)
            {
                let (mut lookahead, nullable) = first_sets.of_sequence(prepared, &steps[dot + 1..]);
                if nullable {
                    lookahead.union(&items[i].lookahead);
                }
                for &expanded in &by_lhs[*next] {
                    match positions.get(&(expanded, 0)) {
                        Some(&at) => changed |= items[at].lookahead.union(&lookahead),
                        None => {
                            positions.insert((expanded, 0), items.len());
                            items.push(Item {
                                production: expanded,
                                dot: 0,
                                lookahead: lookahead.clone(),
                            });
                            changed = true;
                        }
                    }
                }
            }
            i += 1;
        }
    }
    items
}
