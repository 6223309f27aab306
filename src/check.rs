//! check.rs – FIRST/FOLLOW sets and the LL(1) parse table
//!
//! ## Core design choices
//!
//! * Terminals are wrapped in [`Lookahead`] so that the *artificial* symbols
//!   **ε** (`Empty`) and **$** (`Eof`) travel through the same sets as real
//!   terminals.
//! * [`FirstFollow`] is computed in one go from a grammar and never updated;
//!   a changed grammar gets a fresh analysis.
//! * FOLLOW is solved in two passes: a scan over every production that seeds
//!   the sets and records which FOLLOW sets flow into which, then a worklist
//!   that propagates along those edges until nothing grows.
//!
//! ## Usage
//!
//! ```rust
//! use context_free::{Grammar, Lookahead, Variable};
//!
//! let g: Grammar = "S -> aA | b\nA -> aA | &\n".parse().unwrap();
//! let table = g.ll1_table().expect("grammar should be LL(1)");
//! let a = Variable::new("A");
//! assert_eq!(table.get(&a, Lookahead::Eof).unwrap().to_string(), "&");
//! assert!(table.get(&a, Lookahead::Term('b')).is_none());
//! ```

use crate::error::{ConflictError, Error, PreconditionError};
use crate::grammar::Grammar;
use crate::symbol::{Lookahead, Production, Symbol, Variable};
use crate::{OrderedMap, OrderedSet};
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use log::debug;

pub type LookaheadSet = OrderedSet<Lookahead>;

/// FIRST and FOLLOW sets of one grammar
#[derive(Debug, Clone, PartialEq)]
pub struct FirstFollow {
    /// FIRST(A)  (includes `Empty` iff A is nullable)
    first: HashMap<Variable, LookaheadSet>,

    /// FOLLOW(A) (may contain `Lookahead::Eof`)
    follow: HashMap<Variable, LookaheadSet>,

    /// declaration order, used to report in a stable order
    order: Vec<Variable>,
}

impl Grammar {
    /// Computes FIRST and FOLLOW.  Left recursive grammars are refused.
    pub fn first_follow(&self) -> Result<FirstFollow, PreconditionError> {
        if let Some(v) = self.left_recursive_variable() {
            return Err(PreconditionError::LeftRecursion(v.clone()));
        }
        Ok(FirstFollow::compute(self))
    }

    /// Builds the LL(1) table, failing on the first cell two productions claim.
    pub fn ll1_table(&self) -> Result<Table, Error> {
        let sets = self.first_follow()?;
        Ok(sets.ll1_table(self)?)
    }
}

impl FirstFollow {
    pub(crate) fn compute(grammar: &Grammar) -> Self {
        let mut sets = FirstFollow {
            first: HashMap::new(),
            follow: HashMap::new(),
            order: grammar.variables().iter().cloned().collect(),
        };
        sets.calculate_first(grammar);
        sets.calculate_follow(grammar);
        sets
    }

    pub fn first(&self, v: &Variable) -> Option<&LookaheadSet> {
        self.first.get(v)
    }

    pub fn follow(&self, v: &Variable) -> Option<&LookaheadSet> {
        self.follow.get(v)
    }

    pub fn is_nullable(&self, v: &Variable) -> bool {
        self.first.get(v).is_some_and(|f| f.contains(&Lookahead::Empty))
    }

    pub fn first_of(&self, symbol: &Symbol) -> LookaheadSet {
        self.first_of_sequence(core::slice::from_ref(symbol))
    }

    /// FIRST of a symbol string; contains `Empty` iff every symbol is nullable.
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> LookaheadSet {
        let mut out = LookaheadSet::default();
        for s in symbols {
            match s {
                Symbol::Terminal(t) => {
                    out.insert(Lookahead::Term(*t));
                    return out;
                }
                Symbol::Variable(v) => {
                    let mut nullable = false;
                    for x in self.first.get(v).into_iter().flatten() {
                        if *x == Lookahead::Empty {
                            nullable = true;
                        } else {
                            out.insert(*x);
                        }
                    }
                    if !nullable {
                        return out;
                    }
                }
            }
        }
        out.insert(Lookahead::Empty);
        out
    }

    fn calculate_first(&mut self, grammar: &Grammar) {
        for v in grammar.variables().iter() {
            self.first.entry(v.clone()).or_default();
        }
        loop {
            let mut changed = false;
            for (head, prods) in grammar.rules() {
                for p in prods.iter() {
                    let set = self.first_of_sequence(p);
                    let me = self.first.entry(head.clone()).or_default();
                    for x in set {
                        changed |= me.insert(x);
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    ///makes sure FOLLOW is valid
    ///**Dependencies:** depends on a valid FIRST
    fn calculate_follow(&mut self, grammar: &Grammar) {
        for v in grammar.variables().iter() {
            self.follow.entry(v.clone()).or_default();
        }
        self.follow
            .entry(grammar.start().clone())
            .or_default()
            .insert(Lookahead::Eof);

        // FOLLOW(head) ⊆ FOLLOW(v) whenever v ends a production up to nullables
        let mut follow_update: HashMap<Variable, OrderedSet<Variable>> = HashMap::new();
        for (head, prods) in grammar.rules() {
            for p in prods.iter() {
                for (i, s) in p.iter().enumerate() {
                    let Symbol::Variable(v) = s else {
                        continue;
                    };
                    let rest = self.first_of_sequence(&p[i + 1..]);
                    let spot = self.follow.entry(v.clone()).or_default();
                    for x in rest.iter() {
                        if *x != Lookahead::Empty {
                            spot.insert(*x);
                        }
                    }
                    if v != head && rest.contains(&Lookahead::Empty) {
                        follow_update
                            .entry(head.clone())
                            .or_default()
                            .insert(v.clone());
                    }
                }
            }
        }

        let mut queue: VecDeque<Variable> = self.order.iter().cloned().collect();
        let mut in_queue: HashSet<Variable> = queue.iter().cloned().collect();

        while let Some(u) = queue.pop_front() {
            in_queue.remove(&u);

            let src: Vec<Lookahead> = self.follow[&u].iter().copied().collect();

            // for every edge  u → v
            if let Some(dests) = follow_update.get(&u) {
                for v in dests {
                    let dest = self.follow.entry(v.clone()).or_default();

                    let mut grew = false;
                    for sym in &src {
                        grew |= dest.insert(*sym);
                    }

                    // if FOLLOW(v) grew, (re)-enqueue v exactly once
                    if grew && in_queue.insert(v.clone()) {
                        queue.push_back(v.clone());
                    }
                }
            }
        }
    }

    /// Fills the parse table, aborting at the first conflicting cell.
    ///
    /// Variables these sets know nothing about get empty FIRST and FOLLOW.
    pub fn ll1_table(&self, grammar: &Grammar) -> Result<Table, ConflictError> {
        let mut table = Table::new(grammar.start().clone());
        for (head, prods) in grammar.rules() {
            for p in prods.iter() {
                let first = self.first_of_sequence(p);
                for x in first.iter().filter(|x| **x != Lookahead::Empty) {
                    table.insert(head, *x, p)?;
                }
                if first.contains(&Lookahead::Empty) {
                    for x in self.follow.get(head).into_iter().flatten() {
                        table.insert(head, *x, p)?;
                    }
                }
            }
        }
        Ok(table)
    }

    /// Every terminal that begins two or more alternatives of one variable,
    /// with those alternatives.
    pub fn first_first_conflicts(&self, grammar: &Grammar) -> Vec<(Variable, char, Vec<Production>)> {
        let mut out = Vec::new();
        for head in self.order.iter() {
            let mut claims: OrderedMap<char, Vec<Production>> = OrderedMap::default();
            for p in grammar.productions(head).into_iter().flatten() {
                for x in self.first_of_sequence(p) {
                    if let Lookahead::Term(t) = x {
                        claims.entry(t).or_default().push(p.clone());
                    }
                }
            }
            out.extend(
                claims
                    .into_iter()
                    .filter(|(_, prods)| prods.len() > 1)
                    .map(|(t, prods)| (head.clone(), t, prods)),
            );
        }
        out
    }

    /// Produces FIRST/FOLLOW conflicts – i.e. the intersection FIRST(A) ∩ FOLLOW(A)
    /// for every nullable variable A.
    pub fn first_follow_conflicts(&self) -> Vec<(Variable, LookaheadSet)> {
        self.order
            .iter()
            .filter(|v| self.is_nullable(v))
            .filter_map(|v| {
                let follow = self.follow.get(v)?;
                let overlap: LookaheadSet = self.first[v]
                    .iter()
                    .filter(|x| follow.contains(*x))
                    .copied()
                    .collect();
                (!overlap.is_empty()).then(|| (v.clone(), overlap))
            })
            .collect()
    }
}

/// Dense parse table mapping `(variable, lookahead)` to a **single** production.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    start: Variable,
    cells: HashMap<Variable, HashMap<Lookahead, Production>>,
}

impl Table {
    fn new(start: Variable) -> Self {
        Table {
            start,
            cells: HashMap::new(),
        }
    }

    pub fn start(&self) -> &Variable {
        &self.start
    }

    pub fn get(&self, v: &Variable, lookahead: Lookahead) -> Option<&Production> {
        self.cells.get(v)?.get(&lookahead)
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, Lookahead, &Production)> {
        self.cells
            .iter()
            .flat_map(|(v, row)| row.iter().map(move |(k, p)| (v, *k, p)))
    }

    fn insert(&mut self, v: &Variable, lookahead: Lookahead, p: &Production) -> Result<(), ConflictError> {
        match self.cells.entry(v.clone()).or_default().entry(lookahead) {
            Entry::Vacant(cell) => {
                cell.insert(p.clone());
                Ok(())
            }
            Entry::Occupied(cell) if cell.get() == p => Ok(()),
            Entry::Occupied(cell) => {
                debug!("LL(1) conflict at ({}, {}): {} vs {}", v, lookahead, cell.get(), p);
                Err(ConflictError {
                    variable: v.clone(),
                    lookahead,
                    existing: cell.get().clone(),
                    incoming: p.clone(),
                })
            }
        }
    }
}
