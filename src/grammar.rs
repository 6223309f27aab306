use crate::OrderedSet;
use crate::error::ValidationError;
use crate::symbol::{Production, Symbol, Variable, is_reserved_terminal};
use alloc::string::String;
use core::fmt::{self, Display};
use core::iter;
use hashbrown::HashMap;

/// holds the rules of a grammar
///
/// `variables` keeps declaration order, which fixes both the canonical
/// rendering and the variable order of left recursion removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    variables: OrderedSet<Variable>,
    terminals: OrderedSet<char>,
    productions: HashMap<Variable, OrderedSet<Production>>,
    start: Variable,
}

impl Grammar {
    /// Builds a grammar from already tokenized parts.
    ///
    /// Several entries for the same head are merged in order.
    pub fn new<P, I>(
        variables: impl IntoIterator<Item = Variable>,
        terminals: impl IntoIterator<Item = char>,
        productions: P,
        start: Variable,
    ) -> Result<Self, ValidationError>
    where
        P: IntoIterator<Item = (Variable, I)>,
        I: IntoIterator<Item = Production>,
    {
        let mut map: HashMap<Variable, OrderedSet<Production>> = HashMap::new();
        for (head, prods) in productions {
            map.entry(head).or_default().extend(prods);
        }

        let grammar = Grammar {
            variables: variables.into_iter().collect(),
            terminals: terminals.into_iter().collect(),
            productions: map,
            start,
        };
        grammar.validate()?;
        Ok(grammar)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.variables.is_empty() {
            return Err(ValidationError::NoVariables);
        }
        if !self.variables.contains(&self.start) {
            return Err(ValidationError::MissingStart(self.start.clone()));
        }

        if let Some(v) = self.variables.iter().find(|v| !v.is_renderable()) {
            return Err(ValidationError::BadName(v.clone()));
        }
        for &t in self.terminals.iter() {
            if is_reserved_terminal(t) {
                return Err(ValidationError::ReservedTerminal(t));
            }
            if self.variables.contains(&Variable::new(t.encode_utf8(&mut [0; 4]))) {
                return Err(ValidationError::Overlap(t));
            }
        }

        for v in self.variables.iter() {
            if !self.productions.contains_key(v) {
                return Err(ValidationError::MissingProductions(v.clone()));
            }
        }
        if let Some(head) = self.productions.keys().find(|k| !self.variables.contains(*k)) {
            return Err(ValidationError::DanglingProductions(head.clone()));
        }

        for head in self.variables.iter() {
            for production in self.productions[head].iter() {
                let undeclared = production.iter().find(|s| match s {
                    Symbol::Terminal(t) => !self.terminals.contains(t),
                    Symbol::Variable(v) => !self.variables.contains(v),
                });
                if let Some(symbol) = undeclared {
                    return Err(ValidationError::UndeclaredSymbol {
                        head: head.clone(),
                        production: production.clone(),
                        symbol: symbol.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn start(&self) -> &Variable {
        &self.start
    }

    /// declaration order
    pub fn variables(&self) -> &OrderedSet<Variable> {
        &self.variables
    }

    pub fn terminals(&self) -> &OrderedSet<char> {
        &self.terminals
    }

    pub fn productions(&self, v: &Variable) -> Option<&OrderedSet<Production>> {
        self.productions.get(v)
    }

    /// All rules, start first, then the remaining variables in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&Variable, &OrderedSet<Production>)> {
        iter::once(&self.start)
            .chain(self.variables.iter().filter(move |v| **v != self.start))
            .map(move |v| (v, &self.productions[v]))
    }

    pub fn production_count(&self) -> usize {
        self.productions.values().map(OrderedSet::len).sum()
    }

    /// Whether `v` occurs in the body of any production.
    pub fn is_referenced(&self, v: &Variable) -> bool {
        self.productions
            .values()
            .flatten()
            .any(|p| p.iter().any(|s| s.as_variable() == Some(v)))
    }

    /// A variable named `base` with primes appended until the name is unused.
    pub fn fresh_variable(&self, base: &str) -> Variable {
        let mut name = String::from(base);
        loop {
            let candidate = Variable::new(&name);
            let clashes_terminal = candidate.is_simple()
                && name.chars().next().is_some_and(|c| self.terminals.contains(&c));
            if !self.variables.contains(&candidate) && !clashes_terminal {
                return candidate;
            }
            name.push('\'');
        }
    }

    // ---------------------------------------------------------------------
    // in-place editing used by the transforms; callers keep the invariants
    // ---------------------------------------------------------------------

    pub(crate) fn rules_of(&self, v: &Variable) -> &OrderedSet<Production> {
        &self.productions[v]
    }

    pub(crate) fn set_rules(&mut self, v: &Variable, prods: OrderedSet<Production>) {
        self.productions.insert(v.clone(), prods);
    }

    pub(crate) fn rules_mut(&mut self, v: &Variable) -> &mut OrderedSet<Production> {
        self.productions.entry(v.clone()).or_default()
    }

    /// Declares `v` with no productions, right after `after` or at the end.
    pub(crate) fn declare(&mut self, v: Variable, after: Option<&Variable>) {
        let index = after
            .and_then(|a| self.variables.get_index_of(a))
            .map_or(self.variables.len(), |i| i + 1);
        self.productions.entry(v.clone()).or_default();
        self.variables.shift_insert(index, v);
    }

    /// Declares `v` as the first variable and makes it the start symbol.
    pub(crate) fn declare_start(&mut self, v: Variable) {
        self.productions.entry(v.clone()).or_default();
        self.variables.shift_insert(0, v.clone());
        self.start = v;
    }

    pub(crate) fn retain_variables(&mut self, mut keep: impl FnMut(&Variable) -> bool) {
        self.variables.retain(|v| keep(v));
        let variables = &self.variables;
        self.productions.retain(|v, _| variables.contains(v));
    }

    #[inline]
    pub(crate) fn debug_check(&self) {
        debug_assert_eq!(self.validate(), Ok(()), "transform broke an invariant:\n{}", self);
    }
}

/// canonical rendering: `head -> alt1 | alt2 | ...`, one line per variable
impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (head, prods) in self.rules() {
            write!(f, "{} ->", head)?;
            for (i, p) in prods.iter().enumerate() {
                if i > 0 {
                    f.write_str(" |")?;
                }
                write!(f, " {}", p)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
