//! useless.rs – pruning of unproductive and unreachable variables

use crate::error::EmptyLanguage;
use crate::graph::{EdgeKind, Graph};
use crate::grammar::Grammar;
use crate::symbol::{Symbol, Variable};
use alloc::vec::Vec;
use hashbrown::HashSet;
use log::debug;

impl Grammar {
    /// Variables that derive some finite terminal string.
    pub fn productive_variables(&self) -> HashSet<Variable> {
        let mut productive = HashSet::new();
        loop {
            let mut changed = false;
            for (head, prods) in self.rules() {
                if productive.contains(head) {
                    continue;
                }
                let terminates = prods.iter().any(|p| {
                    p.iter().all(|s| match s {
                        Symbol::Terminal(_) => true,
                        Symbol::Variable(v) => productive.contains(v),
                    })
                });
                if terminates {
                    productive.insert(head.clone());
                    changed = true;
                }
            }
            if !changed {
                return productive;
            }
        }
    }

    /// Drops every production mentioning an unproductive variable, then the
    /// unproductive variables themselves.
    ///
    /// Fails with [`EmptyLanguage`] when the start symbol is unproductive.
    pub fn remove_unproductives(self) -> Result<Grammar, EmptyLanguage> {
        let productive = self.productive_variables();
        if !productive.contains(self.start()) {
            return Err(EmptyLanguage {
                start: self.start().clone(),
            });
        }

        let mut g = self;
        let heads: Vec<Variable> = g.variables().iter().cloned().collect();
        for head in heads.iter() {
            g.rules_mut(head).retain(|p| {
                p.iter()
                    .filter_map(Symbol::as_variable)
                    .all(|v| productive.contains(v))
            });
        }
        let before = g.variables().len();
        g.retain_variables(|v| productive.contains(v));
        debug!("removed {} unproductive variables", before - g.variables().len());

        g.debug_check();
        Ok(g)
    }

    /// Drops every variable the start symbol cannot reach.
    pub fn remove_unreachables(self) -> Grammar {
        let graph = Graph::from_grammar(&self, EdgeKind::Reach);
        let reached = graph.bfs(&Symbol::Variable(self.start().clone()));

        let mut g = self;
        let before = g.variables().len();
        g.retain_variables(|v| reached.contains(&Symbol::Variable(v.clone())));
        debug!("removed {} unreachable variables", before - g.variables().len());

        g.debug_check();
        g
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use crate::error::EmptyLanguage;
    use crate::grammar::Grammar;
    use crate::symbol::Variable;

    fn g(text: &str) -> Grammar {
        text.parse().expect("grammar text")
    }

    #[test]
    fn unproductive_rules_go_first() {
        let out = g("S -> AB | a\nA -> aA\nB -> b\n")
            .remove_unproductives()
            .unwrap();
        assert_eq!(out.to_string(), "S -> a\nB -> b\n");
    }

    #[test]
    fn productivity_needs_a_terminating_rule() {
        let grammar = g("S -> A | B\nA -> aA | b\nB -> BB\n");
        let productive = grammar.productive_variables();
        assert!(productive.contains(&Variable::new("A")));
        assert!(productive.contains(&Variable::new("S")));
        assert!(!productive.contains(&Variable::new("B")));
    }

    #[test]
    fn epsilon_counts_as_productive() {
        let out = g("S -> Ab\nA -> &\n").remove_unproductives().unwrap();
        assert_eq!(out.to_string(), "S -> Ab\nA -> &\n");
    }

    #[test]
    fn empty_language_is_explicit() {
        assert_eq!(
            g("S -> aS | A\nA -> Sb\n").remove_unproductives(),
            Err(EmptyLanguage {
                start: Variable::new("S")
            })
        );
    }

    #[test]
    fn unreachables_are_dropped() {
        let out = g("S -> aA\nA -> b\nB -> C\nC -> c\n").remove_unreachables();
        assert_eq!(out.to_string(), "S -> aA\nA -> b\n");
    }

    #[test]
    fn unreachable_removal_is_idempotent() {
        let once = g("S -> A | a\nA -> a\nB -> S\n").remove_unreachables();
        assert_eq!(once.clone().remove_unreachables(), once);
    }
}
