use crate::OrderedSet;
use crate::error::PreconditionError;
use crate::graph::{EdgeKind, Graph};
use crate::grammar::Grammar;
use crate::symbol::{Production, Symbol, Variable};
use alloc::format;
use alloc::vec::Vec;
use core::{iter, slice};
use either::Either;
use log::debug;

impl Grammar {
    /// The first variable, in declaration order, that can reach itself through
    /// the leading symbols of its productions.
    pub fn left_recursive_variable(&self) -> Option<&Variable> {
        let graph = Graph::from_grammar(self, EdgeKind::LeftCorner);
        self.variables()
            .iter()
            .find(|v| graph.has_loop(&Symbol::Variable((*v).clone())))
    }

    pub fn has_left_recursion(&self) -> bool {
        self.left_recursive_variable().is_some()
    }

    /// Rewrites direct and indirect left recursion into right recursion.
    ///
    /// The grammar must be epsilon free (a start that occurs in no body may
    /// keep `S -> &`) and free of unit cycles.
    pub fn remove_left_recursion(self) -> Result<Grammar, PreconditionError> {
        for (head, prods) in self.rules() {
            let allowed = head == self.start() && !self.is_referenced(head);
            if !allowed && prods.iter().any(Production::is_epsilon) {
                return Err(PreconditionError::EpsilonProduction(head.clone()));
            }
        }
        if let Some(v) = self.unit_cycle() {
            return Err(PreconditionError::Cycle(v.clone()));
        }

        let order: Vec<Variable> = self.variables().iter().cloned().collect();
        let mut g = self;
        for (i, ai) in order.iter().enumerate() {
            for aj in order[..i].iter() {
                if !g.rules_of(ai).iter().any(|p| p.leading_variable() == Some(aj)) {
                    continue;
                }
                let betas = g.rules_of(aj);
                let substituted: OrderedSet<Production> = g
                    .rules_of(ai)
                    .iter()
                    .flat_map(|p| {
                        if p.leading_variable() == Some(aj) {
                            Either::Left(betas.iter().map(move |b| Production::splice(b, &p[1..])))
                        } else {
                            Either::Right(iter::once(p.clone()))
                        }
                    })
                    .collect();
                g.set_rules(ai, substituted);
            }
            remove_direct(&mut g, ai);
        }

        g.debug_check();
        Ok(g)
    }
}

/// `A -> Aα | β`  becomes  `A -> βA'`, `A' -> αA' | &`
fn remove_direct(g: &mut Grammar, head: &Variable) {
    let (recursive, rest): (Vec<Production>, Vec<Production>) = g
        .rules_of(head)
        .iter()
        .cloned()
        .partition(|p| p.leading_variable() == Some(head));
    if recursive.is_empty() {
        return;
    }
    if rest.is_empty() {
        // A -> Aα only: A derives no terminal string
        debug!("every production of {} is left recursive, dropping them", head);
        g.set_rules(head, OrderedSet::default());
        return;
    }

    let primed = g.fresh_variable(&format!("{}'", head.name()));
    debug!("splitting left recursive {} into {} and {}", head, head, primed);
    let tail = Symbol::Variable(primed.clone());

    g.set_rules(
        head,
        rest.iter()
            .map(|b| Production::splice(b, slice::from_ref(&tail)))
            .collect(),
    );
    g.declare(primed.clone(), Some(head));
    let rules = g.rules_mut(&primed);
    rules.extend(
        recursive
            .iter()
            .map(|p| Production::splice(&p[1..], slice::from_ref(&tail))),
    );
    rules.insert(Production::epsilon());
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use crate::error::PreconditionError;
    use crate::grammar::Grammar;
    use crate::symbol::Variable;

    fn g(text: &str) -> Grammar {
        text.parse().expect("grammar text")
    }

    #[test]
    fn direct_recursion() {
        let grammar = g("S -> Sa | b\n");
        assert_eq!(grammar.left_recursive_variable(), Some(&Variable::new("S")));
        let out = grammar.remove_left_recursion().unwrap();
        assert_eq!(out.to_string(), "S -> b❬S'❭\n❬S'❭ -> a❬S'❭ | &\n");
        assert!(!out.has_left_recursion());
    }

    #[test]
    fn expression_grammar() {
        let out = g("E -> E+T | T\nT -> T*F | F\nF -> (E) | a\n")
            .remove_left_recursion()
            .unwrap();
        assert_eq!(
            out.to_string(),
            "E -> T❬E'❭\n❬E'❭ -> +T❬E'❭ | &\nT -> F❬T'❭\n❬T'❭ -> *F❬T'❭ | &\nF -> (E) | a\n"
        );
        assert!(!out.has_left_recursion());
    }

    #[test]
    fn indirect_recursion_through_earlier_variable() {
        let grammar = g("S -> Aa | b\nA -> Ac | Sd | e\n");
        assert!(grammar.has_left_recursion());
        let out = grammar.remove_left_recursion().unwrap();
        assert_eq!(
            out.to_string(),
            "S -> Aa | b\nA -> bd❬A'❭ | e❬A'❭\n❬A'❭ -> c❬A'❭ | ad❬A'❭ | &\n"
        );
        assert!(!out.has_left_recursion());
    }

    #[test]
    fn hopeless_variable_loses_its_rules() {
        let out = g("S -> a | A\nA -> Ab\n").remove_left_recursion().unwrap();
        assert_eq!(out.to_string(), "S -> a | A\nA ->\n");
    }

    #[test]
    fn untouched_when_not_recursive() {
        let grammar = g("S -> aA | b\nA -> c\n");
        let out = grammar.clone().remove_left_recursion().unwrap();
        assert_eq!(out, grammar);
    }

    #[test]
    fn preconditions() {
        assert_eq!(
            g("S -> Sa | A\nA -> a | &\n").remove_left_recursion(),
            Err(PreconditionError::EpsilonProduction(Variable::new("A")))
        );
        assert_eq!(
            g("S -> A | a\nA -> S\n").remove_left_recursion(),
            Err(PreconditionError::Cycle(Variable::new("S")))
        );
        assert!(
            g("S -> Ab | &\nA -> Aa | a\n").remove_left_recursion().is_ok(),
            "unreferenced start may keep epsilon"
        );
    }
}
