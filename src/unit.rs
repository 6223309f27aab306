use crate::OrderedSet;
use crate::graph::{EdgeKind, Graph};
use crate::grammar::Grammar;
use crate::symbol::{Symbol, Variable};
use alloc::vec::Vec;
use log::debug;

impl Grammar {
    /// Replaces unit productions `A -> B` by the non-unit productions of every
    /// variable reachable through unit edges. Unit cycles disappear with them.
    pub fn remove_unit(self) -> Grammar {
        let graph = Graph::from_grammar(&self, EdgeKind::Unit);
        let heads: Vec<Variable> = self.variables().iter().cloned().collect();

        let mut closed: Vec<(Variable, OrderedSet<_>)> = Vec::with_capacity(heads.len());
        for head in heads {
            let mut rules = OrderedSet::default();
            for reached in graph.bfs(&Symbol::Variable(head.clone())).iter() {
                let Symbol::Variable(c) = reached else {
                    continue;
                };
                rules.extend(self.rules_of(c).iter().filter(|p| p.unit().is_none()).cloned());
            }
            if rules.is_empty() && !self.rules_of(&head).is_empty() {
                debug!("{} only reaches unit cycles and loses all productions", head);
            }
            closed.push((head, rules));
        }

        let mut g = self;
        for (head, rules) in closed {
            g.set_rules(&head, rules);
        }
        g.debug_check();
        g
    }

    /// The first variable that can reach itself through unit productions.
    pub fn unit_cycle(&self) -> Option<&Variable> {
        let graph = Graph::from_grammar(self, EdgeKind::Unit);
        self.variables()
            .iter()
            .find(|v| graph.has_loop(&Symbol::Variable((*v).clone())))
    }
}
