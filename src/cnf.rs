//! cnf.rs – Chomsky normal form
//!
//! The last two stages only make sense on a grammar without epsilon, unit
//! and useless productions; [`Grammar::convert_to_cnf`] runs the whole chain.

use crate::OrderedSet;
use crate::error::EmptyLanguage;
use crate::grammar::Grammar;
use crate::symbol::{Production, Symbol, Variable};
use alloc::format;
use alloc::vec::Vec;
use hashbrown::HashMap;
use log::debug;

impl Grammar {
    /// epsilon → unit → unproductive → unreachable → terminals → size
    pub fn convert_to_cnf(self) -> Result<Grammar, EmptyLanguage> {
        let g = self
            .remove_epsilon()
            .remove_unit()
            .remove_unproductives()?
            .remove_unreachables()
            .replace_terminals()
            .reduce_size();
        debug!(
            "CNF grammar has {} variables and {} productions",
            g.variables().len(),
            g.production_count()
        );
        Ok(g)
    }

    /// Replaces terminals inside productions of length ≥ 2 by variables
    /// whose only production is that terminal.
    pub fn replace_terminals(self) -> Grammar {
        let mut isolating: HashMap<char, Variable> = HashMap::new();
        for v in self.variables().iter() {
            let rules = self.rules_of(v);
            if let (1, Some([Symbol::Terminal(t)])) = (rules.len(), rules.first().map(|p| &**p)) {
                isolating.entry(*t).or_insert_with(|| v.clone());
            }
        }

        let heads: Vec<Variable> = self.variables().iter().cloned().collect();
        let mut g = self;
        for head in heads.iter() {
            let needs_work = g
                .rules_of(head)
                .iter()
                .any(|p| p.len() >= 2 && p.iter().any(Symbol::is_terminal));
            if !needs_work {
                continue;
            }

            let prods = g.rules_of(head).clone();
            let mut rewritten = OrderedSet::default();
            for p in prods.iter() {
                if p.len() < 2 {
                    rewritten.insert(p.clone());
                    continue;
                }
                let body: Production = p
                    .iter()
                    .map(|s| match s {
                        Symbol::Terminal(t) => Symbol::Variable(isolator(&mut g, &mut isolating, *t)),
                        other => other.clone(),
                    })
                    .collect();
                rewritten.insert(body);
            }
            g.set_rules(head, rewritten);
        }

        g.debug_check();
        g
    }

    /// Splits productions longer than two symbols into chains of fresh
    /// binary variables: `X -> s1 s2 s3` becomes `X -> s1 C1`, `C1 -> s2 s3`.
    pub fn reduce_size(self) -> Grammar {
        let heads: Vec<Variable> = self.variables().iter().cloned().collect();
        let mut g = self;
        let mut counter = 0usize;
        for head in heads.iter() {
            if !g.rules_of(head).iter().any(|p| p.len() > 2) {
                continue;
            }

            let prods = g.rules_of(head).clone();
            let mut rewritten = OrderedSet::default();
            for p in prods.iter() {
                if p.len() <= 2 {
                    rewritten.insert(p.clone());
                    continue;
                }

                let chain: Vec<Variable> = (0..p.len() - 2)
                    .map(|_| {
                        counter += 1;
                        let link = g.fresh_variable(&format!("C{}", counter));
                        g.declare(link.clone(), None);
                        link
                    })
                    .collect();

                rewritten.insert(pair(&p[0], &Symbol::Variable(chain[0].clone())));
                for (k, link) in chain.iter().enumerate() {
                    let body = match chain.get(k + 1) {
                        Some(next) => pair(&p[k + 1], &Symbol::Variable(next.clone())),
                        None => pair(&p[k + 1], &p[k + 2]),
                    };
                    g.rules_mut(link).insert(body);
                }
            }
            g.set_rules(head, rewritten);
        }

        g.debug_check();
        g
    }

    /// Every production is one terminal or two variables; only a start that
    /// occurs in no body may derive epsilon.
    pub fn is_cnf(&self) -> bool {
        let start_free = !self.is_referenced(self.start());
        self.rules().all(|(head, prods)| {
            prods.iter().all(|p| match &**p {
                [] => head == self.start() && start_free,
                [Symbol::Terminal(_)] => true,
                [Symbol::Variable(_), Symbol::Variable(_)] => true,
                _ => false,
            })
        })
    }
}

fn pair(a: &Symbol, b: &Symbol) -> Production {
    Production::new(alloc::vec![a.clone(), b.clone()])
}

fn isolator(g: &mut Grammar, isolating: &mut HashMap<char, Variable>, t: char) -> Variable {
    if let Some(v) = isolating.get(&t) {
        return v.clone();
    }
    let v = g.fresh_variable(&format!("T{}", t));
    g.declare(v.clone(), None);
    g.rules_mut(&v).insert(Production::new(alloc::vec![Symbol::Terminal(t)]));
    isolating.insert(t, v.clone());
    v
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use crate::grammar::Grammar;

    fn g(text: &str) -> Grammar {
        text.parse().expect("grammar text")
    }

    #[test]
    fn terminals_are_isolated_once() {
        let out = g("S -> cSc | d\n").replace_terminals();
        assert_eq!(out.to_string(), "S -> ❬Tc❭S❬Tc❭ | d\n❬Tc❭ -> c\n");
    }

    #[test]
    fn existing_isolating_variables_are_reused() {
        let out = g("S -> aB | b\nA -> a\nB -> b\n").replace_terminals();
        assert_eq!(out.to_string(), "S -> AB | b\nA -> a\nB -> b\n");
    }

    #[test]
    fn long_productions_become_chains() {
        let out = g("S -> abc\n").replace_terminals().reduce_size();
        assert_eq!(
            out.to_string(),
            "S -> ❬Ta❭❬C1❭\n❬Ta❭ -> a\n❬Tb❭ -> b\n❬Tc❭ -> c\n❬C1❭ -> ❬Tb❭❬Tc❭\n"
        );
        assert!(out.is_cnf());
    }

    #[test]
    fn chains_are_unique_per_production() {
        let out = g("S -> ABCD | BCDA\nA -> a\nB -> b\nC -> c\nD -> d\n").reduce_size();
        assert_eq!(
            out.to_string(),
            "S -> A❬C1❭ | B❬C3❭\nA -> a\nB -> b\nC -> c\nD -> d\n\
             ❬C1❭ -> B❬C2❭\n❬C2❭ -> CD\n❬C3❭ -> C❬C4❭\n❬C4❭ -> DA\n"
        );
    }

    #[test]
    fn full_pipeline() {
        let out = g("S -> ASA | aB\nA -> B | S\nB -> b | &\n").convert_to_cnf().unwrap();
        assert!(out.is_cnf(), "not in CNF:\n{}", out);
        assert!(!g("S -> ASA | aB\nA -> B | S\nB -> b | &\n").is_cnf());
    }

    #[test]
    fn nullable_start_keeps_epsilon() {
        let out = g("S -> aSb | &\n").convert_to_cnf().unwrap();
        assert!(out.is_cnf(), "not in CNF:\n{}", out);
        assert!(out.productions(out.start()).unwrap().iter().any(|p| p.is_epsilon()));
    }

    #[test]
    fn empty_language_propagates() {
        assert!(g("S -> aS\n").convert_to_cnf().is_err());
    }
}
