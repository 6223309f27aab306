//! epsilon.rs – nullable analysis and epsilon production removal

use crate::OrderedSet;
use crate::grammar::Grammar;
use crate::symbol::{Production, Symbol, Variable};
use alloc::vec;
use alloc::vec::Vec;
use hashbrown::HashSet;
use log::debug;

impl Grammar {
    /// Variables that derive the empty string.
    pub fn nullable_variables(&self) -> HashSet<Variable> {
        let mut nullable = HashSet::new();
        loop {
            let mut changed = false;
            for (head, prods) in self.rules() {
                if nullable.contains(head) {
                    continue;
                }
                let derives_empty = prods.iter().any(|p| {
                    p.iter().all(|s| match s {
                        Symbol::Terminal(_) => false,
                        Symbol::Variable(v) => nullable.contains(v),
                    })
                });
                if derives_empty {
                    nullable.insert(head.clone());
                    changed = true;
                }
            }
            if !changed {
                return nullable;
            }
        }
    }

    /// Removes every epsilon production while keeping the language.
    ///
    /// A nullable start that occurs in some body is replaced by a fresh start
    /// `S' -> S | &`; a nullable start that occurs in no body keeps `S -> &`.
    /// Either way only the start may derive epsilon directly afterwards.
    pub fn remove_epsilon(self) -> Grammar {
        let nullable = self.nullable_variables();
        let start_nullable = nullable.contains(self.start());
        let augment = start_nullable && self.is_referenced(self.start());

        let mut g = self;
        let heads: Vec<Variable> = g.variables().iter().cloned().collect();
        for head in heads.iter() {
            let keep_epsilon = start_nullable && !augment && head == g.start();
            let mut cut = OrderedSet::default();
            for p in g.rules_of(head).iter() {
                if p.is_epsilon() {
                    if keep_epsilon {
                        cut.insert(Production::epsilon());
                    }
                    continue;
                }
                cuts(p, &nullable, &mut cut);
            }
            if keep_epsilon && !cut.contains(&Production::epsilon()) {
                cut.insert(Production::epsilon());
            }
            g.set_rules(head, cut);
        }

        if augment {
            let old = g.start().clone();
            let new = g.fresh_variable(&alloc::format!("{}'", old.name()));
            debug!("{} is nullable, augmenting with start {}", old, new);
            g.declare_start(new.clone());
            let rules = g.rules_mut(&new);
            rules.insert(Production::new(alloc::vec![Symbol::Variable(old)]));
            rules.insert(Production::epsilon());
        }

        g.debug_check();
        g
    }
}

/// every non-empty way of striking nullable occurrences from `p`, in mask order
fn cuts(p: &Production, nullable: &HashSet<Variable>, out: &mut OrderedSet<Production>) {
    let positions: Vec<usize> = p
        .iter()
        .enumerate()
        .filter(|(_, s)| s.as_variable().is_some_and(|v| nullable.contains(v)))
        .map(|(i, _)| i)
        .collect();

    // little endian counter over the nullable occurrences, one bit each
    let mut struck = vec![false; positions.len()];
    loop {
        let cut: Production = p
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                positions
                    .iter()
                    .position(|pos| pos == i)
                    .is_none_or(|bit| !struck[bit])
            })
            .map(|(_, s)| s.clone())
            .collect();
        if !cut.is_epsilon() {
            out.insert(cut);
        }

        let Some(zero) = struck.iter().position(|bit| !bit) else {
            break;
        };
        struck[..zero].fill(false);
        struck[zero] = true;
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::Grammar;
    use crate::symbol::{Production, Variable};
    use alloc::string::ToString;
    use alloc::vec::Vec;

    fn g(text: &str) -> Grammar {
        text.parse().expect("grammar text")
    }

    fn alts(g: &Grammar, v: &str) -> Vec<alloc::string::String> {
        g.productions(&Variable::new(v))
            .expect("declared")
            .iter()
            .map(Production::to_string)
            .collect()
    }

    #[test]
    fn nullable_propagates() {
        let grammar = g("S -> AB | c\nA -> & | a\nB -> A | C\nC -> c\n");
        let nullable = grammar.nullable_variables();
        assert!(nullable.contains(&Variable::new("A")));
        assert!(nullable.contains(&Variable::new("B")));
        assert!(nullable.contains(&Variable::new("S")));
        assert!(!nullable.contains(&Variable::new("C")));
    }

    #[test]
    fn all_cuts_in_mask_order() {
        let out = g("S -> AbA\nA -> a | &\n").remove_epsilon();
        assert_eq!(alts(&out, "S"), ["AbA", "bA", "Ab", "b"]);
        assert_eq!(alts(&out, "A"), ["a"]);
        assert_eq!(out.start(), &Variable::new("S"), "b keeps S non-nullable");
    }

    #[test]
    fn referenced_nullable_start_is_augmented() {
        let out = g("S -> aSb | &\n").remove_epsilon();
        assert_eq!(out.start(), &Variable::new("S'"));
        assert_eq!(out.to_string(), "❬S'❭ -> S | &\nS -> aSb | ab\n");
    }

    #[test]
    fn unreferenced_nullable_start_keeps_epsilon() {
        let out = g("S -> AB\nA -> a | &\nB -> b | &\n").remove_epsilon();
        assert_eq!(out.start(), &Variable::new("S"));
        assert_eq!(alts(&out, "S"), ["AB", "B", "A", "&"]);
        assert_eq!(alts(&out, "A"), ["a"]);
    }

    #[test]
    fn only_epsilon_leaves_variable_empty() {
        let out = g("S -> aA\nA -> &\n").remove_epsilon();
        assert_eq!(alts(&out, "S"), ["aA", "a"]);
        assert!(alts(&out, "A").is_empty());
    }

    #[test]
    fn every_subset_of_many_nullables() {
        let mut text = alloc::string::String::from("S -> ABCDEFGHIJ\n");
        for v in "ABCDEFGHIJ".chars() {
            text.push_str(&alloc::format!("{} -> {} | &\n", v, v.to_ascii_lowercase()));
        }
        let out = g(&text).remove_epsilon();
        let s = alts(&out, "S");
        // 2^10 - 1 non-empty cuts plus the kept epsilon
        assert_eq!(s.len(), 1024);
        assert_eq!(s[0], "ABCDEFGHIJ");
        assert_eq!(s[1], "BCDEFGHIJ");
        assert_eq!(s[511], "J");
        assert_eq!(s[1022], "A");
        assert_eq!(s[1023], "&");
    }

    #[test]
    fn repeated_removal_is_a_no_op() {
        let once = g("S -> ASA | aB\nA -> B | S\nB -> b | &\n").remove_epsilon();
        let twice = once.clone().remove_epsilon();
        assert_eq!(once, twice);
        assert_eq!(once.to_string(), twice.to_string());
    }
}
