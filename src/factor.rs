//! factor.rs – bounded left factoring towards LL(1)
//!
//! Each step recomputes FIRST/FOLLOW, picks the first ambiguity and applies
//! one repair. Nullable variables that clash with what follows them are
//! inlined first; shared leading terminals are handled afterwards by
//! expanding leading variables and pulling the longest common prefix into a
//! fresh variable.

use crate::OrderedSet;
use crate::check::FirstFollow;
use crate::config::FactorConfig;
use crate::error::PreconditionError;
use crate::grammar::Grammar;
use crate::symbol::{Lookahead, Production, Symbol, Variable};
use alloc::format;
use alloc::vec::Vec;
use log::{debug, trace};

/// Result of [`Grammar::left_factor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Factoring {
    /// no ambiguity is left, the grammar has an LL(1) table
    Converged(Grammar),
    /// the step ceiling was hit, or conflicts remain that no repair handles
    Exhausted(Grammar),
}

impl Factoring {
    pub fn is_converged(&self) -> bool {
        matches!(self, Factoring::Converged(_))
    }

    pub fn grammar(&self) -> &Grammar {
        match self {
            Factoring::Converged(g) | Factoring::Exhausted(g) => g,
        }
    }

    pub fn into_grammar(self) -> Grammar {
        match self {
            Factoring::Converged(g) | Factoring::Exhausted(g) => g,
        }
    }

    pub fn converged(self) -> Option<Grammar> {
        match self {
            Factoring::Converged(g) => Some(g),
            Factoring::Exhausted(_) => None,
        }
    }
}

#[derive(Debug)]
enum Ambiguity {
    /// the nullable variable at `at` starts with what may follow it
    FirstFollow {
        head: Variable,
        production: Production,
        at: usize,
    },
    /// several alternatives of `head` may start with `terminal`
    FirstFirst { head: Variable, terminal: char },
}

impl Ambiguity {
    fn head(&self) -> &Variable {
        match self {
            Ambiguity::FirstFollow { head, .. } | Ambiguity::FirstFirst { head, .. } => head,
        }
    }
}

impl Grammar {
    /// Repairs LL(1) ambiguities one at a time, at most `config.max_steps` of them.
    pub fn left_factor(self, config: &FactorConfig) -> Result<Factoring, PreconditionError> {
        if let Some(v) = self.left_recursive_variable() {
            return Err(PreconditionError::LeftRecursion(v.clone()));
        }

        let mut g = self;
        for step in 0..config.max_steps {
            let Some(found) = find_ambiguity(&g) else {
                return Ok(settle(g, step));
            };
            trace!("factoring step {}: {:?}", step, found);
            let head = found.head().clone();
            let before = g.rules_of(&head).clone();
            match found {
                Ambiguity::FirstFollow {
                    head,
                    production,
                    at,
                } => inline_at(&mut g, &head, &production, at),
                Ambiguity::FirstFirst { head, terminal } => {
                    expand_leading(&mut g, &head, terminal);
                    factor_prefix(&mut g, &head, terminal);
                }
            }
            g.debug_check();
            if *g.rules_of(&head) == before {
                debug!("repair left {} unchanged after {} steps", head, step);
                return Ok(Factoring::Exhausted(g));
            }
        }

        if find_ambiguity(&g).is_none() {
            return Ok(settle(g, config.max_steps));
        }
        debug!("left factoring gave up after {} steps", config.max_steps);
        Ok(Factoring::Exhausted(g))
    }
}

/// Nothing left to repair; conflicts no repair targets still count as failure.
fn settle(g: Grammar, steps: usize) -> Factoring {
    match g.ll1_table() {
        Ok(_) => {
            debug!("left factoring converged after {} steps", steps);
            Factoring::Converged(g)
        }
        Err(err) => {
            debug!("no repair applies after {} steps: {}", steps, err);
            Factoring::Exhausted(g)
        }
    }
}

fn without_empty(set: &OrderedSet<Lookahead>) -> impl Iterator<Item = &Lookahead> {
    set.iter().filter(|x| **x != Lookahead::Empty)
}

fn find_ambiguity(g: &Grammar) -> Option<Ambiguity> {
    let sets = FirstFollow::compute(g);

    for head in g.variables().iter() {
        for p in g.rules_of(head).iter() {
            for (at, s) in p.iter().enumerate() {
                let Symbol::Variable(v) = s else {
                    continue;
                };
                if !sets.is_nullable(v) {
                    continue;
                }
                let after = sets.first_of_sequence(&p[at + 1..]);
                let first = sets.first_of(s);
                if without_empty(&first).any(|x| after.contains(x)) {
                    return Some(Ambiguity::FirstFollow {
                        head: head.clone(),
                        production: p.clone(),
                        at,
                    });
                }
            }
        }
    }

    sets.first_first_conflicts(g)
        .into_iter()
        .next()
        .map(|(head, terminal, _)| Ambiguity::FirstFirst { head, terminal })
}

/// Replaces `production` of `head` by one copy per alternative of the
/// variable found at `at`.
fn inline_at(g: &mut Grammar, head: &Variable, production: &Production, at: usize) {
    let Symbol::Variable(v) = &production[at] else {
        return;
    };
    let alternatives = g.rules_of(v).clone();
    let rewritten: OrderedSet<Production> = g
        .rules_of(head)
        .iter()
        .flat_map(|p| {
            if p == production {
                alternatives
                    .iter()
                    .map(|alt| {
                        p[..at]
                            .iter()
                            .chain(alt.iter())
                            .chain(p[at + 1..].iter())
                            .cloned()
                            .collect()
                    })
                    .collect::<Vec<Production>>()
            } else {
                alloc::vec![p.clone()]
            }
        })
        .collect();
    g.set_rules(head, rewritten);
}

/// Inlines the leading variable of every alternative that may start with `t`,
/// whether `t` comes from that variable or from behind it when it is nullable.
fn expand_leading(g: &mut Grammar, head: &Variable, t: char) {
    let sets = FirstFollow::compute(g);
    let rewritten: OrderedSet<Production> = g
        .rules_of(head)
        .iter()
        .flat_map(|p| match p.first() {
            Some(Symbol::Variable(v))
                if sets.first_of_sequence(p).contains(&Lookahead::Term(t)) =>
            {
                g.rules_of(v)
                    .iter()
                    .map(|alt| Production::splice(alt, &p[1..]))
                    .collect::<Vec<Production>>()
            }
            _ => alloc::vec![p.clone()],
        })
        .collect();
    g.set_rules(head, rewritten);
}

/// Pulls the longest common prefix of the alternatives starting with `t`
/// into a fresh variable declared right after `head`.
fn factor_prefix(g: &mut Grammar, head: &Variable, t: char) {
    let group: Vec<Production> = g
        .rules_of(head)
        .iter()
        .filter(|p| p.first() == Some(&Symbol::Terminal(t)))
        .cloned()
        .collect();
    if group.len() < 2 {
        return;
    }

    let prefix_len = group[1..].iter().fold(group[0].len(), |len, p| {
        group[0][..len]
            .iter()
            .zip(p.iter())
            .take_while(|(a, b)| a == b)
            .count()
    });

    let tail = g.fresh_variable(&format!("{}'", head.name()));
    debug!(
        "factoring {} alternatives of {} sharing {} symbols into {}",
        group.len(),
        head,
        prefix_len,
        tail
    );

    let factored = Production::splice(&group[0][..prefix_len], &[Symbol::Variable(tail.clone())]);
    let mut rewritten = OrderedSet::default();
    for p in g.rules_of(head).iter() {
        if group.contains(p) {
            rewritten.insert(factored.clone());
        } else {
            rewritten.insert(p.clone());
        }
    }
    g.set_rules(head, rewritten);

    g.declare(tail.clone(), Some(head));
    g.rules_mut(&tail)
        .extend(group.iter().map(|p| Production::new(p[prefix_len..].to_vec())));
}

#[cfg(test)]
mod tests {
    use super::Factoring;
    use crate::config::FactorConfig;
    use crate::error::PreconditionError;
    use crate::grammar::Grammar;
    use crate::symbol::Variable;
    use alloc::string::ToString;

    fn g(text: &str) -> Grammar {
        text.parse().expect("grammar text")
    }

    fn factor(text: &str) -> Factoring {
        g(text).left_factor(&FactorConfig::default()).unwrap()
    }

    #[test]
    fn common_terminal_prefix() {
        let out = factor("S -> abc | abd | e\n").converged().unwrap();
        assert_eq!(out.to_string(), "S -> ab❬S'❭ | e\n❬S'❭ -> c | d\n");
        assert!(out.ll1_table().is_ok());
    }

    #[test]
    fn leading_variables_are_expanded() {
        let out = factor("S -> Ab | Ac\nA -> a\n").converged().unwrap();
        assert_eq!(out.to_string(), "S -> a❬S'❭\n❬S'❭ -> b | c\nA -> a\n");
    }

    #[test]
    fn empty_suffix_becomes_epsilon() {
        let out = factor("S -> a | ab\n").converged().unwrap();
        assert_eq!(out.to_string(), "S -> a❬S'❭\n❬S'❭ -> & | b\n");
    }

    #[test]
    fn nullable_variable_is_inlined() {
        let grammar = g("S -> Aa\nA -> a | &\n");
        assert!(grammar.ll1_table().is_err());
        let out = grammar
            .left_factor(&FactorConfig::default())
            .unwrap()
            .converged()
            .unwrap();
        assert_eq!(out.to_string(), "S -> a❬S'❭\n❬S'❭ -> a | &\nA -> a | &\n");
        assert!(out.ll1_table().is_ok());
    }

    #[test]
    fn nullable_leading_variable_is_expanded() {
        // b reaches S -> Ab only through the empty alternative of A
        let out = g("S -> Ab | b\nA -> a | &\n")
            .left_factor(&FactorConfig::new().with_max_steps(1000))
            .unwrap();
        assert!(out.is_converged());
        assert_eq!(out.grammar().to_string(), "S -> ab | b\nA -> a | &\n");
    }

    #[test]
    fn already_ll1_is_untouched() {
        let grammar = g("S -> aA | b\nA -> aA | &\n");
        assert_eq!(factor("S -> aA | b\nA -> aA | &\n"), Factoring::Converged(grammar));
    }

    #[test]
    fn ceiling_stops_runaway_factoring() {
        let out = g("S -> Aa\nA -> aA | &\n")
            .left_factor(&FactorConfig::new().with_max_steps(10))
            .unwrap();
        assert!(!out.is_converged());
        let s = Variable::new("S");
        assert!(out.grammar().productions(&s).unwrap().len() > 2);
        assert!(out.converged().is_none());
    }

    #[test]
    fn unrepairable_conflict_is_exhausted() {
        // FOLLOW(A) picks up c through X, which no local repair sees
        let out = factor("S -> Xc\nX -> aA\nA -> c | &\n");
        assert!(!out.is_converged());
        assert!(out.grammar().ll1_table().is_err());
    }

    #[test]
    fn left_recursion_is_refused() {
        assert_eq!(
            g("S -> Sa | b\n").left_factor(&FactorConfig::default()),
            Err(PreconditionError::LeftRecursion(Variable::new("S")))
        );
    }
}
