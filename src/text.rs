//! text.rs – reads grammars back from their canonical rendering
//!
//! One rule per line, `head -> alt1 | alt2 | ...`. The first head is the start
//! symbol. Inside an alternative an upper-case character or a `❬...❭` name is
//! a variable, whitespace is ignored and every other character is a terminal.
//! A lone `&` is the empty alternative and an empty right hand side declares a
//! variable without productions.

use crate::OrderedSet;
use crate::error::ReadError;
use crate::grammar::Grammar;
use crate::symbol::{
    ALTERNATIVE, ARROW, CLOSE_BRACKET, EPSILON, OPEN_BRACKET, Production, Symbol, Variable,
};
use alloc::string::String;
use alloc::vec::Vec;
use core::str::FromStr;
use log::trace;

impl FromStr for Grammar {
    type Err = ReadError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut variables: OrderedSet<Variable> = OrderedSet::default();
        let mut terminals: OrderedSet<char> = OrderedSet::default();
        let mut rules: Vec<(Variable, Vec<Production>)> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let (head, body) = raw.split_once(ARROW).ok_or(ReadError::MissingArrow { line })?;

            let head = match tokenize(head, line)?.as_slice() {
                [Symbol::Variable(v)] => v.clone(),
                _ => return Err(ReadError::BadHead { line }),
            };
            variables.insert(head.clone());

            let mut alternatives = Vec::new();
            let body = body.trim();
            if !body.is_empty() {
                for alt in body.split(ALTERNATIVE).map(str::trim) {
                    if alt.is_empty() {
                        return Err(ReadError::EmptyAlternative { line });
                    }
                    if alt.chars().eq([EPSILON]) {
                        alternatives.push(Production::epsilon());
                        continue;
                    }
                    let symbols = tokenize(alt, line)?;
                    terminals.extend(symbols.iter().filter_map(|s| match s {
                        Symbol::Terminal(t) => Some(*t),
                        Symbol::Variable(_) => None,
                    }));
                    alternatives.push(Production::new(symbols));
                }
            }
            trace!("line {}: {} with {} alternatives", line, head, alternatives.len());
            rules.push((head, alternatives));
        }

        let start = variables.first().cloned().ok_or(ReadError::Empty)?;
        Ok(Grammar::new(variables, terminals, rules, start)?)
    }
}

fn tokenize(raw: &str, line: usize) -> Result<Vec<Symbol>, ReadError> {
    let mut out = Vec::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => continue,
            OPEN_BRACKET => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(CLOSE_BRACKET) => break,
                        Some(x) => name.push(x),
                        None => return Err(ReadError::Unterminated { line }),
                    }
                }
                if name.is_empty() {
                    return Err(ReadError::EmptyName { line });
                }
                out.push(Symbol::Variable(Variable::new(&name)));
            }
            EPSILON => return Err(ReadError::StrayEpsilon { line }),
            c if c.is_uppercase() => out.push(Symbol::Variable(Variable::new(c.encode_utf8(&mut [0; 4])))),
            c => out.push(Symbol::Terminal(c)),
        }
    }
    Ok(out)
}
