use crate::check::Table;
use crate::error::Error;
use crate::grammar::Grammar;
use crate::symbol::{Lookahead, Symbol, Variable};
use alloc::vec;
use log::trace;

enum Token {
    Eof,
    Term(char),
    NonTerm(Variable),
}

impl From<&Symbol> for Token {
    fn from(s: &Symbol) -> Self {
        match s {
            Symbol::Terminal(t) => Token::Term(*t),
            Symbol::Variable(v) => Token::NonTerm(v.clone()),
        }
    }
}

/// Table driven predictive parser
///
/// The table is never modified, so one parser can serve any number of parses.
#[derive(Debug, Clone, PartialEq)]
pub struct Parser {
    table: Table,
}

impl Parser {
    pub fn new(table: Table) -> Self {
        Parser { table }
    }

    pub fn from_grammar(grammar: &Grammar) -> Result<Self, Error> {
        Ok(Parser::new(grammar.ll1_table()?))
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Whether the start symbol derives exactly `input`.
    pub fn parse(&self, input: &str) -> bool {
        let mut stack = vec![Token::Eof, Token::NonTerm(self.table.start().clone())];
        let mut input = input.chars().map(Lookahead::Term).chain([Lookahead::Eof]);
        let Some(mut current) = input.next() else {
            return false;
        };

        while let Some(top) = stack.pop() {
            match top {
                Token::Eof => return current == Lookahead::Eof,
                Token::Term(t) => {
                    if current != Lookahead::Term(t) {
                        trace!("expected {:?}, found {}", t, current);
                        return false;
                    }
                    current = match input.next() {
                        Some(next) => next,
                        None => return false,
                    };
                }
                Token::NonTerm(v) => {
                    let Some(rule) = self.table.get(&v, current) else {
                        trace!("no rule for ({}, {})", v, current);
                        return false;
                    };
                    trace!("{} -> {} on {}", v, rule, current);
                    stack.extend(rule.iter().rev().map(Token::from));
                }
            }
        }
        false
    }
}
