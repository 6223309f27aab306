use crate::symbol::{Lookahead, Production, Symbol, Variable};

/// Structural invariant violated while building a [`crate::Grammar`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("grammar declares no variables")]
    NoVariables,
    #[error("start symbol {0} is not a declared variable")]
    MissingStart(Variable),
    #[error("variable {0} has no production entry")]
    MissingProductions(Variable),
    #[error("productions given for undeclared variable {0}")]
    DanglingProductions(Variable),
    #[error("variable name {0:?} cannot be written as grammar text")]
    BadName(Variable),
    #[error("{0:?} is reserved and cannot be a terminal")]
    ReservedTerminal(char),
    #[error("{0:?} is declared both as a terminal and as a variable")]
    Overlap(char),
    #[error("production {head} -> {production} uses undeclared symbol {symbol}")]
    UndeclaredSymbol {
        head: Variable,
        production: Production,
        symbol: Symbol,
    },
}

/// A transform was invoked on a grammar outside its domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("{0} has an epsilon production")]
    EpsilonProduction(Variable),
    #[error("{0} is part of a unit cycle")]
    Cycle(Variable),
    #[error("{0} is left recursive")]
    LeftRecursion(Variable),
}

/// Two productions claim the same LL(1) table cell.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("LL(1) conflict at ({variable}, {lookahead}): {variable} -> {existing} | {incoming}")]
pub struct ConflictError {
    pub variable: Variable,
    pub lookahead: Lookahead,
    pub existing: Production,
    pub incoming: Production,
}

/// No terminal string is derivable from the start symbol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the language of {start} is empty")]
pub struct EmptyLanguage {
    pub start: Variable,
}

/// Malformed canonical grammar text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("line {line}: expected `head -> alternatives`")]
    MissingArrow { line: usize },
    #[error("line {line}: head must be exactly one variable")]
    BadHead { line: usize },
    #[error("line {line}: unterminated bracketed variable")]
    Unterminated { line: usize },
    #[error("line {line}: bracketed variable has an empty name")]
    EmptyName { line: usize },
    #[error("line {line}: `&` must stand alone as an alternative")]
    StrayEpsilon { line: usize },
    #[error("line {line}: empty alternative")]
    EmptyAlternative { line: usize },
    #[error("grammar text has no rules")]
    Empty,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    EmptyLanguage(#[from] EmptyLanguage),
    #[error(transparent)]
    Read(#[from] ReadError),
}
