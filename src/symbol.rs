//! symbol.rs – the atoms every other module is written in terms of
//!
//! * [`Variable`] is a cheap to clone name.  A one character upper‑case name is
//!   *simple* and renders bare (`S`), anything else renders bracketed (`❬S'❭`).
//! * [`Symbol`] tags a grammar atom as terminal or variable once, at
//!   construction time.
//! * [`Production`] is a shared slice of symbols; the empty slice **is** the
//!   epsilon production and renders as `&`.
//! * [`Lookahead`] extends terminals with the artificial **ε** and **$** so
//!   FIRST/FOLLOW sets and the parse table share one key type.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::{self, Debug, Display};
use core::ops::Deref;

/// Marker rendered for the empty right hand side.
pub const EPSILON: char = '&';
/// End of input / bottom of the parse stack.
pub const END_MARKER: char = '$';
/// Opening bracket of a compound variable name.
pub const OPEN_BRACKET: char = '❬';
/// Closing bracket of a compound variable name.
pub const CLOSE_BRACKET: char = '❭';
/// Separates the head of a rule from its alternatives.
pub const ARROW: &str = "->";
/// Separates alternatives.
pub const ALTERNATIVE: char = '|';

/// Characters the canonical rendering cannot carry as terminals.
pub fn is_reserved_terminal(t: char) -> bool {
    matches!(t, EPSILON | END_MARKER | ALTERNATIVE | OPEN_BRACKET | CLOSE_BRACKET)
        || t.is_uppercase()
        || t.is_whitespace()
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(Rc<str>);

impl Variable {
    pub fn new(name: &str) -> Self {
        Variable(Rc::from(name))
    }

    /// The bare name, without brackets.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether the name survives rendering and reading back.
    pub fn is_renderable(&self) -> bool {
        !self.0.is_empty()
            && !self.0.contains([CLOSE_BRACKET, ALTERNATIVE, '\n', '\r'])
            && !self.0.contains(ARROW)
    }

    pub fn is_simple(&self) -> bool {
        let mut chars = self.0.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase())
    }
}

impl From<&str> for Variable {
    fn from(name: &str) -> Self {
        Variable::new(name)
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_simple() {
            f.write_str(&self.0)
        } else {
            write!(f, "{}{}{}", OPEN_BRACKET, self.0, CLOSE_BRACKET)
        }
    }
}

impl Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A grammar symbol.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(char),
    Variable(Variable),
}

impl Symbol {
    pub fn var(name: &str) -> Self {
        Symbol::Variable(Variable::new(name))
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Symbol::Variable(v) => Some(v),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl From<Variable> for Symbol {
    fn from(v: Variable) -> Self {
        Symbol::Variable(v)
    }
}

impl From<char> for Symbol {
    fn from(t: char) -> Self {
        Symbol::Terminal(t)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "{}", t),
            Symbol::Variable(v) => Display::fmt(v, f),
        }
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Right hand side of a rule, compared by value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Production(Rc<[Symbol]>);

impl Production {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Production(Rc::from(symbols.into_boxed_slice()))
    }

    pub fn epsilon() -> Self {
        Self::default()
    }

    pub fn is_epsilon(&self) -> bool {
        self.0.is_empty()
    }

    /// `Some(v)` iff the body is exactly the variable `v`.
    pub fn unit(&self) -> Option<&Variable> {
        match &*self.0 {
            [Symbol::Variable(v)] => Some(v),
            _ => None,
        }
    }

    pub fn leading_variable(&self) -> Option<&Variable> {
        self.0.first().and_then(Symbol::as_variable)
    }

    /// `prefix · rest`, collapsing to epsilon when both are empty.
    pub fn splice(prefix: &[Symbol], rest: &[Symbol]) -> Self {
        prefix.iter().chain(rest).cloned().collect()
    }
}

impl Deref for Production {
    type Target = [Symbol];

    fn deref(&self) -> &[Symbol] {
        &self.0
    }
}

impl From<Vec<Symbol>> for Production {
    fn from(symbols: Vec<Symbol>) -> Self {
        Production::new(symbols)
    }
}

impl FromIterator<Symbol> for Production {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Production(iter.into_iter().collect())
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_epsilon() {
            return write!(f, "{}", EPSILON);
        }
        for s in self.0.iter() {
            Display::fmt(s, f)?;
        }
        Ok(())
    }
}

impl Debug for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Extended terminal domain used by FIRST/FOLLOW set algebra
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lookahead {
    /// synthetic end‑of‑input symbol ($)
    Eof,
    /// ε  (empty string)  – appears only in FIRST sets
    Empty,
    /// real terminal
    Term(char),
}

impl From<char> for Lookahead {
    fn from(t: char) -> Self {
        Lookahead::Term(t)
    }
}

impl Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Lookahead::Eof => write!(f, "{}", END_MARKER),
            Lookahead::Empty => write!(f, "{}", EPSILON),
            Lookahead::Term(t) => write!(f, "{}", t),
        }
    }
}
