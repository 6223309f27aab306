//! Context free grammars: normal form transforms, FIRST/FOLLOW analysis,
//! LL(1) tables and a predictive parser.
//!
//! ```rust
//! use context_free::{Grammar, Parser};
//!
//! let grammar: Grammar = "S -> Sa | b\n".parse().unwrap();
//! let grammar = grammar.remove_left_recursion().unwrap();
//! assert_eq!(grammar.to_string(), "S -> b❬S'❭\n❬S'❭ -> a❬S'❭ | &\n");
//!
//! let parser = Parser::from_grammar(&grammar).unwrap();
//! assert!(parser.parse("baa"));
//! assert!(!parser.parse("ab"));
//! ```

#![no_std]
extern crate alloc;

pub mod check;
pub mod config;
pub mod error;
pub mod factor;
pub mod grammar;
pub mod graph;
pub mod parser;
pub mod symbol;
pub mod text;

mod cnf;
mod epsilon;
mod left_recursion;
mod unit;
mod useless;

/// Insertion ordered set, the container behind every production list.
pub type OrderedSet<T> = indexmap::IndexSet<T, hashbrown::DefaultHashBuilder>;
pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, hashbrown::DefaultHashBuilder>;

pub use check::{FirstFollow, Table};
pub use config::FactorConfig;
pub use error::{ConflictError, EmptyLanguage, Error, PreconditionError, ReadError, ValidationError};
pub use factor::Factoring;
pub use grammar::Grammar;
pub use parser::Parser;
pub use symbol::{Lookahead, Production, Symbol, Variable};
