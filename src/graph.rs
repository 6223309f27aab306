//! graph.rs – symbol graphs built from a production map
//!
//! One directed graph type serves four analyses; what differs is which
//! symbols of a body become edges, see [`EdgeKind`].

use crate::OrderedSet;
use crate::grammar::Grammar;
use crate::symbol::{Production, Symbol};
use alloc::collections::VecDeque;
use core::iter;
use either::Either;
use hashbrown::HashMap;

/// Which body symbols a production `head -> body` connects `head` to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// the body itself when it is a single variable
    Unit,
    /// every symbol of the body
    Reach,
    /// the first symbol of the body
    LeftCorner,
}

impl EdgeKind {
    pub fn targets(self, body: &Production) -> impl Iterator<Item = &Symbol> {
        match self {
            EdgeKind::Unit => Either::Left(body.unit().map(|_| &body[0]).into_iter()),
            EdgeKind::LeftCorner => Either::Left(body.first().into_iter()),
            EdgeKind::Reach => Either::Right(body.iter()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: OrderedSet<Symbol>,
    edges: HashMap<Symbol, OrderedSet<Symbol>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every variable becomes a vertex; terminals only once some edge reaches them.
    pub fn from_grammar(grammar: &Grammar, kind: EdgeKind) -> Self {
        let mut graph = Self::new();
        for (head, prods) in grammar.rules() {
            let head = Symbol::Variable(head.clone());
            graph.add_vertex(head.clone());
            for body in prods {
                for target in kind.targets(body) {
                    graph.add_edge(head.clone(), target.clone());
                }
            }
        }
        graph
    }

    pub fn add_vertex(&mut self, v: Symbol) {
        self.vertices.insert(v);
    }

    pub fn add_edge(&mut self, from: Symbol, to: Symbol) {
        self.vertices.insert(from.clone());
        self.vertices.insert(to.clone());
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn vertices(&self) -> &OrderedSet<Symbol> {
        &self.vertices
    }

    pub fn successors<'a>(&'a self, v: &Symbol) -> impl Iterator<Item = &'a Symbol> {
        match self.edges.get(v) {
            Some(set) => Either::Left(set.iter()),
            None => Either::Right(iter::empty::<&Symbol>()),
        }
    }

    /// Vertices reachable from `source` through zero or more edges, in visiting order.
    pub fn bfs(&self, source: &Symbol) -> OrderedSet<Symbol> {
        let mut visited = OrderedSet::default();
        visited.insert(source.clone());
        self.walk(source, &mut visited);
        visited
    }

    /// True iff a walk of at least one edge leads from `source` back to itself.
    pub fn has_loop(&self, source: &Symbol) -> bool {
        let mut visited = OrderedSet::default();
        for next in self.successors(source) {
            if next == source {
                return true;
            }
            if visited.insert(next.clone()) {
                self.walk(next, &mut visited);
            }
        }
        visited.contains(source)
    }

    fn walk(&self, from: &Symbol, visited: &mut OrderedSet<Symbol>) {
        let mut queue: VecDeque<&Symbol> = VecDeque::new();
        queue.push_back(from);
        while let Some(u) = queue.pop_front() {
            for v in self.successors(u) {
                if visited.insert(v.clone()) {
                    queue.push_back(v);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn sym(s: &str) -> Symbol {
        Symbol::var(s)
    }

    fn chain(edges: &[(&str, &str)]) -> Graph {
        let mut g = Graph::new();
        for (a, b) in edges {
            g.add_edge(sym(a), sym(b));
        }
        g
    }

    #[test]
    fn bfs_visits_in_breadth_order() {
        let g = chain(&[("S", "A"), ("S", "B"), ("A", "C"), ("B", "C"), ("C", "D")]);
        let order: Vec<_> = g.bfs(&sym("S")).into_iter().collect();
        assert_eq!(order, [sym("S"), sym("A"), sym("B"), sym("C"), sym("D")]);

        let from_c: Vec<_> = g.bfs(&sym("C")).into_iter().collect();
        assert_eq!(from_c, [sym("C"), sym("D")]);
    }

    #[test]
    fn loops() {
        let g = chain(&[("A", "B"), ("B", "C"), ("C", "A"), ("D", "D"), ("E", "A")]);
        assert!(g.has_loop(&sym("A")));
        assert!(g.has_loop(&sym("C")));
        assert!(g.has_loop(&sym("D")), "self edge is a loop");
        assert!(!g.has_loop(&sym("E")), "reaching a cycle is not a loop through E");
        assert!(!g.has_loop(&sym("Z")), "unknown vertex has no loop");
    }

    #[test]
    fn edge_kinds() {
        let body = crate::Production::new(alloc::vec![sym("A"), Symbol::Terminal('b')]);
        assert_eq!(EdgeKind::Reach.targets(&body).count(), 2);
        assert_eq!(EdgeKind::LeftCorner.targets(&body).collect::<Vec<_>>(), [&sym("A")]);
        assert_eq!(EdgeKind::Unit.targets(&body).count(), 0);

        let unit = crate::Production::new(alloc::vec![sym("A")]);
        assert_eq!(EdgeKind::Unit.targets(&unit).collect::<Vec<_>>(), [&sym("A")]);
    }
}
