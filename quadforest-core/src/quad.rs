//! Quads and quad patterns
//!
//! [`Quad`] is an ordered 4-tuple of terms; [`QuadPattern`] is the same
//! shape with every position optional (wildcard). Both are generic over the
//! term type so they work with any [`TermFactory`](crate::factory::TermFactory).

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RDF quad: subject, predicate, object, graph
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad<T> {
    pub subject: T,
    pub predicate: T,
    pub object: T,
    pub graph: T,
}

impl<T> Quad<T> {
    /// Create a quad from its four positions
    pub fn new(subject: T, predicate: T, object: T, graph: T) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Borrow the four positions in SPOG order
    pub fn positions(&self) -> [&T; 4] {
        [&self.subject, &self.predicate, &self.object, &self.graph]
    }
}

impl<T: fmt::Display> fmt::Display for Quad<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {} {} {}]",
            self.subject, self.predicate, self.object, self.graph
        )
    }
}

/// A quad pattern: each position is bound (`Some`) or a wildcard (`None`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadPattern<T> {
    pub subject: Option<T>,
    pub predicate: Option<T>,
    pub object: Option<T>,
    pub graph: Option<T>,
}

impl<T> QuadPattern<T> {
    /// Create a pattern from optional positions
    pub fn new(
        subject: Option<T>,
        predicate: Option<T>,
        object: Option<T>,
        graph: Option<T>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// The fully wildcard pattern
    pub fn any() -> Self {
        Self {
            subject: None,
            predicate: None,
            object: None,
            graph: None,
        }
    }

    /// Borrow the four positions in SPOG order
    pub fn positions(&self) -> [Option<&T>; 4] {
        [
            self.subject.as_ref(),
            self.predicate.as_ref(),
            self.object.as_ref(),
            self.graph.as_ref(),
        ]
    }

    /// Number of bound positions
    pub fn bound_count(&self) -> usize {
        self.positions().iter().filter(|p| p.is_some()).count()
    }

    /// True when every position is bound
    pub fn is_fully_bound(&self) -> bool {
        self.bound_count() == 4
    }

    /// True when every position is a wildcard
    pub fn is_fully_wildcard(&self) -> bool {
        self.bound_count() == 0
    }
}

impl<T> From<Quad<T>> for QuadPattern<T> {
    fn from(quad: Quad<T>) -> Self {
        Self {
            subject: Some(quad.subject),
            predicate: Some(quad.predicate),
            object: Some(quad.object),
            graph: Some(quad.graph),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    #[test]
    fn test_pattern_bound_count() {
        let any: QuadPattern<Term> = QuadPattern::any();
        assert!(any.is_fully_wildcard());
        assert_eq!(any.bound_count(), 0);

        let half = QuadPattern::new(
            Some(Term::named_node("http://example.org/s")),
            None,
            Some(Term::literal("x")),
            None,
        );
        assert_eq!(half.bound_count(), 2);
        assert!(!half.is_fully_bound());
    }

    #[test]
    fn test_pattern_from_quad_is_fully_bound() {
        let q = Quad::new(
            Term::named_node("http://example.org/s"),
            Term::named_node("http://example.org/p"),
            Term::literal("o"),
            Term::default_graph(),
        );
        let pattern: QuadPattern<Term> = q.into();
        assert!(pattern.is_fully_bound());
    }
}
