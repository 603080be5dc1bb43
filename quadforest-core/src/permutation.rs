//! Index permutations
//!
//! Quads are indexed under permutations of their four positions so that any
//! pattern query reduces to a contiguous range scan. Six orders suffice to
//! give every one of the sixteen bound/wildcard shapes an order whose
//! prefix covers exactly the bound positions:
//!
//! | Order | Prefix-covered shapes |
//! |-------|-----------------------|
//! | SPOG  | s, sp, spo, spog      |
//! | POGS  | p, po, pog            |
//! | OGSP  | o, og, ogs            |
//! | GSPO  | g, gs, gsp            |
//! | GPOS  | gp, gpo               |
//! | OSPG  | os, osp               |
//!
//! ## Selection
//!
//! For a bound set B, every order whose prefix is a permutation of B
//! qualifies; the caller prefers an already materialized order and falls
//! back to the lowest index. [`Permutation::covering`] yields candidates in
//! index order so "first match wins" implements the tie-break.

use crate::ids::{IdPattern, IdQuad};
use std::fmt;

/// SPOG position indexes
const S: usize = 0;
const P: usize = 1;
const O: usize = 2;
const G: usize = 3;

/// One of the six index orders
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Permutation {
    /// Subject, Predicate, Object, Graph
    Spog,
    /// Predicate, Object, Graph, Subject
    Pogs,
    /// Object, Graph, Subject, Predicate
    Ogsp,
    /// Graph, Subject, Predicate, Object
    Gspo,
    /// Graph, Predicate, Object, Subject
    Gpos,
    /// Object, Subject, Predicate, Graph
    Ospg,
}

impl Permutation {
    /// Every order, in index order
    pub const ALL: [Permutation; 6] = [
        Permutation::Spog,
        Permutation::Pogs,
        Permutation::Ogsp,
        Permutation::Gspo,
        Permutation::Gpos,
        Permutation::Ospg,
    ];

    /// Number of orders
    pub const COUNT: usize = Self::ALL.len();

    /// Index of this order within [`ALL`](Self::ALL)
    pub fn index(self) -> usize {
        self as usize
    }

    /// SPOG position stored at each key slot
    ///
    /// `positions()[k]` is the SPOG position whose value lands in slot `k`
    /// of the sort key.
    pub const fn positions(self) -> [usize; 4] {
        match self {
            Permutation::Spog => [S, P, O, G],
            Permutation::Pogs => [P, O, G, S],
            Permutation::Ogsp => [O, G, S, P],
            Permutation::Gspo => [G, S, P, O],
            Permutation::Gpos => [G, P, O, S],
            Permutation::Ospg => [O, S, P, G],
        }
    }

    /// Permute a SPOG quad into this order's sort key
    #[inline]
    pub fn to_key(self, quad: IdQuad) -> IdQuad {
        let p = self.positions();
        [quad[p[0]], quad[p[1]], quad[p[2]], quad[p[3]]]
    }

    /// Recover the SPOG quad from one of this order's sort keys
    #[inline]
    pub fn from_key(self, key: IdQuad) -> IdQuad {
        let p = self.positions();
        let mut quad = [0; 4];
        quad[p[0]] = key[0];
        quad[p[1]] = key[1];
        quad[p[2]] = key[2];
        quad[p[3]] = key[3];
        quad
    }

    /// Permute a SPOG pattern into key space
    #[inline]
    pub fn pattern_key(self, pattern: IdPattern) -> IdPattern {
        let p = self.positions();
        [
            pattern[p[0]],
            pattern[p[1]],
            pattern[p[2]],
            pattern[p[3]],
        ]
    }

    /// How many leading key slots the bound positions fill
    ///
    /// This is the length of the contiguous range prefix a scan for the
    /// given bound set can use on this order.
    pub fn prefix_len(self, bound: [bool; 4]) -> usize {
        self.positions()
            .iter()
            .take_while(|&&pos| bound[pos])
            .count()
    }

    /// True when the bound set is exactly a prefix of this order
    pub fn covers(self, bound: [bool; 4]) -> bool {
        self.prefix_len(bound) == bound.iter().filter(|&&b| b).count()
    }

    /// Orders that cover the bound set, in index order
    pub fn covering(bound: [bool; 4]) -> impl Iterator<Item = Permutation> {
        Self::ALL.into_iter().filter(move |p| p.covers(bound))
    }

    /// Short lowercase name of this order
    pub fn name(self) -> &'static str {
        match self {
            Permutation::Spog => "spog",
            Permutation::Pogs => "pogs",
            Permutation::Ogsp => "ogsp",
            Permutation::Gspo => "gspo",
            Permutation::Gpos => "gpos",
            Permutation::Ospg => "ospg",
        }
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Permutation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spog" => Ok(Permutation::Spog),
            "pogs" => Ok(Permutation::Pogs),
            "ogsp" => Ok(Permutation::Ogsp),
            "gspo" => Ok(Permutation::Gspo),
            "gpos" => Ok(Permutation::Gpos),
            "ospg" => Ok(Permutation::Ospg),
            _ => Err(format!("Unknown permutation: {}", s)),
        }
    }
}
