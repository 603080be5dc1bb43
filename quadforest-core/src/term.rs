//! RDF term model
//!
//! [`Term`] covers the four kinds of value a quad position can hold:
//! named node, blank node, literal, and the default-graph marker. Payloads
//! are `Arc<str>` for cheap clones; terms are cloned into and out of the
//! interner freely.
//!
//! ## Canonical keys
//!
//! Two terms are semantically equal iff their canonical keys are equal.
//! Keys are N-Triples shaped: `<iri>`, `_:label`, `"value"` with an
//! optional `@lang` or `^^<datatype>` suffix, and the empty string for the
//! default graph. Literal values are escaped so that the key is injective.
//!
//! ## Normalization
//!
//! A literal with an explicit `xsd:string` datatype is the same term as a
//! plain literal; the constructors collapse the former into the latter so
//! key equality matches semantic equality.

use crate::vocab::XSD_STRING;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The four kinds of term a quad position can hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TermKind {
    NamedNode,
    BlankNode,
    Literal,
    DefaultGraph,
}

/// An RDF term
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// An IRI reference
    NamedNode { iri: Arc<str> },
    /// A graph-scoped blank node label
    BlankNode { label: Arc<str> },
    /// A literal with optional language tag or datatype
    ///
    /// At most one of `language` and `datatype` is set; a plain string
    /// literal carries neither.
    Literal {
        value: Arc<str>,
        language: Option<Arc<str>>,
        datatype: Option<Arc<str>>,
    },
    /// The distinguished default graph
    DefaultGraph,
}

impl Term {
    /// Create a named node from an IRI
    pub fn named_node(iri: impl AsRef<str>) -> Self {
        Term::NamedNode {
            iri: Arc::from(iri.as_ref()),
        }
    }

    /// Create a blank node from a label (without the `_:` prefix)
    pub fn blank_node(label: impl AsRef<str>) -> Self {
        Term::BlankNode {
            label: Arc::from(label.as_ref()),
        }
    }

    /// Create a plain string literal
    pub fn literal(value: impl AsRef<str>) -> Self {
        Term::Literal {
            value: Arc::from(value.as_ref()),
            language: None,
            datatype: None,
        }
    }

    /// Create a language-tagged literal
    pub fn literal_with_language(value: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Term::Literal {
            value: Arc::from(value.as_ref()),
            language: Some(Arc::from(language.as_ref())),
            datatype: None,
        }
    }

    /// Create a typed literal
    ///
    /// An `xsd:string` datatype normalizes to a plain literal.
    pub fn literal_with_datatype(value: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        let datatype = datatype.as_ref();
        if datatype == XSD_STRING {
            return Term::literal(value);
        }
        Term::Literal {
            value: Arc::from(value.as_ref()),
            language: None,
            datatype: Some(Arc::from(datatype)),
        }
    }

    /// The default graph marker
    pub fn default_graph() -> Self {
        Term::DefaultGraph
    }

    /// Which kind of term this is
    pub fn kind(&self) -> TermKind {
        match self {
            Term::NamedNode { .. } => TermKind::NamedNode,
            Term::BlankNode { .. } => TermKind::BlankNode,
            Term::Literal { .. } => TermKind::Literal,
            Term::DefaultGraph => TermKind::DefaultGraph,
        }
    }

    /// True for the default-graph marker
    pub fn is_default_graph(&self) -> bool {
        matches!(self, Term::DefaultGraph)
    }

    /// True for named nodes
    pub fn is_named_node(&self) -> bool {
        matches!(self, Term::NamedNode { .. })
    }

    /// Canonical key string; equal iff the terms are semantically equal
    pub fn canonical_key(&self) -> String {
        match self {
            Term::NamedNode { iri } => format!("<{iri}>"),
            Term::BlankNode { label } => format!("_:{label}"),
            Term::Literal {
                value,
                language,
                datatype,
            } => {
                let escaped = escape_literal(value);
                match (language, datatype) {
                    (Some(lang), _) => format!("\"{escaped}\"@{lang}"),
                    (None, Some(dt)) => format!("\"{escaped}\"^^<{dt}>"),
                    (None, None) => format!("\"{escaped}\""),
                }
            }
            Term::DefaultGraph => String::new(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::DefaultGraph => write!(f, "DEFAULT"),
            other => write!(f, "{}", other.canonical_key()),
        }
    }
}

/// Escape a literal value for use inside a quoted canonical key
fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
