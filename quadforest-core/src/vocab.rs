//! Well-known RDF vocabulary IRIs
//!
//! Only the handful of IRIs the term model itself cares about; this is not
//! a vocabulary catalogue.

/// XSD namespace prefix
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// RDF namespace prefix
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Datatype of plain string literals
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Datatype of language-tagged literals
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// Build an XSD datatype IRI from a local name
pub fn xsd(local: &str) -> String {
    format!("{XSD}{local}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xsd_builder() {
        assert_eq!(xsd("integer"), "http://www.w3.org/2001/XMLSchema#integer");
        assert_eq!(xsd("string"), XSD_STRING);
    }
}
