//! SWRL and SQWRL built-in namespaces.

pub mod swrlb {
    //! [SWRL built-ins](https://www.w3.org/submissions/SWRL/#8) namespace.

    pub const NAMESPACE: &str = "http://www.w3.org/2003/11/swrlb#";
}

pub mod sqwrl {
    //! [SQWRL](https://github.com/protegeproject/swrlapi/wiki/SQWRL) operators namespace.

    pub const NAMESPACE: &str = "http://sqwrl.stanford.edu/ontologies/built-ins/3.4/sqwrl.owl#";
}

/// Prefixes every query can use without declaring them.
pub(crate) const DEFAULT_PREFIXES: [(&str, &str); 6] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("swrlb", swrlb::NAMESPACE),
    ("sqwrl", sqwrl::NAMESPACE),
];
