use oxiri::IriParseError;
use oxrdfio::RdfParseError;
use std::io;
use std::path::PathBuf;

/// An error raised while loading an ontology document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document could not be opened or read.
    #[error("unable to read the ontology document {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The document is not valid in its serialization format.
    #[error("the ontology document {} is not valid: {source}", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: RdfParseError,
    },
    /// The RDF graph does not describe a well-formed OWL ontology.
    #[error(transparent)]
    Owl(#[from] OwlParseError),
    /// The requested serialization format is not known.
    #[error("the ontology format '{0}' is unknown")]
    UnknownFormat(String),
    #[error("invalid base IRI '{iri}': {error}")]
    InvalidBaseIri {
        iri: String,
        #[source]
        error: IriParseError,
    },
}

/// An error raised while mapping an RDF graph to OWL axioms.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct OwlParseError {
    kind: OwlParseErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwlParseErrorKind {
    /// An RDF list is cyclic or not terminated by `rdf:nil`.
    MalformedList,
    /// A term is used in a position where it cannot appear (e.g. a literal as an individual).
    InvalidValue,
}

impl std::fmt::Display for OwlParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::MalformedList => "malformed RDF list",
            Self::InvalidValue => "invalid value",
        })
    }
}

impl OwlParseError {
    pub(crate) fn malformed_list(message: impl Into<String>) -> Self {
        Self {
            kind: OwlParseErrorKind::MalformedList,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(message: impl Into<String>) -> Self {
        Self {
            kind: OwlParseErrorKind::InvalidValue,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> OwlParseErrorKind {
        self.kind
    }
}
