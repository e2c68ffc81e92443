//! OWL 2 entities: classes, properties and individuals.

use oxrdf::{BlankNode, NamedNode, NamedNodeRef, NamedOrBlankNode, Term};
use std::cmp::Ordering;
use std::fmt;

macro_rules! named_entity {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NamedNode);

        impl $name {
            #[inline]
            pub fn new(iri: impl Into<NamedNode>) -> Self {
                Self(iri.into())
            }

            /// Builds the entity from an IRI string, validating it.
            #[inline]
            pub fn new_from_iri(iri: impl Into<String>) -> Result<Self, oxiri::IriParseError> {
                Ok(Self(NamedNode::new(iri)?))
            }

            #[inline]
            pub fn iri(&self) -> &NamedNode {
                &self.0
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            #[inline]
            pub fn as_named_node(&self) -> NamedNodeRef<'_> {
                self.0.as_ref()
            }

            #[inline]
            pub fn into_inner(self) -> NamedNode {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<NamedNode> for $name {
            #[inline]
            fn from(node: NamedNode) -> Self {
                Self(node)
            }
        }

        impl From<NamedNodeRef<'_>> for $name {
            #[inline]
            fn from(node: NamedNodeRef<'_>) -> Self {
                Self(node.into_owned())
            }
        }

        impl From<$name> for NamedNode {
            #[inline]
            fn from(entity: $name) -> Self {
                entity.0
            }
        }

        impl From<$name> for Term {
            #[inline]
            fn from(entity: $name) -> Self {
                entity.0.into()
            }
        }
    };
}

named_entity!(
    /// An OWL class (`owl:Class`).
    ///
    /// Every class is a subclass of `owl:Thing`.
    OwlClass
);

named_entity!(
    /// An OWL object property (`owl:ObjectProperty`), relating individuals to individuals.
    ObjectProperty
);

named_entity!(
    /// An OWL data property (`owl:DatatypeProperty`), relating individuals to literals.
    DataProperty
);

named_entity!(
    /// An OWL annotation property (`owl:AnnotationProperty`).
    AnnotationProperty
);

/// An OWL individual.
///
/// Named individuals are identified by an IRI, anonymous ones by a blank node
/// that is only meaningful inside the document they were loaded from.
///
/// Named individuals sort before anonymous ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Individual {
    Named(NamedNode),
    Anonymous(BlankNode),
}

impl Individual {
    #[inline]
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    #[inline]
    pub fn as_named(&self) -> Option<&NamedNode> {
        match self {
            Self::Named(n) => Some(n),
            Self::Anonymous(_) => None,
        }
    }

    /// The identifier of the individual: its IRI, or `_:id` for anonymous individuals.
    pub fn identifier(&self) -> String {
        match self {
            Self::Named(n) => n.as_str().to_owned(),
            Self::Anonymous(b) => b.to_string(),
        }
    }
}

impl Ord for Individual {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Named(a), Self::Named(b)) => a.cmp(b),
            (Self::Named(_), Self::Anonymous(_)) => Ordering::Less,
            (Self::Anonymous(_), Self::Named(_)) => Ordering::Greater,
            (Self::Anonymous(a), Self::Anonymous(b)) => a.as_str().cmp(b.as_str()),
        }
    }
}

impl PartialOrd for Individual {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => n.fmt(f),
            Self::Anonymous(b) => b.fmt(f),
        }
    }
}

impl From<NamedNode> for Individual {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::Named(node)
    }
}

impl From<BlankNode> for Individual {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::Anonymous(node)
    }
}

impl From<NamedOrBlankNode> for Individual {
    #[inline]
    fn from(node: NamedOrBlankNode) -> Self {
        match node {
            NamedOrBlankNode::NamedNode(n) => Self::Named(n),
            NamedOrBlankNode::BlankNode(b) => Self::Anonymous(b),
        }
    }
}

impl From<Individual> for NamedOrBlankNode {
    #[inline]
    fn from(individual: Individual) -> Self {
        match individual {
            Individual::Named(n) => n.into(),
            Individual::Anonymous(b) => b.into(),
        }
    }
}

impl From<Individual> for Term {
    #[inline]
    fn from(individual: Individual) -> Self {
        match individual {
            Individual::Named(n) => n.into(),
            Individual::Anonymous(b) => b.into(),
        }
    }
}

/// Returns the part of an IRI after its last `#`, `/` or `:`.
///
/// ```
/// assert_eq!(oxowl::local_name("http://example.com/family#Person"), "Person");
/// assert_eq!(oxowl::local_name("http://example.com/people/alice"), "alice");
/// ```
pub fn local_name(iri: &str) -> &str {
    iri.rfind(['#', '/', ':']).map_or(iri, |i| &iri[i + 1..])
}
