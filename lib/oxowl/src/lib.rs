#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod axiom;
mod entity;
mod error;
mod loader;
mod ontology;
mod parser;
mod reasoner;
mod rule;
pub mod vocab;

pub use crate::axiom::Axiom;
pub use crate::entity::{
    AnnotationProperty, DataProperty, Individual, ObjectProperty, OwlClass, local_name,
};
pub use crate::error::{LoadError, OwlParseError, OwlParseErrorKind};
pub use crate::loader::{OntologyLoader, RdfOntologyLoader};
pub use crate::ontology::{EntityKind, Ontology};
pub use crate::parser::{OntologyParser, ParserConfig};
pub use crate::reasoner::{
    Reasoner, ReasonerFactory, StructuralReasoner, StructuralReasonerFactory,
};
pub use crate::rule::{Rule, RuleArgument, RuleAtom};
