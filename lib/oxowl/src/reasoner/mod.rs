//! Reasoning over OWL 2 ontologies.
//!
//! A [`Reasoner`] answers the questions a query engine needs: the class and
//! property hierarchies, the members of a class and the values of a property.
//! [`StructuralReasoner`] only uses told information and is always available.

mod structural;

pub use structural::StructuralReasoner;

use crate::entity::{DataProperty, Individual, ObjectProperty, OwlClass};
use crate::ontology::Ontology;
use oxrdf::Literal;
use std::sync::Arc;

/// An OWL reasoner bound to an ontology.
///
/// All the returned lists are sorted and without duplicates so that the
/// results of a query do not depend on hash map iteration order.
pub trait Reasoner {
    /// The ontology the reasoner has been built on.
    fn ontology(&self) -> &Ontology;

    fn is_consistent(&self) -> bool;

    /// Sub classes of `class`, excluding `class` itself and its equivalent classes.
    fn sub_classes(&self, class: &OwlClass, direct: bool) -> Vec<OwlClass>;

    /// Super classes of `class`, excluding `class` itself and its equivalent classes.
    ///
    /// `owl:Thing` is a super class of every other class.
    fn super_classes(&self, class: &OwlClass, direct: bool) -> Vec<OwlClass>;

    /// Classes equivalent to `class`, excluding `class` itself.
    fn equivalent_classes(&self, class: &OwlClass) -> Vec<OwlClass>;

    /// Members of `class`. If `direct` is set, only the individuals for which
    /// `class` is one of the most specific types are returned.
    fn instances(&self, class: &OwlClass, direct: bool) -> Vec<Individual>;

    /// Classes `individual` belongs to. If `direct` is set, only the most specific ones.
    fn types(&self, individual: &Individual, direct: bool) -> Vec<OwlClass>;

    fn object_property_values(
        &self,
        subject: &Individual,
        property: &ObjectProperty,
    ) -> Vec<Individual>;

    fn data_property_values(&self, subject: &Individual, property: &DataProperty) -> Vec<Literal>;

    /// All the `(subject, object)` pairs of the property.
    fn object_property_pairs(&self, property: &ObjectProperty) -> Vec<(Individual, Individual)>;

    /// All the `(subject, value)` pairs of the property.
    fn data_property_pairs(&self, property: &DataProperty) -> Vec<(Individual, Literal)>;

    /// Individuals known to be the same as `individual`, including itself.
    fn same_individuals(&self, individual: &Individual) -> Vec<Individual>;

    fn are_different(&self, a: &Individual, b: &Individual) -> bool;

    /// All the individuals of the ontology.
    fn individuals(&self) -> Vec<Individual>;
}

/// Builds reasoners over loaded ontologies.
pub trait ReasonerFactory {
    type Reasoner: Reasoner;

    fn create_reasoner(&self, ontology: Arc<Ontology>) -> Self::Reasoner;
}

/// Creates [`StructuralReasoner`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralReasonerFactory;

impl ReasonerFactory for StructuralReasonerFactory {
    type Reasoner = StructuralReasoner;

    fn create_reasoner(&self, ontology: Arc<Ontology>) -> StructuralReasoner {
        StructuralReasoner::new(ontology)
    }
}
