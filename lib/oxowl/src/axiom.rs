//! OWL 2 axioms over named entities.
//!
//! Only axioms between named classes and properties are represented: anonymous
//! class expressions are dropped when reading RDF because the structural
//! reasoner never looks at them.

use crate::entity::{AnnotationProperty, DataProperty, Individual, ObjectProperty, OwlClass};
use crate::rule::Rule;
use oxrdf::{Literal, Term};

/// An OWL 2 axiom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Axiom {
    DeclareClass(OwlClass),
    DeclareObjectProperty(ObjectProperty),
    DeclareDataProperty(DataProperty),
    DeclareAnnotationProperty(AnnotationProperty),
    DeclareNamedIndividual(Individual),

    /// `SubClassOf(sub, super)`
    SubClassOf {
        sub_class: OwlClass,
        super_class: OwlClass,
    },
    EquivalentClasses(Vec<OwlClass>),
    DisjointClasses(Vec<OwlClass>),

    /// `SubObjectPropertyOf(sub, super)`
    SubObjectPropertyOf {
        sub_property: ObjectProperty,
        super_property: ObjectProperty,
    },
    EquivalentObjectProperties(Vec<ObjectProperty>),
    InverseObjectProperties(ObjectProperty, ObjectProperty),

    /// `SubDataPropertyOf(sub, super)`
    SubDataPropertyOf {
        sub_property: DataProperty,
        super_property: DataProperty,
    },
    EquivalentDataProperties(Vec<DataProperty>),

    /// `ClassAssertion(C, a)`
    ClassAssertion {
        class: OwlClass,
        individual: Individual,
    },
    /// `ObjectPropertyAssertion(P, a, b)`
    ObjectPropertyAssertion {
        property: ObjectProperty,
        source: Individual,
        target: Individual,
    },
    /// `DataPropertyAssertion(P, a, v)`
    DataPropertyAssertion {
        property: DataProperty,
        source: Individual,
        target: Literal,
    },
    SameIndividual(Vec<Individual>),
    DifferentIndividuals(Vec<Individual>),

    /// `AnnotationAssertion(P, s, v)`
    AnnotationAssertion {
        property: AnnotationProperty,
        subject: Term,
        value: Term,
    },

    /// A SWRL rule (`DLSafeRule`)
    Rule(Rule),
}

impl Axiom {
    #[inline]
    pub fn subclass_of(sub_class: impl Into<OwlClass>, super_class: impl Into<OwlClass>) -> Self {
        Self::SubClassOf {
            sub_class: sub_class.into(),
            super_class: super_class.into(),
        }
    }

    #[inline]
    pub fn class_assertion(class: impl Into<OwlClass>, individual: impl Into<Individual>) -> Self {
        Self::ClassAssertion {
            class: class.into(),
            individual: individual.into(),
        }
    }

    #[inline]
    pub fn object_property_assertion(
        property: impl Into<ObjectProperty>,
        source: impl Into<Individual>,
        target: impl Into<Individual>,
    ) -> Self {
        Self::ObjectPropertyAssertion {
            property: property.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    #[inline]
    pub fn data_property_assertion(
        property: impl Into<DataProperty>,
        source: impl Into<Individual>,
        target: impl Into<Literal>,
    ) -> Self {
        Self::DataPropertyAssertion {
            property: property.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    /// Is this a declaration axiom?
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Self::DeclareClass(_)
                | Self::DeclareObjectProperty(_)
                | Self::DeclareDataProperty(_)
                | Self::DeclareAnnotationProperty(_)
                | Self::DeclareNamedIndividual(_)
        )
    }

    /// Is this an assertion about individuals (an ABox axiom)?
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::ClassAssertion { .. }
                | Self::ObjectPropertyAssertion { .. }
                | Self::DataPropertyAssertion { .. }
                | Self::SameIndividual(_)
                | Self::DifferentIndividuals(_)
        )
    }
}
