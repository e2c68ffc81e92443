//! Vocabularies used to read OWL 2 ontologies and SWRL rules from RDF.

pub mod owl {
    //! [OWL 2](https://www.w3.org/TR/owl2-mapping-to-rdf/) vocabulary.
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";

    pub const ONTOLOGY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Ontology");
    pub const CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
    pub const THING: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");
    pub const NOTHING: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Nothing");
    pub const OBJECT_PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#ObjectProperty");
    pub const DATATYPE_PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#DatatypeProperty");
    pub const ANNOTATION_PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#AnnotationProperty");
    pub const NAMED_INDIVIDUAL: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#NamedIndividual");
    pub const EQUIVALENT_CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#equivalentClass");
    pub const DISJOINT_WITH: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#disjointWith");
    pub const EQUIVALENT_PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#equivalentProperty");
    pub const INVERSE_OF: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#inverseOf");
    pub const SAME_AS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#sameAs");
    pub const DIFFERENT_FROM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#differentFrom");
    pub const IMPORTS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#imports");
    pub const VERSION_IRI: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#versionIRI");
}

pub mod swrl {
    //! [SWRL](https://www.w3.org/submission/SWRL/) vocabulary, as written by Protégé and the OWL API.
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://www.w3.org/2003/11/swrl#";
    pub const BUILT_IN_NAMESPACE: &str = "http://www.w3.org/2003/11/swrlb#";

    pub const IMP: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#Imp");
    pub const VARIABLE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#Variable");
    pub const BODY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#body");
    pub const HEAD: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#head");
    pub const CLASS_ATOM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#ClassAtom");
    pub const INDIVIDUAL_PROPERTY_ATOM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#IndividualPropertyAtom");
    pub const DATAVALUED_PROPERTY_ATOM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#DatavaluedPropertyAtom");
    pub const SAME_INDIVIDUAL_ATOM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#SameIndividualAtom");
    pub const DIFFERENT_INDIVIDUALS_ATOM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#DifferentIndividualsAtom");
    pub const BUILTIN_ATOM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#BuiltinAtom");
    pub const CLASS_PREDICATE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#classPredicate");
    pub const PROPERTY_PREDICATE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#propertyPredicate");
    pub const ARGUMENT1: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#argument1");
    pub const ARGUMENT2: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#argument2");
    pub const BUILTIN: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#builtin");
    pub const ARGUMENTS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2003/11/swrl#arguments");
}

/// Namespaces whose terms describe the ontology structure rather than the domain.
pub(crate) const STRUCTURAL_NAMESPACES: [&str; 5] = [
    owl::NAMESPACE,
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    "http://www.w3.org/2000/01/rdf-schema#",
    swrl::NAMESPACE,
    swrl::BUILT_IN_NAMESPACE,
];

pub(crate) fn is_structural(iri: &str) -> bool {
    STRUCTURAL_NAMESPACES.iter().any(|ns| iri.starts_with(ns))
}
