//! Mapping of RDF graphs to OWL 2 axioms.
//!
//! This follows the [OWL 2 RDF mapping](https://www.w3.org/TR/owl2-mapping-to-rdf/)
//! for the axioms the [`Ontology`] model supports. Triples describing anonymous
//! class expressions (restrictions, unions...) are skipped.
//! SWRL rules (`swrl:Imp` nodes) become [`Axiom::Rule`] axioms.

use crate::axiom::Axiom;
use crate::entity::{AnnotationProperty, DataProperty, Individual, ObjectProperty, OwlClass};
use crate::error::OwlParseError;
use crate::ontology::{EntityKind, Ontology};
use crate::rule::{Rule, RuleArgument, RuleAtom};
use crate::vocab::{is_structural, owl, swrl};
use oxrdf::vocab::{rdf, rdfs};
use oxrdf::{Graph, NamedNodeRef, NamedOrBlankNodeRef, TermRef, TripleRef};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

const ANNOTATION_PREDICATES: [NamedNodeRef<'static>; 5] = [
    rdfs::LABEL,
    rdfs::COMMENT,
    rdfs::SEE_ALSO,
    rdfs::IS_DEFINED_BY,
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#versionInfo"),
];
const OWL_ALL_DISJOINT_CLASSES: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#AllDisjointClasses");
const OWL_ALL_DIFFERENT: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#AllDifferent");
const OWL_MEMBERS: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#members");
const OWL_DISTINCT_MEMBERS: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#distinctMembers");

/// Parser options.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximal number of elements in an RDF list.
    pub max_list_length: usize,
    /// Skip (with a warning) the constructs that cannot be mapped instead of failing.
    pub lenient: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_list_length: 10_000,
            lenient: false,
        }
    }
}

/// Builds an [`Ontology`] from an RDF graph.
///
/// ```
/// use oxowl::OntologyParser;
/// use oxrdf::vocab::rdf;
/// use oxrdf::{Graph, NamedNodeRef, TripleRef};
///
/// let mut graph = Graph::new();
/// graph.insert(TripleRef::new(
///     NamedNodeRef::new("http://example.com/alice")?,
///     rdf::TYPE,
///     NamedNodeRef::new("http://example.com/Person")?,
/// ));
/// let ontology = OntologyParser::new(&graph).parse()?;
/// assert_eq!(ontology.classes().count(), 1);
/// assert_eq!(ontology.individuals().count(), 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct OntologyParser<'a> {
    graph: &'a Graph,
    config: ParserConfig,
}

impl<'a> OntologyParser<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self::with_config(graph, ParserConfig::default())
    }

    pub fn with_config(graph: &'a Graph, config: ParserConfig) -> Self {
        Self { graph, config }
    }

    pub fn parse(&self) -> Result<Ontology, OwlParseError> {
        let mut ontology = Ontology::new(None);
        self.parse_header(&mut ontology);
        // Declarations go first so that property assertions can be typed.
        for triple in self.graph.triples_for_predicate(rdf::TYPE) {
            self.parse_declaration(triple, &mut ontology);
        }
        for property in self.mixed_value_properties(&ontology) {
            debug!("{property} has both literal and non-literal values, it is read as an annotation property");
            ontology.add_axiom(Axiom::DeclareAnnotationProperty(property.into()));
        }
        for triple in self.graph {
            if let Err(e) = self.parse_triple(triple, &mut ontology) {
                if self.config.lenient {
                    warn!("skipping triple {triple}: {e}");
                } else {
                    return Err(e);
                }
            }
        }
        Ok(ontology)
    }

    fn parse_header(&self, ontology: &mut Ontology) {
        let Some(iri) = self
            .graph
            .subjects_for_predicate_object(rdf::TYPE, owl::ONTOLOGY)
            .find_map(|s| match s {
                NamedOrBlankNodeRef::NamedNode(n) => Some(n),
                NamedOrBlankNodeRef::BlankNode(_) => None,
            })
        else {
            return;
        };
        ontology.set_iri(Some(iri.into_owned()));
        for import in self.graph.objects_for_subject_predicate(iri, owl::IMPORTS) {
            if let TermRef::NamedNode(import) = import {
                ontology.add_import(import.into_owned());
            }
        }
        if let Some(TermRef::NamedNode(version)) =
            self.graph.object_for_subject_predicate(iri, owl::VERSION_IRI)
        {
            ontology.set_version_iri(Some(version.into_owned()));
        }
    }

    fn parse_declaration(&self, triple: TripleRef<'_>, ontology: &mut Ontology) {
        let TermRef::NamedNode(kind) = triple.object else {
            return;
        };
        if kind == owl::NAMED_INDIVIDUAL {
            ontology.add_axiom(Axiom::DeclareNamedIndividual(
                triple.subject.into_owned().into(),
            ));
            return;
        }
        let NamedOrBlankNodeRef::NamedNode(subject) = triple.subject else {
            return;
        };
        if kind == owl::CLASS || kind == rdfs::CLASS {
            ontology.add_axiom(Axiom::DeclareClass(subject.into()));
        } else if kind == owl::OBJECT_PROPERTY {
            ontology.add_axiom(Axiom::DeclareObjectProperty(subject.into()));
        } else if kind == owl::DATATYPE_PROPERTY {
            ontology.add_axiom(Axiom::DeclareDataProperty(subject.into()));
        } else if kind == owl::ANNOTATION_PROPERTY {
            ontology.add_axiom(Axiom::DeclareAnnotationProperty(subject.into()));
        }
    }

    /// Undeclared properties used both with literals and with individuals.
    ///
    /// They can be neither object nor data properties so, as the OWL API does,
    /// they are read as annotation properties.
    fn mixed_value_properties(&self, ontology: &Ontology) -> Vec<NamedNodeRef<'a>> {
        let mut value_kinds = FxHashMap::<NamedNodeRef<'a>, (bool, bool)>::default();
        for triple in self.graph {
            if is_structural(triple.predicate.as_str())
                || ANNOTATION_PREDICATES.contains(&triple.predicate)
                || !ontology.entity_kinds(triple.predicate).is_empty()
            {
                continue;
            }
            let (literal, other) = value_kinds.entry(triple.predicate).or_default();
            if let TermRef::Literal(_) = triple.object {
                *literal = true;
            } else {
                *other = true;
            }
        }
        let mut mixed = value_kinds
            .into_iter()
            .filter_map(|(property, (literal, other))| (literal && other).then_some(property))
            .collect::<Vec<_>>();
        mixed.sort_unstable();
        mixed
    }

    fn parse_triple(
        &self,
        triple: TripleRef<'_>,
        ontology: &mut Ontology,
    ) -> Result<(), OwlParseError> {
        let predicate = triple.predicate;
        let on_header = ontology
            .iri()
            .is_some_and(|iri| triple.subject == NamedOrBlankNodeRef::from(iri.as_ref()));
        if predicate == rdf::TYPE {
            return self.parse_type(triple, ontology);
        }
        if predicate == rdfs::SUB_CLASS_OF {
            if let (Some(sub), Some(sup)) = (
                named_subject(triple.subject),
                named_object(triple.object),
            ) {
                ontology.add_axiom(Axiom::subclass_of(sub, sup));
            }
        } else if predicate == owl::EQUIVALENT_CLASS {
            if let (Some(c1), Some(c2)) = (
                named_subject(triple.subject),
                named_object(triple.object),
            ) {
                ontology.add_axiom(Axiom::EquivalentClasses(vec![c1.into(), c2.into()]));
            }
        } else if predicate == owl::DISJOINT_WITH {
            if let (Some(c1), Some(c2)) = (
                named_subject(triple.subject),
                named_object(triple.object),
            ) {
                ontology.add_axiom(Axiom::DisjointClasses(vec![c1.into(), c2.into()]));
            }
        } else if predicate == rdfs::SUB_PROPERTY_OF || predicate == owl::EQUIVALENT_PROPERTY {
            if let (Some(p1), Some(p2)) = (
                named_subject(triple.subject),
                named_object(triple.object),
            ) {
                self.parse_property_relation(predicate, p1, p2, ontology);
            }
        } else if predicate == owl::INVERSE_OF {
            if let (Some(p1), Some(p2)) = (
                named_subject(triple.subject),
                named_object(triple.object),
            ) {
                ontology.add_axiom(Axiom::InverseObjectProperties(p1.into(), p2.into()));
            }
        } else if predicate == owl::SAME_AS {
            ontology.add_axiom(Axiom::SameIndividual(vec![
                triple.subject.into_owned().into(),
                individual(triple.object)?,
            ]));
        } else if predicate == owl::DIFFERENT_FROM {
            ontology.add_axiom(Axiom::DifferentIndividuals(vec![
                triple.subject.into_owned().into(),
                individual(triple.object)?,
            ]));
        } else if ANNOTATION_PREDICATES.contains(&predicate)
            || (on_header && !is_structural(predicate.as_str()))
            || ontology
                .entity_kinds(predicate)
                .contains(&EntityKind::AnnotationProperty)
        {
            ontology.add_axiom(Axiom::AnnotationAssertion {
                property: AnnotationProperty::from(predicate),
                subject: triple.subject.into_owned().into(),
                value: triple.object.into_owned(),
            });
        } else if !is_structural(predicate.as_str()) {
            self.parse_assertion(triple, ontology)?;
        }
        Ok(())
    }

    fn parse_type(
        &self,
        triple: TripleRef<'_>,
        ontology: &mut Ontology,
    ) -> Result<(), OwlParseError> {
        let TermRef::NamedNode(class) = triple.object else {
            // Anonymous class expression
            return Ok(());
        };
        if class == OWL_ALL_DISJOINT_CLASSES {
            if let Some(members) = self
                .graph
                .object_for_subject_predicate(triple.subject, OWL_MEMBERS)
            {
                let classes = self
                    .parse_list(members)?
                    .into_iter()
                    .filter_map(named_object)
                    .map(OwlClass::from)
                    .collect();
                ontology.add_axiom(Axiom::DisjointClasses(classes));
            }
        } else if class == swrl::IMP {
            match self.parse_rule(triple.subject)? {
                Some(rule) => {
                    ontology.add_axiom(Axiom::Rule(rule));
                }
                None => warn!("skipping the rule {}: it uses constructs that are not supported", triple.subject),
            }
        } else if class == OWL_ALL_DIFFERENT {
            let members = self
                .graph
                .object_for_subject_predicate(triple.subject, OWL_DISTINCT_MEMBERS)
                .or_else(|| {
                    self.graph
                        .object_for_subject_predicate(triple.subject, OWL_MEMBERS)
                });
            if let Some(members) = members {
                let individuals = self
                    .parse_list(members)?
                    .into_iter()
                    .map(individual)
                    .collect::<Result<_, _>>()?;
                ontology.add_axiom(Axiom::DifferentIndividuals(individuals));
            }
        } else if !is_structural(class.as_str()) || class == owl::THING {
            ontology.add_axiom(Axiom::class_assertion(
                class,
                Individual::from(triple.subject.into_owned()),
            ));
        }
        Ok(())
    }

    fn parse_property_relation(
        &self,
        predicate: NamedNodeRef<'_>,
        p1: NamedNodeRef<'_>,
        p2: NamedNodeRef<'_>,
        ontology: &mut Ontology,
    ) {
        let is_data = |p: NamedNodeRef<'_>| {
            ontology
                .entity_kinds(p)
                .contains(&EntityKind::DataProperty)
        };
        let is_object = |p: NamedNodeRef<'_>| {
            ontology
                .entity_kinds(p)
                .contains(&EntityKind::ObjectProperty)
        };
        let axiom = if is_data(p1) || is_data(p2) {
            if predicate == rdfs::SUB_PROPERTY_OF {
                Axiom::SubDataPropertyOf {
                    sub_property: DataProperty::from(p1),
                    super_property: DataProperty::from(p2),
                }
            } else {
                Axiom::EquivalentDataProperties(vec![p1.into(), p2.into()])
            }
        } else if is_object(p1) || is_object(p2) {
            if predicate == rdfs::SUB_PROPERTY_OF {
                Axiom::SubObjectPropertyOf {
                    sub_property: ObjectProperty::from(p1),
                    super_property: ObjectProperty::from(p2),
                }
            } else {
                Axiom::EquivalentObjectProperties(vec![p1.into(), p2.into()])
            }
        } else {
            // Annotation properties hierarchies are not used for reasoning
            return;
        };
        ontology.add_axiom(axiom);
    }

    fn parse_assertion(
        &self,
        triple: TripleRef<'_>,
        ontology: &mut Ontology,
    ) -> Result<(), OwlParseError> {
        let kinds = ontology.entity_kinds(triple.predicate);
        let source = Individual::from(triple.subject.into_owned());
        let axiom = match triple.object {
            TermRef::Literal(value) => {
                if kinds.contains(&EntityKind::ObjectProperty)
                    && !kinds.contains(&EntityKind::DataProperty)
                {
                    return Err(OwlParseError::invalid_value(format!(
                        "the object property {} is used with the literal {value}",
                        triple.predicate
                    )));
                }
                Axiom::data_property_assertion(triple.predicate, source, value.into_owned())
            }
            object => {
                if kinds.contains(&EntityKind::DataProperty)
                    && !kinds.contains(&EntityKind::ObjectProperty)
                {
                    return Err(OwlParseError::invalid_value(format!(
                        "the data property {} is used with the non-literal {object}",
                        triple.predicate
                    )));
                }
                Axiom::object_property_assertion(triple.predicate, source, individual(object)?)
            }
        };
        ontology.add_axiom(axiom);
        Ok(())
    }

    /// Reads a `swrl:Imp` node.
    ///
    /// Returns `None` if the rule uses atoms without counterpart in [`RuleAtom`]
    /// (data ranges, anonymous class expressions...).
    fn parse_rule(&self, node: NamedOrBlankNodeRef<'_>) -> Result<Option<Rule>, OwlParseError> {
        let mut parts = [Vec::new(), Vec::new()];
        for (atoms, predicate) in parts.iter_mut().zip([swrl::BODY, swrl::HEAD]) {
            let Some(list) = self.graph.object_for_subject_predicate(node, predicate) else {
                continue;
            };
            for atom in self.parse_list(list)? {
                let Some(atom) = self.parse_rule_atom(atom)? else {
                    return Ok(None);
                };
                atoms.push(atom);
            }
        }
        let [body, head] = parts;
        Ok(Some(Rule { body, head }))
    }

    fn parse_rule_atom(&self, atom: TermRef<'_>) -> Result<Option<RuleAtom>, OwlParseError> {
        let node = match atom {
            TermRef::NamedNode(n) => NamedOrBlankNodeRef::from(n),
            TermRef::BlankNode(b) => NamedOrBlankNodeRef::from(b),
            _ => {
                return Err(OwlParseError::invalid_value(format!(
                    "{atom} is not a SWRL atom"
                )));
            }
        };
        let required = |predicate: NamedNodeRef<'_>| {
            self.graph
                .object_for_subject_predicate(node, predicate)
                .ok_or_else(|| {
                    OwlParseError::invalid_value(format!("the SWRL atom {node} has no {predicate}"))
                })
        };
        let argument = |predicate: NamedNodeRef<'_>| required(predicate).and_then(|a| self.rule_argument(a));
        let types = self
            .graph
            .objects_for_subject_predicate(node, rdf::TYPE)
            .collect::<Vec<_>>();
        let is = |kind: NamedNodeRef<'_>| types.contains(&TermRef::from(kind));
        Ok(Some(if is(swrl::CLASS_ATOM) {
            let Some(class) = named_object(required(swrl::CLASS_PREDICATE)?) else {
                return Ok(None);
            };
            RuleAtom::Class {
                class: class.into(),
                argument: argument(swrl::ARGUMENT1)?,
            }
        } else if is(swrl::INDIVIDUAL_PROPERTY_ATOM) || is(swrl::DATAVALUED_PROPERTY_ATOM) {
            let Some(property) = named_object(required(swrl::PROPERTY_PREDICATE)?) else {
                return Ok(None);
            };
            let subject = argument(swrl::ARGUMENT1)?;
            let object = argument(swrl::ARGUMENT2)?;
            if is(swrl::DATAVALUED_PROPERTY_ATOM) {
                RuleAtom::DataProperty {
                    property: property.into(),
                    subject,
                    value: object,
                }
            } else {
                RuleAtom::ObjectProperty {
                    property: property.into(),
                    subject,
                    object,
                }
            }
        } else if is(swrl::SAME_INDIVIDUAL_ATOM) {
            RuleAtom::SameIndividual(argument(swrl::ARGUMENT1)?, argument(swrl::ARGUMENT2)?)
        } else if is(swrl::DIFFERENT_INDIVIDUALS_ATOM) {
            RuleAtom::DifferentIndividuals(argument(swrl::ARGUMENT1)?, argument(swrl::ARGUMENT2)?)
        } else if is(swrl::BUILTIN_ATOM) {
            let Some(built_in) = named_object(required(swrl::BUILTIN)?) else {
                return Ok(None);
            };
            let arguments = match self.graph.object_for_subject_predicate(node, swrl::ARGUMENTS) {
                Some(list) => self
                    .parse_list(list)?
                    .into_iter()
                    .map(|a| self.rule_argument(a))
                    .collect::<Result<_, _>>()?,
                None => Vec::new(),
            };
            RuleAtom::BuiltIn {
                built_in: built_in.into_owned(),
                arguments,
            }
        } else {
            return Ok(None);
        }))
    }

    fn rule_argument(&self, term: TermRef<'_>) -> Result<RuleArgument, OwlParseError> {
        Ok(match term {
            TermRef::NamedNode(n)
                if self
                    .graph
                    .contains(TripleRef::new(n, rdf::TYPE, swrl::VARIABLE)) =>
            {
                RuleArgument::Variable(n.into_owned())
            }
            TermRef::Literal(l) => RuleArgument::Literal(l.into_owned()),
            term => RuleArgument::Individual(individual(term)?),
        })
    }

    fn parse_list(&self, head: TermRef<'a>) -> Result<Vec<TermRef<'a>>, OwlParseError> {
        let mut elements = Vec::new();
        let mut visited = FxHashSet::default();
        let mut current = head;
        while current != TermRef::from(rdf::NIL) {
            let node = match current {
                TermRef::NamedNode(n) => NamedOrBlankNodeRef::from(n),
                TermRef::BlankNode(b) => NamedOrBlankNodeRef::from(b),
                _ => {
                    return Err(OwlParseError::malformed_list(format!(
                        "{current} is not a list node"
                    )));
                }
            };
            if !visited.insert(node) || elements.len() >= self.config.max_list_length {
                return Err(OwlParseError::malformed_list(format!(
                    "the list starting at {head} is cyclic or too long"
                )));
            }
            let first = self
                .graph
                .object_for_subject_predicate(node, rdf::FIRST)
                .ok_or_else(|| {
                    OwlParseError::malformed_list(format!("{node} has no rdf:first"))
                })?;
            elements.push(first);
            current = self
                .graph
                .object_for_subject_predicate(node, rdf::REST)
                .ok_or_else(|| OwlParseError::malformed_list(format!("{node} has no rdf:rest")))?;
        }
        Ok(elements)
    }
}

fn named_subject(subject: NamedOrBlankNodeRef<'_>) -> Option<NamedNodeRef<'_>> {
    match subject {
        NamedOrBlankNodeRef::NamedNode(n) => Some(n),
        NamedOrBlankNodeRef::BlankNode(_) => None,
    }
}

fn named_object(object: TermRef<'_>) -> Option<NamedNodeRef<'_>> {
    if let TermRef::NamedNode(n) = object {
        Some(n)
    } else {
        None
    }
}

fn individual(term: TermRef<'_>) -> Result<Individual, OwlParseError> {
    match term {
        TermRef::NamedNode(n) => Ok(Individual::Named(n.into_owned())),
        TermRef::BlankNode(b) => Ok(Individual::Anonymous(b.into_owned())),
        _ => Err(OwlParseError::invalid_value(format!(
            "{term} cannot be used as an individual"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, Literal, NamedNode, Triple};

    fn ex(local: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/family#{local}"))
    }

    #[test]
    fn undeclared_properties_are_typed_by_their_object() {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(ex("alice"), ex("hasParent"), ex("bob")));
        graph.insert(&Triple::new(
            ex("alice"),
            ex("hasAge"),
            Literal::new_typed_literal("42", oxrdf::vocab::xsd::INTEGER),
        ));
        let ontology = OntologyParser::new(&graph).parse().unwrap();
        assert_eq!(
            ontology.entity_kinds(&ex("hasParent")),
            [EntityKind::ObjectProperty]
        );
        assert_eq!(
            ontology.entity_kinds(&ex("hasAge")),
            [EntityKind::DataProperty]
        );
    }

    #[test]
    fn declared_object_property_rejects_literals() {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(
            ex("hasParent"),
            rdf::TYPE,
            owl::OBJECT_PROPERTY.into_owned(),
        ));
        graph.insert(&Triple::new(
            ex("alice"),
            ex("hasParent"),
            Literal::new_simple_literal("bob"),
        ));
        assert!(OntologyParser::new(&graph).parse().is_err());
        let lenient = ParserConfig {
            lenient: true,
            ..ParserConfig::default()
        };
        let ontology = OntologyParser::with_config(&graph, lenient)
            .parse()
            .unwrap();
        assert_eq!(ontology.individuals().count(), 0);
    }

    #[test]
    fn all_different_members_are_read_from_lists() {
        let mut graph = Graph::new();
        let node = BlankNode::default();
        let list1 = BlankNode::default();
        let list2 = BlankNode::default();
        graph.insert(&Triple::new(node.clone(), rdf::TYPE, OWL_ALL_DIFFERENT.into_owned()));
        graph.insert(&Triple::new(node, OWL_DISTINCT_MEMBERS, list1.clone()));
        graph.insert(&Triple::new(list1.clone(), rdf::FIRST, ex("alice")));
        graph.insert(&Triple::new(list1, rdf::REST, list2.clone()));
        graph.insert(&Triple::new(list2.clone(), rdf::FIRST, ex("bob")));
        graph.insert(&Triple::new(list2, rdf::REST, rdf::NIL.into_owned()));
        let ontology = OntologyParser::new(&graph).parse().unwrap();
        assert!(ontology.axioms().contains(&Axiom::DifferentIndividuals(vec![
            ex("alice").into(),
            ex("bob").into()
        ])));
    }

    #[test]
    fn cyclic_lists_are_rejected() {
        let mut graph = Graph::new();
        let node = BlankNode::default();
        let list = BlankNode::default();
        graph.insert(&Triple::new(node.clone(), rdf::TYPE, OWL_ALL_DIFFERENT.into_owned()));
        graph.insert(&Triple::new(node, OWL_MEMBERS, list.clone()));
        graph.insert(&Triple::new(list.clone(), rdf::FIRST, ex("alice")));
        graph.insert(&Triple::new(list.clone(), rdf::REST, list));
        assert!(OntologyParser::new(&graph).parse().is_err());
    }

    #[test]
    fn undeclared_properties_with_mixed_values_are_annotations() {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(ex("alice"), ex("note"), ex("bob")));
        graph.insert(&Triple::new(
            ex("carol"),
            ex("note"),
            Literal::new_simple_literal("hello"),
        ));
        let ontology = OntologyParser::new(&graph).parse().unwrap();
        assert_eq!(
            ontology.entity_kinds(&ex("note")),
            [EntityKind::AnnotationProperty]
        );
        assert_eq!(ontology.individuals().count(), 0);
    }

    #[test]
    fn ontology_header_properties_are_annotations() {
        let ontology_iri = NamedNode::new_unchecked("http://example.com/family");
        let mut graph = Graph::new();
        graph.insert(&Triple::new(
            ontology_iri.clone(),
            rdf::TYPE,
            owl::ONTOLOGY.into_owned(),
        ));
        graph.insert(&Triple::new(
            ontology_iri.clone(),
            NamedNode::new_unchecked("http://purl.org/dc/elements/1.1/creator"),
            Literal::new_simple_literal("Jane Doe"),
        ));
        graph.insert(&Triple::new(
            ontology_iri,
            NamedNode::new_unchecked("http://purl.org/dc/terms/source"),
            ex("alice"),
        ));
        let ontology = OntologyParser::new(&graph).parse().unwrap();
        assert_eq!(ontology.individuals().count(), 0);
        assert_eq!(ontology.annotation_properties().count(), 2);
    }
}
