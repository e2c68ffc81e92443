//! OWL 2 ontology: axioms plus the indexes needed to answer queries on them.

use crate::axiom::Axiom;
use crate::entity::{
    AnnotationProperty, DataProperty, Individual, ObjectProperty, OwlClass, local_name,
};
use crate::rule::{Rule, RuleArgument, RuleAtom};
use oxrdf::vocab::rdfs;
use oxrdf::{Literal, NamedNode, NamedNodeRef, Term};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The role an IRI plays in an ontology.
///
/// OWL 2 allows punning so the same IRI may have several kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Class,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    Individual,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::ObjectProperty => "object property",
            Self::DataProperty => "data property",
            Self::AnnotationProperty => "annotation property",
            Self::Individual => "individual",
        })
    }
}

/// An OWL 2 ontology.
///
/// Axioms are kept in the order they were added. Assertions are also indexed
/// by class, by property and by subject so that lookups do not scan the axiom list.
///
/// ```
/// use oxowl::{Axiom, Individual, Ontology, OwlClass};
/// use oxrdf::NamedNode;
///
/// let mut ontology = Ontology::new(None);
/// let person = OwlClass::new_from_iri("http://example.com/Person")?;
/// let alice = Individual::Named(NamedNode::new("http://example.com/alice")?);
/// ontology.add_axiom(Axiom::class_assertion(person.clone(), alice.clone()));
///
/// assert!(ontology.contains_class(&person));
/// assert_eq!(ontology.asserted_instances(&person), [alice]);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    iri: Option<NamedNode>,
    version_iri: Option<NamedNode>,
    imports: Vec<NamedNode>,
    prefixes: BTreeMap<String, String>,
    axioms: Vec<Axiom>,
    axiom_set: FxHashSet<Axiom>,
    classes: BTreeSet<OwlClass>,
    object_properties: BTreeSet<ObjectProperty>,
    data_properties: BTreeSet<DataProperty>,
    annotation_properties: BTreeSet<AnnotationProperty>,
    individuals: BTreeSet<Individual>,
    kinds: FxHashMap<NamedNode, Vec<EntityKind>>,
    by_local_name: FxHashMap<String, Vec<NamedNode>>,
    by_label: FxHashMap<String, Vec<NamedNode>>,
    instances_by_class: FxHashMap<OwlClass, Vec<Individual>>,
    types_by_individual: FxHashMap<Individual, Vec<OwlClass>>,
    object_assertions: FxHashMap<ObjectProperty, Vec<(Individual, Individual)>>,
    data_assertions: FxHashMap<DataProperty, Vec<(Individual, Literal)>>,
}

impl Ontology {
    pub fn new(iri: Option<NamedNode>) -> Self {
        Self {
            iri,
            ..Self::default()
        }
    }

    pub fn iri(&self) -> Option<&NamedNode> {
        self.iri.as_ref()
    }

    pub fn set_iri(&mut self, iri: Option<NamedNode>) {
        self.iri = iri;
    }

    pub fn version_iri(&self) -> Option<&NamedNode> {
        self.version_iri.as_ref()
    }

    pub fn set_version_iri(&mut self, iri: Option<NamedNode>) {
        self.version_iri = iri;
    }

    pub fn imports(&self) -> &[NamedNode] {
        &self.imports
    }

    pub fn add_import(&mut self, iri: NamedNode) {
        if !self.imports.contains(&iri) {
            self.imports.push(iri);
        }
    }

    /// The prefixes declared by the document the ontology was read from.
    ///
    /// The empty string is the default prefix (`:` in Turtle, `xmlns` in RDF/XML).
    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    pub fn add_prefix(&mut self, prefix_name: impl Into<String>, prefix_iri: impl Into<String>) {
        self.prefixes.insert(prefix_name.into(), prefix_iri.into());
    }

    /// Adds an axiom and updates the indexes.
    ///
    /// Entities used by the axiom are implicitly declared.
    /// Returns `false` if the axiom was already in the ontology.
    pub fn add_axiom(&mut self, axiom: Axiom) -> bool {
        if !self.axiom_set.insert(axiom.clone()) {
            return false;
        }
        match &axiom {
            Axiom::DeclareClass(c) => self.declare_class(c),
            Axiom::DeclareObjectProperty(p) => self.declare_object_property(p),
            Axiom::DeclareDataProperty(p) => self.declare_data_property(p),
            Axiom::DeclareAnnotationProperty(p) => self.declare_annotation_property(p),
            Axiom::DeclareNamedIndividual(i) => self.declare_individual(i),
            Axiom::SubClassOf {
                sub_class,
                super_class,
            } => {
                self.declare_class(sub_class);
                self.declare_class(super_class);
            }
            Axiom::EquivalentClasses(classes) | Axiom::DisjointClasses(classes) => {
                for c in classes {
                    self.declare_class(c);
                }
            }
            Axiom::SubObjectPropertyOf {
                sub_property,
                super_property,
            } => {
                self.declare_object_property(sub_property);
                self.declare_object_property(super_property);
            }
            Axiom::EquivalentObjectProperties(properties) => {
                for p in properties {
                    self.declare_object_property(p);
                }
            }
            Axiom::InverseObjectProperties(p1, p2) => {
                self.declare_object_property(p1);
                self.declare_object_property(p2);
            }
            Axiom::SubDataPropertyOf {
                sub_property,
                super_property,
            } => {
                self.declare_data_property(sub_property);
                self.declare_data_property(super_property);
            }
            Axiom::EquivalentDataProperties(properties) => {
                for p in properties {
                    self.declare_data_property(p);
                }
            }
            Axiom::ClassAssertion { class, individual } => {
                self.declare_class(class);
                self.declare_individual(individual);
                self.instances_by_class
                    .entry(class.clone())
                    .or_default()
                    .push(individual.clone());
                self.types_by_individual
                    .entry(individual.clone())
                    .or_default()
                    .push(class.clone());
            }
            Axiom::ObjectPropertyAssertion {
                property,
                source,
                target,
            } => {
                self.declare_object_property(property);
                self.declare_individual(source);
                self.declare_individual(target);
                self.object_assertions
                    .entry(property.clone())
                    .or_default()
                    .push((source.clone(), target.clone()));
            }
            Axiom::DataPropertyAssertion {
                property,
                source,
                target,
            } => {
                self.declare_data_property(property);
                self.declare_individual(source);
                self.data_assertions
                    .entry(property.clone())
                    .or_default()
                    .push((source.clone(), target.clone()));
            }
            Axiom::SameIndividual(individuals) | Axiom::DifferentIndividuals(individuals) => {
                for i in individuals {
                    self.declare_individual(i);
                }
            }
            Axiom::AnnotationAssertion {
                property,
                subject,
                value,
            } => {
                self.declare_annotation_property(property);
                if let (Term::NamedNode(subject), Term::Literal(label)) = (subject, value) {
                    if property.iri().as_ref() == rdfs::LABEL {
                        push_unique(
                            self.by_label.entry(label.value().to_owned()).or_default(),
                            subject.clone(),
                        );
                    }
                }
            }
            Axiom::Rule(rule) => self.declare_rule_signature(rule),
        }
        self.axioms.push(axiom);
        true
    }

    /// Declares the classes, properties and individuals used by a rule.
    ///
    /// Rule variables are not entities and stay undeclared.
    fn declare_rule_signature(&mut self, rule: &Rule) {
        for atom in rule.atoms() {
            let arguments = match atom {
                RuleAtom::Class { class, argument } => {
                    self.declare_class(class);
                    vec![argument]
                }
                RuleAtom::ObjectProperty {
                    property,
                    subject,
                    object,
                } => {
                    self.declare_object_property(property);
                    vec![subject, object]
                }
                RuleAtom::DataProperty {
                    property, subject, ..
                } => {
                    self.declare_data_property(property);
                    vec![subject]
                }
                RuleAtom::SameIndividual(a, b) | RuleAtom::DifferentIndividuals(a, b) => {
                    vec![a, b]
                }
                RuleAtom::BuiltIn { .. } => Vec::new(),
            };
            for argument in arguments {
                if let RuleArgument::Individual(individual) = argument {
                    self.declare_individual(individual);
                }
            }
        }
    }

    fn declare_class(&mut self, class: &OwlClass) {
        if self.classes.insert(class.clone()) {
            self.record_kind(class.iri(), EntityKind::Class);
        }
    }

    fn declare_object_property(&mut self, property: &ObjectProperty) {
        if self.object_properties.insert(property.clone()) {
            self.record_kind(property.iri(), EntityKind::ObjectProperty);
        }
    }

    fn declare_data_property(&mut self, property: &DataProperty) {
        if self.data_properties.insert(property.clone()) {
            self.record_kind(property.iri(), EntityKind::DataProperty);
        }
    }

    fn declare_annotation_property(&mut self, property: &AnnotationProperty) {
        if self.annotation_properties.insert(property.clone()) {
            self.record_kind(property.iri(), EntityKind::AnnotationProperty);
        }
    }

    fn declare_individual(&mut self, individual: &Individual) {
        if self.individuals.insert(individual.clone()) {
            if let Individual::Named(iri) = individual {
                self.record_kind(iri, EntityKind::Individual);
            }
        }
    }

    fn record_kind(&mut self, iri: &NamedNode, kind: EntityKind) {
        let kinds = self.kinds.entry(iri.clone()).or_default();
        if kinds.is_empty() {
            push_unique(
                self.by_local_name
                    .entry(local_name(iri.as_str()).to_owned())
                    .or_default(),
                iri.clone(),
            );
        }
        push_unique(kinds, kind);
    }

    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    pub fn axiom_count(&self) -> usize {
        self.axioms.len()
    }

    pub fn contains_axiom(&self, axiom: &Axiom) -> bool {
        self.axiom_set.contains(axiom)
    }

    /// The SWRL rules of the ontology, in document order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.axioms.iter().filter_map(|axiom| match axiom {
            Axiom::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &OwlClass> {
        self.classes.iter()
    }

    pub fn object_properties(&self) -> impl Iterator<Item = &ObjectProperty> {
        self.object_properties.iter()
    }

    pub fn data_properties(&self) -> impl Iterator<Item = &DataProperty> {
        self.data_properties.iter()
    }

    pub fn annotation_properties(&self) -> impl Iterator<Item = &AnnotationProperty> {
        self.annotation_properties.iter()
    }

    /// All individuals, named and anonymous, sorted.
    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    pub fn contains_class(&self, class: &OwlClass) -> bool {
        self.classes.contains(class)
    }

    pub fn contains_individual(&self, individual: &Individual) -> bool {
        self.individuals.contains(individual)
    }

    /// The kinds of entity the IRI is used as.
    pub fn entity_kinds<'a>(&self, iri: impl Into<NamedNodeRef<'a>>) -> &[EntityKind] {
        self.kinds
            .get(&iri.into().into_owned())
            .map_or(&[], Vec::as_slice)
    }

    /// Finds the entities a short name may denote.
    ///
    /// The candidates are looked for in order and the first non-empty match wins:
    /// 1. the default prefix of the document followed by `name`,
    /// 2. the ontology IRI namespace followed by `name`,
    /// 3. entities whose IRI local name is `name`,
    /// 4. entities with `name` as `rdfs:label`.
    pub fn resolve_short_name(&self, name: &str) -> Vec<NamedNode> {
        self.resolve_short_name_with(name, |_| true)
    }

    /// Same as [`resolve_short_name`](Self::resolve_short_name) but only keeps the entities
    /// whose kinds are accepted by `filter`.
    ///
    /// The filter applies at every step, so an entity of an unwanted kind in the default
    /// namespace does not hide a wanted one found by local name.
    pub fn resolve_short_name_with(
        &self,
        name: &str,
        filter: impl Fn(&[EntityKind]) -> bool,
    ) -> Vec<NamedNode> {
        let accept = |iri: &NamedNode| filter(self.entity_kinds(iri));
        let mut namespaces = Vec::new();
        if let Some(default) = self.prefixes.get("") {
            namespaces.push(default.clone());
        }
        if let Some(iri) = &self.iri {
            let iri = iri.as_str();
            if iri.ends_with(['#', '/']) {
                namespaces.push(iri.to_owned());
            } else {
                namespaces.push(format!("{iri}#"));
                namespaces.push(format!("{iri}/"));
            }
        }
        for namespace in namespaces {
            let candidate = NamedNode::new_unchecked(format!("{namespace}{name}"));
            if self.kinds.contains_key(&candidate) && accept(&candidate) {
                return vec![candidate];
            }
        }
        for index in [&self.by_local_name, &self.by_label] {
            let found = index
                .get(name)
                .into_iter()
                .flatten()
                .filter(|iri| accept(iri))
                .cloned()
                .collect::<Vec<_>>();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Individuals explicitly asserted to be members of the class.
    pub fn asserted_instances(&self, class: &OwlClass) -> &[Individual] {
        self.instances_by_class
            .get(class)
            .map_or(&[], Vec::as_slice)
    }

    /// Classes the individual is explicitly asserted to belong to.
    pub fn asserted_types(&self, individual: &Individual) -> &[OwlClass] {
        self.types_by_individual
            .get(individual)
            .map_or(&[], Vec::as_slice)
    }

    /// `(source, target)` pairs asserted for the object property.
    pub fn object_property_assertions(
        &self,
        property: &ObjectProperty,
    ) -> &[(Individual, Individual)] {
        self.object_assertions
            .get(property)
            .map_or(&[], Vec::as_slice)
    }

    /// `(source, value)` pairs asserted for the data property.
    pub fn data_property_assertions(&self, property: &DataProperty) -> &[(Individual, Literal)] {
        self.data_assertions
            .get(property)
            .map_or(&[], Vec::as_slice)
    }

    /// Adds all the axioms and prefixes of `other`. Existing prefixes win.
    pub fn merge(&mut self, other: Self) {
        for import in other.imports {
            self.add_import(import);
        }
        for (name, iri) in other.prefixes {
            self.prefixes.entry(name).or_insert(iri);
        }
        for axiom in other.axioms {
            self.add_axiom(axiom);
        }
    }
}

impl fmt::Display for Ontology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(iri) = &self.iri {
            write!(f, "Ontology({iri})")?;
        } else {
            write!(f, "Ontology(anonymous)")?;
        }
        write!(f, " [{} axioms]", self.axioms.len())
    }
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(value: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/family#{value}"))
    }

    #[test]
    fn assertions_declare_entities() {
        let mut ontology = Ontology::new(None);
        ontology.add_axiom(Axiom::object_property_assertion(
            iri("hasParent"),
            iri("alice"),
            iri("bob"),
        ));
        assert_eq!(
            ontology.entity_kinds(&iri("hasParent")),
            [EntityKind::ObjectProperty]
        );
        assert_eq!(ontology.entity_kinds(&iri("bob")), [EntityKind::Individual]);
        assert_eq!(ontology.individuals().count(), 2);
    }

    #[test]
    fn short_names_prefer_the_default_prefix() {
        let mut ontology = Ontology::new(None);
        ontology.add_prefix("", "http://example.com/family#");
        ontology.add_axiom(Axiom::DeclareClass(iri("Person").into()));
        ontology.add_axiom(Axiom::DeclareClass(OwlClass::new(NamedNode::new_unchecked(
            "http://example.com/other#Person",
        ))));
        assert_eq!(ontology.resolve_short_name("Person"), [iri("Person")]);
    }

    #[test]
    fn short_names_fall_back_to_labels() {
        let mut ontology = Ontology::new(None);
        ontology.add_axiom(Axiom::AnnotationAssertion {
            property: rdfs::LABEL.into(),
            subject: iri("C1").into(),
            value: Literal::new_simple_literal("Person").into(),
        });
        assert_eq!(ontology.resolve_short_name("Person"), [iri("C1")]);
        assert!(ontology.resolve_short_name("Animal").is_empty());
    }

    #[test]
    fn short_name_filter_looks_past_the_default_namespace() {
        let other = NamedNode::new_unchecked("http://example.com/other#Person");
        let mut ontology = Ontology::new(None);
        ontology.add_prefix("", "http://example.com/family#");
        ontology.add_axiom(Axiom::DeclareNamedIndividual(iri("Person").into()));
        ontology.add_axiom(Axiom::DeclareClass(other.clone().into()));
        assert_eq!(ontology.resolve_short_name("Person"), [iri("Person")]);
        assert_eq!(
            ontology.resolve_short_name_with("Person", |kinds| kinds.contains(&EntityKind::Class)),
            [other]
        );
        assert!(
            ontology
                .resolve_short_name_with("Person", |kinds| kinds
                    .contains(&EntityKind::DataProperty))
                .is_empty()
        );
    }
}
