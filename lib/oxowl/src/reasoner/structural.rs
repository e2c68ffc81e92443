use super::Reasoner;
use crate::axiom::Axiom;
use crate::entity::{DataProperty, Individual, ObjectProperty, OwlClass};
use crate::ontology::Ontology;
use crate::vocab::owl;
use oxrdf::Literal;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// A reasoner that only uses told information.
///
/// It computes the transitive closure of the named class and property
/// hierarchies, follows `owl:inverseOf` and `owl:sameAs`, and checks the told
/// disjointness axioms. Property domains and ranges, property characteristics and
/// class expressions are ignored.
///
/// Everything is computed when the reasoner is built: afterwards it is
/// immutable and can be shared between threads.
///
/// ```
/// use oxowl::{Axiom, Individual, Ontology, OwlClass, Reasoner, StructuralReasoner};
/// use oxrdf::NamedNode;
/// use std::sync::Arc;
///
/// let mut ontology = Ontology::new(None);
/// let person = OwlClass::new_from_iri("http://example.com/Person")?;
/// let parent = OwlClass::new_from_iri("http://example.com/Parent")?;
/// let alice = Individual::Named(NamedNode::new("http://example.com/alice")?);
/// ontology.add_axiom(Axiom::subclass_of(parent.clone(), person.clone()));
/// ontology.add_axiom(Axiom::class_assertion(parent, alice.clone()));
///
/// let reasoner = StructuralReasoner::new(Arc::new(ontology));
/// assert_eq!(reasoner.instances(&person, false), [alice]);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct StructuralReasoner {
    ontology: Arc<Ontology>,
    classes: Hierarchy<OwlClass>,
    object_properties: Hierarchy<ObjectProperty>,
    data_properties: Hierarchy<DataProperty>,
    same_as: FxHashMap<Individual, Vec<Individual>>,
    different_from: FxHashSet<(Individual, Individual)>,
    types: FxHashMap<Individual, Vec<OwlClass>>,
    instances: FxHashMap<OwlClass, Vec<Individual>>,
    // Sorted by subject
    object_values: FxHashMap<ObjectProperty, Vec<(Individual, Individual)>>,
    data_values: FxHashMap<DataProperty, Vec<(Individual, Literal)>>,
    consistent: bool,
}

impl StructuralReasoner {
    pub fn new(ontology: Arc<Ontology>) -> Self {
        let start = Instant::now();
        let thing = OwlClass::from(owl::THING);

        let mut class_edges = Vec::new();
        let mut object_property_edges = Vec::new();
        let mut data_property_edges = Vec::new();
        let mut inverses = FxHashMap::<ObjectProperty, Vec<ObjectProperty>>::default();
        let mut same_as_edges = FxHashMap::<Individual, Vec<Individual>>::default();
        let mut different_from = FxHashSet::default();
        let mut disjoint = Vec::new();
        for axiom in ontology.axioms() {
            match axiom {
                Axiom::SubClassOf {
                    sub_class,
                    super_class,
                } => class_edges.push((sub_class.clone(), super_class.clone())),
                Axiom::EquivalentClasses(classes) => equivalence_edges(classes, &mut class_edges),
                Axiom::DisjointClasses(classes) => {
                    for (i, a) in classes.iter().enumerate() {
                        for b in &classes[i + 1..] {
                            disjoint.push((a.clone(), b.clone()));
                        }
                    }
                }
                Axiom::SubObjectPropertyOf {
                    sub_property,
                    super_property,
                } => object_property_edges.push((sub_property.clone(), super_property.clone())),
                Axiom::EquivalentObjectProperties(properties) => {
                    equivalence_edges(properties, &mut object_property_edges)
                }
                Axiom::InverseObjectProperties(p1, p2) => {
                    inverses.entry(p1.clone()).or_default().push(p2.clone());
                    inverses.entry(p2.clone()).or_default().push(p1.clone());
                }
                Axiom::SubDataPropertyOf {
                    sub_property,
                    super_property,
                } => data_property_edges.push((sub_property.clone(), super_property.clone())),
                Axiom::EquivalentDataProperties(properties) => {
                    equivalence_edges(properties, &mut data_property_edges)
                }
                Axiom::SameIndividual(individuals) => {
                    if let Some((first, others)) = individuals.split_first() {
                        for other in others {
                            same_as_edges
                                .entry(first.clone())
                                .or_default()
                                .push(other.clone());
                            same_as_edges
                                .entry(other.clone())
                                .or_default()
                                .push(first.clone());
                        }
                    }
                }
                Axiom::DifferentIndividuals(individuals) => {
                    for (i, a) in individuals.iter().enumerate() {
                        for b in &individuals[i + 1..] {
                            different_from.insert((a.clone(), b.clone()));
                            different_from.insert((b.clone(), a.clone()));
                        }
                    }
                }
                _ => {}
            }
        }
        for class in ontology.classes() {
            if *class != thing {
                class_edges.push((class.clone(), thing.clone()));
            }
        }

        let classes = Hierarchy::new(
            ontology.classes().cloned().chain([thing.clone()]),
            &class_edges,
        );
        let object_properties =
            Hierarchy::new(ontology.object_properties().cloned(), &object_property_edges);
        let data_properties =
            Hierarchy::new(ontology.data_properties().cloned(), &data_property_edges);

        let mut same_as = FxHashMap::<Individual, Vec<Individual>>::default();
        for individual in same_as_edges.keys() {
            if !same_as.contains_key(individual) {
                let group = reachable(individual, &same_as_edges)
                    .into_iter()
                    .collect::<Vec<_>>();
                for member in &group {
                    same_as.insert(member.clone(), group.clone());
                }
            }
        }

        let mut reasoner = Self {
            classes,
            object_properties,
            data_properties,
            same_as,
            different_from,
            types: FxHashMap::default(),
            instances: FxHashMap::default(),
            object_values: FxHashMap::default(),
            data_values: FxHashMap::default(),
            consistent: true,
            ontology,
        };
        reasoner.compute_types(&thing);
        reasoner.compute_object_values(&inverses);
        reasoner.compute_data_values();
        reasoner.consistent = reasoner.check_consistency(&disjoint);
        if !reasoner.consistent {
            warn!("{} is inconsistent", reasoner.ontology);
        }
        debug!(
            "structural reasoning over {} done in {:?}",
            reasoner.ontology,
            start.elapsed()
        );
        reasoner
    }

    fn compute_types(&mut self, thing: &OwlClass) {
        let ontology = Arc::clone(&self.ontology);
        for individual in ontology.individuals() {
            let mut types = BTreeSet::new();
            types.insert(thing.clone());
            for member in self.same_individuals(individual) {
                for class in ontology.asserted_types(&member) {
                    types.extend(self.classes.ancestors(class).cloned());
                }
            }
            for class in &types {
                // Individuals are iterated in order so the lists stay sorted
                self.instances
                    .entry(class.clone())
                    .or_default()
                    .push(individual.clone());
            }
            self.types
                .insert(individual.clone(), types.into_iter().collect());
        }
    }

    fn compute_object_values(&mut self, inverses: &FxHashMap<ObjectProperty, Vec<ObjectProperty>>) {
        let ontology = Arc::clone(&self.ontology);
        for property in ontology.object_properties() {
            let mut pairs = BTreeSet::new();
            for sub_property in self.object_properties.descendants(property) {
                pairs.extend(ontology.object_property_assertions(sub_property).iter().cloned());
                for inverse in inverses.get(sub_property).into_iter().flatten() {
                    for inverse_sub_property in self.object_properties.descendants(inverse) {
                        pairs.extend(
                            ontology
                                .object_property_assertions(inverse_sub_property)
                                .iter()
                                .map(|(s, o)| (o.clone(), s.clone())),
                        );
                    }
                }
            }
            let mut values = Vec::new();
            for (subject, object) in &pairs {
                for subject in self.same_individuals(subject) {
                    for object in self.same_individuals(object) {
                        values.push((subject.clone(), object));
                    }
                }
            }
            values.sort();
            values.dedup();
            self.object_values.insert(property.clone(), values);
        }
    }

    fn compute_data_values(&mut self) {
        let ontology = Arc::clone(&self.ontology);
        for property in ontology.data_properties() {
            let mut values = Vec::new();
            for sub_property in self.data_properties.descendants(property) {
                for (subject, value) in ontology.data_property_assertions(sub_property) {
                    for subject in self.same_individuals(subject) {
                        values.push((subject, value.clone()));
                    }
                }
            }
            values.sort_by(|(s1, v1), (s2, v2)| s1.cmp(s2).then_with(|| cmp_literals(v1, v2)));
            values.dedup();
            self.data_values.insert(property.clone(), values);
        }
    }

    fn check_consistency(&self, disjoint: &[(OwlClass, OwlClass)]) -> bool {
        let nothing = OwlClass::from(owl::NOTHING);
        for (individual, types) in &self.types {
            if types.binary_search(&nothing).is_ok() {
                debug!("{individual} is an instance of owl:Nothing");
                return false;
            }
            for (a, b) in disjoint {
                if types.binary_search(a).is_ok() && types.binary_search(b).is_ok() {
                    debug!("{individual} is an instance of the disjoint classes {a} and {b}");
                    return false;
                }
            }
        }
        for (a, b) in &self.different_from {
            if self.same_as.get(a).is_some_and(|group| group.contains(b)) {
                debug!("{a} and {b} are both the same and different");
                return false;
            }
        }
        true
    }
}

impl Reasoner for StructuralReasoner {
    fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    fn is_consistent(&self) -> bool {
        self.consistent
    }

    fn sub_classes(&self, class: &OwlClass, direct: bool) -> Vec<OwlClass> {
        if direct {
            self.classes.direct_descendants(class)
        } else {
            self.classes.strict_descendants(class)
        }
    }

    fn super_classes(&self, class: &OwlClass, direct: bool) -> Vec<OwlClass> {
        if direct {
            self.classes.direct_ancestors(class)
        } else {
            self.classes.strict_ancestors(class)
        }
    }

    fn equivalent_classes(&self, class: &OwlClass) -> Vec<OwlClass> {
        self.classes.equivalents(class)
    }

    fn instances(&self, class: &OwlClass, direct: bool) -> Vec<Individual> {
        let Some(instances) = self.instances.get(class) else {
            return Vec::new();
        };
        if !direct {
            return instances.clone();
        }
        instances
            .iter()
            .filter(|individual| self.types(individual, true).contains(class))
            .cloned()
            .collect()
    }

    fn types(&self, individual: &Individual, direct: bool) -> Vec<OwlClass> {
        let Some(types) = self.types.get(individual) else {
            return Vec::new();
        };
        if direct {
            self.classes.most_specific(types)
        } else {
            types.clone()
        }
    }

    fn object_property_values(
        &self,
        subject: &Individual,
        property: &ObjectProperty,
    ) -> Vec<Individual> {
        self.object_values
            .get(property)
            .map(|pairs| {
                subject_range(pairs, subject)
                    .iter()
                    .map(|(_, o)| o.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn data_property_values(&self, subject: &Individual, property: &DataProperty) -> Vec<Literal> {
        self.data_values
            .get(property)
            .map(|pairs| {
                subject_range(pairs, subject)
                    .iter()
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn object_property_pairs(&self, property: &ObjectProperty) -> Vec<(Individual, Individual)> {
        self.object_values
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn data_property_pairs(&self, property: &DataProperty) -> Vec<(Individual, Literal)> {
        self.data_values.get(property).cloned().unwrap_or_default()
    }

    fn same_individuals(&self, individual: &Individual) -> Vec<Individual> {
        self.same_as
            .get(individual)
            .cloned()
            .unwrap_or_else(|| vec![individual.clone()])
    }

    fn are_different(&self, a: &Individual, b: &Individual) -> bool {
        let others = self.same_individuals(b);
        self.same_individuals(a).iter().any(|a| {
            others
                .iter()
                .any(|b| self.different_from.contains(&(a.clone(), b.clone())))
        })
    }

    fn individuals(&self) -> Vec<Individual> {
        self.ontology.individuals().cloned().collect()
    }
}

/// Reflexive and transitive closure of a told hierarchy.
///
/// Two nodes are equivalent if each one is an ancestor of the other.
#[derive(Debug)]
struct Hierarchy<T> {
    ancestors: FxHashMap<T, BTreeSet<T>>,
    descendants: FxHashMap<T, BTreeSet<T>>,
}

impl<T: Clone + Eq + Hash + Ord> Hierarchy<T> {
    fn new(nodes: impl IntoIterator<Item = T>, edges: &[(T, T)]) -> Self {
        let mut all = FxHashSet::default();
        let mut parents = FxHashMap::<T, Vec<T>>::default();
        let mut children = FxHashMap::<T, Vec<T>>::default();
        all.extend(nodes);
        for (sub, sup) in edges {
            all.insert(sub.clone());
            all.insert(sup.clone());
            parents.entry(sub.clone()).or_default().push(sup.clone());
            children.entry(sup.clone()).or_default().push(sub.clone());
        }
        Self {
            ancestors: all
                .iter()
                .map(|node| (node.clone(), reachable(node, &parents)))
                .collect(),
            descendants: all
                .iter()
                .map(|node| (node.clone(), reachable(node, &children)))
                .collect(),
        }
    }

    /// The node and everything above it.
    fn ancestors<'a>(&'a self, node: &'a T) -> impl Iterator<Item = &'a T> {
        let known = self.ancestors.get(node);
        known
            .into_iter()
            .flatten()
            .chain(known.is_none().then_some(node))
    }

    /// The node and everything below it.
    fn descendants<'a>(&'a self, node: &'a T) -> impl Iterator<Item = &'a T> {
        let known = self.descendants.get(node);
        known
            .into_iter()
            .flatten()
            .chain(known.is_none().then_some(node))
    }

    fn is_ancestor(&self, ancestor: &T, node: &T) -> bool {
        ancestor == node
            || self
                .ancestors
                .get(node)
                .is_some_and(|ancestors| ancestors.contains(ancestor))
    }

    fn is_strict_ancestor(&self, ancestor: &T, node: &T) -> bool {
        self.is_ancestor(ancestor, node) && !self.is_ancestor(node, ancestor)
    }

    fn equivalents(&self, node: &T) -> Vec<T> {
        self.ancestors(node)
            .filter(|a| *a != node && self.is_ancestor(node, a))
            .cloned()
            .collect()
    }

    fn strict_ancestors(&self, node: &T) -> Vec<T> {
        self.ancestors(node)
            .filter(|a| !self.is_ancestor(node, a))
            .cloned()
            .collect()
    }

    fn strict_descendants(&self, node: &T) -> Vec<T> {
        self.descendants(node)
            .filter(|d| !self.is_ancestor(d, node))
            .cloned()
            .collect()
    }

    fn direct_ancestors(&self, node: &T) -> Vec<T> {
        self.most_specific(&self.strict_ancestors(node))
    }

    fn direct_descendants(&self, node: &T) -> Vec<T> {
        let descendants = self.strict_descendants(node);
        descendants
            .iter()
            .filter(|d| !descendants.iter().any(|o| self.is_strict_ancestor(o, d)))
            .cloned()
            .collect()
    }

    /// The nodes that have no strict descendant in `nodes`.
    fn most_specific(&self, nodes: &[T]) -> Vec<T> {
        nodes
            .iter()
            .filter(|n| !nodes.iter().any(|o| self.is_strict_ancestor(n, o)))
            .cloned()
            .collect()
    }
}

/// Every node reachable from `start` following `edges`, `start` included.
fn reachable<T: Clone + Eq + Hash + Ord>(start: &T, edges: &FxHashMap<T, Vec<T>>) -> BTreeSet<T> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![start.clone()];
    while let Some(node) = stack.pop() {
        if let Some(next) = edges.get(&node) {
            for n in next {
                if !seen.contains(n) {
                    stack.push(n.clone());
                }
            }
        }
        seen.insert(node);
    }
    seen
}

fn equivalence_edges<T: Clone>(members: &[T], edges: &mut Vec<(T, T)>) {
    if let Some((first, others)) = members.split_first() {
        for other in others {
            edges.push((first.clone(), other.clone()));
            edges.push((other.clone(), first.clone()));
        }
    }
}

fn subject_range<'a, V>(pairs: &'a [(Individual, V)], subject: &Individual) -> &'a [(Individual, V)] {
    let start = pairs.partition_point(|(s, _)| s < subject);
    let end = start + pairs[start..].partition_point(|(s, _)| s == subject);
    &pairs[start..end]
}

fn cmp_literals(a: &Literal, b: &Literal) -> Ordering {
    a.value()
        .cmp(b.value())
        .then_with(|| a.datatype().cmp(&b.datatype()))
        .then_with(|| a.language().cmp(&b.language()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::NamedNode;

    fn iri(value: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/family#{value}"))
    }

    fn individual(value: &str) -> Individual {
        Individual::Named(iri(value))
    }

    fn class(value: &str) -> OwlClass {
        OwlClass::new(iri(value))
    }

    fn family() -> Ontology {
        let mut ontology = Ontology::new(Some(NamedNode::new_unchecked(
            "http://example.com/family",
        )));
        ontology.add_axiom(Axiom::subclass_of(iri("Man"), iri("Person")));
        ontology.add_axiom(Axiom::subclass_of(iri("Father"), iri("Man")));
        ontology.add_axiom(Axiom::EquivalentClasses(vec![class("Person"), class("Human")]));
        ontology.add_axiom(Axiom::class_assertion(iri("Father"), iri("bob")));
        ontology.add_axiom(Axiom::class_assertion(iri("Person"), iri("alice")));
        ontology.add_axiom(Axiom::SubObjectPropertyOf {
            sub_property: iri("hasFather").into(),
            super_property: iri("hasParent").into(),
        });
        ontology.add_axiom(Axiom::InverseObjectProperties(
            iri("hasParent").into(),
            iri("hasChild").into(),
        ));
        ontology.add_axiom(Axiom::object_property_assertion(
            iri("hasFather"),
            iri("alice"),
            iri("bob"),
        ));
        ontology
    }

    #[test]
    fn class_hierarchy_is_transitive() {
        let reasoner = StructuralReasoner::new(Arc::new(family()));
        assert_eq!(
            reasoner.super_classes(&class("Father"), false),
            [class("Human"), class("Man"), class("Person"), owl::THING.into()]
        );
        assert_eq!(reasoner.super_classes(&class("Father"), true), [class("Man")]);
        assert_eq!(reasoner.equivalent_classes(&class("Human")), [class("Person")]);
        assert_eq!(reasoner.sub_classes(&class("Person"), true), [class("Man")]);
    }

    #[test]
    fn instances_follow_the_hierarchy() {
        let reasoner = StructuralReasoner::new(Arc::new(family()));
        assert_eq!(
            reasoner.instances(&class("Person"), false),
            [individual("alice"), individual("bob")]
        );
        assert_eq!(
            reasoner.instances(&class("Person"), true),
            [individual("alice")]
        );
        assert_eq!(reasoner.instances(&owl::THING.into(), false).len(), 2);
        assert_eq!(
            reasoner.types(&individual("bob"), true),
            [class("Father")]
        );
    }

    #[test]
    fn property_values_use_sub_properties_and_inverses() {
        let reasoner = StructuralReasoner::new(Arc::new(family()));
        assert_eq!(
            reasoner.object_property_values(&individual("alice"), &iri("hasParent").into()),
            [individual("bob")]
        );
        assert_eq!(
            reasoner.object_property_values(&individual("bob"), &iri("hasChild").into()),
            [individual("alice")]
        );
        assert!(
            reasoner
                .object_property_values(&individual("bob"), &iri("hasParent").into())
                .is_empty()
        );
    }

    #[test]
    fn same_individuals_share_values() {
        let mut ontology = family();
        ontology.add_axiom(Axiom::SameIndividual(vec![
            individual("bob"),
            individual("robert"),
        ]));
        ontology.add_axiom(Axiom::data_property_assertion(
            iri("age"),
            iri("robert"),
            Literal::from(52),
        ));
        let reasoner = StructuralReasoner::new(Arc::new(ontology));
        assert_eq!(
            reasoner.data_property_values(&individual("bob"), &iri("age").into()),
            [Literal::from(52)]
        );
        assert!(
            reasoner
                .types(&individual("robert"), false)
                .contains(&class("Father"))
        );
        assert!(reasoner.is_consistent());
    }

    #[test]
    fn disjoint_types_are_inconsistent() {
        let mut ontology = family();
        ontology.add_axiom(Axiom::DisjointClasses(vec![class("Man"), class("Woman")]));
        assert!(StructuralReasoner::new(Arc::new(ontology.clone())).is_consistent());
        ontology.add_axiom(Axiom::class_assertion(iri("Woman"), iri("bob")));
        assert!(!StructuralReasoner::new(Arc::new(ontology)).is_consistent());
    }

    #[test]
    fn different_individuals() {
        let mut ontology = family();
        ontology.add_axiom(Axiom::DifferentIndividuals(vec![
            individual("alice"),
            individual("bob"),
        ]));
        let reasoner = StructuralReasoner::new(Arc::new(ontology));
        assert!(reasoner.are_different(&individual("bob"), &individual("alice")));
        assert!(!reasoner.are_different(&individual("bob"), &individual("bob")));
    }

    #[test]
    fn reasoner_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StructuralReasoner>();
    }
}
