//! Forward chaining of the SWRL rules stored in an ontology.

use crate::error::SqwrlError;
use crate::eval::{Solution, solutions, value};
use crate::resolver::{BodyAtom, CompiledRule, Term, compile_rule};
use crate::results::ResultValue;
use oxowl::{Axiom, Ontology, Reasoner, ReasonerFactory};
use std::sync::Arc;
use tracing::{debug, warn};

/// Built-ins may create a new literal at each round so a fixpoint is not always reached.
const MAX_ROUNDS: usize = 64;

/// Adds to the ontology the assertions inferred by its rules then builds the reasoner on the result.
///
/// Rules are evaluated with the reasoner of the previous round until they infer nothing new.
/// Rules that cannot be compiled or evaluated are logged and ignored.
pub(crate) fn saturate<F: ReasonerFactory>(
    mut ontology: Ontology,
    reasoner_factory: &F,
) -> (Arc<Ontology>, F::Reasoner) {
    let mut rules = ontology
        .rules()
        .filter_map(|rule| match compile_rule(rule) {
            Ok(compiled) => Some((rule.to_string(), compiled)),
            Err(e) => {
                warn!("ignoring the rule {rule}: {e}");
                None
            }
        })
        .collect::<Vec<_>>();
    let mut inferred = 0;
    let mut round = 0;
    loop {
        let shared = Arc::new(ontology);
        let reasoner = reasoner_factory.create_reasoner(Arc::clone(&shared));
        if rules.is_empty() {
            return (shared, reasoner);
        }
        round += 1;
        let mut new_axioms = Vec::new();
        rules.retain(|(text, rule)| match fire(rule, &reasoner, &shared) {
            Ok(axioms) => {
                new_axioms.extend(axioms);
                true
            }
            Err(e) => {
                warn!("ignoring the rule {text}: {e}");
                false
            }
        });
        if new_axioms.is_empty() || round == MAX_ROUNDS {
            if !new_axioms.is_empty() {
                warn!("rule inference stopped after {MAX_ROUNDS} rounds without reaching a fixpoint");
            }
            debug!("{inferred} axioms inferred by {} rules in {round} rounds", rules.len());
            return (shared, reasoner);
        }
        drop(reasoner);
        ontology = Arc::try_unwrap(shared).unwrap_or_else(|shared| Ontology::clone(&shared));
        for axiom in new_axioms {
            if ontology.add_axiom(axiom) {
                inferred += 1;
            }
        }
    }
}

/// The assertions of the rule head for every solution of its body that are not in the ontology yet.
fn fire(
    rule: &CompiledRule,
    reasoner: &dyn Reasoner,
    ontology: &Ontology,
) -> Result<Vec<Axiom>, SqwrlError> {
    let mut axioms = Vec::new();
    for solution in solutions(rule.variables.len(), &rule.body, reasoner)? {
        for atom in &rule.head {
            if let Some(axiom) = instantiate(atom, &solution) {
                if !ontology.contains_axiom(&axiom) {
                    axioms.push(axiom);
                }
            }
        }
    }
    Ok(axioms)
}

fn instantiate(atom: &BodyAtom, solution: &Solution) -> Option<Axiom> {
    let individual = |term: &Term| match value(term, solution)? {
        ResultValue::Individual(individual) => Some(individual.clone()),
        _ => None,
    };
    Some(match atom {
        BodyAtom::Class { class, argument } => {
            Axiom::class_assertion(class.clone(), individual(argument)?)
        }
        BodyAtom::ObjectProperty {
            property,
            subject,
            object,
        } => Axiom::object_property_assertion(
            property.clone(),
            individual(subject)?,
            individual(object)?,
        ),
        BodyAtom::DataProperty {
            property,
            subject,
            value: target,
        } => Axiom::data_property_assertion(
            property.clone(),
            individual(subject)?,
            value(target, solution)?.as_literal()?.clone(),
        ),
        BodyAtom::SameAs(a, b) => Axiom::SameIndividual(vec![individual(a)?, individual(b)?]),
        BodyAtom::DifferentFrom(a, b) => {
            Axiom::DifferentIndividuals(vec![individual(a)?, individual(b)?])
        }
        BodyAtom::BuiltIn { .. } => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxowl::{Individual, Rule, RuleArgument, RuleAtom, StructuralReasonerFactory};
    use oxrdf::{Literal, NamedNode};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/family#{name}"))
    }

    fn var(name: &str) -> RuleArgument {
        RuleArgument::Variable(NamedNode::new_unchecked(format!("urn:swrl:var#{name}")))
    }

    fn class_atom(class: &str, argument: RuleArgument) -> RuleAtom {
        RuleAtom::Class {
            class: ex(class).into(),
            argument,
        }
    }

    fn family() -> Ontology {
        let mut ontology = Ontology::new(None);
        for (person, age) in [("alice", 30), ("bob", 58), ("carol", 12)] {
            ontology.add_axiom(Axiom::class_assertion(ex("Person"), ex(person)));
            ontology.add_axiom(Axiom::data_property_assertion(
                ex("hasAge"),
                ex(person),
                Literal::from(age),
            ));
        }
        ontology.add_axiom(Axiom::object_property_assertion(
            ex("hasParent"),
            ex("carol"),
            ex("alice"),
        ));
        ontology.add_axiom(Axiom::object_property_assertion(
            ex("hasParent"),
            ex("alice"),
            ex("bob"),
        ));
        ontology
    }

    fn adult_rule() -> Rule {
        Rule {
            body: vec![
                class_atom("Person", var("p")),
                RuleAtom::DataProperty {
                    property: ex("hasAge").into(),
                    subject: var("p"),
                    value: var("a"),
                },
                RuleAtom::BuiltIn {
                    built_in: NamedNode::new_unchecked(
                        "http://www.w3.org/2003/11/swrlb#greaterThanOrEqual",
                    ),
                    arguments: vec![var("a"), RuleArgument::Literal(Literal::from(18))],
                },
            ],
            head: vec![class_atom("Adult", var("p"))],
        }
    }

    fn instances(reasoner: &impl Reasoner, class: &str) -> Vec<Individual> {
        let mut instances = reasoner.instances(&ex(class).into(), false);
        instances.sort_by_key(Individual::identifier);
        instances
    }

    fn individuals(names: &[&str]) -> Vec<Individual> {
        names.iter().map(|name| ex(name).into()).collect()
    }

    #[test]
    fn rules_are_chained_until_fixpoint() {
        let mut ontology = family();
        // Declared before the rule it depends on so that two rounds are needed
        ontology.add_axiom(Axiom::Rule(Rule {
            body: vec![
                class_atom("Adult", var("p")),
                RuleAtom::ObjectProperty {
                    property: ex("hasParent").into(),
                    subject: var("c"),
                    object: var("p"),
                },
            ],
            head: vec![class_atom("Parent", var("p"))],
        }));
        ontology.add_axiom(Axiom::Rule(adult_rule()));
        let (ontology, reasoner) = saturate(ontology, &StructuralReasonerFactory);
        assert_eq!(
            instances(&reasoner, "Adult"),
            individuals(&["alice", "bob"])
        );
        assert_eq!(
            instances(&reasoner, "Parent"),
            individuals(&["alice", "bob"])
        );
        assert!(ontology.contains_axiom(&Axiom::class_assertion(ex("Parent"), ex("bob"))));
    }

    #[test]
    fn property_assertions_are_inferred() {
        let mut ontology = family();
        ontology.add_axiom(Axiom::Rule(Rule {
            body: vec![
                RuleAtom::ObjectProperty {
                    property: ex("hasParent").into(),
                    subject: var("x"),
                    object: var("y"),
                },
                RuleAtom::ObjectProperty {
                    property: ex("hasParent").into(),
                    subject: var("y"),
                    object: var("z"),
                },
            ],
            head: vec![RuleAtom::ObjectProperty {
                property: ex("hasGrandparent").into(),
                subject: var("x"),
                object: var("z"),
            }],
        }));
        let (_, reasoner) = saturate(ontology, &StructuralReasonerFactory);
        assert_eq!(
            reasoner.object_property_pairs(&ex("hasGrandparent").into()),
            [(Individual::from(ex("carol")), Individual::from(ex("bob")))]
        );
    }

    #[test]
    fn invalid_rules_are_ignored() {
        let mut ontology = family();
        ontology.add_axiom(Axiom::Rule(Rule {
            body: vec![class_atom("Person", var("p"))],
            head: vec![class_atom("Sibling", var("q"))],
        }));
        ontology.add_axiom(Axiom::Rule(adult_rule()));
        let (ontology, reasoner) = saturate(ontology, &StructuralReasonerFactory);
        assert!(instances(&reasoner, "Sibling").is_empty());
        assert_eq!(instances(&reasoner, "Adult").len(), 2);
        assert_eq!(ontology.rules().count(), 2);
    }

    #[test]
    fn rule_heads_are_checked() {
        let unbound = Rule {
            body: vec![class_atom("Person", var("p"))],
            head: vec![class_atom("Adult", var("q"))],
        };
        assert!(matches!(
            compile_rule(&unbound),
            Err(SqwrlError::InvalidAtom { .. })
        ));
        let built_in_head = Rule {
            body: vec![class_atom("Person", var("p"))],
            head: vec![RuleAtom::BuiltIn {
                built_in: NamedNode::new_unchecked("http://www.w3.org/2003/11/swrlb#equal"),
                arguments: vec![var("p"), var("p")],
            }],
        };
        assert!(matches!(
            compile_rule(&built_in_head),
            Err(SqwrlError::InvalidAtom { .. })
        ));
        let unknown = Rule {
            body: vec![RuleAtom::BuiltIn {
                built_in: NamedNode::new_unchecked("http://www.w3.org/2003/11/swrlb#frobnicate"),
                arguments: vec![var("p")],
            }],
            head: Vec::new(),
        };
        assert!(matches!(
            compile_rule(&unknown),
            Err(SqwrlError::UnknownBuiltIn(_))
        ));
    }

    #[test]
    fn inference_stops_without_fixpoint() {
        let mut ontology = family();
        ontology.add_axiom(Axiom::Rule(Rule {
            body: vec![
                RuleAtom::DataProperty {
                    property: ex("hasAge").into(),
                    subject: var("p"),
                    value: var("a"),
                },
                RuleAtom::BuiltIn {
                    built_in: NamedNode::new_unchecked("http://www.w3.org/2003/11/swrlb#add"),
                    arguments: vec![var("b"), var("a"), RuleArgument::Literal(Literal::from(1))],
                },
            ],
            head: vec![RuleAtom::DataProperty {
                property: ex("hasAge").into(),
                subject: var("p"),
                value: var("b"),
            }],
        }));
        let (_, reasoner) = saturate(ontology, &StructuralReasonerFactory);
        assert_eq!(
            reasoner
                .data_property_values(&ex("carol").into(), &ex("hasAge").into())
                .len(),
            MAX_ROUNDS
        );
    }
}
