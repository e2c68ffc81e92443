use crate::error::SqwrlError;
use crate::eval::evaluate;
use crate::parser::SqwrlParser;
use crate::resolver::{CompiledQuery, compile};
use crate::results::SqwrlResult;
use crate::vocab::DEFAULT_PREFIXES;
use oxowl::{Ontology, Reasoner};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Evaluates SQWRL queries over an ontology and a reasoner built on it.
///
/// Queries are compiled once and kept by name until they are deleted or
/// replaced by a query with the same name.
///
/// ```
/// use oxowl::{Axiom, Ontology, Reasoner, StructuralReasoner};
/// use oxrdf::NamedNode;
/// use oxsqwrl::SqwrlQueryEngine;
/// use std::sync::Arc;
///
/// let ex = |name: &str| NamedNode::new_unchecked(format!("http://example.com/{name}"));
/// let mut ontology = Ontology::new(None);
/// ontology.add_axiom(Axiom::class_assertion(ex("Person"), ex("alice")));
/// let reasoner = StructuralReasoner::new(Arc::new(ontology));
///
/// let mut engine = SqwrlQueryEngine::new(reasoner.ontology(), &reasoner);
/// let result = engine.run_query("q1", "Person(?p) -> sqwrl:select(?p)")?;
/// assert_eq!(result.column_names(), ["p"]);
/// assert_eq!(result.to_string_maps()[0]["p"], "http://example.com/alice");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct SqwrlQueryEngine<'a> {
    ontology: &'a Ontology,
    reasoner: &'a dyn Reasoner,
    parser: SqwrlParser,
    queries: BTreeMap<String, CompiledQuery>,
}

impl<'a> SqwrlQueryEngine<'a> {
    /// Builds an engine whose queries may use the prefixes of the ontology document.
    pub fn new(ontology: &'a Ontology, reasoner: &'a dyn Reasoner) -> Self {
        let mut parser = SqwrlParser::new();
        for (prefix_name, prefix_iri) in ontology.prefixes() {
            if DEFAULT_PREFIXES.iter().any(|(name, _)| name == prefix_name) {
                continue;
            }
            parser = match parser.clone().with_prefix(prefix_name, prefix_iri) {
                Ok(parser) => parser,
                Err(e) => {
                    warn!("ignoring the invalid ontology prefix {prefix_name}: {e}");
                    parser
                }
            };
        }
        Self {
            ontology,
            reasoner,
            parser,
            queries: BTreeMap::new(),
        }
    }

    /// Parses and resolves a query and keeps it under `name`, replacing any previous query with this name.
    pub fn create_query(&mut self, name: &str, query: &str) -> Result<(), SqwrlError> {
        let start = Instant::now();
        let parsed = self.parser.clone().parse_query(query)?;
        let compiled = compile(&parsed, self.ontology)?;
        debug!(
            "compiled query {name} with {} body atoms in {}µs",
            compiled.body.len(),
            start.elapsed().as_micros()
        );
        self.queries.insert(name.into(), compiled);
        Ok(())
    }

    /// Creates the query then runs it.
    pub fn run_query(&mut self, name: &str, query: &str) -> Result<SqwrlResult, SqwrlError> {
        self.create_query(name, query)?;
        self.run_named_query(name)
    }

    /// Runs a query previously created with [`create_query`](Self::create_query).
    pub fn run_named_query(&self, name: &str) -> Result<SqwrlResult, SqwrlError> {
        let query = self
            .queries
            .get(name)
            .ok_or_else(|| SqwrlError::UnknownQuery(name.into()))?;
        let start = Instant::now();
        let result = evaluate(query, self.reasoner)?;
        debug!(
            "query {name} returned {} rows in {}µs",
            result.len(),
            start.elapsed().as_micros()
        );
        Ok(result)
    }

    /// The names of the created queries, sorted.
    pub fn query_names(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    /// Removes a query, returns `false` if there was no query with this name.
    pub fn delete_query(&mut self, name: &str) -> bool {
        self.queries.remove(name).is_some()
    }

    pub fn ontology(&self) -> &'a Ontology {
        self.ontology
    }

    pub fn reasoner(&self) -> &'a dyn Reasoner {
        self.reasoner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxowl::{Axiom, Individual, StructuralReasoner};
    use oxrdf::{Literal, NamedNode};
    use std::sync::Arc;

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/family#{name}"))
    }

    fn reasoner() -> StructuralReasoner {
        let mut ontology = Ontology::new(Some(NamedNode::new_unchecked(
            "http://example.com/family",
        )));
        ontology.add_prefix("fam", "http://example.com/family#");
        ontology.add_axiom(Axiom::subclass_of(ex("Man"), ex("Person")));
        ontology.add_axiom(Axiom::subclass_of(ex("Woman"), ex("Person")));
        ontology.add_axiom(Axiom::class_assertion(ex("Man"), ex("bob")));
        ontology.add_axiom(Axiom::class_assertion(ex("Woman"), ex("alice")));
        ontology.add_axiom(Axiom::class_assertion(ex("Woman"), ex("carol")));
        ontology.add_axiom(Axiom::object_property_assertion(
            ex("hasFather"),
            ex("alice"),
            ex("bob"),
        ));
        for (individual, age) in [("bob", 58), ("alice", 30), ("carol", 55)] {
            ontology.add_axiom(Axiom::data_property_assertion(
                ex("hasAge"),
                ex(individual),
                Literal::from(age),
            ));
        }
        StructuralReasoner::new(Arc::new(ontology))
    }

    fn run(query: &str) -> Result<Vec<Vec<String>>, SqwrlError> {
        let reasoner = reasoner();
        let mut engine = SqwrlQueryEngine::new(reasoner.ontology(), &reasoner);
        Ok(engine
            .run_query("q", query)?
            .rows()
            .map(|row| row.values().iter().map(|v| v.lexical_form()).collect())
            .collect())
    }

    #[test]
    fn join_and_built_ins() -> Result<(), SqwrlError> {
        assert_eq!(
            run("Person(?p) ^ hasAge(?p, ?a) ^ swrlb:greaterThan(?a, 50) -> sqwrl:select(?p, ?a)")?,
            [
                [ex("bob").into_string(), "58".into()],
                [ex("carol").into_string(), "55".into()]
            ]
        );
        assert_eq!(
            run("hasFather(?c, ?f) ^ hasAge(?f, ?fa) ^ hasAge(?c, ?ca) ^ swrlb:subtract(?d, ?fa, ?ca) -> sqwrl:select(?d)")?,
            [["28"]]
        );
        Ok(())
    }

    #[test]
    fn predicate_names_are_filtered_by_kind() -> Result<(), SqwrlError> {
        let lawyer = NamedNode::new_unchecked("http://example.com/jobs#Lawyer");
        let mut ontology = Ontology::new(None);
        ontology.add_prefix("", "http://example.com/family#");
        ontology.add_axiom(Axiom::DeclareNamedIndividual(ex("Lawyer").into()));
        ontology.add_axiom(Axiom::class_assertion(lawyer, ex("dave")));
        let reasoner = StructuralReasoner::new(Arc::new(ontology));
        let mut engine = SqwrlQueryEngine::new(reasoner.ontology(), &reasoner);
        let result = engine.run_query("lawyers", "Lawyer(?x) -> sqwrl:select(?x)")?;
        assert_eq!(
            result.rows().next().map(|row| row.values()[0].lexical_form()),
            Some(ex("dave").into_string())
        );
        assert!(matches!(
            engine.run_query("ages", "Lawyer(?x, ?a) -> sqwrl:select(?x)"),
            Err(SqwrlError::InvalidAtom { .. })
        ));
        Ok(())
    }

    #[test]
    fn built_in_waits_for_its_inputs() -> Result<(), SqwrlError> {
        assert_eq!(
            run("swrlb:lessThan(?a, 40) ^ hasAge(?p, ?a) -> sqwrl:select(?p)")?,
            [[ex("alice").into_string()]]
        );
        assert!(matches!(
            run("hasAge(?p, ?a) ^ swrlb:lessThan(?a, ?b) -> sqwrl:select(?p)"),
            Err(SqwrlError::UnboundArgument { built_in: "lessThan", .. })
        ));
        Ok(())
    }

    #[test]
    fn aggregates_and_ordering() -> Result<(), SqwrlError> {
        assert_eq!(
            run("Woman(?w) ^ hasAge(?w, ?a) -> sqwrl:count(?w) ^ sqwrl:avg(?a)")?,
            [["2", "42.5"]]
        );
        assert!(matches!(
            run("Person(?p) ^ hasAge(?p, ?a) -> sqwrl:select(?p) ^ sqwrl:orderByDescending(?a)"),
            Err(SqwrlError::InvalidHead(_))
        ));
        assert_eq!(
            run("Person(?p) ^ hasAge(?p, ?a) -> sqwrl:select(?a) ^ sqwrl:orderByDescending(?a) ^ sqwrl:limit(2)")?,
            [["58"], ["55"]]
        );
        Ok(())
    }

    #[test]
    fn queries_are_kept_by_name() -> Result<(), SqwrlError> {
        let reasoner = reasoner();
        let mut engine = SqwrlQueryEngine::new(reasoner.ontology(), &reasoner);
        engine.create_query("men", "fam:Man(?m) -> sqwrl:select(?m)")?;
        engine.create_query("women", "Woman(?w) -> sqwrl:select(?w)")?;
        assert_eq!(engine.query_names().collect::<Vec<_>>(), ["men", "women"]);
        assert_eq!(engine.run_named_query("women")?.len(), 2);
        engine.run_query("women", "Woman(?w) ^ hasAge(?w, 30) -> sqwrl:select(?w)")?;
        assert_eq!(
            engine.run_named_query("women")?.rows().next().and_then(|row| row.get("w").cloned()),
            Some(Individual::Named(ex("alice")).into())
        );
        assert!(engine.delete_query("men"));
        assert!(matches!(
            engine.run_named_query("men"),
            Err(SqwrlError::UnknownQuery(_))
        ));
        Ok(())
    }
}
