use crate::engine::SqwrlQueryEngine;
use crate::results::SqwrlResult;
use crate::rules::saturate;
use oxowl::{
    LoadError, Ontology, OntologyLoader, RdfOntologyLoader, Reasoner, ReasonerFactory,
    StructuralReasoner, StructuralReasonerFactory,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error};

/// Runs SQWRL queries against an ontology file.
///
/// The ontology is loaded and the reasoner is built once, at construction.
/// The SWRL rules of the ontology are applied at that time: the assertions they infer
/// are added to the ontology until no rule infers anything new.
/// Both are immutable afterwards so every query sees the same knowledge base
/// and a runner can be shared between threads.
///
/// ```no_run
/// use oxsqwrl::QueryRunner;
///
/// let runner = QueryRunner::new("family.owl")?;
/// for row in runner.run_query("adults", "Person(?p) ^ hasAge(?p, ?a) ^ swrlb:greaterThan(?a, 17) -> sqwrl:select(?p, ?a)") {
///     println!("{} is {}", row["p"], row["a"]);
/// }
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct QueryRunner<R: Reasoner = StructuralReasoner> {
    ontology: Arc<Ontology>,
    reasoner: R,
}

impl QueryRunner {
    /// Loads the ontology with a default [`RdfOntologyLoader`] and builds a [`StructuralReasoner`] on it.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::with_components(path, &RdfOntologyLoader::new(), &StructuralReasonerFactory)
    }
}

impl<R: Reasoner> QueryRunner<R> {
    pub fn with_components<F: ReasonerFactory<Reasoner = R>>(
        path: impl AsRef<Path>,
        loader: &impl OntologyLoader,
        reasoner_factory: &F,
    ) -> Result<Self, LoadError> {
        let ontology = loader.load(path.as_ref())?;
        debug!("loaded {ontology} from {}", path.as_ref().display());
        Ok(Self::from_ontology(ontology, reasoner_factory))
    }

    /// Applies the rules of the ontology then builds the reasoner on the result.
    pub fn from_ontology<F: ReasonerFactory<Reasoner = R>>(
        ontology: Ontology,
        reasoner_factory: &F,
    ) -> Self {
        let (ontology, reasoner) = saturate(ontology, reasoner_factory);
        Self { ontology, reasoner }
    }

    /// Runs a query and returns one map from column name to value per result row.
    ///
    /// Individuals are written with their IRI and literals with their lexical form.
    /// Queries that fail to parse, resolve or evaluate are logged with [`tracing::error!`]
    /// and return no rows. Use [`query_engine`](Self::query_engine) to get the error instead.
    pub fn run_query(&self, name: &str, query: &str) -> Vec<BTreeMap<String, String>> {
        match self.query_engine().run_query(name, query) {
            Ok(result) => result.to_string_maps(),
            Err(e) => {
                error!(query.name = name, query.text = query, "query failed: {e}");
                Vec::new()
            }
        }
    }

    /// Same as [`run_query`](Self::run_query) but keeps the typed values.
    pub fn run_query_result(&self, name: &str, query: &str) -> SqwrlResult {
        self.query_engine()
            .run_query(name, query)
            .unwrap_or_else(|e| {
                error!(query.name = name, query.text = query, "query failed: {e}");
                SqwrlResult::default()
            })
    }

    /// A new query engine over the ontology and the reasoner of this runner.
    pub fn query_engine(&self) -> SqwrlQueryEngine<'_> {
        SqwrlQueryEngine::new(&self.ontology, &self.reasoner)
    }

    pub fn ontology(&self) -> &Arc<Ontology> {
        &self.ontology
    }

    pub fn reasoner(&self) -> &R {
        &self.reasoner
    }
}
