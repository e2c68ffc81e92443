use oxowl::{LoadError, RdfOntologyLoader, StructuralReasonerFactory};
use oxsqwrl::{QueryRunner, ResultValue, SqwrlError};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

const FAMILY: &str = "http://example.org/family#";

fn family_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/family.owl")
}

fn runner() -> Result<QueryRunner, LoadError> {
    QueryRunner::new(family_path())
}

fn ex(name: &str) -> String {
    format!("{FAMILY}{name}")
}

fn row<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Runs `f` while capturing the log lines it emits.
fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}

#[test]
fn load_ontology() -> Result<(), LoadError> {
    let runner = runner()?;
    assert_eq!(
        runner.ontology().iri().map(|iri| iri.as_str()),
        Some("http://example.org/family")
    );
    assert!(runner.ontology().classes().count() >= 7);
    Ok(())
}

#[test]
fn load_missing_file() {
    let error = QueryRunner::new("tests/data/does-not-exist.owl")
        .err()
        .unwrap();
    assert!(matches!(error, LoadError::Io { .. }), "{error}");
}

#[test]
fn load_with_explicit_components() -> Result<(), LoadError> {
    let runner = QueryRunner::with_components(
        family_path(),
        &RdfOntologyLoader::new().lenient(),
        &StructuralReasonerFactory,
    )?;
    assert_eq!(runner.run_query("men", "Man(?m) -> sqwrl:select(?m)").len(), 2);
    Ok(())
}

#[test]
fn zero_matches() -> Result<(), LoadError> {
    let runner = runner()?;
    assert!(
        runner
            .run_query(
                "old",
                "Person(?p) ^ hasAge(?p, ?a) ^ swrlb:greaterThan(?a, 100) -> sqwrl:select(?p)"
            )
            .is_empty()
    );
    Ok(())
}

#[test]
fn single_match_is_deterministic() -> Result<(), LoadError> {
    let runner = runner()?;
    let query = "Mother(?m) ^ hasAge(?m, ?a) -> sqwrl:select(?m, ?a)";
    let expected = [row([("m", ex("carol").as_str()), ("a", "55")])];
    assert_eq!(runner.run_query("mothers", query), expected);
    assert_eq!(runner.run_query("mothers", query), expected);
    Ok(())
}

#[test]
fn two_projected_variables() -> Result<(), LoadError> {
    let runner = runner()?;
    let rows = runner.run_query("children", "hasChild(?p, ?c) -> sqwrl:select(?p, ?c)");
    let pairs = rows
        .iter()
        .map(|row| (row["p"].clone(), row["c"].clone()))
        .collect::<BTreeSet<_>>();
    assert_eq!(
        pairs,
        BTreeSet::from([
            (ex("bob"), ex("alice")),
            (ex("bob"), ex("dave")),
            (ex("carol"), ex("alice")),
            (ex("carol"), ex("dave")),
        ])
    );
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row.len() == 2));
    Ok(())
}

#[test]
fn invalid_query_is_logged() -> Result<(), LoadError> {
    let runner = runner()?;
    let (rows, logs) = capture_logs(|| runner.run_query("broken", "Person(?p -> sqwrl:select(?p)"));
    assert!(rows.is_empty());
    assert!(logs.contains("ERROR"), "{logs}");
    assert!(logs.contains("broken"), "{logs}");

    let (rows, logs) = capture_logs(|| runner.run_query("unknown", "Unicorn(?u) -> sqwrl:select(?u)"));
    assert!(rows.is_empty());
    assert!(logs.contains("Unicorn"), "{logs}");
    Ok(())
}

#[test]
fn equivalent_queries_give_equal_sets() -> Result<(), LoadError> {
    let runner = runner()?;
    let as_set = |rows: Vec<BTreeMap<String, String>>| rows.into_iter().collect::<BTreeSet<_>>();
    let persons = as_set(runner.run_query("persons", "Person(?x) -> sqwrl:select(?x)"));
    let humans = as_set(runner.run_query("humans", "Human(?x) -> sqwrl:select(?x)"));
    let labelled = as_set(runner.run_query("labelled", "person(?x) -> sqwrl:select(?x)"));
    assert_eq!(persons.len(), 4);
    assert_eq!(persons, humans);
    assert_eq!(persons, labelled);
    Ok(())
}

#[test]
fn aggregates_ordering_and_names() -> Result<(), LoadError> {
    let runner = runner()?;
    assert_eq!(
        runner.run_query(
            "stats",
            "Person(?p) ^ hasAge(?p, ?a) -> sqwrl:count(?p) ^ sqwrl:avg(?a) ^ sqwrl:max(?a)"
        ),
        [row([("count(?p)", "4"), ("avg(?a)", "42"), ("max(?a)", "58")])]
    );
    assert_eq!(
        runner.run_query(
            "youngest",
            "Person(?p) ^ hasName(?p, ?n) ^ hasAge(?p, ?a) -> sqwrl:select(?n, ?a) ^ sqwrl:orderBy(?a) ^ sqwrl:limit(2) ^ sqwrl:columnNames(\"name\", \"age\")"
        ),
        [
            row([("name", "Dave"), ("age", "25")]),
            row([("name", "Alice"), ("age", "30")])
        ]
    );
    assert_eq!(
        runner.run_query(
            "parents",
            "hasParent(?c, ?p) -> sqwrl:selectDistinct(?p) ^ sqwrl:orderByDescending(?p)"
        ),
        [row([("p", ex("carol").as_str())]), row([("p", ex("bob").as_str())])]
    );
    Ok(())
}

#[test]
fn built_ins() -> Result<(), LoadError> {
    let runner = runner()?;
    assert_eq!(
        runner.run_query(
            "gap",
            "hasFather(?c, ?f) ^ hasName(?c, ?n) ^ hasAge(?c, ?ca) ^ hasAge(?f, ?fa) ^ swrlb:subtract(?gap, ?fa, ?ca) ^ swrlb:stringConcat(?label, ?n, \"!\") -> sqwrl:select(?label, ?gap)"
        ),
        [
            row([("label", "Alice!"), ("gap", "28")]),
            row([("label", "Dave!"), ("gap", "33")])
        ]
    );
    assert_eq!(
        runner.run_query(
            "a-names",
            "Person(?p) ^ hasName(?p, ?n) ^ swrlb:matches(?n, \"^[a-c]\", \"i\") -> sqwrl:select(?n)"
        ),
        [row([("n", "Alice")]), row([("n", "Bob")]), row([("n", "Carol")])]
    );
    assert!(
        runner
            .run_query(
                "siblings",
                "hasMother(?a, ?m) ^ hasMother(?b, ?m) ^ differentFrom(?a, ?b) -> sqwrl:select(?a, ?b)"
            )
            .is_empty()
    );
    Ok(())
}

#[test]
fn typed_results_and_errors() -> Result<(), Box<dyn std::error::Error>> {
    let runner = runner()?;
    let mut engine = runner.query_engine();
    let result = engine.run_query("ages", "Man(?m) ^ hasAge(?m, ?a) -> sqwrl:select(?m, ?a)")?;
    assert_eq!(result.column_names(), ["m", "a"]);
    let first = result.rows().next().ok_or("no row")?;
    assert!(matches!(first.get("m"), Some(ResultValue::Individual(_))));
    assert!(first.get("a").is_some_and(ResultValue::is_literal));

    assert!(matches!(
        engine.run_query("bad", "Person(?p) -> sqwrl:select(?q)"),
        Err(SqwrlError::InvalidHead(_))
    ));
    assert!(matches!(
        engine.run_query("bad", "Person(?p) ^ swrlb:add(?x, ?p, 1) -> sqwrl:select(?x)"),
        Err(SqwrlError::InvalidArgument { built_in: "add", .. })
    ));
    Ok(())
}

#[test]
fn concurrent_queries() -> Result<(), LoadError> {
    let runner = runner()?;
    let expected = runner.run_query("persons", "Person(?x) -> sqwrl:select(?x)");
    thread::scope(|s| {
        let handles = (0..4)
            .map(|i| {
                let runner = &runner;
                s.spawn(move || runner.run_query(&format!("q{i}"), "Person(?x) -> sqwrl:select(?x)"))
            })
            .collect::<Vec<_>>();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
    Ok(())
}

const RULES: &str = "http://example.org/rules#";

fn rules_runner() -> Result<QueryRunner, LoadError> {
    QueryRunner::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/rules.owl"))
}

fn rules_ex(name: &str) -> String {
    format!("{RULES}{name}")
}

fn selected(rows: Vec<BTreeMap<String, String>>, column: &str) -> BTreeSet<String> {
    rows.into_iter()
        .filter_map(|mut row| row.remove(column))
        .collect()
}

#[test]
fn rules_are_not_individuals() -> Result<(), LoadError> {
    let runner = rules_runner()?;
    assert_eq!(runner.ontology().rules().count(), 4);
    assert_eq!(
        selected(runner.run_query("things", "owl:Thing(?x) -> sqwrl:select(?x)"), "x"),
        ["alice", "bob", "carol"].map(rules_ex).into()
    );
    Ok(())
}

#[test]
fn rule_inferences_are_queried() -> Result<(), LoadError> {
    let runner = rules_runner()?;
    assert_eq!(
        selected(runner.run_query("adults", "Adult(?p) -> sqwrl:select(?p)"), "p"),
        ["alice", "bob"].map(rules_ex).into()
    );
    assert_eq!(
        selected(runner.run_query("parents", "Parent(?p) -> sqwrl:select(?p)"), "p"),
        ["alice", "bob"].map(rules_ex).into()
    );
    assert_eq!(
        runner.run_query(
            "grandparents",
            "hasGrandparent(?x, ?z) -> sqwrl:select(?x, ?z)"
        ),
        [row([
            ("x", rules_ex("carol").as_str()),
            ("z", rules_ex("bob").as_str())
        ])]
    );
    assert_eq!(
        runner.run_query("founders", "Founder(?p) -> sqwrl:select(?p)"),
        [row([("p", rules_ex("alice").as_str())])]
    );
    Ok(())
}
