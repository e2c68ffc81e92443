use crate::cli::{Args, Command, LogFormat, OntologyArgs};
use anyhow::{Context, bail};
use clap::Parser;
use oxowl::{RdfOntologyLoader, Reasoner, StructuralReasonerFactory};
use oxrdf::{Term, Variable};
use oxsqwrl::{QueryRunner, SqwrlResult};
use sparesults::{QueryResultsFormat, QueryResultsSerializer};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write, stdin, stdout};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);
    match args.command {
        Command::Query {
            ontology,
            name,
            query,
            query_file,
            results_file,
            results_format,
            strict,
        } => {
            let query = if let Some(query) = query {
                query
            } else if let Some(query_file) = query_file {
                fs::read_to_string(&query_file).with_context(|| {
                    format!("Not able to read query file {}", query_file.display())
                })?
            } else {
                io::read_to_string(stdin().lock())?
            };
            let runner = load(&ontology)?;
            let result = if strict {
                runner
                    .query_engine()
                    .run_query(&name, &query)
                    .with_context(|| format!("The query {name} failed"))?
            } else {
                runner.run_query_result(&name, &query)
            };
            let format = if let Some(format_name) = results_format {
                Some(query_results_format_from_name(&format_name)?)
            } else if let Some(results_file) = &results_file {
                Some(format_from_path(results_file, |ext| {
                    QueryResultsFormat::from_extension(ext)
                        .with_context(|| format!("The file extension '{ext}' is unknown"))
                })?)
            } else {
                None
            };
            if let Some(results_file) = results_file {
                let writer = BufWriter::new(File::create(&results_file).with_context(|| {
                    format!("Not able to create {}", results_file.display())
                })?);
                let writer = if let Some(format) = format {
                    write_results(&result, format, writer)?
                } else {
                    write_table(&result, writer)?
                };
                close_file_writer(writer)?;
            } else if let Some(format) = format {
                write_results(&result, format, stdout().lock())?.flush()?;
            } else {
                write_table(&result, stdout().lock())?.flush()?;
            }
            Ok(())
        }
        Command::Inspect { ontology } => {
            let runner = load(&ontology)?;
            let ontology = runner.ontology();
            let mut out = stdout().lock();
            writeln!(
                out,
                "IRI: {}",
                ontology
                    .iri()
                    .map_or_else(|| "(none)".into(), ToString::to_string)
            )?;
            writeln!(out, "Axioms: {}", ontology.axiom_count())?;
            writeln!(out, "Classes: {}", ontology.classes().count())?;
            writeln!(
                out,
                "Object properties: {}",
                ontology.object_properties().count()
            )?;
            writeln!(out, "Data properties: {}", ontology.data_properties().count())?;
            writeln!(
                out,
                "Annotation properties: {}",
                ontology.annotation_properties().count()
            )?;
            writeln!(out, "Individuals: {}", ontology.individuals().count())?;
            writeln!(out, "Rules: {}", ontology.rules().count())?;
            writeln!(
                out,
                "Consistent: {}",
                if runner.reasoner().is_consistent() {
                    "yes"
                } else {
                    "no"
                }
            )?;
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }
}

fn load(args: &OntologyArgs) -> anyhow::Result<QueryRunner> {
    let mut loader = RdfOntologyLoader::new();
    if let Some(format) = &args.format {
        loader = loader.with_format_name(format)?;
    }
    if let Some(base) = &args.base {
        loader = loader.with_base_iri(base.as_str())?;
    }
    if args.lenient {
        loader = loader.lenient();
    }
    QueryRunner::with_components(&args.ontology, &loader, &StructuralReasonerFactory)
        .with_context(|| format!("Not able to load {}", args.ontology.display()))
}

/// Writes the results as a tab-separated table, with the column names as header.
fn write_table<W: Write>(result: &SqwrlResult, mut writer: W) -> io::Result<W> {
    debug!("writing {} rows as a table", result.len());
    writeln!(writer, "{}", result.column_names().join("\t"))?;
    for row in result {
        let values = row
            .values()
            .iter()
            .map(|v| v.lexical_form())
            .collect::<Vec<_>>();
        writeln!(writer, "{}", values.join("\t"))?;
    }
    Ok(writer)
}

fn write_results<W: Write>(
    result: &SqwrlResult,
    format: QueryResultsFormat,
    writer: W,
) -> anyhow::Result<W> {
    let variables = column_variables(result.column_names())?;
    debug!(
        "writing {} rows with the variables {variables:?} as {}",
        result.len(),
        format.name()
    );
    let mut serializer = QueryResultsSerializer::from_format(format)
        .serialize_solutions_to_writer(writer, variables.clone())?;
    for row in result {
        let terms = row
            .values()
            .iter()
            .map(|v| Term::from(v.clone()))
            .collect::<Vec<_>>();
        serializer.serialize(
            variables
                .iter()
                .zip(&terms)
                .map(|(variable, term)| (variable.as_ref(), term.as_ref())),
        )?;
    }
    Ok(serializer.finish()?)
}

/// Result formats identify columns with variables so names like `count(?x)` are mangled to `count__x_`.
fn column_variable(position: usize, name: &str) -> anyhow::Result<Variable> {
    let name = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    if name.is_empty() {
        return Ok(Variable::new(format!("column{position}"))?);
    }
    Variable::new(name.as_str()).with_context(|| format!("Invalid column name {name}"))
}

/// Mangled names may collide so later duplicates get a `_2`, `_3`... suffix.
fn column_variables(names: &[String]) -> anyhow::Result<Vec<Variable>> {
    let mut used = HashSet::new();
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let variable = column_variable(i, name)?;
            if used.insert(variable.as_str().to_owned()) {
                return Ok(variable);
            }
            let mut suffix = 2;
            loop {
                let candidate = format!("{}_{suffix}", variable.as_str());
                if !used.contains(&candidate) {
                    let variable = Variable::new(candidate.as_str())?;
                    used.insert(candidate);
                    return Ok(variable);
                }
                suffix += 1;
            }
        })
        .collect()
}

fn query_results_format_from_name(name: &str) -> anyhow::Result<QueryResultsFormat> {
    if let Some(format) = QueryResultsFormat::from_extension(name) {
        return Ok(format);
    }
    if let Some(format) = QueryResultsFormat::from_media_type(name) {
        return Ok(format);
    }
    bail!("The results format '{name}' is unknown")
}

fn format_from_path<T>(
    path: &Path,
    from_extension: impl FnOnce(&str) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    if let Some(ext) = path.extension().and_then(OsStr::to_str) {
        from_extension(ext).map_err(|e| {
            e.context(format!(
                "Not able to guess the file format from file name extension '{ext}'"
            ))
        })
    } else {
        bail!(
            "The path {} has no extension to guess a file format from",
            path.display()
        )
    }
}

fn close_file_writer(writer: BufWriter<File>) -> io::Result<()> {
    let mut file = writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?;
    file.flush()?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_become_variables() -> anyhow::Result<()> {
        assert_eq!(column_variable(0, "person")?.as_str(), "person");
        assert_eq!(column_variable(1, "count(?p)")?.as_str(), "count__p_");
        assert_eq!(column_variable(2, "")?.as_str(), "column2");
        Ok(())
    }

    #[test]
    fn duplicate_column_names_get_suffixes() -> anyhow::Result<()> {
        let names = ["p", "p", "count(?p)", "count[?p]", "p_2"].map(String::from);
        assert_eq!(
            column_variables(&names)?
                .iter()
                .map(Variable::as_str)
                .collect::<Vec<_>>(),
            ["p", "p_2", "count__p_", "count__p__2", "p_2_2"]
        );
        Ok(())
    }

    #[test]
    fn results_format_names() -> anyhow::Result<()> {
        assert_eq!(
            query_results_format_from_name("csv")?,
            QueryResultsFormat::Csv
        );
        assert_eq!(
            query_results_format_from_name("application/sparql-results+json")?,
            QueryResultsFormat::Json
        );
        assert!(query_results_format_from_name("foo").is_err());
        Ok(())
    }
}
