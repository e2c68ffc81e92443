use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "oxsqwrl")]
/// Run SQWRL queries over OWL ontologies
pub struct Args {
    /// Format of the log lines written to stderr
    ///
    /// The log level is set with the RUST_LOG environment variable and defaults to "warn".
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute a SQWRL query against an ontology
    Query {
        #[command(flatten)]
        ontology: OntologyArgs,
        /// Name of the query, used in the logs
        #[arg(short, long, default_value = "query")]
        name: String,
        /// The SQWRL query to execute
        ///
        /// If no query or query file are given, stdin is used.
        #[arg(short, long, conflicts_with = "query_file")]
        query: Option<String>,
        /// File in which the query is stored
        ///
        /// If no query or query file are given, stdin is used.
        #[arg(long, conflicts_with = "query", value_hint = ValueHint::FilePath)]
        query_file: Option<PathBuf>,
        /// File in which the query results will be stored
        ///
        /// If no file is given, stdout is used.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        results_file: Option<PathBuf>,
        /// The format of the results
        ///
        /// Can be an extension like "csv" or a MIME type like "application/sparql-results+json".
        ///
        /// By default the format is guessed from the results file extension.
        /// Results written to stdout without format are printed as a tab-separated table.
        #[arg(long)]
        results_format: Option<String>,
        /// Fail if the query is invalid instead of logging the error and returning no result
        #[arg(long)]
        strict: bool,
    },
    /// Print a summary of an ontology
    Inspect {
        #[command(flatten)]
        ontology: OntologyArgs,
    },
}

#[derive(ClapArgs)]
pub struct OntologyArgs {
    /// File in which the ontology is stored
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub ontology: PathBuf,
    /// The format of the ontology file
    ///
    /// Can be an extension like "ttl" or a MIME type like "text/turtle".
    ///
    /// By default the format is guessed from the file extension, RDF/XML is used for unknown extensions.
    #[arg(long)]
    pub format: Option<String>,
    /// Base IRI of the ontology file
    #[arg(long, value_hint = ValueHint::Url)]
    pub base: Option<String>,
    /// Attempt to keep loading even if the ontology file is invalid
    #[arg(long)]
    pub lenient: bool,
}
