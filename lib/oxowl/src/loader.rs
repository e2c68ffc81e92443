//! Loading of ontology documents from the file system.

use crate::error::LoadError;
use crate::ontology::Ontology;
use crate::parser::{OntologyParser, ParserConfig};
use oxiri::Iri;
use oxrdf::{Graph, Triple};
use oxrdfio::{RdfFormat, RdfParseError, RdfParser};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Something able to turn a document on disk into an [`Ontology`].
pub trait OntologyLoader {
    fn load(&self, path: &Path) -> Result<Ontology, LoadError>;
}

/// Loads ontologies serialized in one of the RDF formats supported by [`oxrdfio`].
///
/// By default the format is guessed from the file extension.
/// OWL files (`.owl`) and unknown extensions are read as RDF/XML.
///
/// ```no_run
/// use oxowl::{OntologyLoader, RdfOntologyLoader};
/// use std::path::Path;
///
/// let ontology = RdfOntologyLoader::new().load(Path::new("family.owl"))?;
/// println!("{ontology}");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct RdfOntologyLoader {
    format: Option<RdfFormat>,
    base_iri: Option<String>,
    lenient: bool,
}

impl RdfOntologyLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the serialization format instead of guessing it from the file extension.
    #[inline]
    pub fn with_format(mut self, format: RdfFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the format from an extension (`ttl`, `owl`...) or a media type (`text/turtle`...).
    pub fn with_format_name(self, name: &str) -> Result<Self, LoadError> {
        let format = format_from_extension(name)
            .or_else(|| RdfFormat::from_media_type(name))
            .ok_or_else(|| LoadError::UnknownFormat(name.into()))?;
        Ok(self.with_format(format))
    }

    /// Base IRI used to resolve the relative IRIs of the document.
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, LoadError> {
        let base_iri = base_iri.into();
        if let Err(error) = Iri::parse(base_iri.as_str()) {
            return Err(LoadError::InvalidBaseIri {
                iri: base_iri,
                error,
            });
        }
        self.base_iri = Some(base_iri);
        Ok(self)
    }

    /// Skips most of the validation of the document and the constructs that cannot be mapped to OWL.
    #[inline]
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Loads an ontology from a reader, recording the document prefixes.
    pub fn load_from_reader(
        &self,
        reader: impl Read,
        format: RdfFormat,
        path: &Path,
    ) -> Result<Ontology, LoadError> {
        let start = Instant::now();
        let mut parser = RdfParser::from_format(format).without_named_graphs();
        if let Some(base_iri) = &self.base_iri {
            parser = parser
                .with_base_iri(base_iri.as_str())
                .map_err(|error| LoadError::InvalidBaseIri {
                    iri: base_iri.clone(),
                    error,
                })?;
        }
        if self.lenient {
            parser = parser.lenient();
        }
        let mut quads = parser.for_reader(reader);
        let mut graph = Graph::new();
        for quad in &mut quads {
            let quad = match quad {
                Ok(quad) => quad,
                Err(RdfParseError::Syntax(e)) if self.lenient => {
                    warn!("skipping invalid statement in {}: {e}", path.display());
                    continue;
                }
                Err(RdfParseError::Io(source)) => {
                    return Err(LoadError::Io {
                        path: path.into(),
                        source,
                    });
                }
                Err(source) => {
                    return Err(LoadError::Syntax {
                        path: path.into(),
                        source,
                    });
                }
            };
            graph.insert(&Triple::new(quad.subject, quad.predicate, quad.object));
        }
        let config = ParserConfig {
            lenient: self.lenient,
            ..ParserConfig::default()
        };
        let mut ontology = OntologyParser::with_config(&graph, config).parse()?;
        for (prefix_name, prefix_iri) in quads.prefixes() {
            ontology.add_prefix(prefix_name, prefix_iri);
        }
        debug!(
            "loaded {} as {} in {:?}: {} triples, {} axioms",
            path.display(),
            format.name(),
            start.elapsed(),
            graph.len(),
            ontology.axiom_count()
        );
        Ok(ontology)
    }

    fn format_for(&self, path: &Path) -> RdfFormat {
        self.format.unwrap_or_else(|| {
            path.extension()
                .and_then(OsStr::to_str)
                .and_then(format_from_extension)
                .unwrap_or(RdfFormat::RdfXml)
        })
    }
}

impl OntologyLoader for RdfOntologyLoader {
    fn load(&self, path: &Path) -> Result<Ontology, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.into(),
            source,
        })?;
        self.load_from_reader(BufReader::new(file), self.format_for(path), path)
    }
}

fn format_from_extension(extension: &str) -> Option<RdfFormat> {
    match extension.to_ascii_lowercase().as_str() {
        "owl" | "rdf" | "xml" => Some(RdfFormat::RdfXml),
        other => RdfFormat::from_extension(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_map_to_formats() {
        assert_eq!(format_from_extension("OWL"), Some(RdfFormat::RdfXml));
        assert_eq!(format_from_extension("ttl"), Some(RdfFormat::Turtle));
        assert_eq!(format_from_extension("nt"), Some(RdfFormat::NTriples));
        assert_eq!(format_from_extension("docx"), None);
    }

    #[test]
    fn unknown_extensions_default_to_rdf_xml() {
        let loader = RdfOntologyLoader::new();
        assert_eq!(
            loader.format_for(Path::new("ontology.data")),
            RdfFormat::RdfXml
        );
        assert_eq!(
            loader
                .with_format(RdfFormat::Turtle)
                .format_for(Path::new("ontology.owl")),
            RdfFormat::Turtle
        );
    }

    #[test]
    fn unknown_format_name() {
        assert!(matches!(
            RdfOntologyLoader::new().with_format_name("docx"),
            Err(LoadError::UnknownFormat(_))
        ));
    }
}
