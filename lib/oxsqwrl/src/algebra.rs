//! [SQWRL](https://github.com/protegeproject/swrlapi/wiki/SQWRL) query representation, before name resolution.

use oxrdf::{Literal, NamedNode, Variable};
use std::fmt;

/// A parsed SQWRL query: a conjunction of body atoms and the head atoms building the result table.
///
/// ```
/// use oxsqwrl::SqwrlParser;
///
/// let query = SqwrlParser::new().parse_query("Person(?p) ^ hasAge(?p, ?a) -> sqwrl:select(?p, ?a)")?;
/// assert_eq!(query.body.len(), 2);
/// assert_eq!(
///     query.to_string(),
///     "Person(?p) ^ hasAge(?p, ?a) -> <http://sqwrl.stanford.edu/ontologies/built-ins/3.4/sqwrl.owl#select>(?p, ?a)"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Query {
    pub body: Vec<Atom>,
    pub head: Vec<Atom>,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_atoms(f, &self.body)?;
        if !self.body.is_empty() {
            f.write_str(" ")?;
        }
        f.write_str("-> ")?;
        write_atoms(f, &self.head)
    }
}

fn write_atoms(f: &mut fmt::Formatter<'_>, atoms: &[Atom]) -> fmt::Result {
    for (i, atom) in atoms.iter().enumerate() {
        if i > 0 {
            f.write_str(" ^ ")?;
        }
        write!(f, "{atom}")?;
    }
    Ok(())
}

/// A predicate applied to arguments like `hasAge(?p, 42)`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Atom {
    pub predicate: Name,
    pub arguments: Vec<Argument>,
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{argument}")?;
        }
        f.write_str(")")
    }
}

/// The name of an entity.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Name {
    /// A full IRI, either written `<...>` or expanded from a prefixed name.
    Iri(NamedNode),
    /// A name without prefix, resolved against the ontology vocabulary.
    Short(String),
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => iri.fmt(f),
            Self::Short(name) => f.write_str(name),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Argument {
    Variable(Variable),
    Literal(Literal),
    Name(Name),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(v) => v.fmt(f),
            Self::Literal(l) => l.fmt(f),
            Self::Name(n) => n.fmt(f),
        }
    }
}
