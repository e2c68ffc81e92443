use crate::parser::SqwrlSyntaxError;
use oxrdf::{NamedNode, Variable};

/// An error raised while compiling or evaluating a SQWRL query.
#[derive(Debug, thiserror::Error)]
pub enum SqwrlError {
    #[error(transparent)]
    Syntax(#[from] SqwrlSyntaxError),
    /// A name matches no entity of the ontology.
    #[error("'{0}' is not a known entity of the ontology")]
    UnknownName(String),
    /// A short name matches several entities.
    #[error("the name '{name}' is ambiguous, it may denote {}", format_candidates(.candidates))]
    AmbiguousName {
        name: String,
        candidates: Vec<NamedNode>,
    },
    #[error("the built-in {0} is not supported")]
    UnknownBuiltIn(NamedNode),
    /// An atom is not applicable to its arguments (wrong arity, a literal given to a class...).
    #[error("invalid atom {atom}: {message}")]
    InvalidAtom { atom: String, message: String },
    /// A built-in argument is not bound by any other atom of the body.
    #[error("the argument {variable} of swrlb:{built_in} is never bound")]
    UnboundArgument {
        built_in: &'static str,
        variable: Variable,
    },
    /// A built-in has been called with a value it does not handle.
    #[error("invalid argument for swrlb:{built_in}: {message}")]
    InvalidArgument {
        built_in: &'static str,
        message: String,
    },
    /// An arithmetic operation overflowed or divided by zero.
    #[error("overflow or division by zero in {0}")]
    Arithmetic(&'static str),
    #[error("invalid value for sqwrl:{aggregate}: {message}")]
    InvalidAggregate {
        aggregate: &'static str,
        message: String,
    },
    #[error("invalid query head: {0}")]
    InvalidHead(String),
    #[error("there is no query named '{0}'")]
    UnknownQuery(String),
}

fn format_candidates(candidates: &[NamedNode]) -> String {
    candidates
        .iter()
        .map(NamedNode::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}
