use crate::entity::{DataProperty, Individual, ObjectProperty, OwlClass, local_name};
use oxrdf::{Literal, NamedNode};
use std::fmt;

/// A SWRL rule: when all the body atoms hold, the head atoms hold too.
///
/// ```
/// use oxowl::{Rule, RuleArgument, RuleAtom};
/// use oxrdf::NamedNode;
///
/// let ex = |name: &str| NamedNode::new_unchecked(format!("http://example.com/{name}"));
/// let x = RuleArgument::Variable(NamedNode::new_unchecked("urn:swrl:var#x"));
/// let rule = Rule {
///     body: vec![RuleAtom::Class {
///         class: ex("Man").into(),
///         argument: x.clone(),
///     }],
///     head: vec![RuleAtom::Class {
///         class: ex("Person").into(),
///         argument: x,
///     }],
/// };
/// assert_eq!(
///     rule.to_string(),
///     "<http://example.com/Man>(?x) -> <http://example.com/Person>(?x)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub body: Vec<RuleAtom>,
    pub head: Vec<RuleAtom>,
}

impl Rule {
    /// The atoms of the body followed by the atoms of the head.
    pub fn atoms(&self) -> impl Iterator<Item = &RuleAtom> {
        self.body.iter().chain(&self.head)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_conjunction(f, &self.body)?;
        f.write_str(" -> ")?;
        write_conjunction(f, &self.head)
    }
}

fn write_conjunction(f: &mut fmt::Formatter<'_>, atoms: &[RuleAtom]) -> fmt::Result {
    for (i, atom) in atoms.iter().enumerate() {
        if i > 0 {
            f.write_str(" ^ ")?;
        }
        fmt::Display::fmt(atom, f)?;
    }
    Ok(())
}

/// An atom of a [`Rule`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleAtom {
    /// `C(a)`
    Class {
        class: OwlClass,
        argument: RuleArgument,
    },
    /// `P(a, b)` with `P` an object property
    ObjectProperty {
        property: ObjectProperty,
        subject: RuleArgument,
        object: RuleArgument,
    },
    /// `P(a, v)` with `P` a data property
    DataProperty {
        property: DataProperty,
        subject: RuleArgument,
        value: RuleArgument,
    },
    SameIndividual(RuleArgument, RuleArgument),
    DifferentIndividuals(RuleArgument, RuleArgument),
    /// A built-in call like `swrlb:greaterThan(?x, 18)`
    BuiltIn {
        built_in: NamedNode,
        arguments: Vec<RuleArgument>,
    },
}

impl fmt::Display for RuleAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { class, argument } => write!(f, "{class}({argument})"),
            Self::ObjectProperty {
                property,
                subject,
                object,
            } => write!(f, "{property}({subject}, {object})"),
            Self::DataProperty {
                property,
                subject,
                value,
            } => write!(f, "{property}({subject}, {value})"),
            Self::SameIndividual(a, b) => write!(f, "sameAs({a}, {b})"),
            Self::DifferentIndividuals(a, b) => write!(f, "differentFrom({a}, {b})"),
            Self::BuiltIn {
                built_in,
                arguments,
            } => {
                write!(f, "{built_in}(")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    argument.fmt(f)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// An argument of a [`RuleAtom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleArgument {
    /// A variable, identified by the IRI of its `swrl:Variable` node.
    Variable(NamedNode),
    Individual(Individual),
    Literal(Literal),
}

impl fmt::Display for RuleArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(v) => write!(f, "?{}", local_name(v.as_str())),
            Self::Individual(i) => i.fmt(f),
            Self::Literal(l) => l.fmt(f),
        }
    }
}
