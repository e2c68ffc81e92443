//! Resolution of the names of a parsed query against an ontology and planning of its evaluation.

use crate::algebra::{Argument, Atom, Name, Query};
use crate::builtins::BuiltIn;
use crate::error::SqwrlError;
use crate::results::ResultValue;
use crate::vocab::{sqwrl, swrlb};
use oxowl::vocab::owl;
use oxowl::{
    DataProperty, EntityKind, Individual, ObjectProperty, Ontology, OwlClass, Rule, RuleArgument,
    RuleAtom, local_name,
};
use oxrdf::vocab::xsd;
use oxrdf::{NamedNode, Variable};

/// A query ready to be evaluated: names resolved, body atoms ordered so that
/// built-ins only run once their inputs are bound.
#[derive(Debug, Clone)]
pub(crate) struct CompiledQuery {
    pub variables: Vec<Variable>,
    pub body: Vec<BodyAtom>,
    pub columns: Vec<Column>,
    pub column_names: Vec<String>,
    pub distinct: bool,
    /// `(column index, descending)` keys.
    pub order_by: Vec<(usize, bool)>,
    pub limit: Option<usize>,
}

/// A SWRL rule with its body ordered like a query body.
///
/// Head atoms are never built-ins and only use variables bound by the body.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub variables: Vec<Variable>,
    pub body: Vec<BodyAtom>,
    pub head: Vec<BodyAtom>,
}

/// A variable, identified by its position in [`CompiledQuery::variables`], or a constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Term {
    Variable(usize),
    Constant(ResultValue),
}

#[derive(Debug, Clone)]
pub(crate) enum BodyAtom {
    Class {
        class: OwlClass,
        argument: Term,
    },
    ObjectProperty {
        property: ObjectProperty,
        subject: Term,
        object: Term,
    },
    DataProperty {
        property: DataProperty,
        subject: Term,
        value: Term,
    },
    SameAs(Term, Term),
    DifferentFrom(Term, Term),
    BuiltIn {
        built_in: BuiltIn,
        arguments: Vec<Term>,
    },
}

impl BodyAtom {
    fn terms(&self) -> Vec<&Term> {
        match self {
            Self::Class { argument, .. } => vec![argument],
            Self::ObjectProperty {
                subject, object, ..
            } => vec![subject, object],
            Self::DataProperty { subject, value, .. } => vec![subject, value],
            Self::SameAs(a, b) | Self::DifferentFrom(a, b) => vec![a, b],
            Self::BuiltIn { arguments, .. } => arguments.iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Column {
    Value(Term),
    Aggregate {
        function: Aggregate,
        variable: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Aggregate {
    Count,
    CountDistinct,
    Min,
    Max,
    Sum,
    Avg,
}

impl Aggregate {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "count" => Self::Count,
            "countDistinct" => Self::CountDistinct,
            "min" => Self::Min,
            "max" => Self::Max,
            "sum" => Self::Sum,
            "avg" => Self::Avg,
            _ => return None,
        })
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::CountDistinct => "countDistinct",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::Avg => "avg",
        }
    }
}

enum Predicate {
    Class(OwlClass),
    ObjectProperty(ObjectProperty),
    DataProperty(DataProperty),
    SameAs,
    DifferentFrom,
    BuiltIn(BuiltIn),
}

pub(crate) fn compile(query: &Query, ontology: &Ontology) -> Result<CompiledQuery, SqwrlError> {
    let mut compiler = Compiler {
        ontology,
        variables: Vec::new(),
    };
    let atoms = query
        .body
        .iter()
        .map(|atom| compiler.body_atom(atom))
        .collect::<Result<Vec<_>, _>>()?;
    let (body, bound) = order_body(atoms, &compiler.variables)?;
    let mut head = Head {
        columns: Vec::new(),
        column_names: Vec::new(),
        distinct: false,
        order_by: Vec::new(),
        limit: None,
    };
    let operators = query
        .head
        .iter()
        .map(|atom| Ok((head_operator(atom)?, atom)))
        .collect::<Result<Vec<_>, SqwrlError>>()?;
    for (operator, atom) in &operators {
        compiler.head_projection(&mut head, operator, atom, &bound)?;
    }
    if head.columns.is_empty() {
        return Err(SqwrlError::InvalidHead(
            "the head must select at least one value".into(),
        ));
    }
    for (operator, atom) in &operators {
        compiler.head_modifier(&mut head, operator, atom)?;
    }
    Ok(CompiledQuery {
        variables: compiler.variables,
        body,
        columns: head.columns,
        column_names: head.column_names,
        distinct: head.distinct,
        order_by: head.order_by,
        limit: head.limit,
    })
}

/// Compiles a rule read from an ontology. Its entities are already resolved.
pub(crate) fn compile_rule(rule: &Rule) -> Result<CompiledRule, SqwrlError> {
    let mut variable_iris = Vec::<NamedNode>::new();
    let mut term = |argument: &RuleArgument| match argument {
        RuleArgument::Variable(iri) => Term::Variable(
            if let Some(position) = variable_iris.iter().position(|v| v == iri) {
                position
            } else {
                variable_iris.push(iri.clone());
                variable_iris.len() - 1
            },
        ),
        RuleArgument::Individual(individual) => Term::Constant(individual.clone().into()),
        RuleArgument::Literal(literal) => Term::Constant(literal.clone().into()),
    };
    let body = rule
        .body
        .iter()
        .map(|atom| rule_atom(atom, &mut term))
        .collect::<Result<Vec<_>, _>>()?;
    let head = rule
        .head
        .iter()
        .map(|atom| match rule_atom(atom, &mut term)? {
            BodyAtom::BuiltIn { .. } => Err(SqwrlError::InvalidAtom {
                atom: atom.to_string(),
                message: "built-ins are not allowed in rule heads".into(),
            }),
            compiled => Ok(compiled),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let variables = variable_iris
        .iter()
        .enumerate()
        .map(|(i, iri)| {
            Variable::new(local_name(iri.as_str()))
                .unwrap_or_else(|_| Variable::new_unchecked(format!("v{i}")))
        })
        .collect::<Vec<_>>();
    let (body, bound) = order_body(body, &variables)?;
    for (atom, compiled) in rule.head.iter().zip(&head) {
        for term in compiled.terms() {
            if let Term::Variable(v) = term {
                if !bound[*v] {
                    return Err(SqwrlError::InvalidAtom {
                        atom: atom.to_string(),
                        message: format!("{} is not bound in the rule body", variables[*v]),
                    });
                }
            }
        }
    }
    Ok(CompiledRule {
        variables,
        body,
        head,
    })
}

fn rule_atom(
    atom: &RuleAtom,
    term: &mut impl FnMut(&RuleArgument) -> Term,
) -> Result<BodyAtom, SqwrlError> {
    Ok(match atom {
        RuleAtom::Class { class, argument } => BodyAtom::Class {
            class: class.clone(),
            argument: term(argument),
        },
        RuleAtom::ObjectProperty {
            property,
            subject,
            object,
        } => BodyAtom::ObjectProperty {
            property: property.clone(),
            subject: term(subject),
            object: term(object),
        },
        RuleAtom::DataProperty {
            property,
            subject,
            value,
        } => BodyAtom::DataProperty {
            property: property.clone(),
            subject: term(subject),
            value: term(value),
        },
        RuleAtom::SameIndividual(a, b) => BodyAtom::SameAs(term(a), term(b)),
        RuleAtom::DifferentIndividuals(a, b) => BodyAtom::DifferentFrom(term(a), term(b)),
        RuleAtom::BuiltIn {
            built_in,
            arguments,
        } => {
            let Some(resolved) = built_in
                .as_str()
                .strip_prefix(swrlb::NAMESPACE)
                .and_then(BuiltIn::from_name)
            else {
                return Err(SqwrlError::UnknownBuiltIn(built_in.clone()));
            };
            let (min, max) = resolved.arity();
            if arguments.len() < min || max.is_some_and(|max| arguments.len() > max) {
                return Err(SqwrlError::InvalidAtom {
                    atom: atom.to_string(),
                    message: "wrong number of arguments".into(),
                });
            }
            BodyAtom::BuiltIn {
                built_in: resolved,
                arguments: arguments.iter().map(&mut *term).collect(),
            }
        }
    })
}

/// Orders the body atoms for evaluation and returns which variables they bind.
fn order_body(
    mut atoms: Vec<BodyAtom>,
    variables: &[Variable],
) -> Result<(Vec<BodyAtom>, Vec<bool>), SqwrlError> {
    let mut bound = vec![false; variables.len()];
    let mut body = Vec::with_capacity(atoms.len());
    while !atoms.is_empty() {
        let next = schedule(&atoms, &bound, variables)?;
        let atom = atoms.remove(next);
        for term in atom.terms() {
            if let Term::Variable(v) = term {
                bound[*v] = true;
            }
        }
        body.push(atom);
    }
    Ok((body, bound))
}

/// Picks the next atom to evaluate given the variables already bound.
///
/// Atoms keep their query order unless a built-in misses one of its inputs.
/// `sameAs` and `differentFrom` without any bound argument enumerate every individual
/// so they are delayed as well.
fn schedule(
    atoms: &[BodyAtom],
    bound: &[bool],
    variables: &[Variable],
) -> Result<usize, SqwrlError> {
    let is_bound = |term: &Term| match term {
        Term::Variable(v) => bound[*v],
        Term::Constant(_) => true,
    };
    let mut fallback = None;
    let mut unbound = None;
    for (i, atom) in atoms.iter().enumerate() {
        match atom {
            BodyAtom::BuiltIn {
                built_in,
                arguments,
            } => {
                let skip = usize::from(built_in.binds_first_argument());
                match arguments.iter().skip(skip).find(|t| !is_bound(*t)) {
                    None => return Ok(i),
                    Some(Term::Variable(v)) => {
                        unbound.get_or_insert_with(|| SqwrlError::UnboundArgument {
                            built_in: built_in.name(),
                            variable: variables[*v].clone(),
                        });
                    }
                    Some(Term::Constant(_)) => (),
                }
            }
            BodyAtom::SameAs(a, b) | BodyAtom::DifferentFrom(a, b) => {
                if is_bound(a) || is_bound(b) {
                    return Ok(i);
                }
                fallback.get_or_insert(i);
            }
            _ => return Ok(i),
        }
    }
    match (fallback, unbound) {
        (Some(fallback), _) => Ok(fallback),
        (None, Some(error)) => Err(error),
        (None, None) => Ok(0),
    }
}

struct Head {
    columns: Vec<Column>,
    column_names: Vec<String>,
    distinct: bool,
    order_by: Vec<(usize, bool)>,
    limit: Option<usize>,
}

struct Compiler<'a> {
    ontology: &'a Ontology,
    variables: Vec<Variable>,
}

impl Compiler<'_> {
    fn variable(&mut self, variable: &Variable) -> usize {
        if let Some(position) = self.variables.iter().position(|v| v == variable) {
            position
        } else {
            self.variables.push(variable.clone());
            self.variables.len() - 1
        }
    }

    fn body_atom(&mut self, atom: &Atom) -> Result<BodyAtom, SqwrlError> {
        let predicate = self.predicate(atom)?;
        let expected = match &predicate {
            Predicate::Class(_) => Some(1),
            Predicate::BuiltIn(_) => None,
            _ => Some(2),
        };
        if let Some(expected) = expected {
            if atom.arguments.len() != expected {
                return Err(invalid_atom(
                    atom,
                    format!("{expected} argument(s) expected"),
                ));
            }
        }
        Ok(match predicate {
            Predicate::Class(class) => BodyAtom::Class {
                argument: self.individual(atom, &atom.arguments[0])?,
                class,
            },
            Predicate::ObjectProperty(property) => BodyAtom::ObjectProperty {
                subject: self.individual(atom, &atom.arguments[0])?,
                object: self.individual(atom, &atom.arguments[1])?,
                property,
            },
            Predicate::DataProperty(property) => BodyAtom::DataProperty {
                subject: self.individual(atom, &atom.arguments[0])?,
                value: self.value(atom, &atom.arguments[1])?,
                property,
            },
            Predicate::SameAs => BodyAtom::SameAs(
                self.individual(atom, &atom.arguments[0])?,
                self.individual(atom, &atom.arguments[1])?,
            ),
            Predicate::DifferentFrom => BodyAtom::DifferentFrom(
                self.individual(atom, &atom.arguments[0])?,
                self.individual(atom, &atom.arguments[1])?,
            ),
            Predicate::BuiltIn(built_in) => {
                let (min, max) = built_in.arity();
                let count = atom.arguments.len();
                if count < min || max.is_some_and(|max| count > max) {
                    return Err(invalid_atom(
                        atom,
                        match max {
                            Some(max) if max == min => format!("{min} argument(s) expected"),
                            Some(max) => format!("between {min} and {max} arguments expected"),
                            None => format!("at least {min} arguments expected"),
                        },
                    ));
                }
                BodyAtom::BuiltIn {
                    arguments: atom
                        .arguments
                        .iter()
                        .map(|argument| self.value(atom, argument))
                        .collect::<Result<_, _>>()?,
                    built_in,
                }
            }
        })
    }

    fn predicate(&self, atom: &Atom) -> Result<Predicate, SqwrlError> {
        let iri = match &atom.predicate {
            Name::Short(name) if name == "sameAs" => return Ok(Predicate::SameAs),
            Name::Short(name) if name == "differentFrom" => return Ok(Predicate::DifferentFrom),
            Name::Short(name) => self.resolve_predicate_name(name, atom)?,
            Name::Iri(iri) => iri.clone(),
        };
        if let Some(name) = iri.as_str().strip_prefix(swrlb::NAMESPACE) {
            return BuiltIn::from_name(name)
                .map(Predicate::BuiltIn)
                .ok_or(SqwrlError::UnknownBuiltIn(iri));
        }
        if iri.as_str().starts_with(sqwrl::NAMESPACE) {
            return Err(invalid_atom(
                atom,
                "SQWRL operators are only allowed in the query head",
            ));
        }
        if iri == owl::SAME_AS {
            return Ok(Predicate::SameAs);
        }
        if iri == owl::DIFFERENT_FROM {
            return Ok(Predicate::DifferentFrom);
        }
        if iri == owl::THING || iri == owl::NOTHING {
            return Ok(Predicate::Class(iri.into()));
        }
        let kinds = self.ontology.entity_kinds(&iri);
        if kinds.is_empty() {
            return Err(SqwrlError::UnknownName(iri.into_string()));
        }
        match atom.arguments.as_slice() {
            [_] if kinds.contains(&EntityKind::Class) => Ok(Predicate::Class(iri.into())),
            [_, value] if kinds.contains(&EntityKind::DataProperty) => {
                if kinds.contains(&EntityKind::ObjectProperty)
                    && !matches!(value, Argument::Literal(_))
                {
                    Ok(Predicate::ObjectProperty(iri.into()))
                } else {
                    Ok(Predicate::DataProperty(iri.into()))
                }
            }
            [_, _] if kinds.contains(&EntityKind::ObjectProperty) => {
                Ok(Predicate::ObjectProperty(iri.into()))
            }
            _ => Err(invalid_atom(
                atom,
                format!(
                    "{iri} can not be applied to {} argument(s)",
                    atom.arguments.len()
                ),
            )),
        }
    }

    /// Resolves a short predicate name, keeping only the candidates usable with the atom arity.
    fn resolve_predicate_name(&self, name: &str, atom: &Atom) -> Result<NamedNode, SqwrlError> {
        let applicable = |kind: &EntityKind| match atom.arguments.len() {
            1 => *kind == EntityKind::Class,
            2 => matches!(
                kind,
                EntityKind::ObjectProperty | EntityKind::DataProperty
            ),
            _ => false,
        };
        let mut candidates = self
            .ontology
            .resolve_short_name_with(name, |kinds| kinds.iter().any(applicable));
        if candidates.is_empty() {
            // Resolved anyway so that the arity error names the entity
            candidates = self.ontology.resolve_short_name(name);
        }
        match candidates.len() {
            0 => Err(SqwrlError::UnknownName(name.into())),
            1 => Ok(candidates.remove(0)),
            _ => Err(SqwrlError::AmbiguousName {
                name: name.into(),
                candidates,
            }),
        }
    }

    /// Resolves an argument that must denote an individual.
    fn individual(&mut self, atom: &Atom, argument: &Argument) -> Result<Term, SqwrlError> {
        let term = self.value(atom, argument)?;
        match &term {
            Term::Constant(ResultValue::Literal(literal)) => Err(invalid_atom(
                atom,
                format!("the literal {literal} is not an individual"),
            )),
            Term::Constant(ResultValue::Entity(entity)) => Err(invalid_atom(
                atom,
                format!("{entity} is not an individual"),
            )),
            _ => Ok(term),
        }
    }

    fn value(&mut self, atom: &Atom, argument: &Argument) -> Result<Term, SqwrlError> {
        Ok(match argument {
            Argument::Variable(variable) => Term::Variable(self.variable(variable)),
            Argument::Literal(literal) => Term::Constant(literal.clone().into()),
            Argument::Name(name) => Term::Constant(self.constant(name)?),
        })
    }

    /// Resolves a name used as an argument.
    ///
    /// Full IRIs unknown to the ontology are assumed to be individuals without any fact.
    fn constant(&self, name: &Name) -> Result<ResultValue, SqwrlError> {
        let iri = match name {
            Name::Iri(iri) => iri.clone(),
            Name::Short(name) => {
                let mut candidates = self
                    .ontology
                    .resolve_short_name_with(name, |kinds| kinds.contains(&EntityKind::Individual));
                if candidates.is_empty() {
                    candidates = self.ontology.resolve_short_name(name);
                }
                match candidates.len() {
                    0 => return Err(SqwrlError::UnknownName(name.clone())),
                    1 => candidates.remove(0),
                    _ => {
                        return Err(SqwrlError::AmbiguousName {
                            name: name.clone(),
                            candidates,
                        });
                    }
                }
            }
        };
        let kinds = self.ontology.entity_kinds(&iri);
        Ok(
            if kinds.is_empty() || kinds.contains(&EntityKind::Individual) {
                Individual::Named(iri).into()
            } else {
                ResultValue::Entity(iri)
            },
        )
    }

    fn head_projection(
        &mut self,
        head: &mut Head,
        operator: &HeadOperator,
        atom: &Atom,
        bound: &[bool],
    ) -> Result<(), SqwrlError> {
        match operator {
            HeadOperator::Select { distinct } => {
                head.distinct |= *distinct;
                for argument in &atom.arguments {
                    let term = self.value(atom, argument)?;
                    let name = match &term {
                        Term::Variable(v) => {
                            self.check_bound(*v, bound)?;
                            self.variables[*v].as_str().to_owned()
                        }
                        Term::Constant(c) => c.lexical_form(),
                    };
                    head.columns.push(Column::Value(term));
                    head.column_names.push(name);
                }
            }
            HeadOperator::Aggregate(function) => {
                let [Argument::Variable(variable)] = atom.arguments.as_slice() else {
                    return Err(SqwrlError::InvalidHead(format!(
                        "sqwrl:{} expects a single variable",
                        function.name()
                    )));
                };
                let position = self.variable(variable);
                self.check_bound(position, bound)?;
                head.columns.push(Column::Aggregate {
                    function: *function,
                    variable: position,
                });
                head.column_names
                    .push(format!("{}({variable})", function.name()));
            }
            _ => (),
        }
        Ok(())
    }

    fn head_modifier(
        &self,
        head: &mut Head,
        operator: &HeadOperator,
        atom: &Atom,
    ) -> Result<(), SqwrlError> {
        match operator {
            HeadOperator::OrderBy { descending } => {
                for argument in &atom.arguments {
                    let Argument::Variable(variable) = argument else {
                        return Err(SqwrlError::InvalidHead(format!(
                            "only variables can be ordered by, found {argument}"
                        )));
                    };
                    let position = self.variables.iter().position(|v| v == variable);
                    let column = head
                        .columns
                        .iter()
                        .position(|column| match column {
                            Column::Value(Term::Variable(v))
                            | Column::Aggregate { variable: v, .. } => Some(*v) == position,
                            Column::Value(Term::Constant(_)) => false,
                        })
                        .ok_or_else(|| {
                            SqwrlError::InvalidHead(format!(
                                "{variable} is ordered by but not selected"
                            ))
                        })?;
                    head.order_by.push((column, *descending));
                }
            }
            HeadOperator::ColumnNames => {
                if atom.arguments.len() > head.columns.len() {
                    return Err(SqwrlError::InvalidHead(format!(
                        "{} column names given for {} columns",
                        atom.arguments.len(),
                        head.columns.len()
                    )));
                }
                for (i, argument) in atom.arguments.iter().enumerate() {
                    let Argument::Literal(name) = argument else {
                        return Err(SqwrlError::InvalidHead(format!(
                            "column names must be strings, found {argument}"
                        )));
                    };
                    head.column_names[i] = name.value().to_owned();
                }
            }
            HeadOperator::Limit => {
                let limit = match atom.arguments.as_slice() {
                    [Argument::Literal(limit)] if limit.datatype() == xsd::INTEGER => {
                        limit.value().parse::<usize>().ok()
                    }
                    _ => None,
                };
                let Some(limit) = limit else {
                    return Err(SqwrlError::InvalidHead(
                        "sqwrl:limit expects a single non-negative integer".into(),
                    ));
                };
                head.limit = Some(head.limit.map_or(limit, |l| l.min(limit)));
            }
            _ => (),
        }
        Ok(())
    }

    fn check_bound(&self, variable: usize, bound: &[bool]) -> Result<(), SqwrlError> {
        if bound.get(variable).copied().unwrap_or(false) {
            Ok(())
        } else {
            Err(SqwrlError::InvalidHead(format!(
                "{} is not bound in the query body",
                self.variables[variable]
            )))
        }
    }
}

enum HeadOperator {
    Select { distinct: bool },
    Aggregate(Aggregate),
    OrderBy { descending: bool },
    ColumnNames,
    Limit,
}

fn head_operator(atom: &Atom) -> Result<HeadOperator, SqwrlError> {
    let Some(name) = (match &atom.predicate {
        Name::Iri(iri) => iri.as_str().strip_prefix(sqwrl::NAMESPACE),
        Name::Short(_) => None,
    }) else {
        return Err(SqwrlError::InvalidHead(format!(
            "{atom} is not a SQWRL operator"
        )));
    };
    Ok(match name {
        "select" => HeadOperator::Select { distinct: false },
        "selectDistinct" => HeadOperator::Select { distinct: true },
        "orderBy" => HeadOperator::OrderBy { descending: false },
        "orderByDescending" => HeadOperator::OrderBy { descending: true },
        "columnNames" => HeadOperator::ColumnNames,
        "limit" => HeadOperator::Limit,
        _ => HeadOperator::Aggregate(Aggregate::from_name(name).ok_or_else(|| {
            SqwrlError::InvalidHead(format!("sqwrl:{name} is not supported"))
        })?),
    })
}

fn invalid_atom(atom: &Atom, message: impl Into<String>) -> SqwrlError {
    SqwrlError::InvalidAtom {
        atom: atom.to_string(),
        message: message.into(),
    }
}
