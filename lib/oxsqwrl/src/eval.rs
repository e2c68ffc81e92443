use crate::builtins::{Numeric, Outcome, order_values, values_equal};
use crate::error::SqwrlError;
use crate::resolver::{Aggregate, BodyAtom, Column, CompiledQuery, Term};
use crate::results::{ResultValue, SqwrlResult};
use oxowl::{Individual, Reasoner};
use oxrdf::Literal;
use oxsdatatypes::Integer;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

/// Variable bindings, indexed like the variables of the query or rule.
pub(crate) type Solution = Vec<Option<ResultValue>>;

/// Evaluates a compiled query.
pub(crate) fn evaluate(
    query: &CompiledQuery,
    reasoner: &dyn Reasoner,
) -> Result<SqwrlResult, SqwrlError> {
    let solutions = solutions(query.variables.len(), &query.body, reasoner)?;
    let mut rows = if query
        .columns
        .iter()
        .any(|c| matches!(c, Column::Aggregate { .. }))
    {
        aggregate(&query.columns, &solutions)?
    } else {
        solutions
            .iter()
            .filter_map(|solution| {
                query
                    .columns
                    .iter()
                    .map(|column| match column {
                        Column::Value(term) => value(term, solution).cloned(),
                        Column::Aggregate { .. } => None,
                    })
                    .collect::<Option<Vec<_>>>()
            })
            .collect()
    };
    if query.distinct {
        let mut seen = FxHashSet::default();
        rows.retain(|row| seen.insert(row.clone()));
    }
    if !query.order_by.is_empty() {
        rows.sort_by(|a, b| {
            query
                .order_by
                .iter()
                .map(|(column, descending)| {
                    let ordering = order_values(&a[*column], &b[*column]);
                    if *descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
    if let Some(limit) = query.limit {
        rows.truncate(limit);
    }
    Ok(SqwrlResult::new(query.column_names.clone(), rows))
}

/// Joins body atoms.
///
/// The atoms are joined in order, each one extending or filtering the
/// solutions computed so far. The first error aborts the evaluation.
pub(crate) fn solutions(
    variable_count: usize,
    body: &[BodyAtom],
    reasoner: &dyn Reasoner,
) -> Result<Vec<Solution>, SqwrlError> {
    let mut solutions = vec![vec![None; variable_count]];
    for atom in body {
        if solutions.is_empty() {
            break;
        }
        solutions = AtomEvaluator { reasoner }.evaluate(atom, solutions)?;
    }
    Ok(solutions)
}

struct AtomEvaluator<'a> {
    reasoner: &'a dyn Reasoner,
}

impl AtomEvaluator<'_> {
    fn evaluate(&self, atom: &BodyAtom, solutions: Vec<Solution>) -> Result<Vec<Solution>, SqwrlError> {
        let mut output = Vec::new();
        match atom {
            BodyAtom::Class { class, argument } => {
                let instances = self.reasoner.instances(class, false);
                for solution in solutions {
                    match value(argument, &solution) {
                        Some(ResultValue::Individual(individual)) => {
                            if instances.binary_search(individual).is_ok() {
                                output.push(solution);
                            }
                        }
                        Some(_) => (),
                        None => output.extend(
                            instances
                                .iter()
                                .filter_map(|i| bind(&solution, argument, i.clone().into())),
                        ),
                    }
                }
            }
            BodyAtom::ObjectProperty {
                property,
                subject,
                object,
            } => {
                let pairs = self.reasoner.object_property_pairs(property);
                for solution in solutions {
                    for (s, o) in subject_range(&pairs, value(subject, &solution)) {
                        if let Some(solution) = bind(&solution, subject, s.clone().into())
                            .and_then(|solution| bind(&solution, object, o.clone().into()))
                        {
                            output.push(solution);
                        }
                    }
                }
            }
            BodyAtom::DataProperty {
                property,
                subject,
                value: object,
            } => {
                let pairs = self.reasoner.data_property_pairs(property);
                for solution in solutions {
                    for (s, o) in subject_range(&pairs, value(subject, &solution)) {
                        if let Some(solution) = bind(&solution, subject, s.clone().into())
                            .and_then(|solution| bind(&solution, object, o.clone().into()))
                        {
                            output.push(solution);
                        }
                    }
                }
            }
            BodyAtom::SameAs(a, b) => {
                for solution in solutions {
                    self.individual_pairs(&solution, a, b, &mut output, |x| {
                        self.reasoner.same_individuals(x)
                    });
                }
            }
            BodyAtom::DifferentFrom(a, b) => {
                let individuals = self.reasoner.individuals();
                for solution in solutions {
                    self.individual_pairs(&solution, a, b, &mut output, |x| {
                        individuals
                            .iter()
                            .filter(|y| self.reasoner.are_different(x, y))
                            .cloned()
                            .collect()
                    });
                }
            }
            BodyAtom::BuiltIn {
                built_in,
                arguments,
            } => {
                for solution in solutions {
                    let values = arguments
                        .iter()
                        .map(|a| value(a, &solution))
                        .collect::<Vec<_>>();
                    match built_in.call(&values)? {
                        Outcome::Satisfied(true) => output.push(solution),
                        Outcome::Satisfied(false) => (),
                        Outcome::Bind(result) => {
                            if let Some(solution) = bind(&solution, &arguments[0], result) {
                                output.push(solution);
                            }
                        }
                    }
                }
            }
        }
        Ok(output)
    }

    /// Evaluates a symmetric relation between individuals given the individuals related to one of them.
    fn individual_pairs(
        &self,
        solution: &Solution,
        a: &Term,
        b: &Term,
        output: &mut Vec<Solution>,
        related: impl Fn(&Individual) -> Vec<Individual>,
    ) {
        let (known, other) = match (value(a, solution), value(b, solution)) {
            (Some(ResultValue::Individual(x)), _) => (x.clone(), b),
            (None, Some(ResultValue::Individual(y))) => (y.clone(), a),
            (None, None) => {
                for x in self.reasoner.individuals() {
                    for y in related(&x) {
                        if let Some(solution) = bind(solution, a, x.clone().into())
                            .and_then(|solution| bind(&solution, b, y.into()))
                        {
                            output.push(solution);
                        }
                    }
                }
                return;
            }
            _ => return,
        };
        output.extend(
            related(&known)
                .into_iter()
                .filter_map(|y| bind(solution, other, y.into())),
        );
    }
}

pub(crate) fn value<'a>(term: &'a Term, solution: &'a Solution) -> Option<&'a ResultValue> {
    match term {
        Term::Variable(v) => solution[*v].as_ref(),
        Term::Constant(c) => Some(c),
    }
}

/// Extends the solution with `term = value`, returns `None` if it contradicts the solution.
fn bind(solution: &Solution, term: &Term, value: ResultValue) -> Option<Solution> {
    match term {
        Term::Constant(c) => values_equal(c, &value).then(|| solution.clone()),
        Term::Variable(v) => match &solution[*v] {
            Some(existing) => values_equal(existing, &value).then(|| solution.clone()),
            None => {
                let mut solution = solution.clone();
                solution[*v] = Some(value);
                Some(solution)
            }
        },
    }
}

/// The pairs of a sorted property extension with the given subject, or all of them if it is unbound.
fn subject_range<'a, V>(
    pairs: &'a [(Individual, V)],
    subject: Option<&ResultValue>,
) -> &'a [(Individual, V)] {
    match subject {
        None => pairs,
        Some(ResultValue::Individual(subject)) => {
            let start = pairs.partition_point(|(s, _)| s < subject);
            let end = start + pairs[start..].partition_point(|(s, _)| s == subject);
            &pairs[start..end]
        }
        Some(_) => &[],
    }
}

/// Groups the solutions by the values of the non-aggregated columns, in order of first appearance.
fn aggregate(columns: &[Column], solutions: &[Solution]) -> Result<Vec<Vec<ResultValue>>, SqwrlError> {
    let mut groups: Vec<(Vec<ResultValue>, Vec<&Solution>)> = Vec::new();
    let mut group_ids = FxHashMap::<Vec<ResultValue>, usize>::default();
    for solution in solutions {
        let Some(key) = columns
            .iter()
            .filter_map(|column| match column {
                Column::Value(term) => Some(value(term, solution).cloned()),
                Column::Aggregate { .. } => None,
            })
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };
        let id = *group_ids.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[id].1.push(solution);
    }
    groups
        .into_iter()
        .map(|(key, members)| {
            let mut key = key.into_iter();
            columns
                .iter()
                .map(|column| match column {
                    Column::Value(_) => key.next().ok_or_else(|| {
                        SqwrlError::InvalidHead("inconsistent group key".into())
                    }),
                    Column::Aggregate { function, variable } => compute_aggregate(
                        *function,
                        members.iter().filter_map(|s| s[*variable].as_ref()),
                    ),
                })
                .collect()
        })
        .collect()
}

fn compute_aggregate<'a>(
    function: Aggregate,
    values: impl Iterator<Item = &'a ResultValue>,
) -> Result<ResultValue, SqwrlError> {
    let values = values.collect::<Vec<_>>();
    let invalid = |message: String| SqwrlError::InvalidAggregate {
        aggregate: function.name(),
        message,
    };
    Ok(match function {
        Aggregate::Count => count(values.len())?,
        Aggregate::CountDistinct => {
            count(values.iter().collect::<FxHashSet<_>>().len())?
        }
        Aggregate::Min => values
            .into_iter()
            .min_by(|a, b| order_values(a, b))
            .cloned()
            .ok_or_else(|| invalid("no value".into()))?,
        Aggregate::Max => values
            .into_iter()
            .max_by(|a, b| order_values(a, b))
            .cloned()
            .ok_or_else(|| invalid("no value".into()))?,
        Aggregate::Sum | Aggregate::Avg => {
            let mut sum = Numeric::Integer(Integer::from(0_i64));
            for value in &values {
                let number = value
                    .as_literal()
                    .and_then(Numeric::from_literal)
                    .ok_or_else(|| invalid(format!("{value} is not a number")))?;
                sum = sum
                    .checked_add(number)
                    .ok_or(SqwrlError::Arithmetic("sqwrl:sum"))?;
            }
            if function == Aggregate::Avg {
                let count = i64::try_from(values.len())
                    .map_err(|_| SqwrlError::Arithmetic("sqwrl:avg"))?;
                sum = sum
                    .checked_div(Numeric::Integer(count.into()))
                    .ok_or(SqwrlError::Arithmetic("sqwrl:avg"))?;
            }
            sum.into_literal().into()
        }
    })
}

fn count(count: usize) -> Result<ResultValue, SqwrlError> {
    let count = i64::try_from(count).map_err(|_| SqwrlError::Arithmetic("sqwrl:count"))?;
    Ok(Literal::from(count).into())
}
