//! Tables returned by SQWRL queries.

use oxowl::Individual;
use oxrdf::{Literal, NamedNode, Term};
use std::collections::BTreeMap;
use std::fmt;

/// A value in a SQWRL result table.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum ResultValue {
    Individual(Individual),
    Literal(Literal),
    /// A class or a property selected by name.
    Entity(NamedNode),
}

impl ResultValue {
    #[inline]
    pub fn is_individual(&self) -> bool {
        matches!(self, Self::Individual(_))
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    #[inline]
    pub fn as_individual(&self) -> Option<&Individual> {
        match self {
            Self::Individual(i) => Some(i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// The string form of the value: the IRI (or `_:id`) of an individual or an entity,
    /// the lexical form of a literal.
    ///
    /// ```
    /// use oxrdf::Literal;
    /// use oxsqwrl::ResultValue;
    ///
    /// assert_eq!(ResultValue::Literal(Literal::from(42)).lexical_form(), "42");
    /// ```
    pub fn lexical_form(&self) -> String {
        match self {
            Self::Individual(i) => i.identifier(),
            Self::Literal(l) => l.value().to_owned(),
            Self::Entity(e) => e.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual(i) => i.fmt(f),
            Self::Literal(l) => l.fmt(f),
            Self::Entity(e) => e.fmt(f),
        }
    }
}

impl From<Individual> for ResultValue {
    #[inline]
    fn from(individual: Individual) -> Self {
        Self::Individual(individual)
    }
}

impl From<Literal> for ResultValue {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<ResultValue> for Term {
    #[inline]
    fn from(value: ResultValue) -> Self {
        match value {
            ResultValue::Individual(i) => i.into(),
            ResultValue::Literal(l) => l.into(),
            ResultValue::Entity(e) => e.into(),
        }
    }
}

/// The table computed by a SQWRL query.
///
/// Rows are in the order the query produced them, every row has one value per column.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SqwrlResult {
    column_names: Vec<String>,
    rows: Vec<Vec<ResultValue>>,
}

impl SqwrlResult {
    pub(crate) fn new(column_names: Vec<String>, rows: Vec<Vec<ResultValue>>) -> Self {
        Self { column_names, rows }
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = ResultRow<'_>> {
        self.rows.iter().map(|values| ResultRow {
            column_names: &self.column_names,
            values,
        })
    }

    pub fn into_rows(self) -> Vec<Vec<ResultValue>> {
        self.rows
    }

    /// Converts each row to a map from column name to the string form of the value.
    ///
    /// Only individuals and literals are kept, as other values have no string form
    /// meaningful outside of the ontology.
    pub fn to_string_maps(&self) -> Vec<BTreeMap<String, String>> {
        self.rows()
            .map(|row| {
                row.iter()
                    .filter(|(_, value)| value.is_individual() || value.is_literal())
                    .map(|(name, value)| (name.to_owned(), value.lexical_form()))
                    .collect()
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a SqwrlResult {
    type Item = ResultRow<'a>;
    type IntoIter = Box<dyn ExactSizeIterator<Item = ResultRow<'a>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.rows())
    }
}

/// A row of a [`SqwrlResult`].
#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'a> {
    column_names: &'a [String],
    values: &'a [ResultValue],
}

impl<'a> ResultRow<'a> {
    /// The value of the column with the given name.
    pub fn get(&self, column_name: &str) -> Option<&'a ResultValue> {
        let position = self.column_names.iter().position(|c| c == column_name)?;
        self.values.get(position)
    }

    pub fn values(&self) -> &'a [ResultValue] {
        self.values
    }

    /// The `(column name, value)` pairs of the row.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a ResultValue)> + 'a {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}
