//! [SWRL built-ins](https://www.w3.org/submissions/SWRL/#8) for comparisons, arithmetic and strings.

use crate::error::SqwrlError;
use crate::results::ResultValue;
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNodeRef};
use oxsdatatypes::{Decimal, Double, Integer};
use regex::RegexBuilder;
use std::cmp::Ordering;
use std::str::FromStr;

macro_rules! built_ins {
    ($($variant:ident => $name:literal,)*) => {
        /// A supported `swrlb:` built-in.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub(crate) enum BuiltIn {
            $($variant,)*
        }

        impl BuiltIn {
            pub(crate) fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub(crate) fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            fn qualified_name(self) -> &'static str {
                match self {
                    $(Self::$variant => concat!("swrlb:", $name),)*
                }
            }
        }
    };
}

built_ins! {
    Equal => "equal",
    NotEqual => "notEqual",
    LessThan => "lessThan",
    LessThanOrEqual => "lessThanOrEqual",
    GreaterThan => "greaterThan",
    GreaterThanOrEqual => "greaterThanOrEqual",
    Add => "add",
    Subtract => "subtract",
    Multiply => "multiply",
    Divide => "divide",
    Mod => "mod",
    Abs => "abs",
    StringConcat => "stringConcat",
    StringLength => "stringLength",
    UpperCase => "upperCase",
    LowerCase => "lowerCase",
    Contains => "contains",
    ContainsIgnoreCase => "containsIgnoreCase",
    StartsWith => "startsWith",
    EndsWith => "endsWith",
    Matches => "matches",
    StringEqualIgnoreCase => "stringEqualIgnoreCase",
}

/// The result of a built-in call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Satisfied(bool),
    /// The first argument was unbound and should be bound to this value.
    Bind(ResultValue),
}

impl BuiltIn {
    /// The minimal and maximal number of arguments.
    pub(crate) fn arity(self) -> (usize, Option<usize>) {
        match self {
            Self::Add | Self::Multiply => (3, None),
            Self::StringConcat => (2, None),
            Self::Subtract | Self::Divide | Self::Mod => (3, Some(3)),
            Self::Matches => (2, Some(3)),
            _ => (2, Some(2)),
        }
    }

    /// Does the built-in compute its first argument from the other ones?
    ///
    /// If so the first argument may be unbound when it is called.
    pub(crate) fn binds_first_argument(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Subtract
                | Self::Multiply
                | Self::Divide
                | Self::Mod
                | Self::Abs
                | Self::StringConcat
                | Self::StringLength
                | Self::UpperCase
                | Self::LowerCase
        )
    }

    pub(crate) fn call(self, arguments: &[Option<&ResultValue>]) -> Result<Outcome, SqwrlError> {
        let (first, inputs) = if self.binds_first_argument() {
            arguments
                .split_first()
                .map_or((None, arguments), |(first, rest)| (*first, rest))
        } else {
            (None, arguments)
        };
        let inputs = inputs
            .iter()
            .map(|a| a.ok_or_else(|| self.invalid("all the arguments must be bound")))
            .collect::<Result<Vec<_>, _>>()?;
        let result = match self {
            Self::Equal => return Ok(Outcome::Satisfied(values_equal(inputs[0], inputs[1]))),
            Self::NotEqual => return Ok(Outcome::Satisfied(!values_equal(inputs[0], inputs[1]))),
            Self::LessThan => return Ok(self.compare(&inputs, Ordering::is_lt)),
            Self::LessThanOrEqual => return Ok(self.compare(&inputs, Ordering::is_le)),
            Self::GreaterThan => return Ok(self.compare(&inputs, Ordering::is_gt)),
            Self::GreaterThanOrEqual => return Ok(self.compare(&inputs, Ordering::is_ge)),
            Self::Add => self.fold(&inputs, Numeric::checked_add)?,
            Self::Subtract => self.fold(&inputs, Numeric::checked_sub)?,
            Self::Multiply => self.fold(&inputs, Numeric::checked_mul)?,
            Self::Divide => self.fold(&inputs, Numeric::checked_div)?,
            Self::Mod => self.fold(&inputs, Numeric::checked_rem)?,
            Self::Abs => self
                .numeric(inputs[0])?
                .checked_abs()
                .ok_or(SqwrlError::Arithmetic(self.qualified_name()))?
                .into_literal(),
            Self::StringConcat => {
                let mut concat = String::new();
                for input in &inputs {
                    concat.push_str(self.string(input)?);
                }
                Literal::new_simple_literal(concat)
            }
            Self::StringLength => Literal::new_typed_literal(
                self.string(inputs[0])?.chars().count().to_string(),
                xsd::INTEGER,
            ),
            Self::UpperCase => Literal::new_simple_literal(self.string(inputs[0])?.to_uppercase()),
            Self::LowerCase => Literal::new_simple_literal(self.string(inputs[0])?.to_lowercase()),
            Self::Contains => {
                return Ok(Outcome::Satisfied(
                    self.string(inputs[0])?.contains(self.string(inputs[1])?),
                ));
            }
            Self::ContainsIgnoreCase => {
                return Ok(Outcome::Satisfied(
                    self.string(inputs[0])?
                        .to_lowercase()
                        .contains(&self.string(inputs[1])?.to_lowercase()),
                ));
            }
            Self::StartsWith => {
                return Ok(Outcome::Satisfied(
                    self.string(inputs[0])?.starts_with(self.string(inputs[1])?),
                ));
            }
            Self::EndsWith => {
                return Ok(Outcome::Satisfied(
                    self.string(inputs[0])?.ends_with(self.string(inputs[1])?),
                ));
            }
            Self::Matches => return self.matches(&inputs).map(Outcome::Satisfied),
            Self::StringEqualIgnoreCase => {
                return Ok(Outcome::Satisfied(
                    self.string(inputs[0])?.to_lowercase()
                        == self.string(inputs[1])?.to_lowercase(),
                ));
            }
        };
        let result = ResultValue::Literal(result);
        Ok(match first {
            Some(first) => Outcome::Satisfied(values_equal(first, &result)),
            None => Outcome::Bind(result),
        })
    }

    fn compare(self, inputs: &[&ResultValue], expected: fn(Ordering) -> bool) -> Outcome {
        Outcome::Satisfied(compare_values(inputs[0], inputs[1]).is_some_and(expected))
    }

    fn fold(
        self,
        inputs: &[&ResultValue],
        operation: fn(Numeric, Numeric) -> Option<Numeric>,
    ) -> Result<Literal, SqwrlError> {
        let mut inputs = inputs.iter();
        let mut result = match inputs.next() {
            Some(first) => self.numeric(first)?,
            None => return Err(self.invalid("at least one operand is required")),
        };
        for input in inputs {
            result = operation(result, self.numeric(input)?)
                .ok_or(SqwrlError::Arithmetic(self.qualified_name()))?;
        }
        Ok(result.into_literal())
    }

    fn matches(self, inputs: &[&ResultValue]) -> Result<bool, SqwrlError> {
        let text = self.string(inputs[0])?;
        let mut regex = RegexBuilder::new(self.string(inputs[1])?);
        if let Some(flags) = inputs.get(2) {
            for flag in self.string(flags)?.chars() {
                match flag {
                    'i' => regex.case_insensitive(true),
                    'm' => regex.multi_line(true),
                    's' => regex.dot_matches_new_line(true),
                    'x' => regex.ignore_whitespace(true),
                    _ => return Err(self.invalid(format!("unsupported regex flag '{flag}'"))),
                };
            }
        }
        let regex = regex
            .size_limit(1_000_000)
            .build()
            .map_err(|e| self.invalid(e.to_string()))?;
        Ok(regex.is_match(text))
    }

    fn numeric(self, value: &ResultValue) -> Result<Numeric, SqwrlError> {
        value
            .as_literal()
            .and_then(Numeric::from_literal)
            .ok_or_else(|| self.invalid(format!("{value} is not a number")))
    }

    fn string(self, value: &ResultValue) -> Result<&str, SqwrlError> {
        value
            .as_literal()
            .map(Literal::value)
            .ok_or_else(|| self.invalid(format!("{value} is not a literal")))
    }

    fn invalid(self, message: impl Into<String>) -> SqwrlError {
        SqwrlError::InvalidArgument {
            built_in: self.name(),
            message: message.into(),
        }
    }
}

/// An `xsd:integer`, `xsd:decimal` or `xsd:double` value.
///
/// Binary operations promote their operands along integer, decimal, double.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Numeric {
    Integer(Integer),
    Decimal(Decimal),
    Double(Double),
}

const INTEGER_DATATYPES: [NamedNodeRef<'static>; 13] = [
    xsd::INTEGER,
    xsd::LONG,
    xsd::INT,
    xsd::SHORT,
    xsd::BYTE,
    xsd::NON_NEGATIVE_INTEGER,
    xsd::NON_POSITIVE_INTEGER,
    xsd::POSITIVE_INTEGER,
    xsd::NEGATIVE_INTEGER,
    xsd::UNSIGNED_LONG,
    xsd::UNSIGNED_INT,
    xsd::UNSIGNED_SHORT,
    xsd::UNSIGNED_BYTE,
];

enum Promoted {
    Integer(Integer, Integer),
    Decimal(Decimal, Decimal),
    Double(Double, Double),
}

impl Numeric {
    pub(crate) fn from_literal(literal: &Literal) -> Option<Self> {
        let datatype = literal.datatype();
        let value = literal.value();
        if INTEGER_DATATYPES.contains(&datatype) {
            Integer::from_str(value).ok().map(Self::Integer)
        } else if datatype == xsd::DECIMAL {
            Decimal::from_str(value).ok().map(Self::Decimal)
        } else if datatype == xsd::DOUBLE || datatype == xsd::FLOAT {
            Double::from_str(value).ok().map(Self::Double)
        } else {
            None
        }
    }

    pub(crate) fn into_literal(self) -> Literal {
        match self {
            Self::Integer(v) => Literal::new_typed_literal(v.to_string(), xsd::INTEGER),
            Self::Decimal(v) => Literal::new_typed_literal(v.to_string(), xsd::DECIMAL),
            Self::Double(v) => Literal::new_typed_literal(v.to_string(), xsd::DOUBLE),
        }
    }

    fn to_double(self) -> Double {
        match self {
            Self::Integer(v) => v.into(),
            Self::Decimal(v) => v.into(),
            Self::Double(v) => v,
        }
    }

    fn promote(self, other: Self) -> Promoted {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Promoted::Integer(a, b),
            (Self::Integer(a), Self::Decimal(b)) => Promoted::Decimal(a.into(), b),
            (Self::Decimal(a), Self::Integer(b)) => Promoted::Decimal(a, b.into()),
            (Self::Decimal(a), Self::Decimal(b)) => Promoted::Decimal(a, b),
            (a, b) => Promoted::Double(a.to_double(), b.to_double()),
        }
    }

    pub(crate) fn checked_add(self, other: Self) -> Option<Self> {
        Some(match self.promote(other) {
            Promoted::Integer(a, b) => Self::Integer(a.checked_add(b)?),
            Promoted::Decimal(a, b) => Self::Decimal(a.checked_add(b)?),
            Promoted::Double(a, b) => Self::Double(a + b),
        })
    }

    fn checked_sub(self, other: Self) -> Option<Self> {
        Some(match self.promote(other) {
            Promoted::Integer(a, b) => Self::Integer(a.checked_sub(b)?),
            Promoted::Decimal(a, b) => Self::Decimal(a.checked_sub(b)?),
            Promoted::Double(a, b) => Self::Double(a - b),
        })
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        Some(match self.promote(other) {
            Promoted::Integer(a, b) => Self::Integer(a.checked_mul(b)?),
            Promoted::Decimal(a, b) => Self::Decimal(a.checked_mul(b)?),
            Promoted::Double(a, b) => Self::Double(a * b),
        })
    }

    /// Division of integers returns a decimal.
    pub(crate) fn checked_div(self, other: Self) -> Option<Self> {
        Some(match self.promote(other) {
            Promoted::Integer(a, b) => Self::Decimal(Decimal::from(a).checked_div(b)?),
            Promoted::Decimal(a, b) => Self::Decimal(a.checked_div(b)?),
            Promoted::Double(a, b) => Self::Double(a / b),
        })
    }

    fn checked_rem(self, other: Self) -> Option<Self> {
        Some(match self.promote(other) {
            Promoted::Integer(a, b) => Self::Integer(a.checked_rem(b)?),
            Promoted::Decimal(a, b) => Self::Decimal(a.checked_rem(b)?),
            Promoted::Double(a, b) => Self::Double((f64::from(a) % f64::from(b)).into()),
        })
    }

    fn checked_abs(self) -> Option<Self> {
        Some(match self {
            Self::Integer(v) => Self::Integer(v.checked_abs()?),
            Self::Decimal(v) => Self::Decimal(v.checked_abs()?),
            Self::Double(v) => Self::Double(v.abs()),
        })
    }

    fn compare(self, other: Self) -> Option<Ordering> {
        match self.promote(other) {
            Promoted::Integer(a, b) => Some(a.cmp(&b)),
            Promoted::Decimal(a, b) => Some(a.cmp(&b)),
            Promoted::Double(a, b) => a.partial_cmp(&b),
        }
    }
}

/// Compares two values if they are comparable: numbers numerically, strings and
/// literals of the same datatype by lexical form.
pub(crate) fn compare_values(a: &ResultValue, b: &ResultValue) -> Option<Ordering> {
    let (ResultValue::Literal(a), ResultValue::Literal(b)) = (a, b) else {
        return (a == b).then_some(Ordering::Equal);
    };
    if let (Some(x), Some(y)) = (Numeric::from_literal(a), Numeric::from_literal(b)) {
        return x.compare(y);
    }
    (a.datatype() == b.datatype() && a.language() == b.language())
        .then(|| a.value().cmp(b.value()))
}

/// Value equality: numbers are compared numerically, other values must be identical.
pub(crate) fn values_equal(a: &ResultValue, b: &ResultValue) -> bool {
    a == b || compare_values(a, b) == Some(Ordering::Equal)
}

/// A total order used to sort result rows.
///
/// Numbers come first and are sorted numerically, other values are sorted by lexical form.
pub(crate) fn order_values(a: &ResultValue, b: &ResultValue) -> Ordering {
    let number = |value: &ResultValue| {
        value
            .as_literal()
            .and_then(Numeric::from_literal)
            .map(|n| f64::from(n.to_double()))
    };
    match (number(a), number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.lexical_form().cmp(&b.lexical_form()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64) -> ResultValue {
        Literal::from(value).into()
    }

    fn typed(value: &str, datatype: NamedNodeRef<'_>) -> ResultValue {
        Literal::new_typed_literal(value, datatype).into()
    }

    fn string(value: &str) -> ResultValue {
        Literal::new_simple_literal(value).into()
    }

    fn call(built_in: BuiltIn, arguments: &[Option<&ResultValue>]) -> Outcome {
        built_in.call(arguments).unwrap()
    }

    #[test]
    fn comparisons_promote_numbers() {
        let a = int(2);
        let b = typed("2.5", xsd::DECIMAL);
        let c = typed("2.0e0", xsd::DOUBLE);
        assert_eq!(
            call(BuiltIn::LessThan, &[Some(&a), Some(&b)]),
            Outcome::Satisfied(true)
        );
        assert_eq!(
            call(BuiltIn::Equal, &[Some(&a), Some(&c)]),
            Outcome::Satisfied(true)
        );
        assert_eq!(
            call(BuiltIn::GreaterThan, &[Some(&a), Some(&string("1"))]),
            Outcome::Satisfied(false)
        );
    }

    #[test]
    fn arithmetic_binds_the_first_argument() {
        assert_eq!(
            call(BuiltIn::Add, &[None, Some(&int(2)), Some(&int(3)), Some(&int(4))]),
            Outcome::Bind(int(9))
        );
        assert_eq!(
            call(BuiltIn::Divide, &[None, Some(&int(1)), Some(&int(4))]),
            Outcome::Bind(typed("0.25", xsd::DECIMAL))
        );
        assert_eq!(
            call(
                BuiltIn::Multiply,
                &[Some(&typed("3.0e0", xsd::DOUBLE)), Some(&int(2)), Some(&typed("1.5", xsd::DECIMAL))]
            ),
            Outcome::Satisfied(true)
        );
        assert_eq!(
            call(BuiltIn::Abs, &[None, Some(&int(-3))]),
            Outcome::Bind(int(3))
        );
    }

    #[test]
    fn arithmetic_errors() {
        assert!(matches!(
            BuiltIn::Add.call(&[None, Some(&int(i64::MAX)), Some(&int(1))]),
            Err(SqwrlError::Arithmetic("swrlb:add"))
        ));
        assert!(matches!(
            BuiltIn::Divide.call(&[None, Some(&int(1)), Some(&int(0))]),
            Err(SqwrlError::Arithmetic(_))
        ));
        assert!(matches!(
            BuiltIn::Add.call(&[None, Some(&string("a")), Some(&int(1))]),
            Err(SqwrlError::InvalidArgument { built_in: "add", .. })
        ));
        assert!(matches!(
            BuiltIn::LessThan.call(&[None, Some(&int(1))]),
            Err(SqwrlError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn strings() {
        assert_eq!(
            call(BuiltIn::StringConcat, &[None, Some(&string("a")), Some(&string("b"))]),
            Outcome::Bind(string("ab"))
        );
        assert_eq!(
            call(BuiltIn::StringLength, &[None, Some(&string("été"))]),
            Outcome::Bind(int(3))
        );
        assert_eq!(
            call(BuiltIn::UpperCase, &[Some(&string("AB")), Some(&string("ab"))]),
            Outcome::Satisfied(true)
        );
        assert_eq!(
            call(BuiltIn::ContainsIgnoreCase, &[Some(&string("Alice")), Some(&string("LIC"))]),
            Outcome::Satisfied(true)
        );
        assert_eq!(
            call(BuiltIn::Matches, &[Some(&string("Alice")), Some(&string("^a.*e$")), Some(&string("i"))]),
            Outcome::Satisfied(true)
        );
        assert!(BuiltIn::Matches
            .call(&[Some(&string("Alice")), Some(&string("("))])
            .is_err());
    }

    #[test]
    fn ordering_is_total() {
        let mut values = vec![string("b"), int(10), typed("2.5", xsd::DECIMAL), string("a")];
        values.sort_by(order_values);
        assert_eq!(
            values,
            [typed("2.5", xsd::DECIMAL), int(10), string("a"), string("b")]
        );
    }
}
