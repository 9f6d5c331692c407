//! Filter clauses.
//!
//! A [`Clause`] is one `filter_by` call written down as data: a field name,
//! an operator token and the operands. Clauses are resolved against an
//! [`OperatorTable`] into a [`Predicate`] before they touch any item, so an
//! unknown token or a broken pattern fails once, up front.

use regex::Regex;

use crate::error::{QuarryError, Result};
use crate::op::{Op, OperatorTable};
use crate::predicate;
use crate::value::Value;

/// A single filter rule.
///
/// # Example
///
/// ```
/// use quarry::{Clause, Value};
///
/// let clause = Clause::new("score", ">", [15]);
/// assert_eq!(clause.operator, ">");
/// assert_eq!(clause.values, vec![Value::from(15)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// The attribute to compare.
    pub field: String,
    /// The operator token.
    pub operator: String,
    /// The operands handed to the predicate after the attribute value.
    pub values: Vec<Value>,
}

impl Clause {
    /// Creates a new clause.
    pub fn new<V, I>(field: impl Into<String>, operator: impl Into<String>, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Clause {
            field: field.into(),
            operator: operator.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an equality clause.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Clause::new(field, Op::Equals.token(), [value.into()])
    }

    /// Builds a clause from positional arguments.
    ///
    /// `[field, value]` means `field == value`; `[field, operator, values...]`
    /// spells the operator out.
    pub fn from_args(args: &[Value]) -> Result<Self> {
        match args {
            [Value::String(field), value] => Ok(Clause::eq(field.as_str(), value.clone())),
            [Value::String(field), Value::String(operator), values @ ..] => Ok(Clause {
                field: field.clone(),
                operator: operator.clone(),
                values: values.to_vec(),
            }),
            _ => Err(QuarryError::InvalidFilterSpec(format!(
                "expected [field, value] or [field, operator, values...], got {} argument(s)",
                args.len()
            ))),
        }
    }

    /// Resolves the operator and prepares the operands.
    pub fn compile(&self, operators: &OperatorTable) -> Result<Predicate> {
        Predicate::new(operators.resolve(&self.operator)?, self.values.clone())
    }
}

/// A resolved operator with its operands, ready to test attribute values.
#[derive(Debug, Clone)]
pub struct Predicate {
    op: Op,
    operands: Vec<Value>,
    pattern: Option<Regex>,
}

impl Predicate {
    /// Prepares `op` with its operands. A `match` operand is compiled here.
    pub fn new(op: Op, operands: Vec<Value>) -> Result<Self> {
        let pattern = match (op, operands.first()) {
            (Op::Match, Some(pattern)) => Some(predicate::compile_pattern(&pattern.to_string())?),
            _ => None,
        };
        Ok(Predicate {
            op,
            operands,
            pattern,
        })
    }

    /// The operator this predicate applies.
    pub fn op(&self) -> Op {
        self.op
    }

    /// Tests an attribute value.
    pub fn test(&self, actual: &Value) -> bool {
        let operands = self.operands.as_slice();
        match (self.op, operands) {
            (Op::In, candidates) => predicate::in_list(actual, candidates),
            (Op::NotIn, candidates) => predicate::not_in_list(actual, candidates),
            (Op::Match, _) => self
                .pattern
                .as_ref()
                .is_some_and(|pattern| predicate::matches(actual, pattern)),
            (Op::Between, [min, max, ..]) => predicate::between(actual, min, max),
            (Op::Between, _) => false,
            (op, [operand, ..]) => unary(op, actual, operand),
            (_, []) => false,
        }
    }
}

fn unary(op: Op, actual: &Value, operand: &Value) -> bool {
    match op {
        Op::Contains => predicate::contains(actual, operand),
        Op::NotContains => predicate::not_contains(actual, operand),
        Op::EndsWith => predicate::ends_with(actual, operand),
        Op::StartsWith => predicate::starts_with(actual, operand),
        Op::Equals => predicate::equals(actual, operand),
        Op::Different => predicate::different(actual, operand),
        Op::Less => predicate::less(actual, operand),
        Op::Max => predicate::max(actual, operand),
        Op::More => predicate::more(actual, operand),
        Op::Min => predicate::min(actual, operand),
        Op::MaxLength => predicate::max_length(actual, operand),
        Op::MinLength => predicate::min_length(actual, operand),
        Op::MaxWords => predicate::max_words(actual, operand),
        Op::MinWords => predicate::min_words(actual, operand),
        Op::Between | Op::In | Op::NotIn | Op::Match => false,
    }
}
