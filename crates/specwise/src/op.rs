//! Comparison operators used by field comparisons.
//!
//! Not every operator is valid for every value type. An operator applied to
//! a value of the wrong type simply does not match.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Comparison operator of a [`Comparison`](crate::Comparison).
///
/// - **Universal**: `Eq`, `Ne`
/// - **String**: `EqIgnoreCase`, `StartsWith`, `EndsWith`, `Contains`, `Regex`
/// - **Numeric/Timestamp**: `Gt`, `Gte`, `Lt`, `Lte`
/// - **Timestamp aliases**: `Before` (`Lt`), `After` (`Gt`)
/// - **Enum**: `In`
/// - **Bool alias**: `Is` (`Eq`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Eq,
    Ne,
    /// ASCII case-insensitive equality.
    EqIgnoreCase,
    StartsWith,
    EndsWith,
    Contains,
    Regex,
    Gt,
    Gte,
    Lt,
    Lte,
    Before,
    After,
    In,
    Is,
}

impl Op {
    /// Returns `true` if this operator is valid for string comparisons.
    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            Op::Eq
                | Op::Ne
                | Op::EqIgnoreCase
                | Op::StartsWith
                | Op::EndsWith
                | Op::Contains
                | Op::Regex
        )
    }

    /// Returns `true` if this operator orders values (numbers, timestamps).
    pub fn is_ordering_op(self) -> bool {
        matches!(
            self.normalize(),
            Op::Eq | Op::Ne | Op::Gt | Op::Gte | Op::Lt | Op::Lte
        )
    }

    /// Returns `true` if this operator is valid for enum comparisons.
    pub fn is_enum_op(self) -> bool {
        matches!(self, Op::Eq | Op::Ne | Op::In)
    }

    /// Maps aliases onto their canonical operator: `Before` to `Lt`,
    /// `After` to `Gt`, `Is` to `Eq`.
    pub fn normalize(self) -> Op {
        match self {
            Op::Before => Op::Lt,
            Op::After => Op::Gt,
            Op::Is => Op::Eq,
            other => other,
        }
    }

    /// Evaluates an ordering-based operator against the result of comparing
    /// the field value with the literal.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self.normalize() {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::EqIgnoreCase => "eq_ignore_case",
            Op::StartsWith => "starts_with",
            Op::EndsWith => "ends_with",
            Op::Contains => "contains",
            Op::Regex => "regex",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Before => "before",
            Op::After => "after",
            Op::In => "in",
            Op::Is => "is",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_type_checks() {
        assert!(Op::Contains.is_string_op());
        assert!(Op::EqIgnoreCase.is_string_op());
        assert!(!Op::Gt.is_string_op());

        assert!(Op::Before.is_ordering_op());
        assert!(Op::Lte.is_ordering_op());
        assert!(!Op::Contains.is_ordering_op());

        assert!(Op::In.is_enum_op());
        assert!(!Op::Gt.is_enum_op());
    }

    #[test]
    fn op_normalization() {
        assert_eq!(Op::Before.normalize(), Op::Lt);
        assert_eq!(Op::After.normalize(), Op::Gt);
        assert_eq!(Op::Is.normalize(), Op::Eq);
        assert_eq!(Op::Contains.normalize(), Op::Contains);
    }

    #[test]
    fn op_eval_ordering_boundaries() {
        assert!(Op::Lte.eval_ordering(Ordering::Equal));
        assert!(!Op::Lt.eval_ordering(Ordering::Equal));
        assert!(Op::Gte.eval_ordering(Ordering::Equal));
        assert!(!Op::Gt.eval_ordering(Ordering::Equal));
        assert!(Op::Before.eval_ordering(Ordering::Less));
        assert!(Op::After.eval_ordering(Ordering::Greater));
        assert!(!Op::Contains.eval_ordering(Ordering::Equal));
    }

    #[test]
    fn op_display_and_serde_names_agree() {
        for op in [Op::Eq, Op::StartsWith, Op::EqIgnoreCase, Op::Before] {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op));
        }
    }
}
