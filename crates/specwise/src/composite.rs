//! Composite nodes: one or two operand specifications plus a connective.
//!
//! Both strategies share this shape. They differ only in how the operand
//! results are merged: [`in_memory`](crate::in_memory) combines booleans,
//! [`queryable`](crate::queryable) combines expression trees.

use std::fmt;

use crate::error::{Result, SpecError};
use crate::spec::Spec;

/// Binary connectives. Negation is the unary [`Composite::Not`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
    AndNot,
    OrNot,
}

impl Connective {
    pub fn as_str(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
            Connective::AndNot => "and not",
            Connective::OrNot => "or not",
        }
    }

    /// Whether the right operand is negated before combining.
    pub fn negates_right(self) -> bool {
        matches!(self, Connective::AndNot | Connective::OrNot)
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A composite specification node.
///
/// Operands are shared handles: building a composite never copies the
/// operand trees, and operands live as long as any composite holding them.
pub enum Composite<T> {
    And(Spec<T>, Spec<T>),
    Or(Spec<T>, Spec<T>),
    Not(Spec<T>),
    AndNot(Spec<T>, Spec<T>),
    OrNot(Spec<T>, Spec<T>),
}

impl<T> Composite<T> {
    /// Builds a binary composite, failing before anything is evaluated if
    /// either operand is missing.
    pub fn binary(
        connective: Connective,
        left: Option<Spec<T>>,
        right: Option<Spec<T>>,
    ) -> Result<Self> {
        let left = left.ok_or(SpecError::MissingOperand { name: "left" })?;
        let right = right.ok_or(SpecError::MissingOperand { name: "right" })?;
        Ok(match connective {
            Connective::And => Composite::And(left, right),
            Connective::Or => Composite::Or(left, right),
            Connective::AndNot => Composite::AndNot(left, right),
            Connective::OrNot => Composite::OrNot(left, right),
        })
    }

    /// Builds a negation.
    pub fn negation(other: Option<Spec<T>>) -> Result<Self> {
        other
            .map(Composite::Not)
            .ok_or(SpecError::MissingOperand { name: "other" })
    }

    /// Nesting depth of this node: one more than its deepest operand.
    pub fn depth(&self) -> usize {
        match self {
            Composite::Not(other) => 1 + other.depth(),
            Composite::And(l, r)
            | Composite::Or(l, r)
            | Composite::AndNot(l, r)
            | Composite::OrNot(l, r) => 1 + l.depth().max(r.depth()),
        }
    }

    /// The connective and operands of a binary node; `None` for `Not`.
    pub fn as_binary(&self) -> Option<(Connective, &Spec<T>, &Spec<T>)> {
        match self {
            Composite::And(l, r) => Some((Connective::And, l, r)),
            Composite::Or(l, r) => Some((Connective::Or, l, r)),
            Composite::AndNot(l, r) => Some((Connective::AndNot, l, r)),
            Composite::OrNot(l, r) => Some((Connective::OrNot, l, r)),
            Composite::Not(_) => None,
        }
    }
}

impl<T> Clone for Composite<T> {
    fn clone(&self) -> Self {
        match self {
            Composite::And(l, r) => Composite::And(l.clone(), r.clone()),
            Composite::Or(l, r) => Composite::Or(l.clone(), r.clone()),
            Composite::Not(o) => Composite::Not(o.clone()),
            Composite::AndNot(l, r) => Composite::AndNot(l.clone(), r.clone()),
            Composite::OrNot(l, r) => Composite::OrNot(l.clone(), r.clone()),
        }
    }
}

impl<T> fmt::Display for Composite<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Composite::Not(other) = self {
            return write!(f, "not {}", other);
        }
        if let Some((connective, l, r)) = self.as_binary() {
            write!(f, "({} {} {})", l, connective, r)?;
        }
        Ok(())
    }
}
