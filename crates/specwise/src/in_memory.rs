//! In-memory strategy: composites evaluated as plain booleans.
//!
//! The left operand is always evaluated first and the right one only when
//! it can still change the result.

use crate::composite::Composite;
use crate::entity::Entity;

/// Evaluates a composite against one candidate.
pub fn evaluate<T: Entity + 'static>(composite: &Composite<T>, candidate: &T) -> bool {
    match composite {
        Composite::And(l, r) => l.is_satisfied_by(candidate) && r.is_satisfied_by(candidate),
        Composite::Or(l, r) => l.is_satisfied_by(candidate) || r.is_satisfied_by(candidate),
        Composite::Not(other) => !other.is_satisfied_by(candidate),
        Composite::AndNot(l, r) => l.is_satisfied_by(candidate) && !r.is_satisfied_by(candidate),
        Composite::OrNot(l, r) => l.is_satisfied_by(candidate) || !r.is_satisfied_by(candidate),
    }
}
