//! Expression-tree strategy: composites merged into one lambda.
//!
//! Each operand contributes its own lambda. Operands with no expression form
//! are bridged as opaque calls, which keeps the result evaluable in memory
//! but makes it untranslatable. The right lambda is always rebound onto the
//! left lambda's parameter, so the merged tree has exactly one parameter.

use std::sync::Arc;

use tracing::debug;

use crate::composite::Composite;
use crate::entity::Entity;
use crate::expr::{Lambda, LogicalOp, MergeStrategy};
use crate::spec::{Spec, Specification};

/// Builds the merged lambda for a composite.
pub fn expression<T: Entity + 'static>(composite: &Composite<T>) -> Lambda<T> {
    expression_with(composite, MergeStrategy::Substitute)
}

/// Builds the merged lambda using an explicit merge strategy.
///
/// Only the outermost merge uses `strategy`; operands that are themselves
/// expression composites produce their own trees with the default.
pub fn expression_with<T: Entity + 'static>(
    composite: &Composite<T>,
    strategy: MergeStrategy,
) -> Lambda<T> {
    let (left, right, op) = match composite {
        Composite::Not(other) => return operand(other).negate(),
        Composite::And(l, r) => (operand(l), operand(r), LogicalOp::And),
        Composite::Or(l, r) => (operand(l), operand(r), LogicalOp::Or),
        Composite::AndNot(l, r) => (operand(l), operand(r).negate(), LogicalOp::And),
        Composite::OrNot(l, r) => (operand(l), operand(r).negate(), LogicalOp::Or),
    };
    Lambda::merge(left, right, op, strategy)
}

fn operand<T: Entity + 'static>(spec: &Spec<T>) -> Lambda<T> {
    match spec.as_expression() {
        Some(lambda) => lambda,
        None => {
            let label = spec.label();
            debug!(operand = %label, "bridging in-memory operand into expression");
            let predicate: Arc<dyn Specification<T>> = Arc::new(spec.clone());
            Lambda::opaque(label, predicate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpecError;
    use crate::expr::Expr;
    use crate::translate::{translate, TranslateOptions};
    use crate::value::{Timestamp, Value};

    struct Ride {
        fare: i64,
        at: Timestamp,
    }

    impl Entity for Ride {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "fare" => Value::Number(self.fare.into()),
                "at" => Value::Timestamp(self.at),
                _ => Value::None,
            }
        }
    }

    fn cheap() -> Spec<Ride> {
        Spec::from_lambda(Lambda::new("r", |p| p.field("fare").lt(10i64)))
    }

    fn early() -> Spec<Ride> {
        Spec::from_lambda(Lambda::new("x", |p| p.field("at").before(Timestamp(100))))
    }

    #[test]
    fn merged_tree_has_one_parameter() {
        let both = cheap().and_not(&early());
        let lambda = both.as_expression().unwrap();
        assert!(lambda.free_params().is_empty());
        assert!(!lambda.contains_invocation());
        assert_eq!(
            lambda.to_string(),
            "r => (r.fare lt 10 && !(r.at before @100))"
        );
    }

    #[test]
    fn invoke_strategy_needs_inlining() {
        let composite = Composite::Or(cheap(), early());
        let lambda = expression_with(&composite, MergeStrategy::Invoke);
        assert!(lambda.contains_invocation());
        let options = TranslateOptions::default().flatten_invocations(false);
        assert!(matches!(
            translate(&lambda, &options),
            Err(SpecError::UnflattenedInvocation)
        ));
        assert!(translate(&lambda, &TranslateOptions::default()).is_ok());
    }

    #[test]
    fn opaque_operand_is_bridged() {
        let odd = Spec::from_fn("odd_fare", |r: &Ride| r.fare % 2 == 1);
        let rule = cheap().and(&odd);
        let lambda = rule.as_expression().unwrap();
        assert_eq!(lambda.to_string(), "r => (r.fare lt 10 && odd_fare(r))");

        assert!(rule.is_satisfied_by(&Ride { fare: 3, at: Timestamp(0) }));
        assert!(!rule.is_satisfied_by(&Ride { fare: 4, at: Timestamp(0) }));
        assert!(matches!(
            translate(&lambda, &TranslateOptions::default()),
            Err(SpecError::Untranslatable { label }) if label == "odd_fare"
        ));
    }

    #[test]
    fn opaque_left_operand_is_bridged() {
        let odd = Spec::from_fn("odd_fare", |r: &Ride| r.fare % 2 == 1);
        let rule = Spec::queryable(Composite::And(odd, cheap()));
        assert!(rule.is_expression_capable());

        let lambda = rule.as_expression().unwrap();
        assert!(lambda.free_params().is_empty());
        assert!(!lambda.contains_invocation());
        assert_eq!(
            lambda.to_string(),
            "candidate => (odd_fare(candidate) && candidate.fare lt 10)"
        );
        match lambda.body() {
            Expr::AndAlso(left, _) => assert!(matches!(**left, Expr::Call(_))),
            other => panic!("expected a conjunction, got {:?}", other),
        }

        let compiled = lambda.compile().unwrap();
        for (fare, expected) in [(3, true), (4, false), (11, false)] {
            let ride = Ride { fare, at: Timestamp(0) };
            assert_eq!(compiled.call(&ride), expected, "fare {}", fare);
            assert_eq!(rule.is_satisfied_by(&ride), expected, "fare {}", fare);
        }
    }

    #[test]
    fn negation_keeps_operand_parameter() {
        let lambda = early().not().as_expression().unwrap();
        assert_eq!(lambda.param().name(), "x");
        assert!(lambda.compile().unwrap().call(&Ride { fare: 0, at: Timestamp(100) }));
    }
}
