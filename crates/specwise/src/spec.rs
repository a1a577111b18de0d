//! The specification capability and its shareable handle.
//!
//! Leaf rules are written against one of two traits:
//!
//! - [`Specification`]: an opaque in-memory predicate.
//! - [`ExpressionSpecification`]: a rule that describes itself as a
//!   [`Lambda`], so it can be translated for a query backend.
//!
//! Either kind is wrapped in a [`Spec`], which carries the combinators.
//! The receiver decides the strategy of the result: combining onto an
//! expression-capable spec yields an expression composite, combining onto
//! an opaque one yields an in-memory composite. Operands of the other kind
//! are accepted either way.
//!
//! ```
//! use specwise::{Entity, ExpressionSpecification, Lambda, Spec, Timestamp, Value};
//!
//! struct Taxi {
//!     license: String,
//!     created_at: Timestamp,
//! }
//!
//! impl Entity for Taxi {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "license" => Value::String(&self.license),
//!             "created_at" => Value::Timestamp(self.created_at),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! struct CreatedBefore(Timestamp);
//!
//! impl ExpressionSpecification<Taxi> for CreatedBefore {
//!     fn as_expression(&self) -> Lambda<Taxi> {
//!         Lambda::new("taxi", |t| t.field("created_at").before(self.0))
//!     }
//! }
//!
//! let now = Timestamp::now();
//! let old = Spec::expression(CreatedBefore(now));
//! let licensed = Spec::from_fn("licensed", |t: &Taxi| !t.license.trim().is_empty());
//! let rule = old.and(&licensed);
//!
//! let taxi = Taxi { license: "L-1".into(), created_at: now.offset_days(-10) };
//! assert!(rule.is_satisfied_by(&taxi));
//! assert!(rule.is_expression_capable());
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not as StdNot};
use std::sync::Arc;

use tracing::warn;

use crate::composite::{Composite, Connective};
use crate::entity::Entity;
use crate::error::{Result, SpecError};
use crate::expr::Lambda;
use crate::{in_memory, queryable};

/// A rule evaluated directly against a candidate held in memory.
pub trait Specification<T>: Send + Sync {
    fn is_satisfied_by(&self, candidate: &T) -> bool;
}

/// A rule expressed as a single-parameter expression tree.
pub trait ExpressionSpecification<T>: Send + Sync {
    fn as_expression(&self) -> Lambda<T>;
}

impl<T> ExpressionSpecification<T> for Lambda<T> {
    fn as_expression(&self) -> Lambda<T> {
        self.clone()
    }
}

struct FnRule<F>(F);

impl<T, F> Specification<T> for FnRule<F>
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.0)(candidate)
    }
}

enum Node<T> {
    Predicate {
        label: String,
        rule: Box<dyn Specification<T>>,
    },
    Expression(Box<dyn ExpressionSpecification<T>>),
    InMemory(Composite<T>),
    Queryable(Composite<T>),
}

/// Deepest composite nesting that [`Spec`] will evaluate or turn into an
/// expression. Leaves have depth 1.
///
/// Deeper specs still build. Evaluating one reports
/// [`SpecError::ExpressionTooDeep`] instead of recursing further.
pub const MAX_NESTING: usize = 256;

/// Shareable, immutable handle to a specification.
///
/// Cloning is a reference-count bump. Nothing inside a `Spec` is written
/// after construction, so one instance can be evaluated from many threads.
pub struct Spec<T> {
    node: Arc<Node<T>>,
    depth: usize,
}

impl<T> Clone for Spec<T> {
    fn clone(&self) -> Self {
        Spec {
            node: Arc::clone(&self.node),
            depth: self.depth,
        }
    }
}

impl<T> Spec<T> {
    /// Wraps an opaque in-memory rule.
    pub fn predicate<S>(rule: S) -> Self
    where
        S: Specification<T> + 'static,
    {
        Spec::from_node(Node::Predicate {
            label: short_type_name::<S>(),
            rule: Box::new(rule),
        })
    }

    /// Wraps an opaque in-memory rule under an explicit label.
    pub fn labeled<S>(label: impl Into<String>, rule: S) -> Self
    where
        S: Specification<T> + 'static,
    {
        Spec::from_node(Node::Predicate {
            label: label.into(),
            rule: Box::new(rule),
        })
    }

    /// Wraps a closure as an opaque in-memory rule.
    pub fn from_fn<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        T: 'static,
    {
        Spec::labeled(label, FnRule(f))
    }

    /// Wraps an expression rule.
    pub fn expression<S>(rule: S) -> Self
    where
        S: ExpressionSpecification<T> + 'static,
    {
        Spec::from_node(Node::Expression(Box::new(rule)))
    }

    /// Wraps a ready-made lambda as an expression rule.
    pub fn from_lambda(lambda: Lambda<T>) -> Self
    where
        T: 'static,
    {
        Spec::expression(lambda)
    }

    /// Wraps a composite evaluated with the in-memory strategy.
    pub fn in_memory(composite: Composite<T>) -> Self {
        Spec::from_node(Node::InMemory(composite))
    }

    /// Wraps a composite evaluated with the expression-tree strategy.
    pub fn queryable(composite: Composite<T>) -> Self {
        Spec::from_node(Node::Queryable(composite))
    }

    fn from_node(node: Node<T>) -> Self {
        let depth = match &node {
            Node::InMemory(c) | Node::Queryable(c) => c.depth(),
            Node::Predicate { .. } | Node::Expression(_) => 1,
        };
        Spec {
            node: Arc::new(node),
            depth,
        }
    }

    /// Composite nesting depth, fixed at construction.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn check_depth(&self) -> Result<()> {
        if self.depth > MAX_NESTING {
            return Err(SpecError::ExpressionTooDeep { max: MAX_NESTING });
        }
        Ok(())
    }

    /// Whether [`as_expression`](Spec::as_expression) returns a tree.
    pub fn is_expression_capable(&self) -> bool {
        matches!(&*self.node, Node::Expression(_) | Node::Queryable(_))
    }

    /// The composite behind this handle, if it is one.
    pub fn composite(&self) -> Option<&Composite<T>> {
        match &*self.node {
            Node::InMemory(c) | Node::Queryable(c) => Some(c),
            _ => None,
        }
    }

    /// Two handles to the same instance.
    pub fn ptr_eq(&self, other: &Spec<T>) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Label used when this spec is bridged into an expression as an opaque call.
    pub fn label(&self) -> String {
        match &*self.node {
            Node::Predicate { label, .. } => label.clone(),
            _ => self.to_string(),
        }
    }

    // ========================================================================
    // Combinators
    // ========================================================================

    fn combine(&self, composite: Composite<T>) -> Spec<T> {
        if self.is_expression_capable() {
            Spec::queryable(composite)
        } else {
            Spec::in_memory(composite)
        }
    }

    /// `self AND other`.
    pub fn and(&self, other: &Spec<T>) -> Spec<T> {
        self.combine(Composite::And(self.clone(), other.clone()))
    }

    /// `self OR other`.
    pub fn or(&self, other: &Spec<T>) -> Spec<T> {
        self.combine(Composite::Or(self.clone(), other.clone()))
    }

    /// `NOT self`.
    pub fn not(&self) -> Spec<T> {
        self.combine(Composite::Not(self.clone()))
    }

    /// `self AND NOT other`.
    pub fn and_not(&self, other: &Spec<T>) -> Spec<T> {
        self.combine(Composite::AndNot(self.clone(), other.clone()))
    }

    /// `self OR NOT other`.
    pub fn or_not(&self, other: &Spec<T>) -> Spec<T> {
        self.combine(Composite::OrNot(self.clone(), other.clone()))
    }

    /// Combines with an operand that may be missing, as happens when the
    /// operand comes from a lookup. A missing operand fails immediately.
    pub fn try_combine(&self, connective: Connective, other: Option<&Spec<T>>) -> Result<Spec<T>> {
        let composite = Composite::binary(connective, Some(self.clone()), other.cloned())?;
        Ok(self.combine(composite))
    }

    pub fn try_and(&self, other: Option<&Spec<T>>) -> Result<Spec<T>> {
        self.try_combine(Connective::And, other)
    }

    pub fn try_or(&self, other: Option<&Spec<T>>) -> Result<Spec<T>> {
        self.try_combine(Connective::Or, other)
    }

    pub fn try_and_not(&self, other: Option<&Spec<T>>) -> Result<Spec<T>> {
        self.try_combine(Connective::AndNot, other)
    }

    pub fn try_or_not(&self, other: Option<&Spec<T>>) -> Result<Spec<T>> {
        self.try_combine(Connective::OrNot, other)
    }
}

impl<T: Entity + 'static> Spec<T> {
    /// The expression form of this spec, or `None` for opaque predicates and
    /// in-memory composites.
    ///
    /// Expression composites rebuild their merged tree on every call. The
    /// tree is built without a depth check; use
    /// [`try_expression`](Spec::try_expression) for specs of unknown depth.
    pub fn as_expression(&self) -> Option<Lambda<T>> {
        match &*self.node {
            Node::Expression(rule) => Some(rule.as_expression()),
            Node::Queryable(composite) => Some(queryable::expression(composite)),
            Node::Predicate { .. } | Node::InMemory(_) => None,
        }
    }

    /// The expression form of this spec.
    ///
    /// Fails with [`SpecError::NotQueryable`] for specs without one and with
    /// [`SpecError::ExpressionTooDeep`] past [`MAX_NESTING`].
    pub fn try_expression(&self) -> Result<Lambda<T>> {
        self.check_depth()?;
        self.as_expression().ok_or(SpecError::NotQueryable)
    }

    /// Evaluates this specification against a candidate.
    ///
    /// Expression-backed specs compile their tree on every call. A spec
    /// nested past [`MAX_NESTING`], or a tree that fails to compile, is
    /// logged and satisfies nothing; use [`evaluate`](Spec::evaluate) to see
    /// the error instead.
    pub fn is_satisfied_by(&self, candidate: &T) -> bool {
        match self.try_evaluate(candidate) {
            Ok(satisfied) => satisfied,
            Err(err) => {
                warn!(error = %err, depth = self.depth, "specification could not be evaluated");
                false
            }
        }
    }

    /// Evaluates against a candidate that may be missing.
    pub fn evaluate(&self, candidate: Option<&T>) -> Result<bool> {
        let candidate = candidate.ok_or(SpecError::MissingCandidate)?;
        self.try_evaluate(candidate)
    }

    fn try_evaluate(&self, candidate: &T) -> Result<bool> {
        self.check_depth()?;
        match &*self.node {
            Node::Predicate { rule, .. } => Ok(rule.is_satisfied_by(candidate)),
            Node::InMemory(composite) => Ok(in_memory::evaluate(composite, candidate)),
            Node::Expression(_) | Node::Queryable(_) => {
                Ok(self.try_expression()?.compile()?.call(candidate))
            }
        }
    }
}

impl<T: Entity + 'static> Specification<T> for Spec<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        Spec::is_satisfied_by(self, candidate)
    }
}

// ============================================================================
// Operators: `&a & &b`, `&a | &b`, `!&a`
// ============================================================================

impl<T> BitAnd for &Spec<T> {
    type Output = Spec<T>;

    fn bitand(self, rhs: &Spec<T>) -> Spec<T> {
        self.and(rhs)
    }
}

impl<T> BitOr for &Spec<T> {
    type Output = Spec<T>;

    fn bitor(self, rhs: &Spec<T>) -> Spec<T> {
        self.or(rhs)
    }
}

impl<T> StdNot for &Spec<T> {
    type Output = Spec<T>;

    fn not(self) -> Spec<T> {
        Spec::not(self)
    }
}

impl<T> fmt::Display for Spec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.node {
            Node::Predicate { label, .. } => f.write_str(label),
            Node::Expression(rule) => write!(f, "[{}]", rule.as_expression()),
            Node::InMemory(c) | Node::Queryable(c) => write!(f, "{}", c),
        }
    }
}

impl<T> fmt::Debug for Spec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &*self.node {
            Node::Predicate { .. } => "predicate",
            Node::Expression(_) => "expression",
            Node::InMemory(_) => "in-memory",
            Node::Queryable(_) => "queryable",
        };
        write!(f, "Spec<{}>({})", kind, self)
    }
}

fn short_type_name<S: ?Sized>() -> String {
    let full = std::any::type_name::<S>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
