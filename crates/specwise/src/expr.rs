//! Expression trees over a single entity parameter.
//!
//! Rust has no language-level expression trees, so this module carries a
//! small AST instead: field comparisons joined by short-circuit connectives,
//! plus two bridging nodes.
//!
//! - [`Expr::Invoke`] calls a whole lambda with an argument. It is what a
//!   naive merge produces, and what many query translators cannot flatten.
//! - [`Expr::Call`] wraps an opaque predicate. It evaluates fine in memory
//!   but can never be translated.
//!
//! Merging two lambdas means unifying their parameters. [`Lambda::merge`]
//! does this by substitution by default, so merged trees contain no
//! `Invoke` nodes at all.
//!
//! ```
//! use specwise::{Lambda, LogicalOp, MergeStrategy, Timestamp};
//!
//! # #[derive(Debug)] struct Taxi;
//! let license = Lambda::<Taxi>::new("taxi", |t| t.field("license").contains("DEFAULT"));
//! let young = Lambda::<Taxi>::new("taxi", |t| t.field("created_at").before(Timestamp(1000)));
//!
//! let both = Lambda::merge(license, young, LogicalOp::And, MergeStrategy::Substitute);
//! assert_eq!(both.free_params().len(), 0);
//! assert!(!both.contains_invocation());
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tracing::trace;

use crate::comparison::{Comparison, Literal};
use crate::entity::Entity;
use crate::error::{Result, SpecError};
use crate::op::Op;
use crate::param::Param;
use crate::spec::Specification;
use crate::value::Timestamp;

/// Deepest expression tree [`Lambda::compile`] accepts.
pub const MAX_EXPRESSION_DEPTH: usize = 1024;

/// Boolean-valued expression node.
pub enum Expr<T> {
    Const(bool),
    Compare(Comparison),
    Not(Box<Expr<T>>),
    /// Short-circuit conjunction, left evaluated first.
    AndAlso(Box<Expr<T>>, Box<Expr<T>>),
    /// Short-circuit disjunction, left evaluated first.
    OrElse(Box<Expr<T>>, Box<Expr<T>>),
    /// Invocation of a lambda with the given argument.
    Invoke(Box<Lambda<T>>, Param),
    /// Opaque predicate applied to a parameter.
    Call(Call<T>),
}

/// An opaque predicate bridged into an expression tree.
pub struct Call<T> {
    pub param: Param,
    pub label: String,
    predicate: Arc<dyn Specification<T>>,
}

impl<T> Call<T> {
    pub fn new(
        param: &Param,
        label: impl Into<String>,
        predicate: Arc<dyn Specification<T>>,
    ) -> Self {
        Call {
            param: param.clone(),
            label: label.into(),
            predicate,
        }
    }

    pub fn predicate(&self) -> &Arc<dyn Specification<T>> {
        &self.predicate
    }
}

impl<T> Clone for Call<T> {
    fn clone(&self) -> Self {
        Call {
            param: self.param.clone(),
            label: self.label.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> Clone for Expr<T> {
    fn clone(&self) -> Self {
        match self {
            Expr::Const(b) => Expr::Const(*b),
            Expr::Compare(c) => Expr::Compare(c.clone()),
            Expr::Not(e) => Expr::Not(e.clone()),
            Expr::AndAlso(l, r) => Expr::AndAlso(l.clone(), r.clone()),
            Expr::OrElse(l, r) => Expr::OrElse(l.clone(), r.clone()),
            Expr::Invoke(lambda, arg) => Expr::Invoke(lambda.clone(), arg.clone()),
            Expr::Call(call) => Expr::Call(call.clone()),
        }
    }
}

impl<T> Expr<T> {
    /// `self && other`.
    pub fn and(self, other: Expr<T>) -> Expr<T> {
        Expr::AndAlso(Box::new(self), Box::new(other))
    }

    /// `self || other`.
    pub fn or(self, other: Expr<T>) -> Expr<T> {
        Expr::OrElse(Box::new(self), Box::new(other))
    }

    /// `!self`.
    pub fn negate(self) -> Expr<T> {
        Expr::Not(Box::new(self))
    }

    /// Replaces every reference to `from` with `to`.
    ///
    /// Lambdas nested in `Invoke` nodes bind their own parameter; their
    /// bodies are only rewritten where they refer to `from` from outside.
    pub fn substitute(self, from: &Param, to: &Param) -> Expr<T> {
        let swap = |p: Param| if &p == from { to.clone() } else { p };
        match self {
            Expr::Const(b) => Expr::Const(b),
            Expr::Compare(mut c) => {
                c.param = swap(c.param);
                Expr::Compare(c)
            }
            Expr::Not(e) => Expr::Not(Box::new(e.substitute(from, to))),
            Expr::AndAlso(l, r) => Expr::AndAlso(
                Box::new(l.substitute(from, to)),
                Box::new(r.substitute(from, to)),
            ),
            Expr::OrElse(l, r) => Expr::OrElse(
                Box::new(l.substitute(from, to)),
                Box::new(r.substitute(from, to)),
            ),
            Expr::Invoke(lambda, arg) => {
                let Lambda { param, body } = *lambda;
                let body = if &param == from {
                    body
                } else {
                    body.substitute(from, to)
                };
                Expr::Invoke(Box::new(Lambda { param, body }), swap(arg))
            }
            Expr::Call(mut call) => {
                call.param = swap(call.param);
                Expr::Call(call)
            }
        }
    }

    /// Replaces every `Invoke` node by the invoked body, rebound to the argument.
    pub fn inline_invocations(self) -> Expr<T> {
        match self {
            Expr::Invoke(lambda, arg) => {
                let Lambda { param, body } = *lambda;
                body.inline_invocations().substitute(&param, &arg)
            }
            Expr::Not(e) => Expr::Not(Box::new(e.inline_invocations())),
            Expr::AndAlso(l, r) => Expr::AndAlso(
                Box::new(l.inline_invocations()),
                Box::new(r.inline_invocations()),
            ),
            Expr::OrElse(l, r) => Expr::OrElse(
                Box::new(l.inline_invocations()),
                Box::new(r.inline_invocations()),
            ),
            leaf => leaf,
        }
    }

    pub fn contains_invocation(&self) -> bool {
        match self {
            Expr::Invoke(..) => true,
            Expr::Not(e) => e.contains_invocation(),
            Expr::AndAlso(l, r) | Expr::OrElse(l, r) => {
                l.contains_invocation() || r.contains_invocation()
            }
            _ => false,
        }
    }

    /// Longest path from this node to a leaf, counting both ends.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Not(e) => 1 + e.depth(),
            Expr::AndAlso(l, r) | Expr::OrElse(l, r) => 1 + l.depth().max(r.depth()),
            Expr::Invoke(lambda, _) => 1 + lambda.body.depth(),
            _ => 1,
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Expr::Not(e) => 1 + e.node_count(),
            Expr::AndAlso(l, r) | Expr::OrElse(l, r) => 1 + l.node_count() + r.node_count(),
            Expr::Invoke(lambda, _) => 1 + lambda.body.node_count(),
            _ => 1,
        }
    }

    fn collect_free(&self, bound: &mut Vec<Param>, free: &mut Vec<Param>) {
        match self {
            Expr::Const(_) => {}
            Expr::Compare(c) => note_free(&c.param, bound, free),
            Expr::Call(call) => note_free(&call.param, bound, free),
            Expr::Not(e) => e.collect_free(bound, free),
            Expr::AndAlso(l, r) | Expr::OrElse(l, r) => {
                l.collect_free(bound, free);
                r.collect_free(bound, free);
            }
            Expr::Invoke(lambda, arg) => {
                note_free(arg, bound, free);
                bound.push(lambda.param.clone());
                lambda.body.collect_free(bound, free);
                bound.pop();
            }
        }
    }
}

fn note_free(param: &Param, bound: &[Param], free: &mut Vec<Param>) {
    if !bound.contains(param) && !free.contains(param) {
        free.push(param.clone());
    }
}

impl<T> std::ops::Not for Expr<T> {
    type Output = Expr<T>;

    fn not(self) -> Expr<T> {
        self.negate()
    }
}

impl<T> fmt::Display for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(b) => write!(f, "{}", b),
            Expr::Compare(c) => write!(f, "{}", c),
            Expr::Not(e) => write!(f, "!({})", e),
            Expr::AndAlso(l, r) => write!(f, "({} && {})", l, r),
            Expr::OrElse(l, r) => write!(f, "({} || {})", l, r),
            Expr::Invoke(lambda, arg) => write!(f, "({})({})", lambda, arg),
            Expr::Call(call) => write!(f, "{}({})", call.label, call.param),
        }
    }
}

impl<T> fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({})", self)
    }
}

// ============================================================================
// Field builders
// ============================================================================

/// A field of a parameter, ready to be compared.
///
/// Obtained from [`Param::field`].
pub struct Field<'p> {
    param: &'p Param,
    name: String,
}

impl Param {
    /// Refers to a field of this parameter.
    pub fn field(&self, name: impl Into<String>) -> Field<'_> {
        Field {
            param: self,
            name: name.into(),
        }
    }
}

impl Field<'_> {
    pub fn compare<T>(self, op: Op, value: impl Into<Literal>) -> Expr<T> {
        Expr::Compare(Comparison::new(self.param, self.name, op, value))
    }

    pub fn eq<T>(self, value: impl Into<Literal>) -> Expr<T> {
        self.compare(Op::Eq, value)
    }

    pub fn ne<T>(self, value: impl Into<Literal>) -> Expr<T> {
        self.compare(Op::Ne, value)
    }

    pub fn eq_ignore_case<T>(self, value: &str) -> Expr<T> {
        self.compare(Op::EqIgnoreCase, value)
    }

    pub fn contains<T>(self, value: &str) -> Expr<T> {
        self.compare(Op::Contains, value)
    }

    pub fn starts_with<T>(self, value: &str) -> Expr<T> {
        self.compare(Op::StartsWith, value)
    }

    pub fn ends_with<T>(self, value: &str) -> Expr<T> {
        self.compare(Op::EndsWith, value)
    }

    pub fn gt<T>(self, value: impl Into<Literal>) -> Expr<T> {
        self.compare(Op::Gt, value)
    }

    pub fn gte<T>(self, value: impl Into<Literal>) -> Expr<T> {
        self.compare(Op::Gte, value)
    }

    pub fn lt<T>(self, value: impl Into<Literal>) -> Expr<T> {
        self.compare(Op::Lt, value)
    }

    pub fn lte<T>(self, value: impl Into<Literal>) -> Expr<T> {
        self.compare(Op::Lte, value)
    }

    pub fn before<T>(self, ts: Timestamp) -> Expr<T> {
        self.compare(Op::Before, ts)
    }

    pub fn after<T>(self, ts: Timestamp) -> Expr<T> {
        self.compare(Op::After, ts)
    }

    pub fn is<T>(self, value: bool) -> Expr<T> {
        self.compare(Op::Is, value)
    }

    pub fn is_in<T, I>(self, values: I) -> Expr<T>
    where
        I: IntoIterator<Item = u32>,
    {
        self.compare(Op::In, values.into_iter().collect::<Vec<u32>>())
    }

    /// Regex match. Returns an error if the pattern is invalid.
    pub fn matches<T>(self, pattern: &str) -> Result<Expr<T>> {
        let regex = Regex::new(pattern)?;
        Ok(self.compare(Op::Regex, regex))
    }
}

// ============================================================================
// Lambdas
// ============================================================================

/// How the right-hand lambda of a merge is attached to the left parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Rewrite the right body to reference the left parameter.
    #[default]
    Substitute,
    /// Wrap the right lambda in an `Invoke` fed the left parameter.
    Invoke,
}

/// Connective used when merging two lambdas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// A single-parameter boolean expression: `param => body`.
pub struct Lambda<T> {
    param: Param,
    body: Expr<T>,
}

impl<T> Clone for Lambda<T> {
    fn clone(&self) -> Self {
        Lambda {
            param: self.param.clone(),
            body: self.body.clone(),
        }
    }
}

impl<T> Lambda<T> {
    /// Builds a lambda over a fresh parameter named `name`.
    pub fn new(name: &str, build: impl FnOnce(&Param) -> Expr<T>) -> Self {
        let param = Param::new(name);
        let body = build(&param);
        Lambda { param, body }
    }

    pub fn from_parts(param: Param, body: Expr<T>) -> Self {
        Lambda { param, body }
    }

    /// `_ => value`.
    pub fn constant(value: bool) -> Self {
        Lambda::new("_", |_| Expr::Const(value))
    }

    /// Bridges an opaque predicate: `candidate => label(candidate)`.
    pub fn opaque(label: impl Into<String>, predicate: Arc<dyn Specification<T>>) -> Self {
        Lambda::new("candidate", |p| Expr::Call(Call::new(p, label, predicate)))
    }

    pub fn param(&self) -> &Param {
        &self.param
    }

    pub fn body(&self) -> &Expr<T> {
        &self.body
    }

    pub fn into_parts(self) -> (Param, Expr<T>) {
        (self.param, self.body)
    }

    /// The body, rewritten to reference `param` instead of this lambda's parameter.
    pub fn rebind(self, param: &Param) -> Expr<T> {
        if &self.param == param {
            return self.body;
        }
        self.body.substitute(&self.param, param)
    }

    /// `(self)(param)` as an un-inlined invocation node.
    pub fn invoke_with(self, param: &Param) -> Expr<T> {
        Expr::Invoke(Box::new(self), param.clone())
    }

    /// `param => !body`, keeping the same parameter.
    pub fn negate(self) -> Lambda<T> {
        Lambda {
            param: self.param,
            body: self.body.negate(),
        }
    }

    /// Merges two lambdas into one over the left lambda's parameter.
    pub fn merge(
        left: Lambda<T>,
        right: Lambda<T>,
        op: LogicalOp,
        strategy: MergeStrategy,
    ) -> Lambda<T> {
        let Lambda { param, body } = left;
        let right = match strategy {
            MergeStrategy::Substitute => right.rebind(&param),
            MergeStrategy::Invoke => right.invoke_with(&param),
        };
        let body = match op {
            LogicalOp::And => body.and(right),
            LogicalOp::Or => body.or(right),
        };
        Lambda { param, body }
    }

    pub fn inline_invocations(self) -> Lambda<T> {
        Lambda {
            param: self.param,
            body: self.body.inline_invocations(),
        }
    }

    /// Parameters referenced by the body that are neither this lambda's
    /// parameter nor bound by a nested invocation.
    pub fn free_params(&self) -> Vec<Param> {
        let mut bound = vec![self.param.clone()];
        let mut free = Vec::new();
        self.body.collect_free(&mut bound, &mut free);
        free
    }

    pub fn contains_invocation(&self) -> bool {
        self.body.contains_invocation()
    }

    pub fn depth(&self) -> usize {
        self.body.depth()
    }

    pub fn node_count(&self) -> usize {
        self.body.node_count()
    }
}

impl<T: Entity + 'static> Lambda<T> {
    /// Lowers the tree into an executable predicate.
    ///
    /// Trees deeper than [`MAX_EXPRESSION_DEPTH`] are rejected with
    /// [`SpecError::ExpressionTooDeep`]. Invocations are then inlined; any
    /// parameter left that is not this lambda's own is an
    /// [`SpecError::UnboundParameter`]. Nothing is cached, so every call
    /// pays for the full lowering.
    pub fn compile(&self) -> Result<CompiledPredicate<T>> {
        if self.depth() > MAX_EXPRESSION_DEPTH {
            return Err(SpecError::ExpressionTooDeep {
                max: MAX_EXPRESSION_DEPTH,
            });
        }
        let flat = self.clone().inline_invocations();
        if let Some(param) = flat.free_params().into_iter().next() {
            return Err(SpecError::UnboundParameter {
                param: param.name().to_string(),
            });
        }
        trace!(param = %flat.param, nodes = flat.node_count(), "compiling expression");
        let Lambda { param, body } = flat;
        Ok(CompiledPredicate {
            param,
            eval: lower(body),
        })
    }
}

impl<T> fmt::Display for Lambda<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.param, self.body)
    }
}

impl<T> fmt::Debug for Lambda<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lambda({})", self)
    }
}

type Eval<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// An executable predicate produced by [`Lambda::compile`].
pub struct CompiledPredicate<T> {
    param: Param,
    eval: Eval<T>,
}

impl<T> CompiledPredicate<T> {
    pub fn call(&self, candidate: &T) -> bool {
        (self.eval)(candidate)
    }

    pub fn param(&self) -> &Param {
        &self.param
    }
}

// Every parameter left after validation stands for the same candidate.
fn lower<T: Entity + 'static>(expr: Expr<T>) -> Eval<T> {
    match expr {
        Expr::Const(b) => Box::new(move |_: &T| b),
        Expr::Compare(c) => {
            Box::new(move |candidate: &T| c.matches(&candidate.field_value(&c.field)))
        }
        Expr::Not(e) => {
            let inner = lower(*e);
            Box::new(move |candidate: &T| !inner(candidate))
        }
        Expr::AndAlso(l, r) => {
            let (l, r) = (lower(*l), lower(*r));
            Box::new(move |candidate: &T| l(candidate) && r(candidate))
        }
        Expr::OrElse(l, r) => {
            let (l, r) = (lower(*l), lower(*r));
            Box::new(move |candidate: &T| l(candidate) || r(candidate))
        }
        Expr::Invoke(lambda, _) => lower(lambda.body),
        Expr::Call(call) => {
            Box::new(move |candidate: &T| call.predicate.is_satisfied_by(candidate))
        }
    }
}
