//! Translation of expression trees into a backend-neutral filter.
//!
//! [`translate`] is what a query provider does with a specification's
//! expression: it walks the tree and emits something the data source
//! understands. Here that is [`Filter`], a serde-serialisable form with one
//! node per connective and one per field comparison. Anything the walk
//! cannot express is an error, never a silent fallback to in-memory
//! evaluation.
//!
//! ```
//! use specwise::{translate, Filter, Lambda, TranslateOptions};
//!
//! # struct Taxi;
//! let lambda = Lambda::<Taxi>::new("taxi", |t| t.field("license").contains("DEFAULT"));
//! let filter = translate(&lambda, &TranslateOptions::default()).unwrap();
//! assert!(matches!(filter, Filter::Compare { ref field, .. } if field == "license"));
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::comparison::{Comparison, Literal};
use crate::error::{Result, SpecError};
use crate::expr::{Expr, Lambda};
use crate::op::Op;
use crate::param::Param;
use crate::value::{Number, Timestamp};

/// Wire form of a translated predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    Const {
        value: bool,
    },
    Compare {
        field: String,
        op: Op,
        value: FilterValue,
    },
    Not {
        filter: Box<Filter>,
    },
    And {
        left: Box<Filter>,
        right: Box<Filter>,
    },
    Or {
        left: Box<Filter>,
        right: Box<Filter>,
    },
}

/// Literal carried by a [`Filter::Compare`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    Enum(u32),
    EnumSet(Vec<u32>),
    Bool(bool),
    /// Regex pattern source.
    Regex(String),
}

impl From<&Literal> for FilterValue {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::String(s) => FilterValue::String(s.clone()),
            Literal::Number(n) => FilterValue::Number(*n),
            Literal::Timestamp(t) => FilterValue::Timestamp(*t),
            Literal::Enum(d) => FilterValue::Enum(*d),
            Literal::EnumSet(set) => FilterValue::EnumSet(set.clone()),
            Literal::Bool(b) => FilterValue::Bool(*b),
            Literal::Regex(r) => FilterValue::Regex(r.as_str().to_string()),
        }
    }
}

impl FilterValue {
    fn to_literal(&self) -> Result<Literal> {
        Ok(match self {
            FilterValue::String(s) => Literal::String(s.clone()),
            FilterValue::Number(n) => Literal::Number(*n),
            FilterValue::Timestamp(t) => Literal::Timestamp(*t),
            FilterValue::Enum(d) => Literal::Enum(*d),
            FilterValue::EnumSet(set) => Literal::EnumSet(set.clone()),
            FilterValue::Bool(b) => Literal::Bool(*b),
            FilterValue::Regex(pattern) => Literal::Regex(Regex::new(pattern)?),
        })
    }
}

/// Translator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Inline `Invoke` nodes before walking. When off, any invocation left
    /// in the tree is an error, as with backends that cannot flatten them.
    pub flatten_invocations: bool,
    /// Deepest tree accepted, counted after flattening.
    pub max_depth: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions {
            flatten_invocations: true,
            max_depth: 64,
        }
    }
}

impl TranslateOptions {
    pub fn flatten_invocations(mut self, flatten: bool) -> Self {
        self.flatten_invocations = flatten;
        self
    }

    pub fn max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }
}

/// Translates a lambda into a [`Filter`].
pub fn translate<T>(lambda: &Lambda<T>, options: &TranslateOptions) -> Result<Filter> {
    let lambda = if options.flatten_invocations {
        lambda.clone().inline_invocations()
    } else if lambda.contains_invocation() {
        return Err(SpecError::UnflattenedInvocation);
    } else {
        lambda.clone()
    };

    let depth = lambda.depth();
    if depth > options.max_depth {
        return Err(SpecError::ExpressionTooDeep {
            max: options.max_depth,
        });
    }
    if let Some(param) = lambda.free_params().into_iter().next() {
        return Err(SpecError::UnboundParameter {
            param: param.name().to_string(),
        });
    }

    let filter = lower(lambda.body())?;
    debug!(param = %lambda.param(), depth, "translated expression");
    Ok(filter)
}

fn lower<T>(expr: &Expr<T>) -> Result<Filter> {
    Ok(match expr {
        Expr::Const(value) => Filter::Const { value: *value },
        Expr::Compare(c) => Filter::Compare {
            field: c.field.clone(),
            op: c.op,
            value: FilterValue::from(&c.value),
        },
        Expr::Not(e) => Filter::Not {
            filter: Box::new(lower(e)?),
        },
        Expr::AndAlso(l, r) => Filter::And {
            left: Box::new(lower(l)?),
            right: Box::new(lower(r)?),
        },
        Expr::OrElse(l, r) => Filter::Or {
            left: Box::new(lower(l)?),
            right: Box::new(lower(r)?),
        },
        Expr::Invoke(..) => return Err(SpecError::UnflattenedInvocation),
        Expr::Call(call) => {
            return Err(SpecError::Untranslatable {
                label: call.label.clone(),
            })
        }
    })
}

impl Filter {
    /// Rebuilds an expression from a received filter, over a fresh
    /// parameter called `name`.
    pub fn to_lambda<T>(&self, name: &str) -> Result<Lambda<T>> {
        let param = Param::new(name);
        let body = self.raise(&param)?;
        Ok(Lambda::from_parts(param, body))
    }

    fn raise<T>(&self, param: &Param) -> Result<Expr<T>> {
        Ok(match self {
            Filter::Const { value } => Expr::Const(*value),
            Filter::Compare { field, op, value } => {
                Expr::Compare(Comparison::new(param, field.clone(), *op, value.to_literal()?))
            }
            Filter::Not { filter } => filter.raise(param)?.negate(),
            Filter::And { left, right } => left.raise(param)?.and(right.raise(param)?),
            Filter::Or { left, right } => left.raise(param)?.or(right.raise(param)?),
        })
    }

    /// Number of nodes in the filter.
    pub fn node_count(&self) -> usize {
        match self {
            Filter::Const { .. } | Filter::Compare { .. } => 1,
            Filter::Not { filter } => 1 + filter.node_count(),
            Filter::And { left, right } | Filter::Or { left, right } => {
                1 + left.node_count() + right.node_count()
            }
        }
    }
}
