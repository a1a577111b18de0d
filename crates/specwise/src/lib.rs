//! Specwise - composable business rules, evaluated in memory or translated.
//!
//! A specification is a reusable boolean rule over an entity type. Rules
//! combine with `and`, `or`, `not`, `and_not` and `or_not` into new rules,
//! and every rule can be used two ways:
//!
//! - **In memory**: [`Spec::is_satisfied_by`] evaluates a candidate you
//!   already hold, with left-to-right short-circuiting.
//! - **As an expression**: [`Spec::as_expression`] returns a single-parameter
//!   [`Lambda`] that a query backend can [`translate`] instead of loading
//!   every record first.
//!
//! # Quick Start
//!
//! ```rust
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
//! struct LicenseContains(String);
//!
//! impl ExpressionSpecification<Taxi> for LicenseContains {
//!     fn as_expression(&self) -> Lambda<Taxi> {
//!         Lambda::new("taxi", |t| t.field("license").contains(&self.0))
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
//! let rule = Spec::expression(LicenseContains("DEFAULT_LICENSE".into()))
//!     .and(&Spec::expression(CreatedBefore(now)));
//!
//! let taxi = Taxi { license: "DEFAULT_LICENSE".into(), created_at: now.offset_days(-10) };
//! assert!(rule.is_satisfied_by(&taxi));
//!
//! // One parameter, no nested invocations: ready for a query backend.
//! let lambda = rule.as_expression().unwrap();
//! assert!(lambda.free_params().is_empty());
//! assert!(!lambda.contains_invocation());
//! ```
//!
//! # Strategies
//!
//! The receiver of a combinator picks the strategy of the result:
//!
//! | Receiver | Result | `is_satisfied_by` | `as_expression` |
//! |----------|--------|-------------------|-----------------|
//! | expression spec or expression composite | expression composite | compiles the merged tree per call | merged tree |
//! | opaque predicate or in-memory composite | in-memory composite | combines operand booleans | `None` |
//!
//! Opaque operands of an expression composite are bridged as opaque calls:
//! the tree still evaluates in memory but no longer translates.
//!
//! # Field Types and Operators
//!
//! | Type | Operators |
//! |------|-----------|
//! | String | `Eq`, `Ne`, `EqIgnoreCase`, `StartsWith`, `EndsWith`, `Contains`, `Regex` |
//! | Number | `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte` |
//! | Timestamp | `Eq`, `Ne`, `Before`, `After`, `Gt`, `Gte`, `Lt`, `Lte` |
//! | Enum | `Eq`, `Ne`, `In` |
//! | Bool | `Eq`, `Ne`, `Is` |

mod comparison;
mod composite;
mod entity;
mod error;
mod expr;
mod factory;
mod op;
mod param;
mod sort;
mod spec;
mod store;
mod translate;
mod value;

pub mod in_memory;
pub mod queryable;

// Re-export public API
pub use comparison::{Comparison, Literal};
pub use composite::{Composite, Connective};
pub use entity::{AsDiscriminant, AsTimestamp, Entity};
pub use error::{Result, SpecError};
pub use expr::{
    Call, CompiledPredicate, Expr, Field, Lambda, LogicalOp, MergeStrategy, MAX_EXPRESSION_DEPTH,
};
pub use factory::SpecificationFactory;
pub use op::Op;
pub use param::Param;
pub use sort::{compare_values, Dir, FieldSelector, SortSpec};
pub use spec::{ExpressionSpecification, Spec, Specification, MAX_NESTING};
pub use store::{MemoryStore, Page};
pub use translate::{translate, Filter, FilterValue, TranslateOptions};
pub use value::{Number, Timestamp, Value};

#[cfg(feature = "derive")]
pub use specwise_macros::Entity;
