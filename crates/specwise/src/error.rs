//! Error types for the specwise crate.

use thiserror::Error;

/// Errors raised while building, compiling, translating or running specifications.
///
/// Every variant is a caller error surfaced at the point of construction or
/// call. Nothing here is retried or downgraded by the engine.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A required operand of a combinator was missing.
    #[error("missing operand: {name}")]
    MissingOperand { name: &'static str },

    /// A specification was evaluated without a candidate.
    #[error("missing candidate: a specification cannot be evaluated against nothing")]
    MissingCandidate,

    /// An expression references a parameter that is not in scope.
    #[error("expression references unbound parameter '{param}'")]
    UnboundParameter { param: String },

    /// An expression contains an opaque predicate that no query backend can run.
    #[error("opaque predicate '{label}' cannot be translated")]
    Untranslatable { label: String },

    /// An expression still contains an invocation node and flattening is disabled.
    #[error("expression contains an un-inlined invocation")]
    UnflattenedInvocation,

    /// A specification or expression is nested deeper than the engine accepts.
    #[error("expression depth exceeds maximum of {max}")]
    ExpressionTooDeep { max: usize },

    /// A specification has no expression form and cannot be pushed to a data source.
    #[error("specification has no expression form")]
    NotQueryable,

    /// Paging preconditions were violated.
    #[error("invalid page request: offset {offset} and limit {limit} must both be >= 1")]
    InvalidPage { offset: usize, limit: usize },

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Result type for specwise operations.
pub type Result<T> = std::result::Result<T, SpecError>;
