//! Field comparisons: the leaves of an expression tree.
//!
//! A [`Comparison`] reads one field of a parameter and tests it against an
//! owned [`Literal`]. These are the only nodes a query backend needs to
//! understand besides the logical connectives.

use std::fmt;

use regex::Regex;

use crate::op::Op;
use crate::param::Param;
use crate::value::{Number, Timestamp, Value};

/// `param.field <op> value`.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// The parameter whose field is read.
    pub param: Param,
    /// The field name.
    pub field: String,
    /// The comparison operator.
    pub op: Op,
    /// The value to compare against.
    pub value: Literal,
}

impl Comparison {
    pub fn new(param: &Param, field: impl Into<String>, op: Op, value: impl Into<Literal>) -> Self {
        Comparison {
            param: param.clone(),
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluates this comparison against a field value.
    ///
    /// Missing fields and type mismatches never match, whatever the operator.
    pub fn matches(&self, field_value: &Value<'_>) -> bool {
        match (&self.value, field_value) {
            (Literal::String(pattern), Value::String(s)) => self.match_string(s, pattern),
            (Literal::Regex(regex), Value::String(s)) => {
                matches!(self.op, Op::Regex) && regex.is_match(s)
            }
            (Literal::Number(literal), Value::Number(field)) => field
                .compare(*literal)
                .map(|ordering| self.op.eval_ordering(ordering))
                .unwrap_or(false),
            (Literal::Timestamp(literal), Value::Timestamp(field)) => {
                self.op.eval_ordering(field.cmp(literal))
            }
            (Literal::Enum(literal), Value::Enum(field)) => match self.op.normalize() {
                Op::Eq => field == literal,
                Op::Ne => field != literal,
                _ => false,
            },
            (Literal::EnumSet(set), Value::Enum(field)) => {
                matches!(self.op, Op::In) && set.contains(field)
            }
            (Literal::Bool(literal), Value::Bool(field)) => match self.op.normalize() {
                Op::Eq => field == literal,
                Op::Ne => field != literal,
                _ => false,
            },
            _ => false,
        }
    }

    fn match_string(&self, field: &str, pattern: &str) -> bool {
        match self.op.normalize() {
            Op::Eq => field == pattern,
            Op::Ne => field != pattern,
            Op::EqIgnoreCase => field.eq_ignore_ascii_case(pattern),
            Op::StartsWith => field.starts_with(pattern),
            Op::EndsWith => field.ends_with(pattern),
            Op::Contains => field.contains(pattern),
            _ => false,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {} {}", self.param, self.field, self.op, self.value)
    }
}

/// Owned comparison value stored inside an expression.
#[derive(Debug, Clone)]
pub enum Literal {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    /// Single enum discriminant.
    Enum(u32),
    /// Set of enum discriminants, for `In`.
    EnumSet(Vec<u32>),
    Bool(bool),
    /// Compiled regular expression.
    Regex(Regex),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Number(Number::I64(n)) => write!(f, "{}", n),
            Literal::Number(Number::U64(n)) => write!(f, "{}", n),
            Literal::Number(Number::F64(n)) => write!(f, "{}", n),
            Literal::Timestamp(ts) => write!(f, "@{}", ts.as_millis()),
            Literal::Enum(d) => write!(f, "#{}", d),
            Literal::EnumSet(set) => write!(f, "{:?}", set),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Regex(r) => write!(f, "/{}/", r.as_str()),
        }
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<Number> for Literal {
    fn from(n: Number) -> Self {
        Literal::Number(n)
    }
}

impl From<Timestamp> for Literal {
    fn from(t: Timestamp) -> Self {
        Literal::Timestamp(t)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<Regex> for Literal {
    fn from(r: Regex) -> Self {
        Literal::Regex(r)
    }
}

impl From<Vec<u32>> for Literal {
    fn from(v: Vec<u32>) -> Self {
        Literal::EnumSet(v)
    }
}

macro_rules! literal_from_number {
    ($($source:ty),+) => {
        $(
            impl From<$source> for Literal {
                fn from(n: $source) -> Self {
                    Literal::Number(Number::from(n))
                }
            }
        )+
    };
}

literal_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
