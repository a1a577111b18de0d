//! Sort specifications: a field selector plus a direction.
//!
//! A [`SortSpec`] has no combinators. It names one field of the entity,
//! which a query backend orders by, and can compare two candidates in
//! memory the same way.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::param::Param;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `param => param.field`: the expression a sort is keyed on.
pub struct FieldSelector<T> {
    param: Param,
    field: String,
    _entity: PhantomData<fn(&T)>,
}

impl<T> FieldSelector<T> {
    pub fn new(name: &str, field: impl Into<String>) -> Self {
        FieldSelector {
            param: Param::new(name),
            field: field.into(),
            _entity: PhantomData,
        }
    }

    pub fn param(&self) -> &Param {
        &self.param
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl<T: Entity> FieldSelector<T> {
    /// Reads the selected field from a candidate.
    pub fn select<'a>(&self, candidate: &'a T) -> Value<'a> {
        candidate.field_value(&self.field)
    }
}

impl<T> Clone for FieldSelector<T> {
    fn clone(&self) -> Self {
        FieldSelector {
            param: self.param.clone(),
            field: self.field.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Display for FieldSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}.{}", self.param, self.param, self.field)
    }
}

impl<T> fmt::Debug for FieldSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldSelector({})", self)
    }
}

/// A field selector paired with a direction. Immutable once built.
///
/// ```
/// use specwise::{Entity, SortSpec, Value};
///
/// struct Taxi { license: &'static str }
///
/// impl Entity for Taxi {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "license" => Value::String(self.license),
///             _ => Value::None,
///         }
///     }
/// }
///
/// let by_license = SortSpec::<Taxi>::desc("license");
/// let mut taxis = vec![Taxi { license: "A" }, Taxi { license: "C" }, Taxi { license: "B" }];
/// taxis.sort_by(|a, b| by_license.compare(a, b));
/// assert_eq!(taxis[0].license, "C");
/// ```
pub struct SortSpec<T> {
    selector: FieldSelector<T>,
    dir: Dir,
}

impl<T> SortSpec<T> {
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        SortSpec {
            selector: FieldSelector::new("x", field),
            dir,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        SortSpec::new(field, Dir::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortSpec::new(field, Dir::Desc)
    }

    pub fn from_selector(selector: FieldSelector<T>, dir: Dir) -> Self {
        SortSpec { selector, dir }
    }

    /// The key selector expression.
    pub fn as_expression(&self) -> &FieldSelector<T> {
        &self.selector
    }

    pub fn is_ascending(&self) -> bool {
        self.dir.is_asc()
    }

    pub fn dir(&self) -> Dir {
        self.dir
    }
}

impl<T: Entity> SortSpec<T> {
    /// Compares two candidates by the selected field and direction.
    ///
    /// The order is total, so it is safe for `sort_by`. In ascending order
    /// NaN sorts after every other number and missing values sort last.
    /// Values of different types are ordered by type: strings, numbers,
    /// timestamps, enums, then booleans.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let (a, b) = (self.selector.select(a), self.selector.select(b));
        let ordering = compare_values(&a, &b).unwrap_or_else(|| type_rank(&a).cmp(&type_rank(&b)));
        self.dir.apply(ordering)
    }
}

impl<T> Clone for SortSpec<T> {
    fn clone(&self) -> Self {
        SortSpec {
            selector: self.selector.clone(),
            dir: self.dir,
        }
    }
}

impl<T> fmt::Display for SortSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order by {} {}", self.selector.field, self.dir)
    }
}

impl<T> fmt::Debug for SortSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SortSpec({})", self)
    }
}

/// Compares two values of the same type.
///
/// `None` sorts after everything and NaN after every other number. Returns
/// `None` only if the types don't match.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => match (a.is_nan(), b.is_nan()) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Greater),
            (false, true) => Some(Ordering::Less),
            (false, false) => a.compare(*b),
        },
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),

        (Value::None, Value::None) => Some(Ordering::Equal),
        (Value::None, _) => Some(Ordering::Greater),
        (_, Value::None) => Some(Ordering::Less),

        _ => None,
    }
}

fn type_rank(value: &Value<'_>) -> u8 {
    match value {
        Value::String(_) => 0,
        Value::Number(_) => 1,
        Value::Timestamp(_) => 2,
        Value::Enum(_) => 3,
        Value::Bool(_) => 4,
        Value::None => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Timestamp};

    struct Fare {
        amount: Option<i64>,
        at: Timestamp,
    }

    impl Entity for Fare {
        fn field_value(&self, field: &str) -> Value<'_> {
            match (field, self.amount) {
                ("amount", Some(n)) => Value::Number(Number::I64(n)),
                ("at", _) => Value::Timestamp(self.at),
                _ => Value::None,
            }
        }
    }

    fn fare(amount: Option<i64>, at: i64) -> Fare {
        Fare {
            amount,
            at: Timestamp(at),
        }
    }

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(Dir::default(), Dir::Asc);
    }

    #[test]
    fn compare_values_rules() {
        let none = Value::None;
        let some = Value::String("x");
        assert_eq!(compare_values(&none, &some), Some(Ordering::Greater));
        assert_eq!(compare_values(&some, &none), Some(Ordering::Less));
        assert_eq!(
            compare_values(&Value::Bool(false), &Value::Bool(true)),
            Some(Ordering::Less)
        );
        assert_eq!(compare_values(&some, &Value::Number(Number::I64(1))), None);

        let nan = Value::Number(Number::F64(f64::NAN));
        let one = Value::Number(Number::F64(1.0));
        assert_eq!(compare_values(&nan, &one), Some(Ordering::Greater));
        assert_eq!(compare_values(&one, &nan), Some(Ordering::Less));
        assert_eq!(compare_values(&nan, &nan), Some(Ordering::Equal));
        assert_eq!(compare_values(&nan, &none), Some(Ordering::Less));
    }

    struct Reading(Value<'static>);

    impl Entity for Reading {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "v" => self.0.clone(),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn nan_sorts_after_numbers() {
        let by_value = SortSpec::<Reading>::asc("v");
        let mut readings: Vec<_> = (0..200)
            .map(|i| {
                let v = if i % 3 == 0 { f64::NAN } else { ((i * 37) % 101) as f64 };
                Reading(Value::Number(Number::F64(v)))
            })
            .collect();
        readings.sort_by(|a, b| by_value.compare(a, b));

        let values: Vec<f64> = readings
            .iter()
            .map(|r| match r.0 {
                Value::Number(n) => n.to_f64(),
                _ => unreachable!(),
            })
            .collect();
        let first_nan = values.iter().position(|v| v.is_nan()).unwrap();
        assert!(values[..first_nan].windows(2).all(|w| w[0] <= w[1]));
        assert!(values[first_nan..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn mixed_types_sort_by_type() {
        let by_value = SortSpec::<Reading>::asc("v");
        let mut readings = vec![
            Reading(Value::None),
            Reading(Value::Bool(true)),
            Reading(Value::Number(Number::I64(2))),
            Reading(Value::String("b")),
            Reading(Value::Number(Number::I64(1))),
            Reading(Value::String("a")),
        ];
        readings.sort_by(|a, b| by_value.compare(a, b));
        let sorted: Vec<_> = readings.iter().map(|r| r.0.clone()).collect();
        assert_eq!(
            sorted,
            vec![
                Value::String("a"),
                Value::String("b"),
                Value::Number(Number::I64(1)),
                Value::Number(Number::I64(2)),
                Value::Bool(true),
                Value::None,
            ]
        );
    }

    #[test]
    fn sort_ascending_puts_missing_last() {
        let by_amount = SortSpec::<Fare>::asc("amount");
        let mut fares = vec![fare(Some(3), 0), fare(None, 0), fare(Some(1), 0)];
        fares.sort_by(|a, b| by_amount.compare(a, b));
        let amounts: Vec<_> = fares.iter().map(|f| f.amount).collect();
        assert_eq!(amounts, vec![Some(1), Some(3), None]);
        assert!(by_amount.is_ascending());
    }

    #[test]
    fn sort_descending() {
        let by_time = SortSpec::<Fare>::desc("at");
        let mut fares = vec![fare(None, 5), fare(None, 9), fare(None, 1)];
        fares.sort_by(|a, b| by_time.compare(a, b));
        let times: Vec<_> = fares.iter().map(|f| f.at.as_millis()).collect();
        assert_eq!(times, vec![9, 5, 1]);
        assert!(!by_time.is_ascending());
    }

    #[test]
    fn selector_expression() {
        let by_time = SortSpec::<Fare>::desc("at");
        assert_eq!(by_time.as_expression().field(), "at");
        assert_eq!(by_time.as_expression().to_string(), "x => x.at");
        assert_eq!(by_time.to_string(), "order by at desc");
    }
}
