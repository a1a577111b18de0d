//! Field access for entities that specifications are evaluated against.
//!
//! Expression trees never call into entity methods directly. Every field
//! comparison goes through [`Entity::field_value`], which is what lets the
//! same tree be evaluated in memory and handed to a query backend by name.

use std::time::SystemTime;

use crate::value::{Timestamp, Value};

/// Types whose fields can be read by name.
///
/// Usually derived with `#[derive(Entity)]` (feature `derive`), but the
/// manual form is short:
///
/// ```
/// use specwise::{Entity, Timestamp, Value};
///
/// struct Taxi {
///     license: String,
///     created_at: Timestamp,
/// }
///
/// impl Entity for Taxi {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "license" => Value::String(&self.license),
///             "created_at" => Value::Timestamp(self.created_at),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Entity {
    /// Returns the value of `field`, or [`Value::None`] if there is no such
    /// field or it cannot be compared.
    fn field_value(&self, field: &str) -> Value<'_>;
}

impl<E: Entity + ?Sized> Entity for &E {
    fn field_value(&self, field: &str) -> Value<'_> {
        (**self).field_value(field)
    }
}

/// Stable discriminant for enum-typed fields.
///
/// Use explicit values rather than declaration order so stored filters keep
/// their meaning when variants are added.
pub trait AsDiscriminant {
    fn discriminant(&self) -> u32;
}

/// Conversion of datetime-like field types into a [`Timestamp`].
pub trait AsTimestamp {
    fn as_timestamp(&self) -> Timestamp;
}

impl AsTimestamp for Timestamp {
    fn as_timestamp(&self) -> Timestamp {
        *self
    }
}

impl AsTimestamp for i64 {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl AsTimestamp for u64 {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl AsTimestamp for SystemTime {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cab {
        license: String,
    }

    impl Entity for Cab {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "license" => Value::String(&self.license),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn manual_entity_and_reference_forwarding() {
        let cab = Cab {
            license: "L-1".to_string(),
        };
        assert_eq!(cab.field_value("license"), Value::String("L-1"));
        assert_eq!((&cab).field_value("seats"), Value::None);
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(1000i64.as_timestamp(), Timestamp(1000));
        assert_eq!(u64::MAX.as_timestamp(), Timestamp(i64::MAX));
        assert_eq!(Timestamp(7).as_timestamp(), Timestamp(7));
    }
}
