//! Resolution of specifications from a caller-supplied filter object.

use crate::sort::SortSpec;
use crate::spec::Spec;

/// Builds the filter and sort rules for a filter object `F`, typically a
/// request DTO, so call sites never assemble specifications by hand.
///
/// ```
/// use specwise::{Entity, Lambda, SortSpec, Spec, SpecificationFactory, Value};
///
/// struct Taxi { license: String }
///
/// impl Entity for Taxi {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "license" => Value::String(&self.license),
///             _ => Value::None,
///         }
///     }
/// }
///
/// struct TaxiFilter { license: Option<String>, newest_first: bool }
///
/// struct Taxis;
///
/// impl SpecificationFactory<Taxi, TaxiFilter> for Taxis {
///     fn specification(&self, filter: &TaxiFilter) -> Spec<Taxi> {
///         let lambda = match &filter.license {
///             Some(l) => Lambda::new("t", |t| t.field("license").contains(l)),
///             None => Lambda::constant(true),
///         };
///         Spec::from_lambda(lambda)
///     }
///
///     fn sort_specification(&self, filter: &TaxiFilter) -> Option<SortSpec<Taxi>> {
///         filter.newest_first.then(|| SortSpec::desc("created_at"))
///     }
/// }
///
/// let request = TaxiFilter { license: Some("DEFAULT".into()), newest_first: false };
/// let spec = Taxis.specification(&request);
/// assert!(spec.is_satisfied_by(&Taxi { license: "X_DEFAULT".into() }));
/// assert!(Taxis.sort_specification(&request).is_none());
/// ```
pub trait SpecificationFactory<T, F> {
    fn specification(&self, filter: &F) -> Spec<T>;

    /// Sort order for `filter`, or `None` to keep the source order.
    fn sort_specification(&self, filter: &F) -> Option<SortSpec<T>> {
        let _ = filter;
        None
    }
}
