//! Proc macros for specwise.
//!
//! - [`Entity`] - Implement `specwise::Entity` from struct fields

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod entity;

/// Derives `specwise::Entity`, exposing struct fields to expressions by name.
///
/// Fields of plain std types are picked up automatically. Other fields need
/// an explicit kind, and fields with neither are left out.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | String field, anything `AsRef<str>` |
/// | `Number` | Numeric field, anything `specwise::Number: From<_>` and `Copy` |
/// | `Timestamp` | Datetime field, requires `AsTimestamp` |
/// | `Enum` | Enum field, requires `AsDiscriminant` |
/// | `Bool` | Boolean field |
/// | `kind = "..."` | Kind given as a string, for keywords such as `enum` |
/// | `skip` | Never exposed |
/// | `rename = "..."` | Name used in expressions |
///
/// `Option<T>` fields read as `Value::None` when empty.
///
/// # Generated Code
///
/// 1. Field name constants (e.g. `Taxi::LICENSE`) and `Taxi::FIELDS`
/// 2. `impl specwise::Entity for Taxi`
///
/// # Example
///
/// ```ignore
/// use specwise::{Entity, Lambda, Spec, Timestamp};
///
/// #[derive(Entity)]
/// struct Taxi {
///     license: String,
///     created_at: Timestamp,
///     #[field(skip)]
///     notes: String,
/// }
///
/// let old = Spec::from_lambda(Lambda::<Taxi>::new("taxi", |t| {
///     t.field(Taxi::CREATED_AT).before(Timestamp::now())
/// }));
/// ```
#[proc_macro_derive(Entity, attributes(field))]
pub fn entity_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::entity_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
