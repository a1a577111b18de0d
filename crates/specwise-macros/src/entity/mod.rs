//! `#[derive(Entity)]`: field access for specwise expressions, generated
//! from struct annotations and field types.

mod attrs;
mod derive;

pub use derive::entity_derive_impl;
