//! Implementation of `#[derive(Entity)]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{option_inner, parse_field_attrs, FieldKind};

pub fn entity_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Entity can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Entity can only be derived for structs",
            ))
        }
    };

    let mut arms = Vec::new();
    let mut constants = Vec::new();
    let mut names = Vec::new();

    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let inner = option_inner(&field.ty);
        let value_ty = inner.unwrap_or(&field.ty);
        let kind = match attrs.kind.or_else(|| FieldKind::infer(value_ty)) {
            Some(kind) => kind,
            // Not comparable and not annotated: left out.
            None => continue,
        };

        let field_name = attrs.rename.unwrap_or_else(|| ident.to_string());
        let const_name = format_ident!("{}", to_screaming_snake_case(&field_name));
        constants.push(quote! {
            pub const #const_name: &'static str = #field_name;
        });

        let value = if inner.is_some() {
            let some = value_expr(kind, quote! { value });
            quote! {
                match &self.#ident {
                    ::core::option::Option::Some(value) => #some,
                    ::core::option::Option::None => ::specwise::Value::None,
                }
            }
        } else {
            value_expr(kind, quote! { &self.#ident })
        };
        arms.push(quote! { #field_name => #value, });
        names.push(field_name);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            #(#constants)*

            /// Names of every field exposed to expressions.
            pub const FIELDS: &'static [&'static str] = &[#(#names),*];
        }

        impl #impl_generics ::specwise::Entity for #name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::specwise::Value<'_> {
                match field {
                    #(#arms)*
                    _ => ::specwise::Value::None,
                }
            }
        }
    })
}

// `reference` evaluates to `&FieldType`.
fn value_expr(kind: FieldKind, reference: TokenStream) -> TokenStream {
    match kind {
        FieldKind::String => quote! {
            ::specwise::Value::String(::core::convert::AsRef::<str>::as_ref(#reference))
        },
        FieldKind::Number => quote! {
            ::specwise::Value::Number(::specwise::Number::from(*#reference))
        },
        FieldKind::Timestamp => quote! {
            ::specwise::Value::Timestamp(::specwise::AsTimestamp::as_timestamp(#reference))
        },
        FieldKind::Enum => quote! {
            ::specwise::Value::Enum(::specwise::AsDiscriminant::discriminant(#reference))
        },
        FieldKind::Bool => quote! { ::specwise::Value::Bool(*#reference) },
    }
}

fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}
