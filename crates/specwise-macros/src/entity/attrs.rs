//! Parsing of `#[field(...)]` attributes and inference of field kinds.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, GenericArgument, Ident, Lit, Meta, PathArguments, Result, Token, Type,
};

/// How a struct field is exposed as a `specwise::Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
}

const EXPECTED: &str = "String, Number, Timestamp, Enum, Bool";

impl FieldKind {
    fn from_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(FieldKind::String),
            "Number" | "number" => Ok(FieldKind::Number),
            "Timestamp" | "timestamp" => Ok(FieldKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(FieldKind::Enum),
            "Bool" | "bool" | "boolean" => Ok(FieldKind::Bool),
            other => Err(Error::new(
                span,
                format!("unknown field kind '{}', expected one of: {}", other, EXPECTED),
            )),
        }
    }

    fn from_ident(ident: &Ident) -> Result<Self> {
        FieldKind::from_name(&ident.to_string(), ident.span())
    }

    /// Infers the kind from a field's Rust type. Only plain std types are
    /// recognised; anything else needs an explicit kind.
    pub fn infer(ty: &Type) -> Option<Self> {
        let ident = last_ident(ty)?;
        match ident.to_string().as_str() {
            "String" | "str" => Some(FieldKind::String),
            "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize"
            | "f32" | "f64" => Some(FieldKind::Number),
            "bool" => Some(FieldKind::Bool),
            "Timestamp" | "SystemTime" => Some(FieldKind::Timestamp),
            _ => None,
        }
    }
}

fn last_ident(ty: &Type) -> Option<&Ident> {
    match ty {
        Type::Path(p) => p.path.segments.last().map(|s| &s.ident),
        Type::Reference(r) => last_ident(&r.elem),
        _ => None,
    }
}

/// The `T` of an `Option<T>` field type.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(p) = ty else {
        return None;
    };
    let segment = p.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Field-level attributes from `#[field(...)]`.
#[derive(Debug, Clone, Default)]
pub struct FieldAttr {
    /// Explicit kind; inferred from the type when absent.
    pub kind: Option<FieldKind>,
    /// Never exposed.
    pub skip: bool,
    /// Name used in expressions (default: the Rust field name).
    pub rename: Option<String>,
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) => {
                    let ident = p.get_ident().ok_or_else(|| {
                        Error::new(
                            p.span(),
                            format!("expected a field kind ({}) or skip", EXPECTED),
                        )
                    })?;
                    attr.kind = Some(FieldKind::from_ident(ident)?);
                }
                Meta::NameValue(nv) => {
                    let Some(value) = string_literal(&nv.value) else {
                        return Err(Error::new(nv.value.span(), "expected a string literal"));
                    };
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(value.value());
                    } else if nv.path.is_ident("kind") {
                        attr.kind = Some(FieldKind::from_name(&value.value(), value.span())?);
                    } else {
                        return Err(Error::new(nv.path.span(), "expected rename or kind"));
                    }
                }
                Meta::List(_) => {
                    return Err(Error::new(meta.span(), "nested lists are not supported"));
                }
            }
        }

        Ok(attr)
    }
}

fn string_literal(expr: &syn::Expr) -> Option<&syn::LitStr> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Some(s),
        _ => None,
    }
}

/// Reads the `#[field(...)]` attribute of a struct field, if any.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    match attrs.iter().find(|a| a.path().is_ident("field")) {
        Some(attr) => attr.parse_args::<FieldAttr>(),
        None => Ok(FieldAttr::default()),
    }
}
