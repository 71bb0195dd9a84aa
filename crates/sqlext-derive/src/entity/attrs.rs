//! Attribute parsing for the Entity derive macro.
//!
//! Handles struct-level and field-level `#[sqlext(...)]` attributes.

use syn::ext::IdentExt;
use syn::{DeriveInput, Result};

/// Parsed field-level attributes.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct FieldAttr {
    pub column: Option<String>,
    pub key: bool,
    pub required: bool,
    pub max_length: Option<usize>,
    pub select: bool,
    pub not_mapped: bool,
    pub inverse: bool,
    pub is_enum: bool,
    pub value: bool,
}

impl FieldAttr {
    /// Fold a later attribute into this one.
    fn merge(&mut self, other: FieldAttr) {
        if other.column.is_some() {
            self.column = other.column;
        }
        if other.max_length.is_some() {
            self.max_length = other.max_length;
        }
        self.key |= other.key;
        self.required |= other.required;
        self.select |= other.select;
        self.not_mapped |= other.not_mapped;
        self.inverse |= other.inverse;
        self.is_enum |= other.is_enum;
        self.value |= other.value;
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            // `enum` is a keyword
            let ident = syn::Ident::parse_any(input)?;

            match ident.to_string().as_str() {
                "key" => attr.key = true,
                "required" => attr.required = true,
                "select" => attr.select = true,
                "not_mapped" => attr.not_mapped = true,
                "inverse" => attr.inverse = true,
                "enum" => attr.is_enum = true,
                "value" => attr.value = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let lit: syn::LitStr = input.parse()?;
                    attr.column = Some(lit.value());
                }
                "max_length" => {
                    let _: syn::Token![=] = input.parse()?;
                    let lit: syn::LitInt = input.parse()?;
                    attr.max_length = Some(lit.base10_parse()?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown sqlext field attribute `{other}`"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if !input.is_empty() {
            return Err(input.error("expected `,`"));
        }
        Ok(attr)
    }
}

/// Collect every `#[sqlext(...)]` on a field.
pub(super) fn get_field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if attr.path().is_ident("sqlext") {
            merged.merge(attr.parse_args::<FieldAttr>()?);
        }
    }
    Ok(merged)
}

/// Extract table name from struct-level `#[sqlext(table = "...")]` attribute.
pub(super) fn get_table_name(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("sqlext") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                table = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unknown sqlext struct attribute"))
            }
        })?;
    }
    Ok(table)
}
