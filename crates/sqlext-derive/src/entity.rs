//! `#[derive(Entity)]`: static field table and value accessor.

mod attrs;

use crate::common::syn_types::{TypeKind, detect_kind};
use attrs::{get_field_attr, get_table_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let table = match get_table_name(&input)? {
        Some(table) => quote! { ::std::option::Option::Some(#table) },
        None => quote! { ::std::option::Option::None },
    };

    let mut defs = Vec::with_capacity(fields.len());
    let mut value_arms = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        // raw identifiers (`r#type`) are declared without the prefix
        let field_name = field_ident.to_string().trim_start_matches("r#").to_string();
        let attr = get_field_attr(field)?;

        if attr.inverse && attr.not_mapped {
            return Err(syn::Error::new_spanned(
                field,
                "a field cannot be both `inverse` and `not_mapped`",
            ));
        }

        let detected = detect_kind(&field.ty);
        let kind = format_ident!(
            "{}",
            if attr.is_enum { "Enum" } else { detected.field_kind() }
        );

        let mut def = quote! {
            ::sqlext::FieldDef::new(#field_name, ::sqlext::FieldKind::#kind)
        };
        if let Some(column) = &attr.column {
            def.extend(quote! { .column(#column) });
        }
        if attr.key {
            def.extend(quote! { .key() });
        }
        if attr.required {
            def.extend(quote! { .required() });
        }
        if let Some(max) = attr.max_length {
            def.extend(quote! { .max_length(#max) });
        }
        if attr.select {
            def.extend(quote! { .select() });
        }
        if attr.not_mapped {
            def.extend(quote! { .not_mapped() });
        }
        if attr.inverse {
            def.extend(quote! { .inverse() });
        }

        let readable = attr.is_enum || attr.value || detected.has_value();
        if readable && !attr.inverse && !attr.not_mapped {
            value_arms.push(quote! {
                #field_name => ::std::option::Option::Some(
                    ::sqlext::ToValue::to_value(&self.#field_ident)
                ),
            });
        } else if detected == TypeKind::Unsupported && attr.key {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "key fields must have a supported type or be marked `value`",
            ));
        } else {
            def.extend(quote! { .unreadable() });
        }
        defs.push(def);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::sqlext::Entity for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
            const TABLE: ::std::option::Option<&'static str> = #table;
            const FIELDS: &'static [::sqlext::FieldDef] = &[#(#defs),*];

            fn value(&self, field: &str) -> ::std::option::Option<::sqlext::Value> {
                match field {
                    #(#value_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    })
}
