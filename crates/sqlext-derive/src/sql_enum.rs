//! `#[derive(SqlEnum)]`: render a fieldless enum by ordinal.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(e) => &e.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "SqlEnum can only be derived for enums",
            ));
        }
    };

    if variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "SqlEnum requires at least one variant",
        ));
    }

    let mut arms = Vec::with_capacity(variants.len());
    for variant in variants {
        if !matches!(&variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "SqlEnum variants must be unit variants (no fields)",
            ));
        }
        let ident = &variant.ident;
        arms.push(quote! {
            #name::#ident => #name::#ident as i64,
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::sqlext::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> ::sqlext::Value {
                ::sqlext::Value::Enum(match self {
                    #(#arms)*
                })
            }
        }
    })
}
