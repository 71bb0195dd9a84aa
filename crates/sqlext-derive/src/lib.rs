//! Derive macros for sqlext
//!
//! Provides `#[derive(Entity)]` and `#[derive(SqlEnum)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod entity;
mod sql_enum;

/// Derive the `Entity` metadata for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use sqlext::Entity;
///
/// #[derive(Entity)]
/// #[sqlext(table = "PESSOA")]
/// struct Person {
///     #[sqlext(key)]
///     id: i32,
///     #[sqlext(column = "NOME", max_length = 80, required)]
///     name: String,
///     #[sqlext(enum)]
///     status: Status,
///     #[sqlext(inverse)]
///     orders: Vec<Order>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[sqlext(table = "name")]` - Table name (defaults to the type name uppercased)
/// - `#[sqlext(column = "name")]` - Column name (defaults to the field name uppercased)
/// - `#[sqlext(key)]` - Part of the primary key
/// - `#[sqlext(required)]` - Rendering `NULL` for this field is an error
/// - `#[sqlext(max_length = N)]` - Truncate text to `N` characters
/// - `#[sqlext(select)]` - List this column in `SELECT` instead of `*`
/// - `#[sqlext(not_mapped)]` / `#[sqlext(inverse)]` - Never part of a statement
/// - `#[sqlext(enum)]` - Fieldless enum rendered by ordinal (derive `SqlEnum` on it)
/// - `#[sqlext(value)]` - Field of an unsupported type that still implements `ToValue`
#[proc_macro_derive(Entity, attributes(sqlext))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `ToValue` for a fieldless enum, rendering each variant by ordinal.
#[proc_macro_derive(SqlEnum)]
pub fn derive_sql_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    sql_enum::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
