//! Entity metadata and its resolution into table/column descriptors.
//!
//! An [`Entity`] declares a static field table ([`FieldDef`]). [`resolve`]
//! turns that table (plus an optional [`SchemaProvider`]) into a
//! [`TypeDescriptor`]: the final table name, the column name of every field,
//! which fields are persisted and which form the primary key.
//!
//! Precedence, highest first:
//!
//! - table: schema provider, `#[sqlext(table = "...")]`, type name uppercased
//! - column: schema provider, `#[sqlext(column = "...")]`, field name uppercased
//! - key: schema provider, fields marked `#[sqlext(key)]`
//!
//! Per-builder overrides ([`StatementConfig`](crate::StatementConfig)) sit
//! above all of these and are applied by the statement builder.

use crate::error::{SqlExtError, SqlExtResult};
use crate::schema::SchemaProvider;
use crate::value::Value;

/// Storage kind of a field, derived from its declared Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Integers, floats, booleans, chars.
    Primitive,
    /// `String` / `&str`.
    String,
    /// chrono dates and timestamps.
    DateTime,
    /// `rust_decimal::Decimal`.
    Decimal,
    /// Fieldless enum rendered by ordinal.
    Enum,
    /// Anything else (structs, collections, ids...). Excluded from automatic inference.
    Unsupported,
}

impl FieldKind {
    /// Whether fields of this kind are picked up without an explicit field list.
    pub fn is_simple(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Static declaration of one entity field, as written by `#[derive(Entity)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: Option<&'static str>,
    pub kind: FieldKind,
    pub key: bool,
    pub required: bool,
    pub max_length: Option<usize>,
    pub select: bool,
    pub not_mapped: bool,
    pub inverse: bool,
    /// Whether [`Entity::value`] answers for this field.
    pub readable: bool,
}

impl FieldDef {
    /// A plain field of the given kind with no annotations.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column: None,
            kind,
            key: false,
            required: false,
            max_length: None,
            select: false,
            not_mapped: false,
            inverse: false,
            readable: true,
        }
    }

    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub const fn select(mut self) -> Self {
        self.select = true;
        self
    }

    pub const fn not_mapped(mut self) -> Self {
        self.not_mapped = true;
        self
    }

    pub const fn inverse(mut self) -> Self {
        self.inverse = true;
        self
    }

    /// The entity has no value accessor for this field.
    pub const fn unreadable(mut self) -> Self {
        self.readable = false;
        self
    }
}

/// A type whose instances can be turned into SQL statements.
///
/// Usually derived:
///
/// ```ignore
/// use sqlext::Entity;
///
/// #[derive(Entity)]
/// #[sqlext(table = "PESSOA")]
/// struct Person {
///     #[sqlext(key)]
///     id: i32,
///     #[sqlext(max_length = 80)]
///     name: String,
///     age: i32,
/// }
/// ```
pub trait Entity: 'static {
    /// Bare type name, used for the table fallback and schema provider lookups.
    const TYPE_NAME: &'static str;

    /// Table annotation, if any.
    const TABLE: Option<&'static str> = None;

    /// Declared fields in declaration order.
    const FIELDS: &'static [FieldDef];

    /// Current value of a declared field; `None` for unknown fields and
    /// fields declared [`unreadable`](FieldDef::unreadable).
    fn value(&self, field: &str) -> Option<Value>;
}

/// Resolved metadata for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub column_name: String,
    pub is_primary_key: bool,
    /// Inverse relationship or not persisted; never part of a statement.
    pub is_excluded: bool,
    pub max_length: Option<usize>,
    pub is_required: bool,
    pub kind: FieldKind,
    pub include_in_select: bool,
    /// The entity can hand out this field's value.
    pub is_readable: bool,
}

impl FieldDescriptor {
    /// Whether the field is used when no explicit field list is given.
    pub fn is_inferred(&self) -> bool {
        !self.is_excluded && self.is_readable && self.kind.is_simple()
    }
}

/// Where the primary key of a [`TypeDescriptor`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Declared by the schema provider; may be composite.
    Provider,
    /// Fields marked `#[sqlext(key)]`.
    Annotation,
    /// No key declared.
    None,
}

/// Resolved metadata for a whole entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub type_name: &'static str,
    pub table_name: String,
    pub fields: Vec<FieldDescriptor>,
    pub key_source: KeySource,
}

impl TypeDescriptor {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields picked up by automatic inference, in declaration order.
    pub fn inferred_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_inferred())
    }

    /// Fields flagged as primary key, in declaration order.
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_primary_key)
    }

    /// The primary key an implicit-key statement should use.
    ///
    /// Provider keys are taken as declared, composite or not. Annotated keys
    /// must be unique: several `#[sqlext(key)]` fields are ambiguous.
    pub fn primary_key(&self) -> SqlExtResult<Vec<&FieldDescriptor>> {
        let keys: Vec<&FieldDescriptor> = self.key_fields().collect();
        match (self.key_source, keys.len()) {
            (_, 0) | (KeySource::None, _) => {
                Err(SqlExtError::NoPrimaryKeyFound(self.type_name.to_string()))
            }
            (KeySource::Annotation, n) if n > 1 => Err(SqlExtError::AmbiguousPrimaryKey {
                entity: self.type_name.to_string(),
                candidates: keys.iter().map(|f| f.name.to_string()).collect(),
            }),
            _ => Ok(keys),
        }
    }

    /// Check that the table name is usable.
    pub fn ensure_table(&self) -> SqlExtResult<&str> {
        ensure_table(self.type_name, &self.table_name)
    }
}

pub(crate) fn ensure_table<'a>(type_name: &str, table: &'a str) -> SqlExtResult<&'a str> {
    if table.trim().is_empty() {
        return Err(SqlExtError::NoTableProvided(type_name.to_string()));
    }
    Ok(table)
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// Resolve the metadata of `T`.
///
/// This is a pure function of `T`'s declarations and the provider; callers
/// normally go through [`MetadataCache`](crate::MetadataCache) instead.
pub fn resolve<T: Entity>(provider: Option<&dyn SchemaProvider>) -> TypeDescriptor {
    let type_name = T::TYPE_NAME;

    let table_name = non_blank(provider.and_then(|p| p.table_name(type_name)))
        .or_else(|| T::TABLE.map(str::to_string))
        .unwrap_or_else(|| type_name.to_uppercase());

    let provider_key = provider
        .and_then(|p| p.primary_key(type_name))
        .filter(|k| !k.is_empty());

    let key_source = match &provider_key {
        Some(_) => KeySource::Provider,
        None if T::FIELDS.iter().any(|f| f.key) => KeySource::Annotation,
        None => KeySource::None,
    };

    let fields = T::FIELDS
        .iter()
        .map(|def| {
            let column_name = non_blank(provider.and_then(|p| p.column_name(type_name, def.name)))
                .or_else(|| def.column.map(str::to_string))
                .unwrap_or_else(|| def.name.to_uppercase());

            let is_primary_key = match &provider_key {
                Some(keys) => keys.iter().any(|k| k == def.name),
                None => def.key,
            };

            FieldDescriptor {
                name: def.name,
                column_name,
                is_primary_key,
                is_excluded: def.inverse || def.not_mapped,
                max_length: def.max_length,
                is_required: def.required,
                kind: def.kind,
                include_in_select: def.select,
                is_readable: def.readable,
            }
        })
        .collect();

    tracing::trace!(target: "sqlext.meta", entity = type_name, table = %table_name, "resolved entity metadata");

    TypeDescriptor {
        type_name,
        table_name,
        fields,
        key_source,
    }
}
