//! Literal SQL statement builder.
//!
//! [`StatementBuilder`] binds an [`Entity`] type to its resolved metadata and
//! renders complete statements with every value inlined as a literal:
//!
//! ```ignore
//! let people = StatementBuilder::<Person>::new();
//!
//! people.insert(&ann)?;              // INSERT INTO PESSOA (ID, NAME, AGE) VALUES (7, 'Ann', 30)
//! people.select(false)?;             // SELECT * FROM PESSOA
//! people.update(&ann, &field("id").into())?;
//! people.update_diff(&ann, &before, &field("id").into())?;
//! people.delete(&ann, &field("id").into())?;
//! ```
//!
//! Statements are never executed here. WHERE clauses are always joined with
//! `AND` and SET lists with `, `.

mod config;

pub use config::{ColumnResolver, StatementConfig};

use crate::cache::Registry;
use crate::error::{SqlExtError, SqlExtResult};
use crate::expr::{Expr, parse_predicate, parse_property_path};
use crate::format::format_value;
use crate::meta::{Entity, FieldDescriptor, TypeDescriptor, ensure_table};
use crate::value::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The kind of statement produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Select,
    Update,
    Delete,
}

/// A field paired with its current value and rendered literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue<'a> {
    pub field: &'a FieldDescriptor,
    pub raw: Value,
    pub literal: String,
}

/// Builds INSERT / SELECT / UPDATE / DELETE text for entity `T`.
pub struct StatementBuilder<T: Entity> {
    registry: Arc<Registry>,
    descriptor: Arc<TypeDescriptor>,
    table: String,
    /// Indices into `descriptor.fields`, in statement order.
    fields: Vec<usize>,
    column_resolver: Option<ColumnResolver>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for StatementBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            descriptor: Arc::clone(&self.descriptor),
            table: self.table.clone(),
            fields: self.fields.clone(),
            column_resolver: self.column_resolver.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> fmt::Debug for StatementBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementBuilder")
            .field("entity", &T::TYPE_NAME)
            .field("table", &self.table)
            .field("columns", &self.columns())
            .finish()
    }
}

impl<T: Entity> Default for StatementBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> StatementBuilder<T> {
    /// Builder with default configuration on the [shared registry](Registry::shared).
    pub fn new() -> Self {
        let registry = Registry::shared();
        let descriptor = registry.describe::<T>();
        let fields = descriptor
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_inferred())
            .map(|(i, _)| i)
            .collect();
        Self {
            table: descriptor.table_name.clone(),
            registry,
            descriptor,
            fields,
            column_resolver: None,
            _entity: PhantomData,
        }
    }

    /// Builder with overrides on the [shared registry](Registry::shared).
    pub fn with_config(config: StatementConfig) -> SqlExtResult<Self> {
        Self::with_registry(Registry::shared(), config)
    }

    /// Builder sharing `registry` (and its metadata cache) with other builders.
    pub fn with_registry(registry: Arc<Registry>, config: StatementConfig) -> SqlExtResult<Self> {
        let descriptor = registry.describe::<T>();

        let fields = match &config.fields {
            None => descriptor
                .fields
                .iter()
                .enumerate()
                .filter(|(_, f)| f.is_inferred())
                .map(|(i, _)| i)
                .collect(),
            Some(names) => select_fields(&descriptor, names)?,
        };

        Ok(Self {
            table: config
                .table
                .unwrap_or_else(|| descriptor.table_name.clone()),
            registry,
            descriptor,
            fields,
            column_resolver: config.column_resolver,
            _entity: PhantomData,
        })
    }

    /// Resolved metadata of `T`.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The registry this builder resolves metadata through.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Table name statements are rendered against.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fields used by INSERT / UPDATE, in statement order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().map(|&i| &self.descriptor.fields[i])
    }

    /// Column name of a field under this builder's configuration.
    pub fn column(&self, field: &FieldDescriptor) -> String {
        match &self.column_resolver {
            Some(resolve) => resolve(field),
            None => field.column_name.clone(),
        }
    }

    /// Column names of [`fields`](Self::fields).
    pub fn columns(&self) -> Vec<String> {
        self.fields().map(|f| self.column(f)).collect()
    }

    fn ensure_table(&self) -> SqlExtResult<&str> {
        ensure_table(T::TYPE_NAME, &self.table)
    }

    /// `INSERT INTO t (c1, c2, ...) VALUES (v1, v2, ...)`
    pub fn insert(&self, instance: &T) -> SqlExtResult<String> {
        let table = self.ensure_table()?;
        if self.fields.is_empty() {
            return Err(SqlExtError::NoPropertiesProvided(T::TYPE_NAME.to_string()));
        }

        let values = self.field_values(instance, self.fields())?;
        let columns: Vec<String> = values.iter().map(|v| self.column(v.field)).collect();
        let literals: Vec<&str> = values.iter().map(|v| v.literal.as_str()).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            literals.join(", ")
        );
        Ok(self.emit(StatementKind::Insert, sql))
    }

    /// `SELECT <marked columns | *> FROM t`
    ///
    /// Only fields marked `#[sqlext(select)]` are listed; without any marked
    /// field, or with `ignore_field_filter`, selects `*`.
    pub fn select(&self, ignore_field_filter: bool) -> SqlExtResult<String> {
        let sql = self.select_clause(ignore_field_filter)?;
        Ok(self.emit(StatementKind::Select, sql))
    }

    /// `SELECT ... FROM t WHERE c1=v1 AND c2=v2 ...` from an equality predicate.
    pub fn select_where(&self, predicate: &Expr, ignore_field_filter: bool) -> SqlExtResult<String> {
        let select = self.select_clause(ignore_field_filter)?;

        let mut conditions = Vec::new();
        for (name, value) in parse_predicate::<T>(predicate)? {
            let field = self.persisted_field(name)?;
            conditions.push(format!("{}={}", self.column(field), format_value(field, &value)?));
        }

        let sql = format!("{} WHERE {}", select, conditions.join(" AND "));
        Ok(self.emit(StatementKind::Select, sql))
    }

    /// `SELECT ... FROM t WHERE <where_sql>` with a caller-written condition.
    ///
    /// A blank condition yields the plain select.
    pub fn select_where_sql(&self, where_sql: &str, ignore_field_filter: bool) -> SqlExtResult<String> {
        let select = self.select_clause(ignore_field_filter)?;
        let sql = if where_sql.trim().is_empty() {
            select
        } else {
            format!("{} WHERE {}", select, where_sql.trim())
        };
        Ok(self.emit(StatementKind::Select, sql))
    }

    /// UPDATE every non-key field, keyed on the fields named by `keys`.
    pub fn update(&self, instance: &T, keys: &Expr) -> SqlExtResult<String> {
        let keys = parse_property_path::<T>(keys)?;
        self.update_with_keys(instance, &keys, None)
    }

    /// UPDATE only the non-key fields whose value differs from `previous`.
    ///
    /// Fails with [`SqlExtError::NoDifferenceFound`] when nothing changed.
    pub fn update_diff(&self, instance: &T, previous: &T, keys: &Expr) -> SqlExtResult<String> {
        let keys = parse_property_path::<T>(keys)?;
        self.update_with_keys(instance, &keys, Some(previous))
    }

    /// UPDATE keyed on the entity's primary key.
    ///
    /// With `previous`, behaves like [`update_diff`](Self::update_diff).
    pub fn update_by_key(&self, instance: &T, previous: Option<&T>) -> SqlExtResult<String> {
        let keys: Vec<&'static str> = self.descriptor.primary_key()?.iter().map(|f| f.name).collect();
        self.update_with_keys(instance, &keys, previous)
    }

    /// UPDATE keyed on an explicit list of field names.
    pub fn update_with_keys(
        &self,
        instance: &T,
        keys: &[&str],
        previous: Option<&T>,
    ) -> SqlExtResult<String> {
        let table = self.ensure_table()?;
        let key_fields = self.key_fields(keys)?;

        let candidates = self
            .fields()
            .filter(|f| !key_fields.iter().any(|k| k.name == f.name));

        let changed: Vec<&FieldDescriptor> = match previous {
            None => candidates.collect(),
            Some(previous) => {
                let mut changed = Vec::new();
                for f in candidates {
                    if !read(instance, f)?.same_as(&read(previous, f)?) {
                        changed.push(f);
                    }
                }
                if changed.is_empty() {
                    return Err(SqlExtError::NoDifferenceFound(T::TYPE_NAME.to_string()));
                }
                changed
            }
        };

        if changed.is_empty() {
            return Err(SqlExtError::NoPropertiesProvided(T::TYPE_NAME.to_string()));
        }

        let set = self.assignments(instance, changed, ", ")?;
        let filter = self.assignments(instance, key_fields, " AND ")?;
        let sql = format!("UPDATE {table} SET {set} WHERE {filter}");
        Ok(self.emit(StatementKind::Update, sql))
    }

    /// `DELETE FROM t WHERE k1=v1 AND ...` keyed on the fields named by `keys`.
    pub fn delete(&self, instance: &T, keys: &Expr) -> SqlExtResult<String> {
        let keys = parse_property_path::<T>(keys)?;
        self.delete_with_keys(instance, &keys)
    }

    /// DELETE keyed on the entity's primary key.
    pub fn delete_by_key(&self, instance: &T) -> SqlExtResult<String> {
        let keys: Vec<&'static str> = self.descriptor.primary_key()?.iter().map(|f| f.name).collect();
        self.delete_with_keys(instance, &keys)
    }

    fn delete_with_keys(&self, instance: &T, keys: &[&str]) -> SqlExtResult<String> {
        let table = self.ensure_table()?;
        let key_fields = self.key_fields(keys)?;
        let filter = self.assignments(instance, key_fields, " AND ")?;
        let sql = format!("DELETE FROM {table} WHERE {filter}");
        Ok(self.emit(StatementKind::Delete, sql))
    }

    /// Current values of `fields` on `instance`, rendered as literals.
    pub fn field_values<'a>(
        &'a self,
        instance: &T,
        fields: impl IntoIterator<Item = &'a FieldDescriptor>,
    ) -> SqlExtResult<Vec<FieldValue<'a>>> {
        fields
            .into_iter()
            .map(|field| {
                let raw = read(instance, field)?;
                let literal = format_value(field, &raw)?;
                Ok(FieldValue {
                    field,
                    raw,
                    literal,
                })
            })
            .collect()
    }

    fn select_clause(&self, ignore_field_filter: bool) -> SqlExtResult<String> {
        let table = self.ensure_table()?;
        let marked: Vec<String> = self
            .fields()
            .filter(|f| f.include_in_select)
            .map(|f| self.column(f))
            .collect();

        if marked.is_empty() || ignore_field_filter {
            Ok(format!("SELECT * FROM {table}"))
        } else {
            Ok(format!("SELECT {} FROM {}", marked.join(", "), table))
        }
    }

    fn assignments<'a>(
        &'a self,
        instance: &T,
        fields: Vec<&'a FieldDescriptor>,
        separator: &str,
    ) -> SqlExtResult<String> {
        let pairs = self.field_values(instance, fields)?;
        Ok(pairs
            .iter()
            .map(|p| format!("{}={}", self.column(p.field), p.literal))
            .collect::<Vec<_>>()
            .join(separator))
    }

    /// A declared field that may appear in a statement.
    fn persisted_field(&self, name: &str) -> SqlExtResult<&FieldDescriptor> {
        let field = self.descriptor.field(name).ok_or_else(|| {
            SqlExtError::invalid_expression(format!(
                "'{name}' is not a field of {}",
                T::TYPE_NAME
            ))
        })?;
        if field.is_excluded {
            return Err(SqlExtError::invalid_expression(format!(
                "'{name}' is not persisted"
            )));
        }
        Ok(field)
    }

    fn key_fields(&self, keys: &[&str]) -> SqlExtResult<Vec<&FieldDescriptor>> {
        if keys.is_empty() {
            return Err(SqlExtError::NoPrimaryKeyFound(T::TYPE_NAME.to_string()));
        }
        keys.iter()
            .map(|k| {
                let field = self.persisted_field(k)?;
                if !field.is_readable {
                    return Err(unreadable(T::TYPE_NAME, field.name));
                }
                Ok(field)
            })
            .collect()
    }

    fn emit(&self, kind: StatementKind, sql: String) -> String {
        tracing::debug!(
            target: "sqlext.sql",
            entity = T::TYPE_NAME,
            kind = ?kind,
            sql = %sql,
            "built statement"
        );
        sql
    }
}

/// Statement shortcuts on entity instances.
///
/// Each call builds a fresh [`StatementBuilder`] on the
/// [shared registry](Registry::shared), so metadata is resolved once per type.
pub trait EntityExt: Entity + Sized {
    /// INSERT for this instance with default configuration.
    fn insert_sql(&self) -> SqlExtResult<String> {
        StatementBuilder::<Self>::new().insert(self)
    }

    /// INSERT for this instance with overrides.
    fn insert_sql_with(&self, config: StatementConfig) -> SqlExtResult<String> {
        StatementBuilder::<Self>::with_config(config)?.insert(self)
    }

    /// UPDATE keyed on `keys`; with `previous`, only changed fields are set.
    fn update_sql(&self, keys: &Expr, previous: Option<&Self>) -> SqlExtResult<String> {
        let builder = StatementBuilder::<Self>::new();
        match previous {
            Some(previous) => builder.update_diff(self, previous, keys),
            None => builder.update(self, keys),
        }
    }
}

impl<T: Entity> EntityExt for T {}

fn read<T: Entity>(instance: &T, field: &FieldDescriptor) -> SqlExtResult<Value> {
    instance
        .value(field.name)
        .ok_or_else(|| unreadable(T::TYPE_NAME, field.name))
}

fn unreadable(type_name: &str, field: &str) -> SqlExtError {
    SqlExtError::invalid_expression(format!(
        "'{field}' of {type_name} has no value; mark it #[sqlext(value)]"
    ))
}

fn select_fields(descriptor: &TypeDescriptor, names: &[String]) -> SqlExtResult<Vec<usize>> {
    let mut picked: Vec<usize> = Vec::with_capacity(names.len());
    for name in names {
        let idx = descriptor
            .fields
            .iter()
            .position(|f| f.name == name.as_str())
            .ok_or_else(|| {
                SqlExtError::invalid_expression(format!(
                    "'{name}' is not a field of {}",
                    descriptor.type_name
                ))
            })?;

        let field = &descriptor.fields[idx];
        if field.is_excluded {
            tracing::debug!(target: "sqlext.meta", field = %name, "dropping non-persisted field from field list");
            continue;
        }
        if !field.is_readable {
            return Err(unreadable(descriptor.type_name, field.name));
        }
        if !picked.contains(&idx) {
            picked.push(idx);
        }
    }
    Ok(picked)
}

#[cfg(test)]
mod tests;
