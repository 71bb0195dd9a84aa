use std::collections::HashMap;

/// External schema metadata for entity types (for example an ORM's model).
///
/// Every lookup is keyed by [`Entity::TYPE_NAME`](crate::Entity::TYPE_NAME).
/// Returning `None` (or a blank name) lets the resolver fall back to the
/// entity's own declarations.
pub trait SchemaProvider: Send + Sync {
    /// Mapped table name for a type.
    fn table_name(&self, type_name: &str) -> Option<String>;

    /// Mapped column name for one field of a type.
    fn column_name(&self, type_name: &str, field: &str) -> Option<String>;

    /// Primary key field names for a type, in key order.
    fn primary_key(&self, type_name: &str) -> Option<Vec<String>> {
        let _ = type_name;
        None
    }
}

/// Column mapping for one field.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    /// Field name on the entity.
    pub field: String,
    /// Column name in the table.
    pub column: String,
}

/// Mapping of one entity type onto a table.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    /// Entity type name.
    pub type_name: String,
    /// Table name.
    pub table: String,
    /// Column overrides.
    pub columns: Vec<ColumnMapping>,
    /// Key field names.
    pub primary_key: Vec<String>,
}

impl ModelSchema {
    /// Create a mapping of `type_name` onto `table`.
    pub fn new(type_name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            table: table.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Map a field to a column.
    pub fn with_column(mut self, field: &str, column: &str) -> Self {
        match self.columns.iter_mut().find(|c| c.field == field) {
            Some(existing) => existing.column = column.to_string(),
            None => self.columns.push(ColumnMapping {
                field: field.to_string(),
                column: column.to_string(),
            }),
        }
        self
    }

    /// Set the primary key field(s).
    pub fn with_primary_key(mut self, fields: &[&str]) -> Self {
        self.primary_key = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Check if a field has a column override.
    pub fn has_column(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c.field == field)
    }
}

/// In-memory [`SchemaProvider`].
///
/// # Example
///
/// ```
/// use sqlext::{ModelSchema, SchemaProvider, SchemaRegistry};
///
/// let mut registry = SchemaRegistry::new();
/// registry.register(
///     ModelSchema::new("Person", "people")
///         .with_column("name", "full_name")
///         .with_primary_key(&["id"]),
/// );
///
/// assert_eq!(registry.table_name("Person").as_deref(), Some("people"));
/// assert_eq!(registry.column_name("Person", "name").as_deref(), Some("full_name"));
/// assert_eq!(registry.column_name("Person", "age"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    models: HashMap<String, ModelSchema>,
}

impl SchemaRegistry {
    /// Create a new empty schema registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a model mapping.
    pub fn register(&mut self, model: ModelSchema) {
        self.models.insert(model.type_name.clone(), model);
    }

    /// Get a model mapping by type name.
    pub fn get(&self, type_name: &str) -> Option<&ModelSchema> {
        self.models.get(type_name)
    }

    /// Get all registered models.
    pub fn models(&self) -> impl Iterator<Item = &ModelSchema> {
        self.models.values()
    }

    /// Get the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl SchemaProvider for SchemaRegistry {
    fn table_name(&self, type_name: &str) -> Option<String> {
        self.get(type_name).map(|m| m.table.clone())
    }

    fn column_name(&self, type_name: &str, field: &str) -> Option<String> {
        self.get(type_name)?
            .columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.column.clone())
    }

    fn primary_key(&self, type_name: &str) -> Option<Vec<String>> {
        self.get(type_name)
            .filter(|m| !m.primary_key.is_empty())
            .map(|m| m.primary_key.clone())
    }
}
