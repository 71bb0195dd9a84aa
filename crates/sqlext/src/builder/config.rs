use crate::meta::FieldDescriptor;
use std::fmt;
use std::sync::Arc;

/// Maps a resolved field to the column name used in statements.
pub type ColumnResolver = Arc<dyn Fn(&FieldDescriptor) -> String + Send + Sync>;

/// Per-builder overrides.
///
/// Anything left unset falls back to the resolved entity metadata. This is
/// never cached: two builders for the same entity may use different configs.
#[derive(Clone, Default)]
pub struct StatementConfig {
    /// Table name override.
    pub table: Option<String>,
    /// Explicit field list, in statement order. `None` means automatic inference.
    pub fields: Option<Vec<String>>,
    /// Column name override.
    pub column_resolver: Option<ColumnResolver>,
}

impl fmt::Debug for StatementConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementConfig")
            .field("table", &self.table)
            .field("fields", &self.fields)
            .field("column_resolver", &self.column_resolver.as_ref().map(|_| ".."))
            .finish()
    }
}

impl StatementConfig {
    /// Create a new configuration with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Use exactly these fields (by field name), in this order.
    ///
    /// Fields of any kind may be listed; inverse and not-mapped fields are
    /// still dropped.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Override how column names are produced.
    pub fn with_column_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&FieldDescriptor) -> String + Send + Sync + 'static,
    {
        self.column_resolver = Some(Arc::new(resolver));
        self
    }
}
