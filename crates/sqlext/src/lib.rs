//! # sqlext
//!
//! Literal SQL statement generation from statically described entities.
//!
//! ## Features
//!
//! - **Metadata, not reflection**: `#[derive(Entity)]` records fields, keys and
//!   column names at compile time
//! - **Literal statements**: values are escaped and inlined, no parameters
//! - **Diff updates**: `UPDATE` only the fields that changed since a snapshot
//! - **Typed selectors**: keys and `WHERE` clauses are small expression trees
//!   checked against the entity's declared fields
//! - **Layered naming**: schema provider, then annotations, then uppercased
//!   Rust names; per-builder overrides on top
//!
//! ## Usage
//!
//! ```ignore
//! use sqlext::prelude::*;
//!
//! #[derive(Entity, Clone)]
//! #[sqlext(table = "PESSOA")]
//! struct Person {
//!     #[sqlext(key)]
//!     id: i32,
//!     #[sqlext(max_length = 80, required)]
//!     name: String,
//!     age: i32,
//! }
//!
//! let people = StatementBuilder::<Person>::new();
//! let ann = Person { id: 7, name: "Ann".into(), age: 30 };
//!
//! // INSERT INTO PESSOA (ID, NAME, AGE) VALUES (7, 'Ann', 30)
//! people.insert(&ann)?;
//!
//! // SELECT * FROM PESSOA WHERE NAME='Ann' AND AGE=30
//! people.select_where(&field("age").equals(30).and(field("name").equals("Ann")), false)?;
//!
//! // UPDATE PESSOA SET AGE=31 WHERE ID=7
//! let before = ann.clone();
//! let after = Person { age: 31, ..ann };
//! people.update_diff(&after, &before, &field("id").into())?;
//!
//! // DELETE FROM PESSOA WHERE ID=7
//! people.delete_by_key(&after)?;
//! ```
//!
//! ## Predicate order
//!
//! Conjunctions are flattened by walking the left spine of the tree; at each
//! level the right-hand comparison is emitted before descending, and the
//! bottom-left comparison comes last within its side. For
//! `a == 1 && b == 2 && c == 3` (parsed as `(a && b) && c`) the clause is
//! `B=2 AND A=1 AND C=3`.
//!
//! ## Logging
//!
//! Built statements are logged at `DEBUG` on target `sqlext.sql`, metadata
//! resolution at `TRACE` on `sqlext.meta`, and skipped predicate leaves at
//! `DEBUG` on `sqlext.expr`.

pub mod builder;
pub mod cache;
pub mod error;
pub mod expr;
pub mod format;
pub mod meta;
pub mod prelude;
pub mod schema;
pub mod value;

pub use builder::{
    ColumnResolver, EntityExt, FieldValue, StatementBuilder, StatementConfig, StatementKind,
};
pub use cache::{CacheStats, MetadataCache, Registry};
pub use error::{SqlExtError, SqlExtResult};
pub use expr::{Expr, Operand, capture, field, lit};
pub use meta::{Entity, FieldDef, FieldDescriptor, FieldKind, KeySource, TypeDescriptor, resolve};
pub use schema::{ColumnMapping, ModelSchema, SchemaProvider, SchemaRegistry};
pub use value::{ToValue, Value};

#[cfg(feature = "derive")]
pub use sqlext_derive::{Entity, SqlEnum};
