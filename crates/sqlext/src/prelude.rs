//! Convenient imports for typical `sqlext` usage.
//!
//! ```ignore
//! use sqlext::prelude::*;
//! ```

pub use crate::{
    Entity, EntityExt, Expr, Registry, SqlExtError, SqlExtResult, StatementBuilder,
    StatementConfig, ToValue, Value, capture, field, lit,
};

#[cfg(feature = "derive")]
pub use crate::SqlEnum;
