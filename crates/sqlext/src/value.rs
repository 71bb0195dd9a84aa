//! Runtime field values.
//!
//! [`Value`] is what an [`Entity`](crate::Entity) hands back for one of its
//! fields. It keeps enough of the original type to pick the right literal
//! form later (ordinal for enums, timestamp layout for dates, ...).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A field's current value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value (`None`).
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value too wide for `Int`.
    UInt(u64),
    /// Floating point value.
    Float(f64),
    /// Exact decimal value.
    Decimal(Decimal),
    /// Text value.
    Text(String),
    /// Date and time without zone; sub-second precision is dropped when formatted.
    DateTime(NaiveDateTime),
    /// Enumeration ordinal.
    Enum(i64),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Equality for change detection: like `==`, except two NaNs are the same.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }
}

/// Conversion into a [`Value`].
///
/// Implemented for the scalar types an entity field usually has. Fieldless
/// enums get an implementation from `#[derive(SqlEnum)]`.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

macro_rules! impl_to_value {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }
            }
        )+
    };
}

impl_to_value!(Bool: bool);
impl_to_value!(Int: i8, i16, i32, i64, u8, u16, u32);
impl_to_value!(UInt: u64);
impl_to_value!(Float: f64);
impl_to_value!(Decimal: Decimal);
impl_to_value!(DateTime: NaiveDateTime);

// Widened through its shortest decimal form so `1.1_f32` stays `1.1`.
impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(self.to_string().parse().unwrap_or(f64::from(*self)))
    }
}

impl ToValue for isize {
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl ToValue for usize {
    fn to_value(&self) -> Value {
        Value::UInt(*self as u64)
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::DateTime(self.and_time(chrono::NaiveTime::MIN))
    }
}

impl<Tz: TimeZone> ToValue for DateTime<Tz> {
    fn to_value(&self) -> Value {
        Value::DateTime(self.naive_local())
    }
}

// Rendered through the generic text path (quoted, never numeric).
impl ToValue for Uuid {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}
