//! Field selectors and equality predicates.
//!
//! Selectors name the fields a statement keys on; predicates describe a
//! `WHERE` clause as a conjunction of `field == value` comparisons.
//!
//! ```
//! use sqlext::expr::{capture, field};
//!
//! let age = 30;
//! let pred = field("age").equals(age).and(field("name").equals("Ann"));
//! let keys = sqlext::Expr::fields(["id", "code"]);
//! let lazy = field("age").equals_operand(capture(move || age + 1));
//! # let _ = (pred, keys, lazy);
//! ```

use crate::error::{SqlExtError, SqlExtResult};
use crate::meta::Entity;
use crate::value::{ToValue, Value};
use std::fmt;
use std::sync::Arc;

/// A value computed when the predicate is parsed.
#[derive(Clone)]
pub struct Capture(Arc<dyn Fn() -> Value + Send + Sync>);

impl Capture {
    pub fn eval(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Capture(..)")
    }
}

/// One side of a comparison.
#[derive(Debug, Clone)]
pub enum Operand {
    /// Direct access to a field of the bound entity.
    Field(String),
    /// Constant value.
    Literal(Value),
    /// Value read from the caller's environment at parse time.
    Captured(Capture),
    /// Method call on another operand.
    Call { target: Box<Operand>, method: String },
    /// Indexing into another operand.
    Index { target: Box<Operand>, index: Box<Operand> },
}

/// Field selector or predicate tree.
#[derive(Debug, Clone)]
pub enum Expr {
    Operand(Operand),
    Tuple(Vec<Operand>),
    Eq(Operand, Operand),
    And(Box<Expr>, Box<Expr>),
}

/// Reference a field of the bound entity.
pub fn field(name: impl Into<String>) -> Operand {
    Operand::Field(name.into())
}

/// A literal operand.
pub fn lit(value: impl ToValue) -> Operand {
    Operand::Literal(value.to_value())
}

/// An operand evaluated lazily from the caller's environment.
pub fn capture<F, V>(f: F) -> Operand
where
    F: Fn() -> V + Send + Sync + 'static,
    V: ToValue,
{
    Operand::Captured(Capture(Arc::new(move || f().to_value())))
}

impl Operand {
    /// `self == value`
    pub fn equals(self, value: impl ToValue) -> Expr {
        Expr::Eq(self, lit(value))
    }

    /// `self == rhs` for an arbitrary right-hand operand.
    pub fn equals_operand(self, rhs: Operand) -> Expr {
        Expr::Eq(self, rhs)
    }

    /// `self.method()`
    pub fn call(self, method: impl Into<String>) -> Operand {
        Operand::Call {
            target: Box::new(self),
            method: method.into(),
        }
    }

    /// `self[index]`
    pub fn index(self, index: Operand) -> Operand {
        Operand::Index {
            target: Box::new(self),
            index: Box::new(index),
        }
    }
}

impl Expr {
    /// Composite selector over several fields.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expr::Tuple(names.into_iter().map(field).collect())
    }

    /// `self && other`
    pub fn and(self, other: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(other))
    }

    fn is_binary(&self) -> bool {
        matches!(self, Expr::Eq(..) | Expr::And(..))
    }
}

impl From<Operand> for Expr {
    fn from(op: Operand) -> Self {
        Expr::Operand(op)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(name) => write!(f, "{name}"),
            Operand::Literal(v) => write!(f, "{v:?}"),
            Operand::Captured(_) => f.write_str("<captured>"),
            Operand::Call { target, method } => write!(f, "{target}.{method}()"),
            Operand::Index { target, index } => write!(f, "{target}[{index}]"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Operand(op) => write!(f, "{op}"),
            Expr::Tuple(ops) => {
                f.write_str("(")?;
                for (i, op) in ops.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{op}")?;
                }
                f.write_str(")")
            }
            Expr::Eq(l, r) => write!(f, "{l} == {r}"),
            Expr::And(l, r) => write!(f, "({l} && {r})"),
        }
    }
}

fn declared_field<T: Entity>(name: &str, expr: &Expr) -> SqlExtResult<&'static str> {
    T::FIELDS
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.name)
        .ok_or_else(|| {
            SqlExtError::invalid_expression(format!(
                "'{expr}' refers to a field that is not from type {}",
                T::TYPE_NAME
            ))
        })
}

fn selector_field<T: Entity>(op: &Operand, expr: &Expr) -> SqlExtResult<&'static str> {
    match op {
        Operand::Field(name) => declared_field::<T>(name, expr),
        Operand::Call { .. } => Err(SqlExtError::invalid_expression(format!(
            "'{expr}' refers to a method, not a field"
        ))),
        Operand::Index { .. } => Err(SqlExtError::invalid_expression(format!(
            "'{expr}' refers to an indexer, not a field"
        ))),
        Operand::Literal(_) | Operand::Captured(_) => Err(SqlExtError::invalid_expression(
            format!("'{expr}' is a value, not a field"),
        )),
    }
}

/// Field names referenced by a selector, in selector order.
///
/// Accepts a single field or a tuple of fields, all declared on `T`.
pub fn parse_property_path<T: Entity>(expr: &Expr) -> SqlExtResult<Vec<&'static str>> {
    match expr {
        Expr::Operand(op) => Ok(vec![selector_field::<T>(op, expr)?]),
        Expr::Tuple(ops) if ops.is_empty() => Err(SqlExtError::invalid_expression(
            "empty field selector",
        )),
        Expr::Tuple(ops) => ops.iter().map(|op| selector_field::<T>(op, expr)).collect(),
        Expr::Eq(..) | Expr::And(..) => Err(SqlExtError::invalid_expression(format!(
            "'{expr}' is a predicate, not a field selector"
        ))),
    }
}

/// Flatten one side of a conjunction.
///
/// Walks down the left spine; at every level the right subtree is expanded
/// first, and the node left at the bottom of the spine comes last.
fn collect_comparisons<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    let mut last = expr;
    while let Expr::And(left, right) = last {
        if !left.is_binary() {
            break;
        }
        if right.is_binary() {
            collect_comparisons(right, out);
        }
        last = left;
    }
    out.push(last);
}

fn comparison_value(rhs: &Operand, expr: &Expr) -> SqlExtResult<Value> {
    match rhs {
        Operand::Literal(v) => Ok(v.clone()),
        Operand::Captured(c) => Ok(c.eval()),
        _ => Err(SqlExtError::invalid_expression(format!(
            "'{expr}' compares against '{rhs}', which is not a literal or captured value"
        ))),
    }
}

/// `(field, value)` pairs of an equality predicate.
///
/// A single `field == value` yields one pair. A conjunction is flattened (see
/// the crate docs for the exact order); comparisons whose left side is not a
/// field access are skipped rather than rejected.
pub fn parse_predicate<T: Entity>(expr: &Expr) -> SqlExtResult<Vec<(&'static str, Value)>> {
    let leaves = match expr {
        Expr::Eq(Operand::Field(_), _) => vec![expr],
        Expr::And(left, right) => {
            let mut leaves = Vec::new();
            collect_comparisons(left, &mut leaves);
            collect_comparisons(right, &mut leaves);
            leaves
        }
        Expr::Eq(lhs, _) => {
            return Err(SqlExtError::invalid_expression(format!(
                "'{expr}' compares '{lhs}', which is not a field"
            )));
        }
        Expr::Operand(_) | Expr::Tuple(_) => {
            return Err(SqlExtError::invalid_expression(format!(
                "'{expr}' is not an equality predicate"
            )));
        }
    };

    let mut pairs = Vec::with_capacity(leaves.len());
    for leaf in leaves {
        match leaf {
            Expr::Eq(Operand::Field(name), rhs) => {
                let name = declared_field::<T>(name, expr)?;
                pairs.push((name, comparison_value(rhs, expr)?));
            }
            other => {
                tracing::debug!(target: "sqlext.expr", leaf = %other, "skipping non-field comparison");
            }
        }
    }

    if pairs.is_empty() {
        return Err(SqlExtError::invalid_expression(format!(
            "'{expr}' contains no field comparison"
        )));
    }
    Ok(pairs)
}
