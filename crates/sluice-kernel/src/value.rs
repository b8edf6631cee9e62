//! Runtime values.
//!
//! Values are cheap to clone: strings and lists are owned, tables and
//! closures are shared behind `Arc` and compare by identity. That makes every
//! value usable as a table key.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use thiserror::Error;

use crate::interpreter::Closure;

#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Int(i64),
    List(Vec<Value>),
    Table(Arc<Table>),
    Closure(Arc<Closure>),
}

/// Adjoin is not defined for the left operand's kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} doesn't support caret")]
pub struct CaretError {
    pub kind: &'static str,
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::List(_) => "list",
            Value::Table(_) => "table",
            Value::Closure(_) => "closure",
        }
    }

    /// Adjoin `other` onto this value, as when `a$b` fuses two fragments.
    pub fn caret(&self, other: &Value) -> Result<Value, CaretError> {
        match self {
            Value::String(s) => Ok(Value::String(format!("{s}{other}"))),
            Value::Int(i) => Ok(Value::String(format!("{i}{other}"))),
            Value::List(items) => items
                .iter()
                .map(|item| item.caret(other))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Value::Table(_) | Value::Closure(_) => Err(CaretError { kind: self.kind_name() }),
        }
    }

    pub fn as_closure(&self) -> Option<&Arc<Closure>> {
        match self {
            Value::Closure(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Arc<Table>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::List(items) => {
                f.write_str("[")?;
                write_spaced(f, items.iter().map(|v| v.to_string()))?;
                f.write_str("]")
            }
            Value::Table(t) => write!(f, "{t}"),
            Value::Closure(_) => f.write_str("<closure>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => Arc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Int(i) => i.hash(state),
            Value::List(items) => items.hash(state),
            Value::Table(t) => std::ptr::hash(Arc::as_ptr(t), state),
            Value::Closure(c) => std::ptr::hash(Arc::as_ptr(c), state),
        }
    }
}

/// Ordered list part plus a keyed part.
///
/// Mutable while being built, then frozen behind `Value::Table`.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub list: Vec<Value>,
    pub dict: HashMap<Value, Value>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, values: impl IntoIterator<Item = Value>) {
        self.list.extend(values);
    }

    /// Last write wins for a repeated key.
    pub fn insert(&mut self, key: Value, value: Value) {
        self.dict.insert(key, value);
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.dict.get(key)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<String> = self
            .dict
            .iter()
            .map(|(k, v)| format!("&{k}={v}"))
            .collect();
        entries.sort();
        f.write_str("[")?;
        write_spaced(f, self.list.iter().map(|v| v.to_string()).chain(entries))?;
        f.write_str("]")
    }
}

fn write_spaced(f: &mut fmt::Formatter<'_>, parts: impl Iterator<Item = String>) -> fmt::Result {
    for (i, part) in parts.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        f.write_str(&part)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_caret_concatenates_text() {
        let v = Value::from("a").caret(&Value::Int(1)).unwrap();
        assert_eq!(v, Value::from("a1"));
    }

    #[test]
    fn int_caret_becomes_string() {
        let v = Value::Int(4).caret(&Value::from("2")).unwrap();
        assert_eq!(v, Value::from("42"));
    }

    #[test]
    fn list_caret_adjoins_each_element() {
        let list = Value::List(vec!["a".into(), "b".into()]);
        let v = list.caret(&Value::from(".txt")).unwrap();
        assert_eq!(v, Value::List(vec!["a.txt".into(), "b.txt".into()]));
    }

    #[test]
    fn table_rejects_caret() {
        let t = Value::Table(Arc::new(Table::new()));
        let err = t.caret(&Value::from("x")).unwrap_err();
        assert_eq!(err.to_string(), "table doesn't support caret");
    }

    #[test]
    fn tables_compare_by_identity() {
        let a = Arc::new(Table::new());
        let b = Arc::new(Table::new());
        assert_eq!(Value::Table(a.clone()), Value::Table(a));
        assert_ne!(Value::Table(b), Value::Table(Arc::new(Table::new())));
    }

    #[test]
    fn table_display_lists_then_sorted_entries() {
        let mut t = Table::new();
        t.append(["x".into(), "y".into()]);
        t.insert("b".into(), "2".into());
        t.insert("a".into(), "1".into());
        assert_eq!(Value::Table(Arc::new(t)).to_string(), "[x y &a=1 &b=2]");
    }

    #[test]
    fn repeated_key_keeps_last_write() {
        let mut t = Table::new();
        t.insert("k".into(), "old".into());
        t.insert("k".into(), "new".into());
        assert_eq!(t.get(&"k".into()), Some(&Value::from("new")));
        assert_eq!(t.dict.len(), 1);
    }
}
