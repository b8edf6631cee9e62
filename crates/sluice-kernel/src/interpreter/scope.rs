//! Variable scope management for sluice.
//!
//! A scope maps names to *slots*: shared, mutable value cells. Copies of an
//! evaluator share one scope, and a closure holds a capture that references
//! the same slots as the scope it was defined in. So:
//!
//! - `set` writes through an existing slot and is seen by every holder;
//! - `bind` installs a fresh slot, which holders of the old one never see.
//!
//! No locking is implied beyond keeping each slot memory-safe. Two stages
//! that race on the same slot see whichever write lands last.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{defect, Defect, EvalResult};
use crate::value::Value;

/// A shared value cell.
#[derive(Debug, Clone)]
pub struct Slot(Arc<RwLock<Value>>);

impl Slot {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    pub fn get(&self) -> Value {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set(&self, value: Value) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = value;
    }

    /// Whether both handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Slot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Name to slot mapping, shared by reference between evaluator copies.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    slots: Arc<RwLock<HashMap<String, Slot>>>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a fresh slot holding `value`, replacing any old binding.
    pub fn bind(&self, name: impl Into<String>, value: Value) -> Slot {
        let slot = Slot::new(value);
        self.slots
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into(), slot.clone());
        slot
    }

    /// Write `value` through the slot bound to `name`, binding it if absent.
    pub fn set(&self, name: &str, value: Value) {
        match self.slot(name) {
            Some(slot) => slot.set(value),
            None => {
                self.bind(name, value);
            }
        }
    }

    /// Current value bound to `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.slot(name).map(|slot| slot.get())
    }

    /// The slot bound to `name`.
    pub fn slot(&self, name: &str) -> Option<Slot> {
        self.slots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// All bound names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .slots
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Snapshot the slots for exactly `names` into a new scope.
    ///
    /// The checker computed `names` as the free variables of a closure, so a
    /// missing name is a defect.
    pub fn capture<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> EvalResult<Scope> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        let mut captured = HashMap::new();
        for name in names {
            let slot = slots
                .get(name)
                .ok_or_else(|| defect(Defect::UnresolvedVariable(name.to_string())))?;
            captured.insert(name.to_string(), slot.clone());
        }
        Ok(Scope { slots: Arc::new(RwLock::new(captured)) })
    }

    /// A new scope that starts with every slot of this one.
    ///
    /// Bindings made in the child stay in the child; writes through inherited
    /// slots are shared.
    pub fn child(&self) -> Scope {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner()).clone();
        Scope { slots: Arc::new(RwLock::new(slots)) }
    }
}
