//! Per-build shared state keyed by value type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Typed registry configurers use to hand artifacts to each other during a
/// single build. One value per type; a second insert replaces the first.
#[derive(Default, Clone)]
pub struct SharedObjects {
    values: HashMap<TypeId, Entry>,
}

#[derive(Clone)]
struct Entry {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl SharedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under its own type, returning the previous value if any.
    pub fn insert<V: Send + Sync + 'static>(&mut self, value: V) -> Option<Arc<V>> {
        self.insert_arc(Arc::new(value))
    }

    pub fn insert_arc<V: Send + Sync + 'static>(&mut self, value: Arc<V>) -> Option<Arc<V>> {
        let previous = self.values.insert(
            TypeId::of::<V>(),
            Entry {
                type_name: std::any::type_name::<V>(),
                value,
            },
        );
        previous.and_then(|e| e.value.downcast::<V>().ok())
    }

    pub fn get<V: Send + Sync + 'static>(&self) -> Option<Arc<V>> {
        self.values
            .get(&TypeId::of::<V>())
            .and_then(|e| e.value.clone().downcast::<V>().ok())
    }

    pub fn contains<V: Send + Sync + 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<V>())
    }

    pub fn remove<V: Send + Sync + 'static>(&mut self) -> Option<Arc<V>> {
        self.values
            .remove(&TypeId::of::<V>())
            .and_then(|e| e.value.downcast::<V>().ok())
    }

    /// Type names of every stored value, for diagnostics.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.values.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for SharedObjects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedObjects")
            .field("types", &self.type_names())
            .finish()
    }
}
