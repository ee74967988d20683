use fxhash::FxHashMap;
use knob_domain::ObjectRef;
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;
use tracing::trace;

/// External lookup consulted when an object-reference option receives a name.
pub trait ReferenceResolver: Send + Sync {
    fn lookup(&self, name: &str) -> Option<ObjectRef>;
}

/// A resolver that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferences;

impl ReferenceResolver for NoReferences {
    fn lookup(&self, _name: &str) -> Option<ObjectRef> {
        None
    }
}

/// A thread-safe store of named objects.
///
/// Cloning is inexpensive: clones share the same underlying map.
///
/// # Example
/// ```rust
/// use knob_kernel::{BeanRegistry, ReferenceResolver};
///
/// struct Pool { size: usize }
///
/// let beans = BeanRegistry::new();
/// beans.bind("pool", Pool { size: 4 });
///
/// let pool = beans.lookup("pool").and_then(|o| o.downcast::<Pool>()).unwrap();
/// assert_eq!(pool.size, 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BeanRegistry {
    beans: Arc<RwLock<FxHashMap<String, ObjectRef>>>,
}

impl BeanRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` under `name`, returning the previously bound object.
    pub fn bind<O: Any + Send + Sync>(&self, name: impl Into<String>, value: O) -> Option<ObjectRef> {
        self.bind_ref(name, ObjectRef::new(value))
    }

    /// Binds an existing handle under `name`, returning the previously bound object.
    pub fn bind_ref(&self, name: impl Into<String>, value: ObjectRef) -> Option<ObjectRef> {
        let name = name.into();
        trace!(bean = %name, ty = value.object_type().name(), "Bean bound");
        self.beans.write().insert(name, value)
    }

    pub fn unbind(&self, name: &str) -> Option<ObjectRef> {
        self.beans.write().remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.beans.read().contains_key(name)
    }

    /// Bound names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.beans.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.beans.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beans.read().is_empty()
    }
}

impl ReferenceResolver for BeanRegistry {
    fn lookup(&self, name: &str) -> Option<ObjectRef> {
        self.beans.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_returns_previous_bean() {
        let beans = BeanRegistry::new();
        assert!(beans.bind("config", 1_u32).is_none());
        let previous = beans.bind("config", 2_u32).expect("previous binding");

        assert_eq!(previous.downcast::<u32>().as_deref(), Some(&1));
        assert_eq!(beans.lookup("config").and_then(|o| o.downcast::<u32>()).as_deref(), Some(&2));
        assert_eq!(beans.len(), 1);
    }

    #[test]
    fn clones_share_bindings() {
        let beans = BeanRegistry::new();
        let view = beans.clone();
        beans.bind("b", "second".to_owned());
        beans.bind("a", "first".to_owned());

        assert!(view.contains("a"));
        assert_eq!(view.names(), ["a", "b"]);

        assert!(view.unbind("a").is_some());
        assert!(!beans.contains("a"));
    }

    #[test]
    fn no_references_resolves_nothing() {
        assert!(NoReferences.lookup("anything").is_none());
    }
}
