//! Node registry
//!
//! Maps type names to constructors so an external description can
//! instantiate concrete node types without knowing them. A process-wide
//! table is built lazily, pre-filled with the built-in node types, the first
//! time it is touched. Standalone [`NodeRegistry`] values can be built for
//! embedding and tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::{NodeBehavior, SceneError, SceneResult};

/// Constructor producing a default-initialized node behavior
pub type NodeFactory = Arc<dyn Fn() -> Box<dyn NodeBehavior> + Send + Sync>;

/// Type name to constructor table
#[derive(Clone, Default)]
pub struct NodeRegistry {
    factories: HashMap<String, NodeFactory>,
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry").field("types", &self.type_names()).finish()
    }
}

impl NodeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in node types
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::nodes::register_builtins(&mut registry);
        registry
    }

    /// Register a factory; an existing entry for the same name is replaced
    ///
    /// Returns `true` when an earlier factory was overwritten.
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> Box<dyn NodeBehavior> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let replaced = self.factories.insert(type_name.clone(), Arc::new(factory)).is_some();
        if replaced {
            log::debug!("Node type '{type_name}' re-registered, last registration wins");
        }
        replaced
    }

    /// Construct a node behavior by type name (case-sensitive)
    pub fn create(&self, type_name: &str) -> SceneResult<Box<dyn NodeBehavior>> {
        self.factories
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| SceneError::UnknownType(type_name.to_string()))
    }

    /// Whether a type name is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

static GLOBAL: OnceLock<RwLock<NodeRegistry>> = OnceLock::new();

fn global() -> &'static RwLock<NodeRegistry> {
    GLOBAL.get_or_init(|| {
        let registry = NodeRegistry::with_builtins();
        log::info!("Node registry initialized with {} built-in types", registry.len());
        RwLock::new(registry)
    })
}

/// Register a factory in the process-wide registry
pub fn register<F>(type_name: impl Into<String>, factory: F) -> bool
where
    F: Fn() -> Box<dyn NodeBehavior> + Send + Sync + 'static,
{
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(type_name, factory)
}

/// Construct a node behavior through the process-wide registry
pub fn create(type_name: &str) -> SceneResult<Box<dyn NodeBehavior>> {
    // Clone the factory out so the lock is not held while it runs
    let factory = global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .factories
        .get(type_name)
        .cloned()
        .ok_or_else(|| SceneError::UnknownType(type_name.to_string()))?;
    Ok(factory())
}

/// Whether the process-wide registry knows a type name
pub fn is_registered(type_name: &str) -> bool {
    global().read().unwrap_or_else(PoisonError::into_inner).contains(type_name)
}

/// Restore the process-wide registry to the built-in table
pub fn reset() {
    *global().write().unwrap_or_else(PoisonError::into_inner) = NodeRegistry::with_builtins();
}
