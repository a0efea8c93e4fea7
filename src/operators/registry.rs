//! Operator registry for managing available node kinds.

use crate::core::node::{Category, NodeMetadata, Operator};
use indexmap::IndexMap;
use std::sync::Arc;

/// Factory function for creating operator instances.
pub type OperatorFactory = Arc<dyn Fn() -> Box<dyn Operator> + Send + Sync>;

/// Registry entry containing metadata and factory.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Factory function to create instances.
    pub factory: OperatorFactory,
    /// Cached metadata (avoids creating an instance just to read it).
    pub metadata: NodeMetadata,
    /// Whether this operator can be instantiated.
    pub enabled: bool,
}

/// Registry for all available operator kinds.
///
/// Hosts use it to populate a toolbox and to create operators by id.
pub struct OperatorRegistry {
    operators: IndexMap<String, RegistryEntry>,
    categories: IndexMap<Category, Vec<String>>,
}

impl OperatorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            operators: IndexMap::new(),
            categories: IndexMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in operators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::operators::builtin::register_all(&mut registry);
        registry
    }

    /// Register an operator kind.
    ///
    /// Registering an id twice replaces the earlier entry.
    pub fn register<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn Operator> + Send + Sync + 'static,
    {
        let metadata = factory().metadata();
        let id = metadata.id.clone();
        let category = metadata.category;

        if self.operators.contains_key(&id) {
            self.unregister(&id);
        }

        self.operators.insert(
            id.clone(),
            RegistryEntry {
                factory: Arc::new(factory),
                metadata,
                enabled: true,
            },
        );
        self.categories.entry(category).or_default().push(id);
    }

    /// Create a new instance of an operator by ID.
    pub fn create(&self, id: &str) -> Option<Box<dyn Operator>> {
        self.operators
            .get(id)
            .filter(|e| e.enabled)
            .map(|e| (e.factory)())
    }

    /// Get metadata for an operator without creating an instance.
    pub fn get_metadata(&self, id: &str) -> Option<&NodeMetadata> {
        self.operators.get(id).map(|e| &e.metadata)
    }

    /// Get a registry entry.
    pub fn get_entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.operators.get(id)
    }

    /// Check if an operator is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.operators.contains_key(id)
    }

    /// All registered operator IDs, in registration order.
    pub fn operator_ids(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(|s| s.as_str())
    }

    /// Enabled operator IDs sorted by display name, for a toolbox listing.
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut entries: Vec<&RegistryEntry> =
            self.operators.values().filter(|e| e.enabled).collect();
        entries.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        entries.iter().map(|e| e.metadata.id.as_str()).collect()
    }

    /// Get operators by category.
    pub fn by_category(&self, category: Category) -> Vec<&str> {
        self.categories
            .get(&category)
            .map(|ids| ids.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Get all categories with at least one operator.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(category, _)| category)
    }

    /// Search operators by id, name, description or tag.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();

        self.operators
            .iter()
            .filter(|(_, entry)| {
                let metadata = &entry.metadata;
                metadata.id.to_lowercase().contains(&query)
                    || metadata.name.to_lowercase().contains(&query)
                    || metadata.description.to_lowercase().contains(&query)
                    || metadata.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Enable or disable an operator.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.operators.get_mut(id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Unregister an operator.
    pub fn unregister(&mut self, id: &str) -> bool {
        let Some(entry) = self.operators.shift_remove(id) else {
            return false;
        };
        if let Some(ids) = self.categories.get_mut(&entry.metadata.category) {
            ids.retain(|i| i != id);
        }
        true
    }

    /// Get the total number of registered operators.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Enabled operators grouped by category, each group sorted by name.
    pub fn grouped_by_category(&self) -> IndexMap<Category, Vec<&NodeMetadata>> {
        let mut grouped: IndexMap<Category, Vec<&NodeMetadata>> = IndexMap::new();

        for entry in self.operators.values().filter(|e| e.enabled) {
            grouped
                .entry(entry.metadata.category)
                .or_default()
                .push(&entry.metadata);
        }

        for operators in grouped.values_mut() {
            operators.sort_by(|a, b| a.name.cmp(&b.name));
        }

        grouped
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Builder for creating a customized registry.
pub struct RegistryBuilder {
    registry: OperatorRegistry,
    include_builtins: bool,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            registry: OperatorRegistry::new(),
            include_builtins: true,
        }
    }

    /// Include or exclude built-in operators.
    pub fn with_builtins(mut self, include: bool) -> Self {
        self.include_builtins = include;
        self
    }

    /// Register a custom operator.
    pub fn register<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Operator> + Send + Sync + 'static,
    {
        self.registry.register(factory);
        self
    }

    /// Build the registry.
    ///
    /// Custom operators registered with an id a built-in also uses win.
    pub fn build(self) -> OperatorRegistry {
        let mut registry = if self.include_builtins {
            OperatorRegistry::with_builtins()
        } else {
            OperatorRegistry::new()
        };
        for entry in self.registry.operators.into_values() {
            let factory = entry.factory;
            registry.register(move || factory());
            if !entry.enabled {
                registry.set_enabled(&entry.metadata.id, false);
            }
        }
        registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
