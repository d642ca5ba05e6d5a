use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::ResourceDescriptor;
use crate::error::ServletError;
use crate::store::{DocumentStore, StoreError};

/// Registered resource descriptors, looked up by resource name.
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    descriptors: HashMap<&'static str, Arc<dyn ResourceDescriptor>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. A later registration under the same name wins.
    pub fn register(mut self, descriptor: impl ResourceDescriptor) -> Self {
        let name = descriptor.name();
        if self.descriptors.insert(name, Arc::new(descriptor)).is_some() {
            tracing::warn!(resource = name, "Descriptor registered twice, keeping the latest");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ResourceDescriptor>> {
        self.descriptors.get(name).cloned()
    }

    /// Look up `name`; an unknown resource is an internal error.
    pub fn require(&self, name: &str) -> Result<Arc<dyn ResourceDescriptor>, ServletError> {
        self.get(name)
            .ok_or_else(|| ServletError::UnknownResource(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Create the unique indexes of every registered resource.
    pub async fn ensure_indexes(&self, store: &dyn DocumentStore) -> Result<(), StoreError> {
        for descriptor in self.descriptors.values() {
            store
                .ensure_indexes(descriptor.name(), descriptor.unique_indexes())
                .await?;
            tracing::info!(resource = descriptor.name(), "Unique indexes ensured");
        }
        Ok(())
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("SchemaRegistry")
            .field("resources", &names)
            .finish()
    }
}
