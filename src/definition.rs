use std::collections::HashMap;

use crate::{
    catalog::{NamedQuery, QueryCatalog},
    resource::{Resource, ResourceKind},
};

/// The deployable model of a business network: which resource types have
/// registries, and which named queries can be run against them.
#[derive(Debug, Clone)]
pub struct NetworkDefinition {
    name: String,
    version: String,
    // fully qualified type -> kind
    types: HashMap<String, ResourceKind>,
    catalog: QueryCatalog,
}

impl NetworkDefinition {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            types: HashMap::new(),
            catalog: QueryCatalog::new(),
        }
    }

    /// Declare a registry for `T`
    pub fn resource<T: Resource>(mut self) -> Self {
        self.types.insert(T::fully_qualified_type(), T::KIND);
        self
    }

    pub fn query(mut self, query: NamedQuery) -> Self {
        self.catalog.register(query);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `my-network@0.1.0`
    pub fn identifier(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    pub fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    pub fn kind_of(&self, fully_qualified_type: &str) -> Option<ResourceKind> {
        self.types.get(fully_qualified_type).copied()
    }

    pub fn declares<T: Resource>(&self) -> bool {
        self.kind_of(&T::fully_qualified_type()) == Some(T::KIND)
    }

    pub fn resource_types(&self, kind: ResourceKind) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .types
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(t, _)| t.as_str())
            .collect();
        types.sort_unstable();
        types
    }
}
