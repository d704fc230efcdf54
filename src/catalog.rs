use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use crate::{
    error::Error,
    query::{IndexValue, Query, ToIndexValue},
    resource::Resource,
};

/// Named parameters passed to a catalog query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(BTreeMap<String, IndexValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl ToIndexValue) -> Self {
        self.0.insert(name.to_string(), value.to_index_value());
        self
    }

    pub fn get(&self, name: &str) -> Option<&IndexValue> {
        self.0.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&IndexValue, Error> {
        self.get(name)
            .ok_or_else(|| Error::QueryFailure(format!("missing parameter `{}`", name)))
    }

    pub fn require_str(&self, name: &str) -> Result<&str, Error> {
        self.require(name)?.as_string().ok_or_else(|| {
            Error::QueryFailure(format!("parameter `{}` must be a string", name))
        })
    }
}

type BuildFn = Arc<dyn Fn(&QueryParams) -> Result<Query, Error> + Send + Sync>;

/// A predefined, parameterized read over one resource type.
#[derive(Clone)]
pub struct NamedQuery {
    pub name: String,
    pub description: String,
    /// Unqualified type of the resources the query returns
    pub resource_type: &'static str,
    build: BuildFn,
}

impl NamedQuery {
    pub fn new<T, F>(name: &str, description: &str, build: F) -> Self
    where
        T: Resource,
        F: Fn(&QueryParams) -> Result<Query, Error> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            resource_type: T::TYPE,
            build: Arc::new(build),
        }
    }

    pub fn build(&self, params: &QueryParams) -> Result<Query, Error> {
        (self.build)(params)
    }
}

impl fmt::Debug for NamedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedQuery")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("resource_type", &self.resource_type)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryCatalog {
    queries: HashMap<String, NamedQuery>,
}

impl QueryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: NamedQuery) -> Self {
        self.register(query);
        self
    }

    /// Registers a query, replacing any query with the same name.
    pub fn register(&mut self, query: NamedQuery) {
        self.queries.insert(query.name.clone(), query);
    }

    pub fn get(&self, name: &str) -> Result<&NamedQuery, Error> {
        self.queries
            .get(name)
            .ok_or_else(|| Error::QueryFailure(format!("unknown query `{}`", name)))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.queries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_require() {
        let params = QueryParams::new().with("exchange", "Euronext").with("min", 3_i64);
        assert_eq!(params.require_str("exchange").unwrap(), "Euronext");
        assert!(matches!(
            params.require_str("min"),
            Err(Error::QueryFailure(_))
        ));
        assert!(matches!(
            params.require("owner"),
            Err(Error::QueryFailure(_))
        ));
    }
}
