use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A registry, record or type is not known to the network.
    NotFound(String),
    /// A transaction referenced an asset or participant that does not exist.
    ReferenceNotFound(String),
    /// The stored record moved on since it was read.
    Conflict(String),
    DuplicateKey(String),
    QueryFailure(String),
    /// Some items of a bulk operation were applied, others were not.
    /// Nothing is rolled back.
    PartialBulkFailure {
        removed: Vec<String>,
        failed: Vec<(String, String)>,
    },
    TypeMismatch(String),
    Serialize(String),
    Deserialize(String),
    Storage(String),
    Config(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::ReferenceNotFound(_))
    }

    /// Re-labels a missing record as a dangling transaction reference.
    pub fn into_reference(self) -> Self {
        match self {
            Error::NotFound(what) => Error::ReferenceNotFound(what),
            other => other,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(what) => write!(f, "Not found: {}", what),
            Error::ReferenceNotFound(what) => write!(f, "Reference not found: {}", what),
            Error::Conflict(what) => write!(f, "Conflict: {}", what),
            Error::DuplicateKey(key) => write!(f, "Duplicate key: {}", key),
            Error::QueryFailure(err) => write!(f, "Query failure: {}", err),
            Error::PartialBulkFailure { removed, failed } => write!(
                f,
                "Partial bulk failure: {} removed, {} failed ({})",
                removed.len(),
                failed.len(),
                failed
                    .iter()
                    .map(|(id, err)| format!("{}: {}", id, err))
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
            Error::TypeMismatch(err) => write!(f, "Type mismatch: {}", err),
            Error::Serialize(err) => write!(f, "Serialization error: {}", err),
            Error::Deserialize(err) => write!(f, "Deserialization error: {}", err),
            Error::Storage(err) => write!(f, "Storage error: {}", err),
            Error::Config(err) => write!(f, "Configuration error: {}", err),
        }
    }
}

impl std::error::Error for Error {}
