use std::{fmt, marker::PhantomData};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    error::Error,
    resource::{IDENTIFIER_SEPARATOR, RESOURCE_SCHEME, Resource, ResourceMeta},
};

/// Typed reference to another resource by identifier.
///
/// A relationship never embeds the target; it is resolved through the
/// target's registry at read time, so every holder sees the same record.
/// It serializes as the bare identifier.
pub struct Relationship<T: Resource> {
    id: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> Relationship<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `org.acme.mynetwork.Trader#dan@email.com`
    pub fn fully_qualified_identifier(&self) -> String {
        super::fully_qualified_identifier(&T::fully_qualified_type(), &self.id)
    }

    /// `resource:org.acme.mynetwork.Trader#dan@email.com`
    pub fn to_uri(&self) -> String {
        format!("{}{}", RESOURCE_SCHEME, self.fully_qualified_identifier())
    }

    /// Accepts a bare identifier, a fully qualified identifier or a
    /// `resource:` URI. A qualified value must name `T`'s type.
    pub fn parse(value: &str) -> Result<Self, Error> {
        let unprefixed = value.strip_prefix(RESOURCE_SCHEME).unwrap_or(value);

        match unprefixed.split_once(IDENTIFIER_SEPARATOR) {
            Some((fq_type, id)) => {
                let expected = T::fully_qualified_type();
                if fq_type != expected {
                    return Err(Error::TypeMismatch(format!(
                        "expected a {} reference, got {}",
                        expected, value
                    )));
                }
                if id.is_empty() {
                    return Err(Error::TypeMismatch(format!(
                        "reference {} has no identifier",
                        value
                    )));
                }
                Ok(Self::new(id))
            }
            None if unprefixed.is_empty() => Err(Error::TypeMismatch(
                "empty resource reference".to_string(),
            )),
            None => Ok(Self::new(unprefixed)),
        }
    }
}

impl<T: Resource> From<&T> for Relationship<T> {
    fn from(resource: &T) -> Self {
        Self::new(resource.id())
    }
}

impl<T: Resource> Clone for Relationship<T> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<T: Resource> PartialEq for Relationship<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: Resource> Eq for Relationship<T> {}

impl<T: Resource> fmt::Debug for Relationship<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Relationship")
            .field(&self.fully_qualified_identifier())
            .finish()
    }
}

impl<T: Resource> fmt::Display for Relationship<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri())
    }
}

impl<T: Resource> Serialize for Relationship<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

impl<'de, T: Resource> Deserialize<'de> for Relationship<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
