use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};

/// Indexed, queryable projection of a resource.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IndexMeta(pub BTreeMap<String, IndexValue>);

impl IndexMeta {
    pub fn meta(&self) -> &BTreeMap<String, IndexValue> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&IndexValue> {
        self.0.get(field)
    }

    pub fn with(mut self, field: &str, value: impl ToIndexValue) -> Self {
        self.0.insert(field.to_string(), value.to_index_value());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IndexValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(chrono::DateTime<chrono::Utc>),
}

impl IndexValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            IndexValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            IndexValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            IndexValue::Float(f) => Some(*f),
            IndexValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            IndexValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        match self {
            IndexValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Orders two values of compatible kinds. Ints and floats compare
    /// numerically; any other mix is unordered.
    pub fn compare(&self, other: &IndexValue) -> Option<Ordering> {
        match (self, other) {
            (IndexValue::String(a), IndexValue::String(b)) => Some(a.cmp(b)),
            (IndexValue::Int(a), IndexValue::Int(b)) => Some(a.cmp(b)),
            (IndexValue::Int(a), IndexValue::Float(b)) => (*a as f64).partial_cmp(b),
            (IndexValue::Float(a), IndexValue::Int(b)) => a.partial_cmp(&(*b as f64)),
            (IndexValue::Float(a), IndexValue::Float(b)) => a.partial_cmp(b),
            (IndexValue::Bool(a), IndexValue::Bool(b)) => Some(a.cmp(b)),
            (IndexValue::Timestamp(a), IndexValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

// Helper trait to convert types to IndexValue
pub trait ToIndexValue {
    fn to_index_value(&self) -> IndexValue;
}

impl ToIndexValue for IndexValue {
    fn to_index_value(&self) -> IndexValue {
        self.clone()
    }
}

impl ToIndexValue for String {
    fn to_index_value(&self) -> IndexValue {
        IndexValue::String(self.clone())
    }
}

impl ToIndexValue for &str {
    fn to_index_value(&self) -> IndexValue {
        IndexValue::String(self.to_string())
    }
}

impl ToIndexValue for i64 {
    fn to_index_value(&self) -> IndexValue {
        IndexValue::Int(*self)
    }
}

impl ToIndexValue for i32 {
    fn to_index_value(&self) -> IndexValue {
        IndexValue::Int(*self as i64)
    }
}

impl ToIndexValue for f64 {
    fn to_index_value(&self) -> IndexValue {
        IndexValue::Float(*self)
    }
}

impl ToIndexValue for bool {
    fn to_index_value(&self) -> IndexValue {
        IndexValue::Bool(*self)
    }
}

impl ToIndexValue for chrono::DateTime<chrono::Utc> {
    fn to_index_value(&self) -> IndexValue {
        IndexValue::Timestamp(*self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexField {
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    BeginsWith,
    Contains,
}

impl Comparison {
    pub fn sql_operator(&self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
            Comparison::GreaterThan => ">",
            Comparison::GreaterThanOrEqual => ">=",
            Comparison::LessThan => "<",
            Comparison::LessThanOrEqual => "<=",
            Comparison::BeginsWith | Comparison::Contains => "LIKE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub field: &'static IndexField,
    pub value: IndexValue,
    pub comparison: Comparison,
}

impl QueryFilter {
    pub fn matches(&self, index: &IndexMeta) -> bool {
        let Some(stored) = index.get(self.field.name) else {
            return false;
        };

        match self.comparison {
            Comparison::BeginsWith => match (stored.as_string(), self.value.as_string()) {
                (Some(s), Some(prefix)) => s.starts_with(prefix),
                _ => false,
            },
            Comparison::Contains => match (stored.as_string(), self.value.as_string()) {
                (Some(s), Some(needle)) => s.contains(needle),
                _ => false,
            },
            comparison => match stored.compare(&self.value) {
                Some(ordering) => match comparison {
                    Comparison::Equal => ordering == Ordering::Equal,
                    Comparison::NotEqual => ordering != Ordering::Equal,
                    Comparison::GreaterThan => ordering == Ordering::Greater,
                    Comparison::GreaterThanOrEqual => ordering != Ordering::Less,
                    Comparison::LessThan => ordering == Ordering::Less,
                    Comparison::LessThanOrEqual => ordering != Ordering::Greater,
                    Comparison::BeginsWith | Comparison::Contains => false,
                },
                None => false,
            },
        }
    }
}

/// -----------------------------
/// Resource Query Plan (storage contract)
/// -----------------------------
///
/// Filters are AND-ed. Results are always ordered by identifier, ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<QueryFilter>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(
        mut self,
        field: &'static IndexField,
        value: impl ToIndexValue,
        comparison: Comparison,
    ) -> Self {
        self.filters.push(QueryFilter {
            field,
            value: value.to_index_value(),
            comparison,
        });
        self
    }

    pub fn where_eq(self, field: &'static IndexField, value: impl ToIndexValue) -> Self {
        self.filter(field, value, Comparison::Equal)
    }

    pub fn where_ne(self, field: &'static IndexField, value: impl ToIndexValue) -> Self {
        self.filter(field, value, Comparison::NotEqual)
    }

    pub fn where_gt(self, field: &'static IndexField, value: impl ToIndexValue) -> Self {
        self.filter(field, value, Comparison::GreaterThan)
    }

    pub fn where_gte(self, field: &'static IndexField, value: impl ToIndexValue) -> Self {
        self.filter(field, value, Comparison::GreaterThanOrEqual)
    }

    pub fn where_lt(self, field: &'static IndexField, value: impl ToIndexValue) -> Self {
        self.filter(field, value, Comparison::LessThan)
    }

    pub fn where_lte(self, field: &'static IndexField, value: impl ToIndexValue) -> Self {
        self.filter(field, value, Comparison::LessThanOrEqual)
    }

    pub fn where_begins_with(self, field: &'static IndexField, value: impl ToIndexValue) -> Self {
        self.filter(field, value, Comparison::BeginsWith)
    }

    pub fn where_contains(self, field: &'static IndexField, value: impl ToIndexValue) -> Self {
        self.filter(field, value, Comparison::Contains)
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, index: &IndexMeta) -> bool {
        self.filters.iter().all(|filter| filter.matches(index))
    }
}
