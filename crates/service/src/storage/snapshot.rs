use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;

/// One JSON object inside a collection.
pub type Record = serde_json::Map<String, Value>;

/// The three shapes a top-level value of the backing document may take.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CollectionValue {
    Scalar(String),
    Record(Record),
    RecordList(Vec<Record>),
}

impl CollectionValue {
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Record(_) => "record",
            Self::RecordList(_) => "record list",
        }
    }
}

impl TryFrom<Value> for CollectionValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self::Scalar(s)),
            Value::Object(obj) => Ok(Self::Record(obj)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(obj) => Ok(obj),
                    other => Err(format!("element {i} is {}, expected an object", kind(&other))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::RecordList),
            other => Err(format!("{} is not a string, object or array of objects", kind(&other))),
        }
    }
}

impl<'de> Deserialize<'de> for CollectionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        CollectionValue::try_from(value).map_err(D::Error::custom)
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Numeric id of a record, if it has one.
pub fn record_id(record: &Record) -> Option<f64> {
    record.get("id").and_then(Value::as_f64)
}

/// Integer id taken from a request path.
///
/// Stored ids are compared as doubles, so a stored `1.5` can never be
/// addressed and ids beyond 2^53 compare with double precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub i64);

impl RecordId {
    pub fn matches(self, record: &Record) -> bool {
        record_id(record) == Some(self.0 as f64)
    }
}

impl FromStr for RecordId {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(RecordId).map_err(|_| ServiceError::InvalidId)
    }
}

/// Decode a request body; anything but a JSON object is `InvalidBody`.
pub fn parse_record(bytes: &[u8]) -> Result<Record, ServiceError> {
    serde_json::from_slice::<Record>(bytes).map_err(|_| ServiceError::InvalidBody)
}

/// Every collection of the backing document, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    collections: BTreeMap<String, CollectionValue>,
}

impl Snapshot {
    /// Read and parse the backing document.
    pub async fn load(path: &Path) -> Result<Self, ServiceError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ServiceError::Load(format!(
                "error reading {}: {e}. Make sure the file exists",
                path.display()
            ))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ServiceError::Load(format!("error unmarshalling {}: {e}", path.display()))
        })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ServiceError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::Load(format!("error unmarshalling the json: {e}")))
    }

    pub fn get(&self, name: &str) -> Option<&CollectionValue> {
        self.collections.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CollectionValue> {
        self.collections.get_mut(name)
    }

    /// Collection names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
