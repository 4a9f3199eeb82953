//! The five collection operations, dispatched per value shape.
//!
//! These work on one `CollectionValue` and never touch the lock or the
//! file; `store` wraps them in the exclusive mutate-then-persist scope.

use serde_json::Value;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::storage::{CollectionValue, Record, RecordId};

/// Page of a record list, or the raw value for the other shapes.
pub fn list(value: &CollectionValue, page: Pagination) -> CollectionValue {
    match value {
        CollectionValue::RecordList(records) => {
            let window = page.window(records.len());
            CollectionValue::RecordList(records[window].to_vec())
        }
        other => other.clone(),
    }
}

/// First record whose id matches. Scalars are returned as they are.
pub fn get_by_id(value: &CollectionValue, id: RecordId) -> Result<CollectionValue, ServiceError> {
    match value {
        CollectionValue::Scalar(_) => Ok(value.clone()),
        CollectionValue::Record(record) if id.matches(record) => Ok(value.clone()),
        CollectionValue::Record(_) => Err(ServiceError::ElementNotFound),
        CollectionValue::RecordList(records) => records
            .iter()
            .find(|r| id.matches(r))
            .cloned()
            .map(CollectionValue::Record)
            .ok_or(ServiceError::ElementNotFound),
    }
}

/// Append to a record list or replace a singleton record. Ids are not checked.
pub fn create(value: &mut CollectionValue, body: Record) -> Result<(), ServiceError> {
    let shape = value.shape();
    match value {
        CollectionValue::RecordList(records) => {
            records.push(body);
            Ok(())
        }
        CollectionValue::Record(record) => {
            *record = body;
            Ok(())
        }
        CollectionValue::Scalar(_) => Err(ServiceError::unsupported("create", shape)),
    }
}

/// Overwrite every non-id field of the first matching record from `body`.
pub fn update(value: &mut CollectionValue, id: RecordId, body: &Record) -> Result<(), ServiceError> {
    let shape = value.shape();
    let target = match value {
        CollectionValue::RecordList(records) => records.iter_mut().find(|r| id.matches(r)),
        CollectionValue::Record(record) => Some(record).filter(|r| id.matches(r)),
        CollectionValue::Scalar(_) => return Err(ServiceError::unsupported("update", shape)),
    };
    let record = target.ok_or(ServiceError::ElementNotFound)?;
    overwrite_fields(record, body);
    Ok(())
}

/// Fields the body omits become `null`; keys only present in the body are ignored.
fn overwrite_fields(record: &mut Record, body: &Record) {
    for (key, slot) in record.iter_mut() {
        if key == "id" {
            continue;
        }
        *slot = body.get(key).cloned().unwrap_or(Value::Null);
    }
}

/// Remove every matching record; returns how many were removed.
///
/// A matching singleton record is emptied, which leaves it without an id.
pub fn delete_by_id(value: &mut CollectionValue, id: RecordId) -> Result<usize, ServiceError> {
    let shape = value.shape();
    match value {
        CollectionValue::RecordList(records) => {
            let before = records.len();
            records.retain(|r| !id.matches(r));
            match before - records.len() {
                0 => Err(ServiceError::ElementNotFound),
                removed => Ok(removed),
            }
        }
        CollectionValue::Record(record) if id.matches(record) => {
            record.clear();
            Ok(1)
        }
        CollectionValue::Record(_) => Err(ServiceError::ElementNotFound),
        CollectionValue::Scalar(_) => Err(ServiceError::unsupported("delete", shape)),
    }
}
