//! In-memory record store: one ordered collection (or singular object) per resource name.
//! Loaded once from the database file; optionally written back after mutations.

use crate::error::{AppError, ConfigError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// One record: ordered field name -> value.
pub type Record = Map<String, Value>;

/// Identity field carried by every collection record.
pub const ID_FIELD: &str = "id";

#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    Collection(Vec<Record>),
    Singular(Record),
}

#[derive(Clone, Debug, Default)]
pub struct Database {
    /// Resource names in file order.
    names: Vec<String>,
    resources: HashMap<String, Resource>,
}

/// String form of an id, used for matching path ids against stored ids.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn record_id(record: &Record) -> Option<String> {
    record.get(ID_FIELD).and_then(id_string)
}

impl Database {
    /// Build from a parsed database document. Call `config::validate_database` first for
    /// precise error messages; this only rejects shapes it cannot store.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let obj = match value {
            Value::Object(obj) => obj,
            _ => return Err(ConfigError::Validation("database must be a JSON object".into())),
        };
        let mut db = Database::default();
        for (name, v) in obj {
            let resource = match v {
                Value::Array(items) => {
                    let mut records = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::Object(r) => records.push(r),
                            _ => return Err(ConfigError::InvalidResource(name)),
                        }
                    }
                    Resource::Collection(records)
                }
                Value::Object(r) => Resource::Singular(r),
                _ => return Err(ConfigError::InvalidResource(name)),
            };
            db.names.push(name.clone());
            db.resources.insert(name, resource);
        }
        Ok(db)
    }

    /// Read and parse a database file.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        crate::config::validate_database(&value)?;
        Self::from_value(value)
    }

    /// Write a snapshot to disk, pretty-printed.
    pub async fn save(snapshot: &Value, path: &Path) -> Result<(), AppError> {
        let text = serde_json::to_string_pretty(snapshot).map_err(|e| AppError::Internal(e.to_string()))?;
        tokio::fs::write(path, text).await?;
        Ok(())
    }

    /// Whole database as one JSON document, resources in file order.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        for name in &self.names {
            if let Some(resource) = self.resources.get(name) {
                let v = match resource {
                    Resource::Collection(records) => {
                        Value::Array(records.iter().cloned().map(Value::Object).collect())
                    }
                    Resource::Singular(record) => Value::Object(record.clone()),
                };
                out.insert(name.clone(), v);
            }
        }
        Value::Object(out)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn collection(&self, name: &str) -> Option<&[Record]> {
        match self.resources.get(name) {
            Some(Resource::Collection(records)) => Some(records),
            _ => None,
        }
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Vec<Record>, AppError> {
        match self.resources.get_mut(name) {
            Some(Resource::Collection(records)) => Ok(records),
            _ => Err(AppError::NotFound(name.to_string())),
        }
    }

    pub fn get_by_id(&self, name: &str, id: &str) -> Option<&Record> {
        self.collection(name)?
            .iter()
            .find(|r| record_id(r).as_deref() == Some(id))
    }

    /// Append a record. A supplied id must be unused; a missing one is generated.
    pub fn insert(&mut self, name: &str, mut record: Record) -> Result<Record, AppError> {
        let records = self.collection_mut(name)?;
        match record.get(ID_FIELD) {
            Some(v) => {
                let id = id_string(v)
                    .ok_or_else(|| AppError::BadRequest("id must be a string or a number".into()))?;
                if records.iter().any(|r| record_id(r).as_deref() == Some(id.as_str())) {
                    return Err(AppError::Conflict(format!("{}/{} already exists", name, id)));
                }
            }
            None => {
                let id = next_id(records);
                record.insert(ID_FIELD.to_string(), id);
            }
        }
        records.push(record.clone());
        Ok(record)
    }

    /// Replace all fields of a record. The stored id is kept.
    pub fn replace(&mut self, name: &str, id: &str, body: Record) -> Result<Record, AppError> {
        let records = self.collection_mut(name)?;
        let slot = records
            .iter_mut()
            .find(|r| record_id(r).as_deref() == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", name, id)))?;
        let stored_id = slot.get(ID_FIELD).cloned().unwrap_or(Value::Null);
        let mut next = Record::new();
        next.insert(ID_FIELD.to_string(), stored_id);
        for (k, v) in body {
            if k != ID_FIELD {
                next.insert(k, v);
            }
        }
        *slot = next;
        Ok(slot.clone())
    }

    /// Merge fields into a record. The stored id is kept.
    pub fn merge(&mut self, name: &str, id: &str, body: Record) -> Result<Record, AppError> {
        let records = self.collection_mut(name)?;
        let slot = records
            .iter_mut()
            .find(|r| record_id(r).as_deref() == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", name, id)))?;
        for (k, v) in body {
            if k != ID_FIELD {
                slot.insert(k, v);
            }
        }
        Ok(slot.clone())
    }

    /// Remove a record by id and return it.
    pub fn remove(&mut self, name: &str, id: &str) -> Result<Record, AppError> {
        let records = self.collection_mut(name)?;
        let pos = records
            .iter()
            .position(|r| record_id(r).as_deref() == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", name, id)))?;
        Ok(records.remove(pos))
    }

    /// Remove every record, in any collection, whose `foreign_key` field references `id`.
    /// Returns the number of records removed.
    pub fn remove_referencing(&mut self, foreign_key: &str, id: &str) -> usize {
        let mut removed = 0;
        for resource in self.resources.values_mut() {
            if let Resource::Collection(records) = resource {
                let before = records.len();
                records.retain(|r| r.get(foreign_key).and_then(id_string).as_deref() != Some(id));
                removed += before - records.len();
            }
        }
        removed
    }

    pub fn singular(&self, name: &str) -> Option<&Record> {
        match self.resources.get(name) {
            Some(Resource::Singular(record)) => Some(record),
            _ => None,
        }
    }

    /// Replace (or, with `merge`, update) a singular resource.
    pub fn write_singular(&mut self, name: &str, body: Record, merge: bool) -> Result<Record, AppError> {
        match self.resources.get_mut(name) {
            Some(Resource::Singular(record)) => {
                if merge {
                    record.extend(body);
                } else {
                    *record = body;
                }
                Ok(record.clone())
            }
            _ => Err(AppError::NotFound(name.to_string())),
        }
    }
}

fn uuid_id() -> Value {
    Value::String(uuid::Uuid::new_v4().to_string())
}

/// Next id for a collection: max numeric id + 1 while all ids are numeric, else a UUID.
/// A UUID is also used once the numeric range is exhausted.
fn next_id(records: &[Record]) -> Value {
    let mut max: i64 = 0;
    for r in records {
        match r.get(ID_FIELD).and_then(Value::as_i64) {
            Some(n) => max = max.max(n),
            None => return uuid_id(),
        }
    }
    max.checked_add(1).map(Value::from).unwrap_or_else(uuid_id)
}
