//! Relationship augmentation: `_embed` (children by foreign key) and `_expand` (parent record).

use crate::config::ResolvedModel;
use crate::store::{id_string, Database, Record, ID_FIELD};
use serde_json::Value;

/// For each child resource name, add a list of the child records whose foreign key
/// points at this record. Unknown children produce an empty list.
pub fn embed(db: &Database, model: &ResolvedModel, resource: &str, record: &mut Record, children: &[String]) {
    if children.is_empty() {
        return;
    }
    let foreign_key = model.foreign_key_of(resource);
    let id = record.get(ID_FIELD).and_then(id_string);
    for child in children {
        let related: Vec<Value> = match (db.collection(child), id.as_deref()) {
            (Some(records), Some(id)) => records
                .iter()
                .filter(|r| r.get(&foreign_key).and_then(id_string).as_deref() == Some(id))
                .cloned()
                .map(Value::Object)
                .collect(),
            _ => Vec::new(),
        };
        record.insert(child.clone(), Value::Array(related));
    }
}

/// For each parent singular name, add the parent record referenced by this record's
/// foreign key. Skipped when the parent resource or record does not exist.
pub fn expand(db: &Database, model: &ResolvedModel, record: &mut Record, parents: &[String]) {
    for parent in parents {
        let Some(spec) = model.resource_by_singular(parent) else {
            tracing::debug!(parent = %parent, "ignoring _expand of unknown resource");
            continue;
        };
        let Some(parent_id) = record.get(&spec.foreign_key).and_then(id_string) else {
            continue;
        };
        if let Some(found) = db.get_by_id(&spec.name, &parent_id) {
            record.insert(parent.clone(), Value::Object(found.clone()));
        }
    }
}
