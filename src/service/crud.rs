//! Resource operations over the in-memory store. Callers hold the database lock.

use crate::config::{ResolvedModel, ResourceKind, ResourceSpec};
use crate::error::AppError;
use crate::query::{self, ListQuery, PageLinks};
use crate::service::RequestValidator;
use crate::store::{id_string, Database, Record, ID_FIELD};
use serde_json::Value;

/// Records returned by a list query plus window metadata.
#[derive(Debug, Default)]
pub struct ListOutput {
    pub items: Vec<Value>,
    pub total: Option<usize>,
    pub links: Option<PageLinks>,
}

pub struct ResourceService;

impl ResourceService {
    /// Resolve a resource name, NotFound if the database has no such key.
    pub fn spec<'a>(model: &'a ResolvedModel, resource: &str) -> Result<&'a ResourceSpec, AppError> {
        model
            .resource(resource)
            .ok_or_else(|| AppError::NotFound(format!("resource '{}'", resource)))
    }

    fn collection_spec<'a>(model: &'a ResolvedModel, resource: &str) -> Result<&'a ResourceSpec, AppError> {
        let spec = Self::spec(model, resource)?;
        if spec.kind != ResourceKind::Collection {
            return Err(AppError::NotFound(format!("'{}' is not a collection", resource)));
        }
        Ok(spec)
    }

    fn augment(db: &Database, model: &ResolvedModel, resource: &str, record: &mut Record, query: &ListQuery) {
        query::embed(db, model, resource, record, &query.embed);
        query::expand(db, model, record, &query.expand);
    }

    /// Run the read pipeline on a collection, then embed/expand the window.
    pub fn list(
        db: &Database,
        model: &ResolvedModel,
        resource: &str,
        query: &ListQuery,
    ) -> Result<ListOutput, AppError> {
        Self::collection_spec(model, resource)?;
        let records = db
            .collection(resource)
            .ok_or_else(|| AppError::NotFound(format!("resource '{}'", resource)))?;
        let selection = query::run(records, query);
        tracing::debug!(
            resource = %resource,
            matched = selection.items.len(),
            total = ?selection.total,
            "list"
        );
        let items = selection
            .items
            .into_iter()
            .map(|r| {
                let mut record = r.clone();
                Self::augment(db, model, resource, &mut record, query);
                Value::Object(record)
            })
            .collect();
        Ok(ListOutput {
            items,
            total: selection.total,
            links: selection.links,
        })
    }

    /// Fetch one record by id with `_embed` / `_expand` applied.
    pub fn read(
        db: &Database,
        model: &ResolvedModel,
        resource: &str,
        id: &str,
        query: &ListQuery,
    ) -> Result<Value, AppError> {
        Self::collection_spec(model, resource)?;
        let mut record = db
            .get_by_id(resource, id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", resource, id)))?;
        Self::augment(db, model, resource, &mut record, query);
        Ok(Value::Object(record))
    }

    pub fn create(db: &mut Database, model: &ResolvedModel, resource: &str, body: Value) -> Result<Value, AppError> {
        Self::collection_spec(model, resource)?;
        let record = RequestValidator::new_record(body)?;
        let created = db.insert(resource, record)?;
        tracing::debug!(resource = %resource, id = ?created.get(ID_FIELD), "created");
        Ok(Value::Object(created))
    }

    /// PUT replaces, PATCH (`merge`) updates in place. The path id stays authoritative.
    pub fn update(
        db: &mut Database,
        model: &ResolvedModel,
        resource: &str,
        id: &str,
        body: Value,
        merge: bool,
    ) -> Result<Value, AppError> {
        Self::collection_spec(model, resource)?;
        let record = RequestValidator::record(body)?;
        let updated = if merge {
            db.merge(resource, id, record)?
        } else {
            db.replace(resource, id, record)?
        };
        Ok(Value::Object(updated))
    }

    /// Delete a record and the records in other collections that reference it.
    pub fn delete(db: &mut Database, model: &ResolvedModel, resource: &str, id: &str) -> Result<(), AppError> {
        let spec = Self::collection_spec(model, resource)?;
        db.remove(resource, id)?;
        let removed = db.remove_referencing(&spec.foreign_key, id);
        tracing::debug!(resource = %resource, id = %id, dependents = removed, "deleted");
        Ok(())
    }

    /// `GET /<parent>/<id>/<child>`: the child list filtered by the parent's foreign key.
    pub fn nested_list(
        db: &Database,
        model: &ResolvedModel,
        parent: &str,
        parent_id: &str,
        child: &str,
        query: ListQuery,
    ) -> Result<ListOutput, AppError> {
        let foreign_key = model.foreign_key_of(parent);
        let query = query.with_filter(&foreign_key, parent_id);
        Self::list(db, model, child, &query)
    }

    /// `POST /<parent>/<id>/<child>`: create a child whose foreign key is the parent id.
    pub fn nested_create(
        db: &mut Database,
        model: &ResolvedModel,
        parent: &str,
        parent_id: &str,
        child: &str,
        body: Value,
    ) -> Result<Value, AppError> {
        let mut record = RequestValidator::new_record(body)?;
        let foreign_key = model.foreign_key_of(parent);
        let fk_value = db
            .get_by_id(parent, parent_id)
            .and_then(|p| p.get(ID_FIELD).cloned())
            .unwrap_or_else(|| typed_id(parent_id));
        record.insert(foreign_key, fk_value);
        Self::create(db, model, child, Value::Object(record))
    }

    pub fn read_singular(db: &Database, resource: &str) -> Result<Value, AppError> {
        db.singular(resource)
            .cloned()
            .map(Value::Object)
            .ok_or_else(|| AppError::NotFound(format!("resource '{}'", resource)))
    }

    pub fn write_singular(db: &mut Database, resource: &str, body: Value, merge: bool) -> Result<Value, AppError> {
        let record = RequestValidator::record(body)?;
        db.write_singular(resource, record, merge).map(Value::Object)
    }
}

/// A path id as JSON: a number when it is an integer, else a string.
fn typed_id(id: &str) -> Value {
    match id.parse::<i64>() {
        Ok(n) if id_string(&Value::from(n)).as_deref() == Some(id) => Value::from(n),
        _ => Value::String(id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;
    use std::collections::HashMap;

    fn fixture() -> (Database, ResolvedModel) {
        let db = Database::from_value(json!({
            "posts": [{ "id": 1, "title": "a" }, { "id": 2, "title": "b" }],
            "comments": [{ "id": 1, "postId": 1 }, { "id": 2, "postId": 2 }],
            "profile": { "name": "x" }
        }))
        .unwrap();
        let model = resolve(&db, &HashMap::new(), "Id").unwrap();
        (db, model)
    }

    #[test]
    fn create_then_read_then_conflict() {
        let (mut db, model) = fixture();
        let created = ResourceService::create(&mut db, &model, "posts", json!({ "id": 9, "title": "t" })).unwrap();
        assert_eq!(created["id"], json!(9));
        let read = ResourceService::read(&db, &model, "posts", "9", &ListQuery::default()).unwrap();
        assert_eq!(read, created);
        let err = ResourceService::create(&mut db, &model, "posts", json!({ "id": 9 })).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn unknown_resource_is_not_found() {
        let (mut db, model) = fixture();
        assert!(matches!(
            ResourceService::create(&mut db, &model, "nope", json!({})),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            ResourceService::list(&db, &model, "profile", &ListQuery::default()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn delete_cascades_to_dependents() {
        let (mut db, model) = fixture();
        ResourceService::delete(&mut db, &model, "posts", "1").unwrap();
        assert_eq!(db.collection("comments").unwrap().len(), 1);
        assert!(matches!(
            ResourceService::delete(&mut db, &model, "posts", "1"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn nested_routes_filter_and_create() {
        let (mut db, model) = fixture();
        let out = ResourceService::nested_list(&db, &model, "posts", "2", "comments", ListQuery::default()).unwrap();
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0]["postId"], json!(2));

        let created =
            ResourceService::nested_create(&mut db, &model, "posts", "2", "comments", json!({ "body": "hi" })).unwrap();
        assert_eq!(created["postId"], json!(2));
        assert_eq!(created["id"], json!(3));
    }

    #[test]
    fn typed_id_keeps_non_canonical_strings() {
        assert_eq!(typed_id("12"), json!(12));
        assert_eq!(typed_id("012"), json!("012"));
        assert_eq!(typed_id("abc"), json!("abc"));
    }
}
