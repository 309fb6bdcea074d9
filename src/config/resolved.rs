//! Resolved resource model: the relationship table consulted by embed, expand,
//! nested routes and cascade delete.

use crate::inflect;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Collection,
    Singular,
}

#[derive(Clone, Debug)]
pub struct ResourceSpec {
    pub name: String,
    pub kind: ResourceKind,
    /// Singular form of `name`, used for `_expand` and nested routes.
    pub singular: String,
    /// Field other resources use to reference a record of this resource (e.g. "postId").
    pub foreign_key: String,
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub resources: Vec<ResourceSpec>,
    by_name: HashMap<String, usize>,
    by_singular: HashMap<String, usize>,
    foreign_key_suffix: String,
}

impl ResolvedModel {
    pub fn new(resources: Vec<ResourceSpec>, foreign_key_suffix: &str) -> Self {
        let by_name = resources.iter().enumerate().map(|(i, r)| (r.name.clone(), i)).collect();
        let by_singular = resources
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == ResourceKind::Collection)
            .map(|(i, r)| (r.singular.clone(), i))
            .collect();
        ResolvedModel {
            resources,
            by_name,
            by_singular,
            foreign_key_suffix: foreign_key_suffix.to_string(),
        }
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceSpec> {
        self.by_name.get(name).map(|&i| &self.resources[i])
    }

    /// Collection whose singular name is `singular` ("user" -> users).
    pub fn resource_by_singular(&self, singular: &str) -> Option<&ResourceSpec> {
        self.by_singular.get(singular).map(|&i| &self.resources[i])
    }

    /// Foreign key children use to reference `name`. Falls back to inflection for names
    /// that are not loaded resources.
    pub fn foreign_key_of(&self, name: &str) -> String {
        match self.resource(name) {
            Some(spec) => spec.foreign_key.clone(),
            None => inflect::foreign_key(&inflect::singularize(name), &self.foreign_key_suffix),
        }
    }
}
