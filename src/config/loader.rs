//! Load the resources override file and build the resolved model from a loaded database.

use crate::config::resolved::{ResolvedModel, ResourceKind, ResourceSpec};
use crate::config::types::{ResourceOverride, ResourcesFile};
use crate::error::ConfigError;
use crate::inflect;
use crate::store::{Database, Resource};
use std::collections::HashMap;
use std::path::Path;

/// Build the relationship table for every resource in the database.
/// Singular names and foreign keys are inferred by inflection unless overridden.
pub fn resolve(
    db: &Database,
    overrides: &HashMap<String, ResourceOverride>,
    foreign_key_suffix: &str,
) -> Result<ResolvedModel, ConfigError> {
    for name in overrides.keys() {
        if db.resource(name).is_none() {
            tracing::warn!("resources file overrides unknown resource '{}', ignoring", name);
        }
    }

    let mut resources = Vec::with_capacity(db.names().len());
    for name in db.names() {
        let kind = match db.resource(name) {
            Some(Resource::Collection(_)) => ResourceKind::Collection,
            Some(Resource::Singular(_)) => ResourceKind::Singular,
            None => continue,
        };
        let ov = overrides.get(name);
        let singular = ov
            .and_then(|o| o.singular.clone())
            .unwrap_or_else(|| inflect::singularize(name));
        let foreign_key = ov
            .and_then(|o| o.foreign_key.clone())
            .unwrap_or_else(|| inflect::foreign_key(&singular, foreign_key_suffix));
        tracing::debug!(resource = %name, singular = %singular, foreign_key = %foreign_key, "resolved resource");
        resources.push(ResourceSpec {
            name: name.clone(),
            kind,
            singular,
            foreign_key,
        });
    }

    let mut seen = HashMap::new();
    for r in resources.iter().filter(|r| r.kind == ResourceKind::Collection) {
        if let Some(other) = seen.insert(r.singular.as_str(), r.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "resources '{}' and '{}' share the singular name '{}'",
                other, r.name, r.singular
            )));
        }
    }

    Ok(ResolvedModel::new(resources, foreign_key_suffix))
}

/// Read the optional `--resources` override file.
pub async fn load_overrides(path: Option<&Path>) -> Result<HashMap<String, ResourceOverride>, ConfigError> {
    let Some(path) = path else {
        return Ok(HashMap::new());
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let file: ResourcesFile = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(file.resources)
}
