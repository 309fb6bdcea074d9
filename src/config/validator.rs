//! Startup validation: database document shape, id uniqueness, and server flags.

use crate::config::ServerConfig;
use crate::error::ConfigError;
use crate::store::{id_string, ID_FIELD};
use serde_json::Value;
use std::collections::HashSet;

pub fn validate_database(value: &Value) -> Result<(), ConfigError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ConfigError::Validation("database must be a JSON object".into()))?;

    for (name, resource) in obj {
        if name.is_empty() || name.contains('/') {
            return Err(ConfigError::Validation(format!("invalid resource name '{}'", name)));
        }
        let items = match resource {
            Value::Array(items) => items,
            Value::Object(_) => continue,
            _ => return Err(ConfigError::InvalidResource(name.clone())),
        };
        let mut ids = HashSet::new();
        for item in items {
            let record = item
                .as_object()
                .ok_or_else(|| ConfigError::InvalidResource(name.clone()))?;
            let Some(id) = record.get(ID_FIELD) else {
                continue;
            };
            let id = id_string(id).ok_or_else(|| ConfigError::InvalidId {
                resource: name.clone(),
                reason: format!("id must be a string or a number, got {}", id),
            })?;
            if !ids.insert(id.clone()) {
                return Err(ConfigError::DuplicateId {
                    resource: name.clone(),
                    id,
                });
            }
        }
    }
    Ok(())
}

pub fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();
    if config.port == 0 {
        errors.push("port cannot be 0".to_string());
    }
    if !config.prefix.starts_with('/') {
        errors.push(format!("prefix must start with '/': {}", config.prefix));
    }
    if config.foreign_key_suffix.is_empty() {
        errors.push("foreign key suffix cannot be empty".to_string());
    }
    if config.max_body_size == 0 {
        errors.push("max body size cannot be 0".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_collections_and_singulars() {
        let db = json!({ "posts": [{ "id": 1 }, { "id": "2" }], "profile": { "name": "x" } });
        assert!(validate_database(&db).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let db = json!({ "posts": [{ "id": 1 }, { "id": "1" }] });
        assert!(matches!(validate_database(&db), Err(ConfigError::DuplicateId { .. })));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(validate_database(&json!([])).is_err());
        assert!(matches!(
            validate_database(&json!({ "posts": 3 })),
            Err(ConfigError::InvalidResource(_))
        ));
        assert!(matches!(
            validate_database(&json!({ "posts": [1, 2] })),
            Err(ConfigError::InvalidResource(_))
        ));
        assert!(matches!(
            validate_database(&json!({ "posts": [{ "id": null }] })),
            Err(ConfigError::InvalidId { .. })
        ));
    }

    #[test]
    fn validates_server_flags() {
        assert!(validate_server_config(&ServerConfig::default()).is_ok());
        let bad = ServerConfig {
            port: 0,
            prefix: "api".into(),
            ..Default::default()
        };
        let err = validate_server_config(&bad).unwrap_err().to_string();
        assert!(err.contains("port"));
        assert!(err.contains("prefix"));
    }
}
