//! Server configuration (CLI flags with env fallbacks) and the resources override file.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Server configuration. Parsed from flags, falling back to `MOCK_API_*` env vars.
#[derive(Debug, Clone, Parser)]
#[command(name = "json-mock-api")]
#[command(about = "Queryable REST mock server backed by a JSON database file")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "MOCK_API_PORT", default_value = "7001")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "MOCK_API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Database file: top-level keys are resource names.
    #[arg(long, env = "MOCK_API_DB", default_value = "server/data.json")]
    pub db: PathBuf,

    /// Path prefix for resource routes.
    #[arg(long, env = "MOCK_API_PREFIX", default_value = "/api")]
    pub prefix: String,

    /// Optional JSON file overriding singular names and foreign keys per resource.
    #[arg(long, env = "MOCK_API_RESOURCES")]
    pub resources: Option<PathBuf>,

    /// Suffix appended to a singular resource name to form its foreign key.
    #[arg(long, env = "MOCK_API_FK_SUFFIX", default_value = "Id")]
    pub foreign_key_suffix: String,

    /// Reject every mutating request with 403.
    #[arg(long, env = "MOCK_API_READ_ONLY")]
    pub read_only: bool,

    /// Write the database back to `--db` after each mutation.
    #[arg(long, env = "MOCK_API_PERSIST")]
    pub persist: bool,

    /// Disable the permissive CORS layer.
    #[arg(long, env = "MOCK_API_NO_CORS")]
    pub no_cors: bool,

    /// Maximum request body size in bytes.
    #[arg(long, env = "MOCK_API_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7001,
            host: "0.0.0.0".to_string(),
            db: PathBuf::from("server/data.json"),
            prefix: "/api".to_string(),
            resources: None,
            foreign_key_suffix: "Id".to_string(),
            read_only: false,
            persist: false,
            no_cors: false,
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Per-resource override of inferred relationship naming.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOverride {
    #[serde(default)]
    pub singular: Option<String>,
    /// Field other resources use to reference this one.
    #[serde(default)]
    pub foreign_key: Option<String>,
}

/// Contents of the `--resources` file: `{ "resources": { "people": { "singular": "person" } } }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourcesFile {
    #[serde(default)]
    pub resources: HashMap<String, ResourceOverride>,
}
