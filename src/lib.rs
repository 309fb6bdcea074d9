//! json-mock-api: a queryable REST mock server backed by a JSON database file.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod inflect;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{load_overrides, resolve, validate_database, validate_server_config, ResolvedModel, ServerConfig};
pub use error::{AppError, ConfigError};
pub use response::{error_body, success_many, success_one};
pub use routes::{build_app, common_routes, resource_routes};
pub use service::ResourceService;
pub use state::AppState;
pub use store::{Database, Record};
