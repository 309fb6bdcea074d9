//! HTTP handlers for resource CRUD/queries and the database snapshot.

pub mod database;
pub mod resource;
pub use database::*;
pub use resource::*;
