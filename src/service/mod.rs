//! ResourceService: CRUD and query operations over the in-memory store.

mod crud;
mod validation;
pub use crud::{ListOutput, ResourceService};
pub use validation::RequestValidator;
