pub mod json_body;
pub mod list_query;

pub use json_body::JsonBody;
pub use list_query::ListParams;
