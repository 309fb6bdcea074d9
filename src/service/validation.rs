//! Request body checks shared by create and update.

use crate::error::AppError;
use crate::store::{Record, ID_FIELD};
use serde_json::Value;

pub struct RequestValidator;

impl RequestValidator {
    /// Body must be a JSON object.
    pub fn record(body: Value) -> Result<Record, AppError> {
        match body {
            Value::Object(m) => Ok(m),
            _ => Err(AppError::BadRequest("body must be a JSON object".into())),
        }
    }

    /// Body for a create: an object whose `id`, if present, is a string or a number.
    pub fn new_record(body: Value) -> Result<Record, AppError> {
        let record = Self::record(body)?;
        match record.get(ID_FIELD) {
            None | Some(Value::String(_)) | Some(Value::Number(_)) => Ok(record),
            Some(other) => Err(AppError::BadRequest(format!(
                "id must be a string or a number, got {}",
                other
            ))),
        }
    }
}
