use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// One request line: `{"id": ..., "method": ..., "params": ...}`.
#[derive(Debug, Serialize)]
pub struct HelperRequest<'a> {
    pub id: String,
    pub method: &'a str,
    pub params: &'a Value,
}

impl<'a> HelperRequest<'a> {
    /// A request with a fresh random id.
    pub fn new(
        method: &'a str,
        params: &'a Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params,
        }
    }

    /// Serialized form including the trailing newline.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("empty response")]
    Empty,
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response id mismatch: expected {expected}, got {actual}")]
    IdMismatch {
        expected: String,
        actual: Value,
    },
    #[error("helper returned error: {0}")]
    Remote(Value),
    #[error("result is not an object")]
    NotAnObject,
}

/// Decode one response line for the request with `expected_id`.
///
/// Only an object-valued `result` counts as success. An `error` key wins over
/// `result` when both are present.
pub fn decode_response(
    line: &str,
    expected_id: &str,
) -> Result<Map<String, Value>, ResponseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ResponseError::Empty);
    }

    let mut response: Map<String, Value> = serde_json::from_str(line)?;
    let id = response.remove("id").unwrap_or(Value::Null);
    if id.as_str() != Some(expected_id) {
        return Err(ResponseError::IdMismatch {
            expected: expected_id.to_string(),
            actual: id,
        });
    }

    if let Some(error) = response.remove("error") {
        return Err(ResponseError::Remote(error));
    }

    match response.remove("result") {
        Some(Value::Object(result)) => Ok(result),
        _ => Err(ResponseError::NotAnObject),
    }
}

#[cfg(test)]
#[path = "../../tests/src/helper/protocol_tests.rs"]
mod tests;
