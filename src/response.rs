//! Error/response boundary.
//!
//! Converts core results into the external envelope an HTTP-ish caller
//! renders: `{"status": "success", "data": ...}` on the happy path,
//! `{"status": "error", "reason": ...}` otherwise. The numeric status code
//! travels out-of-band (it belongs in the transport, not the body). Routing
//! and content negotiation stay outside this crate.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceError;

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

/// External result envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,

    #[serde(flatten)]
    extra: BTreeMap<String, Value>,

    #[serde(skip)]
    code: u16,
}

impl<T: Serialize> ApiResponse<T> {
    /// A success envelope carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            status: STATUS_SUCCESS,
            data: Some(data),
            reason: None,
            extra: BTreeMap::new(),
            code: 200,
        }
    }

    /// A bare success envelope with no payload.
    pub fn success_empty() -> Self {
        Self {
            status: STATUS_SUCCESS,
            data: None,
            reason: None,
            extra: BTreeMap::new(),
            code: 200,
        }
    }

    /// An error envelope with an explicit status code.
    pub fn error(reason: impl Into<String>, code: u16) -> Self {
        Self {
            status: STATUS_ERROR,
            data: None,
            reason: Some(reason.into()),
            extra: BTreeMap::new(),
            code,
        }
    }

    /// Flatten validation messages into a single pipe-joined reason.
    pub fn validation_error(errors: &[String]) -> Self {
        Self::error(errors.join("|"), 422)
    }

    /// Fold a core result into an envelope.
    pub fn from_result(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::from(&err),
        }
    }

    /// Attach an extra top-level field to the serialized body.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Numeric status code for the transport layer.
    pub fn status_code(&self) -> u16 {
        self.code
    }

    /// Whether this is a success envelope.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Serialize the body to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<T: Serialize> From<&ServiceError> for ApiResponse<T> {
    fn from(err: &ServiceError) -> Self {
        Self::error(err.to_string(), err.status_code())
    }
}
