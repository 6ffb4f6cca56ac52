//! Shared response envelope for API handlers.
//!
//! Successful responses use `{ "success": true, "message"?: ..., "data"?: ... }`.
//! Use [`ApiResponse`] instead of ad-hoc `serde_json::json!` so the envelope
//! stays consistent. Endpoints that add top-level keys define their own
//! `Serialize` struct with the same three leading fields.

use serde::Serialize;

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// `{ "success": true, "data": data }`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// `{ "success": true, "message": message, "data": data }`
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// `{ "success": true, "message": message }`
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}
