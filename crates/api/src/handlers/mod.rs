//! Request handlers, one module per resource.
//!
//! The helpers here read request bodies in the shapes several resources
//! share: JSON objects sent without a strict content type, and multipart
//! forms mixing files and text fields.

pub mod backups;
pub mod blessings;
pub mod collections;
pub mod couple;
pub mod payments;
pub mod site_data;
pub mod telegram;
pub mod uploads;

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Parse a request body that must be a non-empty JSON object.
pub(crate) fn json_object(body: &Bytes) -> AppResult<Map<String, Value>> {
    if body.is_empty() {
        return Err(AppError::BadRequest("No data provided".into()));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        Ok(_) => Err(AppError::BadRequest("No data provided".into())),
        Err(e) => Err(AppError::BadRequest(format!("Invalid JSON: {e}"))),
    }
}

/// Parse a JSON request body into `T`. An empty body reads as `{}`.
pub(crate) fn json_body<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    let slice: &[u8] = if body.is_empty() { b"{}" } else { &body[..] };
    serde_json::from_slice(slice).map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))
}

/// Map a multipart read failure, keeping the body-limit case as 413.
pub(crate) fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// A file part of a multipart form.
#[derive(Debug)]
pub(crate) struct UploadedFile {
    /// Client-supplied file name, unsanitized.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// All parts of a multipart form.
#[derive(Debug, Default)]
pub(crate) struct Form {
    pub files: HashMap<String, UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl Form {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Take a file part that carries a non-empty file name.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name).filter(|f| !f.filename.is_empty())
    }
}

/// Read every part of a multipart form. File parts larger than `max_bytes`
/// are rejected with 413.
pub(crate) async fn read_form(mut multipart: Multipart, max_bytes: usize) -> AppResult<Form> {
    let mut form = Form::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > max_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "File exceeds the {:.0} MB limit",
                        max_bytes as f64 / (1024.0 * 1024.0)
                    )));
                }
                form.files.insert(
                    name,
                    UploadedFile {
                        filename,
                        bytes: data.to_vec(),
                    },
                );
            }
            None => {
                let text = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, text);
            }
        }
    }

    Ok(form)
}

/// Current Unix time in seconds.
pub(crate) fn unix_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
