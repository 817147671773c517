//! Download response helper.
//!
//! Serves artifact bytes as an attachment with the filename the record was
//! registered under.

use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

/// Attachment download response
pub struct AttachmentResponse {
    data: Bytes,
    content_type: &'static str,
    filename: String,
}

impl AttachmentResponse {
    pub fn new(data: Bytes, content_type: &'static str, filename: impl Into<String>) -> Self {
        Self {
            data,
            content_type,
            filename: filename.into(),
        }
    }
}

impl IntoResponse for AttachmentResponse {
    fn into_response(self) -> Response {
        Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, self.content_type)
            .header(CONTENT_LENGTH, self.data.len())
            .header(
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .body(Body::from(self.data))
            .unwrap()
    }
}
