//! Function URL event and response shapes.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Failure to recover the request body text.
#[derive(Debug, Error)]
pub enum BodyError {
    /// `isBase64Encoded` was set but the body is not valid base64
    #[error("invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not UTF-8
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Inbound Lambda Function URL event (v2 payload format).
///
/// Only the fields the handler reads are modeled; everything else in the
/// platform event is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionUrlEvent {
    /// Request context carrying the HTTP method.
    pub request_context: RequestContext,
    /// Header map. Function URLs lowercase header names, but lookups are
    /// case-insensitive anyway.
    pub headers: HashMap<String, String>,
    /// Raw body, if any.
    pub body: Option<String>,
    /// Whether `body` is base64-encoded.
    pub is_base64_encoded: bool,
}

/// `requestContext` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    /// HTTP sub-object.
    pub http: HttpContext,
}

/// `requestContext.http` sub-object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpContext {
    /// HTTP method, uppercase.
    pub method: String,
}

impl FunctionUrlEvent {
    /// The HTTP method of the invocation.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.request_context.http.method
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body text, base64-decoded when the platform flagged it as encoded.
    ///
    /// # Errors
    /// Returns an error when a flagged body is not valid base64 or UTF-8.
    pub fn decoded_body(&self) -> Result<Option<String>, BodyError> {
        match &self.body {
            None => Ok(None),
            Some(raw) if self.is_base64_encoded => {
                let bytes = BASE64.decode(raw)?;
                Ok(Some(String::from_utf8(bytes)?))
            }
            Some(raw) => Ok(Some(raw.clone())),
        }
    }
}

/// Outbound HTTP-style response: status code plus JSON body. CORS headers
/// are the platform's job, not ours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// JSON-encoded body, omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ApiResponse {
    /// 204, empty body (preflight).
    #[must_use]
    pub const fn no_content() -> Self {
        Self {
            status_code: 204,
            body: None,
        }
    }

    /// Error response with a fixed-shape `{"error": ...}` body.
    #[must_use]
    pub fn error(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            body: Some(json!({ "error": message }).to_string()),
        }
    }

    /// 200 success body carrying the created record id.
    #[must_use]
    pub fn created(lead_id: i64) -> Self {
        Self {
            status_code: 200,
            body: Some(
                json!({
                    "success": true,
                    "message": "Opportunity created successfully!",
                    "leadId": lead_id,
                })
                .to_string(),
            ),
        }
    }

    /// Parse the body back into JSON, mainly for assertions.
    #[must_use]
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body.as_deref().and_then(|b| serde_json::from_str(b).ok())
    }
}
