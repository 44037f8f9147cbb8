//! Request/response plumbing for form submission.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{multipart, Client, Method};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Result, SubmitError, SubmissionConfig};
use crate::core::form::{FieldKind, Form};
use crate::core::lenient;
use crate::core::staging::FileHandle;

// ============================================================================
// Request
// ============================================================================

/// Everything needed to send a form: destination, method and body parts.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPayload {
    pub action: String,
    pub method: String,
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, FileHandle)>,
}

impl FormPayload {
    /// Serialize the form's current fields, staged files included.
    pub fn from_form(form: &Form) -> Self {
        let mut fields = Vec::new();
        let mut files = Vec::new();

        for field in form.fields() {
            match field.kind {
                FieldKind::File => {
                    files.extend(
                        field
                            .files()
                            .iter()
                            .map(|file| (field.name.clone(), file.clone())),
                    );
                }
                _ => fields.push((field.name.clone(), field.value().to_string())),
            }
        }

        Self {
            action: form.action.clone(),
            method: form.method(),
            fields,
            files,
        }
    }

    /// True for methods that carry no body; fields go in the query string.
    pub fn is_query_only(&self) -> bool {
        matches!(self.method.as_str(), "GET" | "HEAD")
    }

    fn into_multipart(self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for (name, file) in self.files {
            let mut part = multipart::Part::bytes(file.data().to_vec()).file_name(file.name.clone());
            if let Some(content_type) = file.content_type.as_deref() {
                part = part
                    .mime_str(content_type)
                    .map_err(|e| SubmitError::InvalidRequest(e.to_string()))?;
            }
            form = form.part(name, part);
        }
        Ok(form)
    }
}

// ============================================================================
// Response
// ============================================================================

/// The JSON envelope every AJAX endpoint answers with.
///
/// Endpoints add their own payload next to the envelope (`cover_letter`,
/// `fit_score`, offer fields); those land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    #[serde(default, deserialize_with = "lenient::truthy")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub redirect: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServerResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Sends a serialized form and decodes the server's answer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, payload: FormPayload) -> Result<ServerResponse>;
}

/// reqwest-backed transport that marks every request as programmatic.
pub struct HttpTransport {
    client: Client,
    base_url: Option<Url>,
}

impl HttpTransport {
    pub fn new(config: &SubmissionConfig) -> Result<Self> {
        let name = HeaderName::from_bytes(config.request_header.as_bytes())
            .map_err(|e| SubmitError::InvalidRequest(format!("header name: {e}")))?;
        let value = HeaderValue::from_str(&config.request_header_value)
            .map_err(|e| SubmitError::InvalidRequest(format!("header value: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(name, value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: None,
        })
    }

    /// Resolve relative form actions (`/upload_resume/`) against `base`.
    pub fn with_base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    fn resolve(&self, action: &str) -> Result<Url> {
        match &self.base_url {
            Some(base) => base
                .join(action)
                .map_err(|e| SubmitError::InvalidAction(format!("{action}: {e}"))),
            None => Url::parse(action).map_err(|e| SubmitError::InvalidAction(format!("{action}: {e}"))),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: FormPayload) -> Result<ServerResponse> {
        let url = self.resolve(&payload.action)?;
        let method = Method::from_bytes(payload.method.as_bytes())
            .map_err(|_| SubmitError::InvalidRequest(format!("method {}", payload.method)))?;

        tracing::info!(
            method = %method,
            url = %url,
            fields = payload.fields.len(),
            files = payload.files.len(),
            "submitting form"
        );

        let request = if payload.is_query_only() {
            self.client.request(method, url).query(&payload.fields)
        } else {
            self.client.request(method, url).multipart(payload.into_multipart()?)
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        // The envelope is read whatever the status; error pages without JSON
        // end up as parse failures.
        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(status = %status, "response body is not the JSON envelope");
            SubmitError::Parse(format!("HTTP {status}: {e}"))
        })
    }
}
