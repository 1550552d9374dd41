//! Thin HTTP client for the marine backend
//!
//! Three request kinds, one failure contract: a non-success status becomes
//! [`Error::HttpStatus`], everything that goes wrong on the wire or while
//! decoding becomes [`Error::Transport`]. No retries happen here; retry and
//! fallback policy belongs to the callers.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::upload::{FilePayload, FILE_FIELD};
use crate::url::{QueryParams, UrlBuilder};

/// Body of a request; exactly one kind per request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// Sent as GET
    #[default]
    None,
    Json(Value),
    Multipart(FilePayload),
}

/// A backend request as data
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub path: String,
    pub params: QueryParams,
    pub body: RequestBody,
}

impl RequestSpec {
    pub fn get(path: &str) -> Self {
        Self {
            path: path.to_string(),
            params: QueryParams::new(),
            body: RequestBody::None,
        }
    }

    pub fn json(path: &str, body: Value) -> Self {
        Self {
            body: RequestBody::Json(body),
            ..Self::get(path)
        }
    }

    pub fn multipart(path: &str, file: FilePayload) -> Self {
        Self {
            body: RequestBody::Multipart(file),
            ..Self::get(path)
        }
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }
}

/// JSON API client sharing one URL builder across all requests
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    urls: UrlBuilder,
    origin: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            urls: UrlBuilder::from_config(config)?,
            origin: config.origin.trim_end_matches('/').to_string(),
        })
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    /// Origin that origin-relative URLs are sent to
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Resolve a path into the URL that will actually be dispatched
    pub fn resolve(&self, path: &str, params: &QueryParams) -> Result<String> {
        Ok(self.urls.build(path, params)?.with_origin(&self.origin))
    }

    /// GET and decode a JSON body
    pub async fn get_json(&self, path: &str, params: &QueryParams) -> Result<Value> {
        let url = self.resolve(path, params)?;
        debug!(%url, "GET");
        let request = self.http_client.get(&url).header(ACCEPT, "application/json");
        self.send(path, request).await
    }

    /// POST an optional JSON body
    pub async fn post_json<B>(
        &self,
        path: &str,
        params: &QueryParams,
        body: Option<&B>,
    ) -> Result<Value>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.resolve(path, params)?;
        debug!(%url, "POST json");
        let mut request = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }
        self.send(path, request).await
    }

    /// POST a single file as `multipart/form-data`
    ///
    /// The content type (with its boundary) is set by the multipart encoder.
    pub async fn post_multipart(
        &self,
        path: &str,
        params: &QueryParams,
        file: &FilePayload,
    ) -> Result<Value> {
        let url = self.resolve(path, params)?;
        debug!(%url, file = %file.file_name, bytes = file.bytes.len(), "POST multipart");
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part(FILE_FIELD, part);
        let request = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .multipart(form);
        self.send(path, request).await
    }

    /// Dispatch a [`RequestSpec`] to the matching request kind
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Value> {
        match &spec.body {
            RequestBody::None => self.get_json(&spec.path, &spec.params).await,
            RequestBody::Json(body) => {
                self.post_json(&spec.path, &spec.params, Some(body)).await
            }
            RequestBody::Multipart(file) => {
                self.post_multipart(&spec.path, &spec.params, file).await
            }
        }
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(path, status = status.as_u16(), "Non-success status");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}
