//! HTTP transport seam.
//!
//! The client is generic over [`Transport`] so that request building and
//! response handling can be tested without a listening backend. The real
//! implementation is [`HyperTransport`].

use std::future::Future;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::error::{ApiError, ApiResult};

/// One outgoing request, already resolved to an absolute URL.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    /// JSON body, when present.
    pub body: Option<Bytes>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn with_json_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }
}

/// One response, with the body fully collected.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Sends a request and collects the response body.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = ApiResult<ApiResponse>> + Send;
}

/// Production transport over a pooled hyper HTTP/1 client.
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn network_error(endpoint: &str, source: impl std::error::Error + Send + Sync + 'static) -> ApiError {
    ApiError::Network {
        endpoint: endpoint.to_string(),
        source: Box::new(source),
    }
}

impl Transport for HyperTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let endpoint = request.url.clone();
        let uri: Uri = request
            .url
            .parse()
            .map_err(|err: http::uri::InvalidUri| network_error(&endpoint, err))?;

        let mut builder = http::Request::builder()
            .method(request.method.clone())
            .uri(uri)
            .header(ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match request.body {
            Some(bytes) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Full::new(bytes)
            }
            None => Full::new(Bytes::new()),
        };
        let req = builder
            .body(body)
            .map_err(|err| network_error(&endpoint, err))?;

        tracing::debug!(method = %request.method, url = %endpoint, "sending request");
        let response = self
            .client
            .request(req)
            .await
            .map_err(|err| network_error(&endpoint, err))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|err| network_error(&endpoint, err))?
            .to_bytes();
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(ApiResponse { status, body })
    }
}
