//! # HTTP Core
//!
//! Bearer-auth JSON transport shared by every endpoint wrapper.
//!
//! ## Error Body Contract
//! The backend reports failures as `{"error": "<message>"}`. The message
//! is surfaced verbatim to the operator; when the body is not that shape
//! (proxies, HTML error pages), the raw text is used instead.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::customers::CustomersApi;
use crate::error::{ClientError, ClientResult};
use crate::orders::OrdersApi;
use crate::products::ProductsApi;

/// Header carrying the checkout's idempotency key on `POST /orders`.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

// =============================================================================
// Error Body
// =============================================================================

/// The backend's error envelope.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Extracts the server's error message, falling back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.trim().to_string(),
    }
}

/// Maps a non-success status and its body onto the error taxonomy.
///
/// Pure so the mapping is testable without a live server.
fn classify(status: StatusCode, body: &str) -> ClientError {
    let message = error_message(body);

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::Validation(message)
        }
        // 5xx and anything exotic: the server's problem, retryable
        s => ClientError::Server {
            status: s.as_u16(),
            message,
        },
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

/// Low-level HTTP client for the backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Creates a new HTTP client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(HttpClient {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Replaces the bearer token (after a fresh login).
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Joins the base URL with an endpoint path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Builds the authorization header value.
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Makes a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.endpoint(path);
        debug!(url = %url, "GET");

        let mut request = self.client.get(&url);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.post_inner(path, body, None).await
    }

    /// Makes a POST request with a JSON body and an `Idempotency-Key`.
    pub async fn post_idempotent<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: &str,
    ) -> ClientResult<T> {
        self.post_inner(path, body, Some(idempotency_key)).await
    }

    async fn post_inner<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<&str>,
    ) -> ClientResult<T> {
        let url = self.endpoint(path);
        debug!(url = %url, idempotent = idempotency_key.is_some(), "POST");

        let mut request = self.client.post(&url).json(body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Makes a POST request without a body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.endpoint(path);
        debug!(url = %url, "POST (empty)");

        let mut request = self.client.post(&url);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Makes a DELETE request, discarding any success body.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let url = self.endpoint(path);
        debug!(url = %url, "DELETE");

        let mut request = self.client.delete(&url);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify(status, &text));
        }

        Ok(())
    }

    /// Handles an HTTP response: classify failures, decode success JSON.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify(status, &text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

// =============================================================================
// Backend Facade
// =============================================================================

/// Typed access to the backend, grouped by entity.
///
/// ## Usage
/// ```rust,ignore
/// let backend = Backend::new(&config)?;
/// let product = backend.products().by_barcode("5449000000996").await?;
/// let ack = backend.orders().create(&request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Backend {
    http: HttpClient,
}

impl Backend {
    /// Creates a backend facade from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Backend {
            http: HttpClient::new(config)?,
        })
    }

    /// Wraps an existing HTTP client.
    pub fn from_http(http: HttpClient) -> Self {
        Backend { http }
    }

    /// Product catalog endpoints.
    pub fn products(&self) -> ProductsApi {
        ProductsApi::new(self.http.clone())
    }

    /// Customer endpoints.
    pub fn customers(&self) -> CustomersApi {
        CustomersApi::new(self.http.clone())
    }

    /// Order and payment-method endpoints.
    pub fn orders(&self) -> OrdersApi {
        OrdersApi::new(self.http.clone())
    }

    /// The underlying HTTP client (for the session monitor).
    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_parses_envelope() {
        assert_eq!(
            error_message(r#"{"error":"Insufficient stock for COKE-330"}"#),
            "Insufficient stock for COKE-330"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_raw_text() {
        assert_eq!(error_message("  502 Bad Gateway  "), "502 Bad Gateway");
        assert_eq!(error_message(r#"{"detail":"x"}"#), r#"{"detail":"x"}"#);
    }

    #[test]
    fn test_classify_statuses() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, ""),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, r#"{"error":"role"}"#),
            ClientError::Forbidden(m) if m == "role"
        ));
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, r#"{"error":"no such order"}"#),
            ClientError::NotFound(m) if m == "no such order"
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, r#"{"error":"bad cart"}"#),
            ClientError::Validation(m) if m == "bad cart"
        ));
        assert!(matches!(
            classify(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error":"caps"}"#),
            ClientError::Validation(_)
        ));
        assert!(matches!(
            classify(StatusCode::SERVICE_UNAVAILABLE, ""),
            ClientError::Server { status: 503, .. }
        ));
    }

    #[test]
    fn test_classified_retryability_matches_taxonomy() {
        assert!(classify(StatusCode::INTERNAL_SERVER_ERROR, "").is_retryable());
        assert!(!classify(StatusCode::BAD_REQUEST, "").is_retryable());
        assert!(!classify(StatusCode::UNAUTHORIZED, "").is_retryable());
    }

    #[test]
    fn test_endpoint_joining() {
        let config = ClientConfig::new("https://pos.example.com/api/").unwrap();
        let http = HttpClient::new(&config).unwrap();

        assert_eq!(
            http.endpoint("/products"),
            "https://pos.example.com/api/products"
        );
        assert_eq!(
            http.endpoint("orders/o-1/cancel"),
            "https://pos.example.com/api/orders/o-1/cancel"
        );
    }
}
