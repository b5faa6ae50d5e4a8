//! HTTP utilities for ERP REST API calls

use super::error::ErpError;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.chars().count() > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for ERP API calls
#[derive(Clone)]
pub struct ErpHttpClient {
    client: Client,
}

impl ErpHttpClient {
    /// Create a new HTTP client
    ///
    /// `timeout` is the only transport policy knob; `None` keeps reqwest's default.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ErpError> {
        let mut builder = Client::builder().user_agent(concat!("terp/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Make a GET request with optional query parameters
    pub async fn get(
        &self,
        url: &str,
        auth: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<Value, ErpError> {
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send(Method::GET, url, request, auth).await
    }

    /// Make a POST request with an optional JSON body
    pub async fn post(
        &self,
        url: &str,
        auth: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, ErpError> {
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(Method::POST, url, request, auth).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, auth: Option<&str>, body: &Value) -> Result<Value, ErpError> {
        let request = self.client.put(url).json(body);
        self.send(Method::PUT, url, request, auth).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, auth: Option<&str>) -> Result<Value, ErpError> {
        let request = self.client.delete(url);
        self.send(Method::DELETE, url, request, auth).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        mut request: RequestBuilder,
        auth: Option<&str>,
    ) -> Result<Value, ErpError> {
        tracing::debug!("{} {}", method, url);

        if let Some(value) = auth {
            request = request.header(AUTHORIZATION, value);
        }

        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ErpError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        // Handle empty response
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("truncated, 500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc\u{1b}[31m"), "abc[31m");
    }

    #[test]
    fn test_sanitize_keeps_short_bodies() {
        assert_eq!(sanitize_for_log("{\"exc\": \"boom\"}"), "{\"exc\": \"boom\"}");
    }
}
