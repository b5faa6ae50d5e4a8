//! ERP Client
//!
//! Main client for the ERP resource API, combining connection configuration,
//! credential selection and HTTP functionality.

use super::auth::{select_authorization, AuthMethod, CredentialStore};
use super::error::ErpError;
use super::http::ErpHttpClient;
use super::query::ListQuery;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Body value of `message` returned by a successful login
pub const LOGIN_SUCCESS_MESSAGE: &str = "Logged In";

/// Environment variable holding the ERP base endpoint
pub const ENV_URL: &str = "ERPNEXT_URL";
/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "ERPNEXT_API_KEY";
/// Environment variable holding the API secret
pub const ENV_API_SECRET: &str = "ERPNEXT_API_SECRET";

/// Connection settings, fixed for the lifetime of a client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionConfig {
    pub base_endpoint: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Transport timeout; `None` keeps the HTTP client default
    pub timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn new(base_endpoint: &str) -> Self {
        Self {
            base_endpoint: base_endpoint.to_string(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: &str, secret: &str) -> Self {
        self.api_key = Some(key.to_string());
        self.api_secret = Some(secret.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read settings from the process environment
    ///
    /// Missing variables become an empty endpoint / no key, never an error.
    pub fn from_env() -> Self {
        Self {
            base_endpoint: std::env::var(ENV_URL).unwrap_or_default(),
            api_key: std::env::var(ENV_API_KEY).ok().filter(|s| !s.is_empty()),
            api_secret: std::env::var(ENV_API_SECRET).ok().filter(|s| !s.is_empty()),
            timeout: None,
        }
    }

    /// Whether the endpoint parses as an absolute http(s) URL
    pub fn has_valid_endpoint(&self) -> bool {
        url::Url::parse(&self.base_endpoint)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

/// Main ERP client
#[derive(Clone)]
pub struct ErpClient {
    config: ConnectionConfig,
    base: String,
    http: ErpHttpClient,
    credentials: Arc<dyn CredentialStore>,
}

impl ErpClient {
    /// Create a new ERP client
    ///
    /// An empty or malformed endpoint is only logged; requests then fail at the
    /// transport layer.
    pub fn new(config: ConnectionConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self, ErpError> {
        if !config.has_valid_endpoint() {
            tracing::warn!(
                "ERP endpoint {:?} is not a valid URL; requests will fail",
                config.base_endpoint
            );
        }

        let http = ErpHttpClient::new(config.timeout)?;
        let base = config.base_endpoint.trim_end_matches('/').to_string();

        Ok(Self {
            config,
            base,
            http,
            credentials,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn base_endpoint(&self) -> &str {
        &self.base
    }

    /// Credential the next request will carry
    pub fn auth_method(&self) -> AuthMethod {
        self.authorization().0
    }

    /// Recomputed on every request; the session token may change between calls
    fn authorization(&self) -> (AuthMethod, Option<String>) {
        let session = self.credentials.get();
        select_authorization(
            session.as_deref(),
            self.config.api_key.as_deref(),
            self.config.api_secret.as_deref(),
        )
    }

    fn auth_header(&self) -> Option<String> {
        let (method, header) = self.authorization();
        tracing::trace!("Using {} authentication", method.display_name());
        header
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build resource collection URL
    pub fn resource_url(&self, doctype: &str) -> String {
        format!("{}/api/resource/{}", self.base, urlencoding::encode(doctype))
    }

    /// Build single document URL
    pub fn doc_url(&self, doctype: &str, name: &str) -> String {
        format!("{}/{}", self.resource_url(doctype), urlencoding::encode(name))
    }

    /// Build remote method URL; the method name is used verbatim
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/api/method/{}", self.base, method)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in with username and password, persisting the returned session token
    pub async fn login(&self, username: &str, password: &str) -> Result<Value, ErpError> {
        let body = json!({ "usr": username, "pwd": password });
        let response = self
            .http
            .post(&self.method_url("login"), self.auth_header().as_deref(), Some(&body))
            .await?;

        if response.get("message").and_then(|m| m.as_str()) != Some(LOGIN_SUCCESS_MESSAGE) {
            let message = response
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unexpected login response")
                .to_string();
            tracing::warn!("Login rejected for user {}", username);
            return Err(ErpError::Authentication(message));
        }

        let token = response.get("token").and_then(|t| t.as_str()).unwrap_or("");
        self.credentials.set(token);
        tracing::info!("Logged in as {}", username);

        Ok(response)
    }

    /// Log out on the server, then always drop the local session
    ///
    /// The local token is cleared even when the server call fails; the server
    /// error is still returned.
    pub async fn logout(&self) -> Result<Value, ErpError> {
        let result = self
            .http
            .post(&self.method_url("logout"), self.auth_header().as_deref(), None)
            .await;

        self.credentials.clear();

        if let Err(ref e) = result {
            tracing::warn!("Server logout failed, local session cleared anyway: {}", e);
        }
        result
    }

    /// Name of the user the current credential belongs to
    pub async fn logged_user(&self) -> Result<String, ErpError> {
        let response = self.call_method("frappe.auth.get_logged_user", None).await?;
        Ok(response
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string())
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// List documents of a doctype; returns the full response body
    pub async fn get_list(&self, query: &ListQuery) -> Result<Value, ErpError> {
        let url = self.resource_url(&query.doctype);
        self.http
            .get(&url, self.auth_header().as_deref(), &query.to_query_pairs())
            .await
    }

    /// Fetch one document; returns its `data` payload
    pub async fn get_doc(&self, doctype: &str, name: &str) -> Result<Value, ErpError> {
        let response = self
            .http
            .get(&self.doc_url(doctype, name), self.auth_header().as_deref(), &[])
            .await?;
        Ok(unwrap_data(response))
    }

    /// Fetch one document decoded into a caller-provided schema
    pub async fn get_doc_as<T: DeserializeOwned>(&self, doctype: &str, name: &str) -> Result<T, ErpError> {
        let data = self.get_doc(doctype, name).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Create a document; returns the stored document
    pub async fn create_doc<D: Serialize + ?Sized>(&self, doctype: &str, data: &D) -> Result<Value, ErpError> {
        let body = serde_json::to_value(data)?;
        let response = self
            .http
            .post(&self.resource_url(doctype), self.auth_header().as_deref(), Some(&body))
            .await?;
        Ok(unwrap_data(response))
    }

    /// Create a document and decode the stored version into a caller-provided schema
    pub async fn create_doc_as<D, T>(&self, doctype: &str, data: &D) -> Result<T, ErpError>
    where
        D: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let created = self.create_doc(doctype, data).await?;
        Ok(serde_json::from_value(created)?)
    }

    /// Replace or patch an existing document; returns the updated document
    pub async fn update_doc<D: Serialize + ?Sized>(
        &self,
        doctype: &str,
        name: &str,
        data: &D,
    ) -> Result<Value, ErpError> {
        let body = serde_json::to_value(data)?;
        let response = self
            .http
            .put(&self.doc_url(doctype, name), self.auth_header().as_deref(), &body)
            .await?;
        Ok(unwrap_data(response))
    }

    /// Delete a document; returns the raw response body
    pub async fn delete_doc(&self, doctype: &str, name: &str) -> Result<Value, ErpError> {
        self.http
            .delete(&self.doc_url(doctype, name), self.auth_header().as_deref())
            .await
    }

    /// Invoke an arbitrary server method; returns the raw response body
    pub async fn call_method(&self, method: &str, args: Option<&Value>) -> Result<Value, ErpError> {
        self.http
            .post(&self.method_url(method), self.auth_header().as_deref(), args)
            .await
    }
}

/// Extract the `data` member of a resource response
fn unwrap_data(mut response: Value) -> Value {
    response
        .get_mut("data")
        .map(Value::take)
        .unwrap_or(Value::Null)
}
