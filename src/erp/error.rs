//! ERP client errors
//!
//! Every failure of the resource client surfaces through [`ErpError`]. The client
//! never recovers locally; callers decide what to do.

use thiserror::Error;

/// Errors returned by [`ErpClient`](super::client::ErpClient) operations
#[derive(Debug, Error)]
pub enum ErpError {
    /// The server answered with a non-2xx status
    #[error("API request failed: {status}")]
    Transport { status: u16, body: String },

    /// Login did not return the success marker
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Request could not be built or sent (bad endpoint, DNS, connection refused, ...)
    #[error("Failed to send request: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not valid JSON, or did not match the requested schema
    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ErpError {
    /// HTTP status of a transport error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for 404 responses
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Format an ERP error for display
/// Security: Maps status codes to generic messages instead of echoing server bodies
pub fn format_erp_error(error: &ErpError) -> String {
    match error {
        ErpError::Authentication(_) => {
            return "Login failed. Check your username and password.".to_string();
        },
        ErpError::Decode(_) => {
            return "Unexpected response from server.".to_string();
        },
        ErpError::Network(e) if e.is_builder() => {
            return "Invalid ERP endpoint. Set ERPNEXT_URL or use --url.".to_string();
        },
        ErpError::Network(e) if e.is_timeout() => {
            return "Request timed out. Please try again.".to_string();
        },
        ErpError::Network(_) => {
            return "Could not reach the ERP server. Check your network connection.".to_string();
        },
        ErpError::Transport { .. } => {},
    }

    match error.status() {
        Some(401) => "Authentication failed. Run 'terp login' or configure an API key.".to_string(),
        Some(403) => "Permission denied. Check your ERP role permissions.".to_string(),
        Some(404) => "Document not found.".to_string(),
        Some(409) => "Document conflict. It may already exist or have been modified.".to_string(),
        Some(417) => "Validation failed on the server. Check the document fields.".to_string(),
        Some(429) => "Rate limit exceeded. Please try again later.".to_string(),
        Some(s) if s >= 500 => "ERP server error. Please try again.".to_string(),
        Some(s) => format!("Request failed with status {}.", s),
        None => "Request failed.".to_string(),
    }
}
