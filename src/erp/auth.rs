//! ERP Authentication
//!
//! Session token persistence and per-request credential selection.
//!
//! A session token obtained from `login` takes precedence over a configured
//! API key/secret pair. The choice is recomputed for every request so that a
//! login or logout between two calls is picked up immediately.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Pluggable storage for the session token
///
/// Implementations only persist the token; they never validate it.
pub trait CredentialStore: Send + Sync {
    /// Current token, if any
    fn get(&self) -> Option<String>;

    /// Replace the stored token
    fn set(&self, token: &str);

    /// Remove the stored token
    fn clear(&self);
}

/// In-process token storage
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a session token
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn set(&self, token: &str) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }
}

/// Token storage backed by a single file, shared between CLI invocations
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Default session file location (~/.config/terp/session)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("terp").join("session"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn write_token(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // Session file is readable by the owner only, from the moment it exists
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // A file left by an older version may still carry wider permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(token.as_bytes())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        std::fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
    }

    fn set(&self, token: &str) {
        let Ok(_guard) = self.lock.lock() else {
            return;
        };
        if let Err(e) = self.write_token(token) {
            tracing::warn!("Failed to persist session token to {:?}: {}", self.path, e);
        }
    }

    fn clear(&self) {
        let Ok(_guard) = self.lock.lock() else {
            return;
        };
        match std::fs::remove_file(&self.path) {
            Ok(()) => {},
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => tracing::warn!("Failed to remove session file {:?}: {}", self.path, e),
        }
    }
}

/// Which credential an outgoing request carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Session,
    ApiKey,
    Anonymous,
}

impl AuthMethod {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::ApiKey => "api key",
            Self::Anonymous => "anonymous",
        }
    }
}

/// Select the `Authorization` header value for one request
///
/// Precedence: non-empty session token, then API key + secret (both non-empty),
/// then nothing.
pub fn select_authorization(
    session_token: Option<&str>,
    api_key: Option<&str>,
    api_secret: Option<&str>,
) -> (AuthMethod, Option<String>) {
    if let Some(token) = session_token.filter(|t| !t.is_empty()) {
        return (AuthMethod::Session, Some(format!("Bearer {}", token)));
    }

    match (
        api_key.filter(|k| !k.is_empty()),
        api_secret.filter(|s| !s.is_empty()),
    ) {
        (Some(key), Some(secret)) => (AuthMethod::ApiKey, Some(format!("token {}:{}", key, secret))),
        _ => (AuthMethod::Anonymous, None),
    }
}
