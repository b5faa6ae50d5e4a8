//! Data-access facade
//!
//! Maps list/document requests onto [`ErpClient`] calls through a
//! [`QueryCache`], and exposes a uniform snapshot shape to the view layer.
//!
//! # Architecture
//!
//! - [`keys`] - Cache key derivation from doctype + filters / doctype + name
//! - [`cache`] - Revalidate-on-demand result cache
//! - [`entities`] - Entity definitions (doctype, fields, columns)
//!
//! # Example
//!
//! ```ignore
//! use terp::data::{DataAccess, Entity};
//!
//! async fn show(data: &mut DataAccess) {
//!     let customers = data.load_list(&Entity::Customers.query(None)).await;
//!     if let Some(err) = &customers.is_error {
//!         eprintln!("{}", terp::erp::format_erp_error(err));
//!     }
//!     for record in &customers.records {
//!         println!("{}", record["customer_name"]);
//!     }
//! }
//! ```
//!
//! Errors never escape the facade: they are captured into `is_error` so the
//! view can keep rendering.

pub mod cache;
pub mod entities;
pub mod keys;

pub use cache::{CacheEntry, QueryCache};
pub use entities::{display_field, ColumnDef, Entity};
pub use keys::{doc_key, list_key};

use crate::erp::{ErpClient, ErpError, ListQuery};
use serde_json::Value;
use std::sync::Arc;

/// Snapshot of a list request
#[derive(Debug, Clone, Default)]
pub struct DocList {
    pub key: String,
    /// Records of the last successful response, `[]` until one arrives
    pub records: Vec<Value>,
    /// True while there is neither data nor an error for the key
    pub is_loading: bool,
    pub is_error: Option<Arc<ErpError>>,
}

/// Snapshot of a single document request
#[derive(Debug, Clone, Default)]
pub struct DocState {
    /// `None` when no document name was given; nothing is fetched then
    pub key: Option<String>,
    pub record: Option<Value>,
    pub is_loading: bool,
    pub is_error: Option<Arc<ErpError>>,
}

/// Facade over the resource client and its result cache
pub struct DataAccess {
    client: ErpClient,
    cache: QueryCache,
}

impl DataAccess {
    pub fn new(client: ErpClient) -> Self {
        Self::with_cache(client, QueryCache::default())
    }

    pub fn with_cache(client: ErpClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &ErpClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Current state of a list without touching the network
    pub fn doc_list(&self, query: &ListQuery) -> DocList {
        let key = list_key(&query.doctype, query.filters.as_ref());
        list_snapshot(key.clone(), self.cache.get(&key))
    }

    /// Fetch a list if its cache entry is missing or stale
    pub async fn load_list(&mut self, query: &ListQuery) -> DocList {
        let key = list_key(&query.doctype, query.filters.as_ref());
        let client = &self.client;
        let entry = self.cache.load(&key, || client.get_list(query)).await;
        list_snapshot(key, Some(entry))
    }

    /// Re-fetch a list regardless of cache state
    pub async fn refresh_list(&mut self, query: &ListQuery) -> DocList {
        let key = list_key(&query.doctype, query.filters.as_ref());
        let client = &self.client;
        let entry = self.cache.revalidate(&key, || client.get_list(query)).await;
        list_snapshot(key, Some(entry))
    }

    // =========================================================================
    // Single documents
    // =========================================================================

    /// Current state of a document without touching the network
    pub fn doc(&self, doctype: &str, name: Option<&str>) -> DocState {
        let key = doc_key(doctype, name);
        let entry = key.as_deref().and_then(|k| self.cache.get(k));
        doc_snapshot(key, entry)
    }

    /// Fetch a document if needed; an empty or absent name issues no request
    pub async fn load_doc(&mut self, doctype: &str, name: Option<&str>) -> DocState {
        let (Some(key), Some(name)) = (doc_key(doctype, name), name) else {
            return DocState::default();
        };
        let client = &self.client;
        let entry = self.cache.load(&key, || client.get_doc(doctype, name)).await;
        doc_snapshot(Some(key), Some(entry))
    }

    /// Re-fetch a document regardless of cache state
    pub async fn refresh_doc(&mut self, doctype: &str, name: Option<&str>) -> DocState {
        let (Some(key), Some(name)) = (doc_key(doctype, name), name) else {
            return DocState::default();
        };
        let client = &self.client;
        let entry = self.cache.revalidate(&key, || client.get_doc(doctype, name)).await;
        doc_snapshot(Some(key), Some(entry))
    }

    /// Forget everything cached for a doctype (lists and documents)
    pub fn invalidate_doctype(&mut self, doctype: &str) {
        self.cache.invalidate(doctype);
        self.cache.invalidate_prefix(&format!("{}-", doctype));
    }
}

fn list_snapshot(key: String, entry: Option<&CacheEntry>) -> DocList {
    let Some(entry) = entry else {
        return DocList {
            key,
            records: Vec::new(),
            is_loading: true,
            is_error: None,
        };
    };

    let records = entry
        .data
        .as_ref()
        .and_then(|d| d.get("data"))
        .and_then(|d| d.as_array())
        .cloned()
        .unwrap_or_default();

    DocList {
        key,
        records,
        is_loading: entry.error.is_none() && entry.data.is_none(),
        is_error: entry.error.clone(),
    }
}

fn doc_snapshot(key: Option<String>, entry: Option<&CacheEntry>) -> DocState {
    if key.is_none() {
        return DocState::default();
    }

    let Some(entry) = entry else {
        return DocState {
            key,
            record: None,
            is_loading: true,
            is_error: None,
        };
    };

    DocState {
        key,
        record: entry.data.clone().filter(|d| !d.is_null()),
        is_loading: entry.error.is_none() && entry.data.is_none(),
        is_error: entry.error.clone(),
    }
}
