//! ERP API interaction module
//!
//! This module provides the resource client for ERPNext/Frappe servers:
//! authentication, URL construction, and generic document CRUD.
//!
//! # Module Structure
//!
//! - [`auth`] - Session token storage and per-request credential selection
//! - [`client`] - Main ERP client exposing login/logout and document operations
//! - [`error`] - Error taxonomy shared by every operation
//! - [`http`] - HTTP utilities for REST API calls
//! - [`query`] - Resource identifiers and list query descriptors
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use terp::erp::{ConnectionConfig, ErpClient, ListQuery, MemoryCredentialStore};
//!
//! async fn example() -> Result<(), terp::erp::ErpError> {
//!     let client = ErpClient::new(
//!         ConnectionConfig::new("https://erp.example.com").with_api_key("key", "secret"),
//!         Arc::new(MemoryCredentialStore::new()),
//!     )?;
//!     let customers = client
//!         .get_list(&ListQuery::new("Customer").fields(["name", "customer_name"]))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod query;

pub use auth::{AuthMethod, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use client::{ConnectionConfig, ErpClient};
pub use error::{format_erp_error, ErpError};
pub use query::{ListQuery, ResourceId};
