//! terp - client and terminal UI for ERPNext
//!
//! - [`erp`] - Resource client: authentication, URL construction, document CRUD
//! - [`data`] - Data-access facade: cache keys, revalidating cache, entity definitions
//! - [`config`] - Persistent configuration layered with environment and CLI flags
//! - [`form`] - Customer creation form state
//! - [`notification`] - Operation notifications for the terminal UI

pub mod config;
pub mod data;
pub mod erp;
pub mod form;
pub mod notification;
