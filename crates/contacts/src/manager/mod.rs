//! Certificate contact controller and data reader
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────┐
//! │ ContactResource              │   │ ContactDataSource        │
//! │ create · read · update · del │   │ read(vault, email)       │
//! └──────────────┬───────────────┘   └────────────┬─────────────┘
//!                │ NamedLocks (per vault)         │
//!                └───────────────┬────────────────┘
//!                                │
//!        resolve_vault_base_url · fetch_contacts · find_by_email
//!                                │
//!          ┌─────────────────────┴─────────────────────┐
//!          │ VaultResolver               ContactsStore │
//!          │ (ARM / memory)      (Key Vault / memory)  │
//!          └───────────────────────────────────────────┘
//! ```

mod config;
mod data_source;
mod helpers;
mod locks;
mod resource;

pub use config::{DEFAULT_TIMEOUT, Timeouts};
pub use data_source::ContactDataSource;
pub use helpers::{VaultLookup, fetch_contacts, resolve_vault_base_url};
pub use locks::{NamedLockGuard, NamedLocks};
pub use resource::{ContactResource, ContactResourceBuilder, No, Yes};
