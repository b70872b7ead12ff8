//! Core types for certificate contact management

mod contact;
mod error;
mod id;

pub use contact::{Contact, ContactConfig, ContactState, Lookup, find_by_email};
pub use error::{ContactError, ProviderError, Result, ValidationError};
pub use id::{CONTACTS_SEGMENT, ContactId, VaultId};
