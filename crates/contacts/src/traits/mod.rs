//! Collaborator traits: vault resolution and contact list storage

mod store;
mod vault;

pub use store::ContactsStore;
pub use vault::VaultResolver;
