//! Vault and contact identifiers with validation
//!
//! Azure assigns no id to a certificate contact, so [`ContactId`] is
//! fabricated locally as `{vault_id}/contacts/{email}` and must parse back
//! into exactly the parts it was built from.

use crate::core::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Separator between the vault id and the email in a [`ContactId`]
pub const CONTACTS_SEGMENT: &str = "/contacts/";

const PROVIDER_NAMESPACE: &str = "Microsoft.KeyVault";
const VAULT_ID_SEGMENTS: usize = 8;
const MIN_VAULT_NAME: usize = 3;
const MAX_VAULT_NAME: usize = 24;

/// Azure resource id of a Key Vault
///
/// Format: `/subscriptions/{subscription}/resourceGroups/{group}/providers/Microsoft.KeyVault/vaults/{name}`.
/// Segment keys are matched case-insensitively; the original text is kept
/// verbatim so ids round-trip exactly.
///
/// # Examples
///
/// ```
/// use keyvault_contacts::VaultId;
///
/// let id: VaultId = "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv-prod"
///     .parse()
///     .unwrap();
/// assert_eq!(id.name(), "kv-prod");
/// assert_eq!(id.resource_group(), "rg");
///
/// assert!("/subscriptions/0000/resourceGroups/rg".parse::<VaultId>().is_err());
/// ```
///
/// Equality and hashing ignore ASCII case, like Azure does.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VaultId {
    raw: String,
    subscription_id: String,
    resource_group: String,
    name: String,
}

impl VaultId {
    /// Parses and validates a vault resource id
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = id.into();
        let invalid = |reason: &str| ValidationError::InvalidVaultId {
            id: raw.clone(),
            reason: reason.to_string(),
        };

        let Some(rest) = raw.strip_prefix('/') else {
            return Err(invalid("must start with '/'"));
        };

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.len() != VAULT_ID_SEGMENTS {
            return Err(invalid(
                "expected /subscriptions/{id}/resourceGroups/{name}/providers/Microsoft.KeyVault/vaults/{name}",
            ));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("contains an empty segment"));
        }

        let expect_key = |idx: usize, key: &str| -> Result<(), ValidationError> {
            if segments[idx].eq_ignore_ascii_case(key) {
                Ok(())
            } else {
                Err(invalid(&format!(
                    "expected segment '{key}', found '{}'",
                    segments[idx]
                )))
            }
        };
        expect_key(0, "subscriptions")?;
        expect_key(2, "resourceGroups")?;
        expect_key(4, "providers")?;
        expect_key(5, PROVIDER_NAMESPACE)?;
        expect_key(6, "vaults")?;

        validate_vault_name(segments[7]).map_err(|reason| invalid(&reason))?;

        Ok(Self {
            subscription_id: segments[1].to_string(),
            resource_group: segments[3].to_string(),
            name: segments[7].to_string(),
            raw,
        })
    }

    /// Subscription the vault lives in
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Resource group the vault lives in
    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    /// Vault name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource id as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Vault names: 3-24 alphanumerics or hyphens, starting with a letter,
/// ending with a letter or digit, with no consecutive hyphens.
fn validate_vault_name(name: &str) -> Result<(), String> {
    if !(MIN_VAULT_NAME..=MAX_VAULT_NAME).contains(&name.len()) {
        return Err(format!(
            "vault name must be between {MIN_VAULT_NAME} and {MAX_VAULT_NAME} characters"
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("vault name may only contain alphanumeric characters and dashes".into());
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err("vault name must start with a letter".into());
    }
    if name.ends_with('-') {
        return Err("vault name must end with a letter or digit".into());
    }
    if name.contains("--") {
        return Err("vault name cannot contain consecutive dashes".into());
    }
    Ok(())
}

impl PartialEq for VaultId {
    fn eq(&self, other: &Self) -> bool {
        self.raw.eq_ignore_ascii_case(&other.raw)
    }
}

impl Eq for VaultId {}

impl Hash for VaultId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.raw.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VaultId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VaultId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VaultId> for String {
    fn from(id: VaultId) -> Self {
        id.raw
    }
}

/// Locally fabricated certificate contact id: `{vault_id}/contacts/{email}`
///
/// # Examples
///
/// ```
/// use keyvault_contacts::{ContactId, VaultId};
///
/// let vault: VaultId = "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv-prod"
///     .parse()
///     .unwrap();
/// let id = ContactId::new(vault.clone(), "ops@example.com").unwrap();
///
/// let parsed: ContactId = id.to_string().parse().unwrap();
/// assert_eq!(parsed.vault_id(), &vault);
/// assert_eq!(parsed.email(), "ops@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContactId {
    vault_id: VaultId,
    email: String,
}

impl ContactId {
    /// Builds an id from its parts
    pub fn new(vault_id: VaultId, email: impl Into<String>) -> Result<Self, ValidationError> {
        let email = email.into();
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail);
        }
        Ok(Self { vault_id, email })
    }

    /// Parses `{vault_id}/contacts/{email}`
    ///
    /// The vault id is the fixed-length prefix of eight segments, so resource
    /// groups named `contacts` and emails containing `/contacts/` both parse.
    pub fn parse(id: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidContactId {
            id: id.to_string(),
            reason,
        };

        // The ninth '/' ends the vault id.
        let vault_end = id
            .match_indices('/')
            .nth(VAULT_ID_SEGMENTS)
            .map(|(index, _)| index)
            .ok_or_else(|| invalid(format!("missing '{CONTACTS_SEGMENT}' segment")))?;
        let (vault, rest) = id.split_at(vault_end);

        let email = rest
            .strip_prefix(CONTACTS_SEGMENT)
            .ok_or_else(|| invalid(format!("missing '{CONTACTS_SEGMENT}' segment")))?;
        if email.is_empty() {
            return Err(invalid("email segment is empty".to_string()));
        }

        let vault_id = VaultId::new(vault).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            vault_id,
            email: email.to_string(),
        })
    }

    /// Parent vault
    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    /// Contact email
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{CONTACTS_SEGMENT}{}", self.vault_id, self.email)
    }
}

impl FromStr for ContactId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContactId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContactId> for String {
    fn from(id: ContactId) -> Self {
        id.to_string()
    }
}
