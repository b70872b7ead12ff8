//! Integration tests for ContactDataSource lookups

use keyvault_contacts::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

const VAULT: &str = "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv1";

fn setup() -> (ContactDataSource, Arc<MemoryBackend>, VaultId, String) {
    let backend = Arc::new(MemoryBackend::new());
    let vault: VaultId = VAULT.parse().unwrap();
    let url = backend.add_vault(&vault);
    backend.seed(
        &url,
        vec![
            Contact::new("a@example.com").with_name("A"),
            Contact::new("b@example.com").with_phone("555-0100"),
        ],
    );
    let source = ContactDataSource::new(backend.clone(), backend.clone());
    (source, backend, vault, url)
}

#[tokio::test]
async fn test_read_existing_contact() {
    let (source, _, vault, _) = setup();

    let state = source
        .read(&vault, "b@example.com")
        .await
        .unwrap()
        .found()
        .expect("contact should exist");

    assert_eq!(state.id.to_string(), format!("{VAULT}/contacts/b@example.com"));
    assert_eq!(state.name, None);
    assert_eq!(state.phone.as_deref(), Some("555-0100"));
}

#[rstest]
#[case::unknown_email("c@example.com")]
#[case::different_case("A@example.com")]
#[case::trailing_space("a@example.com ")]
#[tokio::test]
async fn test_read_miss_is_gone(#[case] email: &str) {
    let (source, _, vault, _) = setup();
    assert!(source.read(&vault, email).await.unwrap().is_gone());
}

#[tokio::test]
async fn test_read_without_contacts_object_is_gone() {
    let (source, backend, vault, url) = setup();
    backend.delete_contacts(&url).await.unwrap();
    assert!(source.read(&vault, "a@example.com").await.unwrap().is_gone());
}

#[tokio::test]
async fn test_read_missing_vault_is_gone() {
    let (source, backend, vault, _) = setup();
    backend.remove_vault(&vault);
    assert!(source.read(&vault, "a@example.com").await.unwrap().is_gone());
}

#[tokio::test]
async fn test_read_rejects_empty_email() {
    let (source, _, vault, _) = setup();
    let err = source.read(&vault, "").await.unwrap_err();
    assert!(matches!(err, ContactError::Validation(ValidationError::EmptyEmail)));
}

#[rstest]
#[case::exists(Operation::Exists)]
#[case::base_url(Operation::BaseUrl)]
#[case::get_contacts(Operation::GetContacts)]
#[tokio::test]
async fn test_read_propagates_backend_failure(#[case] operation: Operation) {
    let (source, backend, vault, _) = setup();
    backend.fail_next(operation);

    let err = source.read(&vault, "a@example.com").await.unwrap_err();

    let expected = match operation {
        Operation::Exists => matches!(err, ContactError::VaultLookup { .. }),
        Operation::BaseUrl => matches!(err, ContactError::VaultBaseUrl { .. }),
        _ => matches!(err, ContactError::ReadContacts { .. }),
    };
    assert!(expected, "unexpected error: {err}");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_read_deadline() {
    let backend = Arc::new(MemoryBackend::new().with_latency(Duration::from_secs(60)));
    let vault: VaultId = VAULT.parse().unwrap();
    backend.add_vault(&vault);
    let source = ContactDataSource::new(backend.clone(), backend)
        .with_timeout(Duration::from_secs(5));

    let err = source.read(&vault, "a@example.com").await.unwrap_err();
    assert!(matches!(err, ContactError::Timeout { operation: "read", .. }));
}

#[tokio::test]
async fn test_resource_data_source_shares_backend() {
    let backend = Arc::new(MemoryBackend::new());
    let vault: VaultId = VAULT.parse().unwrap();
    backend.add_vault(&vault);
    let resource = ContactResource::builder()
        .vaults(backend.clone())
        .contacts(backend.clone())
        .build();

    resource
        .create(&ContactConfig::new(vault.clone(), "ops@example.com").with_name("Ops"))
        .await
        .unwrap();

    let state = resource
        .data_source()
        .read(&vault, "ops@example.com")
        .await
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(state.name.as_deref(), Some("Ops"));
}
