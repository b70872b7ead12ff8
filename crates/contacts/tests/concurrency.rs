//! Concurrency tests for the per-vault lock
//!
//! The memory backend's latency sits between reading and writing the list,
//! so unserialized writers would overwrite each other's additions.

use keyvault_contacts::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

fn vault(name: &str) -> VaultId {
    format!("/subscriptions/0000/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/{name}")
        .parse()
        .unwrap()
}

fn resource(backend: &Arc<MemoryBackend>, locks: &Arc<NamedLocks>) -> ContactResource {
    ContactResource::builder()
        .vaults(backend.clone())
        .contacts(backend.clone())
        .locks(Arc::clone(locks))
        .build()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_creates_on_one_vault_all_persist() {
    // GIVEN: One vault and a slow backend
    let backend = Arc::new(MemoryBackend::new().with_latency(Duration::from_millis(20)));
    let locks = Arc::new(NamedLocks::new());
    let kv = vault("kv1");
    let url = backend.add_vault(&kv);

    // WHEN: Ten controllers sharing the lock map create contacts at once
    let mut tasks = JoinSet::new();
    for i in 0..10 {
        let resource = resource(&backend, &locks);
        let config = ContactConfig::new(kv.clone(), format!("user{i}@example.com"));
        tasks.spawn(async move { resource.create(&config).await });
    }
    while let Some(result) = tasks.join_next().await {
        assert!(result.unwrap().unwrap().found().is_some());
    }

    // THEN: Every contact survived
    let mut emails: Vec<_> = backend
        .contacts(&url)
        .unwrap()
        .into_iter()
        .map(|c| c.email)
        .collect();
    emails.sort();
    let mut expected: Vec<_> = (0..10).map(|i| format!("user{i}@example.com")).collect();
    expected.sort();
    assert_eq!(emails, expected);

    // AND: The lock map is empty again
    assert!(locks.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_mutations_leave_consistent_list() {
    let backend = Arc::new(MemoryBackend::new().with_latency(Duration::from_millis(10)));
    let locks = Arc::new(NamedLocks::new());
    let kv = vault("kv1");
    let url = backend.add_vault(&kv);
    backend.seed(
        &url,
        (0..6).map(|i| Contact::new(format!("old{i}@example.com"))).collect(),
    );

    let mut tasks = JoinSet::new();
    for i in 0..6 {
        let resource = resource(&backend, &locks);
        let kv = kv.clone();
        tasks.spawn(async move {
            let id = ContactId::new(kv.clone(), format!("old{i}@example.com")).unwrap();
            let state = resource.read(&id).await.unwrap().found().unwrap();
            if i % 2 == 0 {
                resource.delete(&state).await.unwrap();
            } else {
                resource
                    .update(&state, &state.to_config().with_name(format!("Old {i}")))
                    .await
                    .unwrap();
            }
            resource
                .create(&ContactConfig::new(kv, format!("new{i}@example.com")))
                .await
                .unwrap();
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    let list = backend.contacts(&url).unwrap();
    assert_eq!(list.len(), 9);
    for i in 0..6 {
        let old = list.iter().find(|c| c.email == format!("old{i}@example.com"));
        if i % 2 == 0 {
            assert!(old.is_none());
        } else {
            assert_eq!(old.unwrap().name, Some(format!("Old {i}")));
        }
        assert!(list.iter().any(|c| c.email == format!("new{i}@example.com")));
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_different_vaults_do_not_serialize() {
    // GIVEN: Two vaults on a backend where each list read takes a second
    let backend = Arc::new(MemoryBackend::new().with_latency(Duration::from_secs(1)));
    let locks = Arc::new(NamedLocks::new());
    let first = vault("kv1");
    let second = vault("kv2");
    backend.add_vault(&first);
    backend.add_vault(&second);

    // WHEN: One create runs against each vault concurrently
    let started = tokio::time::Instant::now();
    let a = resource(&backend, &locks);
    let b = resource(&backend, &locks);
    let first_config = ContactConfig::new(first, "a@example.com");
    let second_config = ContactConfig::new(second, "b@example.com");
    let (ra, rb) = tokio::join!(a.create(&first_config), b.create(&second_config));
    ra.unwrap();
    rb.unwrap();

    // THEN: They overlap; each create reads its list twice
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_same_vault_serializes() {
    let backend = Arc::new(MemoryBackend::new().with_latency(Duration::from_secs(1)));
    let locks = Arc::new(NamedLocks::new());
    let kv = vault("kv1");
    backend.add_vault(&kv);

    let started = tokio::time::Instant::now();
    let a = resource(&backend, &locks);
    let b = resource(&backend, &locks);
    let first_config = ContactConfig::new(kv.clone(), "a@example.com");
    let second_config = ContactConfig::new(kv, "b@example.com");
    let (ra, rb) = tokio::join!(a.create(&first_config), b.create(&second_config));
    ra.unwrap();
    rb.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_default_built_controllers_share_vault_lock() {
    // GIVEN: Two controllers built without an explicit lock map
    let backend = Arc::new(MemoryBackend::new().with_latency(Duration::from_millis(50)));
    let kv = vault("kv-default-locks");
    let url = backend.add_vault(&kv);
    let a = ContactResource::builder()
        .vaults(backend.clone())
        .contacts(backend.clone())
        .build();
    let b = ContactResource::builder()
        .vaults(backend.clone())
        .contacts(backend.clone())
        .build();

    // WHEN: Both create a contact in the same vault at once
    let first_config = ContactConfig::new(kv.clone(), "a@example.com");
    let second_config = ContactConfig::new(kv, "b@example.com");
    let (ra, rb) = tokio::join!(a.create(&first_config), b.create(&second_config));

    // THEN: Neither write is lost
    assert!(!ra.unwrap().is_gone());
    assert!(!rb.unwrap().is_gone());
    let mut emails: Vec<_> = backend
        .contacts(&url)
        .unwrap()
        .into_iter()
        .map(|c| c.email)
        .collect();
    emails.sort();
    assert_eq!(emails, ["a@example.com", "b@example.com"]);
}
