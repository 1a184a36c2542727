//! Integration tests for URL refresh, orphan reconciliation and the tree sweep.

mod helpers;

use chrono::Utc;
use uuid::Uuid;

use cordvault_core::error::ErrorKind;
use cordvault_entity::folder::Folder;
use cordvault_service::{OrphanReport, TreeSweepReport};

use helpers::TestVault;

#[tokio::test]
async fn test_orphan_counts_match_missing_blobs() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let mut files = Vec::new();
    for i in 0..5 {
        files.push(vault.upload_text(owner, &format!("f{i}.txt"), None).await);
    }
    let already_deleted = vault.upload_text(owner, "gone.txt", None).await;
    vault.files.delete_file(owner, already_deleted.id).await.unwrap();

    let missing = [files[1].id, files[3].id];
    for file in files.iter().filter(|f| missing.contains(&f.id)) {
        assert!(vault.blobs.remove_out_of_band(&file.blob_ref().unwrap()));
    }

    let report = vault.orphans.reconcile().await.unwrap();
    assert_eq!(
        report,
        OrphanReport {
            checked: 5,
            orphaned: 2,
            cleaned: 2
        }
    );

    for file in &files {
        let record = vault.raw_file(file.id).await;
        assert_eq!(record.is_deleted, missing.contains(&file.id));
        if record.is_deleted {
            assert_eq!(
                record.deletion_reason.as_deref(),
                Some("backend object missing")
            );
        }
    }

    let again = vault.orphans.reconcile().await.unwrap();
    assert_eq!(again.checked, 3);
    assert_eq!(again.orphaned, 0);
}

#[tokio::test]
async fn test_failed_existence_checks_are_not_orphans() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();
    let file = vault.upload_text(owner, "keep.txt", None).await;

    vault.blobs.set_fail_exists(true);
    let report = vault.orphans.reconcile().await.unwrap();
    assert_eq!(report.checked, 1);
    assert_eq!(report.orphaned, 0);
    assert!(vault.raw_file(file.id).await.is_active());
}

#[tokio::test]
async fn test_unready_backend_skips_reconciliation() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();
    let file = vault.upload_text(owner, "keep.txt", None).await;
    vault.blobs.set_ready(false);

    let err = vault.orphans.reconcile().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendUnavailable);
    let err = vault.refresh.refresh_urls(None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendUnavailable);

    assert!(vault.raw_file(file.id).await.is_active());
}

#[tokio::test]
async fn test_url_refresh_is_idempotent() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();
    let a = vault.upload_text(owner, "a.txt", None).await;
    vault.upload_text(owner, "b.txt", None).await;

    assert_eq!(vault.refresh.refresh_urls(None).await.unwrap(), 0);

    vault.blobs.rotate_urls();
    assert_eq!(vault.refresh.refresh_urls(None).await.unwrap(), 2);
    assert_eq!(vault.refresh.refresh_urls(None).await.unwrap(), 0);

    let refreshed = vault.raw_file(a.id).await;
    assert_ne!(refreshed.url, a.url);
    let download = vault.downloads.download_file(owner, a.id).await.unwrap();
    assert_eq!(&download.bytes[..], b"contents of a.txt");
}

#[tokio::test]
async fn test_url_refresh_scoped_to_owner() {
    let vault = TestVault::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let alices = vault.upload_text(alice, "a.txt", None).await;
    let bobs = vault.upload_text(bob, "b.txt", None).await;

    vault.blobs.rotate_urls();
    assert_eq!(vault.refresh.refresh_urls(Some(alice)).await.unwrap(), 1);

    assert_ne!(vault.raw_file(alices.id).await.url, alices.url);
    assert_eq!(vault.raw_file(bobs.id).await.url, bobs.url);
}

#[tokio::test]
async fn test_url_refresh_skips_failures_and_deleted_files() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();
    let kept = vault.upload_text(owner, "kept.txt", None).await;
    let deleted = vault.upload_text(owner, "deleted.txt", None).await;
    vault.files.delete_file(owner, deleted.id).await.unwrap();

    vault.blobs.rotate_urls();
    vault.blobs.set_fail_refresh(true);
    assert_eq!(vault.refresh.refresh_urls(None).await.unwrap(), 0);
    assert_eq!(vault.raw_file(kept.id).await.url, kept.url);

    vault.blobs.set_fail_refresh(false);
    assert_eq!(vault.refresh.refresh_urls(None).await.unwrap(), 1);
    assert_eq!(vault.raw_file(deleted.id).await.url, deleted.url);
}

#[tokio::test]
async fn test_login_hook_refreshes_that_owner() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();
    let file = vault.upload_text(owner, "a.txt", None).await;
    vault.blobs.rotate_urls();

    let handle = vault
        .login
        .on_authenticated(owner)
        .expect("Hook should be enabled");
    handle.await.unwrap();

    assert_ne!(vault.raw_file(file.id).await.url, file.url);
}

#[tokio::test]
async fn test_login_hook_swallows_backend_failure() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();
    vault.upload_text(owner, "a.txt", None).await;
    vault.blobs.set_ready(false);

    let handle = vault.login.on_authenticated(owner).unwrap();
    assert!(handle.await.is_ok());
}

fn raw_folder(owner: Uuid, name: &str, parent_id: Option<Uuid>, children: Vec<Uuid>) -> Folder {
    Folder {
        id: Uuid::new_v4(),
        name: name.to_string(),
        owner_id: owner,
        parent_id,
        children,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_tree_sweep_repairs_drift() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let a = vault.mkdir(owner, "A", None).await;
    let b = vault.mkdir(owner, "B", Some(a.id)).await;

    // Half-applied move: C points at A but A never recorded it, and A
    // still lists a folder that no longer exists.
    let c = raw_folder(owner, "C", Some(a.id), vec![]);
    vault.folder_store.insert_raw(c.clone());
    let stale = Uuid::new_v4();
    vault
        .folder_store
        .insert_raw(Folder {
            children: vec![b.id, stale, b.id],
            ..vault.folder(owner, a.id).await
        });
    let lost = raw_folder(owner, "Lost", Some(Uuid::new_v4()), vec![]);
    vault.folder_store.insert_raw(lost.clone());

    let report = vault.sweep.sweep().await.unwrap();
    assert_eq!(
        report,
        TreeSweepReport {
            checked: 4,
            repaired: 2
        }
    );

    vault.assert_tree_consistent().await;
    assert_eq!(vault.folder(owner, a.id).await.children, vec![b.id, c.id]);
    assert_eq!(vault.folder(owner, lost.id).await.parent_id, None);

    let again = vault.sweep.sweep().await.unwrap();
    assert_eq!(again.repaired, 0);
}

#[tokio::test]
async fn test_login_hook_can_be_disabled() {
    let vault = TestVault::new();
    let config = cordvault_core::config::WorkerConfig {
        refresh_on_login: false,
        ..Default::default()
    };
    let hook = cordvault_service::PostLoginRefresh::from_config(vault.refresh.clone(), &config);

    assert!(hook.on_authenticated(Uuid::new_v4()).is_none());
}
