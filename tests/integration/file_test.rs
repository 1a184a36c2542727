//! Integration tests for the file lifecycle.

mod helpers;

use bytes::Bytes;
use uuid::Uuid;

use cordvault_core::error::ErrorKind;
use cordvault_entity::file::UpdateFile;
use cordvault_service::UploadRequest;

use helpers::TestVault;

#[tokio::test]
async fn test_failed_blob_write_leaves_no_record() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();
    vault.blobs.set_fail_puts(true);

    for _ in 0..3 {
        let err = vault
            .uploads
            .upload_file(owner, UploadRequest::new(&b"data"[..], "a.txt", "text/plain"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BackendUnavailable);
    }

    assert!(vault.file_store.all().is_empty());
    assert!(vault.blobs.is_empty());
}

#[tokio::test]
async fn test_successful_upload_creates_exactly_one_record() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let file = vault
        .uploads
        .upload_file(
            owner,
            UploadRequest::new(&b"%PDF-1.7"[..], "Report.PDF", "application/pdf"),
        )
        .await
        .unwrap();

    let all = vault.file_store.all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, file.id);
    assert_eq!(vault.blobs.len(), 1);

    assert_eq!(file.original_name, "Report.PDF");
    assert!(file.name.ends_with(".PDF"));
    assert_eq!(file.file_type, ".pdf");
    assert_eq!(file.size_bytes, 8);
    assert_eq!(file.storage_provider.to_string(), "memory");
    assert!(file.blob_ref().is_some());
    assert!(!file.url.is_empty());
    assert!(file.is_active());
}

#[tokio::test]
async fn test_declared_name_is_used() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let file = vault
        .uploads
        .upload_file(
            owner,
            UploadRequest::new(&b"{}"[..], "cfg.json", "application/json").named("settings.json"),
        )
        .await
        .unwrap();
    assert_eq!(file.name, "settings.json");
}

#[tokio::test]
async fn test_upload_limits() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let oversized = Bytes::from(vec![0u8; 11 * 1024 * 1024]);
    let err = vault
        .uploads
        .upload_file(owner, UploadRequest::new(oversized, "big.txt", "text/plain"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = vault
        .uploads
        .upload_file(
            owner,
            UploadRequest::new(&b"\x7fELF"[..], "tool", "application/x-executable"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = vault
        .uploads
        .upload_file(owner, UploadRequest::new(&b"x"[..], "  ", "text/plain"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    assert!(vault.file_store.all().is_empty());
    assert!(vault.blobs.is_empty());
}

#[tokio::test]
async fn test_upload_into_foreign_folder_is_not_found() {
    let vault = TestVault::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
    let folder = vault.mkdir(alice, "private", None).await;

    let err = vault
        .uploads
        .upload_file(
            bob,
            UploadRequest::new(&b"x"[..], "x.txt", "text/plain").in_folder(folder.id),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(vault.blobs.is_empty());
}

#[tokio::test]
async fn test_delete_always_soft_deletes() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let ok = vault.upload_text(owner, "ok.txt", None).await;
    let absent = vault.upload_text(owner, "absent.txt", None).await;
    let refused = vault.upload_text(owner, "refused.txt", None).await;
    let failing = vault.upload_text(owner, "failing.txt", None).await;

    vault.files.delete_file(owner, ok.id).await.unwrap();

    vault
        .blobs
        .remove_out_of_band(&absent.blob_ref().unwrap());
    vault.files.delete_file(owner, absent.id).await.unwrap();

    vault.blobs.set_refuse_deletes(true);
    vault.files.delete_file(owner, refused.id).await.unwrap();
    vault.blobs.set_refuse_deletes(false);

    vault.blobs.set_fail_deletes(true);
    let deleted = vault.files.delete_file(owner, failing.id).await.unwrap();
    assert_eq!(
        deleted.deletion_reason.as_deref(),
        Some("user deletion (backend delete failed)")
    );

    for id in [ok.id, absent.id, refused.id, failing.id] {
        let record = vault.raw_file(id).await;
        assert!(record.is_deleted);
        assert!(record.deleted_at.is_some());
        assert!(record.deletion_reason.is_some());
    }
    assert!(vault.files.list_by_owner(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_is_newest_first() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();
    let folder = vault.mkdir(owner, "F", None).await;

    let first = vault.upload_text(owner, "first.txt", Some(folder.id)).await;
    let second = vault.upload_text(owner, "second.txt", Some(folder.id)).await;
    let third = vault.upload_text(owner, "third.txt", None).await;
    vault.upload_text(Uuid::new_v4(), "other.txt", None).await;

    let all: Vec<Uuid> = vault
        .files
        .list_by_owner(owner)
        .await
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(all, vec![third.id, second.id, first.id]);

    let in_folder: Vec<Uuid> = vault
        .files
        .list_by_folder(owner, folder.id)
        .await
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(in_folder, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_download_returns_uploaded_bytes() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();
    let file = vault.upload_text(owner, "hello.txt", None).await;

    let download = vault.downloads.download_file(owner, file.id).await.unwrap();
    assert_eq!(&download.bytes[..], b"contents of hello.txt");
    assert_eq!(download.filename, "hello.txt");
    assert_eq!(download.mime_type, "text/plain");

    let err = vault
        .downloads
        .download_file(Uuid::new_v4(), file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    vault.blobs.set_ready(false);
    let err = vault
        .downloads
        .download_file(owner, file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendUnavailable);
}

#[tokio::test]
async fn test_move_file_between_folders() {
    let vault = TestVault::new();
    let (owner, other) = (Uuid::new_v4(), Uuid::new_v4());
    let a = vault.mkdir(owner, "A", None).await;
    let b = vault.mkdir(owner, "B", None).await;
    let foreign = vault.mkdir(other, "X", None).await;
    let file = vault.upload_text(owner, "doc.txt", Some(a.id)).await;

    let moved = vault
        .files
        .update_metadata(
            owner,
            file.id,
            UpdateFile {
                folder_id: Some(Some(b.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.folder_id, Some(b.id));
    assert_eq!(vault.files.count_in_folder(a.id).await.unwrap(), 0);
    assert_eq!(vault.files.count_in_folder(b.id).await.unwrap(), 1);

    let err = vault
        .files
        .update_metadata(
            owner,
            file.id,
            UpdateFile {
                folder_id: Some(Some(foreign.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let unfiled = vault
        .files
        .update_metadata(
            owner,
            file.id,
            UpdateFile {
                folder_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(unfiled.folder_id, None);
}
