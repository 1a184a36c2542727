//! End-to-end walk through a folder tree with files in it.

mod helpers;

use uuid::Uuid;

use cordvault_core::error::ErrorKind;

use helpers::TestVault;

#[tokio::test]
async fn test_delete_folder_with_files_unfiles_them() {
    let vault = TestVault::new();
    let u1 = Uuid::new_v4();

    let a = vault.mkdir(u1, "A", None).await;
    let b = vault.mkdir(u1, "B", Some(a.id)).await;
    let f1 = vault.upload_text(u1, "f1.txt", Some(b.id)).await;
    assert_eq!(vault.files.count_in_folder(b.id).await.unwrap(), 1);

    let err = vault.folders.delete_folder(u1, a.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::HasChildren);

    // Only subfolders block deletion; files in B do not.
    vault.folders.delete_folder(u1, b.id).await.unwrap();

    let err = vault.folders.get_folder(u1, b.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(vault.folder(u1, a.id).await.children.is_empty());
    vault.assert_tree_consistent().await;

    let f1 = vault.files.get_file(u1, f1.id).await.unwrap();
    assert!(f1.is_active());
    assert_eq!(f1.folder_id, None);
    assert_eq!(vault.files.count_in_folder(b.id).await.unwrap(), 0);

    vault.folders.delete_folder(u1, a.id).await.unwrap();
    assert!(vault.folders.list_folders(u1).await.unwrap().is_empty());
    assert_eq!(vault.files.list_by_owner(u1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_full_lifecycle_with_reconciliation() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let photos = vault.mkdir(owner, "Photos", None).await;
    let trips = vault.mkdir(owner, "Trips", Some(photos.id)).await;
    let kept = vault.upload_text(owner, "kept.txt", Some(trips.id)).await;
    let lost = vault.upload_text(owner, "lost.txt", Some(trips.id)).await;

    vault.blobs.remove_out_of_band(&lost.blob_ref().unwrap());
    let report = vault.orphans.reconcile().await.unwrap();
    assert_eq!(report.cleaned, 1);

    let listed = vault.files.list_by_folder(owner, trips.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, kept.id);

    vault.folders.reparent(owner, trips.id, None).await.unwrap();
    vault.assert_tree_consistent().await;
    assert!(vault.folder(owner, photos.id).await.children.is_empty());

    vault.blobs.rotate_urls();
    assert_eq!(vault.refresh.refresh_urls(Some(owner)).await.unwrap(), 1);

    let download = vault.downloads.download_file(owner, kept.id).await.unwrap();
    assert_eq!(&download.bytes[..], b"contents of kept.txt");

    let deleted = vault.files.delete_file(owner, kept.id).await.unwrap();
    assert!(deleted.is_deleted);
    assert!(vault.blobs.is_empty());
    assert_eq!(vault.files.count_in_folder(trips.id).await.unwrap(), 0);
}
