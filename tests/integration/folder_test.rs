//! Integration tests for the folder tree.

mod helpers;

use cordvault_core::error::ErrorKind;
use uuid::Uuid;

use helpers::TestVault;

#[tokio::test]
async fn test_children_track_parent_pointers_across_operations() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let a = vault.mkdir(owner, "A", None).await;
    let b = vault.mkdir(owner, "B", Some(a.id)).await;
    let c = vault.mkdir(owner, "C", Some(a.id)).await;
    let d = vault.mkdir(owner, "D", Some(b.id)).await;
    vault.assert_tree_consistent().await;

    vault.folders.reparent(owner, d.id, Some(c.id)).await.unwrap();
    vault.assert_tree_consistent().await;

    vault.folders.reparent(owner, c.id, None).await.unwrap();
    vault.assert_tree_consistent().await;

    vault.folders.reparent(owner, b.id, Some(d.id)).await.unwrap();
    vault.assert_tree_consistent().await;

    vault.folders.reparent(owner, b.id, None).await.unwrap();
    vault.folders.delete_folder(owner, b.id).await.unwrap();
    vault.assert_tree_consistent().await;

    let roots: Vec<Uuid> = vault
        .folders
        .list_roots(owner)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(roots.len(), 2);
    assert!(roots.contains(&a.id));
    assert!(roots.contains(&c.id));
    assert_eq!(vault.folder(owner, c.id).await.children, vec![d.id]);
    assert!(vault.folder(owner, a.id).await.children.is_empty());
}

#[tokio::test]
async fn test_delete_with_children_fails_and_leaves_tree_unchanged() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let a = vault.mkdir(owner, "A", None).await;
    let b = vault.mkdir(owner, "B", Some(a.id)).await;
    let before = vault.folder(owner, a.id).await;

    let err = vault.folders.delete_folder(owner, a.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::HasChildren);

    let after = vault.folder(owner, a.id).await;
    assert_eq!(after.children, before.children);
    assert_eq!(vault.folder(owner, b.id).await.parent_id, Some(a.id));
    vault.assert_tree_consistent().await;
}

#[tokio::test]
async fn test_reparent_under_descendant_is_cycle() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let root = vault.mkdir(owner, "root", None).await;
    let a = vault.mkdir(owner, "A", Some(root.id)).await;
    let b = vault.mkdir(owner, "B", Some(a.id)).await;
    let c = vault.mkdir(owner, "C", Some(b.id)).await;

    let root_before = vault.folder(owner, root.id).await.children;
    let c_before = vault.folder(owner, c.id).await.children;

    let err = vault
        .folders
        .reparent(owner, a.id, Some(c.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cycle);

    assert_eq!(vault.folder(owner, root.id).await.children, root_before);
    assert_eq!(vault.folder(owner, c.id).await.children, c_before);
    assert_eq!(vault.folder(owner, a.id).await.parent_id, Some(root.id));
    vault.assert_tree_consistent().await;
}

#[tokio::test]
async fn test_folders_are_scoped_to_their_owner() {
    let vault = TestVault::new();
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let shared_name = vault.mkdir(alice, "Docs", None).await;
    let bobs = vault.mkdir(bob, "Docs", None).await;

    assert_eq!(vault.folders.list_roots(alice).await.unwrap().len(), 1);
    assert_eq!(vault.folders.list_roots(bob).await.unwrap().len(), 1);

    let err = vault
        .folders
        .reparent(bob, bobs.id, Some(shared_name.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = vault
        .folders
        .delete_folder(bob, shared_name.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = vault
        .folders
        .rename_folder(bob, shared_name.id, "Mine")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(vault.folder(alice, shared_name.id).await.name, "Docs");
}

#[tokio::test]
async fn test_file_counts_per_folder() {
    let vault = TestVault::new();
    let owner = Uuid::new_v4();

    let a = vault.mkdir(owner, "A", None).await;
    let b = vault.mkdir(owner, "B", Some(a.id)).await;
    vault.upload_text(owner, "one.txt", Some(b.id)).await;
    let two = vault.upload_text(owner, "two.txt", Some(b.id)).await;
    vault.upload_text(owner, "loose.txt", None).await;

    let counted = vault
        .folders
        .children_with_file_count(owner, a.id)
        .await
        .unwrap();
    assert_eq!(counted.len(), 1);
    assert_eq!(counted[0].folder.id, b.id);
    assert_eq!(counted[0].file_count, 2);

    vault.files.delete_file(owner, two.id).await.unwrap();
    assert_eq!(vault.files.count_in_folder(b.id).await.unwrap(), 1);

    let roots = vault.folders.roots_with_file_count(owner).await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].file_count, 0);
}
