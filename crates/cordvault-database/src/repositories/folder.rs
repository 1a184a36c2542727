//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cordvault_core::error::{AppError, ErrorKind};
use cordvault_core::result::AppResult;
use cordvault_entity::folder::model::{CreateFolder, Folder};

use super::FolderStore;

/// PostgreSQL repository for folder records and tree edges.
///
/// The children set is a `uuid[]` column; edge updates are single-row
/// guarded array operations.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find folder"))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 ORDER BY name ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list folders"))
    }

    async fn find_roots(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND parent_id IS NULL ORDER BY name ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list root folders"))
    }

    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id = $1 ORDER BY name ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list children"))
    }

    async fn find_all(&self) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list all folders"))
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (name, owner_id, parent_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.owner_id)
        .bind(data.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create folder"))
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to rename folder"))
    }

    async fn set_parent(&self, id: Uuid, parent_id: Option<Uuid>) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to set folder parent"))
    }

    async fn add_child(&self, parent_id: Uuid, child_id: Uuid) -> AppResult<bool> {
        // The CASE keeps the array a set; the row is matched either way so
        // the affected count tells us whether the parent exists.
        let result = sqlx::query(
            "UPDATE folders SET children = CASE WHEN $2 = ANY(children) THEN children \
             ELSE array_append(children, $2) END, updated_at = NOW() WHERE id = $1",
        )
        .bind(parent_id)
        .bind(child_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to add child folder"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_child(&self, parent_id: Uuid, child_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE folders SET children = array_remove(children, $2), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(parent_id)
        .bind(child_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to remove child folder"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_children(
        &self,
        id: Uuid,
        expected: &[Uuid],
        children: &[Uuid],
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE folders SET children = $3, updated_at = NOW() \
             WHERE id = $1 AND children = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(children)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to replace children"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete folder"))?;
        Ok(result.rows_affected() > 0)
    }
}
