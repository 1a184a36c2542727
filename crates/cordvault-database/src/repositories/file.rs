//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cordvault_core::error::{AppError, ErrorKind};
use cordvault_core::result::AppResult;
use cordvault_entity::file::{CreateFile, DeletionReason, File, UpdateFile};

use super::FileStore;

/// PostgreSQL repository for file records.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_active_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 AND is_deleted = FALSE \
             ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn find_active_by_folder(&self, folder_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE folder_id = $1 AND is_deleted = FALSE \
             ORDER BY created_at DESC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list files in folder", e)
        })
    }

    async fn count_active_in_folder(&self, folder_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files WHERE folder_id = $1 AND is_deleted = FALSE",
        )
        .bind(folder_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;
        Ok(count as u64)
    }

    async fn find_active_with_blob(&self, owner_id: Option<Uuid>) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE is_deleted = FALSE \
             AND channel_id IS NOT NULL AND channel_id <> '' \
             AND message_id IS NOT NULL AND message_id <> '' \
             AND ($1::uuid IS NULL OR owner_id = $1) \
             ORDER BY created_at ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list files with blobs", e)
        })
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (name, original_name, owner_id, folder_id, size_bytes, mime_type, \
             file_type, description, storage_provider, channel_id, message_id, url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.original_name)
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(data.size_bytes)
        .bind(&data.mime_type)
        .bind(&data.file_type)
        .bind(&data.description)
        .bind(data.storage_provider)
        .bind(&data.blob_ref.channel_id)
        .bind(&data.blob_ref.message_id)
        .bind(&data.url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))
    }

    async fn update_metadata(&self, id: Uuid, update: &UpdateFile) -> AppResult<Option<File>> {
        // $3 says whether folder_id is being changed at all, since NULL is
        // a legitimate new value.
        let (folder_changed, folder_id) = match update.folder_id {
            Some(folder_id) => (true, folder_id),
            None => (false, None),
        };

        sqlx::query_as::<_, File>(
            "UPDATE files SET \
             name = COALESCE($2, name), \
             folder_id = CASE WHEN $3 THEN $4 ELSE folder_id END, \
             description = COALESCE($5, description), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(folder_changed)
        .bind(folder_id)
        .bind(&update.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file", e))
    }

    async fn update_url(&self, id: Uuid, url: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE files SET url = $2, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(url)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file URL", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: Uuid, reason: DeletionReason) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE files SET is_deleted = TRUE, deleted_at = NOW(), deletion_reason = $2, \
             updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(reason.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn detach_folder(&self, folder_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE files SET folder_id = NULL, updated_at = NOW() WHERE folder_id = $1",
        )
        .bind(folder_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to detach files from folder", e)
        })?;
        Ok(result.rows_affected())
    }
}
