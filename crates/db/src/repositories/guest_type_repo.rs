//! Repository for the `guest_types` table.

use guestbook_core::pagination::PageRequest;
use guestbook_core::types::DbId;
use sqlx::PgPool;

use crate::models::guest_type::GuestType;

const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for guest types.
pub struct GuestTypeRepo;

impl GuestTypeRepo {
    /// Insert a new guest type, returning the created row.
    pub async fn create(pool: &PgPool, name: &str) -> Result<GuestType, sqlx::Error> {
        let query = format!("INSERT INTO guest_types (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, GuestType>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<GuestType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM guest_types WHERE id = $1");
        sqlx::query_as::<_, GuestType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of guest types in creation order.
    pub async fn list(pool: &PgPool, page: PageRequest) -> Result<Vec<GuestType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM guest_types ORDER BY id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, GuestType>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM guest_types")
            .fetch_one(pool)
            .await
    }

    /// Rename a guest type. Returns `None` if no row with the given `id` exists.
    pub async fn rename(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<GuestType>, sqlx::Error> {
        let query = format!("UPDATE guest_types SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, GuestType>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a guest type. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign key violation while guests still reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM guest_types WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
