//! Genres collection on PostgreSQL

use async_trait::async_trait;

use super::{delete_unreferenced, GenreStore, Repository};
use crate::{
    error::AppResult,
    models::{DeleteStatus, Genre, GenreData},
};

#[async_trait]
impl GenreStore for Repository {
    async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn genres_get(&self, id: i32) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn genres_get_many(&self, ids: &[i32]) -> AppResult<Vec<Genre>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Genre>(
            "SELECT * FROM genres WHERE id = ANY($1) ORDER BY name, id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn genres_find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>(
            "SELECT * FROM genres WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn genres_create(&self, data: &GenreData) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING *")
            .bind(&data.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn genres_update(&self, id: i32, data: &GenreData) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $1 WHERE id = $2 RETURNING *",
        )
        .bind(&data.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn genres_delete_unreferenced(&self, id: i32) -> AppResult<DeleteStatus> {
        delete_unreferenced(
            &self.pool,
            "SELECT id FROM genres WHERE id = $1 FOR UPDATE",
            r#"
            DELETE FROM genres
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM books WHERE $1 = ANY(genre_ids))
            "#,
            id,
        )
        .await
    }

    async fn genres_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*)::bigint FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
