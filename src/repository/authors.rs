//! Authors collection on PostgreSQL

use async_trait::async_trait;

use super::{delete_unreferenced, AuthorStore, Repository};
use crate::{
    error::AppResult,
    models::{Author, AuthorData, DeleteStatus},
};

#[async_trait]
impl AuthorStore for Repository {
    async fn authors_list(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(
            "SELECT * FROM authors ORDER BY family_name, first_name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn authors_get(&self, id: i32) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn authors_get_many(&self, ids: &[i32]) -> AppResult<Vec<Author>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Author>(
            "SELECT * FROM authors WHERE id = ANY($1) ORDER BY family_name, id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn authors_create(&self, data: &AuthorData) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, family_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.family_name)
        .bind(data.date_of_birth)
        .bind(data.date_of_death)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn authors_update(&self, id: i32, data: &AuthorData) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET first_name = $1, family_name = $2, date_of_birth = $3, date_of_death = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.family_name)
        .bind(data.date_of_birth)
        .bind(data.date_of_death)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn authors_delete_unreferenced(&self, id: i32) -> AppResult<DeleteStatus> {
        delete_unreferenced(
            &self.pool,
            "SELECT id FROM authors WHERE id = $1 FOR UPDATE",
            r#"
            DELETE FROM authors
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM books WHERE author_id = $1)
            "#,
            id,
        )
        .await
    }

    async fn authors_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*)::bigint FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
