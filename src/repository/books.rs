//! Books collection on PostgreSQL

use async_trait::async_trait;

use sqlx::{Postgres, Transaction};

use super::{delete_unreferenced, share_lock, BookStore, Repository};
use crate::{
    error::AppResult,
    models::{Book, BookData, DeleteStatus},
};

#[async_trait]
impl BookStore for Repository {
    async fn books_list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn books_get(&self, id: i32) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn books_get_many(&self, ids: &[i32]) -> AppResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE id = ANY($1) ORDER BY title, id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE author_id = $1 ORDER BY title, id",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn books_by_genre(&self, genre_id: i32) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE $1 = ANY(genre_ids) ORDER BY title, id",
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn books_create(&self, data: &BookData) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;
        lock_references(&mut tx, data).await?;
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, genre_ids)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(&data.genre_ids)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn books_update(&self, id: i32, data: &BookData) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;
        lock_references(&mut tx, data).await?;
        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, summary = $3, isbn = $4, genre_ids = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(&data.genre_ids)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn books_delete_unreferenced(&self, id: i32) -> AppResult<DeleteStatus> {
        delete_unreferenced(
            &self.pool,
            "SELECT id FROM books WHERE id = $1 FOR UPDATE",
            r#"
            DELETE FROM books
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM book_copies WHERE book_id = $1)
            "#,
            id,
        )
        .await
    }

    async fn books_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*)::bigint FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Keep the book's author and genres from being deleted until `tx` ends
async fn lock_references(tx: &mut Transaction<'_, Postgres>, data: &BookData) -> AppResult<()> {
    share_lock(
        tx,
        "SELECT id FROM authors WHERE id = ANY($1) FOR SHARE",
        &[data.author_id],
    )
    .await?;
    share_lock(
        tx,
        "SELECT id FROM genres WHERE id = ANY($1) ORDER BY id FOR SHARE",
        &data.genre_ids,
    )
    .await
}
