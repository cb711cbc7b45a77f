//! Book copies collection on PostgreSQL

use async_trait::async_trait;

use super::{share_lock, BookCopyStore, Repository};
use crate::{
    error::AppResult,
    models::{BookCopy, BookCopyData, BookCopyStatus},
};

#[async_trait]
impl BookCopyStore for Repository {
    async fn book_copies_list(&self) -> AppResult<Vec<BookCopy>> {
        let rows = sqlx::query_as::<_, BookCopy>("SELECT * FROM book_copies ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn book_copies_get(&self, id: i32) -> AppResult<Option<BookCopy>> {
        let row = sqlx::query_as::<_, BookCopy>("SELECT * FROM book_copies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn book_copies_by_book(&self, book_id: i32) -> AppResult<Vec<BookCopy>> {
        let rows = sqlx::query_as::<_, BookCopy>(
            "SELECT * FROM book_copies WHERE book_id = $1 ORDER BY id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn book_copies_create(&self, data: &BookCopyData) -> AppResult<BookCopy> {
        let mut tx = self.pool.begin().await?;
        share_lock(
            &mut tx,
            "SELECT id FROM books WHERE id = ANY($1) FOR SHARE",
            &[data.book_id],
        )
        .await?;
        let row = sqlx::query_as::<_, BookCopy>(
            r#"
            INSERT INTO book_copies (book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.status.as_str())
        .bind(data.due_back)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn book_copies_update(
        &self,
        id: i32,
        data: &BookCopyData,
    ) -> AppResult<Option<BookCopy>> {
        let mut tx = self.pool.begin().await?;
        share_lock(
            &mut tx,
            "SELECT id FROM books WHERE id = ANY($1) FOR SHARE",
            &[data.book_id],
        )
        .await?;
        let row = sqlx::query_as::<_, BookCopy>(
            r#"
            UPDATE book_copies
            SET book_id = $1, imprint = $2, status = $3, due_back = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.status.as_str())
        .bind(data.due_back)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn book_copies_delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn book_copies_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*)::bigint FROM book_copies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn book_copies_count_by_status(&self, status: BookCopyStatus) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*)::bigint FROM book_copies WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
