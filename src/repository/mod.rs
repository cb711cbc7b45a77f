//! Entity store: one collection per catalog entity.
//!
//! The catalog services only see the traits below. [`Repository`] implements
//! them on PostgreSQL; [`memory::MemoryStore`] keeps everything in process.

pub mod authors;
pub mod book_copies;
pub mod books;
pub mod genres;
pub mod memory;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres, Transaction};
use std::time::Duration;

use crate::{
    config::DatabaseConfig,
    error::AppResult,
    models::{
        Author, AuthorData, Book, BookCopy, BookCopyData, BookCopyStatus, BookData,
        DeleteStatus, EntityKind, Genre, GenreData,
    },
};

#[async_trait]
pub trait AuthorStore: Send + Sync {
    /// All authors ordered by family name
    async fn authors_list(&self) -> AppResult<Vec<Author>>;
    async fn authors_get(&self, id: i32) -> AppResult<Option<Author>>;
    async fn authors_get_many(&self, ids: &[i32]) -> AppResult<Vec<Author>>;
    async fn authors_create(&self, data: &AuthorData) -> AppResult<Author>;
    async fn authors_update(&self, id: i32, data: &AuthorData) -> AppResult<Option<Author>>;
    /// Delete unless a book still references the author
    async fn authors_delete_unreferenced(&self, id: i32) -> AppResult<DeleteStatus>;
    async fn authors_count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books ordered by title
    async fn books_list(&self) -> AppResult<Vec<Book>>;
    async fn books_get(&self, id: i32) -> AppResult<Option<Book>>;
    async fn books_get_many(&self, ids: &[i32]) -> AppResult<Vec<Book>>;
    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;
    async fn books_by_genre(&self, genre_id: i32) -> AppResult<Vec<Book>>;
    async fn books_create(&self, data: &BookData) -> AppResult<Book>;
    async fn books_update(&self, id: i32, data: &BookData) -> AppResult<Option<Book>>;
    /// Delete unless a copy still references the book
    async fn books_delete_unreferenced(&self, id: i32) -> AppResult<DeleteStatus>;
    async fn books_count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait BookCopyStore: Send + Sync {
    /// All copies in insertion order
    async fn book_copies_list(&self) -> AppResult<Vec<BookCopy>>;
    async fn book_copies_get(&self, id: i32) -> AppResult<Option<BookCopy>>;
    async fn book_copies_by_book(&self, book_id: i32) -> AppResult<Vec<BookCopy>>;
    async fn book_copies_create(&self, data: &BookCopyData) -> AppResult<BookCopy>;
    async fn book_copies_update(&self, id: i32, data: &BookCopyData)
        -> AppResult<Option<BookCopy>>;
    /// Returns false when there was nothing to delete
    async fn book_copies_delete(&self, id: i32) -> AppResult<bool>;
    async fn book_copies_count(&self) -> AppResult<i64>;
    async fn book_copies_count_by_status(&self, status: BookCopyStatus) -> AppResult<i64>;
}

#[async_trait]
pub trait GenreStore: Send + Sync {
    /// All genres ordered by name
    async fn genres_list(&self) -> AppResult<Vec<Genre>>;
    async fn genres_get(&self, id: i32) -> AppResult<Option<Genre>>;
    async fn genres_get_many(&self, ids: &[i32]) -> AppResult<Vec<Genre>>;
    /// Exact, case-sensitive name match
    async fn genres_find_by_name(&self, name: &str) -> AppResult<Option<Genre>>;
    async fn genres_create(&self, data: &GenreData) -> AppResult<Genre>;
    async fn genres_update(&self, id: i32, data: &GenreData) -> AppResult<Option<Genre>>;
    /// Delete unless a book is still tagged with the genre
    async fn genres_delete_unreferenced(&self, id: i32) -> AppResult<DeleteStatus>;
    async fn genres_count(&self) -> AppResult<i64>;
}

/// Counts the records that reference a given record
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DependentCounter: Send + Sync {
    /// Authors: books by them. Books: their copies. Genres: books tagged
    /// with them. Copies have no dependents.
    async fn count_dependents(&self, kind: EntityKind, id: i32) -> AppResult<i64>;
}

/// Everything the catalog services need from a backing store
#[async_trait]
pub trait CatalogStore:
    AuthorStore + BookStore + BookCopyStore + GenreStore + DependentCounter
{
    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> AppResult<()>;
}

/// PostgreSQL-backed store holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl DependentCounter for Repository {
    async fn count_dependents(&self, kind: EntityKind, id: i32) -> AppResult<i64> {
        let query = match kind {
            EntityKind::Author => "SELECT COUNT(*)::bigint FROM books WHERE author_id = $1",
            EntityKind::Book => "SELECT COUNT(*)::bigint FROM book_copies WHERE book_id = $1",
            EntityKind::Genre => "SELECT COUNT(*)::bigint FROM books WHERE $1 = ANY(genre_ids)",
            EntityKind::BookCopy => return Ok(0),
        };
        let count: i64 = sqlx::query_scalar(query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Delete `id` unless something still references it.
///
/// `lock_query` takes `FOR UPDATE` on the row and returns its id. Writers
/// that add a reference hold `FOR SHARE` on the parent (see [`share_lock`]),
/// so the lock waits for them to commit and the delete statement, taking a
/// fresh snapshot, sees their rows.
async fn delete_unreferenced(
    pool: &Pool<Postgres>,
    lock_query: &str,
    delete_query: &str,
    id: i32,
) -> AppResult<DeleteStatus> {
    let mut tx = pool.begin().await?;
    let locked: Option<i32> = sqlx::query_scalar(lock_query)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        tx.rollback().await?;
        return Ok(DeleteStatus::Missing);
    }
    let result = sqlx::query(delete_query).bind(id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(if result.rows_affected() > 0 {
        DeleteStatus::Deleted
    } else {
        DeleteStatus::Referenced
    })
}

/// Hold `FOR SHARE` on the referenced parent rows for the rest of `tx`.
/// Parents that do not exist are skipped: references may dangle.
async fn share_lock(
    tx: &mut Transaction<'_, Postgres>,
    lock_query: &str,
    ids: &[i32],
) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    sqlx::query(lock_query).bind(ids).execute(&mut **tx).await?;
    Ok(())
}
