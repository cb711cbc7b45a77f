//! In-process store. Each collection is an ordered map keyed by id, behind a
//! single lock, so a conditional delete sees the same snapshot it acts on.

use async_trait::async_trait;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;

use super::{AuthorStore, BookCopyStore, BookStore, CatalogStore, DependentCounter, GenreStore};
use crate::{
    error::AppResult,
    models::{
        Author, AuthorData, Book, BookCopy, BookCopyData, BookCopyStatus, BookData,
        DeleteStatus, EntityKind, Genre, GenreData,
    },
};

#[derive(Default)]
struct Collections {
    next_id: i32,
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, Book>,
    book_copies: BTreeMap<i32, BookCopy>,
    genres: BTreeMap<i32, Genre>,
}

impl Collections {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn dependents(&self, kind: EntityKind, id: i32) -> i64 {
        let count = match kind {
            EntityKind::Author => self.books.values().filter(|b| b.author_id == id).count(),
            EntityKind::Book => self.book_copies.values().filter(|c| c.book_id == id).count(),
            EntityKind::Genre => self
                .books
                .values()
                .filter(|b| b.genre_ids.contains(&id))
                .count(),
            EntityKind::BookCopy => 0,
        };
        count as i64
    }

    /// Outcome a conditional delete of `kind`/`id` would have right now
    fn delete_status(&self, kind: EntityKind, id: i32, exists: bool) -> DeleteStatus {
        if !exists {
            DeleteStatus::Missing
        } else if self.dependents(kind, id) > 0 {
            DeleteStatus::Referenced
        } else {
            DeleteStatus::Deleted
        }
    }
}

/// Catalog store kept in memory; ids are shared across collections and
/// never reused.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by<T, K: Ord>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn authors_list(&self) -> AppResult<Vec<Author>> {
        let data = self.data.read().await;
        Ok(sorted_by(data.authors.values().cloned(), |a| {
            (a.family_name.clone(), a.first_name.clone(), a.id)
        }))
    }

    async fn authors_get(&self, id: i32) -> AppResult<Option<Author>> {
        Ok(self.data.read().await.authors.get(&id).cloned())
    }

    async fn authors_get_many(&self, ids: &[i32]) -> AppResult<Vec<Author>> {
        let data = self.data.read().await;
        Ok(sorted_by(
            ids.iter().filter_map(|id| data.authors.get(id)).cloned(),
            |a| (a.family_name.clone(), a.id),
        ))
    }

    async fn authors_create(&self, data: &AuthorData) -> AppResult<Author> {
        let mut guard = self.data.write().await;
        let author = data.clone().into_author(guard.allocate_id());
        guard.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn authors_update(&self, id: i32, data: &AuthorData) -> AppResult<Option<Author>> {
        let mut guard = self.data.write().await;
        Ok(guard.authors.get_mut(&id).map(|slot| {
            *slot = data.clone().into_author(id);
            slot.clone()
        }))
    }

    async fn authors_delete_unreferenced(&self, id: i32) -> AppResult<DeleteStatus> {
        let mut guard = self.data.write().await;
        let exists = guard.authors.contains_key(&id);
        let status = guard.delete_status(EntityKind::Author, id, exists);
        if status == DeleteStatus::Deleted {
            guard.authors.remove(&id);
        }
        Ok(status)
    }

    async fn authors_count(&self) -> AppResult<i64> {
        Ok(self.data.read().await.authors.len() as i64)
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn books_list(&self) -> AppResult<Vec<Book>> {
        let data = self.data.read().await;
        Ok(sorted_by(data.books.values().cloned(), |b| (b.title.clone(), b.id)))
    }

    async fn books_get(&self, id: i32) -> AppResult<Option<Book>> {
        Ok(self.data.read().await.books.get(&id).cloned())
    }

    async fn books_get_many(&self, ids: &[i32]) -> AppResult<Vec<Book>> {
        let data = self.data.read().await;
        Ok(sorted_by(
            ids.iter().filter_map(|id| data.books.get(id)).cloned(),
            |b| (b.title.clone(), b.id),
        ))
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let data = self.data.read().await;
        Ok(sorted_by(
            data.books.values().filter(|b| b.author_id == author_id).cloned(),
            |b| (b.title.clone(), b.id),
        ))
    }

    async fn books_by_genre(&self, genre_id: i32) -> AppResult<Vec<Book>> {
        let data = self.data.read().await;
        Ok(sorted_by(
            data.books
                .values()
                .filter(|b| b.genre_ids.contains(&genre_id))
                .cloned(),
            |b| (b.title.clone(), b.id),
        ))
    }

    async fn books_create(&self, data: &BookData) -> AppResult<Book> {
        let mut guard = self.data.write().await;
        let book = data.clone().into_book(guard.allocate_id());
        guard.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn books_update(&self, id: i32, data: &BookData) -> AppResult<Option<Book>> {
        let mut guard = self.data.write().await;
        Ok(guard.books.get_mut(&id).map(|slot| {
            *slot = data.clone().into_book(id);
            slot.clone()
        }))
    }

    async fn books_delete_unreferenced(&self, id: i32) -> AppResult<DeleteStatus> {
        let mut guard = self.data.write().await;
        let exists = guard.books.contains_key(&id);
        let status = guard.delete_status(EntityKind::Book, id, exists);
        if status == DeleteStatus::Deleted {
            guard.books.remove(&id);
        }
        Ok(status)
    }

    async fn books_count(&self) -> AppResult<i64> {
        Ok(self.data.read().await.books.len() as i64)
    }
}

#[async_trait]
impl BookCopyStore for MemoryStore {
    async fn book_copies_list(&self) -> AppResult<Vec<BookCopy>> {
        Ok(self.data.read().await.book_copies.values().cloned().collect())
    }

    async fn book_copies_get(&self, id: i32) -> AppResult<Option<BookCopy>> {
        Ok(self.data.read().await.book_copies.get(&id).cloned())
    }

    async fn book_copies_by_book(&self, book_id: i32) -> AppResult<Vec<BookCopy>> {
        let data = self.data.read().await;
        Ok(data
            .book_copies
            .values()
            .filter(|c| c.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn book_copies_create(&self, data: &BookCopyData) -> AppResult<BookCopy> {
        let mut guard = self.data.write().await;
        let copy = data.clone().into_copy(guard.allocate_id());
        guard.book_copies.insert(copy.id, copy.clone());
        Ok(copy)
    }

    async fn book_copies_update(
        &self,
        id: i32,
        data: &BookCopyData,
    ) -> AppResult<Option<BookCopy>> {
        let mut guard = self.data.write().await;
        Ok(guard.book_copies.get_mut(&id).map(|slot| {
            *slot = data.clone().into_copy(id);
            slot.clone()
        }))
    }

    async fn book_copies_delete(&self, id: i32) -> AppResult<bool> {
        Ok(self.data.write().await.book_copies.remove(&id).is_some())
    }

    async fn book_copies_count(&self) -> AppResult<i64> {
        Ok(self.data.read().await.book_copies.len() as i64)
    }

    async fn book_copies_count_by_status(&self, status: BookCopyStatus) -> AppResult<i64> {
        let data = self.data.read().await;
        Ok(data
            .book_copies
            .values()
            .filter(|c| c.status == status)
            .count() as i64)
    }
}

#[async_trait]
impl GenreStore for MemoryStore {
    async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        let data = self.data.read().await;
        Ok(sorted_by(data.genres.values().cloned(), |g| (g.name.clone(), g.id)))
    }

    async fn genres_get(&self, id: i32) -> AppResult<Option<Genre>> {
        Ok(self.data.read().await.genres.get(&id).cloned())
    }

    async fn genres_get_many(&self, ids: &[i32]) -> AppResult<Vec<Genre>> {
        let data = self.data.read().await;
        Ok(sorted_by(
            ids.iter().filter_map(|id| data.genres.get(id)).cloned(),
            |g| (g.name.clone(), g.id),
        ))
    }

    async fn genres_find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let data = self.data.read().await;
        Ok(data.genres.values().find(|g| g.name == name).cloned())
    }

    async fn genres_create(&self, data: &GenreData) -> AppResult<Genre> {
        let mut guard = self.data.write().await;
        let genre = Genre {
            id: guard.allocate_id(),
            name: data.name.clone(),
        };
        guard.genres.insert(genre.id, genre.clone());
        Ok(genre)
    }

    async fn genres_update(&self, id: i32, data: &GenreData) -> AppResult<Option<Genre>> {
        let mut guard = self.data.write().await;
        Ok(guard.genres.get_mut(&id).map(|slot| {
            slot.name = data.name.clone();
            slot.clone()
        }))
    }

    async fn genres_delete_unreferenced(&self, id: i32) -> AppResult<DeleteStatus> {
        let mut guard = self.data.write().await;
        let exists = guard.genres.contains_key(&id);
        let status = guard.delete_status(EntityKind::Genre, id, exists);
        if status == DeleteStatus::Deleted {
            guard.genres.remove(&id);
        }
        Ok(status)
    }

    async fn genres_count(&self) -> AppResult<i64> {
        Ok(self.data.read().await.genres.len() as i64)
    }
}

#[async_trait]
impl DependentCounter for MemoryStore {
    async fn count_dependents(&self, kind: EntityKind, id: i32) -> AppResult<i64> {
        Ok(self.data.read().await.dependents(kind, id))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
