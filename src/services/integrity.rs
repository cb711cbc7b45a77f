//! Referential integrity checks run before a record is deleted

use std::{future::Future, sync::Arc};

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::{listing, location},
        DeleteOutcome, DeleteStatus, EntityKind, Notice,
    },
    repository::DependentCounter,
};

/// Whether a record may be deleted, and how many records block it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clearance {
    pub allowed: bool,
    pub dependent_count: i64,
}

#[derive(Clone)]
pub struct IntegrityGuard {
    counter: Arc<dyn DependentCounter>,
}

impl IntegrityGuard {
    pub fn new(counter: Arc<dyn DependentCounter>) -> Self {
        Self { counter }
    }

    /// Count the records referencing `kind`/`id`. Book copies are never
    /// referenced.
    pub async fn can_delete(&self, kind: EntityKind, id: i32) -> AppResult<Clearance> {
        if kind == EntityKind::BookCopy {
            return Ok(Clearance {
                allowed: true,
                dependent_count: 0,
            });
        }
        let dependent_count = self.counter.count_dependents(kind, id).await?;
        Ok(Clearance {
            allowed: dependent_count == 0,
            dependent_count,
        })
    }

    /// Check dependents, then run `remove`, a conditional store delete that
    /// re-checks them itself. Either check failing refuses the delete and
    /// leaves the record in place.
    pub async fn delete_with<F, Fut>(
        &self,
        kind: EntityKind,
        id: i32,
        remove: F,
    ) -> AppResult<DeleteOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<DeleteStatus>>,
    {
        let clearance = self.can_delete(kind, id).await?;
        let status = if clearance.allowed {
            remove().await?
        } else {
            DeleteStatus::Referenced
        };

        match status {
            DeleteStatus::Deleted => {
                tracing::info!("{} deleted: id={}", kind, id);
                Ok(DeleteOutcome::Deleted {
                    location: listing(kind),
                })
            }
            DeleteStatus::Missing => Err(AppError::not_found(kind, id)),
            DeleteStatus::Referenced => {
                tracing::warn!(
                    "{} delete refused: id={} still has {} dependent record(s)",
                    kind,
                    id,
                    clearance.dependent_count.max(1)
                );
                Ok(DeleteOutcome::Refused {
                    location: location(kind, id),
                    notice: Notice::HasDependents,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockDependentCounter;
    use mockall::predicate::eq;

    async fn must_not_run() -> AppResult<DeleteStatus> {
        panic!("conditional delete must not run")
    }

    fn guard_with(count: i64, kind: EntityKind, id: i32) -> IntegrityGuard {
        let mut counter = MockDependentCounter::new();
        counter
            .expect_count_dependents()
            .with(eq(kind), eq(id))
            .times(1)
            .returning(move |_, _| Ok(count));
        IntegrityGuard::new(Arc::new(counter))
    }

    #[tokio::test]
    async fn test_can_delete_counts_dependents() {
        let guard = guard_with(3, EntityKind::Author, 7);
        let clearance = guard.can_delete(EntityKind::Author, 7).await.unwrap();
        assert_eq!(
            clearance,
            Clearance {
                allowed: false,
                dependent_count: 3
            }
        );
    }

    #[tokio::test]
    async fn test_book_copy_skips_the_store() {
        let guard = IntegrityGuard::new(Arc::new(MockDependentCounter::new()));
        let clearance = guard.can_delete(EntityKind::BookCopy, 1).await.unwrap();
        assert!(clearance.allowed);
        assert_eq!(clearance.dependent_count, 0);
    }

    #[tokio::test]
    async fn test_refused_delete_never_removes() {
        let guard = guard_with(1, EntityKind::Genre, 4);
        let outcome = guard
            .delete_with(EntityKind::Genre, 4, must_not_run)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DeleteOutcome::Refused {
                location: "/catalog/genre/4".to_string(),
                notice: Notice::HasDependents,
            }
        );
    }

    #[tokio::test]
    async fn test_allowed_delete_goes_to_listing() {
        let guard = guard_with(0, EntityKind::Book, 2);
        let outcome = guard
            .delete_with(EntityKind::Book, 2, || async {
                Ok::<_, AppError>(DeleteStatus::Deleted)
            })
            .await
            .unwrap();
        assert_eq!(outcome.location(), "/catalog/book/all");
    }

    #[tokio::test]
    async fn test_dependent_added_after_count_refuses() {
        let guard = guard_with(0, EntityKind::Author, 5);
        let outcome = guard
            .delete_with(EntityKind::Author, 5, || async {
                Ok::<_, AppError>(DeleteStatus::Referenced)
            })
            .await
            .unwrap();
        assert!(matches!(outcome, DeleteOutcome::Refused { .. }));
    }

    #[tokio::test]
    async fn test_record_gone_before_delete_is_not_found() {
        let guard = guard_with(0, EntityKind::Author, 5);
        let result = guard
            .delete_with(EntityKind::Author, 5, || async {
                Ok::<_, AppError>(DeleteStatus::Missing)
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
