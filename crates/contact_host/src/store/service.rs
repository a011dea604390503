//! Document store service contract and the no-op backend.

use std::{future::Future, pin::Pin};

use thiserror::Error;

use super::document::{ContactDocument, DocumentId, Revision, WriteReceipt};

/// Object-safe boxed future used by [`DocumentStore`] async methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Typed failure returned by document store operations.
pub enum StoreError {
    /// The referenced document is absent or tombstoned.
    #[error("document `{id}` not found")]
    NotFound {
        /// Identifier that was looked up.
        id: DocumentId,
    },
    /// The supplied revision is not the current stored revision.
    #[error("revision conflict on document `{id}`")]
    StoreConflict {
        /// Identifier of the contended document.
        id: DocumentId,
    },
    /// The storage backend is unavailable or returned corrupt data.
    #[error("document store I/O failure: {0}")]
    StoreIo(String),
}

impl StoreError {
    /// Returns a stable kind label for structured logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::StoreConflict { .. } => "store_conflict",
            Self::StoreIo(_) => "store_io",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Options for [`DocumentStore::list_all`].
pub struct ListOptions {
    /// Includes attachment bodies instead of stubs.
    pub include_attachments: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            include_attachments: true,
        }
    }
}

/// Local, asynchronous, revision-tracked contact document store.
///
/// Writes are guarded by optimistic concurrency: every write against an existing document must
/// name the revision the caller last read, and a mismatch fails with
/// [`StoreError::StoreConflict`] instead of overwriting a concurrent update.
pub trait DocumentStore {
    /// Inserts or replaces a document.
    ///
    /// `expected` must be `None` for inserts and the current stored revision for replacements.
    /// Documents without an id are assigned one by the store.
    fn put<'a>(
        &'a self,
        doc: &'a ContactDocument,
        expected: Option<&'a Revision>,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>>;

    /// Fetches the current copy of a document, including its revision.
    fn get<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Result<ContactDocument, StoreError>>;

    /// Tombstones a document at the given current revision.
    fn remove<'a>(
        &'a self,
        id: &'a DocumentId,
        rev: &'a Revision,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>>;

    /// Lists every live document in store-defined order.
    fn list_all<'a>(
        &'a self,
        options: ListOptions,
    ) -> StoreFuture<'a, Result<Vec<ContactDocument>, StoreError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op document store for unsupported targets.
///
/// Lists are always empty, lookups miss, and writes fail with [`StoreError::StoreIo`].
pub struct NoopDocumentStore;

fn unsupported() -> StoreError {
    StoreError::StoreIo("document store is unavailable on this host".to_string())
}

impl DocumentStore for NoopDocumentStore {
    fn put<'a>(
        &'a self,
        _doc: &'a ContactDocument,
        _expected: Option<&'a Revision>,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>> {
        Box::pin(async { Err(unsupported()) })
    }

    fn get<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Result<ContactDocument, StoreError>> {
        Box::pin(async move { Err(StoreError::NotFound { id: id.clone() }) })
    }

    fn remove<'a>(
        &'a self,
        _id: &'a DocumentId,
        _rev: &'a Revision,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>> {
        Box::pin(async { Err(unsupported()) })
    }

    fn list_all<'a>(
        &'a self,
        _options: ListOptions,
    ) -> StoreFuture<'a, Result<Vec<ContactDocument>, StoreError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn noop_store_is_empty_and_rejects_writes() {
        let store = NoopDocumentStore;
        let store_obj: &dyn DocumentStore = &store;
        let id = DocumentId::new("1");

        assert_eq!(
            block_on(store_obj.list_all(ListOptions::default())).expect("list"),
            Vec::new()
        );
        assert_eq!(
            block_on(store_obj.get(&id)).expect_err("get should miss"),
            StoreError::NotFound { id: id.clone() }
        );
        assert_eq!(
            block_on(store_obj.put(&ContactDocument::default(), None))
                .expect_err("put should fail")
                .kind(),
            "store_io"
        );
        assert_eq!(
            block_on(store_obj.remove(&id, &Revision::new("1-a")))
                .expect_err("remove should fail")
                .kind(),
            "store_io"
        );
    }
}
