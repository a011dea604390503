//! In-memory document store used by tests and the stub host strategy.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use super::{
    document::{ContactDocument, DocumentId, Revision, WriteReceipt},
    service::{DocumentStore, ListOptions, StoreError, StoreFuture},
};

#[derive(Debug, Clone)]
struct StoredEntry {
    body: ContactDocument,
    rev: Revision,
    deleted: bool,
}

#[derive(Debug, Default)]
struct MemoryStoreState {
    entries: BTreeMap<DocumentId, StoredEntry>,
    next_id: u64,
    write_seq: u64,
    unavailable: Option<String>,
}

impl MemoryStoreState {
    /// Returns the next free counter value and its id without consuming it.
    fn peek_id(&self) -> (u64, DocumentId) {
        let mut next = self.next_id;
        loop {
            next += 1;
            let candidate = DocumentId::new(next.to_string());
            if !self.entries.contains_key(&candidate) {
                return (next, candidate);
            }
        }
    }

    fn current_rev(&self, id: &DocumentId) -> Option<&Revision> {
        self.entries
            .get(id)
            .filter(|entry| !entry.deleted)
            .map(|entry| &entry.rev)
    }

    fn next_rev(&mut self, id: &DocumentId) -> Revision {
        let generation = self
            .entries
            .get(id)
            .and_then(|entry| entry.rev.generation())
            .unwrap_or(0)
            + 1;
        self.write_seq += 1;
        Revision::new(format!("{generation}-{:012x}", self.write_seq))
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match &self.unavailable {
            Some(reason) => Err(StoreError::StoreIo(reason.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory revision-tracked document store.
///
/// Ids are assigned from a counter (`"1"`, `"2"`, ...), listings are ordered by id, and
/// revisions follow the `"<generation>-<token>"` shape. Clones share the same backing map.
pub struct MemoryDocumentStore {
    inner: Rc<RefCell<MemoryStoreState>>,
}

impl MemoryDocumentStore {
    /// Makes every subsequent operation fail with [`StoreError::StoreIo`] until cleared.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.inner.borrow_mut().unavailable = reason.map(str::to_string);
    }

    /// Returns the number of live documents.
    pub fn live_count(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .values()
            .filter(|entry| !entry.deleted)
            .count()
    }

    fn put_now(
        &self,
        doc: &ContactDocument,
        expected: Option<&Revision>,
    ) -> Result<WriteReceipt, StoreError> {
        let mut state = self.inner.borrow_mut();
        state.check_available()?;

        let (id, allocated) = match &doc.id {
            Some(id) => (id.clone(), None),
            None => {
                let (counter, id) = state.peek_id();
                (id, Some(counter))
            }
        };
        if state.current_rev(&id) != expected {
            return Err(StoreError::StoreConflict { id });
        }
        if let Some(counter) = allocated {
            state.next_id = counter;
        }

        let rev = state.next_rev(&id);
        let body = ContactDocument {
            id: None,
            rev: None,
            ..doc.clone()
        };
        state.entries.insert(
            id.clone(),
            StoredEntry {
                body,
                rev: rev.clone(),
                deleted: false,
            },
        );
        Ok(WriteReceipt { id, rev })
    }

    fn get_now(&self, id: &DocumentId) -> Result<ContactDocument, StoreError> {
        let state = self.inner.borrow();
        state.check_available()?;
        state
            .entries
            .get(id)
            .filter(|entry| !entry.deleted)
            .map(|entry| entry.body.stamped(id.clone(), entry.rev.clone()))
            .ok_or_else(|| StoreError::NotFound { id: id.clone() })
    }

    fn remove_now(&self, id: &DocumentId, rev: &Revision) -> Result<WriteReceipt, StoreError> {
        let mut state = self.inner.borrow_mut();
        state.check_available()?;

        match state.current_rev(id) {
            None => return Err(StoreError::NotFound { id: id.clone() }),
            Some(current) if current != rev => {
                return Err(StoreError::StoreConflict { id: id.clone() })
            }
            Some(_) => {}
        }

        let tombstone_rev = state.next_rev(id);
        state.entries.insert(
            id.clone(),
            StoredEntry {
                body: ContactDocument::default(),
                rev: tombstone_rev.clone(),
                deleted: true,
            },
        );
        Ok(WriteReceipt {
            id: id.clone(),
            rev: tombstone_rev,
        })
    }

    fn list_now(&self, options: ListOptions) -> Result<Vec<ContactDocument>, StoreError> {
        let state = self.inner.borrow();
        state.check_available()?;
        Ok(state
            .entries
            .iter()
            .filter(|(_, entry)| !entry.deleted)
            .map(|(id, entry)| {
                let doc = entry.body.stamped(id.clone(), entry.rev.clone());
                if options.include_attachments {
                    doc
                } else {
                    doc.with_attachment_stubs()
                }
            })
            .collect())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn put<'a>(
        &'a self,
        doc: &'a ContactDocument,
        expected: Option<&'a Revision>,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>> {
        Box::pin(async move { self.put_now(doc, expected) })
    }

    fn get<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Result<ContactDocument, StoreError>> {
        Box::pin(async move { self.get_now(id) })
    }

    fn remove<'a>(
        &'a self,
        id: &'a DocumentId,
        rev: &'a Revision,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>> {
        Box::pin(async move { self.remove_now(id, rev) })
    }

    fn list_all<'a>(
        &'a self,
        options: ListOptions,
    ) -> StoreFuture<'a, Result<Vec<ContactDocument>, StoreError>> {
        Box::pin(async move { self.list_now(options) })
    }
}
