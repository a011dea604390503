//! PouchDB-backed contact document store.
//!
//! PouchDB already enforces revision checks on `put`/`remove`, so this adapter only shapes
//! payloads and translates PouchDB's HTTP-style failure statuses into [`StoreError`] values.

use contact_host::{
    ContactDocument, DocumentId, DocumentStore, ListOptions, Revision, StoreError, StoreFuture,
    WriteReceipt,
};
use serde_json::Value;

use crate::bridge::{self, PouchFailure};

const STATUS_NOT_FOUND: u16 = 404;
const STATUS_CONFLICT: u16 = 409;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Browser document store backed by a named PouchDB database.
pub struct PouchDocumentStore {
    database_name: String,
}

impl PouchDocumentStore {
    /// Creates an adapter for the named local database. The database opens lazily on first use.
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
        }
    }

    /// Returns the PouchDB database name.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}

impl DocumentStore for PouchDocumentStore {
    fn put<'a>(
        &'a self,
        doc: &'a ContactDocument,
        expected: Option<&'a Revision>,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>> {
        Box::pin(async move {
            let payload = put_payload(doc, expected)?;
            bridge::store_put(&self.database_name, payload)
                .await
                .map_err(|failure| store_error(failure, doc.id.as_ref()))
        })
    }

    fn get<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Result<ContactDocument, StoreError>> {
        Box::pin(async move {
            bridge::store_get(&self.database_name, id.as_str())
                .await
                .map_err(|failure| store_error(failure, Some(id)))
        })
    }

    fn remove<'a>(
        &'a self,
        id: &'a DocumentId,
        rev: &'a Revision,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>> {
        Box::pin(async move {
            bridge::store_remove(&self.database_name, id.as_str(), rev.as_str())
                .await
                .map_err(|failure| store_error(failure, Some(id)))
        })
    }

    fn list_all<'a>(
        &'a self,
        options: ListOptions,
    ) -> StoreFuture<'a, Result<Vec<ContactDocument>, StoreError>> {
        Box::pin(async move {
            bridge::store_all_docs(&self.database_name, options.include_attachments)
                .await
                .map_err(|failure| store_error(failure, None))
        })
    }
}

/// Builds the PouchDB write payload: the document body with `_rev` pinned to `expected`.
fn put_payload(doc: &ContactDocument, expected: Option<&Revision>) -> Result<Value, StoreError> {
    let mut payload = doc.clone();
    payload.rev = expected.cloned();
    serde_json::to_value(&payload).map_err(|err| StoreError::StoreIo(err.to_string()))
}

fn store_error(failure: PouchFailure, id: Option<&DocumentId>) -> StoreError {
    match (failure.status, id) {
        (Some(STATUS_NOT_FOUND), Some(id)) => StoreError::NotFound { id: id.clone() },
        (Some(STATUS_CONFLICT), Some(id)) => StoreError::StoreConflict { id: id.clone() },
        _ => StoreError::StoreIo(failure.message),
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn failure(status: Option<u16>, message: &str) -> PouchFailure {
        PouchFailure {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn put_payload_pins_expected_revision_over_document_revision() {
        let doc = ContactDocument::default()
            .with_id("7")
            .with_field("name", "Ada");
        let mut stale = doc.clone();
        stale.rev = Some(Revision::new("1-stale"));

        let payload = put_payload(&stale, Some(&Revision::new("2-fresh"))).expect("payload");
        assert_eq!(payload, json!({"_id": "7", "_rev": "2-fresh", "name": "Ada"}));

        let insert = put_payload(&stale, None).expect("payload");
        assert_eq!(insert, json!({"_id": "7", "name": "Ada"}));
    }

    #[test]
    fn pouch_statuses_map_to_store_errors() {
        let id = DocumentId::new("7");
        assert_eq!(
            store_error(failure(Some(404), "missing"), Some(&id)),
            StoreError::NotFound { id: id.clone() }
        );
        assert_eq!(
            store_error(failure(Some(409), "Document update conflict"), Some(&id)),
            StoreError::StoreConflict { id: id.clone() }
        );
        assert_eq!(
            store_error(failure(Some(500), "quota"), Some(&id)),
            StoreError::StoreIo("quota".to_string())
        );
        assert_eq!(
            store_error(failure(Some(409), "conflict"), None),
            StoreError::StoreIo("conflict".to_string())
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_store_reports_io_failures() {
        let store = PouchDocumentStore::new("textlocation");
        assert_eq!(store.database_name(), "textlocation");

        let err = block_on(store.list_all(ListOptions::default())).expect_err("list should fail");
        assert_eq!(err.kind(), "store_io");
        let err = block_on(store.get(&DocumentId::new("1"))).expect_err("get should fail");
        assert_eq!(err.kind(), "store_io");
    }
}
