use contact_host::{ContactDocument, WriteReceipt};
use serde_json::Value;

use super::PouchFailure;

pub(crate) async fn store_put(database: &str, doc: Value) -> Result<WriteReceipt, PouchFailure> {
    super::interop::store_put(database, doc).await
}

pub(crate) async fn store_get(database: &str, id: &str) -> Result<ContactDocument, PouchFailure> {
    super::interop::store_get(database, id).await
}

pub(crate) async fn store_remove(
    database: &str,
    id: &str,
    rev: &str,
) -> Result<WriteReceipt, PouchFailure> {
    super::interop::store_remove(database, id, rev).await
}

pub(crate) async fn store_all_docs(
    database: &str,
    include_attachments: bool,
) -> Result<Vec<ContactDocument>, PouchFailure> {
    super::interop::store_all_docs(database, include_attachments).await
}
