//! Command-boundary error taxonomy.

use contact_host::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure of one command invocation. Terminal for that invocation only.
pub enum CommandError {
    /// Store round-trip failed (`NotFound`, `StoreConflict`, `StoreIO`).
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A mutation command did not address a document.
    #[error("{command} requires a document `_id`")]
    MissingDocumentId {
        /// Tag of the rejected command.
        command: &'static str,
    },
    /// The host refused to open an external URN.
    #[error("open external URN `{urn}` failed: {reason}")]
    OpenUrn {
        /// URN that was requested.
        urn: String,
        /// Host-provided reason.
        reason: String,
    },
    /// The inbound envelope could not be decoded.
    #[error("malformed command envelope: {0}")]
    Decode(String),
}

impl CommandError {
    /// Returns a stable kind label for structured logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Store(err) => err.kind(),
            Self::MissingDocumentId { .. } => "missing_document_id",
            Self::OpenUrn { .. } => "open_urn",
            Self::Decode(_) => "decode",
        }
    }
}
