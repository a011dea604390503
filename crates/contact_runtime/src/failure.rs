//! Fire-and-forget failure policy for UI commands.
//!
//! Store-path failures never reach the UI as events. They are logged and recorded here, and the
//! UI only notices by the absence of a `ContactsChanged` event.

use std::{cell::RefCell, rc::Rc};

use crate::error::CommandError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Structured record of one swallowed command failure.
pub struct CommandFailure {
    /// Wire tag of the failed command, or `"<undecoded>"` for envelopes that never decoded.
    pub command: &'static str,
    /// Stable error kind label.
    pub kind: &'static str,
    /// Rendered error message.
    pub message: String,
}

/// Sink for command failure records.
pub trait FailureJournal {
    /// Stores one failure record.
    fn record(&self, failure: CommandFailure);
}

#[derive(Debug, Clone, Copy, Default)]
/// Journal that keeps nothing. The structured log line is still emitted.
pub struct NoopFailureJournal;

impl FailureJournal for NoopFailureJournal {
    fn record(&self, _failure: CommandFailure) {}
}

#[derive(Debug, Clone, Default)]
/// In-memory journal. Clones share the same records.
pub struct MemoryFailureJournal {
    inner: Rc<RefCell<Vec<CommandFailure>>>,
}

impl MemoryFailureJournal {
    /// Returns every recorded failure in order.
    pub fn failures(&self) -> Vec<CommandFailure> {
        self.inner.borrow().clone()
    }
}

impl FailureJournal for MemoryFailureJournal {
    fn record(&self, failure: CommandFailure) {
        self.inner.borrow_mut().push(failure);
    }
}

/// Logs and records a command failure, then returns the record.
///
/// This is the only place command failures are handled; callers never emit an event for them.
pub fn report_command_failure(
    journal: &dyn FailureJournal,
    command: &'static str,
    error: &CommandError,
) -> CommandFailure {
    tracing::warn!(command, error_kind = error.kind(), error = %error, "command failed");
    let failure = CommandFailure {
        command,
        kind: error.kind(),
        message: error.to_string(),
    };
    journal.record(failure.clone());
    failure
}

#[cfg(test)]
mod tests {
    use contact_host::{DocumentId, StoreError};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn report_records_structured_failure() {
        let journal = MemoryFailureJournal::default();
        let err = CommandError::Store(StoreError::NotFound {
            id: DocumentId::new("7"),
        });

        let failure = report_command_failure(&journal, "ModifyContact", &err);

        assert_eq!(
            failure,
            CommandFailure {
                command: "ModifyContact",
                kind: "not_found",
                message: "document `7` not found".to_string(),
            }
        );
        assert_eq!(journal.failures(), vec![failure]);
    }

    #[test]
    fn noop_journal_still_returns_the_record() {
        let failure = report_command_failure(
            &NoopFailureJournal,
            "<undecoded>",
            &CommandError::Decode("bad".to_string()),
        );
        assert_eq!(failure.kind, "decode");
    }
}
