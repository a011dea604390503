//! Command/Event bridge between the UI port and the host services.
//!
//! Each command runs to completion, store round-trip and re-sync included, inside its own task.
//! Commands are not queued or locked against each other: two in-flight mutations of the same
//! document race on revision tokens and the loser fails with a logged `StoreConflict`.

use std::rc::Rc;

use contact_host::{
    ContactDocument, DocumentId, DocumentStore, EventSink, ExternalUrnService, HostCommand,
    HostEvent, ListOptions, Revision, StoreError,
};
use futures::task::{LocalSpawn, LocalSpawnExt};
use serde_json::Value;

use crate::{
    error::CommandError,
    failure::{report_command_failure, CommandFailure, FailureJournal},
};

/// Command label used for envelopes that never decoded into a [`HostCommand`].
pub const UNDECODED_COMMAND: &str = "<undecoded>";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of dispatching one command.
pub enum CommandOutcome {
    /// The command finished; mutating commands have re-synced the UI.
    Completed,
    /// The command failed; the failure was logged and no event was emitted.
    Failed(CommandFailure),
}

#[derive(Clone)]
/// Dispatches UI commands and emits the resulting events.
pub struct ContactBridge {
    store: Rc<dyn DocumentStore>,
    external_urns: Rc<dyn ExternalUrnService>,
    events: Rc<dyn EventSink>,
    failures: Rc<dyn FailureJournal>,
    spawner: Rc<dyn LocalSpawn>,
    list_options: ListOptions,
}

impl ContactBridge {
    /// Creates a bridge over the given services.
    pub fn new(
        store: Rc<dyn DocumentStore>,
        external_urns: Rc<dyn ExternalUrnService>,
        events: Rc<dyn EventSink>,
        failures: Rc<dyn FailureJournal>,
        spawner: Rc<dyn LocalSpawn>,
        list_options: ListOptions,
    ) -> Self {
        Self {
            store,
            external_urns,
            events,
            failures,
            spawner,
            list_options,
        }
    }

    /// Starts `command` on the local task spawner and returns immediately.
    pub fn submit(&self, command: HostCommand) {
        let bridge = self.clone();
        let tag = command.tag();
        if let Err(err) = self.spawner.spawn_local(async move {
            bridge.dispatch(command).await;
        }) {
            tracing::error!(command = tag, error = %err, "failed to spawn command task");
        }
    }

    /// Decodes a raw envelope and starts it. Malformed envelopes are reported and dropped.
    pub fn submit_json(&self, envelope: Value) {
        match HostCommand::from_json(envelope) {
            Ok(command) => self.submit(command),
            Err(err) => {
                report_command_failure(
                    self.failures.as_ref(),
                    UNDECODED_COMMAND,
                    &CommandError::Decode(err),
                );
            }
        }
    }

    /// Runs one command to completion.
    pub async fn dispatch(&self, command: HostCommand) -> CommandOutcome {
        let tag = command.tag();
        tracing::debug!(command = tag, "dispatching command");
        match self.run(command).await {
            Ok(()) => CommandOutcome::Completed,
            Err(err) => {
                CommandOutcome::Failed(report_command_failure(self.failures.as_ref(), tag, &err))
            }
        }
    }

    async fn run(&self, command: HostCommand) -> Result<(), CommandError> {
        match command {
            HostCommand::CreateContact(doc) => {
                let receipt = self.store.put(&doc, doc.rev.as_ref()).await?;
                tracing::debug!(id = %receipt.id, rev = %receipt.rev, "contact created");
                self.resync().await
            }
            HostCommand::ModifyContact(doc) => {
                let id = require_id(&doc, "ModifyContact")?;
                let current = self.current_revision(id).await?;
                let receipt = self.store.put(&doc, Some(&current)).await?;
                tracing::debug!(id = %receipt.id, rev = %receipt.rev, "contact modified");
                self.resync().await
            }
            HostCommand::DeleteContact(doc) => {
                let id = require_id(&doc, "DeleteContact")?;
                let current = self.current_revision(id).await?;
                self.store.remove(id, &current).await?;
                tracing::debug!(%id, "contact deleted");
                self.resync().await
            }
            HostCommand::GetAllContacts => self.resync().await,
            HostCommand::OpenUrn(urn) => self
                .external_urns
                .open_urn(&urn)
                .await
                .map_err(|reason| CommandError::OpenUrn {
                    urn: urn.clone(),
                    reason,
                }),
        }
    }

    async fn current_revision(&self, id: &DocumentId) -> Result<Revision, StoreError> {
        let current = self.store.get(id).await?;
        current
            .rev
            .ok_or_else(|| StoreError::StoreIo(format!("document `{id}` has no revision")))
    }

    /// Lists the full live collection and emits it as `ContactsChanged`.
    ///
    /// # Errors
    ///
    /// Returns the store error when listing fails; no event is emitted in that case.
    pub async fn resync(&self) -> Result<(), CommandError> {
        let contacts = self.store.list_all(self.list_options).await?;
        tracing::debug!(count = contacts.len(), "contacts re-synced");
        self.events.emit(HostEvent::ContactsChanged(contacts));
        Ok(())
    }
}

fn require_id<'a>(
    doc: &'a ContactDocument,
    command: &'static str,
) -> Result<&'a DocumentId, CommandError> {
    doc.id
        .as_ref()
        .ok_or(CommandError::MissingDocumentId { command })
}
