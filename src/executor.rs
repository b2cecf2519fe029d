//! Command executor
//!
//! Sits between the facades and a [`StoreClient`]: injects the bound key as
//! first argument, tags transactional batches with an id for tracing, and
//! logs store rejections before handing them to the caller. Watched
//! read-modify-write batches are retried here when a concurrent writer
//! touched the key.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::client::{Command, Reply, StoreClient};
use crate::error::{CollectionError, Result};

/// Attempts of a watched batch before giving up on a contended key
pub const WATCH_ATTEMPTS: usize = 8;

/// Shared handle used by every facade to reach the store
#[derive(Clone)]
pub struct Executor {
    client: Arc<dyn StoreClient>,
}

impl Executor {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Executor { client }
    }

    /// Run `command` against `key`, which is injected as first argument
    pub async fn run(&self, key: &str, command: Command) -> Result<Reply> {
        self.dispatch(command.with_key(key)).await
    }

    /// Run a command that addresses no particular key
    pub async fn run_server(&self, command: Command) -> Result<Reply> {
        self.dispatch(command).await
    }

    /// Run `commands` as one transaction, each scoped to `key`
    pub async fn batch(&self, key: &str, commands: Vec<Command>) -> Result<Vec<Reply>> {
        let commands = commands.into_iter().map(|c| c.with_key(key)).collect();
        self.transaction(commands).await
    }

    /// Run already complete commands as one transaction
    pub async fn transaction(&self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        let tx_id = Uuid::new_v4();
        debug!(%tx_id, commands = commands.len(), "submitting batch");
        for command in &commands {
            trace!(%tx_id, %command, "queued");
        }

        match self.client.execute_transaction(commands).await {
            Ok(replies) => {
                trace!(%tx_id, ?replies, "batch committed");
                Ok(replies)
            }
            Err(e) => {
                warn!(%tx_id, error = %e, "batch failed");
                Err(e)
            }
        }
    }

    /// Read-modify-write on `key` without lost updates.
    ///
    /// `reads` run with `key` watched; `plan` turns their replies into the
    /// writes, which commit as one transaction only if nobody modified the
    /// key in the meantime. Otherwise everything runs again, up to
    /// [`WATCH_ATTEMPTS`] times. Reads and writes are scoped to `key`.
    pub async fn watched<F>(
        &self,
        key: &str,
        reads: Vec<Command>,
        mut plan: F,
    ) -> Result<Vec<Reply>>
    where
        F: FnMut(Vec<Reply>) -> Result<Vec<Command>> + Send,
    {
        let reads: Vec<Command> = reads.into_iter().map(|c| c.with_key(key)).collect();
        let mut scoped = |replies: Vec<Reply>| -> Result<Vec<Command>> {
            Ok(plan(replies)?.into_iter().map(|c| c.with_key(key)).collect())
        };

        for attempt in 1..=WATCH_ATTEMPTS {
            let tx_id = Uuid::new_v4();
            debug!(%tx_id, key, attempt, reads = reads.len(), "submitting watched batch");

            match self
                .client
                .execute_watched(vec![key.to_string()], reads.clone(), &mut scoped)
                .await
            {
                Ok(Some(replies)) => {
                    trace!(%tx_id, ?replies, "watched batch committed");
                    return Ok(replies);
                }
                Ok(None) => debug!(%tx_id, key, "watched key modified, retrying"),
                Err(e) => {
                    warn!(%tx_id, error = %e, "watched batch failed");
                    return Err(e);
                }
            }
        }

        warn!(key, attempts = WATCH_ATTEMPTS, "giving up on contended key");
        Err(CollectionError::Contended(key.to_string()))
    }

    async fn dispatch(&self, command: Command) -> Result<Reply> {
        debug!(%command, "executing");
        match self.client.execute(command).await {
            Ok(reply) => {
                trace!(?reply, "reply");
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "command failed");
                Err(e)
            }
        }
    }

    /// Whether both executors talk through the same client instance
    pub fn same_client(&self, other: &Executor) -> bool {
        Arc::as_ptr(&self.client) as *const () == Arc::as_ptr(&other.client) as *const ()
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("client", &(Arc::as_ptr(&self.client) as *const ()))
            .finish()
    }
}
