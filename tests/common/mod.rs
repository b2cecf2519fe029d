//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt};
use redis_collections::{Command, Keyspace, MemoryStore, Reply, Result, StoreClient, WritePlan};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once; `RUST_LOG=redis_collections=trace`
/// shows every command issued by a test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Keyspace over a fresh in-process store
pub fn keyspace() -> Keyspace {
    init_tracing();
    Keyspace::new(Arc::new(MemoryStore::new()))
}

/// Client in front of a [`MemoryStore`] where another writer gets in
/// between the reads and the commit of watched transactions: each watched
/// call runs the next queued command right after its reads
pub struct Interleaving {
    store: Arc<MemoryStore>,
    writers: Mutex<Vec<Command>>,
}

impl Interleaving {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Interleaving {
            store,
            writers: Mutex::new(Vec::new()),
        }
    }

    /// Queue a command for the next watched call that has none yet
    pub fn interleave(&self, command: Command) {
        self.writers.lock().unwrap().insert(0, command);
    }

    pub fn pending(&self) -> usize {
        self.writers.lock().unwrap().len()
    }
}

impl StoreClient for Interleaving {
    fn execute(&self, command: Command) -> BoxFuture<'_, Result<Reply>> {
        self.store.execute(command)
    }

    fn execute_transaction(&self, commands: Vec<Command>) -> BoxFuture<'_, Result<Vec<Reply>>> {
        self.store.execute_transaction(commands)
    }

    fn execute_watched<'a>(
        &'a self,
        keys: Vec<String>,
        reads: Vec<Command>,
        plan: &'a mut WritePlan<'a>,
    ) -> BoxFuture<'a, Result<Option<Vec<Reply>>>> {
        let writer = self.writers.lock().unwrap().pop();
        let store = self.store.as_ref();
        async move {
            let mut interleaved = |replies: Vec<Reply>| {
                if let Some(command) = &writer {
                    store.run(command).unwrap();
                }
                plan(replies)
            };
            store.execute_watched(keys, reads, &mut interleaved).await
        }
        .boxed()
    }
}

/// Keyspace over `store` through an [`Interleaving`] client
pub fn interleaved(store: Arc<MemoryStore>) -> (Keyspace, Arc<Interleaving>) {
    init_tracing();
    let client = Arc::new(Interleaving::new(store));
    (Keyspace::new(client.clone()), client)
}

/// Client in front of a [`MemoryStore`] that records every single command
/// it forwards
#[derive(Default)]
pub struct Recording {
    store: MemoryStore,
    log: Mutex<Vec<Command>>,
}

impl Recording {
    /// Commands seen so far, as they would go on the wire
    pub fn sent(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|c| c.to_string()).collect()
    }
}

impl StoreClient for Recording {
    fn execute(&self, command: Command) -> BoxFuture<'_, Result<Reply>> {
        self.log.lock().unwrap().push(command.clone());
        self.store.execute(command)
    }

    fn execute_transaction(&self, commands: Vec<Command>) -> BoxFuture<'_, Result<Vec<Reply>>> {
        self.log.lock().unwrap().extend(commands.iter().cloned());
        self.store.execute_transaction(commands)
    }

    fn execute_watched<'a>(
        &'a self,
        keys: Vec<String>,
        reads: Vec<Command>,
        plan: &'a mut WritePlan<'a>,
    ) -> BoxFuture<'a, Result<Option<Vec<Reply>>>> {
        self.log.lock().unwrap().extend(reads.iter().cloned());
        self.store.execute_watched(keys, reads, plan)
    }
}

/// Keyspace over a fresh store through a [`Recording`] client
pub fn recorded() -> (Keyspace, Arc<Recording>) {
    init_tracing();
    let client = Arc::new(Recording::default());
    (Keyspace::new(client.clone()), client)
}
