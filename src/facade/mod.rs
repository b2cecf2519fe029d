//! Typed collection facades
//!
//! Every facade is a handle bound to one store key. It never caches data:
//! each call round-trips to the store, which stays the source of truth.
//! Operations shared by all facades (TTL, existence, deletion, raw command
//! execution, batches, identity) live on [`KeyHandle`], which every facade
//! dereferences to.

/// Implements `Deref<Target = KeyHandle>` and [`Facade`] for a struct with a
/// `handle` field
macro_rules! impl_facade {
    ($facade:ident, $kind:expr) => {
        impl std::ops::Deref for $facade {
            type Target = $crate::facade::KeyHandle;

            fn deref(&self) -> &Self::Target {
                &self.handle
            }
        }

        impl $crate::facade::Facade for $facade {
            const KIND: $crate::keyspace::KeyType = $kind;

            fn from_handle(handle: $crate::facade::KeyHandle) -> Self {
                $facade { handle }
            }
        }
    };
}

pub(crate) use impl_facade;

pub mod hash;
pub mod list;
pub mod set;
pub mod sorted_set;
pub mod string;

pub use hash::HashFacade;
pub use list::ListFacade;
pub use set::SetFacade;
pub use sorted_set::SortedSetFacade;
pub use string::StringFacade;

use std::ops::Deref;

use crate::client::{Command, Reply};
use crate::error::{CollectionError, Result};
use crate::executor::Executor;
use crate::keyspace::KeyType;

/// Remaining lifetime of a key, mirroring the store's TTL sentinels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// The key expires in this many seconds
    Expires(u64),

    /// The key exists without an expiry (store sentinel `-1`)
    Persistent,

    /// The key does not exist (store sentinel `-2`)
    Missing,
}

impl Ttl {
    /// Interpret a raw TTL reply
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            -1 => Ttl::Persistent,
            n if n < 0 => Ttl::Missing,
            n => Ttl::Expires(n as u64),
        }
    }

    /// The store's own representation
    pub fn as_raw(&self) -> i64 {
        match self {
            Ttl::Expires(secs) => *secs as i64,
            Ttl::Persistent => -1,
            Ttl::Missing => -2,
        }
    }

    pub fn seconds(&self) -> Option<u64> {
        match self {
            Ttl::Expires(secs) => Some(*secs),
            _ => None,
        }
    }
}

/// Base of every facade: a store key plus the executor that reaches it
#[derive(Debug, Clone)]
pub struct KeyHandle {
    executor: Executor,
    key: String,
    kind: KeyType,
}

impl KeyHandle {
    pub(crate) fn new(executor: Executor, key: impl Into<String>, kind: KeyType) -> Self {
        KeyHandle {
            executor,
            key: key.into(),
            kind,
        }
    }

    /// The bound store key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The store type this handle's facade operates on
    pub fn kind(&self) -> KeyType {
        self.kind
    }

    /// Set an expiry in seconds; `false` when the key does not exist
    pub async fn set_ttl(&self, seconds: u64) -> Result<bool> {
        self.run(Command::new("EXPIRE").arg(seconds)).await?.into_bool()
    }

    /// Remaining lifetime of the key
    pub async fn ttl(&self) -> Result<Ttl> {
        let raw = self.run(Command::new("TTL")).await?.into_integer()?;
        Ok(Ttl::from_raw(raw))
    }

    /// Remove the expiry; `false` when there was none or the key is missing
    pub async fn persist(&self) -> Result<bool> {
        self.run(Command::new("PERSIST")).await?.into_bool()
    }

    /// Delete the key. Idempotent; returns whether anything was removed.
    pub async fn clear(&self) -> Result<bool> {
        self.run(Command::new("DEL")).await?.into_bool()
    }

    /// Whether the key exists and holds this facade's type
    pub async fn exists(&self) -> Result<bool> {
        let reply = self.run(Command::new("TYPE")).await?.into_string()?;
        Ok(KeyType::from_store(&reply)? == self.kind)
    }

    /// Issue `name key args...`; the key is injected, never passed by the caller
    pub async fn exec<I, T>(&self, name: &str, args: I) -> Result<Reply>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.run(Command::new(name).args(args)).await
    }

    /// Issue all `commands` as one transaction scoped to this key.
    ///
    /// Returns one reply per command in submission order. The guarantee is
    /// that no other client's command interleaves with the batch; it is not
    /// all-or-nothing. When a command fails at run time the commands before
    /// it keep their effect and the call fails with
    /// [`CollectionError::Transaction`](crate::CollectionError::Transaction).
    pub async fn batch(&self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        self.executor.batch(&self.key, commands).await
    }

    /// Identity: same client instance and same key, never content equality
    pub fn is(&self, other: &KeyHandle) -> bool {
        self.executor.same_client(&other.executor) && self.key == other.key
    }

    /// Batch for multi-command facade operations; a failure carries the
    /// kind of the command that broke
    pub(crate) async fn atomic(&self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        self.batch(commands)
            .await
            .map_err(CollectionError::unwrap_transaction)
    }

    /// Read-modify-write for facade operations with no store primitive:
    /// `plan` builds the writes from the replies of `reads` and may run
    /// more than once when another client modifies the key meanwhile
    pub(crate) async fn atomic_update<F>(&self, reads: Vec<Command>, plan: F) -> Result<Vec<Reply>>
    where
        F: FnMut(Vec<Reply>) -> Result<Vec<Command>> + Send,
    {
        self.executor
            .watched(&self.key, reads, plan)
            .await
            .map_err(CollectionError::unwrap_transaction)
    }

    pub(crate) async fn run(&self, command: Command) -> Result<Reply> {
        self.executor.run(&self.key, command).await
    }
}

/// Common shape of the typed facades
pub trait Facade: Deref<Target = KeyHandle> + Sized {
    /// Store type the facade operates on
    const KIND: KeyType;

    /// Wrap a handle bound to a key
    fn from_handle(handle: KeyHandle) -> Self;

    /// Bind a new facade to `key`
    fn of(executor: Executor, key: impl Into<String>) -> Self {
        Self::from_handle(KeyHandle::new(executor, key, Self::KIND))
    }
}

/// Next reply of a batch, in submission order
pub(crate) fn next_reply(replies: &mut impl Iterator<Item = Reply>) -> Result<Reply> {
    replies.next().ok_or_else(|| {
        CollectionError::UnexpectedReply("batch returned fewer replies than commands".to_string())
    })
}
