//! redis-collections library
//!
//! Typed collection facades (strings, lists, hashes, sets, sorted sets)
//! bound to keys of a Redis-compatible store. Every facade call is a round
//! trip to the store; nothing is cached locally.
//!
//! ```no_run
//! use std::sync::Arc;
//! use redis_collections::{Keyspace, MemoryStore};
//!
//! # async fn demo() -> redis_collections::Result<()> {
//! let keyspace = Keyspace::new(Arc::new(MemoryStore::new()));
//! let todo = keyspace.list("todo");
//! todo.push(["write", "review"]).await?;
//! assert_eq!(todo.get(-1).await?, "review");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod facade;
pub mod index;
pub mod keyspace;
pub mod protocol;

// Re-export commonly used types
pub use client::{Command, MemoryStore, Reply, StoreClient, TcpClient, WritePlan};
pub use config::ClientConfig;
pub use error::{CollectionError, CommandError, Result};
pub use executor::Executor;
pub use facade::{
    Facade, HashFacade, KeyHandle, ListFacade, SetFacade, SortedSetFacade, StringFacade, Ttl,
};
pub use keyspace::{KeyType, Keyspace};
pub use protocol::RespFrame;
