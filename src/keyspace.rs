//! Keyspace: facade factory and key-level utilities
//!
//! A [`Keyspace`] wraps one store client. Facades created from it share
//! that client, which is what [`Keyspace::is`] compares alongside the key.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::client::{Command, Reply, StoreClient, TcpClient};
use crate::config::ClientConfig;
use crate::error::{CollectionError, Result};
use crate::executor::Executor;
use crate::facade::{
    Facade, HashFacade, KeyHandle, ListFacade, SetFacade, SortedSetFacade, StringFacade,
};

/// Type of the value stored under a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    String,
    List,
    Set,
    SortedSet,
    Hash,
    /// The key does not exist
    None,
}

impl KeyType {
    /// Parse the store's TYPE reply
    pub fn from_store(raw: &str) -> Result<Self> {
        match raw {
            "string" => Ok(KeyType::String),
            "list" => Ok(KeyType::List),
            "set" => Ok(KeyType::Set),
            "zset" => Ok(KeyType::SortedSet),
            "hash" => Ok(KeyType::Hash),
            "none" => Ok(KeyType::None),
            other => Err(CollectionError::UnexpectedReply(format!("unknown key type {:?}", other))),
        }
    }

    /// The store's name for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::String => "string",
            KeyType::List => "list",
            KeyType::Set => "set",
            KeyType::SortedSet => "zset",
            KeyType::Hash => "hash",
            KeyType::None => "none",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry point: creates facades bound to keys of one store
#[derive(Debug, Clone)]
pub struct Keyspace {
    executor: Executor,
}

impl Keyspace {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Keyspace {
            executor: Executor::new(client),
        }
    }

    /// Open a TCP connection described by `config`
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let client = TcpClient::connect(config).await?;
        info!(addr = %client.config().addr(), "keyspace ready");
        Ok(Keyspace::new(Arc::new(client)))
    }

    pub fn string(&self, key: impl Into<String>) -> StringFacade {
        self.facade(key)
    }

    pub fn list(&self, key: impl Into<String>) -> ListFacade {
        self.facade(key)
    }

    pub fn hash(&self, key: impl Into<String>) -> HashFacade {
        self.facade(key)
    }

    pub fn set(&self, key: impl Into<String>) -> SetFacade {
        self.facade(key)
    }

    pub fn sorted_set(&self, key: impl Into<String>) -> SortedSetFacade {
        self.facade(key)
    }

    /// Facade of any type bound to `key`
    pub fn facade<F: Facade>(&self, key: impl Into<String>) -> F {
        F::of(self.executor.clone(), key)
    }

    /// Whether `key` exists, whatever its type
    pub async fn has(&self, key: &str) -> Result<bool> {
        self.executor.run(key, Command::new("EXISTS")).await?.into_bool()
    }

    /// Whether `key` exists and holds the type facade `F` operates on
    pub async fn has_typed<F: Facade>(&self, key: &str) -> Result<bool> {
        Ok(self.type_of(key).await? == F::KIND)
    }

    /// Delete keys; returns how many existed
    pub async fn delete(&self, keys: &[&str]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let removed = self
            .executor
            .run_server(Command::new("DEL").args(keys))
            .await?
            .into_integer()?;
        Ok(removed as u64)
    }

    pub async fn type_of(&self, key: &str) -> Result<KeyType> {
        let raw = self.executor.run(key, Command::new("TYPE")).await?.into_string()?;
        KeyType::from_store(&raw)
    }

    /// Issue `name key args...`
    pub async fn exec<I, T>(&self, key: &str, name: &str, args: I) -> Result<Reply>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.executor.run(key, Command::new(name).args(args)).await
    }

    /// Issue a command that addresses no key, such as `DBSIZE`
    pub async fn exec_server<I, T>(&self, name: &str, args: I) -> Result<Reply>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.executor.run_server(Command::new(name).args(args)).await
    }

    /// Run complete commands (keys included) as one transaction
    pub async fn batch(&self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        self.executor.transaction(commands).await
    }

    /// Identity of two facades: same client instance and same key
    pub fn is(&self, a: &KeyHandle, b: &KeyHandle) -> bool {
        a.is(b)
    }

    /// Keys matching a glob `pattern`
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.executor
            .run_server(Command::new("KEYS").arg(pattern))
            .await?
            .into_strings()
    }

    pub async fn ping(&self) -> Result<()> {
        match self.executor.run_server(Command::new("PING")).await? {
            Reply::Status(_) | Reply::Bulk(_) => Ok(()),
            other => Err(CollectionError::UnexpectedReply(format!("PING answered {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryStore;

    #[test]
    fn test_key_type_names() {
        for kind in [
            KeyType::String,
            KeyType::List,
            KeyType::Set,
            KeyType::SortedSet,
            KeyType::Hash,
            KeyType::None,
        ] {
            assert_eq!(KeyType::from_store(kind.as_str()).unwrap(), kind);
        }
        assert!(KeyType::from_store("stream").is_err());
    }

    #[tokio::test]
    async fn test_type_of_and_has_typed() {
        let keyspace = Keyspace::new(Arc::new(MemoryStore::new()));
        keyspace.list("l").push(["a"]).await.unwrap();

        assert_eq!(keyspace.type_of("l").await.unwrap(), KeyType::List);
        assert_eq!(keyspace.type_of("missing").await.unwrap(), KeyType::None);
        assert!(keyspace.has_typed::<ListFacade>("l").await.unwrap());
        assert!(!keyspace.has_typed::<SetFacade>("l").await.unwrap());
        assert!(!keyspace.has_typed::<ListFacade>("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_counts_existing() {
        let keyspace = Keyspace::new(Arc::new(MemoryStore::new()));
        keyspace.string("a").set("1", None).await.unwrap();
        keyspace.string("b").set("2", None).await.unwrap();

        assert_eq!(keyspace.delete(&["a", "b", "c"]).await.unwrap(), 2);
        assert_eq!(keyspace.delete(&[]).await.unwrap(), 0);
        assert!(!keyspace.has("a").await.unwrap());
    }
}
