//! String facade
//!
//! Positions used by [`StringFacade::slice`] count Unicode scalar values,
//! while [`StringFacade::length`] reports the store's byte length; both
//! agree for ASCII values.

use crate::client::{format_float, Command};
use crate::error::Result;
use crate::facade::{impl_facade, next_reply, KeyHandle};
use crate::index::slice_bounds;
use crate::keyspace::KeyType;

/// Facade over a string key
#[derive(Debug, Clone)]
pub struct StringFacade {
    handle: KeyHandle,
}

impl_facade!(StringFacade, KeyType::String);

impl StringFacade {
    /// Store `value`, with an expiry in seconds set in the same command
    pub async fn set(&self, value: impl Into<String>, ttl: Option<u64>) -> Result<String> {
        let value = value.into();
        let mut command = Command::new("SET").arg(&value);
        if let Some(seconds) = ttl {
            command = command.arg("EX").arg(seconds);
        }
        self.run(command).await?;
        Ok(value)
    }

    /// Current value; `""` when the key does not exist
    pub async fn get(&self) -> Result<String> {
        Ok(self
            .run(Command::new("GET"))
            .await?
            .into_optional_string()?
            .unwrap_or_default())
    }

    /// Characters in `[start, end)`, negative positions counted from the
    /// end; out-of-range positions clamp
    pub async fn slice(&self, start: i64, end: Option<i64>) -> Result<String> {
        let value = self.get().await?;
        let chars: Vec<char> = value.chars().collect();
        Ok(chars[slice_bounds(chars.len(), start, end)].iter().collect())
    }

    /// Not atomic with concurrent writers: reads, then compares locally
    pub async fn starts_with(&self, prefix: &str) -> Result<bool> {
        Ok(self.get().await?.starts_with(prefix))
    }

    /// Not atomic with concurrent writers: reads, then compares locally
    pub async fn ends_with(&self, suffix: &str) -> Result<bool> {
        Ok(self.get().await?.ends_with(suffix))
    }

    /// Append `suffix` and return the full new value
    pub async fn append(&self, suffix: &str) -> Result<String> {
        let mut replies = self
            .atomic(vec![Command::new("APPEND").arg(suffix), Command::new("GET")])
            .await?
            .into_iter()
            .skip(1);
        next_reply(&mut replies)?.into_string()
    }

    /// Add `amount` to an integer value (missing counts as `0`)
    pub async fn increase(&self, amount: i64) -> Result<i64> {
        self.run(Command::new("INCRBY").arg(amount)).await?.into_integer()
    }

    /// Subtract `amount` from an integer value (missing counts as `0`)
    pub async fn decrease(&self, amount: i64) -> Result<i64> {
        self.run(Command::new("DECRBY").arg(amount)).await?.into_integer()
    }

    /// Add a floating point `amount`
    pub async fn increase_float(&self, amount: f64) -> Result<f64> {
        self.run(Command::new("INCRBYFLOAT").arg(format_float(amount))).await?.into_float()
    }

    pub async fn decrease_float(&self, amount: f64) -> Result<f64> {
        self.increase_float(-amount).await
    }

    /// Length in bytes of the stored UTF-8 value
    pub async fn length(&self) -> Result<usize> {
        Ok(self.run(Command::new("STRLEN")).await?.into_integer()? as usize)
    }
}
