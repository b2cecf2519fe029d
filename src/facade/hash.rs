//! Hash facade

use std::collections::HashMap;

use crate::client::{format_float, Command};
use crate::error::{CollectionError, CommandError, Result};
use crate::facade::{impl_facade, KeyHandle};
use crate::keyspace::KeyType;

/// Facade over a hash key
#[derive(Debug, Clone)]
pub struct HashFacade {
    handle: KeyHandle,
}

impl_facade!(HashFacade, KeyType::Hash);

impl HashFacade {
    /// Assign one field; returns the facade for chaining
    pub async fn set(&self, field: &str, value: impl ToString) -> Result<&Self> {
        self.run(Command::new("HSET").arg(field).arg(value)).await?;
        Ok(self)
    }

    /// Assign every pair in a single HSET
    pub async fn set_all<I, K, V>(&self, pairs: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        let mut command = Command::new("HSET");
        let mut empty = true;
        for (field, value) in pairs {
            command = command.arg(field).arg(value);
            empty = false;
        }
        if !empty {
            self.run(command).await?;
        }
        Ok(self)
    }

    pub async fn get(&self, field: &str) -> Result<Option<String>> {
        self.run(Command::new("HGET").arg(field)).await?.into_optional_string()
    }

    pub async fn has(&self, field: &str) -> Result<bool> {
        self.run(Command::new("HEXISTS").arg(field)).await?.into_bool()
    }

    /// Remove a single field; `true` if it existed
    pub async fn delete(&self, field: &str) -> Result<bool> {
        self.run(Command::new("HDEL").arg(field)).await?.into_bool()
    }

    pub async fn keys(&self) -> Result<Vec<String>> {
        self.run(Command::new("HKEYS")).await?.into_strings()
    }

    pub async fn values(&self) -> Result<Vec<String>> {
        self.run(Command::new("HVALS")).await?.into_strings()
    }

    /// Every field with its value
    pub async fn get_all(&self) -> Result<HashMap<String, String>> {
        let flat = self.run(Command::new("HGETALL")).await?.into_strings()?;
        if flat.len() % 2 != 0 {
            return Err(CollectionError::UnexpectedReply(format!(
                "HGETALL returned {} elements",
                flat.len()
            )));
        }

        let mut map = HashMap::with_capacity(flat.len() / 2);
        let mut iter = flat.into_iter();
        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            map.insert(field, value);
        }
        Ok(map)
    }

    /// Add `amount` to an integer field, creating it at `amount` when absent
    pub async fn increase(&self, field: &str, amount: i64) -> Result<i64> {
        self.run(Command::new("HINCRBY").arg(field).arg(amount))
            .await?
            .into_integer()
    }

    /// Subtract `amount`; an amount with no positive counterpart
    /// (`i64::MIN`) fails with the store's overflow error
    pub async fn decrease(&self, field: &str, amount: i64) -> Result<i64> {
        let delta = amount.checked_neg().ok_or(CommandError::Overflow)?;
        self.increase(field, delta).await
    }

    pub async fn increase_float(&self, field: &str, amount: f64) -> Result<f64> {
        self.run(Command::new("HINCRBYFLOAT").arg(field).arg(format_float(amount)))
            .await?
            .into_float()
    }

    pub async fn decrease_float(&self, field: &str, amount: f64) -> Result<f64> {
        self.increase_float(field, -amount).await
    }

    /// Number of fields
    pub async fn size(&self) -> Result<usize> {
        Ok(self.run(Command::new("HLEN")).await?.into_integer()? as usize)
    }

    /// Fetch all entries once and call `f(value, field)` for each
    pub async fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&str, &str),
    {
        for (field, value) in &self.get_all().await? {
            f(value, field);
        }
        Ok(())
    }
}
