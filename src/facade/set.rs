//! Set facade

use crate::client::Command;
use crate::error::Result;
use crate::facade::{impl_facade, KeyHandle};
use crate::keyspace::KeyType;

/// Facade over a set key
#[derive(Debug, Clone)]
pub struct SetFacade {
    handle: KeyHandle,
}

impl_facade!(SetFacade, KeyType::Set);

impl SetFacade {
    /// Insert values; members already present are left alone
    pub async fn add<I, T>(&self, values: I) -> Result<&Self>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if !values.is_empty() {
            self.run(Command::new("SADD").args(values)).await?;
        }
        Ok(self)
    }

    pub async fn has(&self, value: &str) -> Result<bool> {
        self.run(Command::new("SISMEMBER").arg(value)).await?.into_bool()
    }

    /// Remove values; returns how many were members
    pub async fn delete<I, T>(&self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if values.is_empty() {
            return Ok(0);
        }
        Ok(self.run(Command::new("SREM").args(values)).await?.into_integer()? as usize)
    }

    /// Remove and return one random member
    pub async fn pop(&self) -> Result<Option<String>> {
        self.run(Command::new("SPOP")).await?.into_optional_string()
    }

    /// Remove and return up to `count` random members
    pub async fn pop_many(&self, count: usize) -> Result<Vec<String>> {
        self.run(Command::new("SPOP").arg(count)).await?.into_strings()
    }

    /// One random member, left in place
    pub async fn random(&self) -> Result<Option<String>> {
        self.run(Command::new("SRANDMEMBER")).await?.into_optional_string()
    }

    /// Up to `count` distinct random members, left in place
    pub async fn random_many(&self, count: usize) -> Result<Vec<String>> {
        self.run(Command::new("SRANDMEMBER").arg(count)).await?.into_strings()
    }

    /// Members of this set absent from every one of `others`
    pub async fn difference(&self, others: &[&SetFacade]) -> Result<Vec<String>> {
        self.algebra("SDIFF", others).await
    }

    pub async fn intersection(&self, others: &[&SetFacade]) -> Result<Vec<String>> {
        self.algebra("SINTER", others).await
    }

    pub async fn union(&self, others: &[&SetFacade]) -> Result<Vec<String>> {
        self.algebra("SUNION", others).await
    }

    /// Number of members
    pub async fn size(&self) -> Result<usize> {
        Ok(self.run(Command::new("SCARD")).await?.into_integer()? as usize)
    }

    pub async fn values(&self) -> Result<Vec<String>> {
        self.run(Command::new("SMEMBERS")).await?.into_strings()
    }

    /// Fetch the members once and call `f` for each
    pub async fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        for value in &self.values().await? {
            f(value);
        }
        Ok(())
    }

    // Operands travel as keys; the store computes the result.
    async fn algebra(&self, name: &str, others: &[&SetFacade]) -> Result<Vec<String>> {
        let command = Command::new(name).args(others.iter().map(|other| other.key()));
        self.run(command).await?.into_strings()
    }
}
