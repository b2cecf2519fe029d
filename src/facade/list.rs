//! List facade
//!
//! Positions follow the store's convention: zero-based, negative values
//! counting from the tail. `splice`, `sort` and `reverse` have no store
//! primitive; they read the list with the key watched and rewrite it in a
//! transaction that only commits if nobody touched the list in between,
//! starting over otherwise.

use std::cmp::Ordering;

use crate::client::{parse_float, Command, Reply};
use crate::error::{CollectionError, CommandError, Result};
use crate::facade::{impl_facade, next_reply, KeyHandle};
use crate::index::{clamp_position, store_range};
use crate::keyspace::KeyType;

/// Facade over a list key
#[derive(Debug, Clone)]
pub struct ListFacade {
    handle: KeyHandle,
}

impl_facade!(ListFacade, KeyType::List);

impl ListFacade {
    /// Append values at the tail; returns the new length
    pub async fn push<I, T>(&self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if values.is_empty() {
            return self.length().await;
        }
        let len = self.run(Command::new("RPUSH").args(values)).await?.into_integer()?;
        Ok(len as usize)
    }

    /// Prepend values at the head keeping their order, so
    /// `unshift(["a", "b"])` leaves the list starting with `a, b`
    pub async fn unshift<I, T>(&self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let mut values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if values.is_empty() {
            return self.length().await;
        }
        values.reverse();
        let len = self.run(Command::new("LPUSH").args(values)).await?.into_integer()?;
        Ok(len as usize)
    }

    /// Remove and return the last element
    pub async fn pop(&self) -> Result<Option<String>> {
        self.run(Command::new("RPOP")).await?.into_optional_string()
    }

    /// Remove and return the first element
    pub async fn shift(&self) -> Result<Option<String>> {
        self.run(Command::new("LPOP")).await?.into_optional_string()
    }

    /// Element at `index`; fails with `IndexOutOfRange` outside the list
    pub async fn get(&self, index: i64) -> Result<String> {
        match self.run(Command::new("LINDEX").arg(index)).await? {
            Reply::Nil => Err(CollectionError::IndexOutOfRange { index }),
            reply => reply.into_string(),
        }
    }

    /// Overwrite the element at `index`; returns the stored value
    pub async fn set(&self, index: i64, value: impl Into<String>) -> Result<String> {
        let value = value.into();
        match self.run(Command::new("LSET").arg(index).arg(&value)).await {
            Ok(_) => Ok(value),
            Err(CollectionError::IndexOutOfRange { .. })
            | Err(CollectionError::Command(CommandError::NoSuchKey)) => {
                Err(CollectionError::IndexOutOfRange { index })
            }
            Err(e) => Err(e),
        }
    }

    /// Remove every occurrence of each value; `true` if anything was removed
    pub async fn delete<I, T>(&self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let commands: Vec<Command> = values
            .into_iter()
            .map(|value| Command::new("LREM").arg(0).arg(value))
            .collect();
        if commands.is_empty() {
            return Ok(false);
        }

        let mut removed = 0;
        for reply in self.atomic(commands).await? {
            removed += reply.into_integer()?;
        }
        Ok(removed > 0)
    }

    /// Position of the first occurrence of `value`
    pub async fn index_of(&self, value: &str) -> Result<Option<usize>> {
        let position = self.run(Command::new("LPOS").arg(value)).await?.into_optional_integer()?;
        Ok(position.map(|p| p as usize))
    }

    pub async fn includes(&self, value: &str) -> Result<bool> {
        Ok(self.index_of(value).await?.is_some())
    }

    /// Elements in `[start, end)`; out-of-range positions clamp
    pub async fn slice(&self, start: i64, end: Option<i64>) -> Result<Vec<String>> {
        match store_range(start, end) {
            Some((from, to)) => self.range(from, to).await,
            None => Ok(Vec::new()),
        }
    }

    /// Remove `count` elements from `start`, insert `items` in their place
    /// and return the removed elements.
    ///
    /// ```text
    /// ["a","b","c","d"].splice(1, 2, ["x"]) -> ["b","c"], list is ["a","x","d"]
    /// ```
    pub async fn splice<I, T>(&self, start: i64, count: usize, items: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let items: Vec<String> = items.into_iter().map(|v| v.to_string()).collect();
        let reads = vec![
            Command::new("LLEN"),
            Command::new("LRANGE").arg(start).arg(-1),
            Command::new("PTTL"),
        ];

        let mut removed = Vec::new();
        self.atomic_update(reads, |replies| {
            let mut read = replies.into_iter();
            let len = next_reply(&mut read)?.into_integer()? as usize;
            let mut tail = next_reply(&mut read)?.into_strings()?;
            let ttl = next_reply(&mut read)?.into_integer()?;

            let from = clamp_position(start, len);
            let kept = tail.split_off(count.min(tail.len()));
            removed = tail;
            if removed.is_empty() && items.is_empty() {
                return Ok(Vec::new());
            }

            let mut write = Vec::with_capacity(3);
            if from == 0 {
                write.push(Command::new("DEL"));
            } else {
                write.push(Command::new("LTRIM").arg(0).arg(from - 1));
            }
            let rebuilt: Vec<&String> = items.iter().chain(&kept).collect();
            if !rebuilt.is_empty() {
                write.push(Command::new("RPUSH").args(rebuilt));
                if from == 0 && ttl > 0 {
                    write.push(Command::new("PEXPIRE").arg(ttl));
                }
            }
            Ok(write)
        })
        .await?;

        Ok(removed)
    }

    /// Sort the stored list and return it.
    ///
    /// Elements compare numerically when every one of them parses as a
    /// number, otherwise by bytes. `order >= 0` sorts ascending, a negative
    /// `order` descending. The sort is stable.
    pub async fn sort(&self, order: i32) -> Result<Vec<String>> {
        self.rearrange(|values| sorted(values, order)).await
    }

    /// Reverse the stored list and return it
    pub async fn reverse(&self) -> Result<Vec<String>> {
        self.rearrange(|mut values| {
            values.reverse();
            values
        })
        .await
    }

    pub async fn length(&self) -> Result<usize> {
        Ok(self.run(Command::new("LLEN")).await?.into_integer()? as usize)
    }

    /// All elements, head first
    pub async fn values(&self) -> Result<Vec<String>> {
        self.range(0, -1).await
    }

    /// Fetch the list once and call `f(value, index)` for each element
    pub async fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&str, usize),
    {
        for (index, value) in self.values().await?.iter().enumerate() {
            f(value, index);
        }
        Ok(())
    }

    async fn range(&self, start: i64, stop: i64) -> Result<Vec<String>> {
        self.run(Command::new("LRANGE").arg(start).arg(stop))
            .await?
            .into_strings()
    }

    /// Replace the whole list by `arrange(contents)`, keeping its expiry.
    /// An empty list is left alone.
    async fn rearrange<F>(&self, mut arrange: F) -> Result<Vec<String>>
    where
        F: FnMut(Vec<String>) -> Vec<String> + Send,
    {
        let reads = vec![Command::new("LRANGE").arg(0).arg(-1), Command::new("PTTL")];

        let mut arranged = Vec::new();
        self.atomic_update(reads, |replies| {
            let mut read = replies.into_iter();
            let values = next_reply(&mut read)?.into_strings()?;
            let ttl = next_reply(&mut read)?.into_integer()?;

            arranged = arrange(values);
            if arranged.is_empty() {
                return Ok(Vec::new());
            }
            let mut write = vec![Command::new("DEL"), Command::new("RPUSH").args(&arranged)];
            if ttl > 0 {
                write.push(Command::new("PEXPIRE").arg(ttl));
            }
            Ok(write)
        })
        .await?;

        Ok(arranged)
    }
}

/// Stable sort, numeric when every value is a number
fn sorted(values: Vec<String>, order: i32) -> Vec<String> {
    let directed = |ord: Ordering| if order < 0 { ord.reverse() } else { ord };

    let numbers: Option<Vec<f64>> = values.iter().map(|v| parse_float(v)).collect();
    match numbers {
        Some(numbers) => {
            let mut keyed: Vec<(f64, String)> = numbers.into_iter().zip(values).collect();
            keyed.sort_by(|a, b| directed(a.0.total_cmp(&b.0)));
            keyed.into_iter().map(|(_, value)| value).collect()
        }
        None => {
            let mut values = values;
            values.sort_by(|a, b| directed(a.as_bytes().cmp(b.as_bytes())));
            values
        }
    }
}
