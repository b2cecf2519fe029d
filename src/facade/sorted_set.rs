//! Sorted set facade
//!
//! Members are ranked by ascending score, ties broken by member bytes.
//! Members added without a score get `0.0`, so a set filled only that way
//! ranks alphabetically.

use crate::client::{format_float, Command, Reply};
use crate::error::Result;
use crate::facade::{impl_facade, next_reply, KeyHandle};
use crate::index::{clamp_position, store_range};
use crate::keyspace::KeyType;

/// Score used when a member is added without one
pub const DEFAULT_SCORE: f64 = 0.0;

/// Facade over a sorted set key
#[derive(Debug, Clone)]
pub struct SortedSetFacade {
    handle: KeyHandle,
}

impl_facade!(SortedSetFacade, KeyType::SortedSet);

impl SortedSetFacade {
    /// Insert `member`, or move it to `score` when already present
    pub async fn add(&self, member: &str, score: Option<f64>) -> Result<&Self> {
        let score = score.unwrap_or(DEFAULT_SCORE);
        self.run(Command::new("ZADD").arg(format_float(score)).arg(member))
            .await?;
        Ok(self)
    }

    /// Insert or rescore every pair in a single ZADD
    pub async fn add_all<I, T>(&self, members: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (T, f64)>,
        T: ToString,
    {
        let mut command = Command::new("ZADD");
        let mut empty = true;
        for (member, score) in members {
            command = command.arg(format_float(score)).arg(member);
            empty = false;
        }
        if !empty {
            self.run(command).await?;
        }
        Ok(self)
    }

    /// Rank of `member`, lowest score first
    pub async fn index_of(&self, member: &str) -> Result<Option<usize>> {
        let rank = self.run(Command::new("ZRANK").arg(member)).await?.into_optional_integer()?;
        Ok(rank.map(|r| r as usize))
    }

    pub async fn score_of(&self, member: &str) -> Result<Option<f64>> {
        self.run(Command::new("ZSCORE").arg(member)).await?.into_optional_float()
    }

    /// Every member with its score, in rank order
    pub async fn scores(&self) -> Result<Vec<(String, f64)>> {
        self.run(Command::new("ZRANGE").arg(0).arg(-1).arg("WITHSCORES"))
            .await?
            .into_scored_pairs()
    }

    /// Add `amount` to the score of `member` (created at `amount` when
    /// absent); returns the new score
    pub async fn increase(&self, member: &str, amount: f64) -> Result<f64> {
        self.run(Command::new("ZINCRBY").arg(format_float(amount)).arg(member))
            .await?
            .into_float()
    }

    pub async fn decrease(&self, member: &str, amount: f64) -> Result<f64> {
        self.increase(member, -amount).await
    }

    /// Assign an absolute score; returns it
    pub async fn set(&self, member: &str, score: f64) -> Result<f64> {
        self.add(member, Some(score)).await?;
        Ok(score)
    }

    /// Remove and return the highest ranked member
    pub async fn pop(&self) -> Result<Option<String>> {
        Ok(self.pop_with_score().await?.map(|(member, _)| member))
    }

    pub async fn pop_with_score(&self) -> Result<Option<(String, f64)>> {
        self.pop_one("ZPOPMAX").await
    }

    /// Remove and return the lowest ranked member
    pub async fn shift(&self) -> Result<Option<String>> {
        Ok(self.shift_with_score().await?.map(|(member, _)| member))
    }

    pub async fn shift_with_score(&self) -> Result<Option<(String, f64)>> {
        self.pop_one("ZPOPMIN").await
    }

    /// Members with rank in `[start, end)`
    pub async fn slice(&self, start: i64, end: Option<i64>) -> Result<Vec<String>> {
        match store_range(start, end) {
            Some((from, to)) => self.range(from, to).await,
            None => Ok(Vec::new()),
        }
    }

    /// Remove `count` members starting at rank `start` (all of them up to
    /// the end when `None`) and return them
    pub async fn splice(&self, start: i64, count: Option<usize>) -> Result<Vec<String>> {
        let count = match count {
            None => return self.remove_ranks(start, -1).await,
            Some(0) => return Ok(Vec::new()),
            Some(count) => count,
        };
        if start >= 0 {
            return self.remove_ranks(start, rank_stop(start, count)).await;
        }

        // a negative start resolves against the size the removal sees
        let replies = self
            .atomic_update(vec![Command::new("ZCARD")], |reads| {
                let size = next_reply(&mut reads.into_iter())?.into_integer()?;
                let from = clamp_position(start, size as usize) as i64;
                Ok(rank_removal(from, rank_stop(from, count)))
            })
            .await?;
        next_reply(&mut replies.into_iter())?.into_strings()
    }

    /// Number of members whose score is exactly `score`
    pub async fn count_by_score(&self, score: f64) -> Result<usize> {
        self.count_by_score_range(score, score).await
    }

    /// Number of members scored within `[min, max]`
    pub async fn count_by_score_range(&self, min: f64, max: f64) -> Result<usize> {
        let count = self
            .run(Command::new("ZCOUNT").arg(format_float(min)).arg(format_float(max)))
            .await?
            .into_integer()?;
        Ok(count as usize)
    }

    /// Members scored within `[min, max]`, in rank order
    pub async fn slice_by_score(&self, min: f64, max: f64) -> Result<Vec<String>> {
        self.run(score_range("ZRANGEBYSCORE", min, max))
            .await?
            .into_strings()
    }

    /// Remove and return the members scored within `[min, max]`
    pub async fn splice_by_score(&self, min: f64, max: f64) -> Result<Vec<String>> {
        let mut replies = self
            .atomic(vec![
                score_range("ZRANGEBYSCORE", min, max),
                score_range("ZREMRANGEBYSCORE", min, max),
            ])
            .await?
            .into_iter();
        next_reply(&mut replies)?.into_strings()
    }

    pub async fn has(&self, member: &str) -> Result<bool> {
        Ok(self.score_of(member).await?.is_some())
    }

    /// Remove members; returns how many were present
    pub async fn delete<I, T>(&self, members: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let members: Vec<String> = members.into_iter().map(|m| m.to_string()).collect();
        if members.is_empty() {
            return Ok(0);
        }
        Ok(self.run(Command::new("ZREM").args(members)).await?.into_integer()? as usize)
    }

    /// Number of members
    pub async fn size(&self) -> Result<usize> {
        Ok(self.run(Command::new("ZCARD")).await?.into_integer()? as usize)
    }

    /// All members in rank order
    pub async fn values(&self) -> Result<Vec<String>> {
        self.range(0, -1).await
    }

    /// Fetch once and call `f(member, score)` in rank order
    pub async fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&str, f64),
    {
        for (member, score) in &self.scores().await? {
            f(member, *score);
        }
        Ok(())
    }

    async fn range(&self, start: i64, stop: i64) -> Result<Vec<String>> {
        self.run(Command::new("ZRANGE").arg(start).arg(stop))
            .await?
            .into_strings()
    }

    async fn remove_ranks(&self, from: i64, stop: i64) -> Result<Vec<String>> {
        let mut replies = self.atomic(rank_removal(from, stop)).await?.into_iter();
        next_reply(&mut replies)?.into_strings()
    }

    async fn pop_one(&self, name: &str) -> Result<Option<(String, f64)>> {
        let reply = self.run(Command::new(name)).await?;
        if let Reply::Nil = reply {
            return Ok(None);
        }
        Ok(reply.into_scored_pairs()?.into_iter().next())
    }
}

/// Inclusive stop rank for `count` members from `from`; a count reaching
/// past the last rank becomes `-1`
fn rank_stop(from: i64, count: usize) -> i64 {
    i64::try_from(count)
        .ok()
        .and_then(|count| from.checked_add(count))
        .map_or(-1, |end| end - 1)
}

/// Read then remove ranks `[from, stop]` in one batch
fn rank_removal(from: i64, stop: i64) -> Vec<Command> {
    vec![
        Command::new("ZRANGE").arg(from).arg(stop),
        Command::new("ZREMRANGEBYRANK").arg(from).arg(stop),
    ]
}

fn score_range(name: &str, min: f64, max: f64) -> Command {
    Command::new(name).arg(format_float(min)).arg(format_float(max))
}
