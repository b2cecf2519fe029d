//! Score-ordered member index for sorted sets
//!
//! Keeps two views of the same data: an ordered set of `(score, member)`
//! entries for rank and range queries, and a member-to-score map for
//! direct lookups. Ordering is by score ascending, ties broken by member
//! bytes ascending.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;

/// Total-ordered score wrapper (NaN never enters the index)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Score(f64);

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// `-0` and `0` are the same score; only `0` is ever stored or compared
fn canonical(score: f64) -> f64 {
    if score == 0.0 {
        0.0
    } else {
        score
    }
}

/// One end of a score range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    Inclusive(f64),
    Exclusive(f64),
}

impl ScoreBound {
    /// Parse a store score bound: `1.5`, `(1.5`, `-inf`, `+inf`
    pub fn parse(s: &str) -> Option<Self> {
        let (exclusive, number) = match s.strip_prefix('(') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let value = canonical(crate::client::parse_float(number)?);
        Some(if exclusive {
            ScoreBound::Exclusive(value)
        } else {
            ScoreBound::Inclusive(value)
        })
    }

    fn admits_from_below(&self, score: f64) -> bool {
        match *self {
            ScoreBound::Inclusive(min) => score >= min,
            ScoreBound::Exclusive(min) => score > min,
        }
    }

    fn admits_from_above(&self, score: f64) -> bool {
        match *self {
            ScoreBound::Inclusive(max) => score <= max,
            ScoreBound::Exclusive(max) => score < max,
        }
    }
}

/// Sorted member index with dual indexing
#[derive(Debug, Clone, Default)]
pub struct SortedIndex {
    ordered: BTreeSet<(Score, String)>,
    scores: HashMap<String, f64>,
}

impl SortedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a member, returning the previous score
    pub fn insert(&mut self, member: String, score: f64) -> Option<f64> {
        let score = canonical(score);
        let previous = self.scores.insert(member.clone(), score);
        if let Some(old) = previous {
            self.ordered.remove(&(Score(old), member.clone()));
        }
        self.ordered.insert((Score(score), member));
        previous
    }

    /// Remove a member, returning its score
    pub fn remove(&mut self, member: &str) -> Option<f64> {
        let score = self.scores.remove(member)?;
        self.ordered.remove(&(Score(score), member.to_string()));
        Some(score)
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// 0-based rank of a member under ascending order
    pub fn rank(&self, member: &str) -> Option<usize> {
        let score = self.score(member)?;
        let key = (Score(score), member.to_string());
        Some(self.ordered.range(..key).count())
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Entries with ranks in `[start, stop]`, both already clamped to bounds
    pub fn range_by_rank(&self, start: usize, stop: usize) -> Vec<(String, f64)> {
        if start > stop {
            return Vec::new();
        }
        self.ordered
            .iter()
            .skip(start)
            .take(stop - start + 1)
            .map(|(score, member)| (member.clone(), score.0))
            .collect()
    }

    /// Entries whose score lies between `min` and `max`
    pub fn range_by_score(&self, min: ScoreBound, max: ScoreBound) -> Vec<(String, f64)> {
        let lower = match min {
            ScoreBound::Inclusive(v) | ScoreBound::Exclusive(v) => {
                Bound::Included((Score(canonical(v)), String::new()))
            }
        };
        self.ordered
            .range((lower, Bound::Unbounded))
            .skip_while(|(score, _)| !min.admits_from_below(score.0))
            .take_while(|(score, _)| max.admits_from_above(score.0))
            .map(|(score, member)| (member.clone(), score.0))
            .collect()
    }

    /// Remove and return up to `count` entries from the low (`min`) or high end
    pub fn pop(&mut self, count: usize, from_high: bool) -> Vec<(String, f64)> {
        let mut popped = Vec::with_capacity(count.min(self.len()));
        for _ in 0..count {
            let entry = if from_high {
                self.ordered.pop_last()
            } else {
                self.ordered.pop_first()
            };
            match entry {
                Some((score, member)) => {
                    self.scores.remove(&member);
                    popped.push((member, score.0));
                }
                None => break,
            }
        }
        popped
    }

    /// All entries in ascending order
    pub fn items(&self) -> Vec<(String, f64)> {
        self.ordered.iter().map(|(score, member)| (member.clone(), score.0)).collect()
    }
}
