//! Store client contract
//!
//! The facades never talk to a socket directly. They issue [`Command`]s
//! through a [`StoreClient`], which either runs a single command or a
//! transactional batch and hands back normalized [`Reply`] values.
//!
//! Two implementations ship with the crate:
//! - [`TcpClient`]: a tokio connection to a Redis-compatible server
//! - [`MemoryStore`]: an in-process store with the same command semantics

pub mod memory;
pub mod sorted;
pub mod tcp;

pub use memory::MemoryStore;
pub use tcp::TcpClient;

use std::fmt;

use futures::future::BoxFuture;

use crate::error::{CollectionError, CommandError, Result};

/// A single store command: a name plus string arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    /// Create a command with no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Append several arguments
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.args.extend(args.into_iter().map(|a| a.to_string()));
        self
    }

    /// Insert the key as first argument
    pub(crate) fn with_key(mut self, key: &str) -> Self {
        self.args.insert(0, key.to_string());
        self
    }

    /// The command name as given
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The arguments, key included when one was injected
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Name followed by arguments, as sent on the wire
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A normalized store reply
///
/// Error replies never appear here; they surface as `Err` values.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Absent value (null bulk string, null array, RESP3 null)
    Nil,

    /// Status line such as `OK` or `QUEUED`
    Status(String),

    /// Integer reply
    Integer(i64),

    /// Bulk string reply
    Bulk(String),

    /// Floating point reply (RESP3)
    Double(f64),

    /// Boolean reply (RESP3)
    Boolean(bool),

    /// Array reply
    Array(Vec<Reply>),
}

impl Reply {
    /// Build a bulk reply
    pub fn bulk(s: impl Into<String>) -> Self {
        Reply::Bulk(s.into())
    }

    /// Build an array of bulk replies
    pub fn bulk_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Reply::Array(items.into_iter().map(|s| Reply::Bulk(s.into())).collect())
    }

    /// The `OK` status reply
    pub fn ok() -> Self {
        Reply::Status("OK".to_string())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    /// Interpret as an integer
    pub fn into_integer(self) -> Result<i64> {
        match self {
            Reply::Integer(n) => Ok(n),
            Reply::Bulk(s) | Reply::Status(s) => s.parse().map_err(|_| {
                CollectionError::UnexpectedReply(format!("expected integer, got {:?}", s))
            }),
            Reply::Boolean(b) => Ok(b as i64),
            other => Err(unexpected("integer", &other)),
        }
    }

    /// Interpret as a float (scores, INCRBYFLOAT results)
    pub fn into_float(self) -> Result<f64> {
        match self {
            Reply::Double(f) => Ok(f),
            Reply::Integer(n) => Ok(n as f64),
            Reply::Bulk(s) | Reply::Status(s) => parse_float(&s).ok_or_else(|| {
                CollectionError::UnexpectedReply(format!("expected float, got {:?}", s))
            }),
            other => Err(unexpected("float", &other)),
        }
    }

    /// Interpret as a string; nil is an error
    pub fn into_string(self) -> Result<String> {
        match self {
            Reply::Bulk(s) | Reply::Status(s) => Ok(s),
            Reply::Integer(n) => Ok(n.to_string()),
            Reply::Double(f) => Ok(format_float(f)),
            other => Err(unexpected("string", &other)),
        }
    }

    /// Interpret as an optional string; nil maps to `None`
    pub fn into_optional_string(self) -> Result<Option<String>> {
        match self {
            Reply::Nil => Ok(None),
            other => other.into_string().map(Some),
        }
    }

    /// Interpret as an optional integer; nil maps to `None`
    pub fn into_optional_integer(self) -> Result<Option<i64>> {
        match self {
            Reply::Nil => Ok(None),
            other => other.into_integer().map(Some),
        }
    }

    /// Interpret as an optional float; nil maps to `None`
    pub fn into_optional_float(self) -> Result<Option<f64>> {
        match self {
            Reply::Nil => Ok(None),
            other => other.into_float().map(Some),
        }
    }

    /// Interpret an integer reply as a flag (`1` = true)
    pub fn into_bool(self) -> Result<bool> {
        match self {
            Reply::Boolean(b) => Ok(b),
            other => other.into_integer().map(|n| n != 0),
        }
    }

    /// Interpret as an array; nil is an empty array
    pub fn into_array(self) -> Result<Vec<Reply>> {
        match self {
            Reply::Array(items) => Ok(items),
            Reply::Nil => Ok(Vec::new()),
            other => Err(unexpected("array", &other)),
        }
    }

    /// Interpret as an array of strings
    pub fn into_strings(self) -> Result<Vec<String>> {
        self.into_array()?.into_iter().map(Reply::into_string).collect()
    }

    /// Interpret as a flat `[member, score, member, score, ...]` array,
    /// or the RESP3 nested `[[member, score], ...]` form
    pub fn into_scored_pairs(self) -> Result<Vec<(String, f64)>> {
        let items = self.into_array()?;
        if items.iter().all(|item| matches!(item, Reply::Array(_))) && !items.is_empty() {
            return items
                .into_iter()
                .map(|pair| {
                    let mut pair = pair.into_array()?.into_iter();
                    match (pair.next(), pair.next()) {
                        (Some(member), Some(score)) => {
                            Ok((member.into_string()?, score.into_float()?))
                        }
                        _ => Err(CollectionError::UnexpectedReply(
                            "incomplete member/score pair".to_string(),
                        )),
                    }
                })
                .collect();
        }

        if items.len() % 2 != 0 {
            return Err(CollectionError::UnexpectedReply(format!(
                "odd number of elements ({}) in member/score reply",
                items.len()
            )));
        }
        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(member), Some(score)) = (iter.next(), iter.next()) {
            pairs.push((member.into_string()?, score.into_float()?));
        }
        Ok(pairs)
    }
}

fn unexpected(expected: &str, got: &Reply) -> CollectionError {
    CollectionError::UnexpectedReply(format!("expected {}, got {:?}", expected, got))
}

/// Parse a store float, accepting the `inf`/`+inf`/`-inf` spellings
pub fn parse_float(s: &str) -> Option<f64> {
    let value = s.trim().parse::<f64>().ok()?;
    if value.is_nan() { None } else { Some(value) }
}

/// Format a float the way the store expects it as an argument
pub fn format_float(f: f64) -> String {
    if f == f64::INFINITY {
        "+inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        f.to_string()
    }
}

/// Fold per-command EXEC results into the transaction outcome.
///
/// The first failing command turns the whole batch into
/// [`CollectionError::Transaction`] carrying its position.
pub(crate) fn collect_transaction<I>(results: I) -> Result<Vec<Reply>>
where
    I: IntoIterator<Item = std::result::Result<Reply, CommandError>>,
{
    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.map_err(|err| CollectionError::Transaction {
                index,
                message: err.to_string(),
            })
        })
        .collect()
}

/// Builds the write batch of a watched transaction from the replies of its
/// reads. Returning no commands ends the transaction without writing.
pub type WritePlan<'a> = dyn FnMut(Vec<Reply>) -> Result<Vec<Command>> + Send + 'a;

/// The interface the facades need from an underlying store client
///
/// Implementations must guarantee that the commands of one
/// [`execute_transaction`](StoreClient::execute_transaction) call are not
/// interleaved with commands from any other client.
pub trait StoreClient: Send + Sync {
    /// Execute a single command
    fn execute(&self, command: Command) -> BoxFuture<'_, Result<Reply>>;

    /// Execute commands as one transaction, returning one reply per command
    /// in submission order
    fn execute_transaction(&self, commands: Vec<Command>) -> BoxFuture<'_, Result<Vec<Reply>>>;

    /// Optimistic read-modify-write (`WATCH`, reads, `MULTI ... EXEC`).
    ///
    /// Watches `keys`, runs `reads`, hands their replies to `plan` and
    /// commits the commands it returns as one transaction. Resolves to
    /// `None` without writing anything when a watched key was modified
    /// after it was watched; the caller decides whether to retry.
    fn execute_watched<'a>(
        &'a self,
        keys: Vec<String>,
        reads: Vec<Command>,
        plan: &'a mut WritePlan<'a>,
    ) -> BoxFuture<'a, Result<Option<Vec<Reply>>>>;
}
