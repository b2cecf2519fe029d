//! Error types for redis-collections
//!
//! This module defines the error kinds surfaced by every facade operation.
//! Store-side failures follow Redis's error conventions and are classified
//! into the facade's kinds rather than being passed through as raw strings.

use std::fmt;
use std::io;
use std::error::Error as StdError;

use crate::config::ConfigError;

/// Main error type for facade operations
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// Numeric operation against a value that is not an integer/float literal
    #[error("value is not a number: {0}")]
    NotANumber(String),

    /// Command issued against a key holding an incompatible type
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    /// Positional access beyond the current bounds of a list
    #[error("index {index} out of range")]
    IndexOutOfRange { index: i64 },

    /// A batched command sequence was rejected by the store
    #[error("transaction failed at command {index}: {message}")]
    Transaction { index: usize, message: String },

    /// Generic store rejection (syntax, unknown command, ...)
    #[error("{0}")]
    Command(CommandError),

    /// The reply did not have the shape the operation expects
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// RESP protocol errors (parsing, invalid UTF-8)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Connection-level failures reported by the store client
    #[error("connection error: {0}")]
    Connection(String),

    /// A watched read-modify-write kept losing the race for this key
    #[error("key {0} kept changing under a read-modify-write, giving up")]
    Contended(String),

    /// The store did not answer within the configured timeout
    #[error("command timed out")]
    Timeout,

    /// Network/IO errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Command-specific errors that map to Redis error responses
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Unknown command
    UnknownCommand(String),

    /// Wrong number of arguments for command
    WrongNumberOfArgs(String),

    /// Syntax error in command
    SyntaxError,

    /// Operation against wrong type
    WrongType,

    /// Value is not an integer or out of range
    NotInteger,

    /// Value is not a valid float
    NotFloat,

    /// Hash field value is not an integer
    HashNotInteger,

    /// Hash field value is not a float
    HashNotFloat,

    /// Integer increment or decrement leaves the 64-bit range
    Overflow,

    /// Index out of range
    IndexOutOfRange,

    /// Key not found
    NoSuchKey,

    /// Transaction discarded because of previous errors
    ExecAbort(String),

    /// Generic command error with message
    Generic(String),
}

/// Type alias for Results throughout redis-collections
pub type Result<T> = std::result::Result<T, CollectionError>;

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(cmd) => {
                write!(f, "ERR unknown command '{}'", cmd)
            }
            CommandError::WrongNumberOfArgs(cmd) => {
                write!(f, "ERR wrong number of arguments for '{}' command", cmd)
            }
            CommandError::SyntaxError => write!(f, "ERR syntax error"),
            CommandError::WrongType => {
                write!(f, "WRONGTYPE Operation against a key holding the wrong kind of value")
            }
            CommandError::NotInteger => {
                write!(f, "ERR value is not an integer or out of range")
            }
            CommandError::NotFloat => write!(f, "ERR value is not a valid float"),
            CommandError::HashNotInteger => write!(f, "ERR hash value is not an integer"),
            CommandError::HashNotFloat => write!(f, "ERR hash value is not a float"),
            CommandError::Overflow => write!(f, "ERR increment or decrement would overflow"),
            CommandError::IndexOutOfRange => write!(f, "ERR index out of range"),
            CommandError::NoSuchKey => write!(f, "ERR no such key"),
            CommandError::ExecAbort(msg) => write!(f, "EXECABORT {}", msg),
            CommandError::Generic(msg) => write!(f, "ERR {}", msg),
        }
    }
}

impl StdError for CommandError {}

impl CommandError {
    /// Classify an error line sent by the store back into a variant.
    ///
    /// The `-` prefix of a RESP error frame must already be stripped.
    pub fn from_message(message: &str) -> Self {
        let (code, rest) = match message.split_once(' ') {
            Some((code, rest)) => (code, rest),
            None => (message, ""),
        };

        match code {
            "WRONGTYPE" => return CommandError::WrongType,
            "EXECABORT" => return CommandError::ExecAbort(rest.to_string()),
            _ => {}
        }

        let lower = rest.to_ascii_lowercase();
        if lower.starts_with("hash value is not an integer") {
            CommandError::HashNotInteger
        } else if lower.starts_with("hash value is not a float") {
            CommandError::HashNotFloat
        } else if lower.starts_with("value is not an integer") {
            CommandError::NotInteger
        } else if lower.starts_with("value is not a valid float") {
            CommandError::NotFloat
        } else if lower.starts_with("increment or decrement would overflow") {
            CommandError::Overflow
        } else if lower.starts_with("index out of range") {
            CommandError::IndexOutOfRange
        } else if lower.starts_with("no such key") {
            CommandError::NoSuchKey
        } else if lower.starts_with("syntax error") {
            CommandError::SyntaxError
        } else if lower.starts_with("unknown command") {
            let name = rest.split('\'').nth(1).unwrap_or_default();
            CommandError::UnknownCommand(name.to_string())
        } else if lower.starts_with("wrong number of arguments") {
            let name = rest.split('\'').nth(1).unwrap_or_default();
            CommandError::WrongNumberOfArgs(name.to_string())
        } else {
            CommandError::Generic(rest.to_string())
        }
    }

    /// Whether this error comes from a numeric coercion failure
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            CommandError::NotInteger
                | CommandError::NotFloat
                | CommandError::HashNotInteger
                | CommandError::HashNotFloat
        )
    }
}

impl From<CommandError> for CollectionError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::WrongType => CollectionError::WrongType,
            CommandError::IndexOutOfRange => CollectionError::IndexOutOfRange { index: 0 },
            CommandError::ExecAbort(msg) => CollectionError::Transaction { index: 0, message: msg },
            err if err.is_numeric() => CollectionError::NotANumber(err.to_string()),
            err => CollectionError::Command(err),
        }
    }
}

impl CollectionError {
    /// Classify a failed internal batch by the error of the failing command.
    ///
    /// Facade operations composed of several commands report the kind of
    /// the command that broke (e.g. `WrongType`) instead of a bare
    /// transaction failure. Queue-time aborts stay `Transaction`.
    pub(crate) fn unwrap_transaction(self) -> Self {
        match self {
            CollectionError::Transaction { message, .. } if !message.starts_with("EXECABORT") => {
                CommandError::from_message(&message).into()
            }
            other => other,
        }
    }

    /// Whether the store rejected the command itself (as opposed to transport failures)
    pub fn is_store_rejection(&self) -> bool {
        matches!(
            self,
            CollectionError::NotANumber(_)
                | CollectionError::WrongType
                | CollectionError::IndexOutOfRange { .. }
                | CollectionError::Transaction { .. }
                | CollectionError::Command(_)
        )
    }
}
