//! In-process store client
//!
//! `MemoryStore` executes the command subset the facades issue with the
//! same semantics a Redis server applies: lazy key expiry, aggregates that
//! disappear once empty, WRONGTYPE checks and Redis error strings.
//!
//! Transactions validate every queued command first (unknown command or
//! wrong arity rejects the whole batch, nothing runs) and then execute
//! under a single lock. Runtime errors of individual commands do not roll
//! back the commands before them.
//!
//! Every successful write stamps its keys with a fresh version. `WATCH`
//! remembers the version and liveness of a key, and a watched batch only
//! commits while both are unchanged.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::{self, BoxFuture, FutureExt};
use rand::seq::{IteratorRandom, SliceRandom};
use tracing::debug;

use super::sorted::{ScoreBound, SortedIndex};
use super::{
    collect_transaction, format_float, parse_float, Command, Reply, StoreClient, WritePlan,
};
use crate::error::{CollectionError, CommandError, Result};
use crate::index::element_position;
use crate::protocol::{extract_command_parts, RespFrame};

type CommandResult = std::result::Result<Reply, CommandError>;

/// Extracts the inner collection of a value or fails with WRONGTYPE
macro_rules! typed {
    ($value:expr, $variant:ident) => {
        match $value {
            Value::$variant(inner) => Ok(inner),
            _ => Err(CommandError::WrongType),
        }
    };
}

#[derive(Debug, Clone)]
enum Value {
    String(String),
    List(VecDeque<String>),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
    SortedSet(SortedIndex),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Hash(_) => "hash",
            Value::Set(_) => "set",
            Value::SortedSet(_) => "zset",
        }
    }

    /// Empty aggregates are removed from the keyspace
    fn is_empty(&self) -> bool {
        match self {
            Value::String(_) => false,
            Value::List(list) => list.is_empty(),
            Value::Hash(hash) => hash.is_empty(),
            Value::Set(set) => set.is_empty(),
            Value::SortedSet(index) => index.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Entry {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Instant::now() >= at)
    }
}

#[derive(Debug, Default)]
struct Database {
    data: HashMap<String, Entry>,
    /// Version stamped on a key by its latest write
    versions: HashMap<String, u64>,
    clock: u64,
}

/// State of a key when it was watched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mark {
    version: u64,
    live: bool,
}

type Watched = Vec<(String, Mark)>;

type BatchResult = std::result::Result<Vec<CommandResult>, (usize, CommandError)>;

/// In-process store client with Redis command semantics
#[derive(Debug, Default)]
pub struct MemoryStore {
    db: Mutex<Database>,
    password: Option<String>,
}

/// Per-connection state when a RESP server loop drives a [`MemoryStore`]
#[derive(Debug, Default)]
pub struct Session {
    authenticated: bool,
    name: Option<String>,
    queued: Option<Vec<Command>>,
    dirty: bool,
    watched: Watched,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name registered with CLIENT SETNAME
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose RESP sessions must AUTH with `password` first
    pub fn with_password(password: impl Into<String>) -> Self {
        MemoryStore {
            password: Some(password.into()),
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let mut db = self.lock();
        db.purge_all();
        db.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run one command
    pub fn run(&self, command: &Command) -> CommandResult {
        let name = validate(command)?;
        self.lock().execute(&name, command.arguments())
    }

    /// Run a batch under one lock, returning one result per command.
    ///
    /// Fails before executing anything when a command is unknown or has
    /// the wrong arity, reporting the offending position.
    pub fn run_batch(&self, commands: &[Command]) -> BatchResult {
        Ok(self.run_batch_watched(&[], commands)?.unwrap_or_default())
    }

    /// Like [`run_batch`](Self::run_batch), but runs nothing and returns
    /// `None` when a watched key changed since it was marked
    fn run_batch_watched(
        &self,
        watched: &[(String, Mark)],
        commands: &[Command],
    ) -> std::result::Result<Option<Vec<CommandResult>>, (usize, CommandError)> {
        let names = commands
            .iter()
            .enumerate()
            .map(|(index, command)| validate(command).map_err(|err| (index, err)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut db = self.lock();
        if watched.iter().any(|(key, mark)| db.mark(key) != *mark) {
            debug!(keys = watched.len(), "watched key modified, batch aborted");
            return Ok(None);
        }
        Ok(Some(
            names
                .iter()
                .zip(commands)
                .map(|(name, command)| db.execute(name, command.arguments()))
                .collect(),
        ))
    }

    /// Mark `keys` and run `reads` under one lock
    fn watch_and_read(&self, keys: &[String], reads: &[Command]) -> Result<(Watched, Vec<Reply>)> {
        let mut db = self.lock();
        let watched = keys.iter().map(|key| (key.clone(), db.mark(key))).collect();
        let mut replies = Vec::with_capacity(reads.len());
        for command in reads {
            let name = validate(command)?;
            replies.push(db.execute(&name, command.arguments())?);
        }
        Ok((watched, replies))
    }

    fn run_watched(
        &self,
        keys: &[String],
        reads: &[Command],
        plan: &mut WritePlan<'_>,
    ) -> Result<Option<Vec<Reply>>> {
        let (watched, replies) = self.watch_and_read(keys, reads)?;
        let writes = plan(replies)?;
        if writes.is_empty() {
            return Ok(Some(Vec::new()));
        }
        match self.run_batch_watched(&watched, &writes) {
            Ok(Some(results)) => collect_transaction(results).map(Some),
            Ok(None) => Ok(None),
            Err((index, err)) => Err(exec_abort(index, err)),
        }
    }

    /// Handle one request frame for a RESP connection.
    ///
    /// Connection commands (AUTH, SELECT, CLIENT SETNAME) and MULTI/EXEC/
    /// DISCARD are resolved against `session`; everything else runs on the
    /// shared store. Errors come back as RESP error frames.
    pub fn dispatch_frame(&self, session: &mut Session, frame: &RespFrame) -> RespFrame {
        let mut parts = match extract_command_parts(frame) {
            Ok(parts) => parts.into_iter(),
            Err(err) => return RespFrame::error(format!("ERR Protocol error: {}", err)),
        };
        let name = parts.next().unwrap_or_default().to_ascii_uppercase();
        let command = Command::new(name).args(parts);

        match command.name() {
            "AUTH" => return self.authenticate(session, command.arguments()),
            _ if self.password.is_some() && !session.authenticated => {
                return RespFrame::error("NOAUTH Authentication required.");
            }
            "SELECT" => {
                return match command.arguments() {
                    [db] if db.parse::<usize>().is_ok() => RespFrame::ok(),
                    [_] => error_frame(&CommandError::NotInteger),
                    _ => error_frame(&CommandError::WrongNumberOfArgs("select".to_string())),
                };
            }
            "CLIENT" => {
                return match command.arguments() {
                    [sub, name] if sub.eq_ignore_ascii_case("SETNAME") => {
                        session.name = Some(name.clone());
                        RespFrame::ok()
                    }
                    _ => error_frame(&CommandError::SyntaxError),
                };
            }
            "WATCH" if session.queued.is_some() => {
                session.dirty = true;
                return RespFrame::error("ERR WATCH inside MULTI is not allowed");
            }
            "WATCH" => {
                if command.arguments().is_empty() {
                    return error_frame(&CommandError::WrongNumberOfArgs("watch".to_string()));
                }
                let mut db = self.lock();
                for key in command.arguments() {
                    let mark = db.mark(key);
                    session.watched.push((key.clone(), mark));
                }
                return RespFrame::ok();
            }
            "UNWATCH" => {
                session.watched.clear();
                return RespFrame::ok();
            }
            "MULTI" => {
                if session.queued.is_some() {
                    return RespFrame::error("ERR MULTI calls can not be nested");
                }
                session.queued = Some(Vec::new());
                session.dirty = false;
                return RespFrame::ok();
            }
            "DISCARD" => {
                return match session.queued.take() {
                    Some(_) => {
                        session.watched.clear();
                        RespFrame::ok()
                    }
                    None => RespFrame::error("ERR DISCARD without MULTI"),
                };
            }
            "EXEC" => return self.exec_queued(session),
            _ => {}
        }

        if let Some(queue) = session.queued.as_mut() {
            return match validate(&command) {
                Ok(_) => {
                    queue.push(command);
                    RespFrame::simple_string("QUEUED")
                }
                Err(err) => {
                    session.dirty = true;
                    error_frame(&err)
                }
            };
        }

        match self.run(&command) {
            Ok(reply) => reply_to_frame(reply),
            Err(err) => error_frame(&err),
        }
    }

    fn authenticate(&self, session: &mut Session, args: &[String]) -> RespFrame {
        let supplied = match args {
            [password] | [_, password] => password,
            _ => return error_frame(&CommandError::WrongNumberOfArgs("auth".to_string())),
        };

        match &self.password {
            None => RespFrame::error(
                "ERR AUTH <password> called without any password configured for the default user",
            ),
            Some(expected) if expected == supplied => {
                session.authenticated = true;
                RespFrame::ok()
            }
            Some(_) => RespFrame::error(
                "WRONGPASS invalid username-password pair or user is disabled.",
            ),
        }
    }

    fn exec_queued(&self, session: &mut Session) -> RespFrame {
        let queue = match session.queued.take() {
            Some(queue) => queue,
            None => return RespFrame::error("ERR EXEC without MULTI"),
        };
        let watched = std::mem::take(&mut session.watched);
        if std::mem::take(&mut session.dirty) {
            return error_frame(&CommandError::ExecAbort(
                "Transaction discarded because of previous errors.".to_string(),
            ));
        }

        match self.run_batch_watched(&watched, &queue) {
            Ok(None) => RespFrame::Array(None),
            Ok(Some(results)) => RespFrame::array(
                results
                    .into_iter()
                    .map(|result| match result {
                        Ok(reply) => reply_to_frame(reply),
                        Err(err) => error_frame(&err),
                    })
                    .collect(),
            ),
            Err((_, err)) => error_frame(&err),
        }
    }
}

impl StoreClient for MemoryStore {
    fn execute(&self, command: Command) -> BoxFuture<'_, Result<Reply>> {
        future::ready(self.run(&command).map_err(CollectionError::from)).boxed()
    }

    fn execute_transaction(&self, commands: Vec<Command>) -> BoxFuture<'_, Result<Vec<Reply>>> {
        let outcome = match self.run_batch(&commands) {
            Ok(results) => collect_transaction(results),
            Err((index, err)) => Err(exec_abort(index, err)),
        };
        future::ready(outcome).boxed()
    }

    fn execute_watched<'a>(
        &'a self,
        keys: Vec<String>,
        reads: Vec<Command>,
        plan: &'a mut WritePlan<'a>,
    ) -> BoxFuture<'a, Result<Option<Vec<Reply>>>> {
        future::ready(self.run_watched(&keys, &reads, plan)).boxed()
    }
}

/// Queue-time rejection of the command at `index`
fn exec_abort(index: usize, err: CommandError) -> CollectionError {
    CollectionError::Transaction {
        index,
        message: CommandError::ExecAbort(format!(
            "Transaction discarded because of previous errors: {}",
            err
        ))
        .to_string(),
    }
}

/// Commands that modify their first key
fn is_write(name: &str) -> bool {
    matches!(
        name,
        "SET" | "APPEND" | "INCR" | "DECR" | "INCRBY" | "DECRBY" | "INCRBYFLOAT"
            | "EXPIRE" | "PEXPIRE" | "PERSIST"
            | "LPUSH" | "RPUSH" | "LPOP" | "RPOP" | "LSET" | "LTRIM" | "LREM"
            | "HSET" | "HMSET" | "HDEL" | "HINCRBY" | "HINCRBYFLOAT"
            | "SADD" | "SREM" | "SPOP"
            | "ZADD" | "ZREM" | "ZINCRBY" | "ZREMRANGEBYRANK" | "ZREMRANGEBYSCORE"
            | "ZPOPMIN" | "ZPOPMAX"
    )
}

/// Check command name and argument count, returning the upper-cased name
fn validate(command: &Command) -> std::result::Result<String, CommandError> {
    let name = command.name().to_ascii_uppercase();
    let arity = arity(&name)
        .ok_or_else(|| CommandError::UnknownCommand(command.name().to_string()))?;
    let argc = command.arguments().len() as i32 + 1;

    let arity_ok = if arity > 0 { argc == arity } else { argc >= -arity };
    // field/value pairs must be complete
    let pairs_ok = match name.as_str() {
        "HSET" | "HMSET" => argc % 2 == 0,
        _ => true,
    };

    if arity_ok && pairs_ok {
        Ok(name)
    } else {
        Err(CommandError::WrongNumberOfArgs(name.to_ascii_lowercase()))
    }
}

/// Redis-style arity: exact when positive, minimum when negative
fn arity(name: &str) -> Option<i32> {
    let arity = match name {
        "PING" => -1,
        "ECHO" => 2,
        "DBSIZE" => 1,
        "FLUSHDB" | "FLUSHALL" => -1,
        "EXISTS" | "DEL" => -2,
        "TYPE" | "TTL" | "PTTL" | "PERSIST" | "KEYS" => 2,
        "EXPIRE" | "PEXPIRE" => 3,

        "GET" | "STRLEN" | "INCR" | "DECR" => 2,
        "SET" => -3,
        "APPEND" | "INCRBY" | "DECRBY" | "INCRBYFLOAT" => 3,
        "GETRANGE" => 4,

        "LPUSH" | "RPUSH" => -3,
        "LPOP" | "RPOP" => -2,
        "LLEN" => 2,
        "LINDEX" => 3,
        "LSET" | "LRANGE" | "LTRIM" | "LREM" => 4,
        "LPOS" => -3,

        "HSET" | "HMSET" => -4,
        "HGET" | "HEXISTS" => 3,
        "HDEL" => -3,
        "HLEN" | "HKEYS" | "HVALS" | "HGETALL" => 2,
        "HINCRBY" | "HINCRBYFLOAT" => 4,

        "SADD" | "SREM" => -3,
        "SISMEMBER" => 3,
        "SCARD" | "SMEMBERS" => 2,
        "SPOP" | "SRANDMEMBER" => -2,
        "SDIFF" | "SINTER" | "SUNION" => -2,

        "ZADD" => -4,
        "ZREM" => -3,
        "ZSCORE" | "ZRANK" => 3,
        "ZCARD" => 2,
        "ZINCRBY" | "ZCOUNT" | "ZREMRANGEBYRANK" | "ZREMRANGEBYSCORE" => 4,
        "ZRANGE" | "ZRANGEBYSCORE" => -4,
        "ZPOPMIN" | "ZPOPMAX" => -2,
        _ => return None,
    };
    Some(arity)
}

impl Database {
    /// Apply a command and stamp the keys it wrote
    fn execute(&mut self, name: &str, args: &[String]) -> CommandResult {
        let written: Vec<String> = match name {
            "FLUSHDB" | "FLUSHALL" => self.data.keys().cloned().collect(),
            "DEL" => args.to_vec(),
            _ if is_write(name) => args.first().cloned().into_iter().collect(),
            _ => Vec::new(),
        };
        let reply = self.apply(name, args)?;
        for key in written {
            self.clock += 1;
            self.versions.insert(key, self.clock);
        }
        Ok(reply)
    }

    fn mark(&mut self, key: &str) -> Mark {
        Mark {
            version: self.versions.get(key).copied().unwrap_or(0),
            live: self.live(key).is_some(),
        }
    }

    fn purge(&mut self, key: &str) {
        if self.data.get(key).map_or(false, Entry::is_expired) {
            self.data.remove(key);
        }
    }

    fn purge_all(&mut self) {
        self.data.retain(|_, entry| !entry.is_expired());
    }

    /// Live entry for `key`, dropping it first when expired
    fn live(&mut self, key: &str) -> Option<&mut Entry> {
        self.purge(key);
        self.data.get_mut(key)
    }

    fn live_or_insert(&mut self, key: &str, make: fn() -> Value) -> &mut Entry {
        self.purge(key);
        self.data
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(make()))
    }

    fn drop_if_empty(&mut self, key: &str) {
        if self.data.get(key).map_or(false, |entry| entry.value.is_empty()) {
            self.data.remove(key);
        }
    }

    fn apply(&mut self, name: &str, args: &[String]) -> CommandResult {
        match name {
            "PING" => Ok(match args.first() {
                Some(message) => Reply::bulk(message.as_str()),
                None => Reply::Status("PONG".to_string()),
            }),
            "ECHO" => Ok(Reply::bulk(args[0].as_str())),
            "DBSIZE" => {
                self.purge_all();
                Ok(Reply::Integer(self.data.len() as i64))
            }
            "FLUSHDB" | "FLUSHALL" => {
                debug!(keys = self.data.len(), "flushing memory store");
                self.data.clear();
                Ok(Reply::ok())
            }
            "EXISTS" => Ok(Reply::Integer(
                args.iter().filter(|key| self.live(key).is_some()).count() as i64,
            )),
            "DEL" => Ok(Reply::Integer(
                args.iter()
                    .filter(|key| {
                        self.purge(key);
                        self.data.remove(key.as_str()).is_some()
                    })
                    .count() as i64,
            )),
            "TYPE" => Ok(Reply::Status(
                self.live(&args[0])
                    .map_or("none", |entry| entry.value.type_name())
                    .to_string(),
            )),
            "EXPIRE" => {
                let seconds = parse_int(&args[1])?;
                let millis = seconds.checked_mul(1000).ok_or_else(|| {
                    CommandError::Generic("invalid expire time in 'expire' command".to_string())
                })?;
                Ok(self.expire(&args[0], millis))
            }
            "PEXPIRE" => Ok(self.expire(&args[0], parse_int(&args[1])?)),
            "TTL" => Ok(Reply::Integer(match self.pttl(&args[0]) {
                ms if ms < 0 => ms,
                ms => (ms + 500) / 1000,
            })),
            "PTTL" => Ok(Reply::Integer(self.pttl(&args[0]))),
            "PERSIST" => Ok(Reply::Integer(match self.live(&args[0]) {
                Some(entry) => entry.expires_at.take().is_some() as i64,
                None => 0,
            })),
            "KEYS" => {
                self.purge_all();
                let pattern: Vec<char> = args[0].chars().collect();
                let mut keys: Vec<&String> = self
                    .data
                    .keys()
                    .filter(|key| glob_match(&pattern, &key.chars().collect::<Vec<_>>()))
                    .collect();
                keys.sort();
                Ok(Reply::bulk_array(keys.into_iter().cloned()))
            }

            "GET" => match self.live(&args[0]) {
                Some(entry) => Ok(Reply::bulk(typed!(&entry.value, String)?.as_str())),
                None => Ok(Reply::Nil),
            },
            "SET" => self.set(args),
            "APPEND" => {
                let entry = self.live_or_insert(&args[0], || Value::String(String::new()));
                let value = typed!(&mut entry.value, String)?;
                value.push_str(&args[1]);
                Ok(Reply::Integer(value.len() as i64))
            }
            "STRLEN" => match self.live(&args[0]) {
                Some(entry) => Ok(Reply::Integer(typed!(&entry.value, String)?.len() as i64)),
                None => Ok(Reply::Integer(0)),
            },
            "GETRANGE" => self.getrange(&args[0], parse_int(&args[1])?, parse_int(&args[2])?),
            "INCR" => self.incr_by(&args[0], 1),
            "DECR" => self.incr_by(&args[0], -1),
            "INCRBY" => self.incr_by(&args[0], parse_int(&args[1])?),
            "DECRBY" => {
                let delta = parse_int(&args[1])?
                    .checked_neg()
                    .ok_or(CommandError::NotInteger)?;
                self.incr_by(&args[0], delta)
            }
            "INCRBYFLOAT" => self.incr_by_float(&args[0], parse_score(&args[1])?),

            "LPUSH" => self.push(&args[0], &args[1..], true),
            "RPUSH" => self.push(&args[0], &args[1..], false),
            "LPOP" => self.list_pop(args, true),
            "RPOP" => self.list_pop(args, false),
            "LLEN" => match self.live(&args[0]) {
                Some(entry) => Ok(Reply::Integer(typed!(&entry.value, List)?.len() as i64)),
                None => Ok(Reply::Integer(0)),
            },
            "LINDEX" => {
                let index = parse_int(&args[1])?;
                match self.live(&args[0]) {
                    Some(entry) => {
                        let list = typed!(&entry.value, List)?;
                        Ok(element_position(index, list.len())
                            .map_or(Reply::Nil, |i| Reply::bulk(list[i].as_str())))
                    }
                    None => Ok(Reply::Nil),
                }
            }
            "LSET" => {
                let index = parse_int(&args[1])?;
                let entry = self.live(&args[0]).ok_or(CommandError::NoSuchKey)?;
                let list = typed!(&mut entry.value, List)?;
                let slot =
                    element_position(index, list.len()).ok_or(CommandError::IndexOutOfRange)?;
                list[slot] = args[2].clone();
                Ok(Reply::ok())
            }
            "LRANGE" => {
                let (start, stop) = (parse_int(&args[1])?, parse_int(&args[2])?);
                match self.live(&args[0]) {
                    Some(entry) => {
                        let list = typed!(&entry.value, List)?;
                        Ok(match normalize_range(start, stop, list.len()) {
                            Some((from, to)) => Reply::bulk_array(list.range(from..=to).cloned()),
                            None => Reply::Array(Vec::new()),
                        })
                    }
                    None => Ok(Reply::Array(Vec::new())),
                }
            }
            "LTRIM" => self.ltrim(&args[0], parse_int(&args[1])?, parse_int(&args[2])?),
            "LREM" => self.lrem(&args[0], parse_int(&args[1])?, &args[2]),
            "LPOS" => self.lpos(args),

            "HSET" | "HMSET" => {
                let entry = self.live_or_insert(&args[0], || Value::Hash(HashMap::new()));
                let hash = typed!(&mut entry.value, Hash)?;
                let added = args[1..]
                    .chunks(2)
                    .filter(|pair| hash.insert(pair[0].clone(), pair[1].clone()).is_none())
                    .count();
                Ok(if name == "HSET" {
                    Reply::Integer(added as i64)
                } else {
                    Reply::ok()
                })
            }
            "HGET" => match self.live(&args[0]) {
                Some(entry) => Ok(typed!(&entry.value, Hash)?
                    .get(&args[1])
                    .map_or(Reply::Nil, |value| Reply::bulk(value.as_str()))),
                None => Ok(Reply::Nil),
            },
            "HEXISTS" => match self.live(&args[0]) {
                Some(entry) => {
                    let hash = typed!(&entry.value, Hash)?;
                    Ok(Reply::Integer(hash.contains_key(&args[1]) as i64))
                }
                None => Ok(Reply::Integer(0)),
            },
            "HDEL" => {
                let removed = match self.live(&args[0]) {
                    Some(entry) => {
                        let hash = typed!(&mut entry.value, Hash)?;
                        args[1..]
                            .iter()
                            .filter(|field| hash.remove(field.as_str()).is_some())
                            .count()
                    }
                    None => 0,
                };
                self.drop_if_empty(&args[0]);
                Ok(Reply::Integer(removed as i64))
            }
            "HLEN" => match self.live(&args[0]) {
                Some(entry) => Ok(Reply::Integer(typed!(&entry.value, Hash)?.len() as i64)),
                None => Ok(Reply::Integer(0)),
            },
            "HKEYS" | "HVALS" | "HGETALL" => {
                let hash = match self.live(&args[0]) {
                    Some(entry) => typed!(&entry.value, Hash)?,
                    None => return Ok(Reply::Array(Vec::new())),
                };
                Ok(Reply::bulk_array(hash.iter().flat_map(|(field, value)| match name {
                    "HKEYS" => vec![field.clone()],
                    "HVALS" => vec![value.clone()],
                    _ => vec![field.clone(), value.clone()],
                })))
            }
            "HINCRBY" => self.hincr_by(&args[0], &args[1], parse_int(&args[2])?),
            "HINCRBYFLOAT" => self.hincr_by_float(&args[0], &args[1], parse_score(&args[2])?),

            "SADD" => {
                let entry = self.live_or_insert(&args[0], || Value::Set(HashSet::new()));
                let set = typed!(&mut entry.value, Set)?;
                let added = args[1..].iter().filter(|member| set.insert((*member).clone())).count();
                Ok(Reply::Integer(added as i64))
            }
            "SREM" => {
                let removed = match self.live(&args[0]) {
                    Some(entry) => {
                        let set = typed!(&mut entry.value, Set)?;
                        args[1..].iter().filter(|member| set.remove(member.as_str())).count()
                    }
                    None => 0,
                };
                self.drop_if_empty(&args[0]);
                Ok(Reply::Integer(removed as i64))
            }
            "SISMEMBER" => match self.live(&args[0]) {
                Some(entry) => {
                    let set = typed!(&entry.value, Set)?;
                    Ok(Reply::Integer(set.contains(&args[1]) as i64))
                }
                None => Ok(Reply::Integer(0)),
            },
            "SCARD" => match self.live(&args[0]) {
                Some(entry) => Ok(Reply::Integer(typed!(&entry.value, Set)?.len() as i64)),
                None => Ok(Reply::Integer(0)),
            },
            "SMEMBERS" => Ok(Reply::bulk_array(self.set_snapshot(&args[0])?)),
            "SPOP" => self.spop(args),
            "SRANDMEMBER" => self.srandmember(args),
            "SDIFF" | "SINTER" | "SUNION" => self.set_algebra(name, args),

            "ZADD" => self.zadd(args),
            "ZREM" => {
                let removed = match self.live(&args[0]) {
                    Some(entry) => {
                        let index = typed!(&mut entry.value, SortedSet)?;
                        args[1..].iter().filter(|member| index.remove(member).is_some()).count()
                    }
                    None => 0,
                };
                self.drop_if_empty(&args[0]);
                Ok(Reply::Integer(removed as i64))
            }
            "ZSCORE" => match self.live(&args[0]) {
                Some(entry) => Ok(typed!(&entry.value, SortedSet)?
                    .score(&args[1])
                    .map_or(Reply::Nil, score_reply)),
                None => Ok(Reply::Nil),
            },
            "ZRANK" => match self.live(&args[0]) {
                Some(entry) => Ok(typed!(&entry.value, SortedSet)?
                    .rank(&args[1])
                    .map_or(Reply::Nil, |rank| Reply::Integer(rank as i64))),
                None => Ok(Reply::Nil),
            },
            "ZCARD" => match self.live(&args[0]) {
                Some(entry) => Ok(Reply::Integer(typed!(&entry.value, SortedSet)?.len() as i64)),
                None => Ok(Reply::Integer(0)),
            },
            "ZINCRBY" => {
                let increment = parse_score(&args[1])?;
                let entry = self.live_or_insert(&args[0], || Value::SortedSet(SortedIndex::new()));
                let index = typed!(&mut entry.value, SortedSet)?;
                let score = index.score(&args[2]).unwrap_or(0.0) + increment;
                if score.is_nan() {
                    return Err(CommandError::Generic(
                        "resulting score is not a number (NaN)".to_string(),
                    ));
                }
                index.insert(args[2].clone(), score);
                Ok(score_reply(score))
            }
            "ZRANGE" => self.zrange(args),
            "ZRANGEBYSCORE" => self.zrange_by_score(args),
            "ZCOUNT" => {
                let (min, max) = parse_bounds(&args[1], &args[2])?;
                match self.live(&args[0]) {
                    Some(entry) => Ok(Reply::Integer(
                        typed!(&entry.value, SortedSet)?.range_by_score(min, max).len() as i64,
                    )),
                    None => Ok(Reply::Integer(0)),
                }
            }
            "ZREMRANGEBYRANK" => {
                let (start, stop) = (parse_int(&args[1])?, parse_int(&args[2])?);
                self.zremove(&args[0], |index| match normalize_range(start, stop, index.len()) {
                    Some((from, to)) => index.range_by_rank(from, to),
                    None => Vec::new(),
                })
            }
            "ZREMRANGEBYSCORE" => {
                let (min, max) = parse_bounds(&args[1], &args[2])?;
                self.zremove(&args[0], |index| index.range_by_score(min, max))
            }
            "ZPOPMIN" => self.zpop(args, false),
            "ZPOPMAX" => self.zpop(args, true),

            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    fn expire(&mut self, key: &str, millis: i64) -> Reply {
        if self.live(key).is_none() {
            return Reply::Integer(0);
        }
        if millis <= 0 {
            self.data.remove(key);
        } else if let Some(entry) = self.data.get_mut(key) {
            entry.expires_at = Some(Instant::now() + Duration::from_millis(millis as u64));
        }
        Reply::Integer(1)
    }

    /// Remaining lifetime in ms; `-1` without expiry, `-2` when missing
    fn pttl(&mut self, key: &str) -> i64 {
        match self.live(key) {
            None => -2,
            Some(entry) => match entry.expires_at {
                None => -1,
                Some(at) => at.saturating_duration_since(Instant::now()).as_millis() as i64,
            },
        }
    }

    fn set(&mut self, args: &[String]) -> CommandResult {
        let mut expires = None;
        let (mut nx, mut xx) = (false, false);

        let mut options = args[2..].iter();
        while let Some(option) = options.next() {
            match option.to_ascii_uppercase().as_str() {
                unit @ ("EX" | "PX") => {
                    let amount = parse_int(options.next().ok_or(CommandError::SyntaxError)?)?;
                    if amount <= 0 {
                        return Err(CommandError::Generic(
                            "invalid expire time in 'set' command".to_string(),
                        ));
                    }
                    expires = Some(if unit == "EX" {
                        Duration::from_secs(amount as u64)
                    } else {
                        Duration::from_millis(amount as u64)
                    });
                }
                "NX" => nx = true,
                "XX" => xx = true,
                _ => return Err(CommandError::SyntaxError),
            }
        }
        if nx && xx {
            return Err(CommandError::SyntaxError);
        }

        let exists = self.live(&args[0]).is_some();
        if (nx && exists) || (xx && !exists) {
            return Ok(Reply::Nil);
        }

        let mut entry = Entry::new(Value::String(args[1].clone()));
        entry.expires_at = expires.map(|after| Instant::now() + after);
        self.data.insert(args[0].clone(), entry);
        Ok(Reply::ok())
    }

    fn getrange(&mut self, key: &str, start: i64, end: i64) -> CommandResult {
        let value = match self.live(key) {
            Some(entry) => typed!(&entry.value, String)?,
            None => return Ok(Reply::bulk("")),
        };
        let bytes = value.as_bytes();
        let len = bytes.len() as i64;

        let start = if start < 0 { (len + start).max(0) } else { start };
        let end = if end < 0 { (len + end).max(0) } else { end.min(len - 1) };
        if len == 0 || start > end || start >= len {
            return Ok(Reply::bulk(""));
        }
        Ok(Reply::bulk(
            String::from_utf8_lossy(&bytes[start as usize..=end as usize]).into_owned(),
        ))
    }

    fn incr_by(&mut self, key: &str, delta: i64) -> CommandResult {
        let entry = self.live_or_insert(key, || Value::String("0".to_string()));
        let value = typed!(&mut entry.value, String)?;
        let current: i64 = value.parse().map_err(|_| CommandError::NotInteger)?;
        let next = current
            .checked_add(delta)
            .ok_or(CommandError::Overflow)?;
        *value = next.to_string();
        Ok(Reply::Integer(next))
    }

    fn incr_by_float(&mut self, key: &str, delta: f64) -> CommandResult {
        let entry = self.live_or_insert(key, || Value::String("0".to_string()));
        let value = typed!(&mut entry.value, String)?;
        let current = parse_float(value).ok_or(CommandError::NotFloat)?;
        let next = current + delta;
        if !next.is_finite() {
            return Err(CommandError::Generic(
                "increment would produce NaN or Infinity".to_string(),
            ));
        }
        *value = next.to_string();
        Ok(Reply::bulk(value.as_str()))
    }

    fn push(&mut self, key: &str, values: &[String], front: bool) -> CommandResult {
        let entry = self.live_or_insert(key, || Value::List(VecDeque::new()));
        let list = typed!(&mut entry.value, List)?;
        for value in values {
            if front {
                list.push_front(value.clone());
            } else {
                list.push_back(value.clone());
            }
        }
        Ok(Reply::Integer(list.len() as i64))
    }

    fn list_pop(&mut self, args: &[String], front: bool) -> CommandResult {
        let count = args.get(1).map(|count| parse_count(count)).transpose()?;

        let popped: Vec<String> = match self.live(&args[0]) {
            Some(entry) => {
                let list = typed!(&mut entry.value, List)?;
                let n = count.unwrap_or(1).min(list.len());
                (0..n)
                    .filter_map(|_| if front { list.pop_front() } else { list.pop_back() })
                    .collect()
            }
            None => return Ok(Reply::Nil),
        };
        self.drop_if_empty(&args[0]);

        Ok(match count {
            Some(_) => Reply::bulk_array(popped),
            None => popped.into_iter().next().map_or(Reply::Nil, Reply::Bulk),
        })
    }

    fn ltrim(&mut self, key: &str, start: i64, stop: i64) -> CommandResult {
        if let Some(entry) = self.live(key) {
            let list = typed!(&mut entry.value, List)?;
            match normalize_range(start, stop, list.len()) {
                Some((from, to)) => {
                    list.truncate(to + 1);
                    list.drain(..from);
                }
                None => list.clear(),
            }
        }
        self.drop_if_empty(key);
        Ok(Reply::ok())
    }

    fn lrem(&mut self, key: &str, count: i64, target: &str) -> CommandResult {
        let removed = match self.live(key) {
            Some(entry) => {
                let list = typed!(&mut entry.value, List)?;
                let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() as usize };
                let mut removed = 0;

                if count >= 0 {
                    list.retain(|value| {
                        if removed < limit && value == target {
                            removed += 1;
                            false
                        } else {
                            true
                        }
                    });
                } else {
                    // scan from the tail
                    let mut kept = VecDeque::with_capacity(list.len());
                    while let Some(value) = list.pop_back() {
                        if removed < limit && value == target {
                            removed += 1;
                        } else {
                            kept.push_front(value);
                        }
                    }
                    *list = kept;
                }
                removed
            }
            None => 0,
        };
        self.drop_if_empty(key);
        Ok(Reply::Integer(removed as i64))
    }

    fn lpos(&mut self, args: &[String]) -> CommandResult {
        let mut rank: i64 = 1;
        let mut count: Option<usize> = None;
        let mut maxlen: usize = 0;

        let mut options = args[2..].iter();
        while let Some(option) = options.next() {
            let value = options.next().ok_or(CommandError::SyntaxError)?;
            match option.to_ascii_uppercase().as_str() {
                "RANK" => {
                    rank = parse_int(value)?;
                    if rank == 0 {
                        return Err(CommandError::Generic(
                            "RANK can't be zero: use 1 to start from the first match, \
                             2 from the second ... or use negative to start \
                             from the end of the list"
                                .to_string(),
                        ));
                    }
                }
                "COUNT" => count = Some(parse_count(value)?),
                "MAXLEN" => maxlen = parse_count(value)?,
                _ => return Err(CommandError::SyntaxError),
            }
        }

        let list = match self.live(&args[0]) {
            Some(entry) => typed!(&entry.value, List)?,
            None => return Ok(if count.is_some() { Reply::Array(Vec::new()) } else { Reply::Nil }),
        };

        let len = list.len();
        let scan = if maxlen == 0 { len } else { maxlen.min(len) };
        let positions: Box<dyn Iterator<Item = usize>> = if rank > 0 {
            Box::new(0..len)
        } else {
            Box::new((0..len).rev())
        };
        let mut matches = positions
            .take(scan)
            .filter(|&i| list[i] == args[1])
            .skip(rank.unsigned_abs() as usize - 1);

        Ok(match count {
            None => matches.next().map_or(Reply::Nil, |i| Reply::Integer(i as i64)),
            Some(limit) => {
                let limit = if limit == 0 { usize::MAX } else { limit };
                Reply::Array(matches.take(limit).map(|i| Reply::Integer(i as i64)).collect())
            }
        })
    }

    fn hincr_by(&mut self, key: &str, field: &str, delta: i64) -> CommandResult {
        let entry = self.live_or_insert(key, || Value::Hash(HashMap::new()));
        let hash = typed!(&mut entry.value, Hash)?;
        let current: i64 = match hash.get(field) {
            Some(value) => value.parse().map_err(|_| CommandError::HashNotInteger)?,
            None => 0,
        };
        let next = current
            .checked_add(delta)
            .ok_or(CommandError::Overflow)?;
        hash.insert(field.to_string(), next.to_string());
        Ok(Reply::Integer(next))
    }

    fn hincr_by_float(&mut self, key: &str, field: &str, delta: f64) -> CommandResult {
        let entry = self.live_or_insert(key, || Value::Hash(HashMap::new()));
        let hash = typed!(&mut entry.value, Hash)?;
        let current = match hash.get(field) {
            Some(value) => parse_float(value).ok_or(CommandError::HashNotFloat)?,
            None => 0.0,
        };
        let next = current + delta;
        if !next.is_finite() {
            return Err(CommandError::Generic(
                "increment would produce NaN or Infinity".to_string(),
            ));
        }
        hash.insert(field.to_string(), next.to_string());
        Ok(Reply::bulk(next.to_string()))
    }

    /// Members of a set; a missing key is the empty set
    fn set_snapshot(&mut self, key: &str) -> std::result::Result<Vec<String>, CommandError> {
        match self.live(key) {
            Some(entry) => Ok(typed!(&entry.value, Set)?.iter().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }

    fn spop(&mut self, args: &[String]) -> CommandResult {
        let count = args.get(1).map(|count| parse_count(count)).transpose()?;
        let mut rng = rand::thread_rng();

        let popped = match self.live(&args[0]) {
            Some(entry) => {
                let set = typed!(&mut entry.value, Set)?;
                let chosen = set.iter().cloned().choose_multiple(&mut rng, count.unwrap_or(1));
                for member in &chosen {
                    set.remove(member);
                }
                chosen
            }
            None => Vec::new(),
        };
        self.drop_if_empty(&args[0]);

        Ok(match count {
            Some(_) => Reply::bulk_array(popped),
            None => popped.into_iter().next().map_or(Reply::Nil, Reply::Bulk),
        })
    }

    fn srandmember(&mut self, args: &[String]) -> CommandResult {
        let count = args.get(1).map(|count| parse_int(count)).transpose()?;
        let members = self.set_snapshot(&args[0])?;
        let mut rng = rand::thread_rng();

        Ok(match count {
            None => members.choose(&mut rng).cloned().map_or(Reply::Nil, Reply::Bulk),
            // distinct members
            Some(n) if n >= 0 => {
                Reply::bulk_array(members.into_iter().choose_multiple(&mut rng, n as usize))
            }
            // repetitions allowed
            Some(n) => {
                if members.is_empty() {
                    return Ok(Reply::Array(Vec::new()));
                }
                Reply::bulk_array(
                    (0..n.unsigned_abs())
                        .filter_map(|_| members.choose(&mut rng).cloned())
                        .collect::<Vec<_>>(),
                )
            }
        })
    }

    fn set_algebra(&mut self, name: &str, keys: &[String]) -> CommandResult {
        let mut operands = Vec::with_capacity(keys.len());
        for key in keys {
            operands.push(self.set_snapshot(key)?.into_iter().collect::<HashSet<_>>());
        }
        let mut operands = operands.into_iter();
        let mut result = operands.next().unwrap_or_default();

        for other in operands {
            match name {
                "SDIFF" => result.retain(|member| !other.contains(member)),
                "SINTER" => result.retain(|member| other.contains(member)),
                _ => result.extend(other),
            }
        }
        Ok(Reply::bulk_array(result))
    }

    fn zadd(&mut self, args: &[String]) -> CommandResult {
        let (mut nx, mut xx, mut ch) = (false, false, false);
        let mut rest = &args[1..];
        while let Some((flag, tail)) = rest.split_first() {
            match flag.to_ascii_uppercase().as_str() {
                "NX" => nx = true,
                "XX" => xx = true,
                "CH" => ch = true,
                _ => break,
            }
            rest = tail;
        }

        if rest.is_empty() || rest.len() % 2 != 0 {
            return Err(CommandError::SyntaxError);
        }
        if nx && xx {
            return Err(CommandError::Generic(
                "XX and NX options at the same time are not compatible".to_string(),
            ));
        }
        let pairs = rest
            .chunks(2)
            .map(|pair| Ok((parse_score(&pair[0])?, pair[1].clone())))
            .collect::<std::result::Result<Vec<_>, CommandError>>()?;

        let entry = self.live_or_insert(&args[0], || Value::SortedSet(SortedIndex::new()));
        let index = typed!(&mut entry.value, SortedSet)?;
        let mut added = 0;
        let mut changed = 0;
        for (score, member) in pairs {
            match index.score(&member) {
                Some(_) if nx => {}
                None if xx => {}
                Some(old) => {
                    if old != score {
                        index.insert(member, score);
                        changed += 1;
                    }
                }
                None => {
                    index.insert(member, score);
                    added += 1;
                }
            }
        }
        self.drop_if_empty(&args[0]);

        Ok(Reply::Integer(if ch { added + changed } else { added }))
    }

    fn zrange(&mut self, args: &[String]) -> CommandResult {
        let (start, stop) = (parse_int(&args[1])?, parse_int(&args[2])?);
        let with_scores = match &args[3..] {
            [] => false,
            [flag] if flag.eq_ignore_ascii_case("WITHSCORES") => true,
            _ => return Err(CommandError::SyntaxError),
        };

        let items = match self.live(&args[0]) {
            Some(entry) => {
                let index = typed!(&entry.value, SortedSet)?;
                normalize_range(start, stop, index.len())
                    .map(|(from, to)| index.range_by_rank(from, to))
                    .unwrap_or_default()
            }
            None => Vec::new(),
        };
        Ok(scored_reply(items, with_scores))
    }

    fn zrange_by_score(&mut self, args: &[String]) -> CommandResult {
        let (min, max) = parse_bounds(&args[1], &args[2])?;
        let mut with_scores = false;
        let mut limit: Option<(usize, Option<usize>)> = None;

        let mut options = args[3..].iter();
        while let Some(option) = options.next() {
            match option.to_ascii_uppercase().as_str() {
                "WITHSCORES" => with_scores = true,
                "LIMIT" => {
                    let offset = parse_int(options.next().ok_or(CommandError::SyntaxError)?)?;
                    let count = parse_int(options.next().ok_or(CommandError::SyntaxError)?)?;
                    if offset < 0 {
                        // negative offset yields nothing
                        limit = Some((usize::MAX, Some(0)));
                    } else {
                        limit = Some((offset as usize, usize::try_from(count).ok()));
                    }
                }
                _ => return Err(CommandError::SyntaxError),
            }
        }

        let mut items = match self.live(&args[0]) {
            Some(entry) => typed!(&entry.value, SortedSet)?.range_by_score(min, max),
            None => Vec::new(),
        };
        if let Some((offset, count)) = limit {
            items = items
                .into_iter()
                .skip(offset)
                .take(count.unwrap_or(usize::MAX))
                .collect();
        }
        Ok(scored_reply(items, with_scores))
    }

    /// Remove the members selected from a sorted set, returning how many went
    fn zremove<F>(&mut self, key: &str, select: F) -> CommandResult
    where
        F: FnOnce(&SortedIndex) -> Vec<(String, f64)>,
    {
        let removed = match self.live(key) {
            Some(entry) => {
                let index = typed!(&mut entry.value, SortedSet)?;
                let doomed = select(&*index);
                for (member, _) in &doomed {
                    index.remove(member);
                }
                doomed.len()
            }
            None => 0,
        };
        self.drop_if_empty(key);
        Ok(Reply::Integer(removed as i64))
    }

    fn zpop(&mut self, args: &[String], from_high: bool) -> CommandResult {
        let count = args.get(1).map(|count| parse_count(count)).transpose()?.unwrap_or(1);
        let popped = match self.live(&args[0]) {
            Some(entry) => typed!(&mut entry.value, SortedSet)?.pop(count, from_high),
            None => Vec::new(),
        };
        self.drop_if_empty(&args[0]);
        Ok(scored_reply(popped, true))
    }
}

/// Redis inclusive range normalization shared by LRANGE, LTRIM and ZRANGE
fn normalize_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn parse_int(value: &str) -> std::result::Result<i64, CommandError> {
    value.parse().map_err(|_| CommandError::NotInteger)
}

fn parse_count(value: &str) -> std::result::Result<usize, CommandError> {
    let count = parse_int(value)?;
    usize::try_from(count).map_err(|_| {
        CommandError::Generic("value is out of range, must be positive".to_string())
    })
}

fn parse_score(value: &str) -> std::result::Result<f64, CommandError> {
    parse_float(value).ok_or(CommandError::NotFloat)
}

fn parse_bounds(
    min: &str,
    max: &str,
) -> std::result::Result<(ScoreBound, ScoreBound), CommandError> {
    match (ScoreBound::parse(min), ScoreBound::parse(max)) {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(CommandError::Generic("min or max is not a float".to_string())),
    }
}

fn score_reply(score: f64) -> Reply {
    Reply::Bulk(format_float(score))
}

fn scored_reply(items: Vec<(String, f64)>, with_scores: bool) -> Reply {
    Reply::Array(
        items
            .into_iter()
            .flat_map(|(member, score)| {
                let score = with_scores.then(|| score_reply(score));
                std::iter::once(Reply::Bulk(member)).chain(score)
            })
            .collect(),
    )
}

fn reply_to_frame(reply: Reply) -> RespFrame {
    match reply {
        Reply::Nil => RespFrame::null_bulk(),
        Reply::Status(status) => RespFrame::simple_string(status),
        Reply::Integer(n) => RespFrame::Integer(n),
        Reply::Bulk(data) => RespFrame::bulk_string(data),
        Reply::Double(f) => RespFrame::bulk_string(format_float(f)),
        Reply::Boolean(b) => RespFrame::Integer(b as i64),
        Reply::Array(items) => RespFrame::array(items.into_iter().map(reply_to_frame).collect()),
    }
}

fn error_frame(err: &CommandError) -> RespFrame {
    RespFrame::error(err.to_string())
}

/// Glob matching for KEYS: `*`, `?`, `[abc]`, `[^a-z]` and `\` escapes
fn glob_match(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((&'*', rest)) => (0..=text.len()).any(|skip| glob_match(rest, &text[skip..])),
        Some((&'?', rest)) => !text.is_empty() && glob_match(rest, &text[1..]),
        Some((&'[', rest)) => match (text.split_first(), rest.iter().position(|&c| c == ']')) {
            (Some((&c, text_rest)), Some(end)) => {
                let (negate, class) = match rest[..end].split_first() {
                    Some((&'^', class)) => (true, class),
                    _ => (false, &rest[..end]),
                };
                class_matches(class, c) != negate && glob_match(&rest[end + 1..], text_rest)
            }
            (Some((&c, text_rest)), None) => c == '[' && glob_match(rest, text_rest),
            (None, _) => false,
        },
        Some((&'\\', rest)) if !rest.is_empty() => {
            text.first() == Some(&rest[0]) && glob_match(&rest[1..], &text[1..])
        }
        Some((&p, rest)) => text.first() == Some(&p) && glob_match(rest, &text[1..]),
    }
}

fn class_matches(class: &[char], c: char) -> bool {
    let mut i = 0;
    while i < class.len() {
        if i + 2 < class.len() && class[i + 1] == '-' {
            if class[i] <= c && c <= class[i + 2] {
                return true;
            }
            i += 3;
        } else {
            if class[i] == c {
                return true;
            }
            i += 1;
        }
    }
    false
}
