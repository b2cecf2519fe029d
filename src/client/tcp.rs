//! TCP store client
//!
//! Speaks RESP to a Redis-compatible server over a single tokio connection.
//! Requests are serialized as arrays of bulk strings; replies are decoded
//! with the incremental [`RespParser`]. Transactions are written as one
//! pipelined `MULTI ... EXEC` burst while the connection lock is held, so
//! no other command from this client can land in between. Watched
//! transactions keep the lock from `WATCH` until `EXEC` or `UNWATCH`.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::{collect_transaction, Command, Reply, StoreClient, WritePlan};
use crate::config::ClientConfig;
use crate::error::{CollectionError, CommandError, Result};
use crate::protocol::{RespFrame, RespParser, RespSerializer};

const READ_CHUNK: usize = 4096;

/// One open server connection
struct Connection {
    stream: TcpStream,
    parser: RespParser,
    read_buf: Vec<u8>,
    /// Set while a request is in flight; stays set if it never completes
    desynced: bool,
}

impl Connection {
    fn new(stream: TcpStream) -> Self {
        Connection {
            stream,
            parser: RespParser::new(),
            read_buf: vec![0; READ_CHUNK],
            desynced: false,
        }
    }

    /// Write all frames with a single syscall burst
    async fn send(&mut self, frames: &[RespFrame]) -> Result<()> {
        let mut serializer = RespSerializer::new();
        for frame in frames {
            serializer.add(frame)?;
        }
        self.stream.write_all(serializer.buffer()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<RespFrame> {
        loop {
            if let Some(frame) = self.parser.parse()? {
                return Ok(frame);
            }

            let n = self.stream.read(&mut self.read_buf).await?;
            if n == 0 {
                return Err(CollectionError::Connection("server closed connection".to_string()));
            }
            self.parser.feed(&self.read_buf[..n]);
        }
    }

    async fn request(&mut self, parts: &[&str]) -> Result<Reply> {
        self.send(&[RespFrame::command(parts.iter().copied())]).await?;
        into_reply(self.read_frame().await?)
    }

    /// Drop every watch; the reply carries nothing worth checking
    async fn unwatch(&mut self) -> Result<()> {
        self.send(&[RespFrame::command(["UNWATCH"])]).await?;
        self.read_frame().await?;
        Ok(())
    }

    /// Send `MULTI`, the commands and `EXEC` in one burst and read every
    /// reply back.
    ///
    /// The outer error means the connection can no longer be trusted, the
    /// inner one that the server refused the batch. `None` is an EXEC
    /// aborted because a watched key changed.
    async fn multi_exec(&mut self, commands: &[Command]) -> Result<Result<Option<Vec<Reply>>>> {
        let mut frames = Vec::with_capacity(commands.len() + 2);
        frames.push(RespFrame::command(["MULTI"]));
        frames.extend(commands.iter().map(request_frame));
        frames.push(RespFrame::command(["EXEC"]));
        self.send(&frames).await?;

        let multi = self.read_frame().await?;
        if let RespFrame::Error(message) = multi {
            // the queued commands ran unwrapped; drain them and EXEC
            for _ in 0..=commands.len() {
                self.read_frame().await?;
            }
            return Ok(Err(CollectionError::Transaction {
                index: 0,
                message: String::from_utf8_lossy(&message).into_owned(),
            }));
        }

        let mut rejected = None;
        for index in 0..commands.len() {
            if let RespFrame::Error(message) = self.read_frame().await? {
                rejected.get_or_insert((index, String::from_utf8_lossy(&message).into_owned()));
            }
        }

        let exec = self.read_frame().await?;
        Ok(match rejected {
            Some((index, message)) => Err(CollectionError::Transaction { index, message }),
            None => exec_reply(exec),
        })
    }
}

/// Store client backed by a TCP connection
pub struct TcpClient {
    connection: Mutex<Connection>,
    config: ClientConfig,
}

impl TcpClient {
    /// Connect and run the handshake (AUTH, SELECT, CLIENT SETNAME) the
    /// configuration asks for
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let addr = config.addr();
        let stream = timeout(config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| CollectionError::Timeout)?
            .map_err(|e| {
                CollectionError::Connection(format!("failed to connect to {}: {}", addr, e))
            })?;
        stream.set_nodelay(true)?;

        let mut connection = Connection::new(stream);
        timeout(config.connect_timeout, handshake(&mut connection, &config))
            .await
            .map_err(|_| CollectionError::Timeout)??;

        info!(addr = %addr, db = config.db, "connected to store");
        Ok(TcpClient {
            connection: Mutex::new(connection),
            config,
        })
    }

    /// The configuration this client was created with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn command_timeout(&self) -> Duration {
        self.config.command_timeout
    }

    async fn round_trip(&self, command: Command) -> Result<Reply> {
        let mut connection = self.connection.lock().await;
        ensure_synced(&connection)?;

        connection.desynced = true;
        let frame = timeout(self.command_timeout(), async {
            connection.send(&[request_frame(&command)]).await?;
            connection.read_frame().await
        })
        .await
        .map_err(|_| CollectionError::Timeout)??;
        connection.desynced = false;

        into_reply(frame)
    }

    async fn transaction(&self, commands: Vec<Command>) -> Result<Vec<Reply>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        let mut connection = self.connection.lock().await;
        ensure_synced(&connection)?;

        connection.desynced = true;
        let outcome = timeout(self.command_timeout(), connection.multi_exec(&commands))
            .await
            .map_err(|_| CollectionError::Timeout)??;
        connection.desynced = false;

        outcome?.ok_or_else(|| CollectionError::Transaction {
            index: 0,
            message: "transaction aborted by the server".to_string(),
        })
    }

    async fn watched(
        &self,
        keys: Vec<String>,
        reads: Vec<Command>,
        plan: &mut WritePlan<'_>,
    ) -> Result<Option<Vec<Reply>>> {
        let mut frames = Vec::with_capacity(reads.len() + 1);
        frames.push(RespFrame::command(
            std::iter::once("WATCH").chain(keys.iter().map(String::as_str)),
        ));
        frames.extend(reads.iter().map(request_frame));

        let mut connection = self.connection.lock().await;
        ensure_synced(&connection)?;

        connection.desynced = true;
        let outcome = timeout(self.command_timeout(), async {
            connection.send(&frames).await?;
            let mut answers = Vec::with_capacity(frames.len());
            for _ in 0..frames.len() {
                answers.push(connection.read_frame().await?);
            }

            // the first answer acknowledges WATCH
            let writes = answers
                .into_iter()
                .map(into_reply)
                .collect::<Result<Vec<_>>>()
                .and_then(|mut replies| plan(replies.split_off(1)));

            match writes {
                Ok(writes) if !writes.is_empty() => connection.multi_exec(&writes).await,
                other => {
                    connection.unwatch().await?;
                    Ok(other.map(|_| Some(Vec::new())))
                }
            }
        })
        .await
        .map_err(|_| CollectionError::Timeout)??;
        connection.desynced = false;

        outcome
    }
}

impl StoreClient for TcpClient {
    fn execute(&self, command: Command) -> BoxFuture<'_, Result<Reply>> {
        self.round_trip(command).boxed()
    }

    fn execute_transaction(&self, commands: Vec<Command>) -> BoxFuture<'_, Result<Vec<Reply>>> {
        self.transaction(commands).boxed()
    }

    fn execute_watched<'a>(
        &'a self,
        keys: Vec<String>,
        reads: Vec<Command>,
        plan: &'a mut WritePlan<'a>,
    ) -> BoxFuture<'a, Result<Option<Vec<Reply>>>> {
        self.watched(keys, reads, plan).boxed()
    }
}

async fn handshake(connection: &mut Connection, config: &ClientConfig) -> Result<()> {
    if let Some(password) = &config.password {
        let reply = match &config.username {
            Some(user) => connection.request(&["AUTH", user.as_str(), password.as_str()]).await,
            None => connection.request(&["AUTH", password.as_str()]).await,
        };
        if let Err(e) = reply {
            warn!(error = %e, "authentication rejected");
            return Err(CollectionError::Connection(format!("authentication failed: {}", e)));
        }
        debug!("authenticated");
    }

    if config.db != 0 {
        connection.request(&["SELECT", config.db.to_string().as_str()]).await?;
        debug!(db = config.db, "database selected");
    }

    if let Some(name) = &config.client_name {
        connection.request(&["CLIENT", "SETNAME", name.as_str()]).await?;
    }

    Ok(())
}

fn ensure_synced(connection: &Connection) -> Result<()> {
    if connection.desynced {
        warn!("connection abandoned mid-request, refusing to reuse it");
        return Err(CollectionError::Connection(
            "connection left in an unknown state by an interrupted request".to_string(),
        ));
    }
    Ok(())
}

fn request_frame(command: &Command) -> RespFrame {
    RespFrame::command(command.parts())
}

fn frame_text(data: Vec<u8>) -> Result<String> {
    String::from_utf8(data)
        .map_err(|_| CollectionError::Protocol("invalid UTF-8 in reply".to_string()))
}

/// Convert a reply frame; error frames become classified errors
fn into_reply(frame: RespFrame) -> Result<Reply> {
    match frame {
        RespFrame::Error(message) => {
            let message = frame_text(message)?;
            Err(CommandError::from_message(&message).into())
        }
        other => normalize(other),
    }
}

fn normalize(frame: RespFrame) -> Result<Reply> {
    Ok(match frame {
        RespFrame::SimpleString(data) => Reply::Status(frame_text(data)?),
        RespFrame::Integer(n) => Reply::Integer(n),
        RespFrame::BulkString(Some(data)) => Reply::Bulk(frame_text(data)?),
        RespFrame::BulkString(None) | RespFrame::Array(None) | RespFrame::Null => Reply::Nil,
        RespFrame::Boolean(b) => Reply::Boolean(b),
        RespFrame::Double(f) => Reply::Double(f),
        RespFrame::Array(Some(items)) | RespFrame::Set(items) => {
            Reply::Array(items.into_iter().map(into_reply).collect::<Result<_>>()?)
        }
        RespFrame::Map(pairs) => {
            let mut flat = Vec::with_capacity(pairs.len() * 2);
            for (key, value) in pairs {
                flat.push(into_reply(key)?);
                flat.push(into_reply(value)?);
            }
            Reply::Array(flat)
        }
        RespFrame::Error(message) => {
            return Err(CommandError::from_message(&frame_text(message)?).into());
        }
    })
}

/// Unpack the EXEC reply; per-command error frames fail the transaction
/// and a null reply means a watched key changed
fn exec_reply(frame: RespFrame) -> Result<Option<Vec<Reply>>> {
    match frame {
        RespFrame::Array(Some(items)) => {
            let mut results = Vec::with_capacity(items.len());
            for item in items {
                results.push(match item {
                    RespFrame::Error(message) => {
                        Err(CommandError::from_message(&frame_text(message)?))
                    }
                    other => Ok(normalize(other)?),
                });
            }
            collect_transaction(results).map(Some)
        }
        RespFrame::Array(None) | RespFrame::Null => Ok(None),
        RespFrame::Error(message) => Err(CollectionError::Transaction {
            index: 0,
            message: frame_text(message)?,
        }),
        other => Err(CollectionError::UnexpectedReply(format!("EXEC returned {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_frames_are_classified() {
        let err = into_reply(RespFrame::error(CommandError::WrongType.to_string())).unwrap_err();
        assert!(matches!(err, CollectionError::WrongType));

        let err = into_reply(RespFrame::error("ERR value is not an integer or out of range"))
            .unwrap_err();
        assert!(matches!(err, CollectionError::NotANumber(_)));
    }

    #[test]
    fn test_normalize_resp3_shapes() {
        assert_eq!(into_reply(RespFrame::Null).unwrap(), Reply::Nil);
        assert_eq!(into_reply(RespFrame::Double(1.5)).unwrap(), Reply::Double(1.5));
        assert_eq!(
            into_reply(RespFrame::Map(vec![(
                RespFrame::bulk_string("f"),
                RespFrame::bulk_string("v")
            )]))
            .unwrap(),
            Reply::bulk_array(["f", "v"])
        );
        assert!(matches!(
            into_reply(RespFrame::BulkString(Some(vec![0xff]))),
            Err(CollectionError::Protocol(_))
        ));
    }

    #[test]
    fn test_exec_reply_reports_failing_index() {
        let frame = RespFrame::array(vec![
            RespFrame::Integer(1),
            RespFrame::error("WRONGTYPE Operation against a key holding the wrong kind of value"),
        ]);
        match exec_reply(frame).unwrap_err() {
            CollectionError::Transaction { index, message } => {
                assert_eq!(index, 1);
                assert!(message.starts_with("WRONGTYPE"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let ok = exec_reply(RespFrame::array(vec![RespFrame::ok(), RespFrame::bulk_string("v")]))
            .unwrap();
        assert_eq!(ok, Some(vec![Reply::ok(), Reply::bulk("v")]));
        assert_eq!(exec_reply(RespFrame::Array(None)).unwrap(), None);
    }
}
