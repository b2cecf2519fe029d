//! RESP data types and frame definitions
//!
//! Supports both RESP2 and RESP3 reply shapes so the client can talk to any
//! Redis-compatible server regardless of the negotiated protocol.

/// RESP protocol frame types
#[derive(Debug, Clone, PartialEq)]
pub enum RespFrame {
    /// Simple string: +OK\r\n
    SimpleString(Vec<u8>),

    /// Error: -Error message\r\n
    Error(Vec<u8>),

    /// Integer: :1000\r\n
    Integer(i64),

    /// Bulk string: $6\r\nfoobar\r\n or $-1\r\n (null)
    BulkString(Option<Vec<u8>>),

    /// Array: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n or *-1\r\n (null)
    Array(Option<Vec<RespFrame>>),

    // RESP3 additions
    /// Null value: _\r\n
    Null,

    /// Boolean: #t\r\n or #f\r\n
    Boolean(bool),

    /// Double: ,1.23\r\n or ,inf\r\n
    Double(f64),

    /// Map: %2\r\n+first\r\n:1\r\n+second\r\n:2\r\n
    Map(Vec<(RespFrame, RespFrame)>),

    /// Set: ~2\r\n+first\r\n+second\r\n
    Set(Vec<RespFrame>),
}

impl RespFrame {
    /// Create a simple string response
    pub fn ok() -> Self {
        RespFrame::SimpleString(b"OK".to_vec())
    }

    /// Create a simple string response
    pub fn simple_string(s: impl Into<Vec<u8>>) -> Self {
        RespFrame::SimpleString(s.into())
    }

    /// Check if this frame is an error
    pub fn is_error(&self) -> bool {
        matches!(self, RespFrame::Error(_))
    }

    /// Create an error response
    pub fn error(msg: impl Into<Vec<u8>>) -> Self {
        RespFrame::Error(msg.into())
    }

    /// Create a null bulk string
    pub fn null_bulk() -> Self {
        RespFrame::BulkString(None)
    }

    /// Create a bulk string from bytes
    pub fn bulk_string(bytes: impl AsRef<[u8]>) -> Self {
        RespFrame::BulkString(Some(bytes.as_ref().to_vec()))
    }

    /// Create an array of frames
    pub fn array(frames: Vec<RespFrame>) -> Self {
        RespFrame::Array(Some(frames))
    }

    /// Build the request frame for a command: an array of bulk strings
    pub fn command<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        RespFrame::Array(Some(parts.into_iter().map(RespFrame::bulk_string).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resp_frame_creation() {
        let ok = RespFrame::ok();
        assert!(matches!(ok, RespFrame::SimpleString(_)));

        let err = RespFrame::error("ERR test");
        assert!(err.is_error());

        assert_eq!(RespFrame::null_bulk(), RespFrame::BulkString(None));
    }

    #[test]
    fn test_command_frame() {
        let frame = RespFrame::command(["LRANGE", "mylist", "0", "-1"]);
        match frame {
            RespFrame::Array(Some(parts)) => {
                assert_eq!(parts.len(), 4);
                assert_eq!(parts[0], RespFrame::bulk_string("LRANGE"));
                assert_eq!(parts[3], RespFrame::bulk_string("-1"));
            }
            other => panic!("expected array, got {:?}", other),
        }
    }
}
