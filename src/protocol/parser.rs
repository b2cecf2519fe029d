//! RESP protocol parser implementation
//!
//! Incremental parsing of RESP2 and RESP3 frames. Replies arrive in arbitrary
//! TCP chunks, so the parser buffers input until a whole frame is available.

use crate::error::{CollectionError, Result};
use super::resp::RespFrame;

/// Parser state for incremental RESP parsing
pub struct RespParser {
    buffer: Vec<u8>,
    position: usize,
}

impl RespParser {
    /// Create a new parser
    pub fn new() -> Self {
        RespParser {
            buffer: Vec::with_capacity(4096),
            position: 0,
        }
    }

    /// Feed data into the parser
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to parse a complete frame from the buffer
    ///
    /// Returns `Ok(None)` when more input is needed.
    pub fn parse(&mut self) -> Result<Option<RespFrame>> {
        if self.position >= self.buffer.len() {
            return Ok(None);
        }

        let Some((frame, consumed)) = parse_frame(&self.buffer[self.position..])? else {
            return Ok(None);
        };

        self.position += consumed;
        // Compact once more than half of the buffer is consumed
        if self.position > self.buffer.len() / 2 {
            self.buffer.drain(..self.position);
            self.position = 0;
        }
        Ok(Some(frame))
    }

    /// Number of buffered bytes not yet consumed by a parsed frame
    pub fn pending(&self) -> usize {
        self.buffer.len() - self.position
    }
}

impl Default for RespParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a RESP frame from a byte slice
///
/// Returns `Some((frame, bytes_consumed))` if a complete frame is found.
pub fn parse_resp_frame(data: &[u8]) -> Result<Option<(RespFrame, usize)>> {
    parse_frame(data)
}

type Parsed = Option<(RespFrame, usize)>;

fn parse_frame(data: &[u8]) -> Result<Parsed> {
    let Some(&type_byte) = data.first() else {
        return Ok(None);
    };

    match type_byte {
        b'+' => Ok(parse_line(data)?.map(|(line, n)| (RespFrame::SimpleString(line.to_vec()), n))),
        b'-' => Ok(parse_line(data)?.map(|(line, n)| (RespFrame::Error(line.to_vec()), n))),
        b':' => parse_scalar(data, |s| s.parse::<i64>().ok().map(RespFrame::Integer), "integer"),
        b',' => parse_scalar(data, |s| s.parse::<f64>().ok().map(RespFrame::Double), "double"),
        b'#' => parse_scalar(
            data,
            |s| match s {
                "t" => Some(RespFrame::Boolean(true)),
                "f" => Some(RespFrame::Boolean(false)),
                _ => None,
            },
            "boolean",
        ),
        b'_' => match parse_line(data)? {
            Some((line, n)) if line.is_empty() => Ok(Some((RespFrame::Null, n))),
            Some(_) => Err(CollectionError::Protocol("Invalid null format".into())),
            None => Ok(None),
        },
        b'$' => parse_bulk_string(data),
        b'*' => parse_aggregate(data, 1, RespFrame::Array),
        b'~' => parse_aggregate(data, 1, |items| RespFrame::Set(items.unwrap_or_default())),
        b'%' => parse_aggregate(data, 2, |items| {
            RespFrame::Map(items.map(into_pairs).unwrap_or_default())
        }),
        other => Err(CollectionError::Protocol(format!(
            "Invalid RESP type byte: {}", other as char
        ))),
    }
}

/// Parse a single-line frame whose payload converts through `convert`
fn parse_scalar(
    data: &[u8],
    convert: impl FnOnce(&str) -> Option<RespFrame>,
    what: &str,
) -> Result<Parsed> {
    let Some((line, consumed)) = parse_line(data)? else {
        return Ok(None);
    };
    let text = std::str::from_utf8(line)
        .map_err(|_| CollectionError::Protocol(format!("Invalid UTF-8 in {}", what)))?;
    convert(text)
        .map(|frame| Some((frame, consumed)))
        .ok_or_else(|| CollectionError::Protocol(format!("Invalid {} format", what)))
}

/// Parse the signed length header shared by bulk strings and aggregates
fn parse_length(data: &[u8]) -> Result<Option<(i64, usize)>> {
    let Some((line, consumed)) = parse_line(data)? else {
        return Ok(None);
    };
    let len = std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| CollectionError::Protocol("Invalid length header".into()))?;
    if len < -1 {
        return Err(CollectionError::Protocol(format!("Invalid negative length {}", len)));
    }
    Ok(Some((len, consumed)))
}

/// Parse a bulk string: $6\r\nfoobar\r\n or $-1\r\n (null)
fn parse_bulk_string(data: &[u8]) -> Result<Parsed> {
    let Some((len, header)) = parse_length(data)? else {
        return Ok(None);
    };
    if len == -1 {
        return Ok(Some((RespFrame::BulkString(None), header)));
    }

    let len = len as usize;
    let total = header + len + 2;
    if data.len() < total {
        return Ok(None);
    }
    if &data[header + len..total] != b"\r\n" {
        return Err(CollectionError::Protocol("Missing CRLF after bulk string".into()));
    }

    Ok(Some((RespFrame::BulkString(Some(data[header..header + len].to_vec())), total)))
}

/// Parse an aggregate of `len * width` nested frames (width 2 for maps)
///
/// `build` receives `None` for the RESP2 null array (`*-1`).
fn parse_aggregate(
    data: &[u8],
    width: usize,
    build: impl FnOnce(Option<Vec<RespFrame>>) -> RespFrame,
) -> Result<Parsed> {
    let Some((len, header)) = parse_length(data)? else {
        return Ok(None);
    };
    if len == -1 {
        return Ok(Some((build(None), header)));
    }

    let count = len as usize * width;
    let mut items = Vec::with_capacity(count);
    let mut offset = header;
    for _ in 0..count {
        match parse_frame(&data[offset..])? {
            Some((frame, consumed)) => {
                items.push(frame);
                offset += consumed;
            }
            None => return Ok(None),
        }
    }

    Ok(Some((build(Some(items)), offset)))
}

fn into_pairs(items: Vec<RespFrame>) -> Vec<(RespFrame, RespFrame)> {
    let mut iter = items.into_iter();
    let mut pairs = Vec::new();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        pairs.push((key, value));
    }
    pairs
}

/// Parse a line ending with \r\n, skipping the one-byte type prefix
fn parse_line(data: &[u8]) -> Result<Option<(&[u8], usize)>> {
    if data.len() < 3 {
        return Ok(None);
    }

    Ok(data[1..]
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|i| (&data[1..1 + i], i + 3)))
}
