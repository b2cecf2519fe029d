//! RESP protocol serializer implementation
//!
//! Writes RESP frames into byte buffers for network transmission.

use std::io::Write;
use crate::error::Result;
use super::resp::RespFrame;

/// Serialize a RESP frame to a writer
pub fn serialize_resp_frame<W: Write>(frame: &RespFrame, writer: &mut W) -> Result<()> {
    match frame {
        RespFrame::SimpleString(bytes) => write_line(writer, b'+', bytes)?,
        RespFrame::Error(bytes) => write_line(writer, b'-', bytes)?,
        RespFrame::Integer(n) => write_line(writer, b':', n.to_string().as_bytes())?,

        RespFrame::BulkString(Some(bytes)) => {
            write_line(writer, b'$', bytes.len().to_string().as_bytes())?;
            writer.write_all(bytes)?;
            writer.write_all(b"\r\n")?;
        }
        RespFrame::BulkString(None) => writer.write_all(b"$-1\r\n")?,

        RespFrame::Array(Some(frames)) => {
            write_line(writer, b'*', frames.len().to_string().as_bytes())?;
            for frame in frames {
                serialize_resp_frame(frame, writer)?;
            }
        }
        RespFrame::Array(None) => writer.write_all(b"*-1\r\n")?,

        RespFrame::Null => writer.write_all(b"_\r\n")?,
        RespFrame::Boolean(b) => writer.write_all(if *b { b"#t\r\n" } else { b"#f\r\n" })?,
        RespFrame::Double(f) => write_line(writer, b',', format_double(*f).as_bytes())?,

        RespFrame::Map(pairs) => {
            write_line(writer, b'%', pairs.len().to_string().as_bytes())?;
            for (key, value) in pairs {
                serialize_resp_frame(key, writer)?;
                serialize_resp_frame(value, writer)?;
            }
        }
        RespFrame::Set(elements) => {
            write_line(writer, b'~', elements.len().to_string().as_bytes())?;
            for element in elements {
                serialize_resp_frame(element, writer)?;
            }
        }
    }

    Ok(())
}

/// Serialize a RESP frame to a byte vector
pub fn serialize_to_vec(frame: &RespFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    serialize_resp_frame(frame, &mut buf)?;
    Ok(buf)
}

fn write_line<W: Write>(writer: &mut W, prefix: u8, payload: &[u8]) -> Result<()> {
    writer.write_all(&[prefix])?;
    writer.write_all(payload)?;
    writer.write_all(b"\r\n")?;
    Ok(())
}

fn format_double(f: f64) -> String {
    if f.is_infinite() {
        if f > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        f.to_string()
    }
}

/// Accumulates several frames into one buffer so they go out in a single write
pub struct RespSerializer {
    buffer: Vec<u8>,
}

impl RespSerializer {
    /// Create a new serializer
    pub fn new() -> Self {
        RespSerializer {
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Add a frame to the buffer
    pub fn add(&mut self, frame: &RespFrame) -> Result<()> {
        serialize_resp_frame(frame, &mut self.buffer)
    }

    /// Get a reference to the buffer
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for RespSerializer {
    fn default() -> Self {
        Self::new()
    }
}
