//! RESP (REdis Serialization Protocol) implementation
//!
//! Encoding of outgoing commands and incremental decoding of replies for the
//! TCP store client. RESP3 reply types are understood so that servers which
//! negotiated RESP3 still decode correctly.

pub mod resp;
pub mod parser;
pub mod serializer;

pub use resp::RespFrame;
pub use parser::{parse_resp_frame, RespParser};
pub use serializer::{serialize_resp_frame, serialize_to_vec, RespSerializer};

use crate::error::{CollectionError, Result};

/// Extract a UTF-8 string from a string-like RESP frame
pub fn extract_string(frame: &RespFrame) -> Result<String> {
    match frame {
        RespFrame::SimpleString(data) | RespFrame::BulkString(Some(data)) => {
            String::from_utf8(data.clone())
                .map_err(|_| CollectionError::Protocol("Invalid UTF-8 in string frame".to_string()))
        }
        _ => Err(CollectionError::Protocol("Expected string".to_string())),
    }
}

/// Extract the parts of a request frame (an array of bulk strings)
pub fn extract_command_parts(frame: &RespFrame) -> Result<Vec<String>> {
    match frame {
        RespFrame::Array(Some(parts)) if !parts.is_empty() => {
            parts.iter().map(extract_string).collect()
        }
        _ => Err(CollectionError::Protocol("Expected a non-empty command array".to_string())),
    }
}
