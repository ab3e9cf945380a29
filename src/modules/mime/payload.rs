// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::{stream::BoxStream, StreamExt};
use tracing::warn;

use crate::{
    modules::error::{code::ErrorCode, GmailerResult},
    raise_error,
};

pub type ByteStream = BoxStream<'static, GmailerResult<Bytes>>;

/// The shapes remote content can arrive in, depending on how the transport
/// was configured.
pub enum RawPayload {
    /// Reference-counted buffer, as handed out by the HTTP stack.
    Buffer(Bytes),
    /// Owned, growable byte array.
    Array(Vec<u8>),
    /// Window of `length` bytes starting at `offset` inside `buffer`.
    View {
        buffer: Bytes,
        offset: usize,
        length: usize,
    },
    /// Character data, taken as UTF-8.
    Text(String),
    /// Chunked body, drained in arrival order.
    Stream(ByteStream),
    /// Anything the transport could not classify, e.g. a JSON document where
    /// media was expected.
    Unrecognized { type_tag: String },
}

impl RawPayload {
    pub fn type_tag(&self) -> &str {
        match self {
            RawPayload::Buffer(_) => "buffer",
            RawPayload::Array(_) => "array",
            RawPayload::View { .. } => "view",
            RawPayload::Text(_) => "text",
            RawPayload::Stream(_) => "stream",
            RawPayload::Unrecognized { type_tag } => type_tag,
        }
    }
}

impl fmt::Debug for RawPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawPayload::Buffer(b) => f.debug_tuple("Buffer").field(&b.len()).finish(),
            RawPayload::Array(a) => f.debug_tuple("Array").field(&a.len()).finish(),
            RawPayload::View {
                buffer,
                offset,
                length,
            } => f
                .debug_struct("View")
                .field("buffer", &buffer.len())
                .field("offset", offset)
                .field("length", length)
                .finish(),
            RawPayload::Text(t) => f.debug_tuple("Text").field(&t.len()).finish(),
            RawPayload::Stream(_) => f.write_str("Stream(..)"),
            RawPayload::Unrecognized { type_tag } => f
                .debug_struct("Unrecognized")
                .field("type_tag", type_tag)
                .finish(),
        }
    }
}

/// Collapses any payload shape into one contiguous byte sequence.
///
/// Buffers, arrays, views and text are converted without copying. A stream is
/// always read to its end, even after a chunk fails, so the underlying
/// connection is released; the first failure is then returned.
pub async fn normalize(payload: RawPayload) -> GmailerResult<Bytes> {
    match payload {
        RawPayload::Buffer(buffer) => Ok(buffer),
        RawPayload::Array(array) => Ok(Bytes::from(array)),
        RawPayload::View {
            buffer,
            offset,
            length,
        } => {
            let end = offset.checked_add(length).filter(|end| *end <= buffer.len());
            match end {
                Some(end) => Ok(buffer.slice(offset..end)),
                None => Err(raise_error!(
                    format!(
                        "View of {} bytes at offset {} exceeds its {} byte buffer",
                        length,
                        offset,
                        buffer.len()
                    ),
                    ErrorCode::InvalidParameter
                )),
            }
        }
        RawPayload::Text(text) => Ok(Bytes::from(text)),
        RawPayload::Stream(stream) => drain(stream).await,
        RawPayload::Unrecognized { type_tag } => Err(raise_error!(
            format!("Unsupported payload type: {}", type_tag),
            ErrorCode::UnsupportedPayloadType
        )),
    }
}

async fn drain(mut stream: ByteStream) -> GmailerResult<Bytes> {
    let mut collected = BytesMut::new();
    let mut failure = None;
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                if failure.is_none() {
                    collected.extend_from_slice(&chunk);
                }
            }
            Err(e) => {
                if failure.is_none() {
                    warn!("payload stream failed after {} bytes: {}", collected.len(), e);
                    failure = Some(e);
                }
            }
        }
    }
    match failure {
        Some(e) => Err(e),
        None => Ok(collected.freeze()),
    }
}
