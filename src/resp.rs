//! Redis Serialization Protocol (RESP) encoding and decoding.
//!
//! Clients only ever send arrays of bulk strings, so the decoder accepts the
//! `*` and `$` frame types and rejects everything else. The encoder covers
//! every [`RespValue`] variant since responses use all of them.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const SIMPLE_STRING: u8 = b'+';
const ERROR: u8 = b'-';
const INTEGER: u8 = b':';
const BULK_STRING: u8 = b'$';
const ARRAY: u8 = b'*';
const CRLF: &[u8] = b"\r\n";

/// Upper bound on elements reserved up front for a declared array length.
const MAX_PREALLOCATED: usize = 1024;

/// Longest line the decoder buffers, terminator included.
pub const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    NullBulkString,
    Array(Vec<RespValue>),
    NullArray,
}

/// Errors produced while decoding a frame.
///
/// A clean end of stream before the first byte of a frame is not an error;
/// [`RespReader::read_value`] reports it as `Ok(None)`.
#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("unexpected RESP type byte {0:#04x}")]
    UnexpectedType(u8),
    #[error("invalid length line {0:?}")]
    InvalidLength(String),
    #[error("bulk string length mismatch: declared {declared}, got {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("line is not terminated by CRLF")]
    MissingTerminator,
    #[error("unexpected end of stream")]
    UnexpectedEof,
    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RespError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => RespError::UnexpectedEof,
            _ => RespError::Io(err.to_string()),
        }
    }
}

impl RespValue {
    pub fn bulk_string(data: impl AsRef<[u8]>) -> Self {
        RespValue::BulkString(Bytes::copy_from_slice(data.as_ref()))
    }

    pub fn simple_string(text: &str) -> Self {
        RespValue::SimpleString(text.to_string())
    }

    /// Builds a request array out of bulk strings, e.g. `["SET", "k", "v"]`.
    pub fn command<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        RespValue::Array(parts.into_iter().map(RespValue::bulk_string).collect())
    }

    /// Serializes the value into its exact wire form.
    ///
    /// Errors are prefixed with the literal word `Error `, so
    /// `RespValue::Error("Unknown command")` becomes `-Error Unknown command\r\n`.
    pub fn encode(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        self.encode_into(&mut buffer);
        buffer.freeze()
    }

    fn encode_into(&self, buffer: &mut BytesMut) {
        match self {
            RespValue::SimpleString(text) => {
                buffer.put_u8(SIMPLE_STRING);
                buffer.put_slice(text.as_bytes());
                buffer.put_slice(CRLF);
            }
            RespValue::Error(message) => {
                buffer.put_u8(ERROR);
                buffer.put_slice(b"Error ");
                buffer.put_slice(message.as_bytes());
                buffer.put_slice(CRLF);
            }
            RespValue::Integer(number) => {
                buffer.put_u8(INTEGER);
                buffer.put_slice(number.to_string().as_bytes());
                buffer.put_slice(CRLF);
            }
            RespValue::BulkString(data) => {
                buffer.put_u8(BULK_STRING);
                buffer.put_slice(data.len().to_string().as_bytes());
                buffer.put_slice(CRLF);
                buffer.put_slice(data);
                buffer.put_slice(CRLF);
            }
            RespValue::NullBulkString => buffer.put_slice(b"$-1\r\n"),
            RespValue::Array(elements) => {
                buffer.put_u8(ARRAY);
                buffer.put_slice(elements.len().to_string().as_bytes());
                buffer.put_slice(CRLF);
                for element in elements {
                    element.encode_into(buffer);
                }
            }
            RespValue::NullArray => buffer.put_slice(b"*-1\r\n"),
        }
    }
}

/// Reads RESP frames one at a time from a buffered byte stream.
///
/// The reader never consumes bytes past the end of the frame it returns, so
/// the underlying stream stays positioned at the start of the next frame.
pub struct RespReader<R> {
    reader: R,
    consumed: u64,
}

impl<R> RespReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            consumed: 0,
        }
    }

    /// Total bytes consumed so far, including any partial frame that failed
    /// to decode.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Decodes the next frame.
    ///
    /// Returns `Ok(None)` when the stream ends before the first byte of a new
    /// frame. Running out of bytes in the middle of a frame is
    /// [`RespError::UnexpectedEof`].
    pub async fn read_value(&mut self) -> Result<Option<RespValue>, RespError> {
        let mut first = [0u8; 1];
        if self.reader.read(&mut first).await? == 0 {
            return Ok(None);
        }
        self.consumed += 1;

        // Arrays still waiting for elements: (declared length, elements so far).
        let mut pending: Vec<(usize, Vec<RespValue>)> = Vec::new();
        let mut tag = first[0];

        loop {
            let decoded = match tag {
                ARRAY => match self.read_length().await? {
                    None => Some(RespValue::NullArray),
                    Some(0) => Some(RespValue::Array(Vec::new())),
                    Some(length) => {
                        pending.push((length, Vec::with_capacity(length.min(MAX_PREALLOCATED))));
                        None
                    }
                },
                BULK_STRING => Some(self.read_bulk_string().await?),
                other => {
                    self.discard_line().await?;
                    return Err(RespError::UnexpectedType(other));
                }
            };

            if let Some(mut value) = decoded {
                loop {
                    let Some((length, elements)) = pending.last_mut() else {
                        return Ok(Some(value));
                    };

                    elements.push(value);
                    if elements.len() < *length {
                        break;
                    }

                    value = RespValue::Array(std::mem::take(elements));
                    pending.pop();
                }
            }

            tag = self.read_byte().await?;
        }
    }

    async fn read_byte(&mut self) -> Result<u8, RespError> {
        let byte = self.reader.read_u8().await?;
        self.consumed += 1;
        Ok(byte)
    }

    /// Reads up to and including the next LF and returns the line without
    /// its CRLF terminator.
    async fn read_line(&mut self) -> Result<Vec<u8>, RespError> {
        let mut line = Vec::new();
        self.read_bounded_line(&mut line).await?;

        if !line.ends_with(b"\n") {
            return Err(RespError::UnexpectedEof);
        }
        if !line.ends_with(CRLF) {
            return Err(RespError::MissingTerminator);
        }

        line.truncate(line.len() - CRLF.len());
        Ok(line)
    }

    /// Skips the remainder of the current line so that the next read starts
    /// on a fresh line.
    async fn discard_line(&mut self) -> Result<(), RespError> {
        let mut discarded = Vec::new();
        self.read_bounded_line(&mut discarded).await
    }

    /// Appends bytes up to and including the next LF to `line`, reading at
    /// most [`MAX_LINE_LENGTH`] bytes.
    async fn read_bounded_line(&mut self, line: &mut Vec<u8>) -> Result<(), RespError> {
        let read = (&mut self.reader)
            .take(MAX_LINE_LENGTH as u64)
            .read_until(b'\n', line)
            .await?;
        self.consumed += read as u64;

        if read == MAX_LINE_LENGTH && !line.ends_with(b"\n") {
            return Err(RespError::LineTooLong(MAX_LINE_LENGTH));
        }

        Ok(())
    }

    /// Parses a length line. `-1` is the null marker and yields `None`.
    async fn read_length(&mut self) -> Result<Option<usize>, RespError> {
        let line = self.read_line().await?;
        let text = String::from_utf8_lossy(&line);

        let length = text
            .parse::<i64>()
            .map_err(|_| RespError::InvalidLength(text.to_string()))?;

        match length {
            -1 => Ok(None),
            length if length < 0 => Err(RespError::InvalidLength(text.to_string())),
            length => usize::try_from(length)
                .map(Some)
                .map_err(|_| RespError::InvalidLength(text.to_string())),
        }
    }

    async fn read_bulk_string(&mut self) -> Result<RespValue, RespError> {
        let Some(declared) = self.read_length().await? else {
            return Ok(RespValue::NullBulkString);
        };

        let payload = self.read_line().await?;
        if payload.len() != declared {
            return Err(RespError::LengthMismatch {
                declared,
                actual: payload.len(),
            });
        }

        Ok(RespValue::BulkString(Bytes::from(payload)))
    }
}

/// Writes one encoded value and flushes, so success means the bytes have
/// been handed to the transport.
pub async fn write_value<W>(writer: &mut W, value: &RespValue) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&value.encode()).await?;
    writer.flush().await?;

    Ok(())
}
