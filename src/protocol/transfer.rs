//! Transfer request framing
// (c) 2025 Ross Younger

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::ProtocolError;

/// Size of the bounded reads and writes used for the payload.
/// This bounds per-operation memory and gives the client a progress tick.
pub const CHUNK_SIZE: usize = 4096;

/// A single bitstream programming request.
///
/// See the [module documentation](super) for the wire layout.
/// Construction via [`TransferRequest::new`] enforces the field limits, so a
/// request that exists can always be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    board_type: String,
    payload: Vec<u8>,
}

impl TransferRequest {
    /// Absolute limit on the declared payload size.
    ///
    /// Bitstreams for the boards we care about are a few MB at most; this
    /// exists so a corrupt or hostile size header cannot make the server
    /// attempt a ludicrous allocation.
    pub const PAYLOAD_SIZE_LIMIT: u32 = 256 * 1024 * 1024;

    /// Largest board-type tag the length-prefix byte can express
    pub const BOARD_TYPE_LIMIT: usize = 255;

    /// Constructor; checks the wire-format limits.
    pub fn new(board_type: &str, payload: Vec<u8>) -> Result<Self, ProtocolError> {
        if board_type.len() > Self::BOARD_TYPE_LIMIT {
            return Err(ProtocolError::BoardTypeTooLong(board_type.len()));
        }
        if u32::try_from(payload.len())
            .map(|n| n > Self::PAYLOAD_SIZE_LIMIT)
            .unwrap_or(true)
        {
            return Err(ProtocolError::PayloadTooLarge(u32::MAX));
        }
        Ok(Self {
            board_type: board_type.to_owned(),
            payload,
        })
    }

    /// The board tag this bitstream is destined for
    #[must_use]
    pub fn board_type(&self) -> &str {
        &self.board_type
    }

    /// The raw bitstream
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Serializes this request into an async writer.
    ///
    /// `on_chunk` is called with the size of each payload chunk as it is
    /// written; pass `|_| ()` if you don't care about progress.
    pub async fn to_writer<W, F>(&self, writer: &mut W, mut on_chunk: F) -> Result<(), ProtocolError>
    where
        W: AsyncWrite + Unpin + Send,
        F: FnMut(usize),
    {
        #[allow(clippy::cast_possible_truncation)] // limits checked in the constructor
        let payload_size = self.payload.len() as u32;
        #[allow(clippy::cast_possible_truncation)]
        let board_len = self.board_type.len() as u8;

        writer.write_u32(payload_size).await?; // big-endian
        writer.write_u8(board_len).await?;
        writer.write_all(self.board_type.as_bytes()).await?;
        for chunk in self.payload.chunks(CHUNK_SIZE) {
            writer.write_all(chunk).await?;
            on_chunk(chunk.len());
        }
        writer.flush().await?;
        Ok(())
    }

    /// Deserializes a request from an async reader.
    ///
    /// The caller learns which phase went wrong from the error variant:
    /// a stream that dies in the fixed fields is [`ProtocolError::TruncatedHeader`],
    /// one that dies after promising a payload is [`ProtocolError::IncompletePayload`].
    pub async fn from_reader<R>(reader: &mut R) -> Result<Self, ProtocolError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let payload_size = reader.read_u32().await.map_err(eof_is_truncation)?;
        if payload_size > Self::PAYLOAD_SIZE_LIMIT {
            return Err(ProtocolError::PayloadTooLarge(payload_size));
        }
        let board_len = reader.read_u8().await.map_err(eof_is_truncation)?;
        let mut board_raw = vec![0u8; usize::from(board_len)];
        let _ = reader
            .read_exact(&mut board_raw)
            .await
            .map_err(eof_is_truncation)?;
        let board_type = String::from_utf8(board_raw)?;

        let expected = usize::try_from(payload_size)
            .map_err(|_| ProtocolError::PayloadTooLarge(payload_size))?;
        let mut payload = Vec::with_capacity(expected);
        let mut buffer = [0u8; CHUNK_SIZE];
        while payload.len() < expected {
            let want = CHUNK_SIZE.min(expected - payload.len());
            let n = reader.read(&mut buffer[..want]).await?;
            if n == 0 {
                return Err(ProtocolError::IncompletePayload {
                    received: payload.len() as u64,
                    expected: expected as u64,
                });
            }
            payload.extend_from_slice(&buffer[..n]);
        }
        Ok(Self {
            board_type,
            payload,
        })
    }
}

/// An unexpected-eof while reading the fixed fields means the peer hung up
/// mid-header; anything else is ordinary I/O trouble.
fn eof_is_truncation(e: std::io::Error) -> ProtocolError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ProtocolError::TruncatedHeader(e)
    } else {
        ProtocolError::Io(e)
    }
}
