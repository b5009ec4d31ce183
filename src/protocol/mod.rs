// (c) 2025 Ross Younger

//! Wire protocol definitions
//!
//! # On-Wire Framing
//!
//! A transfer is one TCP connection carrying a single request and a single
//! response. The request is framed as:
//!
//! | Field | Size | Encoding |
//! |---|---|---|
//! | `payload_size` | 4 bytes | unsigned big-endian integer |
//! | `board_type_len` | 1 byte | unsigned integer |
//! | `board_type` | `board_type_len` bytes | UTF-8 |
//! | `payload` | `payload_size` bytes | raw binary |
//!
//! The response is a single JSON object (see
//! [`ProgrammingResult`](result::ProgrammingResult)); its end is signalled by
//! the server closing the connection, so it needs no length prefix. There is
//! no version negotiation.

pub mod result;
pub mod transfer;

pub use result::ProgrammingResult;
pub use transfer::TransferRequest;

/// Faults in the conversation itself, as distinct from plain network or
/// filesystem trouble. Callers can match on these to decide whether a
/// connection died or the peer spoke garbage.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The stream ended inside the fixed-size header fields
    #[error("connection closed before the transfer header was complete")]
    TruncatedHeader(#[source] std::io::Error),
    /// The peer promised more payload bytes than it sent
    #[error("incomplete transfer: received {received} of {expected} payload bytes")]
    IncompletePayload {
        /// bytes actually received
        received: u64,
        /// bytes the header promised
        expected: u64,
    },
    /// The board-type field did not decode
    #[error("board type is not valid UTF-8")]
    BoardTypeEncoding(#[from] std::string::FromUtf8Error),
    /// The board-type field cannot be represented on the wire
    #[error("board type is {0} bytes encoded; the wire format allows at most 255")]
    BoardTypeTooLong(usize),
    /// Guard against absurd (or corrupt) size headers
    #[error("declared payload size {0} exceeds the limit of {limit}", limit = transfer::TransferRequest::PAYLOAD_SIZE_LIMIT)]
    PayloadTooLarge(u32),
    /// The response bytes were not a [`ProgrammingResult`](result::ProgrammingResult)
    #[error("response was not valid JSON: {0}")]
    ResponseParse(#[from] serde_json::Error),
    /// Any other I/O failure on the stream
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
