//! Programming result message
// (c) 2025 Ross Younger

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::ProtocolError;

/// Outcome of one programming attempt, as reported by the server.
///
/// On the wire this is a single JSON object
/// `{"returncode": <int>, "stdout": <string>, "stderr": <string>}`,
/// written in one send and delimited by connection close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammingResult {
    /// The programmer tool's exit code, or -1 if it timed out or could not
    /// be launched
    pub returncode: i32,
    /// Everything the tool wrote to its standard output
    pub stdout: String,
    /// Everything the tool wrote to its standard error, or our diagnostic
    /// when the tool never ran
    pub stderr: String,
}

impl ProgrammingResult {
    /// A result conveying a server-side failure (the tool did not run to
    /// completion); `stderr` carries the diagnostic.
    pub fn failure<S: Into<String>>(stderr: S) -> Self {
        Self {
            returncode: -1,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Did the programming attempt succeed?
    #[must_use]
    pub fn success(&self) -> bool {
        self.returncode == 0
    }

    /// Serializes into an async writer as one JSON send.
    pub async fn to_writer<W>(&self, writer: &mut W) -> Result<(), ProtocolError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let encoded = serde_json::to_vec(self)?;
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Reads the stream to end-of-stream and parses the accumulated bytes.
    ///
    /// There is no length prefix; the sender closing the connection is what
    /// delimits the message. Bytes that do not parse are a
    /// [`ProtocolError::ResponseParse`], which callers report differently
    /// from a connection that failed outright.
    pub async fn from_reader_to_end<R>(reader: &mut R) -> Result<Self, ProtocolError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut accumulated = Vec::new();
        let _ = reader.read_to_end(&mut accumulated).await?;
        Ok(serde_json::from_slice(&accumulated)?)
    }
}
