//! Job specification for the client
// (c) 2025 Ross Younger

use std::path::PathBuf;

use crate::protocol::TransferRequest;

use super::Parameters;

/// Details of one programming job: which bitstream, which board, where.
#[derive(Debug, Clone)]
pub struct ProgramJob {
    /// Local path of the bitstream to send
    pub file: PathBuf,
    /// Board tag passed through to the programmer tool
    pub board_type: String,
    /// Server hostname or IP address
    pub host: String,
    /// Server port
    pub port: u16,
}

impl ProgramJob {
    /// Resolves command-line parameters into a job, checking the
    /// client-side preconditions.
    pub fn new(params: &Parameters, port: u16) -> anyhow::Result<Self> {
        let file = params
            .file
            .clone()
            .ok_or_else(|| anyhow::anyhow!("a bitstream file is required (--file)"))?;
        let board_type = params
            .board
            .clone()
            .ok_or_else(|| anyhow::anyhow!("a board type is required (--board)"))?;
        if board_type.len() > TransferRequest::BOARD_TYPE_LIMIT {
            anyhow::bail!(
                "board type is {} bytes encoded; the wire format allows at most {}",
                board_type.len(),
                TransferRequest::BOARD_TYPE_LIMIT
            );
        }
        Ok(Self {
            file,
            board_type,
            host: params.host.clone(),
            port,
        })
    }
}
