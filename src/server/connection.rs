//! Per-connection handling
// (c) 2025 Ross Younger

use anyhow::Context as _;
use human_repr::HumanCount as _;
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use super::{programmer, ServerOptions};
use crate::config::Configuration;
use crate::protocol::{ProgrammingResult, ProtocolError, TransferRequest};

/// Processes one connection end to end:
/// read request, materialize, program, respond.
///
/// An incomplete transfer is reported to the peer and is not an error here;
/// anything else propagates to the handler boundary in the accept loop.
/// The temporary file is removed on every exit path past materialization.
pub(crate) async fn handle<S>(mut stream: S, options: &ServerOptions) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    info!("connection accepted");
    let request = match TransferRequest::from_reader(&mut stream).await {
        Ok(request) => request,
        Err(e @ ProtocolError::IncompletePayload { .. }) => {
            warn!("{e}");
            ProgrammingResult::failure(e.to_string())
                .to_writer(&mut stream)
                .await
                .context("sending incomplete-transfer report")?;
            return Ok(());
        }
        Err(e) => return Err(anyhow::Error::new(e).context("reading transfer request")),
    };
    debug!(
        "received {} for board {}",
        request.payload().len().human_count_bytes(),
        request.board_type()
    );

    let bitstream = materialize(&request).await?;
    info!("bitstream saved to {}", bitstream.path().display());

    let result = programmer::run(options, request.board_type(), bitstream.path()).await;
    info!("programming completed with return code {}", result.returncode);

    result
        .to_writer(&mut stream)
        .await
        .context("sending programming result")?;
    Ok(())
}

/// Writes the received payload to a freshly created, uniquely named
/// temporary file, which lives exactly as long as the returned handle.
async fn materialize(request: &TransferRequest) -> anyhow::Result<NamedTempFile> {
    let file = tempfile::Builder::new()
        .prefix("rfp-")
        .suffix(Configuration::system_default().bitstream_suffix)
        .tempfile()
        .context("creating temporary bitstream file")?;
    tokio::fs::write(file.path(), request.payload())
        .await
        .context("writing bitstream to temporary file")?;
    Ok(file)
}
