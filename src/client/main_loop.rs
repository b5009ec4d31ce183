//! Main client mode event loop
// (c) 2025 Ross Younger

use anyhow::Context as _;
use human_repr::HumanCount as _;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::info;

use super::ProgramJob;
use crate::config::Configuration;
use crate::protocol::{ProgrammingResult, TransferRequest};

/// Runs one programming job against the remote server and returns the
/// outcome it reported.
///
/// Connection establishment and the wait for the result are both bounded by
/// the network timeout. The connection is closed on every exit path.
// Caution: While the progress bar is live, anything printed to the console
// must go via the MultiProgress (setup_tracing already routes tracing there).
pub async fn client_main(
    job: &ProgramJob,
    display: &MultiProgress,
    quiet: bool,
) -> anyhow::Result<ProgrammingResult> {
    let config = Configuration::system_default();

    let payload = tokio::fs::read(&job.file)
        .await
        .with_context(|| format!("could not read bitstream file {}", job.file.display()))?;
    let request = TransferRequest::new(&job.board_type, payload)?;
    info!(
        "sending {} ({}) to {}:{}",
        request.payload().len().human_count_bytes(),
        job.file.display(),
        job.host,
        job.port
    );
    info!("board type: {}", job.board_type);

    let mut stream = timeout(
        config.network_timeout,
        TcpStream::connect((job.host.as_str(), job.port)),
    )
    .await
    .with_context(|| format!("timed out connecting to {}:{}", job.host, job.port))?
    .with_context(|| format!("could not connect to {}:{}", job.host, job.port))?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        display.add(ProgressBar::new(request.payload().len() as u64).with_style(progress_style()?))
    };
    request
        .to_writer(&mut stream, |n| progress.inc(n as u64))
        .await
        .context("sending transfer request")?;
    progress.finish_and_clear();
    info!("transfer complete; waiting for the programmer to finish");

    let result = timeout(
        config.network_timeout,
        ProgrammingResult::from_reader_to_end(&mut stream),
    )
    .await
    .context("timed out waiting for the programming result")?
    .context("reading programming result")?;
    Ok(result)
}

fn progress_style() -> anyhow::Result<ProgressStyle> {
    Ok(ProgressStyle::with_template(
        "{percent:>3}% {wide_bar} {bytes}/{total_bytes} {binary_bytes_per_sec}",
    )?)
}
