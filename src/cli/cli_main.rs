//! Main CLI for rfp
// (c) 2025 Ross Younger

use std::ffi::OsString;
use std::process::ExitCode;

use anstream::{eprintln, print, println};
use clap::Parser;
use indicatif::{MultiProgress, ProgressDrawTarget};

use super::args::CliArgs;
use super::styles::{ERROR, HEADER, RESET, SUCCESS};
use crate::client::{client_main, ProgramJob};
use crate::config::Configuration;
use crate::protocol::ProgrammingResult;
use crate::server::{server_main, ServerOptions};
use crate::util;

/// Maximum rate at which the progress display updates
const MAX_UPDATE_FPS: u8 = 20;

enum MainMode {
    Server,
    Client(MultiProgress),
}

impl From<&CliArgs> for MainMode {
    fn from(args: &CliArgs) -> Self {
        if args.server {
            MainMode::Server
        } else {
            MainMode::Client(MultiProgress::with_draw_target(
                ProgressDrawTarget::stderr_with_hz(MAX_UPDATE_FPS),
            ))
        }
    }
}

impl MainMode {
    fn progress(&self) -> Option<&MultiProgress> {
        match self {
            MainMode::Client(mp) => Some(mp),
            MainMode::Server => None,
        }
    }
}

/// Main CLI entrypoint
///
/// Call this from `main`, passing the arguments to use.
/// Normally you will call `cli(std::env::args_os())` but you can pass in
/// alternate arguments for CLI testing.
#[must_use]
pub fn cli<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    use clap::error::ErrorKind::{DisplayHelp, DisplayVersion};
    let args = match CliArgs::try_parse_from(args) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), DisplayHelp | DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };
    run(args).unwrap_or_else(|e| {
        if util::tracing_is_initialised() {
            tracing::error!("{e:#}");
        } else {
            eprintln!("{ERROR}Error:{RESET} {e:#}");
        }
        ExitCode::FAILURE
    })
}

/// Inner CLI logic
///
/// # Note
/// - This function starts a tokio runtime and performs work in it.
#[tokio::main(flavor = "current_thread")]
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let mode = MainMode::from(&args); // side-effect: holds the progress display, if we need one
    util::setup_tracing(
        util::trace_level(&args.client_params),
        mode.progress(),
        args.client_params.log_file.as_ref(),
    )?; // to provoke an error here: set RUST_LOG=.

    match mode {
        MainMode::Server => {
            server_main(ServerOptions {
                bind_address: args.bind.clone(),
                port: args.port,
                programmer: args.programmer.clone(),
                program_timeout: Configuration::system_default().program_timeout,
            })
            .await?;
            Ok(ExitCode::SUCCESS)
        }
        MainMode::Client(display) => {
            let job = ProgramJob::new(&args.client_params, args.port)?;
            let result = client_main(&job, &display, args.client_params.quiet).await?;
            print_report(&result, args.client_params.quiet);
            Ok(exit_code_for(result.returncode))
        }
    }
}

/// Relays the remote tool's captured output to the user, verbatim.
fn print_report(result: &ProgrammingResult, quiet: bool) {
    if !result.stdout.is_empty() {
        if !quiet {
            println!("{HEADER}stdout:{RESET}");
        }
        print!("{}", result.stdout);
        if !result.stdout.ends_with('\n') {
            println!();
        }
    }
    if !result.stderr.is_empty() {
        if !quiet {
            println!("{HEADER}stderr:{RESET}");
        }
        print!("{}", result.stderr);
        if !result.stderr.ends_with('\n') {
            println!();
        }
    }
    if !quiet {
        let style = if result.success() { SUCCESS } else { ERROR };
        println!("{style}Return code: {}{RESET}", result.returncode);
    }
}

/// The process exit status carries the low byte of the remote return code,
/// as it would if the tool had been invoked locally via a shell (so a
/// remote -1 exits 255).
fn exit_code_for(returncode: i32) -> ExitCode {
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let low_byte = (returncode & 0xff) as u8;
    ExitCode::from(low_byte)
}
