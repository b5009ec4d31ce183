//! Options specific to rfp client-mode
// (c) 2025 Ross Younger

use std::path::PathBuf;

use clap::Parser;

use crate::config::Configuration;

/// Client-side options provided on the command line
#[derive(Debug, Parser, Clone, Default)]
pub struct Parameters {
    /// Path to the bitstream file to send (e.g. top.fs)
    #[arg(short, long, value_name("FILE"))]
    pub file: Option<PathBuf>,

    /// Board type tag, selecting the programmer tool's wiring profile
    /// (e.g. tangnano9k)
    #[arg(short, long, value_name("BOARD"))]
    pub board: Option<String>,

    /// Remote server hostname or IP address
    #[arg(
        short = 'H',
        long,
        value_name("HOST"),
        default_value(Configuration::system_default().remote_host)
    )]
    pub host: String,

    /// Enable detailed debug output
    ///
    /// This has the same effect as setting `RUST_LOG=rfp=debug` in the environment.
    /// If present, `RUST_LOG` overrides this option.
    #[arg(short, long, action, help_heading("Debug"), display_order(0))]
    pub debug: bool,

    /// Quiet mode
    ///
    /// Switches off progress display; reports only errors
    #[arg(short, long, action, conflicts_with("debug"), help_heading("Output"))]
    pub quiet: bool,

    /// Log to a file
    ///
    /// By default the log receives everything printed to stderr.
    /// To override this behaviour, set the environment variable `RUST_LOG_FILE_DETAIL` (same semantics as `RUST_LOG`).
    #[arg(
        short('l'),
        long,
        action,
        value_name("FILE"),
        help_heading("Output"),
        next_line_help(true),
        display_order(0)
    )]
    pub log_file: Option<String>,
}
