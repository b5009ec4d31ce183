//! Command line argument definitions
// (c) 2025 Ross Younger

use clap::Parser;

use crate::client::Parameters;
use crate::config::Configuration;

/// Options for both modes of operation
#[derive(Debug, Parser, Clone)]
#[command(author, version, about, styles(super::styles::CLAP_STYLES))]
pub(crate) struct CliArgs {
    // MODE SELECTION ======================================================
    /// Operate in server mode, accepting bitstreams and programming boards.
    ///
    /// Run this on the machine the FPGA is plugged into.
    #[arg(long, help_heading("Mode"), display_order(0))]
    pub server: bool,

    // SERVER OPTIONS ======================================================
    /// Address to listen on (server mode only)
    #[arg(
        long,
        value_name("ADDR"),
        default_value(Configuration::system_default().bind_address),
        help_heading("Server")
    )]
    pub bind: String,

    /// Programmer tool to invoke (server mode only)
    #[arg(
        long,
        value_name("TOOL"),
        default_value(Configuration::system_default().programmer),
        help_heading("Server")
    )]
    pub programmer: String,

    // SHARED OPTIONS ======================================================
    /// Port to connect to (client mode) or listen on (server mode)
    #[arg(
        short,
        long,
        value_name("PORT"),
        default_value_t = Configuration::system_default().port
    )]
    pub port: u16,

    // CLIENT OPTIONS ======================================================
    #[command(flatten)]
    pub client_params: Parameters,
}
