// (c) 2025 Ross Younger

//! The Remote FPGA Programmer (`rfp`) streams a compiled bitstream file over
//! TCP to a server process running beside the target hardware, which programs
//! the board with [openFPGALoader] and reports the outcome.
//!
//! ## Overview
//!
//! A typical development board (say, a Tang Nano on the far side of the lab,
//! hanging off a single-board computer) is programmed by running
//! `openFPGALoader` on the machine the board is plugged into. `rfp` lets you
//! do that from your build machine:
//!
//! * `rfp --server` runs next to the hardware and accepts bitstreams.
//! * `rfp -f blinky.fs -b tangnano9k -H 192.168.86.56` sends one.
//!
//! The client's exit status is the programmer tool's exit status, so `rfp`
//! slots into a Makefile `flash` target the same way a local invocation
//! would.
//!
//! ## 📖 How it works
//!
//! 1. The client reads the bitstream and sends it over a fresh TCP
//!    connection, framed as described in [protocol].
//! 2. The server writes the payload to a uniquely-named temporary file and
//!    invokes `openFPGALoader -v -b <board> <file>` with a bounded timeout.
//! 3. The tool's exit code, stdout and stderr travel back as a single JSON
//!    object; the connection closes; the temporary file is deleted.
//!
//! Each connection is handled by its own task; handler failures never take
//! down the listener.
//!
//! [openFPGALoader]: https://github.com/trabucayre/openFPGALoader

pub(crate) mod cli;
pub use cli::cli as main;
pub use cli::styles;

pub mod client;
pub use client::Parameters;

pub mod config;
pub use config::Configuration;

pub mod protocol;
pub mod server;
pub mod util;
