//! Compiled-in defaults
// (c) 2025 Ross Younger

use std::time::Duration;

/// The set of tunables governing a transfer.
///
/// There is deliberately no configuration file; everything here can be
/// overridden on the command line where it makes sense to do so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    /// Server to connect to when `--host` is not given (client mode)
    pub remote_host: &'static str,
    /// TCP port used by both client and server
    pub port: u16,
    /// Address the server binds when `--bind` is not given
    pub bind_address: &'static str,
    /// Bound on connection establishment and on waiting for the
    /// programming result (client mode)
    pub network_timeout: Duration,
    /// Programmer tool the server invokes
    pub programmer: &'static str,
    /// Bound on a single programmer-tool invocation (server mode)
    pub program_timeout: Duration,
    /// Suffix given to the server's temporary bitstream files.
    /// openFPGALoader sniffs the file type from its name.
    pub bitstream_suffix: &'static str,
}

impl Configuration {
    /// The built-in defaults
    #[must_use]
    pub const fn system_default() -> Self {
        Self {
            remote_host: "192.168.86.56",
            port: 65432,
            bind_address: "0.0.0.0",
            network_timeout: Duration::from_secs(60),
            programmer: "openFPGALoader",
            program_timeout: Duration::from_secs(30),
            bitstream_suffix: ".fs",
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::system_default()
    }
}

#[cfg(test)]
mod test {
    use super::Configuration;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_wire_contract() {
        let config = Configuration::system_default();
        assert_eq!(config.port, 65432);
        assert_eq!(config.programmer, "openFPGALoader");
        assert_eq!(config, Configuration::default());
    }
}
