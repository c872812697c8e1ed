//! Runtime configuration.

use std::net::SocketAddr;

use clap::Parser;

use crate::error::Error;

/// Token the service expects in `x-auth` unless told otherwise.
pub const DEFAULT_AUTH_TOKEN: &str = "auth_token";

/// Command-line / environment configuration for the `rolodex` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "rolodex", version, about = "In-memory user records over HTTP")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "ROLODEX_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: String,

    /// Shared secret required in the `x-auth` header.
    #[arg(long, env = "ROLODEX_AUTH_TOKEN", default_value = DEFAULT_AUTH_TOKEN)]
    pub auth_token: String,
}

impl Config {
    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        self.addr.parse().map_err(|source| Error::InvalidAddress { addr: self.addr.clone(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_the_contract_token() {
        let config = Config::try_parse_from(["rolodex"]).unwrap();
        assert_eq!(config.auth_token, DEFAULT_AUTH_TOKEN);
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn rejects_malformed_addresses() {
        let config = Config::try_parse_from(["rolodex", "--addr", "not-an-addr"]).unwrap();
        assert!(matches!(config.socket_addr(), Err(Error::InvalidAddress { .. })));
    }
}
