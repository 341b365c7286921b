use crate::{BrokerError, DEFAULT_PORT};
use std::fmt;
use std::str::FromStr;

/// Plain TCP broker endpoint.
///
/// Accepts `tcp://host:port`, `mqtt://host:port`, `host:port` and `host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl FromStr for BrokerAddress {
    type Err = BrokerError;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| BrokerError::InvalidAddress {
            address: address.to_string(),
            reason,
        };

        let trimmed = address.trim();
        let authority = match trimmed.split_once("://") {
            Some((scheme, rest))
                if scheme.eq_ignore_ascii_case("tcp") || scheme.eq_ignore_ascii_case("mqtt") =>
            {
                rest
            }
            Some(_) => return Err(invalid("unsupported scheme, expected tcp:// or mqtt://")),
            None => trimmed,
        };
        let authority = authority.trim_end_matches('/');

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (host, rest) = bracketed
                .split_once(']')
                .ok_or_else(|| invalid("unterminated IPv6 literal"))?;
            let port = match rest {
                "" => None,
                rest => Some(
                    rest.strip_prefix(':')
                        .ok_or_else(|| invalid("expected `:` after IPv6 literal"))?,
                ),
            };
            (host, port)
        } else {
            match authority.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (authority, None),
            }
        };

        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| invalid("port must be a number between 1 and 65535"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "tcp://[{}]:{}", self.host, self.port)
        } else {
            write!(f, "tcp://{}:{}", self.host, self.port)
        }
    }
}
