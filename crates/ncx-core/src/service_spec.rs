//! Parsing of `<service>://<host>[:<port>]` target specifications.

use crate::error::NcxError;
use crate::types::Transport;
use std::str::FromStr;

/// Well-known services and the port they listen on by default.
const DEFAULT_PORTS: &[(&str, u16, Transport)] = &[
    ("ftp", 21, Transport::Tcp),
    ("ssh", 22, Transport::Tcp),
    ("telnet", 23, Transport::Tcp),
    ("smtp", 25, Transport::Tcp),
    ("http", 80, Transport::Tcp),
    ("pop3", 110, Transport::Tcp),
    ("imap", 143, Transport::Tcp),
    ("snmp", 161, Transport::Udp),
    ("https", 443, Transport::Tcp),
    ("smb", 445, Transport::Tcp),
    ("pop3s", 995, Transport::Tcp),
    ("imaps", 993, Transport::Tcp),
    ("mssql", 1433, Transport::Tcp),
    ("mysql", 3306, Transport::Tcp),
    ("rdp", 3389, Transport::Tcp),
    ("postgres", 5432, Transport::Tcp),
    ("vnc", 5900, Transport::Tcp),
    ("redis", 6379, Transport::Tcp),
    ("mongodb", 27017, Transport::Tcp),
];

/// Default port for a service name, if it is a known one.
pub fn default_port(service: &str) -> Option<u16> {
    DEFAULT_PORTS
        .iter()
        .find(|(name, _, _)| *name == service)
        .map(|(_, port, _)| *port)
}

fn default_transport(service: &str) -> Transport {
    DEFAULT_PORTS
        .iter()
        .find(|(name, _, _)| *name == service)
        .map(|(_, _, transport)| *transport)
        .unwrap_or_default()
}

/// A parsed service target, e.g. `ssh://10.0.0.5:2222`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceSpec {
    pub service: String,
    pub host: String,
    pub port: u16,
    pub transport: Transport,
}

impl ServiceSpec {
    pub fn parse(spec: &str) -> Result<Self, NcxError> {
        let invalid = || NcxError::InvalidServiceSpec(spec.to_string());

        let (service, rest) = spec.split_once("://").ok_or_else(invalid)?;
        let service = service.trim().to_ascii_lowercase();
        if service.is_empty() || rest.is_empty() {
            return Err(invalid());
        }

        let (host, port) = split_host_port(rest).ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }

        let port = match port {
            Some(raw) => match raw.parse::<u16>() {
                Ok(0) | Err(_) => return Err(NcxError::InvalidPort(raw.to_string())),
                Ok(p) => p,
            },
            None => {
                default_port(&service).ok_or_else(|| NcxError::UnknownService(service.clone()))?
            }
        };

        Ok(Self {
            transport: default_transport(&service),
            service,
            host: host.to_string(),
            port,
        })
    }
}

/// Split `host[:port]`, accepting bracketed IPv6 literals (`[::1]:22`).
fn split_host_port(rest: &str) -> Option<(&str, Option<&str>)> {
    if let Some(stripped) = rest.strip_prefix('[') {
        let (host, tail) = stripped.split_once(']')?;
        return match tail {
            "" => Some((host, None)),
            _ => Some((host, Some(tail.strip_prefix(':')?))),
        };
    }
    match rest.rsplit_once(':') {
        // A bare IPv6 address without brackets has more than one colon.
        Some((host, _)) if host.contains(':') => Some((rest, None)),
        Some((host, port)) => Some((host, Some(port))),
        None => Some((rest, None)),
    }
}

impl FromStr for ServiceSpec {
    type Err = NcxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ServiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.service, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.service, self.host, self.port)
        }
    }
}
