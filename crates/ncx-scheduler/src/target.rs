use std::net::IpAddr;

/// The host a service lives on.
///
/// Shared by reference (`Arc<Target>`) between every scheduler attacking
/// services on the same host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    hostname: Option<String>,
    addr: Option<IpAddr>,
    name_ip: String,
}

impl Target {
    /// Build from a host string; IP literals fill the address, anything else
    /// is kept as an unresolved hostname.
    pub fn new(host: &str) -> Self {
        match host.parse::<IpAddr>() {
            Ok(addr) => Self::from_parts(None, Some(addr)),
            Err(_) => Self::from_parts(Some(host.to_string()), None),
        }
    }

    /// Hostname together with its resolved address.
    pub fn resolved(hostname: &str, addr: IpAddr) -> Self {
        Self::from_parts(Some(hostname.to_string()), Some(addr))
    }

    fn from_parts(hostname: Option<String>, addr: Option<IpAddr>) -> Self {
        let name_ip = match (&hostname, &addr) {
            (Some(name), Some(addr)) => format!("{name} ({addr})"),
            (Some(name), None) => name.clone(),
            (None, Some(addr)) => addr.to_string(),
            (None, None) => String::new(),
        };
        Self {
            hostname,
            addr,
            name_ip,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn addr(&self) -> Option<IpAddr> {
        self.addr
    }

    /// `"name (ip)"`, or whichever of the two is known.
    pub fn name_ip(&self) -> &str {
        &self.name_ip
    }
}
