//! Listen/advertise address selection for the file relay
//!
//! A relayed file must be fetchable by whatever actually issues the HTTP
//! request: a remote browser reaching back through SSH dynamic port
//! forwarding, a LAN peer, or a same-machine reviewer. The topology cannot
//! be known statically, so `resolve` walks a ladder of environment signals.
//! Those signals are sampled once into a [`TopologyHint`] at the call site;
//! the resolution itself is a pure function, testable without touching the
//! process environment.

use std::net::{IpAddr, Ipv4Addr};

/// Environment signals feeding address resolution
#[derive(Debug, Clone, Default)]
pub struct TopologyHint {
    /// Raw value of `SSH_CONNECTION` if we run inside an SSH session
    /// (format: `remoteHost remotePort localHost localPort`)
    pub ssh_connection: Option<String>,
    /// First IPv4 address our own hostname resolves to
    pub hostname_ipv4: Option<Ipv4Addr>,
}

impl TopologyHint {
    /// Sample the current process environment
    pub async fn detect() -> Self {
        let ssh_connection = std::env::var("SSH_CONNECTION")
            .ok()
            .filter(|v| !v.is_empty());
        let hostname_ipv4 = resolve_hostname_ipv4().await;

        Self {
            ssh_connection,
            hostname_ipv4,
        }
    }
}

/// Resolve this machine's hostname to an IPv4 address, if it has one
async fn resolve_hostname_ipv4() -> Option<Ipv4Addr> {
    let hostname = gethostname::gethostname().into_string().ok()?;
    let addrs = tokio::net::lookup_host((hostname.as_str(), 0)).await.ok()?;
    let ipv4 = addrs.into_iter().find_map(|sa| match sa.ip() {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(_) => None,
    });
    ipv4
}

/// Extract the `localHost` field from an `SSH_CONNECTION` value.
///
/// That is the address the SSH server bound for this session, which is the
/// endpoint the remote peer can reach through dynamic port forwarding.
fn ssh_local_host(ssh_connection: &str) -> Option<&str> {
    let parts: Vec<&str> = ssh_connection.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }
    Some(parts[2])
}

/// Where to bind the relay listener and what host to advertise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddr {
    /// Listen address for the relay's TCP listener
    pub listen: String,
    /// Host put into advertised URLs
    pub advertise_host: String,
}

impl ResolvedAddr {
    /// Build the URL handed to the remote side
    pub fn advertise_url(&self, port: u16, basename: &str) -> String {
        format!("http://{}:{}/{}", self.advertise_host, port, basename)
    }
}

/// Pick listen/advertise addresses for the file relay.
///
/// Decision order, first match wins:
/// 1. `external_bind`: caller expects the peer to connect directly; bind
///    all interfaces and advertise the literal loopback address, which the
///    server rewrites to our routable address via loopback translation.
/// 2. Active SSH session: bind all interfaces, advertise the session's
///    local-host field (dynamic port forwarding target).
/// 3. Own hostname resolves to IPv4: bind all interfaces, advertise it.
/// 4. Fall back to loopback only.
pub fn resolve(port: u16, external_bind: bool, hint: &TopologyHint) -> ResolvedAddr {
    if external_bind {
        return ResolvedAddr {
            listen: format!("0.0.0.0:{}", port),
            advertise_host: "127.0.0.1".to_string(),
        };
    }

    if let Some(host) = hint.ssh_connection.as_deref().and_then(ssh_local_host) {
        return ResolvedAddr {
            listen: format!("0.0.0.0:{}", port),
            advertise_host: host.to_string(),
        };
    }

    if let Some(ip) = hint.hostname_ipv4 {
        return ResolvedAddr {
            listen: format!("0.0.0.0:{}", port),
            advertise_host: ip.to_string(),
        };
    }

    ResolvedAddr {
        listen: format!("localhost:{}", port),
        advertise_host: "localhost".to_string(),
    }
}
