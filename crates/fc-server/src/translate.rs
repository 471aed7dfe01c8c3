//! Loopback host translation
//!
//! A URI built on one side of a forwarded connection often embeds a
//! loopback host (`http://127.0.0.1:N/file`) that means nothing on the
//! other side. Once the server knows the requesting peer's routable
//! address it substitutes that in. This is a best-effort rewrite, not
//! validation: anything that doesn't parse, or doesn't carry a loopback IP
//! literal, passes through unchanged.

use std::net::IpAddr;

use url::{Host, Url};

/// Rewrite a loopback host in `uri` to `peer`, preserving any port.
///
/// Idempotent once the host is non-loopback: the rewritten URI carries the
/// peer's address, which a second pass leaves alone.
pub fn translate_loopback(uri: &str, peer: IpAddr) -> String {
    let mut parsed = match Url::parse(uri) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Loopback translation skipped, URI parse error: {}", e);
            return uri.to_string();
        }
    };

    let is_loopback = match parsed.host() {
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        // Hostnames (including "localhost") are not rewritten; only IP
        // literals are unambiguous.
        Some(Host::Domain(_)) | None => false,
    };

    if !is_loopback {
        return uri.to_string();
    }

    if parsed.set_ip_host(peer).is_err() {
        return uri.to_string();
    }

    parsed.to_string()
}
