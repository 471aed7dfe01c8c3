//! Peer allow-list
//!
//! The server has no authentication; the allow-list is the entire trust
//! boundary. A peer is serviced iff its address matches at least one
//! configured range. Rules are CIDR blocks (`10.0.0.0/8`, `fd00::/8`) or
//! bare addresses, comma-separated. The list is parsed once at server start
//! and is immutable afterwards, so it can be shared across connection tasks
//! without locking.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::ConfigError;

/// A single CIDR range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IpRange {
    network: IpAddr,
    prefix_len: u8,
}

impl IpRange {
    fn contains(&self, addr: IpAddr) -> bool {
        match (self.network, canonical(addr)) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = v4_mask(self.prefix_len);
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = v6_mask(self.prefix_len);
                u128::from(net) & mask == u128::from(ip) & mask
            }
            // Family mismatch never matches
            _ => false,
        }
    }
}

/// Normalize IPv4-mapped IPv6 addresses so a `::ffff:a.b.c.d` peer matches
/// IPv4 rules.
fn canonical(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => addr,
        },
        v4 => v4,
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    }
}

fn v6_mask(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix_len))
    }
}

impl FromStr for IpRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidAllowRule {
            rule: s.to_string(),
            reason: reason.to_string(),
        };

        let (addr_part, prefix_part) = match s.split_once('/') {
            Some((a, p)) => (a, Some(p)),
            None => (s, None),
        };

        let network: IpAddr = addr_part
            .parse()
            .map_err(|_| invalid("not an IP address"))?;

        let max_len: u8 = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };

        let prefix_len = match prefix_part {
            // A bare address is an exact-match rule
            None => max_len,
            Some(p) => {
                let len: u8 = p.parse().map_err(|_| invalid("bad prefix length"))?;
                if len > max_len {
                    return Err(invalid("prefix length out of range"));
                }
                len
            }
        };

        Ok(Self {
            network,
            prefix_len,
        })
    }
}

/// Ordered set of allowed address ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    ranges: Vec<IpRange>,
}

impl AllowList {
    /// Parse a comma-separated rule list, e.g. `"10.0.0.0/8,::1"`
    pub fn parse(rules: &str) -> Result<Self, ConfigError> {
        let ranges = rules
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(IpRange::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Allow-list admitting every IPv4 and IPv6 peer
    pub fn allow_all() -> Self {
        Self {
            ranges: vec![
                IpRange {
                    network: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    prefix_len: 0,
                },
                IpRange {
                    network: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
                    prefix_len: 0,
                },
            ],
        }
    }

    /// Whether `addr` matches at least one configured range
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.ranges.iter().any(|r| r.contains(addr))
    }

    /// Number of configured ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether no ranges are configured (nothing is admitted)
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl FromStr for AllowList {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_cidr_match() {
        let list = AllowList::parse("192.168.1.0/24").unwrap();
        assert!(list.contains(ip("192.168.1.1")));
        assert!(list.contains(ip("192.168.1.254")));
        assert!(!list.contains(ip("192.168.2.1")));
        assert!(!list.contains(ip("10.0.0.1")));
    }

    #[test]
    fn test_bare_address_is_exact() {
        let list = AllowList::parse("10.0.0.8").unwrap();
        assert!(list.contains(ip("10.0.0.8")));
        assert!(!list.contains(ip("10.0.0.9")));
    }

    #[test]
    fn test_allow_all_default() {
        let list = AllowList::parse("0.0.0.0/0,::/0").unwrap();
        assert!(list.contains(ip("203.0.113.5")));
        assert!(list.contains(ip("::1")));
        assert!(list.contains(ip("fe80::1")));
        assert_eq!(list, AllowList::allow_all());
    }

    #[test]
    fn test_v6_prefix() {
        let list = AllowList::parse("fd00::/8").unwrap();
        assert!(list.contains(ip("fd12:3456::1")));
        assert!(!list.contains(ip("fe80::1")));
    }

    #[test]
    fn test_family_mismatch_never_matches() {
        let v4_only = AllowList::parse("0.0.0.0/0").unwrap();
        assert!(!v4_only.contains(ip("::1")));

        let v6_only = AllowList::parse("::/0").unwrap();
        assert!(!v6_only.contains(ip("127.0.0.1")));
    }

    #[test]
    fn test_mapped_v4_peer_matches_v4_rule() {
        let list = AllowList::parse("127.0.0.1").unwrap();
        assert!(list.contains(ip("::ffff:127.0.0.1")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(AllowList::parse("not-an-ip").is_err());
        assert!(AllowList::parse("10.0.0.0/33").is_err());
        assert!(AllowList::parse("::/129").is_err());
        assert!(AllowList::parse("10.0.0.0/abc").is_err());
    }

    #[test]
    fn test_empty_list_rejects_everything() {
        let list = AllowList::parse("").unwrap();
        assert!(list.is_empty());
        assert!(!list.contains(ip("127.0.0.1")));
    }
}
