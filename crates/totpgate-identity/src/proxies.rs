//! The set of networks whose forwarding headers are trusted.

use std::net::IpAddr;

use ipnetwork::IpNetwork;

use crate::IdentityError;

/// Ordered, immutable list of trusted proxy ranges.
///
/// An empty set (the default) trusts nobody: every request is identified by
/// its direct peer address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedProxySet {
    networks: Vec<IpNetwork>,
}

impl TrustedProxySet {
    /// Parses CIDR strings such as `"10.0.0.0/8"` or `"fd00::/8"`.
    ///
    /// A bare address (`"192.168.1.10"`) is accepted as a single-host
    /// range. Surrounding whitespace is ignored.
    ///
    /// # Errors
    /// Returns [`IdentityError::InvalidCidr`] for the first entry that does
    /// not parse; nothing is partially built.
    pub fn parse<I, S>(cidrs: I) -> Result<Self, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let networks = cidrs
            .into_iter()
            .map(|cidr| {
                let cidr = cidr.as_ref().trim();
                cidr.parse::<IpNetwork>()
                    .map_err(|source| IdentityError::InvalidCidr {
                        cidr: cidr.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { networks })
    }

    /// Returns `true` if `ip` falls inside any trusted range.
    ///
    /// IPv4-mapped IPv6 addresses (`::ffff:10.0.0.5`, as seen on a
    /// dual-stack listener) are matched as their IPv4 form.
    pub fn contains(&self, ip: IpAddr) -> bool {
        let ip = ip.to_canonical();
        self.networks.iter().any(|network| network.contains(ip))
    }

    /// The parsed ranges, in configuration order.
    pub fn networks(&self) -> &[IpNetwork] {
        &self.networks
    }

    /// Number of configured ranges.
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// `true` when no proxy is trusted.
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
