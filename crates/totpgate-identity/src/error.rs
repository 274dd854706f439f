/// Errors that can occur while building the identity layer.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// A trusted proxy range is not valid CIDR notation.
    #[error("invalid CIDR in trustedProxies ({cidr}): {source}")]
    InvalidCidr {
        cidr: String,
        #[source]
        source: ipnetwork::IpNetworkError,
    },
}
