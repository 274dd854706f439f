//! Turning a connection + headers into a client identity string.

use std::net::{IpAddr, SocketAddr};

use crate::TrustedProxySet;

/// Resolves the logical client address of a request.
///
/// Precedence, which is a security decision and must not be reordered:
///
/// 1. Peer address unparseable → the port-stripped raw string, verbatim.
/// 2. Peer not in `trusted` → the peer address. Headers are ignored, so a
///    client cannot claim to be someone else.
/// 3. Peer trusted → first entry of `X-Forwarded-For` (the original client
///    as recorded by the nearest trusted hop), if non-empty.
/// 4. Peer trusted → `X-Real-IP`, if non-empty.
/// 5. Otherwise the peer address.
pub fn resolve(
    raw_peer: &str,
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    trusted: &TrustedProxySet,
) -> String {
    let host = peer_host(raw_peer);
    let Ok(peer) = host.parse::<IpAddr>() else {
        tracing::debug!(peer = %raw_peer, "failed to parse peer address, using it verbatim");
        return host.to_string();
    };
    // A dual-stack listener reports IPv4 clients as `::ffff:a.b.c.d`.
    let peer = peer.to_canonical();

    if !trusted.contains(peer) {
        return peer.to_string();
    }

    let forwarded = forwarded_for
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|client| !client.is_empty());
    if let Some(client) = forwarded {
        tracing::trace!(%client, proxy = %peer, "using X-Forwarded-For from trusted proxy");
        return client.to_string();
    }

    let real = real_ip.map(str::trim).filter(|client| !client.is_empty());
    if let Some(client) = real {
        tracing::trace!(%client, proxy = %peer, "using X-Real-IP from trusted proxy");
        return client.to_string();
    }

    peer.to_string()
}

/// Strips the port from a peer address.
///
/// Handles `1.2.3.4:80`, `[::1]:80`, bare `1.2.3.4` and bare `::1`.
/// Anything else is split at the last `:` (or returned whole if there is
/// none), which is what a `host:port` string looks like.
pub fn peer_host(raw: &str) -> &str {
    let raw = raw.trim();

    if raw.parse::<SocketAddr>().is_ok() {
        // Either "v4:port" or "[v6]:port".
        let (host, _port) = raw.rsplit_once(':').unwrap_or((raw, ""));
        return host.trim_start_matches('[').trim_end_matches(']');
    }
    if raw.parse::<IpAddr>().is_ok() {
        return raw;
    }

    match raw.rsplit_once(':') {
        Some((host, _port)) => host.trim_start_matches('[').trim_end_matches(']'),
        None => raw,
    }
}
