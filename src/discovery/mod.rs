//! Host discovery over an injected link-layer transport
//!
//! Discovery is a single broadcast-style round: probe the whole candidate
//! range at once, then collect responders until the timeout elapses. The
//! transport is a trait so tests (and alternative probes) can be swapped in.

pub mod arp;

use crate::target::AddressRange;
use std::net::Ipv4Addr;
use std::time::Duration;

pub use arp::ArpDiscovery;

/// Capability to enumerate live addresses on a range.
///
/// Implementations must complete in time proportional to the timeout, not to
/// the candidate count, and must return `Ok(vec![])` when nothing responds.
/// Only a transport that cannot be initialized at all (missing privilege, no
/// usable interface) is an error.
#[async_trait::async_trait]
pub trait DiscoveryTransport: Send + Sync {
    async fn discover(
        &self,
        range: &AddressRange,
        timeout: Duration,
    ) -> crate::Result<Vec<Ipv4Addr>>;
}

/// Deduplicate and order a respondent set for stable reporting
pub(crate) fn dedup_hosts(mut hosts: Vec<Ipv4Addr>) -> Vec<Ipv4Addr> {
    hosts.sort_unstable();
    hosts.dedup();
    hosts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_hosts_sorts_and_removes_duplicates() {
        let a = Ipv4Addr::new(10, 0, 0, 1);
        let b = Ipv4Addr::new(10, 0, 0, 2);
        assert_eq!(dedup_hosts(vec![b, a, b, a]), vec![a, b]);
    }

    #[test]
    fn dedup_hosts_handles_empty_set() {
        assert!(dedup_hosts(Vec::new()).is_empty());
    }
}
