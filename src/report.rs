//! Scan report data model
//!
//! The report is the only artifact surfaced to the caller. It is scan-scoped
//! and carries every non-fatal condition explicitly: an open port with no
//! banner, a banner with no fingerprint, a fingerprint whose lookup failed.

use crate::fingerprint::ServiceFingerprint;
use crate::vuln::VulnerabilityRecord;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One open port with everything learned about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortReport {
    pub port: u16,
    pub banner: Option<String>,
    pub fingerprint: Option<ServiceFingerprint>,
    pub advisories: Vec<VulnerabilityRecord>,
    /// Reason the advisory lookup failed, when it did
    pub lookup_warning: Option<String>,
}

/// One scanned host. An empty `open_ports` list means "scanned, nothing
/// open", which is distinct from the host not appearing at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostReport {
    pub addr: Ipv4Addr,
    pub open_ports: Vec<PortReport>,
}

impl HostReport {
    pub fn new(addr: Ipv4Addr) -> Self {
        Self {
            addr,
            open_ports: Vec::new(),
        }
    }
}

/// Aggregate result of one scan invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: String,
    pub hosts: Vec<HostReport>,
}

impl ScanReport {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            hosts: Vec::new(),
        }
    }

    pub fn push_host(&mut self, host: HostReport) {
        self.hosts.push(host);
    }

    /// Sort hosts and ports so identical scans compare equal
    pub fn normalize(&mut self) {
        for host in &mut self.hosts {
            host.open_ports.sort_by_key(|p| p.port);
        }
        self.hosts.sort_by_key(|h| h.addr);
    }

    pub fn total_open_ports(&self) -> usize {
        self.hosts.iter().map(|h| h.open_ports.len()).sum()
    }

    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::ScanError::Parse(format!("report serialization failed: {}", e)))
    }
}
