//! Scan orchestration: discovery, port scan, banner, fingerprint, lookup
//!
//! The pipeline is linear within a host: discovery completes before any port
//! scanning, and a host's port scan completes before its banners are read.
//! Per-port inspection (banner + fingerprint + advisory lookup) runs
//! concurrently across that host's open ports, each on its own connection.

use crate::banner::grab_banner;
use crate::config::ScanConfig;
use crate::discovery::DiscoveryTransport;
use crate::fingerprint::FingerprintParser;
use crate::report::{HostReport, PortReport, ScanReport};
use crate::scanner::PortScanner;
use crate::target::AddressRange;
use crate::vuln::{correlate, LookupOutcome, VulnDatabase};
use futures::stream::{self, StreamExt};
use std::net::Ipv4Addr;

/// Main scan engine, generic over the injected discovery transport and
/// vulnerability database
pub struct ScanEngine<D, V> {
    config: ScanConfig,
    discovery: D,
    vuln_db: V,
    parser: FingerprintParser,
}

impl<D, V> ScanEngine<D, V>
where
    D: DiscoveryTransport,
    V: VulnDatabase,
{
    /// Create a new engine; configuration problems abort here, before any
    /// scanning begins.
    pub fn new(config: ScanConfig, discovery: D, vuln_db: V) -> crate::Result<Self> {
        config.validate()?;
        // Fail on a bad range up front rather than after discovery setup
        AddressRange::parse(&config.target)?;

        Ok(Self {
            config,
            discovery,
            vuln_db,
            parser: FingerprintParser::default(),
        })
    }

    /// Replace the default fingerprint alias table
    pub fn with_fingerprint_parser(mut self, parser: FingerprintParser) -> Self {
        self.parser = parser;
        self
    }

    /// Run the full pipeline and assemble the report
    pub async fn scan(&self) -> crate::Result<ScanReport> {
        let range = AddressRange::parse(&self.config.target)?;

        log::info!(
            "discovering hosts in {} ({} candidates)",
            range.cidr(),
            range.size()
        );
        let hosts = self
            .discovery
            .discover(&range, self.config.discovery_timeout_duration())
            .await?;
        log::info!("{} live hosts", hosts.len());

        let scanner = PortScanner::new(self.config.workers, self.config.connect_timeout_duration());

        let mut report = ScanReport::new(range.cidr());
        for host in hosts {
            report.push_host(self.scan_host(&scanner, host).await);
        }

        report.normalize();
        Ok(report)
    }

    /// Full port scan, then concurrent per-port inspection. A host with no
    /// open ports still gets a report entry.
    async fn scan_host(&self, scanner: &PortScanner, host: Ipv4Addr) -> HostReport {
        log::info!("scanning {} ({} ports)", host, self.config.ports.len());
        let open = scanner.scan(host, &self.config.ports).await;

        if open.is_empty() {
            log::debug!("{}: no open ports", host);
            return HostReport::new(host);
        }

        let open_ports = stream::iter(open)
            .map(|port| self.inspect_port(host, port))
            .buffer_unordered(self.config.workers)
            .collect::<Vec<_>>()
            .await;

        HostReport { addr: host, open_ports }
    }

    async fn inspect_port(&self, host: Ipv4Addr, port: u16) -> PortReport {
        let banner = grab_banner(host, port, self.config.banner_timeout_duration()).await;
        let fingerprint = banner.as_deref().and_then(|b| self.parser.parse(b));

        let outcome = if self.config.lookup_vulns {
            correlate(&self.vuln_db, fingerprint.as_ref(), self.config.vuln_limit).await
        } else {
            LookupOutcome::Skipped
        };

        PortReport {
            port,
            banner,
            fingerprint,
            advisories: outcome.advisories().to_vec(),
            lookup_warning: outcome.warning().map(str::to_string),
        }
    }
}
