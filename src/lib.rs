//! Moros - network reconnaissance and vulnerability correlation
//!
//! Discovers live hosts on a target range with a single ARP broadcast round,
//! enumerates open TCP ports with a bounded worker pool, fingerprints service
//! banners, and correlates fingerprints against the NVD advisory database.

pub mod banner;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fingerprint;
pub mod output;
pub mod report;
pub mod scanner;
pub mod target;
pub mod vuln;

// Re-export commonly used types
pub use config::ScanConfig;
pub use discovery::{ArpDiscovery, DiscoveryTransport};
pub use error::ScanError;
pub use fingerprint::{FingerprintParser, ServiceFingerprint};
pub use report::{HostReport, PortReport, ScanReport};
pub use scanner::{PortScanner, ScanEngine};
pub use target::AddressRange;
pub use vuln::{NvdClient, VulnDatabase, VulnerabilityRecord};

pub type Result<T> = std::result::Result<T, ScanError>;
