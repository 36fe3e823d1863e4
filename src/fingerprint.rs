//! Banner fingerprinting: extract a normalized (product, version) pair
//!
//! A single best-effort pattern covering the common "product separator
//! version" banner shape. Unusual formats are accepted as false negatives;
//! the pattern is deliberately not a multi-signature database.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // product, then a space/slash/underscore separator, then a dotted
    // version with one or two dot components. Trailing qualifiers like the
    // "p1" in OpenSSH_4.7p1 fall outside the version capture.
    static ref BANNER_PATTERN: Regex =
        Regex::new(r"([A-Za-z0-9._-]+)[ /_]([0-9]+\.[0-9]+(?:\.[0-9]+)?)").unwrap();
}

/// Normalized service identity parsed from a banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFingerprint {
    pub product: String,
    pub version: String,
}

/// A product-name correction: any product containing `contains` is reported
/// as `canonical` (e.g. "ssh" → "openssh")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub contains: String,
    pub canonical: String,
}

/// Banner parser with a configurable alias table
#[derive(Debug, Clone)]
pub struct FingerprintParser {
    aliases: Vec<AliasRule>,
}

impl Default for FingerprintParser {
    fn default() -> Self {
        Self {
            aliases: vec![AliasRule {
                contains: "ssh".to_string(),
                canonical: "openssh".to_string(),
            }],
        }
    }
}

impl FingerprintParser {
    pub fn new(aliases: Vec<AliasRule>) -> Self {
        Self { aliases }
    }

    /// Append an alias correction to the table
    pub fn with_alias(mut self, contains: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.push(AliasRule {
            contains: contains.into(),
            canonical: canonical.into(),
        });
        self
    }

    /// Parse a banner into a fingerprint, or `None` when it does not match.
    /// The product is lowercased with separator characters stripped, then
    /// alias-corrected; the version is the captured dotted number.
    pub fn parse(&self, banner: &str) -> Option<ServiceFingerprint> {
        if banner.is_empty() {
            return None;
        }

        let caps = BANNER_PATTERN.captures(banner)?;
        let mut product = caps[1].to_lowercase().replace(&['-', '_'][..], "");
        let version = caps[2].to_string();

        for rule in &self.aliases {
            if product.contains(&rule.contains) {
                product = rule.canonical.clone();
                break;
            }
        }

        Some(ServiceFingerprint { product, version })
    }
}
