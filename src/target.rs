//! Address range expansion for scan targets
//!
//! Accepts IPv4 CIDR notation or a bare address and expands it into the
//! concrete candidate set handed to host discovery.

use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Longest network (smallest prefix) the expander will materialize.
/// A /16 is already 65 536 candidates; anything larger is a misconfiguration.
const MIN_PREFIX: u8 = 16;

/// A parsed target range: a CIDR block or a single address treated as /32
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRange {
    network: Ipv4Network,
}

impl AddressRange {
    /// Parse a CIDR string or bare IPv4 address. Host bits set in the CIDR
    /// base are masked off, so `10.0.0.7/30` means the `10.0.0.4/30` block.
    pub fn parse(input: &str) -> crate::Result<Self> {
        let input = input.trim();

        let network = if input.contains('/') {
            let parsed = Ipv4Network::from_str(input).map_err(|e| {
                crate::ScanError::InvalidTarget(format!("invalid CIDR '{}': {}", input, e))
            })?;
            Ipv4Network::new(parsed.network(), parsed.prefix()).map_err(|e| {
                crate::ScanError::InvalidTarget(format!("invalid CIDR '{}': {}", input, e))
            })?
        } else {
            let addr = Ipv4Addr::from_str(input).map_err(|e| {
                crate::ScanError::InvalidTarget(format!("invalid address '{}': {}", input, e))
            })?;
            Ipv4Network::new(addr, 32)
                .map_err(|e| crate::ScanError::InvalidTarget(e.to_string()))?
        };

        if network.prefix() < MIN_PREFIX {
            return Err(crate::ScanError::InvalidTarget(format!(
                "range {} too large (smallest allowed prefix is /{})",
                network, MIN_PREFIX
            )));
        }

        Ok(Self { network })
    }

    /// Expand into every address of the block, in order, without duplicates
    pub fn expand(&self) -> Vec<Ipv4Addr> {
        self.network.iter().collect()
    }

    /// Number of addresses the range expands to
    pub fn size(&self) -> u32 {
        self.network.size()
    }

    /// Canonical CIDR rendering, used as the discovery probe target
    pub fn cidr(&self) -> String {
        self.network.to_string()
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.network.contains(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn bare_address_expands_to_itself() {
        let range = AddressRange::parse("192.168.1.5").unwrap();
        assert_eq!(range.size(), 1);
        assert_eq!(range.expand(), vec![Ipv4Addr::new(192, 168, 1, 5)]);
        assert_eq!(range.cidr(), "192.168.1.5/32");
    }

    #[test]
    fn slash_30_expands_to_four_addresses() {
        let range = AddressRange::parse("10.0.0.0/30").unwrap();
        let addrs = range.expand();
        assert_eq!(addrs.len(), 4);
        assert_eq!(addrs[0], Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(addrs[3], Ipv4Addr::new(10, 0, 0, 3));
    }

    #[test]
    fn host_bits_are_masked_off() {
        let range = AddressRange::parse("192.168.1.77/24").unwrap();
        assert_eq!(range.cidr(), "192.168.1.0/24");
        assert_eq!(range.size(), 256);
    }

    #[test]
    fn invalid_input_is_a_configuration_error() {
        for input in ["", "nope", "10.0.0.0/33", "10.0.0/24", "300.1.1.1"] {
            assert!(
                matches!(
                    AddressRange::parse(input),
                    Err(crate::ScanError::InvalidTarget(_))
                ),
                "expected InvalidTarget for {:?}",
                input
            );
        }
    }

    #[test]
    fn oversized_range_is_rejected() {
        assert!(matches!(
            AddressRange::parse("10.0.0.0/8"),
            Err(crate::ScanError::InvalidTarget(_))
        ));
    }

    proptest! {
        #[test]
        fn expansion_count_matches_prefix(base in any::<u32>(), prefix in 20u8..=32) {
            let addr = Ipv4Addr::from(base);
            let range = AddressRange::parse(&format!("{}/{}", addr, prefix)).unwrap();
            let addrs = range.expand();

            prop_assert_eq!(addrs.len() as u64, 1u64 << (32 - prefix));

            let unique: HashSet<_> = addrs.iter().copied().collect();
            prop_assert_eq!(unique.len(), addrs.len());
            prop_assert!(addrs.iter().all(|a| range.contains(*a)));
        }
    }
}
