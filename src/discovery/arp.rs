//! ARP broadcast discovery over a pnet datalink channel
//!
//! Sends one who-has request per candidate address, then listens on the
//! channel for replies until the deadline. One round, no per-host retries.

use crate::discovery::{dedup_hosts, DiscoveryTransport};
use crate::target::AddressRange;
use crate::ScanError;
use pnet::datalink::{self, Channel, Config, NetworkInterface};
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::packet::Packet;
use pnet::util::MacAddr;
use std::collections::HashSet;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

const ETH_HDR_LEN: usize = 14;
const ARP_LEN: usize = 28;
const FRAME_LEN: usize = ETH_HDR_LEN + ARP_LEN;

/// How often the blocking receive loop wakes to re-check the deadline
const READ_TICK: Duration = Duration::from_millis(50);

/// Link-layer host discovery via broadcast ARP requests
#[derive(Debug, Clone, Default)]
pub struct ArpDiscovery;

impl ArpDiscovery {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl DiscoveryTransport for ArpDiscovery {
    async fn discover(
        &self,
        range: &AddressRange,
        timeout: Duration,
    ) -> crate::Result<Vec<Ipv4Addr>> {
        let candidates: HashSet<Ipv4Addr> = range.expand().into_iter().collect();

        // pnet datalink I/O is blocking; keep it off the async workers.
        let hosts = tokio::task::spawn_blocking(move || arp_round(candidates, timeout))
            .await
            .map_err(|e| ScanError::Transport(format!("discovery task failed: {}", e)))??;

        Ok(hosts)
    }
}

fn arp_round(candidates: HashSet<Ipv4Addr>, timeout: Duration) -> crate::Result<Vec<Ipv4Addr>> {
    let interface = usable_interface()?;
    let src_mac = interface
        .mac
        .ok_or_else(|| ScanError::Transport(format!("interface {} has no MAC", interface.name)))?;
    let src_ip = interface
        .ips
        .iter()
        .find_map(|net| match net.ip() {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| {
            ScanError::Transport(format!("interface {} has no IPv4 address", interface.name))
        })?;

    let config = Config {
        read_timeout: Some(READ_TICK),
        ..Default::default()
    };

    let (mut tx, mut rx) = match datalink::channel(&interface, config) {
        Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
        Ok(_) => {
            return Err(ScanError::Transport(format!(
                "non-ethernet channel on {}",
                interface.name
            )))
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(ScanError::Transport(format!(
                "opening channel on {}: permission denied (raw sockets require elevated privilege)",
                interface.name
            )))
        }
        Err(e) => {
            return Err(ScanError::Transport(format!(
                "opening channel on {}: {}",
                interface.name, e
            )))
        }
    };

    log::debug!(
        "broadcasting {} ARP requests on {}",
        candidates.len(),
        interface.name
    );

    for &dst_ip in &candidates {
        let frame = build_request(src_mac, src_ip, dst_ip)?;
        if let Some(Err(e)) = tx.send_to(&frame, None) {
            log::debug!("ARP request to {} not sent: {}", dst_ip, e);
        }
    }

    let deadline = Instant::now() + timeout;
    let mut responders = Vec::new();
    while Instant::now() < deadline {
        match rx.next() {
            Ok(frame) => {
                if let Some(sender) = parse_reply(frame) {
                    if candidates.contains(&sender) {
                        responders.push(sender);
                    }
                }
            }
            // Read timeouts just tick the deadline check
            Err(_) => {}
        }
    }

    Ok(dedup_hosts(responders))
}

fn usable_interface() -> crate::Result<NetworkInterface> {
    datalink::interfaces()
        .into_iter()
        .find(|iface| {
            iface.is_up()
                && !iface.is_loopback()
                && iface.mac.is_some()
                && iface.ips.iter().any(|net| net.is_ipv4())
        })
        .ok_or_else(|| ScanError::Transport("no usable network interface found".to_string()))
}

/// Build a broadcast ARP who-has frame for one candidate address
pub(crate) fn build_request(
    src_mac: MacAddr,
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
) -> crate::Result<Vec<u8>> {
    let mut buffer = [0u8; FRAME_LEN];

    let mut ethernet = MutableEthernetPacket::new(&mut buffer)
        .ok_or_else(|| ScanError::Parse("ethernet frame buffer too small".to_string()))?;
    ethernet.set_destination(MacAddr::broadcast());
    ethernet.set_source(src_mac);
    ethernet.set_ethertype(EtherTypes::Arp);

    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..FRAME_LEN])
        .ok_or_else(|| ScanError::Parse("ARP packet buffer too small".to_string()))?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(src_mac);
    arp.set_sender_proto_addr(src_ip);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(dst_ip);

    Ok(buffer.to_vec())
}

/// Extract the sender address from an ARP reply frame, if that is what it is
pub(crate) fn parse_reply(frame: &[u8]) -> Option<Ipv4Addr> {
    let ethernet = EthernetPacket::new(frame)?;
    if ethernet.get_ethertype() != EtherTypes::Arp {
        return None;
    }

    let arp = ArpPacket::new(ethernet.payload())?;
    if arp.get_operation() != ArpOperations::Reply {
        return None;
    }

    Some(arp.get_sender_proto_addr())
}
