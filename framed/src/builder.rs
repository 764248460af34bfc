//! Outbound frame building.

use std::{io, net::Ipv4Addr};

use bytes::BufMut;
use etherparse::PacketBuilder;
use eui48::{MacAddress, EUI48LEN};

use dhcp_arp::{ArpPacket, ETHERTYPE_ARP};

/// The TTL of every datagram the hammer sends.
pub const DEFAULT_IP_TTL: u8 = 64;

/// The size of the Ethernet II header.
const SIZE_HEADER_ETHERNET: usize = 14;

/// Addressing of a UDP datagram carried in an Ethernet frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpAddressing {
    pub source_mac: MacAddress,
    pub destination_mac: MacAddress,
    pub source_ip: Ipv4Addr,
    pub destination_ip: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
}

fn mac_array(address: &MacAddress) -> [u8; EUI48LEN] {
    let mut array = [0u8; EUI48LEN];
    array.copy_from_slice(address.as_bytes());
    array
}

/// Constructs an Ethernet → IPv4 → UDP frame around `payload`.
///
/// The IPv4 total length, the UDP length and both checksums are computed.
///
/// # Errors
/// `io::Error` if the payload does not fit a datagram.
pub fn udp_frame(addressing: &UdpAddressing, payload: &[u8]) -> io::Result<Vec<u8>> {
    let builder = PacketBuilder::ethernet2(
        mac_array(&addressing.source_mac),
        mac_array(&addressing.destination_mac),
    )
    .ipv4(
        addressing.source_ip.octets(),
        addressing.destination_ip.octets(),
        DEFAULT_IP_TTL,
    )
    .udp(addressing.source_port, addressing.destination_port);

    let mut result = Vec::<u8>::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut result, payload)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, format!("{:?}", error)))?;
    Ok(result)
}

/// Constructs an Ethernet frame carrying an ARP packet.
///
/// # Errors
/// `io::Error` if the packet addresses do not match their declared sizes.
pub fn arp_frame(
    source: MacAddress,
    destination: MacAddress,
    packet: &ArpPacket,
) -> io::Result<Vec<u8>> {
    let mut result = Vec::with_capacity(SIZE_HEADER_ETHERNET + packet.len());
    result.put_slice(destination.as_bytes());
    result.put_slice(source.as_bytes());
    result.put_u16(ETHERTYPE_ARP);
    packet.to_bytes(&mut result)?;
    Ok(result)
}
