//! Inbound frame demultiplexing.

use std::{cmp, fmt, io, net::Ipv4Addr};

use etherparse::{Ethernet2HeaderSlice, Ipv4HeaderSlice, UdpHeaderSlice};
use eui48::MacAddress;

use dhcp_arp::{ArpPacket, ETHERTYPE_ARP};
use dhcp_protocol::{Message, DHCP_PORT_CLIENT, DHCP_PORT_SERVER};

/// The IPv4 EtherType.
pub const ETHERTYPE_IPV4: u16 = 0x0800;

/// The UDP IP protocol number.
pub const IP_PROTOCOL_UDP: u8 = 17;

/// The size of the UDP header.
const SIZE_HEADER_UDP: usize = 8;

/// The Ethernet II header of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ethernet {
    pub source: MacAddress,
    pub destination: MacAddress,
    pub ether_type: u16,
}

/// The IPv4 header fields the hammer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4 {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

/// The UDP header fields the hammer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Udp {
    pub source_port: u16,
    pub destination_port: u16,
}

/// A received frame with its parsed layers.
#[derive(Debug, Clone)]
pub struct Frame {
    pub ethernet: Ethernet,
    pub ipv4: Option<Ipv4>,
    pub udp: Option<Udp>,
    pub dhcp: Option<Message>,
    pub arp: Option<ArpPacket>,
}

fn invalid<E: fmt::Debug>(layer: &str, error: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("{}: {:?}", layer, error))
}

impl Frame {
    /// Splits an Ethernet II frame into layers.
    ///
    /// UDP datagrams from or to the DHCP ports are decoded as DHCP messages,
    /// frames with the ARP EtherType as ARP packets. Anything else keeps only
    /// the layers it has.
    ///
    /// # Errors
    /// `io::Error` if a recognized layer is truncated or malformed.
    pub fn parse(data: &[u8]) -> io::Result<Self> {
        let header =
            Ethernet2HeaderSlice::from_slice(data).map_err(|error| invalid("Ethernet", error))?;
        let mut frame = Frame {
            ethernet: Ethernet {
                source: MacAddress::new(header.source()),
                destination: MacAddress::new(header.destination()),
                ether_type: header.ether_type(),
            },
            ipv4: None,
            udp: None,
            dhcp: None,
            arp: None,
        };
        let rest = &data[header.slice().len()..];

        match frame.ethernet.ether_type {
            ETHERTYPE_IPV4 => frame.parse_ipv4(rest)?,
            ETHERTYPE_ARP => frame.arp = Some(ArpPacket::from_bytes(rest)?),
            _ => {}
        }
        Ok(frame)
    }

    fn parse_ipv4(&mut self, data: &[u8]) -> io::Result<()> {
        let header = Ipv4HeaderSlice::from_slice(data).map_err(|error| invalid("IPv4", error))?;
        self.ipv4 = Some(Ipv4 {
            source: header.source_addr(),
            destination: header.destination_addr(),
        });
        if header.protocol() != IP_PROTOCOL_UDP {
            return Ok(());
        }

        // Ethernet padding may follow the datagram.
        let end = cmp::min(header.total_len() as usize, data.len());
        let start = cmp::min(header.slice().len(), end);
        let datagram = &data[start..end];

        let header = UdpHeaderSlice::from_slice(datagram).map_err(|error| invalid("UDP", error))?;
        let udp = Udp {
            source_port: header.source_port(),
            destination_port: header.destination_port(),
        };
        self.udp = Some(udp);

        let is_dhcp = [udp.source_port, udp.destination_port]
            .iter()
            .any(|port| *port == DHCP_PORT_SERVER || *port == DHCP_PORT_CLIENT);
        if is_dhcp {
            let end = cmp::min(
                cmp::max(header.length() as usize, SIZE_HEADER_UDP),
                datagram.len(),
            );
            self.dhcp = Some(Message::from_bytes(&datagram[SIZE_HEADER_UDP..end])?);
        }
        Ok(())
    }
}
