//! Ethernet framing of DHCP and ARP traffic.
//!
//! `Frame` splits a captured frame into the layers the hammer reacts to,
//! the builders go the other way with lengths and checksums filled in.

mod builder;
mod frame;

pub use self::{
    builder::{arp_frame, udp_frame, UdpAddressing, DEFAULT_IP_TTL},
    frame::{Ethernet, Frame, Ipv4, Udp, ETHERTYPE_IPV4, IP_PROTOCOL_UDP},
};
