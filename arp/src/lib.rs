//! The ARP packet codec used for lease defense.

mod operation;
mod packet;

pub use self::{
    operation::Operation,
    packet::{ArpPacket, ETHERTYPE_ARP, HARDWARE_TYPE_ETHERNET, PROTOCOL_TYPE_IPV4},
};
