//! ARP packet structure, parsing and serialization.

use std::{io, mem, net::Ipv4Addr};

use bytes::{Buf, BufMut};
use eui48::{MacAddress, EUI48LEN};

use crate::operation::Operation;

/// The ARP EtherType.
pub const ETHERTYPE_ARP: u16 = 0x0806;

/// The `htype` of Ethernet.
pub const HARDWARE_TYPE_ETHERNET: u16 = 1;

/// The `ptype` of IPv4.
pub const PROTOCOL_TYPE_IPV4: u16 = 0x0800;

/// `htype`, `ptype`, `hlen`, `plen` and `oper`.
const SIZE_HEADER: usize = 8;

/// An ARP packet.
///
/// Addresses are kept raw so that a reply can mirror whatever sizes the
/// request declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpPacket {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub hardware_address_length: u8,
    pub protocol_address_length: u8,
    pub operation: Operation,
    pub sender_hardware_address: Vec<u8>,
    pub sender_protocol_address: Vec<u8>,
    pub target_hardware_address: Vec<u8>,
    pub target_protocol_address: Vec<u8>,
}

impl ArpPacket {
    /// An Ethernet/IPv4 request asking who has `target`.
    pub fn request(sender: MacAddress, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        ArpPacket {
            hardware_type: HARDWARE_TYPE_ETHERNET,
            protocol_type: PROTOCOL_TYPE_IPV4,
            hardware_address_length: EUI48LEN as u8,
            protocol_address_length: mem::size_of::<u32>() as u8,
            operation: Operation::Request,
            sender_hardware_address: sender.as_bytes().to_vec(),
            sender_protocol_address: sender_ip.octets().to_vec(),
            target_hardware_address: vec![0u8; EUI48LEN],
            target_protocol_address: target_ip.octets().to_vec(),
        }
    }

    /// The reply to this packet claiming its target protocol address for `owner`.
    ///
    /// The types and address sizes are copied from the request, the request
    /// sender becomes the target.
    pub fn reply(&self, owner: MacAddress) -> Self {
        ArpPacket {
            hardware_type: self.hardware_type,
            protocol_type: self.protocol_type,
            hardware_address_length: self.hardware_address_length,
            protocol_address_length: self.protocol_address_length,
            operation: Operation::Reply,
            sender_hardware_address: owner.as_bytes().to_vec(),
            sender_protocol_address: self.target_protocol_address.clone(),
            target_hardware_address: self.sender_hardware_address.clone(),
            target_protocol_address: self.sender_protocol_address.clone(),
        }
    }

    /// The sender hardware address if it is a MAC-48 one.
    pub fn sender_mac(&self) -> Option<MacAddress> {
        MacAddress::from_bytes(&self.sender_hardware_address).ok()
    }

    /// The target protocol address if it is an IPv4 one.
    pub fn target_ipv4(&self) -> Option<Ipv4Addr> {
        Self::ipv4(&self.target_protocol_address)
    }

    /// The sender protocol address if it is an IPv4 one.
    pub fn sender_ipv4(&self) -> Option<Ipv4Addr> {
        Self::ipv4(&self.sender_protocol_address)
    }

    fn ipv4(address: &[u8]) -> Option<Ipv4Addr> {
        match address {
            [a, b, c, d] => Some(Ipv4Addr::new(*a, *b, *c, *d)),
            _ => None,
        }
    }

    /// The size of the serialized packet.
    pub fn len(&self) -> usize {
        SIZE_HEADER
            + 2 * self.hardware_address_length as usize
            + 2 * self.protocol_address_length as usize
    }

    /// ARP packet deserialization.
    ///
    /// Trailing bytes (Ethernet padding) are ignored.
    ///
    /// # Errors
    /// `io::Error` if the packet is shorter than its address sizes require.
    pub fn from_bytes(src: &[u8]) -> io::Result<Self> {
        let mut cursor = src;
        if cursor.remaining() < SIZE_HEADER {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "ARP header is truncated",
            ));
        }

        let hardware_type = cursor.get_u16();
        let protocol_type = cursor.get_u16();
        let hardware_address_length = cursor.get_u8();
        let protocol_address_length = cursor.get_u8();
        let operation = Operation::from(cursor.get_u16());

        let hlen = hardware_address_length as usize;
        let plen = protocol_address_length as usize;
        if cursor.remaining() < 2 * (hlen + plen) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "ARP addresses are truncated",
            ));
        }

        let mut take = |len: usize| {
            let value = cursor[..len].to_vec();
            cursor.advance(len);
            value
        };
        let sender_hardware_address = take(hlen);
        let sender_protocol_address = take(plen);
        let target_hardware_address = take(hlen);
        let target_protocol_address = take(plen);

        Ok(ArpPacket {
            hardware_type,
            protocol_type,
            hardware_address_length,
            protocol_address_length,
            operation,
            sender_hardware_address,
            sender_protocol_address,
            target_hardware_address,
            target_protocol_address,
        })
    }

    /// ARP packet serialization.
    ///
    /// # Errors
    /// `io::Error` if an address does not match its declared size.
    pub fn to_bytes<B: BufMut>(&self, dst: &mut B) -> io::Result<usize> {
        let hlen = self.hardware_address_length as usize;
        let plen = self.protocol_address_length as usize;
        if self.sender_hardware_address.len() != hlen
            || self.target_hardware_address.len() != hlen
            || self.sender_protocol_address.len() != plen
            || self.target_protocol_address.len() != plen
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "ARP address does not match its declared length",
            ));
        }
        if dst.remaining_mut() < self.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Buffer is too small",
            ));
        }

        dst.put_u16(self.hardware_type);
        dst.put_u16(self.protocol_type);
        dst.put_u8(self.hardware_address_length);
        dst.put_u8(self.protocol_address_length);
        dst.put_u16(self.operation.into());
        dst.put_slice(&self.sender_hardware_address);
        dst.put_slice(&self.sender_protocol_address);
        dst.put_slice(&self.target_hardware_address);
        dst.put_slice(&self.target_protocol_address);
        Ok(self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASKER: [u8; 6] = [0x00, 0xe0, 0x4c, 0x60, 0x71, 0x6a];
    const OWNER: [u8; 6] = [0x00, 0x0c, 0x29, 0x13, 0x0e, 0x37];

    fn request() -> ArpPacket {
        ArpPacket::request(
            MacAddress::new(ASKER),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 5),
        )
    }

    #[test]
    fn parses_a_request_with_ethernet_padding() {
        let mut buf = Vec::new();
        request().to_bytes(&mut buf).unwrap();
        buf.extend_from_slice(&[0u8; 18]);

        let packet = ArpPacket::from_bytes(&buf).unwrap();
        assert_eq!(packet.operation, Operation::Request);
        assert_eq!(packet.target_ipv4(), Some(Ipv4Addr::new(10, 0, 0, 5)));
        assert_eq!(packet.sender_mac(), Some(MacAddress::new(ASKER)));
    }

    #[test]
    fn reply_swaps_sender_and_target() {
        let reply = request().reply(MacAddress::new(OWNER));

        assert_eq!(reply.operation, Operation::Reply);
        assert_eq!(reply.sender_hardware_address, OWNER.to_vec());
        assert_eq!(reply.sender_ipv4(), Some(Ipv4Addr::new(10, 0, 0, 5)));
        assert_eq!(reply.target_hardware_address, ASKER.to_vec());
        assert_eq!(reply.target_ipv4(), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(reply.hardware_type, HARDWARE_TYPE_ETHERNET);
        assert_eq!(reply.protocol_type, PROTOCOL_TYPE_IPV4);
    }

    #[test]
    fn reply_wire_layout() {
        let mut buf = Vec::new();
        let amount = request().reply(MacAddress::new(OWNER)).to_bytes(&mut buf).unwrap();

        assert_eq!(amount, 28);
        assert_eq!(&buf[..8], &[0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x02]);
        assert_eq!(&buf[8..14], &OWNER);
        assert_eq!(&buf[14..18], &[10, 0, 0, 5]);
    }

    #[test]
    fn truncated_packet_is_an_error() {
        let mut buf = Vec::new();
        request().to_bytes(&mut buf).unwrap();

        assert!(ArpPacket::from_bytes(&buf[..20]).is_err());
    }

    #[test]
    fn mismatched_address_length_is_an_error() {
        let mut packet = request();
        packet.hardware_address_length = 8;

        assert!(packet.to_bytes(&mut Vec::new()).is_err());
    }
}
