//! DHCP options module.

mod message_type;
mod option_tag;
mod overload;
mod table;

pub use self::{
    message_type::MessageType,
    option_tag::OptionTag,
    overload::Overload,
    table::OptionTable,
};

use std::net::Ipv4Addr;

/// A single option exactly as it appeared on the wire (minus the length octet).
///
/// [RFC 2132](https://tools.ietf.org/html/rfc2132)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOption {
    pub tag: u8,
    pub data: Vec<u8>,
}

impl RawOption {
    pub fn new(tag: OptionTag, data: Vec<u8>) -> Self {
        RawOption {
            tag: tag.into(),
            data,
        }
    }

    /// The `DHCP Message Type` option (53).
    pub fn message_type(value: MessageType) -> Self {
        Self::new(OptionTag::DhcpMessageType, vec![value.into()])
    }

    /// The `Requested IP Address` option (50).
    pub fn address_request(value: Ipv4Addr) -> Self {
        Self::new(OptionTag::AddressRequest, value.octets().to_vec())
    }

    /// The `Server Identifier` option (54) with the data echoed verbatim.
    pub fn dhcp_server_id(data: &[u8]) -> Self {
        Self::new(OptionTag::DhcpServerId, data.to_vec())
    }

    /// The `End` option. Its data is never written.
    pub fn end() -> Self {
        Self::new(OptionTag::End, Vec::new())
    }
}
