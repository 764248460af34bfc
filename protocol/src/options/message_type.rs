//! DHCP message type module.

use std::fmt;

/// DHCP message type (RFC 2131 only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    DhcpDiscover,
    DhcpOffer,
    DhcpRequest,
    DhcpDecline,
    DhcpAck,
    DhcpNak,
    DhcpRelease,
    DhcpInform,
    Undefined(u8),
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::MessageType::*;
        match self {
            DhcpDiscover => write!(f, "DHCPDISCOVER"),
            DhcpOffer => write!(f, "DHCPOFFER"),
            DhcpRequest => write!(f, "DHCPREQUEST"),
            DhcpDecline => write!(f, "DHCPDECLINE"),
            DhcpAck => write!(f, "DHCPACK"),
            DhcpNak => write!(f, "DHCPNAK"),
            DhcpRelease => write!(f, "DHCPRELEASE"),
            DhcpInform => write!(f, "DHCPINFORM"),

            Undefined(value) => write!(f, "UNDEFINED({})", value),
        }
    }
}

impl From<u8> for MessageType {
    fn from(value: u8) -> Self {
        use self::MessageType::*;
        match value {
            1 => DhcpDiscover,
            2 => DhcpOffer,
            3 => DhcpRequest,
            4 => DhcpDecline,
            5 => DhcpAck,
            6 => DhcpNak,
            7 => DhcpRelease,
            8 => DhcpInform,

            value => Undefined(value),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        use self::MessageType::*;
        match value {
            DhcpDiscover => 1,
            DhcpOffer => 2,
            DhcpRequest => 3,
            DhcpDecline => 4,
            DhcpAck => 5,
            DhcpNak => 6,
            DhcpRelease => 7,
            DhcpInform => 8,

            Undefined(value) => value,
        }
    }
}
