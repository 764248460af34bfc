//! DHCP option tags module.

use std::fmt;

/// The option codes the hammer reads or writes.
///
/// Everything else travels through the option table by its raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionTag {
    Pad,
    AddressRequest,
    Overload,
    DhcpMessageType,
    DhcpServerId,
    End,
    Unknown(u8),
}

impl From<u8> for OptionTag {
    fn from(value: u8) -> Self {
        use self::OptionTag::*;
        match value {
            0 => Pad,
            50 => AddressRequest,
            52 => Overload,
            53 => DhcpMessageType,
            54 => DhcpServerId,
            255 => End,

            value => Unknown(value),
        }
    }
}

impl From<OptionTag> for u8 {
    fn from(value: OptionTag) -> Self {
        use self::OptionTag::*;
        match value {
            Pad => 0,
            AddressRequest => 50,
            Overload => 52,
            DhcpMessageType => 53,
            DhcpServerId => 54,
            End => 255,

            Unknown(value) => value,
        }
    }
}

impl fmt::Display for OptionTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::OptionTag::*;
        let name = match self {
            Pad => "Pad",
            AddressRequest => "AddressRequest",
            Overload => "Overload",
            DhcpMessageType => "DhcpMessageType",
            DhcpServerId => "DhcpServerId",
            End => "End",
            Unknown(_) => "Unknown",
        };
        write!(f, "[{:03}] {}", u8::from(*self), name)
    }
}
