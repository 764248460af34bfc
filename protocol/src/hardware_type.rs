//! DHCP message hardware type module.

use std::fmt;

/// The `htype` field (RFC 1700 ARP hardware types).
///
/// The hammer only speaks Ethernet, anything else is kept as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareType {
    Ethernet,
    Other(u8),
}

impl From<u8> for HardwareType {
    fn from(value: u8) -> Self {
        match value {
            1 => HardwareType::Ethernet,
            value => HardwareType::Other(value),
        }
    }
}

impl From<HardwareType> for u8 {
    fn from(value: HardwareType) -> Self {
        match value {
            HardwareType::Ethernet => 1,
            HardwareType::Other(value) => value,
        }
    }
}

impl fmt::Display for HardwareType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HardwareType::Ethernet => write!(f, "Ethernet"),
            HardwareType::Other(value) => write!(f, "UNKNOWN({})", value),
        }
    }
}
