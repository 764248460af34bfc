//! DHCP message operation code module.

use std::fmt;

/// The `op` field. Every message the hammer synthesizes is a `BootRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationCode {
    BootRequest,
    BootReply,
    Other(u8),
}

impl From<u8> for OperationCode {
    fn from(value: u8) -> Self {
        match value {
            1 => OperationCode::BootRequest,
            2 => OperationCode::BootReply,
            value => OperationCode::Other(value),
        }
    }
}

impl From<OperationCode> for u8 {
    fn from(value: OperationCode) -> Self {
        match value {
            OperationCode::BootRequest => 1,
            OperationCode::BootReply => 2,
            OperationCode::Other(value) => value,
        }
    }
}

impl fmt::Display for OperationCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OperationCode::BootRequest => write!(f, "BOOTREQUEST"),
            OperationCode::BootReply => write!(f, "BOOTREPLY"),
            OperationCode::Other(value) => write!(f, "UNKNOWN({})", value),
        }
    }
}
