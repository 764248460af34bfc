//! ARP operation codes.

use std::fmt;

/// The `oper` field (RFC 826).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Request,
    Reply,
    Other(u16),
}

impl From<u16> for Operation {
    fn from(value: u16) -> Self {
        match value {
            1 => Operation::Request,
            2 => Operation::Reply,
            value => Operation::Other(value),
        }
    }
}

impl From<Operation> for u16 {
    fn from(value: Operation) -> Self {
        match value {
            Operation::Request => 1,
            Operation::Reply => 2,
            Operation::Other(value) => value,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operation::Request => write!(f, "REQUEST"),
            Operation::Reply => write!(f, "REPLY"),
            Operation::Other(value) => write!(f, "UNKNOWN({})", value),
        }
    }
}
