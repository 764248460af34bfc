//! DHCP option overload module.

/// DHCP option overload values (RFC 2132 §9.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overload {
    File,
    Sname,
    Both,
    Undefined,
}

impl Overload {
    /// Whether the `file` field carries options.
    pub fn file(self) -> bool {
        match self {
            Overload::File | Overload::Both => true,
            _ => false,
        }
    }

    /// Whether the `sname` field carries options.
    pub fn sname(self) -> bool {
        match self {
            Overload::Sname | Overload::Both => true,
            _ => false,
        }
    }
}

impl From<u8> for Overload {
    fn from(value: u8) -> Self {
        use self::Overload::*;
        match value {
            1 => File,
            2 => Sname,
            3 => Both,

            _ => Undefined,
        }
    }
}
