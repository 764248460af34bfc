//! Statistic kinds emitted by the engine.

use std::fmt;

/// One countable protocol event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatValue {
    OfferReceived,
    AckReceived,
    NakReceived,
    RequestSent,
    DeclineSent,
    ReleaseSent,
    InfoSent,
    ArpRequestReceived,
    ArpReplySent,
}

impl StatValue {
    /// The number of statistic kinds.
    pub const COUNT: usize = 9;

    pub const ALL: [StatValue; StatValue::COUNT] = [
        StatValue::OfferReceived,
        StatValue::AckReceived,
        StatValue::NakReceived,
        StatValue::RequestSent,
        StatValue::DeclineSent,
        StatValue::ReleaseSent,
        StatValue::InfoSent,
        StatValue::ArpRequestReceived,
        StatValue::ArpReplySent,
    ];

    /// A dense index into `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::StatValue::*;
        match self {
            OfferReceived => write!(f, "DHCPOFFER received"),
            AckReceived => write!(f, "DHCPACK received"),
            NakReceived => write!(f, "DHCPNAK received"),
            RequestSent => write!(f, "DHCPREQUEST sent"),
            DeclineSent => write!(f, "DHCPDECLINE sent"),
            ReleaseSent => write!(f, "DHCPRELEASE sent"),
            InfoSent => write!(f, "DHCPINFORM sent"),
            ArpRequestReceived => write!(f, "ARP request received"),
            ArpReplySent => write!(f, "ARP reply sent"),
        }
    }
}
