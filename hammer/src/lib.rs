//! The DHCPv4 hammer engine.
//!
//! Reacts to the replies of a DHCP server under load: requests or declines
//! offers, releases or informs on acks, remembers acquired leases, defends
//! them over ARP and optionally binds them to the loopback link.

#[macro_use]
extern crate log;

#[macro_use]
mod macros;
mod config;
mod error;
mod handler;
mod lease;
mod link;
mod reporter;
mod socketeer;
mod stats;
mod template;

pub use dhcp_framed::Frame;

pub use self::{
    config::{DhcpV4Options, HammerConfig},
    error::Error,
    handler::{
        dhcpv4::{HandlerDhcpV4, INPUT_QUEUE_CAPACITY, LOOPBACK_LINK},
        Constructor, Handler, HandlerInitParams, Registry, State,
    },
    lease::{Lease, LeaseTable},
    link::{Link, LinkAddress, Netlink, SystemNetlink},
    reporter::{LogReporter, Reporter},
    socketeer::Socketeer,
    stats::StatValue,
    template::Template,
};
