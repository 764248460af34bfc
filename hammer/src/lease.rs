//! Acquired address lease implementation.

use std::{
    collections::{hash_map::Entry, HashMap},
    net::Ipv4Addr,
};

use chrono::prelude::*;
use eui48::MacAddress;

use crate::link::LinkAddress;

/// An address acquired from the server under test.
#[derive(Debug, Clone, PartialEq)]
pub struct Lease {
    address: Ipv4Addr,
    hardware_address: MacAddress,
    acquired_at: DateTime<Utc>,
    bound: Option<LinkAddress>,
}

impl Lease {
    fn new(address: Ipv4Addr, hardware_address: MacAddress, acquired_at: DateTime<Utc>) -> Self {
        Lease {
            address,
            hardware_address,
            acquired_at,
            bound: None,
        }
    }

    /// `IPv4` lease address.
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// The `chaddr` of the ack that created the lease.
    pub fn hardware_address(&self) -> MacAddress {
        self.hardware_address
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// The loopback binding, if the address has been added to the link.
    pub fn bound(&self) -> Option<&LinkAddress> {
        self.bound.as_ref()
    }
}

/// The leases keyed by address. At most one lease per address.
#[derive(Debug, Default)]
pub struct LeaseTable {
    leases: HashMap<Ipv4Addr, Lease>,
}

impl LeaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a lease unless one already exists for `address`.
    ///
    /// Returns the lease and whether it has just been created.
    /// An existing lease is left untouched.
    pub fn insert_if_absent(
        &mut self,
        address: Ipv4Addr,
        hardware_address: MacAddress,
        acquired_at: DateTime<Utc>,
    ) -> (&Lease, bool) {
        match self.leases.entry(address) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => (
                entry.insert(Lease::new(address, hardware_address, acquired_at)),
                true,
            ),
        }
    }

    /// Records the loopback binding of an existing lease.
    pub fn attach_binding(&mut self, address: &Ipv4Addr, binding: LinkAddress) -> bool {
        match self.leases.get_mut(address) {
            Some(lease) => {
                lease.bound = Some(binding);
                true
            }
            None => false,
        }
    }

    pub fn lookup(&self, address: &Ipv4Addr) -> Option<&Lease> {
        self.leases.get(address)
    }

    pub fn leases(&self) -> impl Iterator<Item = &Lease> {
        self.leases.values()
    }

    /// The loopback bindings to remove on shutdown.
    pub fn bound_addresses(&self) -> impl Iterator<Item = &LinkAddress> {
        self.leases.values().filter_map(|lease| lease.bound.as_ref())
    }

    pub fn len(&self) -> usize {
        self.leases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }
}
