//! The OS-polymorphic link control interface.

#[cfg(target_os = "linux")]
#[path = "linux.rs"]
mod os;
#[cfg(not(target_os = "linux"))]
#[path = "unsupported.rs"]
mod os;

use std::{fmt, net::Ipv4Addr};

use futures::future::{BoxFuture, FutureExt};

use crate::error::Error;

/// A resolved network link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub index: u32,
}

/// An address assigned to a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkAddress {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
}

impl LinkAddress {
    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Self {
        LinkAddress {
            address,
            prefix_len,
        }
    }
}

impl fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

/// Link lookup and address assignment.
///
/// Addresses are always assigned as host routes (`/32`).
/// `addr_add` runs on the worker and must not block it, `addr_del` runs
/// during shutdown and may.
pub trait Netlink: Send + Sync {
    fn link_by_name(&self, name: &str) -> Result<Link, Error>;

    fn addr_add<'a>(
        &'a self,
        link: &'a Link,
        address: Ipv4Addr,
    ) -> BoxFuture<'a, Result<LinkAddress, Error>>;

    fn addr_del(&self, link: &Link, address: &LinkAddress) -> Result<(), Error>;
}

/// The facade choosing the OS implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNetlink;

impl Netlink for SystemNetlink {
    fn link_by_name(&self, name: &str) -> Result<Link, Error> {
        os::link_by_name(name)
    }

    fn addr_add<'a>(
        &'a self,
        link: &'a Link,
        address: Ipv4Addr,
    ) -> BoxFuture<'a, Result<LinkAddress, Error>> {
        async move {
            let binding = LinkAddress::new(address, 32);
            os::addr_add(link, &binding).await?;
            Ok(binding)
        }
        .boxed()
    }

    fn addr_del(&self, link: &Link, address: &LinkAddress) -> Result<(), Error> {
        os::addr_del(link, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_address_display() {
        let binding = LinkAddress::new(Ipv4Addr::new(10, 0, 0, 7), 32);
        assert_eq!(binding.to_string(), "10.0.0.7/32");
    }
}
