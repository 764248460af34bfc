//! Hammer configuration consumed by the engine.
//!
//! Parsing flags or files into these structures is the CLI's job.

use std::net::Ipv4Addr;

use dhcp_protocol::DHCP_PORT_SERVER;

use crate::error::Error;

/// The DHCPv4 hammer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpV4Options {
    /// Answer offers with `DHCPREQUEST` (or `DHCPDECLINE`).
    pub handshake: bool,
    /// Send `DHCPDECLINE` instead of `DHCPREQUEST`.
    pub dhcp_decline: bool,
    /// Defend acquired leases over ARP.
    pub arp: bool,
    /// Answer ARP with the hardware address of the lease owner.
    pub arp_fake_mac: bool,
    /// Add acquired addresses to the loopback link.
    pub bind: bool,
    /// Send `DHCPRELEASE` on every ack.
    pub dhcp_release: bool,
    /// Send `DHCPINFORM` on every ack. Wins over `dhcp_release`.
    pub dhcp_info: bool,
    /// Talk to the server as a relay agent instead of broadcasting.
    pub dhcp_relay: bool,
    pub relay_source_ip: Ipv4Addr,
    pub relay_target_server_ip: Ipv4Addr,
    /// Sent in `giaddr`.
    pub relay_gateway_ip: Ipv4Addr,
    /// Set the broadcast bit in the DHCP flags.
    pub dhcp_broadcast: bool,
    /// Send to `ff:ff:ff:ff:ff:ff` instead of the gateway MAC.
    pub ethernet_broadcast: bool,
    pub target_port: u16,
}

impl Default for DhcpV4Options {
    fn default() -> Self {
        DhcpV4Options {
            handshake: true,
            dhcp_decline: false,
            arp: false,
            arp_fake_mac: false,
            bind: false,
            dhcp_release: false,
            dhcp_info: false,
            dhcp_relay: false,
            relay_source_ip: Ipv4Addr::UNSPECIFIED,
            relay_target_server_ip: Ipv4Addr::UNSPECIFIED,
            relay_gateway_ip: Ipv4Addr::UNSPECIFIED,
            dhcp_broadcast: true,
            ethernet_broadcast: true,
            target_port: DHCP_PORT_SERVER,
        }
    }
}

impl DhcpV4Options {
    /// Checks the option combinations the engine cannot work with.
    ///
    /// # Errors
    /// `Error::InvalidConfig` naming the offending option.
    pub fn validate(&self) -> Result<(), Error> {
        if self.target_port == 0 {
            return Err(Error::InvalidConfig("target port must not be 0".to_owned()));
        }
        if self.dhcp_relay {
            let addresses = [
                ("relay source IP", self.relay_source_ip),
                ("relay target server IP", self.relay_target_server_ip),
                ("relay gateway IP", self.relay_gateway_ip),
            ];
            for (name, address) in addresses.iter() {
                if address.is_unspecified() {
                    return Err(Error::InvalidConfig(format!(
                        "{} is required in relay mode",
                        name
                    )));
                }
            }
        }
        if self.arp_fake_mac && !self.arp {
            warn!("ARP fake MAC is set but ARP defense is disabled");
        }
        Ok(())
    }
}

/// The options of one hammer instance, tagged by hammer type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HammerConfig {
    DhcpV4(DhcpV4Options),
}

impl HammerConfig {
    /// The registry key of the handler consuming this configuration.
    pub fn hammer_type(&self) -> &'static str {
        match self {
            HammerConfig::DhcpV4(_) => "dhcpv4",
        }
    }
}
