//! Outbound packet synthesis.
//!
//! Every outbound message is built from scratch out of the base addressing,
//! so a per-message field such as `ciaddr` or the broadcast flag can never
//! leak into the next message. Only the serialization buffer is reused.

use std::{io, net::Ipv4Addr};

use eui48::MacAddress;

use dhcp_framed::{udp_frame, UdpAddressing};
use dhcp_protocol::{
    HardwareType, Message, MessageType, OperationCode, RawOption, DHCP_PORT_CLIENT,
    DHCP_PORT_SERVER,
};

use crate::config::DhcpV4Options;

/// The DHCP message serialization buffer size.
pub const BUFFER_WRITE_CAPACITY: usize = 8192;

/// The Ethernet/IPv4/UDP/DHCP skeleton of the hammer's outbound messages.
pub struct Template {
    addressing: UdpAddressing,
    gateway_ip_address: Ipv4Addr,
    is_broadcast: bool,
    buf_write: Vec<u8>,
}

impl Template {
    /// Derives the base addressing from the options and the link layer.
    ///
    /// Direct mode broadcasts from `0.0.0.0:68`. Relay mode unicasts from the
    /// relay source address and port 67 to the target server through the
    /// gateway MAC.
    pub fn new(options: &DhcpV4Options, local_mac: MacAddress, gateway_mac: MacAddress) -> Self {
        let mut addressing = UdpAddressing {
            source_mac: local_mac,
            destination_mac: if options.ethernet_broadcast {
                MacAddress::broadcast()
            } else {
                gateway_mac
            },
            source_ip: Ipv4Addr::UNSPECIFIED,
            destination_ip: Ipv4Addr::BROADCAST,
            source_port: DHCP_PORT_CLIENT,
            destination_port: options.target_port,
        };
        let mut gateway_ip_address = Ipv4Addr::UNSPECIFIED;

        if options.dhcp_relay {
            addressing.source_ip = options.relay_source_ip;
            addressing.destination_ip = options.relay_target_server_ip;
            addressing.destination_mac = gateway_mac;
            addressing.source_port = DHCP_PORT_SERVER;
            gateway_ip_address = options.relay_gateway_ip;
        }

        Template {
            addressing,
            gateway_ip_address,
            is_broadcast: options.dhcp_broadcast,
            buf_write: vec![0u8; BUFFER_WRITE_CAPACITY],
        }
    }

    /// A `DHCPREQUEST` (or `DHCPDECLINE`) answering `offer`.
    ///
    /// Echoes the transaction ID, the client hardware address and the server
    /// identifier data, and requests the offered address.
    ///
    /// # Errors
    /// `io::Error` if the message cannot be serialized.
    pub fn request(&mut self, offer: &Message, server_id: &[u8], decline: bool) -> io::Result<Vec<u8>> {
        let message_type = if decline {
            MessageType::DhcpDecline
        } else {
            MessageType::DhcpRequest
        };
        let message = self.message(
            offer,
            Ipv4Addr::UNSPECIFIED,
            self.is_broadcast,
            vec![
                RawOption::message_type(message_type),
                RawOption::address_request(offer.your_ip_address),
                RawOption::dhcp_server_id(server_id),
            ],
        );
        let addressing = self.addressing;
        log_send!(message_type, message.transaction_id, addressing.destination_ip);
        self.frame(&addressing, &message)
    }

    /// A unicast `DHCPRELEASE` (or `DHCPINFORM`) for the address acquired by `ack`.
    ///
    /// The frame goes straight to the server that sent the ack, from the
    /// acquired address, with the broadcast flag cleared.
    ///
    /// # Errors
    /// `io::Error` if the message cannot be serialized.
    pub fn release(
        &mut self,
        ack: &Message,
        server_mac: MacAddress,
        server_ip: Ipv4Addr,
        inform: bool,
    ) -> io::Result<Vec<u8>> {
        let message_type = if inform {
            MessageType::DhcpInform
        } else {
            MessageType::DhcpRelease
        };
        let message = self.message(
            ack,
            ack.your_ip_address,
            false,
            vec![RawOption::message_type(message_type)],
        );
        let addressing = UdpAddressing {
            destination_mac: server_mac,
            source_ip: ack.your_ip_address,
            destination_ip: server_ip,
            ..self.addressing
        };
        log_send!(message_type, message.transaction_id, server_ip);
        self.frame(&addressing, &message)
    }

    fn message(
        &self,
        reply: &Message,
        client_ip_address: Ipv4Addr,
        is_broadcast: bool,
        options: Vec<RawOption>,
    ) -> Message {
        Message {
            operation_code: OperationCode::BootRequest,
            hardware_type: HardwareType::Ethernet,
            hardware_address_length: eui48::EUI48LEN as u8,
            hardware_options: 0u8,

            transaction_id: reply.transaction_id,
            seconds: 0u16,
            is_broadcast,

            client_ip_address,
            your_ip_address: Ipv4Addr::UNSPECIFIED,
            server_ip_address: Ipv4Addr::UNSPECIFIED,
            gateway_ip_address: self.gateway_ip_address,

            client_hardware_address: reply.client_hardware_address,
            server_name: Vec::new(),
            boot_filename: Vec::new(),

            options,
        }
    }

    fn frame(&mut self, addressing: &UdpAddressing, message: &Message) -> io::Result<Vec<u8>> {
        let amount = message.to_bytes(&mut self.buf_write)?;
        trace!("{}", message);
        udp_frame(addressing, &self.buf_write[..amount])
    }
}
