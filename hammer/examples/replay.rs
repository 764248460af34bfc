//! Feeds a synthetic offer and ack through a DHCPv4 handler and logs the
//! frames it would send.
//!
//! `RUST_LOG=trace cargo run --example replay`

#[macro_use]
extern crate log;

use std::{net::Ipv4Addr, sync::Arc};

use eui48::MacAddress;

use dhcp_framed::{Ethernet, Ipv4, Udp, ETHERTYPE_IPV4};
use dhcp_hammer::{
    DhcpV4Options, Frame, HammerConfig, HandlerInitParams, LogReporter, Registry, Socketeer,
    StatValue, SystemNetlink,
};
use dhcp_protocol::{HardwareType, Message, MessageType, OperationCode, RawOption};

struct Printer;

impl Socketeer for Printer {
    fn add_payload(&self, payload: Vec<u8>) -> bool {
        match Frame::parse(&payload) {
            Ok(frame) => info!("Would send {:?}", frame),
            Err(error) => error!("Built an unparsable frame: {}", error),
        }
        true
    }

    fn hardware_address(&self) -> MacAddress {
        MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01])
    }

    fn gateway_mac(&self) -> MacAddress {
        MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0xfe])
    }
}

fn reply(message_type: MessageType) -> Frame {
    let server = Ipv4Addr::new(192, 168, 0, 12);
    Frame {
        ethernet: Ethernet {
            source: MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x67]),
            destination: MacAddress::broadcast(),
            ether_type: ETHERTYPE_IPV4,
        },
        ipv4: Some(Ipv4 {
            source: server,
            destination: Ipv4Addr::BROADCAST,
        }),
        udp: Some(Udp {
            source_port: 67,
            destination_port: 68,
        }),
        dhcp: Some(Message {
            operation_code: OperationCode::BootReply,
            hardware_type: HardwareType::Ethernet,
            hardware_address_length: 6,
            hardware_options: 0,
            transaction_id: 0x1234_5678,
            seconds: 0,
            is_broadcast: true,
            client_ip_address: Ipv4Addr::UNSPECIFIED,
            your_ip_address: Ipv4Addr::new(192, 168, 0, 100),
            server_ip_address: server,
            gateway_ip_address: Ipv4Addr::UNSPECIFIED,
            client_hardware_address: MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x42]),
            server_name: Vec::new(),
            boot_filename: Vec::new(),
            options: vec![
                RawOption::message_type(message_type),
                RawOption::dhcp_server_id(&server.octets()),
            ],
        }),
        arp: None,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let reporter = Arc::new(LogReporter::new());
    let params = HandlerInitParams {
        options: HammerConfig::DhcpV4(DhcpV4Options {
            dhcp_release: true,
            ..Default::default()
        }),
        socketeer: Arc::new(Printer),
        reporter: reporter.clone(),
        netlink: Arc::new(SystemNetlink),
    };

    let mut handler = match Registry::new().create(params) {
        Ok(handler) => handler,
        Err(error) => return error!("{}", error),
    };
    if let Err(error) = handler.init() {
        return error!("{}", error);
    }
    let worker = match handler.run() {
        Ok(worker) => tokio::spawn(worker),
        Err(error) => return error!("{}", error),
    };

    handler.receive_message(reply(MessageType::DhcpOffer));
    handler.receive_message(reply(MessageType::DhcpAck));

    if let Err(error) = handler.stop().await {
        error!("{}", error);
    }
    if let Err(error) = worker.await {
        error!("{}", error);
    }
    if let Err(error) = handler.deinit() {
        error!("{}", error);
    }

    for stat in StatValue::ALL.iter() {
        info!("{}: {}", stat, reporter.count(*stat));
    }
}
