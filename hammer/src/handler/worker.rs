//! The protocol state machine.

use std::sync::Arc;

use chrono::prelude::*;
use tokio::sync::{mpsc, oneshot};

use dhcp_framed::Frame;
use dhcp_protocol::{Message, MessageType, OptionTable, OptionTag};

use crate::{
    config::DhcpV4Options,
    error::Error,
    lease::LeaseTable,
    link::{Link, Netlink},
    reporter::Reporter,
    socketeer::Socketeer,
    stats::StatValue,
    template::Template,
};

/// The size of the `Server Identifier` option data.
const SIZE_SERVER_ID: usize = 4;

/// The single consumer of a handler's input queue.
///
/// Owns the lease table and the template, so nothing here is locked.
pub(crate) struct Worker {
    pub(super) options: DhcpV4Options,
    pub(super) socketeer: Arc<dyn Socketeer>,
    pub(super) reporter: Arc<dyn Reporter>,
    netlink: Arc<dyn Netlink>,
    link: Link,
    template: Template,
    pub(super) leases: LeaseTable,
}

impl Worker {
    pub fn new(
        options: DhcpV4Options,
        socketeer: Arc<dyn Socketeer>,
        reporter: Arc<dyn Reporter>,
        netlink: Arc<dyn Netlink>,
        link: Link,
    ) -> Self {
        let template = Template::new(
            &options,
            socketeer.hardware_address(),
            socketeer.gateway_mac(),
        );
        Worker {
            options,
            socketeer,
            reporter,
            netlink,
            link,
            template,
            leases: LeaseTable::new(),
        }
    }

    /// Processes frames in arrival order until the queue is closed and
    /// drained, then hands the lease table over to `done`.
    pub async fn run(mut self, mut input: mpsc::Receiver<Frame>, done: oneshot::Sender<LeaseTable>) {
        info!("Worker started");
        while let Some(frame) = input.recv().await {
            self.handle(frame).await;
        }
        info!("Worker finished with {} leases", self.leases.len());
        if done.send(self.leases).is_err() {
            warn!("Nobody is waiting for the worker to finish");
        }
    }

    /// Processes one frame. Errors are reported and never stop the worker.
    pub async fn handle(&mut self, frame: Frame) {
        if let Err(error) = self.process(&frame).await {
            warn!("{}", error);
            self.reporter.add_error(error);
        }
    }

    async fn process(&mut self, frame: &Frame) -> Result<(), Error> {
        if self.options.arp {
            if let Some(ref packet) = frame.arp {
                return self.defend(frame, packet);
            }
        }
        let message = match frame.dhcp {
            Some(ref message) => message,
            None => return Ok(()),
        };

        let options = message.option_table();
        let message_type = options.message_type()?;
        log_receive!(message_type, message);

        match message_type {
            MessageType::DhcpOffer => self.offer(message, &options),
            MessageType::DhcpAck => self.ack(frame, message).await,
            MessageType::DhcpNak => {
                self.reporter.add_stat(StatValue::NakReceived);
                Ok(())
            }
            other => {
                trace!("Ignoring {}", other);
                Ok(())
            }
        }
    }

    fn offer(&mut self, offer: &Message, options: &OptionTable) -> Result<(), Error> {
        self.reporter.add_stat(StatValue::OfferReceived);
        if !self.options.handshake {
            return Ok(());
        }

        let server_id = options.require(OptionTag::DhcpServerId, SIZE_SERVER_ID)?;
        let payload = self
            .template
            .request(offer, server_id, self.options.dhcp_decline)?;
        if self.socketeer.add_payload(payload) {
            self.reporter.add_stat(if self.options.dhcp_decline {
                StatValue::DeclineSent
            } else {
                StatValue::RequestSent
            });
        }
        Ok(())
    }

    async fn ack(&mut self, frame: &Frame, ack: &Message) -> Result<(), Error> {
        self.reporter.add_stat(StatValue::AckReceived);
        // An ack to DHCPINFORM carries no address.
        if ack.your_ip_address.is_unspecified() {
            return Err(Error::MalformedReply(
                "DHCPACK without an assigned address".to_owned(),
            ));
        }

        if self.options.arp || self.options.bind {
            self.acquire(ack).await;
        }

        if self.options.dhcp_release || self.options.dhcp_info {
            let server_ip = match frame.ipv4 {
                Some(ref ipv4) => ipv4.source,
                None => {
                    return Err(Error::MalformedReply(
                        "DHCPACK without an IPv4 header".to_owned(),
                    ))
                }
            };
            let payload = self.template.release(
                ack,
                frame.ethernet.source,
                server_ip,
                self.options.dhcp_info,
            )?;
            if self.socketeer.add_payload(payload) {
                self.reporter.add_stat(if self.options.dhcp_info {
                    StatValue::InfoSent
                } else {
                    StatValue::ReleaseSent
                });
            }
        }
        Ok(())
    }

    /// Remembers the acked address and binds it on the first ack.
    async fn acquire(&mut self, ack: &Message) {
        let address = ack.your_ip_address;
        let (_, created) =
            self.leases
                .insert_if_absent(address, ack.client_hardware_address, Utc::now());
        if !created {
            return;
        }
        debug!("Acquired {}", address);

        if self.options.bind {
            let binding = self.netlink.addr_add(&self.link, address).await;
            match binding {
                Ok(binding) => {
                    debug!("Bound {} to {}", binding, self.link.name);
                    self.leases.attach_binding(&address, binding);
                }
                Err(error) => {
                    warn!("{}", error);
                    self.reporter.add_error(error);
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        net::Ipv4Addr,
        sync::{Arc, Mutex},
    };

    use eui48::MacAddress;
    use futures::future::{self, BoxFuture, FutureExt};

    use dhcp_arp::{ArpPacket, ETHERTYPE_ARP};
    use dhcp_framed::{Ethernet, Ipv4, Udp, ETHERTYPE_IPV4};
    use dhcp_protocol::{HardwareType, OperationCode, RawOption};

    use super::*;
    use crate::link::LinkAddress;

    pub const LOCAL: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
    pub const GATEWAY: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0xfe];
    pub const SERVER: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x67];
    pub const CLIENT: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x42];
    pub const SERVER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    pub const LEASED: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);

    #[derive(Default)]
    pub struct MockSocketeer {
        pub sent: Mutex<Vec<Vec<u8>>>,
    }

    impl Socketeer for MockSocketeer {
        fn add_payload(&self, payload: Vec<u8>) -> bool {
            self.sent.lock().unwrap().push(payload);
            true
        }

        fn hardware_address(&self) -> MacAddress {
            MacAddress::new(LOCAL)
        }

        fn gateway_mac(&self) -> MacAddress {
            MacAddress::new(GATEWAY)
        }
    }

    impl MockSocketeer {
        pub fn frames(&self) -> Vec<Frame> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|data| Frame::parse(data).unwrap())
                .collect()
        }
    }

    #[derive(Default)]
    pub struct MockReporter {
        pub stats: Mutex<Vec<StatValue>>,
        pub errors: Mutex<Vec<String>>,
    }

    impl Reporter for MockReporter {
        fn add_log(&self, _message: String) -> bool {
            true
        }

        fn add_error(&self, error: Error) -> bool {
            self.errors.lock().unwrap().push(error.to_string());
            true
        }

        fn add_stat(&self, stat: StatValue) -> bool {
            self.stats.lock().unwrap().push(stat);
            true
        }
    }

    impl MockReporter {
        pub fn stats(&self) -> Vec<StatValue> {
            self.stats.lock().unwrap().clone()
        }

        pub fn error_count(&self) -> usize {
            self.errors.lock().unwrap().len()
        }
    }

    #[derive(Default)]
    pub struct MockNetlink {
        pub fail_add: bool,
        pub added: Mutex<Vec<Ipv4Addr>>,
    }

    impl Netlink for MockNetlink {
        fn link_by_name(&self, name: &str) -> Result<Link, Error> {
            Ok(Link {
                name: name.to_owned(),
                index: 1,
            })
        }

        fn addr_add<'a>(
            &'a self,
            _link: &'a Link,
            address: Ipv4Addr,
        ) -> BoxFuture<'a, Result<LinkAddress, Error>> {
            let result = if self.fail_add {
                Err(Error::AddressBinding {
                    address,
                    reason: "denied".to_owned(),
                })
            } else {
                self.added.lock().unwrap().push(address);
                Ok(LinkAddress::new(address, 32))
            };
            future::ready(result).boxed()
        }

        fn addr_del(&self, _link: &Link, _address: &LinkAddress) -> Result<(), Error> {
            Ok(())
        }
    }

    pub struct Fixture {
        pub socketeer: Arc<MockSocketeer>,
        pub reporter: Arc<MockReporter>,
        pub netlink: Arc<MockNetlink>,
        pub worker: Worker,
    }

    pub fn fixture(options: DhcpV4Options) -> Fixture {
        fixture_with(options, MockNetlink::default())
    }

    pub fn fixture_with(options: DhcpV4Options, netlink: MockNetlink) -> Fixture {
        let socketeer = Arc::new(MockSocketeer::default());
        let reporter = Arc::new(MockReporter::default());
        let netlink = Arc::new(netlink);
        let worker = Worker::new(
            options,
            socketeer.clone(),
            reporter.clone(),
            netlink.clone(),
            Link {
                name: "lo".to_owned(),
                index: 1,
            },
        );
        Fixture {
            socketeer,
            reporter,
            netlink,
            worker,
        }
    }

    pub fn reply(
        transaction_id: u32,
        your_ip_address: Ipv4Addr,
        client_hardware_address: MacAddress,
        options: Vec<RawOption>,
    ) -> Message {
        Message {
            operation_code: OperationCode::BootReply,
            hardware_type: HardwareType::Ethernet,
            hardware_address_length: 6,
            hardware_options: 0,
            transaction_id,
            seconds: 0,
            is_broadcast: false,
            client_ip_address: Ipv4Addr::UNSPECIFIED,
            your_ip_address,
            server_ip_address: Ipv4Addr::new(10, 0, 0, 250),
            gateway_ip_address: Ipv4Addr::UNSPECIFIED,
            client_hardware_address,
            server_name: Vec::new(),
            boot_filename: Vec::new(),
            options,
        }
    }

    pub fn dhcp_frame(message: Message) -> Frame {
        Frame {
            ethernet: Ethernet {
                source: MacAddress::new(SERVER),
                destination: MacAddress::broadcast(),
                ether_type: ETHERTYPE_IPV4,
            },
            ipv4: Some(Ipv4 {
                source: SERVER_IP,
                destination: Ipv4Addr::BROADCAST,
            }),
            udp: Some(Udp {
                source_port: 67,
                destination_port: 68,
            }),
            dhcp: Some(message),
            arp: None,
        }
    }

    pub fn offer(transaction_id: u32, address: Ipv4Addr) -> Frame {
        dhcp_frame(reply(
            transaction_id,
            address,
            MacAddress::new(CLIENT),
            vec![
                RawOption::message_type(MessageType::DhcpOffer),
                RawOption::dhcp_server_id(&SERVER_IP.octets()),
            ],
        ))
    }

    pub fn ack(address: Ipv4Addr, client: MacAddress) -> Frame {
        dhcp_frame(reply(
            0x42,
            address,
            client,
            vec![
                RawOption::message_type(MessageType::DhcpAck),
                RawOption::dhcp_server_id(&SERVER_IP.octets()),
            ],
        ))
    }

    pub fn arp_event(packet: ArpPacket) -> Frame {
        Frame {
            ethernet: Ethernet {
                source: MacAddress::new(GATEWAY),
                destination: MacAddress::broadcast(),
                ether_type: ETHERTYPE_ARP,
            },
            ipv4: None,
            udp: None,
            dhcp: None,
            arp: Some(packet),
        }
    }

    fn sent_message(fixture: &Fixture, index: usize) -> Message {
        fixture.socketeer.frames()[index].dhcp.clone().unwrap()
    }

    #[tokio::test]
    async fn offer_is_requested() {
        let mut fixture = fixture(DhcpV4Options::default());
        fixture.worker.handle(offer(0xdead_beef, LEASED)).await;

        let message = sent_message(&fixture, 0);
        let options = message.option_table();
        assert_eq!(message.transaction_id, 0xdead_beef);
        assert_eq!(options.message_type(), Ok(MessageType::DhcpRequest));
        assert_eq!(options.ipv4(OptionTag::AddressRequest), Ok(LEASED));
        assert_eq!(
            options.get(OptionTag::DhcpServerId),
            Some(&SERVER_IP.octets()[..])
        );
        assert_eq!(
            fixture.reporter.stats(),
            vec![StatValue::OfferReceived, StatValue::RequestSent]
        );
    }

    #[tokio::test]
    async fn offer_is_declined() {
        let mut fixture = fixture(DhcpV4Options {
            dhcp_decline: true,
            ..Default::default()
        });
        fixture.worker.handle(offer(0x1234, LEASED)).await;

        let message = sent_message(&fixture, 0);
        let options = message.option_table();
        assert_eq!(message.transaction_id, 0x1234);
        assert_eq!(options.message_type(), Ok(MessageType::DhcpDecline));
        assert_eq!(options.ipv4(OptionTag::AddressRequest), Ok(LEASED));
        assert_eq!(options.get(OptionTag::DhcpServerId), Some(&[10, 0, 0, 1][..]));
        assert_eq!(
            fixture.reporter.stats(),
            vec![StatValue::OfferReceived, StatValue::DeclineSent]
        );
    }

    #[tokio::test]
    async fn offer_without_handshake_is_counted_only() {
        let mut fixture = fixture(DhcpV4Options {
            handshake: false,
            ..Default::default()
        });
        fixture.worker.handle(offer(1, LEASED)).await;

        assert!(fixture.socketeer.frames().is_empty());
        assert_eq!(fixture.reporter.stats(), vec![StatValue::OfferReceived]);
    }

    #[tokio::test]
    async fn malformed_replies_are_skipped() {
        let mut fixture = fixture(DhcpV4Options::default());
        let client = MacAddress::new(CLIENT);

        fixture.worker.handle(dhcp_frame(reply(1, LEASED, client, Vec::new()))).await;
        fixture.worker.handle(dhcp_frame(reply(
            2,
            LEASED,
            client,
            vec![RawOption::message_type(MessageType::DhcpOffer)],
        ))).await;
        fixture.worker.handle(dhcp_frame(reply(
            3,
            LEASED,
            client,
            vec![
                RawOption::message_type(MessageType::DhcpOffer),
                RawOption::dhcp_server_id(&[10, 0]),
            ],
        ))).await;
        assert_eq!(fixture.reporter.error_count(), 3);
        assert!(fixture.socketeer.frames().is_empty());

        fixture.worker.handle(offer(4, LEASED)).await;
        assert_eq!(fixture.socketeer.frames().len(), 1);
    }

    #[tokio::test]
    async fn repeated_acks_keep_the_first_lease() {
        let mut fixture = fixture(DhcpV4Options {
            arp: true,
            ..Default::default()
        });
        fixture.worker.handle(ack(LEASED, MacAddress::new(CLIENT))).await;
        let acquired_at = fixture.worker.leases.lookup(&LEASED).unwrap().acquired_at();
        fixture.worker.handle(ack(LEASED, MacAddress::new(SERVER))).await;

        assert_eq!(fixture.worker.leases.len(), 1);
        let lease = fixture.worker.leases.lookup(&LEASED).unwrap();
        assert_eq!(lease.hardware_address(), MacAddress::new(CLIENT));
        assert_eq!(lease.acquired_at(), acquired_at);
        assert!(lease.bound().is_none());
        assert_eq!(
            fixture.reporter.stats(),
            vec![StatValue::AckReceived, StatValue::AckReceived]
        );
    }

    #[tokio::test]
    async fn ack_without_arp_or_bind_keeps_no_lease() {
        let mut fixture = fixture(DhcpV4Options::default());
        fixture.worker.handle(ack(LEASED, MacAddress::new(CLIENT))).await;

        assert!(fixture.worker.leases.is_empty());
    }

    #[tokio::test]
    async fn ack_is_bound_once() {
        let mut fixture = fixture(DhcpV4Options {
            bind: true,
            ..Default::default()
        });
        fixture.worker.handle(ack(LEASED, MacAddress::new(CLIENT))).await;
        fixture.worker.handle(ack(LEASED, MacAddress::new(CLIENT))).await;

        assert_eq!(*fixture.netlink.added.lock().unwrap(), vec![LEASED]);
        let lease = fixture.worker.leases.lookup(&LEASED).unwrap();
        assert_eq!(lease.bound(), Some(&LinkAddress::new(LEASED, 32)));
    }

    #[tokio::test]
    async fn failed_binding_leaves_an_unbound_lease() {
        let netlink = MockNetlink {
            fail_add: true,
            ..Default::default()
        };
        let mut fixture = fixture_with(
            DhcpV4Options {
                bind: true,
                ..Default::default()
            },
            netlink,
        );
        fixture.worker.handle(ack(LEASED, MacAddress::new(CLIENT))).await;

        assert_eq!(fixture.reporter.error_count(), 1);
        let lease = fixture.worker.leases.lookup(&LEASED).unwrap();
        assert!(lease.bound().is_none());
    }

    #[tokio::test]
    async fn ack_is_released_to_the_issuing_server() {
        let mut fixture = fixture(DhcpV4Options {
            dhcp_release: true,
            ..Default::default()
        });
        fixture.worker.handle(ack(LEASED, MacAddress::new(CLIENT))).await;

        let frames = fixture.socketeer.frames();
        let frame = &frames[0];
        assert_eq!(frame.ethernet.destination, MacAddress::new(SERVER));
        let ipv4 = frame.ipv4.unwrap();
        assert_eq!(ipv4.source, LEASED);
        assert_eq!(ipv4.destination, SERVER_IP);
        let message = frame.dhcp.clone().unwrap();
        assert_eq!(message.client_ip_address, LEASED);
        assert!(!message.is_broadcast);
        assert_eq!(message.transaction_id, 0x42);
        assert_eq!(
            message.option_table().message_type(),
            Ok(MessageType::DhcpRelease)
        );
        assert_eq!(
            fixture.reporter.stats(),
            vec![StatValue::AckReceived, StatValue::ReleaseSent]
        );
    }

    #[tokio::test]
    async fn inform_wins_over_release() {
        let mut fixture = fixture(DhcpV4Options {
            dhcp_release: true,
            dhcp_info: true,
            ..Default::default()
        });
        fixture.worker.handle(ack(LEASED, MacAddress::new(CLIENT))).await;

        assert_eq!(
            sent_message(&fixture, 0).option_table().message_type(),
            Ok(MessageType::DhcpInform)
        );
        assert_eq!(
            fixture.reporter.stats(),
            vec![StatValue::AckReceived, StatValue::InfoSent]
        );
    }

    #[tokio::test]
    async fn back_to_back_releases_are_independent() {
        let mut fixture = fixture(DhcpV4Options {
            dhcp_release: true,
            ..Default::default()
        });
        let second = Ipv4Addr::new(10, 0, 0, 6);
        fixture.worker.handle(ack(LEASED, MacAddress::new(CLIENT))).await;
        fixture.worker.handle(ack(second, MacAddress::new(CLIENT))).await;
        fixture.worker.handle(offer(7, Ipv4Addr::new(10, 0, 0, 8))).await;

        let first = sent_message(&fixture, 0);
        let release = sent_message(&fixture, 1);
        let request = sent_message(&fixture, 2);
        assert_eq!(first.client_ip_address, LEASED);
        assert_eq!(release.client_ip_address, second);
        assert!(!release.is_broadcast);
        assert_eq!(request.client_ip_address, Ipv4Addr::UNSPECIFIED);
        assert!(request.is_broadcast);
    }

    #[tokio::test]
    async fn ack_without_an_address_is_skipped() {
        let mut fixture = fixture(DhcpV4Options {
            bind: true,
            dhcp_info: true,
            ..Default::default()
        });
        fixture
            .worker
            .handle(ack(Ipv4Addr::UNSPECIFIED, MacAddress::new(CLIENT)))
            .await;

        assert!(fixture.worker.leases.is_empty());
        assert!(fixture.netlink.added.lock().unwrap().is_empty());
        assert!(fixture.socketeer.frames().is_empty());
        assert_eq!(fixture.reporter.error_count(), 1);
        assert_eq!(fixture.reporter.stats(), vec![StatValue::AckReceived]);
    }

    #[tokio::test]
    async fn ack_without_ipv4_cannot_be_released() {
        let mut fixture = fixture(DhcpV4Options {
            dhcp_release: true,
            ..Default::default()
        });
        let mut frame = ack(LEASED, MacAddress::new(CLIENT));
        frame.ipv4 = None;
        fixture.worker.handle(frame).await;

        assert!(fixture.socketeer.frames().is_empty());
        assert_eq!(fixture.reporter.error_count(), 1);
    }

    #[tokio::test]
    async fn nak_is_counted() {
        let mut fixture = fixture(DhcpV4Options::default());
        fixture.worker.handle(dhcp_frame(reply(
            9,
            Ipv4Addr::UNSPECIFIED,
            MacAddress::new(CLIENT),
            vec![
                RawOption::dhcp_server_id(&SERVER_IP.octets()),
                RawOption::message_type(MessageType::DhcpNak),
            ],
        ))).await;

        assert_eq!(fixture.reporter.stats(), vec![StatValue::NakReceived]);
        assert!(fixture.socketeer.frames().is_empty());
    }

    #[tokio::test]
    async fn frames_without_dhcp_are_discarded() {
        let mut fixture = fixture(DhcpV4Options::default());
        let mut frame = offer(1, LEASED);
        frame.dhcp = None;
        fixture.worker.handle(frame).await;

        assert!(fixture.reporter.stats().is_empty());
        assert_eq!(fixture.reporter.error_count(), 0);
    }
}
