//! ARP defense of the acquired leases.

use dhcp_arp::{ArpPacket, Operation};
use dhcp_framed::{arp_frame, Frame};

use super::worker::Worker;
use crate::{error::Error, stats::StatValue};

impl Worker {
    /// Claims the requested address if it is one of ours.
    ///
    /// Replies and requests for addresses we do not hold are ignored.
    pub(super) fn defend(&self, frame: &Frame, request: &ArpPacket) -> Result<(), Error> {
        if request.operation != Operation::Request {
            return Ok(());
        }
        let target = request.target_ipv4();
        let lease = match target.and_then(|address| self.leases.lookup(&address)) {
            Some(lease) => lease,
            None => return Ok(()),
        };
        self.reporter.add_stat(StatValue::ArpRequestReceived);

        let local_mac = self.socketeer.hardware_address();
        let owner = if self.options.arp_fake_mac {
            lease.hardware_address()
        } else {
            local_mac
        };
        let destination = request.sender_mac().unwrap_or(frame.ethernet.source);
        let payload = arp_frame(local_mac, destination, &request.reply(owner))?;
        trace!("Defending {} as {}", lease.address(), owner);

        if self.socketeer.add_payload(payload) {
            self.reporter.add_stat(StatValue::ArpReplySent);
        }
        Ok(())
    }
}
