//! The transmission side of the raw socket collaborator.

use eui48::MacAddress;

/// Sends raw frames and knows the local link layer.
///
/// Implementations must not block: `add_payload` returns `false` when the
/// frame is dropped.
pub trait Socketeer: Send + Sync {
    /// Queues a complete Ethernet frame for transmission.
    fn add_payload(&self, payload: Vec<u8>) -> bool;

    /// The hardware address of the capture interface.
    fn hardware_address(&self) -> MacAddress;

    /// The hardware address of the discovered gateway.
    fn gateway_mac(&self) -> MacAddress;
}
