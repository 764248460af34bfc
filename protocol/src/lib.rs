//! The DHCPv4 message model shared by the hammer crates.
//!
//! Options are kept as raw `(tag, data)` pairs so that replies can be echoed
//! back byte-for-byte, and looked up through the direct-indexed `OptionTable`.

pub mod constants;
pub mod hardware_type;
pub mod operation_code;
pub mod options;

mod deserializer;
mod error;
mod message;
mod serializer;

pub use self::{
    constants::*,
    error::Error,
    hardware_type::HardwareType,
    message::Message,
    operation_code::OperationCode,
    options::{MessageType, OptionTable, OptionTag, Overload, RawOption},
};
