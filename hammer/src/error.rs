use std::{io, net::Ipv4Addr};

use thiserror::Error;

use crate::handler::State;

/// The hammer error type.
///
/// Only `LinkResolution` and lifecycle misuse reach the caller, everything
/// else is reported through the `Reporter` while the worker keeps going.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Link {name} cannot be resolved: {reason}")]
    LinkResolution { name: String, reason: String },
    #[error("Failed to bind {address}/32: {reason}")]
    AddressBinding { address: Ipv4Addr, reason: String },
    #[error("Failed to unbind {address}/32: {reason}")]
    AddressUnbinding { address: Ipv4Addr, reason: String },
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
    #[error("Cannot {operation} a handler in {state} state")]
    InvalidState {
        operation: &'static str,
        state: State,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Handler type already exists: {0}")]
    HandlerExists(String),
    #[error("Hammer type not found: {0}")]
    HandlerNotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<dhcp_protocol::Error> for Error {
    fn from(error: dhcp_protocol::Error) -> Self {
        Error::MalformedReply(error.to_string())
    }
}
