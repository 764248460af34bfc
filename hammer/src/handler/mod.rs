//! Hammer handlers and their registry.

pub mod dhcpv4;

mod defender;
mod worker;

use std::{collections::HashMap, fmt, sync::Arc};

use futures::future::BoxFuture;

use dhcp_framed::Frame;

use crate::{
    config::HammerConfig, error::Error, link::Netlink, reporter::Reporter, socketeer::Socketeer,
};

/// The lifecycle state of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Created,
    Initialized,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::State::*;
        match self {
            Created => write!(f, "created"),
            Initialized => write!(f, "initialized"),
            Running => write!(f, "running"),
            Stopping => write!(f, "stopping"),
            Stopped => write!(f, "stopped"),
        }
    }
}

/// A protocol engine instance.
///
/// The lifecycle is `init`, `run`, `stop`, `deinit`, in this order.
/// Calling an operation out of order yields `Error::InvalidState`.
pub trait Handler: Send {
    /// Offers a frame to the input queue without blocking.
    ///
    /// Returns `false` if the frame was dropped.
    fn receive_message(&self, frame: Frame) -> bool;

    fn init(&mut self) -> Result<(), Error>;

    /// Returns the worker future. The caller decides where it runs.
    fn run(&mut self) -> Result<BoxFuture<'static, ()>, Error>;

    /// Closes the input queue and waits for the worker to drain it.
    ///
    /// If the returned future is dropped early the handler stays `Stopping`
    /// and `stop` has to be called again before `deinit`.
    fn stop(&mut self) -> BoxFuture<'_, Result<(), Error>>;

    /// Releases the resources acquired while running.
    fn deinit(&mut self) -> Result<(), Error>;

    fn state(&self) -> State;
}

/// The collaborators and options a handler is constructed with.
#[derive(Clone)]
pub struct HandlerInitParams {
    pub options: HammerConfig,
    pub socketeer: Arc<dyn Socketeer>,
    pub reporter: Arc<dyn Reporter>,
    pub netlink: Arc<dyn Netlink>,
}

/// Builds a handler out of its init parameters.
pub type Constructor = fn(HandlerInitParams) -> Result<Box<dyn Handler>, Error>;

/// The handler constructors keyed by hammer type.
pub struct Registry {
    constructors: HashMap<String, Constructor>,
}

impl Registry {
    /// A registry with the built-in hammer types.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry
            .constructors
            .insert(dhcpv4::HAMMER_TYPE.to_owned(), dhcpv4::HandlerDhcpV4::boxed);
        registry
    }

    pub fn empty() -> Self {
        Registry {
            constructors: HashMap::new(),
        }
    }

    /// Registers a constructor.
    ///
    /// # Errors
    /// `Error::HandlerExists` if the type is taken.
    pub fn add(&mut self, hammer_type: &str, constructor: Constructor) -> Result<(), Error> {
        if self.constructors.contains_key(hammer_type) {
            return Err(Error::HandlerExists(hammer_type.to_owned()));
        }
        self.constructors
            .insert(hammer_type.to_owned(), constructor);
        Ok(())
    }

    /// Constructs the handler registered for the configuration's hammer type.
    ///
    /// # Errors
    /// `Error::HandlerNotFound` if the type is not registered, or whatever
    /// the constructor fails with.
    pub fn create(&self, params: HandlerInitParams) -> Result<Box<dyn Handler>, Error> {
        self.create_named(params.options.hammer_type(), params)
    }

    /// Like `create`, looking the constructor up by an explicit type.
    pub fn create_named(
        &self,
        hammer_type: &str,
        params: HandlerInitParams,
    ) -> Result<Box<dyn Handler>, Error> {
        let constructor = self
            .constructors
            .get(hammer_type)
            .ok_or_else(|| Error::HandlerNotFound(hammer_type.to_owned()))?;
        debug!("Creating a {} handler", hammer_type);
        constructor(params)
    }

    pub fn contains(&self, hammer_type: &str) -> bool {
        self.constructors.contains_key(hammer_type)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
