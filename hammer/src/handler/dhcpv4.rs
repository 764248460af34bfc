//! The DHCPv4 hammer handler.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot,
};

use dhcp_framed::Frame;

use super::{worker::Worker, Handler, HandlerInitParams, State};
use crate::{
    config::{DhcpV4Options, HammerConfig},
    error::Error,
    lease::LeaseTable,
    link::{Link, Netlink},
    reporter::Reporter,
    socketeer::Socketeer,
};

/// The registry key of the handler.
pub const HAMMER_TYPE: &str = "dhcpv4";

/// The input queue size. Frames beyond it are dropped.
pub const INPUT_QUEUE_CAPACITY: usize = 10_000;

/// The link acquired addresses are bound to.
pub const LOOPBACK_LINK: &str = "lo";

/// Negotiates DHCPv4 sessions with the server under test.
pub struct HandlerDhcpV4 {
    options: DhcpV4Options,
    socketeer: Arc<dyn Socketeer>,
    reporter: Arc<dyn Reporter>,
    netlink: Arc<dyn Netlink>,
    state: State,
    link: Option<Link>,
    input: Option<mpsc::Sender<Frame>>,
    receiver: Option<mpsc::Receiver<Frame>>,
    done: Option<oneshot::Receiver<LeaseTable>>,
    leases: Option<LeaseTable>,
}

impl HandlerDhcpV4 {
    /// Creates a handler in the `Created` state.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if the options do not validate.
    pub fn new(params: HandlerInitParams) -> Result<Self, Error> {
        let HammerConfig::DhcpV4(options) = params.options;
        options.validate()?;

        let (input, receiver) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        Ok(HandlerDhcpV4 {
            options,
            socketeer: params.socketeer,
            reporter: params.reporter,
            netlink: params.netlink,
            state: State::Created,
            link: None,
            input: Some(input),
            receiver: Some(receiver),
            done: None,
            leases: None,
        })
    }

    pub(super) fn boxed(params: HandlerInitParams) -> Result<Box<dyn Handler>, Error> {
        Ok(Box::new(Self::new(params)?))
    }

    /// The leases handed back by the worker. Available once stopped.
    pub fn leases(&self) -> Option<&LeaseTable> {
        self.leases.as_ref()
    }

    fn expect_state(&self, operation: &'static str, expected: State) -> Result<(), Error> {
        if self.state != expected {
            return Err(Error::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}

impl Handler for HandlerDhcpV4 {
    fn receive_message(&self, frame: Frame) -> bool {
        let input = match self.input {
            Some(ref input) => input,
            None => return false,
        };
        match input.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("Input queue is full, dropping a frame");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    fn init(&mut self) -> Result<(), Error> {
        self.expect_state("init", State::Created)?;
        let link = self.netlink.link_by_name(LOOPBACK_LINK)?;
        debug!("Resolved {} with index {}", link.name, link.index);
        self.link = Some(link);
        self.state = State::Initialized;
        self.reporter
            .add_log(format!("{} handler initialized", HAMMER_TYPE));
        Ok(())
    }

    fn run(&mut self) -> Result<BoxFuture<'static, ()>, Error> {
        self.expect_state("run", State::Initialized)?;
        let (receiver, link) = match (self.receiver.take(), self.link.clone()) {
            (Some(receiver), Some(link)) => (receiver, link),
            _ => {
                return Err(Error::InvalidState {
                    operation: "run",
                    state: self.state,
                })
            }
        };

        let worker = Worker::new(
            self.options.clone(),
            self.socketeer.clone(),
            self.reporter.clone(),
            self.netlink.clone(),
            link,
        );
        let (done_tx, done_rx) = oneshot::channel();
        self.done = Some(done_rx);
        self.state = State::Running;
        info!("{} handler is running", HAMMER_TYPE);
        Ok(worker.run(receiver, done_tx).boxed())
    }

    fn stop(&mut self) -> BoxFuture<'_, Result<(), Error>> {
        async move {
            if self.state != State::Stopping {
                self.expect_state("stop", State::Running)?;
                self.state = State::Stopping;
                self.input = None;
            }

            // Kept until resolved, so a dropped `stop` can be called again.
            if let Some(done) = self.done.as_mut() {
                match done.await {
                    Ok(leases) => self.leases = Some(leases),
                    Err(_) => warn!("The worker has gone without handing the leases back"),
                }
                self.done = None;
            }
            self.state = State::Stopped;
            info!("{} handler stopped", HAMMER_TYPE);
            Ok(())
        }
        .boxed()
    }

    fn deinit(&mut self) -> Result<(), Error> {
        if self.state == State::Initialized {
            return Ok(());
        }
        self.expect_state("deinit", State::Stopped)?;
        if !self.options.bind {
            return Ok(());
        }
        let (leases, link) = match (self.leases.as_ref(), self.link.as_ref()) {
            (Some(leases), Some(link)) => (leases, link),
            _ => return Ok(()),
        };

        for binding in leases.bound_addresses() {
            match self.netlink.addr_del(link, binding) {
                Ok(()) => debug!("Unbound {} from {}", binding, link.name),
                Err(error) => {
                    warn!("{}", error);
                    self.reporter.add_error(error);
                }
            }
        }
        Ok(())
    }

    fn state(&self) -> State {
        self.state
    }
}
