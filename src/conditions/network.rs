// src/conditions/network.rs

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::condition::{Condition, Evaluation};

use super::{DEFAULT_POLL_INTERVAL, PollingStream, Probe};

/// Connect timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Holds while a TCP connection to `host:port` can be established.
///
/// The host is resolved again on every check. A name that does not resolve
/// counts as closed, so a service whose DNS record appears later is picked up.
#[derive(Debug, Clone)]
pub struct PortOpen {
    host: String,
    port: u16,
    interval: Duration,
    connect_timeout: Duration,
}

#[derive(Debug)]
pub struct ConnectProbe {
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl Probe for ConnectProbe {
    fn check(&mut self) -> Result<bool> {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(err) => {
                debug!(host = %self.host, port = self.port, error = %err, "host did not resolve");
                return Ok(false);
            }
        };
        let open = addrs
            .into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, self.connect_timeout).is_ok());
        trace!(host = %self.host, port = self.port, open, "port probed");
        Ok(open)
    }
}

impl PortOpen {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn stream(&self, cancel: &CancelToken) -> PollingStream<ConnectProbe> {
        let probe = ConnectProbe {
            host: self.host.clone(),
            port: self.port,
            connect_timeout: self.connect_timeout,
        };
        PollingStream::new(probe, cancel.clone(), self.interval)
    }
}

impl Condition for PortOpen {
    fn evaluate(&mut self, cancel: &CancelToken) -> Result<Evaluation> {
        Ok(Evaluation::Stream(Box::new(self.stream(cancel))))
    }
}
