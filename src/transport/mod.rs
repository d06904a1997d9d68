//! Transport layer for device management queries.
//!
//! A [`Transport`] answers two kinds of question about a single device:
//! fetch the value at an exact identifier (`get`), or collect every value
//! under an identifier prefix (`walk`). A [`Connector`] opens a transport
//! for a hostname, resolving the name first. The wire implementation lives
//! in [`snmp`]; [`memory`] holds a deterministic in-memory implementation
//! used by the test suite.

pub mod memory;
pub mod snmp;

use std::collections::BTreeMap;

pub use memory::{MemoryConnector, MemoryTransport};
pub use snmp::{Snmp2cConnector, Snmp2cTransport, SnmpSettings, SnmpVersion};

/// Transport-level failures. Everything except `HostResolution` is absorbed
/// as "absent" by the resolution layer; host resolution is the one failure
/// surfaced to callers as a structured error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot resolve hostname {0}")]
    HostResolution(String),
    #[error("malformed identifier {0}")]
    Malformed(String),
    #[error("request failed: {0}")]
    Request(String),
}

/// A single-device query channel.
pub trait Transport {
    /// Fetch the value at an exact identifier. `Ok(None)` when the agent
    /// has no such object or answers with an empty value.
    fn get(&mut self, oid: &str) -> Result<Option<String>, TransportError>;

    /// Collect all non-empty values strictly under `oid`, keyed by the full
    /// dotted leaf identifier. An empty map means nothing was found.
    fn walk(&mut self, oid: &str) -> Result<BTreeMap<String, String>, TransportError>;
}

/// Opens a [`Transport`] per hostname. The seam between session
/// construction and the concrete wire or in-memory implementation.
pub trait Connector {
    type Transport: Transport;

    /// Resolve `hostname` and open a transport to it. Resolution failure is
    /// [`TransportError::HostResolution`], never retried here.
    fn connect(&self, hostname: &str) -> Result<Self::Transport, TransportError>;
}
