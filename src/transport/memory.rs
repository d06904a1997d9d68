//! In-memory transport backed by a fixed identifier→value table.
//!
//! Serves the same get/walk contract as the wire transport from a plain
//! map, so resolution, session, crawler, and poller behavior can be tested
//! without a reachable SNMP agent.

use std::collections::BTreeMap;

use super::{Connector, Transport, TransportError};
use crate::oidstr;

/// A fixed table of dotted identifiers and their values.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    values: BTreeMap<String, String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, keyed by the normalized identifier.
    pub fn set(&mut self, oid: &str, value: &str) -> &mut Self {
        self.values.insert(oidstr::normalize(oid).to_string(), value.to_string());
        self
    }
}

impl Transport for MemoryTransport {
    fn get(&mut self, oid: &str) -> Result<Option<String>, TransportError> {
        if !oidstr::is_valid(oid) {
            return Err(TransportError::Malformed(oid.to_string()));
        }
        Ok(self
            .values
            .get(oidstr::normalize(oid))
            .filter(|v| !v.is_empty())
            .cloned())
    }

    fn walk(&mut self, oid: &str) -> Result<BTreeMap<String, String>, TransportError> {
        let prefix = oidstr::components(oid)
            .ok_or_else(|| TransportError::Malformed(oid.to_string()))?;
        let mut found = BTreeMap::new();
        for (key, value) in &self.values {
            let Some(leaf) = oidstr::components(key) else {
                continue;
            };
            if oidstr::is_under(&leaf, &prefix) && !value.is_empty() {
                found.insert(key.clone(), value.clone());
            }
        }
        Ok(found)
    }
}

/// Maps hostnames to in-memory transports; unknown hostnames fail the same
/// way an unresolvable name fails on the wire.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    hosts: BTreeMap<String, MemoryTransport>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, hostname: &str, transport: MemoryTransport) -> Self {
        self.hosts.insert(hostname.to_string(), transport);
        self
    }
}

impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    fn connect(&self, hostname: &str) -> Result<MemoryTransport, TransportError> {
        self.hosts
            .get(hostname)
            .cloned()
            .ok_or_else(|| TransportError::HostResolution(hostname.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> MemoryTransport {
        let mut t = MemoryTransport::new();
        t.set("1.3.6.1.2.1.1.5.0", "switch01")
            .set("1.3.6.1.2.1.31.1.1.1.1.1", "eth0")
            .set("1.3.6.1.2.1.31.1.1.1.1.2", "eth1")
            .set("1.3.6.1.2.1.31.1.1.1.1.3", "");
        t
    }

    #[test]
    fn test_get_exact_value() {
        let mut t = fixture();
        assert_eq!(t.get("1.3.6.1.2.1.1.5.0").unwrap(), Some("switch01".to_string()));
        assert_eq!(t.get(".1.3.6.1.2.1.1.5.0").unwrap(), Some("switch01".to_string()));
        assert_eq!(t.get("1.3.6.1.2.1.1.6.0").unwrap(), None);
    }

    #[test]
    fn test_get_empty_value_is_absent() {
        let mut t = fixture();
        assert_eq!(t.get("1.3.6.1.2.1.31.1.1.1.1.3").unwrap(), None);
    }

    #[test]
    fn test_get_malformed_identifier() {
        let mut t = fixture();
        assert!(matches!(t.get("ifName"), Err(TransportError::Malformed(_))));
    }

    #[test]
    fn test_walk_collects_subtree_and_drops_empty_leaves() {
        let mut t = fixture();
        let walked = t.walk("1.3.6.1.2.1.31.1.1.1.1").unwrap();
        assert_eq!(walked.len(), 2);
        assert_eq!(walked["1.3.6.1.2.1.31.1.1.1.1.1"], "eth0");
        assert_eq!(walked["1.3.6.1.2.1.31.1.1.1.1.2"], "eth1");
    }

    #[test]
    fn test_walk_on_leaf_yields_nothing() {
        let mut t = fixture();
        assert!(t.walk("1.3.6.1.2.1.1.5.0").unwrap().is_empty());
    }

    #[test]
    fn test_connector_unknown_host() {
        let connector = MemoryConnector::new().host("switch01", fixture());
        assert!(connector.connect("switch01").is_ok());
        assert!(matches!(
            connector.connect("ghost"),
            Err(TransportError::HostResolution(_))
        ));
    }
}
