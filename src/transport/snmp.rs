//! SNMP v1/v2c wire transport.
//!
//! Thin adapter between the [`Transport`] contract and a blocking `snmp2`
//! session. Walks are getnext loops bounded by subtree membership and a
//! hard iteration ceiling; no retries beyond what the session itself does.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use log::debug;
use snmp2::{Oid, SyncSession, Value};

use super::{Connector, Transport, TransportError};
use crate::oidstr;

/// Safety ceiling for runaway agents that keep answering getnext with
/// ever-new identifiers inside the subtree.
const WALK_CEILING: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnmpVersion {
    V1,
    #[default]
    V2c,
}

/// Session parameters shared by every host a connector opens.
#[derive(Debug, Clone)]
pub struct SnmpSettings {
    pub community: String,
    pub version: SnmpVersion,
    pub timeout: Duration,
    pub port: u16,
}

impl Default for SnmpSettings {
    fn default() -> Self {
        Self {
            community: "public".to_string(),
            version: SnmpVersion::V2c,
            timeout: Duration::from_secs(5),
            port: 161,
        }
    }
}

/// Opens one SNMP session per hostname.
#[derive(Debug, Clone, Default)]
pub struct Snmp2cConnector {
    settings: SnmpSettings,
}

impl Snmp2cConnector {
    pub fn new(settings: SnmpSettings) -> Self {
        Self { settings }
    }
}

impl Connector for Snmp2cConnector {
    type Transport = Snmp2cTransport;

    fn connect(&self, hostname: &str) -> Result<Snmp2cTransport, TransportError> {
        let addr = resolve_host(hostname, self.settings.port)?;
        // Predictable request-ids invite response spoofing, so start from a
        // random one like every mainstream agent toolkit does.
        let req_id: i32 = rand::random();
        let community = self.settings.community.as_bytes();
        let timeout = Some(self.settings.timeout);
        let session = match self.settings.version {
            SnmpVersion::V1 => SyncSession::new_v1(addr, community, timeout, req_id),
            SnmpVersion::V2c => SyncSession::new_v2c(addr, community, timeout, req_id),
        }
        .map_err(|e| TransportError::Request(format!("{:?}", e)))?;
        debug!("Opened SNMP session to {} ({})", hostname, addr);
        Ok(Snmp2cTransport { session })
    }
}

fn resolve_host(hostname: &str, port: u16) -> Result<SocketAddr, TransportError> {
    (hostname, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| TransportError::HostResolution(hostname.to_string()))
}

/// An open session to a single agent.
pub struct Snmp2cTransport {
    session: SyncSession,
}

fn parse_oid(oid: &str) -> Result<Vec<u64>, TransportError> {
    oidstr::components(oid).ok_or_else(|| TransportError::Malformed(oid.to_string()))
}

fn encode_oid(parts: &[u64]) -> Result<Oid<'static>, TransportError> {
    Oid::from(parts).map_err(|_| TransportError::Malformed(oidstr::dotted(parts)))
}

/// Render an agent value to its string form. Exception markers and
/// unrenderable types come back as `None`.
fn render_value(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Boolean(b) => Some(b.to_string()),
        Value::Integer(n) => Some(n.to_string()),
        Value::OctetString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::IpAddress(octets) => {
            Some(format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3]))
        }
        Value::Counter32(n) => Some(n.to_string()),
        Value::Unsigned32(n) => Some(n.to_string()),
        Value::Timeticks(n) => Some(n.to_string()),
        Value::Counter64(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Transport for Snmp2cTransport {
    fn get(&mut self, oid: &str) -> Result<Option<String>, TransportError> {
        let name = encode_oid(&parse_oid(oid)?)?;
        let pdu = self
            .session
            .get(&name)
            .map_err(|e| TransportError::Request(format!("{:?}", e)))?;
        let mut varbinds = pdu.varbinds;
        let value = varbinds
            .next()
            .and_then(|(_, value)| render_value(&value))
            .filter(|v| !v.is_empty());
        Ok(value)
    }

    fn walk(&mut self, oid: &str) -> Result<std::collections::BTreeMap<String, String>, TransportError> {
        let root = parse_oid(oid)?;
        let mut found = std::collections::BTreeMap::new();
        let mut current = root.clone();
        for _ in 0..WALK_CEILING {
            let name = encode_oid(&current)?;
            // A failure mid-walk ends the walk; whatever was collected so
            // far stands, and an empty result reads as "nothing there".
            let Ok(pdu) = self.session.getnext(&name) else {
                break;
            };
            let mut varbinds = pdu.varbinds;
            let Some((next_name, value)) = varbinds.next() else {
                break;
            };
            let Some(next) = oidstr::components(&next_name.to_string()) else {
                break;
            };
            // Leaving the subtree or failing to advance ends the walk; the
            // latter guards against agents that echo the request identifier
            // (endOfMibView answers do exactly that).
            if !oidstr::is_under(&next, &root) || next == current {
                break;
            }
            if let Some(v) = render_value(&value) {
                if !v.is_empty() {
                    found.insert(oidstr::dotted(&next), v);
                }
            }
            current = next;
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_host_localhost() {
        let addr = resolve_host("localhost", 161).unwrap();
        assert_eq!(addr.port(), 161);
    }

    #[test]
    fn test_resolve_host_failure() {
        assert!(matches!(
            resolve_host("no-such-host.invalid", 161),
            Err(TransportError::HostResolution(_))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(parse_oid("sysName"), Err(TransportError::Malformed(_))));
        assert!(parse_oid(".1.3.6.1.2.1.1.5.0").is_ok());
    }
}
