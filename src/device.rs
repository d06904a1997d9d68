//! Per-device query session.
//!
//! A session binds one hostname to an open transport and the shared
//! identifier configuration, and produces that device's info record:
//! standard attributes, family-specific attributes selected from the
//! system description, and the neighbor/interface summary. Sessions are
//! created per hostname and dropped (closing the transport) when the
//! caller is done; they are never shared across hostnames.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::interfaces::SpeedUnit;
use crate::oid_config::OidConfig;
use crate::oidstr;
use crate::resolver::OidResolver;
use crate::transport::{Connector, Transport, TransportError};

/// Reduce a fully-qualified name to its short host part.
pub fn short_hostname(host: &str) -> &str {
    host.split('.').next().unwrap_or(host)
}

/// One local interface that carries an LLDP adjacency.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NeighbourInterface {
    pub index: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    pub neighbour: String,
}

/// A device's collected attributes plus its neighbor/interface summary.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct DeviceRecord {
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<NeighbourInterface>,
}

impl DeviceRecord {
    /// The record an unreachable or unresolvable host still gets: nothing
    /// but the name it was asked for by.
    pub fn minimal(hostname: &str) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("sysname".to_string(), hostname.to_string());
        Self {
            attributes,
            interfaces: Vec::new(),
        }
    }
}

pub struct DeviceSession<T: Transport> {
    pub(crate) hostname: String,
    pub(crate) oids: Arc<OidConfig>,
    pub(crate) resolver: OidResolver<T>,
    keep_unresolved: bool,
}

impl<T: Transport> DeviceSession<T> {
    /// Resolve `hostname` and open its transport. Resolution failure is the
    /// one error surfaced to the caller; everything after this point
    /// degrades to absent values instead of failing.
    pub fn connect<C>(
        connector: &C,
        hostname: &str,
        oids: Arc<OidConfig>,
    ) -> Result<Self, TransportError>
    where
        C: Connector<Transport = T>,
    {
        let transport = connector.connect(hostname)?;
        Ok(Self {
            hostname: hostname.to_string(),
            oids,
            resolver: OidResolver::new(transport),
            keep_unresolved: false,
        })
    }

    /// Keep unresolved identifiers in the record as tagged placeholders
    /// instead of dropping their keys. Debugging aid.
    pub fn keep_unresolved(mut self, keep: bool) -> Self {
        self.keep_unresolved = keep;
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// One lightweight get against a well-known identifier, classifying
    /// the device before a full poll is attempted.
    pub fn is_reachable(&mut self) -> bool {
        let Some(probe) = self.oids.reachability_probe() else {
            return false;
        };
        matches!(self.resolver.transport_mut().get(probe), Ok(Some(_)))
    }

    /// Collect the device's full info record. Partial data never fails:
    /// categories that do not resolve simply contribute no keys.
    pub fn device_info(&mut self) -> DeviceRecord {
        let mut attributes = BTreeMap::new();
        attributes.insert("sysname".to_string(), self.hostname.clone());

        let standard = self
            .resolver
            .resolve_many(&self.oids.standard, self.keep_unresolved);
        for (key, entry) in standard {
            attributes.insert(key, entry.into_display_value());
        }

        // The first word of the system description picks the
        // family-specific identifier set, when one is configured. Family
        // keys overwrite standard keys of the same name.
        let family = attributes
            .get("sysdesc")
            .and_then(|desc| desc.split_whitespace().next())
            .map(str::to_lowercase);
        if let Some(family) = family {
            debug!("{}: device family {}", self.hostname, family);
            if let Some(extra) = self.oids.family(&family) {
                let resolved = self.resolver.resolve_many(extra, self.keep_unresolved);
                for (key, entry) in resolved {
                    attributes.insert(key, entry.into_display_value());
                }
            }
        }

        let interfaces = self.neighbour_interface_info(None);
        DeviceRecord {
            attributes,
            interfaces,
        }
    }

    /// Walk the LLDP remote-system-name table. Keys are the full walked
    /// leaf identifiers; the local interface number rides in them. `None`
    /// when the walk comes back empty.
    pub fn neighbours(&mut self) -> Option<BTreeMap<String, String>> {
        let walked = self
            .resolver
            .transport_mut()
            .walk(&self.oids.lldp.remote_system_names);
        match walked {
            Ok(leaves) if !leaves.is_empty() => Some(leaves),
            Ok(_) => None,
            Err(e) => {
                debug!("{}: neighbour walk failed: {}", self.hostname, e);
                None
            }
        }
    }

    /// Resolve the local interface behind each neighbor entry: name, then
    /// the parent interface when the name reveals a sub-interface, then
    /// speed. Entries whose identifier cannot be parsed are skipped.
    pub fn neighbour_interface_info(
        &mut self,
        neighbours: Option<&BTreeMap<String, String>>,
    ) -> Vec<NeighbourInterface> {
        let walked;
        let neighbours = match neighbours {
            Some(given) => given,
            None => {
                walked = self.neighbours().unwrap_or_default();
                &walked
            }
        };

        let mut interfaces = Vec::new();
        for (leaf, remote) in neighbours {
            let Some(mut index) = oidstr::local_interface_index(leaf) else {
                debug!("{}: no interface number in {}", self.hostname, leaf);
                continue;
            };
            let name = self.interface_name(index);
            if name.contains('.') {
                // Sub-interface; charge the speed to its parent.
                index = self.parent_interface(index, &name);
            }
            let speed = self.interface_speed(index, SpeedUnit::default());
            debug!(
                "{}: interface {} has neighbour {}, speed {:?}",
                self.hostname, name, remote, speed
            );
            interfaces.push(NeighbourInterface {
                index,
                name,
                speed,
                neighbour: remote.clone(),
            });
        }
        interfaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MemoryConnector, MemoryTransport};

    fn fixture() -> MemoryTransport {
        let mut t = MemoryTransport::new();
        t.set("1.3.6.1.2.1.1.5.0", "core01")
            .set("1.3.6.1.2.1.1.1.0", "ProCurve J9280A Switch")
            .set("1.3.6.1.2.1.1.6.0", "rack 4")
            .set("1.3.6.1.4.1.11.2.36.1.1.2.9.0", "SG123XYZ")
            .set("1.0.8802.1.1.2.1.4.1.1.9.0.2.1", "edge01")
            .set("1.3.6.1.2.1.31.1.1.1.1.2", "eth1")
            .set("1.3.6.1.2.1.2.2.1.5.2", "1000000000");
        t
    }

    fn config_with_family() -> Arc<OidConfig> {
        let mut config = OidConfig::default();
        let family: BTreeMap<String, String> = [(
            "serial".to_string(),
            "1.3.6.1.4.1.11.2.36.1.1.2.9.0".to_string(),
        )]
        .into();
        config.device.insert("procurve".to_string(), family);
        Arc::new(config)
    }

    fn session() -> DeviceSession<MemoryTransport> {
        let connector = MemoryConnector::new().host("core01", fixture());
        DeviceSession::connect(&connector, "core01", config_with_family()).unwrap()
    }

    #[test]
    fn test_connect_unresolvable_host() {
        let connector = MemoryConnector::new();
        let result = DeviceSession::connect(&connector, "ghost", Arc::new(OidConfig::default()));
        assert!(matches!(result, Err(TransportError::HostResolution(_))));
    }

    #[test]
    fn test_reachability() {
        let mut session = session();
        assert!(session.is_reachable());

        let connector = MemoryConnector::new().host("empty", MemoryTransport::new());
        let mut dark =
            DeviceSession::connect(&connector, "empty", Arc::new(OidConfig::default())).unwrap();
        assert!(!dark.is_reachable());
    }

    #[test]
    fn test_device_info_merges_family_attributes() {
        let mut session = session();
        let record = session.device_info();
        assert_eq!(record.attributes["sysname"], "core01");
        assert_eq!(record.attributes["sysdesc"], "ProCurve J9280A Switch");
        assert_eq!(record.attributes["syslocation"], "rack 4");
        // Family set resolved because sysdesc starts with "ProCurve".
        assert_eq!(record.attributes["serial"], "SG123XYZ");
        // syscontact has no value on the device and is simply missing.
        assert!(!record.attributes.contains_key("syscontact"));
    }

    #[test]
    fn test_device_info_interfaces_summary() {
        let mut session = session();
        let record = session.device_info();
        assert_eq!(record.interfaces.len(), 1);
        let entry = &record.interfaces[0];
        assert_eq!(entry.index, 2);
        assert_eq!(entry.name, "eth1");
        assert_eq!(entry.speed, Some(1000.0));
        assert_eq!(entry.neighbour, "edge01");
    }

    #[test]
    fn test_device_info_keep_unresolved_placeholders() {
        let mut session = session().keep_unresolved(true);
        let record = session.device_info();
        // syscontact did not resolve; its identifier stands in as the value.
        assert_eq!(record.attributes["syscontact"], "1.3.6.1.2.1.1.4.0");
    }

    #[test]
    fn test_neighbours_absent_when_walk_empty() {
        let connector = MemoryConnector::new().host("empty", MemoryTransport::new());
        let mut session =
            DeviceSession::connect(&connector, "empty", Arc::new(OidConfig::default())).unwrap();
        assert!(session.neighbours().is_none());
    }

    #[test]
    fn test_minimal_record() {
        let record = DeviceRecord::minimal("lost01");
        assert_eq!(record.attributes.len(), 1);
        assert_eq!(record.attributes["sysname"], "lost01");
        assert!(record.interfaces.is_empty());
    }

    #[test]
    fn test_short_hostname() {
        assert_eq!(short_hostname("sw1.example.com"), "sw1");
        assert_eq!(short_hostname("sw1"), "sw1");
        assert_eq!(short_hostname(""), "");
    }
}
