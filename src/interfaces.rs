//! Interface identity lookups.
//!
//! LLDP tables reference local interfaces by bare table index; devices
//! name them with letters. These lookups turn an index into its display
//! name, description, and speed, and carry the heuristic that maps a
//! sub-interface back to the parent physical interface whose speed it
//! shares. Nothing here is cached: every call re-queries the device.

use log::debug;
use serde::Serialize;

use crate::device::DeviceSession;
use crate::oidstr;
use crate::resolver::Resolution;
use crate::transport::Transport;

/// Unit for reported interface speeds. Raw agent values are bits/second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedUnit {
    Giga,
    #[default]
    Mega,
    Kilo,
    Bits,
}

impl SpeedUnit {
    /// Parse a unit letter; anything unrecognized quietly reads as mega.
    pub fn from_symbol(symbol: char) -> Self {
        match symbol.to_ascii_uppercase() {
            'G' => SpeedUnit::Giga,
            'K' => SpeedUnit::Kilo,
            'B' => SpeedUnit::Bits,
            _ => SpeedUnit::Mega,
        }
    }

    pub fn divisor(self) -> f64 {
        match self {
            SpeedUnit::Giga => 1e9,
            SpeedUnit::Mega => 1e6,
            SpeedUnit::Kilo => 1e3,
            SpeedUnit::Bits => 1.0,
        }
    }
}

/// The full identity of one interface, produced on demand.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InterfaceRecord {
    pub index: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl<T: Transport> DeviceSession<T> {
    /// The device's display name for an interface number. When the lookup
    /// fails the number itself is returned stringified, so callers cannot
    /// tell a numerically named interface from a failed lookup.
    pub fn interface_name(&mut self, index: i64) -> String {
        let oid = oidstr::append_index(&self.oids.interfaces.names, index);
        let name = self
            .resolver
            .resolve(&oid)
            .and_then(Resolution::into_scalar)
            .unwrap_or_else(|| index.to_string());
        debug!("{}: returning interface name {}", self.hostname, name);
        name
    }

    /// The configured description text, if any.
    pub fn interface_description(&mut self, index: i64) -> Option<String> {
        let oid = oidstr::append_index(&self.oids.interfaces.descriptions, index);
        self.resolver.resolve(&oid).and_then(Resolution::into_scalar)
    }

    /// The interface speed converted into `unit`.
    pub fn interface_speed(&mut self, index: i64, unit: SpeedUnit) -> Option<f64> {
        let oid = oidstr::append_index(&self.oids.interfaces.speeds, index);
        let bits = self
            .resolver
            .resolve(&oid)
            .and_then(Resolution::into_scalar)?
            .parse::<f64>()
            .ok()?;
        let speed = bits / unit.divisor();
        debug!("{}: returning interface speed {}", self.hostname, speed);
        Some(speed)
    }

    /// Find the physical parent of a sub-interface by walking table
    /// indices downward from `index`.
    ///
    /// The parent name is everything before the first '.' of the
    /// sub-interface name. Parent and child are assumed to sit on
    /// contiguous indices sharing that name prefix; the search gives up
    /// and returns the original index the moment a probed name stops
    /// containing the prefix, or when the next candidate would fall below
    /// the start of the table.
    pub fn parent_interface(&mut self, index: i64, sub_if_name: &str) -> i64 {
        let parent_name = sub_if_name
            .split('.')
            .next()
            .unwrap_or(sub_if_name)
            .to_string();
        debug!("{}: searching for interface named {}", self.hostname, parent_name);
        let mut candidate = index;
        loop {
            // Interface tables are 1-based; index 1 has nothing below it.
            if candidate <= 1 {
                return index;
            }
            candidate -= 1;
            let name = self.interface_name(candidate);
            if name == parent_name {
                debug!(
                    "{}: found name {} on interface number {}",
                    self.hostname, name, candidate
                );
                return candidate;
            }
            if !name.contains(&parent_name) {
                debug!("{}: encountered name {}, giving up", self.hostname, name);
                return index;
            }
        }
    }

    /// The complete identity record for one interface.
    pub fn interface_record(&mut self, index: i64, unit: SpeedUnit) -> InterfaceRecord {
        InterfaceRecord {
            index,
            name: self.interface_name(index),
            description: self.interface_description(index),
            speed: self.interface_speed(index, unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid_config::OidConfig;
    use crate::transport::{MemoryConnector, MemoryTransport};
    use std::sync::Arc;

    fn session_with(names: &[(i64, &str)], speeds: &[(i64, &str)]) -> DeviceSession<MemoryTransport> {
        let mut t = MemoryTransport::new();
        for (index, name) in names {
            t.set(&format!("1.3.6.1.2.1.31.1.1.1.1.{}", index), name);
        }
        for (index, speed) in speeds {
            t.set(&format!("1.3.6.1.2.1.2.2.1.5.{}", index), speed);
        }
        let connector = MemoryConnector::new().host("sw1", t);
        DeviceSession::connect(&connector, "sw1", Arc::new(OidConfig::default())).unwrap()
    }

    #[test]
    fn test_interface_name_lookup_and_fallback() {
        let mut session = session_with(&[(1, "eth0")], &[]);
        assert_eq!(session.interface_name(1), "eth0");
        // Failed lookups hand the number back unchanged.
        assert_eq!(session.interface_name(7), "7");
    }

    #[test]
    fn test_interface_description_absent() {
        let mut session = session_with(&[(1, "eth0")], &[]);
        assert_eq!(session.interface_description(1), None);
    }

    #[test]
    fn test_interface_speed_units() {
        let mut session = session_with(&[], &[(3, "1000000000")]);
        assert_eq!(session.interface_speed(3, SpeedUnit::Mega), Some(1000.0));
        assert_eq!(session.interface_speed(3, SpeedUnit::Giga), Some(1.0));
        assert_eq!(session.interface_speed(3, SpeedUnit::Kilo), Some(1_000_000.0));
        assert_eq!(session.interface_speed(3, SpeedUnit::Bits), Some(1_000_000_000.0));
        assert_eq!(session.interface_speed(4, SpeedUnit::Mega), None);
    }

    #[test]
    fn test_unrecognized_unit_reads_as_mega() {
        assert_eq!(SpeedUnit::from_symbol('X'), SpeedUnit::Mega);
        assert_eq!(SpeedUnit::from_symbol('g'), SpeedUnit::Giga);
        assert_eq!(SpeedUnit::from_symbol('b'), SpeedUnit::Bits);
    }

    #[test]
    fn test_parent_interface_found_one_below() {
        let mut session = session_with(&[(4, "eth0"), (5, "eth0.100")], &[]);
        assert_eq!(session.parent_interface(5, "eth0.100"), 4);
    }

    #[test]
    fn test_parent_interface_aborts_on_unrelated_name() {
        // Interface 3 is the real parent, but 4 breaks the shared-prefix
        // assumption first, so the child is treated as its own parent.
        let mut session = session_with(&[(3, "eth0"), (4, "unrelated"), (5, "eth0.100")], &[]);
        assert_eq!(session.parent_interface(5, "eth0.100"), 5);
    }

    #[test]
    fn test_parent_interface_walks_through_prefixed_names() {
        let mut session = session_with(
            &[(2, "eth0"), (3, "eth0.200"), (4, "eth0.100")],
            &[],
        );
        assert_eq!(session.parent_interface(4, "eth0.100"), 2);
    }

    #[test]
    fn test_parent_interface_bounded_at_table_start() {
        let mut session = session_with(&[(1, "eth0.100")], &[]);
        assert_eq!(session.parent_interface(1, "eth0.100"), 1);
    }

    #[test]
    fn test_interface_record() {
        let mut t = MemoryTransport::new();
        t.set("1.3.6.1.2.1.31.1.1.1.1.2", "eth1")
            .set("1.3.6.1.2.1.31.1.1.1.18.2", "uplink to core")
            .set("1.3.6.1.2.1.2.2.1.5.2", "10000000000");
        let connector = MemoryConnector::new().host("sw1", t);
        let mut session =
            DeviceSession::connect(&connector, "sw1", Arc::new(OidConfig::default())).unwrap();

        let record = session.interface_record(2, SpeedUnit::Giga);
        assert_eq!(
            record,
            InterfaceRecord {
                index: 2,
                name: "eth1".to_string(),
                description: Some("uplink to core".to_string()),
                speed: Some(10.0),
            }
        );
    }
}
