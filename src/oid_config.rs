//! Identifier configuration.
//!
//! The nested OID mapping every device session shares: `standard` scalar
//! attributes, `if` interface table column prefixes, the `lldp` neighbor
//! walk prefix, and per-device-family attribute sets selected at runtime
//! from a device's system description. Loaded once, validated, then only
//! ever read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::oidstr;

/// Interface table column prefixes; an interface number is appended to
/// address one row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterfaceOids {
    /// ifName column, the display name a device operator would recognize.
    #[serde(rename = "interface_names")]
    pub names: String,
    /// ifAlias/ifDescr column.
    #[serde(rename = "interface_descs")]
    pub descriptions: String,
    /// ifSpeed column, bits per second.
    #[serde(rename = "interface_speeds")]
    pub speeds: String,
}

/// LLDP remote-table identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LldpOids {
    /// lldpRemSysName walk prefix; leaf rows carry the advertised name of
    /// each directly connected neighbor.
    #[serde(rename = "remote_sysnames")]
    pub remote_system_names: String,
}

/// The full identifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OidConfig {
    /// Scalar attributes polled on every device, keyed by attribute name.
    pub standard: BTreeMap<String, String>,
    #[serde(rename = "if")]
    pub interfaces: InterfaceOids,
    pub lldp: LldpOids,
    /// Family-specific attribute sets, keyed by the lowercased first word
    /// of a device's system description.
    #[serde(default)]
    pub device: BTreeMap<String, BTreeMap<String, String>>,
}

impl OidConfig {
    /// Validate every identifier's syntax up front so a typo in the config
    /// file fails at startup instead of surfacing as a silent absent value.
    pub fn validate(&self) -> Result<(), OidConfigError> {
        if self.standard.is_empty() {
            return Err(OidConfigError::InvalidStandard(
                "standard category cannot be empty".to_string(),
            ));
        }
        for (key, oid) in &self.standard {
            if !oidstr::is_valid(oid) {
                return Err(OidConfigError::InvalidStandard(format!("{}: {}", key, oid)));
            }
        }
        for (label, oid) in [
            ("interface_names", &self.interfaces.names),
            ("interface_descs", &self.interfaces.descriptions),
            ("interface_speeds", &self.interfaces.speeds),
        ] {
            if !oidstr::is_valid(oid) {
                return Err(OidConfigError::InvalidInterface(format!("{}: {}", label, oid)));
            }
        }
        if !oidstr::is_valid(&self.lldp.remote_system_names) {
            return Err(OidConfigError::InvalidLldp(
                self.lldp.remote_system_names.clone(),
            ));
        }
        for (family, set) in &self.device {
            for (key, oid) in set {
                if !oidstr::is_valid(oid) {
                    return Err(OidConfigError::InvalidDevice(format!(
                        "{}.{}: {}",
                        family, key, oid
                    )));
                }
            }
        }
        Ok(())
    }

    /// The family-specific identifier set for a family key, if configured.
    pub fn family(&self, family: &str) -> Option<&BTreeMap<String, String>> {
        self.device.get(family)
    }

    /// A well-known scalar identifier suitable for a reachability probe.
    /// Prefers the system name, falls back to any standard attribute.
    pub fn reachability_probe(&self) -> Option<&str> {
        self.standard
            .get("sysname")
            .or_else(|| self.standard.values().next())
            .map(String::as_str)
    }
}

/// MIB-II and LLDP-MIB identifiers; enough to crawl any standards-compliant
/// device without a configuration file.
impl Default for OidConfig {
    fn default() -> Self {
        let standard = [
            ("sysname", "1.3.6.1.2.1.1.5.0"),
            ("sysdesc", "1.3.6.1.2.1.1.1.0"),
            ("syscontact", "1.3.6.1.2.1.1.4.0"),
            ("syslocation", "1.3.6.1.2.1.1.6.0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            standard,
            interfaces: InterfaceOids {
                names: "1.3.6.1.2.1.31.1.1.1.1.".to_string(),
                descriptions: "1.3.6.1.2.1.31.1.1.1.18.".to_string(),
                speeds: "1.3.6.1.2.1.2.2.1.5.".to_string(),
            },
            lldp: LldpOids {
                remote_system_names: "1.0.8802.1.1.2.1.4.1.1.9".to_string(),
            },
            device: BTreeMap::new(),
        }
    }
}

/// Identifier configuration errors
#[derive(Debug, thiserror::Error)]
pub enum OidConfigError {
    #[error("Invalid standard identifier: {0}")]
    InvalidStandard(String),
    #[error("Invalid interface identifier: {0}")]
    InvalidInterface(String),
    #[error("Invalid lldp identifier: {0}")]
    InvalidLldp(String),
    #[error("Invalid device-family identifier: {0}")]
    InvalidDevice(String),
}
