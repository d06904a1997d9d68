//! # lldpmap - SNMP/LLDP network topology discovery
//!
//! This library discovers network-device topology by querying each device's
//! SNMP agent for LLDP neighbor advertisements and recursively visiting the
//! neighbors it finds, building a device-adjacency graph. Alongside the
//! crawl it resolves the human-readable identity (name, description, speed)
//! of the local interface behind every adjacency, including a heuristic
//! that maps a sub-interface back to its parent physical interface.
//!
//! ## Overview
//!
//! Two front doors:
//!
//! - **Topology crawl** ([`Crawler`]): depth-first from one root device,
//!   cycle-safe via a per-crawl visited-set, producing a nested tree, a
//!   flat device list, or a DOT rendering.
//! - **Batch poll** ([`poller::poll_hosts`]): an independent hostname list
//!   fanned out over a fixed-size worker pool, one info record per host.
//!
//! ## Architecture
//!
//! The library is organized leaf-first:
//!
//! - `oidstr`: dotted-numeric identifier parsing and assembly
//! - `transport`: the get/walk query contract, its SNMP wire
//!   implementation, and an in-memory implementation for tests
//! - `oid_config`: the shared identifier configuration and its validation
//! - `config_loader`: JSON/YAML configuration file loading
//! - `resolver`: walk-then-get resolution with tagged placeholders
//! - `device`: per-device sessions and info records
//! - `interfaces`: interface identity lookups and the parent-interface
//!   search
//! - `crawler`: recursive topology discovery
//! - `poller`: bounded-parallel batch polling
//! - `graph`: GraphViz DOT rendering of a crawled tree
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lldpmap::{CrawlMode, CrawlOptions, Crawler, OidConfig};
//! use lldpmap::transport::{Snmp2cConnector, SnmpSettings};
//!
//! let oids = Arc::new(OidConfig::default());
//! let connector = Snmp2cConnector::new(SnmpSettings::default());
//! let crawler = Crawler::new(connector, oids, CrawlOptions::default());
//! let report = crawler.crawl("core-switch", CrawlMode::Tree);
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! ```
//!
//! ## Error Handling
//!
//! Hostname resolution failure is the only structured error a session
//! surfaces; every other transport failure is absorbed by the resolution
//! layer as an absent value. Binaries report through `color_eyre`.

pub mod config_loader;
pub mod crawler;
pub mod device;
pub mod graph;
pub mod interfaces;
pub mod oid_config;
pub mod oidstr;
pub mod poller;
pub mod resolver;
pub mod transport;

// Re-export key types for easier access
pub use crawler::{CrawlMode, CrawlOptions, CrawlReport, Crawler, TopologyNode};
pub use device::{DeviceRecord, DeviceSession, NeighbourInterface};
pub use interfaces::{InterfaceRecord, SpeedUnit};
pub use oid_config::{OidConfig, OidConfigError};
pub use poller::{poll_hosts, PollOptions};
pub use resolver::{OidResolver, ResolvedEntry, Resolution};
pub use transport::{Connector, Transport, TransportError};
