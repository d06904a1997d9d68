//! Recursive topology discovery.
//!
//! Starting from one root device, the crawler walks LLDP adjacencies
//! depth-first, building either a nested tree or the flat list of every
//! device reached. A visited-set owned by the crawler, one per crawl,
//! guarantees each hostname is entered at most once, so topology cycles
//! terminate and a device reachable over two paths appears as a full
//! subtree only under the first path that discovers it.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::device::{short_hostname, DeviceSession, NeighbourInterface};
use crate::oid_config::OidConfig;
use crate::transport::Connector;

/// Output shape of a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Nested `{id, children}` tree rooted at the starting host.
    Tree,
    /// Flat list of visited hostnames in visitation order.
    Flat,
}

/// What to collect at each visited device beyond its adjacencies.
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Attach each device's attribute record to its node.
    pub include_info: bool,
    /// Attach the per-neighbor interface summary to each node.
    pub include_interfaces: bool,
    /// Reduce advertised neighbor names to their short host part before
    /// visiting. Advertisements and DNS rarely agree on full names.
    pub strip_domain: bool,
    /// Keep unresolved identifiers as placeholder values in device records.
    pub keep_unresolved: bool,
}

/// One device in the produced topology tree.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopologyNode {
    pub id: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<NeighbourInterface>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TopologyNode>,
}

impl TopologyNode {
    fn bare(id: &str) -> Self {
        Self {
            id: id.to_string(),
            attributes: BTreeMap::new(),
            interfaces: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Crawl result, serialized exactly as the shape the mode asked for.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CrawlReport {
    Tree(TopologyNode),
    Flat(Vec<String>),
}

pub struct Crawler<C: Connector> {
    connector: C,
    oids: Arc<OidConfig>,
    options: CrawlOptions,
    visited: HashSet<String>,
    order: Vec<String>,
}

impl<C: Connector> Crawler<C> {
    pub fn new(connector: C, oids: Arc<OidConfig>, options: CrawlOptions) -> Self {
        Self {
            connector,
            oids,
            options,
            visited: HashSet::new(),
            order: Vec::new(),
        }
    }

    /// Crawl the topology reachable from `root`. Consumes the crawler so
    /// the visited-set can never leak into another run.
    pub fn crawl(mut self, root: &str, mode: CrawlMode) -> CrawlReport {
        let root = if self.options.strip_domain {
            short_hostname(root).to_string()
        } else {
            root.to_string()
        };
        self.mark(&root);
        let tree = self.visit(&root);
        match mode {
            CrawlMode::Tree => CrawlReport::Tree(tree),
            CrawlMode::Flat => CrawlReport::Flat(self.order),
        }
    }

    fn mark(&mut self, host: &str) {
        self.visited.insert(host.to_string());
        self.order.push(host.to_string());
    }

    fn visit(&mut self, host: &str) -> TopologyNode {
        let mut node = TopologyNode::bare(host);

        let session = DeviceSession::connect(&self.connector, host, Arc::clone(&self.oids));
        let mut session = match session {
            Ok(session) => session.keep_unresolved(self.options.keep_unresolved),
            Err(e) => {
                // One dark device never stops the crawl; it stays in the
                // tree as a bare node.
                warn!("{}: {}", host, e);
                return node;
            }
        };

        if self.options.include_info {
            let record = session.device_info();
            node.attributes = record.attributes;
            if self.options.include_interfaces {
                node.interfaces = record.interfaces;
            }
        }

        let Some(neighbours) = session.neighbours() else {
            return node;
        };

        if self.options.include_interfaces && !self.options.include_info {
            node.interfaces = session.neighbour_interface_info(Some(&neighbours));
        }

        // All queries for this device are done; release its connection
        // before descending.
        drop(session);

        for remote in neighbours.values() {
            let next = if self.options.strip_domain {
                short_hostname(remote).to_string()
            } else {
                remote.clone()
            };
            // Some devices advertise empty names; a neighbor seen before is
            // not entered again.
            if next.is_empty() || self.visited.contains(&next) {
                continue;
            }
            debug!("{} has neighbour {}", host, next);
            self.mark(&next);
            let child = self.visit(&next);
            node.children.push(child);
        }

        node
    }
}
