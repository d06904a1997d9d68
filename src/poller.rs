//! Bounded-parallel device polling.
//!
//! Polls an independent list of hostnames — no topology relationship
//! assumed — on a fixed-size worker pool. Each worker owns its device
//! session outright; the pool's queue hands out one job per hostname and
//! the collect barrier is the wait-for-all-complete point, so the result
//! map is written once per hostname and read only after every job is done.

use std::collections::BTreeMap;
use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;

use crate::device::{short_hostname, DeviceRecord, DeviceSession};
use crate::oid_config::OidConfig;
use crate::transport::Connector;

#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Requested worker count; the pool never exceeds the host count.
    pub workers: usize,
    /// Keep unresolved identifiers as placeholder values.
    pub keep_unresolved: bool,
    /// Query by short hostname while keying results by the name as given.
    pub strip_domain: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            workers: 8,
            keep_unresolved: false,
            strip_domain: false,
        }
    }
}

/// Poll every host and return one record per hostname. Unreachable and
/// unresolvable hosts yield minimal records; no host ever goes missing
/// from the result.
pub fn poll_hosts<C>(
    connector: &C,
    oids: &Arc<OidConfig>,
    hosts: &[String],
    options: &PollOptions,
) -> Result<BTreeMap<String, DeviceRecord>>
where
    C: Connector + Sync,
{
    let workers = options.workers.min(hosts.len()).max(1);
    info!("Polling {} hosts with {} workers", hosts.len(), workers);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to build worker pool")?;

    let records: Vec<(String, DeviceRecord)> = pool.install(|| {
        hosts
            .par_iter()
            .map(|host| (host.clone(), poll_one(connector, oids, host, options)))
            .collect()
    });

    Ok(records.into_iter().collect())
}

fn poll_one<C: Connector>(
    connector: &C,
    oids: &Arc<OidConfig>,
    host: &str,
    options: &PollOptions,
) -> DeviceRecord {
    let mut record = DeviceRecord::minimal(host);

    let target = if options.strip_domain {
        short_hostname(host)
    } else {
        host
    };

    match DeviceSession::connect(connector, target, Arc::clone(oids)) {
        Ok(session) => {
            let mut session = session.keep_unresolved(options.keep_unresolved);
            if session.is_reachable() {
                let info = session.device_info();
                record.attributes.extend(info.attributes);
                record.interfaces = info.interfaces;
            } else {
                warn!("{}: agent not answering, recording name only", host);
            }
        }
        Err(e) => warn!("{}: {}", host, e),
    }

    record
}
