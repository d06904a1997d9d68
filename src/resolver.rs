//! Identifier resolution with walk-then-get fallback.
//!
//! A caller-supplied identifier may name a whole subtree (a table column),
//! an exact leaf, or a leaf written sloppily enough that only one of the
//! two query styles will answer. Resolution always tries the subtree walk
//! first, because a walk succeeds even when the identifier is missing a
//! trailing separator or is only partially qualified; the exact get is the
//! correct behavior when the identifier already names a leaf.

use std::collections::BTreeMap;

use log::debug;

use crate::transport::{Transport, TransportError};

/// A successfully resolved identifier: one value, or the merged leaves of
/// a subtree keyed by full leaf identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Scalar(String),
    Subtree(BTreeMap<String, String>),
}

impl Resolution {
    /// Collapse to a single value, for identifiers expected to name one
    /// object. A subtree collapses to its first leaf.
    pub fn into_scalar(self) -> Option<String> {
        match self {
            Resolution::Scalar(value) => Some(value),
            Resolution::Subtree(leaves) => leaves.into_values().next(),
        }
    }
}

/// One entry of a batch resolution. A placeholder carries the literal
/// identifier that failed to resolve, tagged so callers can never mistake
/// it for agent data.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedEntry {
    Resolved(Resolution),
    Placeholder(String),
}

impl ResolvedEntry {
    /// The display form used when flattening into a device record: the
    /// resolved value, or the unresolved identifier itself as a diagnostic
    /// aid.
    pub fn into_display_value(self) -> String {
        match self {
            ResolvedEntry::Resolved(resolution) => resolution.into_scalar().unwrap_or_default(),
            ResolvedEntry::Placeholder(oid) => oid,
        }
    }
}

/// Resolution layer over a single device's transport.
pub struct OidResolver<T: Transport> {
    transport: T,
}

impl<T: Transport> OidResolver<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Resolve one identifier. Walk first; if the walk yields at least one
    /// non-empty leaf the merged subtree is the answer, otherwise fall back
    /// to an exact get. All transport failures read as absent, except a
    /// malformed identifier which fails immediately without the fallback.
    pub fn resolve(&mut self, oid: &str) -> Option<Resolution> {
        match self.transport.walk(oid) {
            Ok(leaves) if !leaves.is_empty() => return Some(Resolution::Subtree(leaves)),
            Ok(_) => {}
            Err(TransportError::Malformed(bad)) => {
                debug!("resolve(): malformed identifier {}", bad);
                return None;
            }
            Err(e) => debug!("resolve(): walk of {} failed: {}", oid, e),
        }
        match self.transport.get(oid) {
            Ok(Some(value)) => Some(Resolution::Scalar(value)),
            Ok(None) => None,
            Err(e) => {
                debug!("resolve(): get of {} failed: {}", oid, e);
                None
            }
        }
    }

    /// Resolve a keyed batch. A key that fails to resolve is either kept as
    /// a tagged placeholder or omitted; one key's failure never aborts the
    /// rest of the batch.
    pub fn resolve_many(
        &mut self,
        keyed: &BTreeMap<String, String>,
        keep_on_failure: bool,
    ) -> BTreeMap<String, ResolvedEntry> {
        let mut resolved = BTreeMap::new();
        for (key, oid) in keyed {
            match self.resolve(oid) {
                Some(resolution) => {
                    resolved.insert(key.clone(), ResolvedEntry::Resolved(resolution));
                }
                None if keep_on_failure => {
                    resolved.insert(key.clone(), ResolvedEntry::Placeholder(oid.clone()));
                }
                None => {}
            }
        }
        resolved
    }
}
