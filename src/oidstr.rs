//! Dotted-numeric OID string handling.
//!
//! Identifiers arrive from configuration files and from walked agents in
//! slightly different shapes: with or without a leading dot, and column
//! prefixes conventionally carry a trailing dot so an index can be appended
//! directly. Everything here normalizes around those variations.

use std::sync::LazyLock;

use regex::Regex;

/// Dotted-numeric identifier, optional leading dot, optional trailing dot
/// (column prefixes end with one).
static DOTTED_OID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.?\d+(\.\d+)*\.?$").expect("Invalid dotted OID regex")
});

/// Check identifier syntax without touching the network.
pub fn is_valid(oid: &str) -> bool {
    DOTTED_OID.is_match(oid)
}

/// Strip leading/trailing dots.
pub fn normalize(oid: &str) -> &str {
    oid.trim_matches('.')
}

/// Parse into numeric components. `None` when the syntax is invalid.
pub fn components(oid: &str) -> Option<Vec<u64>> {
    if !is_valid(oid) {
        return None;
    }
    normalize(oid)
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

/// Render numeric components back to the dotted form.
pub fn dotted(components: &[u64]) -> String {
    components
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// Append a table index to a column prefix, tolerating prefixes written
/// with or without the trailing dot.
pub fn append_index(prefix: &str, index: i64) -> String {
    if prefix.ends_with('.') {
        format!("{}{}", prefix, index)
    } else {
        format!("{}.{}", prefix, index)
    }
}

/// True when `leaf` sits strictly under `prefix`.
pub fn is_under(leaf: &[u64], prefix: &[u64]) -> bool {
    leaf.len() > prefix.len() && leaf.starts_with(prefix)
}

/// The second-to-last component of a walked leaf identifier. LLDP remote
/// tables index rows as `<prefix>.<time mark>.<local port>.<entry>`, so
/// this is the local interface number.
pub fn local_interface_index(leaf: &str) -> Option<i64> {
    let parts = components(leaf)?;
    if parts.len() < 2 {
        return None;
    }
    i64::try_from(parts[parts.len() - 2]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(is_valid("1.3.6.1.2.1.1.5.0"));
        assert!(is_valid(".1.3.6.1.2.1.1.5.0"));
        assert!(is_valid("1.3.6.1.2.1.31.1.1.1.1."));
        assert!(is_valid("1"));
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(!is_valid(""));
        assert!(!is_valid("sysName"));
        assert!(!is_valid("1..3.6"));
        assert!(!is_valid("1.3.6.x.1"));
        assert!(!is_valid("1.3.6.1 "));
    }

    #[test]
    fn test_components_roundtrip() {
        let parts = components(".1.0.8802.1.1.2.1.4.1.1.9").unwrap();
        assert_eq!(parts, vec![1, 0, 8802, 1, 1, 2, 1, 4, 1, 1, 9]);
        assert_eq!(dotted(&parts), "1.0.8802.1.1.2.1.4.1.1.9");
    }

    #[test]
    fn test_append_index() {
        assert_eq!(append_index("1.3.6.1.2.1.31.1.1.1.1.", 4), "1.3.6.1.2.1.31.1.1.1.1.4");
        assert_eq!(append_index("1.3.6.1.2.1.31.1.1.1.1", 4), "1.3.6.1.2.1.31.1.1.1.1.4");
    }

    #[test]
    fn test_is_under_respects_component_boundaries() {
        let prefix = components("1.2.3").unwrap();
        assert!(is_under(&components("1.2.3.1").unwrap(), &prefix));
        assert!(is_under(&components("1.2.3.4.5").unwrap(), &prefix));
        // "1.2.30.1" shares the string prefix "1.2.3" but is a sibling subtree.
        assert!(!is_under(&components("1.2.30.1").unwrap(), &prefix));
        // A prefix is not under itself.
        assert!(!is_under(&prefix, &prefix));
    }

    #[test]
    fn test_local_interface_index() {
        assert_eq!(local_interface_index("1.0.8802.1.1.2.1.4.1.1.9.0.7.1"), Some(7));
        assert_eq!(local_interface_index("5.0"), Some(5));
        assert_eq!(local_interface_index("3"), None);
        assert_eq!(local_interface_index("not.an.oid"), None);
    }
}
