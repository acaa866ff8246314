use std::collections::BTreeSet;

/// One remote-to-local group pairing taken from the configuration file.
/// Mappings are processed in the order they appear in the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMapping {
    /// Name of the group in the remote directory service.
    pub remote: String,
    /// Name of the operating-system group that mirrors it.
    pub local: String,
}

impl GroupMapping {
    /// Creates a new mapping pair.
    pub fn new(remote: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            local: local.into(),
        }
    }
}

/// The add/remove sets produced by comparing a remote membership snapshot
/// against the local one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    /// Members present remotely but missing locally.
    pub to_add: BTreeSet<String>,
    /// Members present locally but no longer in the remote group.
    pub to_remove: BTreeSet<String>,
}

impl MembershipDelta {
    /// Computes the delta between the remote and local member sets. Pure
    /// set arithmetic; the two result sets are disjoint by construction.
    pub fn between(remote: &BTreeSet<String>, local: &BTreeSet<String>) -> Self {
        Self {
            to_add: remote.difference(local).cloned().collect(),
            to_remove: local.difference(remote).cloned().collect(),
        }
    }

    /// True when the two snapshots already agree.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Per-mapping outcome counters reported at the end of a cycle. Only
/// successful mutations count toward `added`/`removed`; failures are logged
/// and tallied separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleResult {
    pub mapping: GroupMapping,
    pub added: usize,
    pub removed: usize,
    pub failed: usize,
}

impl CycleResult {
    /// Creates a zero-count result for the given mapping.
    pub fn new(mapping: GroupMapping) -> Self {
        Self {
            mapping,
            added: 0,
            removed: 0,
            failed: 0,
        }
    }

    /// Renders the fixed-format summary line emitted on stdout.
    pub fn summary_line(&self) -> String {
        format!(
            "UWGROUP: {} LGROUP: {} ADD: {} REM: {}",
            self.mapping.remote, self.mapping.local, self.added, self.removed
        )
    }
}
