use tracing::{error, info, instrument};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::gws::{GroupDirectory, GwsClient};
use crate::local::{GroupStore, LocalGroups, SystemRunner};
use crate::model::{CycleResult, GroupMapping, MembershipDelta};

/// Runs one full reconciliation cycle against the live Groups Web Service and
/// the system group database.
pub fn run(config: &SyncConfig) -> Result<Vec<CycleResult>> {
    let directory = GwsClient::new(config)?;
    let store = LocalGroups::new(SystemRunner);
    reconcile_all(&directory, &store, &config.group_map)
}

/// Processes the configured mappings in order, printing one summary line per
/// mapping. A fetch or local-read failure aborts the remaining mappings and
/// propagates; per-member mutation failures are logged and skipped.
#[instrument(level = "info", skip_all, fields(mapping_count = mappings.len()))]
pub fn reconcile_all(
    directory: &impl GroupDirectory,
    store: &impl GroupStore,
    mappings: &[GroupMapping],
) -> Result<Vec<CycleResult>> {
    let mut results = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        let result = reconcile_mapping(directory, store, mapping)?;
        println!("{}", result.summary_line());
        results.push(result);
    }
    Ok(results)
}

/// Reconciles one mapping: fetch both snapshots, diff, then apply one
/// mutation per differing member.
#[instrument(
    level = "info",
    skip_all,
    fields(remote = %mapping.remote, local = %mapping.local)
)]
pub fn reconcile_mapping(
    directory: &impl GroupDirectory,
    store: &impl GroupStore,
    mapping: &GroupMapping,
) -> Result<CycleResult> {
    let remote_members = directory.member_set(&mapping.remote)?;
    let local_members = store.members(&mapping.local)?;

    let mut result = CycleResult::new(mapping.clone());

    if remote_members == local_members {
        info!(member_count = remote_members.len(), "membership already in sync");
        return Ok(result);
    }

    let delta = MembershipDelta::between(&remote_members, &local_members);
    info!(
        to_add = delta.to_add.len(),
        to_remove = delta.to_remove.len(),
        "membership drift detected"
    );

    for member in &delta.to_add {
        match store.add(&mapping.local, member) {
            Ok(()) => result.added += 1,
            Err(err) => {
                report_mutation_failure(member, &mapping.local, &err);
                result.failed += 1;
            }
        }
    }

    for member in &delta.to_remove {
        match store.remove(&mapping.local, member) {
            Ok(()) => result.removed += 1,
            Err(err) => {
                report_mutation_failure(member, &mapping.local, &err);
                result.failed += 1;
            }
        }
    }

    Ok(result)
}

/// Surfaces a single member's failure on stdout and in the structured log;
/// the remaining members of the delta are still processed.
fn report_mutation_failure(member: &str, group: &str, err: &SyncError) {
    println!("ERROR: {err}");
    error!(member, group, %err, "membership mutation failed");
}
