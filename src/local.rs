use std::collections::BTreeSet;
use std::process::Command;

use tracing::debug;

use crate::error::{MutationAction, Result, SyncError};

/// Index of the member list in a colon-delimited group record
/// (`name:passwd:gid:members`).
const MEMBER_FIELD: usize = 3;

/// Captured result of one external command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Narrow seam over process invocation so tests can stand in for the real
/// `getent`/`gpasswd` binaries.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Production runner backed by [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Read and mutate operations against the local group database. The driver
/// depends on this seam rather than on the concrete tool wrapper.
pub trait GroupStore {
    /// Current member set of the named local group.
    fn members(&self, group: &str) -> Result<BTreeSet<String>>;

    /// Adds one member to the group.
    fn add(&self, group: &str, member: &str) -> Result<()>;

    /// Removes one member from the group.
    fn remove(&self, group: &str, member: &str) -> Result<()>;
}

/// Local group database access via the standard NSS lookup (`getent group`)
/// and the membership administration tool (`gpasswd`).
#[derive(Debug)]
pub struct LocalGroups<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> LocalGroups<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    fn mutate(&self, flag: &str, action: MutationAction, group: &str, member: &str) -> Result<()> {
        let output = self.runner.run("gpasswd", &[flag, member, group])?;
        if output.success {
            debug!(group, member, %action, "membership updated");
            Ok(())
        } else {
            Err(SyncError::Mutation {
                action,
                member: member.to_string(),
                group: group.to_string(),
                detail: output.stderr.trim().to_string(),
            })
        }
    }
}

impl<R: CommandRunner> GroupStore for LocalGroups<R> {
    fn members(&self, group: &str) -> Result<BTreeSet<String>> {
        let output = self.runner.run("getent", &["group", group])?;
        if !output.success {
            return Err(SyncError::GroupLookup {
                group: group.to_string(),
                detail: if output.stderr.trim().is_empty() {
                    "group not found".to_string()
                } else {
                    output.stderr.trim().to_string()
                },
            });
        }
        parse_group_record(group, &output.stdout)
    }

    fn add(&self, group: &str, member: &str) -> Result<()> {
        self.mutate("-a", MutationAction::Add, group, member)
    }

    fn remove(&self, group: &str, member: &str) -> Result<()> {
        self.mutate("-d", MutationAction::Remove, group, member)
    }
}

/// Parses a `getent group` record line into the member set. A memberless
/// record ends in a bare colon; splitting that field on commas yields one
/// empty string, which must not become a member.
fn parse_group_record(group: &str, record: &str) -> Result<BTreeSet<String>> {
    let member_field = record
        .trim()
        .split(':')
        .nth(MEMBER_FIELD)
        .ok_or_else(|| SyncError::GroupLookup {
            group: group.to_string(),
            detail: format!("malformed group record: {}", record.trim()),
        })?;

    Ok(member_field
        .split(',')
        .map(str::trim)
        .filter(|member| !member.is_empty())
        .map(str::to_string)
        .collect())
}
