use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::model::GroupMapping;

/// Runtime configuration for one sync run, loaded once at process start and
/// threaded explicitly into the fetcher and the driver.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the Groups Web Service, without a trailing slash.
    pub gws_base_url: String,
    /// Trust-root certificate used to verify the service's TLS certificate.
    pub gws_ca_cert: PathBuf,
    /// Client certificate presented for mutual TLS.
    pub gws_client_cert: PathBuf,
    /// Private key belonging to the client certificate.
    pub gws_client_key: PathBuf,
    /// Remote-to-local group pairs, in configuration file order.
    pub group_map: Vec<GroupMapping>,
}

/// Shape of the YAML document on disk. `group_map` is kept as a raw YAML
/// mapping here so the document's key order survives deserialization.
#[derive(Debug, Deserialize)]
struct RawConfig {
    gws_base_url: String,
    gws_ca_cert: PathBuf,
    gws_client_cert: PathBuf,
    gws_client_key: PathBuf,
    group_map: serde_yaml::Mapping,
}

impl SyncConfig {
    /// Loads and validates the configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let raw: RawConfig = serde_yaml::from_str(&content)?;

        let base_url = raw.gws_base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SyncError::InvalidConfig(
                "gws_base_url must not be empty".to_string(),
            ));
        }

        let group_map = parse_group_map(&raw.group_map)?;
        if group_map.is_empty() {
            return Err(SyncError::InvalidConfig(
                "group_map must contain at least one entry".to_string(),
            ));
        }

        Ok(Self {
            gws_base_url: base_url,
            gws_ca_cert: raw.gws_ca_cert,
            gws_client_cert: raw.gws_client_cert,
            gws_client_key: raw.gws_client_key,
            group_map,
        })
    }
}

/// Converts the raw YAML mapping into ordered [`GroupMapping`] pairs. Both the
/// remote key and the local value must be non-empty strings.
fn parse_group_map(mapping: &serde_yaml::Mapping) -> Result<Vec<GroupMapping>> {
    let mut pairs = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let (Some(remote), Some(local)) = (key.as_str(), value.as_str()) else {
            return Err(SyncError::InvalidConfig(
                "group_map entries must map a remote group name to a local group name".to_string(),
            ));
        };
        if remote.is_empty() || local.is_empty() {
            return Err(SyncError::InvalidConfig(
                "group_map entries must not be empty".to_string(),
            ));
        }
        pairs.push(GroupMapping::new(remote, local));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("groups_sync.yml");
        fs::write(&path, contents).expect("config written");
        (dir, path)
    }

    #[test]
    fn load_preserves_group_map_order() {
        let (_dir, path) = write_config(
            r#"
gws_base_url: https://groups.example.edu/group_sws/v3
gws_ca_cert: /etc/pki/ca.pem
gws_client_cert: /etc/pki/client.pem
gws_client_key: /etc/pki/client.key
group_map:
  u_unix_admin: wheel
  u_unix_login: login
  u_unix_ops: ops
"#,
        );

        let config = SyncConfig::load(&path).expect("config loaded");
        let order: Vec<&str> = config
            .group_map
            .iter()
            .map(|m| m.remote.as_str())
            .collect();
        assert_eq!(order, vec!["u_unix_admin", "u_unix_login", "u_unix_ops"]);
        assert_eq!(config.group_map[0].local, "wheel");
    }

    #[test]
    fn load_strips_trailing_slash_from_base_url() {
        let (_dir, path) = write_config(
            r#"
gws_base_url: https://groups.example.edu/group_sws/v3/
gws_ca_cert: /a
gws_client_cert: /b
gws_client_key: /c
group_map:
  u_g: g
"#,
        );

        let config = SyncConfig::load(&path).expect("config loaded");
        assert_eq!(config.gws_base_url, "https://groups.example.edu/group_sws/v3");
    }

    #[test]
    fn load_rejects_empty_group_map() {
        let (_dir, path) = write_config(
            r#"
gws_base_url: https://groups.example.edu
gws_ca_cert: /a
gws_client_cert: /b
gws_client_key: /c
group_map: {}
"#,
        );

        let result = SyncConfig::load(&path);
        assert!(matches!(result, Err(SyncError::InvalidConfig(_))));
    }

    #[test]
    fn load_rejects_non_string_group_map_entries() {
        let (_dir, path) = write_config(
            r#"
gws_base_url: https://groups.example.edu
gws_ca_cert: /a
gws_client_cert: /b
gws_client_key: /c
group_map:
  u_g: 42
"#,
        );

        let result = SyncConfig::load(&path);
        assert!(matches!(result, Err(SyncError::InvalidConfig(_))));
    }

    #[test]
    fn load_reports_missing_file_as_io_error() {
        let dir = tempdir().expect("temporary directory");
        let result = SyncConfig::load(&dir.path().join("missing.yml"));
        assert!(matches!(result, Err(SyncError::Io(_))));
    }

    #[test]
    fn load_reports_malformed_yaml() {
        let (_dir, path) = write_config("gws_base_url: [unclosed");
        let result = SyncConfig::load(&path);
        assert!(matches!(result, Err(SyncError::Yaml(_))));
    }
}
