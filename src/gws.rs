use std::collections::BTreeSet;
use std::fs;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};

/// Upper bound on a single membership request, connection included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Member entry type assigned to individual (personal) accounts in the
/// directory. Other types (`group`, `dns`, ...) are never synced.
const PERSONAL_MEMBER_TYPE: &str = "uwnetid";

/// Personal NetID namespace: a lowercase letter followed by up to seven
/// lowercase letters or digits. Service and shared identifiers fall outside
/// this shape and are filtered out.
static PERSONAL_NETID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]{0,7}$").unwrap());

/// Source of remote group membership. The driver only depends on this seam,
/// so tests can substitute an in-memory directory for the live web service.
pub trait GroupDirectory {
    /// Returns the set of personal member identifiers for the named group.
    fn member_set(&self, group: &str) -> Result<BTreeSet<String>>;
}

/// Membership response returned by `GET /group/<name>/member`.
#[derive(Debug, Deserialize)]
pub struct MembershipResponse {
    pub data: Vec<MemberEntry>,
}

/// One entry of the membership response's `data` array.
#[derive(Debug, Deserialize)]
pub struct MemberEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// Certificate-authenticated client for the Groups Web Service.
pub struct GwsClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl GwsClient {
    /// Builds the client from the loaded configuration: the CA certificate
    /// becomes the sole trust root and the client certificate/key pair is
    /// presented for mutual TLS.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let ca = reqwest::Certificate::from_pem(&fs::read(&config.gws_ca_cert)?)?;

        // rustls wants the certificate chain and private key in one PEM buffer.
        let mut identity_pem = fs::read(&config.gws_client_cert)?;
        identity_pem.push(b'\n');
        identity_pem.extend_from_slice(&fs::read(&config.gws_client_key)?);
        let identity = reqwest::Identity::from_pem(&identity_pem)?;

        let http = reqwest::blocking::Client::builder()
            .add_root_certificate(ca)
            .identity(identity)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: config.gws_base_url.clone(),
            http,
        })
    }
}

impl GroupDirectory for GwsClient {
    fn member_set(&self, group: &str) -> Result<BTreeSet<String>> {
        let url = format!("{}/group/{}/member", self.base_url, group);
        let response = self.http.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::GwsStatus {
                status,
                group: group.to_string(),
            });
        }

        let body = response.text()?;
        let membership: MembershipResponse = serde_json::from_str(&body)?;
        let members = personal_members(&membership);
        debug!(group, member_count = members.len(), "fetched remote membership");
        Ok(members)
    }
}

/// Reduces a membership response to the set of personal NetIDs: entries whose
/// type is personal and whose id fits the NetID namespace. Duplicates collapse.
pub fn personal_members(response: &MembershipResponse) -> BTreeSet<String> {
    response
        .data
        .iter()
        .filter(|entry| entry.kind == PERSONAL_MEMBER_TYPE && is_personal_netid(&entry.id))
        .map(|entry| entry.id.clone())
        .collect()
}

/// True when the identifier fits the personal NetID namespace.
pub fn is_personal_netid(id: &str) -> bool {
    PERSONAL_NETID.is_match(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(entries: &[(&str, &str)]) -> MembershipResponse {
        MembershipResponse {
            data: entries
                .iter()
                .map(|(kind, id)| MemberEntry {
                    kind: (*kind).to_string(),
                    id: (*id).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn accepts_personal_netids() {
        assert!(is_personal_netid("a"));
        assert!(is_personal_netid("abc123"));
        assert!(is_personal_netid("z9999999"));
    }

    #[test]
    fn rejects_identifiers_outside_the_namespace() {
        // Too long, uppercase, leading digit, punctuation, empty.
        assert!(!is_personal_netid("toolongname9"));
        assert!(!is_personal_netid("Abc"));
        assert!(!is_personal_netid("1abc"));
        assert!(!is_personal_netid("a_b"));
        assert!(!is_personal_netid(""));
    }

    #[test]
    fn filters_by_type_and_namespace() {
        let response = response(&[
            ("uwnetid", "abc123"),
            ("uwnetid", "TooLongName9"),
            ("group", "xyz"),
        ]);

        let members = personal_members(&response);
        assert_eq!(members.len(), 1);
        assert!(members.contains("abc123"));
    }

    #[test]
    fn collapses_duplicate_entries() {
        let response = response(&[("uwnetid", "abc"), ("uwnetid", "abc")]);
        assert_eq!(personal_members(&response).len(), 1);
    }

    #[test]
    fn empty_data_yields_empty_set() {
        let response = response(&[]);
        assert!(personal_members(&response).is_empty());
    }

    #[test]
    fn response_deserializes_from_service_json() {
        let body = r#"{"data": [{"type": "uwnetid", "id": "abc123"}, {"type": "group", "id": "u_sub"}]}"#;
        let parsed: MembershipResponse = serde_json::from_str(body).expect("body parsed");
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].kind, "uwnetid");
        assert_eq!(parsed.data[0].id, "abc123");
    }
}
