//! Platform payload types for addon-profile reconciliation
//!
//! Snapshots exchanged with the platform API. Nothing here is persisted by
//! this crate: clusters and candidate profiles arrive per invocation, and
//! mutation requests are built fresh per call and discarded.

use serde::{Deserialize, Serialize};

/// A cluster as reported by the platform
///
/// Read-only to this crate except through the mutations it issues. The
/// attached-template list is a snapshot and may be stale if another actor
/// mutates the cluster concurrently; the platform's own locking serializes
/// conflicting patches.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Platform identifier
    pub uid: String,
    /// Recorded authorization scope ("project" or "tenant")
    pub scope: String,
    /// Profiles currently attached, in platform order
    #[serde(default)]
    pub profile_templates: Vec<ProfileTemplateRef>,
}

/// One profile currently bound to a cluster
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ProfileTemplateRef {
    /// Identifier of the attached profile
    pub uid: String,
    /// Name of the attached profile
    pub name: String,
}

/// The profile a caller wants bound to a cluster
///
/// Name equality with an attached template is the sole criterion for
/// "already attached".
#[derive(Clone, Debug, Deserialize)]
pub struct CandidateProfile {
    /// Profile identifier
    pub uid: String,
    /// Profile name
    pub name: String,
}

/// Mutation payload for attaching or replacing profiles on a cluster
#[derive(Clone, Debug, Serialize)]
pub struct ProfileBindingRequest {
    /// Binding entries; the first entry is the subject of in-place replacement
    pub profiles: Vec<ProfileBindingEntry>,
    /// Clear any pending pack-conflict notification as part of this change.
    ///
    /// Set by the coordinator: false on initial create, true on update.
    /// Carried as a query parameter on the wire, not in the JSON body.
    #[serde(skip)]
    pub resolve_notification: bool,
}

impl ProfileBindingRequest {
    /// Request binding a single profile by identifier
    pub fn for_profile(uid: impl Into<String>) -> Self {
        Self {
            profiles: vec![ProfileBindingEntry::new(uid)],
            resolve_notification: false,
        }
    }
}

/// One profile-binding entry within a mutation
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBindingEntry {
    /// Profile to bind
    pub uid: String,
    /// Existing attachment to swap in place, when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_with_profile: Option<String>,
    /// Pack configuration pinned by the caller
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packs: Vec<PackValuesEntry>,
}

impl ProfileBindingEntry {
    /// Create a plain binding entry for the given profile
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            replace_with_profile: None,
            packs: Vec::new(),
        }
    }
}

/// Pack configuration pinned on a binding entry
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackValuesEntry {
    /// Pack name
    pub name: String,
    /// Pack version tag
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
    /// Value overrides for the pack
    #[serde(skip_serializing_if = "String::is_empty")]
    pub values: String,
    /// Inline manifests shipped with the pack
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manifests: Vec<ManifestEntry>,
}

impl PackValuesEntry {
    /// Create a pack entry. The platform UI strips a single surrounding
    /// newline from values; match it so diffs stay stable.
    pub fn new(name: impl Into<String>, tag: impl Into<String>, values: &str) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            values: values.trim().to_string(),
            manifests: Vec::new(),
        }
    }

    /// Attach an inline manifest to this pack
    pub fn with_manifest(mut self, name: impl Into<String>, content: &str) -> Self {
        self.manifests.push(ManifestEntry {
            name: name.into(),
            content: content.trim().to_string(),
        });
        self
    }
}

/// Inline manifest attached to a pack
#[derive(Clone, Debug, Serialize)]
pub struct ManifestEntry {
    /// Manifest name
    pub name: String,
    /// Manifest content
    pub content: String,
}

/// Mutation payload for detaching profiles from a cluster
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRemovalRequest {
    /// Profiles to detach, by identifier
    pub profile_uids: Vec<String>,
}

impl ProfileRemovalRequest {
    /// Request detaching a single profile by identifier
    pub fn for_profile(uid: impl Into<String>) -> Self {
        Self {
            profile_uids: vec![uid.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_entry_omits_unset_replacement() {
        let request = ProfileBindingRequest::for_profile("profile-1");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["profiles"][0]["uid"], "profile-1");
        assert!(json["profiles"][0].get("replaceWithProfile").is_none());
        assert!(json["profiles"][0].get("packs").is_none());
        // Out-of-band flag never leaks into the body
        assert!(json.get("resolveNotification").is_none());
    }

    #[test]
    fn binding_entry_serializes_replacement_in_camel_case() {
        let mut request = ProfileBindingRequest::for_profile("profile-1");
        request.profiles[0].replace_with_profile = Some("old-profile".to_string());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["profiles"][0]["replaceWithProfile"], "old-profile");
    }

    #[test]
    fn pack_values_are_trimmed() {
        let pack = PackValuesEntry::new("metrics-server", "3.12.0", "\nreplicas: 2\n")
            .with_manifest("extra", "\nkind: ConfigMap\n");

        assert_eq!(pack.values, "replicas: 2");
        assert_eq!(pack.manifests[0].content, "kind: ConfigMap");
    }

    #[test]
    fn removal_request_uses_camel_case_field() {
        let request = ProfileRemovalRequest::for_profile("profile-1");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["profileUids"][0], "profile-1");
    }

    #[test]
    fn cluster_deserializes_with_defaulted_templates() {
        let cluster: Cluster = serde_json::from_str(
            r#"{"uid": "c1", "scope": "project"}"#,
        )
        .unwrap();
        assert!(cluster.profile_templates.is_empty());
    }
}
