//! Addon-profile reconciliation
//!
//! Implements the create/update/delete lifecycle for a profile binding on a
//! running cluster: decide attach-vs-replace, build the patch request, and
//! issue it through the scope-routed client under bounded retry.
//!
//! Per binding, observed through repeated coordinator calls:
//! absent -> create -> attached -> update (same name) -> replaced in place
//! -> update (different name) -> added -> delete -> absent. No state is
//! persisted here; the platform owns it, and updates work from a freshly
//! read cluster.

use std::sync::Arc;

use tracing::{debug, info};

use crate::client::{HttpProfileClient, ProfileClient};
use crate::config::PlatformSettings;
use crate::error::Error;
use crate::model::{CandidateProfile, Cluster, ProfileBindingRequest, ProfileRemovalRequest};
use crate::retry::{retry_on_transient, RetryPolicy};
use crate::scope::ScopeRouter;

/// Locate a candidate profile among a cluster's attached templates.
///
/// Matches by name only, in template order: an attachment whose identifier
/// changed upstream (profile re-created under the same name) still counts as
/// attached. When several attachments share a name, the first in list order
/// wins. Returns the identifier of the matched attachment.
pub fn resolve_attachment<'a>(
    cluster: &'a Cluster,
    candidate: &CandidateProfile,
) -> Option<&'a str> {
    cluster
        .profile_templates
        .iter()
        .find(|template| template.name == candidate.name)
        .map(|template| template.uid.as_str())
}

/// Drives profile-binding lifecycle operations against the platform
///
/// Composes scope routing, attachment resolution, and bounded retry into the
/// three lifecycle callbacks the provider plugin exposes. Holds no mutable
/// state; safe to share across concurrent lifecycle invocations.
pub struct AddonDeploymentCoordinator {
    client: Arc<dyn ProfileClient>,
    router: ScopeRouter,
    retry: RetryPolicy,
}

impl AddonDeploymentCoordinator {
    /// Create a coordinator over the given client, router, and retry policy
    pub fn new(client: Arc<dyn ProfileClient>, router: ScopeRouter, retry: RetryPolicy) -> Self {
        Self {
            client,
            router,
            retry,
        }
    }

    /// Wire up a coordinator from resolved platform settings
    pub fn from_settings(settings: &PlatformSettings) -> Result<Self, Error> {
        let client = HttpProfileClient::new(settings)?;
        let router = ScopeRouter::new(settings.project_uid.clone());
        let retry = RetryPolicy::with_max_attempts(settings.retry_attempts);
        Ok(Self::new(Arc::new(client), router, retry))
    }

    /// Attach profiles to a cluster for the first time.
    ///
    /// Initial creation never needs to resolve outstanding pack-conflict
    /// notifications (nothing is attached yet), so the flag is forced off
    /// regardless of what the caller built.
    pub async fn create_binding(
        &self,
        cluster_uid: &str,
        scope: &str,
        mut request: ProfileBindingRequest,
    ) -> Result<(), Error> {
        let ctx = self.router.resolve_context(scope)?;
        request.resolve_notification = false;

        info!(
            cluster = %cluster_uid,
            profiles = request.profiles.len(),
            "attaching profiles"
        );
        retry_on_transient(&self.retry, "patch_profiles", || {
            self.client.patch_profiles(cluster_uid, &request, &ctx)
        })
        .await
    }

    /// Reconcile a profile binding on a cluster that may already carry it.
    ///
    /// An attachment sharing the candidate's name is swapped in place via
    /// `replace_with_profile`; otherwise the profile is added alongside the
    /// existing attachments. Updates always resolve pending pack-conflict
    /// notifications, since the update may be clearing one left by a prior
    /// conflicting change.
    pub async fn update_binding(
        &self,
        cluster: &Cluster,
        mut request: ProfileBindingRequest,
        candidate: &CandidateProfile,
    ) -> Result<(), Error> {
        let ctx = self.router.resolve_context(&cluster.scope)?;

        if let Some(existing) = resolve_attachment(cluster, candidate) {
            debug!(
                cluster = %cluster.uid,
                profile = %candidate.name,
                existing = %existing,
                "profile attached under same name, replacing in place"
            );
            if let Some(entry) = request.profiles.first_mut() {
                entry.replace_with_profile = Some(existing.to_string());
            }
        }
        request.resolve_notification = true;

        info!(
            cluster = %cluster.uid,
            profile = %candidate.name,
            "updating profile binding"
        );
        retry_on_transient(&self.retry, "patch_profiles", || {
            self.client.patch_profiles(&cluster.uid, &request, &ctx)
        })
        .await
    }

    /// Detach profiles from a cluster.
    ///
    /// The targets are already known by identifier, so no attachment
    /// resolution is needed.
    pub async fn delete_binding(
        &self,
        cluster_uid: &str,
        scope: &str,
        request: ProfileRemovalRequest,
    ) -> Result<(), Error> {
        let ctx = self.router.resolve_context(scope)?;

        info!(
            cluster = %cluster_uid,
            profiles = request.profile_uids.len(),
            "detaching profiles"
        );
        retry_on_transient(&self.retry, "delete_profiles", || {
            self.client.delete_profiles(cluster_uid, &request, &ctx)
        })
        .await
    }

    /// Read a cluster's current state under its recorded scope.
    ///
    /// A cluster the platform cannot see yet reads as `None`, letting the
    /// caller branch into creation instead of failing.
    pub async fn read_binding(
        &self,
        cluster_uid: &str,
        scope: &str,
    ) -> Result<Option<Cluster>, Error> {
        let ctx = self.router.resolve_context(scope)?;
        self.client.get_cluster(cluster_uid, &ctx).await
    }
}
