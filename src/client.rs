//! Platform client for profile-binding operations
//!
//! Provides a trait-based abstraction over the platform REST API, allowing
//! tests to mock calls while production code drives HTTP. The trait is the
//! coordinator's entire dependency surface: an already-authenticated client;
//! credential acquisition and refresh live outside this crate.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::config::PlatformSettings;
use crate::error::Error;
use crate::model::{
    CandidateProfile, Cluster, ProfileBindingRequest, ProfileRemovalRequest, ProfileTemplateRef,
};
use crate::scope::ScopeContext;

/// Capability surface the deployment coordinator depends on
///
/// Every call is issued under a [`ScopeContext`] resolved from the target
/// resource's recorded scope.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileClient: Send + Sync {
    /// Fetch a cluster's current state.
    ///
    /// Returns `None` when the platform cannot see the cluster yet (404),
    /// so callers can branch into creation.
    async fn get_cluster(
        &self,
        cluster_uid: &str,
        ctx: &ScopeContext,
    ) -> Result<Option<Cluster>, Error>;

    /// Apply a profile-binding mutation to a cluster
    async fn patch_profiles(
        &self,
        cluster_uid: &str,
        request: &ProfileBindingRequest,
        ctx: &ScopeContext,
    ) -> Result<(), Error>;

    /// Detach profiles from a cluster
    async fn delete_profiles(
        &self,
        cluster_uid: &str,
        request: &ProfileRemovalRequest,
        ctx: &ScopeContext,
    ) -> Result<(), Error>;

    /// Look up a profile by name; `None` when no profile carries it
    async fn get_profile_by_name(
        &self,
        name: &str,
        ctx: &ScopeContext,
    ) -> Result<Option<CandidateProfile>, Error>;
}

/// Real client implementation over the platform REST API
pub struct HttpProfileClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpProfileClient {
    /// Create a client from resolved platform settings
    pub fn new(settings: &PlatformSettings) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::config(e.to_string()))?;
        Ok(Self {
            http,
            base_url: settings.host.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Build a request with authentication and scope decoration applied
    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        ctx: &ScopeContext,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", &self.api_key);

        if let Some(project_uid) = ctx.project_uid() {
            builder = builder.header("ProjectUid", project_uid);
        }
        if let Some(timeout) = ctx.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder
    }

    /// Map a non-success response into the error taxonomy
    async fn fail(resource: &str, resp: reqwest::Response) -> Error {
        let status = resp.status().as_u16();
        if status == 404 {
            return Error::not_found(resource.to_string());
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorPayload>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Error::api(status, message)
    }
}

#[async_trait]
impl ProfileClient for HttpProfileClient {
    async fn get_cluster(
        &self,
        cluster_uid: &str,
        ctx: &ScopeContext,
    ) -> Result<Option<Cluster>, Error> {
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("/v1/clusters/{}", cluster_uid),
                ctx,
            )
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            debug!(cluster = %cluster_uid, "cluster not visible yet");
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::fail(&format!("cluster '{}'", cluster_uid), resp).await);
        }

        let payload: ClusterPayload = resp
            .json()
            .await
            .map_err(|e| Error::serialization(e.to_string()))?;
        Ok(Some(cluster_from_payload(payload)))
    }

    async fn patch_profiles(
        &self,
        cluster_uid: &str,
        request: &ProfileBindingRequest,
        ctx: &ScopeContext,
    ) -> Result<(), Error> {
        let resp = self
            .request(
                reqwest::Method::PATCH,
                &format!("/v1/clusters/{}/profiles", cluster_uid),
                ctx,
            )
            .query(&[("resolveNotification", request.resolve_notification)])
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::fail(&format!("cluster '{}'", cluster_uid), resp).await);
        }

        info!(
            cluster = %cluster_uid,
            profiles = request.profiles.len(),
            resolve_notification = request.resolve_notification,
            "patched cluster profiles"
        );
        Ok(())
    }

    async fn delete_profiles(
        &self,
        cluster_uid: &str,
        request: &ProfileRemovalRequest,
        ctx: &ScopeContext,
    ) -> Result<(), Error> {
        let resp = self
            .request(
                reqwest::Method::DELETE,
                &format!("/v1/clusters/{}/profiles", cluster_uid),
                ctx,
            )
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::fail(&format!("cluster '{}'", cluster_uid), resp).await);
        }

        info!(
            cluster = %cluster_uid,
            profiles = request.profile_uids.len(),
            "deleted cluster profiles"
        );
        Ok(())
    }

    async fn get_profile_by_name(
        &self,
        name: &str,
        ctx: &ScopeContext,
    ) -> Result<Option<CandidateProfile>, Error> {
        let resp = self
            .request(reqwest::Method::GET, "/v1/profiles", ctx)
            .query(&[("name", name)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::fail(&format!("profile '{}'", name), resp).await);
        }

        let payload: ProfileListPayload = resp
            .json()
            .await
            .map_err(|e| Error::serialization(e.to_string()))?;

        Ok(payload
            .items
            .into_iter()
            .find(|p| p.metadata.name == name)
            .map(|p| CandidateProfile {
                uid: p.metadata.uid,
                name: p.metadata.name,
            }))
    }
}

// Wire payloads. The platform wraps resources in metadata/spec envelopes;
// the crate's model types are the flattened view the coordinator works with.

#[derive(Deserialize)]
struct ApiErrorPayload {
    message: String,
}

#[derive(Deserialize)]
struct ClusterPayload {
    metadata: ObjectMetaPayload,
    #[serde(default)]
    spec: ClusterSpecPayload,
}

#[derive(Deserialize)]
struct ObjectMetaPayload {
    uid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    annotations: std::collections::HashMap<String, String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterSpecPayload {
    #[serde(default)]
    cluster_profile_templates: Vec<ProfileTemplateRef>,
}

#[derive(Deserialize)]
struct ProfileListPayload {
    #[serde(default)]
    items: Vec<ProfileItemPayload>,
}

#[derive(Deserialize)]
struct ProfileItemPayload {
    metadata: ObjectMetaPayload,
}

/// Flatten the platform's cluster envelope into the coordinator's view.
///
/// The recorded scope lives in the metadata annotations; a cluster without
/// one flattens to an empty scope, which fails routing as `InvalidScope`
/// rather than silently defaulting.
fn cluster_from_payload(payload: ClusterPayload) -> Cluster {
    let scope = payload
        .metadata
        .annotations
        .get("scope")
        .cloned()
        .unwrap_or_default();
    Cluster {
        uid: payload.metadata.uid,
        scope,
        profile_templates: payload.spec.cluster_profile_templates,
    }
}
