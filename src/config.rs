//! Environment configuration for the platform connection
//!
//! Provides trait-based access to environment configuration, enabling
//! dependency injection and mocking for tests.

use crate::error::Error;

/// Trait for reading platform connection settings from the environment
///
/// This abstracts reading from environment variables, enabling proper unit
/// testing without manipulating global state.
#[cfg_attr(test, mockall::automock)]
pub trait EnvSource: Send + Sync {
    /// Platform API endpoint, e.g. "https://api.nimbus.example.com"
    fn host(&self) -> Option<String>;

    /// API key presented on every request
    fn api_key(&self) -> Option<String>;

    /// Ambient project identifier for project-scoped calls
    fn project_uid(&self) -> Option<String>;

    /// Override for the transient-failure retry budget
    fn retry_attempts(&self) -> Option<String>;
}

/// Default implementation that reads NIMBUS_* environment variables
#[derive(Clone, Default)]
pub struct OsEnv;

impl EnvSource for OsEnv {
    fn host(&self) -> Option<String> {
        std::env::var("NIMBUS_HOST").ok()
    }

    fn api_key(&self) -> Option<String> {
        std::env::var("NIMBUS_API_KEY").ok()
    }

    fn project_uid(&self) -> Option<String> {
        std::env::var("NIMBUS_PROJECT_UID").ok()
    }

    fn retry_attempts(&self) -> Option<String> {
        std::env::var("NIMBUS_RETRY_ATTEMPTS").ok()
    }
}

/// Resolved connection settings for the platform client
#[derive(Clone, Debug)]
pub struct PlatformSettings {
    /// API endpoint
    pub host: String,
    /// API key presented on every request
    pub api_key: String,
    /// Ambient project for project-scoped calls, when operating inside one
    pub project_uid: Option<String>,
    /// Transient-failure budget per mutation
    pub retry_attempts: u32,
}

impl PlatformSettings {
    /// Read settings from an environment source.
    ///
    /// Endpoint and API key are required; the project identifier is optional
    /// (tenant-level credentials have none); the retry budget falls back to
    /// the crate default.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, Error> {
        let host = env
            .host()
            .ok_or_else(|| Error::config("NIMBUS_HOST is not set"))?;
        let api_key = env
            .api_key()
            .ok_or_else(|| Error::config("NIMBUS_API_KEY is not set"))?;

        let retry_attempts = match env.retry_attempts() {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::config(format!("invalid NIMBUS_RETRY_ATTEMPTS: {:?}", raw)))?,
            None => crate::DEFAULT_RETRY_ATTEMPTS,
        };

        Ok(Self {
            host,
            api_key,
            project_uid: env.project_uid(),
            retry_attempts,
        })
    }
}
