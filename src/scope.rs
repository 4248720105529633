//! Authorization-scope routing
//!
//! Every mutating call against the platform is issued in either a "project"
//! or "tenant" authorization context, selected from the *target resource's*
//! recorded scope, never the caller's ambient scope. Project-scoped calls
//! carry the ambient project decoration (header and timeout); tenant-scoped
//! calls carry neither.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

/// Authorization boundary under which a resource's mutating calls are issued
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Calls carry the ambient project decoration
    Project,
    /// Calls are unscoped by project
    Tenant,
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "project" => Ok(Scope::Project),
            "tenant" => Ok(Scope::Tenant),
            other => Err(Error::InvalidScope(other.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Project => f.write_str("project"),
            Scope::Tenant => f.write_str("tenant"),
        }
    }
}

/// Routing token carried alongside every platform call
///
/// Constructed fresh per call by [`ScopeRouter::resolve_context`] and
/// discarded after the call returns.
#[derive(Clone, Debug)]
pub struct ScopeContext {
    scope: Scope,
    project_uid: Option<String>,
    request_timeout: Option<Duration>,
}

impl ScopeContext {
    /// The resolved scope
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Project identifier to decorate the request with, when project-scoped
    pub fn project_uid(&self) -> Option<&str> {
        self.project_uid.as_deref()
    }

    /// Ambient per-request timeout, when one propagates
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}

/// Derives the request context for a resource's recorded scope
///
/// Holds the ambient project identifier and request timeout that
/// project-scoped calls propagate. Pure: resolution performs no I/O.
#[derive(Clone, Debug, Default)]
pub struct ScopeRouter {
    project_uid: Option<String>,
    request_timeout: Option<Duration>,
}

impl ScopeRouter {
    /// Create a router with the ambient project identifier, if any
    pub fn new(project_uid: Option<String>) -> Self {
        Self {
            project_uid,
            request_timeout: None,
        }
    }

    /// Set the ambient per-request timeout propagated to project-scoped calls
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Resolve the context a mutating call must be issued under.
    ///
    /// `"project"` carries the ambient project decoration and timeout;
    /// `"tenant"` carries neither. Any other value fails with
    /// [`Error::InvalidScope`] before a request is built.
    pub fn resolve_context(&self, scope: &str) -> Result<ScopeContext, Error> {
        match scope.parse::<Scope>()? {
            Scope::Project => Ok(ScopeContext {
                scope: Scope::Project,
                project_uid: self.project_uid.clone(),
                request_timeout: self.request_timeout,
            }),
            Scope::Tenant => Ok(ScopeContext {
                scope: Scope::Tenant,
                project_uid: None,
                request_timeout: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn router() -> ScopeRouter {
        ScopeRouter::new(Some("proj-123".to_string())).with_timeout(Duration::from_secs(30))
    }

    #[test]
    fn parses_known_scopes() {
        assert_eq!("project".parse::<Scope>().unwrap(), Scope::Project);
        assert_eq!("tenant".parse::<Scope>().unwrap(), Scope::Tenant);
    }

    #[rstest]
    #[case("")]
    #[case("invalid")]
    #[case("Project")]
    #[case("TENANT")]
    #[case("system")]
    fn rejects_unknown_scopes(#[case] scope: &str) {
        let err = router().resolve_context(scope).unwrap_err();
        assert!(err.to_string().contains("invalid scope"));
        assert!(
            err.to_string().contains(scope) || scope.is_empty(),
            "offending value should be visible: {}",
            err
        );
    }

    #[test]
    fn project_scope_carries_ambient_decoration() {
        let ctx = router().resolve_context("project").unwrap();
        assert_eq!(ctx.scope(), Scope::Project);
        assert_eq!(ctx.project_uid(), Some("proj-123"));
        assert_eq!(ctx.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn tenant_scope_is_undecorated() {
        let ctx = router().resolve_context("tenant").unwrap();
        assert_eq!(ctx.scope(), Scope::Tenant);
        assert_eq!(ctx.project_uid(), None);
        assert_eq!(ctx.request_timeout(), None);
    }

    #[test]
    fn project_scope_without_ambient_project_still_resolves() {
        // A router may legitimately have no ambient project (tenant-level
        // credentials); project-scoped calls then go out undecorated.
        let ctx = ScopeRouter::default().resolve_context("project").unwrap();
        assert_eq!(ctx.scope(), Scope::Project);
        assert_eq!(ctx.project_uid(), None);
    }

    #[test]
    fn scope_display_round_trips() {
        for scope in [Scope::Project, Scope::Tenant] {
            assert_eq!(scope.to_string().parse::<Scope>().unwrap(), scope);
        }
    }
}
