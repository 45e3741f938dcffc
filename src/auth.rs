use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Consent state for speech capture, as tracked across a session's lifetime
///
/// Survives `stop()` so a session can record again without prompting twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthorizationState {
    /// No decision has resolved yet
    Undetermined,
    /// Capture is permitted
    Authorized,
    /// Capture was refused, with the provider's reason
    Denied { reason: String },
}

impl AuthorizationState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationState::Authorized)
    }
}

/// Outcome of a single authorization request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorizationDecision {
    Granted,
    Denied { reason: String },
}

impl From<AuthorizationDecision> for AuthorizationState {
    fn from(decision: AuthorizationDecision) -> Self {
        match decision {
            AuthorizationDecision::Granted => AuthorizationState::Authorized,
            AuthorizationDecision::Denied { reason } => AuthorizationState::Denied { reason },
        }
    }
}

/// Source of capture-consent decisions
///
/// A real provider fronts a platform permission prompt and may take
/// arbitrarily long to resolve; the session bounds the wait with its
/// authorization timeout.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request_authorization(&self) -> AuthorizationDecision;
}

/// Fixed-outcome permission provider
///
/// Headless services have no one to prompt; they are configured as granted
/// (or denied with a reason) up front. Also the natural provider for tests.
pub struct StaticPermissions {
    decision: AuthorizationDecision,
}

impl StaticPermissions {
    pub fn granted() -> Self {
        Self {
            decision: AuthorizationDecision::Granted,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            decision: AuthorizationDecision::Denied {
                reason: reason.into(),
            },
        }
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissions {
    async fn request_authorization(&self) -> AuthorizationDecision {
        self.decision.clone()
    }
}
