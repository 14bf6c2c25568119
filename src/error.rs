use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error type for the public listener.
///
/// Maps routing and forwarding failures to the status codes a managed load
/// balancer would produce: 503 when a target pool has no healthy replica,
/// 502 when the selected replica cannot be reached, 500 when a listener rule
/// names a target group that was never registered.
#[derive(Debug)]
pub enum GatewayError {
    /// A listener rule resolved to a target group that is not registered
    UnknownTargetGroup(String),
    /// Every replica in the selected target group is unhealthy
    NoHealthyTargets(String),
    /// The selected replica could not be reached or produced no response
    Upstream { target: String, detail: String },
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GatewayError::UnknownTargetGroup(target) => {
                tracing::error!(target = %target, "listener rule names an unregistered target group");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "500 Internal Server Error",
                )
            }
            GatewayError::NoHealthyTargets(target) => {
                tracing::warn!(target = %target, "no healthy targets in group");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "503 Service Temporarily Unavailable",
                )
            }
            GatewayError::Upstream { target, detail } => {
                tracing::warn!(target = %target, detail = %detail, "upstream request failed");
                (StatusCode::BAD_GATEWAY, "502 Bad Gateway")
            }
        };

        (status, body).into_response()
    }
}

/// Validation errors raised while synthesizing the stack plan.
///
/// Synthesis is the only place configuration mistakes can surface, so every
/// invariant of the declared topology is checked here and rejected before
/// anything is deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// The network plan is missing a subnet tier
    MissingSubnetTier(String),
    /// The database would be reachable from outside the isolated tier
    DatabaseExposed(String),
    /// The listener must carry exactly one rule for the API prefix
    ApiRuleCount(usize),
    /// The API prefix rule does not target the backend target group
    ApiRuleTarget(String),
    /// A listener rule targets a target group that is not declared
    UnknownRuleTarget { priority: u32, target: String },
    /// The listener default target is not the frontend target group
    BadDefaultTarget(String),
    /// A target group has no service attached, or more than one
    UnattachedTargetGroup(String),
    /// A service declares a replica count of zero
    NoReplicas(String),
    /// A service env entry references a secret that is not declared
    UnknownSecret { service: String, secret: String },
    /// A health check healthy-code range could not be parsed
    InvalidHealthyCodes(String),
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::MissingSubnetTier(tier) => {
                write!(f, "network plan has no {} subnet", tier)
            }
            SynthesisError::DatabaseExposed(reason) => {
                write!(f, "database is not isolated: {}", reason)
            }
            SynthesisError::ApiRuleCount(count) => write!(
                f,
                "listener must carry exactly one API prefix rule, found {}",
                count
            ),
            SynthesisError::ApiRuleTarget(target) => write!(
                f,
                "the API prefix rule must target the backend target group, found '{}'",
                target
            ),
            SynthesisError::UnknownRuleTarget { priority, target } => write!(
                f,
                "listener rule {} targets undeclared target group '{}'",
                priority, target
            ),
            SynthesisError::BadDefaultTarget(target) => write!(
                f,
                "listener default target must be the frontend target group, found '{}'",
                target
            ),
            SynthesisError::UnattachedTargetGroup(name) => write!(
                f,
                "target group '{}' must be attached to exactly one service",
                name
            ),
            SynthesisError::NoReplicas(service) => {
                write!(f, "service '{}' declares zero replicas", service)
            }
            SynthesisError::UnknownSecret { service, secret } => write!(
                f,
                "service '{}' references undeclared secret '{}'",
                service, secret
            ),
            SynthesisError::InvalidHealthyCodes(range) => {
                write!(f, "invalid healthy HTTP code range '{}'", range)
            }
        }
    }
}

impl std::error::Error for SynthesisError {}
