//! Request forwarding for the public listener.
//!
//! Every inbound request resolves against the rule set, picks a healthy
//! replica from the selected target group, and is proxied as-is. The
//! upstream response is returned to the client unmodified.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::Uri,
    response::Response,
};
use tower_http::trace::TraceLayer;

use super::{HttpClient, RuleSet, TargetRegistry, http_client};
use crate::error::GatewayError;

/// Shared state for the listener.
#[derive(Clone)]
pub struct GatewayState {
    rules: Arc<RuleSet>,
    targets: Arc<TargetRegistry>,
    client: HttpClient,
}

impl GatewayState {
    pub fn new(rules: RuleSet, targets: Arc<TargetRegistry>) -> Self {
        Self {
            rules: Arc::new(rules),
            targets,
            client: http_client(),
        }
    }
}

/// Builds the listener router. Every path funnels through `forward`.
pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .fallback(forward)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn forward(
    State(state): State<GatewayState>,
    mut request: Request,
) -> Result<Response, GatewayError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let target = state.rules.resolve(&path).to_string();
    let group = state
        .targets
        .group(&target)
        .ok_or_else(|| GatewayError::UnknownTargetGroup(target.clone()))?;
    let replica = group
        .next_healthy()
        .ok_or_else(|| GatewayError::NoHealthyTargets(target.clone()))?;

    // Re-point the request at the selected replica, keeping path and query.
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let uri: Uri = format!("http://{}{}", replica, path_and_query)
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| GatewayError::Upstream {
            target: target.clone(),
            detail: e.to_string(),
        })?;
    *request.uri_mut() = uri;

    match state.client.request(request).await {
        Ok(response) => {
            group.health().record_success(replica);
            tracing::info!(
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                target = %target,
                replica = %replica,
                "request forwarded"
            );
            let (parts, body) = response.into_parts();
            Ok(Response::from_parts(parts, Body::new(body)))
        }
        Err(e) => {
            group.health().record_failure(replica);
            Err(GatewayError::Upstream {
                target,
                detail: e.to_string(),
            })
        }
    }
}
