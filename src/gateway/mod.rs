//! The public entry point: listener rules, target pools, request forwarding.

pub mod proxy;
pub mod rules;
pub mod targets;

pub use proxy::{GatewayState, gateway_router};
pub use rules::RuleSet;
pub use targets::{HealthTracker, TargetGroup, TargetRegistry, spawn_health_probe};

use axum::body::Body;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;

/// Plain-HTTP client used for forwarding and health probing.
pub type HttpClient = Client<HttpConnector, Body>;

pub fn http_client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build_http()
}
