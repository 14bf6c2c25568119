//! Target pools, health tracking, and the active health prober.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use dashmap::DashMap;
use tokio::task::JoinHandle;

use super::HttpClient;
use crate::topology::HealthCheckPlan;

/// Tracks per-replica health.
///
/// Unknown replicas are considered healthy. After `unhealthy_threshold`
/// consecutive failures a replica is marked unhealthy; a single success
/// restores it.
pub struct HealthTracker {
    healthy: DashMap<SocketAddr, bool>,
    failures: DashMap<SocketAddr, u32>,
    unhealthy_threshold: u32,
}

impl HealthTracker {
    pub fn new(unhealthy_threshold: u32) -> Self {
        Self {
            healthy: DashMap::new(),
            failures: DashMap::new(),
            unhealthy_threshold,
        }
    }

    pub fn record_success(&self, replica: SocketAddr) {
        self.failures.insert(replica, 0);
        self.healthy.insert(replica, true);
    }

    pub fn record_failure(&self, replica: SocketAddr) {
        let mut count = self.failures.entry(replica).or_insert(0);
        *count += 1;

        if *count >= self.unhealthy_threshold {
            self.healthy.insert(replica, false);
        }
    }

    pub fn is_healthy(&self, replica: SocketAddr) -> bool {
        self.healthy.get(&replica).map(|h| *h).unwrap_or(true)
    }
}

/// A fixed pool of replicas behind one listener target.
///
/// Selection is round-robin over the currently healthy replicas; an
/// exhausted pool yields `None` and the listener answers 503.
pub struct TargetGroup {
    name: String,
    replicas: Vec<SocketAddr>,
    cursor: AtomicUsize,
    health: HealthTracker,
    health_check: HealthCheckPlan,
}

impl TargetGroup {
    pub fn new(name: &str, replicas: Vec<SocketAddr>, health_check: HealthCheckPlan) -> Self {
        Self {
            name: name.to_string(),
            replicas,
            cursor: AtomicUsize::new(0),
            health: HealthTracker::new(health_check.unhealthy_threshold),
            health_check,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn replicas(&self) -> &[SocketAddr] {
        &self.replicas
    }

    pub fn health(&self) -> &HealthTracker {
        &self.health
    }

    pub fn health_check(&self) -> &HealthCheckPlan {
        &self.health_check
    }

    /// Selects the next healthy replica, round-robin.
    pub fn next_healthy(&self) -> Option<SocketAddr> {
        let healthy: Vec<SocketAddr> = self
            .replicas
            .iter()
            .copied()
            .filter(|r| self.health.is_healthy(*r))
            .collect();

        if healthy.is_empty() {
            return None;
        }

        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % healthy.len();
        Some(healthy[idx])
    }
}

/// All target groups registered with the listener, by name.
#[derive(Default)]
pub struct TargetRegistry {
    groups: HashMap<String, Arc<TargetGroup>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: TargetGroup) {
        self.groups.insert(group.name.clone(), Arc::new(group));
    }

    pub fn group(&self, name: &str) -> Option<Arc<TargetGroup>> {
        self.groups.get(name).cloned()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Arc<TargetGroup>> {
        self.groups.values()
    }
}

/// Probes every replica in the group on its health-check path, forever.
pub fn spawn_health_probe(group: Arc<TargetGroup>, client: HttpClient) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(group.health_check().interval_secs.max(1)));
        loop {
            ticker.tick().await;
            for replica in group.replicas().to_vec() {
                let healthy = probe_replica(&client, &group, replica).await;
                if healthy {
                    group.health().record_success(replica);
                } else {
                    group.health().record_failure(replica);
                    tracing::debug!(
                        target_group = %group.name(),
                        replica = %replica,
                        "health check failed"
                    );
                }
            }
        }
    })
}

async fn probe_replica(client: &HttpClient, group: &TargetGroup, replica: SocketAddr) -> bool {
    let url = format!("http://{}{}", replica, group.health_check().path);
    let request = match Request::builder().uri(&url).body(Body::empty()) {
        Ok(request) => request,
        Err(_) => return false,
    };

    match client.request(request).await {
        Ok(response) => group
            .health_check()
            .healthy_codes
            .contains(response.status().as_u16()),
        Err(_) => false,
    }
}
