//! The launcher: stands in for the provisioning engine.
//!
//! Takes a validated stack plan and brings it up in-process: materializes
//! the credentials secret, resolves deploy-time env tokens, binds the
//! fixed-size replica pools, starts health probing, and serves the public
//! listener.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::gateway::{
    self, GatewayState, RuleSet, TargetGroup, TargetRegistry, spawn_health_probe,
};
use crate::secrets::{SecretRef, SecretStore};
use crate::services;
use crate::state::BackendState;
use crate::topology::{self, EnvValue, StackOutput, StackPlan};

/// A running rendition of the stack.
///
/// Dropping it tears everything down; `wait` parks on the listener task,
/// which normally runs until the process is killed.
pub struct Deployment {
    outputs: Vec<StackOutput>,
    gateway_addr: SocketAddr,
    gateway_task: JoinHandle<()>,
    service_tasks: Vec<JoinHandle<()>>,
    probe_tasks: Vec<JoinHandle<()>>,
}

impl Deployment {
    pub fn outputs(&self) -> &[StackOutput] {
        &self.outputs
    }

    pub fn gateway_addr(&self) -> SocketAddr {
        self.gateway_addr
    }

    pub async fn wait(&mut self) -> Result<()> {
        (&mut self.gateway_task)
            .await
            .context("gateway listener task failed")
    }
}

impl Drop for Deployment {
    fn drop(&mut self) {
        self.gateway_task.abort();
        for task in self.service_tasks.iter().chain(self.probe_tasks.iter()) {
            task.abort();
        }
    }
}

pub async fn deploy(
    plan: &StackPlan,
    config: &Config,
    store: &mut SecretStore,
) -> Result<Deployment> {
    // Bind the listener socket first so the load-balancer URL token can be
    // resolved before any service env is.
    let listener = TcpListener::bind((config.gateway_host.as_str(), plan.listener.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind listener on {}:{}",
                config.gateway_host, plan.listener.port
            )
        })?;
    let gateway_addr = listener
        .local_addr()
        .context("listener has no local address")?;
    let lb_url = format!("http://{}:{}", config.gateway_host, gateway_addr.port());

    let secret_handle = store.materialize(&plan.secret);
    tracing::info!(
        secret = store.name_of(&secret_handle.id).unwrap_or("unknown"),
        version = %secret_handle.version,
        created = ?store.created_at(&secret_handle.id),
        "database credentials materialized"
    );
    let secret_ids = HashMap::from([(secret_handle.name.clone(), secret_handle.id.clone())]);

    let mut registry = TargetRegistry::new();
    let mut service_tasks = Vec::new();

    for service in &plan.services {
        let env = resolve_env(&service.env, store, &secret_ids, &lb_url)
            .with_context(|| format!("failed to resolve env for service '{}'", service.name))?;

        let mut replicas = Vec::with_capacity(service.desired_count as usize);
        for i in 0..service.desired_count {
            let port = if service.container_port == 0 {
                0
            } else {
                service.container_port + i
            };
            let router = match service.name.as_str() {
                topology::BACKEND => {
                    services::backend::backend_router(BackendState::from_task_env(&env))
                }
                topology::FRONTEND => {
                    let api_base_url = env
                        .get(topology::ENV_API_BASE_URL)
                        .cloned()
                        .unwrap_or_else(|| lb_url.clone());
                    services::frontend::frontend_router(api_base_url)
                }
                other => bail!("no container image wired for service '{}'", other),
            };
            let (addr, task) = services::spawn(router, &config.service_host, port).await?;
            tracing::info!(service = %service.name, replica = i, addr = %addr, "replica started");
            replicas.push(addr);
            service_tasks.push(task);
        }

        let group_plan = plan.target_group(&service.target_group).with_context(|| {
            format!(
                "service '{}' attaches to undeclared target group '{}'",
                service.name, service.target_group
            )
        })?;
        registry.insert(TargetGroup::new(
            &group_plan.name,
            replicas,
            group_plan.health_check.clone(),
        ));
    }

    let targets = Arc::new(registry);

    let probe_client = gateway::http_client();
    let probe_tasks: Vec<JoinHandle<()>> = targets
        .groups()
        .map(|group| spawn_health_probe(group.clone(), probe_client.clone()))
        .collect();

    let rules = RuleSet::from_listener(&plan.listener);
    tracing::info!(
        default_target = rules.default_target(),
        "listener rules compiled"
    );
    let state = GatewayState::new(rules, targets);
    let app = gateway::gateway_router(state);
    let gateway_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "listener stopped serving");
        }
    });
    tracing::info!(addr = %gateway_addr, "public listener started");

    let frontend_image = plan
        .service(topology::FRONTEND)
        .map(|s| s.image.context.clone())
        .context("plan declares no frontend service")?;
    let backend_image = plan
        .service(topology::BACKEND)
        .map(|s| s.image.context.clone())
        .context("plan declares no backend service")?;

    let outputs = vec![
        StackOutput {
            key: "LoadBalancerUrl",
            value: lb_url,
            description: "Public endpoint for the ecommerce frontend",
        },
        StackOutput {
            key: "FrontendImageContext",
            value: frontend_image,
            description: "Build context for the frontend container image",
        },
        StackOutput {
            key: "BackendImageContext",
            value: backend_image,
            description: "Build context for the backend container image",
        },
        StackOutput {
            key: "DatabaseSecretId",
            value: secret_handle.id,
            description: "Secret store id holding the database credentials",
        },
        StackOutput {
            key: "DatabaseEndpoint",
            value: plan.database.socket_address(),
            description: "Endpoint and port for the MySQL database",
        },
    ];

    Ok(Deployment {
        outputs,
        gateway_addr,
        gateway_task,
        service_tasks,
        probe_tasks,
    })
}

/// Resolves a declared env map into concrete values.
///
/// Secret references are looked up in the store; the load-balancer URL
/// token is filled in from the bound listener address.
fn resolve_env(
    env: &BTreeMap<String, EnvValue>,
    store: &SecretStore,
    secret_ids: &HashMap<String, String>,
    lb_url: &str,
) -> Result<BTreeMap<String, String>> {
    let mut resolved = BTreeMap::new();
    for (key, value) in env {
        let value = match value {
            EnvValue::Plain(value) => value.clone(),
            EnvValue::LoadBalancerUrl { path } => format!("{}{}", lb_url, path),
            EnvValue::FromSecret { secret, field } => {
                let id = secret_ids
                    .get(secret)
                    .with_context(|| format!("secret '{}' was never materialized", secret))?;
                store
                    .resolve(&SecretRef {
                        secret_id: id.clone(),
                        field: *field,
                    })
                    .with_context(|| format!("secret '{}' has no stored value", secret))?
                    .to_string()
            }
        };
        resolved.insert(key.clone(), value);
    }
    Ok(resolved)
}
