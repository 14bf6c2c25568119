mod api_doc;
mod config;
mod deploy;
mod error;
mod gateway;
mod handlers;
mod models;
mod routes;
mod secrets;
mod services;
mod state;
mod topology;

use config::Config;
use secrets::SecretStore;
use topology::StackPlan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("ecommerce-stack starting");

    let config = Config::from_env()?;
    config.log_startup();

    let plan = StackPlan::synthesize(&config)?;
    plan.log_synthesis();

    let mut store = SecretStore::new();
    let mut deployment = deploy::deploy(&plan, &config, &mut store).await?;

    for output in deployment.outputs() {
        tracing::info!("{} = {} ({})", output.key, output.value, output.description);
    }
    tracing::info!(addr = %deployment.gateway_addr(), "stack deployed");

    deployment.wait().await
}
