use std::env;

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub gateway_host: String,
    pub gateway_port: u16,
    pub service_host: String,
    pub frontend_port: u16,
    pub backend_port: u16,
    pub frontend_replicas: u16,
    pub backend_replicas: u16,
    pub database_host: String,
    pub database_port: u16,
    pub database_name: String,
    pub database_user: String,
    pub secret_name: String,
    pub health_check_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let gateway_host = env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let gateway_port = port_var("GATEWAY_PORT", 8080)?;

        let service_host = env::var("SERVICE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let frontend_port = port_var("FRONTEND_PORT", 3000)?;
        let backend_port = port_var("BACKEND_PORT", 4000)?;

        let frontend_replicas = count_var("FRONTEND_REPLICAS", 1)?;
        let backend_replicas = count_var("BACKEND_REPLICAS", 1)?;

        let database_host =
            env::var("DATABASE_HOST").unwrap_or_else(|_| "ecommerce-db.internal".to_string());
        let database_port = port_var("DATABASE_PORT", 3306)?;
        let database_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "ecommerce".to_string());
        let database_user = env::var("DATABASE_USER").unwrap_or_else(|_| "appuser".to_string());

        let secret_name = env::var("SECRET_NAME").unwrap_or_else(|_| "ecommerce/mysql".to_string());

        let health_check_interval_secs = env::var("HEALTH_CHECK_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("HEALTH_CHECK_INTERVAL_SECS must be a number of seconds")?;

        Ok(Config {
            gateway_host,
            gateway_port,
            service_host,
            frontend_port,
            backend_port,
            frontend_replicas,
            backend_replicas,
            database_host,
            database_port,
            database_name,
            database_user,
            secret_name,
            health_check_interval_secs,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  Gateway listener: {}:{}",
            self.gateway_host,
            self.gateway_port
        );
        tracing::info!(
            "  Frontend service: {} replica(s) on {}:{}",
            self.frontend_replicas,
            self.service_host,
            self.frontend_port
        );
        tracing::info!(
            "  Backend service: {} replica(s) on {}:{}",
            self.backend_replicas,
            self.service_host,
            self.backend_port
        );
        tracing::info!(
            "  Database endpoint: {}:{}/{}",
            self.database_host,
            self.database_port,
            self.database_name
        );
        tracing::info!("  Credentials secret: {}", self.secret_name);
        tracing::info!(
            "  Health check interval: {}s",
            self.health_check_interval_secs
        );
    }
}

fn port_var(name: &str, default: u16) -> Result<u16> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u16>()
        .with_context(|| format!("{} must be a valid port number (0-65535)", name))
}

fn count_var(name: &str, default: u16) -> Result<u16> {
    let count = env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u16>()
        .with_context(|| format!("{} must be a number", name))?;
    if count == 0 {
        bail!("{} must be at least 1 (replica pools are fixed-size)", name);
    }
    Ok(count)
}
