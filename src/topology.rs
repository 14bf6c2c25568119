use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::SynthesisError;
use crate::routes;
use crate::secrets::{SecretField, SecretSpec};

// Service and target group names
pub const FRONTEND: &str = "frontend";
pub const BACKEND: &str = "backend";

// Security group names
pub const SG_LOAD_BALANCER: &str = "load-balancer";
pub const SG_FRONTEND: &str = "frontend-service";
pub const SG_BACKEND: &str = "backend-service";
pub const SG_DATABASE: &str = "database";

// Task environment keys
pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_DB_USERNAME: &str = "DB_USERNAME";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";

const TASK_CPU: u32 = 512;
const TASK_MEMORY_MIB: u32 = 1024;
const API_RULE_PRIORITY: u32 = 10;
const HEALTHY_CODES: &str = "200-399";
const UNHEALTHY_THRESHOLD: u32 = 2;

/// Subnet tiers of the declared network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetTier {
    /// Routable from the internet; hosts the listener and the service pools
    Public,
    /// No route to the internet; hosts the database
    Isolated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetPlan {
    pub name: String,
    pub tier: SubnetTier,
    pub cidr_mask: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlan {
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub subnets: Vec<SubnetPlan>,
}

/// Source of an ingress rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peer {
    AnyIpv4,
    Group(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressRule {
    pub peer: Peer,
    pub port: u16,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupPlan {
    pub name: String,
    pub ingress: Vec<IngressRule>,
}

/// Target architecture for container image builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    LinuxAmd64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuild {
    pub context: String,
    pub platform: Platform,
}

/// A task environment value.
///
/// `FromSecret` and `LoadBalancerUrl` are deploy-time tokens: the plan never
/// carries the secret value or the bound listener address, only references
/// that the launcher resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Plain(String),
    FromSecret { secret: String, field: SecretField },
    LoadBalancerUrl { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePlan {
    pub name: String,
    pub cpu: u32,
    pub memory_mib: u32,
    pub container_port: u16,
    pub desired_count: u16,
    pub subnet_tier: SubnetTier,
    pub security_group: String,
    pub image: ImageBuild,
    pub env: BTreeMap<String, EnvValue>,
    pub target_group: String,
}

/// Inclusive range of HTTP status codes counted as healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpCodeRange {
    lo: u16,
    hi: u16,
}

impl HttpCodeRange {
    pub fn parse(range: &str) -> Result<Self, SynthesisError> {
        let invalid = || SynthesisError::InvalidHealthyCodes(range.to_string());
        let (lo, hi) = range.split_once('-').ok_or_else(invalid)?;
        let lo = lo.parse::<u16>().map_err(|_| invalid())?;
        let hi = hi.parse::<u16>().map_err(|_| invalid())?;
        if lo > hi {
            return Err(invalid());
        }
        Ok(HttpCodeRange { lo, hi })
    }

    pub fn contains(&self, code: u16) -> bool {
        (self.lo..=self.hi).contains(&code)
    }
}

impl std::fmt::Display for HttpCodeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckPlan {
    pub path: String,
    pub healthy_codes: HttpCodeRange,
    pub interval_secs: u64,
    pub unhealthy_threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroupPlan {
    pub name: String,
    pub port: u16,
    pub health_check: HealthCheckPlan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerRulePlan {
    pub priority: u32,
    pub path_patterns: Vec<String>,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerPlan {
    pub port: u16,
    pub rules: Vec<ListenerRulePlan>,
    pub default_target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePlan {
    pub engine: String,
    pub engine_version: String,
    pub name: String,
    pub instance_class: String,
    pub allocated_storage_gib: u32,
    pub max_allocated_storage_gib: u32,
    pub multi_az: bool,
    pub publicly_accessible: bool,
    pub subnet_tier: SubnetTier,
    pub security_group: String,
    pub endpoint_host: String,
    pub port: u16,
    pub credentials_secret: String,
}

impl DatabasePlan {
    /// Endpoint socket address, host:port.
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.endpoint_host, self.port)
    }
}

/// A deployment-time output value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutput {
    pub key: &'static str,
    pub value: String,
    pub description: &'static str,
}

/// The complete declared topology.
///
/// Synthesis is a pure function of configuration, so redeclaring with the
/// same configuration yields an equal plan. The plan is immutable once
/// synthesized; `validate` runs as the last step of synthesis and rejects
/// any topology that breaks the declared invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackPlan {
    pub network: NetworkPlan,
    pub security_groups: Vec<SecurityGroupPlan>,
    pub secret: SecretSpec,
    pub database: DatabasePlan,
    pub services: Vec<ServicePlan>,
    pub target_groups: Vec<TargetGroupPlan>,
    pub listener: ListenerPlan,
}

impl StackPlan {
    pub fn synthesize(config: &Config) -> Result<Self, SynthesisError> {
        let network = NetworkPlan {
            max_azs: 2,
            nat_gateways: 0,
            subnets: vec![
                SubnetPlan {
                    name: "public".to_string(),
                    tier: SubnetTier::Public,
                    cidr_mask: 24,
                },
                SubnetPlan {
                    name: "private".to_string(),
                    tier: SubnetTier::Isolated,
                    cidr_mask: 24,
                },
            ],
        };

        let security_groups = vec![
            SecurityGroupPlan {
                name: SG_LOAD_BALANCER.to_string(),
                ingress: vec![IngressRule {
                    peer: Peer::AnyIpv4,
                    port: config.gateway_port,
                    description: "Allow HTTP traffic from the internet".to_string(),
                }],
            },
            SecurityGroupPlan {
                name: SG_FRONTEND.to_string(),
                ingress: vec![IngressRule {
                    peer: Peer::Group(SG_LOAD_BALANCER.to_string()),
                    port: config.frontend_port,
                    description: "Allow the listener to reach the frontend replicas".to_string(),
                }],
            },
            SecurityGroupPlan {
                name: SG_BACKEND.to_string(),
                ingress: vec![IngressRule {
                    peer: Peer::Group(SG_LOAD_BALANCER.to_string()),
                    port: config.backend_port,
                    description: "Allow the listener to reach the backend replicas".to_string(),
                }],
            },
            SecurityGroupPlan {
                name: SG_DATABASE.to_string(),
                ingress: vec![IngressRule {
                    peer: Peer::Group(SG_BACKEND.to_string()),
                    port: config.database_port,
                    description: "Allow backend replicas to connect to MySQL".to_string(),
                }],
            },
        ];

        let secret = SecretSpec {
            name: config.secret_name.clone(),
            template_username: config.database_user.clone(),
            generate_key: "password".to_string(),
            exclude_punctuation: true,
        };

        let database = DatabasePlan {
            engine: "mysql".to_string(),
            engine_version: "8.0.43".to_string(),
            name: config.database_name.clone(),
            instance_class: "db.t3.micro".to_string(),
            allocated_storage_gib: 20,
            max_allocated_storage_gib: 100,
            multi_az: false,
            publicly_accessible: false,
            subnet_tier: SubnetTier::Isolated,
            security_group: SG_DATABASE.to_string(),
            endpoint_host: config.database_host.clone(),
            port: config.database_port,
            credentials_secret: config.secret_name.clone(),
        };

        let mut frontend_env = BTreeMap::new();
        frontend_env.insert(
            ENV_API_BASE_URL.to_string(),
            EnvValue::LoadBalancerUrl {
                path: routes::API_ROOT.to_string(),
            },
        );

        let mut backend_env = BTreeMap::new();
        backend_env.insert(
            ENV_DB_HOST.to_string(),
            EnvValue::Plain(database.endpoint_host.clone()),
        );
        backend_env.insert(
            ENV_DB_PORT.to_string(),
            EnvValue::Plain(database.port.to_string()),
        );
        backend_env.insert(
            ENV_DB_NAME.to_string(),
            EnvValue::Plain(database.name.clone()),
        );
        backend_env.insert(
            ENV_DB_USERNAME.to_string(),
            EnvValue::FromSecret {
                secret: secret.name.clone(),
                field: SecretField::Username,
            },
        );
        backend_env.insert(
            ENV_DB_PASSWORD.to_string(),
            EnvValue::FromSecret {
                secret: secret.name.clone(),
                field: SecretField::Password,
            },
        );

        let services = vec![
            ServicePlan {
                name: FRONTEND.to_string(),
                cpu: TASK_CPU,
                memory_mib: TASK_MEMORY_MIB,
                container_port: config.frontend_port,
                desired_count: config.frontend_replicas,
                subnet_tier: SubnetTier::Public,
                security_group: SG_FRONTEND.to_string(),
                image: ImageBuild {
                    context: "container_images/frontend".to_string(),
                    platform: Platform::LinuxAmd64,
                },
                env: frontend_env,
                target_group: FRONTEND.to_string(),
            },
            ServicePlan {
                name: BACKEND.to_string(),
                cpu: TASK_CPU,
                memory_mib: TASK_MEMORY_MIB,
                container_port: config.backend_port,
                desired_count: config.backend_replicas,
                subnet_tier: SubnetTier::Public,
                security_group: SG_BACKEND.to_string(),
                image: ImageBuild {
                    context: "container_images/backend".to_string(),
                    platform: Platform::LinuxAmd64,
                },
                env: backend_env,
                target_group: BACKEND.to_string(),
            },
        ];

        let health_check = HealthCheckPlan {
            path: routes::ROOT.to_string(),
            healthy_codes: HttpCodeRange::parse(HEALTHY_CODES)?,
            interval_secs: config.health_check_interval_secs,
            unhealthy_threshold: UNHEALTHY_THRESHOLD,
        };

        let target_groups = vec![
            TargetGroupPlan {
                name: FRONTEND.to_string(),
                port: config.frontend_port,
                health_check: health_check.clone(),
            },
            TargetGroupPlan {
                name: BACKEND.to_string(),
                port: config.backend_port,
                health_check,
            },
        ];

        let listener = ListenerPlan {
            port: config.gateway_port,
            rules: vec![ListenerRulePlan {
                priority: API_RULE_PRIORITY,
                path_patterns: vec!["/api*".to_string(), "/api/*".to_string()],
                target: BACKEND.to_string(),
            }],
            default_target: FRONTEND.to_string(),
        };

        let plan = StackPlan {
            network,
            security_groups,
            secret,
            database,
            services,
            target_groups,
            listener,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Checks every invariant of the declared topology.
    pub fn validate(&self) -> Result<(), SynthesisError> {
        for tier in [SubnetTier::Public, SubnetTier::Isolated] {
            if !self.network.subnets.iter().any(|s| s.tier == tier) {
                return Err(SynthesisError::MissingSubnetTier(format!("{:?}", tier)));
            }
        }

        self.validate_database_isolation()?;
        self.validate_listener()?;
        self.validate_services()?;

        Ok(())
    }

    fn validate_database_isolation(&self) -> Result<(), SynthesisError> {
        if self.database.subnet_tier != SubnetTier::Isolated {
            return Err(SynthesisError::DatabaseExposed(format!(
                "placed in the {:?} tier",
                self.database.subnet_tier
            )));
        }
        if self.database.publicly_accessible {
            return Err(SynthesisError::DatabaseExposed(
                "declared publicly accessible".to_string(),
            ));
        }

        let backend_sg = self
            .services
            .iter()
            .find(|s| s.name == BACKEND)
            .map(|s| s.security_group.clone())
            .ok_or_else(|| SynthesisError::UnattachedTargetGroup(BACKEND.to_string()))?;

        let db_sg = self
            .security_groups
            .iter()
            .find(|sg| sg.name == self.database.security_group)
            .ok_or_else(|| {
                SynthesisError::DatabaseExposed(format!(
                    "security group '{}' is not declared",
                    self.database.security_group
                ))
            })?;

        for rule in &db_sg.ingress {
            match &rule.peer {
                Peer::Group(group) if *group == backend_sg => {}
                peer => {
                    return Err(SynthesisError::DatabaseExposed(format!(
                        "admits traffic from {:?} on port {}",
                        peer, rule.port
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_listener(&self) -> Result<(), SynthesisError> {
        for rule in &self.listener.rules {
            if !self.target_groups.iter().any(|tg| tg.name == rule.target) {
                return Err(SynthesisError::UnknownRuleTarget {
                    priority: rule.priority,
                    target: rule.target.clone(),
                });
            }
        }

        let api_rules: Vec<&ListenerRulePlan> = self
            .listener
            .rules
            .iter()
            .filter(|r| {
                r.path_patterns
                    .iter()
                    .any(|p| p.starts_with(routes::API_ROOT))
            })
            .collect();
        match api_rules.as_slice() {
            [rule] if rule.target == BACKEND => {}
            [rule] => return Err(SynthesisError::ApiRuleTarget(rule.target.clone())),
            rules => return Err(SynthesisError::ApiRuleCount(rules.len())),
        }

        if self.listener.default_target != FRONTEND {
            return Err(SynthesisError::BadDefaultTarget(
                self.listener.default_target.clone(),
            ));
        }

        Ok(())
    }

    fn validate_services(&self) -> Result<(), SynthesisError> {
        for group in &self.target_groups {
            let attached = self
                .services
                .iter()
                .filter(|s| s.target_group == group.name)
                .count();
            if attached != 1 {
                return Err(SynthesisError::UnattachedTargetGroup(group.name.clone()));
            }
        }

        for service in &self.services {
            if service.desired_count == 0 {
                return Err(SynthesisError::NoReplicas(service.name.clone()));
            }
            for value in service.env.values() {
                if let EnvValue::FromSecret { secret, .. } = value {
                    if *secret != self.secret.name {
                        return Err(SynthesisError::UnknownSecret {
                            service: service.name.clone(),
                            secret: secret.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Logs a one-screen summary of the synthesized plan.
    pub fn log_synthesis(&self) {
        tracing::info!("Stack plan synthesized:");
        tracing::info!(
            "  Network: {} AZs, {} NAT gateways, {} subnets",
            self.network.max_azs,
            self.network.nat_gateways,
            self.network.subnets.len()
        );
        for subnet in &self.network.subnets {
            tracing::info!(
                "    subnet {} ({:?}, /{})",
                subnet.name,
                subnet.tier,
                subnet.cidr_mask
            );
        }
        for sg in &self.security_groups {
            for rule in &sg.ingress {
                tracing::debug!(
                    "  SG {}: {:?} -> :{} ({})",
                    sg.name,
                    rule.peer,
                    rule.port,
                    rule.description
                );
            }
        }
        tracing::info!(
            "  Database: {} {} on {} ({:?} tier, {}-{} GiB, multi-az: {}, secret: {})",
            self.database.engine,
            self.database.engine_version,
            self.database.instance_class,
            self.database.subnet_tier,
            self.database.allocated_storage_gib,
            self.database.max_allocated_storage_gib,
            self.database.multi_az,
            self.database.credentials_secret
        );
        for service in &self.services {
            tracing::info!(
                "  Service {}: {} replica(s), port {}, cpu {}, memory {} MiB, {:?} tier, image {}",
                service.name,
                service.desired_count,
                service.container_port,
                service.cpu,
                service.memory_mib,
                service.subnet_tier,
                service.image.context
            );
        }
        for group in &self.target_groups {
            tracing::info!(
                "  Target group {}: port {}, health check {} ({}) every {}s",
                group.name,
                group.port,
                group.health_check.path,
                group.health_check.healthy_codes,
                group.health_check.interval_secs
            );
        }
        tracing::info!(
            "  Listener: port {}, {} rule(s), default target {}",
            self.listener.port,
            self.listener.rules.len(),
            self.listener.default_target
        );
    }

    pub fn service(&self, name: &str) -> Option<&ServicePlan> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn target_group(&self, name: &str) -> Option<&TargetGroupPlan> {
        self.target_groups.iter().find(|tg| tg.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            gateway_host: "0.0.0.0".to_string(),
            gateway_port: 8080,
            service_host: "127.0.0.1".to_string(),
            frontend_port: 3000,
            backend_port: 4000,
            frontend_replicas: 1,
            backend_replicas: 1,
            database_host: "ecommerce-db.internal".to_string(),
            database_port: 3306,
            database_name: "ecommerce".to_string(),
            database_user: "appuser".to_string(),
            secret_name: "ecommerce/mysql".to_string(),
            health_check_interval_secs: 30,
        }
    }

    fn synth() -> StackPlan {
        StackPlan::synthesize(&test_config()).unwrap()
    }

    #[test]
    fn test_network_declares_public_and_isolated_tiers() {
        let plan = synth();

        assert_eq!(plan.network.max_azs, 2);
        assert_eq!(plan.network.nat_gateways, 0);
        assert_eq!(plan.network.subnets.len(), 2);
        assert!(plan.network.subnets.iter().all(|s| s.cidr_mask == 24));
    }

    #[test]
    fn test_secret_is_declared_with_expected_name_and_template() {
        let plan = synth();

        assert_eq!(plan.secret.name, "ecommerce/mysql");
        assert_eq!(plan.secret.template_username, "appuser");
        assert_eq!(plan.secret.generate_key, "password");
        assert!(plan.secret.exclude_punctuation);
    }

    #[test]
    fn test_database_uses_mysql_with_expected_configuration() {
        let plan = synth();

        assert_eq!(plan.database.engine, "mysql");
        assert_eq!(plan.database.engine_version, "8.0.43");
        assert_eq!(plan.database.name, "ecommerce");
        assert_eq!(plan.database.instance_class, "db.t3.micro");
        assert_eq!(plan.database.allocated_storage_gib, 20);
        assert_eq!(plan.database.max_allocated_storage_gib, 100);
        assert!(!plan.database.multi_az);
        assert!(!plan.database.publicly_accessible);
        assert_eq!(plan.database.credentials_secret, plan.secret.name);
        assert_eq!(plan.database.socket_address(), "ecommerce-db.internal:3306");
    }

    #[test]
    fn test_two_services_are_declared() {
        let plan = synth();

        assert_eq!(plan.services.len(), 2);
        for service in &plan.services {
            assert_eq!(service.cpu, 512);
            assert_eq!(service.memory_mib, 1024);
            assert_eq!(service.subnet_tier, SubnetTier::Public);
            assert_eq!(service.image.platform, Platform::LinuxAmd64);
        }
    }

    #[test]
    fn test_frontend_task_exposes_http_port_and_api_env() {
        let plan = synth();
        let frontend = plan.service(FRONTEND).unwrap();

        assert_eq!(frontend.container_port, 3000);
        assert_eq!(frontend.image.context, "container_images/frontend");
        assert_eq!(
            frontend.env.get(ENV_API_BASE_URL),
            Some(&EnvValue::LoadBalancerUrl {
                path: "/api".to_string()
            })
        );
    }

    #[test]
    fn test_backend_task_exposes_http_port_and_secrets() {
        let plan = synth();
        let backend = plan.service(BACKEND).unwrap();

        assert_eq!(backend.container_port, 4000);
        assert_eq!(backend.image.context, "container_images/backend");
        assert_eq!(
            backend.env.get(ENV_DB_NAME),
            Some(&EnvValue::Plain("ecommerce".to_string()))
        );
        assert_eq!(
            backend.env.get(ENV_DB_HOST),
            Some(&EnvValue::Plain("ecommerce-db.internal".to_string()))
        );

        // Credentials are references into the secret store, never values.
        assert_eq!(
            backend.env.get(ENV_DB_USERNAME),
            Some(&EnvValue::FromSecret {
                secret: "ecommerce/mysql".to_string(),
                field: crate::secrets::SecretField::Username,
            })
        );
        assert_eq!(
            backend.env.get(ENV_DB_PASSWORD),
            Some(&EnvValue::FromSecret {
                secret: "ecommerce/mysql".to_string(),
                field: crate::secrets::SecretField::Password,
            })
        );
    }

    #[test]
    fn test_listener_routes_api_prefix_to_backend() {
        let plan = synth();

        assert_eq!(plan.listener.port, 8080);
        assert_eq!(plan.listener.default_target, FRONTEND);
        assert_eq!(plan.listener.rules.len(), 1);

        let rule = &plan.listener.rules[0];
        assert_eq!(rule.priority, 10);
        assert_eq!(rule.path_patterns, vec!["/api*", "/api/*"]);
        assert_eq!(rule.target, BACKEND);
    }

    #[test]
    fn test_target_groups_carry_health_checks() {
        let plan = synth();

        assert_eq!(plan.target_groups.len(), 2);
        for group in &plan.target_groups {
            assert_eq!(group.health_check.path, "/");
            assert_eq!(group.health_check.interval_secs, 30);
            assert!(group.health_check.healthy_codes.contains(200));
            assert!(group.health_check.healthy_codes.contains(399));
            assert!(!group.health_check.healthy_codes.contains(404));
        }
    }

    #[test]
    fn test_database_is_unreachable_from_the_public_tier() {
        let plan = synth();

        assert_eq!(plan.database.subnet_tier, SubnetTier::Isolated);

        let db_sg = plan
            .security_groups
            .iter()
            .find(|sg| sg.name == SG_DATABASE)
            .unwrap();
        assert_eq!(db_sg.ingress.len(), 1);
        assert_eq!(db_sg.ingress[0].peer, Peer::Group(SG_BACKEND.to_string()));
        assert_eq!(db_sg.ingress[0].port, 3306);

        // Only the listener's security group is open to the internet.
        for sg in &plan.security_groups {
            let open = sg.ingress.iter().any(|r| r.peer == Peer::AnyIpv4);
            assert_eq!(open, sg.name == SG_LOAD_BALANCER);
        }
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        assert_eq!(synth(), synth());
    }

    #[test]
    fn test_validate_rejects_database_in_public_tier() {
        let mut plan = synth();
        plan.database.subnet_tier = SubnetTier::Public;

        let err = plan.validate().unwrap_err();
        assert!(matches!(err, SynthesisError::DatabaseExposed(_)));
    }

    #[test]
    fn test_validate_rejects_open_database_security_group() {
        let mut plan = synth();
        plan.security_groups
            .iter_mut()
            .find(|sg| sg.name == SG_DATABASE)
            .unwrap()
            .ingress
            .push(IngressRule {
                peer: Peer::AnyIpv4,
                port: 3306,
                description: "open to the world".to_string(),
            });

        let err = plan.validate().unwrap_err();
        assert!(matches!(err, SynthesisError::DatabaseExposed(_)));
    }

    #[test]
    fn test_validate_rejects_missing_api_rule() {
        let mut plan = synth();
        plan.listener.rules.clear();

        assert_eq!(plan.validate().unwrap_err(), SynthesisError::ApiRuleCount(0));
    }

    #[test]
    fn test_validate_rejects_api_rule_pointed_at_frontend() {
        let mut plan = synth();
        plan.listener.rules[0].target = FRONTEND.to_string();

        assert_eq!(
            plan.validate().unwrap_err(),
            SynthesisError::ApiRuleTarget(FRONTEND.to_string())
        );
    }

    #[test]
    fn test_validate_rejects_unknown_rule_target() {
        let mut plan = synth();
        plan.listener.rules[0].target = "search".to_string();
        // Keep the target group list unchanged so the rule dangles.

        assert_eq!(
            plan.validate().unwrap_err(),
            SynthesisError::UnknownRuleTarget {
                priority: 10,
                target: "search".to_string()
            }
        );
    }

    #[test]
    fn test_http_code_range_parsing() {
        let range = HttpCodeRange::parse("200-399").unwrap();
        assert!(range.contains(302));
        assert!(!range.contains(500));
        assert_eq!(range.to_string(), "200-399");

        assert!(HttpCodeRange::parse("ok").is_err());
        assert!(HttpCodeRange::parse("399-200").is_err());
    }
}
