// Route path constants - single source of truth for all service paths

pub const ROOT: &str = "/";
pub const HEALTH: &str = "/health";
pub const API_ROOT: &str = "/api";
pub const API_HEALTH: &str = "/api/health";
pub const API_OPENAPI: &str = "/api/openapi.json";
