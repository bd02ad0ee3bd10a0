use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SEC: u64 = 30;
const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

fn default_timeout_sec() -> u64 {
    DEFAULT_TIMEOUT_SEC
}

fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}

/// `modules.api_ingress` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port`; empty means "use `server.host`/`server.port`".
    #[serde(default)]
    pub bind_addr: String,
    #[serde(default)]
    pub enable_docs: bool,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_timeout_sec")]
    pub request_timeout_sec: u64,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            enable_docs: false,
            cors_enabled: false,
            request_timeout_sec: DEFAULT_TIMEOUT_SEC,
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}
