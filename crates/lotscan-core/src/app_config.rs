use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process configuration shared by the CLI and the HTTP server.
///
/// Credentials are carried here and handed to each service constructor;
/// services never read the environment themselves.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub crawl_api_url: String,
    pub crawl_api_key: String,
    pub crawl_timeout_secs: u64,
    pub crawl_max_retries: u32,
    pub crawl_backoff_base_ms: u64,
    pub crawl_rate_limit_wait_ms: u64,
    pub user_agent: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub redirect_max_depth: u32,
    pub pipeline_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("crawl_api_url", &self.crawl_api_url)
            .field("crawl_api_key", &"[redacted]")
            .field("crawl_timeout_secs", &self.crawl_timeout_secs)
            .field("crawl_max_retries", &self.crawl_max_retries)
            .field("crawl_backoff_base_ms", &self.crawl_backoff_base_ms)
            .field("crawl_rate_limit_wait_ms", &self.crawl_rate_limit_wait_ms)
            .field("user_agent", &self.user_agent)
            .field("openai_api_key", &"[redacted]")
            .field("openai_base_url", &self.openai_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("redirect_max_depth", &self.redirect_max_depth)
            .field("pipeline_timeout_secs", &self.pipeline_timeout_secs)
            .finish()
    }
}
