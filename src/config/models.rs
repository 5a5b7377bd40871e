use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    /// Ordered target pages; position in the list is the target id
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            fetcher: FetcherConfig::default(),
            aggregator: AggregatorConfig::default(),
            targets: default_targets(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8888
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// Total per-request timeout (connect, headers and body)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: ByteSize,
    /// Treat non-2xx responses as failed fetches
    #[serde(default)]
    pub fail_on_http_error: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            max_body_bytes: default_max_body_bytes(),
            fail_on_http_error: false,
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    format!(
        "Mozilla/5.0 (compatible; linkcount/{})",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_accept_language() -> String {
    "es-ES".to_string()
}

fn default_max_body_bytes() -> ByteSize {
    ByteSize(10 * 1024 * 1024) // 10 MB
}

/// Batch fan-out settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AggregatorConfig {
    /// Upper bound on concurrently running fetches; unset means one per target
    #[serde(default)]
    pub max_parallelism: Option<usize>,
}

fn default_targets() -> Vec<String> {
    [
        "https://go.dev",
        "https://www.paradigmadigital.com",
        "https://www.realpython.com",
        "https://www.lapatilla.com",
        "https://www.facebook.com",
        "https://www.gitlab.com",
        "https://www.youtube.com",
        "https://www.mozilla.org",
        "https://www.github.com",
        "https://www.google.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
