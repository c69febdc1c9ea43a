use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Flight-search backend the storefront talks to.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 { 15 }

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackendKind {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_session_id")]
    pub id: String,
    #[serde(default)]
    pub backend: SessionBackendKind,
    pub redis_url: Option<String>,
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_session_id() -> String { "default".to_string() }
fn default_session_ttl() -> u64 { 60 * 60 * 12 }
fn default_namespace() -> String { "farelane".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_skeleton_window")]
    pub skeleton_window_ms: u64,
    #[serde(default = "default_reveal_interval")]
    pub reveal_interval_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_ensure_iterations")]
    pub ensure_max_iterations: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    #[serde(default = "default_true")]
    pub restrict_past_dates: bool,
    #[serde(default = "default_cabin")]
    pub default_cabin_class: String,
    /// JSON file with the airline reference list.
    #[serde(default)]
    pub airlines_path: Option<String>,
}

fn default_skeleton_window() -> u64 { 600 }
fn default_reveal_interval() -> u64 { 250 }
fn default_page_size() -> u32 { 20 }
fn default_ensure_iterations() -> u32 { 10 }
fn default_max_limit() -> u32 { 500 }
fn default_true() -> bool { true }
fn default_cabin() -> String { "economy".to_string() }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            skeleton_window_ms: default_skeleton_window(),
            reveal_interval_ms: default_reveal_interval(),
            page_size: default_page_size(),
            ensure_max_iterations: default_ensure_iterations(),
            max_limit: default_max_limit(),
            restrict_past_dates: default_true(),
            default_cabin_class: default_cabin(),
            airlines_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `FARELANE_SESSION__BACKEND=redis` sets `session.backend`
            .add_source(config::Environment::with_prefix("FARELANE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
