use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub scheduler: SchedulerConfig,
    pub matcher: MatcherConfig,
    pub services: ServicesConfig,
}

/// Per-adapter fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// At most this many adapters in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Hard timeout for a single adapter call.
    #[serde(default = "default_adapter_timeout_secs")]
    pub adapter_timeout_secs: u64,

    /// Overall deadline for one scrape pass. In-flight adapters are
    /// abandoned when it expires.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

/// Matching and gap-report policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatcherConfig {
    /// A requirement counts as matched when its best similarity is at
    /// least this (0–100).
    #[serde(default = "default_accept_threshold")]
    pub accept_threshold: u8,

    /// Jobs scoring below this are dropped from the ranked result.
    #[serde(default = "default_min_score")]
    pub min_score: u8,

    #[serde(default = "default_max_gaps")]
    pub max_gaps: usize,
}

/// External AI service endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServicesConfig {
    #[serde(default = "default_extractor_url")]
    pub extractor_url: String,

    #[serde(default = "default_extractor_timeout_secs")]
    pub extractor_timeout_secs: u64,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 {
    20
}
fn default_request_delay_ms() -> u64 {
    2500
}
fn default_jitter_ms() -> u64 {
    500
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}
fn default_max_results() -> usize {
    25
}
fn default_concurrency() -> usize {
    3
}
fn default_adapter_timeout_secs() -> u64 {
    45
}
fn default_deadline_secs() -> u64 {
    120
}
fn default_accept_threshold() -> u8 {
    80
}
fn default_min_score() -> u8 {
    50
}
fn default_max_gaps() -> usize {
    5
}
fn default_extractor_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_extractor_timeout_secs() -> u64 {
    30
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("JOBSCOUT").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            scheduler: SchedulerConfig::default(),
            matcher: MatcherConfig::default(),
            services: ServicesConfig::default(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            jitter_ms: default_jitter_ms(),
            user_agent: default_user_agent(),
            max_results: default_max_results(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            adapter_timeout_secs: default_adapter_timeout_secs(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            accept_threshold: default_accept_threshold(),
            min_score: default_min_score(),
            max_gaps: default_max_gaps(),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            extractor_url: default_extractor_url(),
            extractor_timeout_secs: default_extractor_timeout_secs(),
        }
    }
}
