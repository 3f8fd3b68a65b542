use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use size_fit::{DecodeLimits, SearchOptions};

/// Deployment environment, selects CORS policy.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

/// Application configuration loaded from an optional YAML file plus
/// environment overrides
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,

    /// Maximum upload size in bytes
    pub max_file_size: usize,

    /// Rate limit window in seconds
    pub rate_limit_window_secs: u64,

    /// Requests allowed per client within one window
    pub max_requests_per_minute: usize,

    /// Key rate limits on `X-Forwarded-For` / `X-Real-IP` when present.
    /// Only enable behind a reverse proxy that overwrites these headers.
    pub trust_proxy_headers: bool,

    /// Origins allowed by CORS in production
    pub allowed_origins: Vec<String>,

    /// Lowercase extensions including the leading dot
    pub allowed_extensions: HashSet<String>,

    pub allowed_mime_types: HashSet<String>,

    pub max_image_width: u32,
    pub max_image_height: u32,

    pub min_quality: u8,
    pub max_quality: u8,

    pub min_size_kb: u32,
    pub max_size_kb: u32,
    pub default_size_kb: u32,

    pub max_search_iterations: usize,

    /// Concurrent CPU-bound image jobs
    pub max_concurrent_jobs: usize,
}

const DEFAULT_FRONTEND_URL: &str = "https://your-domain.com";

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl Default for AppConfig {
    fn default() -> Self {
        let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            environment: Environment::Development,
            max_file_size: 10 * 1024 * 1024,
            rate_limit_window_secs: 60,
            max_requests_per_minute: 30,
            trust_proxy_headers: false,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
                "http://localhost:10000".to_string(),
                DEFAULT_FRONTEND_URL.to_string(),
            ],
            allowed_extensions: set(&[
                ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".tiff", ".tif",
            ]),
            allowed_mime_types: set(&[
                "image/jpeg",
                "image/png",
                "image/gif",
                "image/webp",
                "image/bmp",
                "image/tiff",
            ]),
            max_image_width: 8000,
            max_image_height: 8000,
            min_quality: 10,
            max_quality: 95,
            min_size_kb: 10,
            max_size_kb: 1000,
            default_size_kb: 100,
            max_search_iterations: 100,
            max_concurrent_jobs: default_concurrency(),
        }
    }
}

impl AppConfig {
    /// Load configuration: YAML file if given, then environment overrides.
    pub fn load(config_file: Option<&Path>) -> Self {
        let mut config = match config_file {
            Some(path) => Self::from_file(path),
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());

        tracing::info!(
            environment = ?config.environment,
            max_file_size = config.max_file_size,
            max_requests_per_minute = config.max_requests_per_minute,
            max_concurrent_jobs = config.max_concurrent_jobs,
            "Loaded configuration"
        );
        config
    }

    /// Parse a YAML config file, falling back to defaults on any failure
    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Apply `ENVIRONMENT`, `MAX_FILE_SIZE`, `MAX_REQUESTS_PER_MINUTE`,
    /// `TRUST_PROXY_HEADERS`, `FRONTEND_URL` and `MAX_CONCURRENT_JOBS` from a
    /// variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(env) = lookup("ENVIRONMENT") {
            self.environment = Environment::parse(&env);
        }
        if let Some(size) = lookup("MAX_FILE_SIZE").and_then(|v| v.parse().ok()) {
            self.max_file_size = size;
        }
        if let Some(limit) = lookup("MAX_REQUESTS_PER_MINUTE").and_then(|v| v.parse().ok()) {
            self.max_requests_per_minute = limit;
        }
        if let Some(trust) = lookup("TRUST_PROXY_HEADERS").and_then(|v| parse_flag(&v)) {
            self.trust_proxy_headers = trust;
        }
        if let Some(jobs) = lookup("MAX_CONCURRENT_JOBS")
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
        {
            self.max_concurrent_jobs = jobs;
        }
        if let Some(url) = lookup("FRONTEND_URL") {
            self.allowed_origins.retain(|o| o != DEFAULT_FRONTEND_URL);
            if !self.allowed_origins.contains(&url) {
                self.allowed_origins.push(url);
            }
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            min_quality: self.min_quality,
            max_quality: self.max_quality,
            max_iterations: self.max_search_iterations,
            max_dimension: self.max_image_width.max(self.max_image_height),
            ..SearchOptions::default()
        }
    }

    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_width: self.max_image_width,
            max_height: self.max_image_height,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
