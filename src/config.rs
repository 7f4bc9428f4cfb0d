use crate::core::SearchPolicy;
use crate::models::MatchThresholds;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub bluesky: BlueskySettings,
    #[serde(default)]
    #[validate(nested)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    #[validate(nested)]
    pub search: SearchSettings,
    #[serde(default)]
    #[validate(nested)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BlueskySettings {
    #[serde(default = "default_service_url")]
    #[validate(url)]
    pub service_url: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "set BSKY_USERNAME"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "set BSKY_APP_PASSWORD"))]
    pub app_password: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for BlueskySettings {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            username: String::new(),
            app_password: String::new(),
            request_timeout_secs: None,
        }
    }
}

fn default_service_url() -> String { "https://bsky.social".to_string() }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateLimitSettings {
    #[serde(default = "default_max_calls")]
    #[validate(range(min = 1))]
    pub max_calls: usize,
    #[serde(default = "default_period_secs")]
    #[validate(range(min = 1))]
    pub period_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_calls: default_max_calls(),
            period_secs: default_period_secs(),
        }
    }
}

fn default_max_calls() -> usize { 100 }
fn default_period_secs() -> u64 { 86_400 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchSettings {
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    #[validate(range(min = 1))]
    pub max_pages: usize,
    #[serde(default = "default_page_delay_secs")]
    pub page_delay_secs: u64,
    #[serde(default = "default_throttle_buffer_secs")]
    pub throttle_buffer_secs: u64,
    #[serde(default = "default_max_throttle_retries")]
    pub max_throttle_retries: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            page_delay_secs: default_page_delay_secs(),
            throttle_buffer_secs: default_throttle_buffer_secs(),
            max_throttle_retries: default_max_throttle_retries(),
        }
    }
}

fn default_page_size() -> u32 { 100 }
fn default_max_pages() -> usize { 1 }
fn default_page_delay_secs() -> u64 { 1 }
fn default_throttle_buffer_secs() -> u64 { 1 }
fn default_max_throttle_retries() -> u32 { 5 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MatchingSettings {
    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: usize,
    #[serde(default = "default_min_token_coverage")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_token_coverage: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_edit_distance: default_max_edit_distance(),
            min_token_coverage: default_min_token_coverage(),
        }
    }
}

fn default_max_edit_distance() -> usize { 2 }
fn default_min_token_coverage() -> f64 { 0.7 }

#[derive(Debug, Clone, Deserialize)]
pub struct RunSettings {
    #[serde(default = "default_input_file")]
    pub input_file: PathBuf,
    #[serde(default = "default_output_dir_prefix")]
    pub output_dir_prefix: String,
    #[serde(default = "default_organization_delay_secs")]
    pub organization_delay_secs: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            input_file: default_input_file(),
            output_dir_prefix: default_output_dir_prefix(),
            organization_delay_secs: default_organization_delay_secs(),
        }
    }
}

fn default_input_file() -> PathBuf { PathBuf::from("test_orgs.csv") }
fn default_output_dir_prefix() -> String { "uk_research_orgs".to_string() }
fn default_organization_delay_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ORGSEARCH__)
    /// 5. BSKY_USERNAME / BSKY_APP_PASSWORD
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ORGSEARCH__SEARCH__MAX_PAGES -> search.max_pages
            .add_source(
                Environment::with_prefix("ORGSEARCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings)?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("ORGSEARCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings)?;

        Ok(settings.try_deserialize()?)
    }

    /// Reject missing credentials and out-of-range values before any search starts
    pub fn check(&self) -> Result<(), SettingsError> {
        Ok(self.validate()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.bluesky.request_timeout_secs.unwrap_or(30))
    }

    pub fn rate_limit_period(&self) -> Duration {
        Duration::from_secs(self.rate_limit.period_secs)
    }

    pub fn organization_delay(&self) -> Duration {
        Duration::from_secs(self.run.organization_delay_secs)
    }

    pub fn search_policy(&self) -> SearchPolicy {
        SearchPolicy {
            page_size: self.search.page_size,
            max_pages: self.search.max_pages,
            page_delay: Duration::from_secs(self.search.page_delay_secs),
            throttle_buffer: Duration::from_secs(self.search.throttle_buffer_secs),
            max_throttle_retries: self.search.max_throttle_retries,
        }
    }

    pub fn match_thresholds(&self) -> MatchThresholds {
        MatchThresholds {
            max_edit_distance: self.matching.max_edit_distance,
            min_token_coverage: self.matching.min_token_coverage,
        }
    }
}

/// Apply the credential variables the tool has always read
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let username = env::var("BSKY_USERNAME").ok().filter(|v| !v.is_empty());
    let app_password = env::var("BSKY_APP_PASSWORD").ok().filter(|v| !v.is_empty());

    let mut builder = Config::builder().add_source(settings);

    if let Some(username) = username {
        builder = builder.set_override("bluesky.username", username)?;
    }
    if let Some(app_password) = app_password {
        builder = builder.set_override("bluesky.app_password", app_password)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = from_toml("[bluesky]\nusername = \"me.bsky.social\"\napp_password = \"xxxx\"\n");

        assert_eq!(settings.bluesky.service_url, "https://bsky.social");
        assert_eq!(settings.rate_limit.max_calls, 100);
        assert_eq!(settings.rate_limit_period(), Duration::from_secs(86_400));
        assert_eq!(settings.search.max_pages, 1);
        assert_eq!(settings.match_thresholds(), MatchThresholds::default());
        assert_eq!(settings.run.input_file, PathBuf::from("test_orgs.csv"));
        assert_eq!(settings.logging.format, "json");
        assert!(settings.check().is_ok());
    }

    #[test]
    fn test_search_policy_from_settings() {
        let settings = from_toml(
            "[bluesky]\nusername = \"u\"\napp_password = \"p\"\n\n[search]\nmax_pages = 3\npage_delay_secs = 2\nmax_throttle_retries = 1\n",
        );

        let policy = settings.search_policy();

        assert_eq!(policy.max_pages, 3);
        assert_eq!(policy.page_size, 100);
        assert_eq!(policy.page_delay, Duration::from_secs(2));
        assert_eq!(policy.max_throttle_retries, 1);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let settings = from_toml("");

        match settings.check() {
            Err(SettingsError::Invalid(errors)) => assert!(errors.errors().contains_key("bluesky")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let settings = from_toml(
            "[bluesky]\nusername = \"u\"\napp_password = \"p\"\n\n[search]\nmax_pages = 0\n\n[matching]\nmin_token_coverage = 1.5\n",
        );

        assert!(settings.check().is_err());
    }
}
