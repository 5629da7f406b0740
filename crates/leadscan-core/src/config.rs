//! Configuration management for leadscan.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::normalize::{PincodeMatcher, DEFAULT_PINCODE_PREFIXES};
use crate::types::DedupPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/leadscan/config.toml` (or platform equivalent)
/// unless an explicit path is given. If the file doesn't exist, default values
/// are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input and output file locations
    pub paths: PathsConfig,
    /// What to search for and how results are identified
    pub search: SearchConfig,
    /// Scan pacing, paging and restart cadence
    pub scanning: ScanningConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// DOM selectors for the map application
    pub selectors: SelectorsConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, falling back to defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides, then validate it.
    ///
    /// Supports the following environment variables:
    /// - `LEADSCAN_HEADLESS`: Override browser headless mode (true/false)
    /// - `LEADSCAN_RESTART_EVERY`: Override the session restart cadence
    /// - `LEADSCAN_MAX_RESULTS`: Override the per-search result cap
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `LEADSCAN_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LEADSCAN_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("LEADSCAN_RESTART_EVERY") {
            if let Ok(every) = val.parse() {
                self.scanning.restart_every = every;
                tracing::debug!("Override scanning.restart_every from env: {}", every);
            }
        }

        if let Ok(val) = std::env::var("LEADSCAN_MAX_RESULTS") {
            if let Ok(max) = val.parse() {
                self.scanning.max_results_per_search = max;
                tracing::debug!("Override scanning.max_results_per_search from env: {}", max);
            }
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        let at_least_one = [
            ("scanning.restart_every", self.scanning.restart_every),
            ("scanning.stable_polls", self.scanning.stable_polls),
            ("scanning.max_scroll_polls", self.scanning.max_scroll_polls),
            (
                "scanning.max_results_per_search",
                self.scanning.max_results_per_search,
            ),
            ("scanning.navigation_retries", self.scanning.navigation_retries),
        ];
        for (field, value) in at_least_one {
            if value == 0 {
                return Err(invalid(field, "must be at least 1"));
            }
        }

        if self.search.categories.iter().all(|c| c.trim().is_empty()) {
            return Err(invalid("search.categories", "at least one category is required"));
        }

        if let Some(category) = self.search.categories.iter().find(|c| c.contains('\n')) {
            return Err(invalid(
                "search.categories",
                &format!("category must be a single line, got {category:?}"),
            ));
        }

        for placeholder in ["{category}", "{zone}"] {
            if !self.search.query_template.contains(placeholder) {
                return Err(invalid(
                    "search.query_template",
                    &format!("must contain {placeholder}"),
                ));
            }
        }

        if self.selectors.phone_buttons.is_empty() {
            return Err(invalid("selectors.phone_buttons", "at least one selector is required"));
        }

        self.search.pincode_matcher()?;
        Ok(())
    }

    /// Save configuration to the default location.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        tracing::debug!("Saving config to {}", path.display());

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the configuration as pretty TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/leadscan/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "leadscan", "leadscan").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Input and output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Tabular list of operational pincodes
    pub zone_file: PathBuf,
    /// Append-only leads output
    pub output_file: PathBuf,
    /// Append-only log of completed `zone,category` units
    pub progress_file: PathBuf,
    /// Destination of `export-contacts`
    pub contacts_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            zone_file: PathBuf::from("operational_pincodes.csv"),
            output_file: PathBuf::from("results/category_discovery_leads.csv"),
            progress_file: PathBuf::from("results/category_discovery_progress.txt"),
            contacts_file: PathBuf::from("results/contacts_10digit.csv"),
        }
    }
}

/// What to search for and how results are identified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Categories (or keywords) searched in every zone
    pub categories: Vec<String>,
    /// Query text with `{category}` and `{zone}` placeholders
    pub query_template: String,
    /// Map search endpoint; the query is appended as a path segment
    pub base_url: String,
    /// Identity used to suppress duplicate leads
    pub dedup_policy: DedupPolicy,
    /// Valid leading digits of a regional pincode
    pub pincode_prefixes: String,
}

impl SearchConfig {
    /// Compile the configured pincode prefixes.
    pub fn pincode_matcher(&self) -> ConfigResult<PincodeMatcher> {
        PincodeMatcher::new(&self.pincode_prefixes)
            .map_err(|e| invalid("search.pincode_prefixes", &e.to_string()))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            categories: [
                "Rice Mill",
                "Hardware Store",
                "Transport Contractor",
                "Catering Service",
                "Agro Product Trader",
                "Tractor Dealer",
                "Fertilizer Shop",
                "Cloth Store",
                "Shoe Store",
                "Garment Manufacturer",
                "Automobile Showroom",
                "Car Service Center",
                "Tire Shop",
                "Fencing Contractor",
                "Computer Hardware Store",
                "Electrical Supply Store",
                "Metal Fabrication",
                "Plumbing Contractor",
                "Cement Dealer",
                "Bakery",
                "Dairy Farm",
                "Poultry Farm",
                "Grocery Wholesaler",
                "Furniture Store",
                "Mattress Store",
                "Medical Shop",
                "Hospital",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            query_template: "{category} in {zone}".to_string(),
            base_url: "https://www.google.com/maps/search/".to_string(),
            dedup_policy: DedupPolicy::Phone,
            pincode_prefixes: DEFAULT_PINCODE_PREFIXES.to_string(),
        }
    }
}

/// Scan pacing, paging and restart cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Stop paging once this many result links are visible
    pub max_results_per_search: usize,
    /// Recycle the browsing session after this many attempted units
    pub restart_every: usize,
    /// Consecutive unchanged result counts that end paging
    pub stable_polls: usize,
    /// Upper bound on scroll/observe cycles per unit
    pub max_scroll_polls: usize,
    /// Delay between a scroll and the next result count, in milliseconds
    pub poll_interval_ms: u64,
    /// Navigation attempts per unit
    pub navigation_retries: usize,
    /// Base backoff between navigation attempts, in milliseconds
    pub retry_delay_ms: u64,
    /// How long to wait for the first result link, in seconds
    pub results_timeout_secs: u64,
    /// How long to wait for a detail panel title, in seconds
    pub detail_timeout_secs: u64,
    /// Minimum pause between units in milliseconds (jittered up to double)
    pub unit_delay_ms: u64,
}

impl ScanningConfig {
    /// Delay between paging polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Base backoff between navigation attempts.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Wait for the first result link.
    #[must_use]
    pub fn results_timeout(&self) -> Duration {
        Duration::from_secs(self.results_timeout_secs)
    }

    /// Wait for a detail panel title.
    #[must_use]
    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    /// Minimum pause between units.
    #[must_use]
    pub fn unit_delay(&self) -> Duration {
        Duration::from_millis(self.unit_delay_ms)
    }
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            max_results_per_search: 100,
            restart_every: 15,
            stable_polls: 3,
            max_scroll_polls: 60,
            poll_interval_ms: 1000,
            navigation_retries: 3,
            retry_delay_ms: 4000,
            results_timeout_secs: 10,
            detail_timeout_secs: 3,
            unit_delay_ms: 0,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
}

impl BrowserConfig {
    /// Navigation timeout as a duration.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 720,
            navigation_timeout_secs: 60,
        }
    }
}

/// DOM selectors for the map application's result feed and detail panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorsConfig {
    /// Scrollable result list
    pub result_feed: String,
    /// One link per result listing
    pub result_link: String,
    /// Marker shown when a search has no results
    pub no_results: Option<String>,
    /// Business name heading in the detail panel
    pub detail_title: String,
    /// Phone buttons, tried in order
    pub phone_buttons: Vec<String>,
    /// Attribute holding the phone text on a phone button
    pub phone_attribute: String,
    /// Whole detail panel, used for the regex phone fallback
    pub panel: String,
    /// Category button in the detail panel
    pub category_button: String,
    /// Address button in the detail panel
    pub address_button: String,
    /// Attribute holding the address on the address button
    pub address_attribute: String,
    /// Label prefix stripped from the address text
    pub address_label: String,
    /// Titles meaning the panel did not load a specific business
    pub title_placeholders: Vec<String>,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            result_feed: "div[role='feed']".to_string(),
            result_link: "a[href*='/place/']".to_string(),
            no_results: None,
            detail_title: "div[role='main'] h1".to_string(),
            phone_buttons: vec![
                "button[aria-label^='Phone:']".to_string(),
                "button[aria-label^='Call:']".to_string(),
            ],
            phone_attribute: "aria-label".to_string(),
            panel: "div[role='main']".to_string(),
            category_button: "button[jsaction*='category']".to_string(),
            address_button: "button[data-item-id='address']".to_string(),
            address_attribute: "aria-label".to_string(),
            address_label: "Address:".to_string(),
            title_placeholders: vec!["Results".to_string()],
        }
    }
}
