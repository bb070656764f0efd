use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub relevance: RelevanceConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Game service REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Account username - loaded from env PGO_USERNAME
    #[serde(default)]
    pub username: String,
    /// Account password - loaded from env PGO_PASSWORD
    #[serde(default)]
    pub password: String,
    /// Auth provider identifier passed through to session init
    #[serde(default = "default_auth_provider")]
    pub auth_provider: String,
    /// Named place or literal "lat,lon" pair - loaded from env PGO_LOCATION
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Seconds between poll cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Latitude/longitude delta applied per offset step, in degrees.
    #[serde(default = "default_offset_deg")]
    pub offset_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelevanceConfig {
    /// Species never worth a notification, regardless of rarity.
    #[serde(default)]
    pub ignore_species: Vec<String>,
    /// Species reported as uncommon.
    #[serde(default = "default_uncommon_species")]
    pub uncommon_species: Vec<String>,
    /// Species reported as rare.
    #[serde(default = "default_rare_species")]
    pub rare_species: Vec<String>,
    /// Species reported as ultra-rare.
    #[serde(default = "default_ultra_rare_species")]
    pub ultra_rare_species: Vec<String>,
    /// Common spawns further away than this are dropped.
    #[serde(default = "default_max_common_distance")]
    pub max_common_distance_m: f64,
    /// Lowest tier worth a notification ("common", "uncommon", "rare",
    /// "ultra-rare"). Unrecognized labels fall back to "common".
    #[serde(default = "default_min_report_tier")]
    pub min_report_tier: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Slack-compatible webhook URL - loaded from env SLACK_WEBHOOK_URL.
    /// Empty disables delivery; notifications are still logged locally.
    #[serde(default)]
    pub webhook_url: String,
    /// Reverse-geocode endpoint (Nominatim-compatible).
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_api_url() -> String {
    "https://pgorelease.nianticlabs.com/plfe".to_string()
}
fn default_auth_provider() -> String {
    "google".to_string()
}
fn default_interval_secs() -> u64 {
    60
}
fn default_offset_deg() -> f64 {
    0.000315
}
fn default_uncommon_species() -> Vec<String> {
    [
        "pikachu", "vulpix", "growlithe", "abra", "machop", "magmar",
        "electabuzz", "eevee", "jynx", "scyther", "pinsir",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_rare_species() -> Vec<String> {
    [
        "bulbasaur", "charmander", "squirtle", "dratini", "dragonair",
        "lapras", "snorlax", "porygon", "chansey", "gyarados", "kabuto",
        "omanyte", "hitmonlee", "hitmonchan",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_ultra_rare_species() -> Vec<String> {
    [
        "ditto", "aerodactyl", "dragonite", "articuno", "zapdos", "moltres",
        "mewtwo", "mew",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_max_common_distance() -> f64 {
    1_000.0
}
fn default_min_report_tier() -> String {
    "common".to_string()
}
fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            username: String::new(),
            password: String::new(),
            auth_provider: default_auth_provider(),
            location: String::new(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            offset_deg: default_offset_deg(),
        }
    }
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            ignore_species: Vec::new(),
            uncommon_species: default_uncommon_species(),
            rare_species: default_rare_species(),
            ultra_rare_species: default_ultra_rare_species(),
            max_common_distance_m: default_max_common_distance(),
            min_report_tier: default_min_report_tier(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            geocode_url: default_geocode_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Where to anchor the session: a place name the game service resolves
/// itself, or literal coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSpec {
    Named(String),
    Coords { latitude: f64, longitude: f64 },
}

impl LocationSpec {
    /// Parse a location string. A "lat,lon" pair of floats is taken as
    /// literal coordinates; anything else is a named place.
    pub fn parse(raw: &str) -> Self {
        if let Some((lat, lon)) = raw.split_once(',') {
            if let (Ok(latitude), Ok(longitude)) =
                (lat.trim().parse::<f64>(), lon.trim().parse::<f64>())
            {
                return LocationSpec::Coords {
                    latitude,
                    longitude,
                };
            }
        }
        LocationSpec::Named(raw.trim().to_string())
    }
}

impl Config {
    /// Load config from a TOML file, then overlay environment variables for secrets.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.overlay_env();
        config.validate()?;
        Ok(config)
    }

    /// Load a default config with env-only settings (no file needed).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config {
            game: GameConfig {
                api_url: std::env::var("PGO_API_URL").unwrap_or_else(|_| default_api_url()),
                ..GameConfig::default()
            },
            poll: PollConfig::default(),
            relevance: RelevanceConfig::default(),
            notify: NotifyConfig::default(),
            logging: LoggingConfig::default(),
        };
        config.overlay_env();
        config.validate()?;
        Ok(config)
    }

    // Secrets and deployment-specific settings come from the environment,
    // never from the config file.
    fn overlay_env(&mut self) {
        if let Ok(username) = std::env::var("PGO_USERNAME") {
            self.game.username = username;
        }
        if let Ok(password) = std::env::var("PGO_PASSWORD") {
            self.game.password = password;
        }
        if let Ok(location) = std::env::var("PGO_LOCATION") {
            self.game.location = location;
        }
        if let Ok(provider) = std::env::var("PGO_PROVIDER") {
            self.game.auth_provider = provider;
        }
        if let Ok(url) = std::env::var("SLACK_WEBHOOK_URL") {
            self.notify.webhook_url = url;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.game.username.is_empty() {
            return Err(ConfigError::Missing("game.username / PGO_USERNAME"));
        }
        if self.game.password.is_empty() {
            return Err(ConfigError::Missing("game.password / PGO_PASSWORD"));
        }
        if self.game.location.is_empty() {
            return Err(ConfigError::Missing("game.location / PGO_LOCATION"));
        }
        Ok(())
    }

    pub fn location(&self) -> LocationSpec {
        LocationSpec::parse(&self.game.location)
    }

    pub fn webhook_url(&self) -> Option<&str> {
        if self.notify.webhook_url.is_empty() {
            None
        } else {
            Some(&self.notify.webhook_url)
        }
    }
}
