use config::ConfigError;

use crate::error::SettingsError;

const MIN_SECRET_LENGTH: usize = 32;
/// Ten years, in seconds
const MAX_TOKEN_EXPIRY: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token signing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry: i64,   // seconds (e.g., 900 for 15 minutes)
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry: i64,  // seconds (e.g., 604800 for 7 days)
    pub issuer: String,
}

impl JwtSettings {
    /// Reject key material and lifetimes the service cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(SettingsError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }
        for (name, expiry) in [
            ("jwt.access_token_expiry", self.access_token_expiry),
            ("jwt.refresh_token_expiry", self.refresh_token_expiry),
        ] {
            if !(1..=MAX_TOKEN_EXPIRY).contains(&expiry) {
                return Err(SettingsError::InvalidValue(format!(
                    "{} must be between 1 and {} seconds, got {}",
                    name, MAX_TOKEN_EXPIRY, expiry
                )));
            }
        }
        if self.issuer.trim().is_empty() {
            return Err(SettingsError::MissingRequired("jwt.issuer".to_string()));
        }
        Ok(())
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct PasswordSettings {
    /// bcrypt work factor
    pub hash_cost: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(4..=31).contains(&self.hash_cost) {
            return Err(SettingsError::InvalidValue(format!(
                "password.hash_cost must be between 4 and 31, got {}",
                self.hash_cost
            )));
        }
        Ok(())
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.jwt.validate()?;
        self.password.validate()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_expiry() -> i64 {
    900
}

fn default_refresh_expiry() -> i64 {
    604_800
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
