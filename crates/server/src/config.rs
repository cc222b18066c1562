//! Configuration loading and management

use anyhow::{Context, Result, bail};
use gemm_adapters::credentials::MySqlSettings;
use gemm_adapters::posts::MongoSettings;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub mysql: MySqlConfig,

    #[serde(default)]
    pub mongo: MongoConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MySqlConfig {
    #[serde(default = "default_mysql_host")]
    pub host: String,

    #[serde(default = "default_mysql_port")]
    pub port: u16,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_mysql_user")]
    pub user: String,

    #[serde(default = "default_mysql_password_env")]
    pub password_env: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// CA certificate used to verify the server; plain connections when unset
    #[serde(default)]
    pub ssl_ca: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    #[serde(default = "default_mongo_uri")]
    pub uri: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_mongo_user_env")]
    pub user_env: String,

    #[serde(default = "default_mongo_password_env")]
    pub password_env: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_secret_env")]
    pub token_secret_env: String,

    #[serde(default = "default_issuer")]
    pub issuer: String,

    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    #[serde(default = "default_weather_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_mysql_host() -> String {
    "localhost".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_database() -> String {
    "gemm".to_string()
}

fn default_mysql_user() -> String {
    "fred".to_string()
}

fn default_mysql_password_env() -> String {
    "DB_PASSWORD".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_collection() -> String {
    "posts".to_string()
}

fn default_mongo_user_env() -> String {
    "MONGODB_USER".to_string()
}

fn default_mongo_password_env() -> String {
    "MONGODB_PASSWORD".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_token_secret_env() -> String {
    "TOKEN_SECRET".to_string()
}

fn default_issuer() -> String {
    gemm_domain::TOKEN_ISSUER.to_string()
}

fn default_token_ttl() -> i64 {
    gemm_domain::TOKEN_TTL_SECS
}

fn default_weather_base_url() -> String {
    "http://api.weatherapi.com".to_string()
}

fn default_weather_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_weather_timeout() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            host: default_mysql_host(),
            port: default_mysql_port(),
            database: default_database(),
            user: default_mysql_user(),
            password_env: default_mysql_password_env(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            ssl_ca: None,
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: default_mongo_uri(),
            database: default_database(),
            collection: default_collection(),
            user_env: default_mongo_user_env(),
            password_env: default_mongo_password_env(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret_env: default_token_secret_env(),
            issuer: default_issuer(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            api_key_env: default_weather_api_key_env(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("GEMM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn mysql_settings(&self) -> MySqlSettings {
        let mysql = &self.mysql;
        MySqlSettings {
            host: mysql.host.clone(),
            port: mysql.port,
            database: mysql.database.clone(),
            user: mysql.user.clone(),
            password: optional_secret(&mysql.password_env)
                .unwrap_or_else(|| SecretString::new(String::new().into())),
            max_connections: mysql.max_connections,
            acquire_timeout: Duration::from_secs(mysql.acquire_timeout_secs),
            ssl_ca: mysql.ssl_ca.clone(),
        }
    }

    pub fn mongo_settings(&self) -> MongoSettings {
        let mongo = &self.mongo;
        MongoSettings {
            uri: mongo.uri.clone(),
            database: mongo.database.clone(),
            collection: mongo.collection.clone(),
            user: optional_env(&mongo.user_env),
            password: optional_secret(&mongo.password_env),
            connect_timeout: Duration::from_secs(mongo.connect_timeout_secs),
        }
    }

    /// Token signing secret; the server refuses to start without one
    pub fn token_secret(&self) -> Result<SecretString> {
        load_secret(&self.auth.token_secret_env, "token signing")
    }

    /// Weather API key; lookups fail upstream when it is missing
    pub fn weather_api_key(&self) -> Option<SecretString> {
        optional_secret(&self.weather.api_key_env)
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# gemm configuration
# Every key can be overridden from the environment, e.g. GEMM__SERVER__PORT=8080

[server]
host = "0.0.0.0"
port = 3000

[mysql]
host = "localhost"
port = 3306
database = "gemm"
user = "fred"
password_env = "DB_PASSWORD"
max_connections = 5
acquire_timeout_secs = 30
# ssl_ca = "./certs/ca-certificate.crt"

[mongo]
uri = "mongodb://localhost:27017"
database = "gemm"
collection = "posts"
user_env = "MONGODB_USER"
password_env = "MONGODB_PASSWORD"
connect_timeout_secs = 10

[auth]
token_secret_env = "TOKEN_SECRET"
issuer = "gemm"
token_ttl_secs = 3600

[weather]
base_url = "http://api.weatherapi.com"
api_key_env = "API_KEY"
timeout_secs = 10
"#
        .to_string()
    }
}

/// Read a required secret from the named environment variable
pub(crate) fn load_secret(env_var: &str, purpose: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No env var configured for the {} secret", purpose);
    }

    let value = std::env::var(env_var)
        .with_context(|| format!("Missing env var {} for the {} secret", env_var, purpose))?;

    if value.trim().is_empty() {
        bail!("Env var {} is empty for the {} secret", env_var, purpose);
    }

    Ok(SecretString::new(value.into()))
}

fn optional_env(env_var: &str) -> Option<String> {
    if env_var.trim().is_empty() {
        return None;
    }
    std::env::var(env_var).ok().filter(|v| !v.is_empty())
}

fn optional_secret(env_var: &str) -> Option<SecretString> {
    optional_env(env_var).map(|v| SecretString::new(v.into()))
}
