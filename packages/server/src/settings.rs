//! Layered server configuration.
//!
//! Built-in defaults, then an optional `config.toml` in the working directory,
//! then environment variables prefixed `VAULT` with `__` between path segments
//! (`VAULT__DATABASE__HOST`, `VAULT__CRYPTO__ENCRYPTION_KEY`).

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    /// Take the audit source address from `X-Forwarded-For`. Only turn on
    /// behind a reverse proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Server {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
}

impl Database {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

#[derive(Deserialize)]
pub struct Crypto {
    /// 64 hex characters. No default: the server refuses to start without one.
    pub encryption_key: String,
}

impl std::fmt::Debug for Crypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crypto")
            .field("encryption_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct Session {
    /// Mark the cookie `Secure`. Turn on behind HTTPS.
    pub secure: bool,
    pub expiry_hours: i64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub crypto: Crypto,
    pub session: Session,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_sources(Environment::with_prefix("VAULT").separator("__"))
    }

    fn from_sources(env: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.trust_forwarded_for", false)?
            .set_default("database.user", "vault")?
            .set_default("database.password", "password")?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.database", "vault")?
            .set_default("database.max_connections", 5)?
            .set_default("session.secure", false)?
            .set_default("session.expiry_hours", 24 * 7)?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(env)
            .build()?;

        config.try_deserialize()
    }
}
