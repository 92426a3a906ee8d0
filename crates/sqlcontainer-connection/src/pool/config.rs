//! Pool configuration types

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlcontainer_core::{ConnectInfo, Result, SqlContainerError};

/// Default number of connections opened on first reservation
pub const DEFAULT_INITIAL_SIZE: usize = 5;

/// Default upper bound on reserved connections
pub const DEFAULT_MAX_SIZE: usize = 20;

fn default_initial_size() -> usize {
    DEFAULT_INITIAL_SIZE
}

fn default_max_size() -> usize {
    DEFAULT_MAX_SIZE
}

/// Configuration for a connection pool
///
/// Immutable once built. This is the part of a pool that survives a
/// process boundary; live connections never do. Every way of obtaining
/// one, deserialization included, runs `validate`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPoolConfig")]
pub struct PoolConfig {
    /// Driver identity, also used to pick dialect-specific session setup
    driver: String,
    /// Connection URI handed to the driver
    uri: String,
    user: String,
    password: String,
    /// Connections opened when the pool initializes
    initial_size: usize,
    /// Maximum number of simultaneously reserved connections
    max_size: usize,
}

/// Unchecked wire form of `PoolConfig`
#[derive(Deserialize)]
struct RawPoolConfig {
    driver: String,
    uri: String,
    user: String,
    password: String,
    #[serde(default = "default_initial_size")]
    initial_size: usize,
    #[serde(default = "default_max_size")]
    max_size: usize,
}

impl TryFrom<RawPoolConfig> for PoolConfig {
    type Error = SqlContainerError;

    fn try_from(raw: RawPoolConfig) -> Result<Self> {
        let config = Self {
            driver: raw.driver,
            uri: raw.uri,
            user: raw.user,
            password: raw.password,
            initial_size: raw.initial_size,
            max_size: raw.max_size,
        };
        config.validate()?;
        Ok(config)
    }
}

impl PoolConfig {
    /// Create a configuration with default sizing.
    ///
    /// Fails with a configuration error if any of the four connectivity
    /// fields is empty.
    pub fn new(
        driver: impl Into<String>,
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            driver: driver.into(),
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            initial_size: DEFAULT_INITIAL_SIZE,
            max_size: DEFAULT_MAX_SIZE,
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the sizing policy
    pub fn with_sizes(mut self, initial_size: usize, max_size: usize) -> Result<Self> {
        self.initial_size = initial_size;
        self.max_size = max_size;
        self.validate()?;
        Ok(self)
    }

    /// Check mandatory fields and sizing.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("driver", &self.driver),
            ("uri", &self.uri),
            ("user", &self.user),
            ("password", &self.password),
        ] {
            if value.is_empty() {
                return Err(SqlContainerError::Configuration(format!(
                    "{} must be specified",
                    name
                )));
            }
        }
        if self.max_size == 0 {
            return Err(SqlContainerError::Configuration(
                "max_size must be greater than 0".to_string(),
            ));
        }
        if self.initial_size > self.max_size {
            return Err(SqlContainerError::Configuration(format!(
                "initial_size ({}) cannot exceed max_size ({})",
                self.initial_size, self.max_size
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let raw: RawPoolConfig = toml::from_str(toml_str)?;
        PoolConfig::try_from(raw)
    }

    /// Read a TOML pool configuration from disk
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pool config: {:?}", path))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid pool config: {:?}", path))
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn initial_size(&self) -> usize {
        self.initial_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Connectivity settings in the form drivers consume
    pub fn connect_info(&self) -> ConnectInfo {
        ConnectInfo {
            driver: self.driver.clone(),
            uri: self.uri.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("driver", &self.driver)
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("initial_size", &self.initial_size)
            .field("max_size", &self.max_size)
            .finish()
    }
}
