//! Service configuration.
//!
//! Configuration is an explicit value built once at startup and handed to
//! the components that need it. Sources, lowest precedence first: built-in
//! defaults, an optional TOML file, then `FLEETFLOW__*` environment
//! variables (`FLEETFLOW__SERVER__PORT=9000`, `FLEETFLOW__API_KEY=...`).

use crate::tools::{DEFAULT_COMPONENT, DEFAULT_DRIVER_ID};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FLEETFLOW";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("Configuration error: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value was read but is unusable.
    #[error("Invalid configuration value for '{key}': {reason}")]
    Invalid {
        /// The offending key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl SettingsError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// URL advertised in the agent card; derived from host and port when unset.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_url: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    pub json: bool,
    /// Log every pipeline and stage lifecycle event.
    pub log_intermediate_steps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_intermediate_steps: false,
        }
    }
}

/// JSON-RPC configuration, for both serving and calling a remote agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Method name that runs the agent.
    pub method: String,
    /// Endpoint of the remote agent service.
    pub remote_url: String,
    /// Request timeout when calling the remote agent.
    pub timeout_seconds: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            method: "agent.run".to_string(),
            remote_url: "http://127.0.0.1:9999".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl RpcConfig {
    /// Returns the remote call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Configuration of the local maintenance agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Driver seeded into every agent run.
    pub default_driver_id: String,
    /// Component seeded into every agent run.
    pub default_component: String,
    /// Regex locating the vehicle id inside a prompt.
    pub vehicle_id_pattern: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default_driver_id: DEFAULT_DRIVER_ID.to_string(),
            default_component: DEFAULT_COMPONENT.to_string(),
            vehicle_id_pattern: r"\b[A-Z][A-Z0-9]*-\d+\b".to_string(),
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Key expected in the `x-api-key` header of chat requests.
    pub api_key: String,
    /// Model name reported by the service.
    pub model: String,
    /// Logging.
    pub logging: LoggingConfig,
    /// JSON-RPC.
    pub rpc: RpcConfig,
    /// Local agent.
    pub agent: AgentConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api_key: "fleetflow-maintenance-key".to_string(),
            model: "watsonx:ibm/granite-3-8b-instruct".to_string(),
            logging: LoggingConfig::default(),
            rpc: RpcConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from an optional file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks values that deserialize fine but cannot work.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` naming the first bad key.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.api_key.trim().is_empty() {
            return Err(SettingsError::invalid("api_key", "must not be empty"));
        }
        if self.rpc.method.trim().is_empty() {
            return Err(SettingsError::invalid("rpc.method", "must not be empty"));
        }
        if let Err(e) = regex::Regex::new(&self.agent.vehicle_id_pattern) {
            return Err(SettingsError::invalid(
                "agent.vehicle_id_pattern",
                e.to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the `host:port` pair to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Returns the URL advertised to other services.
    #[must_use]
    pub fn public_url(&self) -> String {
        self.server
            .public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.bind_address()))
    }

    /// Returns the model name without its provider prefix.
    ///
    /// `watsonx:ibm/granite-3-8b-instruct` becomes `ibm/granite-3-8b-instruct`.
    #[must_use]
    pub fn model_display_name(&self) -> &str {
        self.model
            .split_once(':')
            .map_or(self.model.as_str(), |(_, name)| name)
    }
}
