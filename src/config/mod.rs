/// Configuration management for the stepwise engine
///
/// Handles server binding, engine limits and streaming behaviour.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Execution engine limits
    pub engine: EngineConfig,
    /// WebSocket streaming configuration
    pub stream: StreamConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Execution engine limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hard ceiling on steps per run; reaching it ends the run without error
    pub max_steps: usize,
    /// Maximum number of completed runs kept in memory (0 = unbounded)
    pub run_store_capacity: usize,
}

/// Live step streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Pause after each streamed step so clients can follow along (0 = none)
    pub step_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            run_store_capacity: 1024,
        }
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        let engine_defaults = EngineConfig::default();

        Self {
            server: ServerConfig {
                host: std::env::var("STEPWISE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_or("STEPWISE_PORT", 8000),
            },
            engine: EngineConfig {
                max_steps: env_or("STEPWISE_MAX_STEPS", engine_defaults.max_steps),
                run_store_capacity: env_or(
                    "STEPWISE_RUN_STORE_CAPACITY",
                    engine_defaults.run_store_capacity,
                ),
            },
            stream: StreamConfig {
                step_delay_ms: env_or("STEPWISE_STREAM_DELAY_MS", 500),
            },
        }
    }
}

/// Parse an environment variable, falling back when it is unset or malformed
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let engine = EngineConfig::default();
        assert_eq!(engine.max_steps, 100);
        assert_eq!(engine.run_store_capacity, 1024);
    }

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(env_or("STEPWISE_TEST_UNSET_VARIABLE", 7u16), 7);
    }
}
