//! Configuration resolution
//!
//! One `Config` value is constructed at process start and passed by
//! reference into the components that need it. Per-field priority order:
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file (`SDOC_CONFIG` or `./sdoc.toml`)
//! 4. Compiled default (fallback)

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::{Error, Result};

/// Process-wide configuration.
///
/// The HTTP server needs `port`; the lifecycle service needs `storage_dir`;
/// `database_path` feeds pool initialization; the remaining fields belong to
/// the pipeline workers and are carried here so all processes share one
/// configuration type.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage_dir: PathBuf,
    pub database_path: PathBuf,
    pub anthropic_api_key: Option<String>,
    pub whisper_model_path: PathBuf,
    pub vision_model_path: PathBuf,
    pub claude_model: String,
    pub silence_threshold_db: f64,
    pub silence_min_duration: f64,
}

/// Command-line overrides forwarded by the binary's argument parser.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub storage_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
}

/// Optional keys accepted from the TOML config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub storage_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub anthropic_api_key: Option<String>,
    pub whisper_model_path: Option<PathBuf>,
    pub vision_model_path: Option<PathBuf>,
    pub claude_model: Option<String>,
    pub silence_threshold_db: Option<f64>,
    pub silence_min_duration: Option<f64>,
}

impl Config {
    /// Resolve configuration from CLI overrides, process environment, the
    /// TOML config file and compiled defaults, in that priority order.
    pub fn resolve(overrides: &Overrides) -> Result<Config> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let toml_config = load_toml_config(&env)?;
        Ok(Self::merge(overrides, &env, &toml_config))
    }

    fn merge(overrides: &Overrides, env: &HashMap<String, String>, toml: &TomlConfig) -> Config {
        let port = overrides
            .port
            .or_else(|| parse_env(env, "SDOC_PORT"))
            .or(toml.port)
            .unwrap_or(3001);

        let storage_dir = overrides
            .storage_dir
            .clone()
            .or_else(|| env.get("SDOC_STORAGE_DIR").map(PathBuf::from))
            .or_else(|| toml.storage_dir.clone())
            .unwrap_or_else(|| PathBuf::from("./storage"));

        let database_path = overrides
            .database_path
            .clone()
            .or_else(|| env.get("SDOC_DATABASE_PATH").map(PathBuf::from))
            .or_else(|| toml.database_path.clone())
            .unwrap_or_else(|| PathBuf::from("./data/sdoc.db"));

        let anthropic_api_key = env
            .get("ANTHROPIC_API_KEY")
            .cloned()
            .or_else(|| toml.anthropic_api_key.clone())
            .filter(|k| !k.trim().is_empty());

        let whisper_model_path = env
            .get("SDOC_WHISPER_MODEL")
            .map(PathBuf::from)
            .or_else(|| toml.whisper_model_path.clone())
            .unwrap_or_else(|| PathBuf::from("./models/ggml-base.en.bin"));

        let vision_model_path = env
            .get("SDOC_VISION_MODEL")
            .map(PathBuf::from)
            .or_else(|| toml.vision_model_path.clone())
            .unwrap_or_else(|| PathBuf::from("./models/vision.gguf"));

        let claude_model = env
            .get("SDOC_CLAUDE_MODEL")
            .cloned()
            .or_else(|| toml.claude_model.clone())
            .unwrap_or_else(|| "claude-sonnet-4-5-20250929".to_string());

        let silence_threshold_db = parse_env(env, "SDOC_SILENCE_THRESHOLD")
            .or(toml.silence_threshold_db)
            .unwrap_or(-30.0);

        let silence_min_duration = parse_env(env, "SDOC_SILENCE_MIN_DURATION")
            .or(toml.silence_min_duration)
            .unwrap_or(1.5);

        Config {
            port,
            storage_dir: absolutize(storage_dir),
            database_path: absolutize(database_path),
            anthropic_api_key,
            whisper_model_path: absolutize(whisper_model_path),
            vision_model_path: absolutize(vision_model_path),
            claude_model,
            silence_threshold_db,
            silence_min_duration,
        }
    }

    /// Log the resolved configuration at startup. Secrets are elided.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  Port: {}", self.port);
        info!("  Storage: {}", self.storage_dir.display());
        info!("  Database: {}", self.database_path.display());
        info!("  Whisper model: {}", self.whisper_model_path.display());
        info!("  Vision model: {}", self.vision_model_path.display());
        info!("  Claude model: {}", self.claude_model);
        if self.anthropic_api_key.is_none() {
            warn!("ANTHROPIC_API_KEY not configured; analysis workers will be unable to run");
        }
    }
}

/// A missing config file is not an error; a malformed one is.
fn load_toml_config(env: &HashMap<String, String>) -> Result<TomlConfig> {
    let path = env
        .get("SDOC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./sdoc.toml"));

    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))
}

fn parse_env<T: std::str::FromStr>(env: &HashMap<String, String>, key: &str) -> Option<T> {
    let raw = env.get(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring unparseable {}={}", key, raw);
            None
        }
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path.strip_prefix(".").unwrap_or(&path)))
            .unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_with_empty_tiers() {
        let config = Config::merge(&Overrides::default(), &HashMap::new(), &TomlConfig::default());
        assert_eq!(config.port, 3001);
        assert!(config.storage_dir.is_absolute());
        assert!(config.storage_dir.ends_with("storage"));
        assert!(config.database_path.ends_with("data/sdoc.db"));
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.silence_threshold_db, -30.0);
    }

    #[test]
    fn cli_beats_env_beats_toml() {
        let mut env = HashMap::new();
        env.insert("SDOC_PORT".to_string(), "4000".to_string());
        let toml = TomlConfig {
            port: Some(5000),
            ..Default::default()
        };

        let from_env = Config::merge(&Overrides::default(), &env, &toml);
        assert_eq!(from_env.port, 4000);

        let overrides = Overrides {
            port: Some(6000),
            ..Default::default()
        };
        let from_cli = Config::merge(&overrides, &env, &toml);
        assert_eq!(from_cli.port, 6000);

        let from_toml = Config::merge(&Overrides::default(), &HashMap::new(), &toml);
        assert_eq!(from_toml.port, 5000);
    }

    #[test]
    fn unparseable_env_falls_through() {
        let mut env = HashMap::new();
        env.insert("SDOC_PORT".to_string(), "not-a-port".to_string());
        let config = Config::merge(&Overrides::default(), &env, &TomlConfig::default());
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn blank_api_key_counts_as_unconfigured() {
        let mut env = HashMap::new();
        env.insert("ANTHROPIC_API_KEY".to_string(), "   ".to_string());
        let config = Config::merge(&Overrides::default(), &env, &TomlConfig::default());
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn toml_config_parses_partial_files() {
        let parsed: TomlConfig = toml::from_str("port = 8080\nstorage_dir = \"/srv/sdoc\"").unwrap();
        assert_eq!(parsed.port, Some(8080));
        assert_eq!(parsed.storage_dir, Some(PathBuf::from("/srv/sdoc")));
        assert!(parsed.claude_model.is_none());
    }
}
