//! Configuration for the relay server.
//!
//! Settings come from three places, strongest first: command-line flags parsed with
//! `arrrg`, a config file (`config.json` by default, YAML when the extension says so),
//! and built-in defaults.  The provider credential is the one setting without a default:
//! it must come from the config file or the `THINKRELAY_API_KEY` environment variable,
//! and the process refuses to start without it.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::Deserialize;

use crate::client::{API_KEY_ENV, DEFAULT_PROVIDER_URL, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use crate::types::{DEFAULT_MODEL_ID, ModelDescriptor, ModelRegistry};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Address the relay binds when `--bind` is not given.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Contents of a config file.  Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigFile {
    /// Provider credential.
    #[serde(default, rename = "GROQ_API_KEY", alias = "api_key")]
    pub api_key: Option<String>,

    /// Base URL of the provider's OpenAI-compatible API.
    pub provider_url: Option<String>,

    /// Provider id or display name of the model used when a request names none.
    pub default_model: Option<String>,

    /// Bound on each provider call, in seconds.
    pub timeout_secs: Option<u64>,

    /// Extra models; an entry with a registered provider id replaces that entry.
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,

    /// Directory for session log files.
    pub log_dir: Option<PathBuf>,

    /// Default log filter, e.g. `info` or `thinkrelay=debug`.
    pub log_level: Option<String>,

    /// Log every provider request and response body at debug level.
    #[serde(default)]
    pub log_payloads: bool,
}

impl ConfigFile {
    /// Reads and parses a config file.  `.yaml` and `.yml` files are parsed as YAML,
    /// anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }

    /// Loads `explicit` if given.  Otherwise loads `config.json` when it exists and
    /// falls back to an empty config when it does not.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// The model registry: built-ins plus the models listed in this file.
    pub fn registry(&self) -> ModelRegistry {
        ModelRegistry::new().with_models(self.models.iter().cloned())
    }

    /// The provider credential from this file, else from the environment.
    ///
    /// # Errors
    ///
    /// `Authentication` when neither has a non-blank value.
    pub fn api_key(&self) -> Result<String> {
        resolve_api_key(self.api_key.clone(), env::var(API_KEY_ENV).ok())
    }

    /// The provider timeout, or the default.
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

fn resolve_api_key(from_file: Option<String>, from_env: Option<String>) -> Result<String> {
    from_file
        .filter(|key| !key.trim().is_empty())
        .or_else(|| from_env.filter(|key| !key.trim().is_empty()))
        .ok_or_else(|| {
            Error::authentication(format!(
                "Missing API key: set GROQ_API_KEY in the config file or {API_KEY_ENV} in the environment"
            ))
        })
}

/// Resolves `name` (or the default model id) against `registry`.
pub fn resolve_model(registry: &ModelRegistry, name: Option<&str>) -> Result<ModelDescriptor> {
    let name = name.unwrap_or(DEFAULT_MODEL_ID);
    registry
        .lookup(name)
        .cloned()
        .ok_or_else(|| Error::configuration(format!("unknown model: {name}")))
}

/// Command-line arguments for the thinkrelay-server tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ServerArgs {
    /// Path to the config file.
    #[arrrg(optional, "Config file (default: config.json)", "PATH")]
    pub config: Option<String>,

    /// Address to listen on.
    #[arrrg(optional, "Address to listen on (default: 127.0.0.1:8000)", "ADDR")]
    pub bind: Option<String>,

    /// Provider base URL.
    #[arrrg(optional, "Provider base URL (default: Groq)", "URL")]
    pub provider_url: Option<String>,

    /// Default model.
    #[arrrg(optional, "Default model (default: llama-3.1-8b-instant)", "MODEL")]
    pub model: Option<String>,

    /// Directory for session logs.
    #[arrrg(optional, "Directory for session logs (default: logs)", "DIR")]
    pub log_dir: Option<String>,

    /// Log filter.
    #[arrrg(optional, "Log filter (default: info)", "FILTER")]
    pub log_level: Option<String>,
}

/// Fully resolved relay server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: SocketAddr,

    /// Provider credential.
    pub api_key: String,

    /// Provider base URL.
    pub provider_url: String,

    /// Bound on each provider call.
    pub timeout: Duration,

    /// Models the relay accepts.
    pub registry: ModelRegistry,

    /// Model used when a request names none.
    pub default_model: ModelDescriptor,

    /// Logging setup.
    pub logging: LoggingConfig,

    /// Whether to log provider request and response bodies.
    pub log_payloads: bool,
}

impl ServerConfig {
    /// Resolves flags over the config file over defaults.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be read, the bind address does not parse, the
    /// default model is unknown, or no credential is available.
    pub fn resolve(args: ServerArgs) -> Result<Self> {
        let file = ConfigFile::discover(args.config.as_deref().map(Path::new))?;
        Self::from_parts(args, file)
    }

    fn from_parts(args: ServerArgs, file: ConfigFile) -> Result<Self> {
        let bind = args.bind.as_deref().unwrap_or(DEFAULT_BIND);
        let bind = bind
            .parse::<SocketAddr>()
            .map_err(|err| Error::configuration(format!("invalid bind address {bind}: {err}")))?;
        let registry = file.registry();
        let default_model = resolve_model(
            &registry,
            args.model.as_deref().or(file.default_model.as_deref()),
        )?;
        let api_key = file.api_key()?;
        let logging = LoggingConfig::new()
            .with_dir(args.log_dir.map(PathBuf::from).or(file.log_dir.clone()))
            .with_level(args.log_level.or(file.log_level.clone()));
        Ok(Self {
            bind,
            api_key,
            provider_url: args
                .provider_url
                .or(file.provider_url.clone())
                .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string()),
            timeout: file.timeout(),
            registry,
            default_model,
            logging,
            log_payloads: file.log_payloads,
        })
    }
}
