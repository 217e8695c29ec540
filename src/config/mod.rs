mod api;
mod defaults;
mod memory;
mod model;
mod validation;

use crate::api::client::DEFAULT_BASE_URL;
use crate::api::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::api::{ClientSettings, PromptSettings};
use crate::cli::Args;
use crate::error::{Result, VeoError};
use crate::history::DEFAULT_MAX_TURNS;
use crate::models::GenerateOptions;
use anyhow::Context;
use colored::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub use api::ApiConfig;
pub use defaults::*;
pub use memory::MemoryConfig;
pub use model::ModelConfig;
pub use validation::{expand_env_var_in_string, expand_path};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
    #[serde(default)]
    pub idle_seconds: Option<u64>,
    #[serde(default)]
    pub type_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub probe_timeout: u64,
    pub request_timeout: u64,
    pub stream_timeout: u64,
    pub model: String,
    pub system_prompt: String,
    pub options: GenerateOptions,
    pub memory_file: PathBuf,
    pub max_turns: usize,
    pub context_turns: usize,
    pub refusal_marker: String,
    pub recall: bool,
    pub verbose: bool,
    pub idle_seconds: u64,
    pub type_delay_ms: u64,
    pub offline: bool,
    pub new_conversation: bool,
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        // A broken config file is not fatal; fall back to defaults.
        let json_config = match JsonConfig::load() {
            Ok(config) => config,
            Err(e) => {
                if args.verbose {
                    eprintln!(
                        "{}",
                        format!("[veo] Ignoring config file: {:#}", e).dimmed()
                    );
                }
                JsonConfig::default()
            }
        };
        Self::resolve(args, json_config, |key| env::var(key).ok())
    }

    /// Merge CLI args > environment > config file > defaults.
    pub fn resolve<F>(args: &Args, json_config: JsonConfig, env_var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let JsonConfig {
            api,
            model,
            memory,
            session,
        } = json_config;

        let base_url = args
            .url
            .clone()
            .or_else(|| env_var("VEO_URL"))
            .or(api.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(VeoError::ConfigError(format!(
                "inference URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let model_name = args
            .model
            .clone()
            .or_else(|| env_var("VEO_MODEL"))
            .or(model.name)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let system_prompt = env_var("VEO_SYSTEM_PROMPT")
            .or(model.system_prompt)
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let options = GenerateOptions {
            temperature: validation::ensure_positive(
                "temperature",
                model.temperature.unwrap_or_else(default_temperature),
            )
            .map_err(VeoError::ConfigError)?,
            top_p: validation::ensure_positive("top_p", model.top_p.unwrap_or_else(default_top_p))
                .map_err(VeoError::ConfigError)?,
            repeat_penalty: validation::ensure_positive(
                "repeat_penalty",
                model.repeat_penalty.unwrap_or_else(default_repeat_penalty),
            )
            .map_err(VeoError::ConfigError)?,
            num_ctx: Some(model.num_ctx.unwrap_or_else(default_num_ctx)),
            num_thread: Some(model.num_thread.unwrap_or_else(default_num_thread)),
        };

        let memory_file = args
            .memory_file
            .clone()
            .or_else(|| env_var("VEO_MEMORY_FILE"))
            .or(memory.file)
            .map(|path| expand_path(&path))
            .unwrap_or_else(default_memory_file);

        let max_turns = args
            .max_turns
            .or(memory.max_turns)
            .unwrap_or(DEFAULT_MAX_TURNS);
        if max_turns == 0 {
            return Err(VeoError::ConfigError(
                "max_turns must be at least 1".to_string(),
            ));
        }

        let context_turns = args
            .context_turns
            .or(memory.context_turns)
            .unwrap_or_else(default_context_turns);

        let verbose = args.verbose
            || env_var("VEO_VERBOSE")
                .map(|v| parse_bool(&v))
                .or(session.verbose)
                .unwrap_or(false);

        let offline = args.offline || env_var("VEO_OFFLINE").map(|v| parse_bool(&v)).unwrap_or(false);

        Ok(Config {
            base_url,
            probe_timeout: api.probe_timeout.unwrap_or_else(default_probe_timeout),
            request_timeout: api.request_timeout.unwrap_or_else(default_request_timeout),
            stream_timeout: api.stream_timeout.unwrap_or_else(default_stream_timeout),
            model: model_name,
            system_prompt,
            options,
            memory_file,
            max_turns,
            context_turns,
            refusal_marker: memory.refusal_marker.unwrap_or_else(default_refusal_marker),
            recall: memory.recall.unwrap_or(true),
            verbose,
            idle_seconds: session.idle_seconds.unwrap_or_else(default_idle_seconds),
            type_delay_ms: session.type_delay_ms.unwrap_or_else(default_type_delay_ms),
            offline,
            new_conversation: args.new_conversation,
        })
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            probe_timeout: Duration::from_secs(self.probe_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
            chunk_timeout: Duration::from_secs(self.stream_timeout),
            verbose: self.verbose,
        }
    }

    pub fn prompt_settings(&self) -> PromptSettings {
        PromptSettings {
            system_prompt: self.system_prompt.clone(),
            context_turns: self.context_turns,
            refusal_marker: self.refusal_marker.clone(),
        }
    }

    pub fn get_current_date() -> String {
        chrono::Local::now().format("%A, %B %d, %Y").to_string()
    }
}

impl JsonConfig {
    pub fn load() -> anyhow::Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: JsonConfig = if is_yaml {
            serde_yaml::from_str(&contents).with_context(|| {
                format!("Failed to parse YAML config file: {}", path.display())
            })?
        } else {
            serde_json::from_str(&contents).with_context(|| {
                format!("Failed to parse JSON config file: {}", path.display())
            })?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Current directory (highest priority - local override)
        paths.push(PathBuf::from(".veo.yaml"));
        paths.push(PathBuf::from(".veo.yml"));
        paths.push(PathBuf::from(".veo.json"));

        // 2. User's config directory (global config)
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("veo");
            paths.push(config_dir.join("veo.yaml"));
            paths.push(config_dir.join("veo.yml"));
            paths.push(config_dir.join("veo.json"));
        }

        paths
    }
}
