//! Configuration for gic.
//!
//! Settings are layered: `gic.toml` → environment → CLI flags. The file is
//! optional and lives at `<config_dir>/gic/gic.toml` unless `GIC_CONFIG` or
//! `--config` points elsewhere.
//!
//! # Configuration File Format
//!
//! ```toml
//! [budget]
//! max_chars = 500000
//! overhead_chars = 2000
//! per_line_estimate = 5
//! history_limit = 10
//!
//! [model]
//! name = "claude-sonnet-4-5"
//! max_tokens = 2048
//! base_url = "https://api.anthropic.com"
//! ```
//!
//! # Environment
//!
//! | Variable         | Overrides             |
//! |------------------|-----------------------|
//! | `GIC_CONFIG`     | config file location  |
//! | `GIC_MODEL`      | `model.name`          |
//! | `GIC_API_URL`    | `model.base_url`      |
//! | `GIC_TOKEN_PATH` | token file location   |

use crate::budget::PromptBudget;
use crate::llm::{DEFAULT_API_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "GIC_CONFIG";
pub const MODEL_ENV: &str = "GIC_MODEL";
pub const API_URL_ENV: &str = "GIC_API_URL";
pub const TOKEN_PATH_ENV: &str = "GIC_TOKEN_PATH";

/// Model request settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSection {
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
        }
    }
}

/// Contents of `gic.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GicToml {
    #[serde(default)]
    pub budget: PromptBudget,
    #[serde(default)]
    pub model: ModelSection,
}

impl GicToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse gic.toml")
    }

    /// Returns the default configuration if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize gic.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Model name (env → file).
    pub fn model_name(&self) -> String {
        non_empty_env(MODEL_ENV).unwrap_or_else(|| self.model.name.clone())
    }

    /// API base URL (env → file).
    pub fn api_url(&self) -> String {
        non_empty_env(API_URL_ENV).unwrap_or_else(|| self.model.base_url.clone())
    }

    /// Validate configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let budget = &self.budget;

        if budget.max_chars == 0 {
            warnings.push("budget.max_chars is 0: every diff will be excluded".to_string());
        } else if budget.overhead_chars >= budget.max_chars {
            warnings.push(format!(
                "budget.overhead_chars ({}) leaves no room under budget.max_chars ({})",
                budget.overhead_chars, budget.max_chars
            ));
        }
        if budget.per_line_estimate == 0 {
            warnings.push(
                "budget.per_line_estimate is 0: every file will be treated as free".to_string(),
            );
        }
        if budget.history_limit == 0 {
            warnings.push("budget.history_limit is 0: no style reference commits".to_string());
        }
        if self.model.max_tokens == 0 {
            warnings.push("model.max_tokens must be greater than 0".to_string());
        }
        if self.model.name.trim().is_empty() {
            warnings.push("model.name is empty".to_string());
        }

        warnings
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Config file location (`GIC_CONFIG` → `<config_dir>/gic/gic.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    non_empty_env(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("gic").join("gic.toml")))
}

/// Token file location (`GIC_TOKEN_PATH` → `<config_dir>/gic/tokens.json`).
pub fn token_path() -> Result<PathBuf> {
    non_empty_env(TOKEN_PATH_ENV)
        .map(PathBuf::from)
        .or_else(crate::auth::default_token_path)
        .context("Could not determine a config directory for the token file")
}

/// Effective configuration for one invocation.
#[derive(Debug, Clone)]
pub struct GicConfig {
    /// Repository the commands run in
    pub project_dir: PathBuf,
    /// Config file consulted, if any location could be determined
    pub config_path: Option<PathBuf>,
    /// Parsed gic.toml
    pub toml: GicToml,
    /// CLI override: skip the confirmation prompt
    pub yes: bool,
    /// CLI override for budget.max_chars
    pub cli_max_chars: Option<usize>,
}

impl GicConfig {
    /// Load configuration for `project_dir`. An explicit `config_path`
    /// must exist; the default location is optional.
    pub fn new(project_dir: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;

        let (config_path, toml) = match config_path {
            Some(path) => {
                let toml = GicToml::load(&path)?;
                (Some(path), toml)
            }
            None => {
                let path = default_config_path();
                let toml = match &path {
                    Some(p) => GicToml::load_or_default(p)?,
                    None => GicToml::default(),
                };
                (path, toml)
            }
        };

        Ok(Self {
            project_dir,
            config_path,
            toml,
            yes: false,
            cli_max_chars: None,
        })
    }

    /// Create GicConfig with CLI overrides.
    pub fn with_cli_args(
        project_dir: PathBuf,
        config_path: Option<PathBuf>,
        yes: bool,
        max_chars: Option<usize>,
    ) -> Result<Self> {
        let mut config = Self::new(project_dir, config_path)?;
        config.yes = yes;
        config.cli_max_chars = max_chars;
        Ok(config)
    }

    /// Budget with the CLI `--max-chars` override applied.
    pub fn budget(&self) -> PromptBudget {
        PromptBudget {
            max_chars: self.cli_max_chars.unwrap_or(self.toml.budget.max_chars),
            ..self.toml.budget
        }
    }

    pub fn model_name(&self) -> String {
        self.toml.model_name()
    }

    pub fn api_url(&self) -> String {
        self.toml.api_url()
    }

    pub fn max_tokens(&self) -> u32 {
        self.toml.model.max_tokens
    }

    pub fn token_path(&self) -> Result<PathBuf> {
        token_path()
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}
