//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model endpoint configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Evaluation and ranking parameters
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Model endpoint configuration for local text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the generation endpoint (Ollama-compatible)
    pub url: String,

    /// Model name passed with every generation request
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retry attempts on transient failures (connection refused, timeout)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("STORELENS_MODEL_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: default_model(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_model() -> String {
    std::env::var("STORELENS_MODEL").unwrap_or_else(|_| "gemma3".to_string())
}

fn default_timeout() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

/// Evaluation, ranking, and concurrency parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Weight of normalized inventory in the within-category rank score (0.0 - 1.0)
    #[serde(default = "default_weight_factor")]
    pub inventory_weight_factor: f64,

    /// Inventory counts below this (but above zero) are flagged low stock
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u64,

    /// Reorder results within relevance tiers by inventory
    #[serde(default = "default_true")]
    pub enable_inventory_ranking: bool,

    /// Generate insight and action-item lists in summaries
    #[serde(default = "default_true")]
    pub enable_detailed_analysis: bool,

    /// How many search tasks may run concurrently
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    /// How many generation requests may be in flight at once
    /// (the local model endpoint is the bottleneck resource)
    #[serde(default = "default_max_concurrent_model_calls")]
    pub max_concurrent_model_calls: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            inventory_weight_factor: default_weight_factor(),
            low_stock_threshold: default_low_stock_threshold(),
            enable_inventory_ranking: true,
            enable_detailed_analysis: true,
            max_concurrent_tasks: default_max_concurrent_tasks(),
            max_concurrent_model_calls: default_max_concurrent_model_calls(),
        }
    }
}

fn default_weight_factor() -> f64 {
    0.3
}

fn default_low_stock_threshold() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_tasks() -> usize {
    4
}

fn default_max_concurrent_model_calls() -> usize {
    2
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Validate configuration, returning all problems found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.model.url.is_empty() {
            errors.push("model.url is required".to_string());
        }
        if self.model.model.is_empty() {
            errors.push("model.model is required".to_string());
        }
        if self.model.timeout_secs == 0 {
            errors.push("model.timeout_secs must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.evaluation.inventory_weight_factor) {
            errors.push("evaluation.inventory_weight_factor must be between 0.0 and 1.0".to_string());
        }
        if self.evaluation.max_concurrent_tasks == 0 {
            errors.push("evaluation.max_concurrent_tasks must be positive".to_string());
        }
        if self.evaluation.max_concurrent_model_calls == 0 {
            errors.push("evaluation.max_concurrent_model_calls must be positive".to_string());
        }

        errors
    }

    /// Effective inventory weight: zero when inventory ranking is disabled
    pub fn effective_weight_factor(&self) -> f64 {
        if self.evaluation.enable_inventory_ranking {
            self.evaluation.inventory_weight_factor
        } else {
            0.0
        }
    }
}
