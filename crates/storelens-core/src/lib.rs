//! Storelens Core Library
//!
//! Evaluates e-commerce search result quality with a locally hosted
//! language model:
//! - query type classification (part number / english word / multi-term)
//! - type-specific evaluation prompts with indexed result listings
//! - tolerant two-phase parsing of model verdicts
//! - inventory-aware ranking within relevance tiers
//! - deterministic business summaries and run-level reports
//!
//! Scraping and report serialization are external collaborators; this
//! crate consumes `ScrapedResult` records and emits `RunReport` values.

pub mod config;
pub mod error;
pub mod eval;
pub mod llm;
pub mod pipeline;
pub mod task;

pub use config::{Config, EvaluationConfig, ModelConfig};
pub use error::{Error, Result, StoreLensError};
pub use eval::{
    build_prompt, classify, parse_response, rank, summarize, BusinessSummary, EvaluatedResult,
    ParseOutcome, RelevanceCategory, RelevanceVerdict, SearchType,
};
pub use llm::{LlmClient, OllamaClient};
pub use pipeline::{run_task, run_tasks};
pub use task::{
    parse_inventory_quantity, RunReport, ScrapedResult, SearchTask, TaskReport, TaskStatus,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "storelens";
