//! Per-task pipeline sequencing and the concurrent multi-task runner
//!
//! Within one task the stages run strictly in order; tasks are isolated
//! from each other, so one task's failure never touches its siblings.
//! Model-endpoint calls are bounded by a semaphore since local generation
//! supports only limited concurrency.

use crate::config::Config;
use crate::error::{Result, StoreLensError};
use crate::eval::{build_prompt, classify, parse_response, rank, summarize};
use crate::llm::LlmClient;
use crate::task::{RunReport, ScrapedResult, SearchTask, TaskReport, TaskStatus};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Run the full pipeline for one task. Never panics; failures land in the
/// report's status.
pub async fn run_task(
    task: &SearchTask,
    results: &[ScrapedResult],
    client: &dyn LlmClient,
    config: &Config,
) -> TaskReport {
    run_task_bounded(task, results, client, config, None).await
}

async fn run_task_bounded(
    task: &SearchTask,
    results: &[ScrapedResult],
    client: &dyn LlmClient,
    config: &Config,
    model_gate: Option<&Semaphore>,
) -> TaskReport {
    let search_type = task.search_type.unwrap_or_else(|| classify(&task.query));

    let mut report = TaskReport {
        query: task.query.clone(),
        search_type,
        status: TaskStatus::Success {
            extraction_warnings: 0,
        },
        results: Vec::new(),
        summary: None,
        model: client.model_name().to_string(),
        timestamp: chrono::Utc::now(),
    };

    match evaluate(task, search_type, results, client, config, model_gate).await {
        Ok((ranked, warnings)) => {
            report.summary = Some(summarize(
                &task.query,
                search_type,
                &ranked,
                config.evaluation.enable_detailed_analysis,
            ));
            report.results = ranked;
            report.status = TaskStatus::Success {
                extraction_warnings: warnings,
            };
            tracing::debug!(
                query = %task.query,
                results = report.results.len(),
                warnings,
                "task evaluated"
            );
        }
        Err(e) => {
            tracing::warn!(query = %task.query, error = %e, "task failed");
            let raw_model_output = match &e {
                StoreLensError::UnparseableResponse { raw, .. } => Some(raw.clone()),
                _ => None,
            };
            report.status = TaskStatus::Failed {
                reason: e.to_string(),
                raw_model_output,
            };
        }
    }

    report
}

/// The fallible stages: prompt -> model -> parse -> rank.
async fn evaluate(
    task: &SearchTask,
    search_type: crate::eval::SearchType,
    results: &[ScrapedResult],
    client: &dyn LlmClient,
    config: &Config,
    model_gate: Option<&Semaphore>,
) -> Result<(Vec<crate::eval::EvaluatedResult>, usize)> {
    if task.query.trim().is_empty() {
        return Err(StoreLensError::InvalidInput(
            "task query must not be empty".to_string(),
        ));
    }
    if results.is_empty() {
        return Err(StoreLensError::InvalidInput(
            "no scraped results to evaluate".to_string(),
        ));
    }

    let prompt = build_prompt(&task.query, search_type, results);

    let raw = match model_gate {
        Some(gate) => {
            // Closed semaphores do not occur here; treat as endpoint loss
            let _permit = gate
                .acquire()
                .await
                .map_err(|_| StoreLensError::ModelUnavailable("model gate closed".to_string()))?;
            client.generate(&prompt).await?
        }
        None => client.generate(&prompt).await?,
    };

    let outcome = parse_response(&raw, results.len())?;

    let evaluated: Vec<_> = results
        .iter()
        .cloned()
        .zip(outcome.verdicts.iter().cloned())
        .collect();
    let ranked = rank(
        evaluated,
        config.effective_weight_factor(),
        config.evaluation.low_stock_threshold,
    );

    Ok((ranked, outcome.warning_count()))
}

/// Run many independent tasks concurrently and aggregate a run report.
///
/// Task concurrency and in-flight model calls are bounded separately by
/// the configuration. Output order matches input order regardless of
/// completion order.
pub async fn run_tasks(
    tasks: Vec<(SearchTask, Vec<ScrapedResult>)>,
    client: Arc<dyn LlmClient>,
    config: &Config,
) -> Result<RunReport> {
    let problems = config.validate();
    if !problems.is_empty() {
        return Err(StoreLensError::Config(problems.join("; ")));
    }

    let model_gate = Arc::new(Semaphore::new(config.evaluation.max_concurrent_model_calls));
    let total = tasks.len();

    tracing::info!(
        tasks = total,
        max_concurrent_tasks = config.evaluation.max_concurrent_tasks,
        max_concurrent_model_calls = config.evaluation.max_concurrent_model_calls,
        model = client.model_name(),
        "starting evaluation run"
    );

    let mut reports: Vec<(usize, TaskReport)> = stream::iter(tasks.into_iter().enumerate())
        .map(|(idx, (task, results))| {
            let client = Arc::clone(&client);
            let gate = Arc::clone(&model_gate);
            async move {
                let report =
                    run_task_bounded(&task, &results, client.as_ref(), config, Some(&gate)).await;
                (idx, report)
            }
        })
        .buffer_unordered(config.evaluation.max_concurrent_tasks)
        .collect()
        .await;

    // Restore input order
    reports.sort_by_key(|(idx, _)| *idx);

    let report = RunReport::from_tasks(reports.into_iter().map(|(_, r)| r).collect());
    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "evaluation run finished"
    );

    Ok(report)
}
