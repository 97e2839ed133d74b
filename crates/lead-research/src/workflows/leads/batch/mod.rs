//! Concurrent batch qualification.
//!
//! Leads are drained from a shared queue by a fixed pool of workers. Each lead
//! is planned, given a signal record, and scored inside its own blocking task,
//! so a failure (or panic) is recorded on that lead's result and never reaches
//! its siblings. Results are collected in completion order through a single
//! channel and periodically checkpointed.

mod checkpoint;
mod provider;

pub use checkpoint::{
    load_checkpoint, CheckpointError, CheckpointStore, JsonFileCheckpoint, MemoryCheckpoint,
};
pub use provider::{PlaceholderSignals, SignalProvider, StaticSignals};

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::domain::{Lead, LeadId};
use super::enrichment::{EnrichmentPlan, EnrichmentPlanner};
use super::qualification::{
    ConfigurationError, IcpCriteria, QualificationEngine, ScoreBreakdown, SignalError,
};
use crate::config::{DEFAULT_CHECKPOINT_EVERY, DEFAULT_WORKERS, MAX_WORKERS};

const PROGRESS_NAME_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Success,
    Error,
}

impl LeadStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Outcome for one lead. Created once by the pipeline and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(flatten)]
    pub lead: Lead,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_plan: Option<EnrichmentPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<ScoreBreakdown>,
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub processed_at: DateTime<Utc>,
}

impl BatchResult {
    pub fn succeeded(lead: Lead, plan: EnrichmentPlan, qualification: ScoreBreakdown) -> Self {
        Self {
            lead,
            enrichment_plan: Some(plan),
            qualification: Some(qualification),
            status: LeadStatus::Success,
            error: None,
            processed_at: Utc::now(),
        }
    }

    pub fn failed(lead: Lead, plan: Option<EnrichmentPlan>, error: String) -> Self {
        Self {
            lead,
            enrichment_plan: plan,
            qualification: None,
            status: LeadStatus::Error,
            error: Some(error),
            processed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == LeadStatus::Success
    }

    pub fn weighted_total(&self) -> Option<f64> {
        self.qualification
            .as_ref()
            .map(|breakdown| breakdown.weighted_total)
    }
}

/// Failure contained at the per-lead boundary.
#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("invalid signal data: {0}")]
    Signal(#[from] SignalError),
    #[error("lead processing aborted: {0}")]
    Aborted(String),
}

/// Failures that stop a batch before (or instead of) running it.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("worker count must be between 1 and {MAX_WORKERS} (got {0})")]
    InvalidWorkerCount(usize),
    #[error("checkpoint cadence must be at least 1")]
    InvalidCheckpointCadence,
    #[error("worker pool failed: {0}")]
    WorkerPool(#[from] tokio::task::JoinError),
}

/// Planning, signal lookup, and scoring for a single lead.
struct LeadPipeline {
    engine: QualificationEngine,
    planner: EnrichmentPlanner,
    provider: Arc<dyn SignalProvider>,
}

impl LeadPipeline {
    fn process(&self, lead: Lead) -> BatchResult {
        let plan = self.planner.plan(&lead);
        match self.qualify(&lead, &plan) {
            Ok(breakdown) => BatchResult::succeeded(lead, plan, breakdown),
            Err(err) => {
                warn!(lead_id = %lead.id(), error = %err, "lead qualification failed");
                BatchResult::failed(lead, Some(plan), err.to_string())
            }
        }
    }

    fn qualify(&self, lead: &Lead, plan: &EnrichmentPlan) -> Result<ScoreBreakdown, LeadError> {
        let signals = self.provider.signals(lead, plan)?;
        signals.validate()?;
        Ok(self.engine.score(&signals)?)
    }
}

/// Bounded worker pool driving the qualification pipeline over many leads.
pub struct LeadBatchProcessor {
    engine: QualificationEngine,
    provider: Arc<dyn SignalProvider>,
    checkpoint: Option<Arc<dyn CheckpointStore>>,
    prior_results: Vec<BatchResult>,
    workers: usize,
    checkpoint_every: usize,
}

impl LeadBatchProcessor {
    pub fn new(criteria: IcpCriteria) -> Self {
        for warning in criteria.validate_weights() {
            warn!(scope = %warning.scope, sum = warning.sum, "{warning}");
        }
        Self {
            engine: QualificationEngine::new(criteria),
            provider: Arc::new(PlaceholderSignals),
            checkpoint: None,
            prior_results: Vec::new(),
            workers: DEFAULT_WORKERS,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn SignalProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_checkpoint(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint = Some(store);
        self
    }

    pub fn with_checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = every;
        self
    }

    /// Seeds the run with results from an earlier checkpoint. Leads that
    /// already succeeded are not processed again.
    pub fn resume_from(mut self, prior: Vec<BatchResult>) -> Self {
        self.prior_results = prior;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Processes every lead and returns exactly one result per lead, in
    /// completion order.
    pub async fn run(&self, leads: Vec<Lead>) -> Result<Vec<BatchResult>, BatchError> {
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(BatchError::InvalidWorkerCount(self.workers));
        }
        if self.checkpoint_every == 0 {
            return Err(BatchError::InvalidCheckpointCadence);
        }

        let (mut results, pending) = self.partition_resumed(leads);
        let total = pending.len();
        info!(
            total,
            resumed = results.len(),
            workers = self.workers,
            "starting lead batch"
        );

        let pipeline = Arc::new(LeadPipeline {
            engine: self.engine.clone(),
            planner: EnrichmentPlanner,
            provider: Arc::clone(&self.provider),
        });

        let (task_tx, task_rx) = mpsc::unbounded_channel::<Lead>();
        for lead in pending {
            if task_tx.send(lead).is_err() {
                break;
            }
        }
        drop(task_tx);
        let queue = Arc::new(Mutex::new(task_rx));

        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<BatchResult>();
        let mut handles = Vec::with_capacity(self.workers);
        for worker in 0..self.workers {
            let queue = Arc::clone(&queue);
            let pipeline = Arc::clone(&pipeline);
            let result_tx = result_tx.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let next = queue.lock().await.recv().await;
                    let Some(lead) = next else {
                        break;
                    };
                    debug!(worker, lead_id = %lead.id(), "lead running");
                    let result = process_isolated(Arc::clone(&pipeline), lead).await;
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let mut completed = 0usize;
        while let Some(result) = result_rx.recv().await {
            completed += 1;
            log_progress(completed, total, &result);
            results.push(result);

            if completed % self.checkpoint_every == 0 {
                self.write_checkpoint(&results, completed, total).await;
            }
        }

        for handle in handles {
            handle.await?;
        }

        self.write_checkpoint(&results, completed, total).await;
        info!(completed, total, "lead batch complete");
        Ok(results)
    }

    fn partition_resumed(&self, leads: Vec<Lead>) -> (Vec<BatchResult>, Vec<Lead>) {
        let wanted: HashSet<&LeadId> = leads.iter().map(Lead::id).collect();
        let mut seen = HashSet::new();
        let resumed: Vec<BatchResult> = self
            .prior_results
            .iter()
            .filter(|result| result.is_success() && wanted.contains(result.lead.id()))
            .filter(|result| seen.insert(result.lead.id().clone()))
            .cloned()
            .collect();

        let pending = leads
            .into_iter()
            .filter(|lead| !seen.contains(lead.id()))
            .collect();
        (resumed, pending)
    }

    /// Saves on the blocking pool; workers keep draining the queue meanwhile.
    async fn write_checkpoint(&self, results: &[BatchResult], completed: usize, total: usize) {
        let Some(store) = &self.checkpoint else {
            return;
        };
        let store = Arc::clone(store);
        let snapshot = results.to_vec();
        let saved = snapshot.len();

        match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(Ok(())) => info!(completed, total, saved, "progress checkpoint saved"),
            Ok(Err(err)) => warn!(completed, error = %err, "progress checkpoint failed"),
            Err(join_error) => {
                warn!(completed, error = %join_error, "progress checkpoint task aborted")
            }
        }
    }
}

async fn process_isolated(pipeline: Arc<LeadPipeline>, lead: Lead) -> BatchResult {
    let fallback = lead.clone();
    match tokio::task::spawn_blocking(move || pipeline.process(lead)).await {
        Ok(result) => result,
        Err(join_error) => {
            let error = LeadError::Aborted(join_error.to_string());
            warn!(lead_id = %fallback.id(), error = %error, "lead task aborted");
            BatchResult::failed(fallback, None, error.to_string())
        }
    }
}

fn log_progress(completed: usize, total: usize, result: &BatchResult) {
    let company: String = result
        .lead
        .company_name()
        .chars()
        .take(PROGRESS_NAME_WIDTH)
        .collect();
    let tier = result
        .qualification
        .as_ref()
        .map(|breakdown| breakdown.tier.label())
        .unwrap_or("?");
    let score = result.weighted_total().unwrap_or(0.0);

    info!(
        status = result.status.label(),
        progress = %format!("{completed}/{total}"),
        company = %company,
        tier,
        score = %format!("{score:.1}"),
        "lead processed"
    );
}

/// Runs a batch with the placeholder signal provider, optional custom
/// criteria, and an optional JSON checkpoint file.
pub async fn run_batch(
    leads: Vec<Lead>,
    workers: usize,
    criteria: Option<IcpCriteria>,
    checkpoint_path: Option<&Path>,
) -> Result<Vec<BatchResult>, BatchError> {
    let mut processor =
        LeadBatchProcessor::new(criteria.unwrap_or_else(IcpCriteria::standard)).with_workers(workers);
    if let Some(path) = checkpoint_path {
        processor = processor.with_checkpoint(Arc::new(JsonFileCheckpoint::new(path)));
    }
    processor.run(leads).await
}
