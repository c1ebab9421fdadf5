//! Concurrent batch search over a catalog.

use futures_util::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::PacingGate;
use crate::config::{ConfigError, ParallelConfig, MAX_DELAY_MS, MAX_WORKERS};
use crate::matching::MatchScorer;
use crate::models::{MatchResult, SearchTask};
use crate::sources::{Catalog, CatalogError};

/// How fetch calls may overlap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Workers fetch independently, subject only to pacing
    #[default]
    Concurrent,
    /// At most one fetch runs at a time across all workers
    SingleFlight,
}

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Number of worker tasks (1..=20)
    pub workers: usize,
    /// Minimum spacing between any two fetches (at most 5s); zero disables pacing
    pub pacing: Duration,
    pub fetch_policy: FetchPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            workers: 5,
            pacing: Duration::from_millis(100),
            fetch_policy: FetchPolicy::Concurrent,
        }
    }
}

impl SearchOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::Workers(self.workers));
        }
        let pacing_ms = u64::try_from(self.pacing.as_millis()).unwrap_or(u64::MAX);
        if pacing_ms > MAX_DELAY_MS {
            return Err(ConfigError::Delay(pacing_ms));
        }
        Ok(())
    }
}

impl From<&ParallelConfig> for SearchOptions {
    fn from(config: &ParallelConfig) -> Self {
        Self {
            workers: config.effective_workers(),
            pacing: Duration::from_millis(config.delay_ms),
            fetch_policy: if config.single_flight {
                FetchPolicy::SingleFlight
            } else {
                FetchPolicy::Concurrent
            },
        }
    }
}

/// Lifecycle of one search task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Dispatched,
    Fetching,
    Scoring,
    Completed,
    Failed,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskState::Pending => "pending",
            TaskState::Dispatched => "dispatched",
            TaskState::Fetching => "fetching",
            TaskState::Scoring => "scoring",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a single task failed; never fatal to the batch
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] CatalogError),

    #[error("Scoring failed: {0}")]
    Scoring(String),
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Matches in input order
    pub results: Vec<MatchResult>,
    /// Tasks in the batch
    pub total: usize,
    /// Tasks that finished without error, matched or not
    pub completed: usize,
    /// Tasks that failed
    pub failed: usize,
    /// The shutdown signal stopped the batch
    pub interrupted: bool,
}

impl BatchReport {
    pub fn finished(&self) -> usize {
        self.completed + self.failed
    }

    /// Tasks that never reported an outcome
    pub fn unfinished(&self) -> usize {
        self.total.saturating_sub(self.finished())
    }
}

struct Shared {
    catalog: Arc<dyn Catalog>,
    scorer: Arc<MatchScorer>,
    gate: PacingGate,
    fetch_lock: Option<Mutex<()>>,
    queue: Mutex<VecDeque<SearchTask>>,
}

struct TaskReport {
    index: usize,
    title: String,
    outcome: Result<Option<MatchResult>, TaskError>,
}

/// Runs batches of search tasks on a fixed pool of workers
///
/// Workers pull tasks from a shared queue, wait on the pacing gate, fetch
/// candidates and score them. Results are returned in input order no matter
/// which worker finishes first.
#[derive(Debug)]
pub struct Orchestrator {
    catalog: Arc<dyn Catalog>,
    scorer: Arc<MatchScorer>,
    options: SearchOptions,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        scorer: Arc<MatchScorer>,
        options: SearchOptions,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            catalog,
            scorer,
            options,
        })
    }

    /// Search every task and return the matches in input order
    ///
    /// `progress` is called once per finished task with the running count.
    pub async fn search_batch<P>(&self, tasks: Vec<SearchTask>, progress: P) -> Vec<MatchResult>
    where
        P: FnMut(usize, &str),
    {
        self.search_batch_until(tasks, progress, std::future::pending())
            .await
            .results
    }

    /// Search every task until finished or until `shutdown` resolves
    ///
    /// On shutdown all workers are aborted and joined before returning; the
    /// report holds whatever finished before that point.
    pub async fn search_batch_until<P, S>(
        &self,
        tasks: Vec<SearchTask>,
        mut progress: P,
        shutdown: S,
    ) -> BatchReport
    where
        P: FnMut(usize, &str),
        S: Future<Output = ()>,
    {
        let total = tasks.len();
        for task in &tasks {
            debug!(index = task.index(), state = %TaskState::Pending, "{}", task.query().title());
        }

        let shared = Arc::new(Shared {
            catalog: Arc::clone(&self.catalog),
            scorer: Arc::clone(&self.scorer),
            gate: PacingGate::new(self.options.pacing),
            fetch_lock: match self.options.fetch_policy {
                FetchPolicy::Concurrent => None,
                FetchPolicy::SingleFlight => Some(Mutex::new(())),
            },
            queue: Mutex::new(tasks.into()),
        });

        info!(
            "Searching {} {} on {} with {} workers",
            total,
            if total == 1 { "title" } else { "titles" },
            self.catalog.name(),
            self.options.workers
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();
        for worker_id in 0..self.options.workers {
            workers.spawn(run_worker(worker_id, Arc::clone(&shared), tx.clone()));
        }
        drop(tx);

        let mut report = BatchReport {
            total,
            ..BatchReport::default()
        };
        let mut matched: Vec<(usize, MatchResult)> = Vec::new();

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                received = rx.recv() => {
                    let Some(task_report) = received else {
                        break;
                    };
                    match task_report.outcome {
                        Ok(result) => {
                            report.completed += 1;
                            if let Some(result) = result {
                                matched.push((task_report.index, result));
                            }
                        }
                        Err(error) => {
                            report.failed += 1;
                            warn!("Search for '{}' failed: {}", task_report.title, error);
                        }
                    }
                    progress(report.finished(), &task_report.title);
                }
                _ = &mut shutdown => {
                    report.interrupted = true;
                    warn!(
                        "Search interrupted after {} of {} titles",
                        report.finished(),
                        total
                    );
                    break;
                }
            }
        }

        if report.interrupted {
            workers.shutdown().await;
        } else {
            while let Some(joined) = workers.join_next().await {
                if let Err(error) = joined {
                    warn!("Search worker ended abnormally: {}", error);
                }
            }
            if report.unfinished() > 0 {
                warn!("{} titles were never searched", report.unfinished());
            }
        }

        matched.sort_by_key(|(index, _)| *index);
        report.results = matched.into_iter().map(|(_, result)| result).collect();

        info!(
            "Found {} matches out of {} titles ({} failed)",
            report.results.len(),
            total,
            report.failed
        );
        report
    }
}

async fn run_worker(worker_id: usize, shared: Arc<Shared>, tx: mpsc::UnboundedSender<TaskReport>) {
    loop {
        let Some(task) = shared.queue.lock().await.pop_front() else {
            break;
        };
        debug!(worker_id, index = task.index(), state = %TaskState::Dispatched, "{}", task.query().title());

        let outcome = process_task(&shared, &task).await;
        let state = if outcome.is_ok() {
            TaskState::Completed
        } else {
            TaskState::Failed
        };
        debug!(worker_id, index = task.index(), state = %state, "{}", task.query().title());

        let report = TaskReport {
            index: task.index(),
            title: task.query().title().to_string(),
            outcome,
        };
        if tx.send(report).is_err() {
            break;
        }
    }
}

async fn process_task(
    shared: &Shared,
    task: &SearchTask,
) -> Result<Option<MatchResult>, TaskError> {
    let query = task.query();

    shared.gate.ready().await;
    debug!(
        index = task.index(),
        state = %TaskState::Fetching,
        catalog = shared.catalog.id(),
        "{}",
        query.title()
    );

    let candidates = {
        let _flight = match &shared.fetch_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };
        AssertUnwindSafe(shared.catalog.fetch(query))
            .catch_unwind()
            .await
            .map_err(|payload| {
                CatalogError::Other(format!("catalog panicked: {}", panic_message(&*payload)))
            })??
    };

    debug!(
        index = task.index(),
        state = %TaskState::Scoring,
        candidates = candidates.len(),
        "{}",
        query.title()
    );
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
        shared.scorer.score(query, &candidates)
    }))
    .map_err(|payload| TaskError::Scoring(panic_message(&*payload)))?;

    debug!(
        index = task.index(),
        score = outcome.score,
        found = outcome.found,
        "{}",
        query.title()
    );
    Ok(outcome.into_match_result(query))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
