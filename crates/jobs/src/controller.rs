//! Per-job lifecycle controller.
//!
//! [`JobController`] owns exactly one job: it selects the transport
//! from the job kind, spawns the transport task on a child
//! cancellation token, folds every produced event through the pure
//! reducer, enforces the wall-clock timeout, and publishes the
//! evolving [`JobState`] to UI subscribers over a watch channel.
//!
//! Phase machine: `Idle -> Running -> {Completed | Failed | Cancelled}`.
//! The controller never retries a failed job; surfacing failure and
//! offering a manual restart is the caller's responsibility.

use std::sync::Arc;

use cardforge_core::event::JobEvent;
use cardforge_core::state::{JobOutcome, JobState};
use cardforge_core::types::{JobKind, TransportMode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::{paths, DashboardApi};
use crate::error::JobError;
use crate::poll::{PollConfig, PollDriver};
use crate::stream::run_push;
use crate::transport::{ChunkSource, StatusProbe};

/// Buffered events between the transport task and the fold loop.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Lifecycle phase of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Snapshot published to UI subscribers on every change.
#[derive(Debug, Clone, Serialize)]
pub struct JobUpdate {
    pub phase: JobPhase,
    pub started_at: Option<DateTime<Utc>>,
    pub state: JobState,
}

impl JobUpdate {
    fn idle() -> Self {
        Self {
            phase: JobPhase::Idle,
            started_at: None,
            state: JobState::default(),
        }
    }
}

/// Input for starting a job, matching the kind's transport.
#[derive(Debug, Clone)]
pub enum JobInput {
    /// Push mode: the generation request body to stream against.
    Generation { request: serde_json::Value },
    /// Pull mode: the server-side reference of the job to poll.
    Analysis { job_ref: String },
}

/// Owns one job's lifecycle and state.
///
/// Two controllers share nothing; running independent jobs
/// concurrently is safe by construction. Dropping the controller
/// cancels the job and tears down its transport.
pub struct JobController {
    kind: JobKind,
    job_id: Uuid,
    update_tx: Arc<watch::Sender<JobUpdate>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl JobController {
    pub fn new(kind: JobKind) -> Self {
        let (update_tx, _) = watch::channel(JobUpdate::idle());
        Self {
            kind,
            job_id: Uuid::new_v4(),
            update_tx: Arc::new(update_tx),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> JobPhase {
        self.update_tx.borrow().phase
    }

    /// Subscribe to state snapshots. The receiver always holds the
    /// latest [`JobUpdate`].
    pub fn subscribe(&self) -> watch::Receiver<JobUpdate> {
        self.update_tx.subscribe()
    }

    /// Start the job against the dashboard API, selecting push or
    /// pull transport from the job kind.
    pub async fn start(&mut self, api: &DashboardApi, input: &JobInput) -> Result<(), JobError> {
        match (self.kind.transport_mode(), input) {
            (TransportMode::Push, JobInput::Generation { request }) => {
                let path = paths::generation(self.kind).ok_or(JobError::TransportMismatch {
                    kind: self.kind,
                })?;
                let source = api.open_stream(path, request).await?;
                self.start_with_source(source)
            }
            (TransportMode::Pull, JobInput::Analysis { job_ref }) => {
                let path = paths::status(self.kind, job_ref).ok_or(JobError::TransportMismatch {
                    kind: self.kind,
                })?;
                self.start_with_probe(api.status_probe(path))
            }
            (_, _) => Err(JobError::InvalidInput {
                kind: self.kind,
                reason: "input does not match the job kind's transport mode".to_string(),
            }),
        }
    }

    /// Start a push-mode job from an already-open chunk source.
    ///
    /// The controller arms the kind's wall-clock deadline itself; on
    /// timeout it cancels the transport token, which drops the source
    /// and aborts the in-flight request.
    pub fn start_with_source(
        &mut self,
        source: impl ChunkSource + 'static,
    ) -> Result<(), JobError> {
        if self.kind.transport_mode() != TransportMode::Push {
            return Err(JobError::TransportMismatch { kind: self.kind });
        }
        self.ensure_idle()?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let transport_cancel = self.cancel.child_token();
        tokio::spawn(run_push(source, event_tx, transport_cancel.clone()));

        self.spawn_fold(event_rx, transport_cancel, Some(self.kind.timeout()));
        Ok(())
    }

    /// Start a pull-mode job from a status probe.
    ///
    /// The poll driver owns the pull-mode deadline (it must stop its
    /// own ticker), so the fold loop does not arm a second one.
    pub fn start_with_probe(
        &mut self,
        probe: impl StatusProbe + 'static,
    ) -> Result<(), JobError> {
        let config = PollConfig::for_kind(self.kind).ok_or(JobError::TransportMismatch {
            kind: self.kind,
        })?;
        self.ensure_idle()?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let transport_cancel = self.cancel.child_token();
        tokio::spawn(PollDriver::new(probe, config).run(event_tx, transport_cancel.clone()));

        self.spawn_fold(event_rx, transport_cancel, None);
        Ok(())
    }

    /// Cancel a running job.
    ///
    /// Stops the transport and transitions to `Cancelled` without
    /// invoking the reducer further. Only valid while `Running`.
    pub fn cancel(&self) -> Result<(), JobError> {
        if self.phase() != JobPhase::Running {
            return Err(JobError::NotRunning);
        }
        tracing::info!(job_id = %self.job_id, kind = %self.kind, "Cancelling job");
        self.cancel.cancel();
        Ok(())
    }

    /// Wait for the job to reach a terminal phase.
    pub async fn wait(&mut self) -> JobPhase {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.phase()
    }

    // ---- private helpers ----

    fn ensure_idle(&self) -> Result<(), JobError> {
        if self.phase() != JobPhase::Idle {
            return Err(JobError::AlreadyStarted);
        }
        Ok(())
    }

    /// Spawn the fold loop: apply each transport event through the
    /// reducer, publish every new state, and settle the final phase.
    fn spawn_fold(
        &mut self,
        mut event_rx: mpsc::Receiver<JobEvent>,
        transport_cancel: CancellationToken,
        deadline: Option<std::time::Duration>,
    ) {
        let update_tx = Arc::clone(&self.update_tx);
        let cancel = self.cancel.clone();
        let job_id = self.job_id;
        let kind = self.kind;
        let started_at = Utc::now();

        // Transition to Running before the task is scheduled, so a
        // cancel() immediately after start() sees a running job.
        update_tx.send_replace(JobUpdate {
            phase: JobPhase::Running,
            started_at: Some(started_at),
            state: JobState::default(),
        });
        tracing::info!(job_id = %job_id, kind = %kind, "Job started");

        let task = tokio::spawn(async move {
            let mut state = JobState::default();
            let publish = |phase: JobPhase, state: &JobState| {
                update_tx.send_replace(JobUpdate {
                    phase,
                    started_at: Some(started_at),
                    state: state.clone(),
                });
            };

            let deadline = deadline.map(|t| tokio::time::Instant::now() + t);
            let timeout_fut = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };
            tokio::pin!(timeout_fut);

            let final_phase = loop {
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => {
                        tracing::info!(job_id = %job_id, "Job cancelled");
                        break JobPhase::Cancelled;
                    }

                    _ = &mut timeout_fut => {
                        tracing::warn!(job_id = %job_id, kind = %kind, "Job timed out");
                        let timeout_secs = kind.timeout().as_secs();
                        state = state.apply(&JobEvent::timeout_error(format!(
                            "No terminal frame within {timeout_secs}s"
                        )));
                        break JobPhase::Failed;
                    }

                    event = event_rx.recv() => match event {
                        Some(event) => {
                            state = state.apply(&event);
                            match state.outcome {
                                Some(JobOutcome::Success { .. }) => break JobPhase::Completed,
                                Some(JobOutcome::Failure { .. }) => break JobPhase::Failed,
                                None => publish(JobPhase::Running, &state),
                            }
                        }
                        None => {
                            // Transport gone without a terminal event.
                            tracing::warn!(job_id = %job_id, "Transport closed before completion");
                            state = state.apply(&JobEvent::Error {
                                message: "Connection closed before the job finished".to_string(),
                                timed_out: false,
                            });
                            break JobPhase::Failed;
                        }
                    }
                }
            };

            // Same teardown for every exit: stop the transport once.
            transport_cancel.cancel();
            publish(final_phase, &state);
            tracing::info!(job_id = %job_id, phase = ?final_phase, "Job finished");
        });

        self.task = Some(task);
    }
}

impl Drop for JobController {
    fn drop(&mut self) {
        // The job is scoped to its controller; discarding the
        // controller tears down the transport.
        self.cancel.cancel();
    }
}
