//! Pull-mode poll driver.
//!
//! Repeatedly fetches a status snapshot on a fixed interval and
//! synthesizes [`JobEvent`]s onto the controller's event channel.
//! The fetch is awaited before the next tick is polled, so at most
//! one request is ever outstanding: a round-trip slower than the
//! interval delays the next poll instead of stacking requests.

use std::time::Duration;

use cardforge_core::event::JobEvent;
use cardforge_core::types::JobKind;
use cardforge_protocol::snapshot;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::transport::StatusProbe;

/// Interval and deadline for one pull-mode job.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollConfig {
    /// Config from the job-kind timeout table; `None` for push kinds.
    pub fn for_kind(kind: JobKind) -> Option<Self> {
        Some(Self {
            interval: kind.poll_interval()?,
            timeout: kind.timeout(),
        })
    }
}

/// Drives one pull-mode job until a terminal condition.
pub struct PollDriver<P> {
    probe: P,
    config: PollConfig,
}

impl<P: StatusProbe> PollDriver<P> {
    pub fn new(probe: P, config: PollConfig) -> Self {
        Self { probe, config }
    }

    /// Run until completion, failure, timeout, or cancellation.
    ///
    /// Exactly one exit path is taken and the ticker is dropped on
    /// exit, so no recurring timer outlives the job. The `biased`
    /// ordering checks cancellation and the deadline before the tick,
    /// so a tick racing the deadline never issues an extra request.
    /// The round-trip itself is raced against the deadline and against
    /// cancellation, so a stalled server cannot hold the job past its
    /// timeout.
    pub async fn run(self, events: mpsc::Sender<JobEvent>, cancel: CancellationToken) {
        let deadline = tokio::time::Instant::now() + self.config.timeout;
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!("Poll driver cancelled");
                    return;
                }

                _ = tokio::time::sleep_until(deadline) => {
                    send_timeout(&events, self.config.timeout).await;
                    return;
                }

                _ = ticker.tick() => {}
            }

            let fetched = tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!("Poll driver cancelled mid-request");
                    return;
                }

                _ = tokio::time::sleep_until(deadline) => {
                    send_timeout(&events, self.config.timeout).await;
                    return;
                }

                fetched = self.probe.fetch() => fetched,
            };

            match fetched {
                Ok(snap) => {
                    if let Some(event) = snapshot::interpret(&snap) {
                        let terminal = event.is_terminal();
                        if events.send(event).await.is_err() {
                            // Controller gone; nothing left to drive.
                            return;
                        }
                        if terminal {
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Status poll failed");
                    let _ = events
                        .send(JobEvent::Error {
                            message: format!("Status request failed: {e}"),
                            timed_out: false,
                        })
                        .await;
                    return;
                }
            }
        }
    }
}

/// Synthesize the client-originated timeout error.
async fn send_timeout(events: &mpsc::Sender<JobEvent>, timeout: Duration) {
    let secs = timeout.as_secs();
    tracing::warn!(timeout_secs = secs, "Poll driver timed out");
    let _ = events
        .send(JobEvent::timeout_error(format!("No result within {secs}s")))
        .await;
}
