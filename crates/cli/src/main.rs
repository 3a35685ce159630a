//! `cardforge` -- run one generation/analysis job from the terminal.
//!
//! Starts a job against the dashboard backend, subscribes to its state
//! updates, and prints progress until the job reaches a terminal
//! phase. Exits non-zero when the job fails.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default     | Description                                  |
//! |----------------------|----------|-------------|----------------------------------------------|
//! | `CARDFORGE_API_URL`  | yes      | --          | Backend base URL, e.g. `https://api.example.com` |
//! | `CARDFORGE_JOB_KIND` | no       | `card-news` | One of `card-news`, `brand-analysis`, `manual-brand-analysis`, `blog-analysis` |
//! | `CARDFORGE_PROMPT`   | push     | --          | Generation prompt (push-mode kinds)          |
//! | `CARDFORGE_JOB_REF`  | pull     | --          | Server-side job reference (pull-mode kinds)  |

use anyhow::{bail, Context};
use cardforge_core::state::JobOutcome;
use cardforge_core::types::{JobKind, TransportMode};
use cardforge_jobs::api::DashboardApi;
use cardforge_jobs::controller::{JobController, JobInput, JobPhase};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("CARDFORGE_API_URL").context("CARDFORGE_API_URL is required")?;

    let kind: JobKind = std::env::var("CARDFORGE_JOB_KIND")
        .unwrap_or_else(|_| "card-news".to_string())
        .parse()
        .context("CARDFORGE_JOB_KIND must name a known job kind")?;

    let input = match kind.transport_mode() {
        TransportMode::Push => {
            let prompt = std::env::var("CARDFORGE_PROMPT")
                .context("CARDFORGE_PROMPT is required for generation jobs")?;
            JobInput::Generation {
                request: serde_json::json!({ "prompt": prompt }),
            }
        }
        TransportMode::Pull => {
            let job_ref = std::env::var("CARDFORGE_JOB_REF")
                .context("CARDFORGE_JOB_REF is required for analysis jobs")?;
            JobInput::Analysis { job_ref }
        }
    };

    tracing::info!(kind = %kind, url = %base_url, "Starting job");

    let api = DashboardApi::new(base_url);
    let mut controller = JobController::new(kind);
    let mut updates = controller.subscribe();

    controller.start(&api, &input).await?;

    // Print each new log line as the state evolves.
    let mut printed = 0;
    while updates.changed().await.is_ok() {
        let update = updates.borrow_and_update().clone();
        for line in &update.state.log[printed..] {
            println!("  {line}");
        }
        printed = update.state.log.len();

        if update.phase != JobPhase::Running {
            break;
        }
    }

    let phase = controller.wait().await;
    let state = controller.subscribe().borrow().state.clone();

    match phase {
        JobPhase::Completed => {
            println!("Job completed with {} item(s)", state.items.len());
            Ok(())
        }
        JobPhase::Cancelled => bail!("job was cancelled"),
        _ => {
            let reason = match state.outcome {
                Some(JobOutcome::Failure { message, timed_out }) => {
                    if timed_out {
                        format!("{message} (client-side timeout, retrying may help)")
                    } else {
                        message
                    }
                }
                _ => "unknown failure".to_string(),
            };
            bail!("job failed: {reason}");
        }
    }
}
