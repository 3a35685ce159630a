//! The pure job reducer: `(JobState, JobEvent) -> JobState`.
//!
//! This is the only place that understands event semantics. No I/O, no
//! clocks, no logging. The controller folds every event from the
//! active transport through [`JobState::apply`] and publishes the
//! result to UI subscribers.

use crate::event::JobEvent;
use crate::state::{CompletedItem, JobOutcome, JobState};

impl JobState {
    /// Apply one event and return the updated state.
    ///
    /// Once the state is terminal this is the identity function, which
    /// makes it safe against duplicate terminal frames and against a
    /// late frame racing a timeout that already fired.
    pub fn apply(mut self, event: &JobEvent) -> JobState {
        if self.is_terminal() {
            return self;
        }

        match event {
            JobEvent::Status { message } => {
                self.status = message.clone();
                self.log.push(message.clone());
            }
            JobEvent::Analysis {
                page_count,
                target_audience,
                tone,
                business_meta,
            } => {
                // Last-write-wins per field; None never overwrites a
                // previously known value.
                if page_count.is_some() {
                    self.analysis.page_count = *page_count;
                }
                if target_audience.is_some() {
                    self.analysis.target_audience = target_audience.clone();
                }
                if tone.is_some() {
                    self.analysis.tone = tone.clone();
                }
                if business_meta.is_some() {
                    self.analysis.business_meta = business_meta.clone();
                }
                self.log.push("Analysis updated".to_string());
            }
            JobEvent::PagePlanned {
                page_index, title, ..
            } => {
                self.log.push(format!("Page {page_index} planned: {title}"));
            }
            JobEvent::PromptGenerated { page_index, .. } => {
                self.log
                    .push(format!("Image prompt ready for page {page_index}"));
            }
            JobEvent::QualityReport { score } => {
                self.log.push(format!("Quality score: {score:.2}"));
            }
            JobEvent::ImageGenerated { page_index } => {
                self.log.push(format!("Image generated for page {page_index}"));
            }
            JobEvent::Card {
                index,
                title,
                payload,
            } => {
                self.insert_item(CompletedItem {
                    index: *index,
                    title: title.clone(),
                    payload: payload.clone(),
                });
                self.log.push(format!("Card {index} completed: {title}"));
            }
            JobEvent::Complete { summary } => {
                self.log.push("Job completed".to_string());
                self.outcome = Some(JobOutcome::Success {
                    summary: summary.clone(),
                });
            }
            JobEvent::Error { message, timed_out } => {
                self.log.push(format!("Job failed: {message}"));
                self.outcome = Some(JobOutcome::Failure {
                    message: message.clone(),
                    timed_out: *timed_out,
                });
            }
        }

        self
    }

    /// Insert a completed item at its `index` position, tolerating
    /// out-of-order completion.
    fn insert_item(&mut self, item: CompletedItem) {
        let at = self
            .items
            .partition_point(|existing| existing.index < item.index);
        self.items.insert(at, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn status(message: &str) -> JobEvent {
        JobEvent::Status {
            message: message.to_string(),
        }
    }

    fn card(index: u32, title: &str) -> JobEvent {
        JobEvent::Card {
            index,
            title: title.to_string(),
            payload: json!({"imageUrl": format!("card-{index}.png")}),
        }
    }

    fn apply_all(events: &[JobEvent]) -> JobState {
        events
            .iter()
            .fold(JobState::default(), |state, ev| state.apply(ev))
    }

    #[test]
    fn status_replaces_and_logs() {
        let state = apply_all(&[status("starting"), status("planning pages")]);
        assert_eq!(state.status, "planning pages");
        assert_eq!(state.log, vec!["starting", "planning pages"]);
    }

    #[test]
    fn full_generation_scenario() {
        let state = apply_all(&[
            status("starting"),
            JobEvent::Analysis {
                page_count: Some(3),
                target_audience: None,
                tone: None,
                business_meta: None,
            },
            card(0, "Hook"),
            card(1, "Body"),
            card(2, "Call to action"),
            JobEvent::Complete {
                summary: json!({"count": 3}),
            },
        ]);

        assert_eq!(state.items.len(), 3);
        assert!(state.is_terminal());
        assert_matches!(
            state.outcome,
            Some(JobOutcome::Success { ref summary }) if summary["count"] == 3
        );
    }

    #[test]
    fn terminal_state_is_idempotent() {
        let terminal = apply_all(&[card(0, "Hook"), JobEvent::Complete { summary: json!(null) }]);

        // A duplicate terminal frame, a late card, and a late error
        // must all leave the state untouched.
        let after = terminal
            .clone()
            .apply(&JobEvent::Complete { summary: json!({"late": true}) })
            .apply(&card(1, "Late card"))
            .apply(&JobEvent::Error {
                message: "late error".to_string(),
                timed_out: false,
            });

        assert_eq!(after, terminal);
    }

    #[test]
    fn items_are_ordered_by_index_not_arrival() {
        let state = apply_all(&[card(2, "Last"), card(0, "First"), card(1, "Middle")]);
        let indexes: Vec<u32> = state.items.iter().map(|i| i.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(state.items[0].title, "First");
    }

    #[test]
    fn item_growth_is_monotonic() {
        let events = [card(1, "a"), status("x"), card(0, "b"), card(2, "c")];
        let mut state = JobState::default();
        let mut last_len = 0;
        let mut card_count = 0;

        for ev in &events {
            state = state.apply(ev);
            assert!(state.items.len() >= last_len);
            last_len = state.items.len();
            if matches!(ev, JobEvent::Card { .. }) {
                card_count += 1;
            }
        }
        assert_eq!(state.items.len(), card_count);
    }

    #[test]
    fn analysis_merges_without_regressing() {
        let state = apply_all(&[
            JobEvent::Analysis {
                page_count: Some(3),
                target_audience: Some("founders".to_string()),
                tone: None,
                business_meta: None,
            },
            JobEvent::Analysis {
                page_count: Some(5),
                target_audience: None,
                tone: Some("playful".to_string()),
                business_meta: None,
            },
        ]);

        assert_eq!(state.analysis.page_count, Some(5));
        assert_eq!(state.analysis.target_audience.as_deref(), Some("founders"));
        assert_eq!(state.analysis.tone.as_deref(), Some("playful"));
    }

    #[test]
    fn narration_events_only_touch_the_log() {
        let state = apply_all(&[
            JobEvent::PagePlanned {
                page_index: 0,
                title: "Hook".to_string(),
                content: "...".to_string(),
            },
            JobEvent::PromptGenerated {
                page_index: 0,
                prompt: "neon city".to_string(),
            },
            JobEvent::QualityReport { score: 0.87 },
            JobEvent::ImageGenerated { page_index: 0 },
        ]);

        assert_eq!(state.log.len(), 4);
        assert!(state.items.is_empty());
        assert!(!state.is_terminal());
    }

    #[test]
    fn timeout_failure_is_distinguishable() {
        let state = apply_all(&[JobEvent::timeout_error("no response within 120s")]);
        assert_matches!(
            state.outcome,
            Some(JobOutcome::Failure {
                timed_out: true,
                ..
            })
        );

        let state = apply_all(&[JobEvent::Error {
            message: "model overloaded".to_string(),
            timed_out: false,
        }]);
        assert_matches!(
            state.outcome,
            Some(JobOutcome::Failure {
                timed_out: false,
                ..
            })
        );
    }
}
