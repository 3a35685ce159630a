//! Transport-independent domain types for the Cardforge job layer.
//!
//! Defines the job kinds and their timeout table, the typed
//! [`JobEvent`](event::JobEvent) union shared by both transports, the
//! accumulated [`JobState`](state::JobState), and the pure reducer that
//! folds events into state.

pub mod error;
pub mod event;
pub mod reducer;
pub mod state;
pub mod types;
