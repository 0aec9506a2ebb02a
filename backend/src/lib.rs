//! Deterministic, constraint-aware schedule generation for a sports league.
//!
//! The crate builds a full slate of games, practices, cage sessions, and
//! optional paired practices for a season's divisions, subject to hard
//! constraints (no double-booked resources or teams, availability windows,
//! blackouts) and a weighted sum of soft objectives (matchup coverage,
//! home/away balance, spacing, field preference, and so on).
//!
//! The entrypoint is [`generator::generate`]. Everything the generator reads
//! or writes crosses the [`repository`] traits; this crate never performs
//! I/O itself.

pub mod availability;
pub mod conflict;
pub mod draft;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod model;
pub mod paired;
pub mod rebalance;
pub mod repository;
pub mod roundrobin;
pub mod scoring;
pub mod slots;
pub mod state;
pub mod time;
pub mod weights;

pub use error::{GenerateError, ScheduleWarning, SchedulingLogEntry};
pub use generator::{generate, EventTypeCounts, GenerateRequest, GenerateResult, GenerationStatistics};
pub use model::*;
pub use repository::{InMemoryRepository, ScheduleWriter, SeasonRepository};
pub use weights::ScoringWeights;
