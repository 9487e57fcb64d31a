//! `vsl-sweep`: the speed-limit sweep optimizer.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                  |
//! |--------------------|-----------------------------------------------------------|
//! | [`optimizer`]      | `SweepOptimizer`, `MatchReport`                           |
//! | [`recommendation`] | `Recommendation`, `CandidateStats`, `select_best`         |
//! | [`report`]         | CSV report, summary logging                               |
//! | [`telemetry`]      | `GeoFix` loaders (CSV, JSON vehicle payloads)             |
//! | [`error`]          | `SweepError`, `SweepResult<T>`                            |
//!
//! # Determinism
//!
//! With a fixed `SweepConfig::seed` and a deterministic oracle, a sweep is
//! reproducible: matching has a canonical tie-break, exit edges come from
//! per-vehicle RNGs, and aggregation does not depend on the order in which
//! runs finish.

pub mod error;
pub mod optimizer;
pub mod recommendation;
pub mod report;
pub mod telemetry;


pub use error::{SweepError, SweepResult};
pub use optimizer::{MatchReport, SweepOptimizer};
pub use recommendation::{select_best, CandidateStats, Recommendation, RecommendationPayload};
pub use report::{log_summary, write_report, write_report_csv};
pub use telemetry::{load_fixes_csv, load_fixes_json, load_fixes_reader, parse_fixes_json};
