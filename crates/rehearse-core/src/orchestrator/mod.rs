//! Mix job orchestration
//!
//! Executes a [`MixPlan`](crate::plan::MixPlan) on a bounded worker pool.
//!
//! # Architecture
//!
//! ```text
//! JobRun
//!     │
//!     │ start(plan)
//!     ▼
//! MixOrchestrator (rayon ThreadPool, host-core-count threads)
//!     │
//!     │ par_iter().for_each()
//!     ▼
//! Per-Job Worker:
//!   1. Two-pass render via MixRenderer
//!   2. Store output in its plan slot
//!   3. Send MixProgress::JobCompleted
//!     │
//!     │ MixProgress (mpsc)
//!     ▼
//! JobRun progress aggregator (sole consumer)
//! ```
//!
//! Failure policy is fail-fast: the first job failure stops scheduling of
//! not-yet-started jobs, in-flight jobs finish, and the terminal message
//! carries no outputs.

mod message;
mod service;

pub use message::MixProgress;
pub use service::MixOrchestrator;
