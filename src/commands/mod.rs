//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `headers.rs` — header reconciliation pipeline (fan-out acquisition,
//!   reconcile, machine output, exit codes).
//! - `sizes.rs` — package size pipeline (measure, apportion, budgets,
//!   result artifacts).
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate algorithms and tool invocations to `services/*`.
//! - Keep behavior and output schema stable.

pub mod headers;
pub mod sizes;

pub use headers::handle_headers;
pub use sizes::handle_sizes;
