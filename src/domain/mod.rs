//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep DTO/report structs in one place.
//! - Avoid cyclic imports and duplicated type definitions.
//! - Make JSON output schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs` — configs, blob/size structs, report/output structs, error enum.
//! - `constants.rs` — stable constants (path markers, block size, metric suffix).
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/process side effects.
//!
//! ## Compatibility note
//! Changes in these structs can affect `--json` outputs and the artifact
//! files consumed by pipeline automation. Keep schema-impacting changes
//! explicit and synchronized with `docs/contracts/*`.

pub mod constants;
pub mod models;
