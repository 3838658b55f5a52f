//! Service layer containing the pipeline algorithms and tool invocations.
//!
//! ## Service map
//! - `deps_trace.rs` — dependency-trace parsing + build-tool invocation +
//!   clean-build probe.
//! - `build_graph.rs` — build-graph generation and declared-header parsing.
//! - `ownership.rs` — nested-repo prefix query via the checkout tool.
//! - `reconcile.rs` — used-vs-declared set reconciliation + allow-list.
//! - `archive.rs` — package archive extraction and blob sizing.
//! - `accounting.rs` — shared-blob apportionment + budget evaluation.
//! - `reports.rs` — result-artifact documents (test results, size data,
//!   histogram).
//! - `process.rs` — external tool invocation helpers.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible; parsing is separated from the tool
//!   invocation that produced the text.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod accounting;
pub mod archive;
pub mod build_graph;
pub mod deps_trace;
pub mod output;
pub mod ownership;
pub mod process;
pub mod reconcile;
pub mod reports;
