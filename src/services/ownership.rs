use crate::domain::constants::OWNERSHIP_LINE_PREFIX;
use crate::domain::models::HeadersConfig;
use crate::services::process::run_captured;
use std::collections::HashSet;

/// Returns the root-relative path prefixes of nested external repositories.
/// Anything under such a prefix is governed by that repository's own build
/// declarations and is exempt from reconciliation. A failed query is fatal
/// for the caller; treating it as an empty set would produce false-positive
/// missing-header reports.
pub fn ownership_prefixes(config: &HeadersConfig) -> anyhow::Result<HashSet<String>> {
    let out = run_captured(
        &config.gclient,
        &[
            "recurse",
            "--no-progress",
            "-j1",
            "sh",
            "-c",
            "echo \"$GCLIENT_DEP_PATH\"",
        ],
        &config.src_root,
    )?;
    Ok(parse_ownership_output(&out))
}

pub fn parse_ownership_output(out: &str) -> HashSet<String> {
    out.lines()
        .filter_map(|line| line.strip_prefix(OWNERSHIP_LINE_PREFIX))
        .map(|rest| rest.to_string())
        .collect()
}
