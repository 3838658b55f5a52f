use crate::domain::constants::GENERATED_SOURCES_MARKER;
use crate::domain::models::{CheckError, HeaderReport};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Parses a human-curated allow-list: one path per line, `#` starts a
/// comment, blank lines ignored.
pub fn parse_allowlist(text: &str) -> HashSet<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

fn exempt(path: &str, prefixes: &HashSet<String>) -> bool {
    prefixes.iter().any(|p| path.starts_with(p.as_str()))
}

/// Computes `missing = used − declared` and the declared paths absent on
/// disk, filters both by ownership prefixes and the allow-list, and sorts
/// the results. Preconditions that indicate an unbuilt or stale out dir are
/// fatal rather than reported as findings.
pub fn reconcile(
    used: &HashMap<String, Vec<String>>,
    declared: &HashSet<String>,
    prefixes: &HashSet<String>,
    allowlist: &HashSet<String>,
    src_root: &Path,
) -> anyhow::Result<HeaderReport> {
    let mut missing: HashSet<&str> = used
        .keys()
        .filter(|p| !declared.contains(p.as_str()))
        .map(|p| p.as_str())
        .filter(|p| !exempt(p, prefixes))
        .collect();
    let mut nonexistent: HashSet<&str> = declared
        .iter()
        .filter(|p| !src_root.join(p).is_file())
        .map(|p| p.as_str())
        .filter(|p| !exempt(p, prefixes))
        .collect();

    let unbuilt: Vec<&str> = used
        .keys()
        .filter(|p| !src_root.join(p).is_file())
        .map(|p| p.as_str())
        .collect();
    if !unbuilt.is_empty() {
        return Err(CheckError::Precondition(format!(
            "dependency trace names files absent on disk ({}); build all targets in the out dir",
            unbuilt.join(", ")
        ))
        .into());
    }
    if used.is_empty() {
        return Err(CheckError::Precondition(
            "out dir looks empty; build all targets there first".to_string(),
        )
        .into());
    }
    if nonexistent
        .iter()
        .any(|p| p.contains(GENERATED_SOURCES_MARKER))
    {
        return Err(CheckError::Precondition(
            "out dir looks stale (declared generated headers are absent); rebuild it".to_string(),
        )
        .into());
    }

    missing.retain(|p| !allowlist.contains(*p));
    nonexistent.retain(|p| !allowlist.contains(*p));

    let mut missing: Vec<String> = missing.into_iter().map(|p| p.to_string()).collect();
    let mut nonexistent: Vec<String> = nonexistent.into_iter().map(|p| p.to_string()).collect();
    missing.sort();
    nonexistent.sort();
    Ok(HeaderReport {
        missing,
        nonexistent,
    })
}
