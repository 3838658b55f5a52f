use crate::domain::constants::{
    is_header, GENERATED_CONFIG_DIR, NO_WORK_MARKER, SOURCE_ROOT_PREFIX, VALID_RECORD_SUFFIX,
};
use crate::domain::models::HeadersConfig;
use crate::services::process::run_captured;
use std::collections::HashMap;

/// Returns every header the compiler actually used, keyed by normalized
/// source-root-relative path, as reported by the build tool's dependency
/// trace. With `collect_objects` each header also carries the object files
/// that reference it; the first pass skips that to save memory.
pub fn used_headers(
    config: &HeadersConfig,
    collect_objects: bool,
) -> anyhow::Result<HashMap<String, Vec<String>>> {
    let trace = run_captured(
        &config.ninja,
        &["-C", &config.out_dir, "-t", "deps"],
        &config.src_root,
    )?;
    Ok(parse_deps_trace(&trace, &config.out_dir, collect_objects))
}

/// Parses the dependency-trace text. Records start with `<object>: <status>`
/// and only records ending in `(VALID)` contribute; indented continuation
/// lines name dependency files. Headers under the out dir, a literal `out`
/// prefix, or the generated build-config dir are synthetic and dropped.
pub fn parse_deps_trace(
    trace: &str,
    out_dir: &str,
    collect_objects: bool,
) -> HashMap<String, Vec<String>> {
    let mut headers: HashMap<String, Vec<String>> = HashMap::new();
    let mut record_valid = false;
    let mut object = String::new();

    for line in trace.lines() {
        if line.starts_with("    ") {
            if !record_valid {
                continue;
            }
            let dep = line.trim();
            if !is_header(dep) {
                continue;
            }
            let Some(rel) = dep.strip_prefix(SOURCE_ROOT_PREFIX) else {
                continue;
            };
            if rel.starts_with(out_dir) || rel.starts_with("out") {
                continue;
            }
            if rel.starts_with(GENERATED_CONFIG_DIR) {
                continue;
            }
            let objects = headers.entry(rel.to_string()).or_default();
            if collect_objects {
                objects.push(object.clone());
            }
        } else {
            record_valid = line.ends_with(VALID_RECORD_SUFFIX);
            object = line.split(':').next().unwrap_or_default().to_string();
        }
    }

    headers
}

/// Probes the build tool with a dry run; a fully built tree reports no
/// remaining work. Probe failures count as dirty.
pub fn is_build_clean(config: &HeadersConfig) -> bool {
    match run_captured(
        &config.ninja,
        &["-C", &config.out_dir, "-n"],
        &config.src_root,
    ) {
        Ok(out) => out.contains(NO_WORK_MARKER),
        Err(e) => {
            eprintln!("clean-build probe failed: {e:#}");
            false
        }
    }
}
