use crate::domain::constants::{is_header, ROOT_MARKER};
use crate::domain::models::{CheckError, HeadersConfig};
use crate::services::process::run_checked;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

#[derive(Deserialize)]
struct ProjectGraph {
    targets: HashMap<String, TargetEntry>,
}

#[derive(Deserialize)]
struct TargetEntry {
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    public: PublicList,
}

/// `"public": "*"` is a legacy wildcard meaning "all sources are public"; it
/// contributes no paths beyond `sources` and is kept as a special case, not
/// generalized.
#[derive(Deserialize, Default)]
#[serde(untagged)]
enum PublicList {
    #[default]
    Unset,
    Wildcard(String),
    Paths(Vec<String>),
}

/// Returns every header path the build graph declares, normalized to
/// repository-root-relative form. Generates the graph description in a fresh
/// scratch directory so the real out dir stays untouched.
pub fn declared_headers(config: &HeadersConfig) -> anyhow::Result<HashSet<String>> {
    let args_gn = config.src_root.join(&config.out_dir).join("args.gn");
    if !args_gn.is_file() {
        return Err(CheckError::Precondition(format!(
            "no args.gn under {}; is it a build output directory?",
            config.out_dir
        ))
        .into());
    }

    // The scratch dir lives inside the source root so the generator sees it
    // as a root-relative output directory.
    let scratch = tempfile::TempDir::new_in(&config.src_root)?;
    let scratch_name = scratch
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CheckError::Precondition("scratch directory has no name".to_string()))?;
    std::fs::copy(&args_gn, scratch.path().join("args.gn"))?;

    run_checked(
        &config.gn,
        &["gen", &scratch_name, "--ide=json", "-q"],
        &config.src_root,
    )?;

    let raw = std::fs::read_to_string(scratch.path().join("project.json"))?;
    let graph: ProjectGraph = serde_json::from_str(&raw)
        .map_err(|e| CheckError::Parse(format!("build-graph description: {e}")))?;
    Ok(collect_graph_headers(&graph, &config.out_dir, &scratch_name))
}

fn collect_graph_headers(
    graph: &ProjectGraph,
    out_dir: &str,
    scratch_name: &str,
) -> HashSet<String> {
    let mut declared = HashSet::new();
    for target in graph.targets.values() {
        let mut files: Vec<&String> = target.sources.iter().collect();
        match &target.public {
            PublicList::Paths(paths) => files.extend(paths.iter()),
            PublicList::Wildcard(_) | PublicList::Unset => {}
        }
        for file in files {
            if !is_header(file) {
                continue;
            }
            let Some(rel) = file.strip_prefix(ROOT_MARKER) else {
                continue;
            };
            // Paths generated into the scratch dir must compare as if they
            // came from the real out dir.
            let normalized = match rel.strip_prefix(scratch_name) {
                Some(rest) => format!("{out_dir}{rest}"),
                None => rel.to_string(),
            };
            declared.insert(normalized);
        }
    }
    declared
}
