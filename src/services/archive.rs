use crate::domain::constants::{
    BLOB_BLOCK_SIZE, BLOB_CONTENTS_PATH, FIXED_EXCLUDED_BLOBS, META_ARCHIVE_NAME,
};
use crate::domain::models::{Blob, CheckError};
use crate::services::process::{exit_detail, run_checked, spawn_collect};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Package name of an archive file: basename with the `.far` suffix dropped.
pub fn archive_base_name(far_file: &str) -> String {
    let base = Path::new(far_file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| far_file.to_string());
    base.strip_suffix(".far").unwrap_or(&base).to_string()
}

/// Rounds a compressed byte count up to whole storage blocks. The blob store
/// allocates in full blocks, so a byte-exact size misrepresents storage cost.
pub fn round_to_blocks(bytes: u64) -> u64 {
    bytes.div_ceil(BLOB_BLOCK_SIZE) * BLOB_BLOCK_SIZE
}

pub fn extract_archive(far_tool: &Path, archive: &Path, out_dir: &Path) -> anyhow::Result<()> {
    if !archive.is_file() {
        return Err(CheckError::Precondition(format!(
            "archive not found: {}",
            archive.display()
        ))
        .into());
    }
    let archive_arg = format!("--archive={}", archive.display());
    let output_arg = format!("--output={}", out_dir.display());
    run_checked(
        far_tool,
        &["extract", &archive_arg, &output_arg],
        Path::new("."),
    )
}

/// Reads the package-internal path to content-hash mapping from the
/// extracted metadata archive.
pub fn blob_name_hashes(meta_dir: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    let contents_path = meta_dir.join(BLOB_CONTENTS_PATH);
    let raw = std::fs::read_to_string(&contents_path)?;
    let mut mapping = BTreeMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, hash) = line.split_once('=').ok_or_else(|| {
            CheckError::Parse(format!(
                "malformed blob contents line in {}: {line}",
                contents_path.display()
            ))
        })?;
        mapping.insert(name.to_string(), hash.to_string());
    }
    Ok(mapping)
}

/// Shared-library filenames under the platform SDK `arch` tree, found in
/// `dist` or `lib` leaf directories. These blobs belong to the shared
/// platform image and are never charged against a package budget.
pub fn sdk_excluded_modules(sdk_root: &Path) -> anyhow::Result<HashSet<String>> {
    let so_pattern = Regex::new(r"\.so(\.\d+)?$")?;
    let leaf_dirs = ["dist", "lib"];
    let mut modules = HashSet::new();
    let arch_root = sdk_root.join("arch");
    // An SDK without an arch tree simply contributes no exclusions.
    if !arch_root.is_dir() {
        return Ok(modules);
    }
    for entry in WalkDir::new(arch_root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let in_leaf = entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| leaf_dirs.contains(&n.to_string_lossy().as_ref()))
            .unwrap_or(false);
        if !in_leaf {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if so_pattern.is_match(&name) {
            modules.insert(name.into_owned());
        }
    }
    Ok(modules)
}

pub fn excluded_blob_names(sdk_root: Option<&Path>) -> anyhow::Result<HashSet<String>> {
    let mut excluded = match sdk_root {
        Some(root) => sdk_excluded_modules(root)?,
        None => HashSet::new(),
    };
    excluded.extend(FIXED_EXCLUDED_BLOBS.iter().map(|n| n.to_string()));
    Ok(excluded)
}

/// Measures a blob's size after store compression by running the external
/// compressor and parsing its reported byte count, rounded up to whole
/// blocks. Unparsable output is fatal for the package.
pub fn compressed_size(compressor: &Path, file: &Path) -> anyhow::Result<u64> {
    let scratch = tempfile::TempDir::new()?;
    let compressed_file = scratch.path().join(
        file.file_name()
            .ok_or_else(|| CheckError::Measurement(format!("no file name: {}", file.display())))?,
    );
    let source_arg = format!("--source_file={}", file.display());
    let compressed_arg = format!("--compressed_file={}", compressed_file.display());
    let output = spawn_collect(compressor, &[&source_arg, &compressed_arg], Path::new("."))?;
    // The compressor reports its totals on either stream.
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    if !output.status.success() {
        return Err(CheckError::Measurement(format!(
            "compressor on {}: {}",
            file.display(),
            exit_detail(&output)
        ))
        .into());
    }

    // Match a total like "Wrote 360830 bytes (40% compression)".
    let written = Regex::new(r"Wrote\s+(\d+)\s+bytes")?;
    let bytes: u64 = written
        .captures(&combined)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            CheckError::Measurement(format!(
                "no compressed byte count for {} in output: {}",
                file.display(),
                combined.trim()
            ))
        })?
        .parse()?;
    Ok(round_to_blocks(bytes))
}

pub struct ExtractorTools {
    pub far_tool: PathBuf,
    pub compressor: PathBuf,
}

/// Extracts one package archive plus its nested metadata archive and sizes
/// every non-excluded blob. Any missing tool, missing file, or unparsable
/// compressor output aborts the whole package; no partial table is returned.
pub fn package_blobs(
    tools: &ExtractorTools,
    far_file: &str,
    build_out_dir: &Path,
    extract_root: &Path,
    excluded: &HashSet<String>,
) -> anyhow::Result<BTreeMap<String, Blob>> {
    let base_name = archive_base_name(far_file);

    let archive_path = build_out_dir.join(far_file);
    let archive_dir = extract_root.join(&base_name);
    extract_archive(&tools.far_tool, &archive_path, &archive_dir)?;

    let meta_archive = archive_dir.join(META_ARCHIVE_NAME);
    let meta_dir = extract_root.join(format!("{base_name}_meta"));
    extract_archive(&tools.far_tool, &meta_archive, &meta_dir)?;

    let mut blobs = BTreeMap::new();
    for (blob_name, blob_hash) in blob_name_hashes(&meta_dir)? {
        let file_name = Path::new(&blob_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| blob_name.clone());
        if excluded.contains(&file_name) {
            continue;
        }
        let blob_path = archive_dir.join(&blob_hash);
        let uncompressed = std::fs::metadata(&blob_path)?.len();
        let compressed = compressed_size(&tools.compressor, &blob_path)?;
        blobs.insert(
            blob_name.clone(),
            Blob {
                name: blob_name,
                hash: blob_hash,
                compressed,
                uncompressed,
            },
        );
    }
    Ok(blobs)
}
