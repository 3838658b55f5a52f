use crate::domain::constants::COMPRESSED_METRIC_SUFFIX;
use crate::domain::models::{Blob, CheckError, PackageSizes, SizesConfig, TestStatus};
use std::collections::{BTreeMap, HashMap};

type PackageBlobs = BTreeMap<String, BTreeMap<String, Blob>>;

/// Counts how many packages reference each distinct (name, hash) blob pair.
/// A count of 1 means the blob is not shared.
pub fn blob_reference_counts(packages: &PackageBlobs) -> HashMap<(String, String), usize> {
    let mut counts: HashMap<(String, String), usize> = HashMap::new();
    for blobs in packages.values() {
        for blob in blobs.values() {
            *counts
                .entry((blob.name.clone(), blob.hash.clone()))
                .or_default() += 1;
        }
    }
    counts
}

/// Apportions each blob's size across the packages referencing it, so that
/// the sum of apportioned sizes equals the unique storage total instead of
/// counting shared blobs once per package.
pub fn apportioned_sizes(packages: &PackageBlobs) -> BTreeMap<String, PackageSizes> {
    let counts = blob_reference_counts(packages);
    let mut sizes = BTreeMap::new();
    for (package, blobs) in packages {
        let mut total = PackageSizes::default();
        for blob in blobs.values() {
            let count = counts[&(blob.name.clone(), blob.hash.clone())] as f64;
            total.compressed += blob.compressed as f64 / count;
            total.uncompressed += blob.uncompressed as f64 / count;
        }
        sizes.insert(package.clone(), total);
    }
    sizes
}

/// Raw sum across all packages without apportioning. Used for the synthetic
/// grand-total pseudo-package; shared blobs are deliberately counted once
/// per referencing package here.
pub fn unapportioned_total(packages: &PackageBlobs) -> PackageSizes {
    let mut total = PackageSizes::default();
    for blobs in packages.values() {
        for blob in blobs.values() {
            total.compressed += blob.compressed as f64;
            total.uncompressed += blob.uncompressed as f64;
        }
    }
    total
}

/// Resolves a budget-metric name to the package it checks.
pub fn metric_package_name(metric: &str) -> &str {
    metric
        .strip_suffix(COMPRESSED_METRIC_SUFFIX)
        .unwrap_or(metric)
}

/// Compares apportioned compressed sizes against configured limits. If the
/// measurement pipeline never completed, every configured metric is CRASH
/// rather than evaluated. Returns overall pass plus per-metric status.
pub fn evaluate_budgets(
    sizes: &BTreeMap<String, PackageSizes>,
    config: &SizesConfig,
    completed: bool,
) -> anyhow::Result<(bool, BTreeMap<String, TestStatus>)> {
    let mut status = BTreeMap::new();
    if !completed {
        for metric in config.size_limits.keys() {
            status.insert(metric.clone(), TestStatus::Crash);
        }
    } else {
        for (metric, limit) in &config.size_limits {
            let package = metric_package_name(metric);
            let measured = sizes.get(package).ok_or_else(|| {
                CheckError::Precondition(format!(
                    "budget metric {metric} names unmeasured package {package}"
                ))
            })?;
            let outcome = if measured.compressed <= *limit as f64 {
                TestStatus::Pass
            } else {
                TestStatus::Fail
            };
            status.insert(metric.clone(), outcome);
        }
    }
    let all_passed = completed && status.values().all(|s| *s == TestStatus::Pass);
    Ok((all_passed, status))
}
