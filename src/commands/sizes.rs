use crate::cli::{Cli, SizesArgs};
use crate::domain::models::{
    Blob, CheckError, PackageSizes, SizesConfig, SizesReport, TestStatus,
};
use crate::services::output::print_envelope;
use crate::services::accounting::{apportioned_sizes, evaluate_budgets, unapportioned_total};
use crate::services::archive::{
    archive_base_name, excluded_blob_names, package_blobs, ExtractorTools,
};
use crate::services::reports::{size_data_doc, sizes_histogram, write_test_results};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

fn load_sizes_config(args: &SizesArgs) -> anyhow::Result<SizesConfig> {
    let raw = std::fs::read_to_string(&args.sizes_path).map_err(|e| {
        CheckError::Precondition(format!(
            "cannot read size budgets {}: {e}",
            args.sizes_path.display()
        ))
    })?;
    let config: SizesConfig = serde_json::from_str(&raw)
        .map_err(|e| CheckError::Parse(format!("size budgets: {e}")))?;
    Ok(config)
}

fn print_blob_table(package: &str, blobs: &BTreeMap<String, Blob>) {
    println!("Package blob sizes: {package}");
    println!(
        "{:<64} {:>12} {:>12} path",
        "blob hash", "compressed", "uncompressed"
    );
    for blob in blobs.values() {
        println!(
            "{:<64} {:>12} {:>12} {}",
            blob.hash, blob.compressed, blob.uncompressed, blob.name
        );
    }
}

/// Measures every configured package. Archives are processed one at a time;
/// each gets a fresh scratch subdirectory, so packages stay independent.
fn measure_packages(
    cli: &Cli,
    args: &SizesArgs,
    config: &SizesConfig,
) -> anyhow::Result<BTreeMap<String, PackageSizes>> {
    let extract_root = tempfile::TempDir::new()?;
    let excluded = excluded_blob_names(args.sdk_root.as_deref())?;
    let tools = ExtractorTools {
        far_tool: args.far_tool.clone(),
        compressor: args.compressor.clone(),
    };

    let mut packages: BTreeMap<String, BTreeMap<String, Blob>> = BTreeMap::new();
    for far_file in &config.far_files {
        let name = archive_base_name(far_file);
        if packages.contains_key(&name) {
            return Err(CheckError::Precondition(format!(
                "duplicate archive base name: {name}"
            ))
            .into());
        }
        let blobs = package_blobs(
            &tools,
            far_file,
            &args.build_out_dir,
            extract_root.path(),
            &excluded,
        )?;
        if args.verbose && !cli.json {
            print_blob_table(&name, &blobs);
        }
        packages.insert(name, blobs);
    }

    let mut sizes = apportioned_sizes(&packages);
    if let Some(total_name) = &config.far_total_name {
        // Aggregate pseudo-package: raw sum, shared blobs counted once per
        // referencing package.
        sizes.insert(total_name.clone(), unapportioned_total(&packages));
    }
    Ok(sizes)
}

fn print_summary(sizes: &BTreeMap<String, PackageSizes>, status: &BTreeMap<String, TestStatus>) {
    for (name, size) in sizes {
        println!(
            "{name}: compressed size {:.0}, uncompressed size {:.0}",
            size.compressed, size.uncompressed
        );
    }
    for (metric, outcome) in status {
        println!("{metric}: {}", outcome.as_str());
    }
}

pub fn handle_sizes(cli: &Cli, args: &SizesArgs) -> anyhow::Result<i32> {
    if !args.build_out_dir.is_dir() {
        return Err(CheckError::Precondition(format!(
            "build out dir {} does not exist",
            args.build_out_dir.display()
        ))
        .into());
    }
    let config = load_sizes_config(args)?;
    for far_file in &config.far_files {
        let path = args.build_out_dir.join(far_file);
        if !path.is_file() {
            return Err(CheckError::Precondition(format!(
                "archive not found: {}",
                path.display()
            ))
            .into());
        }
    }

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    // Collect the measurement failure instead of bailing: budgets still get
    // CRASH statuses and the result artifacts still get written.
    let (completed, sizes) = match measure_packages(cli, args, &config) {
        Ok(sizes) => (true, sizes),
        Err(e) => {
            eprintln!("size measurement failed: {e:#}");
            (false, BTreeMap::new())
        }
    };

    let (all_passed, status) = evaluate_budgets(&sizes, &config, completed)?;

    if let Some(path) = &args.test_results {
        write_test_results(path, completed, &status, timestamp)?;
    }
    if let Some(path) = &args.size_data {
        std::fs::write(path, serde_json::to_string_pretty(&size_data_doc(&sizes))?)?;
    }
    if let Some(path) = &args.histogram {
        std::fs::write(
            path,
            serde_json::to_string_pretty(&sizes_histogram(&sizes))?,
        )?;
    }

    if cli.json {
        print_envelope(SizesReport {
            packages: sizes,
            status,
            all_passed,
        })?;
    } else {
        print_summary(&sizes, &status);
    }

    Ok(if all_passed { 0 } else { 1 })
}
