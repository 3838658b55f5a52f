use crate::domain::models::{
    PackageSizes, SimpleResultsDoc, TestOutcome, TestResultsDoc, TestStatus,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

pub fn test_results_doc(
    status: &BTreeMap<String, TestStatus>,
    timestamp: u64,
) -> TestResultsDoc {
    let mut num_failures_by_type: BTreeMap<String, usize> = ["FAIL", "PASS", "CRASH"]
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    let mut tests = BTreeMap::new();
    for (metric, actual) in status {
        *num_failures_by_type
            .entry(actual.as_str().to_string())
            .or_default() += 1;
        tests.insert(
            metric.clone(),
            TestOutcome {
                expected: "PASS",
                actual: *actual,
            },
        );
    }
    TestResultsDoc {
        tests,
        interrupted: false,
        path_delimiter: ".".to_string(),
        version: 3,
        seconds_since_epoch: timestamp,
        num_failures_by_type,
    }
}

pub fn simple_results_doc(completed: bool) -> SimpleResultsDoc {
    SimpleResultsDoc {
        valid: completed,
        failures: vec![],
        version: "simplified".to_string(),
    }
}

/// Writes the per-metric results document, falling back to the simplified
/// form when no status is available.
pub fn write_test_results(
    path: &Path,
    completed: bool,
    status: &BTreeMap<String, TestStatus>,
    timestamp: u64,
) -> anyhow::Result<()> {
    let raw = if status.is_empty() {
        serde_json::to_string_pretty(&simple_results_doc(completed))?
    } else {
        serde_json::to_string_pretty(&test_results_doc(status, timestamp))?
    };
    std::fs::write(path, raw)?;
    Ok(())
}

/// `{package: compressed_bytes}` map for the review-plugin size display.
pub fn size_data_doc(sizes: &BTreeMap<String, PackageSizes>) -> serde_json::Value {
    let map: BTreeMap<&String, f64> = sizes.iter().map(|(n, s)| (n, s.compressed)).collect();
    json!(map)
}

fn histogram_item(name: &str, size: f64, sizes_guid: &Uuid) -> serde_json::Value {
    // ln(0) is -inf, which JSON cannot carry; zero-size samples record 0.
    let log_size = if size > 0.0 { size.ln() } else { 0.0 };
    json!({
        "name": name,
        "unit": "sizeInBytes_smallerIsBetter",
        "diagnostics": { "benchmarks": sizes_guid.to_string() },
        "sampleValues": [size],
        "running": [1, size, log_size, size, size, size, 0],
        "description": "package binary sizes",
        "summaryOptions": {
            "avg": true,
            "count": false,
            "max": false,
            "min": false,
            "std": false,
            "sum": false,
        },
    })
}

/// Dashboard histogram: one external diagnostic naming the size benchmark,
/// then a compressed and an uncompressed sample per package.
pub fn sizes_histogram(sizes: &BTreeMap<String, PackageSizes>) -> Vec<serde_json::Value> {
    let sizes_guid = Uuid::new_v4();
    let mut histogram = vec![json!({
        "type": "GenericSet",
        "guid": sizes_guid.to_string(),
        "values": ["sizes"],
    })];
    for (name, size) in sizes {
        histogram.push(histogram_item(
            &format!("{name}_compressed"),
            size.compressed,
            &sizes_guid,
        ));
        histogram.push(histogram_item(
            &format!("{name}_uncompressed"),
            size.uncompressed,
            &sizes_guid,
        ));
    }
    histogram
}

#[cfg(test)]
mod tests {
    use super::{simple_results_doc, sizes_histogram, test_results_doc};
    use crate::domain::models::{PackageSizes, TestStatus};
    use std::collections::BTreeMap;

    fn status_map(entries: &[(&str, TestStatus)]) -> BTreeMap<String, TestStatus> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn results_doc_counts_outcomes_by_type() {
        let doc = test_results_doc(
            &status_map(&[
                ("a_compressed", TestStatus::Pass),
                ("b_compressed", TestStatus::Fail),
                ("c_compressed", TestStatus::Crash),
            ]),
            1700000000,
        );
        assert_eq!(doc.version, 3);
        assert_eq!(doc.num_failures_by_type["PASS"], 1);
        assert_eq!(doc.num_failures_by_type["FAIL"], 1);
        assert_eq!(doc.num_failures_by_type["CRASH"], 1);
        assert_eq!(doc.tests["a_compressed"].expected, "PASS");
    }

    #[test]
    fn simplified_doc_reflects_completion() {
        assert!(simple_results_doc(true).valid);
        assert!(!simple_results_doc(false).valid);
    }

    #[test]
    fn histogram_has_diagnostic_plus_two_items_per_package() {
        let mut sizes = BTreeMap::new();
        sizes.insert(
            "chrome".to_string(),
            PackageSizes {
                compressed: 16384.0,
                uncompressed: 32768.0,
            },
        );
        let histogram = sizes_histogram(&sizes);
        assert_eq!(histogram.len(), 3);
        assert_eq!(histogram[0]["type"], "GenericSet");
        assert_eq!(histogram[1]["name"], "chrome_compressed");
        assert_eq!(histogram[1]["sampleValues"][0], 16384.0);
        assert_eq!(histogram[2]["name"], "chrome_uncompressed");
        assert_eq!(
            histogram[1]["diagnostics"]["benchmarks"],
            histogram[0]["guid"]
        );
    }

    #[test]
    fn zero_size_samples_keep_the_running_aggregates_finite() {
        let mut sizes = BTreeMap::new();
        sizes.insert("empty".to_string(), PackageSizes::default());
        let histogram = sizes_histogram(&sizes);
        for item in &histogram[1..] {
            let running = item["running"].as_array().expect("running array");
            assert!(running.iter().all(|v| v.is_number()));
            assert_eq!(running[2], 0.0);
        }
    }
}
