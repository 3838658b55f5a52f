use crate::cli::{Cli, HeadersArgs};
use crate::domain::models::{CheckError, HeaderReport, HeadersConfig};
use crate::services::deps_trace::{is_build_clean, used_headers};
use crate::services::output::print_envelope;
use crate::services::reconcile::{parse_allowlist, reconcile};
use crate::services::{build_graph, ownership};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

fn config_from(args: &HeadersArgs) -> HeadersConfig {
    HeadersConfig {
        src_root: args.src_root.clone(),
        out_dir: args.out_dir.clone(),
        ninja: args.ninja.clone(),
        gn: args.gn.clone(),
        gclient: args.gclient.clone(),
    }
}

/// Writes the machine-consumable findings array. Fatal errors emit an empty
/// array so automated callers can distinguish findings from tool failure by
/// exit status alone.
fn dump_machine(path: Option<&Path>, entries: &[String]) -> anyhow::Result<()> {
    if let Some(path) = path {
        std::fs::write(path, serde_json::to_string(entries)?)?;
    }
    Ok(())
}

fn fail<T>(machine_json: Option<&Path>, err: anyhow::Error) -> anyhow::Result<T> {
    dump_machine(machine_json, &[])?;
    Err(err)
}

/// Fan-out/fan-in acquisition: the trace parse, the graph generation, and
/// the ownership query are independent, so each runs on its own worker with
/// a dedicated one-shot channel. All three results (including errors) are
/// collected before any reconciliation decision is made, so the caller sees
/// every problem at once.
type Acquired = (
    HashMap<String, Vec<String>>,
    HashSet<String>,
    HashSet<String>,
);

fn acquire(config: &HeadersConfig) -> anyhow::Result<Acquired> {
    let (used_tx, used_rx) = mpsc::channel();
    let (declared_tx, declared_rx) = mpsc::channel();
    let (prefixes_tx, prefixes_rx) = mpsc::channel();

    let used_config = config.clone();
    let used_worker = thread::spawn(move || {
        let _ = used_tx.send(used_headers(&used_config, false));
    });
    let declared_config = config.clone();
    let declared_worker = thread::spawn(move || {
        let _ = declared_tx.send(build_graph::declared_headers(&declared_config));
    });
    let prefixes_config = config.clone();
    let prefixes_worker = thread::spawn(move || {
        let _ = prefixes_tx.send(ownership::ownership_prefixes(&prefixes_config));
    });

    let used = used_rx.recv()?;
    let declared = declared_rx.recv()?;
    let prefixes = prefixes_rx.recv()?;
    for worker in [used_worker, declared_worker, prefixes_worker] {
        let _ = worker.join();
    }

    match (used, declared, prefixes) {
        (Ok(u), Ok(d), Ok(p)) => Ok((u, d, p)),
        (used, declared, prefixes) => {
            // Keep the first failure as the typed error so its code survives
            // to the error envelope; the remaining failures ride along as
            // context so the caller still sees every problem.
            let mut failures: Vec<anyhow::Error> = [used.err(), declared.err(), prefixes.err()]
                .into_iter()
                .flatten()
                .collect();
            let mut err = failures.remove(0);
            for other in failures {
                err = err.context(format!("{other:#}"));
            }
            Err(err)
        }
    }
}

fn print_report(cli: &Cli, report: &HeaderReport) -> anyhow::Result<()> {
    if cli.json {
        return print_envelope(report);
    }
    if !report.missing.is_empty() {
        println!("\nThe following files should be declared in the build graph:");
        for path in &report.missing {
            println!("{path}");
        }
    }
    if !report.nonexistent.is_empty() {
        println!("\nThe following non-existing files should be removed from the build graph:");
        for path in &report.nonexistent {
            println!("{path}");
        }
    }
    if !report.has_findings() {
        println!("no findings");
    }
    Ok(())
}

/// Second, slower trace pass with object accumulation. Only runs when the
/// user asks for detail on real findings.
fn print_detailed_dependencies(config: &HeadersConfig, report: &HeaderReport) {
    let used = match used_headers(config, true) {
        Ok(used) => used,
        Err(e) => {
            eprintln!("detailed dependency pass failed: {e:#}");
            return;
        }
    };
    println!("\nDetailed dependency info:");
    for path in &report.missing {
        println!("{path}");
        for object in used.get(path).map(|v| v.as_slice()).unwrap_or_default() {
            println!("   {object}");
        }
    }

    println!("\nMissing headers sorted by number of affected object files:");
    let mut ranked: Vec<(&String, usize)> = used
        .iter()
        .filter(|(path, _)| report.missing.contains(path))
        .map(|(path, objects)| (path, objects.len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    for (path, count) in ranked {
        println!("{count} {path}");
    }
}

pub fn handle_headers(cli: &Cli, args: &HeadersArgs) -> anyhow::Result<i32> {
    let config = config_from(args);
    let machine_json = args.machine_json.as_deref();

    if !config.src_root.join(&config.out_dir).is_dir() {
        return fail(
            machine_json,
            CheckError::Precondition(format!("out dir {} does not exist", config.out_dir)).into(),
        );
    }

    if !args.skip_dirty_check && !is_build_clean(&config) {
        let dirty_msg = "out dir looks dirty; build all targets there first";
        if machine_json.is_some() {
            // Assume an automated caller: report cleanly and let the empty
            // machine artifact stand in for "no trustworthy findings".
            eprintln!("{dirty_msg}");
            dump_machine(machine_json, &[])?;
            return Ok(0);
        }
        return Err(CheckError::Precondition(dirty_msg.to_string()).into());
    }

    let (used, declared, prefixes) = match acquire(&config) {
        Ok(acquired) => acquired,
        Err(e) => return fail(machine_json, e),
    };

    let allowlist = match &args.allowlist {
        Some(path) => parse_allowlist(&std::fs::read_to_string(path)?),
        None => HashSet::new(),
    };

    let report = match reconcile(&used, &declared, &prefixes, &allowlist, &config.src_root) {
        Ok(report) => report,
        Err(e) => return fail(machine_json, e),
    };

    let mut combined: Vec<String> = report
        .missing
        .iter()
        .chain(report.nonexistent.iter())
        .cloned()
        .collect();
    combined.sort();
    dump_machine(machine_json, &combined)?;

    print_report(cli, &report)?;
    if args.verbose && report.has_findings() && !cli.json {
        print_detailed_dependencies(&config, &report);
    }

    if !report.has_findings() {
        return Ok(0);
    }
    if machine_json.is_some() && args.exit_zero_on_findings {
        return Ok(0);
    }
    Ok(1)
}
