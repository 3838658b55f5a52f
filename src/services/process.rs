use crate::domain::models::CheckError;
use std::path::Path;
use std::process::{Command, Output};

fn tool_name(tool: &Path) -> String {
    tool.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| tool.display().to_string())
}

/// Runs a tool to completion and returns its stdout. A missing executable or
/// a non-zero exit surfaces as `CheckError::Tool` with the exit code and any
/// captured stderr; no partial output is returned.
pub fn run_captured(tool: &Path, args: &[&str], cwd: &Path) -> anyhow::Result<String> {
    let output = spawn_collect(tool, args, cwd)?;
    if !output.status.success() {
        return Err(CheckError::Tool {
            tool: tool_name(tool),
            detail: exit_detail(&output),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Runs a tool for its side effects only.
pub fn run_checked(tool: &Path, args: &[&str], cwd: &Path) -> anyhow::Result<()> {
    run_captured(tool, args, cwd).map(|_| ())
}

pub fn spawn_collect(tool: &Path, args: &[&str], cwd: &Path) -> anyhow::Result<Output> {
    Command::new(tool)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| {
            CheckError::Tool {
                tool: tool_name(tool),
                detail: e.to_string(),
            }
            .into()
        })
}

pub fn exit_detail(output: &Output) -> String {
    let code = output
        .status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exit code {}", code)
    } else {
        format!("exit code {}: {}", code, stderr)
    }
}
