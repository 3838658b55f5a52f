use crate::domain::models::JsonOut;
use serde::Serialize;

/// Prints the machine-readable success envelope on stdout.
pub fn print_envelope<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&JsonOut { ok: true, data })?
    );
    Ok(())
}
