//! `chatbridge providers`: catalog with credential status.

use anyhow::Result;
use console::style;
use serde::Serialize;

use chatbridge_core::provider::credential::provider_status;

use crate::state::AppState;

#[derive(Serialize)]
struct ProviderRow {
    key: &'static str,
    label: &'static str,
    default_model: &'static str,
    connected: bool,
    error: Option<String>,
}

pub fn list_providers(state: &AppState, json: bool) -> Result<()> {
    let rows: Vec<ProviderRow> = state
        .registry()
        .specs()
        .iter()
        .map(|spec| {
            let status = provider_status(spec, state.env.as_ref());
            ProviderRow {
                key: spec.id.as_str(),
                label: spec.label,
                default_model: spec.default_model,
                connected: status.connected,
                error: status.error,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("Providers").bold());
    println!();
    for row in &rows {
        let mark = if row.connected {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!(
            "  {} {:<11} {:<11} {}",
            mark,
            style(row.key).cyan(),
            row.label,
            style(row.default_model).dim()
        );
        if let Some(error) = &row.error {
            println!("      {}", style(error).yellow());
        }
    }
    println!();
    Ok(())
}
