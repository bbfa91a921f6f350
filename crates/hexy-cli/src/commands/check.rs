//! `hexy check` - compose a manifest and report wiring defects.

use serde::Serialize;
use tracing::info;

use crate::{
    cli::CheckArgs,
    commands::load_graph,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Machine-readable result of a successful check.
#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    manifest: String,
    modules: usize,
    providers: usize,
    load_order: &'a [String],
}

/// Validate the manifest. Composition errors surface as `CliError`s.
pub fn execute(args: CheckArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let graph = load_graph(&args.source, &config)?;
    info!(
        modules = graph.modules.len(),
        providers = graph.provider_count(),
        "manifest composed"
    );

    if output.is_json() {
        output.json(&CheckReport {
            manifest: graph.path.display().to_string(),
            modules: graph.modules.len(),
            providers: graph.provider_count(),
            load_order: &graph.composition.load_order,
        })?;
        return Ok(());
    }

    output.success(&format!(
        "{} is valid: {} module(s), {} provider(s)",
        graph.path.display(),
        graph.modules.len(),
        graph.provider_count(),
    ))?;
    output.info(&format!(
        "Load order: {}",
        graph.composition.load_order.join(" -> ")
    ))?;

    Ok(())
}
