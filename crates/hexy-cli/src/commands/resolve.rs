//! `hexy resolve` - build a container from a manifest and resolve one token.
//!
//! Each resolution prints the component tree with instance ids, so shared
//! singletons show up with the same id and transients with fresh ones. With
//! `--request` every resolution gets its own `ResolutionContext`, which is
//! ended before the next one starts.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use hexy_adapters::ManifestComponent;
use hexy_core::{
    application::Container,
    domain::{InstanceId, ResolutionContext, Token},
    error::HexyResult,
};

use crate::{
    cli::ResolveArgs,
    commands::load_graph,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// JSON shape of a resolved component.
#[derive(Debug, Serialize)]
struct ComponentView {
    token: String,
    id: u64,
    dependencies: Vec<ComponentView>,
}

impl From<&ManifestComponent> for ComponentView {
    fn from(component: &ManifestComponent) -> Self {
        Self {
            token: component.token.label(),
            id: component.id.get(),
            dependencies: component
                .dependencies
                .iter()
                .map(|d| ComponentView::from(d.as_ref()))
                .collect(),
        }
    }
}

#[instrument(skip_all, fields(token = %args.token))]
pub fn execute(args: ResolveArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    if args.token.trim().is_empty() {
        return Err(CliError::InvalidInput {
            message: "token must not be empty".into(),
            source: None,
        });
    }

    let graph = load_graph(&args.source, &config)?;
    let container = Container::new(graph.composition.registry);
    let token = Token::named(args.token.as_str());

    let outcome = resolve_times(&container, &token, args.request, args.times);
    // Destroy singletons whether or not resolution worked.
    let torn_down = container.teardown();
    let roots = outcome?;
    torn_down?;

    if output.is_json() {
        let views: Vec<ComponentView> = roots.iter().map(|r| ComponentView::from(r.as_ref())).collect();
        output.json(&views)?;
        return Ok(());
    }

    for (round, root) in roots.iter().enumerate() {
        output.header(&format!("Resolution {}:", round + 1))?;
        for line in render_tree(root) {
            output.print(&line)?;
        }
    }

    let distinct = distinct_instances(&roots);
    output.success(&format!(
        "Resolved '{}' {} time(s); {} distinct instance(s) built",
        token,
        roots.len(),
        distinct
    ))?;

    Ok(())
}

/// Resolve `token` `times` times, each in a fresh context when `request` is set.
fn resolve_times(
    container: &Container,
    token: &Token,
    request: bool,
    times: u32,
) -> HexyResult<Vec<Arc<ManifestComponent>>> {
    let mut roots = Vec::with_capacity(times as usize);
    for round in 1..=times {
        let root = if request {
            let mut context = ResolutionContext::new();
            debug!(round, context = %context.id(), "resolving in context");
            let resolved = container.resolve_as_in::<ManifestComponent>(token, &mut context);
            let ended = container.end_context(context);
            let root = resolved?;
            ended?;
            root
        } else {
            container.resolve_as::<ManifestComponent>(token)?
        };
        roots.push(root);
    }
    Ok(roots)
}

/// Indented tree, one component per line.
fn render_tree(root: &ManifestComponent) -> Vec<String> {
    let mut lines = vec![format!("  {} {}", root.token, root.id)];
    render_children(root, "  ", &mut lines);
    lines
}

fn render_children(node: &ManifestComponent, prefix: &str, lines: &mut Vec<String>) {
    let count = node.dependencies.len();
    for (i, child) in node.dependencies.iter().enumerate() {
        let last = i + 1 == count;
        let branch = if last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{branch}{} {}", child.token, child.id));

        let next = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_children(child, &next, lines);
    }
}

/// Number of different instance ids across all trees.
fn distinct_instances(roots: &[Arc<ManifestComponent>]) -> usize {
    fn collect(node: &ManifestComponent, seen: &mut BTreeSet<InstanceId>) {
        seen.insert(node.id);
        for child in &node.dependencies {
            collect(child, seen);
        }
    }

    let mut seen = BTreeSet::new();
    for root in roots {
        collect(root, &mut seen);
    }
    seen.len()
}
