//! `hexy graph` - print modules and their providers in load order.

use serde::Serialize;

use hexy_core::domain::{Module, ProviderDefinition, Token};

use crate::{
    cli::{GraphArgs, GraphFormat},
    commands::{LoadedGraph, load_graph},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize, PartialEq)]
struct ModuleView {
    name: String,
    imports: Vec<String>,
    exports: Vec<String>,
    providers: Vec<ProviderView>,
}

#[derive(Debug, Serialize, PartialEq)]
struct ProviderView {
    token: String,
    scope: String,
    depends_on: Vec<String>,
}

impl From<&Module> for ModuleView {
    fn from(module: &Module) -> Self {
        Self {
            name: module.name().to_string(),
            imports: module.imports().to_vec(),
            exports: module.exports().iter().map(Token::label).collect(),
            providers: module.providers().iter().map(ProviderView::from).collect(),
        }
    }
}

impl From<&ProviderDefinition> for ProviderView {
    fn from(definition: &ProviderDefinition) -> Self {
        Self {
            token: definition.token().label(),
            scope: definition.scope().to_string(),
            depends_on: definition.dependencies().iter().map(Token::label).collect(),
        }
    }
}

pub fn execute(args: GraphArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let graph = load_graph(&args.source, &config)?;
    let views = views(&graph);

    match args.format {
        GraphFormat::Table => {
            output.header(&format!("Modules in {}:", graph.path.display()))?;
            for line in table_lines(&views) {
                output.print(&line)?;
            }
        }
        // JSON, list and CSV bypass the quiet filter so they stay pipeable.
        GraphFormat::Json => output.json(&views)?,
        GraphFormat::List => {
            for view in &views {
                for provider in &view.providers {
                    println!("{}", provider.token);
                }
            }
        }
        GraphFormat::Csv => {
            for line in csv_lines(&views) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn views(graph: &LoadedGraph) -> Vec<ModuleView> {
    graph.ordered_modules().map(ModuleView::from).collect()
}

fn table_lines(views: &[ModuleView]) -> Vec<String> {
    let mut lines = Vec::new();
    for view in views {
        lines.push(format!("  {}", view.name));
        if !view.imports.is_empty() {
            lines.push(format!("    imports: {}", view.imports.join(", ")));
        }
        if !view.exports.is_empty() {
            lines.push(format!("    exports: {}", view.exports.join(", ")));
        }
        for provider in &view.providers {
            let deps = if provider.depends_on.is_empty() {
                String::new()
            } else {
                format!(" <- {}", provider.depends_on.join(", "))
            };
            lines.push(format!("    - {} [{}]{}", provider.token, provider.scope, deps));
        }
    }
    lines
}

fn csv_lines(views: &[ModuleView]) -> Vec<String> {
    let mut lines = vec!["module,token,scope,depends_on".to_string()];
    for view in views {
        for provider in &view.providers {
            lines.push(format!(
                "{},{},{},{}",
                view.name,
                provider.token,
                provider.scope,
                provider.depends_on.join(";")
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ManifestArgs;
    use crate::commands::fixtures::{LAYERED, write_manifest};

    fn layered_views() -> Vec<ModuleView> {
        let (_dir, path) = write_manifest(LAYERED);
        let source = ManifestArgs {
            manifest: Some(path),
            allow_overwrite: false,
        };
        views(&load_graph(&source, &AppConfig::default()).unwrap())
    }

    #[test]
    fn views_follow_load_order() {
        let names: Vec<String> = layered_views().into_iter().map(|v| v.name).collect();
        assert_eq!(names, ["data", "services", "controllers"]);
    }

    #[test]
    fn provider_view_carries_scope_and_deps() {
        let views = layered_views();
        let controller = &views[2].providers[0];
        assert_eq!(
            controller,
            &ProviderView {
                token: "user-controller".into(),
                scope: "request".into(),
                depends_on: vec!["user-service".into()],
            }
        );
    }

    #[test]
    fn table_shows_dependency_arrows() {
        let lines = table_lines(&layered_views());
        assert!(lines.contains(&"    - user-service [singleton] <- user-repository".to_string()));
        assert!(lines.contains(&"    imports: data".to_string()));
    }

    #[test]
    fn csv_has_header_and_one_row_per_provider() {
        let lines = csv_lines(&layered_views());
        assert_eq!(lines[0], "module,token,scope,depends_on");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "controllers,user-controller,request,user-service");
    }
}
