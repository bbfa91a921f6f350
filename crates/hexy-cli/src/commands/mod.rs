//! Command handlers, one module per subcommand.

pub mod check;
pub mod completions;
pub mod config;
pub mod graph;
pub mod init;
pub mod resolve;

use std::path::PathBuf;

use tracing::{debug, instrument};

use hexy_adapters::ManifestLoader;
use hexy_core::{
    application::{Composition, ModuleComposer},
    domain::{Module, RegistrationPolicy},
};

use crate::{cli::ManifestArgs, config::AppConfig, error::CliResult};

/// A manifest that loaded and composed cleanly.
#[derive(Debug)]
pub struct LoadedGraph {
    pub path: PathBuf,
    /// Modules as declared, in file order.
    pub modules: Vec<Module>,
    pub composition: Composition,
}

impl LoadedGraph {
    /// Declared modules in load order.
    pub fn ordered_modules(&self) -> impl Iterator<Item = &Module> {
        self.composition
            .load_order
            .iter()
            .filter_map(|name| self.modules.iter().find(|m| m.name() == name))
    }

    pub fn provider_count(&self) -> usize {
        self.composition.registry.len()
    }
}

/// Read the manifest named on the command line (or the configured default)
/// and compose it with the configured registration policy.
#[instrument(skip_all)]
pub fn load_graph(source: &ManifestArgs, config: &AppConfig) -> CliResult<LoadedGraph> {
    let path = source
        .manifest
        .clone()
        .unwrap_or_else(|| config.manifest.default_path.clone());

    let policy = if source.allow_overwrite {
        RegistrationPolicy::Replace
    } else {
        config.policy()
    };
    debug!(path = %path.display(), ?policy, "loading manifest");

    let modules = ManifestLoader::new(&path)
        .with_default_scope(config.default_scope())
        .load_modules()?;
    let composition = ModuleComposer::with_policy(policy).compose(modules.clone())?;

    Ok(LoadedGraph {
        path,
        modules,
        composition,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    /// Three modules: `controllers` imports `services`, which imports `data`.
    pub const LAYERED: &str = r#"
[[modules]]
name = "data"
exports = ["user-repository"]

[[modules.providers]]
token = "user-repository"

[[modules]]
name = "services"
imports = ["data"]
exports = ["user-service"]

[[modules.providers]]
token = "user-service"
depends_on = ["user-repository"]

[[modules]]
name = "controllers"
imports = ["services"]

[[modules.providers]]
token = "user-controller"
scope = "request"
depends_on = ["user-service"]
"#;

    pub fn write_manifest(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hexy.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{LAYERED, write_manifest};
    use super::*;
    use crate::error::CliError;

    fn args(path: PathBuf) -> ManifestArgs {
        ManifestArgs {
            manifest: Some(path),
            allow_overwrite: false,
        }
    }

    #[test]
    fn loads_modules_in_dependency_order() {
        let (_dir, path) = write_manifest(LAYERED);
        let graph = load_graph(&args(path), &AppConfig::default()).unwrap();

        let names: Vec<&str> = graph.ordered_modules().map(Module::name).collect();
        assert_eq!(names, ["data", "services", "controllers"]);
        assert_eq!(graph.provider_count(), 3);
    }

    #[test]
    fn falls_back_to_configured_path() {
        let (_dir, path) = write_manifest(LAYERED);
        let mut config = AppConfig::default();
        config.manifest.default_path = path.clone();

        let source = ManifestArgs {
            manifest: None,
            allow_overwrite: false,
        };
        let graph = load_graph(&source, &config).unwrap();
        assert_eq!(graph.path, path);
    }

    #[test]
    fn missing_manifest_is_reported() {
        let err = load_graph(&args(PathBuf::from("/definitely/not/here.toml")), &AppConfig::default())
            .unwrap_err();
        assert!(matches!(err, CliError::Manifest(_)));
        assert_eq!(err.exit_code(), 3);
    }
}
