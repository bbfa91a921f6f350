//! TOML module manifests.
//!
//! A manifest is a static registration table: it lists modules, their
//! imports and exports, and the providers each module declares. Manifest
//! providers are string tokens whose factory builds a [`ManifestComponent`],
//! so a whole application graph can be composed, resolved and torn down
//! without any application code.
//!
//! # Manifest format
//!
//! ```toml
//! [[modules]]
//! name    = "domain"
//! exports = ["user-service"]
//!
//! [[modules.providers]]
//! token      = "user-service"
//! scope      = "singleton"           # singleton | transient | request
//! depends_on = ["user-repository"]
//! lifecycle  = true                  # log init/destroy through tracing
//!
//! [[modules.providers]]
//! token = "user-repository"
//!
//! [[modules]]
//! name    = "web"
//! imports = ["domain"]
//! ```
//!
//! # Discovery
//!
//! [`ManifestLoader`] accepts either a single file or a directory. A
//! directory is walked recursively and every `*.toml` file in it is read, in
//! file-name order; their modules are concatenated.

use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use hexy_core::{
    application::{ApplicationError, describe, ports::ModuleSource},
    domain::{
        Dependencies, DependencyError, Descriptor, DomainError, InstanceId, Module,
        Provider, ProviderDefinition, Scope, Token,
    },
    error::HexyResult,
};

use crate::descriptor_table::DescriptorTable;

// ── Errors ──────────────────────────────────────────────────────────────────

/// Failure to read or interpret a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no *.toml manifests under '{}'", .0.display())]
    Empty(PathBuf),

    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk '{}': {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("provider '{token}' in module '{module}': {source}")]
    Provider {
        module: String,
        token: String,
        #[source]
        source: DomainError,
    },
}

impl From<ManifestError> for hexy_core::error::HexyError {
    fn from(e: ManifestError) -> Self {
        ApplicationError::ModuleSourceFailed {
            reason: e.to_string(),
        }
        .into()
    }
}

// ── Manifest types ──────────────────────────────────────────────────────────

/// Deserialised representation of one manifest file.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ApplicationManifest {
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

/// One `[[modules]]` table.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModuleEntry {
    pub name: String,
    /// Names of modules whose exports this module may use.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Tokens other modules may use when they import this one.
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
}

/// One `[[modules.providers]]` table.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderEntry {
    pub token: String,
    /// `singleton`, `transient` or `request` (`scoped` is accepted too).
    /// Falls back to the loader's default scope.
    pub scope: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Attach init/destroy hooks that log through `tracing`.
    #[serde(default)]
    pub lifecycle: bool,
}

impl ApplicationManifest {
    /// Parse manifest text.
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Turn the manifest into core modules.
    pub fn into_modules(self, default_scope: Scope) -> Result<Vec<Module>, ManifestError> {
        self.modules
            .into_iter()
            .map(|entry| entry.into_module(default_scope))
            .collect()
    }
}

impl ModuleEntry {
    /// Scope and dependencies of this module's providers, keyed by token.
    ///
    /// Tables are per module: two modules may declare the same token with
    /// different scopes or dependencies.
    pub fn descriptors(&self, default_scope: Scope) -> Result<DescriptorTable, ManifestError> {
        let mut entries = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let scope = match &provider.scope {
                Some(raw) => raw.parse().map_err(|source| ManifestError::Provider {
                    module: self.name.clone(),
                    token: provider.token.clone(),
                    source,
                })?,
                None => default_scope,
            };
            let dependencies = provider.depends_on.iter().map(|d| Token::named(d.as_str()));
            entries.push((
                Token::named(provider.token.as_str()),
                Descriptor::new(scope, dependencies),
            ));
        }
        Ok(entries.into_iter().collect())
    }

    fn into_module(self, default_scope: Scope) -> Result<Module, ManifestError> {
        let table = self.descriptors(default_scope)?;

        let mut builder = Module::builder(self.name.as_str());
        for import in self.imports {
            builder = builder.import(import);
        }
        for export in self.exports {
            builder = builder.export(export);
        }
        for provider in self.providers {
            builder = builder.provider(component_provider(&table, &self.name, provider)?);
        }
        Ok(builder.build())
    }
}

// ── Components ──────────────────────────────────────────────────────────────

/// What a manifest provider produces: a record of its token and the
/// components it was built from.
pub struct ManifestComponent {
    pub token: Token,
    pub id: InstanceId,
    pub dependencies: Vec<Arc<ManifestComponent>>,
}

impl ManifestComponent {
    fn build(token: Token, deps: &Dependencies) -> Result<Self, DependencyError> {
        let dependencies = deps
            .iter()
            .map(|(dep, instance)| {
                Arc::clone(instance)
                    .downcast::<ManifestComponent>()
                    .map_err(|_| DependencyError::WrongType {
                        token: dep.clone(),
                        expected: "ManifestComponent",
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            token,
            id: InstanceId::next(),
            dependencies,
        })
    }
}

impl fmt::Debug for ManifestComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestComponent")
            .field("token", &self.token)
            .field("id", &self.id)
            .field(
                "dependencies",
                &self.dependencies.iter().map(|d| &d.token).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn component_provider(
    table: &DescriptorTable,
    module: &str,
    entry: ProviderEntry,
) -> Result<ProviderDefinition, ManifestError> {
    let token = Token::named(entry.token.as_str());
    let descriptor = describe(table, &token).map_err(|e| ManifestError::Provider {
        module: module.to_string(),
        token: entry.token.clone(),
        source: e
            .as_domain()
            .cloned()
            .unwrap_or(DomainError::MissingDescriptor {
                token: token.clone(),
            }),
    })?;

    let mut builder = Provider::token::<ManifestComponent>(token.clone()).with_descriptor(descriptor);
    if entry.lifecycle {
        builder = builder
            .on_init(|c: &ManifestComponent| {
                info!(token = %c.token, id = %c.id, "component initialized");
                Ok(())
            })
            .on_destroy(|c: &ManifestComponent| {
                info!(token = %c.token, id = %c.id, "component destroyed");
                Ok(())
            });
    }

    Ok(builder.construct(move |deps: &Dependencies| ManifestComponent::build(token.clone(), deps)))
}

// ── Loader ──────────────────────────────────────────────────────────────────

/// Loads modules from a manifest file or a directory of manifests.
///
/// # Example
///
/// ```no_run
/// use hexy_adapters::ManifestLoader;
/// use hexy_core::{application::Container, application::ports::ModuleSource};
///
/// let loader = ManifestLoader::new("./hexy.toml");
/// let container = Container::from_modules(loader.load()?)?;
/// # Ok::<(), hexy_core::error::HexyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    path: PathBuf,
    default_scope: Scope,
}

impl ManifestLoader {
    /// Create a loader pointed at `path` (file or directory).
    ///
    /// The path does not need to exist yet; loading fails if it is missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_scope: Scope::default(),
        }
    }

    /// Scope for providers that do not name one.
    pub fn with_default_scope(mut self, scope: Scope) -> Self {
        self.default_scope = scope;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Manifest files this loader would read, in load order.
    pub fn manifest_files(&self) -> Result<Vec<PathBuf>, ManifestError> {
        if !self.path.exists() {
            return Err(ManifestError::NotFound(self.path.clone()));
        }
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.path).sort_by_file_name() {
            let entry = entry.map_err(|source| ManifestError::Walk {
                path: self.path.clone(),
                source,
            })?;
            let is_toml = entry.path().extension().is_some_and(|ext| ext == "toml");
            if entry.file_type().is_file() && is_toml {
                files.push(entry.into_path());
            }
        }

        if files.is_empty() {
            return Err(ManifestError::Empty(self.path.clone()));
        }
        Ok(files)
    }

    /// Read and parse every manifest file.
    pub fn read_manifests(&self) -> Result<Vec<(PathBuf, ApplicationManifest)>, ManifestError> {
        self.manifest_files()?
            .into_iter()
            .map(|path| {
                let manifest = read_manifest(&path)?;
                Ok((path, manifest))
            })
            .collect()
    }

    /// Read every manifest and convert it to modules.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load_modules(&self) -> Result<Vec<Module>, ManifestError> {
        let mut modules = Vec::new();
        for (path, manifest) in self.read_manifests()? {
            let loaded = manifest.into_modules(self.default_scope)?;
            debug!(file = %path.display(), modules = loaded.len(), "manifest loaded");
            modules.extend(loaded);
        }
        debug!(count = modules.len(), "finished loading modules");
        Ok(modules)
    }
}

impl ModuleSource for ManifestLoader {
    fn load(&self) -> HexyResult<Vec<Module>> {
        Ok(self.load_modules()?)
    }
}

fn read_manifest(path: &Path) -> Result<ApplicationManifest, ManifestError> {
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ApplicationManifest::parse(&raw).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexy_core::{application::Container, domain::ResolutionContext};
    use tempfile::TempDir;

    const LAYERED: &str = r#"
[[modules]]
name    = "domain"
exports = ["user-service"]

[[modules.providers]]
token      = "user-service"
depends_on = ["user-repository"]
lifecycle  = true

[[modules.providers]]
token = "user-repository"

[[modules]]
name    = "web"
imports = ["domain"]

[[modules.providers]]
token      = "user-controller"
scope      = "request"
depends_on = ["user-service"]
"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_modules_and_providers() {
        let manifest = ApplicationManifest::parse(LAYERED).unwrap();
        assert_eq!(manifest.modules.len(), 2);
        assert_eq!(manifest.modules[0].exports, ["user-service"]);
        assert_eq!(manifest.modules[1].imports, ["domain"]);
        assert!(manifest.modules[0].providers[0].lifecycle);
        assert_eq!(manifest.modules[1].providers[0].scope.as_deref(), Some("request"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ApplicationManifest::parse("[[modules]]\nname = \"a\"\nimport = [\"b\"]\n");
        assert!(err.is_err());
    }

    #[test]
    fn invalid_scope_names_the_provider() {
        let manifest = ApplicationManifest::parse(
            "[[modules]]\nname = \"m\"\n[[modules.providers]]\ntoken = \"p\"\nscope = \"forever\"\n",
        )
        .unwrap();
        let err = manifest.into_modules(Scope::Singleton).unwrap_err();
        match err {
            ManifestError::Provider { module, token, source } => {
                assert_eq!(module, "m");
                assert_eq!(token, "p");
                assert_eq!(source, DomainError::InvalidScope("forever".into()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_scope_applies_when_unset() {
        let manifest = ApplicationManifest::parse(LAYERED).unwrap();
        let table = manifest.modules[0].descriptors(Scope::Transient).unwrap();
        let repo = hexy_core::application::ports::DescriptorSource::descriptor(
            &table,
            &Token::named("user-repository"),
        )
        .unwrap();
        assert_eq!(repo.scope, Scope::Transient);
    }

    #[test]
    fn loads_a_single_file() {
        let root = TempDir::new().unwrap();
        let path = write(root.path(), "hexy.toml", LAYERED);

        let modules = ManifestLoader::new(&path).load_modules().unwrap();
        let names: Vec<_> = modules.iter().map(Module::name).collect();
        assert_eq!(names, ["domain", "web"]);
    }

    #[test]
    fn directory_is_walked_in_file_name_order() {
        let root = TempDir::new().unwrap();
        write(
            root.path(),
            "b/web.toml",
            "[[modules]]\nname = \"web\"\nimports = [\"domain\"]\n",
        );
        write(root.path(), "a.toml", "[[modules]]\nname = \"domain\"\n");
        write(root.path(), "notes.md", "not a manifest");

        let loader = ManifestLoader::new(root.path());
        assert_eq!(loader.manifest_files().unwrap().len(), 2);

        let modules = loader.load_modules().unwrap();
        let names: Vec<_> = modules.iter().map(Module::name).collect();
        assert_eq!(names, ["domain", "web"]);
    }

    #[test]
    fn missing_and_empty_paths_fail() {
        let root = TempDir::new().unwrap();
        assert!(matches!(
            ManifestLoader::new(root.path().join("absent")).load_modules(),
            Err(ManifestError::NotFound(_))
        ));
        assert!(matches!(
            ManifestLoader::new(root.path()).load_modules(),
            Err(ManifestError::Empty(_))
        ));
    }

    #[test]
    fn parse_errors_carry_the_file() {
        let root = TempDir::new().unwrap();
        let path = write(root.path(), "broken.toml", "[[modules]\nname =");
        let err = ManifestLoader::new(&path).load_modules().unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn manifest_graph_resolves_and_shares_singletons() {
        let root = TempDir::new().unwrap();
        let path = write(root.path(), "hexy.toml", LAYERED);
        let container = Container::from_modules(ManifestLoader::new(&path).load().unwrap()).unwrap();

        let mut context = ResolutionContext::new();
        let controller = container
            .resolve_as_in::<ManifestComponent>(&Token::named("user-controller"), &mut context)
            .unwrap();
        let service = container
            .resolve_as::<ManifestComponent>(&Token::named("user-service"))
            .unwrap();

        assert_eq!(controller.dependencies.len(), 1);
        assert!(Arc::ptr_eq(&controller.dependencies[0], &service));
        assert_eq!(service.dependencies[0].token, Token::named("user-repository"));

        container.end_context(context).unwrap();
        container.teardown().unwrap();
    }

    #[test]
    fn visibility_violation_surfaces_at_composition() {
        let manifest = r#"
[[modules]]
name = "domain"
[[modules.providers]]
token = "secret"

[[modules]]
name    = "web"
imports = ["domain"]
[[modules.providers]]
token      = "controller"
depends_on = ["secret"]
"#;
        let modules = ApplicationManifest::parse(manifest)
            .unwrap()
            .into_modules(Scope::Singleton)
            .unwrap();
        let err = Container::from_modules(modules).unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::UnresolvedDependency { .. })
        ));
    }

    #[test]
    fn same_token_in_two_modules_keeps_each_descriptor() {
        let manifest = r#"
[[modules]]
name = "first"
[[modules.providers]]
token      = "clock"
depends_on = ["tz"]
[[modules.providers]]
token = "tz"

[[modules]]
name = "second"
[[modules.providers]]
token = "clock"
scope = "transient"
"#;
        let modules = ApplicationManifest::parse(manifest)
            .unwrap()
            .into_modules(Scope::Singleton)
            .unwrap();

        let first = &modules[0].providers()[0];
        assert_eq!(first.scope(), Scope::Singleton);
        assert_eq!(first.dependencies(), [Token::named("tz")]);

        let second = &modules[1].providers()[0];
        assert_eq!(second.scope(), Scope::Transient);
        assert!(second.dependencies().is_empty());
    }
}
