//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `HEXY_*` environment variables, e.g. `HEXY_CONTAINER__DEFAULT_SCOPE`
//! 3. `--config FILE`, or the platform config file plus `./.hexy.toml`
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use hexy_core::domain::{RegistrationPolicy, Scope};

/// File name used by `hexy init --local`.
pub const LOCAL_CONFIG: &str = ".hexy.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How containers built by the CLI behave.
    pub container: ContainerConfig,
    /// Where manifests are read from.
    pub manifest: ManifestConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Let a later registration replace an earlier one with the same token.
    pub allow_overwrite: bool,
    /// Scope for manifest providers that don't name one.
    pub default_scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Manifest file or directory used when a command gets no path.
    pub default_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            allow_overwrite: false,
            default_scope: Scope::Singleton,
        }
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            default_path: PathBuf::from("hexy.toml"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration by layering defaults, files and environment.
    ///
    /// An explicit `config_file` must exist; the default locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("failed to encode default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        builder = match config_file {
            Some(path) => builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(true),
            ),
            None => builder
                .add_source(
                    File::from(Self::config_path().as_path())
                        .format(FileFormat::Toml)
                        .required(false),
                )
                .add_source(
                    File::from(Path::new(LOCAL_CONFIG))
                        .format(FileFormat::Toml)
                        .required(false),
                ),
        };

        builder
            .add_source(
                Environment::with_prefix("HEXY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.hexy.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "hexy", "hexy")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }

    /// Registry policy derived from `container.allow_overwrite`.
    pub fn policy(&self) -> RegistrationPolicy {
        if self.container.allow_overwrite {
            RegistrationPolicy::Replace
        } else {
            RegistrationPolicy::Reject
        }
    }

    pub fn default_scope(&self) -> Scope {
        self.container.default_scope
    }
}
