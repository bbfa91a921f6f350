//! `hexy init` - write a default configuration file.

use std::path::PathBuf;

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::{AppConfig, LOCAL_CONFIG},
    error::{CliResult, IntoCli},
    output::OutputManager,
};

/// Create a default Hexy configuration file.
///
/// The target is `--config` if given, `./.hexy.toml` with `--local`, and the
/// platform config path otherwise.
pub fn execute(args: InitArgs, global: GlobalArgs, output: OutputManager) -> CliResult<()> {
    let config_path = target_path(&args, &global);
    output.info(&format!("Initialising configuration at {}", config_path.display()))?;

    if config_path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
        return Ok(());
    }

    let toml = toml::to_string_pretty(&AppConfig::default())
        .with_cli_context(|| "Failed to serialise default config")?;

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }

    std::fs::write(&config_path, &toml)
        .with_cli_context(|| format!("Failed to write config to '{}'", config_path.display()))?;

    output.success(&format!(
        "Configuration created at {}",
        config_path.display(),
    ))?;

    Ok(())
}

fn target_path(args: &InitArgs, global: &GlobalArgs) -> PathBuf {
    match (&global.config, args.local) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from(LOCAL_CONFIG),
        (None, false) => AppConfig::config_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn global(config: Option<PathBuf>) -> GlobalArgs {
        GlobalArgs {
            verbose: 0,
            quiet: true,
            no_color: true,
            config,
            output_format: OutputFormat::Plain,
        }
    }

    #[test]
    fn explicit_config_wins() {
        let args = InitArgs {
            local: true,
            force: false,
        };
        let path = target_path(&args, &global(Some(PathBuf::from("custom.toml"))));
        assert_eq!(path, PathBuf::from("custom.toml"));
    }

    #[test]
    fn local_flag_targets_current_directory() {
        let args = InitArgs {
            local: true,
            force: false,
        };
        assert_eq!(target_path(&args, &global(None)), PathBuf::from(LOCAL_CONFIG));
    }

    #[test]
    fn writes_defaults_and_respects_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let g = global(Some(path.clone()));
        let output = OutputManager::new(&g, &AppConfig::default());

        execute(InitArgs { local: false, force: false }, g.clone(), output).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("default_scope = \"singleton\""));

        std::fs::write(&path, "# edited\n").unwrap();
        let output = OutputManager::new(&g, &AppConfig::default());
        execute(InitArgs { local: false, force: false }, g, output).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited\n");
    }
}
