//! Project discovery and run configuration shared by every command.

use std::path::{Path, PathBuf};

use anyhow::Context;
use ember_config::{find_project_root, load_config, resolve_pipeline, ConfigOverrides, PipelineConfig};
use tracing::debug;

use crate::{GlobalArgs, SelectArgs};

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from `cwd` looking for `ember.toml`.
pub fn resolve_project_root(global: &GlobalArgs, cwd: &Path) -> anyhow::Result<PathBuf> {
    match &global.config {
        Some(path) => {
            let path = cwd.join(path);
            if path.is_file() {
                Ok(path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cwd.to_path_buf()))
            } else {
                Ok(path)
            }
        }
        None => Ok(find_project_root(cwd)?),
    }
}

/// The inputs of one command: where it runs and what it runs.
pub struct Project {
    /// Directory the command was started from.
    pub cwd: PathBuf,
    /// Fully resolved pipeline configuration.
    pub config: PipelineConfig,
}

/// Loads `ember.toml` and applies the command-line overrides.
pub fn load(
    global: &GlobalArgs,
    select: &SelectArgs,
    keep_going: bool,
    log_output: Option<PathBuf>,
) -> anyhow::Result<Project> {
    let cwd = std::env::current_dir().context("failed to read the current directory")?;
    load_from(global, &cwd, select, keep_going, log_output)
}

/// Like [`load`], with an explicit starting directory.
pub fn load_from(
    global: &GlobalArgs,
    cwd: &Path,
    select: &SelectArgs,
    keep_going: bool,
    log_output: Option<PathBuf>,
) -> anyhow::Result<Project> {
    let root = resolve_project_root(global, cwd)?;
    let file = load_config(&root)
        .with_context(|| format!("failed to load configuration from {}", root.display()))?;
    debug!(project = %file.project.name, root = %root.display(), "loaded configuration");

    let overrides = ConfigOverrides {
        mode: select.mode,
        target: select.target.clone(),
        intermediate_dir: select.intermediate_dir.clone(),
        parameters: select.defines.clone(),
        keep_going,
        output_log: log_output,
    };
    let config = resolve_pipeline(&file, &root, cwd, &overrides)?;

    Ok(Project {
        cwd: cwd.to_path_buf(),
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::{Mode, Parameter};

    fn global(config: Option<PathBuf>) -> GlobalArgs {
        GlobalArgs {
            quiet: false,
            verbose: false,
            config,
        }
    }

    fn write_project(dir: &Path) {
        std::fs::write(
            dir.join("ember.toml"),
            r#"
[project]
name = "installer"

[build]
target = "setup.msi"
intermediate_dir = "obj"

[[build.sources]]
dir = "src"
include = "*.wxs"

[build.parameters]
Version = "1.0"
"#,
        )
        .unwrap();
    }

    #[test]
    fn finds_project_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        let sub = dir.path().join("src");
        std::fs::create_dir_all(&sub).unwrap();

        let project = load_from(&global(None), &sub, &SelectArgs::default(), false, None).unwrap();

        assert_eq!(project.config.project_root, dir.path());
        assert_eq!(project.config.target, Some(dir.path().join("setup.msi")));
        assert_eq!(project.cwd, sub);
        assert!(project.config.fail_on_error);
    }

    #[test]
    fn explicit_config_file_selects_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        let elsewhere = tempfile::tempdir().unwrap();

        let root = resolve_project_root(
            &global(Some(dir.path().join("ember.toml"))),
            elsewhere.path(),
        )
        .unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path());
        let select = SelectArgs {
            mode: Some(Mode::LinkOnly),
            target: Some(PathBuf::from("other.msi")),
            intermediate_dir: None,
            defines: vec![Parameter::new("Version", "2.0")],
        };

        let project = load_from(
            &global(None),
            dir.path(),
            &select,
            true,
            Some(PathBuf::from("tools.log")),
        )
        .unwrap();

        let config = project.config;
        assert_eq!(config.mode, Mode::LinkOnly);
        assert_eq!(config.target, Some(dir.path().join("other.msi")));
        assert_eq!(config.parameters, vec![Parameter::new("Version", "2.0")]);
        assert!(!config.fail_on_error);
        assert_eq!(config.output_log, Some(dir.path().join("tools.log")));
    }

    #[test]
    fn missing_project_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from(&global(None), dir.path(), &SelectArgs::default(), false, None).is_err());
    }
}
