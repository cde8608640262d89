//! Resolution of a parsed `ember.toml` plus command-line overrides into the
//! immutable configuration of one pipeline run.

use std::path::{Path, PathBuf};

use ember_common::{normalize, DescriptorList, Mode, Parameter, SourceDescriptor};

use crate::error::ConfigError;
use crate::types::{
    default_compiler, default_linker, default_object_extension, FileSetConfig, ProjectConfig,
};

/// The compile and link tools of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Installation directory; executables are joined onto it when set.
    pub home: Option<PathBuf>,
    /// Compile tool executable name.
    pub compiler: String,
    /// Link tool executable name.
    pub linker: String,
    /// Extension of intermediate objects, without the leading dot.
    pub object_extension: String,
    /// Host runtime the tools are launched through.
    pub vm: Option<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            home: None,
            compiler: default_compiler(),
            linker: default_linker(),
            object_extension: default_object_extension(),
            vm: None,
        }
    }
}

impl Toolchain {
    /// Returns the program used to run the compiler.
    pub fn compiler_path(&self) -> PathBuf {
        self.executable(&self.compiler)
    }

    /// Returns the program used to run the linker.
    pub fn linker_path(&self) -> PathBuf {
        self.executable(&self.linker)
    }

    /// Joins `name` onto the toolchain home if one is configured, otherwise
    /// leaves it for the OS to find on `PATH`.
    fn executable(&self, name: &str) -> PathBuf {
        match &self.home {
            Some(home) => home.join(name),
            None => PathBuf::from(name),
        }
    }
}

/// Everything one pipeline run needs, fixed before the run starts.
///
/// Paths may be relative when the value is built by hand; the pipeline runs on
/// the [`anchored`](Self::anchored) copy, where every path is absolute. Presence of sources and a target is validated by
/// the pipeline before resolution begins.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory relative descriptor paths were resolved against.
    pub project_root: PathBuf,
    /// Single explicit primary source, which must exist.
    pub source: Option<PathBuf>,
    /// Primary source descriptors.
    pub sources: DescriptorList,
    /// Auxiliary descriptors used only for staleness.
    pub more_sources: DescriptorList,
    /// Directory receiving intermediate objects.
    pub intermediate_dir: Option<PathBuf>,
    /// Final artifact of the link stage.
    pub target: Option<PathBuf>,
    /// Which stages run.
    pub mode: Mode,
    /// Compiler definitions in insertion order.
    pub parameters: Vec<Parameter>,
    /// Compile and link tools.
    pub toolchain: Toolchain,
    /// Whether a non-zero tool exit aborts the run.
    pub fail_on_error: bool,
    /// File receiving the tools' standard output.
    pub output_log: Option<PathBuf>,
}

impl PipelineConfig {
    /// Creates an empty configuration rooted at `project_root` with default
    /// toolchain and mode.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            source: None,
            sources: DescriptorList::new(),
            more_sources: DescriptorList::new(),
            intermediate_dir: None,
            target: None,
            mode: Mode::default(),
            parameters: Vec::new(),
            toolchain: Toolchain::default(),
            fail_on_error: true,
            output_log: None,
        }
    }

    /// Returns `true` if any primary source has been configured.
    pub fn has_sources(&self) -> bool {
        self.source.is_some() || !self.sources.is_empty()
    }

    /// Returns a copy in which every path is absolute and normalized.
    ///
    /// A relative `project_root` is taken relative to the current directory.
    /// Every other relative path, descriptors and toolchain home included, is
    /// joined onto the project root.
    pub fn anchored(&self) -> Result<PipelineConfig, ConfigError> {
        let root = std::path::absolute(&self.project_root)
            .map(|p| normalize(&p))
            .map_err(|source| ConfigError::Absolute {
                path: self.project_root.clone(),
                source,
            })?;
        let anchor = |path: &PathBuf| normalize(&root.join(path));
        let rooted = |list: &DescriptorList| -> DescriptorList {
            list.iter().map(|d| d.rooted_at(&root)).collect()
        };

        Ok(PipelineConfig {
            source: self.source.as_ref().map(&anchor),
            sources: rooted(&self.sources),
            more_sources: rooted(&self.more_sources),
            intermediate_dir: self.intermediate_dir.as_ref().map(&anchor),
            target: self.target.as_ref().map(&anchor),
            mode: self.mode,
            parameters: self.parameters.clone(),
            toolchain: Toolchain {
                home: self.toolchain.home.as_ref().map(&anchor),
                ..self.toolchain.clone()
            },
            fail_on_error: self.fail_on_error,
            output_log: self.output_log.as_ref().map(&anchor),
            project_root: root.clone(),
        })
    }
}

/// Values given on the command line that take precedence over `ember.toml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Mode override.
    pub mode: Option<Mode>,
    /// Final artifact override.
    pub target: Option<PathBuf>,
    /// Intermediate directory override.
    pub intermediate_dir: Option<PathBuf>,
    /// Extra parameters, appended after (or replacing same-named) file parameters.
    pub parameters: Vec<Parameter>,
    /// Continue after a tool exits non-zero.
    pub keep_going: bool,
    /// Redirect tool output to this file.
    pub output_log: Option<PathBuf>,
}

/// Resolves a parsed configuration and overrides into a [`PipelineConfig`].
///
/// Relative paths in the file are joined onto `project_root`; relative paths
/// given as overrides are joined onto `cwd`.
pub fn resolve_pipeline(
    config: &ProjectConfig,
    project_root: &Path,
    cwd: &Path,
    overrides: &ConfigOverrides,
) -> Result<PipelineConfig, ConfigError> {
    let build = &config.build;

    let mut parameters = Vec::with_capacity(build.parameters.len());
    for (name, value) in &build.parameters {
        let value = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "parameter '{name}' must be a string, number, or boolean"
                )))
            }
        };
        parameters.push(Parameter::new(name.clone(), value));
    }
    for p in &overrides.parameters {
        match parameters.iter_mut().find(|existing| existing.name == p.name) {
            Some(existing) => existing.value = p.value.clone(),
            None => parameters.push(p.clone()),
        }
    }

    let tc = &config.toolchain;
    let toolchain = Toolchain {
        home: tc.home.as_ref().map(|h| project_root.join(h)),
        compiler: tc.compiler.clone(),
        linker: tc.linker.clone(),
        object_extension: tc.object_extension.clone(),
        vm: tc.vm.clone(),
    };

    Ok(PipelineConfig {
        project_root: project_root.to_path_buf(),
        source: build.source.as_ref().map(|s| project_root.join(s)),
        sources: file_sets(&build.sources, project_root),
        more_sources: file_sets(&build.more_sources, project_root),
        intermediate_dir: overrides
            .intermediate_dir
            .as_ref()
            .map(|d| cwd.join(d))
            .or_else(|| build.intermediate_dir.as_ref().map(|d| project_root.join(d))),
        target: overrides
            .target
            .as_ref()
            .map(|t| cwd.join(t))
            .or_else(|| build.target.as_ref().map(|t| project_root.join(t))),
        mode: overrides.mode.unwrap_or(build.mode),
        parameters,
        toolchain,
        fail_on_error: build.fail_on_error && !overrides.keep_going,
        output_log: overrides.output_log.as_ref().map(|p| cwd.join(p)),
    })
}

fn file_sets(sets: &[FileSetConfig], root: &Path) -> DescriptorList {
    sets.iter()
        .map(|fs| {
            SourceDescriptor::FileSet {
                dir: PathBuf::from(&fs.dir),
                include: fs.include.clone(),
                exclude: fs.exclude.clone(),
            }
            .rooted_at(root)
        })
        .collect()
}
