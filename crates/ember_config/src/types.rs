//! Configuration types deserialized from `ember.toml`.

use ember_common::Mode;
use serde::Deserialize;

/// The top-level project configuration parsed from `ember.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Toolchain executables and naming conventions.
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    /// Sources, targets, and pipeline behavior.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Core project metadata required in every `ember.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Where the compile and link tools live and how their files are named.
#[derive(Debug, Deserialize)]
pub struct ToolchainConfig {
    /// Installation directory of the toolchain. When omitted, executables are
    /// looked up on `PATH`.
    pub home: Option<String>,
    /// Compile tool executable name.
    #[serde(default = "default_compiler")]
    pub compiler: String,
    /// Link tool executable name.
    #[serde(default = "default_linker")]
    pub linker: String,
    /// Extension given to intermediate objects, without the leading dot.
    #[serde(default = "default_object_extension")]
    pub object_extension: String,
    /// Host runtime used to launch the tools (e.g. `mono`).
    pub vm: Option<String>,
}

impl Default for ToolchainConfig {
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

/// Default compile tool.
pub fn default_compiler() -> String {
    "candle.exe".to_string()
}

/// Default link tool.
pub fn default_linker() -> String {
    "light.exe".to_string()
}

/// Default intermediate object extension.
pub fn default_object_extension() -> String {
    "wixobj".to_string()
}

/// Sources, targets, and behavior of the build pipeline.
#[derive(Debug, Deserialize)]
pub struct BuildConfig {
    /// Which stages run.
    #[serde(default)]
    pub mode: Mode,
    /// A single primary source file passed to the compiler.
    pub source: Option<String>,
    /// Primary source file sets.
    #[serde(default)]
    pub sources: Vec<FileSetConfig>,
    /// Auxiliary file sets that only participate in staleness checks.
    #[serde(default)]
    pub more_sources: Vec<FileSetConfig>,
    /// Directory receiving intermediate objects.
    pub intermediate_dir: Option<String>,
    /// The final artifact produced by the linker.
    pub target: Option<String>,
    /// Whether a non-zero tool exit aborts the pipeline.
    #[serde(default = "default_fail_on_error")]
    pub fail_on_error: bool,
    /// Definitions forwarded to the compiler, in file order.
    #[serde(default)]
    pub parameters: toml::Table,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            source: None,
            sources: Vec::new(),
            more_sources: Vec::new(),
            intermediate_dir: None,
            target: None,
            fail_on_error: default_fail_on_error(),
            parameters: toml::Table::new(),
        }
    }
}

fn default_fail_on_error() -> bool {
    true
}

/// A directory plus include/exclude glob patterns.
#[derive(Debug, Clone, Deserialize)]
pub struct FileSetConfig {
    /// Base directory, relative to the project root unless absolute.
    pub dir: String,
    /// Pattern selecting files below `dir`.
    #[serde(default = "default_include")]
    pub include: String,
    /// Patterns removing files from the include match.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_include() -> String {
    "**/*".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn mode_all_variants() {
        for (input, expected) in [
            ("compile", Mode::CompileOnly),
            ("link", Mode::LinkOnly),
            ("both", Mode::Both),
        ] {
            let toml = format!(
                r#"
[project]
name = "test"

[build]
mode = "{input}"
"#
            );
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.build.mode, expected);
        }
    }

    #[test]
    fn toolchain_defaults() {
        let toml = r#"
[project]
name = "test"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.toolchain.compiler, "candle.exe");
        assert_eq!(config.toolchain.linker, "light.exe");
        assert_eq!(config.toolchain.object_extension, "wixobj");
        assert!(config.toolchain.home.is_none());
        assert!(config.toolchain.vm.is_none());
    }

    #[test]
    fn file_set_include_defaults_to_everything() {
        let toml = r#"
[project]
name = "test"

[[build.more_sources]]
dir = "media"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.build.more_sources[0].include, "**/*");
        assert!(config.build.more_sources[0].exclude.is_empty());
    }

    #[test]
    fn parameters_keep_file_order() {
        let toml = r#"
[project]
name = "test"

[build.parameters]
Zeta = "1"
Alpha = "2"
Mid = "3"
"#;
        let config = load_config_from_str(toml).unwrap();
        let keys: Vec<_> = config.build.parameters.keys().cloned().collect();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn unknown_mode_is_parse_error() {
        let toml = r#"
[project]
name = "test"

[build]
mode = "candle"
"#;
        assert!(load_config_from_str(toml).is_err());
    }
}
