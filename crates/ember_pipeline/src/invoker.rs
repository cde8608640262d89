//! External tool invocation.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use ember_config::Toolchain;
use tracing::{debug, info};

use crate::error::ToolError;

/// One call of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Host runtime the tool is launched through, if any.
    pub vm: Option<String>,
    /// The tool executable.
    pub tool: PathBuf,
    /// Arguments after the tool, in order.
    pub args: Vec<String>,
    /// Directory the tool runs in; the caller's directory when `None`.
    pub working_dir: Option<PathBuf>,
    /// File the tool's standard output is appended to.
    pub output: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation of `tool` through the toolchain's host runtime.
    pub fn new(toolchain: &Toolchain, tool: PathBuf) -> Self {
        Self {
            vm: toolchain.vm.clone(),
            tool,
            args: Vec::new(),
            working_dir: None,
            output: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends every path as an argument.
    ///
    /// Fails on the first path that is not valid UTF-8.
    pub fn path_args<'a, I>(mut self, paths: I) -> Result<Self, ToolError>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        for path in paths {
            let arg = path
                .to_str()
                .ok_or_else(|| ToolError::NonUtf8Path(path.to_path_buf()))?;
            self.args.push(arg.to_string());
        }
        Ok(self)
    }

    /// Sets the working directory.
    pub fn working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Sets the standard output redirect.
    pub fn output(mut self, file: Option<PathBuf>) -> Self {
        self.output = file;
        self
    }

    /// The program actually started: the host runtime if set, else the tool.
    pub fn program(&self) -> PathBuf {
        match &self.vm {
            Some(vm) => PathBuf::from(vm),
            None => self.tool.clone(),
        }
    }

    /// The full command line, program first, for display.
    pub fn command_line(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        if let Some(vm) = &self.vm {
            argv.push(vm.clone());
        }
        argv.push(self.tool.to_string_lossy().into_owned());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Runs external tools and reports their exit status.
pub trait ProcessInvoker {
    /// Runs `invocation` to completion and returns its exit code.
    ///
    /// A non-zero exit code is returned as `Ok`; deciding whether it is fatal
    /// is up to the caller.
    fn run(&self, invocation: &Invocation) -> Result<i32, ToolError>;
}

/// Runs tools as child processes of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInvoker;

impl ProcessInvoker for SystemInvoker {
    fn run(&self, invocation: &Invocation) -> Result<i32, ToolError> {
        let program = invocation.program();
        info!(command = %invocation.command_line().join(" "), "running");

        let mut cmd = Command::new(&program);
        if invocation.vm.is_some() {
            cmd.arg(&invocation.tool);
        }
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }
        if let Some(path) = &invocation.output {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ToolError::Prepare {
                    program: program.clone(),
                    path: path.clone(),
                    source,
                })?;
            cmd.stdout(Stdio::from(file));
        }

        let status = cmd.status().map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?;
        let code = status.code().unwrap_or(-1);
        debug!(program = %program.display(), code, "tool finished");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_without_vm() {
        let inv = Invocation::new(&Toolchain::default(), PathBuf::from("candle.exe"))
            .arg("/nologo")
            .path_args([Path::new("/src/a.wxs")])
            .unwrap();
        assert_eq!(inv.program(), PathBuf::from("candle.exe"));
        assert_eq!(inv.command_line(), vec!["candle.exe", "/nologo", "/src/a.wxs"]);
    }

    #[test]
    fn command_line_with_vm() {
        let toolchain = Toolchain {
            vm: Some("mono".to_string()),
            ..Toolchain::default()
        };
        let inv = Invocation::new(&toolchain, PathBuf::from("/wix/light.exe")).arg("/nologo");
        assert_eq!(inv.program(), PathBuf::from("mono"));
        assert_eq!(inv.command_line(), vec!["mono", "/wix/light.exe", "/nologo"]);
        assert_eq!(inv.args, vec!["/nologo"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_argument_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let bad = Path::new(OsStr::from_bytes(b"/src/caf\xe9.wxs"));
        let err = Invocation::new(&Toolchain::default(), PathBuf::from("candle.exe"))
            .path_args([Path::new("/src/a.wxs"), bad])
            .unwrap_err();
        assert!(matches!(err, ToolError::NonUtf8Path(p) if p == bad));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let inv = Invocation::new(
            &Toolchain::default(),
            PathBuf::from("ember-test-no-such-tool-4f1c"),
        );
        let err = SystemInvoker.run(&inv).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_is_reported() {
        let inv = Invocation::new(&Toolchain::default(), PathBuf::from("sh"))
            .arg("-c")
            .arg("exit 3");
        assert_eq!(SystemInvoker.run(&inv).unwrap(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn output_is_redirected_and_working_dir_applied() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("tools.log");
        let inv = Invocation::new(&Toolchain::default(), PathBuf::from("sh"))
            .arg("-c")
            .arg("pwd")
            .working_dir(Some(dir.path().to_path_buf()))
            .output(Some(log.clone()));
        assert_eq!(SystemInvoker.run(&inv).unwrap(), 0);
        let written = std::fs::read_to_string(&log).unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(
            PathBuf::from(written.trim()).canonicalize().unwrap(),
            expected
        );
    }
}
