//! A fake compile/link toolchain for end-to-end pipeline tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use ember_pipeline::{Invocation, ProcessInvoker, ToolError};
use ember_stale::derive_target;

/// Pretends to be the toolchain: a compile writes one object per source into
/// the working directory, a link writes the `/out` file. Every write gets a
/// strictly later timestamp from a private clock.
pub struct FakeToolchain {
    clock: Cell<SystemTime>,
    calls: RefCell<Vec<Invocation>>,
    object_extension: String,
    exit_code: Cell<i32>,
}

impl FakeToolchain {
    pub fn new(object_extension: &str) -> Self {
        Self {
            clock: Cell::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
            calls: RefCell::new(Vec::new()),
            object_extension: object_extension.to_string(),
            exit_code: Cell::new(0),
        }
    }

    /// Returns the current fake time and advances the clock by one second.
    pub fn now(&self) -> SystemTime {
        let t = self.clock.get();
        self.clock.set(t + Duration::from_secs(1));
        t
    }

    /// Creates `path` (and its parents) stamped with the next fake time.
    pub fn touch(&self, path: &Path) -> PathBuf {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let file = File::create(path).unwrap();
        file.set_modified(self.now()).unwrap();
        path.to_path_buf()
    }

    /// Makes every following invocation exit with `code` without writing.
    pub fn fail_with(&self, code: i32) {
        self.exit_code.set(code);
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl ProcessInvoker for FakeToolchain {
    fn run(&self, invocation: &Invocation) -> Result<i32, ToolError> {
        self.calls.borrow_mut().push(invocation.clone());
        let code = self.exit_code.get();
        if code != 0 {
            return Ok(code);
        }

        let args = &invocation.args;
        if let Some(pos) = args.iter().position(|a| a == "/out") {
            self.touch(Path::new(&args[pos + 1]));
        } else {
            let dir = invocation
                .working_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            for source in args.iter().skip(1).take_while(|a| !a.starts_with("-d")) {
                let target = derive_target(Path::new(source), &dir, &self.object_extension).unwrap();
                self.touch(&target);
            }
        }
        Ok(0)
    }
}

/// Command-line arguments as strings, for comparison against invocation args.
pub fn args<'a>(items: impl IntoIterator<Item = &'a Path>) -> Vec<String> {
    items
        .into_iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}
