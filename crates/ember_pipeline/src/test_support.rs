//! Helpers shared by the unit tests of this crate.

use std::cell::RefCell;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::ToolError;
use crate::invoker::{Invocation, ProcessInvoker};

/// Creates (or truncates) `path` with a modification time `secs` after a fixed epoch.
pub fn touch(path: &Path, secs: u64) -> PathBuf {
    let file = File::create(path).unwrap();
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    file.set_modified(base + Duration::from_secs(secs)).unwrap();
    path.to_path_buf()
}

/// Records invocations without running anything.
pub struct Recorder {
    calls: RefCell<Vec<Invocation>>,
    exit_code: i32,
}

impl Recorder {
    pub fn new() -> Self {
        Self::exiting_with(0)
    }

    pub fn exiting_with(exit_code: i32) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            exit_code,
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl ProcessInvoker for Recorder {
    fn run(&self, invocation: &Invocation) -> Result<i32, ToolError> {
        self.calls.borrow_mut().push(invocation.clone());
        Ok(self.exit_code)
    }
}
