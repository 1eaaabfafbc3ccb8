//! The capabilities record: an injectable bundle of small interfaces over
//! the clock, the filesystem, and process liveness checks.
//!
//! The executor, both lock managers, and discovery all need these
//! affordances. Routing them through one struct instead of calling
//! `std::fs`/`std::time` directly keeps the core deterministic under test
//! and avoids ad-hoc global state, mirroring the way the teacher crate
//! threads a single `Engine` through its daemon and CLI rather than
//! reaching for statics.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of the current time, substitutable in tests.
pub trait Clock: Send + Sync {
    /// Unix-seconds timestamp of "now".
    fn now_unix(&self) -> u64;
}

/// The real clock, backed by `SystemTime::now`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}

/// PID liveness probing, substitutable in tests.
pub trait ProcessManager: Send + Sync {
    /// Returns true if a process with the given PID currently exists.
    fn is_alive(&self, pid: u32) -> bool;
}

/// The real process manager, backed by a zero-signal `kill` probe.
#[derive(Debug, Default)]
pub struct SystemProcessManager;

impl ProcessManager for SystemProcessManager {
    #[cfg(unix)]
    #[allow(unsafe_code)]
    fn is_alive(&self, pid: u32) -> bool {
        // SAFETY: signal 0 sends no signal; it only probes for the
        // existence of (and our permission to signal) the target process.
        let ret = unsafe { libc::kill(pid as libc::pid_t, 0) };
        ret == 0
    }

    #[cfg(not(unix))]
    fn is_alive(&self, _pid: u32) -> bool {
        false
    }
}

/// Filesystem affordances needed by the lock managers and discovery.
///
/// Kept narrow on purpose: just enough to read/write small text files with
/// specific permissions and to resolve the system temp directory.
pub trait FileSystem: Send + Sync {
    /// Read a file's full contents as a string, or `None` if it doesn't exist.
    fn read_to_string(&self, path: &Path) -> std::io::Result<Option<String>>;

    /// Write `contents` to `path`, creating or truncating it, with the given
    /// Unix permission bits (ignored on non-Unix targets).
    fn write(&self, path: &Path, contents: &str, mode: u32) -> std::io::Result<()>;

    /// The directory to place lock files and the socket directory in.
    fn temp_dir(&self) -> PathBuf;
}

/// The real filesystem, backed by `std::fs`.
#[derive(Debug, Default)]
pub struct SystemFileSystem;

impl FileSystem for SystemFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, contents: &str, mode: u32) -> std::io::Result<()> {
        std::fs::write(path, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
        }
        #[cfg(not(unix))]
        {
            let _ = mode;
        }
        Ok(())
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }
}

/// The raw outcome of one subprocess invocation, before the executor
/// classifies it into an `ExecutorResult`. Kept deliberately low-level (no
/// knowledge of the hook exit-code vocabulary) so [`CommandRunner`] is a
/// thin, swappable seam over process spawning.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The exit code, if the process ran to completion.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
    /// True if the deadline elapsed before the process finished.
    pub timed_out: bool,
    /// Set when the process could not be spawned at all.
    pub spawn_error: Option<String>,
}

/// Runs a command under a deadline, substitutable in tests. The thin seam
/// over process spawning the executor calls through, so executor
/// classification logic can be exercised without shelling out.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program args` in `dir`, killing it if `deadline` elapses.
    async fn run(&self, program: &str, args: &[String], dir: &Path, deadline: Duration) -> RunOutcome;
}

/// The real command runner, backed by `tokio::process::Command`.
#[derive(Debug, Default)]
pub struct SystemCommandRunner;

#[async_trait::async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String], dir: &Path, deadline: Duration) -> RunOutcome {
        let mut command = tokio::process::Command::new(program);
        command.args(args).current_dir(dir).kill_on_drop(true);

        match tokio::time::timeout(deadline, command.output()).await {
            Ok(Ok(output)) => RunOutcome {
                exit_code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
                timed_out: false,
                spawn_error: None,
            },
            Ok(Err(source)) => RunOutcome {
                exit_code: None,
                stdout: Vec::new(),
                stderr: Vec::new(),
                timed_out: false,
                spawn_error: Some(source.to_string()),
            },
            Err(_elapsed) => RunOutcome {
                exit_code: None,
                stdout: Vec::new(),
                stderr: Vec::new(),
                timed_out: true,
                spawn_error: None,
            },
        }
    }
}

/// Bundle of injectable collaborators passed into every subsystem that
/// touches process, filesystem, or clock state.
#[derive(Clone)]
pub struct Capabilities {
    /// Clock used for cooldown and statistics timestamps.
    pub clock: Arc<dyn Clock>,
    /// PID liveness probe used by the file-system lock manager.
    pub process: Arc<dyn ProcessManager>,
    /// Filesystem used by the file-system lock manager and socket setup.
    pub fs: Arc<dyn FileSystem>,
    /// Subprocess runner used by the command executor.
    pub runner: Arc<dyn CommandRunner>,
}

impl Capabilities {
    /// Build the production capabilities record.
    #[must_use]
    pub fn production() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            process: Arc::new(SystemProcessManager),
            fs: Arc::new(SystemFileSystem),
            runner: Arc::new(SystemCommandRunner),
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::production()
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Clock, CommandRunner, FileSystem, ProcessManager, RunOutcome};
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use super::Capabilities;

    /// A clock whose `now_unix()` is set explicitly by the test.
    #[derive(Debug, Default)]
    pub struct FakeClock(Mutex<u64>);

    impl FakeClock {
        pub fn new(now: u64) -> Self {
            Self(Mutex::new(now))
        }

        pub fn set(&self, now: u64) {
            *self.0.lock() = now;
        }
    }

    impl Clock for FakeClock {
        fn now_unix(&self) -> u64 {
            *self.0.lock()
        }
    }

    /// A process manager whose liveness answers are set explicitly by the test.
    #[derive(Debug, Default)]
    pub struct FakeProcessManager(Mutex<HashSet<u32>>);

    impl FakeProcessManager {
        pub fn new(alive: impl IntoIterator<Item = u32>) -> Self {
            Self(Mutex::new(alive.into_iter().collect()))
        }
    }

    impl ProcessManager for FakeProcessManager {
        fn is_alive(&self, pid: u32) -> bool {
            self.0.lock().contains(&pid)
        }
    }

    /// An in-memory filesystem for deterministic lock-file tests.
    #[derive(Debug, Default)]
    pub struct FakeFileSystem {
        files: Mutex<HashMap<PathBuf, String>>,
        temp_dir: PathBuf,
    }

    impl FakeFileSystem {
        pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
            Self {
                files: Mutex::new(HashMap::new()),
                temp_dir: temp_dir.into(),
            }
        }
    }

    impl FileSystem for FakeFileSystem {
        fn read_to_string(&self, path: &Path) -> std::io::Result<Option<String>> {
            Ok(self.files.lock().get(path).cloned())
        }

        fn write(&self, path: &Path, contents: &str, _mode: u32) -> std::io::Result<()> {
            self.files
                .lock()
                .insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }

        fn temp_dir(&self) -> PathBuf {
            self.temp_dir.clone()
        }
    }

    /// A command runner whose outcomes are scripted per-program ahead of
    /// time, so executor/validator tests can assert on classification
    /// logic without shelling out to a real lint/test command.
    #[derive(Debug, Default)]
    pub struct FakeCommandRunner {
        scripted: Mutex<HashMap<String, RunOutcome>>,
    }

    impl FakeCommandRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Script the outcome returned whenever `program` is run, regardless
        /// of arguments or working directory.
        pub fn script(&self, program: &str, outcome: RunOutcome) {
            self.scripted.lock().insert(program.to_string(), outcome);
        }
    }

    #[async_trait::async_trait]
    impl CommandRunner for FakeCommandRunner {
        async fn run(&self, program: &str, _args: &[String], _dir: &Path, _deadline: Duration) -> RunOutcome {
            self.scripted.lock().get(program).cloned().unwrap_or(RunOutcome {
                exit_code: None,
                stdout: Vec::new(),
                stderr: Vec::new(),
                timed_out: false,
                spawn_error: Some(format!("no scripted outcome for {program}")),
            })
        }
    }

    pub fn fake_capabilities(now: u64, alive_pids: impl IntoIterator<Item = u32>) -> Capabilities {
        Capabilities {
            clock: Arc::new(FakeClock::new(now)),
            process: Arc::new(FakeProcessManager::new(alive_pids)),
            fs: Arc::new(FakeFileSystem::new(std::env::temp_dir())),
            runner: Arc::new(FakeCommandRunner::new()),
        }
    }
}
