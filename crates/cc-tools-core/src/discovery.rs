//! Command discovery: choosing the lint or test invocation for a project.
//!
//! Root resolution itself (recognizing a directory as a project root) is
//! named in the spec as an external collaborator (`shared.FindProjectRoot`)
//! -- this module consumes a [`RootFinder`] trait rather than reimplementing
//! that policy, and ships one reasonable default implementation so the
//! crate is runnable standalone. Command *selection* -- given a root,
//! deciding which lint/test command applies -- is squarely this module's
//! job: a table-driven resolver, pure with respect to its inputs and a
//! single filesystem snapshot.

use std::path::{Path, PathBuf};

use crate::error::DiscoveryError;

/// Which family of command is being discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Lint/static-analysis command.
    Lint,
    /// Test-suite command.
    Test,
}

impl Kind {
    /// The lowercase name used in lock keys, log fields, and JSON-RPC method names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Lint => "lint",
            Kind::Test => "test",
        }
    }

    /// The default deadline for this kind, per spec.md §4.2.1.
    #[must_use]
    pub fn default_timeout(self) -> std::time::Duration {
        match self {
            Kind::Lint => std::time::Duration::from_secs(30),
            Kind::Test => std::time::Duration::from_secs(60),
        }
    }
}

/// A concrete, ready-to-run command: working directory, executable, and
/// argument list. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredCommand {
    /// Absolute working directory to run the command in.
    pub dir: PathBuf,
    /// Executable name or path.
    pub program: String,
    /// Ordered argument list.
    pub args: Vec<String>,
}

impl DiscoveredCommand {
    /// Render as a shell-ish string for error/status messages, e.g.
    /// `golangci-lint run`.
    #[must_use]
    pub fn display_command(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Finds the project root for a file's directory. External collaborator
/// per spec.md §6 (`shared.FindProjectRoot`); the core consumes this
/// interface but does not own the recognition policy.
pub trait RootFinder: Send + Sync {
    /// Walk from `file_dir` toward the filesystem root and return the
    /// nearest recognized project root, or `file_dir` itself if none is
    /// found.
    fn find_project_root(&self, file_dir: &Path) -> PathBuf;
}

/// A reasonable standalone default: walks upward looking for a `.git`
/// directory or a well-known language manifest.
#[derive(Debug, Default)]
pub struct DefaultRootFinder;

const ROOT_MARKERS: &[&str] = &[
    ".git",
    "Cargo.toml",
    "go.mod",
    "package.json",
    "pyproject.toml",
    "setup.py",
];

impl RootFinder for DefaultRootFinder {
    fn find_project_root(&self, file_dir: &Path) -> PathBuf {
        let mut dir = file_dir;
        loop {
            if ROOT_MARKERS.iter().any(|m| dir.join(m).exists()) {
                return dir.to_path_buf();
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return file_dir.to_path_buf(),
            }
        }
    }
}

/// Checks whether an executable is on the search path. Injected so the
/// resolver stays pure and testable without touching the real `$PATH`.
pub trait LookPath: Send + Sync {
    /// True if `program` resolves to an executable on the search path.
    fn exists(&self, program: &str) -> bool;
}

/// The real `LookPath`, backed by the `which` crate.
#[derive(Debug, Default)]
pub struct WhichLookPath;

impl LookPath for WhichLookPath {
    fn exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// One table-driven rule: if `detect` matches the project root, and the
/// rule's executable is on the search path, the rule wins.
struct Rule {
    /// Name used only for diagnostics.
    name: &'static str,
    /// Returns true if this rule's marker file is present at `root`.
    detect: fn(&Path) -> bool,
    /// Executable required to be on `$PATH` for this rule to match.
    program: &'static str,
    /// Builds the command, given the matched root and requested kind.
    build: fn(root: &Path, kind: Kind) -> DiscoveredCommand,
}

fn rules() -> &'static [Rule] {
    &[
        Rule {
            name: "go",
            detect: |root| root.join("go.mod").exists(),
            program: "go",
            build: |root, kind| match kind {
                Kind::Lint => DiscoveredCommand {
                    dir: root.to_path_buf(),
                    program: "golangci-lint".into(),
                    args: vec!["run".into()],
                },
                Kind::Test => DiscoveredCommand {
                    dir: root.to_path_buf(),
                    program: "go".into(),
                    args: vec!["test".into(), "./...".into()],
                },
            },
        },
        Rule {
            name: "rust",
            detect: |root| root.join("Cargo.toml").exists(),
            program: "cargo",
            build: |root, kind| match kind {
                Kind::Lint => DiscoveredCommand {
                    dir: root.to_path_buf(),
                    program: "cargo".into(),
                    args: vec!["clippy".into(), "--all-targets".into()],
                },
                Kind::Test => DiscoveredCommand {
                    dir: root.to_path_buf(),
                    program: "cargo".into(),
                    args: vec!["test".into()],
                },
            },
        },
        Rule {
            name: "node",
            detect: |root| root.join("package.json").exists(),
            program: "npx",
            build: |root, kind| match kind {
                Kind::Lint => DiscoveredCommand {
                    dir: root.to_path_buf(),
                    program: "npx".into(),
                    args: vec!["eslint".into(), ".".into()],
                },
                Kind::Test => DiscoveredCommand {
                    dir: root.to_path_buf(),
                    program: "npm".into(),
                    args: vec!["test".into(), "--silent".into()],
                },
            },
        },
        Rule {
            name: "python",
            detect: |root| {
                root.join("pyproject.toml").exists() || root.join("setup.py").exists()
            },
            program: "ruff",
            build: |root, kind| match kind {
                Kind::Lint => DiscoveredCommand {
                    dir: root.to_path_buf(),
                    program: "ruff".into(),
                    args: vec!["check".into(), ".".into()],
                },
                Kind::Test => DiscoveredCommand {
                    dir: root.to_path_buf(),
                    program: "pytest".into(),
                    args: vec![],
                },
            },
        },
    ]
}

/// Table-driven resolver: picks the first matching rule whose required
/// executable is on the search path.
pub struct Resolver<'a> {
    look_path: &'a dyn LookPath,
}

impl<'a> Resolver<'a> {
    /// Build a resolver over the given `LookPath`.
    #[must_use]
    pub fn new(look_path: &'a dyn LookPath) -> Self {
        Self { look_path }
    }

    /// Discover a command of `kind` for the project rooted at `root`.
    /// Returns `None` ("no command found") when no rule matches  --
    /// absence is not an error.
    #[must_use]
    pub fn discover(&self, root: &Path, kind: Kind) -> Option<DiscoveredCommand> {
        for rule in rules() {
            if (rule.detect)(root) && self.look_path.exists(rule.program) {
                tracing::debug!(rule = rule.name, kind = kind.as_str(), "matched discovery rule");
                return Some((rule.build)(root, kind));
            }
        }
        None
    }
}

/// Resolve the project root and check it is readable. The only place this
/// module can fail: an unreadable directory, surfaced as
/// [`DiscoveryError::Io`].
pub fn ensure_readable(dir: &Path) -> Result<(), DiscoveryError> {
    std::fs::read_dir(dir).map(|_| ()).map_err(|source| DiscoveryError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct AlwaysFound;
    impl LookPath for AlwaysFound {
        fn exists(&self, _program: &str) -> bool {
            true
        }
    }

    struct NeverFound;
    impl LookPath for NeverFound {
        fn exists(&self, _program: &str) -> bool {
            false
        }
    }

    #[test]
    fn go_project_selects_golangci_lint_and_go_test() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), "module x\n").unwrap();

        let look_path = AlwaysFound;
        let resolver = Resolver::new(&look_path);

        let lint = resolver.discover(dir.path(), Kind::Lint).unwrap();
        assert_eq!(lint.display_command(), "golangci-lint run");

        let test = resolver.discover(dir.path(), Kind::Test).unwrap();
        assert_eq!(test.display_command(), "go test ./...");
    }

    #[test]
    fn missing_executable_makes_rule_not_match() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), "module x\n").unwrap();

        let look_path = NeverFound;
        let resolver = Resolver::new(&look_path);

        assert!(resolver.discover(dir.path(), Kind::Lint).is_none());
    }

    #[test]
    fn no_marker_files_yields_none() {
        let dir = TempDir::new().unwrap();
        let look_path = AlwaysFound;
        let resolver = Resolver::new(&look_path);
        assert!(resolver.discover(dir.path(), Kind::Lint).is_none());
    }

    #[test]
    fn earlier_rule_wins_on_tie() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), "module x\n").unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[package]\n").unwrap();

        let look_path = AlwaysFound;
        let resolver = Resolver::new(&look_path);

        // `go` rule is listed before `rust`, so it wins the tie.
        let lint = resolver.discover(dir.path(), Kind::Lint).unwrap();
        assert_eq!(lint.program, "golangci-lint");
    }

    #[test]
    fn default_root_finder_walks_up_to_git_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("src").join("nested");
        fs::create_dir_all(&nested).unwrap();

        let finder = DefaultRootFinder;
        assert_eq!(finder.find_project_root(&nested), dir.path());
    }

    #[test]
    fn default_root_finder_falls_back_to_file_dir_when_no_ancestor_matches() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let finder = DefaultRootFinder;
        assert_eq!(finder.find_project_root(&nested), nested);
    }
}
