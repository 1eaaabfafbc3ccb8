//! The skip predicate: should this edited file be excluded from lint/test
//! hooks entirely?
//!
//! Named-only external collaborator (`shared.ShouldSkipFile`) -- the
//! orchestrator consumes this interface but does not own vendored-path or
//! file-type policy. [`DefaultSkipPredicate`] is a reasonable standalone
//! implementation so the binary is runnable without a separate skip
//! registry service.

use std::path::Path;

/// Decides whether an edited file should be skipped entirely.
pub trait SkipPredicate: Send + Sync {
    /// True if hooks should take no action for this path.
    fn should_skip(&self, path: &Path) -> bool;
}

const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "target",
    "dist",
    "build",
    ".venv",
];

const SKIP_SUFFIXES: &[&str] = &[
    ".lock", ".min.js", ".min.css", ".map", ".png", ".jpg", ".jpeg", ".gif",
    ".svg", ".ico", ".pdf", ".zip", ".tar", ".gz",
];

/// Skips vendored directories and generated/binary file types.
#[derive(Debug, Default)]
pub struct DefaultSkipPredicate;

impl SkipPredicate for DefaultSkipPredicate {
    fn should_skip(&self, path: &Path) -> bool {
        if path
            .components()
            .any(|c| SKIP_DIRS.contains(&c.as_os_str().to_string_lossy().as_ref()))
        {
            return true;
        }
        let name = path.to_string_lossy();
        SKIP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendored_directories_are_skipped() {
        let p = DefaultSkipPredicate;
        assert!(p.should_skip(Path::new("/repo/node_modules/lib/index.js")));
        assert!(p.should_skip(Path::new("/repo/vendor/pkg/mod.go")));
        assert!(p.should_skip(Path::new("/repo/target/debug/build.rs")));
    }

    #[test]
    fn lockfiles_and_binary_assets_are_skipped() {
        let p = DefaultSkipPredicate;
        assert!(p.should_skip(Path::new("/repo/Cargo.lock")));
        assert!(p.should_skip(Path::new("/repo/assets/logo.png")));
    }

    #[test]
    fn ordinary_source_files_are_not_skipped() {
        let p = DefaultSkipPredicate;
        assert!(!p.should_skip(Path::new("/repo/src/main.rs")));
        assert!(!p.should_skip(Path::new("/repo/lib/util.go")));
    }
}
