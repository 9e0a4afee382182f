//! Path confinement and extension allowlisting shared by every file tool.
//!
//! Every tool path goes through [`PathSandbox::resolve`]: normalize, validate,
//! resolve within the root, then check the allowlist. No file tool touches
//! `std::fs` with a raw caller-supplied path.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error kinds for path confinement and extension checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SandboxError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("path escapes sandbox root: {0}")]
    EscapesRoot(String),
    #[error("disallowed extension: {0}")]
    DisallowedExtension(String),
}

/// Extension/basename allowlist policy applied after path resolution.
#[derive(Clone, Debug)]
pub struct AllowlistPolicy {
    /// Extensions (without leading dot) that are always acceptable, e.g. `"md"`.
    pub extensions: Vec<String>,
    /// Exact basenames that are acceptable regardless of extension, e.g. `"Makefile"`.
    pub basenames: Vec<String>,
    /// When true, only `extensions`/`basenames` are accepted. When false, only
    /// `binary_exts` are rejected and everything else is accepted.
    pub enforce_allowlist: bool,
    /// Extensions rejected when `enforce_allowlist` is false.
    pub binary_exts: Vec<String>,
}

impl Default for AllowlistPolicy {
    fn default() -> Self {
        AllowlistPolicy {
            extensions: vec!["md".to_string(), "mmd".to_string()],
            basenames: vec![],
            enforce_allowlist: true,
            binary_exts: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "gif".to_string(),
                "ico".to_string(),
                "pdf".to_string(),
                "zip".to_string(),
                "exe".to_string(),
                "dll".to_string(),
                "so".to_string(),
                "bin".to_string(),
            ],
        }
    }
}

impl AllowlistPolicy {
    /// Extension-allowlist check for a path already confined to the sandbox root.
    pub fn is_allowed(&self, path: &Path) -> bool {
        let basename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        if self.enforce_allowlist {
            if self.basenames.iter().any(|b| b == basename) {
                return true;
            }
            match ext {
                Some(ref e) => self.extensions.iter().any(|allowed| allowed == e),
                None => false,
            }
        } else {
            match ext {
                Some(ref e) => !self.binary_exts.iter().any(|b| b == e),
                None => true,
            }
        }
    }
}

/// Confines tool paths to a configured root directory.
#[derive(Clone, Debug)]
pub struct PathSandbox {
    root: PathBuf,
    pub policy: AllowlistPolicy,
}

impl PathSandbox {
    /// `root` should already be an absolute, canonical-ish directory; the
    /// sandbox does not canonicalize it (the caller owns that decision, e.g.
    /// to support roots that don't yet exist in tests).
    pub fn new(root: impl Into<PathBuf>, policy: AllowlistPolicy) -> Self {
        PathSandbox {
            root: root.into(),
            policy,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Strips surrounding whitespace, converts `\` to `/`, and lexically
    /// normalizes `.`/`..` components. Does not touch the filesystem.
    pub fn normalize(raw: &str) -> String {
        let trimmed = raw.trim().replace('\\', "/");
        let mut out: Vec<&str> = Vec::new();
        for part in trimmed.split('/') {
            match part {
                "" | "." => continue,
                ".." => {
                    out.pop();
                }
                other => out.push(other),
            }
        }
        out.join("/")
    }

    /// Rejects paths that are empty, absolute, contain `..`/`~`/`:`/NUL, or
    /// end with a trailing slash. Operates on the *normalized* path.
    pub fn validate_relative(path: &str) -> Result<(), SandboxError> {
        if path.is_empty() {
            return Err(SandboxError::InvalidPath("empty path".to_string()));
        }
        if path.starts_with('/') {
            return Err(SandboxError::InvalidPath(format!(
                "absolute path not allowed: {path}"
            )));
        }
        if path.ends_with('/') {
            return Err(SandboxError::InvalidPath(format!(
                "trailing slash not allowed: {path}"
            )));
        }
        if path.contains('\0') {
            return Err(SandboxError::InvalidPath("NUL byte in path".to_string()));
        }
        if path.contains(':') {
            return Err(SandboxError::InvalidPath(format!(
                "':' not allowed in path: {path}"
            )));
        }
        if path.split('/').any(|seg| seg == "..") {
            return Err(SandboxError::InvalidPath(format!(
                "'..' not allowed in path: {path}"
            )));
        }
        if path.starts_with('~') {
            return Err(SandboxError::InvalidPath(format!(
                "'~' not allowed in path: {path}"
            )));
        }
        Ok(())
    }

    /// Joins `rel` onto `root` and verifies the result is a lexical descendant
    /// of `root`. Does not require the path to exist.
    pub fn resolve_within(root: &Path, rel: &str) -> Result<PathBuf, SandboxError> {
        let joined = root.join(rel);
        let root_components: Vec<_> = root.components().collect();
        let joined_components: Vec<_> = joined.components().collect();
        if joined_components.len() < root_components.len()
            || joined_components[..root_components.len()] != root_components[..]
        {
            return Err(SandboxError::EscapesRoot(joined.display().to_string()));
        }
        Ok(joined)
    }

    /// Normalizes, validates, and resolves `raw` under the sandbox root, then
    /// applies the allowlist policy. Returns the absolute path and the
    /// normalized relative (POSIX) path.
    pub fn resolve(&self, raw: &str) -> Result<(PathBuf, String), SandboxError> {
        let normalized = Self::normalize(raw);
        Self::validate_relative(&normalized)?;
        let abs = Self::resolve_within(&self.root, &normalized)?;
        if !self.policy.is_allowed(&abs) {
            return Err(SandboxError::DisallowedExtension(normalized));
        }
        Ok((abs, normalized))
    }

    /// Same as [`resolve`](Self::resolve) but skips the allowlist check (used
    /// by read-only traversal tools that filter by extension themselves).
    pub fn resolve_unchecked(&self, raw: &str) -> Result<(PathBuf, String), SandboxError> {
        let normalized = Self::normalize(raw);
        Self::validate_relative(&normalized)?;
        let abs = Self::resolve_within(&self.root, &normalized)?;
        Ok((abs, normalized))
    }

    /// Converts an absolute path under the root back to a POSIX-relative path.
    pub fn to_relative(&self, abs: &Path) -> Option<String> {
        abs.strip_prefix(&self.root)
            .ok()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox(root: &Path) -> PathSandbox {
        PathSandbox::new(root.to_path_buf(), AllowlistPolicy::default())
    }

    #[test]
    fn normalize_collapses_dot_and_dotdot_lexically() {
        assert_eq!(PathSandbox::normalize("a/./b/../c"), "a/c");
        assert_eq!(PathSandbox::normalize("  a/b  "), "a/b");
        assert_eq!(PathSandbox::normalize("a\\b\\c"), "a/b/c");
    }

    #[test]
    fn validate_relative_rejects_absolute_and_dotdot_and_tilde() {
        assert!(PathSandbox::validate_relative("/etc/passwd").is_err());
        assert!(PathSandbox::validate_relative("../escape").is_err());
        assert!(PathSandbox::validate_relative("~/x").is_err());
        assert!(PathSandbox::validate_relative("a/b/").is_err());
        assert!(PathSandbox::validate_relative("").is_err());
        assert!(PathSandbox::validate_relative("a:b").is_err());
        assert!(PathSandbox::validate_relative("a/b.md").is_ok());
    }

    #[test]
    fn resolve_within_rejects_escape() {
        let root = PathBuf::from("/sandbox/root");
        assert!(PathSandbox::resolve_within(&root, "a/b.md").is_ok());
        // "../../etc" normalizes away before this call in practice; here we
        // exercise resolve_within directly with an already-escaping join.
        let escaped = PathSandbox::resolve_within(&root, "../outside.md");
        assert!(escaped.is_err());
    }

    #[test]
    fn resolve_end_to_end_rejects_disallowed_extension() {
        let root = PathBuf::from("/sandbox/root");
        let sb = sandbox(&root);
        let err = sb.resolve("image.png").unwrap_err();
        assert_eq!(err, SandboxError::DisallowedExtension("image.png".to_string()));
    }

    #[test]
    fn resolve_end_to_end_accepts_allowed_extension() {
        let root = PathBuf::from("/sandbox/root");
        let sb = sandbox(&root);
        let (abs, rel) = sb.resolve("notes/a.md").unwrap();
        assert_eq!(rel, "notes/a.md");
        assert_eq!(abs, root.join("notes/a.md"));
    }

    #[test]
    fn allowlist_policy_enforce_false_rejects_only_binary_exts() {
        let policy = AllowlistPolicy {
            enforce_allowlist: false,
            ..AllowlistPolicy::default()
        };
        assert!(policy.is_allowed(Path::new("/r/a.rs")));
        assert!(!policy.is_allowed(Path::new("/r/a.png")));
    }

    #[test]
    fn to_relative_strips_root_prefix() {
        let root = PathBuf::from("/sandbox/root");
        let sb = sandbox(&root);
        let rel = sb.to_relative(&root.join("a/b.md")).unwrap();
        assert_eq!(rel, "a/b.md");
    }
}
