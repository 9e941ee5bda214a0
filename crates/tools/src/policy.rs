//! Filesystem sandboxing for the file tools.
//!
//! File tools only touch paths that pass this check: no traversal
//! sequences, inside one of the allowed roots (when any are set), and
//! outside every forbidden prefix.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathPolicyError {
    #[error("path '{path}' is outside the allowed roots")]
    OutsideAllowedRoots { path: String },

    #[error("path '{path}' is under forbidden prefix '{prefix}'")]
    ForbiddenPrefix { path: String, prefix: String },

    #[error("path traversal detected in '{path}'")]
    Traversal { path: String },

    #[error("failed to resolve path '{path}': {reason}")]
    ResolveFailed { path: String, reason: String },
}

/// Validate a path against the sandbox policy and return its resolved
/// form.
///
/// A path that does not exist yet (a write target) is resolved through
/// its parent directory so symlinks cannot escape the roots.
pub fn validate_path(
    path: &str,
    allowed_roots: &[PathBuf],
    forbidden_prefixes: &[PathBuf],
) -> Result<PathBuf, PathPolicyError> {
    let input = Path::new(path);

    let normalized = path.replace('\\', "/");
    if normalized.contains("../") || normalized.contains("/..") || normalized == ".." {
        return Err(PathPolicyError::Traversal { path: path.into() });
    }

    let resolved = if input.exists() {
        input
            .canonicalize()
            .map_err(|e| PathPolicyError::ResolveFailed {
                path: path.into(),
                reason: e.to_string(),
            })?
    } else if let Some(parent) = input.parent()
        && !parent.as_os_str().is_empty()
        && parent.exists()
    {
        let parent = parent
            .canonicalize()
            .map_err(|e| PathPolicyError::ResolveFailed {
                path: path.into(),
                reason: format!("parent dir: {e}"),
            })?;
        parent.join(input.file_name().unwrap_or_default())
    } else {
        input.to_path_buf()
    };

    for prefix in forbidden_prefixes {
        let prefix = expand_tilde(prefix);
        if resolved.starts_with(&prefix) {
            return Err(PathPolicyError::ForbiddenPrefix {
                path: path.into(),
                prefix: prefix.display().to_string(),
            });
        }
    }

    if !allowed_roots.is_empty() {
        let allowed = allowed_roots.iter().any(|root| {
            let root = expand_tilde(root);
            let root = root.canonicalize().unwrap_or(root);
            resolved.starts_with(&root)
        });
        if !allowed {
            return Err(PathPolicyError::OutsideAllowedRoots { path: path.into() });
        }
    }

    Ok(resolved)
}

fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~")
        && (rest.is_empty() || rest.starts_with('/'))
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(format!("{home}{rest}"));
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_restrictions_allows_anything_resolvable() {
        assert!(validate_path("/tmp", &[], &[]).is_ok());
    }

    #[test]
    fn traversal_blocked() {
        let result = validate_path("../../../etc/passwd", &[], &[]);
        assert!(matches!(result, Err(PathPolicyError::Traversal { .. })));
    }

    #[test]
    fn traversal_mid_path_blocked() {
        let result = validate_path("/tmp/../etc/passwd", &[], &[]);
        assert!(matches!(result, Err(PathPolicyError::Traversal { .. })));
    }

    #[test]
    fn allowed_roots_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let inside = dir.path().join("note.txt");
        std::fs::write(&inside, "x").unwrap();

        let roots = vec![dir.path().to_path_buf()];
        assert!(validate_path(inside.to_str().unwrap(), &roots, &[]).is_ok());

        let result = validate_path("/tmp", &roots, &[]);
        assert!(matches!(
            result,
            Err(PathPolicyError::OutsideAllowedRoots { .. })
        ));
    }

    #[test]
    fn forbidden_prefix_wins_over_allowed_root() {
        let dir = tempfile::tempdir().unwrap();
        let secret_dir = dir.path().join("secrets");
        std::fs::create_dir(&secret_dir).unwrap();
        let secret = secret_dir.join("key.pem");
        std::fs::write(&secret, "x").unwrap();

        let roots = vec![dir.path().to_path_buf()];
        let forbidden = vec![secret_dir.canonicalize().unwrap()];
        let result = validate_path(secret.to_str().unwrap(), &roots, &forbidden);
        assert!(matches!(
            result,
            Err(PathPolicyError::ForbiddenPrefix { .. })
        ));
    }

    #[test]
    fn nonexistent_write_target_resolves_through_parent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new-file.txt");
        let roots = vec![dir.path().to_path_buf()];
        assert!(validate_path(target.to_str().unwrap(), &roots, &[]).is_ok());
    }
}
