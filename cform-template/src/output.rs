//! Generated-file banner and atomic output writer.
//!
//! ## `write_generated` — write protocol
//!
//! 1. Refuse an existing target unless overwriting is allowed.
//! 2. Create parent directories.
//! 3. Write banner + body to `<path>.cform.tmp`.
//! 4. Rename to the final path (atomic on POSIX); remove the `.tmp` on failure.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{io_err, TemplateError};

/// Header comment placed above every generated template.
pub fn generated_banner(generated_at: DateTime<Utc>) -> String {
    format!(
        "# THIS FILE HAS BEEN GENERATED AUTOMATICALLY BY cform AT {}.\n# DO NOT MODIFY THIS FILE MANUALLY.\n\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Fail with [`TemplateError::OutputExists`] if `path` exists and may not be replaced.
pub fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), TemplateError> {
    if path.exists() && !overwrite {
        return Err(TemplateError::OutputExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Atomically write `banner` followed by `body` to `path`.
pub fn write_generated(
    path: &Path,
    banner: &str,
    body: &str,
    overwrite: bool,
) -> Result<(), TemplateError> {
    let tmp = PathBuf::from(format!("{}.cform.tmp", path.display()));
    write_generated_with_tmp(path, banner, body, overwrite, &tmp)
}

fn write_generated_with_tmp(
    path: &Path,
    banner: &str,
    body: &str,
    overwrite: bool,
    tmp: &Path,
) -> Result<(), TemplateError> {
    ensure_writable(path, overwrite)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let mut contents = String::with_capacity(banner.len() + body.len());
    contents.push_str(banner);
    contents.push_str(body);
    std::fs::write(tmp, contents).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!(path = %path.display(), "wrote merged template");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn banner_names_tool_and_time() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            generated_banner(at),
            "# THIS FILE HAS BEEN GENERATED AUTOMATICALLY BY cform AT 2024-01-02T03:04:05Z.\n# DO NOT MODIFY THIS FILE MANUALLY.\n\n"
        );
    }

    #[test]
    fn writes_banner_then_body() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("template.yaml");
        write_generated(&path, "# banner\n\n", "a:\n  b: 1\n", false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# banner\n\na:\n  b: 1\n");
        let tmp = PathBuf::from(format!("{}.cform.tmp", path.display()));
        assert!(!tmp.exists(), ".cform.tmp must be cleaned up");
    }

    #[test]
    fn existing_file_requires_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("template.yaml");
        fs::write(&path, "old").unwrap();

        let err = write_generated(&path, "", "new", false).unwrap_err();
        assert!(matches!(err, TemplateError::OutputExists { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");

        write_generated(&path, "", "new", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn rename_failure_leaves_target_and_cleans_tmp() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("template.yaml");
        fs::create_dir_all(path.join("occupied")).unwrap();

        let tmp_path = root.path().join("template.yaml.cform.tmp");
        let result = write_generated_with_tmp(&path, "", "new", true, &tmp_path);

        assert!(result.is_err(), "rename onto a non-empty directory should fail");
        assert!(path.join("occupied").exists(), "target should be intact");
        assert!(!tmp_path.exists(), ".cform.tmp should be cleaned up");
    }
}
