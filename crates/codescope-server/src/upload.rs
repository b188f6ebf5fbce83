//! Unpacking of uploaded project archives.

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use codescope_core::{Error, Result};

/// macOS resource-fork folder some archivers add next to the real content.
const MACOS_METADATA_DIR: &str = "__MACOSX";

/// Extract a zip archive into `dest` and return the project root.
///
/// Entries whose names would escape `dest` are skipped. When the archive
/// holds a single top-level folder, that folder is the project root.
/// Extraction stops with an `Archive` error once more than `max_bytes` have
/// been written, or when an entry cannot be written (for example a file and
/// a directory sharing one name).
pub fn extract_archive(bytes: &[u8], dest: &Path, max_bytes: u64) -> Result<PathBuf> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| Error::Archive(e.to_string()))?;
    let mut written: u64 = 0;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| Error::Archive(e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let target = dest.join(relative);
        let name = entry.name().to_string();
        let entry_error = |e: io::Error| Error::Archive(format!("Cannot extract {}: {}", name, e));

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(entry_error)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(entry_error)?;
        }
        let mut out = fs::File::create(&target).map_err(entry_error)?;

        let remaining = max_bytes - written;
        let copied = io::copy(&mut (&mut entry).take(remaining.saturating_add(1)), &mut out)
            .map_err(entry_error)?;
        if copied > remaining {
            return Err(Error::Archive(format!(
                "Archive expands beyond {} bytes",
                max_bytes
            )));
        }
        written += copied;
    }

    project_root(dest)
}

/// The single top-level directory of `dest`, or `dest` itself.
fn project_root(dest: &Path) -> Result<PathBuf> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dest)? {
        let entry = entry?;
        if entry.file_name() != MACOS_METADATA_DIR {
            entries.push(entry);
        }
    }

    match entries.as_slice() {
        [] => Err(Error::Archive("Archive contains no files".to_string())),
        [only] if only.file_type()?.is_dir() => Ok(only.path()),
        _ => Ok(dest.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LIMIT: u64 = 1024 * 1024;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            for (name, content) in entries {
                zip.start_file(*name, zip::write::SimpleFileOptions::default())
                    .unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_single_folder_is_unwrapped() {
        let bytes = build_zip(&[
            ("shop/package.json", "{\"name\": \"shop\"}"),
            ("shop/src/index.js", "require('express');"),
            ("__MACOSX/shop/._index.js", ""),
        ]);
        let dest = tempfile::tempdir().unwrap();

        let root = extract_archive(&bytes, dest.path(), LIMIT).unwrap();
        assert_eq!(root, dest.path().join("shop"));
        assert!(root.join("src/index.js").is_file());
    }

    #[test]
    fn test_flat_archive_keeps_dest() {
        let bytes = build_zip(&[("index.js", "x"), ("lib/util.js", "y")]);
        let dest = tempfile::tempdir().unwrap();

        let root = extract_archive(&bytes, dest.path(), LIMIT).unwrap();
        assert_eq!(root, dest.path());
        assert_eq!(fs::read_to_string(root.join("lib/util.js")).unwrap(), "y");
    }

    #[test]
    fn test_invalid_archive() {
        let dest = tempfile::tempdir().unwrap();
        let err = extract_archive(b"definitely not a zip", dest.path(), LIMIT).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_empty_archive() {
        let bytes = build_zip(&[]);
        let dest = tempfile::tempdir().unwrap();
        let err = extract_archive(&bytes, dest.path(), LIMIT).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_file_and_directory_clash_is_archive_error() {
        let bytes = build_zip(&[("app/a", "file"), ("app/a/b", "nested")]);
        let dest = tempfile::tempdir().unwrap();

        let err = extract_archive(&bytes, dest.path(), LIMIT).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_expanded_size_is_capped() {
        let big = "x".repeat(600);
        let bytes = build_zip(&[("a.txt", big.as_str()), ("b.txt", big.as_str())]);

        let dest = tempfile::tempdir().unwrap();
        let err = extract_archive(&bytes, dest.path(), 1000).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));

        let dest = tempfile::tempdir().unwrap();
        assert!(extract_archive(&bytes, dest.path(), 1200).is_ok());
    }
}
