//! Recursive file collection for SDK example trees.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::transform::is_source_extension;

/// Recursively list every file under `dir`, skipping directories whose name
/// is in `exclude` at any depth.
///
/// A missing `dir` yields an empty list. Order follows the filesystem's
/// enumeration and is not sorted.
pub fn collect_files(dir: &Path, exclude: &[&str]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.exists() {
        debug!(dir = %dir.display(), "collect: directory does not exist");
        return Ok(files);
    }
    walk(dir, exclude, &mut files)?;
    debug!(dir = %dir.display(), count = files.len(), "collected files");
    Ok(files)
}

fn walk(dir: &Path, exclude: &[&str], files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // Follow symlinks, matching a plain stat.
        let meta = std::fs::metadata(&path)?;
        if meta.is_dir() {
            let name = entry.file_name();
            if exclude.iter().any(|ex| name.as_os_str() == *ex) {
                trace!(path = %path.display(), "skipping excluded directory");
                continue;
            }
            walk(&path, exclude, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// A collected file with its content, ready to be mirrored.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub source_path: PathBuf,
    /// Path relative to the collection root.
    pub relative_path: PathBuf,
    /// Extension without the dot, if any.
    pub extension: Option<String>,
    pub content: Vec<u8>,
}

impl FileEntry {
    /// Read `source_path`, computing its path relative to `root`.
    pub fn load(root: &Path, source_path: &Path) -> std::io::Result<Self> {
        let relative_path = source_path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!(
                        "'{}' is not under '{}'",
                        source_path.display(),
                        root.display()
                    ),
                )
            })?;
        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);
        let content = std::fs::read(source_path)?;
        Ok(Self {
            source_path: source_path.to_path_buf(),
            relative_path,
            extension,
            content,
        })
    }

    /// Whether this file's text is run through the transformer.
    pub fn is_source_code(&self) -> bool {
        self.extension.as_deref().is_some_and(is_source_extension)
    }
}
