//! Browsable index of the synced examples.
//!
//! Builds a folder/file tree of every `.ts` example with its source and the
//! JSDoc tags of its first `/** ... */` block, and writes it as
//! `examples-index.json` next to the static viewer assets.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collector::collect_files;
use crate::errors::IndexError;

/// Index file written into the public directory.
pub const INDEX_FILE: &str = "examples-index.json";

/// Static viewer assets copied into the public directory, relative to the
/// repository root.
pub const SITE_ASSETS: &[&str] = &["index.html", "js/main.js"];

/// A node of the examples tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IndexNode {
    Folder(ExampleFolder),
    File(ExampleFile),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleFolder {
    pub name: String,
    /// Slash-separated path from the repository root.
    pub path: String,
    pub children: Vec<IndexNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleFile {
    pub name: String,
    pub path: String,
    pub code: String,
    pub metadata: ExampleMetadata,
}

/// Tags read from an example's leading doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ExampleFolder {
    fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            children: Vec::new(),
        }
    }

    /// Child folder `name`, created on first use.
    fn folder_mut(&mut self, name: &str, path: &str) -> &mut ExampleFolder {
        let pos = self
            .children
            .iter()
            .position(|c| matches!(c, IndexNode::Folder(f) if f.name == name));
        let idx = match pos {
            Some(idx) => idx,
            None => {
                self.children
                    .push(IndexNode::Folder(ExampleFolder::new(name, path)));
                self.children.len() - 1
            }
        };
        match &mut self.children[idx] {
            IndexNode::Folder(folder) => folder,
            IndexNode::File(_) => unreachable!("position() only matches folders"),
        }
    }

    /// Number of files anywhere below this folder.
    pub fn file_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| match c {
                IndexNode::Folder(f) => f.file_count(),
                IndexNode::File(_) => 1,
            })
            .sum()
    }
}

fn doc_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)/\*\*(.*?)\*/").unwrap_or_else(|e| unreachable!("static doc pattern: {e}"))
    })
}

/// Parse `@title`, `@description`, `@category` and `@tags` from the first
/// `/** ... */` block. A tag's value runs until the next tag; `@tags` is
/// split on commas.
pub fn parse_leading_doc(source: &str) -> ExampleMetadata {
    let Some(caps) = doc_block_regex().captures(source) else {
        return ExampleMetadata::default();
    };
    let body = caps.get(1).map_or("", |m| m.as_str());

    let mut values: BTreeMap<String, String> = BTreeMap::new();
    let mut current: Option<String> = None;
    for line in body.lines() {
        let line = line.trim().trim_start_matches('*').trim();
        if let Some(rest) = line.strip_prefix('@') {
            let (tag, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            values.insert(tag.to_string(), value.trim().to_string());
            current = Some(tag.to_string());
        } else if let (Some(tag), false) = (&current, line.is_empty()) {
            if let Some(value) = values.get_mut(tag) {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(line);
            }
        }
    }

    let mut take = |key: &str| values.remove(key);
    ExampleMetadata {
        title: take("title"),
        description: take("description"),
        category: take("category"),
        tags: take("tags").map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        }),
    }
}

/// Build the tree of `.ts` files under `<repo_root>/<examples_dir>`.
///
/// Files are visited in sorted path order so the output is stable.
pub fn build_index(repo_root: &Path, examples_dir: &str) -> Result<ExampleFolder, IndexError> {
    let examples_dir = examples_dir.trim_end_matches('/');
    let base = repo_root.join(examples_dir);
    if !base.is_dir() {
        return Err(IndexError::ExamplesMissing(base));
    }

    let mut files: Vec<PathBuf> = collect_files(&base, &[])
        .map_err(|e| IndexError::Io {
            path: base.clone(),
            source: e,
        })?
        .into_iter()
        .filter(|p| p.extension().is_some_and(|e| e == "ts"))
        .collect();
    files.sort();

    let mut root = ExampleFolder::new(examples_dir, examples_dir);
    for file in &files {
        let rel = file.strip_prefix(&base).unwrap_or(file.as_path());
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        let Some((file_name, folders)) = parts.split_last() else {
            continue;
        };

        let mut current = &mut root;
        let mut path = examples_dir.to_string();
        for folder in folders {
            path = format!("{path}/{folder}");
            current = current.folder_mut(folder, &path);
        }

        let code = std::fs::read_to_string(file).map_err(|e| IndexError::Io {
            path: file.clone(),
            source: e,
        })?;
        let metadata = parse_leading_doc(&code);
        debug!(path = %file.display(), title = ?metadata.title, "indexed example");
        current.children.push(IndexNode::File(ExampleFile {
            name: file_name.clone(),
            path: format!("{path}/{file_name}"),
            code,
            metadata,
        }));
    }

    info!(files = files.len(), dir = %base.display(), "built examples index");
    Ok(root)
}

/// What [`write_site`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOutput {
    pub index_path: PathBuf,
    pub copied_assets: Vec<PathBuf>,
    pub missing_assets: Vec<String>,
}

/// Write the index JSON into `<repo_root>/<public_dir>` and copy the static
/// viewer assets alongside it. Missing assets are skipped with a warning.
pub fn write_site(
    repo_root: &Path,
    public_dir: &str,
    tree: ExampleFolder,
) -> Result<SiteOutput, IndexError> {
    let out = repo_root.join(public_dir);
    std::fs::create_dir_all(&out).map_err(|e| IndexError::Io {
        path: out.clone(),
        source: e,
    })?;

    let json = serde_json::to_string_pretty(&IndexNode::Folder(tree))?;
    let index_path = out.join(INDEX_FILE);
    std::fs::write(&index_path, json).map_err(|e| IndexError::Io {
        path: index_path.clone(),
        source: e,
    })?;
    info!(path = %index_path.display(), "wrote examples index");

    let mut copied_assets = Vec::new();
    let mut missing_assets = Vec::new();
    for asset in SITE_ASSETS {
        let from = repo_root.join(asset);
        if !from.is_file() {
            warn!(asset, "site asset not found, skipping");
            missing_assets.push(asset.to_string());
            continue;
        }
        let to = out.join(asset);
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IndexError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::copy(&from, &to).map_err(|e| IndexError::Io {
            path: from.clone(),
            source: e,
        })?;
        copied_assets.push(to);
    }

    Ok(SiteOutput {
        index_path,
        copied_assets,
        missing_assets,
    })
}
