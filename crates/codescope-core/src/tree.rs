//! Nested file tree built from the flat file list.

use crate::error::{Error, Result};
use crate::file::AnalyzedFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of the file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileTreeNode {
    /// Leaf node
    File { extension: String, size: u64 },
    /// Interior node keyed by child segment
    Directory {
        children: BTreeMap<String, FileTreeNode>,
    },
}

impl FileTreeNode {
    fn empty_directory() -> Self {
        FileTreeNode::Directory {
            children: BTreeMap::new(),
        }
    }

    /// Number of file leaves at or below this node.
    pub fn file_count(&self) -> usize {
        match self {
            FileTreeNode::File { .. } => 1,
            FileTreeNode::Directory { children } => {
                children.values().map(FileTreeNode::file_count).sum()
            }
        }
    }
}

/// The project file tree. Serializes as the top-level mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    root: BTreeMap<String, FileTreeNode>,
}

impl FileTree {
    /// Build the tree from a flat file list.
    ///
    /// Fails with [`Error::TreeConflict`] if one file's path needs a segment
    /// as a directory while another file already occupies it (or the reverse).
    pub fn build(files: &[AnalyzedFile]) -> Result<Self> {
        let mut tree = Self::default();
        for file in files {
            tree.insert(&file.path, &file.extension, file.size)?;
        }
        Ok(tree)
    }

    /// Insert a single file leaf.
    pub fn insert(&mut self, path: &str, extension: &str, size: u64) -> Result<()> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((leaf, dirs)) = segments.split_last() else {
            return Err(Error::InvalidInput("empty file path".to_string()));
        };

        let mut walked = String::new();
        let mut children = &mut self.root;
        for segment in dirs {
            if !walked.is_empty() {
                walked.push('/');
            }
            walked.push_str(segment);

            let node = children
                .entry((*segment).to_string())
                .or_insert_with(FileTreeNode::empty_directory);
            children = match node {
                FileTreeNode::Directory { children } => children,
                FileTreeNode::File { .. } => return Err(Error::TreeConflict { path: walked }),
            };
        }

        if let Some(FileTreeNode::Directory { .. }) = children.get(*leaf) {
            return Err(Error::TreeConflict {
                path: path.to_string(),
            });
        }

        children.insert(
            (*leaf).to_string(),
            FileTreeNode::File {
                extension: extension.to_string(),
                size,
            },
        );
        Ok(())
    }

    /// Walk the tree by path segments.
    pub fn lookup(&self, path: &str) -> Option<&FileTreeNode> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                FileTreeNode::Directory { children } => children.get(segment)?,
                FileTreeNode::File { .. } => return None,
            };
        }
        Some(node)
    }

    /// Top-level entries.
    pub fn entries(&self) -> &BTreeMap<String, FileTreeNode> {
        &self.root
    }

    /// Total number of file leaves.
    pub fn file_count(&self) -> usize {
        self.root.values().map(FileTreeNode::file_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}
