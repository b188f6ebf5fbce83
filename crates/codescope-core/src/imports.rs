//! Import extraction seam.

use crate::error::Result;
use std::collections::BTreeMap;

/// Relative source path → module specifiers in source order.
pub type DependencyMap = BTreeMap<String, Vec<String>>;

/// Extensions whose files are scanned for imports.
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// Whether an extension (without dot) is a JavaScript/TypeScript source.
pub fn is_script_extension(extension: &str) -> bool {
    let ext = extension.to_ascii_lowercase();
    SCRIPT_EXTENSIONS.contains(&ext.as_str())
}

/// Trait for extracting module specifiers from source code.
pub trait ImportExtractor: Send + Sync {
    /// Return the import/require targets in the order they appear.
    fn extract(&self, source: &str, extension: &str) -> Result<Vec<String>>;
}
