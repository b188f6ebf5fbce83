//! Codescope Parser Library
//!
//! Extracts module specifiers from JavaScript/TypeScript sources. The
//! tree-sitter extractor is tried first; sources it cannot parse cleanly are
//! handed to a regex scanner.

pub mod extractor;
pub mod fallback;
pub mod patterns;

use codescope_core::ImportExtractor;
use std::sync::Arc;

pub use extractor::TreeSitterExtractor;
pub use fallback::FallbackExtractor;
pub use patterns::RegexExtractor;

/// The extractor the analyzer uses by default: tree-sitter with regex fallback.
pub fn default_extractor() -> Arc<dyn ImportExtractor> {
    Arc::new(FallbackExtractor::default())
}
