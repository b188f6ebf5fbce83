//! Primary/fallback extractor composition.

use crate::extractor::TreeSitterExtractor;
use crate::patterns::RegexExtractor;
use codescope_core::{ImportExtractor, Result};

/// Runs the primary extractor and, if it fails, the fallback.
pub struct FallbackExtractor {
    primary: Box<dyn ImportExtractor>,
    fallback: Box<dyn ImportExtractor>,
}

impl FallbackExtractor {
    pub fn new(primary: Box<dyn ImportExtractor>, fallback: Box<dyn ImportExtractor>) -> Self {
        Self { primary, fallback }
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self::new(Box::new(TreeSitterExtractor::new()), Box::new(RegexExtractor::new()))
    }
}

impl ImportExtractor for FallbackExtractor {
    fn extract(&self, source: &str, extension: &str) -> Result<Vec<String>> {
        match self.primary.extract(source, extension) {
            Ok(imports) => Ok(imports),
            Err(e) => {
                tracing::debug!("Primary import extraction failed, using fallback: {}", e);
                self.fallback.extract(source, extension)
            }
        }
    }
}
