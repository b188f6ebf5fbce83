//! Regex-based import scanning, used when a source does not parse.

use codescope_core::{ImportExtractor, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// `import ... from 'x'` and `export ... from 'x'`, including multi-line
/// specifier lists.
static IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:import|export)\s+(?:type\s+)?[\w*{}\s,$]*?\bfrom\s*['"]([^'"\n]+)['"]"#)
        .expect("Invalid regex pattern")
});

/// Side-effect `import 'x'`.
static SIDE_EFFECT_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*['"]([^'"\n]+)['"]"#).expect("Invalid regex pattern")
});

/// `require('x')`.
static REQUIRE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"`]([^'"`\n$]+)['"`]\s*\)"#).expect("Invalid regex pattern")
});

/// Dynamic `import('x')`.
static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*\(\s*['"`]([^'"`\n$]+)['"`]\s*\)"#).expect("Invalid regex pattern")
});

/// Scans source text for import/require patterns.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexExtractor;

impl RegexExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Matches from all patterns, ordered by position in the source.
    pub fn scan(&self, source: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();
        for pattern in [&*IMPORT_FROM, &*SIDE_EFFECT_IMPORT, &*REQUIRE_CALL, &*DYNAMIC_IMPORT] {
            for caps in pattern.captures_iter(source) {
                if let Some(m) = caps.get(1) {
                    found.push((m.start(), m.as_str().to_string()));
                }
            }
        }

        found.sort_by_key(|(pos, _)| *pos);
        found.dedup_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, specifier)| specifier).collect()
    }
}

impl ImportExtractor for RegexExtractor {
    fn extract(&self, source: &str, _extension: &str) -> Result<Vec<String>> {
        Ok(self.scan(source))
    }
}
