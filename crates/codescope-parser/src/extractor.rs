//! Import extraction from source code using tree-sitter.

use codescope_core::{Error, ImportExtractor, Result};
use tree_sitter::Node;

/// Extracts imports by walking a tree-sitter syntax tree.
///
/// `.ts`, `.mts` and `.cts` files use the TypeScript grammar; everything else
/// uses the TSX grammar, which also covers JSX in plain JavaScript.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterExtractor;

impl TreeSitterExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    fn grammar(extension: &str) -> (tree_sitter::Language, &'static str) {
        match extension.to_ascii_lowercase().as_str() {
            "ts" | "mts" | "cts" => (
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                "TypeScript",
            ),
            _ => (tree_sitter_typescript::LANGUAGE_TSX.into(), "TSX"),
        }
    }

    /// Pre-order walk collecting specifiers in document order.
    ///
    /// Iterative so that deeply nested expressions cannot exhaust the stack.
    fn collect_imports(&self, root: &Node, content: &str) -> Vec<String> {
        let mut imports = Vec::new();
        let mut cursor = root.walk();

        loop {
            let node = cursor.node();
            let specifier = match node.kind() {
                // `import x from 'y'`, `import 'y'`, `export * from 'y'`
                "import_statement" | "export_statement" | "import_require_clause" => {
                    self.statement_source(&node, content)
                }
                "call_expression" => self.call_target(&node, content),
                _ => None,
            };
            imports.extend(specifier);

            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return imports;
                }
            }
        }
    }

    fn statement_source(&self, node: &Node, content: &str) -> Option<String> {
        if let Some(source) = node.child_by_field_name("source") {
            return string_value(&source, content);
        }
        // `export default 'x'` carries a string child that is not a source.
        if node.kind() == "export_statement" {
            return None;
        }
        let mut cursor = node.walk();
        let source = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "string")?;
        string_value(&source, content)
    }

    /// Specifier of a `require('x')` or dynamic `import('x')` call.
    fn call_target(&self, node: &Node, content: &str) -> Option<String> {
        let function = node.child_by_field_name("function")?;
        let is_import = function.kind() == "import";
        let is_require = function.kind() == "identifier"
            && function.utf8_text(content.as_bytes()).ok()? == "require";
        if !is_import && !is_require {
            return None;
        }

        let arguments = node.child_by_field_name("arguments")?;
        let first = arguments.named_child(0)?;
        string_value(&first, content)
    }
}

impl ImportExtractor for TreeSitterExtractor {
    fn extract(&self, source: &str, extension: &str) -> Result<Vec<String>> {
        let (language, name) = Self::grammar(extension);

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| Error::Parse(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| Error::Parse(format!("Failed to parse {}", name)))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(&root).unwrap_or(1);
            return Err(Error::Parse(format!("{} syntax error near line {}", name, line)));
        }

        Ok(self.collect_imports(&root, source))
    }
}

/// Contents of a string literal, or of a template literal with no
/// substitutions.
fn string_value(node: &Node, content: &str) -> Option<String> {
    match node.kind() {
        "string" => {}
        "template_string" => {
            let mut cursor = node.walk();
            let has_substitution = node
                .named_children(&mut cursor)
                .any(|c| c.kind() == "template_substitution");
            if has_substitution {
                return None;
            }
        }
        _ => return None,
    }

    let text = node.utf8_text(content.as_bytes()).ok()?;
    let inner = text.get(1..text.len().checked_sub(1)?)?;
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

fn first_error_line(root: &Node) -> Option<usize> {
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        // Only subtrees that contain an error are worth entering.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}
