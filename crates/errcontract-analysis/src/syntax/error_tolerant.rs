//! Error-tolerant parsing: count the ERROR/MISSING nodes tree-sitter
//! recovered from, so partially parsed files can be logged.

use tree_sitter::Node;

use super::ast::Span;

/// Count ERROR and MISSING nodes in a tree-sitter tree.
pub fn count_errors(root: Node) -> (u32, Vec<Span>) {
    let mut count = 0u32;
    let mut spans = Vec::new();
    collect_errors(root, &mut count, &mut spans);
    (count, spans)
}

fn collect_errors(node: Node, count: &mut u32, spans: &mut Vec<Span>) {
    if node.is_error() || node.is_missing() {
        *count += 1;
        spans.push(Span::from_ts_node(&node));
    }
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(child, count, spans);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::TsParser;
    use std::path::Path;

    #[test]
    fn test_clean_source_has_no_errors() {
        let mut parser = TsParser::new().unwrap();
        let tree = parser
            .parse_tree("const a = 1;\n", Path::new("a.ts"))
            .unwrap();
        let (count, spans) = count_errors(tree.root_node());
        assert_eq!(count, 0);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_broken_source_reports_errors() {
        let mut parser = TsParser::new().unwrap();
        let tree = parser
            .parse_tree("class { throw new ApiError(\n", Path::new("a.ts"))
            .unwrap();
        let (count, spans) = count_errors(tree.root_node());
        assert!(count > 0);
        assert_eq!(spans.len() as u32, count);
    }
}
