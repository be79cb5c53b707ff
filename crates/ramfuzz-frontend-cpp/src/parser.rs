use crate::error::{FrontendError, Result};
use ramfuzz_common::SourceFile;
use tree_sitter::{Node, Parser, Tree};

/// Parse C++ source code into a tree-sitter Tree.
///
/// A tree that contains `ERROR` or `MISSING` nodes is rejected, pointing at
/// the first offending node.
pub fn parse(source: &SourceFile) -> Result<Tree> {
    let mut parser = Parser::new();
    let language = tree_sitter_cpp::LANGUAGE;
    parser.set_language(&language.into())?;

    let tree = parser
        .parse(&source.content, None)
        .ok_or_else(|| FrontendError::NoTree {
            path: source.path.display().to_string(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let bad = first_error(root).unwrap_or(root);
        return Err(FrontendError::Syntax {
            path: source.path.display().to_string(),
            line: source.location(bad.start_byte()).line,
            src: source.named_source(),
            span: bad.byte_range().into(),
        });
    }

    Ok(tree)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error)
}
