//! Tree rendering for operator pipelines.
//!
//! Streaming operators form a tree (a join holds two children, a filter
//! one). Implementing [`TreeNode`] gives such a tree a uniform `explain`
//! rendering with box-drawing connectors.

/// A node in a displayable tree.
pub trait TreeNode {
    /// Display name of this node.
    fn node_name(&self) -> &str;

    /// Child nodes, left to right.
    fn node_children(&self) -> Vec<&dyn TreeNode>;

    /// Additional details appended after the name, e.g. a predicate.
    fn node_details(&self) -> Option<String> {
        None
    }
}

/// Render a tree rooted at `node` into an indented multi-line string.
pub fn render_tree(node: &dyn TreeNode) -> String {
    let mut out = String::new();
    render_line(node, "", true, true, &mut out);
    out
}

fn render_line(node: &dyn TreeNode, prefix: &str, is_last: bool, is_root: bool, out: &mut String) {
    if is_root {
        out.push_str(node.node_name());
    } else {
        let connector = if is_last { "└─ " } else { "├─ " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(node.node_name());
    }
    if let Some(details) = node.node_details() {
        out.push_str(&format!(" ({details})"));
    }
    out.push('\n');

    let children = node.node_children();
    let child_prefix = if is_root {
        String::new()
    } else {
        format!("{prefix}{}", if is_last { "   " } else { "│  " })
    };
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        render_line(child, &child_prefix, i + 1 == count, false, out);
    }
}
