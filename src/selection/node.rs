//! Rendered-node tree
//!
//! The pure-data analog of the rendered markup a presentation adapter owns
//! for one text block. Text leaves hold the block's characters; element nodes
//! are inline markup boundaries (a rendered segment wrapper, for instance)
//! and contribute no characters of their own.
//!
//! Positions into the tree mirror DOM addressing: a path of child indices
//! from the block root, plus an offset that counts characters inside a text
//! leaf or children on an element node.

/// One node of a block's rendered markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    /// A run of characters.
    Text(String),
    /// An inline markup boundary wrapping child nodes.
    Element { children: Vec<RenderNode> },
}

impl RenderNode {
    /// Create a text leaf.
    pub fn text(content: impl Into<String>) -> Self {
        RenderNode::Text(content.into())
    }

    /// Create an element node.
    pub fn element(children: Vec<RenderNode>) -> Self {
        RenderNode::Element { children }
    }

    /// Total character count of the subtree.
    pub fn text_len(&self) -> usize {
        match self {
            RenderNode::Text(s) => s.chars().count(),
            RenderNode::Element { children } => children.iter().map(RenderNode::text_len).sum(),
        }
    }

    /// Concatenated text of the subtree in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderNode::Text(s) => out.push_str(s),
            RenderNode::Element { children } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Resolve a child path from this node. An empty path is this node.
    pub fn node_at(&self, path: &[usize]) -> Option<&RenderNode> {
        let mut node = self;
        for &index in path {
            match node {
                RenderNode::Element { children } => node = children.get(index)?,
                RenderNode::Text(_) => return None,
            }
        }
        Some(node)
    }

    /// Text leaves of the subtree in document order, with their paths.
    pub(crate) fn text_leaves(&self) -> Vec<(Vec<usize>, &str)> {
        let mut out = Vec::new();
        self.visit_leaves(&mut Vec::new(), &mut out);
        out
    }

    fn visit_leaves<'a>(&'a self, path: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, &'a str)>) {
        match self {
            RenderNode::Text(s) => out.push((path.clone(), s.as_str())),
            RenderNode::Element { children } => {
                for (i, child) in children.iter().enumerate() {
                    path.push(i);
                    child.visit_leaves(path, out);
                    path.pop();
                }
            }
        }
    }
}

/// A selection endpoint: a path of child indices from the block root and an
/// offset within the addressed node.
///
/// On a text leaf the offset counts characters; on an element node it counts
/// children, marking the boundary before that child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePosition {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl NodePosition {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }
}
