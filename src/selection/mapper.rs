//! Selection mapping
//!
//! Converts a visual text selection (two endpoints in a block's rendered
//! markup) into logical character offsets, and back. Inline markup is purely
//! visual: element boundaries never shift logical offsets, they only anchor
//! endpoint paths.

use thiserror::Error;

use super::node::{NodePosition, RenderNode};

/// Number of context characters captured around a mapped selection.
const CONTEXT_CHARS: usize = 32;

/// A selection that cannot be mapped to offsets. No mutation follows from
/// either case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// An endpoint does not resolve inside the block subtree.
    #[error("Selection anchors outside the block subtree")]
    OutOfScope,

    /// The selection is collapsed; a zero-length selection is reported
    /// explicitly rather than widened to a one-character span.
    #[error("Selection is empty")]
    Empty,

    /// Logical offsets that do not fit the block content.
    #[error("Offsets {start}..{end} do not fit content of length {len}")]
    OutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },
}

/// A mapped selection: logical character interval, the selected text
/// verbatim, and surrounding context for robust re-anchoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOffsets {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// The selected text, concatenated across markup boundaries.
    pub text: String,
    /// Up to 32 characters before the selection.
    pub prefix: Option<String>,
    /// Up to 32 characters after the selection.
    pub suffix: Option<String>,
}

/// A logical interval resolved back to endpoint positions in the rendered
/// tree, for programmatic highlighting or focus restoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: NodePosition,
    pub end: NodePosition,
}

/// Map a visual selection to logical character offsets.
///
/// `anchor` and `focus` are the selection endpoints in either order (a
/// backwards drag is normalized). Both must resolve inside `block_root`.
pub fn to_offsets(
    block_root: &RenderNode,
    anchor: &NodePosition,
    focus: &NodePosition,
) -> Result<SelectionOffsets, SelectionError> {
    let a = logical_offset(block_root, anchor).ok_or(SelectionError::OutOfScope)?;
    let b = logical_offset(block_root, focus).ok_or(SelectionError::OutOfScope)?;

    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    if start == end {
        return Err(SelectionError::Empty);
    }

    let content: Vec<char> = block_root.text_content().chars().collect();
    let text: String = content[start..end].iter().collect();

    let prefix_start = start.saturating_sub(CONTEXT_CHARS);
    let prefix: String = content[prefix_start..start].iter().collect();
    let suffix_end = (end + CONTEXT_CHARS).min(content.len());
    let suffix: String = content[end..suffix_end].iter().collect();

    Ok(SelectionOffsets {
        start,
        end,
        text,
        prefix: if prefix.is_empty() { None } else { Some(prefix) },
        suffix: if suffix.is_empty() { None } else { Some(suffix) },
    })
}

/// Resolve a logical interval back to endpoint positions in the tree.
///
/// The start endpoint binds to the text leaf containing its character; when
/// the offset falls on a leaf boundary it binds to the start of the following
/// leaf, while the end endpoint binds to the end of the preceding one, so the
/// resolved range never straddles empty markup.
pub fn to_range(
    block_root: &RenderNode,
    start: usize,
    end: usize,
) -> Result<ResolvedRange, SelectionError> {
    let len = block_root.text_len();
    if start >= end {
        return Err(SelectionError::Empty);
    }
    if end > len {
        return Err(SelectionError::OutOfBounds { start, end, len });
    }

    let leaves = block_root.text_leaves();

    let mut start_pos = None;
    let mut end_pos = None;
    let mut acc = 0usize;
    for (path, text) in &leaves {
        let leaf_len = text.chars().count();
        if start_pos.is_none() && start < acc + leaf_len {
            start_pos = Some(NodePosition::new(path.clone(), start - acc));
        }
        if end_pos.is_none() && end <= acc + leaf_len {
            end_pos = Some(NodePosition::new(path.clone(), end - acc));
        }
        acc += leaf_len;
        if start_pos.is_some() && end_pos.is_some() {
            break;
        }
    }

    match (start_pos, end_pos) {
        (Some(start), Some(end)) => Ok(ResolvedRange { start, end }),
        // Unreachable with end <= len, kept as a guard for zero-length leaves.
        _ => Err(SelectionError::OutOfBounds { start, end, len }),
    }
}

/// Logical character offset of a position, or `None` when the position does
/// not resolve inside the subtree.
fn logical_offset(root: &RenderNode, pos: &NodePosition) -> Option<usize> {
    let mut node = root;
    let mut acc = 0usize;

    for &index in &pos.path {
        match node {
            RenderNode::Element { children } => {
                if index >= children.len() {
                    return None;
                }
                for sibling in &children[..index] {
                    acc += sibling.text_len();
                }
                node = &children[index];
            }
            // A path descending through a text leaf leaves the subtree.
            RenderNode::Text(_) => return None,
        }
    }

    match node {
        RenderNode::Text(s) => {
            let leaf_len = s.chars().count();
            if pos.offset > leaf_len {
                return None;
            }
            Some(acc + pos.offset)
        }
        RenderNode::Element { children } => {
            if pos.offset > children.len() {
                return None;
            }
            for child in &children[..pos.offset] {
                acc += child.text_len();
            }
            Some(acc)
        }
    }
}
