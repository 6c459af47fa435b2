//! Annotation controller
//!
//! Owns the loaded document's annotation state: per-block span indexes and
//! render partitions, classification labels at every scope, and the page
//! region overlay. All mutation funnels through typed operations here so the
//! persisted schema, the interval indexes, and the derived segments never
//! drift apart.
//!
//! Blocks move between two modes: `Viewing` (labels rendered, classification
//! active) and `EditingText` (content directly editable). Entering an edit
//! discards the block's span labels; edits are destructive by design.

pub mod session;

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::color;
use crate::labels::{
    char_slice, partition, ClassificationLabel, LabelScope, RangeError, Segment,
    SpanIntervalIndex, SpanLabel,
};
use crate::registry::LabelDefinitionRegistry;
use crate::regions::{Region, RegionOverlayIndex};
use crate::schema::{
    BlockData, BlockLabelEntry, DocumentData, DocumentPayload, LabelStatus, PageData, SchemaError,
};
use crate::selection::{SelectionError, SelectionOffsets};

/// What a classification toggle or done toggle applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelTarget {
    Document,
    Page(u32),
    Block(String),
}

/// Per-block interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// Labels rendered read-only; classification and span actions active.
    Viewing,
    /// Content directly editable; span labels discarded, classification
    /// controls disabled.
    EditingText,
}

/// A controller operation that cannot proceed. No state changes on error.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Unknown block '{0}'")]
    UnknownBlock(String),

    #[error("Unknown page {0}")]
    UnknownPage(u32),

    #[error("Label '{name}' does not apply to this target")]
    ScopeMismatch { name: String },

    #[error("Label '{name}' is not a {expected} label")]
    KindMismatch { name: String, expected: &'static str },

    #[error("Block '{0}' is being edited")]
    BlockEditing(String),

    #[error("Block '{0}' is not being edited")]
    BlockNotEditing(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A render segment joined with its display colors: what a presentation
/// adapter draws for one disjoint slice of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSegment {
    pub start: usize,
    pub end: usize,
    /// The slice's text, extracted by character offsets.
    pub text: String,
    /// Names of the span labels covering the slice.
    pub covering: BTreeSet<String>,
    /// Blended fill color; `None` for uncovered text.
    pub fill: Option<String>,
    /// Readable text color over the fill.
    pub text_color: Option<&'static str>,
}

/// Labeling progress over the document's blocks, for toolbar display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done_blocks: usize,
    pub total_blocks: usize,
}

/// One text block's annotation state.
#[derive(Debug, Clone)]
pub struct BlockState {
    id: String,
    content: String,
    status: LabelStatus,
    position: Region,
    classifications: Vec<ClassificationLabel>,
    spans: SpanIntervalIndex,
    segments: Vec<Segment>,
    mode: BlockMode,
}

impl BlockState {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn status(&self) -> LabelStatus {
        self.status
    }

    pub fn position(&self) -> &Region {
        &self.position
    }

    pub fn mode(&self) -> BlockMode {
        self.mode
    }

    /// Active classification labels in activation order.
    pub fn classifications(&self) -> &[ClassificationLabel] {
        &self.classifications
    }

    /// Span labels in insertion order.
    pub fn span_labels(&self) -> impl Iterator<Item = &SpanLabel> {
        self.spans.iter()
    }

    /// The current render partition: an ordered, non-overlapping cover of
    /// the content.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn repartition(&mut self) -> Result<(), RangeError> {
        let labels: Vec<SpanLabel> = self.spans.iter().cloned().collect();
        self.segments = partition(self.spans.content_len(), &labels)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct PageState {
    number: u32,
    status: LabelStatus,
    labels: Vec<ClassificationLabel>,
    blocks: Vec<BlockState>,
}

/// The annotation engine's orchestrator for one loaded document.
#[derive(Debug)]
pub struct AnnotationController {
    registry: LabelDefinitionRegistry,
    status: LabelStatus,
    labels: Vec<ClassificationLabel>,
    pages: Vec<PageState>,
    regions: RegionOverlayIndex,
    /// Block id → (page index, block index).
    block_locations: HashMap<String, (usize, usize)>,
}

impl AnnotationController {
    /// Build controller state from a persisted document.
    ///
    /// Validates everything the wire parse cannot: label names against the
    /// registry, span bounds against block content, region coordinates, and
    /// block id uniqueness. Fails without partial state on the first error.
    pub fn load(
        registry: LabelDefinitionRegistry,
        payload: DocumentPayload,
    ) -> Result<Self, SchemaError> {
        let data = payload.data;

        let labels = Self::load_classifications(&registry, &data.labels, LabelScope::Document)?;

        let mut pages = Vec::with_capacity(data.pages.len());
        let mut regions = RegionOverlayIndex::new();
        let mut block_locations = HashMap::new();

        for (page_index, page) in data.pages.into_iter().enumerate() {
            let page_labels =
                Self::load_classifications(&registry, &page.labels, LabelScope::Page)?;

            let mut blocks = Vec::with_capacity(page.blocks.len());
            for (block_index, block) in page.blocks.into_iter().enumerate() {
                if block_locations
                    .insert(block.id.clone(), (page_index, block_index))
                    .is_some()
                {
                    return Err(SchemaError::DuplicateBlockId { id: block.id });
                }

                let state = Self::load_block(&registry, page.page, block, &mut regions)?;
                blocks.push(state);
            }

            pages.push(PageState {
                number: page.page,
                status: page.label_status,
                labels: page_labels,
                blocks,
            });
        }

        tracing::info!(
            pages = pages.len(),
            blocks = block_locations.len(),
            "Loaded document"
        );

        Ok(Self {
            registry,
            status: data.label_status,
            labels,
            pages,
            regions,
            block_locations,
        })
    }

    fn load_classifications(
        registry: &LabelDefinitionRegistry,
        entries: &[ClassificationLabel],
        scope: LabelScope,
    ) -> Result<Vec<ClassificationLabel>, SchemaError> {
        let mut labels: Vec<ClassificationLabel> = Vec::with_capacity(entries.len());
        for entry in entries {
            let def = registry.require(&entry.name)?;
            if !def.kind.is_classification() || def.scope != scope {
                return Err(SchemaError::WrongKind {
                    name: entry.name.clone(),
                    expected: "classification",
                });
            }
            // Persisted lists may repeat a name; keep one.
            if !labels.iter().any(|l| l.name == entry.name) {
                labels.push(entry.clone());
            }
        }
        Ok(labels)
    }

    fn load_block(
        registry: &LabelDefinitionRegistry,
        page: u32,
        block: BlockData,
        regions: &mut RegionOverlayIndex,
    ) -> Result<BlockState, SchemaError> {
        let position = Region::new(
            block.position.left,
            block.position.top,
            block.position.width,
            block.position.height,
        )
        .map_err(|source| SchemaError::InvalidRegion {
            block: block.id.clone(),
            source,
        })?;
        regions.put(page, block.id.clone(), position);

        let content_len = block.content.chars().count();
        let mut spans = SpanIntervalIndex::new(content_len);
        let mut classifications: Vec<ClassificationLabel> = Vec::new();

        for entry in block.labels {
            match entry {
                BlockLabelEntry::Classification { name } => {
                    let def = registry.require(&name)?;
                    if !def.kind.is_classification() || def.scope != LabelScope::Block {
                        return Err(SchemaError::WrongKind {
                            name,
                            expected: "classification",
                        });
                    }
                    if !classifications.iter().any(|l| l.name == name) {
                        classifications.push(ClassificationLabel::new(name));
                    }
                }
                BlockLabelEntry::Span {
                    id,
                    name,
                    start,
                    end,
                } => {
                    let def = registry.require(&name)?;
                    if !def.kind.is_span() {
                        return Err(SchemaError::WrongKind {
                            name,
                            expected: "span-text",
                        });
                    }
                    if spans.get(&id).is_some() {
                        return Err(SchemaError::DuplicateSpanId {
                            block: block.id.clone(),
                            id,
                        });
                    }
                    spans
                        .insert(SpanLabel::with_id(id, name, start, end))
                        .map_err(|source| SchemaError::InvalidSpan {
                            block: block.id.clone(),
                            source,
                        })?;
                }
            }
        }

        let mut state = BlockState {
            id: block.id,
            content: block.content,
            status: block.label_status,
            position,
            classifications,
            spans,
            segments: Vec::new(),
            mode: BlockMode::Viewing,
        };
        state.repartition().map_err(|source| SchemaError::InvalidSpan {
            block: state.id.clone(),
            source,
        })?;
        Ok(state)
    }

    /// Serialize the current state back to the persisted schema.
    pub fn serialize(&self) -> DocumentPayload {
        DocumentPayload {
            data: DocumentData {
                label_status: self.status,
                labels: self.labels.clone(),
                pages: self
                    .pages
                    .iter()
                    .map(|page| PageData {
                        page: page.number,
                        label_status: page.status,
                        labels: page.labels.clone(),
                        blocks: page.blocks.iter().map(Self::serialize_block).collect(),
                    })
                    .collect(),
            },
        }
    }

    fn serialize_block(block: &BlockState) -> BlockData {
        let mut labels: Vec<BlockLabelEntry> = block
            .classifications
            .iter()
            .map(|l| BlockLabelEntry::Classification {
                name: l.name.clone(),
            })
            .collect();
        labels.extend(block.spans.iter().map(|s| BlockLabelEntry::Span {
            id: s.id.clone(),
            name: s.name.clone(),
            start: s.start,
            end: s.end,
        }));
        BlockData {
            id: block.id.clone(),
            content: block.content.clone(),
            label_status: block.status,
            position: block.position,
            labels,
        }
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Toggle a classification label on a document, page, or block.
    ///
    /// Exclusive-kind labels displace the other members of their scope's
    /// exclusive group before activating; multi-kind labels toggle freely.
    /// Returns whether the label is active afterwards.
    pub fn toggle_classification(
        &mut self,
        target: &LabelTarget,
        name: &str,
    ) -> Result<bool, ControllerError> {
        let def = self.registry.require(name)?;
        if !def.kind.is_classification() {
            return Err(ControllerError::KindMismatch {
                name: name.to_string(),
                expected: "classification",
            });
        }

        let expected_scope = match target {
            LabelTarget::Document => LabelScope::Document,
            LabelTarget::Page(_) => LabelScope::Page,
            LabelTarget::Block(_) => LabelScope::Block,
        };
        if def.scope != expected_scope {
            return Err(ControllerError::ScopeMismatch {
                name: name.to_string(),
            });
        }

        let exclusive = def.kind.is_exclusive();
        let group: Vec<String> = if exclusive {
            self.registry
                .exclusive_group(expected_scope)
                .into_iter()
                .map(String::from)
                .collect()
        } else {
            Vec::new()
        };

        let labels = match target {
            LabelTarget::Document => &mut self.labels,
            LabelTarget::Page(number) => {
                let page = self
                    .pages
                    .iter_mut()
                    .find(|p| p.number == *number)
                    .ok_or(ControllerError::UnknownPage(*number))?;
                &mut page.labels
            }
            LabelTarget::Block(id) => {
                let block = Self::block_mut(&mut self.pages, &self.block_locations, id)?;
                if block.mode == BlockMode::EditingText {
                    return Err(ControllerError::BlockEditing(id.clone()));
                }
                &mut block.classifications
            }
        };

        let was_active = labels.iter().any(|l| l.name == name);
        if was_active {
            labels.retain(|l| l.name != name);
            tracing::debug!(label = name, "Classification deactivated");
            return Ok(false);
        }

        if exclusive {
            labels.retain(|l| !group.iter().any(|g| g == &l.name));
        }
        labels.push(ClassificationLabel::new(name));
        tracing::debug!(label = name, exclusive, "Classification activated");
        Ok(true)
    }

    // =========================================================================
    // Span labels
    // =========================================================================

    /// Attach a span label to a block from a mapped selection.
    ///
    /// Requires a non-empty selection; a collapsed one fails with the empty
    /// selection error and changes nothing. Re-adding an identical
    /// (name, interval) pair is an idempotent success returning the existing
    /// label's id.
    pub fn add_span_label(
        &mut self,
        block_id: &str,
        name: &str,
        selection: &SelectionOffsets,
    ) -> Result<String, ControllerError> {
        let def = self.registry.require(name)?;
        if !def.kind.is_span() {
            return Err(ControllerError::KindMismatch {
                name: name.to_string(),
                expected: "span-text",
            });
        }
        if selection.start >= selection.end {
            return Err(ControllerError::Selection(SelectionError::Empty));
        }

        let block = Self::block_mut(&mut self.pages, &self.block_locations, block_id)?;
        if block.mode == BlockMode::EditingText {
            return Err(ControllerError::BlockEditing(block_id.to_string()));
        }

        if let Some(existing) = block
            .spans
            .iter()
            .find(|l| l.name == name && l.start == selection.start && l.end == selection.end)
        {
            return Ok(existing.id.clone());
        }

        let label = SpanLabel::new(name, selection.start, selection.end);
        let id = label.id.clone();
        block.spans.insert(label)?;
        block.repartition()?;
        tracing::debug!(
            block = block_id,
            label = name,
            start = selection.start,
            end = selection.end,
            "Span label added"
        );
        Ok(id)
    }

    /// Remove a span label by id and refresh the block's partition. Removing
    /// an absent id is a no-op.
    pub fn remove_span_label(
        &mut self,
        block_id: &str,
        span_id: &str,
    ) -> Result<(), ControllerError> {
        let block = Self::block_mut(&mut self.pages, &self.block_locations, block_id)?;
        block.spans.remove(span_id);
        block.repartition()?;
        Ok(())
    }

    // =========================================================================
    // Block editing
    // =========================================================================

    /// Put a block into text-editing mode.
    ///
    /// All of the block's span labels are discarded on entry; editing is
    /// destructive to span annotations.
    pub fn begin_edit(&mut self, block_id: &str) -> Result<(), ControllerError> {
        let block = Self::block_mut(&mut self.pages, &self.block_locations, block_id)?;
        if block.mode == BlockMode::EditingText {
            return Err(ControllerError::BlockEditing(block_id.to_string()));
        }
        let discarded = block.spans.len();
        block.spans.reset(block.spans.content_len());
        block.repartition()?;
        block.mode = BlockMode::EditingText;
        tracing::debug!(block = block_id, discarded, "Block entered text editing");
        Ok(())
    }

    /// Leave text-editing mode with the edited content.
    ///
    /// The content is trimmed and re-partitioned; the span list stays empty.
    pub fn commit_edit(&mut self, block_id: &str, edited: &str) -> Result<(), ControllerError> {
        let block = Self::block_mut(&mut self.pages, &self.block_locations, block_id)?;
        if block.mode != BlockMode::EditingText {
            return Err(ControllerError::BlockNotEditing(block_id.to_string()));
        }
        block.content = edited.trim().to_string();
        block.spans.reset(block.content.chars().count());
        block.repartition()?;
        block.mode = BlockMode::Viewing;
        tracing::debug!(block = block_id, "Block edit committed");
        Ok(())
    }

    // =========================================================================
    // Done status
    // =========================================================================

    /// Flip the done status of a document, page, or block.
    ///
    /// Orthogonal to the editing mode and to label data; allowed in any
    /// block mode. Returns the new status.
    pub fn toggle_done(&mut self, target: &LabelTarget) -> Result<LabelStatus, ControllerError> {
        let status = match target {
            LabelTarget::Document => {
                self.status = self.status.toggled();
                self.status
            }
            LabelTarget::Page(number) => {
                let page = self
                    .pages
                    .iter_mut()
                    .find(|p| p.number == *number)
                    .ok_or(ControllerError::UnknownPage(*number))?;
                page.status = page.status.toggled();
                page.status
            }
            LabelTarget::Block(id) => {
                let block = Self::block_mut(&mut self.pages, &self.block_locations, id)?;
                block.status = block.status.toggled();
                block.status
            }
        };
        Ok(status)
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn document_status(&self) -> LabelStatus {
        self.status
    }

    /// Document-level classification labels.
    pub fn document_labels(&self) -> &[ClassificationLabel] {
        &self.labels
    }

    /// A page's classification labels and status.
    pub fn page_labels(&self, number: u32) -> Option<&[ClassificationLabel]> {
        self.pages
            .iter()
            .find(|p| p.number == number)
            .map(|p| p.labels.as_slice())
    }

    pub fn block(&self, block_id: &str) -> Option<&BlockState> {
        let &(page, index) = self.block_locations.get(block_id)?;
        Some(&self.pages[page].blocks[index])
    }

    /// The page region overlay, for render adapters.
    pub fn regions(&self) -> &RegionOverlayIndex {
        &self.regions
    }

    /// Route a click on a page image to a block id.
    pub fn hit_test(&self, page: u32, x: f64, y: f64) -> Option<&str> {
        self.regions.hit_test(page, x, y)
    }

    /// A block's partition joined with display colors, ready to draw.
    pub fn render_segments(&self, block_id: &str) -> Result<Vec<RenderSegment>, ControllerError> {
        let block = self
            .block(block_id)
            .ok_or_else(|| ControllerError::UnknownBlock(block_id.to_string()))?;

        Ok(block
            .segments
            .iter()
            .map(|seg| {
                let (fill, text_color) = if seg.covering.is_empty() {
                    (None, None)
                } else {
                    let colors: Vec<&str> = seg
                        .covering
                        .iter()
                        .filter_map(|name| self.registry.get(name))
                        .map(|def| def.color.as_str())
                        .collect();
                    let fill = color::blend(&colors);
                    let text_color = color::contrast_text_color(&fill, 1.0);
                    (Some(fill), Some(text_color))
                };
                RenderSegment {
                    start: seg.start,
                    end: seg.end,
                    text: char_slice(&block.content, seg.start, seg.end).to_string(),
                    covering: seg.covering.clone(),
                    fill,
                    text_color,
                }
            })
            .collect())
    }

    /// Done-block count over the whole document.
    pub fn progress(&self) -> Progress {
        let mut done_blocks = 0;
        let mut total_blocks = 0;
        for page in &self.pages {
            for block in &page.blocks {
                total_blocks += 1;
                if block.status.is_done() {
                    done_blocks += 1;
                }
            }
        }
        Progress {
            done_blocks,
            total_blocks,
        }
    }

    fn block_mut<'a>(
        pages: &'a mut [PageState],
        locations: &HashMap<String, (usize, usize)>,
        block_id: &str,
    ) -> Result<&'a mut BlockState, ControllerError> {
        let &(page, index) = locations
            .get(block_id)
            .ok_or_else(|| ControllerError::UnknownBlock(block_id.to_string()))?;
        Ok(&mut pages[page].blocks[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{LabelDefinition, LabelKind};
    use crate::schema::DefinitionsPayload;

    fn definition(name: &str, color: &str, kind: LabelKind, scope: LabelScope) -> LabelDefinition {
        LabelDefinition {
            name: name.to_string(),
            color: color.to_string(),
            kind,
            scope,
        }
    }

    fn registry() -> LabelDefinitionRegistry {
        LabelDefinitionRegistry::from_payload(DefinitionsPayload {
            label_definitions: vec![
                definition(
                    "lang-en",
                    "#ff0000",
                    LabelKind::ClassificationSingle,
                    LabelScope::Document,
                ),
                definition(
                    "lang-de",
                    "#00ff00",
                    LabelKind::ClassificationSingle,
                    LabelScope::Document,
                ),
                definition(
                    "kind-a",
                    "#112233",
                    LabelKind::ClassificationSingle,
                    LabelScope::Block,
                ),
                definition(
                    "kind-b",
                    "#445566",
                    LabelKind::ClassificationSingle,
                    LabelScope::Block,
                ),
                definition(
                    "topic",
                    "#778899",
                    LabelKind::ClassificationMultiple,
                    LabelScope::Block,
                ),
                definition("term", "#ff0000", LabelKind::Text, LabelScope::Block),
                definition("quote", "#0000ff", LabelKind::Text, LabelScope::Block),
            ],
        })
        .unwrap()
    }

    fn block(id: &str, content: &str, labels: Vec<BlockLabelEntry>) -> BlockData {
        BlockData {
            id: id.to_string(),
            content: content.to_string(),
            label_status: LabelStatus::Open,
            position: Region::new(0.1, 0.1, 0.3, 0.1).unwrap(),
            labels,
        }
    }

    fn payload(blocks: Vec<BlockData>) -> DocumentPayload {
        DocumentPayload {
            data: DocumentData {
                label_status: LabelStatus::Open,
                labels: vec![],
                pages: vec![PageData {
                    page: 1,
                    label_status: LabelStatus::Open,
                    labels: vec![],
                    blocks,
                }],
            },
        }
    }

    fn controller_with(blocks: Vec<BlockData>) -> AnnotationController {
        AnnotationController::load(registry(), payload(blocks)).unwrap()
    }

    fn selection(start: usize, end: usize, text: &str) -> SelectionOffsets {
        SelectionOffsets {
            start,
            end,
            text: text.to_string(),
            prefix: None,
            suffix: None,
        }
    }

    fn span_entry(id: &str, name: &str, start: usize, end: usize) -> BlockLabelEntry {
        BlockLabelEntry::Span {
            id: id.to_string(),
            name: name.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_load_builds_partitions_and_regions() {
        let controller = controller_with(vec![block(
            "7",
            "Hello World",
            vec![span_entry("s1", "term", 0, 5), span_entry("s2", "quote", 6, 11)],
        )]);

        let segments = controller.block("7").unwrap().segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].covering.len(), 0);
        assert_eq!(controller.hit_test(1, 0.2, 0.15), Some("7"));
        assert_eq!(controller.hit_test(1, 0.9, 0.9), None);
    }

    #[test]
    fn test_load_rejects_unknown_label() {
        let err = AnnotationController::load(
            registry(),
            payload(vec![block(
                "7",
                "Hello",
                vec![BlockLabelEntry::Classification {
                    name: "nope".to_string(),
                }],
            )]),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownLabel { .. }));
    }

    #[test]
    fn test_load_rejects_out_of_bounds_span() {
        let err = AnnotationController::load(
            registry(),
            payload(vec![block("7", "Hi", vec![span_entry("s1", "term", 0, 5)])]),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSpan { .. }));
    }

    #[test]
    fn test_load_rejects_duplicate_span_ids() {
        let err = AnnotationController::load(
            registry(),
            payload(vec![block(
                "7",
                "Hello World",
                vec![span_entry("s1", "term", 0, 5), span_entry("s1", "quote", 6, 11)],
            )]),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSpanId { .. }));
    }

    #[test]
    fn test_load_rejects_duplicate_block_ids() {
        let err = AnnotationController::load(
            registry(),
            payload(vec![block("7", "a", vec![]), block("7", "b", vec![])]),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateBlockId { .. }));
    }

    #[test]
    fn test_serialize_round_trip() {
        let original = payload(vec![block(
            "7",
            "Hello World",
            vec![
                BlockLabelEntry::Classification {
                    name: "topic".to_string(),
                },
                span_entry("s1", "term", 0, 5),
            ],
        )]);
        let controller = AnnotationController::load(registry(), original.clone()).unwrap();
        assert_eq!(controller.serialize(), original);
    }

    #[test]
    fn test_add_span_label_repartitions() {
        let mut controller = controller_with(vec![block("7", "Hello World", vec![])]);
        controller
            .add_span_label("7", "term", &selection(0, 5, "Hello"))
            .unwrap();
        controller
            .add_span_label("7", "quote", &selection(6, 11, "World"))
            .unwrap();

        let segments = controller.block("7").unwrap().segments();
        assert_eq!(segments.len(), 3);
        assert!(segments[0].covering.contains("term"));
        assert!(segments[1].is_plain());
        assert!(segments[2].covering.contains("quote"));
    }

    #[test]
    fn test_add_span_label_empty_selection_changes_nothing() {
        let mut controller = controller_with(vec![block("7", "Hello World", vec![])]);
        let err = controller
            .add_span_label("7", "term", &selection(4, 4, ""))
            .unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Selection(SelectionError::Empty)
        ));
        assert_eq!(controller.block("7").unwrap().span_labels().count(), 0);
    }

    #[test]
    fn test_add_span_label_duplicate_is_idempotent() {
        let mut controller = controller_with(vec![block("7", "Hello World", vec![])]);
        let first = controller
            .add_span_label("7", "term", &selection(0, 5, "Hello"))
            .unwrap();
        let second = controller
            .add_span_label("7", "term", &selection(0, 5, "Hello"))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(controller.block("7").unwrap().span_labels().count(), 1);
    }

    #[test]
    fn test_add_span_label_requires_span_kind() {
        let mut controller = controller_with(vec![block("7", "Hello", vec![])]);
        let err = controller
            .add_span_label("7", "topic", &selection(0, 3, "Hel"))
            .unwrap_err();
        assert!(matches!(err, ControllerError::KindMismatch { .. }));
    }

    #[test]
    fn test_remove_span_label() {
        let mut controller = controller_with(vec![block(
            "7",
            "Hello World",
            vec![span_entry("s1", "term", 0, 5)],
        )]);
        controller.remove_span_label("7", "s1").unwrap();
        assert_eq!(controller.block("7").unwrap().span_labels().count(), 0);
        assert_eq!(controller.block("7").unwrap().segments().len(), 1);

        // Absent ids are a no-op.
        controller.remove_span_label("7", "missing").unwrap();
    }

    #[test]
    fn test_edit_discards_spans_and_repartitions() {
        let mut controller = controller_with(vec![block(
            "7",
            "Hello World",
            vec![
                span_entry("s1", "term", 0, 5),
                span_entry("s2", "quote", 6, 11),
                span_entry("s3", "term", 2, 8),
            ],
        )]);

        controller.begin_edit("7").unwrap();
        assert_eq!(controller.block("7").unwrap().span_labels().count(), 0);
        assert_eq!(controller.block("7").unwrap().mode(), BlockMode::EditingText);

        controller.commit_edit("7", "  Fresh text  ").unwrap();
        let block = controller.block("7").unwrap();
        assert_eq!(block.content(), "Fresh text");
        assert_eq!(block.mode(), BlockMode::Viewing);
        assert_eq!(block.span_labels().count(), 0);

        let segments = block.segments();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_plain());
        assert_eq!((segments[0].start, segments[0].end), (0, 10));
    }

    #[test]
    fn test_edit_mode_guards() {
        let mut controller = controller_with(vec![block("7", "Hello", vec![])]);

        assert!(matches!(
            controller.commit_edit("7", "x"),
            Err(ControllerError::BlockNotEditing(_))
        ));

        controller.begin_edit("7").unwrap();
        assert!(matches!(
            controller.begin_edit("7"),
            Err(ControllerError::BlockEditing(_))
        ));
        assert!(matches!(
            controller.add_span_label("7", "term", &selection(0, 2, "He")),
            Err(ControllerError::BlockEditing(_))
        ));
        assert!(matches!(
            controller.toggle_classification(&LabelTarget::Block("7".to_string()), "topic"),
            Err(ControllerError::BlockEditing(_))
        ));
    }

    #[test]
    fn test_exclusive_classification_displaces_group() {
        let mut controller = controller_with(vec![block("7", "Hello", vec![])]);
        let target = LabelTarget::Block("7".to_string());

        assert!(controller.toggle_classification(&target, "kind-a").unwrap());
        assert!(controller.toggle_classification(&target, "kind-b").unwrap());

        let names: Vec<&str> = controller
            .block("7")
            .unwrap()
            .classifications()
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, ["kind-b"]);
    }

    #[test]
    fn test_exclusive_leaves_multi_labels_alone() {
        let mut controller = controller_with(vec![block("7", "Hello", vec![])]);
        let target = LabelTarget::Block("7".to_string());

        controller.toggle_classification(&target, "topic").unwrap();
        controller.toggle_classification(&target, "kind-a").unwrap();
        controller.toggle_classification(&target, "kind-b").unwrap();

        let names: Vec<&str> = controller
            .block("7")
            .unwrap()
            .classifications()
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, ["topic", "kind-b"]);
    }

    #[test]
    fn test_multi_classification_toggles_off() {
        let mut controller = controller_with(vec![block("7", "Hello", vec![])]);
        let target = LabelTarget::Block("7".to_string());

        assert!(controller.toggle_classification(&target, "topic").unwrap());
        assert!(!controller.toggle_classification(&target, "topic").unwrap());
        assert!(controller.block("7").unwrap().classifications().is_empty());
    }

    #[test]
    fn test_document_scope_exclusive() {
        let mut controller = controller_with(vec![block("7", "Hello", vec![])]);

        controller
            .toggle_classification(&LabelTarget::Document, "lang-en")
            .unwrap();
        controller
            .toggle_classification(&LabelTarget::Document, "lang-de")
            .unwrap();

        let names: Vec<&str> = controller
            .document_labels()
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, ["lang-de"]);
    }

    #[test]
    fn test_scope_mismatch_is_rejected() {
        let mut controller = controller_with(vec![block("7", "Hello", vec![])]);
        let err = controller
            .toggle_classification(&LabelTarget::Document, "topic")
            .unwrap_err();
        assert!(matches!(err, ControllerError::ScopeMismatch { .. }));
    }

    #[test]
    fn test_toggle_done_is_orthogonal() {
        let mut controller = controller_with(vec![block(
            "7",
            "Hello World",
            vec![span_entry("s1", "term", 0, 5)],
        )]);
        let target = LabelTarget::Block("7".to_string());

        assert_eq!(
            controller.toggle_done(&target).unwrap(),
            LabelStatus::Done
        );
        // Span labels untouched by the status flip.
        assert_eq!(controller.block("7").unwrap().span_labels().count(), 1);
        assert_eq!(controller.toggle_done(&target).unwrap(), LabelStatus::Open);

        // Allowed mid-edit as well.
        controller.begin_edit("7").unwrap();
        assert_eq!(controller.toggle_done(&target).unwrap(), LabelStatus::Done);
    }

    #[test]
    fn test_render_segments_blend_colors() {
        let mut controller = controller_with(vec![block("7", "Hello World", vec![])]);
        controller
            .add_span_label("7", "term", &selection(0, 8, "Hello Wo"))
            .unwrap();
        controller
            .add_span_label("7", "quote", &selection(4, 11, "o World"))
            .unwrap();

        let rendered = controller.render_segments("7").unwrap();
        assert_eq!(rendered.len(), 3);

        assert_eq!(rendered[0].text, "Hell");
        assert_eq!(rendered[0].fill.as_deref(), Some("#ff0000"));

        // Overlap blends red and blue to purple.
        assert_eq!(rendered[1].fill.as_deref(), Some("#800080"));
        assert_eq!(rendered[1].text_color, Some("#ffffff"));

        // Concatenation reproduces the content.
        let joined: String = rendered.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, "Hello World");
    }

    #[test]
    fn test_progress_counts_done_blocks() {
        let mut controller =
            controller_with(vec![block("a", "one", vec![]), block("b", "two", vec![])]);
        assert_eq!(
            controller.progress(),
            Progress {
                done_blocks: 0,
                total_blocks: 2
            }
        );
        controller
            .toggle_done(&LabelTarget::Block("a".to_string()))
            .unwrap();
        assert_eq!(controller.progress().done_blocks, 1);
    }
}
