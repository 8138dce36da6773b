//! Conversion of a sheet's blocks and layout graph into a YAML annotation.
//!
//! Every block receives a label `<best type><n>`, where `n` counts earlier
//! blocks of the same best type in list order. Variables map each label to
//! the block's region; alignments record, for every layout edge, the
//! dimension along which the two blocks line up.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tabula::layout::error::{LayoutError, Result};
use crate::tabula::layout::io::annotation_write;
use crate::tabula::layout::model::{Block, BlockType, FileType, LayoutGraph};

/// Default schema version written into new annotations.
pub const ANNOTATION_VERSION: u32 = 1;

const DIMENSION_MAPPING: &str = "dimension";

/// Region descriptor stored under a label in `variables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "ObservationData")]
    pub observation_data: String,
}

/// One derived alignment fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// The persisted annotation record of one sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub version: String,
    pub resources: FileType,
    pub variables: BTreeMap<String, Region>,
    pub alignments: Vec<Alignment>,
    /// Reserved; always empty.
    pub preprocessing: Vec<serde_yaml::Value>,
}

impl Annotation {
    fn empty(file_type: FileType, version: u32) -> Self {
        Self {
            version: version.to_string(),
            resources: file_type,
            variables: BTreeMap::new(),
            alignments: Vec::new(),
            preprocessing: Vec::new(),
        }
    }
}

/// Geometric relation between the two endpoints of a layout edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentDimension {
    /// Side by side, sharing a row band.
    Horizontal,
    /// Stacked, sharing a column band.
    Vertical,
    /// Neither stacked nor side by side.
    Unaligned,
}

impl AlignmentDimension {
    /// Classifies a pair of blocks, testing the vertical relation first.
    pub fn between(source: &Block, target: &Block) -> Self {
        if source.are_blocks_vertical(target) {
            AlignmentDimension::Vertical
        } else if source.are_blocks_horizontal(target) {
            AlignmentDimension::Horizontal
        } else {
            AlignmentDimension::Unaligned
        }
    }

    /// Numeric code used in alignment values.
    pub fn code(self) -> i8 {
        match self {
            AlignmentDimension::Horizontal => 0,
            AlignmentDimension::Vertical => 1,
            AlignmentDimension::Unaligned => -1,
        }
    }
}

impl fmt::Display for AlignmentDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Labels assigned to a block list, indexed like the list itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockLabels {
    labels: Vec<String>,
}

impl BlockLabels {
    /// Assigns `<best type><n>` labels in list order.
    ///
    /// Two distinct blocks may not end up with the same label string (type
    /// `a` at count 10 and type `a1` at count 0 both spell `a10`); that case
    /// is rejected with [`LayoutError::DuplicateLabel`].
    pub fn assign(blocks: &[Block]) -> Result<Self> {
        let mut counters: HashMap<&BlockType, usize> = HashMap::new();
        let mut owners: HashMap<String, usize> = HashMap::new();
        let mut labels = Vec::with_capacity(blocks.len());

        for (index, block) in blocks.iter().enumerate() {
            let block_type = block.best_type();
            let counter = counters.entry(block_type).or_insert(0);
            let label = format!("{block_type}{counter}");
            *counter += 1;

            if let Some(first) = owners.insert(label.clone(), index) {
                return Err(LayoutError::DuplicateLabel {
                    label,
                    first,
                    second: index,
                });
            }
            labels.push(label);
        }

        Ok(Self { labels })
    }

    /// Label of the block at `index` in the labelled list.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

/// Builds the annotation of a single sheet.
///
/// An annotator owns its record; create one per sheet.
#[derive(Debug, Clone)]
pub struct YamlAnnotator {
    annotation: Annotation,
}

impl YamlAnnotator {
    /// Creates an annotator writing the default schema version.
    pub fn new(file_type: FileType) -> Self {
        Self::with_version(file_type, ANNOTATION_VERSION)
    }

    pub fn with_version(file_type: FileType, version: u32) -> Self {
        Self {
            annotation: Annotation::empty(file_type, version),
        }
    }

    /// The record built so far.
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    pub fn into_annotation(self) -> Annotation {
        self.annotation
    }

    /// Labels `blocks` and records their regions under those labels.
    pub fn add_layouts(&mut self, blocks: &[Block]) -> Result<BlockLabels> {
        let labels = BlockLabels::assign(blocks)?;
        for (label, block) in labels.iter().zip(blocks) {
            self.add_layout(label, block);
        }
        Ok(labels)
    }

    fn add_layout(&mut self, label: &str, block: &Block) {
        self.annotation.variables.insert(
            label.to_string(),
            Region {
                observation_data: block.region(),
            },
        );
    }

    /// Appends one alignment per layout edge, in ascending source node
    /// order and then edge order. Nothing is appended if any edge refers to
    /// an unknown node or block.
    pub fn add_mappings(
        &mut self,
        layout: &LayoutGraph,
        blocks: &[Block],
        labels: &BlockLabels,
    ) -> Result<()> {
        let alignments = build_mappings(layout, blocks, labels)?;
        self.annotation.alignments.extend(alignments);
        Ok(())
    }

    /// Labels the blocks, derives alignments from `layout`, and returns the
    /// completed record. On error the record is left untouched.
    pub fn get_annotation(&mut self, blocks: &[Block], layout: &LayoutGraph) -> Result<&Annotation> {
        let labels = BlockLabels::assign(blocks)?;
        let alignments = build_mappings(layout, blocks, &labels)?;

        for (label, block) in labels.iter().zip(blocks) {
            self.add_layout(label, block);
        }
        self.annotation.alignments.extend(alignments);
        Ok(&self.annotation)
    }

    /// Writes `annotation` to `path`, replacing any existing file.
    pub fn write_yaml(&self, annotation: &Annotation, path: &Path) -> Result<()> {
        annotation_write::write_annotation(path, annotation)
    }
}

fn build_mappings(
    layout: &LayoutGraph,
    blocks: &[Block],
    labels: &BlockLabels,
) -> Result<Vec<Alignment>> {
    let mut alignments = Vec::with_capacity(layout.edge_count());
    for (source, edge) in layout.edges() {
        debug!(source, target = edge.target, relation = %edge.relation, "adding mapping");
        let (source_label, source_block) = resolve_node(layout, blocks, labels, source)?;
        let (target_label, target_block) = resolve_node(layout, blocks, labels, edge.target)?;
        alignments.push(mapping(source_label, source_block, target_label, target_block));
    }
    Ok(alignments)
}

fn mapping(label1: &str, block1: &Block, label2: &str, block2: &Block) -> Alignment {
    let dimension = AlignmentDimension::between(block1, block2);
    Alignment {
        kind: DIMENSION_MAPPING.to_string(),
        value: format!("{label1}:{dimension} <-> {label2}:{dimension}"),
    }
}

fn resolve_node<'a>(
    layout: &LayoutGraph,
    blocks: &'a [Block],
    labels: &'a BlockLabels,
    node: usize,
) -> Result<(&'a str, &'a Block)> {
    let block_id = layout
        .nodes()
        .get(node)
        .ok_or_else(|| LayoutError::InvalidGraph(format!("node {node} does not exist")))?;
    let index = block_id.index();
    match (labels.get(index), blocks.get(index)) {
        (Some(label), Some(block)) => Ok((label, block)),
        _ => Err(LayoutError::InvalidGraph(format!(
            "node {node} refers to unknown block {index}"
        ))),
    }
}
