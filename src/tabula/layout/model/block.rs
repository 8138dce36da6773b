use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tabula::layout::error::{LayoutError, Result};

/// Semantic type name of a block, e.g. `header` or `data`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockType(String);

impl BlockType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Confidence-ranked candidate types of a block.
///
/// The distribution is never empty and every confidence is finite, so
/// [`best_type`](Self::best_type) cannot fail once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTypeDistribution {
    candidates: Vec<(BlockType, f64)>,
    best: usize,
}

impl BlockTypeDistribution {
    /// Builds a distribution from `(type, confidence)` pairs.
    ///
    /// When several candidates share the highest confidence the earliest one
    /// wins.
    pub fn new(candidates: Vec<(BlockType, f64)>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(LayoutError::InvalidBlockType(
                "no candidate types".to_string(),
            ));
        }
        if let Some((block_type, confidence)) = candidates
            .iter()
            .find(|(_, confidence)| !confidence.is_finite())
        {
            return Err(LayoutError::InvalidBlockType(format!(
                "confidence {confidence} for '{block_type}' is not finite"
            )));
        }

        let mut best = 0;
        for (index, (_, confidence)) in candidates.iter().enumerate().skip(1) {
            if *confidence > candidates[best].1 {
                best = index;
            }
        }

        Ok(Self { candidates, best })
    }

    /// A distribution holding a single type with full confidence.
    pub fn certain(block_type: impl Into<BlockType>) -> Self {
        Self {
            candidates: vec![(block_type.into(), 1.0)],
            best: 0,
        }
    }

    /// Collapses the distribution to its highest-confidence type.
    pub fn best_type(&self) -> &BlockType {
        &self.candidates[self.best].0
    }

    pub fn candidates(&self) -> &[(BlockType, f64)] {
        &self.candidates
    }
}

/// Position of a block in the extractor's output for one sheet. Blocks are
/// referred to by this id wherever identity matters (labels, graph nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

impl BlockId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A rectangular region of a sheet. Row and column bounds are zero-based and
/// inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    top_row: usize,
    bottom_row: usize,
    left_col: usize,
    right_col: usize,
    block_type: BlockTypeDistribution,
}

impl Block {
    /// Creates a block, rejecting inverted bounds.
    pub fn new(
        top_row: usize,
        bottom_row: usize,
        left_col: usize,
        right_col: usize,
        block_type: BlockTypeDistribution,
    ) -> Result<Self> {
        if top_row > bottom_row || left_col > right_col {
            return Err(LayoutError::InvalidBlock {
                top: top_row,
                bottom: bottom_row,
                left: left_col,
                right: right_col,
            });
        }
        Ok(Self {
            top_row,
            bottom_row,
            left_col,
            right_col,
            block_type,
        })
    }

    pub fn top_row(&self) -> usize {
        self.top_row
    }

    pub fn bottom_row(&self) -> usize {
        self.bottom_row
    }

    pub fn left_col(&self) -> usize {
        self.left_col
    }

    pub fn right_col(&self) -> usize {
        self.right_col
    }

    pub fn block_type(&self) -> &BlockTypeDistribution {
        &self.block_type
    }

    pub fn best_type(&self) -> &BlockType {
        self.block_type.best_type()
    }

    fn rows_overlap(&self, other: &Block) -> bool {
        self.top_row <= other.bottom_row && other.top_row <= self.bottom_row
    }

    fn cols_overlap(&self, other: &Block) -> bool {
        self.left_col <= other.right_col && other.left_col <= self.right_col
    }

    /// Stacked blocks: they share at least one column and no row.
    pub fn are_blocks_vertical(&self, other: &Block) -> bool {
        self.cols_overlap(other) && !self.rows_overlap(other)
    }

    /// Side-by-side blocks: they share at least one row and no column.
    pub fn are_blocks_horizontal(&self, other: &Block) -> bool {
        self.rows_overlap(other) && !self.cols_overlap(other)
    }

    /// Region descriptor in the `top..bottom, left..right` form.
    pub fn region(&self) -> String {
        format!(
            "{}..{}, {}..{}",
            self.top_row, self.bottom_row, self.left_col, self.right_col
        )
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.best_type(), self.region())
    }
}
