//! Contracts of the three analysis stages driven by the pipeline.
//!
//! Implementations live outside this crate; any closure with the matching
//! signature also implements the corresponding trait.

use crate::tabula::layout::error::StageResult;
use crate::tabula::layout::model::{Block, LayoutGraph, Sheet, Tags};

/// Assigns a tag to every cell of a sheet.
pub trait CellClassifier {
    fn classify_cells(&self, sheet: &Sheet) -> StageResult<Tags>;
}

/// Groups classified cells into rectangular blocks.
pub trait BlockExtractor {
    fn extract_blocks(&self, sheet: &Sheet, tags: &Tags) -> StageResult<Vec<Block>>;
}

/// Infers relations between blocks. `Ok(None)` means no layout could be
/// derived for the sheet.
pub trait LayoutDetector {
    fn detect_layout(
        &self,
        sheet: &Sheet,
        tags: &Tags,
        blocks: &[Block],
    ) -> StageResult<Option<LayoutGraph>>;
}

impl<F> CellClassifier for F
where
    F: Fn(&Sheet) -> StageResult<Tags>,
{
    fn classify_cells(&self, sheet: &Sheet) -> StageResult<Tags> {
        self(sheet)
    }
}

impl<F> BlockExtractor for F
where
    F: Fn(&Sheet, &Tags) -> StageResult<Vec<Block>>,
{
    fn extract_blocks(&self, sheet: &Sheet, tags: &Tags) -> StageResult<Vec<Block>> {
        self(sheet, tags)
    }
}

impl<F> LayoutDetector for F
where
    F: Fn(&Sheet, &Tags, &[Block]) -> StageResult<Option<LayoutGraph>>,
{
    fn detect_layout(
        &self,
        sheet: &Sheet,
        tags: &Tags,
        blocks: &[Block],
    ) -> StageResult<Option<LayoutGraph>> {
        self(sheet, tags, blocks)
    }
}
