use std::any::Any;
use std::error::Error as _;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, error, instrument, warn};

use crate::tabula::layout::error::{Result, Stage, StageError, StageResult};
use crate::tabula::layout::io::sheet_read;
use crate::tabula::layout::model::{Block, LayoutGraph, Sheet, Tags};
use crate::tabula::layout::stages::{BlockExtractor, CellClassifier, LayoutDetector};

/// Index-aligned results of running the pipeline over every sheet of a file.
///
/// Each vector holds exactly one entry per input sheet, in input order.
#[derive(Debug, Default)]
pub struct SheetLayouts {
    pub sheets: Vec<Sheet>,
    pub tags: Vec<Tags>,
    pub blocks: Vec<Vec<Block>>,
    pub layouts: Vec<Option<LayoutGraph>>,
    /// The stage failure that cut a sheet's analysis short, if any.
    pub failures: Vec<Option<StageError>>,
}

impl SheetLayouts {
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    fn push(
        &mut self,
        sheet: Sheet,
        tags: Tags,
        blocks: Vec<Block>,
        layout: Option<LayoutGraph>,
        failure: Option<StageError>,
    ) {
        self.sheets.push(sheet);
        self.tags.push(tags);
        self.blocks.push(blocks);
        self.layouts.push(layout);
        self.failures.push(failure);
    }
}

/// Runs classification, block extraction, and layout detection over each
/// sheet of a file, isolating failures per sheet.
pub struct EndToEnd {
    cell_classifier: Box<dyn CellClassifier>,
    block_extractor: Box<dyn BlockExtractor>,
    layout_detector: Box<dyn LayoutDetector>,
}

impl EndToEnd {
    pub fn new(
        cell_classifier: impl CellClassifier + 'static,
        block_extractor: impl BlockExtractor + 'static,
        layout_detector: impl LayoutDetector + 'static,
    ) -> Self {
        Self::from_boxed(
            Box::new(cell_classifier),
            Box::new(block_extractor),
            Box::new(layout_detector),
        )
    }

    pub fn from_boxed(
        cell_classifier: Box<dyn CellClassifier>,
        block_extractor: Box<dyn BlockExtractor>,
        layout_detector: Box<dyn LayoutDetector>,
    ) -> Self {
        Self {
            cell_classifier,
            block_extractor,
            layout_detector,
        }
    }

    /// Reads every sheet of `path` and analyses them. Reader failures
    /// propagate; stage failures do not.
    #[instrument(level = "debug", skip_all, fields(input = %path.display()))]
    pub fn get_layout_from_file(&self, path: &Path) -> Result<SheetLayouts> {
        let sheets = sheet_read::read_sheets(path)?;
        Ok(self.get_layout(sheets))
    }

    /// Analyses each sheet in turn. A sheet whose stage fails keeps the
    /// results produced before the failure and the defaults for the rest.
    pub fn get_layout<I>(&self, sheets: I) -> SheetLayouts
    where
        I: IntoIterator<Item = Sheet>,
    {
        let start = Instant::now();
        let mut results = SheetLayouts::default();

        for (sheet_index, sheet) in sheets.into_iter().enumerate() {
            let mut tags = Tags::default();
            let mut blocks = Vec::new();
            let mut layout = None;

            let failure = self
                .analyse_sheet(sheet_index, &sheet, &mut tags, &mut blocks, &mut layout)
                .err();
            if let Some(failure) = &failure {
                report_failure(sheet_index, failure);
            }

            results.push(sheet, tags, blocks, layout, failure);
        }

        debug!(
            sheet_count = results.len(),
            elapsed = ?start.elapsed(),
            "time taken to process sheets"
        );
        results
    }

    fn analyse_sheet(
        &self,
        sheet_index: usize,
        sheet: &Sheet,
        tags: &mut Tags,
        blocks: &mut Vec<Block>,
        layout: &mut Option<LayoutGraph>,
    ) -> std::result::Result<(), StageError> {
        match sheet.name() {
            Some(name) => debug!(sheet_index, sheet = name, "processing sheet"),
            None => warn!(sheet_index, "sheet meta is undefined"),
        }

        *tags = run_stage(Stage::Classify, || self.cell_classifier.classify_cells(sheet))?;
        debug!(sheet_index, rows = tags.rows().len(), "cells classified");

        *blocks = run_stage(Stage::ExtractBlocks, || {
            self.block_extractor.extract_blocks(sheet, tags)
        })?;
        debug!(sheet_index, block_count = blocks.len(), "blocks extracted");

        *layout = run_stage(Stage::DetectLayout, || {
            self.layout_detector.detect_layout(sheet, tags, blocks)
        })?;
        debug!(sheet_index, detected = layout.is_some(), "layout detected");

        Ok(())
    }
}

fn run_stage<T>(
    stage: Stage,
    call: impl FnOnce() -> StageResult<T>,
) -> std::result::Result<T, StageError> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(StageError::from_stage(stage, source)),
        Err(payload) => Err(StageError::Panicked {
            stage,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// Returned errors carry no origin trace. A panicking stage prints its own
// location through the panic hook, with a backtrace when RUST_BACKTRACE is set.
fn report_failure(sheet_index: usize, failure: &StageError) {
    error!(
        sheet_index,
        stage = %failure.stage(),
        error = %failure,
        "sheet analysis failed"
    );

    // The top-level message already embeds the direct source.
    let mut cause = failure.source().and_then(|source| source.source());
    while let Some(inner) = cause {
        error!(sheet_index, cause = %inner, "caused by");
        cause = inner.source();
    }
}
