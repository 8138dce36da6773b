use std::fmt;

use tabula_layout::error::{Stage, StageError, StageResult};
use tabula_layout::model::{Block, BlockTypeDistribution, CellValue, LayoutGraph, Sheet, Tags};
use tabula_layout::pipeline::EndToEnd;
use tabula_layout::stages::{BlockExtractor, CellClassifier, LayoutDetector};

#[derive(Debug)]
struct StageFailure(&'static str);

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for StageFailure {}

/// Tags every sheet with its own name so results can be traced back.
struct NameClassifier;

impl CellClassifier for NameClassifier {
    fn classify_cells(&self, sheet: &Sheet) -> StageResult<Tags> {
        let name = sheet.name().unwrap_or_default().to_string();
        Ok(Tags::new(vec![vec![name]]))
    }
}

/// One data block per sheet, failing on the sheet with the given name.
struct SingleBlockExtractor {
    fail_on: Option<&'static str>,
}

impl BlockExtractor for SingleBlockExtractor {
    fn extract_blocks(&self, sheet: &Sheet, _tags: &Tags) -> StageResult<Vec<Block>> {
        if fails_on(self.fail_on, sheet) {
            return Err(Box::new(StageFailure("no blocks")));
        }
        let block =
            Block::new(0, 1, 0, 1, BlockTypeDistribution::certain("data")).expect("valid block");
        Ok(vec![block])
    }
}

struct GraphDetector {
    fail_on: Option<&'static str>,
}

impl LayoutDetector for GraphDetector {
    fn detect_layout(
        &self,
        sheet: &Sheet,
        _tags: &Tags,
        blocks: &[Block],
    ) -> StageResult<Option<LayoutGraph>> {
        if fails_on(self.fail_on, sheet) {
            return Err(Box::new(StageFailure("no layout")));
        }
        Ok(Some(LayoutGraph::over_blocks(blocks.len())))
    }
}

/// Only a named target fails; unnamed sheets (CSV input) never match.
fn fails_on(target: Option<&str>, sheet: &Sheet) -> bool {
    matches!((target, sheet.name()), (Some(target), Some(name)) if target == name)
}

fn sheets(names: &[&str]) -> Vec<Sheet> {
    names
        .iter()
        .map(|name| Sheet::named(*name, vec![vec![CellValue::Text((*name).to_string())]]))
        .collect()
}

#[test]
fn extraction_failure_is_isolated_to_its_sheet() {
    let pipeline = EndToEnd::new(
        NameClassifier,
        SingleBlockExtractor { fail_on: Some("s2") },
        GraphDetector { fail_on: None },
    );

    let results = pipeline.get_layout(sheets(&["s0", "s1", "s2", "s3"]));

    assert_eq!(results.len(), 4);
    assert_eq!(results.tags.len(), 4);
    assert_eq!(results.blocks.len(), 4);
    assert_eq!(results.layouts.len(), 4);
    assert_eq!(results.failures.len(), 4);

    assert!(results.blocks[2].is_empty());
    assert!(results.layouts[2].is_none());
    assert_eq!(results.tags[2], Tags::new(vec![vec!["s2".to_string()]]));
    assert!(matches!(results.failures[2], Some(StageError::Extraction(_))));

    for index in [0, 1, 3] {
        assert_eq!(results.blocks[index].len(), 1);
        assert_eq!(
            results.layouts[index].as_ref().map(LayoutGraph::node_count),
            Some(1)
        );
        assert!(results.failures[index].is_none());
    }

    let names: Vec<Option<&str>> = results.sheets.iter().map(Sheet::name).collect();
    assert_eq!(names, vec![Some("s0"), Some("s1"), Some("s2"), Some("s3")]);
}

#[test]
fn detection_failure_keeps_extracted_blocks() {
    let pipeline = EndToEnd::new(
        NameClassifier,
        SingleBlockExtractor { fail_on: None },
        GraphDetector { fail_on: Some("s0") },
    );

    let results = pipeline.get_layout(sheets(&["s0"]));

    assert_eq!(results.blocks[0].len(), 1);
    assert!(results.layouts[0].is_none());
    let failure = results.failures[0].as_ref().expect("failure recorded");
    assert_eq!(failure.stage(), Stage::DetectLayout);
    assert!(failure.to_string().contains("no layout"));
}

#[test]
fn classification_failure_leaves_all_defaults() {
    let classifier = |_: &Sheet| -> StageResult<Tags> { Err(Box::new(StageFailure("bad cells"))) };
    let pipeline = EndToEnd::new(
        classifier,
        SingleBlockExtractor { fail_on: None },
        GraphDetector { fail_on: None },
    );

    let results = pipeline.get_layout(sheets(&["s0", "s1"]));

    for index in 0..2 {
        assert_eq!(results.tags[index], Tags::default());
        assert!(results.blocks[index].is_empty());
        assert!(results.layouts[index].is_none());
        assert!(matches!(
            results.failures[index],
            Some(StageError::Classification(_))
        ));
    }
}

#[test]
fn panicking_stage_is_contained() {
    let extractor = |sheet: &Sheet, _: &Tags| -> StageResult<Vec<Block>> {
        if sheet.name() == Some("boom") {
            panic!("extractor exploded");
        }
        Ok(Vec::new())
    };
    let pipeline = EndToEnd::new(NameClassifier, extractor, GraphDetector { fail_on: None });

    let results = pipeline.get_layout(sheets(&["boom", "fine"]));

    match &results.failures[0] {
        Some(StageError::Panicked { stage, message }) => {
            assert_eq!(*stage, Stage::ExtractBlocks);
            assert_eq!(message, "extractor exploded");
        }
        other => panic!("expected panic failure, got {other:?}"),
    }
    assert!(results.failures[1].is_none());
    assert_eq!(
        results.layouts[1].as_ref().map(LayoutGraph::node_count),
        Some(0)
    );
}

#[test]
fn absent_layout_is_not_a_failure() {
    let detector =
        |_: &Sheet, _: &Tags, _: &[Block]| -> StageResult<Option<LayoutGraph>> { Ok(None) };
    let pipeline = EndToEnd::new(
        NameClassifier,
        SingleBlockExtractor { fail_on: None },
        detector,
    );

    let results = pipeline.get_layout(vec![Sheet::new(None, Vec::new())]);

    assert_eq!(results.len(), 1);
    assert!(results.layouts[0].is_none());
    assert!(results.failures[0].is_none());
    assert_eq!(results.blocks[0].len(), 1);
}

#[test]
fn no_sheets_yield_empty_results() {
    let pipeline = EndToEnd::new(
        NameClassifier,
        SingleBlockExtractor { fail_on: None },
        GraphDetector { fail_on: None },
    );

    let results = pipeline.get_layout(Vec::new());
    assert!(results.is_empty());
    assert!(results.tags.is_empty());
}

#[test]
fn unnamed_sheets_run_every_stage() {
    let pipeline = EndToEnd::new(
        NameClassifier,
        SingleBlockExtractor { fail_on: Some("s0") },
        GraphDetector { fail_on: Some("s0") },
    );

    let results = pipeline.get_layout(vec![Sheet::new(
        None,
        vec![vec![CellValue::Int(1)]],
    )]);

    assert!(results.failures[0].is_none());
    assert_eq!(results.tags[0], Tags::new(vec![vec![String::new()]]));
    assert_eq!(results.blocks[0].len(), 1);
    assert_eq!(
        results.layouts[0].as_ref().map(LayoutGraph::node_count),
        Some(1)
    );
}
