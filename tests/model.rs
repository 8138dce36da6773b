use std::path::Path;

use tabula_layout::LayoutError;
use tabula_layout::model::{Block, BlockType, BlockTypeDistribution, FileType, LayoutGraph, Tags};

fn block(top: usize, bottom: usize, left: usize, right: usize) -> Block {
    Block::new(top, bottom, left, right, BlockTypeDistribution::certain("data")).expect("block")
}

#[test]
fn best_type_prefers_highest_confidence_then_first() {
    let distribution = BlockTypeDistribution::new(vec![
        (BlockType::new("data"), 0.2),
        (BlockType::new("header"), 0.7),
        (BlockType::new("meta"), 0.7),
    ])
    .expect("distribution");

    assert_eq!(distribution.best_type().as_str(), "header");
}

#[test]
fn empty_or_nan_distributions_are_rejected() {
    assert!(matches!(
        BlockTypeDistribution::new(Vec::new()),
        Err(LayoutError::InvalidBlockType(_))
    ));
    assert!(matches!(
        BlockTypeDistribution::new(vec![(BlockType::new("data"), f64::NAN)]),
        Err(LayoutError::InvalidBlockType(_))
    ));
}

#[test]
fn inverted_bounds_are_rejected() {
    let result = Block::new(3, 1, 0, 0, BlockTypeDistribution::certain("data"));
    assert!(matches!(result, Err(LayoutError::InvalidBlock { top: 3, bottom: 1, .. })));
}

#[test]
fn stacked_blocks_sharing_columns_are_vertical() {
    let header = block(0, 0, 0, 3);
    let data = block(1, 5, 0, 3);

    assert!(header.are_blocks_vertical(&data));
    assert!(data.are_blocks_vertical(&header));
    assert!(!header.are_blocks_horizontal(&data));
}

#[test]
fn side_by_side_blocks_sharing_rows_are_horizontal() {
    let attributes = block(1, 5, 0, 0);
    let data = block(1, 5, 1, 4);

    assert!(attributes.are_blocks_horizontal(&data));
    assert!(!attributes.are_blocks_vertical(&data));
}

#[test]
fn a_single_shared_edge_column_counts_as_vertical() {
    let upper = block(0, 1, 0, 2);
    let lower = block(2, 4, 2, 6);

    assert!(upper.are_blocks_vertical(&lower));
    assert!(!upper.are_blocks_horizontal(&lower));
}

#[test]
fn diagonal_neighbours_are_neither() {
    let upper_left = block(0, 1, 0, 1);
    let lower_right = block(2, 3, 2, 3);

    assert!(!upper_left.are_blocks_vertical(&lower_right));
    assert!(!upper_left.are_blocks_horizontal(&lower_right));
}

#[test]
fn nested_blocks_are_neither() {
    let outer = block(0, 10, 0, 10);
    let inner = block(2, 3, 2, 3);

    assert!(!outer.are_blocks_vertical(&inner));
    assert!(!outer.are_blocks_horizontal(&inner));
}

#[test]
fn region_uses_inclusive_bounds() {
    assert_eq!(block(1, 4, 0, 2).region(), "1..4, 0..2");
}

#[test]
fn graph_rejects_edges_to_missing_nodes() {
    let mut graph = LayoutGraph::over_blocks(2);
    graph.add_edge(0, "header", 1).expect("valid edge");

    assert!(matches!(
        graph.add_edge(0, "header", 2),
        Err(LayoutError::InvalidGraph(_))
    ));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn graph_traversal_is_ordered_by_source_then_insertion() {
    let mut graph = LayoutGraph::over_blocks(4);
    graph.add_edge(3, "c", 0).expect("edge");
    graph.add_edge(1, "a", 2).expect("edge");
    graph.add_edge(1, "b", 3).expect("edge");
    graph.add_edge(0, "d", 1).expect("edge");

    let order: Vec<(usize, &str)> = graph
        .edges()
        .map(|(source, edge)| (source, edge.relation.as_str()))
        .collect();
    assert_eq!(order, vec![(0, "d"), (1, "a"), (1, "b"), (3, "c")]);
}

#[test]
fn default_tags_hold_one_empty_row() {
    let tags = Tags::default();
    assert_eq!(tags.rows().len(), 1);
    assert!(tags.rows()[0].is_empty());
}

#[test]
fn file_type_ignores_extension_case() {
    assert_eq!(FileType::from_path(Path::new("BOOK.XLSX")), FileType::Xlsx);
    assert_eq!(FileType::from_path(Path::new("data.Csv")), FileType::Csv);
    assert_eq!(FileType::from_path(Path::new("old.xls")), FileType::Xls);
    assert_eq!(FileType::from_path(Path::new("notes.txt")), FileType::Unknown);
    assert_eq!(FileType::Unknown.as_str(), "");
}
