use std::collections::HashMap;

use tracing::debug;

use crate::tabula::layout::error::{LayoutError, Result};
use crate::tabula::layout::model::BlockId;

/// Outgoing edge of a layout node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Relation label chosen by the detector.
    pub relation: String,
    /// Index of the target node.
    pub target: usize,
}

/// Directed graph over a sheet's blocks.
///
/// Node `i` stands for the block with id `nodes()[i]`. Edges are keyed by
/// source node index; traversal through [`edges`](Self::edges) is always in
/// ascending source index, then insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutGraph {
    nodes: Vec<BlockId>,
    out_edges: HashMap<usize, Vec<Edge>>,
}

impl LayoutGraph {
    /// Creates an edgeless graph over the given blocks.
    pub fn new(nodes: Vec<BlockId>) -> Self {
        Self {
            nodes,
            out_edges: HashMap::new(),
        }
    }

    /// Creates an edgeless graph with one node per block, in block order.
    pub fn over_blocks(block_count: usize) -> Self {
        Self::new((0..block_count).map(BlockId).collect())
    }

    pub fn nodes(&self) -> &[BlockId] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Adds a `from -> to` edge labelled with `relation`.
    pub fn add_edge(&mut self, from: usize, relation: impl Into<String>, to: usize) -> Result<()> {
        for node in [from, to] {
            if node >= self.nodes.len() {
                return Err(LayoutError::InvalidGraph(format!(
                    "edge endpoint {node} outside graph of {} nodes",
                    self.nodes.len()
                )));
            }
        }
        self.out_edges.entry(from).or_default().push(Edge {
            relation: relation.into(),
            target: to,
        });
        Ok(())
    }

    /// Outgoing edges of `node` in insertion order.
    pub fn out_edges(&self, node: usize) -> &[Edge] {
        self.out_edges.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.out_edges.values().map(Vec::len).sum()
    }

    /// All edges as `(source, edge)` pairs in traversal order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, &Edge)> + '_ {
        (0..self.nodes.len()).flat_map(move |source| {
            self.out_edges(source)
                .iter()
                .map(move |edge| (source, edge))
        })
    }

    /// Dumps the graph at debug level.
    pub fn log_layout(&self) {
        debug!(
            nodes = self.nodes.len(),
            edges = self.edge_count(),
            "layout graph"
        );
        for (source, edge) in self.edges() {
            debug!(
                source,
                target = edge.target,
                relation = %edge.relation,
                "layout edge"
            );
        }
    }
}
