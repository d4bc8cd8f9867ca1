//! Useless Block Removal
//!
//! A block is useful iff the exit block can be reached from it. All other
//! blocks are removed in two phases:
//!   1. Phase (Mark): Walk the reversed graph starting at its entry (the exit)
//!   2. Phase (Sweep): Remove every block which was not visited
//!
//! The entry block is always kept. Graphs without exit are left untouched.

use crate::cfg::{ControlFlowGraph, Label};
use crate::error::Result;
use crate::util::Transform;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::Dfs;
use std::collections::BTreeSet;
use tracing::{debug, trace};

pub struct RemoveUselessBlocks {}

impl RemoveUselessBlocks {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for RemoveUselessBlocks {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform<ControlFlowGraph> for RemoveUselessBlocks {
    fn name(&self) -> &'static str {
        "RemoveUselessBlocks"
    }

    fn description(&self) -> String {
        "Remove useless blocks".to_string()
    }

    fn transform(&self, cfg: &mut ControlFlowGraph) -> Result<()> {
        remove_useless_blocks(cfg);
        Ok(())
    }
}

/// Removes every block from which the exit is not reachable.
///
/// Returns the labels of the removed blocks in insertion order, so callers can
/// report them; the graph itself is the result and the labels may be ignored.
/// Does nothing if the graph has no exit.
pub fn remove_useless_blocks(cfg: &mut ControlFlowGraph) -> Vec<Label> {
    let useless = mark(cfg);
    if useless.is_empty() {
        return Vec::new();
    }

    sweep(cfg, &useless)
}

/// Collect the blocks which cannot reach the exit.
fn mark(cfg: &ControlFlowGraph) -> Vec<NodeIndex> {
    let rev_cfg = cfg.reverse();
    let start = match rev_cfg.entry().map(|exit| cfg.node_index(exit)) {
        Some(Ok(index)) => index,
        _ => {
            debug!("CFG has no exit, skipping useless block removal");
            return Vec::new();
        }
    };

    let graph = rev_cfg.graph();
    let mut useful: BTreeSet<NodeIndex> = BTreeSet::new();
    let mut dfs = Dfs::new(graph, start);
    while let Some(index) = dfs.next(graph) {
        useful.insert(index);
    }
    if let Ok(entry) = cfg.node_index(cfg.entry()) {
        useful.insert(entry);
    }

    let useless: Vec<NodeIndex> = cfg
        .node_indices()
        .filter(|index| !useful.contains(index))
        .collect();

    debug!(
        useful = useful.len(),
        useless = useless.len(),
        "marked blocks"
    );

    useless
}

/// Remove all marked blocks including their edges.
fn sweep(cfg: &mut ControlFlowGraph, useless: &[NodeIndex]) -> Vec<Label> {
    useless
        .iter()
        .filter_map(|&index| cfg.remove_node(index))
        .map(|block| {
            trace!(label = %block.label(), "removed useless block");
            block.label().clone()
        })
        .collect()
}
