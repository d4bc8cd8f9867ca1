use crate::cfg::{BasicBlock, ControlFlowGraph, Label};
use crate::error::Result;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::Reversed;

/// A read-only view of a `ControlFlowGraph` with all edges reversed.
///
/// Entry and exit are swapped: the entry of the reversed graph is the exit of
/// the underlying graph (if any) and vice versa. Blocks are shared, not copied.
#[derive(Clone, Copy, Debug)]
pub struct ReverseControlFlowGraph<'a> {
    cfg: &'a ControlFlowGraph,
}

impl<'a> ReverseControlFlowGraph<'a> {
    pub fn new(cfg: &'a ControlFlowGraph) -> Self {
        Self { cfg }
    }

    /// The exit of the underlying graph.
    pub fn entry(&self) -> Option<&'a Label> {
        self.cfg.exit()
    }

    /// The entry of the underlying graph.
    pub fn exit(&self) -> Option<&'a Label> {
        Some(self.cfg.entry())
    }

    pub fn blocks(&self) -> impl Iterator<Item = &'a BasicBlock> {
        self.cfg.blocks()
    }

    /// The predecessors of the block in the underlying graph.
    pub fn successors(&self, label: &Label) -> Result<Vec<&'a Label>> {
        self.cfg.predecessors(label)
    }

    /// The successors of the block in the underlying graph.
    pub fn predecessors(&self, label: &Label) -> Result<Vec<&'a Label>> {
        self.cfg.successors(label)
    }

    /// The underlying graph with reversed edge direction, for use with `petgraph::visit`.
    pub(crate) fn graph(&self) -> Reversed<&'a StableDiGraph<BasicBlock, ()>> {
        Reversed(self.cfg.graph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_should_swap_entry_and_exit_as_well_as_edge_directions() {
        // Given: entry -> a -> exit
        let mut cfg = ControlFlowGraph::with_exit("entry", "exit");
        cfg.insert("a");
        let (entry, a, exit) = (Label::from("entry"), Label::from("a"), Label::from("exit"));
        cfg.add_edge(&entry, &a).unwrap();
        cfg.add_edge(&a, &exit).unwrap();

        // When:
        let rev = cfg.reverse();

        // Then:
        assert_eq!(rev.entry(), Some(&exit));
        assert_eq!(rev.exit(), Some(&entry));
        assert_eq!(rev.successors(&a).unwrap(), vec![&entry]);
        assert_eq!(rev.predecessors(&a).unwrap(), vec![&exit]);
        assert_eq!(rev.blocks().count(), 3);
    }

    #[test]
    fn test_reverse_of_graph_without_exit_should_have_no_entry() {
        let cfg = ControlFlowGraph::new("entry");

        assert_eq!(cfg.reverse().entry(), None);
    }
}
