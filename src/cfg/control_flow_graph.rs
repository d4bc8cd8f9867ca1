//! A `ControlFlowGraph` is a directed graph of labeled `BasicBlock`s.

use crate::cfg::{BasicBlock, Label, ReverseControlFlowGraph};
use crate::error::{ErrorKind, Result};
use crate::util::RenderGraph;
use petgraph::dot::{Config, Dot};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::BTreeMap;
use std::fmt;

/// A directed graph of `BasicBlock`s.
///
/// # Entry and Exit
/// A `ControlFlowGraph` always has an entry block and an optional exit block.
/// The entry block can never be removed. Removing the exit block unsets the exit.
///
/// Blocks are iterated in insertion order.
#[derive(Clone, Debug)]
pub struct ControlFlowGraph {
    // Block storage; removing a block keeps the indices of all other blocks stable.
    graph: StableDiGraph<BasicBlock, ()>,
    // Label to node index.
    indices: BTreeMap<Label, NodeIndex>,
    // Live nodes in insertion order; freed slots get reused by the graph.
    order: Vec<NodeIndex>,
    entry: Label,
    exit: Option<Label>,
}

impl ControlFlowGraph {
    /// Creates a new `ControlFlowGraph` with an empty entry block.
    pub fn new<L>(entry: L) -> Self
    where
        L: Into<Label>,
    {
        let entry = entry.into();
        let mut cfg = Self {
            graph: StableDiGraph::new(),
            indices: BTreeMap::new(),
            order: Vec::new(),
            entry: entry.clone(),
            exit: None,
        };
        cfg.insert(entry);
        cfg
    }

    /// Creates a new `ControlFlowGraph` with an empty entry and an empty exit block.
    pub fn with_exit<L, M>(entry: L, exit: M) -> Self
    where
        L: Into<Label>,
        M: Into<Label>,
    {
        let exit = exit.into();
        let mut cfg = Self::new(entry);
        cfg.insert(exit.clone());
        cfg.exit = Some(exit);
        cfg
    }

    /// Get the entry label of this `ControlFlowGraph`.
    pub fn entry(&self) -> &Label {
        &self.entry
    }

    /// Get the exit label of this `ControlFlowGraph`, if any.
    pub fn exit(&self) -> Option<&Label> {
        self.exit.as_ref()
    }

    pub fn has_exit(&self) -> bool {
        self.exit.is_some()
    }

    /// Sets the exit of this `ControlFlowGraph` to the given block.
    pub fn set_exit<L>(&mut self, exit: L) -> Result<()>
    where
        L: Into<Label>,
    {
        let exit = exit.into();
        self.node_index(&exit)?;
        self.exit = Some(exit);
        Ok(())
    }

    /// Returns the block with the given label, creating an empty one if it does not exist yet.
    pub fn insert<L>(&mut self, label: L) -> &mut BasicBlock
    where
        L: Into<Label>,
    {
        let label = label.into();
        let index = match self.indices.get(&label) {
            Some(&index) => index,
            None => {
                let index = self.graph.add_node(BasicBlock::new(label.clone()));
                self.indices.insert(label, index);
                self.order.push(index);
                index
            }
        };
        &mut self.graph[index]
    }

    /// Adds the basic block to the graph.
    ///
    /// Fails if a block with the same label already exists.
    pub fn add_block(&mut self, block: BasicBlock) -> Result<()> {
        if self.indices.contains_key(block.label()) {
            bail!(ErrorKind::Graph(format!(
                "block `{}` already exists",
                block.label()
            )));
        }
        let label = block.label().clone();
        let index = self.graph.add_node(block);
        self.indices.insert(label, index);
        self.order.push(index);
        Ok(())
    }

    /// Returns true if a block with the given label exists.
    pub fn contains(&self, label: &Label) -> bool {
        self.indices.contains_key(label)
    }

    /// Get a `BasicBlock` by label.
    pub fn block(&self, label: &Label) -> Result<&BasicBlock> {
        let index = self.node_index(label)?;
        Ok(&self.graph[index])
    }

    /// Get every `BasicBlock` in insertion order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        let graph = &self.graph;
        self.order.iter().map(move |&index| &graph[index])
    }

    /// Get the labels of every `BasicBlock` in insertion order.
    pub fn labels(&self) -> Vec<&Label> {
        self.blocks().map(BasicBlock::label).collect()
    }

    pub fn num_blocks(&self) -> usize {
        self.graph.node_count()
    }

    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adds an edge from one block to another block.
    ///
    /// Adding an already existing edge has no effect.
    pub fn add_edge(&mut self, from: &Label, to: &Label) -> Result<()> {
        let head = self.node_index(from)?;
        let tail = self.node_index(to)?;
        self.graph.update_edge(head, tail, ());
        Ok(())
    }

    /// Removes the edge between the two blocks, if it exists.
    pub fn remove_edge(&mut self, from: &Label, to: &Label) -> Result<()> {
        let head = self.node_index(from)?;
        let tail = self.node_index(to)?;
        if let Some(edge) = self.graph.find_edge(head, tail) {
            self.graph.remove_edge(edge);
        }
        Ok(())
    }

    pub fn has_edge(&self, from: &Label, to: &Label) -> bool {
        match (self.indices.get(from), self.indices.get(to)) {
            (Some(&head), Some(&tail)) => self.graph.find_edge(head, tail).is_some(),
            _ => false,
        }
    }

    /// Get every edge as `(from, to)` pair, ordered by labels.
    pub fn edges(&self) -> Vec<(&Label, &Label)> {
        let mut edges: Vec<(&Label, &Label)> = self
            .graph
            .node_indices()
            .flat_map(|head| {
                self.graph
                    .neighbors_directed(head, Direction::Outgoing)
                    .map(move |tail| (head, tail))
            })
            .map(|(head, tail)| (self.graph[head].label(), self.graph[tail].label()))
            .collect();
        edges.sort();
        edges
    }

    /// Get the labels of every successor of a `BasicBlock`, ordered by label.
    pub fn successors(&self, label: &Label) -> Result<Vec<&Label>> {
        self.neighbors(label, Direction::Outgoing)
    }

    /// Get the labels of every predecessor of a `BasicBlock`, ordered by label.
    pub fn predecessors(&self, label: &Label) -> Result<Vec<&Label>> {
        self.neighbors(label, Direction::Incoming)
    }

    fn neighbors(&self, label: &Label, direction: Direction) -> Result<Vec<&Label>> {
        let index = self.node_index(label)?;
        let mut labels: Vec<&Label> = self
            .graph
            .neighbors_directed(index, direction)
            .map(|neighbor| self.graph[neighbor].label())
            .collect();
        labels.sort();
        Ok(labels)
    }

    /// Removes a `BasicBlock` together with all of its incoming and outgoing edges.
    pub fn remove(&mut self, label: &Label) -> Result<BasicBlock> {
        if *label == self.entry {
            bail!(ErrorKind::Graph(format!(
                "entry block `{}` cannot be removed",
                label
            )));
        }
        let index = self.node_index(label)?;
        self.remove_node(index)
            .ok_or_else(|| ErrorKind::Graph(format!("no block `{}`", label)).into())
    }

    /// Returns a reversed view of this `ControlFlowGraph`.
    pub fn reverse(&self) -> ReverseControlFlowGraph<'_> {
        ReverseControlFlowGraph::new(self)
    }

    pub(crate) fn graph(&self) -> &StableDiGraph<BasicBlock, ()> {
        &self.graph
    }

    /// Node indices of all blocks in insertion order.
    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.order.iter().copied()
    }

    pub(crate) fn node_index(&self, label: &Label) -> Result<NodeIndex> {
        self.indices
            .get(label)
            .copied()
            .ok_or_else(|| ErrorKind::Graph(format!("no block `{}`", label)).into())
    }

    /// Removes the node and keeps the label index and exit consistent.
    pub(crate) fn remove_node(&mut self, index: NodeIndex) -> Option<BasicBlock> {
        let block = self.graph.remove_node(index)?;
        self.indices.remove(block.label());
        self.order.retain(|&other| other != index);
        if self.exit.as_ref() == Some(block.label()) {
            self.exit = None;
        }
        Some(block)
    }
}

impl fmt::Display for ControlFlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in self.blocks() {
            writeln!(f, "{}", block)?;
        }
        for (from, to) in self.edges() {
            writeln!(f, "edge {} -> {}", from, to)?;
        }
        Ok(())
    }
}

impl RenderGraph for ControlFlowGraph {
    fn render_to_str(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::EdgeNoLabel, Config::NodeNoLabel],
            &|_, _| String::new(),
            &|_, node| format!("shape = box label = \"{}\" ", block_text(node.1)),
        );
        format!("{:?}", dot)
    }
}

/// Left-aligned DOT label text of a block: its label followed by one statement per line.
fn block_text(block: &BasicBlock) -> String {
    let mut text = escape(&format!("{}:", block.label()));
    for statement in block.statements() {
        text.push_str("\\l");
        text.push_str(&escape(&statement.to_string()));
    }
    text
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\l")
}
