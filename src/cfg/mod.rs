//! Control flow graphs of basic blocks and their statements.

mod block;
mod control_flow_graph;
mod label;
mod reverse;
mod statement;
pub mod transformation;

pub use self::block::BasicBlock;
pub use self::control_flow_graph::ControlFlowGraph;
pub use self::label::Label;
pub use self::reverse::ReverseControlFlowGraph;
pub use self::statement::{BinaryOperator, Statement};
