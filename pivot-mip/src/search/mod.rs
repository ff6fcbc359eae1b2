//! Branch-and-bound search machinery.

mod branching;
mod node;
mod queue;
mod tree;

pub use branching::{select_most_fractional, BranchDecision};
pub use node::{BoundChange, SearchNode};
pub use queue::NodeQueue;
pub use tree::BranchAndBound;
