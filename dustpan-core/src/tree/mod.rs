mod arena;
mod node;

pub use arena::DiskTree;
pub use node::{NodeId, NodeKind, TreeNode};
