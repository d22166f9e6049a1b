use std::path::PathBuf;

/// Index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
    Symlink,
}

impl NodeKind {
    pub fn icon(&self, expanded: bool) -> &'static str {
        match self {
            NodeKind::Directory if expanded => "📂",
            NodeKind::Directory => "📁",
            NodeKind::File => "📄",
            NodeKind::Symlink => "🔗",
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// Allocated bytes, aggregated for directories
    pub size: u64,
    /// Non-directory entries at or below this node
    pub file_count: u64,
    pub parent: Option<NodeId>,
    /// Sorted by size, largest first
    pub children: Vec<NodeId>,
    pub depth: u16,
    pub is_expanded: bool,
    pub path: PathBuf,
    /// Detached by a deletion; the arena slot stays but is unreachable
    pub removed: bool,
}

impl TreeNode {
    pub fn new(
        id: NodeId,
        name: String,
        kind: NodeKind,
        path: PathBuf,
        parent: Option<NodeId>,
        depth: u16,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            size: 0,
            file_count: if kind.is_directory() { 0 } else { 1 },
            parent,
            children: Vec::new(),
            depth,
            is_expanded: depth == 0,
            path,
            removed: false,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
