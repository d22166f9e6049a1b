use std::path::{Path, PathBuf};

use super::node::{NodeId, NodeKind, TreeNode};

/// Arena-allocated directory tree
#[derive(Debug, Clone)]
pub struct DiskTree {
    nodes: Vec<TreeNode>,
    root_path: PathBuf,
    /// Slots holding detached nodes, reclaimed by [`DiskTree::compact`]
    detached: usize,
}

impl DiskTree {
    pub fn new(root_path: PathBuf) -> Self {
        let root_name = root_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| root_path.to_string_lossy().into_owned());

        let root = TreeNode::new(
            NodeId::ROOT,
            root_name,
            NodeKind::Directory,
            root_path.clone(),
            None,
            0,
        );

        Self {
            nodes: vec![root],
            root_path,
            detached: 0,
        }
    }

    pub fn add_node(
        &mut self,
        name: String,
        kind: NodeKind,
        path: PathBuf,
        parent: NodeId,
    ) -> NodeId {
        let depth = self.nodes[parent.index()].depth + 1;
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(TreeNode::new(id, name, kind, path, Some(parent), depth));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Live node by id; detached nodes are not returned
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index()).filter(|n| !n.removed)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.index()).filter(|n| !n.removed)
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Arena slots, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Nodes still reachable from the root
    pub fn live_count(&self) -> usize {
        self.nodes.len() - self.detached
    }

    pub fn set_size(&mut self, id: NodeId, size: u64) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.size = size;
        }
    }

    /// Roll sizes and file counts up from children (children always have
    /// higher indices than their parents)
    pub fn aggregate_sizes(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            if !self.nodes[i].kind.is_directory() || self.nodes[i].removed {
                continue;
            }
            let (size, files) = self.nodes[i]
                .children
                .iter()
                .filter_map(|c| self.nodes.get(c.index()))
                .fold((0u64, 0u64), |(s, f), c| (s + c.size, f + c.file_count));
            self.nodes[i].size = size;
            self.nodes[i].file_count = files;
        }
    }

    pub fn sort_by_size(&mut self) {
        let sizes: Vec<u64> = self.nodes.iter().map(|n| n.size).collect();
        for node in &mut self.nodes {
            node.children
                .sort_by(|a, b| sizes[b.index()].cmp(&sizes[a.index()]));
        }
    }

    pub fn toggle_expanded(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id)
            && node.kind.is_directory()
        {
            node.is_expanded = !node.is_expanded;
        }
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if let Some(node) = self.get_mut(id)
            && node.kind.is_directory()
        {
            node.is_expanded = expanded;
        }
    }

    /// Visible nodes in display order, respecting expansion state
    pub fn visible_nodes(&self, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        self.collect_visible(root, &mut result);
        result
    }

    fn collect_visible(&self, id: NodeId, result: &mut Vec<NodeId>) {
        let Some(node) = self.get(id) else {
            return;
        };
        result.push(id);
        if node.is_expanded {
            for &child in &node.children {
                self.collect_visible(child, result);
            }
        }
    }

    /// Ids from the root down to `id`
    pub fn path_to_node(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            path.push(node_id);
            current = self.nodes.get(node_id.index()).and_then(|n| n.parent);
        }
        path.reverse();
        path
    }

    pub fn breadcrumbs(&self, id: NodeId) -> String {
        self.path_to_node(id)
            .iter()
            .filter_map(|&id| self.get(id).map(|n| n.name.as_str()))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Live node for a filesystem path, walking down from the root
    pub fn find_by_path(&self, path: &Path) -> Option<NodeId> {
        let relative = path.strip_prefix(&self.root_path).ok()?;
        let mut current = NodeId::ROOT;
        for component in relative.components() {
            let name = component.as_os_str().to_string_lossy();
            current = *self
                .get(current)?
                .children
                .iter()
                .find(|&&child| self.get(child).is_some_and(|c| c.name == name))?;
        }
        Some(current)
    }

    /// Detach a subtree and subtract it from every ancestor.
    /// The root cannot be removed.
    pub fn remove_node(&mut self, id: NodeId) {
        if id == NodeId::ROOT {
            return;
        }
        let Some(node) = self.get(id) else {
            return;
        };
        let (size, files, parent) = (node.size, node.file_count, node.parent);

        if let Some(parent) = parent {
            self.nodes[parent.index()].children.retain(|&c| c != id);
        }
        self.adjust_ancestors(parent, |n| {
            n.size = n.size.saturating_sub(size);
            n.file_count = n.file_count.saturating_sub(files);
        });
        self.mark_removed(id);
    }

    /// Swap the children of directory `id` for the contents of a freshly
    /// scanned tree rooted at the same path, fixing totals up the chain.
    pub fn replace_children(&mut self, id: NodeId, fresh: &DiskTree) {
        let Some(node) = self.get(id) else {
            return;
        };
        if !node.kind.is_directory() {
            return;
        }
        let (old_size, old_files) = (node.size, node.file_count);

        for child in std::mem::take(&mut self.nodes[id.index()].children) {
            self.mark_removed(child);
        }
        for &child in &fresh.root().children {
            self.graft(fresh, child, id);
        }

        let (new_size, new_files) = (fresh.root().size, fresh.root().file_count);
        let target = &mut self.nodes[id.index()];
        target.size = new_size;
        target.file_count = new_files;

        let parent = target.parent;
        self.adjust_ancestors(parent, |n| {
            n.size = n.size.saturating_sub(old_size) + new_size;
            n.file_count = n.file_count.saturating_sub(old_files) + new_files;
        });
        self.sort_by_size();

        if self.detached > self.live_count() {
            self.compact();
        }
    }

    /// Drop detached slots and renumber live nodes in depth-first order.
    ///
    /// Every `NodeId` handed out before this call is invalid afterwards;
    /// look nodes up again by path. Parents keep lower ids than children.
    pub fn compact(&mut self) {
        if self.detached == 0 {
            return;
        }

        let mut old: Vec<Option<TreeNode>> = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(Some)
            .collect();
        let mut remap: Vec<Option<NodeId>> = vec![None; old.len()];
        let mut order = Vec::with_capacity(old.len() - self.detached);

        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let Some(node) = old[id.index()].as_ref().filter(|n| !n.removed) else {
                continue;
            };
            remap[id.index()] = Some(NodeId(order.len()));
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }

        self.nodes = order
            .into_iter()
            .filter_map(|id| old[id.index()].take())
            .map(|mut node| {
                node.id = remap[node.id.index()].unwrap_or(NodeId::ROOT);
                node.parent = node.parent.and_then(|p| remap[p.index()]);
                node.children = node
                    .children
                    .iter()
                    .filter_map(|c| remap[c.index()])
                    .collect();
                node
            })
            .collect();
        self.detached = 0;
    }

    fn graft(&mut self, fresh: &DiskTree, source: NodeId, parent: NodeId) {
        let Some(node) = fresh.get(source) else {
            return;
        };
        let id = self.add_node(node.name.clone(), node.kind, node.path.clone(), parent);
        let target = &mut self.nodes[id.index()];
        target.size = node.size;
        target.file_count = node.file_count;
        for &child in &node.children {
            self.graft(fresh, child, id);
        }
    }

    fn adjust_ancestors(&mut self, mut current: Option<NodeId>, update: impl Fn(&mut TreeNode)) {
        while let Some(id) = current {
            let node = &mut self.nodes[id.index()];
            update(node);
            current = node.parent;
        }
    }

    fn mark_removed(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.index()];
            if node.removed {
                continue;
            }
            node.removed = true;
            self.detached += 1;
            stack.extend(node.children.iter().copied());
        }
    }

    pub fn total_size(&self) -> u64 {
        self.root().size
    }

    pub fn total_files(&self) -> u64 {
        self.root().file_count
    }

    /// Live nodes in arena order
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|n| !n.removed)
    }
}
