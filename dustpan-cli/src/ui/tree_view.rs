use std::collections::HashSet;

use dustpan_core::{DiskTree, NodeId, format_size, shorten, size_percentage};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use super::bar_chart::render_bar;
use super::theme::Theme;

/// Tree prefix characters
struct TreePrefix;

impl TreePrefix {
    const PIPE: &'static str = "│  ";
    const TEE: &'static str = "├─ ";
    const CORNER: &'static str = "└─ ";
    const BLANK: &'static str = "   ";
}

const BAR_WIDTH: usize = 24;
const PCT_WIDTH: usize = 6;
const SIZE_WIDTH: usize = 10;

/// Main tree view widget
pub struct TreeView<'a> {
    tree: &'a DiskTree,
    view_root: NodeId,
    selected_index: usize,
    scroll_offset: usize,
    selected_nodes: &'a HashSet<NodeId>,
    theme: &'a Theme,
}

impl<'a> TreeView<'a> {
    pub fn new(
        tree: &'a DiskTree,
        view_root: NodeId,
        selected_index: usize,
        scroll_offset: usize,
        selected_nodes: &'a HashSet<NodeId>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            tree,
            view_root,
            selected_index,
            scroll_offset,
            selected_nodes,
            theme,
        }
    }

    /// Box-drawing prefix for a row, relative to the view root
    fn prefix(&self, node_id: NodeId) -> String {
        if node_id == self.view_root {
            return String::new();
        }
        let root_depth = self.tree.get(self.view_root).map(|n| n.depth).unwrap_or(0);

        let chain: Vec<NodeId> = self
            .tree
            .path_to_node(node_id)
            .into_iter()
            .filter(|&id| self.tree.get(id).is_some_and(|n| n.depth > root_depth))
            .collect();

        let mut prefix = String::new();
        for (i, &id) in chain.iter().enumerate() {
            let last = self.is_last_sibling(id);
            let part = match (i == chain.len() - 1, last) {
                (true, true) => TreePrefix::CORNER,
                (true, false) => TreePrefix::TEE,
                (false, true) => TreePrefix::BLANK,
                (false, false) => TreePrefix::PIPE,
            };
            prefix.push_str(part);
        }
        prefix
    }

    fn is_last_sibling(&self, node_id: NodeId) -> bool {
        self.tree
            .get(node_id)
            .and_then(|n| n.parent)
            .and_then(|p| self.tree.get(p))
            .is_none_or(|parent| parent.children.last() == Some(&node_id))
    }
}

impl Widget for TreeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 50 {
            return;
        }

        let nodes = self.tree.visible_nodes(self.view_root);
        let total_size = self.tree.get(self.view_root).map(|n| n.size).unwrap_or(1);
        let name_width = area.width as usize - BAR_WIDTH - PCT_WIDTH - SIZE_WIDTH - 4;
        let right_x = area.x + area.width - (BAR_WIDTH + PCT_WIDTH + SIZE_WIDTH) as u16 - 2;

        for (i, &node_id) in nodes
            .iter()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let Some(node) = self.tree.get(node_id) else {
                continue;
            };
            let y = area.y + i as u16;

            let is_cursor = i + self.scroll_offset == self.selected_index;
            let is_marked = self.selected_nodes.contains(&node_id);

            // Cursor wins over multi-selection, which wins over plain rows
            let bg = if is_cursor {
                self.theme.selection_bg
            } else if is_marked {
                self.theme.bg_highlight
            } else {
                self.theme.bg
            };
            let fg = |color: Color| {
                if is_cursor {
                    Style::default().bg(bg).fg(self.theme.selection_fg)
                } else {
                    Style::default().bg(bg).fg(color)
                }
            };

            buf.set_style(Rect::new(area.x, y, area.width, 1), Style::default().bg(bg));

            let mut x = area.x;
            if is_marked {
                buf.set_string(x, y, "▪ ", Style::default().bg(bg).fg(self.theme.purple));
                x += 2;
            }

            let prefix = self.prefix(node_id);
            buf.set_string(x, y, &prefix, fg(self.theme.border));
            x += prefix.chars().count() as u16;

            let icon = node.kind.icon(node.is_expanded);
            buf.set_string(x, y, icon, fg(self.theme.icon_color(node.kind)));
            x += 2;

            let used = prefix.chars().count() + 3 + if is_marked { 2 } else { 0 };
            let name = shorten(&node.name, name_width.saturating_sub(used));
            let mut name_style = fg(self.theme.fg);
            if is_cursor || node.kind.is_directory() {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }
            buf.set_string(x, y, &name, name_style);

            if node.kind.is_directory() && node.has_children() {
                let indicator = if node.is_expanded { " ▼" } else { " ▶" };
                let indicator_x = x + name.chars().count() as u16;
                buf.set_string(indicator_x, y, indicator, fg(self.theme.fg_muted));
            }

            let percentage = size_percentage(node.size, total_size);
            let bar = render_bar(percentage, BAR_WIDTH - 2);
            buf.set_string(right_x, y, &bar, fg(self.theme.size_color(percentage)));

            let pct = format!("{:>5.1}%", percentage);
            buf.set_string(right_x + BAR_WIDTH as u16 - 1, y, &pct, fg(self.theme.fg_dim));

            let size = format!("{:>9}", format_size(node.size));
            buf.set_string(
                right_x + (BAR_WIDTH + PCT_WIDTH) as u16 - 1,
                y,
                &size,
                fg(self.theme.fg_muted),
            );
        }
    }
}
