use dustpan_core::{format_size, truncate_path_start};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::DeleteTarget;

use super::layout::centered_rect;
use super::theme::Theme;

/// Paths listed before collapsing into "...and N more"
const LISTED: usize = 5;

/// Delete confirmation dialog for one or several rows
pub struct ConfirmDeleteView<'a> {
    targets: &'a [DeleteTarget],
    theme: &'a Theme,
}

impl<'a> ConfirmDeleteView<'a> {
    pub fn new(targets: &'a [DeleteTarget], theme: &'a Theme) -> Self {
        Self { targets, theme }
    }
}

impl Widget for ConfirmDeleteView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let count = self.targets.len();
        let total_size: u64 = self.targets.iter().map(|t| t.size).sum();
        let listed = count.min(LISTED);
        let has_more = count > LISTED;

        // heading, paths, "...and N more", blank, total, blank, hints
        let content_lines = 1 + listed + usize::from(has_more) + 4;
        let dialog_area = centered_rect(60, content_lines as u16 + 4, area);

        Clear.render(dialog_area, buf);

        let title = if count == 1 {
            " Delete? "
        } else {
            " Delete Multiple? "
        };
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.red))
            .style(Style::default().bg(self.theme.bg_surface))
            .padding(Padding::uniform(1));

        let inner = block.inner(dialog_area);
        block.render(dialog_area, buf);

        if inner.width < 10 || inner.height < 3 {
            return;
        }

        let text_style = Style::default().fg(self.theme.fg);
        let path_style = Style::default()
            .fg(self.theme.yellow)
            .add_modifier(Modifier::BOLD);
        let dim_style = Style::default().fg(self.theme.fg_dim);
        let key_style = Style::default()
            .fg(self.theme.green)
            .add_modifier(Modifier::BOLD);

        let mut row = inner.y;
        let max_w = inner.width as usize - 2;

        let heading = if count == 1 {
            "Delete:".to_string()
        } else {
            format!("Delete {} items:", count)
        };
        buf.set_string(inner.x, row, &heading, text_style);
        row += 1;

        for target in self.targets.iter().take(LISTED) {
            let size_part = format!("  ({})", format_size(target.size));
            let room = max_w.saturating_sub(size_part.len() + 1);
            let path = truncate_path_start(&target.path.to_string_lossy(), room);
            buf.set_string(inner.x + 1, row, &path, path_style);
            buf.set_string(
                inner.x + 1 + path.chars().count() as u16,
                row,
                &size_part,
                dim_style,
            );
            row += 1;
        }

        if has_more {
            let more = format!("  ...and {} more", count - LISTED);
            buf.set_string(inner.x, row, &more, dim_style);
            row += 1;
        }

        row += 1;
        let total = format!("Total: {}", format_size(total_size));
        buf.set_string(inner.x, row, &total, text_style);

        let hints_y = inner.y + inner.height.saturating_sub(1);
        buf.set_string(inner.x, hints_y, "[y]", key_style);
        buf.set_string(inner.x + 4, hints_y, "Yes, delete", text_style);
        buf.set_string(inner.x + 18, hints_y, "[n]", key_style);
        buf.set_string(inner.x + 22, hints_y, "Cancel", text_style);
    }
}
