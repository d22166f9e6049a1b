use dustpan_core::format_count;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use super::layout::centered_rect;
use super::progress::spinner;
use super::theme::Theme;

/// Overlay shown while a deletion runs, fed by the live counter
pub struct DeleteProgressView<'a> {
    removed: u64,
    roots: usize,
    spinner_frame: usize,
    quitting: bool,
    theme: &'a Theme,
}

impl<'a> DeleteProgressView<'a> {
    pub fn new(removed: u64, roots: usize, spinner_frame: usize, theme: &'a Theme) -> Self {
        Self {
            removed,
            roots,
            spinner_frame,
            quitting: false,
            theme,
        }
    }

    /// Quit is pending on this run
    pub fn quitting(mut self, quitting: bool) -> Self {
        self.quitting = quitting;
        self
    }
}

/// "1 file removed", "1,234 files removed"
pub fn removed_label(removed: u64) -> String {
    format!(
        "{} file{} removed",
        format_count(removed),
        if removed == 1 { "" } else { "s" }
    )
}

impl Widget for DeleteProgressView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dialog_area = centered_rect(50, 9, area);
        Clear.render(dialog_area, buf);

        let block = Block::default()
            .title(" Deleting... ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.yellow))
            .style(Style::default().bg(self.theme.bg_surface))
            .padding(Padding::uniform(1));

        let inner = block.inner(dialog_area);
        block.render(dialog_area, buf);

        if inner.height < 2 || inner.width < 20 {
            return;
        }

        let count_style = Style::default()
            .fg(self.theme.fg)
            .add_modifier(Modifier::BOLD);
        buf.set_string(
            inner.x,
            inner.y,
            spinner(self.spinner_frame).to_string(),
            Style::default().fg(self.theme.yellow),
        );
        buf.set_string(inner.x + 2, inner.y, removed_label(self.removed), count_style);

        let roots = format!(
            "from {} selected item{}",
            self.roots,
            if self.roots == 1 { "" } else { "s" }
        );
        buf.set_string(
            inner.x + 2,
            inner.y + 1,
            &roots,
            Style::default().fg(self.theme.fg_dim),
        );

        let hint = if self.quitting {
            "Quitting once the deletion completes"
        } else {
            "Esc hides this, deletion continues"
        };
        buf.set_string(
            inner.x,
            inner.y + inner.height.saturating_sub(1),
            hint,
            Style::default().fg(self.theme.fg_muted),
        );
    }
}
