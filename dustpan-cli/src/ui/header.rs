use dustpan_core::{format_count, format_size, truncate_path_start};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::app::AppState;

use super::progress::{progress_indicator, spinner};
use super::theme::Theme;

/// Header widget showing title, path, and status
pub struct Header<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn status(&self) -> (String, Style) {
        let Some(tree) = &self.state.tree else {
            return (
                progress_indicator(&self.state.progress, self.state.spinner_frame),
                Style::default().fg(self.theme.yellow),
            );
        };

        let summary = format!(
            "{} files, {}",
            format_count(tree.total_files()),
            format_size(tree.total_size())
        );
        if self.state.is_refreshing() {
            (
                format!("{} refreshing  {}", spinner(self.state.spinner_frame), summary),
                Style::default().fg(self.theme.yellow),
            )
        } else {
            (summary, Style::default().fg(self.theme.fg_dim))
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 1 {
            return;
        }

        let title = "DUSTPAN";
        let title_style = Style::default()
            .fg(self.theme.blue)
            .add_modifier(Modifier::BOLD);
        buf.set_string(area.x + 1, area.y, title, title_style);

        let mut x = area.x + 2 + title.len() as u16;
        buf.set_string(x, area.y, "─", Style::default().fg(self.theme.border));
        x += 2;

        let path = match &self.state.tree {
            Some(tree) => tree.breadcrumbs(self.state.view_root),
            None => self.state.root_path.to_string_lossy().into_owned(),
        };
        let max_path_len = area.width.saturating_sub(x - area.x + 36) as usize;
        buf.set_string(
            x,
            area.y,
            truncate_path_start(&path, max_path_len),
            Style::default().fg(self.theme.fg),
        );

        let (status, status_style) = self.status();
        let status_width = status.chars().count() as u16;
        let status_x = (area.x + area.width).saturating_sub(status_width + 2);
        buf.set_string(status_x, area.y, &status, status_style);
    }
}
