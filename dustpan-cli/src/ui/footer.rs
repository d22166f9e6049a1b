use dustpan_core::{format_count, format_size, shorten};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::app::{AppMode, AppState, SessionStats};

use super::theme::Theme;

/// Footer widget showing keyboard hints and session stats
pub struct Footer<'a> {
    mode: AppMode,
    selection: usize,
    background_delete: Option<u64>,
    theme: &'a Theme,
    session_stats: &'a SessionStats,
}

impl<'a> Footer<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self {
            mode: state.mode,
            selection: state.selection_count(),
            background_delete: state.delete_in_flight().then(|| state.delete_progress()),
            theme,
            session_stats: &state.session_stats,
        }
    }

    fn hints(&self) -> Vec<(&'static str, String)> {
        match self.mode {
            AppMode::Scanning | AppMode::Finalizing => vec![("q", "Quit".to_string())],
            AppMode::Browsing if self.selection > 0 => vec![
                ("v", "Toggle".to_string()),
                ("J/K", "Extend".to_string()),
                ("d", format!("Delete {}", self.selection)),
                ("Esc", "Clear".to_string()),
                ("q", "Quit".to_string()),
            ],
            AppMode::Browsing => vec![
                ("↑↓", "Navigate".to_string()),
                ("←→", "Collapse/Expand".to_string()),
                ("Enter", "Drill down".to_string()),
                ("v", "Select".to_string()),
                ("d", "Delete".to_string()),
                ("?", "Help".to_string()),
                ("q", "Quit".to_string()),
            ],
            AppMode::Help => vec![("Esc", "Close help".to_string()), ("q", "Close".to_string())],
            AppMode::ConfirmDelete => {
                vec![("y", "Yes".to_string()), ("n", "Cancel".to_string())]
            }
            AppMode::Deleting => vec![
                ("Esc", "Hide".to_string()),
                ("q", "Quit".to_string()),
            ],
        }
    }

    fn stats_text(&self) -> Option<String> {
        if let Some(removed) = self.background_delete {
            return Some(format!("Deleting… {} files removed", format_count(removed)));
        }
        if self.session_stats.runs == 0 {
            return None;
        }
        Some(format!(
            "Freed: {} ({} file{})",
            format_size(self.session_stats.bytes_freed),
            format_count(self.session_stats.files_removed),
            if self.session_stats.files_removed == 1 {
                ""
            } else {
                "s"
            }
        ))
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 1 {
            return;
        }

        let key_style = Style::default()
            .fg(self.theme.fg)
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(self.theme.fg_dim);
        let sep_style = Style::default().fg(self.theme.border);

        let hints = self.hints();
        let mut x = area.x + 1;
        for (i, (key, desc)) in hints.iter().enumerate() {
            buf.set_string(x, area.y, *key, key_style);
            x += key.chars().count() as u16 + 1;

            buf.set_string(x, area.y, desc.as_str(), desc_style);
            x += desc.chars().count() as u16;

            if i < hints.len() - 1 {
                buf.set_string(x, area.y, "  │  ", sep_style);
                x += 5;
            }

            if x >= area.x + area.width - 5 {
                break;
            }
        }

        if let Some(stats) = self.stats_text() {
            let stats_style = Style::default()
                .fg(if self.background_delete.is_some() {
                    self.theme.yellow
                } else {
                    self.theme.green
                })
                .add_modifier(Modifier::BOLD);
            let width = stats.chars().count() as u16;
            let stats_x = (area.x + area.width).saturating_sub(width + 1);
            if stats_x > x + 2 {
                buf.set_string(stats_x, area.y, &stats, stats_style);
            }
        }
    }
}

/// One-line error banner shown above the footer
pub struct ErrorBanner<'a> {
    message: &'a str,
    theme: &'a Theme,
}

impl<'a> ErrorBanner<'a> {
    pub fn new(message: &'a str, theme: &'a Theme) -> Self {
        Self { message, theme }
    }
}

impl Widget for ErrorBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 1 {
            return;
        }

        let style = Style::default()
            .fg(self.theme.selection_fg)
            .bg(self.theme.red);
        buf.set_style(area, style);

        let hint = "x dismiss";
        let room = (area.width as usize).saturating_sub(hint.len() + 4);
        buf.set_string(area.x + 1, area.y, shorten(self.message, room), style);
        buf.set_string(
            area.x + area.width - hint.len() as u16 - 1,
            area.y,
            hint,
            style.add_modifier(Modifier::BOLD),
        );
    }
}
