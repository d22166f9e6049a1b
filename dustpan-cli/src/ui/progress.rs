use dustpan_core::{ScanProgress, format_count, format_size, truncate_path_start};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Padding, Widget},
};

use super::theme::Theme;

/// Braille spinner characters
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn spinner(frame: usize) -> char {
    SPINNER[frame % SPINNER.len()]
}

/// Progress widget shown during the first scan
pub struct ProgressView<'a> {
    progress: &'a ScanProgress,
    spinner_frame: usize,
    finalizing: bool,
    theme: &'a Theme,
}

impl<'a> ProgressView<'a> {
    pub fn new(
        progress: &'a ScanProgress,
        spinner_frame: usize,
        finalizing: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            progress,
            spinner_frame,
            finalizing,
            theme,
        }
    }
}

impl Widget for ProgressView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .padding(Padding::horizontal(1));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width < 20 {
            return;
        }

        let spinner_style = Style::default()
            .fg(self.theme.blue)
            .add_modifier(Modifier::BOLD);
        buf.set_string(
            inner.x,
            inner.y,
            spinner(self.spinner_frame).to_string(),
            spinner_style,
        );

        let status_text = if self.finalizing {
            " Finalizing... (calculating sizes)"
        } else {
            " Scanning..."
        };
        buf.set_string(
            inner.x + 2,
            inner.y,
            status_text,
            Style::default().fg(self.theme.fg),
        );

        if !self.finalizing
            && let Some(path) = &self.progress.current_path
        {
            let max_len = inner.width.saturating_sub(2) as usize;
            buf.set_string(
                inner.x,
                inner.y + 1,
                truncate_path_start(&path.to_string_lossy(), max_len),
                Style::default().fg(self.theme.fg_dim),
            );
        }

        let stats = format!(
            "{} files  {} dirs  {} errors  {}",
            format_count(self.progress.files_scanned),
            format_count(self.progress.dirs_scanned),
            format_count(self.progress.errors),
            format_size(self.progress.bytes_scanned),
        );
        buf.set_string(
            inner.x,
            inner.y + 2,
            &stats,
            Style::default().fg(self.theme.fg_muted),
        );
    }
}

/// Compact progress indicator for the header
pub fn progress_indicator(progress: &ScanProgress, spinner_frame: usize) -> String {
    format!(
        "{} {} entries, {}",
        spinner(spinner_frame),
        format_count(progress.total_entries()),
        format_size(progress.bytes_scanned)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_wraps() {
        assert_eq!(spinner(0), spinner(SPINNER.len()));
    }

    #[test]
    fn test_progress_indicator_counts_everything() {
        let progress = ScanProgress {
            files_scanned: 1_200,
            dirs_scanned: 34,
            bytes_scanned: 2048,
            ..ScanProgress::default()
        };
        let text = progress_indicator(&progress, 0);
        assert!(text.contains("1,234 entries"), "{}", text);
        assert!(text.ends_with("2.0 KB"), "{}", text);
    }
}
