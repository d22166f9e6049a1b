use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main application layout
pub struct AppLayout {
    pub header: Rect,
    pub size_bar: Rect,
    pub tree: Rect,
    /// Error line above the footer, only when there is something to show
    pub banner: Option<Rect>,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect, with_banner: bool) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                          // Header
                Constraint::Length(1),                          // Size bar
                Constraint::Min(5),                             // Tree view
                Constraint::Length(if with_banner { 1 } else { 0 }), // Banner
                Constraint::Length(1),                          // Footer
            ])
            .split(area);

        Self {
            header: chunks[0],
            size_bar: chunks[1],
            tree: chunks[2],
            banner: with_banner.then_some(chunks[3]),
            footer: chunks[4],
        }
    }
}

/// Fixed-size rectangle centered in `area`, shrunk to leave a margin
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_row_only_when_requested() {
        let area = Rect::new(0, 0, 80, 24);

        let plain = AppLayout::new(area, false);
        assert!(plain.banner.is_none());
        assert_eq!(plain.footer.y, 23);

        let with_banner = AppLayout::new(area, true);
        let banner = with_banner.banner.unwrap();
        assert_eq!(banner.y, 22);
        assert_eq!(banner.height, 1);
        assert_eq!(with_banner.tree.height + 1, plain.tree.height);
    }

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = centered_rect(50, 9, area);
        assert_eq!(rect.width, 26);
        assert_eq!(rect.height, 6);
        assert_eq!(rect.x, 2);
        assert_eq!(rect.y, 2);
    }
}
