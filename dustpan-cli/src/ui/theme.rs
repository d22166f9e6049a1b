use dustpan_core::NodeKind;
use dustpan_core::status::Level;
use ratatui::style::Color;

/// Dark 24-bit palette shared by the browser and the status dashboard
pub struct Theme {
    pub bg: Color,
    pub bg_surface: Color,
    pub bg_highlight: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub fg_muted: Color,

    pub blue: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
    pub purple: Color,
    pub teal: Color,

    pub border: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        let base = Color::Rgb(30, 30, 46);
        let blue = Color::Rgb(137, 180, 250);

        Self {
            bg: base,
            bg_surface: Color::Rgb(49, 50, 68),
            bg_highlight: Color::Rgb(69, 71, 90),
            fg: Color::Rgb(205, 214, 244),
            fg_dim: Color::Rgb(166, 173, 200),
            fg_muted: Color::Rgb(127, 132, 156),

            blue,
            green: Color::Rgb(166, 227, 161),
            yellow: Color::Rgb(249, 226, 175),
            red: Color::Rgb(243, 139, 168),
            purple: Color::Rgb(203, 166, 247),
            teal: Color::Rgb(148, 226, 213),

            border: Color::Rgb(88, 91, 112),
            selection_bg: blue,
            selection_fg: base,
        }
    }
}

impl Theme {
    /// Bar color for an entry taking `percentage` of its parent.
    ///
    /// Flat green below 10%, flat yellow from 30% to 50%, blended in
    /// between and towards red above 50%.
    pub fn size_color(&self, percentage: f64) -> Color {
        match percentage {
            p if p < 10.0 => self.green,
            p if p < 30.0 => mix(self.green, self.yellow, (p - 10.0) / 20.0),
            p if p < 50.0 => self.yellow,
            p => mix(self.yellow, self.red, ((p - 50.0) / 50.0).min(1.0)),
        }
    }

    /// Color for a dashboard metric bucket
    pub fn level_color(&self, level: Level) -> Color {
        match level {
            Level::Ok => self.green,
            Level::Warn => self.yellow,
            Level::Danger => self.red,
        }
    }

    pub fn icon_color(&self, kind: NodeKind) -> Color {
        match kind {
            NodeKind::Directory => self.yellow,
            NodeKind::Symlink => self.teal,
            NodeKind::File => self.fg_dim,
        }
    }
}

/// Linear blend of two RGB colors, `t` in 0..=1
fn mix(from: Color, to: Color, t: f64) -> Color {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    match (from, to) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            Color::Rgb(channel(r1, r2), channel(g1, g2), channel(b1, b2))
        }
        _ => to,
    }
}
