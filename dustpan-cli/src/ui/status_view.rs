use dustpan_core::status::{
    DiskStatus, StatusSnapshot, battery_level, disk_label, split_disks, usage_level,
};
use dustpan_core::{format_rate, format_size_compact, shorten};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Padding, Widget},
};

use super::bar_chart::render_bar;
use super::progress::spinner;
use super::theme::Theme;

const LABEL_WIDTH: u16 = 6;
const BAR_WIDTH: usize = 20;

/// Live system dashboard
pub struct StatusView<'a> {
    snapshot: Option<&'a StatusSnapshot>,
    spinner_frame: usize,
    theme: &'a Theme,
}

impl<'a> StatusView<'a> {
    pub fn new(
        snapshot: Option<&'a StatusSnapshot>,
        spinner_frame: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            snapshot,
            spinner_frame,
            theme,
        }
    }

    fn panel(&self, title: &'static str) -> Block<'static> {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .title_style(
                Style::default()
                    .fg(self.theme.blue)
                    .add_modifier(Modifier::BOLD),
            )
            .padding(Padding::horizontal(1))
    }

    /// `LABEL ▕bar▏ 42.0%  detail`, coloured by how bad `percent` is
    fn gauge(
        &self,
        buf: &mut Buffer,
        area: Rect,
        label: &str,
        percent: f64,
        detail: &str,
        usage: bool,
    ) {
        if area.width < LABEL_WIDTH + 10 || area.height < 1 {
            return;
        }
        let level = if usage {
            usage_level(percent)
        } else {
            battery_level(percent)
        };
        let color = self.theme.level_color(level);

        buf.set_string(
            area.x,
            area.y,
            label,
            Style::default().fg(self.theme.fg).add_modifier(Modifier::BOLD),
        );

        let bar_width = BAR_WIDTH.min((area.width - LABEL_WIDTH) as usize / 3);
        let mut x = area.x + LABEL_WIDTH;
        buf.set_string(x, area.y, render_bar(percent, bar_width), Style::default().fg(color));
        x += bar_width as u16 + 1;

        let pct = format!("{:>5.1}%", percent);
        buf.set_string(x, area.y, &pct, Style::default().fg(color));
        x += pct.len() as u16 + 2;

        let room = (area.x + area.width).saturating_sub(x) as usize;
        buf.set_string(x, area.y, shorten(detail, room), Style::default().fg(self.theme.fg_dim));
    }

    fn render_cpu(&self, snapshot: &StatusSnapshot, area: Rect, buf: &mut Buffer) {
        let block = self.panel(" CPU ");
        let inner = block.inner(area);
        block.render(area, buf);

        let cpu = &snapshot.cpu;
        let detail = format!("{} cores", cpu.cores);
        self.gauge(buf, row(inner, 0), "USE", cpu.usage_percent, &detail, true);

        let load = format!(
            "load {:.2} {:.2} {:.2}",
            cpu.load_one, cpu.load_five, cpu.load_fifteen
        );
        let line = row(inner, 1);
        if line.height > 0 {
            buf.set_string(
                line.x,
                line.y,
                shorten(&load, line.width as usize),
                Style::default().fg(self.theme.fg_dim),
            );
        }
    }

    fn render_memory(&self, snapshot: &StatusSnapshot, area: Rect, buf: &mut Buffer) {
        let block = self.panel(" Memory ");
        let inner = block.inner(area);
        block.render(area, buf);

        let memory = &snapshot.memory;
        let detail = format!(
            "{}/{}",
            format_size_compact(memory.used),
            format_size_compact(memory.total)
        );
        self.gauge(buf, row(inner, 0), "RAM", memory.used_percent, &detail, true);
    }

    fn render_disks(&self, snapshot: &StatusSnapshot, area: Rect, buf: &mut Buffer) {
        let block = self.panel(" Disks ");
        let inner = block.inner(area);
        block.render(area, buf);

        let (internal, external) = split_disks(&snapshot.disks);
        let labelled = labelled_disks("INTR", &internal)
            .into_iter()
            .chain(labelled_disks("EXTR", &external));

        for (i, (label, disk)) in labelled.enumerate() {
            let line = row(inner, i as u16);
            if line.height == 0 {
                break;
            }
            let detail = format!(
                "{}/{}  {}",
                format_size_compact(disk.used),
                format_size_compact(disk.total),
                disk.mount.display()
            );
            self.gauge(buf, line, &label, disk.used_percent, &detail, true);
        }
    }

    fn render_network(&self, snapshot: &StatusSnapshot, area: Rect, buf: &mut Buffer) {
        let block = self.panel(" Network ");
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 {
            return;
        }

        let network = &snapshot.network;
        let label_style = Style::default().fg(self.theme.fg).add_modifier(Modifier::BOLD);
        buf.set_string(inner.x, inner.y, "↓ RX", label_style);
        buf.set_string(
            inner.x + LABEL_WIDTH,
            inner.y,
            format_rate(network.rx_mb_per_sec),
            Style::default().fg(self.theme.teal),
        );
        buf.set_string(inner.x, inner.y + 1, "↑ TX", label_style);
        buf.set_string(
            inner.x + LABEL_WIDTH,
            inner.y + 1,
            format_rate(network.tx_mb_per_sec),
            Style::default().fg(self.theme.purple),
        );
    }

    fn render_battery(&self, snapshot: &StatusSnapshot, area: Rect, buf: &mut Buffer) {
        let block = self.panel(" Power ");
        let inner = block.inner(area);
        block.render(area, buf);

        match &snapshot.battery {
            Some(battery) => {
                self.gauge(buf, row(inner, 0), "BAT", battery.percent, &battery.state, false);
            }
            None => {
                let style = Style::default().fg(self.theme.fg_muted);
                buf.set_string(inner.x, inner.y, "No battery", style);
            }
        }
    }

    fn render_processes(&self, snapshot: &StatusSnapshot, area: Rect, buf: &mut Buffer) {
        let block = self.panel(" Top processes ");
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width < 30 || inner.height < 1 {
            return;
        }

        let header_style = Style::default().fg(self.theme.fg_muted);
        let name_width = inner.width.saturating_sub(16) as usize;
        buf.set_string(inner.x, inner.y, "NAME", header_style);
        buf.set_string(inner.x + name_width as u16, inner.y, "   CPU    MEM", header_style);

        for (i, process) in snapshot.processes.iter().enumerate() {
            let line = row(inner, i as u16 + 1);
            if line.height == 0 {
                break;
            }
            let color = self.theme.level_color(usage_level(process.cpu_percent));
            buf.set_string(
                line.x,
                line.y,
                shorten(&process.name, name_width.saturating_sub(1)),
                Style::default().fg(self.theme.fg),
            );
            buf.set_string(
                line.x + name_width as u16,
                line.y,
                format!("{:>5.1}%", process.cpu_percent),
                Style::default().fg(color),
            );
            buf.set_string(
                line.x + name_width as u16 + 7,
                line.y,
                format!("{:>5.1}%", process.memory_percent),
                Style::default().fg(self.theme.fg_dim),
            );
        }
    }
}

impl Widget for StatusView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.theme.bg));
        if area.width < 40 || area.height < 10 {
            let style = Style::default().fg(self.theme.yellow);
            buf.set_string(area.x, area.y, "Terminal too small", style);
            return;
        }

        let title_style = Style::default()
            .fg(self.theme.blue)
            .add_modifier(Modifier::BOLD);
        buf.set_string(area.x + 1, area.y, "DUSTPAN STATUS", title_style);
        buf.set_string(
            area.x + area.width - 20,
            area.y,
            "q quit",
            Style::default().fg(self.theme.fg_dim),
        );

        let Some(snapshot) = self.snapshot else {
            buf.set_string(
                area.x + 1,
                area.y + 2,
                format!("{} Sampling...", spinner(self.spinner_frame)),
                Style::default().fg(self.theme.yellow),
            );
            return;
        };

        let disk_rows = snapshot.disks.len().max(1) as u16;
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Length(disk_rows + 2),
                Constraint::Length(4),
                Constraint::Min(3),
            ])
            .split(area);

        let top = split_columns(sections[1]);
        self.render_cpu(snapshot, top[0], buf);
        self.render_memory(snapshot, top[1], buf);

        self.render_disks(snapshot, sections[2], buf);

        let middle = split_columns(sections[3]);
        self.render_network(snapshot, middle[0], buf);
        self.render_battery(snapshot, middle[1], buf);

        self.render_processes(snapshot, sections[4], buf);
    }
}

fn split_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

/// Single line `n` of `area`, zero-height once past the bottom
fn row(area: Rect, n: u16) -> Rect {
    if n >= area.height {
        return Rect::new(area.x, area.y, area.width, 0);
    }
    Rect::new(area.x, area.y + n, area.width, 1)
}

fn labelled_disks<'d>(prefix: &str, disks: &[&'d DiskStatus]) -> Vec<(String, &'d DiskStatus)> {
    disks
        .iter()
        .enumerate()
        .map(|(i, &disk)| (disk_label(prefix, i, disks.len()), disk))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use dustpan_core::status::{
        BatteryStatus, CpuStatus, MemoryStatus, NetworkStatus, ProcessInfo,
    };

    use super::*;

    fn disk(mount: &str, external: bool) -> DiskStatus {
        DiskStatus {
            mount: PathBuf::from(mount),
            used: 50 * 1024 * 1024 * 1024,
            total: 100 * 1024 * 1024 * 1024,
            used_percent: 50.0,
            external,
        }
    }

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            cpu: CpuStatus {
                usage_percent: 12.5,
                cores: 8,
                load_one: 1.0,
                load_five: 0.5,
                load_fifteen: 0.25,
            },
            memory: MemoryStatus {
                used: 8 * 1024 * 1024 * 1024,
                total: 16 * 1024 * 1024 * 1024,
                used_percent: 50.0,
            },
            disks: vec![disk("/", false), disk("/data", false), disk("/media/usb", true)],
            network: NetworkStatus {
                rx_mb_per_sec: 1.5,
                tx_mb_per_sec: 0.25,
            },
            battery: Some(BatteryStatus {
                percent: 15.0,
                state: "Discharging".to_string(),
            }),
            processes: vec![ProcessInfo {
                name: "cargo".to_string(),
                cpu_percent: 90.0,
                memory_percent: 3.2,
            }],
        }
    }

    fn render(snapshot: Option<&StatusSnapshot>) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        StatusView::new(snapshot, 0, &theme).render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_disk_labels_are_numbered_per_group() {
        let disks = [disk("/", false), disk("/data", false)];
        let refs: Vec<&DiskStatus> = disks.iter().collect();
        let labels: Vec<String> = labelled_disks("INTR", &refs)
            .into_iter()
            .map(|(l, _)| l)
            .collect();
        assert_eq!(labels, vec!["INTR1", "INTR2"]);

        let single = [disk("/media/usb", true)];
        let refs: Vec<&DiskStatus> = single.iter().collect();
        assert_eq!(labelled_disks("EXTR", &refs)[0].0, "EXTR");
    }

    #[test]
    fn test_dashboard_renders_every_panel() {
        let snapshot = snapshot();
        let text = render(Some(&snapshot));
        for expected in [
            "CPU",
            "Memory",
            "INTR1",
            "INTR2",
            "EXTR",
            "1.5 MB/s",
            "0.25 MB/s",
            "Discharging",
            "cargo",
            "8.0G/16.0G",
        ] {
            assert!(text.contains(expected), "missing {:?}", expected);
        }
    }

    #[test]
    fn test_dashboard_before_first_sample() {
        let text = render(None);
        assert!(text.contains("Sampling..."));
    }

    #[test]
    fn test_row_past_bottom_is_empty() {
        let area = Rect::new(0, 0, 10, 2);
        assert_eq!(row(area, 1).height, 1);
        assert_eq!(row(area, 2).height, 0);
    }
}
