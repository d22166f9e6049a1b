mod app;
mod logging;
mod tui;
mod ui;

use std::io::{self, Stdout, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use color_eyre::Result;
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dustpan_core::status::{StatusCollector, StatusSnapshot};
use dustpan_core::{ScanConfig, format_size, validate_root};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Style,
    widgets::Widget,
};
use tracing::info;

use app::{Action, AppMode, AppState};
use tui::{AppEvent, EventHandler, handle_key};
use ui::{
    AppLayout, ConfirmDeleteView, DeleteProgressView, ErrorBanner, Footer, Header, HelpView,
    ProgressView, StatusView, Theme, TreeView,
};

/// Redraw and worker-poll cadence
const TICK: Duration = Duration::from_millis(50);

/// Delay before the first dashboard sample, so CPU usage has a baseline
const FIRST_SAMPLE: Duration = Duration::from_millis(300);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// DUSTPAN - browse disk usage, sweep away what you don't need
#[derive(Parser, Debug)]
#[command(name = "dustpan")]
#[command(
    about = "Interactive terminal disk usage browser with bulk delete and a system status dashboard"
)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Maximum depth to scan
    #[arg(short, long)]
    max_depth: Option<usize>,

    /// Follow symbolic links
    #[arg(short, long)]
    follow_symlinks: bool,

    /// Cross filesystem boundaries
    #[arg(short = 'x', long)]
    cross_filesystems: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Live system status: CPU, memory, disks, network, battery, top processes
    Status {
        /// Print one snapshot as JSON and exit
        #[arg(long)]
        json: bool,

        /// Refresh interval of the live dashboard
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(100..))]
        interval_ms: u64,
    },
}

impl Args {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            follow_symlinks: self.follow_symlinks,
            max_depth: self.max_depth,
            same_filesystem: !self.cross_filesystems,
            num_threads: 0,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _log_guard = logging::init_logging();

    let args = Args::parse();

    match args.command {
        Some(Command::Status { json: true, .. }) => {
            let snapshot = StatusCollector::snapshot_once();
            println!("{}", snapshot.to_json()?);
            Ok(())
        }
        Some(Command::Status { interval_ms, .. }) => {
            info!(interval_ms, "status dashboard started");
            with_terminal(|terminal| run_status(terminal, Duration::from_millis(interval_ms)))
        }
        None => {
            let path = validate_root(&args.path)?;
            info!(root = %path.display(), "browser started");
            let config = args.scan_config();
            with_terminal(|terminal| run_app(terminal, path, config))
        }
    }
}

/// Run `body` on the alternate screen, restoring the terminal however it ends
fn with_terminal(body: impl FnOnce(&mut Tui) -> Result<()>) -> Result<()> {
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(out))?;
    terminal.clear()?;

    let result = body(&mut terminal);

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Tui, path: PathBuf, config: ScanConfig) -> Result<()> {
    let theme = Theme::default();
    let mut state = AppState::new(path, config);
    let event_handler = EventHandler::new(TICK);

    state.start_scan();

    loop {
        state.poll_scan();

        terminal.draw(|frame| {
            let area = frame.area();
            let layout = AppLayout::new(area, state.error_message.is_some());
            let buf = frame.buffer_mut();

            buf.set_style(area, Style::default().bg(theme.bg));
            state.visible_height = layout.tree.height as usize;

            Header::new(&state, &theme).render(layout.header, buf);
            render_size_bar(&state, &theme, layout.size_bar, buf);

            match state.mode {
                AppMode::Scanning | AppMode::Finalizing => {
                    ProgressView::new(
                        &state.progress,
                        state.spinner_frame,
                        state.mode == AppMode::Finalizing,
                        &theme,
                    )
                    .render(layout.tree, buf);
                }
                AppMode::Browsing | AppMode::Help | AppMode::ConfirmDelete | AppMode::Deleting => {
                    if let Some(tree) = &state.tree {
                        TreeView::new(
                            tree,
                            state.view_root,
                            state.selected_index,
                            state.scroll_offset,
                            &state.selected_nodes,
                            &theme,
                        )
                        .render(layout.tree, buf);
                    }

                    match state.mode {
                        AppMode::Help => HelpView::new(&theme).render(area, buf),
                        AppMode::ConfirmDelete => {
                            ConfirmDeleteView::new(&state.pending_delete, &theme).render(area, buf)
                        }
                        AppMode::Deleting => DeleteProgressView::new(
                            state.delete_progress(),
                            state.delete_roots(),
                            state.spinner_frame,
                            &theme,
                        )
                        .quitting(state.quit_after_delete)
                        .render(area, buf),
                        _ => {}
                    }
                }
            }

            if let (Some(banner), Some(message)) = (layout.banner, &state.error_message) {
                ErrorBanner::new(message, &theme).render(banner, buf);
            }
            Footer::new(&state, &theme).render(layout.footer, buf);
        })?;

        state.poll_delete();

        match event_handler.next()? {
            AppEvent::Key(key) => {
                let action = handle_key(key, state.mode);
                handle_action(&mut state, action);
            }
            AppEvent::Resize(_, _) => {}
            AppEvent::Tick => state.tick_spinner(),
        }

        if state.should_quit {
            state.cancel_scan();
            break;
        }
    }

    // Quit waits for the deletion, but never exit with one half done
    state.wait_for_delete();

    // Large trees take a while to free
    if let Some(tree) = state.tree.take() {
        std::thread::spawn(move || drop(tree));
    }

    Ok(())
}

fn handle_action(state: &mut AppState, action: Action) {
    match action {
        Action::MoveUp => state.move_up(),
        Action::MoveDown => state.move_down(),
        Action::PageUp => state.page_up(),
        Action::PageDown => state.page_down(),
        Action::GoToFirst => state.go_to_first(),
        Action::GoToLast => state.go_to_last(),
        Action::Expand => state.expand_selected(),
        Action::Collapse => state.collapse_selected(),
        Action::Toggle => state.toggle_selected(),
        Action::DrillDown => state.drill_down(),
        Action::GoBack => state.go_back(),
        Action::ToggleSelect => state.toggle_select(),
        Action::SelectUp => state.select_move_up(),
        Action::SelectDown => state.select_move_down(),
        Action::ClearSelection => state.clear_selection(),
        Action::ShowHelp => state.show_help(),
        Action::HideHelp => state.hide_help(),
        Action::Delete => state.request_delete(),
        Action::ConfirmDelete => state.confirm_delete(),
        Action::CancelDelete => state.cancel_delete(),
        Action::HideDeleteProgress => state.hide_delete_progress(),
        Action::DismissError => state.clear_error(),
        Action::Quit => state.quit(),
        Action::Tick => {}
    }
}

fn render_size_bar(state: &AppState, theme: &Theme, area: Rect, buf: &mut Buffer) {
    if area.width < 30 {
        return;
    }

    let bar_width = area.width.saturating_sub(22) as usize;
    let (bar, label) = match &state.tree {
        Some(tree) => (
            ui::bar_chart::render_bar(100.0, bar_width),
            format!("{} total", format_size(tree.total_size())),
        ),
        // Final total is unknown while scanning
        None => (
            ui::bar_chart::pulse_bar(state.spinner_frame, bar_width),
            format!("{} scanned", format_size(state.progress.bytes_scanned)),
        ),
    };

    buf.set_string(area.x + 1, area.y, &bar, Style::default().fg(theme.green));
    let label_x = (area.x + area.width).saturating_sub(label.chars().count() as u16 + 1);
    buf.set_string(label_x, area.y, &label, Style::default().fg(theme.fg_dim));
}

fn run_status(terminal: &mut Tui, interval: Duration) -> Result<()> {
    let theme = Theme::default();
    let event_handler = EventHandler::new(TICK);
    let mut collector = StatusCollector::new();
    let mut snapshot: Option<StatusSnapshot> = None;
    let mut next_sample = Instant::now() + FIRST_SAMPLE;
    let mut spinner_frame = 0usize;

    loop {
        if Instant::now() >= next_sample {
            snapshot = Some(collector.refresh());
            next_sample = Instant::now() + interval;
        }

        terminal.draw(|frame| {
            let area = frame.area();
            StatusView::new(snapshot.as_ref(), spinner_frame, &theme)
                .render(area, frame.buffer_mut());
        })?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                let ctrl_c = key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL);
                if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
            }
            AppEvent::Resize(_, _) => {}
            AppEvent::Tick => spinner_frame = spinner_frame.wrapping_add(1),
        }
    }

    Ok(())
}
