//! Main application state and TUI event loop.
//!
//! [`App`] owns the theme, the active tab, the operator's selection and the
//! last snapshot received from the refresh orchestrator. Every snapshot or
//! selection change rebuilds the whole [`DashboardReport`] in one pass.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span, Text},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use visa_core::selection::{FilterSelection, Identity};
use visa_data::analysis::{build_dashboard, DashboardReport};
use visa_data::export::export_selection;
use visa_runtime::data_manager::Snapshot;
use visa_runtime::orchestrator::SnapshotUpdate;

use crate::components::header::Header;
use crate::dashboard_view::{self, Tab};
use crate::table_view;
use crate::themes::Theme;

const KEY_HELP: &str = "q sair · ←/→ abas · [ ] mês do ranking · e exportar";

/// Where the `e` key writes the filtered spreadsheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub path: PathBuf,
    /// Also write the one-row-per-inspector workbook.
    pub per_inspector: bool,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub tab: Tab,
    pub identity: Identity,
    pub selection: FilterSelection,
    /// Month chosen with `[` / `]`; `None` follows the latest month present.
    pub ranking_month: Option<String>,
    pub export: ExportTarget,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    pub snapshot: Option<Arc<Snapshot>>,
    /// Report derived from `snapshot`, rebuilt on every change.
    pub report: Option<DashboardReport>,
    /// Failure of the last refresh. With a snapshot this means the data
    /// shown is from an earlier refresh.
    pub last_error: Option<String>,
    /// Footer message, e.g. the result of an export.
    pub status: Option<String>,
}

impl App {
    pub fn new(
        theme_name: &str,
        identity: Identity,
        selection: FilterSelection,
        ranking_month: Option<String>,
        export: ExportTarget,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            tab: Tab::Overview,
            identity,
            selection,
            ranking_month,
            export,
            should_quit: false,
            snapshot: None,
            report: None,
            last_error: None,
            status: None,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard, receiving snapshots from `rx`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the terminal
    /// loop stays on the current thread while updates arrive on the async
    /// channel via `try_recv`.
    pub async fn run_dashboard(mut self, mut rx: mpsc::Receiver<SnapshotUpdate>) -> io::Result<()> {
        // Dropped last, after the terminal, on every exit path.
        let _guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        self.event_loop(&mut terminal, &mut rx)
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        rx: &mut mpsc::Receiver<SnapshotUpdate>,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            self.drain_updates(rx);

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Apply every pending update; a closed channel ends the session.
    fn drain_updates(&mut self, rx: &mut mpsc::Receiver<SnapshotUpdate>) {
        loop {
            match rx.try_recv() {
                Ok(update) => self.apply_update(update),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.should_quit = true;
                    break;
                }
            }
        }
    }

    // ── State transitions ─────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.previous(),
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                self.tab = Tab::ALL[index];
            }
            KeyCode::Char('[') => self.shift_ranking_month(-1),
            KeyCode::Char(']') => self.shift_ranking_month(1),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_current(),
            _ => {}
        }
    }

    /// Take a message from the refresh loop.
    pub fn apply_update(&mut self, update: SnapshotUpdate) {
        match update {
            SnapshotUpdate::Ready {
                snapshot,
                stale_error,
            } => {
                if let Some(error) = &stale_error {
                    tracing::warn!(error = %error, "refresh failed; showing previous snapshot");
                }
                self.snapshot = Some(snapshot);
                self.last_error = stale_error;
                self.recompute();
            }
            SnapshotUpdate::Failed(message) => {
                tracing::warn!(error = %message, "dashboard has no snapshot");
                self.last_error = Some(message);
            }
        }
    }

    /// Move the ranking month through the months available to this
    /// identity, stopping at either end.
    pub fn shift_ranking_month(&mut self, delta: isize) {
        let Some(report) = &self.report else {
            return;
        };
        let months = &report.options.months;
        if months.is_empty() {
            return;
        }

        let current = report
            .ranking_month
            .as_ref()
            .and_then(|m| months.iter().position(|x| x == m))
            .unwrap_or(months.len() - 1);
        let target = current
            .saturating_add_signed(delta)
            .min(months.len() - 1);

        if target != current || self.ranking_month.is_none() {
            self.ranking_month = Some(months[target].clone());
            self.recompute();
        }
    }

    /// Write the filtered table(s) to the configured export path.
    pub fn export_current(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            self.status = Some("Nada para exportar: dados ainda não carregados".to_string());
            return;
        };

        self.status = Some(
            match export_selection(
                &snapshot.table,
                &self.selection,
                &self.identity,
                &self.export.path,
                self.export.per_inspector,
            ) {
                Ok(paths) => {
                    let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                    format!("Exportado: {}", names.join(", "))
                }
                Err(e) => {
                    tracing::error!(error = %e, "export failed");
                    format!("Falha ao exportar: {e}")
                }
            },
        );
    }

    fn recompute(&mut self) {
        if let Some(snapshot) = &self.snapshot {
            self.report = Some(build_dashboard(
                &snapshot.table,
                &self.selection,
                &self.identity,
                self.ranking_month.as_deref(),
            ));
        }
    }

    // ── Render ────────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let (source, updated) = match &self.snapshot {
            Some(s) => (s.source.as_str(), Some(s.fetched_at.format("%H:%M:%S").to_string())),
            None => ("", None),
        };
        let header = Header::new(&self.identity, source, updated, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), chunks[0]);

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider(" │ ");
        frame.render_widget(tabs, chunks[1]);

        match (&self.report, &self.last_error) {
            (Some(report), _) => {
                dashboard_view::render_tab(frame, chunks[2], self.tab, report, &self.theme)
            }
            (None, Some(error)) => table_view::render_error(frame, chunks[2], error, &self.theme),
            (None, None) => table_view::render_notice(
                frame,
                chunks[2],
                "Painel de Produção",
                "Carregando dados…",
                &self.theme,
            ),
        }

        let mut footer = vec![Span::styled(KEY_HELP, self.theme.dim)];
        if let (Some(_), Some(error)) = (&self.report, &self.last_error) {
            footer.push(Span::styled("  ·  ", self.theme.dim));
            footer.push(Span::styled(
                format!("Falha na atualização, exibindo dados anteriores: {error}"),
                self.theme.warning,
            ));
        }
        if let Some(status) = &self.status {
            footer.push(Span::styled("  ·  ", self.theme.dim));
            footer.push(Span::styled(status.clone(), self.theme.info));
        }
        frame.render_widget(Paragraph::new(Line::from(footer)), chunks[3]);
    }
}

// ── Terminal guard ────────────────────────────────────────────────────────────

/// Raw mode plus the alternate screen, undone when dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        // From here on a failure still restores through `Drop`.
        let guard = Self;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::debug!(error = %e, "failed to disable raw mode");
        }
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, LeaveAlternateScreen, cursor::Show) {
            tracing::debug!(error = %e, "failed to leave alternate screen");
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
