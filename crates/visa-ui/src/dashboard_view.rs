//! Tabbed dashboard view.
//!
//! Turns a [`DashboardReport`] into lines and [`TableSpec`]s, one builder per
//! tab, and lays them out. Builders are kept separate from rendering so the
//! text can be checked without a terminal.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use visa_core::formatting::{format_count, format_number, format_percent};
use visa_core::models::CategoricalField;
use visa_core::selection::FilterSelection;
use visa_core::time_utils::{format_day_first, month_year_label, parse_year_month_key};
use visa_data::aggregator::CategoryCount;
use visa_data::analysis::DashboardReport;

use crate::components::progress_bar::ReleaseRateBar;
use crate::table_view::{self, TableRowData, TableSpec};
use crate::themes::Theme;

/// Shown on admin-only tabs for inspector identities.
pub const ADMIN_ONLY_NOTICE: &str = "Não disponível para o perfil de inspetor.";

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Dashboard tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Inspectors,
    Ranking,
    Series,
    Coordination,
    Establishments,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Overview,
        Tab::Inspectors,
        Tab::Ranking,
        Tab::Series,
        Tab::Coordination,
        Tab::Establishments,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Visão Geral",
            Self::Inspectors => "Inspetores",
            Self::Ranking => "Ranking Mensal",
            Self::Series => "Série Mensal",
            Self::Coordination => "Coordenação",
            Self::Establishments => "Estabelecimentos",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Tabs that compare inspectors against each other.
    pub fn is_admin_only(&self) -> bool {
        matches!(self, Self::Ranking | Self::Coordination)
    }
}

// ── Render ────────────────────────────────────────────────────────────────────

/// Render the body of `tab` into `area`.
pub fn render_tab(frame: &mut Frame, area: Rect, tab: Tab, report: &DashboardReport, theme: &Theme) {
    if tab.is_admin_only() && !report.identity.is_admin() {
        table_view::render_notice(frame, area, tab.title(), ADMIN_ONLY_NOTICE, theme);
        return;
    }
    if report.kpis.total == 0 && tab != Tab::Overview {
        table_view::render_no_data(frame, area, theme);
        return;
    }

    match tab {
        Tab::Overview => render_overview(frame, area, report, theme),
        Tab::Inspectors => render_inspectors(frame, area, report, theme),
        Tab::Ranking => table_view::render_table_view(frame, area, &ranking_table(report), theme),
        Tab::Series => table_view::render_table_view(frame, area, &series_table(report), theme),
        Tab::Coordination => {
            table_view::render_table_view(frame, area, &coordination_table(report), theme)
        }
        Tab::Establishments => {
            table_view::render_table_view(frame, area, &establishments_table(report), theme)
        }
    }
}

fn render_overview(frame: &mut Frame, area: Rect, report: &DashboardReport, theme: &Theme) {
    let lines = overview_lines(report, theme);
    let summary_height = lines.len() as u16 + 2;

    let mut constraints = vec![Constraint::Length(summary_height), Constraint::Min(5)];
    if report.establishment_summary.is_some() {
        constraints.push(Constraint::Length(6));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title(" Indicadores ")),
        chunks[0],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    table_view::render_table_view(
        frame,
        columns[0],
        &category_table(CategoricalField::Locality, &report.by_locality),
        theme,
    );
    table_view::render_table_view(
        frame,
        columns[1],
        &category_table(CategoricalField::Risk, &report.by_risk),
        theme,
    );

    if let Some(spec) = establishment_summary_table(report) {
        table_view::render_table_view(frame, chunks[2], &spec, theme);
    }
}

fn render_inspectors(frame: &mut Frame, area: Rect, report: &DashboardReport, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    table_view::render_table_view(frame, chunks[0], &inspector_table(report), theme);
    frame.render_widget(
        Paragraph::new(Text::from(inspector_bar_lines(report, theme))).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Taxa de liberação por inspetor "),
        ),
        chunks[1],
    );
}

// ── Line builders ─────────────────────────────────────────────────────────────

const LABEL_WIDTH: usize = 24;

fn kpi_line<'a>(label: &str, value: String, theme: &'a Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label:<LABEL_WIDTH$}"), theme.label),
        Span::styled(value, theme.value),
    ])
}

/// Headline indicators, release-rate bar, data-quality notes and the active
/// filters.
pub fn overview_lines<'a>(report: &DashboardReport, theme: &'a Theme) -> Vec<Line<'a>> {
    let kpis = &report.kpis;
    let mut lines = vec![
        kpi_line("Inspeções realizadas", format_count(kpis.total as u64), theme),
        kpi_line("Estabelecimentos", format_count(kpis.establishments as u64), theme),
        kpi_line("Inspetores", format_count(kpis.inspectors as u64), theme),
        kpi_line("Dias com inspeção", format_count(kpis.active_days as u64), theme),
    ];

    let mut bar = vec![Span::styled(
        format!("{:<LABEL_WIDTH$}", "Taxa de liberação"),
        theme.label,
    )];
    bar.extend(ReleaseRateBar::new(kpis.released, kpis.total, theme).with_width(40).to_line().spans);
    lines.push(Line::from(bar));

    if kpis.undated > 0 || kpis.unknown_status > 0 {
        lines.push(Line::from(Span::styled(
            format!(
                "{} sem data válida · {} sem status de liberação",
                format_count(kpis.undated as u64),
                format_count(kpis.unknown_status as u64)
            ),
            theme.warning,
        )));
    }

    lines.push(Line::from(vec![
        Span::styled(format!("{:<LABEL_WIDTH$}", "Filtros"), theme.label),
        Span::styled(selection_summary(&report.selection), theme.dim),
    ]));
    lines
}

/// One release-rate bar per inspector, most active first.
pub fn inspector_bar_lines<'a>(report: &DashboardReport, theme: &'a Theme) -> Vec<Line<'a>> {
    report
        .inspectors
        .iter()
        .map(|row| {
            let mut spans = vec![Span::styled(
                format!("{:<LABEL_WIDTH$}", row.inspector),
                theme.label,
            )];
            spans.extend(
                ReleaseRateBar::new(row.released, row.count, theme)
                    .with_width(30)
                    .to_line()
                    .spans,
            );
            Line::from(spans)
        })
        .collect()
}

/// Compact description of the active filters, `"nenhum"` when unrestricted.
pub fn selection_summary(selection: &FilterSelection) -> String {
    if selection.is_unrestricted() {
        return "nenhum".to_string();
    }

    let mut parts = Vec::new();
    if let Some(range) = selection.date_range {
        parts.push(format!(
            "{} a {}",
            format_day_first(range.start),
            format_day_first(range.end)
        ));
    }
    if !selection.months.is_empty() {
        let months: Vec<String> = selection.months.iter().map(|m| month_label(m)).collect();
        parts.push(format!("Meses: {}", months.join(", ")));
    }
    if !selection.dates.is_empty() {
        parts.push(format!("Datas: {}", selection.dates.len()));
    }
    for field in CategoricalField::ALL {
        if let Some(values) = selection.values(field) {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            parts.push(format!("{}: {}", field.label(), values.join(", ")));
        }
    }
    if !selection.inspectors.is_empty() {
        let names: Vec<&str> = selection.inspectors.iter().map(String::as_str).collect();
        parts.push(format!("Inspetores: {}", names.join(", ")));
    }
    parts.join(" · ")
}

/// `"2025-01"` → `"Jan/2025"`, unparsable keys unchanged.
pub fn month_label(key: &str) -> String {
    parse_year_month_key(key)
        .and_then(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1))
        .map(month_year_label)
        .unwrap_or_else(|| key.to_string())
}

// ── Table builders ────────────────────────────────────────────────────────────

pub fn inspector_table(report: &DashboardReport) -> TableSpec {
    TableSpec {
        title: "Desempenho por inspetor".to_string(),
        headers: vec![
            "Inspetor",
            "Inspeções",
            "Liberados",
            "Estab.",
            "Taxa lib.",
            "Média/dia",
            "Part.",
        ],
        widths: vec![
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
        rows: report
            .inspectors
            .iter()
            .map(|row| {
                TableRowData::new(vec![
                    row.inspector.clone(),
                    format_count(row.count as u64),
                    format_count(row.released as u64),
                    format_count(row.establishments as u64),
                    format_percent(row.release_rate),
                    format_number(row.per_day, 2),
                    format_percent(row.share),
                ])
            })
            .collect(),
    }
}

pub fn ranking_table(report: &DashboardReport) -> TableSpec {
    let month = report
        .ranking_month
        .as_deref()
        .map(month_label)
        .unwrap_or_else(|| "sem mês".to_string());

    TableSpec {
        title: format!("Ranking de inspeções · {month}  ([ / ] muda o mês)"),
        headers: vec!["#", "Inspetor", "Inspeções"],
        widths: vec![
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(10),
        ],
        rows: report
            .ranking
            .iter()
            .flatten()
            .map(|row| {
                TableRowData::ranked(
                    row.position,
                    vec![
                        format!("{}º", row.position),
                        row.inspector.clone(),
                        format_count(row.count as u64),
                    ],
                )
            })
            .collect(),
    }
}

pub fn series_table(report: &DashboardReport) -> TableSpec {
    TableSpec {
        title: "Inspeções por mês e inspetor".to_string(),
        headers: vec!["Mês", "Inspetor", "Inspeções"],
        widths: vec![
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(10),
        ],
        rows: report
            .monthly_series
            .iter()
            .map(|row| {
                TableRowData::new(vec![
                    row.month_year_label.clone(),
                    row.inspector.clone(),
                    format_count(row.count as u64),
                ])
            })
            .collect(),
    }
}

pub fn coordination_table(report: &DashboardReport) -> TableSpec {
    TableSpec {
        title: "Consolidado por coordenação".to_string(),
        headers: vec!["Coordenação", "Inspeções", "Estab.", "Liberados", "Taxa lib."],
        widths: vec![
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
        rows: report
            .coordination
            .iter()
            .flatten()
            .map(|row| {
                TableRowData::new(vec![
                    row.coordination.clone(),
                    format_count(row.count as u64),
                    format_count(row.establishments as u64),
                    format_count(row.released as u64),
                    format_percent(row.release_rate),
                ])
            })
            .collect(),
    }
}

pub fn establishments_table(report: &DashboardReport) -> TableSpec {
    TableSpec {
        title: "Estabelecimentos mais inspecionados".to_string(),
        headers: vec!["#", "Estabelecimento", "Inspeções"],
        widths: vec![
            Constraint::Length(4),
            Constraint::Min(30),
            Constraint::Length(10),
        ],
        rows: report
            .top_establishments
            .iter()
            .enumerate()
            .map(|(i, row)| {
                TableRowData::new(vec![
                    (i + 1).to_string(),
                    row.establishment.clone(),
                    format_count(row.count as u64),
                ])
            })
            .collect(),
    }
}

pub fn category_table(field: CategoricalField, counts: &[CategoryCount]) -> TableSpec {
    TableSpec {
        title: field.label().to_string(),
        headers: vec![field.label(), "Inspeções", "%"],
        widths: vec![
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
        rows: counts
            .iter()
            .map(|c| {
                TableRowData::new(vec![
                    c.value.clone(),
                    format_count(c.count as u64),
                    format_percent(c.share),
                ])
            })
            .collect(),
    }
}

/// Profile of the selected establishment, when exactly one is selected.
pub fn establishment_summary_table(report: &DashboardReport) -> Option<TableSpec> {
    let profiles = report.establishment_summary.as_ref()?;
    Some(TableSpec {
        title: "Resumo do estabelecimento".to_string(),
        headers: vec!["Estabelecimento", "Localidade", "Coordenação", "Risco"],
        widths: vec![
            Constraint::Min(24),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(12),
        ],
        rows: profiles
            .iter()
            .map(|p| {
                TableRowData::new(vec![
                    p.establishment.clone(),
                    p.locality.clone(),
                    p.coordination.clone(),
                    p.risk.clone(),
                ])
            })
            .collect(),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
