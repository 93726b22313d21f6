//! Bordered tables and placeholder panels.
//!
//! Every dashboard table goes through [`render_table_view`]; the dashboard
//! view only decides titles, columns and cell text.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::themes::Theme;

/// One data row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRowData {
    pub cells: Vec<String>,
    /// Ranking position, used to highlight the podium.
    pub position: Option<usize>,
}

impl TableRowData {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            position: None,
        }
    }

    pub fn ranked(position: usize, cells: Vec<String>) -> Self {
        Self {
            cells,
            position: Some(position),
        }
    }
}

/// Column layout and content of one table.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub title: String,
    pub headers: Vec<&'static str>,
    pub widths: Vec<Constraint>,
    pub rows: Vec<TableRowData>,
}

/// Render `spec` into `area`: header row, alternating data rows, bordered
/// block titled with `spec.title`.
pub fn render_table_view(frame: &mut Frame, area: Rect, spec: &TableSpec, theme: &Theme) {
    let header = Row::new(
        spec.headers
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = spec
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Row::new(row.cells.iter().map(|c| Cell::from(c.clone())))
                .style(theme.row_style(i, row.position))
        })
        .collect();

    let table = Table::new(rows, spec.widths.clone())
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", spec.title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder when the selection leaves nothing to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Nenhuma inspeção encontrada para os filtros selecionados",
            theme.warning,
        )),
        Line::from(""),
        Line::from(Span::styled("Ajuste os filtros e tente novamente.", theme.dim)),
    ];
    render_panel(frame, area, " Sem dados ", text);
}

/// Placeholder for a panel the current identity is not allowed to see.
pub fn render_notice(frame: &mut Frame, area: Rect, title: &str, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.info)),
    ];
    render_panel(frame, area, &format!(" {title} "), text);
}

/// Full-screen error shown when no snapshot could be loaded.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Fonte de dados indisponível", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.text)),
        Line::from(""),
        Line::from(Span::styled(
            "Nova tentativa no próximo ciclo de atualização. 'q' ou Ctrl+C para sair.",
            theme.dim,
        )),
    ];
    render_panel(frame, area, " Painel de Produção ", text);
}

fn render_panel(frame: &mut Frame, area: Rect, title: &str, text: Vec<Line<'_>>) {
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title.to_string())),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
