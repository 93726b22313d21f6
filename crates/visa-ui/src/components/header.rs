use crate::themes::Theme;
use ratatui::text::{Line, Span};
use visa_core::selection::Identity;

/// Decoration placed either side of the application title.
pub const ACCENTS: &str = "◆ ◇ ◆";

pub const TITLE: &str = " PAINEL DE PRODUÇÃO · VIGILÂNCIA SANITÁRIA ";

/// Dashboard header rendering four lines:
///
/// 1. Application title with accents.
/// 2. A 60-column `=` separator.
/// 3. `[ scope | source | atualizado hh:mm:ss ]`.
/// 4. An empty line.
pub struct Header<'a> {
    /// Who the dashboard is scoped to, see [`scope_label`].
    pub scope: String,
    /// Description of the extract source.
    pub source: &'a str,
    /// Time of the last successful refresh, `None` before the first one.
    pub updated_at: Option<String>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(identity: &Identity, source: &'a str, updated_at: Option<String>, theme: &'a Theme) -> Self {
        Self {
            scope: scope_label(identity),
            source,
            updated_at,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let updated = match &self.updated_at {
            Some(t) => format!("atualizado {t}"),
            None => "carregando…".to_string(),
        };

        vec![
            Line::from(vec![
                Span::styled(ACCENTS, self.theme.header_accent),
                Span::styled(TITLE, self.theme.header),
                Span::styled(ACCENTS, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.scope.clone(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.source.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(updated, self.theme.dim),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

/// `"administrador"` or `"inspetor NAME"`.
pub fn scope_label(identity: &Identity) -> String {
    match (identity.is_admin(), identity.inspector.as_deref()) {
        (false, Some(name)) => format!("inspetor {name}"),
        _ => "administrador".to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let header = Header::new(&Identity::admin(), "visa.csv", None, &theme);
        assert_eq!(header.to_lines().len(), 4, "header must produce exactly 4 lines");
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let lines = Header::new(&Identity::admin(), "visa.csv", None, &theme).to_lines();
        let title = text(&lines[0]);
        assert!(title.contains("PAINEL DE PRODUÇÃO"), "got: {title}");
        assert!(title.starts_with(ACCENTS) && title.ends_with(ACCENTS), "got: {title}");
    }

    #[test]
    fn test_header_separator_line() {
        let theme = Theme::dark();
        let lines = Header::new(&Identity::admin(), "visa.csv", None, &theme).to_lines();
        let sep = text(&lines[1]);
        assert_eq!(sep.chars().count(), 60);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_info_line_for_inspector() {
        let theme = Theme::dark();
        let header = Header::new(
            &Identity::inspector("ana"),
            "https://example.org/export.csv",
            Some("14:02:11".to_string()),
            &theme,
        );
        let lines = header.to_lines();
        let info = text(&lines[2]);
        assert_eq!(lines[2].spans.len(), 7);
        assert!(info.contains("inspetor ANA"), "got: {info}");
        assert!(info.contains("https://example.org/export.csv"), "got: {info}");
        assert!(info.contains("atualizado 14:02:11"), "got: {info}");
    }

    #[test]
    fn test_header_before_first_refresh() {
        let theme = Theme::dark();
        let lines = Header::new(&Identity::admin(), "visa.csv", None, &theme).to_lines();
        let info = text(&lines[2]);
        assert!(info.contains("administrador"), "got: {info}");
        assert!(info.contains("carregando"), "got: {info}");
        assert!(text(&lines[3]).is_empty());
    }
}
