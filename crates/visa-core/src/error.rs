use thiserror::Error;

/// All errors produced by the inspection dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The raw extract could not be fetched or parsed into a table.
    #[error("Source unavailable ({source_name}): {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A structurally required column is missing from the extract.
    #[error("Missing required column: {missing} (found: {})", .found.join(", "))]
    Schema { missing: String, found: Vec<String> },

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The spreadsheet export could not be produced.
    #[error("Export error: {0}")]
    Export(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DashboardError {
    /// Build a [`DashboardError::SourceUnavailable`] from any displayable reason.
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// `true` for failures that a later retry could plausibly fix.
    ///
    /// Schema and configuration problems are properties of the extract or the
    /// command line and will fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::Io(_)
        )
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
