use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{DashboardError, Result};
use crate::models::CategoricalField;
use crate::selection::{DateRange, FilterSelection, Identity};
use crate::time_utils::{parse_day_first, parse_year_month_key};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Painel de produção da vigilância sanitária
#[derive(Parser, Debug, Clone)]
#[command(
    name = "visa-panel",
    about = "Inspection production dashboard for the health surveillance team",
    version
)]
pub struct Settings {
    /// Extract location: an http(s) URL to a CSV export or a local CSV path
    #[arg(long, env = "VISA_SOURCE")]
    pub source: Option<String>,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "export", "report"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Seconds between background refreshes (5-3600)
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(5..=3600))]
    pub refresh_rate: u32,

    /// Seconds a fetched extract stays fresh before it is fetched again
    #[arg(long, default_value = "600")]
    pub cache_ttl: u64,

    /// Seconds before a single fetch attempt is abandoned
    #[arg(long, default_value = "30")]
    pub fetch_timeout: u64,

    /// Access tier of the viewer
    #[arg(long, default_value = "admin", value_parser = ["admin", "inspector"])]
    pub role: String,

    /// Inspector name for `--role inspector`
    #[arg(long)]
    pub as_inspector: Option<String>,

    /// First day of the date range (dd/mm/yyyy)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the date range (dd/mm/yyyy)
    #[arg(long)]
    pub to: Option<String>,

    /// Month bucket to keep (YYYY-MM); repeatable
    #[arg(long = "month")]
    pub months: Vec<String>,

    /// Exact inspection date to keep (dd/mm/yyyy); repeatable
    #[arg(long = "date")]
    pub dates: Vec<String>,

    /// Shift to keep; repeatable
    #[arg(long = "shift")]
    pub shifts: Vec<String>,

    /// Locality to keep; repeatable
    #[arg(long = "locality")]
    pub localities: Vec<String>,

    /// Establishment to keep; repeatable
    #[arg(long = "establishment")]
    pub establishments: Vec<String>,

    /// Coordinating unit to keep; repeatable
    #[arg(long = "coordination")]
    pub coordinations: Vec<String>,

    /// Risk classification to keep; repeatable
    #[arg(long = "risk")]
    pub risks: Vec<String>,

    /// Motivation to keep; repeatable
    #[arg(long = "motivation")]
    pub motivations: Vec<String>,

    /// Release status to keep (e.g. SIM, NÃO); repeatable
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// Inspector to keep (any team member matches); repeatable
    #[arg(long = "inspector")]
    pub inspectors: Vec<String>,

    /// Month shown in the ranking (YYYY-MM); defaults to the latest month
    #[arg(long)]
    pub ranking_month: Option<String>,

    /// Spreadsheet written by the export view and the `e` key
    #[arg(long, default_value = "dados_filtrados_equipes.xlsx")]
    pub output: PathBuf,

    /// Also export the per-inspector table next to `--output`
    #[arg(long)]
    pub per_inspector: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.visa-panel/last_used.json`.
///
/// Filters and identity are deliberately absent: they are chosen per session.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl: Option<u64>,
}

impl LastUsedParams {
    /// Default path: `~/.visa-panel/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".visa-panel").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Self::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI (and env, for the source) always wins over persisted values.
        if settings.source.is_none() {
            settings.source = last.source;
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "refresh_rate") {
            if let Some(v) = last.refresh_rate {
                settings.refresh_rate = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "cache_ttl") {
            if let Some(v) = last.cache_ttl {
                settings.cache_ttl = v;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!(error = %e, "could not persist last-used settings");
        }

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The configured source, or a configuration error naming the flag.
    pub fn require_source(&self) -> Result<&str> {
        self.source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                DashboardError::Config(
                    "no extract configured; pass --source or set VISA_SOURCE".to_string(),
                )
            })
    }

    /// Resolve the viewer identity from `--role` / `--as-inspector`.
    pub fn identity(&self) -> Result<Identity> {
        Identity::resolve(&self.role, self.as_inspector.as_deref())
    }

    /// Build the filter selection described by the filter flags.
    pub fn filter_selection(&self) -> Result<FilterSelection> {
        let mut selection = FilterSelection::all();

        let from = self.from.as_deref().map(parse_flag_date).transpose()?;
        let to = self.to.as_deref().map(parse_flag_date).transpose()?;
        selection.date_range = match (from, to) {
            (None, None) => None,
            (start, end) => Some(DateRange::new(
                start.unwrap_or(NaiveDate::MIN),
                end.unwrap_or(NaiveDate::MAX),
            )),
        };

        for month in &self.months {
            let key = month.trim();
            if parse_year_month_key(key).is_none() {
                return Err(DashboardError::Config(format!(
                    "invalid month {key:?}; expected YYYY-MM"
                )));
            }
            selection.months.insert(key.to_string());
        }
        for date in &self.dates {
            selection.dates.insert(parse_flag_date(date)?);
        }

        let trimmed = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        };
        selection.set_values(CategoricalField::Shift, trimmed(&self.shifts));
        selection.set_values(CategoricalField::Locality, trimmed(&self.localities));
        selection.set_values(CategoricalField::Establishment, trimmed(&self.establishments));
        selection.set_values(CategoricalField::Coordination, trimmed(&self.coordinations));
        selection.set_values(CategoricalField::Risk, trimmed(&self.risks));
        selection.set_values(CategoricalField::Motivation, trimmed(&self.motivations));
        // Stored upper-cased, so typed the same way here.
        selection.set_values(
            CategoricalField::ReleaseStatus,
            trimmed(&self.statuses).into_iter().map(|s| s.to_uppercase()),
        );
        selection.inspectors = trimmed(&self.inspectors)
            .into_iter()
            .map(|s| s.to_uppercase())
            .collect();

        Ok(selection)
    }
}

fn parse_flag_date(raw: &str) -> Result<NaiveDate> {
    parse_day_first(raw).ok_or_else(|| {
        DashboardError::Config(format!("invalid date {raw:?}; expected dd/mm/yyyy"))
    })
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            source: s.source.clone(),
            view: Some(s.view.clone()),
            theme: Some(s.theme.clone()),
            refresh_rate: Some(s.refresh_rate),
            cache_ttl: Some(s.cache_ttl),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Role;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn parse(args: &[&str]) -> Settings {
        let mut full = vec!["visa-panel"];
        full.extend_from_slice(args);
        Settings::parse_from(full)
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            source: Some("/data/visa.csv".to_string()),
            view: Some("report".to_string()),
            theme: Some("dark".to_string()),
            refresh_rate: Some(120),
            cache_ttl: Some(300),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.source.as_deref(), Some("/data/visa.csv"));
        assert_eq!(loaded.view.as_deref(), Some("report"));
        assert_eq!(loaded.theme.as_deref(), Some("dark"));
        assert_eq!(loaded.refresh_rate, Some(120));
        assert_eq!(loaded.cache_ttl, Some(300));
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).theme.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).view.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = parse(&[]);
        assert!(settings.source.is_none() || std::env::var("VISA_SOURCE").is_ok());
        assert_eq!(settings.view, "dashboard");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.refresh_rate, 60);
        assert_eq!(settings.cache_ttl, 600);
        assert_eq!(settings.role, "admin");
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.per_inspector);
        assert!(settings.months.is_empty());
    }

    #[test]
    fn test_refresh_rate_out_of_range_rejected() {
        let result = Settings::try_parse_from(["visa-panel", "--refresh-rate", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_theme() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("light".to_string()),
            cache_ttl: Some(42),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(vec!["visa-panel".into()], &config_path);
        assert_eq!(settings.theme, "light");
        assert_eq!(settings.cache_ttl, 42);
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["visa-panel".into(), "--theme".into(), "classic".into()],
            &config_path,
        );
        assert_eq!(settings.theme, "classic");
        assert_eq!(LastUsedParams::load_from(&config_path).theme.as_deref(), Some("classic"));
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&config_path).expect("save");
        assert!(config_path.exists());

        Settings::load_with_last_used_impl(
            vec!["visa-panel".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["visa-panel".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_filter_selection_empty_by_default() {
        let sel = parse(&[]).filter_selection().unwrap();
        assert!(sel.is_unrestricted());
    }

    #[test]
    fn test_filter_selection_from_flags() {
        let sel = parse(&[
            "--from",
            "01/01/2025",
            "--to",
            "31/01/2025",
            "--locality",
            " CENTRO ",
            "--locality",
            "NOSSA SENHORA DO Ó",
            "--status",
            "sim",
            "--inspector",
            "ana",
            "--month",
            "2025-01",
        ])
        .filter_selection()
        .unwrap();

        let range = sel.date_range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert_eq!(
            sel.values(CategoricalField::Locality).unwrap(),
            &BTreeSet::from(["CENTRO".to_string(), "NOSSA SENHORA DO Ó".to_string()])
        );
        assert!(sel
            .values(CategoricalField::ReleaseStatus)
            .unwrap()
            .contains("SIM"));
        assert!(sel.inspectors.contains("ANA"));
        assert!(sel.months.contains("2025-01"));
    }

    #[test]
    fn test_filter_selection_open_ended_range() {
        let sel = parse(&["--from", "15/03/2025"]).filter_selection().unwrap();
        let range = sel.date_range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(range.end, NaiveDate::MAX);
    }

    #[test]
    fn test_filter_selection_rejects_bad_input() {
        assert!(parse(&["--from", "2025/31/01"]).filter_selection().is_err());
        assert!(parse(&["--month", "Jan/2025"]).filter_selection().is_err());
    }

    #[test]
    fn test_identity_from_flags() {
        assert_eq!(parse(&[]).identity().unwrap().role, Role::Admin);
        let id = parse(&["--role", "inspector", "--as-inspector", "Bruno"])
            .identity()
            .unwrap();
        assert_eq!(id.inspector.as_deref(), Some("BRUNO"));
        assert!(parse(&["--role", "inspector"]).identity().is_err());
    }

    #[test]
    fn test_require_source() {
        let mut s = parse(&[]);
        s.source = None;
        assert!(s.require_source().is_err());
        s.source = Some(" /tmp/x.csv ".to_string());
        assert_eq!(s.require_source().unwrap(), "/tmp/x.csv");
    }
}
