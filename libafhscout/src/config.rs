//! Configuration management for AFH Property Scout

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::AnalyzerKind;
use crate::error::{ConfigError, Result};
use crate::guard::ConcurrencyPolicy;

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "AFH_SCOUT_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub notifications: NotificationConfig,
    pub guard: GuardConfig,
    pub search: SearchConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Time a notification stays visible before it is dismissed automatically
    pub auto_dismiss_ms: u64,
    /// Cap on simultaneously active notifications; oldest are evicted first.
    /// Unbounded when absent.
    pub max_active: Option<usize>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            auto_dismiss_ms: 5000,
            max_active: None,
        }
    }
}

impl NotificationConfig {
    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_millis(self.auto_dismiss_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub policy: ConcurrencyPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Analyzer selection plus the inputs of the AFH financial model.
///
/// Day rates and monthly costs are in USD; rates and ratios are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub analyzer: AnalyzerKind,
    /// Artificial latency of the simulated analysis request
    pub simulated_delay_ms: u64,

    pub medicaid_rate_per_day: f64,
    pub private_pay_rate_per_day: f64,
    pub occupancy_rate: f64,
    /// Share of beds expected to be Medicaid residents
    pub medicaid_share: f64,

    pub utilities: f64,
    pub insurance: f64,
    pub maintenance: f64,
    pub supplies: f64,
    pub licensing_fees: f64,

    pub loan_to_value: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,

    pub min_cash_flow: f64,
    pub min_cap_rate: f64,
    /// Viability score (0-100) at or above which a property is viable
    pub viability_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerKind::Simulated,
            simulated_delay_ms: 2000,
            medicaid_rate_per_day: 120.0,
            private_pay_rate_per_day: 200.0,
            occupancy_rate: 0.85,
            medicaid_share: 0.6,
            utilities: 800.0,
            insurance: 400.0,
            maintenance: 600.0,
            supplies: 500.0,
            licensing_fees: 200.0,
            loan_to_value: 0.8,
            interest_rate: 0.06,
            loan_term_years: 30,
            min_cash_flow: 3000.0,
            min_cap_rate: 0.08,
            viability_threshold: 70.0,
        }
    }
}

impl AnalysisConfig {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    pub fn monthly_expenses(&self) -> f64 {
        self.utilities + self.insurance + self.maintenance + self.supplies + self.licensing_fees
    }

    /// Check the model inputs for values the financial formulas cannot use
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("analysis.occupancy_rate", self.occupancy_rate),
            ("analysis.medicaid_share", self.medicaid_share),
            ("analysis.loan_to_value", self.loan_to_value),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("must be between 0 and 1, got {}", value)));
            }
        }

        let non_negative = [
            ("analysis.medicaid_rate_per_day", self.medicaid_rate_per_day),
            ("analysis.private_pay_rate_per_day", self.private_pay_rate_per_day),
            ("analysis.utilities", self.utilities),
            ("analysis.insurance", self.insurance),
            ("analysis.maintenance", self.maintenance),
            ("analysis.supplies", self.supplies),
            ("analysis.licensing_fees", self.licensing_fees),
            ("analysis.interest_rate", self.interest_rate),
            ("analysis.min_cash_flow", self.min_cash_flow),
            ("analysis.min_cap_rate", self.min_cap_rate),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must not be negative, got {}", value)));
            }
        }

        if self.loan_term_years == 0 {
            return Err(invalid("analysis.loan_term_years", "must be at least 1".to_string()));
        }
        if !(0.0..=100.0).contains(&self.viability_threshold) {
            return Err(invalid(
                "analysis.viability_threshold",
                format!("must be between 0 and 100, got {}", self.viability_threshold),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> crate::ScoutError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason,
    }
    .into()
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from the default location, falling back to
    /// defaults when no file exists there
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("afh-scout").join("config.toml"))
}
