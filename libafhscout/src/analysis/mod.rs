//! Property analysis requests and the analyzers that answer them
//!
//! Two analyzers implement [`PropertyAnalyzer`]:
//!
//! - [`SimulatedAnalyzer`] stands in for a remote service: it waits, then
//!   makes up plausible numbers.
//! - [`AfhAnalyzer`] runs the deterministic Adult Family Home financial
//!   model (revenue from resident day rates, debt service, cap rate, WABO
//!   readiness, risk and negotiation pricing).
//!
//! # Examples
//!
//! ```no_run
//! use libafhscout::analysis::{AfhAnalyzer, PropertyAnalyzer, PropertyRequest};
//! use libafhscout::config::AnalysisConfig;
//!
//! # async fn example() -> libafhscout::Result<()> {
//! let analyzer = AfhAnalyzer::from_config(&AnalysisConfig::default())?;
//! let request = PropertyRequest {
//!     price: Some(650_000.0),
//!     bedrooms: Some(5),
//!     county: Some("Pierce".to_string()),
//!     ..PropertyRequest::new("456 Oak Ave, Tacoma, WA")
//! };
//!
//! let report = analyzer.analyze(&request).await?;
//! println!("Viability: {}%", report.viability_score);
//! # Ok(())
//! # }
//! ```

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{Result, ScoutError};

pub mod afh;
pub mod simulated;

pub use afh::{AfhAnalyzer, AfhBreakdown};
pub use simulated::SimulatedAnalyzer;

pub const DEFAULT_PRICE: f64 = 600_000.0;
pub const DEFAULT_SQFT: f64 = 2_500.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyRequest {
    pub address: String,
    /// Asking price in USD; [`DEFAULT_PRICE`] when absent
    pub price: Option<f64>,
    /// Living area in square feet; [`DEFAULT_SQFT`] when absent
    pub sqft: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    /// Free-form listing type, e.g. "Rambler" or "Two Story"
    pub property_type: Option<String>,
    pub county: Option<String>,
    /// WABO status as advertised by the listing
    pub wabo: Option<ListingWabo>,
    /// Listing description, scanned for licensing and condition keywords
    pub description: Option<String>,
}

impl PropertyRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn price(&self) -> f64 {
        self.price.unwrap_or(DEFAULT_PRICE)
    }

    pub fn sqft(&self) -> f64 {
        self.sqft.unwrap_or(DEFAULT_SQFT)
    }

    pub fn bedrooms(&self) -> u32 {
        self.bedrooms.unwrap_or(0)
    }

    pub fn bathrooms(&self) -> f64 {
        self.bathrooms.unwrap_or(0.0)
    }

    pub fn wabo(&self) -> ListingWabo {
        self.wabo.unwrap_or_default()
    }

    /// Reject requests no analyzer could make sense of
    pub fn validate(&self) -> Result<()> {
        let price = self.price();
        if !price.is_finite() || price <= 0.0 {
            return Err(ScoutError::InvalidInput(format!(
                "price must be a positive amount, got {}",
                price
            )));
        }
        let sqft = self.sqft();
        if !sqft.is_finite() || sqft <= 0.0 {
            return Err(ScoutError::InvalidInput(format!(
                "sqft must be a positive area, got {}",
                sqft
            )));
        }
        let bathrooms = self.bathrooms();
        if !bathrooms.is_finite() || bathrooms < 0.0 {
            return Err(ScoutError::InvalidInput(format!(
                "bathrooms must not be negative, got {}",
                bathrooms
            )));
        }
        Ok(())
    }
}

/// WABO status a listing advertises, from strongest to weakest evidence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingWabo {
    Approved,
    Inspected,
    Mentioned,
    None,
    #[default]
    Unknown,
}

impl FromStr for ListingWabo {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approved" => Ok(ListingWabo::Approved),
            "inspected" => Ok(ListingWabo::Inspected),
            "mentioned" => Ok(ListingWabo::Mentioned),
            "none" => Ok(ListingWabo::None),
            "unknown" => Ok(ListingWabo::Unknown),
            _ => Err(format!(
                "Invalid WABO status: '{}'. Valid options: approved, inspected, mentioned, none, unknown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ListingWabo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ListingWabo::Approved => "approved",
            ListingWabo::Inspected => "inspected",
            ListingWabo::Mentioned => "mentioned",
            ListingWabo::None => "none",
            ListingWabo::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Licensing status for operating the property as an adult family home
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaboStatus {
    Approved,
    Pending,
}

impl std::fmt::Display for WaboStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaboStatus::Approved => write!(f, "approved"),
            WaboStatus::Pending => write!(f, "pending"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub address: String,
    /// Whole dollars; negative when the property loses money
    pub monthly_cash_flow: i64,
    /// Percent, one decimal
    pub cap_rate: f64,
    /// Percent, one decimal
    pub roi: f64,
    /// 0-100
    pub viability_score: u8,
    pub viable: bool,
    pub wabo_status: WaboStatus,
    pub recommendations: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
    /// Full model output, only produced by [`AfhAnalyzer`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<AfhBreakdown>,
}

#[async_trait]
pub trait PropertyAnalyzer: Send + Sync {
    async fn analyze(&self, request: &PropertyRequest) -> Result<AnalysisReport>;
}

/// Which analyzer the front end should build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    #[default]
    Simulated,
    Afh,
}

impl FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simulated" => Ok(AnalyzerKind::Simulated),
            "afh" => Ok(AnalyzerKind::Afh),
            _ => Err(format!(
                "Invalid analyzer: '{}'. Valid options: simulated, afh",
                s
            )),
        }
    }
}

impl std::fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerKind::Simulated => write!(f, "simulated"),
            AnalyzerKind::Afh => write!(f, "afh"),
        }
    }
}

/// Build the analyzer selected by `config.analyzer`
pub fn build_analyzer(config: &AnalysisConfig) -> Result<Arc<dyn PropertyAnalyzer>> {
    match config.analyzer {
        AnalyzerKind::Simulated => Ok(Arc::new(SimulatedAnalyzer::new(config.simulated_delay()))),
        AnalyzerKind::Afh => Ok(Arc::new(AfhAnalyzer::from_config(config)?)),
    }
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_missing() {
        let request = PropertyRequest::new("123 Main St, Kent, WA");
        assert_eq!(request.price(), DEFAULT_PRICE);
        assert_eq!(request.sqft(), DEFAULT_SQFT);
        assert_eq!(request.bedrooms(), 0);
        assert_eq!(request.wabo(), ListingWabo::Unknown);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let request = PropertyRequest {
            price: Some(0.0),
            ..PropertyRequest::new("x")
        };
        assert!(matches!(request.validate(), Err(ScoutError::InvalidInput(_))));

        let request = PropertyRequest {
            sqft: Some(f64::NAN),
            ..PropertyRequest::new("x")
        };
        assert!(matches!(request.validate(), Err(ScoutError::InvalidInput(_))));

        let request = PropertyRequest {
            bathrooms: Some(-1.0),
            ..PropertyRequest::new("x")
        };
        assert!(matches!(request.validate(), Err(ScoutError::InvalidInput(_))));
    }

    #[test]
    fn test_listing_wabo_from_str() {
        assert_eq!("Approved".parse::<ListingWabo>().unwrap(), ListingWabo::Approved);
        assert_eq!("none".parse::<ListingWabo>().unwrap(), ListingWabo::None);
        let err = "maybe".parse::<ListingWabo>().unwrap_err();
        assert!(err.contains("Invalid WABO status: 'maybe'"));
    }

    #[test]
    fn test_analyzer_kind_from_str() {
        assert_eq!("AFH".parse::<AnalyzerKind>().unwrap(), AnalyzerKind::Afh);
        assert_eq!(AnalyzerKind::default(), AnalyzerKind::Simulated);
        assert!("remote".parse::<AnalyzerKind>().is_err());
    }

    #[tokio::test]
    async fn test_build_analyzer_follows_config() {
        let config = AnalysisConfig {
            analyzer: AnalyzerKind::Afh,
            ..AnalysisConfig::default()
        };
        let analyzer = build_analyzer(&config).unwrap();
        let report = analyzer.analyze(&PropertyRequest::new("x")).await.unwrap();
        assert!(report.details.is_some());

        let config = AnalysisConfig {
            analyzer: AnalyzerKind::Afh,
            occupancy_rate: 2.0,
            ..AnalysisConfig::default()
        };
        assert!(build_analyzer(&config).is_err());
    }

    #[test]
    fn test_request_deserializes_with_missing_fields() {
        let request: PropertyRequest =
            serde_json::from_str(r#"{"address":"1 Elm St","bedrooms":4,"wabo":"inspected"}"#)
                .unwrap();
        assert_eq!(request.bedrooms(), 4);
        assert_eq!(request.wabo(), ListingWabo::Inspected);
        assert_eq!(request.price(), DEFAULT_PRICE);
    }
}
