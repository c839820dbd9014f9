//! Adult Family Home financial model
//!
//! A deterministic scoring of a listing for AFH use. Five assessments feed
//! a weighted viability score:
//!
//! | assessment | weight |
//! |------------|--------|
//! | basics (beds, baths, size, layout, county, price band) | 25% |
//! | financials (cash flow, cap rate, DSCR) | 30% |
//! | market position (price per sqft against the county) | 15% |
//! | WABO readiness | 20% |
//! | risk (inverted) | 10% |
//!
//! Revenue assumes every bedroom holds one resident, split between Medicaid
//! and private pay, at the configured occupancy and a 30-day month. Debt
//! service is a fixed-rate amortizing loan at the configured loan-to-value.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    round_one_decimal, AnalysisReport, ListingWabo, PropertyAnalyzer, PropertyRequest, WaboStatus,
};
use crate::config::AnalysisConfig;
use crate::error::Result;

const DAYS_PER_MONTH: f64 = 30.0;

const TARGET_COUNTIES: [&str; 4] = ["lewis", "thurston", "pierce", "king"];

/// Overpricing, in percent of the asking price, beyond which walking away is advised
const WALK_AWAY_PERCENT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Low => write!(f, "low"),
            Rating::Medium => write!(f, "medium"),
            Rating::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketComparison {
    BelowMarket,
    AtMarket,
    AboveMarket,
}

impl std::fmt::Display for MarketComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketComparison::BelowMarket => write!(f, "below market"),
            MarketComparison::AtMarket => write!(f, "at market"),
            MarketComparison::AboveMarket => write!(f, "above market"),
        }
    }
}

struct CountyMarket {
    name: &'static str,
    avg_price_per_sqft: f64,
    demand: Rating,
    competition: Rating,
}

/// Checked in order; the first county name contained in the listing wins
static COUNTY_MARKETS: [CountyMarket; 4] = [
    CountyMarket {
        name: "king",
        avg_price_per_sqft: 400.0,
        demand: Rating::High,
        competition: Rating::High,
    },
    CountyMarket {
        name: "pierce",
        avg_price_per_sqft: 250.0,
        demand: Rating::Medium,
        competition: Rating::Medium,
    },
    CountyMarket {
        name: "thurston",
        avg_price_per_sqft: 200.0,
        demand: Rating::Medium,
        competition: Rating::Low,
    },
    CountyMarket {
        name: "lewis",
        avg_price_per_sqft: 150.0,
        demand: Rating::Low,
        competition: Rating::Low,
    },
];

static DEFAULT_MARKET: CountyMarket = CountyMarket {
    name: "",
    avg_price_per_sqft: 250.0,
    demand: Rating::Medium,
    competition: Rating::Medium,
};

/// Listing description keywords that suggest licensing readiness
const WABO_KEYWORDS: [(&str, u32); 6] = [
    ("dshs", 20),
    ("licensed", 25),
    ("inspection", 15),
    ("ready", 20),
    ("turnkey", 15),
    ("renovated", 10),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfhBreakdown {
    /// Weighted score, 0-100, unrounded
    pub viability_score: f64,
    pub basics: BasicAssessment,
    pub financials: Financials,
    pub market: MarketPosition,
    pub wabo: WaboAssessment,
    pub risk: RiskAssessment,
    pub pricing: PricingAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicAssessment {
    /// Out of 100
    pub score: u32,
    pub strengths: Vec<String>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub medicaid: f64,
    pub private_pay: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentMix {
    pub medicaid: u32,
    pub private_pay: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub purchase_price: f64,
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub revenue: MonthlyRevenue,
    pub monthly_expenses: f64,
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    /// Annual net operating income over price, as a fraction
    pub cap_rate: f64,
    /// Debt service coverage ratio
    pub dscr: f64,
    pub occupancy: f64,
    pub residents: ResidentMix,
}

impl Financials {
    pub fn monthly_net_operating_income(&self) -> f64 {
        self.revenue.total - self.monthly_expenses
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPosition {
    pub price_per_sqft: f64,
    pub market_avg_price_per_sqft: f64,
    pub comparison: MarketComparison,
    pub demand: Rating,
    pub competition: Rating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaboAssessment {
    pub status: ListingWabo,
    /// Out of 100, keyword bonus included
    pub score: u32,
    pub keyword_bonus: u32,
    pub licensing_timeline: String,
    pub estimated_licensing_cost: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 0-100, higher is riskier
    pub score: u32,
    pub level: Rating,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingAnalysis {
    pub current_price: f64,
    /// Lower of the cash-flow and cap-rate ceilings
    pub optimal_price: f64,
    /// Highest price that still meets the minimum cash flow
    pub max_price: f64,
    /// Price at which the property meets the minimum cap rate
    pub cap_rate_price: f64,
    pub negotiation_target: f64,
    pub price_difference: f64,
    pub price_difference_percentage: f64,
    pub negotiation_strategy: Vec<String>,
}

impl PricingAnalysis {
    pub fn is_overpriced(&self) -> bool {
        self.current_price > self.optimal_price
    }
}

/// Scores listings with the AFH financial model. No I/O; the configured
/// rates and thresholds are the only inputs besides the request.
#[derive(Debug, Clone)]
pub struct AfhAnalyzer {
    config: AnalysisConfig,
}

impl AfhAnalyzer {
    /// # Errors
    ///
    /// Returns a configuration error when a rate or threshold is out of
    /// range.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every assessment; `request` must already be valid.
    pub fn evaluate(&self, request: &PropertyRequest) -> AfhBreakdown {
        let basics = assess_basics(request);
        let financials = self.assess_financials(request);
        let market = assess_market(request);
        let wabo = assess_wabo(request);
        let risk = assess_risk(request);
        let pricing = self.assess_pricing(request, &financials);

        let viability_score = f64::from(basics.score) * 0.25
            + f64::from(self.financial_score(&financials)) * 0.30
            + f64::from(market_score(&market)) * 0.15
            + f64::from(wabo.score) * 0.20
            + f64::from(100 - risk.score) * 0.10;

        AfhBreakdown {
            viability_score,
            basics,
            financials,
            market,
            wabo,
            risk,
            pricing,
        }
    }

    fn assess_financials(&self, request: &PropertyRequest) -> Financials {
        let c = &self.config;
        let price = request.price();
        let bedrooms = request.bedrooms();

        let medicaid_residents = (f64::from(bedrooms) * c.medicaid_share).floor() as u32;
        let private_residents = bedrooms - medicaid_residents.min(bedrooms);

        let per_resident_month = |day_rate: f64| day_rate * DAYS_PER_MONTH * c.occupancy_rate;
        let medicaid = f64::from(medicaid_residents) * per_resident_month(c.medicaid_rate_per_day);
        let private_pay =
            f64::from(private_residents) * per_resident_month(c.private_pay_rate_per_day);
        let revenue = MonthlyRevenue {
            medicaid,
            private_pay,
            total: medicaid + private_pay,
        };

        let monthly_expenses = c.monthly_expenses();
        let loan_amount = price * c.loan_to_value;
        let monthly_payment = amortized_payment(loan_amount, c.interest_rate, c.loan_term_years);
        let net_operating = revenue.total - monthly_expenses;
        let monthly_cash_flow = net_operating - monthly_payment;

        Financials {
            purchase_price: price,
            loan_amount,
            monthly_payment,
            revenue,
            monthly_expenses,
            monthly_cash_flow,
            annual_cash_flow: monthly_cash_flow * 12.0,
            cap_rate: net_operating * 12.0 / price,
            dscr: if monthly_payment > 0.0 {
                net_operating / monthly_payment
            } else {
                0.0
            },
            occupancy: c.occupancy_rate,
            residents: ResidentMix {
                medicaid: medicaid_residents,
                private_pay: private_residents,
            },
        }
    }

    fn assess_pricing(&self, request: &PropertyRequest, financials: &Financials) -> PricingAnalysis {
        let c = &self.config;
        let current_price = request.price();
        let net_operating = financials.monthly_net_operating_income();

        let max_payment = net_operating - c.min_cash_flow;
        let max_price = if max_payment > 0.0 && c.loan_to_value > 0.0 {
            principal_for_payment(max_payment, c.interest_rate, c.loan_term_years)
                / c.loan_to_value
        } else {
            0.0
        };

        let cap_rate_price = if c.min_cap_rate > 0.0 {
            net_operating * 12.0 / c.min_cap_rate
        } else {
            0.0
        };

        let optimal_price = if max_price > 0.0 && cap_rate_price > 0.0 {
            max_price.min(cap_rate_price)
        } else {
            max_price.max(cap_rate_price)
        };

        let price_difference = current_price - optimal_price;
        let mut pricing = PricingAnalysis {
            current_price,
            optimal_price,
            max_price,
            cap_rate_price,
            negotiation_target: optimal_price * 0.95,
            price_difference,
            price_difference_percentage: price_difference / current_price * 100.0,
            negotiation_strategy: Vec::new(),
        };
        pricing.negotiation_strategy = negotiation_strategy(&pricing, request);
        pricing
    }

    fn financial_score(&self, financials: &Financials) -> u32 {
        let min_cash_flow = self.config.min_cash_flow;
        let min_cap_rate = self.config.min_cap_rate;

        let cash_flow = financials.monthly_cash_flow;
        let cash_flow_points: u32 = if cash_flow >= min_cash_flow * 1.5 {
            40
        } else if cash_flow >= min_cash_flow {
            30
        } else if cash_flow >= min_cash_flow * 0.5 {
            20
        } else {
            0
        };

        let cap_rate = financials.cap_rate;
        let cap_rate_points: u32 = if cap_rate >= min_cap_rate * 1.2 {
            30
        } else if cap_rate >= min_cap_rate {
            25
        } else if cap_rate >= min_cap_rate * 0.8 {
            15
        } else {
            0
        };

        let dscr_points: u32 = match financials.dscr {
            d if d >= 1.5 => 30,
            d if d >= 1.25 => 25,
            d if d >= 1.0 => 20,
            _ => 0,
        };

        (cash_flow_points + cap_rate_points + dscr_points).min(100)
    }

    fn recommendations(&self, breakdown: &AfhBreakdown) -> Vec<String> {
        let mut recommendations = Vec::new();

        if breakdown.basics.score < 70 {
            recommendations.push("Property may need modifications to meet AFH requirements".to_string());
        }

        if breakdown.financials.monthly_cash_flow < self.config.min_cash_flow {
            recommendations.push("Consider negotiating price down to improve cash flow".to_string());
            recommendations.push("Evaluate financing options for better terms".to_string());
        }

        match breakdown.wabo.status {
            ListingWabo::None => {
                recommendations.push("Budget for WABO inspection and modifications".to_string());
                recommendations
                    .push("Contact DSHS for licensing timeline and requirements".to_string());
            }
            ListingWabo::Unknown => {
                recommendations.push("Verify WABO status before making offer".to_string());
            }
            ListingWabo::Approved | ListingWabo::Inspected | ListingWabo::Mentioned => {}
        }

        if breakdown.risk.level == Rating::High {
            recommendations.push("Conduct thorough property inspection".to_string());
            recommendations.push("Consider professional property evaluation".to_string());
        }

        if breakdown.pricing.is_overpriced() {
            recommendations.push(format!(
                "Target negotiation price: {}",
                dollars(breakdown.pricing.negotiation_target)
            ));
            recommendations.push("Use AFH-specific factors in negotiation".to_string());
        }

        recommendations
    }

    fn report(&self, request: &PropertyRequest, breakdown: AfhBreakdown) -> AnalysisReport {
        let financials = &breakdown.financials;
        let down_payment = financials.purchase_price * (1.0 - self.config.loan_to_value);
        let roi = if down_payment > 0.0 {
            round_one_decimal(financials.annual_cash_flow / down_payment * 100.0)
        } else {
            0.0
        };

        AnalysisReport {
            address: request.address.clone(),
            monthly_cash_flow: financials.monthly_cash_flow.round() as i64,
            cap_rate: round_one_decimal(financials.cap_rate * 100.0),
            roi,
            viability_score: breakdown.viability_score.round().clamp(0.0, 100.0) as u8,
            viable: breakdown.viability_score >= self.config.viability_threshold,
            wabo_status: match breakdown.wabo.status {
                ListingWabo::Approved => WaboStatus::Approved,
                _ => WaboStatus::Pending,
            },
            recommendations: self.recommendations(&breakdown),
            analyzed_at: Utc::now(),
            details: Some(breakdown),
        }
    }
}

#[async_trait]
impl PropertyAnalyzer for AfhAnalyzer {
    async fn analyze(&self, request: &PropertyRequest) -> Result<AnalysisReport> {
        request.validate()?;
        debug!(address = %request.address, "Running AFH model");

        let breakdown = self.evaluate(request);
        info!(
            "Analysis completed. Viability: {:.1}%",
            breakdown.viability_score
        );
        Ok(self.report(request, breakdown))
    }
}

fn lowercase(field: &Option<String>) -> String {
    field.as_deref().unwrap_or_default().to_lowercase()
}

fn assess_basics(request: &PropertyRequest) -> BasicAssessment {
    let mut score = 0;
    let mut strengths = Vec::new();
    let mut issues = Vec::new();

    let bedrooms = request.bedrooms();
    if bedrooms >= 4 {
        score += 25;
        strengths.push(format!("Excellent: {} bedrooms", bedrooms));
    } else if bedrooms >= 3 {
        score += 15;
        strengths.push(format!("Good: {} bedrooms", bedrooms));
    } else {
        issues.push(format!("Insufficient bedrooms: {}", bedrooms));
    }

    let bathrooms = request.bathrooms();
    if bathrooms >= 3.0 {
        score += 20;
        strengths.push(format!("Excellent: {} bathrooms", bathrooms));
    } else if bathrooms >= 2.0 {
        score += 15;
        strengths.push(format!("Good: {} bathrooms", bathrooms));
    } else {
        issues.push(format!("Insufficient bathrooms: {}", bathrooms));
    }

    let sqft = request.sqft();
    if sqft >= 2500.0 {
        score += 20;
        strengths.push(format!("Excellent: {} sqft", grouped(sqft)));
    } else if sqft >= 2000.0 {
        score += 15;
        strengths.push(format!("Good: {} sqft", grouped(sqft)));
    } else {
        issues.push(format!("Insufficient square footage: {} sqft", grouped(sqft)));
    }

    let property_type = lowercase(&request.property_type);
    if property_type.contains("rambler") || property_type.contains("single story") {
        score += 15;
        strengths.push("Single story - ideal for AFH".to_string());
    } else if property_type.contains("two story") || property_type.contains("multi") {
        score += 5;
        issues.push("Multi-story may require modifications".to_string());
    } else {
        score += 10;
    }

    let county = lowercase(&request.county);
    if TARGET_COUNTIES.iter().any(|target| county.contains(target)) {
        score += 10;
        strengths.push(format!("Target county: {}", county));
    } else {
        score += 5;
    }

    let price = request.price();
    if (300_000.0..=1_500_000.0).contains(&price) {
        score += 10;
        strengths.push(format!("Price in target range: {}", dollars(price)));
    } else if price > 1_500_000.0 {
        issues.push(format!("Price may be too high: {}", dollars(price)));
    } else {
        score += 5;
        issues.push(format!("Price may be too low: {}", dollars(price)));
    }

    BasicAssessment {
        score,
        strengths,
        issues,
    }
}

fn assess_market(request: &PropertyRequest) -> MarketPosition {
    let price_per_sqft = request.price() / request.sqft();
    let county = lowercase(&request.county);
    let market = COUNTY_MARKETS
        .iter()
        .find(|market| county.contains(market.name))
        .unwrap_or(&DEFAULT_MARKET);

    let comparison = if price_per_sqft < market.avg_price_per_sqft * 0.9 {
        MarketComparison::BelowMarket
    } else if price_per_sqft > market.avg_price_per_sqft * 1.1 {
        MarketComparison::AboveMarket
    } else {
        MarketComparison::AtMarket
    };

    MarketPosition {
        price_per_sqft,
        market_avg_price_per_sqft: market.avg_price_per_sqft,
        comparison,
        demand: market.demand,
        competition: market.competition,
    }
}

fn market_score(market: &MarketPosition) -> u32 {
    let comparison: u32 = match market.comparison {
        MarketComparison::BelowMarket => 30,
        MarketComparison::AtMarket => 20,
        MarketComparison::AboveMarket => 0,
    };
    let demand: u32 = match market.demand {
        Rating::High => 20,
        Rating::Medium => 10,
        Rating::Low => 0,
    };
    (50 + comparison + demand).min(100)
}

fn assess_wabo(request: &PropertyRequest) -> WaboAssessment {
    let status = request.wabo();
    let description = lowercase(&request.description);

    let base: u32 = match status {
        ListingWabo::Approved => 100,
        ListingWabo::Inspected => 80,
        ListingWabo::Mentioned => 60,
        ListingWabo::None => 20,
        ListingWabo::Unknown => 30,
    };
    let keyword_bonus: u32 = WABO_KEYWORDS
        .iter()
        .filter(|(keyword, _)| description.contains(keyword))
        .map(|(_, bonus)| bonus)
        .sum();

    let (licensing_timeline, estimated_licensing_cost) = match status {
        ListingWabo::Approved => ("1-3 months", 5_000),
        ListingWabo::Inspected => ("3-6 months", 10_000),
        _ => ("6-12 months", 20_000),
    };

    WaboAssessment {
        status,
        score: (base + keyword_bonus).min(100),
        keyword_bonus,
        licensing_timeline: licensing_timeline.to_string(),
        estimated_licensing_cost,
    }
}

fn assess_risk(request: &PropertyRequest) -> RiskAssessment {
    let mut score: i32 = 0;
    let mut risks = Vec::new();

    let price = request.price();
    if price > 1_200_000.0 {
        risks.push("High purchase price may limit financing options".to_string());
        score += 20;
    } else if price < 400_000.0 {
        risks.push("Low price may indicate property issues".to_string());
        score += 15;
    }

    if lowercase(&request.county).contains("lewis") {
        risks.push("Lewis County has lower demand and longer licensing times".to_string());
        score += 10;
    }

    let description = lowercase(&request.description);
    if description.contains("needs work") || description.contains("fixer") {
        risks.push("Property may require significant renovations".to_string());
        score += 25;
    } else if description.contains("turnkey") || description.contains("renovated") {
        score -= 10;
    }

    match request.wabo() {
        ListingWabo::None => {
            risks.push("No WABO approval - significant licensing risk".to_string());
            score += 30;
        }
        ListingWabo::Unknown => {
            risks.push("Unknown WABO status - verification needed".to_string());
            score += 15;
        }
        ListingWabo::Approved | ListingWabo::Inspected | ListingWabo::Mentioned => {}
    }

    if request.sqft() < 2200.0 {
        risks.push("Smaller property may limit resident capacity".to_string());
        score += 10;
    }

    // Level is judged on the raw score, before clamping
    let level = if score < 30 {
        Rating::Low
    } else if score < 60 {
        Rating::Medium
    } else {
        Rating::High
    };

    RiskAssessment {
        score: score.clamp(0, 100) as u32,
        level,
        risks,
    }
}

fn negotiation_strategy(pricing: &PricingAnalysis, request: &PropertyRequest) -> Vec<String> {
    let mut strategy = Vec::new();

    if !pricing.is_overpriced() {
        strategy.push("Property priced reasonably - consider full price offer".to_string());
        strategy.push("Emphasize quick closing and cash offer".to_string());
        strategy.push("Highlight serious buyer status".to_string());
        return strategy;
    }

    let overpriced_percent = pricing.price_difference_percentage;
    if overpriced_percent > WALK_AWAY_PERCENT {
        strategy.push("Property significantly overpriced - consider walking away".to_string());
    } else if overpriced_percent > 10.0 {
        strategy.push("Strong negotiation position - target 15-20% reduction".to_string());
    } else {
        strategy.push("Moderate negotiation needed - target 5-10% reduction".to_string());
    }

    if request.wabo() == ListingWabo::None {
        strategy.push("Use lack of WABO approval as major negotiation point".to_string());
        strategy.push("Request 20-30% reduction for licensing uncertainty".to_string());
    }

    if lowercase(&request.description).contains("needs work") {
        strategy.push("Use renovation needs as negotiation leverage".to_string());
        strategy.push("Request inspection contingency".to_string());
    }

    strategy.push("Emphasize cash offer and quick closing".to_string());
    strategy.push("Highlight specialized use case (AFH) limiting buyer pool".to_string());
    strategy
}

/// Monthly payment of a fixed-rate loan
fn amortized_payment(principal: f64, annual_rate: f64, years: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let payments = f64::from(years) * 12.0;
    let rate = annual_rate / 12.0;
    if rate == 0.0 {
        return principal / payments;
    }
    let growth = (1.0 + rate).powf(payments);
    principal * rate * growth / (growth - 1.0)
}

/// Inverse of [`amortized_payment`]
fn principal_for_payment(payment: f64, annual_rate: f64, years: u32) -> f64 {
    let payments = f64::from(years) * 12.0;
    let rate = annual_rate / 12.0;
    if rate == 0.0 {
        return payment * payments;
    }
    let growth = (1.0 + rate).powf(payments);
    payment * (growth - 1.0) / (rate * growth)
}

/// Whole number with thousands separators
fn grouped(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn dollars(value: f64) -> String {
    format!("${}", grouped(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-6
    }

    fn analyzer() -> AfhAnalyzer {
        AfhAnalyzer::from_config(&AnalysisConfig::default()).unwrap()
    }

    /// Turnkey five-bedroom rambler in Pierce County with WABO approval
    fn strong_listing() -> PropertyRequest {
        PropertyRequest {
            price: Some(650_000.0),
            sqft: Some(2_800.0),
            bedrooms: Some(5),
            bathrooms: Some(3.0),
            property_type: Some("Rambler".to_string()),
            county: Some("Pierce".to_string()),
            wabo: Some(ListingWabo::Approved),
            description: Some("Turnkey DSHS licensed home".to_string()),
            ..PropertyRequest::new("123 Main St, Tacoma, WA")
        }
    }

    /// Small two-story fixer in Lewis County, no WABO approval
    fn weak_listing() -> PropertyRequest {
        PropertyRequest {
            price: Some(250_000.0),
            sqft: Some(1_500.0),
            bedrooms: Some(2),
            bathrooms: Some(1.0),
            property_type: Some("Two Story".to_string()),
            county: Some("Lewis County".to_string()),
            wabo: Some(ListingWabo::None),
            description: Some("Fixer upper, needs work".to_string()),
            ..PropertyRequest::new("9 Mill Rd, Chehalis, WA")
        }
    }

    /// Four bedrooms in King County asking far more than the income supports
    fn overpriced_listing() -> PropertyRequest {
        PropertyRequest {
            price: Some(2_500_000.0),
            sqft: Some(3_000.0),
            bedrooms: Some(4),
            bathrooms: Some(2.0),
            county: Some("King".to_string()),
            ..PropertyRequest::new("77 Lake Dr, Bellevue, WA")
        }
    }

    #[test]
    fn test_financials_follow_day_rates_and_amortization() {
        let financials = analyzer().assess_financials(&strong_listing());

        assert_eq!(financials.residents.medicaid, 3);
        assert_eq!(financials.residents.private_pay, 2);
        assert!(close(financials.revenue.medicaid, 9_180.0));
        assert!(close(financials.revenue.private_pay, 10_200.0));
        assert!(close(financials.monthly_expenses, 2_500.0));
        assert!(close(financials.loan_amount, 520_000.0));
        assert!((financials.monthly_payment - 3_117.66).abs() < 0.01);
        assert!((financials.monthly_cash_flow - 13_762.34).abs() < 0.01);
        assert!((financials.cap_rate - 0.311_630_769).abs() < 1e-6);
        assert!((financials.dscr - 5.4143).abs() < 1e-3);
    }

    #[test]
    fn test_strong_listing_is_viable() {
        let analyzer = analyzer();
        let breakdown = analyzer.evaluate(&strong_listing());

        assert_eq!(breakdown.basics.score, 100);
        assert!(breakdown.basics.issues.is_empty());
        assert!(breakdown
            .basics
            .strengths
            .contains(&"Excellent: 2,800 sqft".to_string()));
        assert_eq!(breakdown.market.comparison, MarketComparison::AtMarket);
        assert_eq!(breakdown.wabo.score, 100);
        assert_eq!(breakdown.wabo.keyword_bonus, 60);
        assert_eq!(breakdown.wabo.licensing_timeline, "1-3 months");
        assert_eq!(breakdown.risk.score, 0);
        assert_eq!(breakdown.risk.level, Rating::Low);
        assert!(close(breakdown.viability_score, 97.0));

        assert!(close(breakdown.pricing.cap_rate_price, 2_532_000.0));
        assert!(close(breakdown.pricing.optimal_price, 2_532_000.0));
        assert!(!breakdown.pricing.is_overpriced());
        assert_eq!(
            breakdown.pricing.negotiation_strategy[0],
            "Property priced reasonably - consider full price offer"
        );
    }

    #[test]
    fn test_weak_listing_collects_risks() {
        let analyzer = analyzer();
        let breakdown = analyzer.evaluate(&weak_listing());

        assert_eq!(breakdown.basics.score, 20);
        assert!(breakdown
            .basics
            .issues
            .contains(&"Insufficient square footage: 1,500 sqft".to_string()));
        assert_eq!(breakdown.market.comparison, MarketComparison::AboveMarket);
        assert_eq!(breakdown.market.demand, Rating::Low);
        assert_eq!(breakdown.wabo.score, 20);
        assert_eq!(breakdown.wabo.licensing_timeline, "6-12 months");
        assert_eq!(breakdown.risk.score, 90);
        assert_eq!(breakdown.risk.level, Rating::High);
        assert_eq!(breakdown.risk.risks.len(), 5);
        assert!(close(breakdown.viability_score, 44.5));

        let recommendations = analyzer.recommendations(&breakdown);
        assert_eq!(
            recommendations,
            vec![
                "Property may need modifications to meet AFH requirements",
                "Budget for WABO inspection and modifications",
                "Contact DSHS for licensing timeline and requirements",
                "Conduct thorough property inspection",
                "Consider professional property evaluation",
            ]
        );
    }

    #[test]
    fn test_overpriced_listing_gets_negotiation_plan() {
        let analyzer = analyzer();
        let breakdown = analyzer.evaluate(&overpriced_listing());
        let pricing = &breakdown.pricing;

        assert!(close(pricing.optimal_price, 2_073_000.0));
        assert!((pricing.max_price - 2_255_856.58).abs() < 0.01);
        assert!(pricing.is_overpriced());
        assert!((pricing.price_difference_percentage - 17.08).abs() < 1e-6);
        assert_eq!(
            pricing.negotiation_strategy,
            vec![
                "Strong negotiation position - target 15-20% reduction",
                "Emphasize cash offer and quick closing",
                "Highlight specialized use case (AFH) limiting buyer pool",
            ]
        );

        assert_eq!(breakdown.risk.level, Rating::Medium);
        assert!(close(breakdown.viability_score, 59.5));

        let recommendations = analyzer.recommendations(&breakdown);
        assert!(recommendations.contains(&"Verify WABO status before making offer".to_string()));
        assert!(recommendations.contains(&"Target negotiation price: $1,969,350".to_string()));
        assert!(recommendations
            .contains(&"Consider negotiating price down to improve cash flow".to_string()));
    }

    #[test]
    fn test_walk_away_when_far_above_optimal() {
        let request = PropertyRequest {
            wabo: Some(ListingWabo::None),
            description: Some("needs work".to_string()),
            price: Some(4_000_000.0),
            ..overpriced_listing()
        };
        let breakdown = analyzer().evaluate(&request);
        let strategy = &breakdown.pricing.negotiation_strategy;

        assert_eq!(
            strategy[0],
            "Property significantly overpriced - consider walking away"
        );
        assert!(strategy.contains(&"Use lack of WABO approval as major negotiation point".to_string()));
        assert!(strategy.contains(&"Request inspection contingency".to_string()));
    }

    #[test]
    fn test_configured_rates_change_the_outcome() {
        let config = AnalysisConfig {
            private_pay_rate_per_day: 300.0,
            min_cap_rate: 0.5,
            ..AnalysisConfig::default()
        };
        let analyzer = AfhAnalyzer::from_config(&config).unwrap();
        let breakdown = analyzer.evaluate(&strong_listing());

        assert!(close(breakdown.financials.revenue.private_pay, 15_300.0));
        let expected_cap_price = (9_180.0 + 15_300.0 - 2_500.0) * 12.0 / 0.5;
        assert!(close(breakdown.pricing.cap_rate_price, expected_cap_price));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            loan_term_years: 0,
            ..AnalysisConfig::default()
        };
        assert!(AfhAnalyzer::from_config(&config).is_err());
    }

    #[test]
    fn test_zero_interest_loan() {
        assert!(close(amortized_payment(360_000.0, 0.0, 30), 1_000.0));
        assert!(close(principal_for_payment(1_000.0, 0.0, 30), 360_000.0));

        let payment = amortized_payment(500_000.0, 0.06, 30);
        assert!(close(principal_for_payment(payment, 0.06, 30), 500_000.0));
    }

    #[test]
    fn test_grouped_formatting() {
        assert_eq!(grouped(0.0), "0");
        assert_eq!(grouped(999.0), "999");
        assert_eq!(grouped(2_500.0), "2,500");
        assert_eq!(grouped(1_969_350.0), "1,969,350");
        assert_eq!(grouped(-12_345.4), "-12,345");
        assert_eq!(dollars(650_000.0), "$650,000");
    }

    #[tokio::test]
    async fn test_report_summarizes_breakdown() {
        let report = analyzer().analyze(&strong_listing()).await.unwrap();

        assert_eq!(report.monthly_cash_flow, 13_762);
        assert_eq!(report.cap_rate, 31.2);
        assert_eq!(report.roi, 127.0);
        assert_eq!(report.viability_score, 97);
        assert!(report.viable);
        assert_eq!(report.wabo_status, WaboStatus::Approved);
        assert!(report.recommendations.is_empty());
        assert!(report.details.is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["details"]["market"]["comparison"], "at_market");
        assert_eq!(json["details"]["wabo"]["status"], "approved");
    }

    #[tokio::test]
    async fn test_weak_report_not_viable() {
        let report = analyzer().analyze(&weak_listing()).await.unwrap();
        assert!(!report.viable);
        assert_eq!(report.wabo_status, WaboStatus::Pending);
        assert_eq!(report.monthly_cash_flow, 4_461);
    }
}
