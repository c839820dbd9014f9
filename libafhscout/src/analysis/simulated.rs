//! Simulated remote analysis service

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use super::{
    round_one_decimal, AnalysisReport, PropertyAnalyzer, PropertyRequest, WaboStatus,
};
use crate::error::{Result, ScoutError};

/// Stand-in for the remote analysis service: waits, then makes up plausible
/// numbers.
#[derive(Debug, Clone)]
pub struct SimulatedAnalyzer {
    delay: Duration,
    fail: bool,
}

impl SimulatedAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, fail: false }
    }

    /// An analyzer whose every request fails after the delay
    pub fn failing(delay: Duration) -> Self {
        Self { delay, fail: true }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl PropertyAnalyzer for SimulatedAnalyzer {
    async fn analyze(&self, request: &PropertyRequest) -> Result<AnalysisReport> {
        request.validate()?;
        tokio::time::sleep(self.delay).await;

        if self.fail {
            return Err(ScoutError::Analysis(
                "analysis service unavailable".to_string(),
            ));
        }

        let report = {
            let mut rng = rand::thread_rng();
            simulate_report(request, &mut rng)
        };
        Ok(report)
    }
}

fn simulate_report<R: Rng>(request: &PropertyRequest, rng: &mut R) -> AnalysisReport {
    let price = request.price();
    let monthly_cash_flow = (price * 0.007 + rng.gen_range(0.0..1000.0)).floor() as i64;
    let wabo_status = if rng.gen_bool(0.7) {
        WaboStatus::Approved
    } else {
        WaboStatus::Pending
    };
    let viability_score = rng.gen_range(75..95);

    AnalysisReport {
        address: request.address.clone(),
        monthly_cash_flow,
        cap_rate: round_one_decimal(rng.gen_range(6.0..10.0)),
        roi: round_one_decimal(rng.gen_range(20.0..35.0)),
        viability_score,
        viable: true,
        wabo_status,
        recommendations: vec![
            "Property meets AFH requirements".to_string(),
            "Strong cash flow potential".to_string(),
            "Consider negotiating 5-10% below asking price".to_string(),
            "WABO approval likely within 30 days".to_string(),
        ],
        analyzed_at: Utc::now(),
        details: None,
    }
}
