//! Application facade
//!
//! `ScoutApp` is the one place that owns the timer service, the notification
//! queue, the action guard and the analyzer. Front ends create it at start
//! up, hand it a renderer, and call [`ScoutApp::shutdown`] on the way out.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libafhscout::analysis::{PropertyRequest, SimulatedAnalyzer};
//! use libafhscout::view::NullRenderer;
//! use libafhscout::{Config, ScoutApp};
//!
//! # async fn example() -> libafhscout::Result<()> {
//! let config = Config::load_or_default()?;
//! let analyzer = Arc::new(SimulatedAnalyzer::new(config.analysis.simulated_delay()));
//! let app = ScoutApp::new(config, Arc::new(NullRenderer), analyzer)?;
//!
//! if let Some(report) = app.analyze_property(PropertyRequest::new("123 Main St")).await? {
//!     println!("Cash flow: ${}", report.monthly_cash_flow);
//! }
//! app.shutdown();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::analysis::{AnalysisReport, PropertyAnalyzer, PropertyRequest};
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::error::{Result, ScoutError};
use crate::guard::{ActionGuard, ActionLabels};
use crate::notification::{NotificationId, NotificationKind};
use crate::queue::NotificationQueue;
use crate::timer::Timers;
use crate::view::ViewRenderer;

pub const ANALYSIS_BUSY_TEXT: &str = "Analyzing property...";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again.";
pub const ANALYSIS_COMPLETED_MESSAGE: &str = "Property analysis completed successfully!";

pub struct ScoutApp {
    config: Arc<Config>,
    timers: Timers,
    notifications: NotificationQueue,
    guard: ActionGuard,
    analyzer: Arc<dyn PropertyAnalyzer>,
    analysis_labels: ActionLabels,
}

impl ScoutApp {
    /// Build the application state on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Runtime`] when called outside a tokio runtime.
    pub fn new(
        config: Config,
        renderer: Arc<dyn ViewRenderer>,
        analyzer: Arc<dyn PropertyAnalyzer>,
    ) -> Result<Self> {
        let timers = Timers::current()?;
        let auto_dismiss = config.notifications.auto_dismiss();

        let notifications = match config.notifications.max_active {
            Some(max) => NotificationQueue::with_capacity(
                timers.clone(),
                Arc::clone(&renderer),
                auto_dismiss,
                max,
            ),
            None => NotificationQueue::new(timers.clone(), Arc::clone(&renderer), auto_dismiss),
        };
        let guard = ActionGuard::new(config.guard.policy, renderer, notifications.clone());

        debug!(
            policy = ?config.guard.policy,
            auto_dismiss_ms = config.notifications.auto_dismiss_ms,
            "Scout app initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            timers,
            notifications,
            guard,
            analyzer,
            analysis_labels: ActionLabels::new(ANALYSIS_BUSY_TEXT, ANALYSIS_FAILED_MESSAGE),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn guard(&self) -> &ActionGuard {
        &self.guard
    }

    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        self.notifications.enqueue(message, kind)
    }

    /// Run the analyzer under the action guard.
    ///
    /// Returns `Ok(None)` when the analysis failed; the user has already been
    /// shown an error notification by then. A success notification is shown
    /// for `Ok(Some(_))`.
    ///
    /// # Errors
    ///
    /// - [`ScoutError::InvalidInput`] if the request is rejected up front.
    /// - [`ScoutError::Busy`] if another analysis is in flight and the guard
    ///   policy is `reject`.
    pub async fn analyze_property(
        &self,
        request: PropertyRequest,
    ) -> Result<Option<AnalysisReport>> {
        request.validate()?;
        info!("Analyzing property: {}", request.address);

        let outcome = self
            .guard
            .run(&self.analysis_labels, self.analyzer.analyze(&request))
            .await;

        match outcome {
            Ok(report) => {
                self.notify(ANALYSIS_COMPLETED_MESSAGE, NotificationKind::Success);
                Ok(Some(report))
            }
            Err(ScoutError::ActionFailed(reason)) => {
                debug!("Analysis failure recovered: {}", reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Debounce `func` with the configured search wait
    pub fn debounce<A, F>(&self, func: F) -> Debouncer<A>
    where
        A: Send + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        Debouncer::new(self.timers.clone(), self.config.search.debounce(), func)
    }

    /// Dismiss whatever is still showing
    pub fn shutdown(&self) {
        let cleared = self.notifications.clear();
        debug!(cleared, "Scout app shut down");
    }
}
