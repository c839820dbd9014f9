//! afh-scout - Analyze Adult Family Home candidate properties

mod terminal;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use libafhscout::analysis::{
    build_analyzer, AfhBreakdown, AnalysisReport, AnalyzerKind, ListingWabo, PropertyAnalyzer,
    PropertyRequest, SimulatedAnalyzer,
};
use libafhscout::events::{EventBus, UiEvent};
use libafhscout::logging::LoggingConfig;
use libafhscout::{Config, NotificationKind, Result, ScoutApp};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use crate::terminal::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(name = "afh-scout")]
#[command(version, about = "Analyze Adult Family Home candidate properties")]
#[command(long_about = r#"Analyze Adult Family Home candidate properties.

EXAMPLES:
    # Analyze a listing with the default price and size
    afh-scout analyze --address "123 Main St, Kent, WA"

    # Provide listing details and get JSON for scripting
    afh-scout analyze --address "456 Oak Ave, Auburn, WA" --price 580000 --sqft 2200 --format json

    # Run the AFH financial model on a full listing
    afh-scout analyze --analyzer afh --address "12 Fir Ln, Tacoma, WA" \
        --price 650000 --sqft 2800 --bedrooms 5 --bathrooms 3 \
        --property-type Rambler --county Pierce --wabo approved

    # Show a notification and wait for it to expire
    afh-scout notify "Daily search completed" --kind success

CONFIGURATION:
    Configuration file: ~/.config/afh-scout/config.toml (or $AFH_SCOUT_CONFIG)

    [notifications]
    auto_dismiss_ms = 5000
    [guard]
    policy = "reject"
    [analysis]
    analyzer = "simulated"        # or "afh"
    simulated_delay_ms = 2000
    medicaid_rate_per_day = 120
    private_pay_rate_per_day = 200
    occupancy_rate = 0.85
    min_cash_flow = 3000
    min_cap_rate = 0.08

LOGGING:
    AFH_SCOUT_LOG_FORMAT   text, json or pretty (default: text)
    AFH_SCOUT_LOG_LEVEL    tracing filter (default: warn); --verbose means debug
    RUST_LOG               overrides both levels when set

EXIT CODES:
    0 - Success
    1 - Analysis failed or runtime error
    3 - Invalid input
    4 - Another analysis is already running
"#)]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a property analysis
    Analyze {
        /// Street address of the property
        #[arg(long, default_value = "Unlisted property")]
        address: String,

        /// Asking price in USD (default: 600000)
        #[arg(long)]
        price: Option<f64>,

        /// Living area in square feet (default: 2500)
        #[arg(long)]
        sqft: Option<f64>,

        #[arg(long)]
        bedrooms: Option<u32>,

        #[arg(long)]
        bathrooms: Option<f64>,

        /// Listing type, e.g. "Rambler" or "Two Story"
        #[arg(long)]
        property_type: Option<String>,

        /// County the property is in, e.g. "Pierce"
        #[arg(long)]
        county: Option<String>,

        /// Advertised WABO status: approved, inspected, mentioned, none, unknown
        #[arg(long)]
        wabo: Option<ListingWabo>,

        /// Listing description, scanned for licensing keywords
        #[arg(long)]
        description: Option<String>,

        /// simulated or afh (overrides config)
        #[arg(long)]
        analyzer: Option<AnalyzerKind>,

        /// Simulated request latency, e.g. "2s" or "250ms" (overrides config)
        #[arg(long, value_parser = humantime::parse_duration)]
        delay: Option<Duration>,

        /// Make the simulated request fail
        #[arg(long)]
        fail: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show a notification until it expires
    Notify {
        /// Notification text
        message: String,

        /// One of: info, success, warning, error
        #[arg(short, long, default_value = "info")]
        kind: NotificationKind,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    match run(cli).await {
        Ok(true) => {}
        // The error notification is all the user needs to see
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Returns `Ok(false)` when the command failed after already telling the
/// user why.
async fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load_or_default()?,
    };

    match cli.command {
        Command::Analyze {
            address,
            price,
            sqft,
            bedrooms,
            bathrooms,
            property_type,
            county,
            wabo,
            description,
            analyzer,
            delay,
            fail,
            format,
        } => {
            if let Some(kind) = analyzer {
                config.analysis.analyzer = kind;
            }
            if let Some(delay) = delay {
                config.analysis.simulated_delay_ms =
                    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
            }
            let analyzer: Arc<dyn PropertyAnalyzer> = if fail {
                Arc::new(SimulatedAnalyzer::failing(config.analysis.simulated_delay()))
            } else {
                build_analyzer(&config.analysis)?
            };
            let request = PropertyRequest {
                price,
                sqft,
                bedrooms,
                bathrooms,
                property_type,
                county,
                wabo,
                description,
                ..PropertyRequest::new(address)
            };
            analyze(config, analyzer, request, format).await
        }
        Command::Notify { message, kind } => {
            notify(config, message, kind).await?;
            Ok(true)
        }
    }
}

async fn analyze(
    config: Config,
    analyzer: Arc<dyn PropertyAnalyzer>,
    request: PropertyRequest,
    format: OutputFormat,
) -> Result<bool> {
    let renderer = TerminalRenderer::new(EventBus::new(16));
    let app = ScoutApp::new(config, Arc::new(renderer), analyzer)?;
    let outcome = app.analyze_property(request).await;
    app.shutdown();

    match outcome? {
        Some(report) => {
            print_report(&report, format)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

async fn notify(config: Config, message: String, kind: NotificationKind) -> Result<()> {
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let app = ScoutApp::new(
        config,
        Arc::new(TerminalRenderer::new(bus)),
        Arc::new(SimulatedAnalyzer::new(Duration::ZERO)),
    )?;

    let id = app.notify(message, kind);
    info!(%id, "Waiting for notification to expire");
    loop {
        match events.recv().await {
            Ok(UiEvent::NotificationRemoved { id: removed }) if removed == id => break,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "View events skipped");
                if !app.notifications().contains(id) {
                    break;
                }
            }
            Err(RecvError::Closed) => break,
        }
    }

    app.shutdown();
    Ok(())
}

fn print_report(report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("Analysis Results: {}", report.address);
            println!("  Monthly Cash Flow: ${}", report.monthly_cash_flow);
            println!("  Cap Rate:          {:.1}%", report.cap_rate);
            println!("  ROI:               {:.1}%", report.roi);
            println!("  Viability Score:   {}%", report.viability_score);
            println!("  Viable:            {}", if report.viable { "yes" } else { "no" });
            println!("  WABO Status:       {}", report.wabo_status);
            if let Some(details) = &report.details {
                print_breakdown(details);
            }
            println!("Recommendations:");
            for recommendation in &report.recommendations {
                println!("  - {}", recommendation);
            }
        }
    }
    Ok(())
}

fn print_breakdown(details: &AfhBreakdown) {
    let financials = &details.financials;
    println!("Financials:");
    println!("  Monthly Revenue:   ${:.0}", financials.revenue.total);
    println!("  Monthly Expenses:  ${:.0}", financials.monthly_expenses);
    println!("  Loan Payment:      ${:.0}", financials.monthly_payment);
    println!("  DSCR:              {:.2}", financials.dscr);
    println!(
        "  Residents:         {} Medicaid, {} private pay",
        financials.residents.medicaid, financials.residents.private_pay
    );

    let market = &details.market;
    println!("Market:");
    println!(
        "  Price/sqft:        ${:.0} vs ${:.0} average ({})",
        market.price_per_sqft, market.market_avg_price_per_sqft, market.comparison
    );
    println!("  Demand:            {}", market.demand);
    println!("  Competition:       {}", market.competition);

    let wabo = &details.wabo;
    println!("Licensing:");
    println!("  Listing WABO:      {} (score {})", wabo.status, wabo.score);
    println!("  Timeline:          {}", wabo.licensing_timeline);
    println!("  Estimated Cost:    ${}", wabo.estimated_licensing_cost);

    let risk = &details.risk;
    println!("Risk: {} ({})", risk.level, risk.score);
    for item in &risk.risks {
        println!("  - {}", item);
    }

    let pricing = &details.pricing;
    println!("Pricing:");
    println!("  Optimal Price:     ${:.0}", pricing.optimal_price);
    println!("  Target Offer:      ${:.0}", pricing.negotiation_target);
    for step in &pricing.negotiation_strategy {
        println!("  - {}", step);
    }
}
