use anyhow::Context;
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use sitepulse::collectors::PageViewInput;
use sitepulse::config::AppConfig;
use sitepulse::model::TimeRange;
use sitepulse::orchestrator::{EventPayload, PageRegistration, UnifiedAnalyticsEvent};
use sitepulse::telemetry::SimulatedTelemetry;
use sitepulse::AnalyticsContext;

/// Sitepulse - replay a synthetic visit through the analytics core and print
/// the resulting dashboard
#[derive(Parser, Debug)]
#[command(name = "sitepulse")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard time range: 1h, 24h, 7d or 30d
    #[arg(short, long, default_value = "24h")]
    range: TimeRange,

    /// Print this many further dashboards, one per configured refresh interval
    #[arg(long, default_value_t = 0)]
    refreshes: u32,

    /// Also print Prometheus metrics
    #[arg(long)]
    metrics: bool,

    /// Debug-level logging for sitepulse targets
    #[arg(short, long)]
    verbose: bool,

    /// Validate configuration and exit
    #[arg(long)]
    test: bool,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let config = AppConfig::from_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Landing page, pricing, signup: three page views, vitals and business events
fn replay_visit(ctx: &AnalyticsContext, telemetry: &SimulatedTelemetry) {
    telemetry.emit_typical_vitals();

    let orchestrator = ctx.orchestrator();
    orchestrator.register_page_analytics("/", PageRegistration::titled("Home").with_section("marketing"));
    orchestrator.register_page_analytics("/pricing", PageRegistration::titled("Pricing"));
    orchestrator.register_page_analytics("/signup", PageRegistration::titled("Sign up").with_tag("funnel"));

    let session = ctx.coordinator().session_id().unwrap_or_default();
    let mut previous: Option<&str> = None;
    for (page, load_ms) in [("/", 1_480.0), ("/pricing", 920.0), ("/signup", 1_105.0)] {
        let mut view = PageViewInput::new(page).with_load_time(load_ms);
        if let Some(from) = previous {
            view = view.with_referrer(from);
        }
        ctx.track_page_view(view);
        ctx.track_unified_event(UnifiedAnalyticsEvent::new(
            page,
            EventPayload::navigation(previous, page),
            ctx.now_ms(),
            session.as_str(),
        ));
        previous = Some(page);
    }

    ctx.track_unified_event(
        UnifiedAnalyticsEvent::new("/pricing", EventPayload::cta("start-trial"), ctx.now_ms(), session.as_str())
            .with_label("hero")
            .with_metadata("plan", "team"),
    );
    ctx.track_unified_event(
        UnifiedAnalyticsEvent::new("/signup", EventPayload::conversion("trial"), ctx.now_ms(), session.as_str())
            .with_value(49.0),
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    if args.test {
        println!("configuration ok");
        return Ok(());
    }

    let verbose = args.verbose || config.analytics.enable_console_logging;
    sitepulse::logging::init_subscriber(&config.logging, verbose)
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize logging")?;

    tracing::info!(
        environment = %config.environment,
        range = %args.range,
        "Configuration loaded successfully"
    );

    let telemetry = Arc::new(SimulatedTelemetry::typical());
    let ctx = AnalyticsContext::builder(config)
        .telemetry(telemetry.clone())
        .build()
        .context("failed to build analytics context")?;
    ctx.initialize().await.context("failed to initialize analytics")?;

    replay_visit(&ctx, &telemetry);
    ctx.orchestrator().drain();

    let dashboard = ctx.get_dashboard_summary(args.range).await;
    let unified = ctx.get_unified_dashboard_summary();
    let health = ctx.perform_health_check().await;
    let output = json!({
        "dashboard": dashboard,
        "unified": unified,
        "health": health,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    let refresh = ctx.refresh_interval();
    for round in 1..=args.refreshes {
        tokio::time::sleep(refresh).await;
        tracing::debug!(round, interval_ms = refresh.as_millis() as u64, "Dashboard refresh");
        let dashboard = ctx.get_dashboard_summary(args.range).await;
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    }

    if args.metrics {
        println!("{}", ctx.metrics().render());
    }

    ctx.shutdown();
    Ok(())
}
