mod aggregate;
mod config;
mod fetch;
mod filter;
mod geo;
mod hierarchy;
mod kpi;
mod models;
mod normalize;
mod orchestrator;
mod out_models;
mod render;
mod taxonomy;
mod temporal;
mod viz_export;

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::fetch::load_events;
use crate::kpi::collection_line;
use crate::models::FilterAction;
use crate::normalize::normalize_category;
use crate::orchestrator::Dashboard;
use crate::out_models::ChartId;
use crate::taxonomy::Category;
use crate::viz_export::{write_all_viz, JsonRenderer};

/// Incident dashboard - filter, aggregate and lay out incident records into chart-ready JSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Event collection: a JSON array or a `window.EVENTS = [...]` script
    #[arg(short, long, default_value = "events.js")]
    events: PathBuf,

    /// Output directory for generated files
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Path to a YAML config file (overrides DASHBOARD_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Active categories: "all", "none" or a comma-separated list of codes
    #[arg(long, default_value = "all")]
    categories: String,

    /// Flip one category after --categories is applied (repeatable)
    #[arg(long)]
    toggle: Vec<String>,

    /// Free-text query; every whitespace-separated term must match
    #[arg(short, long, default_value = "")]
    query: String,

    /// Inclusive lower date bound, YYYY-MM-DD
    #[arg(long, default_value = "")]
    from: String,

    /// Inclusive upper date bound, YYYY-MM-DD
    #[arg(long, default_value = "")]
    to: String,

    /// Treat the backend as lacking map support (forces fallbacks)
    #[arg(long)]
    no_maps: bool,

    /// Leave a chart out of the output, by target name (repeatable)
    #[arg(long)]
    skip_chart: Vec<String>,
}

/// Turn CLI flags into the same actions the interactive controls emit.
fn actions_from_args(args: &Args) -> Result<Vec<FilterAction>> {
    // start from a known state before layering the flags on
    let mut actions = vec![FilterAction::Reset];

    match args.categories.trim().to_lowercase().as_str() {
        "all" | "" => actions.push(FilterAction::SelectAll),
        "none" => actions.push(FilterAction::SelectNone),
        list => {
            actions.push(FilterAction::SelectNone);
            for code in list.split(',').filter(|c| !c.trim().is_empty()) {
                let Some(cat) = normalize_category(Some(code)) else {
                    bail!("Unknown category '{}' (expected one of the 11 codes)", code.trim());
                };
                actions.push(FilterAction::Toggle(cat));
            }
        }
    }

    for code in &args.toggle {
        match normalize_category(Some(code)) {
            Some(cat) => actions.push(FilterAction::Toggle(cat)),
            None => bail!("Unknown category '{}' for --toggle", code.trim()),
        }
    }

    actions.push(FilterAction::SetQuery(args.query.clone()));
    actions.push(FilterAction::SetDateBounds {
        from: args.from.clone(),
        to: args.to.clone(),
    });
    Ok(actions)
}

fn renderer_from_args(args: &Args) -> Result<JsonRenderer> {
    let mut renderer = renderer_from_args(&args)?;
    for name in &args.skip_chart {
        let Some(chart) = ChartId::from_name(name.trim()) else {
            bail!("Unknown chart '{}' for --skip-chart", name.trim());
        };
        renderer = renderer.without(chart);
    }
    Ok(renderer)
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting incident_dashboard");

    let args = Args::parse();
    let cfg = DashboardConfig::resolve(args.config.as_deref())?;
    debug!("Config - {:?}", cfg);

    let mut renderer = JsonRenderer::new(!args.no_maps);
    let records = load_events(&args.events)?;

    let mut dashboard = Dashboard::new(records, cfg, &renderer)?;
    let headline = collection_line(dashboard.records().len());
    for action in actions_from_args(&args)? {
        dashboard.apply(action);
    }
    // Set semantics hide duplicate toggles; report what actually ended up active.
    let active: Vec<&str> = Category::ALL
        .into_iter()
        .filter(|c| dashboard.state().active.contains(c))
        .map(Category::code)
        .collect();
    info!(
        "Filter state - categories=[{}], query={:?}, from={:?}, to={:?}",
        active.join(","),
        dashboard.state().query,
        dashboard.state().from,
        dashboard.state().to
    );

    let report = dashboard.update(&mut renderer);

    // The one-shot settle pass runs after the backend has had its layout turn.
    std::thread::sleep(std::time::Duration::from_millis(dashboard.config().settle_delay_ms));
    dashboard.settle(&mut renderer);

    let files = write_all_viz(&args.output_dir, &headline, &report, &renderer)?;

    info!(
        "Dashboard written - dir={}, files={}, {} | countries={} | span={}",
        args.output_dir.display(),
        files.len(),
        report.kpis.stats_line,
        report.kpis.countries,
        report.kpis.date_span
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["incident_dashboard"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_select_everything() {
        let a = args(&[]);
        let acts = actions_from_args(&a).unwrap();
        assert_eq!(acts[..2], [FilterAction::Reset, FilterAction::SelectAll]);
        assert!(!a.no_maps);
        assert!(a.skip_chart.is_empty());
    }

    #[test]
    fn category_list_and_toggles() {
        let a = args(&["--categories", "drone, mil", "--toggle", "gps", "--query", "baltic"]);
        let acts = actions_from_args(&a).unwrap();
        assert_eq!(
            &acts[1..5],
            &[
                FilterAction::SelectNone,
                FilterAction::Toggle(Category::Drone),
                FilterAction::Toggle(Category::Mil),
                FilterAction::Toggle(Category::Gps),
            ]
        );
        assert!(acts.contains(&FilterAction::SetQuery("baltic".into())));
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!(actions_from_args(&args(&["--categories", "DRONE,BOGUS"])).is_err());
        assert!(actions_from_args(&args(&["--toggle", "nope"])).is_err());
        assert!(renderer_from_args(&args(&["--skip-chart", "pie"])).is_err());
    }

    #[test]
    fn skipped_charts_have_no_target() {
        use crate::render::Renderer;
        let r = renderer_from_args(&args(&["--skip-chart", "pieCats", "--skip-chart", "cumulative"]))
            .unwrap();
        assert!(!r.has_target(ChartId::PieCats));
        assert!(!r.has_target(ChartId::Cumulative));
        assert!(r.has_target(ChartId::HeatCalendar));
    }
}
