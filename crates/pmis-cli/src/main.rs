//! `pmis` command line
//!
//! Loads a snapshot document and prints summaries, dashboards, analytics,
//! counts or classification tags. Logs go to stderr, results to stdout.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pmis_hierarchy::{HierarchyView, PerformanceTree};
use pmis_model::{NodeRef, PerformanceBand};
use pmis_rollup::{
    build_analytics, build_dashboard, classify_all, compute_counts, compute_node_percentage,
    filtered_summarize, period_options, BandFilter, DashboardFilters, DataType, EntityFilter, PeriodFilter,
    RollupConfig, Scope, Summary,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn snapshot_arg() -> Arg {
    Arg::new("snapshot")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Snapshot document (JSON)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn filter_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("period")
                .long("period")
                .value_parser(value_parser!(PeriodFilter))
                .help("all, fy:YYYY-YYYY, qN:YYYY-YYYY or START..END"),
        )
        .arg(
            Arg::new("scope")
                .long("scope")
                .value_parser(value_parser!(Scope))
                .help("organization, strategic_goal, strategic_objective, programme, directorate or division"),
        )
        .arg(
            Arg::new("entity")
                .long("entity")
                .value_parser(value_parser!(EntityFilter))
                .help("Id of the scope record, or all"),
        )
        .arg(
            Arg::new("performance")
                .long("performance")
                .value_parser(value_parser!(BandFilter))
                .help("all, excellent, good, fair or poor"),
        )
        .arg(
            Arg::new("data-type")
                .long("data-type")
                .value_parser(value_parser!(DataType))
                .help("all, strategic, programme or a category name"),
        )
}

fn cli() -> Command {
    Command::new("pmis")
        .version(pmis_rollup::VERSION)
        .about("Performance rollups over PMIS snapshots")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Rollup configuration (toml, yaml or json)"),
        )
        .arg(
            Arg::new("recalculate")
                .long("recalculate")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Recalculate auto-calculated KPIs and delivery scores on load"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(filter_args(
            Command::new("summarize")
                .about("Per-category counts, averages and band distribution")
                .arg(snapshot_arg())
                .arg(json_arg()),
        ))
        .subcommand(filter_args(
            Command::new("dashboard")
                .about("Full dashboard report as JSON")
                .arg(snapshot_arg()),
        ))
        .subcommand(filter_args(
            Command::new("analytics")
                .about("Score trends, organisation risk and decline alerts as JSON")
                .arg(snapshot_arg())
                .arg(
                    Arg::new("as-of")
                        .long("as-of")
                        .value_parser(value_parser!(NaiveDate))
                        .help("Day to look back from (YYYY-MM-DD), today by default"),
                ),
        ))
        .subcommand(
            Command::new("classify")
                .about("KPI classification tags")
                .arg(snapshot_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("counts")
                .about("Distinct descendants and percentage of one record")
                .arg(snapshot_arg())
                .arg(
                    Arg::new("node")
                        .long("node")
                        .required(true)
                        .value_parser(value_parser!(NodeRef))
                        .help("Record as category:id, for example strategic_goal:1"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("periods")
                .about("Period filter options for the snapshot")
                .arg(snapshot_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Load a snapshot and report dangling references")
                .arg(snapshot_arg())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail when any reference dangles"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &ArgMatches) -> Result<RollupConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => RollupConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(RollupConfig::default()),
    }
}

fn load_snapshot(path: &Path, recalculate: bool) -> Result<PerformanceTree> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let mut tree = PerformanceTree::from_json(&text)
        .with_context(|| format!("loading snapshot {}", path.display()))?;
    if recalculate {
        let kpis = tree.recalculate_kpis();
        if !kpis.is_empty() {
            tracing::info!(?kpis, "auto-calculated KPI values replaced");
        }
        let links = tree.refresh_link_scores();
        if !links.is_empty() {
            tracing::info!(?links, "division programme scores refreshed from delivery");
        }
    }
    tracing::info!(
        records = tree.record_count(),
        relations = tree.relation_count(),
        recalculate,
        "snapshot loaded"
    );
    Ok(tree)
}

fn snapshot(args: &ArgMatches) -> Result<PerformanceTree> {
    let path = args
        .get_one::<PathBuf>("snapshot")
        .context("missing snapshot path")?;
    load_snapshot(path, args.get_flag("recalculate"))
}

fn filters_from(args: &ArgMatches) -> DashboardFilters {
    let mut filters = DashboardFilters::new();
    if let Some(period) = args.get_one::<PeriodFilter>("period") {
        filters = filters.with_period(*period);
    }
    let scope = args.get_one::<Scope>("scope").copied().unwrap_or_default();
    let entity = args.get_one::<EntityFilter>("entity").copied().unwrap_or_default();
    filters = filters.with_scope(scope, entity);
    if let Some(band) = args.get_one::<BandFilter>("performance") {
        filters = filters.with_performance(*band);
    }
    if let Some(data_type) = args.get_one::<DataType>("data-type") {
        filters = filters.with_data_type(*data_type);
    }
    filters
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Indicators: {} (average {})\n",
        summary.indicator_count, summary.avg_performance
    ));
    for band in PerformanceBand::ALL {
        out.push_str(&format!("  {band:<10} {}\n", summary.distribution.get(band)));
    }
    if summary.distribution.excluded > 0 {
        out.push_str(&format!("  {:<10} {}\n", "excluded", summary.distribution.excluded));
    }
    out.push('\n');
    for (category, stats) in &summary.categories {
        if stats.count > 0 {
            out.push_str(&format!(
                "{:<28} {:>5}  {}\n",
                category.to_string(),
                stats.count,
                stats.average
            ));
        }
    }
    out
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    match matches.subcommand() {
        Some(("summarize", args)) => {
            let tree = snapshot(args)?;
            let summary = filtered_summarize(&tree, filters_from(args), &config);
            if args.get_flag("json") {
                print_json(&summary)?;
            } else {
                print!("{}", render_summary(&summary));
            }
        }
        Some(("dashboard", args)) => {
            let tree = snapshot(args)?;
            print_json(&build_dashboard(&tree, filters_from(args), &config))?;
        }
        Some(("analytics", args)) => {
            let tree = snapshot(args)?;
            let as_of = args
                .get_one::<NaiveDate>("as-of")
                .copied()
                .unwrap_or_else(|| Utc::now().date_naive());
            print_json(&build_analytics(&tree, filters_from(args), as_of, &config))?;
        }
        Some(("classify", args)) => {
            let tree = snapshot(args)?;
            let tags = classify_all(&tree);
            if args.get_flag("json") {
                print_json(&tags)?;
            } else {
                for (kpi, tag) in &tags {
                    let name = tree.label(*kpi).unwrap_or_default();
                    println!(
                        "{:<10} {:<12} {:<20} {name}",
                        kpi.to_string(),
                        tag.classification_level.as_str(),
                        tag.parent_type.as_str(),
                    );
                }
            }
        }
        Some(("counts", args)) => {
            let tree = snapshot(args)?;
            let node = *args.get_one::<NodeRef>("node").context("missing --node")?;
            if !tree.contains(node) {
                bail!("record {node} not found in snapshot");
            }
            let counts = compute_counts(&tree, node);
            let percentage = compute_node_percentage(&tree, node);
            if args.get_flag("json") {
                print_json(&serde_json::json!({
                    "node": node,
                    "percentage": percentage,
                    "counts": counts,
                }))?;
            } else {
                println!("{node}: {percentage}");
                for (category, count) in counts.iter() {
                    println!("  {:<28} {count}", category.to_string());
                }
            }
        }
        Some(("periods", args)) => {
            let tree = snapshot(args)?;
            print_json(&period_options(&tree, &config))?;
        }
        Some(("validate", args)) => {
            let tree = snapshot(args)?;
            let dangling = tree.dangling_references();
            println!(
                "{} records, {} relations, {} dangling references",
                tree.record_count(),
                tree.relation_count(),
                dangling.len()
            );
            for reference in dangling {
                println!("  {reference}");
            }
            for (relation, count) in tree.relation_summary() {
                println!("  {:<16} {count}", relation.to_string());
            }
            if args.get_flag("strict") && !dangling.is_empty() {
                bail!("{} dangling references", dangling.len());
            }
        }
        _ => bail!("unknown command"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));
    run(&matches)
}
